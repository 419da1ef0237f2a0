// crates/hearth-cli/src/commands/vouch.rs
//
// `hearth vouch {create, list}`: trust assertions between users.

use clap::Subcommand;
use tabled::Tabled;

use hearth_core::vouch::Vouch;
use hearth_trust::TrustEngine;

use crate::output::{self, OutputFormat};

/// Vouch subcommands.
#[derive(Debug, Subcommand)]
pub enum VouchCmd {
    /// Vouch for another user. Runs the eligibility checks first.
    Create {
        /// The user giving the vouch.
        voucher: String,
        /// The user being vouched for.
        vouchee: String,
        /// How the voucher knows the vouchee.
        #[arg(long, default_value = "")]
        context: String,
    },
    /// List vouches given by a user, or received with `--received`.
    List {
        user: String,
        /// Show vouches the user received instead of gave.
        #[arg(long)]
        received: bool,
        /// Include revoked vouches received (always shown for given).
        #[arg(long)]
        include_revoked: bool,
    },
}

#[derive(Tabled)]
struct VouchRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Voucher")]
    voucher: String,
    #[tabled(rename = "Vouchee")]
    vouchee: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created_at: String,
    #[tabled(rename = "Context")]
    context: String,
}

impl From<&Vouch> for VouchRow {
    fn from(v: &Vouch) -> Self {
        Self {
            id: v.id.to_string(),
            voucher: v.voucher_id.clone(),
            vouchee: v.vouchee_id.clone(),
            status: v.status.to_string(),
            created_at: v.created_at.format("%Y-%m-%d %H:%M").to_string(),
            context: v.context.clone(),
        }
    }
}

/// Run the vouch subcommand.
pub async fn run(
    engine: &TrustEngine,
    cmd: &VouchCmd,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        VouchCmd::Create {
            voucher,
            vouchee,
            context,
        } => {
            let vouch = engine.create_vouch(voucher, vouchee, context).await?;
            output::emit(format, &vouch, &[VouchRow::from(&vouch)]);
        }
        VouchCmd::List {
            user,
            received,
            include_revoked,
        } => {
            let vouches = if *received {
                engine.vouches_received(user, *include_revoked).await?
            } else {
                engine.vouches_given(user).await?
            };
            let rows: Vec<VouchRow> = vouches.iter().map(VouchRow::from).collect();
            output::emit(format, &vouches, &rows);
        }
    }
    Ok(())
}
