// crates/hearth-cli/src/commands/revoke.rs
//
// `hearth revoke <vouch-id>`: revoke a vouch and cascade the recompute.

use clap::Args;
use uuid::Uuid;

use hearth_trust::{CascadeReport, TrustEngine};

use crate::output::{self, FieldRow, OutputFormat};

/// Revoke command.
#[derive(Debug, Args)]
pub struct RevokeCmd {
    /// Id of the vouch to revoke.
    pub vouch_id: Uuid,

    /// Reason recorded on the revoked vouch.
    #[arg(long, default_value = "")]
    pub reason: String,
}

fn rows(report: &CascadeReport) -> Vec<FieldRow> {
    vec![
        FieldRow::new("Vouch", report.vouch_id),
        FieldRow::new("Voucher", &report.voucher_id),
        FieldRow::new("Vouchee", &report.vouchee_id),
        FieldRow::new("State", report.state),
        FieldRow::new("Recomputed", report.affected_users.len()),
        FieldRow::new("Users", report.affected_users.join(", ")),
        FieldRow::new("Truncated", report.truncated),
    ]
}

/// Run the revoke command.
pub async fn run(
    engine: &TrustEngine,
    cmd: &RevokeCmd,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = engine
        .revoke_vouch_with_cascade(&cmd.vouch_id, &cmd.reason)
        .await?;
    output::emit(format, &report, &rows(&report));
    Ok(())
}
