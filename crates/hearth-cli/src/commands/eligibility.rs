// crates/hearth-cli/src/commands/eligibility.rs
//
// `hearth eligibility <voucher> <vouchee>`: may this vouch be created?

use clap::Args;

use hearth_trust::TrustEngine;

use crate::output::{self, FieldRow, OutputFormat};

/// Eligibility command.
#[derive(Debug, Args)]
pub struct EligibilityCmd {
    pub voucher: String,
    pub vouchee: String,
}

/// Run the eligibility command.
pub async fn run(
    engine: &TrustEngine,
    cmd: &EligibilityCmd,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let eligibility = engine
        .get_vouch_eligibility(&cmd.voucher, &cmd.vouchee)
        .await?;
    let rows = vec![
        FieldRow::new("Can vouch", eligibility.can_vouch),
        FieldRow::new("Voucher trust", output::trust(eligibility.voucher_trust)),
        FieldRow::new("Reason", output::or_dash(eligibility.reason.as_deref())),
    ];
    output::emit(format, &eligibility, &rows);
    Ok(())
}
