// crates/hearth-cli/src/commands/check.rs
//
// `hearth check <user> <action>`: compare trust against an action threshold.

use clap::Args;

use hearth_trust::TrustEngine;

use crate::output::{self, FieldRow, OutputFormat};

/// Threshold check command.
#[derive(Debug, Args)]
pub struct CheckCmd {
    pub user: String,

    /// Action name, e.g. send_messages or steward_actions.
    pub action: String,
}

/// Run the check command.
pub async fn run(
    engine: &TrustEngine,
    cmd: &CheckCmd,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let check = engine.check_trust_threshold(&cmd.user, &cmd.action).await?;
    let rows = vec![
        FieldRow::new("Action", &check.action),
        FieldRow::new("Required", output::trust(check.required)),
        FieldRow::new("Actual", output::trust(check.actual_trust)),
        FieldRow::new("Allowed", check.meets_threshold),
    ];
    output::emit(format, &check, &rows);
    Ok(())
}
