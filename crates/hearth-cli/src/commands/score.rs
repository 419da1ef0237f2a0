// crates/hearth-cli/src/commands/score.rs
//
// `hearth score <user>`: a user's trust score and the chains behind it.

use clap::Args;

use hearth_core::trust::TrustScore;
use hearth_trust::TrustEngine;

use crate::output::{self, FieldRow, OutputFormat};

/// Score command.
#[derive(Debug, Args)]
pub struct ScoreCmd {
    pub user: String,

    /// Ignore the cache and recompute from the ledger.
    #[arg(long)]
    pub force: bool,
}

fn rows(score: &TrustScore) -> Vec<FieldRow> {
    let mut rows = vec![
        FieldRow::new("User", &score.user_id),
        FieldRow::new("Trust", output::trust(score.computed_trust)),
        FieldRow::new("Genesis", score.is_genesis),
        FieldRow::new("Distance", output::or_dash(score.best_chain_distance)),
        FieldRow::new("Vouches", score.vouch_count),
        FieldRow::new("Revoked", score.revocation_count),
        FieldRow::new("Computed", score.last_computed.format("%Y-%m-%d %H:%M:%S")),
    ];
    for chain in &score.vouch_chains {
        rows.push(FieldRow::new("Chain", chain.members().join(" -> ")));
    }
    rows
}

/// Run the score command.
pub async fn run(
    engine: &TrustEngine,
    cmd: &ScoreCmd,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let score = engine.compute_trust_score(&cmd.user, cmd.force).await?;
    output::emit(format, &score, &rows(&score));
    Ok(())
}
