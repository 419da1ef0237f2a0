// crates/hearth-cli/src/commands/genesis.rs
//
// `hearth genesis {add, list}`: bootstrap identities with axiomatic trust.

use clap::Subcommand;
use tabled::Tabled;

use hearth_core::genesis::GenesisNode;
use hearth_trust::TrustEngine;

use crate::output::{self, OutputFormat};

/// Genesis node subcommands.
#[derive(Debug, Subcommand)]
pub enum GenesisCmd {
    /// Register a genesis node.
    ///
    /// The first genesis node may be added freely. After that, `--by` must
    /// name an existing genesis node.
    Add {
        /// User id to promote.
        user: String,
        /// Existing genesis node authorizing the addition.
        #[arg(long)]
        by: Option<String>,
        /// Free-form notes stored with the node.
        #[arg(long)]
        notes: Option<String>,
    },
    /// List all genesis nodes.
    List,
}

#[derive(Tabled)]
struct GenesisRow {
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Added")]
    added_at: String,
    #[tabled(rename = "Added by")]
    added_by: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl From<&GenesisNode> for GenesisRow {
    fn from(node: &GenesisNode) -> Self {
        Self {
            user: node.user_id.clone(),
            added_at: node.added_at.format("%Y-%m-%d %H:%M").to_string(),
            added_by: output::or_dash(node.added_by.as_deref()),
            notes: node.notes.clone().unwrap_or_default(),
        }
    }
}

/// Run the genesis subcommand.
pub async fn run(
    engine: &TrustEngine,
    cmd: &GenesisCmd,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        GenesisCmd::Add { user, by, notes } => {
            let caller = by.as_deref().unwrap_or(user);
            let added = engine
                .add_genesis_node_authorized(caller, user, notes.as_deref())
                .await?;
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    output::format_json(&serde_json::json!({ "user_id": user, "added": added }))
                ),
                OutputFormat::Table if added => println!("Added genesis node {}", user),
                OutputFormat::Table => println!("{} is already a genesis node", user),
            }
        }
        GenesisCmd::List => {
            let mut nodes = Vec::new();
            for user in engine.list_genesis_nodes().await? {
                if let Some(node) = engine.get_genesis_node(&user).await? {
                    nodes.push(node);
                }
            }
            let rows: Vec<GenesisRow> = nodes.iter().map(GenesisRow::from).collect();
            output::emit(format, &nodes, &rows);
        }
    }
    Ok(())
}
