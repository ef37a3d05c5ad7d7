//! Dead-key path documentation command.

use crate::cli::common::{load_config, load_layout, load_settings, CliError, CliResult};
use crate::export::{generate_state_paths, render_state_paths, select_states};
use clap::Args;
use std::path::{Path, PathBuf};

/// List the shortest key sequences reaching each dead-key state
#[derive(Debug, Clone, Args)]
pub struct PathsArgs {
    /// Path to the .keylayout file
    #[arg(short, long, value_name = "FILE")]
    pub layout: PathBuf,

    /// Settings JSON (modifiers, state legends, substitutions)
    #[arg(short, long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Key map set id (defaults to settings, config, then "ISO")
    #[arg(long, value_name = "ID")]
    pub map_set: Option<String>,

    /// Only document this state
    #[arg(long, value_name = "STATE", conflicts_with = "all")]
    pub state: Option<String>,

    /// Also document states not declared in settings
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PathsArgs {
    /// Execute the paths command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let config = load_config(config_path)?;
        let layout = load_layout(&self.layout)?;
        let settings = load_settings(self.settings.as_deref(), &config)?;
        let map_set = config.effective_map_set(self.map_set.as_deref(), &settings);

        if layout.key_map_set(&map_set).is_none() {
            return Err(CliError::validation(format!(
                "Key map set '{map_set}' not found in layout"
            )));
        }

        let states = match &self.state {
            Some(state) => vec![state.clone()],
            None => select_states(&layout, &settings, self.all),
        };

        let entries = generate_state_paths(&layout, &settings, &map_set, &states)
            .map_err(|e| CliError::from_anyhow("Path search failed", &e))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&entries)
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
            );
        } else if entries.is_empty() {
            println!("No dead-key states to document (declare states in settings or use --all)");
        } else {
            print!("{}", render_state_paths(&entries));
        }

        Ok(())
    }
}
