//! KLE legend generation command.

use crate::cli::common::{load_config, load_layout, load_settings, CliError, CliResult};
use crate::export::{generate_kle_legends, LegendContext};
use crate::keycode_db::KeycodeDb;
use crate::services::KeyResolver;
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Fill a KLE chart with legends generated from a layout
#[derive(Debug, Clone, Args)]
pub struct LegendsArgs {
    /// Path to the .keylayout file
    #[arg(short, long, value_name = "FILE")]
    pub layout: PathBuf,

    /// KLE JSON chart whose key labels name ISO keys (e.g., "#Q")
    #[arg(short, long, value_name = "FILE")]
    pub kle: PathBuf,

    /// Settings JSON (legend placements, merges, substitutions)
    #[arg(short, long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Key map set id (defaults to settings, config, then "ISO")
    #[arg(long, value_name = "ID")]
    pub map_set: Option<String>,

    /// Write the chart here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl LegendsArgs {
    /// Execute the legends command
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

        let kle_content = fs::read_to_string(&self.kle).map_err(|e| {
            CliError::io(format!(
                "Failed to read KLE file {}: {e}",
                self.kle.display()
            ))
        })?;
        let kle: serde_json::Value = serde_json::from_str(&kle_content).map_err(|e| {
            CliError::io(format!(
                "Failed to parse KLE file {}: {e}",
                self.kle.display()
            ))
        })?;

        let keycodes = KeycodeDb::load()
            .map_err(|e| CliError::io(format!("Failed to load keycode database: {e}")))?;

        let ctx = LegendContext {
            resolver: KeyResolver::new(&layout),
            settings: &settings,
            map_set: &map_set,
            keycodes: &keycodes,
        };

        let chart = generate_kle_legends(&kle, &ctx)
            .map_err(|e| CliError::from_anyhow("Legend generation failed", &e))?;
        let json = serde_json::to_string_pretty(&chart)
            .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;

        match &self.output {
            Some(path) => {
                fs::write(path, format!("{json}\n"))
                    .map_err(|e| CliError::io(format!("Failed to write output file: {e}")))?;
                info!(path = %path.display(), "wrote KLE chart");
                eprintln!("✓ Wrote {}", path.display());
            }
            None => println!("{json}"),
        }

        Ok(())
    }
}
