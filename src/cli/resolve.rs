//! Single key resolution command.

use crate::cli::common::{load_config, load_layout, parse_key, CliError, CliResult};
use crate::constants::NEUTRAL_STATE;
use crate::keycode_db::KeycodeDb;
use crate::models::Settings;
use crate::services::{KeyResolver, Outcome};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Show what a key produces on a layer in a state
#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    /// Path to the .keylayout file
    #[arg(short, long, value_name = "FILE")]
    pub layout: PathBuf,

    /// Key code (decimal or 0x hex) or KLE ISO name (e.g., "#Q")
    #[arg(short, long, value_name = "KEY")]
    pub key: String,

    /// Layer (modifier combination) index
    #[arg(long, default_value_t = 0)]
    pub layer: u8,

    /// Dead-key state to resolve in
    #[arg(long, default_value = NEUTRAL_STATE)]
    pub state: String,

    /// Key map set id (defaults to config, then "ISO")
    #[arg(long, value_name = "ID")]
    pub map_set: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ResolveResult {
    map_set: String,
    layer: u8,
    state: String,
    key_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_name: Option<String>,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

impl ResolveArgs {
    /// Execute the resolve command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let config = load_config(config_path)?;
        let layout = load_layout(&self.layout)?;
        let keycodes = KeycodeDb::load()
            .map_err(|e| CliError::io(format!("Failed to load keycode database: {e}")))?;

        let key_code = parse_key(&self.key, &keycodes)?;
        let map_set = config.effective_map_set(self.map_set.as_deref(), &Settings::default());

        if layout.key_map_set(&map_set).is_none() {
            return Err(CliError::validation(format!(
                "Key map set '{map_set}' not found in layout"
            )));
        }

        let outcome =
            KeyResolver::new(&layout).resolve(&map_set, &self.state, self.layer, key_code)?;

        let summary = match &outcome {
            Outcome::Text(text) => format!("Output:  {text:?}"),
            Outcome::Transition(next) => format!("Dead key → {next}"),
            Outcome::Absent => "Output:  (none)".to_string(),
        };
        let (kind, value) = match outcome {
            Outcome::Text(text) => ("text", Some(text)),
            Outcome::Transition(next) => ("transition", Some(next)),
            Outcome::Absent => ("absent", None),
        };

        let result = ResolveResult {
            map_set,
            layer: self.layer,
            state: self.state.clone(),
            key_code,
            key_name: keycodes.name_for(key_code).map(str::to_string),
            outcome: kind,
            value,
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&result)
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
            );
        } else {
            let key = match &result.key_name {
                Some(name) => format!("{:#04x} ({name})", result.key_code),
                None => format!("{:#04x}", result.key_code),
            };
            println!("Key:     {key}");
            println!("Map set: {}", result.map_set);
            println!("Layer:   {}", result.layer);
            println!("State:   {}", result.state);
            println!("{summary}");
        }

        Ok(())
    }
}
