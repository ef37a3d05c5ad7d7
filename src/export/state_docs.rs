//! Dead-key documentation: how to reach each state from the neutral state.

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::warn;

use crate::models::{KeyboardLayout, Settings};
use crate::services::{KeyResolver, PathFormatter, StatePathFinder};

/// How to type one dead-key state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatePathEntry {
    /// Automaton state name
    pub state: String,
    /// Display legend (declared legend or the raw name)
    pub legend: String,
    /// Rendered shortest key sequences, "" when unreachable
    pub path: String,
    /// Whether any key sequence reaches the state
    pub reachable: bool,
}

/// Finds and renders the shortest paths to each of `states`.
///
/// # Errors
///
/// Fails when the layout has a dangling reference on a used modifier layer
/// or a looping fallback chain.
pub fn generate_state_paths(
    layout: &KeyboardLayout,
    settings: &Settings,
    map_set: &str,
    states: &[String],
) -> Result<Vec<StatePathEntry>> {
    let resolver = KeyResolver::new(layout);
    let finder = StatePathFinder::new(resolver, settings);
    let formatter = PathFormatter::new(resolver, settings);

    let mut entries = Vec::with_capacity(states.len());
    for state in states {
        let paths = finder.find_paths(map_set, state)?;
        if paths.is_empty() {
            warn!(state = %state, map_set, "state is unreachable from the neutral state");
        }

        entries.push(StatePathEntry {
            state: state.clone(),
            legend: settings.state_display(state).to_string(),
            path: formatter.format(map_set, &paths)?,
            reachable: !paths.is_empty(),
        });
    }

    Ok(entries)
}

/// Renders entries as aligned `<legend>  <path>` lines.
///
/// # Example Output
///
/// ```text
/// ´   ⌥ e
/// ˆ   ⌥ i
/// ¨   (unreachable)
/// ```
pub fn render_state_paths(entries: &[StatePathEntry]) -> String {
    let width = entries
        .iter()
        .map(|entry| entry.legend.chars().count())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for entry in entries {
        let path = if entry.reachable {
            entry.path.as_str()
        } else {
            "(unreachable)"
        };
        let padding = width - entry.legend.chars().count();
        let _ = writeln!(output, "{}{}  {}", entry.legend, " ".repeat(padding), path);
    }
    output
}

/// Orders states for documentation.
///
/// Declared states come first in settings order. With `include_discovered`, every
/// other state found in the layout follows, sorted by name.
pub fn select_states(
    layout: &KeyboardLayout,
    settings: &Settings,
    include_discovered: bool,
) -> Vec<String> {
    let mut states: Vec<String> = settings.states.iter().map(|s| s.name.clone()).collect();
    if include_discovered {
        for state in layout.states() {
            if !states.contains(&state) {
                states.push(state);
            }
        }
    }
    states
}
