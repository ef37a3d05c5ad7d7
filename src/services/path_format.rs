//! Human-readable rendering of dead-key paths.

use tracing::warn;

use crate::constants::NEUTRAL_STATE;
use crate::models::Settings;
use crate::services::resolver::{KeyResolver, Outcome, ResolveError};
use crate::services::state_paths::{KeyPress, Path};

/// Renders key paths using modifier prefixes and state legends from settings.
pub struct PathFormatter<'a> {
    resolver: KeyResolver<'a>,
    settings: &'a Settings,
}

impl<'a> PathFormatter<'a> {
    /// Creates a formatter.
    pub const fn new(resolver: KeyResolver<'a>, settings: &'a Settings) -> Self {
        Self { resolver, settings }
    }

    /// Renders the shortest of `paths` as `"⌥ e | ⌥ ´"`-style text.
    ///
    /// Longer paths are dropped, identical renderings appear once (first seen
    /// order) and alternatives are joined with `" | "`. No paths render as "".
    pub fn format(&self, map_set: &str, paths: &[Path]) -> Result<String, ResolveError> {
        let Some(min_len) = paths.iter().map(Vec::len).min() else {
            return Ok(String::new());
        };

        let mut rendered: Vec<String> = Vec::new();
        for path in paths.iter().filter(|path| path.len() == min_len) {
            let text = self.render_path(map_set, path)?;
            if !rendered.contains(&text) {
                rendered.push(text);
            }
        }

        Ok(rendered.join(" | "))
    }

    /// Renders one path. Consecutive presses sharing a prefix form one group
    /// showing the prefix once; groups are separated by a space.
    fn render_path(&self, map_set: &str, path: &[KeyPress]) -> Result<String, ResolveError> {
        let mut groups: Vec<(&str, String)> = Vec::new();

        for press in path {
            let prefix = self.settings.prefix(press.layer);
            let legend = self.press_legend(map_set, *press)?;
            match groups.last_mut() {
                Some((last_prefix, legends)) if *last_prefix == prefix => legends.push_str(&legend),
                _ => groups.push((prefix, legend)),
            }
        }

        let parts: Vec<String> = groups
            .into_iter()
            .map(|(prefix, legends)| {
                if prefix.is_empty() {
                    legends
                } else {
                    format!("{prefix} {legends}")
                }
            })
            .collect();

        Ok(parts.join(" "))
    }

    /// What the key shows when pressed from the neutral state.
    fn press_legend(&self, map_set: &str, press: KeyPress) -> Result<String, ResolveError> {
        let legend = match self
            .resolver
            .resolve(map_set, NEUTRAL_STATE, press.layer, press.key_code)?
        {
            Outcome::Text(text) => text,
            Outcome::Transition(state) => self.settings.state_display(&state).to_string(),
            Outcome::Absent => {
                warn!(
                    layer = press.layer,
                    key_code = press.key_code,
                    "path key has no neutral-state output"
                );
                format!("{:#04x}", press.key_code)
            }
        };

        Ok(self.settings.substitute(&legend))
    }
}
