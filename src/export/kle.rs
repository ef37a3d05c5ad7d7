//! KLE (keyboard-layout-editor.com) legend generation.
//!
//! A KLE document is a JSON array of rows. Rows that are arrays describe keys:
//! objects set properties for the following key and strings are key labels.
//! Labels naming a known ISO key (e.g. `#Q`) are replaced with the legends the
//! layout produces for that key, laid out over the twelve KLE placements.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::constants::KLE_PLACE_COUNT;
use crate::keycode_db::KeycodeDb;
use crate::models::{LegendSlot, Settings};
use crate::services::{KeyResolver, LegendMerger, Outcome};

/// Everything needed to turn a key code into a keycap legend.
pub struct LegendContext<'a> {
    /// Resolver over the loaded layout
    pub resolver: KeyResolver<'a>,
    /// Rendering settings (placements, state legends, substitutions)
    pub settings: &'a Settings,
    /// Key map set to resolve against
    pub map_set: &'a str,
    /// KLE label lookup
    pub keycodes: &'a KeycodeDb,
}

impl LegendContext<'_> {
    /// Builds the newline-joined legend string for a key code.
    ///
    /// Returns `None` when every placement is empty.
    pub fn keycap_legend(&self, key_code: u8) -> Result<Option<String>> {
        let slots = self.settings.legend_slots();
        let mut places = vec![String::new(); KLE_PLACE_COUNT];

        for slot in &slots {
            if let LegendSlot::Resolve {
                place,
                layer,
                state,
            } = slot
            {
                let Some(target) = places.get_mut(*place) else {
                    continue;
                };
                *target = match self
                    .resolver
                    .resolve(self.map_set, state, *layer, key_code)?
                {
                    Outcome::Text(text) => self.settings.substitute(&text),
                    Outcome::Transition(next) => self.settings.state_display(&next).to_string(),
                    Outcome::Absent => String::new(),
                };
            }
        }

        for slot in &slots {
            if let LegendSlot::Merge { place, merge } = slot {
                LegendMerger::apply(merge, *place, &mut places);
            }
        }

        while places.last().is_some_and(String::is_empty) {
            places.pop();
        }

        if places.is_empty() {
            Ok(None)
        } else {
            Ok(Some(places.join("\n")))
        }
    }
}

/// Replaces known key labels in a KLE document with resolved legends.
///
/// # Arguments
///
/// * `kle` - Parsed KLE JSON document (must be an array)
/// * `ctx` - Layout, settings and key names to resolve with
///
/// # Errors
///
/// Fails when the document is not an array or the layout has a dangling
/// reference on one of the charted keys.
pub fn generate_kle_legends(kle: &Value, ctx: &LegendContext<'_>) -> Result<Value> {
    let rows = kle
        .as_array()
        .context("KLE document must be a JSON array of rows")?;

    let mut replaced = 0usize;
    let mut out_rows = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(elements) = row.as_array() else {
            // Keyboard metadata
            out_rows.push(row.clone());
            continue;
        };

        let mut out_row = Vec::with_capacity(elements.len());
        for element in elements {
            let Some(label) = element.as_str() else {
                out_row.push(element.clone());
                continue;
            };

            let legend = match ctx.keycodes.code_for(label) {
                Some(code) => ctx
                    .keycap_legend(code)
                    .with_context(|| format!("Failed to build legend for key '{label}'"))?,
                None => None,
            };

            match legend {
                Some(legend) => {
                    debug!(label, legend = %legend, "replaced key label");
                    replaced += 1;
                    out_row.push(Value::String(legend));
                }
                None => out_row.push(element.clone()),
            }
        }
        out_rows.push(Value::Array(out_row));
    }

    info!(map_set = ctx.map_set, replaced, "generated KLE legends");
    Ok(Value::Array(out_rows))
}
