//! Legend and path rendering settings.
//!
//! Settings describe how resolved outputs are presented: which layers are real
//! modifier layers and how they are labelled, how dead-key states are displayed,
//! literal substitutions, and where each legend is placed on a KLE keycap.
//! They are loaded from JSON and handed explicitly to the components that need them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::constants::{KLE_PLACE_COUNT, NEUTRAL_STATE};

/// Declares that a layer corresponds to a modifier key combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierDeclaration {
    /// Layer index inside the key map set
    pub layer: u8,
    /// Label shown before keys pressed on this layer (e.g., "⇧", "⌥")
    #[serde(default)]
    pub prefix: String,
    /// Whether the layer is reachable with real physical modifiers and may be
    /// used as a step in dead-key paths
    #[serde(default = "default_used")]
    pub used: bool,
}

/// Default value for `used` (true)
const fn default_used() -> bool {
    true
}

/// Display legend for a dead-key state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateLegend {
    /// Automaton state name (e.g., "dead_acute")
    pub name: String,
    /// Text shown for the state (e.g., "´")
    pub legend: String,
}

/// Equivalence rule used to collapse two legends into one placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MergeRule {
    /// Texts must be identical
    #[default]
    Same,
    /// Second text may be the uppercase form of the first
    Uppercase,
    /// Second text may be the lowercase form of the first
    Lowercase,
}

/// Two source placements collapsed into the slot declaring the merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeDeclaration {
    /// Source placements `[a, b]`; `a` holds the presumed base form
    pub places: [usize; 2],
    /// Equivalence rule (defaults to SAME)
    #[serde(default)]
    pub rule: MergeRule,
}

/// One legend placement on a keycap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegendSlot {
    /// Placement filled by merging two other placements
    Merge {
        /// Target placement (0-11)
        place: usize,
        /// Merge sources and rule
        merge: MergeDeclaration,
    },
    /// Placement filled by resolving the key on a layer in a state
    Resolve {
        /// Target placement (0-11)
        place: usize,
        /// Layer index to resolve on
        layer: u8,
        /// Automaton state to resolve in (defaults to "none")
        #[serde(default = "default_state")]
        state: String,
    },
}

fn default_state() -> String {
    NEUTRAL_STATE.to_string()
}

impl LegendSlot {
    /// Returns the placement this slot writes to.
    pub const fn place(&self) -> usize {
        match self {
            Self::Merge { place, .. } | Self::Resolve { place, .. } => *place,
        }
    }
}

/// Complete rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Key map set to resolve against (falls back to config / "ISO")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_set: Option<String>,
    /// Modifier layer declarations
    #[serde(default)]
    pub modifiers: Vec<ModifierDeclaration>,
    /// Display legends for dead-key states, in documentation order
    #[serde(default)]
    pub states: Vec<StateLegend>,
    /// Exact-match replacements applied to rendered legends (e.g., " " -> "␣")
    #[serde(default)]
    pub substitutions: BTreeMap<String, String>,
    /// Legend placements for KLE export
    #[serde(default)]
    pub legends: Vec<LegendSlot>,
}

impl Settings {
    /// Parses settings from a JSON string. Call [`Settings::validate`] before use.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse settings JSON")
    }

    /// Reads and parses a settings file without validating it.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Validates placements and merge declarations.
    ///
    /// Checks:
    /// - every placement is below 12
    /// - merge sources are distinct and differ from the merge target
    pub fn validate(&self) -> Result<()> {
        for slot in &self.legends {
            let place = slot.place();
            check_place(place)?;

            if let LegendSlot::Merge { merge, .. } = slot {
                let [a, b] = merge.places;
                check_place(a)?;
                check_place(b)?;
                if a == b {
                    anyhow::bail!("Merge into place {} uses place {} twice", place, a);
                }
                if a == place || b == place {
                    anyhow::bail!("Merge into place {} cannot use itself as a source", place);
                }
            }
        }

        Ok(())
    }

    /// Returns the modifier declaration for a layer.
    pub fn modifier(&self, layer: u8) -> Option<&ModifierDeclaration> {
        self.modifiers.iter().find(|m| m.layer == layer)
    }

    /// Returns the display prefix of a layer, or "" when undeclared.
    pub fn prefix(&self, layer: u8) -> &str {
        self.modifier(layer).map_or("", |m| m.prefix.as_str())
    }

    /// Layers usable as dead-key path steps, in declaration order without duplicates.
    pub fn used_layers(&self) -> Vec<u8> {
        let mut layers = Vec::new();
        for modifier in self.modifiers.iter().filter(|m| m.used) {
            if !layers.contains(&modifier.layer) {
                layers.push(modifier.layer);
            }
        }
        layers
    }

    /// Returns the declared legend of a state.
    pub fn state_legend(&self, state: &str) -> Option<&str> {
        self.states
            .iter()
            .find(|s| s.name == state)
            .map(|s| s.legend.as_str())
    }

    /// Display text for a state: its declared legend, or the raw name.
    pub fn state_display<'a>(&'a self, state: &'a str) -> &'a str {
        self.state_legend(state).unwrap_or(state)
    }

    /// Applies the literal substitution table to a rendered legend.
    pub fn substitute(&self, text: &str) -> String {
        self.substitutions
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }

    /// Legend placements to render, falling back to a single unmodified legend.
    pub fn legend_slots(&self) -> Vec<LegendSlot> {
        if self.legends.is_empty() {
            vec![LegendSlot::Resolve {
                place: 0,
                layer: 0,
                state: default_state(),
            }]
        } else {
            self.legends.clone()
        }
    }
}

fn check_place(place: usize) -> Result<()> {
    if place >= KLE_PLACE_COUNT {
        anyhow::bail!(
            "Legend place {} out of range (must be below {})",
            place,
            KLE_PLACE_COUNT
        );
    }
    Ok(())
}
