//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the keylayout conventions the
//! resolver relies on.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "KeyLegend";

/// The binary name of the application (used in command examples, lowercase).
pub const APP_BINARY_NAME: &str = "keylegend";

/// Name of the neutral automaton state (no dead key pending).
pub const NEUTRAL_STATE: &str = "none";

/// Key map set used when neither the CLI, the settings nor the config name one.
pub const DEFAULT_MAP_SET: &str = "ISO";

/// Number of legend placements on a KLE keycap.
pub const KLE_PLACE_COUNT: usize = 12;
