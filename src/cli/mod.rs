//! CLI command handlers for keylegend.
//!
//! This module provides headless, scriptable access to the resolution engine:
//! single key lookups, dead-key path documentation and KLE legend generation.

pub mod common;
pub mod legends;
pub mod paths;
pub mod resolve;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use legends::LegendsArgs;
pub use paths::PathsArgs;
pub use resolve::ResolveArgs;
