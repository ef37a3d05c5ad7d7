//! Service layer for layout resolution.
//!
//! This module contains the resolution engine: key resolution with fallback
//! layers, dead-key path search, path rendering and legend merging. Every
//! service borrows the layout and settings immutably.

pub mod legend_merge;
pub mod path_format;
pub mod resolver;
pub mod state_paths;

// Re-export commonly used types
pub use legend_merge::LegendMerger;
pub use path_format::PathFormatter;
pub use resolver::{KeyResolver, Outcome, ReferenceKind, ResolveError};
pub use state_paths::{KeyPress, Path, StatePathFinder};
