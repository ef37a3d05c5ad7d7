//! Export functionality for resolved layouts.
//!
//! This module turns resolution results into artifacts: KLE charts with
//! generated keycap legends and dead-key documentation listing how each
//! state is typed.

pub mod kle;
pub mod state_docs;

pub use kle::{generate_kle_legends, LegendContext};
pub use state_docs::{generate_state_paths, render_state_paths, select_states, StatePathEntry};
