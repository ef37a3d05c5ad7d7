//! KeyLegend Library
//!
//! This library resolves Apple `.keylayout` keyboard layouts: what each key
//! produces on every modifier layer and in every dead-key state, how each
//! dead-key state is reached from the neutral state, and how the results are
//! laid out as legends on keyboard-layout-editor charts.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod export;
pub mod keycode_db;
pub mod models;
pub mod parser;
pub mod services;
