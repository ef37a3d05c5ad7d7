//! Data models for keyboard layouts and rendering settings.
//!
//! Models are plain data with lookup helpers; resolution logic lives in
//! [`crate::services`].

pub mod layout;
pub mod settings;

// Re-export all model types
pub use layout::{
    ActionSet, BaseMapRef, KeyBinding, KeyMap, KeyMapSet, KeyboardLayout, RuleOutcome, StateRule,
};
pub use settings::{
    LegendSlot, MergeDeclaration, MergeRule, ModifierDeclaration, Settings, StateLegend,
};
