//! Key binding resolution with layer fallback.
//!
//! Answers "what does key K produce on layer L while the keyboard is in state S".
//! A layer that does not bind a key, or whose action has no rule for the current
//! state, defers to its base layer for that same key code.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::models::{KeyBinding, KeyMap, KeyboardLayout, RuleOutcome};

/// Result of resolving one key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The key emits text
    Text(String),
    /// The key is a dead key moving into the named state
    Transition(String),
    /// Nothing is bound for this key, layer and state
    Absent,
}

/// Kind of dangling reference found in a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `<key action="...">` naming an unknown action
    Action,
    /// `baseMapSet` naming an unknown key map set
    BaseMapSet,
    /// `baseIndex` naming a layer missing from its set
    BaseLayer,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action => f.write_str("action"),
            Self::BaseMapSet => f.write_str("base key map set"),
            Self::BaseLayer => f.write_str("base layer"),
        }
    }
}

/// Data-integrity problems found while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A reference points to something the layout does not define
    #[error("malformed layout: {kind} '{id}' does not exist")]
    MalformedReference {
        /// What kind of reference dangles
        kind: ReferenceKind,
        /// The referenced id (layer references are rendered as "set/index")
        id: String,
    },
    /// A fallback chain loops back onto a layer it already visited
    #[error("malformed layout: fallback chain loops ({chain})")]
    UnboundedRecursion {
        /// Visited layers as "set/index", ending with the repeated one
        chain: String,
    },
}

/// Layers already visited along one fallback chain.
#[derive(Debug, Default)]
struct Visited<'a>(Vec<(&'a str, u8)>);

impl<'a> Visited<'a> {
    fn enter(&mut self, map_set: &'a str, layer: u8) -> Result<(), ResolveError> {
        if self.0.contains(&(map_set, layer)) {
            let mut chain: Vec<String> = self.0.iter().map(|(s, l)| format!("{s}/{l}")).collect();
            chain.push(format!("{map_set}/{layer}"));
            return Err(ResolveError::UnboundedRecursion {
                chain: chain.join(" -> "),
            });
        }
        self.0.push((map_set, layer));
        Ok(())
    }
}

/// Resolves key presses against a loaded layout.
///
/// Holds only a shared reference, so one resolver (or many) can be used from
/// several threads at once.
#[derive(Debug, Clone, Copy)]
pub struct KeyResolver<'a> {
    layout: &'a KeyboardLayout,
}

impl<'a> KeyResolver<'a> {
    /// Creates a resolver over `layout`.
    pub const fn new(layout: &'a KeyboardLayout) -> Self {
        Self { layout }
    }

    /// The layout being resolved.
    pub const fn layout(&self) -> &'a KeyboardLayout {
        self.layout
    }

    /// Resolves `key_code` on `layer` of `map_set` while in `state`.
    ///
    /// An unknown top-level map set or layer resolves to [`Outcome::Absent`];
    /// dangling references reached through actions or fallbacks are errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use keylegend::models::{KeyMap, KeyMapSet, KeyboardLayout};
    /// use keylegend::services::resolver::{KeyResolver, Outcome};
    ///
    /// let layout = KeyboardLayout::new("Demo").with_key_map_set(
    ///     KeyMapSet::new("ISO")
    ///         .with_key_map(KeyMap::new(0).with_output(0x12, "1"))
    ///         .with_key_map(KeyMap::new(1).with_base("ISO", 0)),
    /// );
    /// let resolver = KeyResolver::new(&layout);
    /// assert_eq!(resolver.resolve("ISO", "none", 1, 0x12).unwrap(), Outcome::Text("1".into()));
    /// assert_eq!(resolver.resolve("ISO", "none", 1, 0x13).unwrap(), Outcome::Absent);
    /// ```
    pub fn resolve(
        &self,
        map_set: &str,
        state: &str,
        layer: u8,
        key_code: u8,
    ) -> Result<Outcome, ResolveError> {
        let Some((set_id, key_map)) = self.top_level_map(map_set, layer) else {
            return Ok(Outcome::Absent);
        };

        let mut visited = Visited::default();
        visited.enter(set_id, layer)?;
        self.resolve_in(key_map, state, key_code, &mut visited)
    }

    fn resolve_in(
        &self,
        key_map: &'a KeyMap,
        state: &str,
        key_code: u8,
        visited: &mut Visited<'a>,
    ) -> Result<Outcome, ResolveError> {
        match key_map.binding(key_code) {
            Some(KeyBinding::Literal(text)) => return Ok(Outcome::Text(text.clone())),
            Some(KeyBinding::ActionRef(action_id)) => {
                let action = self.layout.action_set(action_id).ok_or_else(|| {
                    ResolveError::MalformedReference {
                        kind: ReferenceKind::Action,
                        id: action_id.clone(),
                    }
                })?;

                match action.rule_for(state).map(|rule| &rule.outcome) {
                    Some(RuleOutcome::Emit(text)) => return Ok(Outcome::Text(text.clone())),
                    Some(RuleOutcome::Transition(next)) => {
                        return Ok(Outcome::Transition(next.clone()))
                    }
                    Some(RuleOutcome::Inert) | None => {
                        debug!(action = %action_id, state, "no rule for state, trying base layer");
                    }
                }
            }
            None => {}
        }

        match self.base_of(key_map, visited)? {
            Some(base) => self.resolve_in(base, state, key_code, visited),
            None => Ok(Outcome::Absent),
        }
    }

    /// Effective bindings of a layer, including keys inherited through its
    /// fallback chain. The nearest layer binding a key code wins.
    ///
    /// An unknown top-level map set or layer yields an empty map.
    pub fn layer_bindings(
        &self,
        map_set: &str,
        layer: u8,
    ) -> Result<BTreeMap<u8, &'a KeyBinding>, ResolveError> {
        let mut bindings = BTreeMap::new();
        let Some((set_id, mut key_map)) = self.top_level_map(map_set, layer) else {
            return Ok(bindings);
        };

        let mut visited = Visited::default();
        visited.enter(set_id, layer)?;
        loop {
            for (code, binding) in &key_map.keys {
                bindings.entry(*code).or_insert(binding);
            }
            match self.base_of(key_map, &mut visited)? {
                Some(base) => key_map = base,
                None => return Ok(bindings),
            }
        }
    }

    fn top_level_map(&self, map_set: &str, layer: u8) -> Option<(&'a str, &'a KeyMap)> {
        let set = self.layout.key_map_set(map_set)?;
        Some((set.id.as_str(), set.key_map(layer)?))
    }

    /// Follows a layer's fallback reference, if it has one.
    fn base_of(
        &self,
        key_map: &'a KeyMap,
        visited: &mut Visited<'a>,
    ) -> Result<Option<&'a KeyMap>, ResolveError> {
        let Some(base) = &key_map.base else {
            return Ok(None);
        };

        visited.enter(&base.map_set, base.index)?;

        let set = self.layout.key_map_set(&base.map_set).ok_or_else(|| {
            ResolveError::MalformedReference {
                kind: ReferenceKind::BaseMapSet,
                id: base.map_set.clone(),
            }
        })?;
        let base_map = set
            .key_map(base.index)
            .ok_or_else(|| ResolveError::MalformedReference {
                kind: ReferenceKind::BaseLayer,
                id: format!("{}/{}", base.map_set, base.index),
            })?;

        debug!(map_set = %base.map_set, layer = base.index, "following fallback layer");
        Ok(Some(base_map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionSet, KeyMapSet};

    fn layout() -> KeyboardLayout {
        KeyboardLayout::new("Test")
            .with_key_map_set(
                KeyMapSet::new("ANSI")
                    .with_key_map(KeyMap::new(0).with_output(0x00, "a").with_output(0x12, "1"))
                    .with_key_map(KeyMap::new(2).with_output(0x00, "å")),
            )
            .with_key_map_set(
                KeyMapSet::new("ISO")
                    .with_key_map(KeyMap::new(0).with_base("ANSI", 0).with_output(0x0A, "§"))
                    .with_key_map(
                        KeyMap::new(1)
                            .with_base("ISO", 0)
                            .with_action(0x12, "shiftnum")
                            .with_action(0x21, "acute"),
                    )
                    .with_key_map(KeyMap::new(3).with_base("ANSI", 2)),
            )
            .with_action(ActionSet::new("shiftnum").emit("none", "!"))
            .with_action(
                ActionSet::new("acute")
                    .transition("none", "dead_acute")
                    .emit("dead_acute", "´"),
            )
    }

    #[test]
    fn test_literal_lookup() {
        let layout = layout();
        let resolver = KeyResolver::new(&layout);
        assert_eq!(
            resolver.resolve("ANSI", "none", 0, 0x00).unwrap(),
            Outcome::Text("a".to_string())
        );
    }

    #[test]
    fn test_action_emit_and_transition() {
        let layout = layout();
        let resolver = KeyResolver::new(&layout);
        assert_eq!(
            resolver.resolve("ISO", "none", 1, 0x12).unwrap(),
            Outcome::Text("!".to_string())
        );
        assert_eq!(
            resolver.resolve("ISO", "none", 1, 0x21).unwrap(),
            Outcome::Transition("dead_acute".to_string())
        );
        assert_eq!(
            resolver.resolve("ISO", "dead_acute", 1, 0x21).unwrap(),
            Outcome::Text("´".to_string())
        );
    }

    #[test]
    fn test_unmatched_action_falls_back_for_same_key() {
        let layout = layout();
        let resolver = KeyResolver::new(&layout);
        // shiftnum has no rule for dead_acute, so ISO/0 -> ANSI/0 answers
        assert_eq!(
            resolver.resolve("ISO", "dead_acute", 1, 0x12).unwrap(),
            Outcome::Text("1".to_string())
        );
    }

    #[test]
    fn test_fallback_chain_across_sets() {
        let layout = layout();
        let resolver = KeyResolver::new(&layout);
        assert_eq!(
            resolver.resolve("ISO", "none", 1, 0x00).unwrap(),
            resolver.resolve("ANSI", "none", 0, 0x00).unwrap()
        );
        assert_eq!(
            resolver.resolve("ISO", "none", 3, 0x00).unwrap(),
            Outcome::Text("å".to_string())
        );
        assert_eq!(
            resolver.resolve("ISO", "none", 1, 0x0A).unwrap(),
            Outcome::Text("§".to_string())
        );
    }

    #[test]
    fn test_absent_outcomes() {
        let layout = layout();
        let resolver = KeyResolver::new(&layout);
        assert_eq!(resolver.resolve("JIS", "none", 0, 0x00).unwrap(), Outcome::Absent);
        assert_eq!(resolver.resolve("ISO", "none", 9, 0x00).unwrap(), Outcome::Absent);
        assert_eq!(resolver.resolve("ISO", "none", 1, 0x7F).unwrap(), Outcome::Absent);
    }

    #[test]
    fn test_missing_action_is_malformed() {
        let layout = KeyboardLayout::new("Broken").with_key_map_set(
            KeyMapSet::new("ISO").with_key_map(KeyMap::new(0).with_action(1, "ghost")),
        );
        let err = KeyResolver::new(&layout)
            .resolve("ISO", "none", 0, 1)
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::MalformedReference {
                kind: ReferenceKind::Action,
                id: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_missing_base_is_malformed() {
        let layout = KeyboardLayout::new("Broken").with_key_map_set(
            KeyMapSet::new("ISO")
                .with_key_map(KeyMap::new(0).with_base("ANSI", 0))
                .with_key_map(KeyMap::new(1).with_base("ISO", 7)),
        );
        let resolver = KeyResolver::new(&layout);
        assert!(matches!(
            resolver.resolve("ISO", "none", 0, 1),
            Err(ResolveError::MalformedReference {
                kind: ReferenceKind::BaseMapSet,
                ..
            })
        ));
        assert!(matches!(
            resolver.resolve("ISO", "none", 1, 1),
            Err(ResolveError::MalformedReference {
                kind: ReferenceKind::BaseLayer,
                ..
            })
        ));
    }

    #[test]
    fn test_fallback_cycle_is_reported() {
        let layout = KeyboardLayout::new("Loop").with_key_map_set(
            KeyMapSet::new("ISO")
                .with_key_map(KeyMap::new(0).with_base("ISO", 1))
                .with_key_map(KeyMap::new(1).with_base("ISO", 0)),
        );
        let err = KeyResolver::new(&layout)
            .resolve("ISO", "none", 0, 5)
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnboundedRecursion {
                chain: "ISO/0 -> ISO/1 -> ISO/0".to_string()
            }
        );
    }

    #[test]
    fn test_self_referencing_layer_is_reported() {
        let layout = KeyboardLayout::new("Loop").with_key_map_set(
            KeyMapSet::new("ISO").with_key_map(KeyMap::new(0).with_base("ISO", 0)),
        );
        assert!(matches!(
            KeyResolver::new(&layout).layer_bindings("ISO", 0),
            Err(ResolveError::UnboundedRecursion { .. })
        ));
    }

    #[test]
    fn test_layer_bindings_include_inherited_keys() {
        let layout = layout();
        let bindings = KeyResolver::new(&layout).layer_bindings("ISO", 1).unwrap();
        let codes: Vec<u8> = bindings.keys().copied().collect();
        assert_eq!(codes, vec![0x00, 0x0A, 0x12, 0x21]);
        // nearest layer wins
        assert_eq!(
            bindings[&0x12],
            &KeyBinding::ActionRef("shiftnum".to_string())
        );
        assert!(KeyResolver::new(&layout)
            .layer_bindings("ISO", 42)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_error_messages() {
        let err = ResolveError::MalformedReference {
            kind: ReferenceKind::BaseMapSet,
            id: "ANSI".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed layout: base key map set 'ANSI' does not exist"
        );
    }
}
