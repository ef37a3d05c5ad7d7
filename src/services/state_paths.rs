//! Dead-key path search.
//!
//! Finds the shortest key sequences that move the keyboard from the neutral
//! state into a target dead-key state. Only keys on layers declared as used
//! modifier layers count as steps.
//!
//! The search is two-phase per target: keys that reach the target directly from
//! the neutral state win outright (all of them are returned); only when there
//! are none does the search look one hop further back, recursing into every
//! intermediate state that leads to the target. Each branch carries the set of
//! states it has already passed through, so cyclic transition graphs terminate.
//! Depths are only compared within one level, not globally across branches.

use std::collections::BTreeSet;

use tracing::debug;

use crate::constants::NEUTRAL_STATE;
use crate::models::{ActionSet, KeyBinding, RuleOutcome, Settings};
use crate::services::resolver::{KeyResolver, ReferenceKind, ResolveError};

/// One key press: a key code on a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPress {
    /// Layer the key is pressed on
    pub layer: u8,
    /// Key code pressed
    pub key_code: u8,
}

impl KeyPress {
    /// Creates a key press.
    pub const fn new(layer: u8, key_code: u8) -> Self {
        Self { layer, key_code }
    }
}

/// Key presses in typing order, starting from the neutral state.
pub type Path = Vec<KeyPress>;

/// An action-bound key usable as a path step.
struct Edge<'a> {
    press: KeyPress,
    action: &'a ActionSet,
}

/// Searches a layout for key sequences reaching dead-key states.
pub struct StatePathFinder<'a> {
    resolver: KeyResolver<'a>,
    used_layers: Vec<u8>,
}

impl<'a> StatePathFinder<'a> {
    /// Creates a finder restricted to the used modifier layers of `settings`.
    pub fn new(resolver: KeyResolver<'a>, settings: &Settings) -> Self {
        Self {
            resolver,
            used_layers: settings.used_layers(),
        }
    }

    /// Finds all shortest-found key sequences that put `map_set` into `target`.
    ///
    /// The neutral state is reached by the single empty path. An unreachable
    /// state yields no paths.
    pub fn find_paths(&self, map_set: &str, target: &str) -> Result<Vec<Path>, ResolveError> {
        if target == NEUTRAL_STATE {
            return Ok(vec![Vec::new()]);
        }

        let edges = self.edges(map_set)?;
        let mut forbidden = BTreeSet::new();
        forbidden.insert(target.to_string());

        let paths = Self::search(&edges, target, &forbidden);
        debug!(map_set, target, found = paths.len(), "state path search finished");
        Ok(paths)
    }

    fn search(edges: &[Edge<'_>], target: &str, forbidden: &BTreeSet<String>) -> Vec<Path> {
        let direct: Vec<Path> = edges
            .iter()
            .filter(|edge| {
                matches!(
                    edge.action.rule_for(NEUTRAL_STATE).map(|rule| &rule.outcome),
                    Some(RuleOutcome::Transition(next)) if next == target
                )
            })
            .map(|edge| vec![edge.press])
            .collect();

        if !direct.is_empty() {
            return direct;
        }

        let mut paths = Vec::new();
        for edge in edges {
            for rule in &edge.action.rules {
                let RuleOutcome::Transition(next) = &rule.outcome else {
                    continue;
                };
                if next != target || rule.state == NEUTRAL_STATE || forbidden.contains(&rule.state)
                {
                    continue;
                }

                debug!(via = %rule.state, target, "searching intermediate state");
                let mut branch = forbidden.clone();
                branch.insert(rule.state.clone());

                for mut path in Self::search(edges, &rule.state, &branch) {
                    path.push(edge.press);
                    paths.push(path);
                }
            }
        }

        paths
    }

    /// Action-bound keys on the used modifier layers, inherited keys included.
    fn edges(&self, map_set: &str) -> Result<Vec<Edge<'a>>, ResolveError> {
        let layout = self.resolver.layout();
        let mut edges = Vec::new();

        for &layer in &self.used_layers {
            for (code, binding) in self.resolver.layer_bindings(map_set, layer)? {
                let KeyBinding::ActionRef(action_id) = binding else {
                    continue;
                };
                let action = layout.action_set(action_id).ok_or_else(|| {
                    ResolveError::MalformedReference {
                        kind: ReferenceKind::Action,
                        id: action_id.clone(),
                    }
                })?;
                edges.push(Edge {
                    press: KeyPress::new(layer, code),
                    action,
                });
            }
        }

        Ok(edges)
    }
}
