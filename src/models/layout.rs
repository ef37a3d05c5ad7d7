//! Keyboard layout data model.
//!
//! Read-only view of a `.keylayout` definition: key map sets with their layers,
//! key bindings, and the dead-key action sets. Built once by [`KeyboardLayout::load`]
//! and never mutated afterwards.

use anyhow::{bail, Context, Result};
use std::collections::{BTreeMap, BTreeSet};

use crate::constants::NEUTRAL_STATE;
use crate::parser::xml_tree::XmlNode;

/// What a single key produces on a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyBinding {
    /// Fixed text output (`<key output="a"/>`)
    Literal(String),
    /// Reference to an action set (`<key action="acute"/>`)
    ActionRef(String),
}

/// Fallback layer consulted for key codes a key map does not bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseMapRef {
    /// Id of the key map set holding the base layer
    pub map_set: String,
    /// Layer index inside that set
    pub index: u8,
}

/// One layer of a key map set (e.g., "unmodified", "shift").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    /// Layer index (0-255)
    pub index: u8,
    /// Key code to binding; the first binding for a code wins
    pub keys: BTreeMap<u8, KeyBinding>,
    /// Optional fallback layer
    pub base: Option<BaseMapRef>,
}

impl KeyMap {
    /// Creates an empty layer without fallback.
    pub fn new(index: u8) -> Self {
        Self {
            index,
            keys: BTreeMap::new(),
            base: None,
        }
    }

    /// Sets the fallback layer.
    #[must_use]
    pub fn with_base(mut self, map_set: impl Into<String>, index: u8) -> Self {
        self.base = Some(BaseMapRef {
            map_set: map_set.into(),
            index,
        });
        self
    }

    /// Binds a key code to literal text. Existing bindings are kept.
    #[must_use]
    pub fn with_output(mut self, key_code: u8, text: impl Into<String>) -> Self {
        self.bind(key_code, KeyBinding::Literal(text.into()));
        self
    }

    /// Binds a key code to an action set. Existing bindings are kept.
    #[must_use]
    pub fn with_action(mut self, key_code: u8, action_id: impl Into<String>) -> Self {
        self.bind(key_code, KeyBinding::ActionRef(action_id.into()));
        self
    }

    fn bind(&mut self, key_code: u8, binding: KeyBinding) {
        self.keys.entry(key_code).or_insert(binding);
    }

    /// Returns the binding for a key code on this layer only.
    pub fn binding(&self, key_code: u8) -> Option<&KeyBinding> {
        self.keys.get(&key_code)
    }
}

/// A named collection of layers (e.g., "ANSI", "ISO").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMapSet {
    /// Set identifier
    pub id: String,
    /// Layers in document order
    pub key_maps: Vec<KeyMap>,
}

impl KeyMapSet {
    /// Creates an empty key map set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key_maps: Vec::new(),
        }
    }

    /// Appends a layer.
    #[must_use]
    pub fn with_key_map(mut self, key_map: KeyMap) -> Self {
        self.key_maps.push(key_map);
        self
    }

    /// Returns the first layer with the given index.
    pub fn key_map(&self, index: u8) -> Option<&KeyMap> {
        self.key_maps.iter().find(|map| map.index == index)
    }
}

/// Result of a state rule firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Terminal text output
    Emit(String),
    /// Dead-key transition into another state
    Transition(String),
    /// Rule with neither output nor next state
    Inert,
}

/// `<when state="..." .../>`: what an action does in one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRule {
    /// Guard state
    pub state: String,
    /// Outcome when the guard matches
    pub outcome: RuleOutcome,
}

/// A named action with its per-state rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSet {
    /// Action identifier
    pub id: String,
    /// Rules in document order
    pub rules: Vec<StateRule>,
}

impl ActionSet {
    /// Creates an action with no rules.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rules: Vec::new(),
        }
    }

    /// Adds a rule emitting text in `state`.
    #[must_use]
    pub fn emit(mut self, state: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules.push(StateRule {
            state: state.into(),
            outcome: RuleOutcome::Emit(text.into()),
        });
        self
    }

    /// Adds a rule moving from `state` to `next`.
    #[must_use]
    pub fn transition(mut self, state: impl Into<String>, next: impl Into<String>) -> Self {
        self.rules.push(StateRule {
            state: state.into(),
            outcome: RuleOutcome::Transition(next.into()),
        });
        self
    }

    /// Returns the first rule guarded by `state`.
    pub fn rule_for(&self, state: &str) -> Option<&StateRule> {
        self.rules.iter().find(|rule| rule.state == state)
    }
}

/// Complete keyboard layout definition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyboardLayout {
    /// Layout name from the `<keyboard name>` attribute
    pub name: String,
    /// Key map sets in document order
    pub key_map_sets: Vec<KeyMapSet>,
    /// Action sets in document order
    pub actions: Vec<ActionSet>,
}

impl KeyboardLayout {
    /// Creates an empty layout.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_map_sets: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Appends a key map set.
    #[must_use]
    pub fn with_key_map_set(mut self, set: KeyMapSet) -> Self {
        self.key_map_sets.push(set);
        self
    }

    /// Appends an action set.
    #[must_use]
    pub fn with_action(mut self, action: ActionSet) -> Self {
        self.actions.push(action);
        self
    }

    /// Returns the first key map set with the given id.
    pub fn key_map_set(&self, id: &str) -> Option<&KeyMapSet> {
        self.key_map_sets.iter().find(|set| set.id == id)
    }

    /// Returns the first action set with the given id.
    pub fn action_set(&self, id: &str) -> Option<&ActionSet> {
        self.actions.iter().find(|action| action.id == id)
    }

    /// Lists every non-neutral state mentioned by any rule, sorted by name.
    ///
    /// States are never declared up front in a keylayout; they only exist as
    /// guards and transition targets.
    pub fn states(&self) -> Vec<String> {
        let mut states = BTreeSet::new();
        for rule in self.actions.iter().flat_map(|action| &action.rules) {
            states.insert(rule.state.as_str());
            if let RuleOutcome::Transition(next) = &rule.outcome {
                states.insert(next.as_str());
            }
        }
        states.remove(NEUTRAL_STATE);
        states.into_iter().map(str::to_string).collect()
    }

    /// Builds the model from a parsed `<keyboard>` element.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not `<keyboard>`, a required id/index/code
    /// attribute is missing, or a numeric attribute is not a number in 0-255.
    pub fn load(root: &XmlNode) -> Result<Self> {
        if root.name != "keyboard" {
            bail!("Expected <keyboard> root element, found <{}>", root.name);
        }

        let mut layout = Self::new(root.attr("name").unwrap_or_default());

        for set_node in root.children_named("keyMapSet") {
            layout.key_map_sets.push(load_key_map_set(set_node)?);
        }

        for actions_node in root.children_named("actions") {
            for action_node in actions_node.children_named("action") {
                layout.actions.push(load_action(action_node)?);
            }
        }

        Ok(layout)
    }
}

fn load_key_map_set(node: &XmlNode) -> Result<KeyMapSet> {
    let id = required_attr(node, "id")?;
    let mut set = KeyMapSet::new(id);

    for map_node in node.children_named("keyMap") {
        let index = parse_u8(required_attr(map_node, "index")?, "keyMap index")?;
        let mut key_map = KeyMap::new(index);

        if let Some(base_set) = map_node.attr("baseMapSet") {
            let base_index = map_node
                .attr("baseIndex")
                .map_or(Ok(0), |value| parse_u8(value, "keyMap baseIndex"))?;
            key_map = key_map.with_base(base_set, base_index);
        }

        for key_node in map_node.children_named("key") {
            let code = parse_u8(required_attr(key_node, "code")?, "key code")?;
            if let Some(output) = key_node.attr("output") {
                key_map.bind(code, KeyBinding::Literal(output.to_string()));
            } else if let Some(action) = key_node.attr("action") {
                key_map.bind(code, KeyBinding::ActionRef(action.to_string()));
            }
        }

        set.key_maps.push(key_map);
    }

    Ok(set)
}

fn load_action(node: &XmlNode) -> Result<ActionSet> {
    let mut action = ActionSet::new(required_attr(node, "id")?);

    for when in node.children_named("when") {
        let state = required_attr(when, "state")?.to_string();
        let outcome = match (when.attr("output"), when.attr("next")) {
            (Some(output), _) => RuleOutcome::Emit(output.to_string()),
            (None, Some(next)) => RuleOutcome::Transition(next.to_string()),
            (None, None) => RuleOutcome::Inert,
        };
        action.rules.push(StateRule { state, outcome });
    }

    Ok(action)
}

fn required_attr<'a>(node: &'a XmlNode, key: &str) -> Result<&'a str> {
    node.attr(key)
        .with_context(|| format!("<{}> is missing the '{}' attribute", node.name, key))
}

fn parse_u8(value: &str, what: &str) -> Result<u8> {
    value
        .trim()
        .parse::<u8>()
        .with_context(|| format!("Invalid {what} '{value}': expected a number from 0 to 255"))
}
