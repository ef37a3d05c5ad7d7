//! KLE key name database.
//!
//! Keyboard-layout-editor charts label ISO keys with names such as `#Q` or
//! `#SPACE`. This module maps those names to macOS virtual key codes using a
//! table embedded in the binary.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// One named key of the ISO chart.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct KeyName {
    /// KLE label (e.g., "#Q", "#SPACE")
    name: String,
    /// macOS virtual key code
    code: u8,
}

/// Database schema from iso_keycodes.json.
#[derive(Debug, Clone, Deserialize)]
struct KeyNameDatabase {
    keys: Vec<KeyName>,
}

/// ISO key name database with lookup in both directions.
#[derive(Debug, Clone)]
pub struct KeycodeDb {
    /// All key definitions in chart order
    keys: Vec<KeyName>,
    /// Fast lookup by KLE label
    by_name: HashMap<String, usize>,
    /// Fast lookup by key code
    by_code: HashMap<u8, usize>,
}

impl KeycodeDb {
    /// Loads the database from the embedded JSON file.
    pub fn load() -> Result<Self> {
        let json_data = include_str!("iso_keycodes.json");
        let db: KeyNameDatabase = serde_json::from_str(json_data)
            .context("Failed to parse embedded iso_keycodes.json")?;

        let mut by_name = HashMap::new();
        let mut by_code = HashMap::new();
        for (idx, key) in db.keys.iter().enumerate() {
            by_name.insert(key.name.clone(), idx);
            by_code.entry(key.code).or_insert(idx);
        }

        Ok(Self {
            keys: db.keys,
            by_name,
            by_code,
        })
    }

    /// Returns the key code for a KLE label.
    ///
    /// # Examples
    ///
    /// ```
    /// use keylegend::keycode_db::KeycodeDb;
    ///
    /// let db = KeycodeDb::load().unwrap();
    /// assert_eq!(db.code_for("#1"), Some(0x12));
    /// assert_eq!(db.code_for("#SPACE"), Some(0x31));
    /// assert_eq!(db.code_for("Esc"), None);
    /// ```
    #[must_use]
    pub fn code_for(&self, name: &str) -> Option<u8> {
        let idx = self.by_name.get(name)?;
        self.keys.get(*idx).map(|key| key.code)
    }

    /// Returns the KLE label for a key code.
    #[must_use]
    pub fn name_for(&self, code: u8) -> Option<&str> {
        let idx = self.by_code.get(&code)?;
        self.keys.get(*idx).map(|key| key.name.as_str())
    }
}
