//! Shared test fixtures for integration and E2E CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use keylegend::models::{KeyboardLayout, Settings};
use keylegend::parser::parse_xml_tree;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A small keylayout in the shape macOS produces.
///
/// - `ANSI` holds the real bindings; `ISO` layers fall back to it and only add
///   the section-sign key (code 10).
/// - Layer 1 is Shift, layer 2 is Option, layer 3 is Shift+Option (declared
///   unused in the settings fixture).
/// - Option+E (code 14) is the acute dead key; pressing it again reaches
///   `dead_double_acute`. Option+I (code 34) is the circumflex dead key.
/// - `dead_tilde` appears in a rule but no key reaches it.
pub const SAMPLE_KEYLAYOUT: &str = r#"<?xml version="1.1" encoding="UTF-8"?>
<!DOCTYPE keyboard SYSTEM "file://localhost/System/Library/DTDs/KeyboardLayout.dtd">
<!-- Generated for tests -->
<keyboard group="126" id="-4242" name="Test Accents" maxout="2">
    <layouts>
        <layout first="0" last="17" mapSet="ISO" modifiers="Modifiers"/>
    </layouts>
    <modifierMap id="Modifiers" defaultIndex="0">
        <keyMapSelect mapIndex="0"><modifier keys=""/></keyMapSelect>
        <keyMapSelect mapIndex="1"><modifier keys="anyShift"/></keyMapSelect>
        <keyMapSelect mapIndex="2"><modifier keys="anyOption"/></keyMapSelect>
        <keyMapSelect mapIndex="3"><modifier keys="anyShift anyOption"/></keyMapSelect>
    </modifierMap>
    <keyMapSet id="ANSI">
        <keyMap index="0">
            <key code="0" output="a"/>
            <key code="12" output="q"/>
            <key code="14" action="e"/>
            <key code="18" output="1"/>
            <key code="39" output="&#x0027;"/>
            <key code="49" output=" "/>
        </keyMap>
        <keyMap index="1">
            <key code="0" output="A"/>
            <key code="12" output="Q"/>
            <key code="14" output="E"/>
            <key code="18" action="shiftnum"/>
            <key code="39" output="&quot;"/>
            <key code="49" output=" "/>
        </keyMap>
        <keyMap index="2">
            <key code="12" output="œ"/>
            <key code="14" action="accent"/>
            <key code="34" action="circ"/>
        </keyMap>
        <keyMap index="3">
            <key code="12" output="Œ"/>
            <key code="14" action="accent"/>
        </keyMap>
    </keyMapSet>
    <keyMapSet id="ISO">
        <keyMap index="0" baseMapSet="ANSI" baseIndex="0">
            <key code="10" output="§"/>
        </keyMap>
        <keyMap index="1" baseMapSet="ANSI" baseIndex="1">
            <key code="10" output="±"/>
        </keyMap>
        <keyMap index="2" baseMapSet="ANSI" baseIndex="2"/>
        <keyMap index="3" baseMapSet="ANSI" baseIndex="3"/>
    </keyMapSet>
    <actions>
        <action id="e">
            <when state="none" output="e"/>
            <when state="dead_acute" output="é"/>
            <when state="dead_circumflex" output="ê"/>
        </action>
        <action id="shiftnum">
            <when state="none" output="!"/>
        </action>
        <action id="accent">
            <when state="none" next="dead_acute"/>
            <when state="dead_acute" next="dead_double_acute"/>
        </action>
        <action id="circ">
            <when state="none" next="dead_circumflex"/>
            <when state="dead_tilde" output="ĩ"/>
        </action>
    </actions>
    <terminators>
        <when state="dead_acute" output="´"/>
    </terminators>
</keyboard>
"#;

/// Settings matching [`SAMPLE_KEYLAYOUT`].
///
/// Placements: unshifted top-left (0), shifted bottom-left (6), option
/// top-right (2), case-merged center (4), acute-state bottom-right (8).
pub const SAMPLE_SETTINGS: &str = r#"{
    "map_set": "ISO",
    "modifiers": [
        {"layer": 1, "prefix": "⇧"},
        {"layer": 2, "prefix": "⌥"},
        {"layer": 3, "prefix": "⇧⌥", "used": false}
    ],
    "states": [
        {"name": "dead_acute", "legend": "´"},
        {"name": "dead_circumflex", "legend": "ˆ"},
        {"name": "dead_double_acute", "legend": "˝"},
        {"name": "dead_tilde", "legend": "˜"}
    ],
    "substitutions": {" ": "␣"},
    "legends": [
        {"place": 0, "layer": 0},
        {"place": 6, "layer": 1},
        {"place": 2, "layer": 2},
        {"place": 4, "merge": {"places": [0, 6], "rule": "UPPERCASE"}},
        {"place": 8, "layer": 0, "state": "dead_acute"}
    ]
}"#;

/// KLE chart with metadata, key properties, known and unknown labels.
pub const SAMPLE_KLE: &str = r##"[
    {"name": "Test ISO"},
    [{"a": 4}, "#1", "#Q", "#E"],
    [{"w": 6.25}, "#SPACE", "Fn"]
]"##;

/// Parses [`SAMPLE_KEYLAYOUT`].
pub fn sample_layout() -> KeyboardLayout {
    let root = parse_xml_tree(SAMPLE_KEYLAYOUT).expect("Failed to parse sample keylayout");
    KeyboardLayout::load(&root).expect("Failed to load sample keylayout")
}

/// Parses [`SAMPLE_SETTINGS`].
pub fn sample_settings() -> Settings {
    let settings = Settings::parse(SAMPLE_SETTINGS).expect("Failed to parse sample settings");
    settings.validate().expect("Sample settings should be valid");
    settings
}

/// Writes `content` into a fresh temp dir.
///
/// The returned `TempDir` must be kept alive for the file to exist.
pub fn create_temp_file(name: &str, content: &str) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(name);
    fs::write(&path, content).expect("Failed to write temp file");
    (path, temp_dir)
}

/// Writes an extra file next to others in an existing temp dir.
pub fn write_file(temp_dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp_dir.path().join(name);
    fs::write(&path, content).expect("Failed to write temp file");
    path
}

/// A config path that does not exist, so commands run with default config
/// regardless of the user's own config file.
pub fn isolated_config(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("no-config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_layout_loads() {
        let layout = sample_layout();
        assert_eq!(layout.name, "Test Accents");
        assert_eq!(layout.key_map_sets.len(), 2);
        assert_eq!(layout.actions.len(), 4);
    }

    #[test]
    fn test_fixture_settings_load() {
        let settings = sample_settings();
        assert_eq!(settings.used_layers(), vec![1, 2]);
        assert_eq!(settings.legends.len(), 5);
    }
}
