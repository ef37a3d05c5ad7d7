//! Shared CLI plumbing: error type, exit codes and input loading.

use std::fmt;
use std::path::Path;

use crate::config::Config;
use crate::keycode_db::KeycodeDb;
use crate::models::{KeyboardLayout, Settings};
use crate::parser::xml_tree::read_xml_tree;
use crate::services::ResolveError;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Bad input: unknown key, invalid settings, out-of-range values
    Validation = 1,
    /// A file could not be read, parsed or written
    Io = 2,
    /// The layout references something it does not define, or loops
    Integrity = 3,
}

impl ExitCode {
    /// Numeric code passed to `std::process::exit`.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Error reported by a CLI command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Exit code to terminate with
    pub exit_code: ExitCode,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// I/O failure (exit code 2).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            exit_code: ExitCode::Io,
            message: message.into(),
        }
    }

    /// Invalid input (exit code 1).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            exit_code: ExitCode::Validation,
            message: message.into(),
        }
    }

    /// Broken layout data (exit code 3).
    pub fn integrity(message: impl Into<String>) -> Self {
        Self {
            exit_code: ExitCode::Integrity,
            message: message.into(),
        }
    }

    /// Classifies an error chain: resolution errors are integrity problems,
    /// everything else is reported as I/O.
    pub fn from_anyhow(context: &str, err: &anyhow::Error) -> Self {
        let message = format!("{context}: {err:#}");
        if err.chain().any(|cause| cause.is::<ResolveError>()) {
            Self::integrity(message)
        } else {
            Self::io(message)
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<ResolveError> for CliError {
    fn from(err: ResolveError) -> Self {
        Self::integrity(err.to_string())
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Loads the user config, or the file given with `--config`.
pub fn load_config(path: Option<&Path>) -> CliResult<Config> {
    let loaded = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    loaded.map_err(|e| CliError::io(format!("Failed to load configuration: {e:#}")))
}

/// Reads and parses a `.keylayout` file.
///
/// Unreadable files and malformed XML are I/O errors. Well-formed XML that does
/// not describe a valid layout is a validation error.
pub fn load_layout(path: &Path) -> CliResult<KeyboardLayout> {
    let root = read_xml_tree(path)
        .map_err(|e| CliError::io(format!("Failed to load layout: {e:#}")))?;

    KeyboardLayout::load(&root).map_err(|e| {
        CliError::validation(format!("Invalid keylayout {}: {e:#}", path.display()))
    })
}

/// Loads settings from the CLI path or the configured default.
///
/// Without either, default settings are used. A settings file that parses but
/// fails validation is a validation error.
pub fn load_settings(cli: Option<&Path>, config: &Config) -> CliResult<Settings> {
    let Some(path) = config.effective_settings_path(cli) else {
        return Ok(Settings::default());
    };

    let settings = Settings::read(path).map_err(|e| CliError::io(format!("{e:#}")))?;
    settings
        .validate()
        .map_err(|e| CliError::validation(format!("Invalid settings: {e:#}")))?;
    Ok(settings)
}

/// Parses a key argument: decimal (`18`), hex (`0x12`) or KLE name (`#1`).
pub fn parse_key(input: &str, keycodes: &KeycodeDb) -> CliResult<u8> {
    let trimmed = input.trim();
    let parsed = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u8::from_str_radix(hex, 16).ok()
    } else if trimmed.starts_with('#') {
        keycodes.code_for(trimmed)
    } else {
        trimmed.parse().ok()
    };

    parsed.ok_or_else(|| {
        CliError::validation(format!(
            "Invalid key '{input}': expected 0-255, 0x00-0xFF or a KLE ISO name like #Q"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ReferenceKind;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(CliError::validation("x").exit_code.code(), 1);
        assert_eq!(CliError::io("x").exit_code.code(), 2);
        assert_eq!(CliError::integrity("x").exit_code.code(), 3);
    }

    #[test]
    fn test_parse_key_forms() {
        let db = KeycodeDb::load().unwrap();
        assert_eq!(parse_key("18", &db), Ok(0x12));
        assert_eq!(parse_key("0x12", &db), Ok(0x12));
        assert_eq!(parse_key("0X0c", &db), Ok(0x0C));
        assert_eq!(parse_key("#1", &db), Ok(0x12));
        assert_eq!(parse_key(" #SPACE ", &db), Ok(0x31));
    }

    #[test]
    fn test_parse_key_rejects_bad_input() {
        let db = KeycodeDb::load().unwrap();
        for input in ["256", "-1", "0x100", "#NOPE", "Q", ""] {
            let err = parse_key(input, &db).unwrap_err();
            assert_eq!(err.exit_code, ExitCode::Validation, "input {input:?}");
        }
    }

    #[test]
    fn test_load_layout_error_kinds() {
        let temp_dir = tempfile::TempDir::new().unwrap();

        let missing = load_layout(&temp_dir.path().join("absent.keylayout")).unwrap_err();
        assert_eq!(missing.exit_code, ExitCode::Io);

        let malformed = temp_dir.path().join("malformed.keylayout");
        std::fs::write(&malformed, "<keyboard><keyMapSet>").unwrap();
        assert_eq!(load_layout(&malformed).unwrap_err().exit_code, ExitCode::Io);

        let bad_code = temp_dir.path().join("bad_code.keylayout");
        std::fs::write(
            &bad_code,
            r#"<keyboard><keyMapSet id="ISO"><keyMap index="0"><key code="300" output="x"/></keyMap></keyMapSet></keyboard>"#,
        )
        .unwrap();
        let err = load_layout(&bad_code).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::Validation);
        assert!(err.message.contains("300"));
    }

    #[test]
    fn test_resolve_error_is_integrity() {
        let err = ResolveError::MalformedReference {
            kind: ReferenceKind::Action,
            id: "gone".to_string(),
        };
        assert_eq!(CliError::from(err.clone()).exit_code, ExitCode::Integrity);

        let wrapped = anyhow::Error::new(err).context("Failed to build legend for key '#1'");
        let cli = CliError::from_anyhow("Legend generation failed", &wrapped);
        assert_eq!(cli.exit_code, ExitCode::Integrity);
        assert!(cli.message.contains("gone"));

        let io = CliError::from_anyhow("Load failed", &anyhow::anyhow!("disk gone"));
        assert_eq!(io.exit_code, ExitCode::Io);
    }
}
