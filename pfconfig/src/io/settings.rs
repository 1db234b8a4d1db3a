//! Settings for reaching the appliance interpreter, stored as TOML.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::script::DEFAULT_INCLUDES;

/// Default location of `php-cgi` on the appliance.
pub const DEFAULT_INTERPRETER: &str = "/usr/local/bin/php-cgi";

/// Interpreter settings (TOML).
///
/// Missing fields default to the stock appliance layout. The values are read
/// once at startup and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Interpreter executable, spawned with no arguments.
    pub interpreter: PathBuf,

    /// Kill the interpreter after this many seconds. `0` waits indefinitely.
    pub timeout_secs: u64,

    /// Discard stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,

    /// Include files required by every generated script.
    pub includes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            timeout_secs: 120,
            output_limit_bytes: 16 * 1024 * 1024,
            includes: DEFAULT_INCLUDES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.interpreter.as_os_str().is_empty() {
            return Err(anyhow!("interpreter must be a non-empty path"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.includes.iter().any(|inc| inc.trim().is_empty()) {
            return Err(anyhow!("includes must not contain blank entries"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Load settings from a TOML file.
///
/// If the file is missing, returns `Settings::default()`.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        let settings = Settings::default();
        settings.validate()?;
        return Ok(settings);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let settings: Settings =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    settings
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let settings = load_settings(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("pfconfig.toml");
        fs::write(&path, "interpreter = \"/opt/php-cgi\"\ntimeout_secs = 0\n").expect("write");

        let settings = load_settings(&path).expect("load");
        assert_eq!(settings.interpreter, PathBuf::from("/opt/php-cgi"));
        assert_eq!(settings.timeout(), None);
        assert_eq!(settings.includes, Settings::default().includes);
    }

    #[test]
    fn zero_output_limit_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("pfconfig.toml");
        fs::write(&path, "output_limit_bytes = 0\n").expect("write");

        let err = load_settings(&path).expect_err("invalid");
        assert!(format!("{err:#}").contains("output_limit_bytes must be > 0"));
    }

    #[test]
    fn blank_include_is_rejected() {
        let settings = Settings {
            includes: vec!["config.inc".to_string(), " ".to_string()],
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
