//! Defaults file
//!
//! Optional on-disk defaults layered under explicit CLI values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Defaults file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &["./ofregress.yaml", "./ofregress.yml", "./.ofregress.yaml"];

/// Values a defaults file may carry; every field is optional and any
/// explicit CLI value wins over it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileDefaults {
    #[serde(default)]
    pub compiler: Option<String>,

    #[serde(default)]
    pub system: Option<String>,

    #[serde(default)]
    pub tolerance: Option<f64>,

    #[serde(default)]
    pub plot: Option<u8>,

    #[serde(default)]
    pub jobs: Option<i64>,
}

impl FileDefaults {
    /// Load defaults from a YAML or JSON file, dispatching on extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read defaults file {}", path.display()))?;

        let defaults: Self = if path
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false)
        {
            serde_yaml::from_str(&content).context("Failed to parse YAML defaults")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON defaults")?
        };

        debug!("loaded defaults from {}", path.display());
        Ok(defaults)
    }

    /// Load the first defaults file found in the standard locations, or the
    /// built-in defaults when none exists.
    pub fn discover() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_yaml_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ofregress.yaml");
        fs::write(&path, "tolerance: 1e-4\njobs: 2\n").unwrap();

        let defaults = FileDefaults::load(&path).unwrap();
        assert_eq!(defaults.tolerance, Some(1e-4));
        assert_eq!(defaults.jobs, Some(2));
        assert_eq!(defaults.compiler, None);
    }

    #[test]
    fn load_json_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ofregress.json");
        fs::write(&path, r#"{"compiler": "intel", "plot": 2}"#).unwrap();

        let defaults = FileDefaults::load(&path).unwrap();
        assert_eq!(defaults.compiler.as_deref(), Some("intel"));
        assert_eq!(defaults.plot, Some(2));
    }

    #[test]
    fn malformed_defaults_are_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ofregress.yaml");
        fs::write(&path, "tolerance: [not a number").unwrap();
        assert!(FileDefaults::load(&path).is_err());
    }
}
