//! Declarative run settings.
//!
//! A settings file names the problem, the context radius (`-1` infers a
//! side), the identity/forbidden/ignored symbols and, in Inference mode,
//! the raw generation strings. Files are TOML unless the extension is
//! `.json`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Result alias for settings operations.
pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

/// Where the evidence comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Derive the evidence from a registered problem named by `name`.
    #[default]
    Experiment,
    /// Use the raw `strings` as evidence.
    Inference,
}

/// Settings for one inference run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Problem name (Experiment mode) or a label for the run.
    pub name: String,
    #[serde(default)]
    pub mode: Mode,
    /// Left context radius; `-1` infers it.
    #[serde(default = "default_radius")]
    pub k: i32,
    /// Right context radius; `-1` infers it.
    #[serde(default = "default_radius")]
    pub l: i32,
    #[serde(default)]
    pub identities: Vec<String>,
    /// Symbols that end a context window.
    #[serde(default = "default_forbidden")]
    pub forbidden: Vec<String>,
    /// Symbols skipped by context windows.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Lower bound on every successor's length.
    #[serde(default)]
    pub absolute_min_length: u64,
    /// Generation strings (Inference mode).
    #[serde(default)]
    pub strings: Vec<String>,
    /// Safety cap on refinement passes.
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
}

fn default_radius() -> i32 {
    -1
}
fn default_forbidden() -> Vec<String> {
    vec!["[".into(), "]".into()]
}
fn default_max_passes() -> usize {
    64
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: "CantorDust".into(),
            mode: Mode::default(),
            k: default_radius(),
            l: default_radius(),
            identities: Vec::new(),
            forbidden: default_forbidden(),
            ignore: Vec::new(),
            absolute_min_length: 0,
            strings: Vec::new(),
            max_passes: default_max_passes(),
        }
    }
}

impl Settings {
    /// Inference settings over raw strings with both radii inferred.
    pub fn inference<I, S>(name: &str, strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            mode: Mode::Inference,
            strings: strings.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Experiment settings for a registered problem.
    pub fn experiment(problem: &str) -> Self {
        Self {
            name: problem.to_string(),
            ..Default::default()
        }
    }

    /// Left radius, `None` when it is to be inferred.
    pub fn left_radius(&self) -> Option<usize> {
        usize::try_from(self.k).ok()
    }

    /// Right radius, `None` when it is to be inferred.
    pub fn right_radius(&self) -> Option<usize> {
        usize::try_from(self.l).ok()
    }

    /// Reject settings no run could use.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.k < -1 || self.l < -1 {
            return Err(SettingsError::Invalid {
                message: format!(
                    "k and l must be -1 (infer) or non-negative, got k={} l={}",
                    self.k, self.l
                ),
            });
        }
        if self.mode == Mode::Inference && self.strings.len() < 2 {
            return Err(SettingsError::Invalid {
                message: "Inference mode needs at least two generation strings in `strings`".into(),
            });
        }
        if self.max_passes == 0 {
            return Err(SettingsError::Invalid {
                message: "max_passes must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Load and validate a settings file.
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let settings: Settings = if is_json(path) {
            serde_json::from_str(&content).map_err(|e| SettingsError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            toml::from_str(&content).map_err(|e| SettingsError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        };
        settings.validate()?;
        tracing::debug!(
            path = %path.display(),
            name = %settings.name,
            mode = ?settings.mode,
            "settings loaded"
        );
        Ok(settings)
    }

    /// Save in the format implied by the extension.
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            toml::to_string_pretty(self).map_err(|e| SettingsError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        };
        std::fs::write(path, content).map_err(|e| SettingsError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_takes_defaults() {
        let settings: Settings = toml::from_str(r#"name = "DragonCurve""#).unwrap();
        assert_eq!(settings.mode, Mode::Experiment);
        assert_eq!((settings.k, settings.l), (-1, -1));
        assert_eq!(settings.forbidden, vec!["[", "]"]);
        assert_eq!(settings.max_passes, 64);
        assert_eq!(settings.left_radius(), None);
        settings.validate().unwrap();
    }

    #[test]
    fn inference_needs_strings() {
        let settings = Settings::inference("empty", Vec::<String>::new());
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid { .. })));
        let settings = Settings::inference("cantor", ["ABA", "ABABBBABA"]);
        settings.validate().unwrap();
    }

    #[test]
    fn radius_below_minus_one_is_rejected() {
        let settings = Settings {
            k: -2,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
        let settings = Settings {
            k: 0,
            l: 2,
            ..Settings::default()
        };
        assert_eq!(settings.left_radius(), Some(0));
        assert_eq!(settings.right_radius(), Some(2));
    }

    #[test]
    fn toml_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("run.toml");
        let settings = Settings {
            k: 0,
            l: 0,
            identities: vec!["F".into(), "+".into()],
            ..Settings::inference("dragon", ["X+YF+", "X+YF++-FX-YF+"])
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn json_by_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("run.json");
        let json = r#"{"name": "CantorDust", "mode": "Experiment", "k": 0, "l": 0}"#;
        std::fs::write(&path, json).unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.right_radius(), Some(0));
    }

    #[test]
    fn unreadable_and_malformed_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            Settings::load(&tmp.path().join("missing.toml")),
            Err(SettingsError::Io { .. })
        ));
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "name = ").unwrap();
        assert!(matches!(Settings::load(&path), Err(SettingsError::Parse { .. })));
    }
}
