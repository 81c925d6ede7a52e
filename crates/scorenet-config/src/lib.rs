//! Configuration for scorenet networks.
//!
//! Controls node sharing, assertion modes, justification recording and
//! per-constraint weight overrides without code changes.
//!
//! # Examples
//!
//! ```
//! use scorenet_config::{EnvironmentMode, NetworkConfig};
//! use scorenet_core::HardSoftScore;
//!
//! let config = NetworkConfig::from_toml_str(r#"
//!     environment_mode = "full_assert"
//!     justifications = true
//!
//!     [constraint_weights]
//!     "Room conflict" = "2hard/0soft"
//! "#).unwrap();
//!
//! assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
//! assert!(config.node_sharing);
//! assert_eq!(
//!     config.weight_for::<HardSoftScore>("Room conflict").unwrap(),
//!     Some(HardSoftScore::of(2, 0))
//! );
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use scorenet_config::NetworkConfig;
//!
//! let config = NetworkConfig::load("scorenet.toml").unwrap_or_default();
//! assert!(config.node_sharing);
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use scorenet_core::{ParseableScore, ScoreNetError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a configuration could not be loaded or used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for ScoreNetError {
    fn from(err: ConfigError) -> Self {
        ScoreNetError::Config(err.to_string())
    }
}

/// Settings read once, when a network template is built.
///
/// Every field may be omitted from a document; missing fields take the
/// values of [`NetworkConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub environment_mode: EnvironmentMode,

    /// Merge structurally identical nodes of different constraints.
    pub node_sharing: bool,

    /// Record per-match justifications in score explanations.
    pub justifications: bool,

    /// Full constraint name to weight, e.g. `"rooms/Conflict" = "1hard/0soft"`.
    pub constraint_weights: BTreeMap<String, String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            environment_mode: EnvironmentMode::Reproducible,
            node_sharing: true,
            justifications: false,
            constraint_weights: BTreeMap::new(),
        }
    }
}

/// Document formats a configuration can be written in.
#[derive(Debug, Clone, Copy)]
enum Format {
    Toml,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Format::Yaml,
            _ => Format::Toml,
        }
    }

    fn parse(self, text: &str) -> Result<NetworkConfig, ConfigError> {
        Ok(match self {
            Format::Toml => toml::from_str(text)?,
            Format::Yaml => serde_yaml::from_str(text)?,
        })
    }
}

impl NetworkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a file, as YAML for `.yaml`/`.yml` and as TOML otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Format::of(path).parse(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Format::Toml.parse(text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Format::Yaml.parse(text)
    }

    pub fn with_node_sharing(mut self, enabled: bool) -> Self {
        self.node_sharing = enabled;
        self
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_justifications(mut self, enabled: bool) -> Self {
        self.justifications = enabled;
        self
    }

    /// Sets the weight string of one constraint by full name.
    pub fn with_constraint_weight(mut self, constraint: impl Into<String>, weight: impl Into<String>) -> Self {
        self.constraint_weights.insert(constraint.into(), weight.into());
        self
    }

    /// The configured weight of `constraint`, parsed as `Sc`.
    ///
    /// `Ok(None)` when nothing is configured for it; [`ConfigError::Invalid`]
    /// naming the constraint when the string does not parse.
    pub fn weight_for<Sc: ParseableScore>(&self, constraint: &str) -> Result<Option<Sc>, ConfigError> {
        let Some(raw) = self.constraint_weights.get(constraint) else {
            return Ok(None);
        };
        Sc::parse(raw)
            .map(Some)
            .map_err(|e| ConfigError::Invalid(format!("weight '{raw}' of constraint '{constraint}': {e}")))
    }
}

/// How much a session checks itself after computing a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    #[default]
    Reproducible,

    /// Re-sum every constraint from its recorded matches.
    FastAssert,

    /// `FastAssert`, plus a from-scratch session over the same facts whose
    /// score must equal the incremental one.
    FullAssert,
}

impl EnvironmentMode {
    pub fn is_asserted(self) -> bool {
        self != EnvironmentMode::Reproducible
    }

    pub fn is_fully_asserted(self) -> bool {
        self == EnvironmentMode::FullAssert
    }
}
