//! Engine configuration: the step sequence and provider settings.
//!
//! Settings are layered with the `config` crate:
//! - Bundled defaults (include_str! from marquee.toml)
//! - User overrides (~/.config/marquee/marquee.toml, then ./marquee.toml)
//! - An explicit file passed by the caller, highest precedence

use crate::EngineResult;
use config::{Config, File, FileFormat};
use derive_getters::Getters;
use marquee_error::{ConfigError, EngineError, EngineErrorKind, MarqueeError, MarqueeResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Scheduler behavior switches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters)]
pub struct SchedulerSettings {
    /// Hold each step until its preferred duration has elapsed.
    ///
    /// Pacing only: a step that signals late is never cut short.
    #[serde(default)]
    honor_preferred_duration: bool,
}

impl SchedulerSettings {
    /// Create settings with an explicit pacing switch.
    pub fn new(honor_preferred_duration: bool) -> Self {
        Self {
            honor_preferred_duration,
        }
    }
}

/// One entry of the step sequence.
///
/// # Example
///
/// ```toml
/// [[steps]]
/// step = "update_cloud"
/// [steps.config]
/// display_count = 25
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct StepDefinition {
    /// Step type, matched against the step registry
    step: String,
    /// Step-specific configuration, decoded by the step factory
    #[serde(default)]
    config: toml::Table,
}

impl StepDefinition {
    /// Create a definition with an empty configuration.
    pub fn new(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            config: toml::Table::new(),
        }
    }

    /// Create a definition with a configuration table.
    pub fn with_config(step: impl Into<String>, config: toml::Table) -> Self {
        Self {
            step: step.into(),
            config,
        }
    }

    /// Decode the configuration into a step's own settings type.
    ///
    /// # Errors
    ///
    /// Returns an error if the table does not match `T`.
    pub fn config_as<T: DeserializeOwned>(&self) -> EngineResult<T> {
        toml::Value::Table(self.config.clone())
            .try_into()
            .map_err(|e| {
                EngineError::new(EngineErrorKind::StepConstruction {
                    step: self.step.clone(),
                    message: format!("invalid configuration: {}", e),
                })
            })
    }
}

/// Settings for one data provider kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct DataProviderSetting {
    /// Provider kind, matched against the provider registry
    kind: String,
    /// Provider-specific configuration, decoded by the factory
    #[serde(default)]
    config: toml::Table,
}

impl DataProviderSetting {
    /// Create a setting with an empty configuration.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            config: toml::Table::new(),
        }
    }

    /// Create a setting with a configuration table.
    pub fn with_config(kind: impl Into<String>, config: toml::Table) -> Self {
        Self {
            kind: kind.into(),
            config,
        }
    }

    /// Decode the configuration into a provider's own settings type.
    ///
    /// # Errors
    ///
    /// Returns an error if the table does not match `T`.
    pub fn config_as<T: DeserializeOwned>(&self) -> EngineResult<T> {
        toml::Value::Table(self.config.clone())
            .try_into()
            .map_err(|e| {
                EngineError::new(EngineErrorKind::ProviderConstruction {
                    kind: self.kind.clone(),
                    message: format!("invalid configuration: {}", e),
                })
            })
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters)]
pub struct EngineSettings {
    /// Scheduler switches
    #[serde(default)]
    engine: SchedulerSettings,
    /// Ordered step sequence
    #[serde(default)]
    steps: Vec<StepDefinition>,
    /// Per-kind provider settings
    #[serde(default)]
    data_providers: Vec<DataProviderSetting>,
}

impl EngineSettings {
    /// Create settings from parts.
    pub fn new(
        engine: SchedulerSettings,
        steps: Vec<StepDefinition>,
        data_providers: Vec<DataProviderSetting>,
    ) -> Self {
        Self {
            engine,
            steps,
            data_providers,
        }
    }

    /// Load configuration with precedence: explicit file > current dir > home dir > bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing or any source fails to parse.
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> MarqueeResult<Self> {
        debug!("Loading engine configuration");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../../../marquee.toml");

        let mut builder = Config::builder()
            // Start with bundled defaults
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        // Add user config from home directory (optional)
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/marquee/marquee.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        // Add user config from current directory (optional)
        builder = builder.add_source(File::with_name("marquee").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .build()
            .map_err(|e| {
                MarqueeError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                MarqueeError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Parse settings from a TOML document without layering.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid settings TOML.
    pub fn from_toml_str(content: &str) -> MarqueeResult<Self> {
        toml::from_str(content).map_err(|e| {
            MarqueeError::from(ConfigError::new(format!(
                "Failed to parse configuration: {}",
                e
            )))
        })
    }

    /// Settings for a provider kind, if configured.
    pub fn provider_setting(&self, kind: &str) -> Option<&DataProviderSetting> {
        self.data_providers.iter().find(|s| s.kind == kind)
    }
}
