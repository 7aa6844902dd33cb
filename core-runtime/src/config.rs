//! # Runtime Configuration Module
//!
//! Provides configuration management for the AAC decoder plugin.
//!
//! ## Overview
//!
//! Two layers of configuration exist:
//!
//! - [`DecoderSettings`] - plain, serializable knobs applied to every decode
//!   session (consumption policy, output bounds, deferred configuration).
//! - [`RuntimeConfig`] - the process-wide configuration handed to the plugin
//!   entry point. It carries the host's [`PlatformApi`] handle, which is
//!   required, plus optional decoder settings and logging configuration.
//!
//! The builder enforces fail-fast validation so a plugin is never loaded
//! without the platform services it needs.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{DecoderSettings, RuntimeConfig};
//! use std::sync::Arc;
//!
//! let config = RuntimeConfig::builder()
//!     .platform(Arc::new(MyPlatform))
//!     .decoder_settings(DecoderSettings::default())
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::RuntimeConfig;
//!
//! // Panics with an actionable error message: no PlatformApi provided
//! let config = RuntimeConfig::builder()
//!     .build()
//!     .expect("Should fail - missing platform handle");
//! ```

use crate::error::{Error, Result};
use crate::logging::LoggingConfig;
use bridge_traits::PlatformApi;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Largest per-call sample count accepted from the engine: 8 channels of
/// 2048-sample (SBR) frames, with headroom.
const MAX_OUTPUT_SAMPLES_LIMIT: usize = 1 << 20;

/// How the decoder treats an engine that does not consume a whole input unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumptionPolicy {
    /// Log partial consumption and continue.
    #[default]
    Lenient,
    /// Fail the decode call when the engine leaves input unconsumed.
    Strict,
}

/// Settings applied to every decode session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderSettings {
    /// Behaviour when an access unit is only partially consumed.
    ///
    /// Default: [`ConsumptionPolicy::Lenient`].
    #[serde(default)]
    pub consumption_policy: ConsumptionPolicy,

    /// Upper bound on the engine-reported sample count for one access unit
    /// (all channels together). Larger reports fail the call.
    ///
    /// Default: 65536 samples.
    #[serde(default = "default_max_output_samples")]
    pub max_output_samples: usize,

    /// Accept zero-length decoder-specific configuration and derive the stream
    /// parameters from the first access unit.
    ///
    /// Default: true.
    #[serde(default = "default_allow_deferred_config")]
    pub allow_deferred_config: bool,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            consumption_policy: ConsumptionPolicy::default(),
            max_output_samples: default_max_output_samples(),
            allow_deferred_config: default_allow_deferred_config(),
        }
    }
}

impl DecoderSettings {
    /// Parse settings from a JSON document. Missing fields take their defaults.
    pub fn from_json(document: &str) -> Result<Self> {
        let settings: DecoderSettings = serde_json::from_str(document)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Strict settings: reject partial consumption and deferred configuration.
    pub fn strict() -> Self {
        Self {
            consumption_policy: ConsumptionPolicy::Strict,
            allow_deferred_config: false,
            ..Default::default()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.max_output_samples == 0 {
            return Err(Error::Config("max_output_samples must be > 0".to_string()));
        }

        if self.max_output_samples > MAX_OUTPUT_SAMPLES_LIMIT {
            return Err(Error::Config(format!(
                "max_output_samples exceeds maximum of {}",
                MAX_OUTPUT_SAMPLES_LIMIT
            )));
        }

        Ok(())
    }
}

fn default_max_output_samples() -> usize {
    65536
}

fn default_allow_deferred_config() -> bool {
    true
}

/// Process-wide configuration handed to the plugin at load time.
///
/// Use [`RuntimeConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Platform services supplied by the host (required)
    pub platform: Arc<dyn PlatformApi>,

    /// Settings applied to every decode session
    pub decoder: DecoderSettings,

    /// Logging setup; `None` leaves any existing subscriber in place
    pub logging: Option<LoggingConfig>,
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("platform", &"PlatformApi { ... }")
            .field("platform_version", &self.platform.version())
            .field("decoder", &self.decoder)
            .field("logging", &self.logging.as_ref().map(|l| l.format))
            .finish()
    }
}

impl RuntimeConfig {
    /// Creates a new builder for constructing a `RuntimeConfig`.
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.decoder.validate()
    }
}

fn platform_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "PlatformApi".to_string(),
        message: "PlatformApi implementation is required to load the decoder plugin. \
                 Hosts must pass their platform services to plugin initialisation; \
                 tests can use a stub that only reports a version."
            .to_string(),
    }
}

/// Builder for constructing [`RuntimeConfig`] instances.
#[derive(Default)]
pub struct RuntimeConfigBuilder {
    platform: Option<Arc<dyn PlatformApi>>,
    decoder: Option<DecoderSettings>,
    logging: Option<LoggingConfig>,
}

impl RuntimeConfigBuilder {
    /// Sets the platform services (required).
    pub fn platform(mut self, platform: Arc<dyn PlatformApi>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Sets the decoder settings.
    ///
    /// Default: [`DecoderSettings::default()`]
    pub fn decoder_settings(mut self, settings: DecoderSettings) -> Self {
        self.decoder = Some(settings);
        self
    }

    /// Sets the logging configuration applied when the plugin loads.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds the final `RuntimeConfig` instance.
    ///
    /// Returns an error if the platform handle is missing or the decoder
    /// settings are invalid.
    pub fn build(self) -> Result<RuntimeConfig> {
        let platform = self.platform.ok_or_else(platform_missing_error)?;

        let config = RuntimeConfig {
            platform,
            decoder: self.decoder.unwrap_or_default(),
            logging: self.logging,
        };

        config.validate()?;

        Ok(config)
    }
}
