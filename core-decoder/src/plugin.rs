//! # Plugin Entry Points
//!
//! Process-wide state shared by every session the plugin creates.
//!
//! ```text
//! plugin_init ──► plugin_get_api("decode-audio", ctx)* ──► plugin_shutdown
//! ```
//!
//! The state holds the host's platform handle, the engine factory and the
//! decoder settings. It is read only while a session is being created; each
//! session captures what it needs, so the decode path never touches it.

use crate::engine::{default_engine_factory, EngineFactory};
use crate::error::{DecoderError, Result};
use crate::registry::{CapabilityRegistry, HostContext, SessionResources};
use crate::session::AudioDecoderApi;
use bridge_traits::PlatformApi;
use core_runtime::config::RuntimeConfig;
use core_runtime::logging::init_logging;
use parking_lot::{const_rwlock, RwLock};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

struct PluginState {
    platform: Arc<dyn PlatformApi>,
    resources: SessionResources,
    registry: CapabilityRegistry,
}

static PLUGIN: RwLock<Option<PluginState>> = const_rwlock(None);

/// Load the plugin with the built-in engine.
///
/// # Errors
///
/// - [`DecoderError::PluginAlreadyInitialized`] if called twice without
///   [`plugin_shutdown`]
/// - [`DecoderError::Config`] if the configuration is invalid or the crate
///   was built without an engine
pub fn plugin_init(config: RuntimeConfig) -> Result<()> {
    let engines = default_engine_factory().ok_or_else(|| {
        DecoderError::Config(core_runtime::Error::CapabilityMissing {
            capability: "DecodingEngine".to_string(),
            message: "built without the `engine-symphonia` feature; \
                      use plugin_init_with_engine to supply an engine"
                .to_string(),
        })
    })?;

    plugin_init_with_engine(config, engines)
}

/// Load the plugin with a host-supplied engine factory.
#[instrument(skip_all, fields(engine = engines.name()))]
pub fn plugin_init_with_engine(
    config: RuntimeConfig,
    engines: Arc<dyn EngineFactory>,
) -> Result<()> {
    config.validate()?;

    let logging = config.logging.clone().map(|logging| {
        match (logging.logger_sink.is_none(), config.platform.logger_sink()) {
            (true, Some(sink)) => logging.with_logger_sink(sink),
            _ => logging,
        }
    });
    let platform_version = config.platform.version();
    let settings = config.decoder.clone();
    let registry = CapabilityRegistry::with_defaults();

    {
        let mut slot = PLUGIN.write();
        if slot.is_some() {
            return Err(DecoderError::PluginAlreadyInitialized);
        }

        *slot = Some(PluginState {
            platform: config.platform,
            resources: SessionResources {
                engines,
                settings: config.decoder,
            },
            registry,
        });
    }

    // Log only with the lock released: the sink is host code and may call
    // back into the plugin
    if let Some(logging) = logging {
        if let Err(e) = init_logging(logging) {
            warn!(error = %e, "Keeping existing log subscriber");
        }
    }

    info!(platform_version, ?settings, "Decoder plugin initialized");

    Ok(())
}

/// Create a session for the named capability.
///
/// # Errors
///
/// - [`DecoderError::PluginNotInitialized`] before [`plugin_init`]
/// - [`DecoderError::UnknownCapability`] for any name other than
///   [`AUDIO_DECODER_CAPABILITY`](crate::registry::AUDIO_DECODER_CAPABILITY)
pub fn plugin_get_api(name: &str, context: HostContext) -> Result<Box<dyn AudioDecoderApi>> {
    let (registry, resources, platform) = {
        let guard = PLUGIN.read();
        let state = guard.as_ref().ok_or(DecoderError::PluginNotInitialized)?;
        (
            state.registry.clone(),
            state.resources.clone(),
            Arc::clone(&state.platform),
        )
    };

    debug!(
        capability = name,
        platform_version = platform.version(),
        "Capability requested"
    );
    registry.create(name, context, &resources)
}

/// Unload the plugin. Sessions already handed out keep working.
pub fn plugin_shutdown() {
    let previous = PLUGIN.write().take();
    if previous.is_some() {
        info!("Decoder plugin shut down");
    }
}

/// Returns `true` between [`plugin_init`] and [`plugin_shutdown`].
pub fn is_initialized() -> bool {
    PLUGIN.read().is_some()
}
