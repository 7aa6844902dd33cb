//! # Capability Registry
//!
//! Maps capability names requested by the host to session constructors.
//! The plugin registers a single capability, [`AUDIO_DECODER_CAPABILITY`].

use crate::engine::EngineFactory;
use crate::error::{DecoderError, Result};
use crate::session::{AudioDecoderApi, DecodeSession};
use bridge_traits::{AudioDecoderCallback, AudioHost};
use core_runtime::config::DecoderSettings;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Capability name under which the AAC decoder is registered.
pub const AUDIO_DECODER_CAPABILITY: &str = "decode-audio";

/// Host services bound to one session: the buffer factory and the callback
/// sink. The sink is held weakly; the host owns it.
#[derive(Clone)]
pub struct HostContext {
    pub host: Arc<dyn AudioHost>,
    pub callback: Weak<dyn AudioDecoderCallback>,
}

impl HostContext {
    pub fn new(host: Arc<dyn AudioHost>, callback: &Arc<dyn AudioDecoderCallback>) -> Self {
        Self {
            host,
            callback: Arc::downgrade(callback),
        }
    }
}

/// Everything a session captures at creation time.
#[derive(Clone)]
pub struct SessionResources {
    pub engines: Arc<dyn EngineFactory>,
    pub settings: DecoderSettings,
}

/// Session constructor stored in the registry.
pub type SessionConstructor = fn(HostContext, &SessionResources) -> Box<dyn AudioDecoderApi>;

/// Registry of capabilities this plugin can serve.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    entries: HashMap<&'static str, SessionConstructor>,
}

impl CapabilityRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the AAC decoder capability.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(AUDIO_DECODER_CAPABILITY, create_decode_session);
        registry
    }

    pub fn register(&mut self, name: &'static str, constructor: SessionConstructor) {
        debug!(capability = name, "Registering capability");
        self.entries.insert(name, constructor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered capability names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Construct a session for `name`.
    ///
    /// # Errors
    ///
    /// [`DecoderError::UnknownCapability`] if `name` is not registered. No
    /// session is created in that case.
    pub fn create(
        &self,
        name: &str,
        context: HostContext,
        resources: &SessionResources,
    ) -> Result<Box<dyn AudioDecoderApi>> {
        let constructor = self
            .entries
            .get(name)
            .ok_or_else(|| DecoderError::UnknownCapability(name.to_string()))?;

        Ok(constructor(context, resources))
    }
}

fn create_decode_session(
    context: HostContext,
    resources: &SessionResources,
) -> Box<dyn AudioDecoderApi> {
    Box::new(DecodeSession::new(
        context,
        Arc::clone(&resources.engines),
        resources.settings.clone(),
    ))
}
