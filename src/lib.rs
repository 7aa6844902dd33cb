//! Workspace facade crate.
//!
//! Re-exports the decoder adapter and its host-facing contracts so a host can
//! depend on `aac-bridge-workspace` alone and pick features:
//!
//! - `engine-symphonia` (default): built-in AAC engine
//! - `desktop-shims` (default): heap-backed host services for native hosts

pub use bridge_traits;
pub use core_decoder;
pub use core_runtime;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;

pub use core_decoder::plugin::{
    is_initialized, plugin_get_api, plugin_init, plugin_init_with_engine, plugin_shutdown,
};
pub use core_decoder::{AudioDecoderApi, HostContext, AUDIO_DECODER_CAPABILITY};
