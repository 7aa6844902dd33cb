//! Host services consumed by the decoder.

use crate::{
    audio::{AudioSamples, EncodedUnit, SampleFormat},
    error::Result,
    log::LoggerSink,
    platform::PlatformSendSync,
};
use std::sync::Arc;

/// Per-session host services: output buffer allocation and input release.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::host::AudioHost;
///
/// fn allocate(host: &dyn AudioHost) -> bridge_traits::error::Result<()> {
///     let mut samples = host.create_samples(SampleFormat::Pcm16)?;
///     samples.set_buffer_size(4096);
///     Ok(())
/// }
/// ```
pub trait AudioHost: PlatformSendSync {
    /// Allocate an empty sample buffer of the given format.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::AllocationFailed`](crate::error::BridgeError::AllocationFailed)
    /// when the host cannot provide a buffer.
    fn create_samples(&self, format: SampleFormat) -> Result<AudioSamples>;

    /// Return an encoded unit to the host once the decoder is done with it.
    fn release_samples(&self, unit: EncodedUnit);
}

/// Process-wide platform services handed to the plugin when it is loaded.
///
/// The decoder only consults the platform while registering sessions, never
/// from the per-frame decode path.
pub trait PlatformApi: PlatformSendSync {
    /// Host API version, used for diagnostics.
    fn version(&self) -> u32;

    /// Optional sink mirroring decoder logs into the host's log pipeline.
    fn logger_sink(&self) -> Option<Arc<dyn LoggerSink>> {
        None
    }
}
