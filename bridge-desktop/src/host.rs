//! Heap-backed Audio Host

use bridge_traits::{
    error::{BridgeError, Result},
    AudioHost, AudioSamples, EncodedUnit, SampleFormat,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace, warn};

/// [`AudioHost`] allocating sample buffers on the heap.
///
/// Tracks the buffers it has handed out. With [`HeapAudioHost::with_limit`]
/// allocation fails once `limit` buffers are outstanding, which lets embedders
/// bound memory and lets tests exercise allocation failure. Buffers become
/// available again through [`HeapAudioHost::recycle`].
///
/// Every released encoded unit is recorded by timestamp.
#[derive(Debug, Default)]
pub struct HeapAudioHost {
    limit: Option<usize>,
    outstanding: AtomicUsize,
    allocated: AtomicUsize,
    released: Mutex<Vec<u64>>,
}

impl HeapAudioHost {
    /// Create a host without an allocation limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host that allows at most `limit` outstanding buffers.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Return a buffer previously handed out by this host.
    ///
    /// Returns `false` if no buffer was outstanding; the call is then ignored.
    pub fn recycle(&self, samples: AudioSamples) -> bool {
        trace!(bytes = samples.size(), "Recycling sample buffer");
        self.outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map_err(|_| warn!("Recycled a sample buffer with none outstanding"))
            .is_ok()
    }

    /// Buffers handed out and not yet recycled.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Total buffers handed out since creation.
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::SeqCst)
    }

    /// Number of encoded units returned by the decoder.
    pub fn released_count(&self) -> usize {
        self.released.lock().len()
    }

    /// Timestamps of the returned encoded units, in release order.
    pub fn released_timestamps(&self) -> Vec<u64> {
        self.released.lock().clone()
    }
}

impl AudioHost for HeapAudioHost {
    fn create_samples(&self, format: SampleFormat) -> Result<AudioSamples> {
        let limit = self.limit.unwrap_or(usize::MAX);
        self.outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < limit).then_some(n + 1)
            })
            .map_err(|n| {
                debug!(outstanding = n, limit, "Sample buffer limit reached");
                BridgeError::AllocationFailed(format!("{} buffers outstanding", n))
            })?;

        self.allocated.fetch_add(1, Ordering::SeqCst);
        Ok(AudioSamples::new(format))
    }

    fn release_samples(&self, unit: EncodedUnit) {
        trace!(timestamp = unit.timestamp(), len = unit.len(), "Encoded unit released");
        self.released.lock().push(unit.timestamp());
    }
}
