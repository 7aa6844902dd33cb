//! # Frame Pipeline
//!
//! Turns one encoded access unit into at most one PCM buffer.
//!
//! ```text
//! EncodedUnit ──► engine.decode_one ──► validate ──► host.create_samples ──► copy PCM
//! ```
//!
//! The pipeline never notifies the callback and never releases the input; the
//! session owns notification order.

use crate::engine::{DecodedFrame, DecodingEngine};
use crate::error::{DecoderError, Result};
use bridge_traits::{AudioHost, AudioSamples, EncodedUnit, SampleFormat};
use core_runtime::config::{ConsumptionPolicy, DecoderSettings};
use std::mem;
use tracing::{trace, warn};

/// Size in bytes of the PCM16 buffer holding `sample_count` samples (all
/// channels together).
pub fn output_size_bytes(sample_count: usize) -> usize {
    sample_count * mem::size_of::<i16>()
}

/// Per-call decode step shared by every session.
pub struct FramePipeline<'a> {
    host: &'a dyn AudioHost,
    settings: &'a DecoderSettings,
}

impl<'a> FramePipeline<'a> {
    pub fn new(host: &'a dyn AudioHost, settings: &'a DecoderSettings) -> Self {
        Self { host, settings }
    }

    /// Decode `unit` with `engine`.
    ///
    /// Returns `Ok(None)` when the engine produced no samples (priming), and
    /// `Ok(Some(samples))` with a PCM16 buffer of exactly
    /// [`output_size_bytes`]`(n)` bytes otherwise.
    pub fn run(
        &self,
        engine: &mut dyn DecodingEngine,
        unit: &EncodedUnit,
    ) -> Result<Option<AudioSamples>> {
        let frame = engine.decode_one(unit.data())?;

        self.check_consumption(&frame, unit.len())?;

        if frame.sample_count == 0 {
            trace!(timestamp = unit.timestamp(), "Engine produced no samples");
            return Ok(None);
        }

        self.validate(&frame)?;

        let mut samples = self
            .host
            .create_samples(SampleFormat::Pcm16)
            .map_err(DecoderError::BufferAllocation)?;

        let pcm = &frame.pcm[..frame.sample_count];
        samples.set_buffer_size(output_size_bytes(pcm.len()));
        for (dst, sample) in samples.buffer_mut().chunks_exact_mut(2).zip(pcm) {
            dst.copy_from_slice(&sample.to_ne_bytes());
        }

        samples.set_timestamp(unit.timestamp());
        samples.set_channels(frame.channels);
        samples.set_sample_rate(frame.sample_rate);

        trace!(
            samples = frame.sample_count,
            bytes = samples.size(),
            timestamp = unit.timestamp(),
            "Decoded frame"
        );

        Ok(Some(samples))
    }

    fn check_consumption(&self, frame: &DecodedFrame<'_>, available: usize) -> Result<()> {
        if frame.bytes_consumed >= available {
            return Ok(());
        }

        match self.settings.consumption_policy {
            ConsumptionPolicy::Strict => Err(DecoderError::PartialConsumption {
                consumed: frame.bytes_consumed,
                available,
            }),
            ConsumptionPolicy::Lenient => {
                warn!(
                    consumed = frame.bytes_consumed,
                    available, "Engine did not consume the whole access unit"
                );
                Ok(())
            }
        }
    }

    fn validate(&self, frame: &DecodedFrame<'_>) -> Result<()> {
        let n = frame.sample_count;

        if n > self.settings.max_output_samples {
            return Err(DecoderError::InvalidFrame(format!(
                "{} samples exceeds limit of {}",
                n, self.settings.max_output_samples
            )));
        }

        if frame.channels == 0 {
            return Err(DecoderError::InvalidFrame(
                "samples reported without a channel count".to_string(),
            ));
        }

        if n % frame.channels as usize != 0 {
            return Err(DecoderError::InvalidFrame(format!(
                "{} samples do not divide into {} channels",
                n, frame.channels
            )));
        }

        if frame.pcm.len() < n {
            return Err(DecoderError::InvalidFrame(format!(
                "engine reported {} samples but produced {}",
                n,
                frame.pcm.len()
            )));
        }

        Ok(())
    }
}
