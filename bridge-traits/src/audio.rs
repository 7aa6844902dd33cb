//! Audio unit types exchanged between the host media pipeline and the decoder.
//!
//! The host delivers one [`EncodedUnit`] per decode call and receives at most
//! one [`AudioSamples`] buffer back. Output buffers are always allocated by the
//! host through [`AudioHost::create_samples`](crate::host::AudioHost::create_samples),
//! populated by the decoder and then handed back through the callback sink.

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};

/// Codec identifier carried in the codec settings at session initialisation.
///
/// Only [`AudioCodecType::Aac`] is accepted by the decoder; the remaining
/// variants exist so hosts can describe what they tried to open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodecType {
    /// MPEG-4 Advanced Audio Coding (AAC-LC and compatible profiles)
    Aac,
    /// Vorbis, never decoded by this adapter
    Vorbis,
    /// Codec is not known to the host
    Unknown,
    /// Vendor- or platform-specific codec tag
    Other(String),
}

/// Format tag attached to every sample buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleFormat {
    /// Opaque encoded access unit
    Encoded,
    /// Interleaved signed 16-bit PCM
    Pcm16,
}

impl SampleFormat {
    /// Size of one sample in bytes, `None` for encoded data.
    pub fn bytes_per_sample(&self) -> Option<usize> {
        match self {
            SampleFormat::Encoded => None,
            SampleFormat::Pcm16 => Some(std::mem::size_of::<i16>()),
        }
    }
}

/// Codec configuration supplied by the host when a session is initialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecSettings {
    /// Codec identifier
    pub codec: AudioCodecType,
    /// Decoder-specific configuration (for AAC, the AudioSpecificConfig from
    /// the elementary stream descriptor). May be empty.
    pub extra_data: Bytes,
}

impl CodecSettings {
    /// Create codec settings from a codec tag and its configuration bytes.
    pub fn new(codec: AudioCodecType, extra_data: impl Into<Bytes>) -> Self {
        Self {
            codec,
            extra_data: extra_data.into(),
        }
    }

    /// AAC settings with the given AudioSpecificConfig.
    pub fn aac(extra_data: impl Into<Bytes>) -> Self {
        Self::new(AudioCodecType::Aac, extra_data)
    }

    /// Returns `true` if decoder-specific configuration was supplied.
    pub fn has_extra_data(&self) -> bool {
        !self.extra_data.is_empty()
    }
}

/// A single encoded access unit delivered by the host.
///
/// The decoder borrows the payload for the duration of one decode call and
/// returns the unit to the host exactly once through
/// [`AudioHost::release_samples`](crate::host::AudioHost::release_samples).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedUnit {
    format: SampleFormat,
    data: Bytes,
    timestamp: u64,
}

impl EncodedUnit {
    /// Create an encoded unit carrying `data` presented at `timestamp`.
    pub fn new(data: impl Into<Bytes>, timestamp: u64) -> Self {
        Self {
            format: SampleFormat::Encoded,
            data: data.into(),
            timestamp,
        }
    }

    /// Override the format tag. Only used by hosts (and tests) that need to
    /// exercise contract violations.
    pub fn with_format(mut self, format: SampleFormat) -> Self {
        self.format = format;
        self
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Presentation timestamp in host units (microseconds for most hosts).
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// A host-allocated sample buffer populated by the decoder.
///
/// Mirrors the host's sample object: the buffer starts empty and the decoder
/// sizes it with [`AudioSamples::set_buffer_size`] before writing into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSamples {
    format: SampleFormat,
    buffer: BytesMut,
    timestamp: u64,
    channels: u8,
    sample_rate: u32,
}

impl AudioSamples {
    /// Create an empty buffer of the given format.
    pub fn new(format: SampleFormat) -> Self {
        Self::with_capacity(format, 0)
    }

    /// Create an empty buffer with `capacity` bytes preallocated.
    pub fn with_capacity(format: SampleFormat, capacity: usize) -> Self {
        Self {
            format,
            buffer: BytesMut::with_capacity(capacity),
            timestamp: 0,
            channels: 0,
            sample_rate: 0,
        }
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Resize the buffer to exactly `len` bytes, zero-filling new space.
    pub fn set_buffer_size(&mut self, len: usize) {
        self.buffer.resize(len, 0);
    }

    /// Buffer length in bytes.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn set_channels(&mut self, channels: u8) {
        self.channels = channels;
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    /// Number of interleaved samples held, for PCM formats.
    pub fn sample_count(&self) -> Option<usize> {
        self.format
            .bytes_per_sample()
            .map(|width| self.buffer.len() / width)
    }

    /// Number of frames (one sample per channel) held, for PCM formats.
    pub fn frame_count(&self) -> Option<usize> {
        match (self.sample_count(), self.channels) {
            (Some(_), 0) => None,
            (Some(samples), channels) => Some(samples / channels as usize),
            (None, _) => None,
        }
    }

    /// Decode the buffer as native-endian signed 16-bit samples.
    pub fn pcm16_samples(&self) -> Option<Vec<i16>> {
        if self.format != SampleFormat::Pcm16 {
            return None;
        }

        Some(
            self.buffer
                .chunks_exact(2)
                .map(|pair| i16::from_ne_bytes([pair[0], pair[1]]))
                .collect(),
        )
    }
}
