//! # AAC Stream Configuration
//!
//! Parsers for the two places AAC stream parameters come from:
//!
//! - the MPEG-4 AudioSpecificConfig carried in the elementary stream
//!   descriptor (the codec settings' `extra_data`), and
//! - the ADTS header prefixed to each access unit in transport streams.

use super::{EngineError, EngineResult};
use symphonia::core::io::{BitReaderLtr, ReadBitsLtr};

/// Sampling frequencies addressed by the 4-bit sampling frequency index.
pub const SAMPLE_RATES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

/// Index value signalling an explicit 24-bit sample rate.
const EXPLICIT_RATE_INDEX: u32 = 15;

/// Audio object type escape value.
const OBJECT_TYPE_ESCAPE: u32 = 31;

const ADTS_SYNC_WORD: u32 = 0xFFF;

/// Parsed MPEG-4 AudioSpecificConfig (the fields the decoder needs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpecificConfig {
    /// Audio object type (2 = AAC-LC)
    pub object_type: u8,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel configuration (0 = defined in-band, 1..=7 = standard layouts)
    pub channel_config: u8,
}

impl AudioSpecificConfig {
    /// Parse the leading fields of an AudioSpecificConfig.
    pub fn parse(bytes: &[u8]) -> EngineResult<Self> {
        if bytes.len() < 2 {
            return Err(EngineError::InvalidConfig(format!(
                "AudioSpecificConfig too short: {} bytes",
                bytes.len()
            )));
        }

        let mut reader = BitReaderLtr::new(bytes);

        let mut object_type = read_bits(&mut reader, 5)?;
        if object_type == OBJECT_TYPE_ESCAPE {
            object_type = 32 + read_bits(&mut reader, 6)?;
        }
        if object_type == 0 {
            return Err(EngineError::InvalidConfig("audio object type 0".to_string()));
        }

        let rate_index = read_bits(&mut reader, 4)?;
        let sample_rate = if rate_index == EXPLICIT_RATE_INDEX {
            read_bits(&mut reader, 24)?
        } else {
            rate_for_index(rate_index)?
        };

        let channel_config = read_bits(&mut reader, 4)? as u8;

        Ok(Self {
            object_type: object_type as u8,
            sample_rate,
            channel_config,
        })
    }

    /// Number of output channels implied by the channel configuration.
    ///
    /// Returns 0 for configuration 0 (program config element in-band).
    pub fn channels(&self) -> u8 {
        match self.channel_config {
            7 => 8,
            n => n,
        }
    }

    /// Serialize to the two-byte form. Only possible for sample rates that
    /// have a frequency index and object types below the escape value.
    pub fn to_bytes(&self) -> Option<[u8; 2]> {
        let index = SAMPLE_RATES.iter().position(|&r| r == self.sample_rate)? as u16;
        if self.object_type as u32 >= OBJECT_TYPE_ESCAPE || self.channel_config > 15 {
            return None;
        }

        let packed =
            (self.object_type as u16) << 11 | index << 7 | (self.channel_config as u16) << 3;
        Some(packed.to_be_bytes())
    }
}

/// Parsed ADTS fixed + variable header.
///
/// Only constructed by [`AdtsHeader::parse`], so the sample rate is always
/// one the frequency table defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdtsHeader {
    /// Profile (object type minus one)
    profile: u8,
    sample_rate: u32,
    channel_config: u8,
    /// Whole ADTS frame, header included
    frame_length: usize,
    /// 7 bytes, or 9 when a CRC follows the header
    header_length: usize,
}

impl AdtsHeader {
    /// Returns `true` if `bytes` starts with an ADTS sync word.
    pub fn is_adts(bytes: &[u8]) -> bool {
        bytes.len() >= 2 && bytes[0] == 0xFF && (bytes[1] & 0xF6) == 0xF0
    }

    /// Parse an ADTS header at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> EngineResult<Self> {
        if bytes.len() < 7 {
            return Err(EngineError::Decode(format!(
                "ADTS header truncated: {} bytes",
                bytes.len()
            )));
        }

        let mut reader = BitReaderLtr::new(bytes);

        if read_bits(&mut reader, 12)? != ADTS_SYNC_WORD {
            return Err(EngineError::Decode("missing ADTS sync word".to_string()));
        }

        let _mpeg_version = read_bits(&mut reader, 1)?;
        if read_bits(&mut reader, 2)? != 0 {
            return Err(EngineError::Decode("ADTS layer must be 0".to_string()));
        }
        let protection_absent = read_bits(&mut reader, 1)? == 1;

        let profile = read_bits(&mut reader, 2)? as u8;
        let sample_rate = rate_for_index(read_bits(&mut reader, 4)?)?;
        let _private = read_bits(&mut reader, 1)?;
        let channel_config = read_bits(&mut reader, 3)? as u8;
        // original/copy, home, copyright id bit, copyright id start
        let _flags = read_bits(&mut reader, 4)?;
        let frame_length = read_bits(&mut reader, 13)? as usize;
        let _buffer_fullness = read_bits(&mut reader, 11)?;
        let _raw_blocks = read_bits(&mut reader, 2)?;

        let header_length = if protection_absent { 7 } else { 9 };
        if frame_length < header_length {
            return Err(EngineError::Decode(format!(
                "ADTS frame length {} shorter than header",
                frame_length
            )));
        }

        Ok(Self {
            profile,
            sample_rate,
            channel_config,
            frame_length,
            header_length,
        })
    }

    pub fn profile(&self) -> u8 {
        self.profile
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_config(&self) -> u8 {
        self.channel_config
    }

    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    pub fn header_length(&self) -> usize {
        self.header_length
    }

    /// The AudioSpecificConfig equivalent of this header.
    pub fn to_audio_specific_config(&self) -> AudioSpecificConfig {
        AudioSpecificConfig {
            object_type: self.profile + 1,
            sample_rate: self.sample_rate,
            channel_config: self.channel_config,
        }
    }
}

fn rate_for_index(index: u32) -> EngineResult<u32> {
    SAMPLE_RATES
        .get(index as usize)
        .copied()
        .ok_or_else(|| EngineError::InvalidConfig(format!("reserved sample rate index {}", index)))
}

fn read_bits(reader: &mut BitReaderLtr<'_>, bits: u32) -> EngineResult<u32> {
    reader
        .read_bits_leq32(bits)
        .map_err(|e| EngineError::InvalidConfig(format!("truncated stream configuration: {}", e)))
}
