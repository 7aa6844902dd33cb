//! # Symphonia AAC Engine
//!
//! Pure-Rust decoding engine built on `symphonia-codec-aac`.
//!
//! The engine accepts either raw access units (MP4/ESDS style, configured with
//! an AudioSpecificConfig) or ADTS-framed units. ADTS headers are stripped
//! before the payload reaches the codec. When the session supplies no
//! configuration bytes, the first ADTS header is used to build one.

use super::aac_config::{AdtsHeader, AudioSpecificConfig};
use super::sample_converter::SampleConverter;
use super::{
    DecodedFrame, DecodingEngine, EngineError, EngineFactory, EngineResult, OutputFormat,
    StreamParams,
};
use symphonia::core::codecs::{CodecParameters, Decoder, DecoderOptions, CODEC_TYPE_AAC};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::Packet;
use symphonia::core::sample::SampleFormat as SymphoniaSampleFormat;
use symphonia_codec_aac::AacDecoder;
use tracing::{debug, trace, warn};

/// Samples per channel in one AAC-LC access unit.
const AAC_FRAME_LENGTH: u64 = 1024;

impl From<SymphoniaError> for EngineError {
    fn from(err: SymphoniaError) -> Self {
        EngineError::Decode(err.to_string())
    }
}

enum EngineState {
    /// Allocated, `init` not called yet
    Opened,
    /// Initialised without configuration; waiting for the first ADTS header
    Deferred,
    Active {
        decoder: Box<AacDecoder>,
        params: StreamParams,
    },
}

/// AAC decoding engine backed by Symphonia.
pub struct SymphoniaAacEngine {
    state: EngineState,
    output: OutputFormat,
    /// Interleaved output of the last decoded unit, reused across calls
    pcm: Vec<i16>,
    /// Packets handed to the codec since the last reset
    packets: u64,
}

impl SymphoniaAacEngine {
    pub fn new() -> Self {
        Self {
            state: EngineState::Opened,
            output: OutputFormat::Pcm16,
            pcm: Vec::new(),
            packets: 0,
        }
    }

    /// Stream parameters once the codec is active.
    pub fn stream_params(&self) -> Option<StreamParams> {
        match &self.state {
            EngineState::Active { params, .. } => Some(*params),
            _ => None,
        }
    }

    fn build_decoder(asc: &AudioSpecificConfig, raw: &[u8]) -> EngineResult<Box<AacDecoder>> {
        let mut params = CodecParameters::new();
        params
            .for_codec(CODEC_TYPE_AAC)
            .with_sample_rate(asc.sample_rate)
            .with_sample_format(SymphoniaSampleFormat::F32)
            .with_max_frames_per_packet(AAC_FRAME_LENGTH)
            .with_extra_data(raw.to_vec().into_boxed_slice());

        AacDecoder::try_new(&params, &DecoderOptions::default())
            .map(Box::new)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))
    }

    fn activate(&mut self, config: &[u8]) -> EngineResult<StreamParams> {
        let asc = AudioSpecificConfig::parse(config)?;
        let decoder = Self::build_decoder(&asc, config)?;
        let params = StreamParams::new(asc.sample_rate, asc.channels());

        debug!(
            object_type = asc.object_type,
            sample_rate = params.sample_rate,
            channels = params.channels,
            "AAC decoder configured"
        );

        self.state = EngineState::Active { decoder, params };
        self.packets = 0;
        Ok(params)
    }

    /// Build the codec from the ADTS header of the first unit.
    fn activate_from_adts(&mut self, input: &[u8]) -> EngineResult<()> {
        if !AdtsHeader::is_adts(input) {
            return Err(EngineError::InvalidConfig(
                "no decoder configuration and input is not ADTS framed".to_string(),
            ));
        }

        let header = AdtsHeader::parse(input)?;
        let config = header
            .to_audio_specific_config()
            .to_bytes()
            .ok_or_else(|| {
                EngineError::InvalidConfig("ADTS header cannot be expressed as config".to_string())
            })?;

        debug!("Deriving decoder configuration from ADTS header");
        self.activate(&config).map(|_| ())
    }
}

impl Default for SymphoniaAacEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Split an access unit into codec payload and consumed length.
fn split_access_unit(input: &[u8]) -> EngineResult<(&[u8], usize)> {
    if !AdtsHeader::is_adts(input) {
        return Ok((input, input.len()));
    }

    let header = AdtsHeader::parse(input)?;
    if input.len() < header.header_length() {
        return Err(EngineError::Decode("ADTS header truncated".to_string()));
    }

    let end = header.frame_length().min(input.len());
    if end < header.frame_length() {
        warn!(
            frame_length = header.frame_length(),
            available = input.len(),
            "ADTS frame shorter than its header claims"
        );
    }

    Ok((&input[header.header_length()..end], end))
}

impl DecodingEngine for SymphoniaAacEngine {
    fn configure(&mut self, format: OutputFormat) -> EngineResult<()> {
        match format {
            OutputFormat::Pcm16 => {
                self.output = format;
                Ok(())
            }
            other => Err(EngineError::UnsupportedOutput(other)),
        }
    }

    fn init(&mut self, config: &[u8]) -> EngineResult<StreamParams> {
        if config.is_empty() {
            debug!("No decoder configuration, deferring to first access unit");
            self.state = EngineState::Deferred;
            return Ok(StreamParams::default());
        }

        self.activate(config)
    }

    fn decode_one(&mut self, input: &[u8]) -> EngineResult<DecodedFrame<'_>> {
        if input.is_empty() {
            return Err(EngineError::Decode("empty access unit".to_string()));
        }

        if matches!(self.state, EngineState::Deferred) {
            self.activate_from_adts(input)?;
        }

        let decoder = match &mut self.state {
            EngineState::Active { decoder, .. } => decoder,
            _ => return Err(EngineError::NotInitialized),
        };

        let (payload, bytes_consumed) = split_access_unit(input)?;
        let ts = self.packets * AAC_FRAME_LENGTH;
        let packet = Packet::new_from_slice(0, ts, AAC_FRAME_LENGTH, payload);
        self.packets += 1;

        let decoded = decoder.decode(&packet)?;
        let channels = decoded.spec().channels.count() as u8;
        let sample_rate = decoded.spec().rate;
        SampleConverter::to_interleaved_i16(&decoded, &mut self.pcm);

        trace!(
            packet = self.packets,
            samples = self.pcm.len(),
            bytes_consumed,
            "Decoded access unit"
        );

        Ok(DecodedFrame {
            pcm: &self.pcm,
            sample_count: self.pcm.len(),
            channels,
            sample_rate,
            bytes_consumed,
        })
    }

    fn reset_state(&mut self) {
        if let EngineState::Active { decoder, .. } = &mut self.state {
            decoder.reset();
        }
        self.pcm.clear();
        self.packets = 0;
    }

    fn close(self: Box<Self>) {
        debug!(packets = self.packets, output = ?self.output, "Closing AAC engine");
    }
}

/// Factory for [`SymphoniaAacEngine`] instances.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaEngineFactory;

impl EngineFactory for SymphoniaEngineFactory {
    fn name(&self) -> &'static str {
        "symphonia-aac"
    }

    fn open(&self) -> EngineResult<Box<dyn DecodingEngine>> {
        Ok(Box::new(SymphoniaAacEngine::new()))
    }
}
