//! Sessions backed by the built-in Symphonia AAC engine.

#![cfg(feature = "engine-symphonia")]

use bridge_desktop::{CallbackEvent, HeapAudioHost, RecordingCallback};
use bridge_traits::{AudioDecoderCallback, CodecSettings, EncodedUnit, ErrorKind};
use core_decoder::engine::SymphoniaEngineFactory;
use core_decoder::{AudioDecoderApi, DecodeSession, HostContext, SessionState, StreamParams};
use core_runtime::config::{ConsumptionPolicy, DecoderSettings};
use std::sync::Arc;

struct Fixture {
    session: DecodeSession,
    host: Arc<HeapAudioHost>,
    recorder: Arc<RecordingCallback>,
    _callback: Arc<dyn AudioDecoderCallback>,
}

fn fixture() -> Fixture {
    fixture_with(DecoderSettings::default())
}

fn fixture_with(settings: DecoderSettings) -> Fixture {
    let host = Arc::new(HeapAudioHost::new());
    let recorder = Arc::new(RecordingCallback::new());
    let callback: Arc<dyn AudioDecoderCallback> = recorder.clone();

    let session = DecodeSession::new(
        HostContext::new(host.clone(), &callback),
        Arc::new(SymphoniaEngineFactory),
        settings,
    );

    Fixture {
        session,
        host,
        recorder,
        _callback: callback,
    }
}

/// One raw AAC-LC access unit: a stereo channel pair element of silence.
const SILENT_STEREO_FRAME: [u8; 6] = [0x21, 0x00, 0x03, 0x20, 0x64, 0x1c];

/// AAC-LC, 44.1 kHz, stereo, frame length 13, no CRC.
const ADTS_HEADER: [u8; 7] = [0xFF, 0xF1, 0x50, 0x80, 0x01, 0xBF, 0xFC];

/// Same stream with a CRC: protection bit cleared, frame length 15.
const ADTS_HEADER_CRC: [u8; 9] = [0xFF, 0xF0, 0x50, 0x80, 0x01, 0xFF, 0xFC, 0x00, 0x00];

fn framed(header: &[u8]) -> Vec<u8> {
    [header, &SILENT_STEREO_FRAME[..]].concat()
}

/// Fails the call if the engine leaves any input bytes unconsumed.
fn strict_consumption() -> DecoderSettings {
    DecoderSettings {
        consumption_policy: ConsumptionPolicy::Strict,
        ..DecoderSettings::default()
    }
}

/// Decode `unit` and check for one full 1024-frame stereo buffer followed by
/// input exhaustion.
fn assert_decodes_one_stereo_frame(f: &Fixture, timestamp: u64) {
    let events = f.recorder.take();
    assert_eq!(events.len(), 2, "{:?}", events);

    match &events[0] {
        CallbackEvent::Decoded(samples) => {
            // 1024 frames x 2 channels x 2 bytes
            assert_eq!(samples.size(), 4096);
            assert_eq!(samples.sample_count(), Some(2048));
            assert_eq!(samples.frame_count(), Some(1024));
            assert_eq!(samples.channels(), 2);
            assert_eq!(samples.sample_rate(), 44100);
            assert_eq!(samples.timestamp(), timestamp);
        }
        other => panic!("expected decoded output, got {:?}", other),
    }
    assert_eq!(events[1], CallbackEvent::InputExhausted);
}

#[test]
fn test_decodes_raw_access_unit() {
    let mut f = fixture_with(strict_consumption());
    f.session.init_decode(&CodecSettings::aac(vec![0x12, 0x10]));

    f.session.decode(EncodedUnit::new(SILENT_STEREO_FRAME.to_vec(), 1000));
    assert_decodes_one_stereo_frame(&f, 1000);

    f.session.decode(EncodedUnit::new(SILENT_STEREO_FRAME.to_vec(), 1001));
    assert_decodes_one_stereo_frame(&f, 1001);

    assert_eq!(f.host.released_timestamps(), vec![1000, 1001]);
}

#[test]
fn test_deferred_config_from_adts_header() {
    let mut f = fixture_with(strict_consumption());
    f.session.init_decode(&CodecSettings::aac(Vec::<u8>::new()));
    assert_eq!(f.session.negotiated_format(), Some(StreamParams::default()));

    // Strict consumption: the stripped header must count as consumed
    f.session.decode(EncodedUnit::new(framed(&ADTS_HEADER), 1000));
    assert_decodes_one_stereo_frame(&f, 1000);

    f.session.decode(EncodedUnit::new(framed(&ADTS_HEADER), 1001));
    assert_decodes_one_stereo_frame(&f, 1001);
}

#[test]
fn test_deferred_config_from_adts_header_with_crc() {
    let mut f = fixture_with(strict_consumption());
    f.session.init_decode(&CodecSettings::aac(Vec::<u8>::new()));

    f.session.decode(EncodedUnit::new(framed(&ADTS_HEADER_CRC), 7));
    assert_decodes_one_stereo_frame(&f, 7);
}

#[test]
fn test_adts_units_with_explicit_config() {
    let mut f = fixture_with(strict_consumption());
    f.session.init_decode(&CodecSettings::aac(vec![0x12, 0x10]));

    f.session.decode(EncodedUnit::new(framed(&ADTS_HEADER), 0));
    assert_decodes_one_stereo_frame(&f, 0);
}

#[test]
fn test_init_with_audio_specific_config() {
    let mut f = fixture();

    f.session.init_decode(&CodecSettings::aac(vec![0x12, 0x10]));

    assert_eq!(f.session.state(), SessionState::Ready);
    assert_eq!(
        f.session.negotiated_format(),
        Some(StreamParams::new(44100, 2))
    );
    assert!(f.recorder.is_empty());
}

#[test]
fn test_truncated_config_fails_initialization() {
    let mut f = fixture();

    f.session.init_decode(&CodecSettings::aac(vec![0x12]));

    assert_eq!(f.session.state(), SessionState::Faulted);
    assert_eq!(f.recorder.errors(), vec![ErrorKind::InitializationFailed]);
}

#[test]
fn test_deferred_config_requires_adts_input() {
    let mut f = fixture();
    f.session.init_decode(&CodecSettings::aac(Vec::<u8>::new()));
    assert_eq!(f.session.state(), SessionState::Ready);
    assert_eq!(f.session.negotiated_format(), Some(StreamParams::default()));

    f.session.decode(EncodedUnit::new(vec![0x21u8, 0x10, 0x05, 0x00], 0));

    assert_eq!(
        f.recorder.events(),
        vec![CallbackEvent::Error(ErrorKind::DecodeFailed)]
    );
    assert_eq!(f.host.released_count(), 1);
}

#[test]
fn test_arbitrary_payload_yields_one_outcome() {
    let mut f = fixture();
    f.session.init_decode(&CodecSettings::aac(vec![0x12, 0x10]));

    f.session.decode(EncodedUnit::new(vec![0u8; 64], 42));

    let terminal = f
        .recorder
        .events()
        .iter()
        .filter(|e| matches!(e, CallbackEvent::InputExhausted | CallbackEvent::Error(_)))
        .count();
    assert_eq!(terminal, 1);
    assert_eq!(f.host.released_timestamps(), vec![42]);
    assert_eq!(f.session.state(), SessionState::Ready);
}

#[test]
fn test_reset_and_close() {
    let mut f = fixture();
    f.session.init_decode(&CodecSettings::aac(vec![0x12, 0x10]));

    f.session.reset();
    f.session.drain();
    assert_eq!(
        f.recorder.take(),
        vec![CallbackEvent::ResetComplete, CallbackEvent::DrainComplete]
    );

    let boxed: Box<dyn AudioDecoderApi> = Box::new(f.session);
    boxed.decoding_complete();
}
