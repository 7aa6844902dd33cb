//! Plugin entry points and process-wide state.
//!
//! The plugin state is global, so every test holds `SERIAL` and starts from
//! a shut-down plugin.

mod common;

use bridge_desktop::{DesktopPlatform, HeapAudioHost, MemoryLoggerSink, RecordingCallback};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    AudioDecoderCallback, CodecSettings, EncodedUnit, ErrorKind, LogEntry, LogLevel, LoggerSink,
};
use common::{EngineCall, ScriptedFactory};
use core_decoder::plugin::{
    is_initialized, plugin_get_api, plugin_init, plugin_init_with_engine, plugin_shutdown,
};
use core_decoder::{DecoderError, HostContext, SessionState, AUDIO_DECODER_CAPABILITY};
use core_runtime::config::{DecoderSettings, RuntimeConfig};
use core_runtime::logging::{LogFormat, LoggingConfig};
use parking_lot::{const_mutex, Mutex, MutexGuard};
use std::sync::Arc;

static SERIAL: Mutex<()> = const_mutex(());

fn serial() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock();
    plugin_shutdown();
    guard
}

fn config() -> RuntimeConfig {
    RuntimeConfig::builder()
        .platform(Arc::new(DesktopPlatform::new()))
        .build()
        .unwrap()
}

fn context(callback: &Arc<dyn AudioDecoderCallback>) -> HostContext {
    HostContext::new(Arc::new(HeapAudioHost::new()), callback)
}

#[test]
fn test_get_api_before_init() {
    let _guard = serial();
    let callback: Arc<dyn AudioDecoderCallback> = Arc::new(RecordingCallback::new());

    let err = plugin_get_api(AUDIO_DECODER_CAPABILITY, context(&callback))
        .err()
        .unwrap();

    assert!(matches!(err, DecoderError::PluginNotInitialized));
    assert!(!is_initialized());
}

#[test]
fn test_init_get_api_shutdown() {
    let _guard = serial();
    let callback: Arc<dyn AudioDecoderCallback> = Arc::new(RecordingCallback::new());

    plugin_init_with_engine(config(), Arc::new(ScriptedFactory::new())).unwrap();
    assert!(is_initialized());

    let session = plugin_get_api(AUDIO_DECODER_CAPABILITY, context(&callback)).unwrap();
    assert_eq!(session.state(), SessionState::Uninitialized);
    session.decoding_complete();

    plugin_shutdown();
    assert!(!is_initialized());
    plugin_shutdown();
    assert!(!is_initialized());
}

#[test]
fn test_unknown_capability_creates_no_session() {
    let _guard = serial();
    let callback: Arc<dyn AudioDecoderCallback> = Arc::new(RecordingCallback::new());
    let factory = Arc::new(ScriptedFactory::new());

    plugin_init_with_engine(config(), factory.clone()).unwrap();

    let err = plugin_get_api("encode-video", context(&callback))
        .err()
        .unwrap();
    assert!(matches!(err, DecoderError::UnknownCapability(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(factory.log.calls().is_empty());

    plugin_shutdown();
}

#[test]
fn test_double_init_is_rejected() {
    let _guard = serial();

    plugin_init_with_engine(config(), Arc::new(ScriptedFactory::new())).unwrap();
    let err = plugin_init_with_engine(config(), Arc::new(ScriptedFactory::new())).unwrap_err();
    assert!(matches!(err, DecoderError::PluginAlreadyInitialized));

    plugin_shutdown();
    assert!(plugin_init_with_engine(config(), Arc::new(ScriptedFactory::new())).is_ok());
    plugin_shutdown();
}

#[test]
fn test_sessions_capture_settings_and_outlive_shutdown() {
    let _guard = serial();
    let recorder = Arc::new(RecordingCallback::new());
    let callback: Arc<dyn AudioDecoderCallback> = recorder.clone();
    let factory = Arc::new(ScriptedFactory::new());

    let config = RuntimeConfig::builder()
        .platform(Arc::new(DesktopPlatform::new()))
        .decoder_settings(DecoderSettings::strict())
        .build()
        .unwrap();
    plugin_init_with_engine(config, factory.clone()).unwrap();

    let mut session = plugin_get_api(AUDIO_DECODER_CAPABILITY, context(&callback)).unwrap();
    plugin_shutdown();

    // Strict settings were captured at creation: empty config is rejected
    session.init_decode(&CodecSettings::aac(Vec::<u8>::new()));
    assert_eq!(session.state(), SessionState::Faulted);
    assert_eq!(recorder.errors(), vec![ErrorKind::InitializationFailed]);
    session.decoding_complete();

    let mut session = {
        plugin_init_with_engine(
            RuntimeConfig::builder()
                .platform(Arc::new(DesktopPlatform::new()))
                .build()
                .unwrap(),
            factory.clone(),
        )
        .unwrap();
        let session = plugin_get_api(AUDIO_DECODER_CAPABILITY, context(&callback)).unwrap();
        plugin_shutdown();
        session
    };

    // The decode path keeps working with the plugin unloaded
    session.init_decode(&CodecSettings::aac(vec![0x12u8, 0x10]));
    session.decode(EncodedUnit::new(vec![1u8, 2, 3], 5));
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(recorder.decoded().len(), 1);
    session.decoding_complete();

    assert_eq!(factory.log.count(&EngineCall::Close), 1);
}

#[test]
fn test_invalid_settings_rejected_at_init() {
    let _guard = serial();

    let mut config = config();
    config.decoder.max_output_samples = 0;

    let err = plugin_init_with_engine(config, Arc::new(ScriptedFactory::new())).unwrap_err();
    assert!(matches!(err, DecoderError::Config(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(!is_initialized());
}

/// Host sink that asks the plugin for its state while handling each entry.
struct QueryingSink {
    entries: MemoryLoggerSink,
    seen_initialized: Mutex<Vec<(String, bool)>>,
}

impl LoggerSink for QueryingSink {
    fn log(&self, entry: LogEntry) -> BridgeResult<()> {
        self.seen_initialized
            .lock()
            .push((entry.message.clone(), is_initialized()));
        self.entries.log(entry)
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}

#[test]
fn test_platform_logger_sink_receives_plugin_logs() {
    let _guard = serial();
    let sink = Arc::new(QueryingSink {
        entries: MemoryLoggerSink::new(LogLevel::Debug),
        seen_initialized: Mutex::new(Vec::new()),
    });
    let callback: Arc<dyn AudioDecoderCallback> = Arc::new(RecordingCallback::new());

    let config = RuntimeConfig::builder()
        .platform(Arc::new(DesktopPlatform::new().with_logger_sink(sink.clone())))
        .logging(
            LoggingConfig::default()
                .with_format(LogFormat::Compact)
                .with_level(LogLevel::Debug),
        )
        .build()
        .unwrap();

    // The sink re-enters the plugin on every entry; none of these may block
    plugin_init_with_engine(config, Arc::new(ScriptedFactory::new())).unwrap();
    let session = plugin_get_api(AUDIO_DECODER_CAPABILITY, context(&callback)).unwrap();
    session.decoding_complete();
    plugin_shutdown();

    let entries = sink.entries.entries();
    assert!(entries
        .iter()
        .any(|entry| entry.message == "Decoder plugin initialized"
            && entry.target.starts_with("core_decoder")));

    let seen = sink.seen_initialized.lock().clone();
    assert!(seen.contains(&("Decoder plugin initialized".to_string(), true)));
    assert!(seen.contains(&("Capability requested".to_string(), true)));
    assert!(seen.contains(&("Decoder plugin shut down".to_string(), false)));
}

#[cfg(feature = "engine-symphonia")]
#[test]
fn test_default_engine() {
    let _guard = serial();
    let recorder = Arc::new(RecordingCallback::new());
    let callback: Arc<dyn AudioDecoderCallback> = recorder.clone();

    plugin_init(config()).unwrap();

    let mut session = plugin_get_api(AUDIO_DECODER_CAPABILITY, context(&callback)).unwrap();
    session.init_decode(&CodecSettings::aac(vec![0x12u8, 0x10]));
    assert_eq!(session.state(), SessionState::Ready);
    assert!(recorder.is_empty());
    session.decoding_complete();

    plugin_shutdown();
}
