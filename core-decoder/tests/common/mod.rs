//! Scripted decoding engine shared by the integration tests.
//!
//! The fake records every engine interaction so tests can assert what the
//! session did (and did not) do with the engine.

#![allow(dead_code)]

use core_decoder::engine::{
    DecodedFrame, DecodingEngine, EngineError, EngineFactory, EngineResult, OutputFormat,
    StreamParams,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// One call made against the engine contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Open,
    Configure(OutputFormat),
    Init(Vec<u8>),
    DecodeOne(usize),
    ResetState,
    Close,
}

/// Scripted result of one `decode_one` call.
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Samples {
        count: usize,
        channels: u8,
        sample_rate: u32,
    },
    Priming,
    Fail,
}

impl Outcome {
    pub fn stereo(count: usize) -> Self {
        Outcome::Samples {
            count,
            channels: 2,
            sample_rate: 44100,
        }
    }
}

#[derive(Clone, Default)]
pub struct EngineLog(Arc<Mutex<Vec<EngineCall>>>);

impl EngineLog {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.0.lock().clone()
    }

    pub fn count(&self, call: &EngineCall) -> usize {
        self.0.lock().iter().filter(|c| *c == call).count()
    }

    fn push(&self, call: EngineCall) {
        self.0.lock().push(call);
    }
}

pub struct ScriptedFactory {
    pub log: EngineLog,
    open_fails: bool,
    init_result: EngineResult<StreamParams>,
    outcomes: Mutex<VecDeque<Outcome>>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self {
            log: EngineLog::default(),
            open_fails: false,
            init_result: Ok(StreamParams::new(44100, 2)),
            outcomes: Mutex::new(VecDeque::new()),
        }
    }

    pub fn failing_open() -> Self {
        Self {
            open_fails: true,
            ..Self::new()
        }
    }

    pub fn failing_init() -> Self {
        Self {
            init_result: Err(EngineError::InvalidConfig("status -1".to_string())),
            ..Self::new()
        }
    }

    pub fn with_outcomes(self, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        self.outcomes.lock().extend(outcomes);
        self
    }
}

impl EngineFactory for ScriptedFactory {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn open(&self) -> EngineResult<Box<dyn DecodingEngine>> {
        self.log.push(EngineCall::Open);
        if self.open_fails {
            return Err(EngineError::OpenFailed("out of memory".to_string()));
        }

        Ok(Box::new(ScriptedEngine {
            log: self.log.clone(),
            init_result: self.init_result.clone(),
            outcomes: std::mem::take(&mut *self.outcomes.lock()),
            pcm: Vec::new(),
        }))
    }
}

struct ScriptedEngine {
    log: EngineLog,
    init_result: EngineResult<StreamParams>,
    outcomes: VecDeque<Outcome>,
    pcm: Vec<i16>,
}

impl DecodingEngine for ScriptedEngine {
    fn configure(&mut self, format: OutputFormat) -> EngineResult<()> {
        self.log.push(EngineCall::Configure(format));
        Ok(())
    }

    fn init(&mut self, config: &[u8]) -> EngineResult<StreamParams> {
        self.log.push(EngineCall::Init(config.to_vec()));
        self.init_result.clone()
    }

    fn decode_one(&mut self, input: &[u8]) -> EngineResult<DecodedFrame<'_>> {
        self.log.push(EngineCall::DecodeOne(input.len()));

        match self.outcomes.pop_front().unwrap_or(Outcome::stereo(2048)) {
            Outcome::Samples {
                count,
                channels,
                sample_rate,
            } => {
                self.pcm = (0..count).map(|i| i as i16).collect();
                Ok(DecodedFrame {
                    pcm: &self.pcm,
                    sample_count: count,
                    channels,
                    sample_rate,
                    bytes_consumed: input.len(),
                })
            }
            Outcome::Priming => Ok(DecodedFrame::empty(input.len())),
            Outcome::Fail => Err(EngineError::Decode("corrupt access unit".to_string())),
        }
    }

    fn reset_state(&mut self) {
        self.log.push(EngineCall::ResetState);
    }

    fn close(self: Box<Self>) {
        self.log.push(EngineCall::Close);
    }
}
