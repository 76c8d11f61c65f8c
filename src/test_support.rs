//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Mutex, Once};

use log::{Level, LevelFilter, Metadata, Record};

use crate::core::controller::Transcript;
use crate::core::executor::{CommandResult, Executor};

/// Executor that returns pre-scripted results and records every command.
///
/// The call log is shared through `Rc<RefCell<..>>` so tests can still read
/// it after the executor has been moved into a controller.
pub struct ScriptedExecutor {
    results: VecDeque<CommandResult>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl ScriptedExecutor {
    pub fn new(results: Vec<CommandResult>) -> Self {
        Self {
            results: results.into(),
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.calls)
    }

    pub fn remaining(&self) -> usize {
        self.results.len()
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&mut self, command: &str) -> CommandResult {
        self.calls.borrow_mut().push(command.to_string());
        self.results.pop_front().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptCall {
    Append(String),
    NewPrompt,
}

/// Transcript that only records which operations were requested.
#[derive(Default)]
pub struct RecordingTranscript {
    pub calls: Vec<TranscriptCall>,
}

impl Transcript for RecordingTranscript {
    fn append_output(&mut self, text: &str) {
        self.calls.push(TranscriptCall::Append(text.to_string()));
    }

    fn new_prompt(&mut self) {
        self.calls.push(TranscriptCall::NewPrompt);
    }
}

// ============================================================================
// Log capture
// ============================================================================

static CAPTURED: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
static LOGGER: CaptureLogger = CaptureLogger;

/// Records every log line of the test binary in memory.
struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = CAPTURED.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

/// Install the capturing logger at `Trace` level. Safe to call from every test.
pub fn install_log_capture() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Snapshot of all records captured so far (from any test in the binary).
pub fn captured_logs() -> Vec<(Level, String)> {
    CAPTURED
        .lock()
        .map(|records| records.clone())
        .unwrap_or_default()
}
