//! # Controller
//!
//! Glue between a submitted command line and the executor. The view calls
//! `on_command_submitted`, the controller runs the command and writes the
//! result back through the `Transcript` it was handed.
//!
//! ```text
//! Return  →  PromptView  →  Controller  →  Executor  →  shell
//!                 ▲                            │
//!                 └──── append_output ◄────────┘
//! ```
//!
//! Rendering rule: a non-empty stderr replaces stdout entirely and is shown as
//! `"Error: <stderr>"`. The exit code never changes what gets shown.

use log::{debug, info};

use super::executor::{Executor, ShellExecutor};

/// Prefix put in front of stderr when it is written to the transcript.
pub const ERROR_PREFIX: &str = "Error: ";

/// The view-side operations a submission handler may perform.
pub trait Transcript {
    /// Append `text` as transcript lines (if non-empty), then start a fresh prompt.
    fn append_output(&mut self, text: &str);
    /// Start a fresh prompt line at the end of the buffer.
    fn new_prompt(&mut self);
}

/// Receives every command line the user submits.
pub trait SubmissionHandler {
    /// `command` is already stripped of the prompt prefix and surrounding whitespace.
    fn on_command_submitted(&mut self, view: &mut dyn Transcript, command: &str);
}

/// Runs submitted commands and renders their results.
pub struct Controller<E: Executor = ShellExecutor> {
    executor: E,
}

impl<E: Executor> Controller<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

impl<E: Executor> SubmissionHandler for Controller<E> {
    fn on_command_submitted(&mut self, view: &mut dyn Transcript, command: &str) {
        if command.is_empty() {
            view.new_prompt();
            return;
        }

        // Command text stays out of the default log level
        info!("Executing command ({} bytes)", command.len());
        debug!("Command line: {:?}", command);
        let result = self.executor.execute(command);
        debug!(
            "Command finished: exit_code={}, stdout={} bytes, stderr={} bytes",
            result.exit_code,
            result.stdout.len(),
            result.stderr.len()
        );

        if !result.stderr.is_empty() {
            view.append_output(&format!("{ERROR_PREFIX}{}", result.stderr));
        } else {
            view.append_output(&result.stdout);
        }
    }
}
