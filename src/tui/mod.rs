//! # TUI Adapter
//!
//! The ratatui-specific layer. Owns the terminal, renders the prompt view
//! and translates crossterm input into `TuiEvent`s.
//!
//! This is the only module that knows about ratatui and crossterm. The core
//! reaches the view solely through the `Transcript` trait.
//!
//! ## Redraw Strategy
//!
//! Nothing animates, so the loop sleeps up to 500ms waiting for input and
//! only redraws after an event or a terminal resize. Commands run
//! synchronously inside event handling; the screen is frozen while a command
//! runs and catches up on the next draw.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call.
//!
//! ## Mouse Capture
//!
//! Mouse capture is on so the wheel scrolls the transcript. While it is on,
//! the host terminal does not select text on a plain drag; hold Shift (Option
//! in macOS Terminal and iTerm2) while dragging to select and copy output.

mod component;
pub mod components;
pub mod event;
mod ui;

pub use component::{Component, EventHandler};

use log::{debug, info};
use std::io::stdout;
use std::time::Duration;

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::SetTitle;

use crate::core::config::{APP_TITLE, ResolvedConfig};
use crate::core::controller::Controller;
use crate::core::executor::ShellExecutor;
use crate::tui::components::{PromptEvent, PromptView};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const IDLE_POLL: Duration = Duration::from_millis(500);

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture, // Wheel scrolling; Shift-drag still selects natively
            EnableBracketedPaste,
            Show,                        // Caret of the prompt line
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset on redraw
            SetTitle(APP_TITLE)
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            DisableMouseCapture,
            DisableBracketedPaste,
            SetCursorStyle::DefaultUserShape,
            Hide
        );
    }
}

/// Build the prompt view wired to a shell-backed controller.
pub fn build_prompt_view(config: &ResolvedConfig) -> PromptView {
    let executor = ShellExecutor::new(config.command_timeout);
    let mut prompt_view = PromptView::new(&config.banner);
    prompt_view.set_submission_handler(Box::new(Controller::new(executor)));
    prompt_view
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let mut prompt_view = build_prompt_view(&config);

    let mut terminal = ratatui::init();
    // Terminal modes are undone when the guard drops, before the screen is restored
    let result = TerminalModeGuard::new()
        .and_then(|_terminal_mode_guard| event_loop(&mut terminal, &mut prompt_view));

    info!("Shutting down");
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    prompt_view: &mut PromptView,
) -> std::io::Result<()> {
    let mut needs_redraw = true; // Force first frame

    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, prompt_view))?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(IDLE_POLL);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                TuiEvent::Quit => return Ok(()),
                // Resize just needs a redraw (already flagged above)
                TuiEvent::Resize => {}
                _ => {
                    if let Some(PromptEvent::Submitted(command)) = prompt_view.handle_event(&event)
                    {
                        debug!("Handled submission {:?}", command);
                    }
                }
            }
        }
    }
}
