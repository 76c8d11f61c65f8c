//! # PromptView Component
//!
//! The single text area of the terminal: transcript on top, one prompt line
//! at the bottom.
//!
//! ## Responsibilities
//!
//! - Own the text buffer and caret
//! - Apply the keyboard policy (Return submits, Backspace cannot eat the prompt prefix)
//! - Extract the command from the caret's line and hand it to the submission handler
//! - Render with the fixed terminal style, scrolling to keep the caret visible
//!
//! ## Buffer Shape
//!
//! ```text
//! SE Terminal NLP-Ready        ← banner (transcript)
//! $ echo hello                 ← frozen prompt (transcript)
//! hello                        ← output (transcript)
//! $ ▌                          ← active prompt, only this suffix is meant to be edited
//! ```
//!
//! ## Key Policy
//!
//! | Key       | Condition       | Action                                          |
//! |-----------|-----------------|-------------------------------------------------|
//! | Return    | always          | extract caret line, call handler, no newline    |
//! | Backspace | caret column ≤ 2| suppressed                                      |
//! | other     | any             | ordinary editing                                |
//!
//! Only Backspace is guarded. The caret may still move into transcript lines,
//! and Delete or paste there edit them; Return on such a line submits that
//! line's text.

mod text_buffer;
mod viewport;
mod wrap;

use log::debug;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::core::controller::{SubmissionHandler, Transcript};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use text_buffer::TextBuffer;
use viewport::ViewportState;
use wrap::RowLayout;

/// Two-character prefix every prompt line starts with.
pub const PROMPT_PREFIX: &str = "$ ";
/// Backspace is ignored while the caret column is at or below this.
pub const PROTECTED_COLUMNS: usize = 2;

pub const BACKGROUND: Color = Color::Rgb(0x1e, 0x1e, 0x1e);
pub const FOREGROUND: Color = Color::Rgb(0x00, 0xff, 0x00);

/// Fixed near-black / green style of the whole view.
pub fn terminal_style() -> Style {
    Style::default().fg(FOREGROUND).bg(BACKGROUND)
}

/// Turn the text of a submitted line into a command.
///
/// Whitespace runs collapse to single spaces and the ends are trimmed; then a
/// leading `$` (the prompt prefix) is removed and the rest trimmed again.
pub fn extract_command(line: &str) -> String {
    let normalized = line.split_whitespace().collect::<Vec<_>>().join(" ");
    match normalized.strip_prefix('$') {
        Some(rest) => rest.trim().to_string(),
        None => normalized,
    }
}

/// High-level events emitted by the PromptView
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    /// Return was pressed; carries the extracted command (possibly empty)
    Submitted(String),
    /// An edit was refused to protect the prompt prefix
    Suppressed,
    /// Buffer text or caret changed
    ContentChanged,
}

/// Transcript + prompt text area.
///
/// # State
///
/// - `buffer`: full text and caret (see `TextBuffer`)
/// - `handler`: receives submitted commands
/// - `viewport`: scroll offset and caret following
pub struct PromptView {
    buffer: TextBuffer,
    handler: Option<Box<dyn SubmissionHandler>>,
    viewport: ViewportState,
}

impl PromptView {
    /// A view showing `banner` followed by a fresh prompt.
    pub fn new(banner: &str) -> Self {
        let mut view = Self {
            buffer: TextBuffer::default(),
            handler: None,
            viewport: ViewportState::default(),
        };
        view.buffer.append_line(banner);
        view.new_prompt();
        view
    }

    /// Install the callback invoked on Return with the extracted command.
    pub fn set_submission_handler(&mut self, handler: Box<dyn SubmissionHandler>) {
        self.handler = Some(handler);
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    /// All lines of the buffer, prompt line last.
    pub fn lines(&self) -> Vec<&str> {
        self.buffer.text().split('\n').collect()
    }

    pub fn last_line(&self) -> &str {
        self.buffer.last_line()
    }

    /// Text of the line the caret is on.
    pub fn current_line(&self) -> &str {
        self.buffer.current_line()
    }

    /// Caret column in characters.
    pub fn caret_column(&self) -> usize {
        self.buffer.column()
    }

    /// Zero-based line index of the caret.
    pub fn caret_line(&self) -> usize {
        self.buffer.caret_line()
    }

    fn submit(&mut self) -> PromptEvent {
        let command = extract_command(self.buffer.current_line());
        debug!("Submitted line {:?} as command {:?}", self.buffer.current_line(), command);

        // The handler needs `&mut self` as its transcript, so it is lent out for the call
        if let Some(mut handler) = self.handler.take() {
            handler.on_command_submitted(self, &command);
            self.handler = Some(handler);
        }
        PromptEvent::Submitted(command)
    }

    fn backspace(&mut self) -> Option<PromptEvent> {
        if self.buffer.column() <= PROTECTED_COLUMNS {
            return Some(PromptEvent::Suppressed);
        }
        self.buffer.backspace().then_some(PromptEvent::ContentChanged)
    }

    /// Draw a scrollbar when the content exceeds the viewport.
    fn render_scrollbar(&self, frame: &mut Frame, area: Rect) {
        if self.viewport.total_rows <= self.viewport.height {
            return;
        }

        // ScrollbarState content_length is max scrollable position, not total items
        let max_scroll = self.viewport.total_rows - self.viewport.height;
        let mut scrollbar_state = ScrollbarState::default()
            .content_length(max_scroll)
            .position(self.viewport.offset);

        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None)
                .style(terminal_style()),
            area,
            &mut scrollbar_state,
        );
    }
}

impl Transcript for PromptView {
    fn append_output(&mut self, text: &str) {
        if !text.is_empty() {
            self.buffer.append_line(text);
        }
        self.new_prompt();
    }

    fn new_prompt(&mut self) {
        self.buffer.move_to_end();
        self.buffer.insert_char('\n');
        self.buffer.insert_str(PROMPT_PREFIX);
        self.viewport.follow_caret = true;
    }
}

impl Component for PromptView {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Block::new().style(terminal_style()), area);
        if area.width < 2 || area.height == 0 {
            return;
        }

        // Rightmost column is kept for the scrollbar
        let content_area = Rect {
            width: area.width - 1,
            ..area
        };
        let text = self.buffer.text();
        let layout = RowLayout::build(text, content_area.width as usize, self.buffer.caret());
        self.viewport.update(
            content_area.height as usize,
            layout.total_rows(),
            layout.caret_row,
        );

        let visible: Vec<Line> = layout
            .rows
            .iter()
            .skip(self.viewport.offset)
            .take(self.viewport.height)
            .map(|row| Line::raw(text[row.clone()].replace('\t', " ")))
            .collect();

        frame.render_widget(Paragraph::new(visible).style(terminal_style()), content_area);
        self.render_scrollbar(frame, area);

        if self.viewport.shows(layout.caret_row) {
            let x = content_area.x + layout.caret_col as u16;
            let y = content_area.y + (layout.caret_row - self.viewport.offset) as u16;
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for PromptView {
    type Event = PromptEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if event.is_scroll() {
            match event {
                TuiEvent::ScrollUp => self.viewport.scroll_up(1),
                TuiEvent::ScrollDown => self.viewport.scroll_down(1),
                TuiEvent::ScrollPageUp => self.viewport.page_up(),
                TuiEvent::ScrollPageDown => self.viewport.page_down(),
                _ => {}
            }
            return None;
        }

        let result = match event {
            TuiEvent::Submit => Some(self.submit()),
            TuiEvent::Backspace => self.backspace(),
            TuiEvent::InputChar(c) => {
                self.buffer.insert_char(*c);
                Some(PromptEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.buffer.insert_str(text);
                Some(PromptEvent::ContentChanged)
            }
            TuiEvent::Delete => self.buffer.delete().then_some(PromptEvent::ContentChanged),
            TuiEvent::CursorLeft => self.buffer.move_left().then_some(PromptEvent::ContentChanged),
            TuiEvent::CursorRight => self.buffer.move_right().then_some(PromptEvent::ContentChanged),
            TuiEvent::CursorUp => self.buffer.move_up().then_some(PromptEvent::ContentChanged),
            TuiEvent::CursorDown => self.buffer.move_down().then_some(PromptEvent::ContentChanged),
            TuiEvent::CursorHome => self.buffer.move_home().then_some(PromptEvent::ContentChanged),
            TuiEvent::CursorEnd => self.buffer.move_end().then_some(PromptEvent::ContentChanged),
            _ => return None,
        };
        self.viewport.follow_caret = true;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controller::Controller;
    use crate::core::executor::CommandResult;
    use crate::test_support::ScriptedExecutor;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn type_text(view: &mut PromptView, text: &str) {
        for c in text.chars() {
            view.handle_event(&TuiEvent::InputChar(c));
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_initial_state_is_banner_then_prompt() {
        let view = PromptView::new("Welcome");
        assert_eq!(view.text(), "Welcome\n$ ");
        assert_eq!(view.caret_column(), 2);
        assert_eq!(view.caret_line(), 1);
    }

    #[test]
    fn test_extract_command() {
        assert_eq!(extract_command("$ echo hello"), "echo hello");
        assert_eq!(extract_command("$    ls    -la   "), "ls -la");
        assert_eq!(extract_command("$ "), "");
        assert_eq!(extract_command("$"), "");
        assert_eq!(extract_command("  hello  world "), "hello world");
        assert_eq!(extract_command("$\techo\t\tx"), "echo x");
        assert_eq!(extract_command("$$ x"), "$ x");
    }

    #[test]
    fn test_typing_extends_prompt() {
        let mut view = PromptView::new("b");
        type_text(&mut view, "ls");
        assert_eq!(view.last_line(), "$ ls");
        assert_eq!(view.caret_column(), 4);
    }

    #[test]
    fn test_backspace_cannot_remove_prefix() {
        let mut view = PromptView::new("b");
        for _ in 0..5 {
            assert_eq!(
                view.handle_event(&TuiEvent::Backspace),
                Some(PromptEvent::Suppressed)
            );
        }
        assert_eq!(view.text(), "b\n$ ");
    }

    #[test]
    fn test_backspace_deletes_typed_text_only() {
        let mut view = PromptView::new("b");
        type_text(&mut view, "abc");
        for _ in 0..10 {
            view.handle_event(&TuiEvent::Backspace);
        }
        assert_eq!(view.last_line(), "$ ");
    }

    #[test]
    fn test_backspace_guard_applies_mid_line_too() {
        let mut view = PromptView::new("b");
        type_text(&mut view, "xyz");
        view.handle_event(&TuiEvent::CursorHome);
        view.handle_event(&TuiEvent::CursorRight);
        view.handle_event(&TuiEvent::CursorRight);
        assert_eq!(
            view.handle_event(&TuiEvent::Backspace),
            Some(PromptEvent::Suppressed)
        );
        assert_eq!(view.last_line(), "$ xyz");
    }

    #[test]
    fn test_submit_without_handler_changes_nothing() {
        let mut view = PromptView::new("b");
        type_text(&mut view, "pwd");
        assert_eq!(
            view.handle_event(&TuiEvent::Submit),
            Some(PromptEvent::Submitted("pwd".into()))
        );
        assert_eq!(view.text(), "b\n$ pwd", "Return never inserts a newline itself");
    }

    #[test]
    fn test_submit_dispatches_to_controller() {
        let executor = ScriptedExecutor::new(vec![CommandResult {
            stdout: "hello".into(),
            stderr: String::new(),
            exit_code: 0,
        }]);
        let calls = executor.calls();
        let mut view = PromptView::new("b");
        view.set_submission_handler(Box::new(Controller::new(executor)));

        type_text(&mut view, "  echo   hello ");
        view.handle_event(&TuiEvent::Submit);

        assert_eq!(*calls.borrow(), vec!["echo hello".to_string()]);
        assert_eq!(view.lines(), vec!["b", "$   echo   hello ", "hello", "$ "]);
        assert_eq!(view.caret_column(), 2);
    }

    #[test]
    fn test_handler_survives_multiple_submissions() {
        let executor = ScriptedExecutor::new(vec![]);
        let calls = executor.calls();
        let mut view = PromptView::new("b");
        view.set_submission_handler(Box::new(Controller::new(executor)));

        type_text(&mut view, "a");
        view.handle_event(&TuiEvent::Submit);
        type_text(&mut view, "b");
        view.handle_event(&TuiEvent::Submit);

        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_return_on_transcript_line_submits_that_line() {
        let executor = ScriptedExecutor::new(vec![]);
        let calls = executor.calls();
        let mut view = PromptView::new("uname");
        view.set_submission_handler(Box::new(Controller::new(executor)));

        view.handle_event(&TuiEvent::CursorUp);
        view.handle_event(&TuiEvent::Submit);

        assert_eq!(*calls.borrow(), vec!["uname".to_string()]);
        assert_eq!(view.last_line(), "$ ");
    }

    #[test]
    fn test_append_output_preserves_line_breaks() {
        let mut view = PromptView::new("b");
        view.append_output("a\nb");
        assert_eq!(view.lines(), vec!["b", "$ ", "a", "b", "$ "]);
    }

    #[test]
    fn test_append_empty_output_only_prompts() {
        let mut view = PromptView::new("b");
        view.append_output("");
        assert_eq!(view.lines(), vec!["b", "$ ", "$ "]);
    }

    #[test]
    fn test_new_prompt_moves_caret_to_end_first() {
        let mut view = PromptView::new("b");
        type_text(&mut view, "abc");
        view.handle_event(&TuiEvent::CursorUp);
        view.new_prompt();
        assert_eq!(view.lines(), vec!["b", "$ abc", "$ "]);
        assert_eq!(view.caret_line(), 2);
    }

    #[test]
    fn test_paste_inserts_at_caret() {
        let mut view = PromptView::new("b");
        view.handle_event(&TuiEvent::Paste("ls -l".into()));
        assert_eq!(view.last_line(), "$ ls -l");
    }

    #[test]
    fn test_tab_is_edited_and_drawn_as_space() {
        let mut view = PromptView::new("b");
        type_text(&mut view, "echo\tx");
        assert_eq!(view.last_line(), "$ echo\tx");
        assert_eq!(extract_command(view.current_line()), "echo x");

        let backend = TestBackend::new(20, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| view.render(f, f.area())).unwrap();
        assert!(screen_text(&terminal).contains("$ echo x"));
    }

    #[test]
    fn test_scroll_events_emit_nothing() {
        let mut view = PromptView::new("b");
        assert_eq!(view.handle_event(&TuiEvent::ScrollUp), None);
        assert_eq!(view.handle_event(&TuiEvent::ScrollPageDown), None);
        assert_eq!(view.text(), "b\n$ ");
    }

    #[test]
    fn test_render_shows_banner_and_prompt() {
        let backend = TestBackend::new(40, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut view = PromptView::new("SE Terminal NLP-Ready");
        type_text(&mut view, "ls");

        terminal.draw(|f| view.render(f, f.area())).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("SE Terminal NLP-Ready"));
        assert!(text.contains("$ ls"));
    }

    #[test]
    fn test_render_uses_terminal_colors() {
        let backend = TestBackend::new(20, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut view = PromptView::new("x");

        terminal.draw(|f| view.render(f, f.area())).unwrap();

        let cell = &terminal.backend().buffer().content()[0];
        assert_eq!(cell.fg, FOREGROUND);
        assert_eq!(cell.bg, BACKGROUND);
    }

    #[test]
    fn test_render_keeps_prompt_visible_when_transcript_overflows() {
        let backend = TestBackend::new(30, 4);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut view = PromptView::new("banner");
        for i in 0..20 {
            view.append_output(&format!("line {i}"));
        }
        type_text(&mut view, "tail");

        terminal.draw(|f| view.render(f, f.area())).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("$ tail"));
        assert!(!text.contains("banner"));
    }

    #[test]
    fn test_scrolling_up_reveals_earlier_lines() {
        let backend = TestBackend::new(30, 4);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut view = PromptView::new("banner");
        for i in 0..20 {
            view.append_output(&format!("line {i}"));
        }
        terminal.draw(|f| view.render(f, f.area())).unwrap();

        for _ in 0..100 {
            view.handle_event(&TuiEvent::ScrollUp);
        }
        terminal.draw(|f| view.render(f, f.area())).unwrap();
        assert!(screen_text(&terminal).contains("banner"));

        // Typing re-attaches the viewport to the caret
        view.handle_event(&TuiEvent::InputChar('x'));
        terminal.draw(|f| view.render(f, f.area())).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("$ x"));
        assert!(!text.contains("banner"));
    }

    #[test]
    fn test_render_wraps_long_lines() {
        let backend = TestBackend::new(11, 4);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut view = PromptView::new("b");
        // 10 content columns: "$ 01234567" then "89"
        type_text(&mut view, "0123456789");

        terminal.draw(|f| view.render(f, f.area())).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("$ 01234567"));
        assert!(text.contains("89"));
    }
}
