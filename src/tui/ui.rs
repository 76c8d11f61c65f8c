use ratatui::Frame;

use crate::tui::component::Component;
use crate::tui::components::PromptView;

/// The whole window is the prompt view.
pub fn draw_ui(frame: &mut Frame, prompt_view: &mut PromptView) {
    let area = frame.area();
    prompt_view.render(frame, area);
}
