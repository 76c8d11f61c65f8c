pub mod prompt_view;

pub use prompt_view::{PromptEvent, PromptView};
