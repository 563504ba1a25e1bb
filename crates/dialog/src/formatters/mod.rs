//! Default formatters, one per question kind.

mod choice;
mod file;
mod number;
mod prompt;
mod text;

pub use {
    choice::ChoiceFormatter, file::FileFormatter, number::NumberFormatter,
    prompt::PromptFormatter, text::TextFormatter,
};

pub(crate) const MUST_INCLUDE_TEXT: &str = "Your response must include text.";
