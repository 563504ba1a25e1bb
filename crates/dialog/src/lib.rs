//! Multi-turn dialogs for chat bots.
//!
//! A [`Dialog`] sends a prompt embed, then a [`Runner`] waits for replies
//! from the issuing user until a [`Formatter`] accepts one, the user cancels
//! or skips, or the session timeout elapses.
//!
//! Flow per question: merge overrides → render prompt → wait → intercept
//! cancel/skip → check → accept | reject (feedback, wait again) | pending.

pub mod config;
pub mod dialog;
pub mod error;
pub mod formatter;
pub mod formatters;
pub mod question;
pub mod render;
pub mod runner;

pub use {
    config::{ConfigOverrides, SessionConfig, secs_to_timeout},
    dialog::Dialog,
    error::{DialogError, Interrupt, Result},
    formatter::{CheckContext, Formatter, Verdict},
    question::{
        ChoiceQuestion, FileQuestion, NumberQuestion, PromptQuestion, Question, Selection,
        TextQuestion,
    },
    runner::{Answer, MIN_WAIT, Runner},
};

/// Constants shared with the config defaults.
pub mod constants {
    pub use parley_config::{CREATOR_REFERENCE, EMBED_COLOR_NEGATIVE};
}
