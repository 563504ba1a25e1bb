//! The seam between a question spec and what the user sees.

use parley_channels::{Embed, EmbedTemplate, IncomingMessage};

use crate::{Result, question::Question, render};

/// Outcome of checking one reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict<T> {
    /// The dialog is over; this is the answer.
    Accepted(T),
    /// Send this feedback and wait for another reply.
    Rejected(Embed),
    /// Keep waiting without feedback (e.g. more files may follow).
    Pending,
}

/// Everything a formatter may consult or mutate while checking a reply.
pub struct CheckContext<'a, S> {
    error_template: &'a EmbedTemplate,
    /// Accumulator for the current runner invocation.
    pub state: &'a mut S,
}

impl<'a, S> CheckContext<'a, S> {
    pub fn new(error_template: &'a EmbedTemplate, state: &'a mut S) -> Self {
        Self {
            error_template,
            state,
        }
    }

    pub fn error_template(&self) -> &EmbedTemplate {
        self.error_template
    }

    /// A rejection with `message` rendered in italics on the error template.
    pub fn reject<T>(&self, message: impl AsRef<str>) -> Verdict<T> {
        Verdict::Rejected(render::error_embed(
            self.error_template,
            &format!("*{}*", message.as_ref()),
        ))
    }
}

/// Renders a question and judges replies to it.
///
/// Implement this to change wording or validation for a question kind;
/// pass it to [`crate::Dialog::ask`] in place of the default.
pub trait Formatter<Q: Question>: Send + Sync {
    /// Short italic line shown above the body, if any.
    fn preface(&self, question: &Q) -> Option<String>;

    fn body(&self, question: &Q) -> String;

    /// Judge one reply. Errors abort the dialog unchanged.
    fn check(
        &self,
        question: &Q,
        ctx: &mut CheckContext<'_, Q::State>,
        message: &IncomingMessage,
    ) -> Result<Verdict<Q::Value>>;
}

/// `{base} {bound phrase} {end}` for the four combinations of optional bounds.
pub(crate) fn bounded_phrase<T: std::fmt::Display>(
    base: &str,
    end: &str,
    min: Option<T>,
    max: Option<T>,
) -> String {
    match (min, max) {
        (None, None) => format!("{base} {end}"),
        (None, Some(max)) => format!("{base} less than or equal to {max} {end}"),
        (Some(min), None) => format!("{base} greater than or equal to {min} {end}"),
        (Some(min), Some(max)) => {
            format!("{base} between {min} and {max} (inclusive) {end}")
        },
    }
}

/// `"a"`, `"a or b"`, `"a, b or c"`.
pub(crate) fn or_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} or {last}", head.join(", ")),
    }
}
