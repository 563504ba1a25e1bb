use parley_channels::IncomingMessage;

use crate::{
    CheckContext, Formatter, Result, TextQuestion, Verdict, formatters::MUST_INCLUDE_TEXT,
};

const DEFAULT_BODY: &str = "Please type your response below.";

#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

impl Formatter<TextQuestion> for TextFormatter {
    fn preface(&self, question: &TextQuestion) -> Option<String> {
        question
            .body
            .as_ref()
            .map(|_| "This is a text dialog and requires you to type your response.".into())
    }

    fn body(&self, question: &TextQuestion) -> String {
        question
            .body
            .clone()
            .unwrap_or_else(|| DEFAULT_BODY.into())
    }

    fn check(
        &self,
        _question: &TextQuestion,
        ctx: &mut CheckContext<'_, ()>,
        message: &IncomingMessage,
    ) -> Result<Verdict<String>> {
        let text = message.text().trim();
        if text.is_empty() {
            return Ok(ctx.reject(MUST_INCLUDE_TEXT));
        }
        Ok(Verdict::Accepted(text.to_string()))
    }
}
