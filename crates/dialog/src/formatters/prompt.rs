use {
    chrono::{TimeDelta, Utc},
    parley_channels::IncomingMessage,
};

use crate::{CheckContext, Formatter, PromptQuestion, Result, Verdict};

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptFormatter;

impl Formatter<PromptQuestion> for PromptFormatter {
    fn preface(&self, question: &PromptQuestion) -> Option<String> {
        Some(match question.keyword() {
            Some(keyword) => format!(
                "This is a prompt dialog. Please read the below, and type '{keyword}' once \
                 finished."
            ),
            None => "This is a prompt dialog. Please read the below.".into(),
        })
    }

    fn body(&self, question: &PromptQuestion) -> String {
        let Some(length) = question.length.filter(|l| !l.is_zero()) else {
            return question.body.clone();
        };
        // One extra second so the countdown does not read "ago" before the
        // prompt actually moves on.
        let Some(at) = TimeDelta::from_std(length)
            .ok()
            .and_then(|delta| delta.checked_add(&TimeDelta::seconds(1)))
            .and_then(|delta| Utc::now().checked_add_signed(delta))
        else {
            return question.body.clone();
        };
        format!(
            "{}\n\n*This prompt will automatically continue <t:{}:R>.*",
            question.body,
            at.timestamp()
        )
    }

    fn check(
        &self,
        question: &PromptQuestion,
        _ctx: &mut CheckContext<'_, ()>,
        message: &IncomingMessage,
    ) -> Result<Verdict<()>> {
        match question.keyword() {
            Some(keyword) if message.normalized_content() == keyword => Ok(Verdict::Accepted(())),
            _ => Ok(Verdict::Pending),
        }
    }
}
