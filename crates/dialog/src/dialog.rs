//! The façade: one call per question kind.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    ChoiceQuestion, ConfigOverrides, DialogError, FileQuestion, Formatter, NumberQuestion,
    PromptQuestion, Question, Result, Runner, Selection, SessionConfig, TextQuestion, render,
};

/// Asks questions within one command invocation.
///
/// Every kind returns `Ok(Some(value))` once answered and `Ok(None)` when
/// skipped. Cancellation and timeouts are reported to the user before the
/// matching [`DialogError`] is returned.
#[derive(Debug, Clone)]
pub struct Dialog {
    config: Arc<SessionConfig>,
}

impl Dialog {
    pub fn new(config: Arc<SessionConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Arc<SessionConfig> {
        &self.config
    }

    /// Ask any question, optionally rendering and checking it with a custom
    /// formatter instead of the kind's default.
    pub async fn ask<Q: Question>(
        &self,
        title: &str,
        question: &Q,
        formatter: Option<&dyn Formatter<Q>>,
        overrides: ConfigOverrides,
    ) -> Result<Option<Q::Value>> {
        question.validate()?;
        let config = self.config.with_overrides(overrides);
        let formatter = match formatter {
            Some(formatter) => formatter,
            None => Q::default_formatter(),
        };

        let preface = formatter.preface(question);
        let body = formatter.body(question);
        debug!(kind = Q::KIND, title, "sending dialog");
        config
            .send(render::dialog_embed(title, preface.as_deref(), &body, &config))
            .await?;

        match Runner::new(&config).run(question, formatter).await {
            Ok(answer) => Ok(answer.value),
            Err(e) => Err(notify(&config, e).await),
        }
    }

    /// Show a notice until the continue keyword arrives or `length` elapses.
    pub async fn prompt(
        &self,
        title: &str,
        question: &PromptQuestion,
        formatter: Option<&dyn Formatter<PromptQuestion>>,
        overrides: ConfigOverrides,
    ) -> Result<()> {
        question.validate()?;
        let config = self.config.with_overrides(overrides);
        let formatter = match formatter {
            Some(formatter) => formatter,
            None => PromptQuestion::default_formatter(),
        };

        let preface = formatter.preface(question);
        let body = formatter.body(question);
        config
            .send(render::dialog_embed(title, preface.as_deref(), &body, &config))
            .await?;

        // The loop runs for the prompt's own length, not the session timeout
        // announced above.
        let looping = config.with_overrides(ConfigOverrides::new().timeout(question.length));
        match Runner::new(&looping).run(question, formatter).await {
            Ok(_) | Err(DialogError::TimedOut(_)) => Ok(()),
            Err(e) => Err(notify(&config, e).await),
        }
    }

    pub async fn text(
        &self,
        title: &str,
        question: &TextQuestion,
        overrides: ConfigOverrides,
    ) -> Result<Option<String>> {
        self.ask(title, question, None, overrides).await
    }

    pub async fn number(
        &self,
        title: &str,
        question: &NumberQuestion,
        overrides: ConfigOverrides,
    ) -> Result<Option<f64>> {
        self.ask(title, question, None, overrides).await
    }

    pub async fn choice(
        &self,
        title: &str,
        question: &ChoiceQuestion,
        overrides: ConfigOverrides,
    ) -> Result<Option<Selection>> {
        self.ask(title, question, None, overrides).await
    }

    pub async fn file(
        &self,
        title: &str,
        question: &FileQuestion,
        overrides: ConfigOverrides,
    ) -> Result<Option<Vec<parley_channels::Attachment>>> {
        self.ask(title, question, None, overrides).await
    }

    /// Send the terminal notice for a cancelled or timed-out dialog.
    ///
    /// For callers running a [`Runner`] directly. Other errors are returned
    /// unchanged.
    pub async fn report(&self, error: DialogError) -> Result<()> {
        let embed = match error {
            DialogError::Cancelled(_) => render::cancelled_embed(&self.config),
            DialogError::TimedOut(_) => render::timed_out_embed(&self.config),
            _ => return Err(error),
        };
        self.config.send(embed).await
    }
}

/// Tell the user why the dialog ended, then hand the error back.
async fn notify(config: &SessionConfig, error: DialogError) -> DialogError {
    let embed = match error {
        DialogError::Cancelled(_) => render::cancelled_embed(config),
        DialogError::TimedOut(_) => render::timed_out_embed(config),
        _ => return error,
    };
    if let Err(e) = config.send(embed).await {
        warn!(error = %e, "failed to send terminal notice");
    }
    error
}
