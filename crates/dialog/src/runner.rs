//! The collection loop: wait, intercept cancel/skip, check, repeat.

use std::time::Duration;

use {
    parley_channels::IncomingMessage,
    tokio::time::Instant,
    tracing::{debug, info, warn},
};

use crate::{
    CheckContext, DialogError, Formatter, Interrupt, Question, Result, SessionConfig, Verdict,
};

/// Remaining budgets below this are treated as already expired.
pub const MIN_WAIT: Duration = Duration::from_secs(2);

/// The message that ended a question and its value; `None` when skipped.
#[derive(Debug, Clone)]
pub struct Answer<T> {
    pub message: IncomingMessage,
    pub value: Option<T>,
}

impl<T> Answer<T> {
    pub fn is_skipped(&self) -> bool {
        self.value.is_none()
    }
}

/// Runs one question against a session until it is answered, skipped,
/// cancelled or out of time.
pub struct Runner<'a> {
    config: &'a SessionConfig,
}

impl<'a> Runner<'a> {
    pub fn new(config: &'a SessionConfig) -> Self {
        Self { config }
    }

    pub async fn run<Q: Question>(
        &self,
        question: &Q,
        formatter: &dyn Formatter<Q>,
    ) -> Result<Answer<Q::Value>> {
        question.validate()?;
        let config = self.config;
        let deadline = config.timeout().map(|timeout| Instant::now() + timeout);
        let mut state = Q::State::default();

        loop {
            let remaining = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining < MIN_WAIT {
                        info!(kind = Q::KIND, ?remaining, "dialog timed out");
                        return Err(DialogError::TimedOut(Interrupt::now(None)));
                    }
                    Some(remaining)
                },
                None => None,
            };
            debug!(kind = Q::KIND, ?remaining, "waiting for reply");

            let message = match config.source().wait_for(config.filter(), remaining).await {
                Ok(message) => message,
                Err(e) if e.is_timeout() => {
                    info!(kind = Q::KIND, "dialog timed out");
                    return Err(DialogError::TimedOut(Interrupt::now(None)));
                },
                Err(e) => return Err(e.into()),
            };

            let content = message.normalized_content();
            if config.is_cancel(&content) {
                info!(kind = Q::KIND, author_id = %message.author_id, "dialog cancelled");
                return Err(DialogError::Cancelled(Interrupt::now(Some(message))));
            }
            if config.is_skip(&content) {
                info!(kind = Q::KIND, author_id = %message.author_id, "question skipped");
                return Ok(Answer {
                    message,
                    value: None,
                });
            }

            let mut ctx = CheckContext::new(config.error_template(), &mut state);
            match formatter.check(question, &mut ctx, &message)? {
                Verdict::Accepted(value) => {
                    info!(kind = Q::KIND, author_id = %message.author_id, "answer accepted");
                    return Ok(Answer {
                        message,
                        value: Some(value),
                    });
                },
                Verdict::Rejected(feedback) => {
                    debug!(kind = Q::KIND, message_id = %message.id, "reply rejected");
                    match config.send(feedback).await {
                        Ok(()) => {},
                        Err(DialogError::Channel(e)) => {
                            warn!(kind = Q::KIND, error = %e, "failed to send feedback");
                        },
                        Err(e) => return Err(e),
                    }
                },
                Verdict::Pending => {
                    debug!(kind = Q::KIND, message_id = %message.id, "reply pending");
                },
            }
        }
    }
}
