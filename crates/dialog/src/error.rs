use {
    chrono::{DateTime, Utc},
    parley_channels::IncomingMessage,
};

/// What ended a dialog early: the triggering message (none when the wait
/// itself ran out) and when it happened.
#[derive(Debug, Clone)]
pub struct Interrupt {
    pub message: Option<IncomingMessage>,
    pub at: DateTime<Utc>,
}

impl Interrupt {
    pub fn now(message: Option<IncomingMessage>) -> Self {
        Self {
            message,
            at: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    /// The user typed the cancel keyword.
    #[error("dialog cancelled")]
    Cancelled(Interrupt),

    /// No acceptable reply before the deadline.
    #[error("dialog timed out")]
    TimedOut(Interrupt),

    /// A reply target of the requested style was asked for but never set.
    #[error("this session was not set up for use with {expected} reply targets")]
    MissingReplyTarget { expected: &'static str },

    /// The question's own constraints contradict each other.
    #[error("invalid question: {message}")]
    InvalidQuestion { message: String },

    #[error(transparent)]
    Channel(#[from] parley_channels::Error),

    /// Raised by a caller-supplied formatter; passed through untouched.
    #[error("formatter failed: {0}")]
    Formatter(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DialogError {
    #[must_use]
    pub fn invalid_question(message: impl Into<String>) -> Self {
        Self::InvalidQuestion {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn formatter(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Formatter(Box::new(source))
    }

    /// Cancelled or timed out: user-driven outcomes that end the dialog.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled(_) | Self::TimedOut(_))
    }

    pub fn interrupt(&self) -> Option<&Interrupt> {
        match self {
            Self::Cancelled(interrupt) | Self::TimedOut(interrupt) => Some(interrupt),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DialogError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_only_for_terminal_errors() {
        let message = IncomingMessage::new("m", "user", "chan").with_content("cancel");
        let cancelled = DialogError::Cancelled(Interrupt::now(Some(message)));
        assert!(cancelled.is_terminal());
        assert_eq!(
            cancelled.interrupt().unwrap().message.as_ref().unwrap().text(),
            "cancel"
        );

        let timed_out = DialogError::TimedOut(Interrupt::now(None));
        assert!(timed_out.interrupt().unwrap().message.is_none());

        let invalid = DialogError::invalid_question("no choices");
        assert!(!invalid.is_terminal());
        assert!(invalid.interrupt().is_none());
    }
}
