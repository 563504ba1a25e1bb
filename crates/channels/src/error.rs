use std::{error::Error as StdError, time::Duration};

/// Crate-wide result type for channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors raised by message sources and reply targets.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No matching message arrived within the wait budget.
    #[error("no matching message within {waited:?}")]
    WaitTimedOut { waited: Duration },

    /// The message source has shut down and will never deliver again.
    #[error("message source closed")]
    Closed,

    /// Operation is currently unavailable (not configured/ready).
    #[error("channel operation unavailable: {message}")]
    Unavailable { message: String },

    /// Wrapped source error from a platform adapter.
    #[error("channel operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error is the wait-budget timeout rather than a failure.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::WaitTimedOut { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn external_keeps_context_and_source() {
        let err = Error::external("write embed", std::io::Error::other("broken pipe"));
        assert_eq!(
            err.to_string(),
            "channel operation failed: write embed: broken pipe"
        );
        assert_eq!(err.source().unwrap().to_string(), "broken pipe");
        assert!(!err.is_timeout());
    }

    #[test]
    fn wait_timeout_is_distinguishable() {
        let err = Error::WaitTimedOut {
            waited: Duration::from_secs(3),
        };
        assert!(err.is_timeout());
        assert!(!Error::Closed.is_timeout());
    }
}
