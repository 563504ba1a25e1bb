use std::time::Duration;

use async_trait::async_trait;

use crate::{Result, filter::MessageFilter, message::IncomingMessage};

/// Awaitable source of inbound messages.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Wait for the next message accepted by `filter`.
    ///
    /// With a `timeout`, returns [`crate::Error::WaitTimedOut`] once it
    /// elapses without a match. Without one, waits until a match arrives or
    /// the source closes.
    async fn wait_for(
        &self,
        filter: &MessageFilter,
        timeout: Option<Duration>,
    ) -> Result<IncomingMessage>;
}
