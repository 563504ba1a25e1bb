use std::{fmt, sync::Arc};

use crate::message::IncomingMessage;

/// Identity predicate deciding which inbound messages belong to a dialog.
///
/// Cheap to clone; every wait in a dialog shares the same predicate.
#[derive(Clone)]
pub struct MessageFilter(Arc<dyn Fn(&IncomingMessage) -> bool + Send + Sync>);

impl MessageFilter {
    pub fn new(predicate: impl Fn(&IncomingMessage) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Accept every message.
    pub fn any() -> Self {
        Self::new(|_| true)
    }

    /// Messages written by `author_id`, in any channel.
    pub fn from_author(author_id: impl Into<String>) -> Self {
        let author_id = author_id.into();
        Self::new(move |msg| msg.author_id == author_id)
    }

    /// Messages written by `author_id` in `channel_id` only.
    pub fn from_author_in(author_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        let author_id = author_id.into();
        let channel_id = channel_id.into();
        Self::new(move |msg| msg.author_id == author_id && msg.channel_id == channel_id)
    }

    pub fn matches(&self, message: &IncomingMessage) -> bool {
        (self.0)(message)
    }
}

impl fmt::Debug for MessageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MessageFilter(..)")
    }
}
