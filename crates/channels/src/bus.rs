//! In-memory message fan-out.
//!
//! Platform handlers publish every inbound message; each pending dialog wait
//! holds its own subscription and applies its own filter, so independent
//! dialogs never block each other.

use std::time::Duration;

use {
    async_trait::async_trait,
    tokio::sync::{broadcast, watch},
    tracing::{debug, warn},
};

use crate::{Error, Result, filter::MessageFilter, message::IncomingMessage, source::MessageSource};

const DEFAULT_CAPACITY: usize = 256;

/// Broadcast-backed [`MessageSource`].
pub struct MessageBus {
    sender: broadcast::Sender<IncomingMessage>,
    closed: watch::Sender<bool>,
    waits_started: watch::Sender<u64>,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// `capacity` bounds how far a slow waiter may fall behind before it
    /// starts skipping messages.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        let (closed, _) = watch::channel(false);
        let (waits_started, _) = watch::channel(0);
        Self {
            sender,
            closed,
            waits_started,
        }
    }

    /// Deliver `message` to every active waiter. Returns how many waiters
    /// received it; messages published while nobody waits are dropped.
    pub fn publish(&self, message: IncomingMessage) -> usize {
        match self.sender.send(message) {
            Ok(count) => count,
            Err(broadcast::error::SendError(message)) => {
                debug!(message_id = %message.id, "no waiters, dropping message");
                0
            },
        }
    }

    /// Wake every waiter with [`Error::Closed`]; later waits fail immediately.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Total number of waits that have subscribed so far.
    ///
    /// A message published after this counter moves past a previously
    /// observed value is guaranteed to reach the newer wait.
    pub fn waits_started(&self) -> u64 {
        *self.waits_started.borrow()
    }

    /// Resolve once more than `seen` waits have started.
    ///
    /// Console-style producers use this to hand each input to the next wait
    /// instead of publishing into an empty bus.
    pub async fn until_waiting(&self, seen: u64) {
        let mut waits = self.waits_started.subscribe();
        // The sender lives in `self`, so this only ends by matching.
        let _ = waits.wait_for(|started| *started > seen).await;
    }

    async fn next_match(&self, filter: &MessageFilter) -> Result<IncomingMessage> {
        let mut receiver = self.sender.subscribe();
        let mut closed = self.closed.subscribe();
        self.waits_started.send_modify(|started| *started += 1);

        if *closed.borrow_and_update() {
            return Err(Error::Closed);
        }

        loop {
            tokio::select! {
                biased;
                received = receiver.recv() => match received {
                    Ok(message) if filter.matches(&message) => return Ok(message),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "message bus waiter lagged, skipping messages");
                    },
                    Err(broadcast::error::RecvError::Closed) => return Err(Error::Closed),
                },
                changed = closed.changed() => {
                    if changed.is_err() || *closed.borrow() {
                        return Err(Error::Closed);
                    }
                },
            }
        }
    }
}

#[async_trait]
impl MessageSource for MessageBus {
    async fn wait_for(
        &self,
        filter: &MessageFilter,
        timeout: Option<Duration>,
    ) -> Result<IncomingMessage> {
        match timeout {
            Some(waited) => tokio::time::timeout(waited, self.next_match(filter))
                .await
                .map_err(|_| Error::WaitTimedOut { waited })?,
            None => self.next_match(filter).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn msg(id: &str, author: &str) -> IncomingMessage {
        IncomingMessage::new(id, author, "general").with_content(id)
    }

    #[tokio::test]
    async fn delivers_first_matching_message() {
        let bus = Arc::new(MessageBus::new());
        let waiter = {
            let bus = Arc::clone(&bus);
            tokio::spawn(async move {
                bus.wait_for(&MessageFilter::from_author("alice"), None)
                    .await
            })
        };

        bus.until_waiting(0).await;
        assert_eq!(bus.publish(msg("1", "bob")), 1);
        bus.publish(msg("2", "alice"));

        let got = waiter.await.unwrap().unwrap();
        assert_eq!(got.id, "2");
    }

    #[tokio::test]
    async fn publish_without_waiters_is_dropped() {
        let bus = MessageBus::new();
        assert_eq!(bus.publish(msg("1", "alice")), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_without_match() {
        let bus = MessageBus::new();
        let err = bus
            .wait_for(&MessageFilter::any(), Some(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn close_wakes_waiters() {
        let bus = Arc::new(MessageBus::new());
        let waiter = {
            let bus = Arc::clone(&bus);
            tokio::spawn(async move { bus.wait_for(&MessageFilter::any(), None).await })
        };
        bus.until_waiting(0).await;
        bus.close();

        assert!(matches!(waiter.await.unwrap(), Err(Error::Closed)));
        assert!(bus.is_closed());
        assert!(matches!(
            bus.wait_for(&MessageFilter::any(), None).await,
            Err(Error::Closed)
        ));
    }

    #[tokio::test]
    async fn independent_waiters_each_see_their_own_messages() {
        let bus = Arc::new(MessageBus::new());
        let spawn_waiter = |author: &'static str| {
            let bus = Arc::clone(&bus);
            tokio::spawn(async move {
                bus.wait_for(&MessageFilter::from_author(author), None)
                    .await
            })
        };
        let alice = spawn_waiter("alice");
        let bob = spawn_waiter("bob");

        bus.until_waiting(1).await;
        bus.publish(msg("b1", "bob"));
        bus.publish(msg("a1", "alice"));

        assert_eq!(alice.await.unwrap().unwrap().id, "a1");
        assert_eq!(bob.await.unwrap().unwrap().id, "b1");
    }

    #[tokio::test]
    async fn counts_started_waits() {
        let bus = Arc::new(MessageBus::new());
        assert_eq!(bus.waits_started(), 0);
        let waiter = {
            let bus = Arc::clone(&bus);
            tokio::spawn(async move { bus.wait_for(&MessageFilter::any(), None).await })
        };
        bus.until_waiting(0).await;
        assert_eq!(bus.waits_started(), 1);
        bus.publish(msg("1", "alice"));
        waiter.await.unwrap().unwrap();
        assert_eq!(bus.waits_started(), 1);
    }
}
