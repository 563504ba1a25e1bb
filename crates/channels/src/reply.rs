use std::{fmt, sync::Arc};

use async_trait::async_trait;

use crate::{Result, embed::Embed};

/// An interaction-style destination (slash command, button press).
///
/// The first reply must acknowledge the interaction; later replies are
/// follow-ups.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Whether the interaction has already received its initial response.
    fn is_acknowledged(&self) -> bool;

    /// Send the initial acknowledgment.
    async fn respond(&self, embed: Embed) -> Result<()>;

    /// Send a follow-up after the interaction has been acknowledged.
    async fn follow_up(&self, embed: Embed) -> Result<()>;
}

/// A message-context-style destination (prefix command invocation).
#[async_trait]
pub trait CommandContext: Send + Sync {
    /// The interaction behind this context, for hybrid commands invoked as
    /// slash commands.
    fn interaction(&self) -> Option<Arc<dyn Interaction>> {
        None
    }

    /// Send into the same channel/thread the context originated from.
    async fn send(&self, embed: Embed) -> Result<()>;
}

/// Where a dialog sends its prompts and feedback.
#[derive(Clone)]
pub enum ReplyTarget {
    Interaction(Arc<dyn Interaction>),
    Context(Arc<dyn CommandContext>),
}

impl ReplyTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Interaction(_) => "interaction",
            Self::Context(_) => "context",
        }
    }
}

impl fmt::Debug for ReplyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReplyTarget::{}", self.kind())
    }
}
