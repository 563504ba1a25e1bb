//! Collaborator surface for dialogs.
//!
//! Platform adapters (Discord, console, tests) feed inbound messages through a
//! [`MessageSource`] and receive rendered [`Embed`]s through a [`ReplyTarget`].
//! Nothing in here knows about dialog semantics.

pub mod bus;
pub mod embed;
pub mod error;
pub mod filter;
pub mod message;
pub mod reply;
pub mod source;

pub use {
    bus::MessageBus,
    embed::{Embed, EmbedTemplate},
    error::{Error, Result},
    filter::MessageFilter,
    message::{Attachment, IncomingMessage},
    reply::{CommandContext, Interaction, ReplyTarget},
    source::MessageSource,
};
