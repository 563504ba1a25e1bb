//! Embeds sent by a dialog: the question itself, feedback, and terminal notices.

use parley_channels::{Embed, EmbedTemplate};

use crate::SessionConfig;

pub const CANCELLED_NOTICE: &str = "*This command has been cancelled.*";
pub const TIMED_OUT_NOTICE: &str = "*This command has timed out.*";

/// The question embed: title plus preface, body and postface separated by
/// blank lines.
pub fn dialog_embed(
    title: &str,
    preface: Option<&str>,
    body: &str,
    config: &SessionConfig,
) -> Embed {
    let mut parts = Vec::with_capacity(3);
    if let Some(preface) = preface.filter(|p| !p.is_empty()) {
        parts.push(format!("*`{preface}`*"));
    }
    if !body.is_empty() {
        parts.push(body.to_string());
    }
    let postface = postface(config);
    if !postface.is_empty() {
        parts.push(format!("*{postface}*"));
    }
    Embed::from_template(config.dialog_template())
        .title(title)
        .description(parts.join("\n\n"))
}

pub fn error_embed(template: &EmbedTemplate, description: &str) -> Embed {
    Embed::from_template(template).description(description)
}

/// Notes on how to leave the dialog: available keywords, then the deadline.
pub fn postface(config: &SessionConfig) -> String {
    let cancel = config
        .cancellable()
        .then(|| format!("**`{}`** to cancel", config.cancel_keyword()));
    let skip = config
        .skippable()
        .then(|| format!("**`{}`** to skip", config.skip_keyword()));

    let mut sentences = Vec::new();
    match (cancel, skip) {
        (Some(cancel), Some(skip)) => sentences.push(format!("You may type {cancel} or {skip}.")),
        (Some(only), None) | (None, Some(only)) => sentences.push(format!("You may type {only}.")),
        (None, None) => {},
    }
    if let Some(deadline) = config.deadline_timestamp() {
        sentences.push(format!(
            "This dialog will be automatically cancelled <t:{}:R> if not responded to.",
            deadline.timestamp()
        ));
    }
    sentences.join(" ")
}

pub fn cancelled_embed(config: &SessionConfig) -> Embed {
    error_embed(config.error_template(), CANCELLED_NOTICE)
}

pub fn timed_out_embed(config: &SessionConfig) -> Embed {
    error_embed(config.error_template(), TIMED_OUT_NOTICE)
}
