//! The terminal as a chat channel: stdin lines become messages from a single
//! console user, embeds are printed to stdout.

use std::{io::Write, path::Path, sync::Arc};

use {
    async_trait::async_trait,
    parley_channels::{Attachment, CommandContext, Embed, IncomingMessage, MessageBus},
    tokio::{
        io::{AsyncBufReadExt, BufReader},
        task::JoinHandle,
    },
    tracing::{debug, warn},
};

pub const CONSOLE_USER: &str = "console";
pub const CONSOLE_CHANNEL: &str = "terminal";

/// Prints every embed as plain text.
#[derive(Debug, Default)]
pub struct ConsoleContext;

#[async_trait]
impl CommandContext for ConsoleContext {
    async fn send(&self, embed: Embed) -> parley_channels::Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}\n", embed.to_plain_text())
            .and_then(|()| stdout.flush())
            .map_err(|e| parley_channels::Error::external("write embed to stdout", e))
    }
}

/// Forward stdin to `bus`, one line per dialog wait, closing the bus at EOF.
pub fn spawn_stdin_reader(bus: Arc<MessageBus>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut id: u64 = 0;
        let mut delivered = 0;
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "failed to read stdin");
                    break;
                },
            };
            id += 1;
            let message = parse_line(&id.to_string(), &line).await;

            // Hand each line to a fresh wait so piped input is not dropped
            // while the dialog is between questions.
            bus.until_waiting(delivered).await;
            delivered = bus.waits_started();
            let receivers = bus.publish(message);
            debug!(id, receivers, "published console line");
        }
        debug!("stdin closed");
        bus.close();
    })
}

/// Split a console line into content and `@path` attachments.
pub async fn parse_line(id: &str, line: &str) -> IncomingMessage {
    let mut message = IncomingMessage::new(id, CONSOLE_USER, CONSOLE_CHANNEL);
    let mut words = Vec::new();
    for token in line.split_whitespace() {
        match token.strip_prefix('@').filter(|path| !path.is_empty()) {
            Some(path) => message.attachments.push(attachment_for(Path::new(path)).await),
            None => words.push(token),
        }
    }
    if !words.is_empty() {
        message.content = Some(words.join(" "));
    }
    message
}

async fn attachment_for(path: &Path) -> Attachment {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let size = tokio::fs::metadata(path)
        .await
        .map(|meta| meta.len())
        .unwrap_or_else(|e| {
            debug!(path = %path.display(), error = %e, "attachment size unavailable");
            0
        });

    let mut attachment =
        Attachment::new(filename, format!("file://{}", path.display())).with_size(size);
    if let Some(mime) = mime_guess::from_path(path).first_raw() {
        attachment = attachment.with_content_type(mime);
    }
    attachment
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_line_is_content() {
        let message = parse_line("1", "  3,  1 ").await;
        assert_eq!(message.author_id, CONSOLE_USER);
        assert_eq!(message.content.as_deref(), Some("3, 1"));
        assert!(message.attachments.is_empty());
    }

    #[tokio::test]
    async fn at_tokens_become_attachments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, [0_u8; 12]).unwrap();

        let message = parse_line("2", &format!("@{} done", path.display())).await;
        assert_eq!(message.content.as_deref(), Some("done"));
        let file = &message.attachments[0];
        assert_eq!(file.filename, "shot.png");
        assert_eq!(file.content_type.as_deref(), Some("image/png"));
        assert_eq!(file.size, 12);
    }

    #[tokio::test]
    async fn missing_file_still_attaches() {
        let message = parse_line("3", "@/nonexistent/notes.md").await;
        assert_eq!(message.content, None);
        assert_eq!(message.attachments[0].filename, "notes.md");
        assert_eq!(message.attachments[0].size, 0);
    }

    #[tokio::test]
    async fn lone_at_sign_is_text() {
        let message = parse_line("4", "@").await;
        assert_eq!(message.content.as_deref(), Some("@"));
        assert!(message.attachments.is_empty());
    }
}
