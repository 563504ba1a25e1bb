use {
    chrono::{DateTime, Utc},
    serde::Serialize,
};

/// A file attached to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub filename: String,
    /// MIME type reported by the platform, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub url: String,
    pub size: u64,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            url: url.into(),
            size: 0,
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Lower-cased extension after the last `.`, without the dot.
    ///
    /// Dotfiles such as `.env` and names ending in a dot have no extension.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.filename.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_lowercase())
    }
}

/// A message received from a chat platform.
#[derive(Debug, Clone, Serialize)]
pub struct IncomingMessage {
    pub id: String,
    pub author_id: String,
    pub channel_id: String,
    /// Text content. Platforms report attachment-only messages with no content.
    pub content: Option<String>,
    pub attachments: Vec<Attachment>,
    pub received_at: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(
        id: impl Into<String>,
        author_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            channel_id: channel_id.into(),
            content: None,
            attachments: Vec::new(),
            received_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Raw content, or `""` when the message carried none.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Content trimmed and lower-cased, used for keyword comparisons.
    pub fn normalized_content(&self) -> String {
        self.text().trim().to_lowercase()
    }

    pub fn has_text(&self) -> bool {
        !self.text().is_empty()
    }
}
