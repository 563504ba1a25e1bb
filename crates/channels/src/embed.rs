use serde::{Deserialize, Serialize};

/// A rich display object: the unit every dialog message is sent as.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 24-bit RGB color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

/// Base embed that dialog and error messages are stamped from.
pub type EmbedTemplate = Embed;

impl Embed {
    /// Start a new embed from a base template; fields set afterwards win.
    pub fn from_template(template: &EmbedTemplate) -> Self {
        template.clone()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Plain-text rendering for transports without rich embeds.
    pub fn to_plain_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(title) = &self.title {
            parts.push(title.clone());
        }
        if let Some(description) = &self.description {
            parts.push(description.clone());
        }
        if let Some(footer) = &self.footer {
            parts.push(format!("-- {footer}"));
        }
        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_fields_are_overridden() {
        let base = Embed::default().color(0xeb4747).footer("made by parley");
        let embed = Embed::from_template(&base).description("*nope*").color(1);
        assert_eq!(embed.color, Some(1));
        assert_eq!(embed.footer.as_deref(), Some("made by parley"));
        assert_eq!(embed.description.as_deref(), Some("*nope*"));
        assert_eq!(base.description, None);
    }

    #[test]
    fn plain_text_joins_sections() {
        let embed = Embed::default().title("Age").description("Type a number");
        assert_eq!(embed.to_plain_text(), "Age\n\nType a number");
    }
}
