/// Config schema types (session defaults, embed templates, dialog scripts).
use serde::{Deserialize, Serialize};

/// Color used for error and terminal-notice embeds.
pub const EMBED_COLOR_NEGATIVE: u32 = 0xeb4747;

/// Footer stamped onto every embed unless configured otherwise.
pub const CREATOR_REFERENCE: &str = "https://github.com/parley-rs/parley";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParleyConfig {
    pub dialog: DialogDefaults,
    pub embeds: EmbedDefaults,
    pub script: DialogScript,
}

/// Session defaults applied to every dialog before per-question overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogDefaults {
    /// Whether typing the cancel keyword aborts the dialog.
    pub cancellable: bool,
    pub cancel_keyword: String,
    /// Whether typing the skip keyword skips the current question.
    pub skippable: bool,
    pub skip_keyword: String,
    /// Seconds before an unanswered question times out. Unset waits forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<f64>,
}

impl Default for DialogDefaults {
    fn default() -> Self {
        Self {
            cancellable: false,
            cancel_keyword: "cancel".into(),
            skippable: false,
            skip_keyword: "skip".into(),
            timeout_secs: None,
        }
    }
}

/// Base templates for dialog and error embeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialog_color: Option<u32>,
    pub error_color: u32,
    /// Footer on every embed. An empty string disables it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Default for EmbedDefaults {
    fn default() -> Self {
        Self {
            dialog_color: None,
            error_color: EMBED_COLOR_NEGATIVE,
            footer: Some(CREATOR_REFERENCE.into()),
        }
    }
}

impl EmbedDefaults {
    /// Footer text, treating an empty string as "no footer".
    pub fn footer_text(&self) -> Option<&str> {
        self.footer.as_deref().filter(|f| !f.is_empty())
    }
}

/// A sequence of questions run by the `parley run` command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogScript {
    /// Heading shown before the first step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub steps: Vec<ScriptStep>,
}

/// One question in a [`DialogScript`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Key the answer is recorded under.
    pub name: String,
    pub title: String,
    #[serde(flatten)]
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "StepOverrides::is_empty")]
    pub overrides: StepOverrides,
}

/// Per-kind question parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    Prompt {
        body: String,
        /// Seconds after which the prompt continues on its own.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length_secs: Option<f64>,
        /// Keyword that continues the prompt. Empty disables it.
        #[serde(default = "default_continue_keyword")]
        continue_keyword: String,
    },
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Choice {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
        choices: Vec<String>,
        /// Keys typed to select each choice. Defaults to `1..=n`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        keys: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
        #[serde(default = "default_true")]
        dedupe: bool,
    },
    File {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        allowed_mimetypes: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        allowed_extensions: Vec<String>,
        #[serde(default = "default_finished_keyword")]
        finished_keyword: String,
    },
}

impl StepKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Prompt { .. } => "prompt",
            Self::Text { .. } => "text",
            Self::Number { .. } => "number",
            Self::Choice { .. } => "choice",
            Self::File { .. } => "file",
        }
    }
}

/// Session settings replaced for a single step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skippable: Option<bool>,
    /// `0` clears the session timeout for this step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<f64>,
}

impl StepOverrides {
    pub fn is_empty(&self) -> bool {
        self.cancellable.is_none() && self.skippable.is_none() && self.timeout_secs.is_none()
    }
}

fn default_continue_keyword() -> String {
    "continue".into()
}

fn default_finished_keyword() -> String {
    "done".into()
}

fn default_true() -> bool {
    true
}
