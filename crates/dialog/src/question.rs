//! What is being asked: one plain-data spec per question kind.

use std::{collections::HashSet, time::Duration};

use parley_channels::Attachment;

use crate::{
    DialogError, Result,
    formatter::Formatter,
    formatters::{ChoiceFormatter, FileFormatter, NumberFormatter, PromptFormatter, TextFormatter},
};

/// A question kind: the value it produces, the accumulator threaded through
/// its checks, and the formatter used when the caller supplies none.
pub trait Question: Send + Sync + Sized + 'static {
    /// Short name used in logs.
    const KIND: &'static str;

    type Value: Send;
    /// Mutable state living for one runner invocation.
    type State: Default + Send;

    /// Reject contradictory constraints before anything is sent.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn default_formatter() -> &'static dyn Formatter<Self>;
}

/// Shows a notice and waits for a continue keyword and/or a fixed length.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptQuestion {
    pub body: String,
    /// Continue automatically after this long.
    pub length: Option<Duration>,
    pub continue_keyword: Option<String>,
}

impl PromptQuestion {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            length: None,
            continue_keyword: Some("continue".into()),
        }
    }

    #[must_use]
    pub fn length(mut self, length: Duration) -> Self {
        self.length = Some(length);
        self
    }

    /// `None` (or a blank keyword) leaves only the length to end the prompt.
    #[must_use]
    pub fn continue_keyword(mut self, keyword: Option<&str>) -> Self {
        self.continue_keyword = keyword
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty());
        self
    }

    pub(crate) fn keyword(&self) -> Option<String> {
        self.continue_keyword
            .as_deref()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
    }
}

impl Question for PromptQuestion {
    const KIND: &'static str = "prompt";

    type State = ();
    type Value = ();

    fn validate(&self) -> Result<()> {
        if self.length.is_none() && self.keyword().is_none() {
            return Err(DialogError::invalid_question(
                "one of 'length' or 'continue_keyword' must be set",
            ));
        }
        Ok(())
    }

    fn default_formatter() -> &'static dyn Formatter<Self> {
        &PromptFormatter
    }
}

/// Free-form text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextQuestion {
    pub body: Option<String>,
}

impl TextQuestion {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl Question for TextQuestion {
    const KIND: &'static str = "text";

    type State = ();
    type Value = String;

    fn default_formatter() -> &'static dyn Formatter<Self> {
        &TextFormatter
    }
}

/// A floating-point number within optional inclusive bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberQuestion {
    pub body: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumberQuestion {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

impl Question for NumberQuestion {
    const KIND: &'static str = "number";

    type State = ();
    type Value = f64;

    fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min, self.max)
            && min > max
        {
            return Err(DialogError::invalid_question(format!(
                "min ({min}) must not be greater than max ({max})"
            )));
        }
        Ok(())
    }

    fn default_formatter() -> &'static dyn Formatter<Self> {
        &NumberFormatter
    }
}

/// One or more labels picked by typing their keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceQuestion {
    pub body: Option<String>,
    pub choices: Vec<String>,
    /// Key typed for each choice, parallel to `choices`.
    pub keys: Vec<String>,
    pub min: Option<usize>,
    pub max: Option<usize>,
    /// Collapse repeated keys, keeping the first occurrence.
    pub dedupe: bool,
}

impl ChoiceQuestion {
    /// Keys default to `1`, `2`, ... in choice order.
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        let keys = (1..=choices.len()).map(|i| i.to_string()).collect();
        Self {
            body: None,
            choices,
            keys,
            min: None,
            max: None,
            dedupe: true,
        }
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Custom keys; an empty list keeps the numbered defaults.
    #[must_use]
    pub fn keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if !keys.is_empty() {
            self.keys = keys;
        }
        self
    }

    #[must_use]
    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub(crate) fn index_of(&self, key: &str) -> Option<usize> {
        self.keys
            .iter()
            .position(|k| k == key)
            .filter(|&i| i < self.choices.len())
    }
}

impl Question for ChoiceQuestion {
    const KIND: &'static str = "choice";

    type State = ();
    type Value = Selection;

    fn validate(&self) -> Result<()> {
        if self.choices.is_empty() {
            return Err(DialogError::invalid_question("at least one choice is required"));
        }
        if self.keys.len() != self.choices.len() {
            return Err(DialogError::invalid_question(format!(
                "{} keys were given for {} choices",
                self.keys.len(),
                self.choices.len()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.keys.iter().find(|k| !seen.insert(k.as_str())) {
            return Err(DialogError::invalid_question(format!("duplicate key '{dup}'")));
        }
        if let Some(max) = self.max
            && max > self.choices.len()
        {
            return Err(DialogError::invalid_question(format!(
                "max ({max}) exceeds the {} available choices",
                self.choices.len()
            )));
        }
        validate_bounds(self.min, self.max)
    }

    fn default_formatter() -> &'static dyn Formatter<Self> {
        &ChoiceFormatter
    }
}

/// The accepted answer to a [`ChoiceQuestion`], in the order the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub labels: Vec<String>,
    pub indices: Vec<usize>,
}

/// A batch of uploads, finished by typing a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileQuestion {
    pub body: Option<String>,
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub allowed_mimetypes: Vec<String>,
    pub allowed_extensions: Vec<String>,
    pub finished_keyword: String,
}

impl Default for FileQuestion {
    fn default() -> Self {
        Self {
            body: None,
            min: None,
            max: None,
            allowed_mimetypes: Vec::new(),
            allowed_extensions: Vec::new(),
            finished_keyword: "done".into(),
        }
    }
}

impl FileQuestion {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn allowed_mimetypes<I, S>(mut self, mimetypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_mimetypes = mimetypes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn finished_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.finished_keyword = keyword.into();
        self
    }

    pub(crate) fn normalized_finished_keyword(&self) -> String {
        self.finished_keyword.trim().to_lowercase()
    }

    /// Every accepted extension, lower-cased and without the dot: explicit
    /// extensions first, then those known for each allowed MIME type.
    ///
    /// Empty means any file type is accepted.
    pub fn resolved_extensions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |ext: &str| {
            let ext = ext.trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !out.contains(&ext) {
                out.push(ext);
            }
        };
        for ext in &self.allowed_extensions {
            push(ext.as_str());
        }
        for mimetype in &self.allowed_mimetypes {
            let mimetype = mimetype.trim().to_lowercase();
            for ext in mime_guess::get_mime_extensions_str(&mimetype).unwrap_or_default() {
                push(*ext);
            }
        }
        out
    }
}

impl Question for FileQuestion {
    const KIND: &'static str = "file";

    type State = Vec<Attachment>;
    type Value = Vec<Attachment>;

    fn validate(&self) -> Result<()> {
        if self.normalized_finished_keyword().is_empty() {
            return Err(DialogError::invalid_question("finished keyword must not be empty"));
        }
        validate_bounds(self.min, self.max)
    }

    fn default_formatter() -> &'static dyn Formatter<Self> {
        &FileFormatter
    }
}

fn validate_bounds(min: Option<usize>, max: Option<usize>) -> Result<()> {
    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(DialogError::invalid_question(format!(
            "min ({min}) must not be greater than max ({max})"
        )));
    }
    Ok(())
}
