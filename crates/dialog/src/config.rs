//! Session configuration threaded through every question of a dialog.

use std::{fmt, sync::Arc, time::Duration};

use {
    chrono::{DateTime, TimeDelta, Utc},
    parley_channels::{
        CommandContext, Embed, EmbedTemplate, Interaction, MessageFilter, MessageSource,
        ReplyTarget,
    },
    parley_config::{DialogDefaults, EmbedDefaults, StepOverrides},
};

use crate::{DialogError, Result};

/// Immutable settings for one command invocation.
///
/// Shared behind an [`Arc`]; per-question changes go through
/// [`SessionConfig::with_overrides`], which never touches the original.
#[derive(Clone)]
pub struct SessionConfig {
    source: Arc<dyn MessageSource>,
    filter: MessageFilter,
    reply_target: ReplyTarget,
    dialog_template: EmbedTemplate,
    error_template: EmbedTemplate,
    cancellable: bool,
    cancel_keyword: String,
    skippable: bool,
    skip_keyword: String,
    timeout: Option<Duration>,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("reply_target", &self.reply_target)
            .field("cancellable", &self.cancellable)
            .field("cancel_keyword", &self.cancel_keyword)
            .field("skippable", &self.skippable)
            .field("skip_keyword", &self.skip_keyword)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

impl SessionConfig {
    /// A session with the stock defaults: not cancellable, not skippable,
    /// no timeout, keywords `cancel`/`skip`.
    pub fn new(
        source: Arc<dyn MessageSource>,
        filter: MessageFilter,
        reply_target: ReplyTarget,
    ) -> Self {
        Self::from_defaults(
            source,
            filter,
            reply_target,
            &DialogDefaults::default(),
            &EmbedDefaults::default(),
        )
    }

    /// A session seeded from file-based defaults.
    pub fn from_defaults(
        source: Arc<dyn MessageSource>,
        filter: MessageFilter,
        reply_target: ReplyTarget,
        dialog: &DialogDefaults,
        embeds: &EmbedDefaults,
    ) -> Self {
        let mut dialog_template = Embed::default();
        dialog_template.color = embeds.dialog_color;
        dialog_template.footer = embeds.footer_text().map(str::to_string);
        let mut error_template = Embed::default().color(embeds.error_color);
        error_template.footer = dialog_template.footer.clone();

        Self {
            source,
            filter,
            reply_target,
            dialog_template,
            error_template,
            cancellable: dialog.cancellable,
            cancel_keyword: normalize_keyword(&dialog.cancel_keyword),
            skippable: dialog.skippable,
            skip_keyword: normalize_keyword(&dialog.skip_keyword),
            timeout: dialog.timeout_secs.and_then(secs_to_timeout),
        }
    }

    /// Apply `overrides`, returning the same allocation when there are none.
    pub fn with_overrides(self: &Arc<Self>, overrides: ConfigOverrides) -> Arc<Self> {
        if overrides.is_empty() {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        let ConfigOverrides {
            source,
            filter,
            reply_target,
            dialog_template,
            error_template,
            cancellable,
            cancel_keyword,
            skippable,
            skip_keyword,
            timeout,
        } = overrides;

        if let Some(source) = source {
            next.source = source;
        }
        if let Some(filter) = filter {
            next.filter = filter;
        }
        if let Some(reply_target) = reply_target {
            next.reply_target = reply_target;
        }
        if let Some(template) = dialog_template {
            next.dialog_template = template;
        }
        if let Some(template) = error_template {
            next.error_template = template;
        }
        if let Some(cancellable) = cancellable {
            next.cancellable = cancellable;
        }
        if let Some(keyword) = cancel_keyword {
            next.cancel_keyword = normalize_keyword(&keyword);
        }
        if let Some(skippable) = skippable {
            next.skippable = skippable;
        }
        if let Some(keyword) = skip_keyword {
            next.skip_keyword = normalize_keyword(&keyword);
        }
        if let Some(timeout) = timeout {
            next.timeout = timeout;
        }
        Arc::new(next)
    }

    pub fn source(&self) -> &Arc<dyn MessageSource> {
        &self.source
    }

    pub fn filter(&self) -> &MessageFilter {
        &self.filter
    }

    pub fn reply_target(&self) -> &ReplyTarget {
        &self.reply_target
    }

    pub fn dialog_template(&self) -> &EmbedTemplate {
        &self.dialog_template
    }

    pub fn error_template(&self) -> &EmbedTemplate {
        &self.error_template
    }

    pub fn cancellable(&self) -> bool {
        self.cancellable
    }

    pub fn cancel_keyword(&self) -> &str {
        &self.cancel_keyword
    }

    pub fn skippable(&self) -> bool {
        self.skippable
    }

    pub fn skip_keyword(&self) -> &str {
        &self.skip_keyword
    }

    /// Time allowed for a whole question; a zero duration counts as none.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.filter(|timeout| !timeout.is_zero())
    }

    /// Whether `normalized` content should cancel the dialog.
    pub fn is_cancel(&self, normalized: &str) -> bool {
        self.cancellable && !self.cancel_keyword.is_empty() && normalized == self.cancel_keyword
    }

    /// Whether `normalized` content should skip the question.
    pub fn is_skip(&self, normalized: &str) -> bool {
        self.skippable && !self.skip_keyword.is_empty() && normalized == self.skip_keyword
    }

    /// Wall-clock time at which a question sent now would auto-cancel.
    pub fn deadline_timestamp(&self) -> Option<DateTime<Utc>> {
        let timeout = TimeDelta::from_std(self.timeout()?).ok()?;
        Utc::now().checked_add_signed(timeout)
    }

    /// The interaction to reply through, either set directly or behind the
    /// command context.
    ///
    /// Errors when there is none, unless `ignore_missing` asks for `None`.
    pub fn interaction(&self, ignore_missing: bool) -> Result<Option<Arc<dyn Interaction>>> {
        let found = match &self.reply_target {
            ReplyTarget::Interaction(interaction) => Some(Arc::clone(interaction)),
            ReplyTarget::Context(context) => context.interaction(),
        };
        match found {
            None if !ignore_missing => Err(DialogError::MissingReplyTarget {
                expected: "interaction",
            }),
            found => Ok(found),
        }
    }

    /// The command context to reply through.
    ///
    /// Errors when the session targets an interaction, unless
    /// `ignore_missing` asks for `None`.
    pub fn context(&self, ignore_missing: bool) -> Result<Option<Arc<dyn CommandContext>>> {
        match &self.reply_target {
            ReplyTarget::Context(context) => Ok(Some(Arc::clone(context))),
            ReplyTarget::Interaction(_) if ignore_missing => Ok(None),
            ReplyTarget::Interaction(_) => Err(DialogError::MissingReplyTarget {
                expected: "context",
            }),
        }
    }

    /// Send through the best available destination: the interaction
    /// (acknowledging it first if needed), otherwise the command context.
    pub async fn send(&self, embed: Embed) -> Result<()> {
        if let Some(interaction) = self.interaction(true)? {
            if interaction.is_acknowledged() {
                interaction.follow_up(embed).await?;
            } else {
                interaction.respond(embed).await?;
            }
            return Ok(());
        }
        let context = self
            .context(false)?
            .ok_or(DialogError::MissingReplyTarget {
                expected: "context",
            })?;
        context.send(embed).await?;
        Ok(())
    }
}

/// Converts a seconds value from config into a timeout; `0` or less means
/// none.
pub fn secs_to_timeout(secs: f64) -> Option<Duration> {
    (secs > 0.0)
        .then(|| Duration::try_from_secs_f64(secs).ok())
        .flatten()
}

/// Partial [`SessionConfig`]: every set field replaces the session's value.
#[derive(Clone, Default)]
pub struct ConfigOverrides {
    source: Option<Arc<dyn MessageSource>>,
    filter: Option<MessageFilter>,
    reply_target: Option<ReplyTarget>,
    dialog_template: Option<EmbedTemplate>,
    error_template: Option<EmbedTemplate>,
    cancellable: Option<bool>,
    cancel_keyword: Option<String>,
    skippable: Option<bool>,
    skip_keyword: Option<String>,
    timeout: Option<Option<Duration>>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides from a script step. A `timeout_secs` of `0` clears the
    /// session timeout.
    pub fn from_step(step: &StepOverrides) -> Self {
        Self {
            cancellable: step.cancellable,
            skippable: step.skippable,
            timeout: step.timeout_secs.map(secs_to_timeout),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.filter.is_none()
            && self.reply_target.is_none()
            && self.dialog_template.is_none()
            && self.error_template.is_none()
            && self.cancellable.is_none()
            && self.cancel_keyword.is_none()
            && self.skippable.is_none()
            && self.skip_keyword.is_none()
            && self.timeout.is_none()
    }

    #[must_use]
    pub fn source(mut self, source: Arc<dyn MessageSource>) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: MessageFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn reply_target(mut self, reply_target: ReplyTarget) -> Self {
        self.reply_target = Some(reply_target);
        self
    }

    #[must_use]
    pub fn dialog_template(mut self, template: EmbedTemplate) -> Self {
        self.dialog_template = Some(template);
        self
    }

    #[must_use]
    pub fn error_template(mut self, template: EmbedTemplate) -> Self {
        self.error_template = Some(template);
        self
    }

    #[must_use]
    pub fn cancellable(mut self, cancellable: bool) -> Self {
        self.cancellable = Some(cancellable);
        self
    }

    #[must_use]
    pub fn cancel_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.cancel_keyword = Some(keyword.into());
        self
    }

    #[must_use]
    pub fn skippable(mut self, skippable: bool) -> Self {
        self.skippable = Some(skippable);
        self
    }

    #[must_use]
    pub fn skip_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.skip_keyword = Some(keyword.into());
        self
    }

    /// Replace the timeout; `None` removes it.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for ConfigOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigOverrides")
            .field("reply_target", &self.reply_target)
            .field("cancellable", &self.cancellable)
            .field("cancel_keyword", &self.cancel_keyword)
            .field("skippable", &self.skippable)
            .field("skip_keyword", &self.skip_keyword)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use {
        async_trait::async_trait,
        parley_channels::MessageBus,
        parley_config::{CREATOR_REFERENCE, EMBED_COLOR_NEGATIVE},
    };

    use super::*;

    #[derive(Default)]
    struct RecordingInteraction {
        acknowledged: AtomicBool,
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl Interaction for RecordingInteraction {
        fn is_acknowledged(&self) -> bool {
            self.acknowledged.load(Ordering::SeqCst)
        }

        async fn respond(&self, _embed: Embed) -> parley_channels::Result<()> {
            self.acknowledged.store(true, Ordering::SeqCst);
            self.calls.lock().unwrap().push("respond");
            Ok(())
        }

        async fn follow_up(&self, _embed: Embed) -> parley_channels::Result<()> {
            self.calls.lock().unwrap().push("follow_up");
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingContext {
        interaction: Option<Arc<RecordingInteraction>>,
        sent: Mutex<usize>,
    }

    #[async_trait]
    impl CommandContext for RecordingContext {
        fn interaction(&self) -> Option<Arc<dyn Interaction>> {
            self.interaction
                .clone()
                .map(|i| i as Arc<dyn Interaction>)
        }

        async fn send(&self, _embed: Embed) -> parley_channels::Result<()> {
            *self.sent.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn session(target: ReplyTarget) -> Arc<SessionConfig> {
        Arc::new(SessionConfig::new(
            Arc::new(MessageBus::new()),
            MessageFilter::any(),
            target,
        ))
    }

    fn context_session() -> (Arc<SessionConfig>, Arc<RecordingContext>) {
        let context = Arc::new(RecordingContext::default());
        let target = ReplyTarget::Context(Arc::clone(&context) as Arc<dyn CommandContext>);
        (session(target), context)
    }

    #[test]
    fn empty_override_returns_same_allocation() {
        let (config, _) = context_session();
        let same = config.with_overrides(ConfigOverrides::new());
        assert!(Arc::ptr_eq(&config, &same));
    }

    #[test]
    fn override_leaves_original_untouched() {
        let (config, _) = context_session();
        let changed = config.with_overrides(
            ConfigOverrides::new()
                .cancellable(true)
                .cancel_keyword("  STOP ")
                .timeout(Some(Duration::from_secs(30))),
        );

        assert!(!Arc::ptr_eq(&config, &changed));
        assert!(changed.cancellable());
        assert_eq!(changed.cancel_keyword(), "stop");
        assert_eq!(changed.timeout(), Some(Duration::from_secs(30)));

        assert!(!config.cancellable());
        assert_eq!(config.cancel_keyword(), "cancel");
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn non_positive_seconds_mean_no_timeout() {
        assert_eq!(secs_to_timeout(0.0), None);
        assert_eq!(secs_to_timeout(-1.0), None);
        assert_eq!(secs_to_timeout(f64::NAN), None);
        assert_eq!(secs_to_timeout(1.5), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn timeout_override_can_clear() {
        let (config, _) = context_session();
        let timed =
            config.with_overrides(ConfigOverrides::new().timeout(Some(Duration::from_secs(5))));
        let cleared = timed.with_overrides(ConfigOverrides::new().timeout(None));
        assert_eq!(cleared.timeout(), None);
        assert!(cleared.deadline_timestamp().is_none());
        assert!(timed.deadline_timestamp().is_some());
    }

    #[test]
    fn keywords_normalized_from_defaults() {
        let dialog = DialogDefaults {
            cancellable: true,
            cancel_keyword: " Abort ".into(),
            skippable: true,
            skip_keyword: "NEXT".into(),
            timeout_secs: Some(60.0),
        };
        let config = SessionConfig::from_defaults(
            Arc::new(MessageBus::new()),
            MessageFilter::any(),
            ReplyTarget::Context(Arc::new(RecordingContext::default())),
            &dialog,
            &EmbedDefaults::default(),
        );
        assert_eq!(config.cancel_keyword(), "abort");
        assert_eq!(config.skip_keyword(), "next");
        assert!(config.is_cancel("abort"));
        assert!(config.is_skip("next"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.error_template().color, Some(EMBED_COLOR_NEGATIVE));
        assert_eq!(config.dialog_template().footer.as_deref(), Some(CREATOR_REFERENCE));
    }

    #[test]
    fn disabled_keywords_never_match() {
        let (config, _) = context_session();
        assert!(!config.is_cancel("cancel"));
        assert!(!config.is_skip("skip"));

        let blank =
            config.with_overrides(ConfigOverrides::new().cancellable(true).cancel_keyword(" "));
        assert!(!blank.is_cancel(""));
    }

    #[test]
    fn step_overrides_zero_timeout_clears() {
        let overrides = ConfigOverrides::from_step(&StepOverrides {
            timeout_secs: Some(0.0),
            ..Default::default()
        });
        assert!(!overrides.is_empty());

        let (config, _) = context_session();
        let timed =
            config.with_overrides(ConfigOverrides::new().timeout(Some(Duration::from_secs(9))));
        assert_eq!(timed.with_overrides(overrides).timeout(), None);
        assert!(ConfigOverrides::from_step(&StepOverrides::default()).is_empty());
    }

    #[test]
    fn context_target_refuses_interaction_lookup() {
        let (config, _) = context_session();
        assert!(matches!(
            config.interaction(false),
            Err(DialogError::MissingReplyTarget {
                expected: "interaction"
            })
        ));
        assert!(config.interaction(true).unwrap().is_none());
        assert!(config.context(false).unwrap().is_some());
    }

    #[test]
    fn interaction_target_refuses_context_lookup() {
        let config = session(ReplyTarget::Interaction(Arc::new(
            RecordingInteraction::default(),
        )));
        assert!(matches!(
            config.context(false),
            Err(DialogError::MissingReplyTarget {
                expected: "context"
            })
        ));
        assert!(config.context(true).unwrap().is_none());
        assert!(config.interaction(false).unwrap().is_some());
    }

    #[tokio::test]
    async fn interaction_is_acknowledged_then_followed_up() {
        let interaction = Arc::new(RecordingInteraction::default());
        let config = session(ReplyTarget::Interaction(
            Arc::clone(&interaction) as Arc<dyn Interaction>
        ));

        config.send(Embed::default()).await.unwrap();
        config.send(Embed::default()).await.unwrap();

        assert_eq!(*interaction.calls.lock().unwrap(), vec!["respond", "follow_up"]);
    }

    #[tokio::test]
    async fn context_send_goes_to_channel() {
        let (config, context) = context_session();
        config.send(Embed::default()).await.unwrap();
        assert_eq!(*context.sent.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn hybrid_context_prefers_its_interaction() {
        let interaction = Arc::new(RecordingInteraction::default());
        let context = Arc::new(RecordingContext {
            interaction: Some(Arc::clone(&interaction)),
            sent: Mutex::new(0),
        });
        let config = session(ReplyTarget::Context(
            Arc::clone(&context) as Arc<dyn CommandContext>
        ));

        config.send(Embed::default()).await.unwrap();

        assert_eq!(*interaction.calls.lock().unwrap(), vec!["respond"]);
        assert_eq!(*context.sent.lock().unwrap(), 0);
    }
}
