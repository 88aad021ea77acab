use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::notification::{Notification, NotificationKind};
use crate::output::{image_url, scrapbox_snippet};
use crate::view_model::{AppViewModel, NotificationView, PreviewView};
use crate::{ImageFormat, PostRef, Settings};

pub type RequestId = u64;

pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(2500);

/// Knobs the host application may override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Origin of the image endpoint, used for the shareable URL.
    pub origin: String,
    /// How long all fields must stay unfocused before a blur submits.
    pub settle_delay: Duration,
    pub notification_ttl: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }
}

/// Identifier plus every setting; equal signatures never trigger a second request.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    post_id: String,
    settings: Settings,
}

impl Signature {
    pub fn new(post_id: &str, settings: &Settings) -> Self {
        Self {
            post_id: post_id.to_string(),
            settings: settings.clone(),
        }
    }
}

/// Armed when a field loses focus; cleared when any field regains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimer {
    pub deadline: Instant,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PendingRequest {
    pub post: PostRef,
    pub settings: Settings,
}

/// The last successfully fetched image and what it was requested with.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewImage {
    pub revision: u64,
    pub post: PostRef,
    pub settings: Settings,
    pub bytes: Arc<[u8]>,
    pub content_type: Option<String>,
}

impl PreviewImage {
    pub fn format(&self) -> ImageFormat {
        self.settings.format
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.post.id, self.settings.format.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    config: CoreConfig,
    input: String,
    settings: Settings,
    current_post: Option<PostRef>,
    last_signature: Option<Signature>,
    editing: bool,
    settle: Option<SettleTimer>,
    loading: bool,
    resolved: bool,
    next_request_id: RequestId,
    pending: BTreeMap<RequestId, PendingRequest>,
    preview: Option<PreviewImage>,
    notifications: Vec<Notification>,
    next_notification_id: u64,
    now: Option<Instant>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current_post(&self) -> Option<&PostRef> {
        self.current_post.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn preview(&self) -> Option<&PreviewImage> {
        self.preview.as_ref()
    }

    pub fn settle_timer(&self) -> Option<SettleTimer> {
        self.settle
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// True when a blur-armed timer has expired and the form may submit on its own.
    ///
    /// A focused field or an in-flight request holds the submission back.
    pub fn should_submit_now(&self, now: Instant) -> bool {
        match self.settle {
            Some(timer) => timer.deadline <= now && !self.editing && !self.loading,
            None => false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            input: self.input.clone(),
            settings: self.settings.clone(),
            loading: self.loading,
            resolved: self.resolved,
            preview: self.preview.as_ref().map(|preview| self.preview_view(preview)),
            notifications: self
                .notifications
                .iter()
                .map(|notification| NotificationView {
                    id: notification.id,
                    severity: notification.kind.severity(),
                    text: notification.kind.to_string(),
                })
                .collect(),
            dirty: self.dirty,
        }
    }

    fn preview_view(&self, preview: &PreviewImage) -> PreviewView {
        let image_url = image_url(&self.config.origin, &preview.post.id, &preview.settings);
        let source_url = preview.post.source_url();
        PreviewView {
            revision: preview.revision,
            bytes: preview.bytes.clone(),
            snippet: scrapbox_snippet(&image_url, &source_url),
            image_url,
            source_url,
        }
    }

    /// Returns whether the state changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_input(&mut self, input: String) {
        if self.input != input {
            self.input = input;
            self.mark_dirty();
        }
    }

    pub(crate) fn settings_mut(&mut self) -> &mut Settings {
        self.mark_dirty();
        &mut self.settings
    }

    pub(crate) fn focus(&mut self) {
        self.editing = true;
        if self.settle.take().is_some() {
            card_logging::card_trace!("settle timer cleared by refocus");
        }
    }

    pub(crate) fn blur(&mut self, at: Instant) {
        self.editing = false;
        self.observe(at);
        self.settle = Some(SettleTimer {
            deadline: at + self.config.settle_delay,
        });
    }

    /// Drops an expired timer, whether or not it was allowed to submit.
    pub(crate) fn take_expired_settle(&mut self, now: Instant) -> bool {
        match self.settle {
            Some(timer) if timer.deadline <= now => {
                self.settle = None;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn observe(&mut self, now: Instant) {
        self.now = Some(now);
    }

    pub(crate) fn expire_notifications(&mut self, now: Instant) {
        let ttl = self.config.notification_ttl;
        let before = self.notifications.len();
        for notification in &mut self.notifications {
            notification.raised_at.get_or_insert(now);
        }
        self.notifications.retain(|notification| {
            notification
                .raised_at
                .is_none_or(|raised| now.duration_since(raised) < ttl)
        });
        if self.notifications.len() != before {
            self.mark_dirty();
        }
    }

    pub(crate) fn notify(&mut self, kind: NotificationKind) {
        self.next_notification_id += 1;
        card_logging::card_debug!("notification #{}: {}", self.next_notification_id, kind);
        self.notifications.push(Notification {
            id: self.next_notification_id,
            kind,
            raised_at: self.now,
        });
        self.mark_dirty();
    }

    pub(crate) fn dismiss(&mut self, id: u64) {
        let before = self.notifications.len();
        self.notifications.retain(|notification| notification.id != id);
        if self.notifications.len() != before {
            self.mark_dirty();
        }
    }

    /// Records a submission if its signature is new. Returns `None` for a repeat.
    pub(crate) fn begin_request(&mut self, post: PostRef) -> Option<(RequestId, Settings)> {
        let signature = Signature::new(&post.id, &self.settings);
        if self.last_signature.as_ref() == Some(&signature) {
            return None;
        }
        self.last_signature = Some(signature);

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        let settings = self.settings.clone();
        self.pending.insert(
            request_id,
            PendingRequest {
                post: post.clone(),
                settings: settings.clone(),
            },
        );
        self.current_post = Some(post);
        self.loading = true;
        self.mark_dirty();
        Some((request_id, settings))
    }

    pub(crate) fn complete_success(
        &mut self,
        request_id: RequestId,
        bytes: Arc<[u8]>,
        content_type: Option<String>,
    ) {
        self.loading = false;
        self.mark_dirty();
        let Some(request) = self.pending.remove(&request_id) else {
            card_logging::card_warn!("image for unknown request {} dropped", request_id);
            return;
        };
        let revision = self.preview.as_ref().map_or(1, |preview| preview.revision + 1);
        self.preview = Some(PreviewImage {
            revision,
            post: request.post,
            settings: request.settings,
            bytes,
            content_type,
        });
        self.resolved = true;
    }

    pub(crate) fn complete_failure(&mut self, request_id: RequestId) {
        self.pending.remove(&request_id);
        self.loading = false;
        self.mark_dirty();
    }
}
