//! Per-cell attachment state.
//!
//! A [`MediaCell`] is the recycled view slot a media message is bound into.
//! It owns the download/playback button state for whatever message it
//! currently shows, keyed by derived cache file names, and re-derives that
//! state from the cache and the transfer feed instead of trusting anything
//! remembered from a previous binding.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::classify::{ClassifiedMessage, RenderKind};
use crate::feed::{FeedEvent, FeedEventKind};
use crate::photo::closest_size;
use crate::types::attachment::{Attachment, PhotoSize};
use crate::types::message::Media;
use crate::util;

/// Identity of one watching cell. Tags are process-unique and never reused,
/// which is what lets a cell drop events that were addressed to a previous
/// binding of the same slot.
pub type ObserverTag = u64;

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

pub fn next_observer_tag() -> ObserverTag {
    NEXT_TAG.fetch_add(1, Ordering::Relaxed)
}

/// Download/playback state of the bound attachment. Discriminants are the
/// stable button-state codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AttachmentState {
    /// Present locally; no button or a play-less ready state.
    ReadyLocal = -1,
    NotStarted = 0,
    InProgress = 1,
    /// Animated media cached but paused.
    ReadyToPlayPaused = 2,
    /// Video cached; pressing opens the player.
    ReadyToPlayVideo = 3,
}

impl AttachmentState {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Effect of a button press the cell cannot carry out itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAction {
    /// The press asked to abort an in-flight outgoing send.
    CancelSend,
    /// The press asked to open the video player on the cached file.
    OpenPlayer,
}

/// Transfer service seam: starting, cancelling and observing downloads and
/// uploads by cache name.
pub trait DownloadFeed: Send + Sync {
    fn request(&self, name: &str, attachment: &Attachment);
    fn cancel(&self, name: &str);
    fn is_active(&self, name: &str) -> bool;
    fn progress_of(&self, name: &str) -> Option<f32>;
    fn watch(&self, name: &str, tag: ObserverTag);
    fn unwatch(&self, tag: ObserverTag);
}

/// Local attachment cache seam, keyed by derived cache names.
pub trait CacheStore: Send + Sync {
    fn exists(&self, name: &str) -> bool;
    fn size_of(&self, name: &str) -> u64;
    fn remove(&self, name: &str);
}

/// Which render kinds may start downloading without a button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoDownloadPolicy {
    mask: u32,
}

impl AutoDownloadPolicy {
    pub const PHOTO: u32 = 1;
    pub const AUDIO: u32 = 2;
    pub const VIDEO: u32 = 4;
    pub const DOCUMENT: u32 = 8;

    pub fn new(mask: u32) -> Self {
        Self { mask }
    }

    pub fn nothing() -> Self {
        Self { mask: 0 }
    }

    pub fn photos_only() -> Self {
        Self { mask: Self::PHOTO }
    }

    pub fn allows(&self, kind: RenderKind) -> bool {
        let bit = match kind {
            RenderKind::Photo => Self::PHOTO,
            RenderKind::Audio => Self::AUDIO,
            RenderKind::Video => Self::VIDEO,
            RenderKind::Animated | RenderKind::Document => Self::DOCUMENT,
            _ => return false,
        };
        self.mask & bit != 0
    }
}

impl Default for AutoDownloadPolicy {
    fn default() -> Self {
        Self::photos_only()
    }
}

pub struct MediaCell {
    feed: Arc<dyn DownloadFeed>,
    cache: Arc<dyn CacheStore>,
    policy: AutoDownloadPolicy,
    tag: ObserverTag,
    message: Option<Arc<ClassifiedMessage>>,
    /// Display photo size chosen at bind time.
    photo: Option<PhotoSize>,
    /// Name currently registered with the feed, if any.
    watched: Option<String>,
    state: AttachmentState,
    progress: f32,
    playing: bool,
    /// Latched by a cancelling press; cleared on rebind or a starting
    /// press. Blocks the auto-download path from immediately restarting
    /// what the user just cancelled.
    cancel_requested: bool,
    invalidations: u64,
}

impl MediaCell {
    pub fn new(
        feed: Arc<dyn DownloadFeed>,
        cache: Arc<dyn CacheStore>,
        policy: AutoDownloadPolicy,
    ) -> Self {
        Self {
            feed,
            cache,
            policy,
            tag: next_observer_tag(),
            message: None,
            photo: None,
            watched: None,
            state: AttachmentState::NotStarted,
            progress: 0.0,
            playing: false,
            cancel_requested: false,
            invalidations: 0,
        }
    }

    pub fn state(&self) -> AttachmentState {
        self.state
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn tag(&self) -> ObserverTag {
        self.tag
    }

    pub fn photo(&self) -> Option<&PhotoSize> {
        self.photo.as_ref()
    }

    /// Redraw counter; bumps whenever visible state changed.
    pub fn invalidations(&self) -> u64 {
        self.invalidations
    }

    /// Bind a message into this cell. Binding the same classified message
    /// again only re-derives state; a different message tears the previous
    /// binding down first so nothing leaks across recycled slots.
    pub fn bind(&mut self, message: Arc<ClassifiedMessage>) {
        let changed = match &self.message {
            Some(current) => !Arc::ptr_eq(current, &message),
            None => true,
        };
        if changed {
            self.release_watch();
            self.cancel_requested = false;
            self.playing = false;
            self.progress = 0.0;
            self.state = AttachmentState::NotStarted;
            self.photo = closest_size(&message.photo_thumbs, 800, 800).cloned();
            self.message = Some(message);
            self.invalidate();
        }
        self.update_state();
    }

    /// Clear the binding, dropping any feed registration.
    pub fn unbind(&mut self) {
        self.release_watch();
        self.message = None;
        self.photo = None;
        self.state = AttachmentState::NotStarted;
        self.progress = 0.0;
        self.playing = false;
        self.cancel_requested = false;
        self.invalidate();
    }

    /// Re-derive the attachment state from the cache and the feed.
    pub fn update_state(&mut self) {
        let Some(msg) = self.message.clone() else {
            return;
        };
        let Some(name) = self.resolve_file_name(&msg) else {
            return;
        };

        if msg.is_sending() {
            // Upload in flight; progress is keyed by the local path.
            if let Some(path) = msg.raw.attach_path.clone() {
                self.progress = self.feed.progress_of(&path).unwrap_or(0.0);
                self.watch_name(path);
                self.state = AttachmentState::InProgress;
                self.invalidate();
            }
            return;
        }

        if self.cache.exists(&name) && self.cache.size_of(&name) == 0 {
            log::warn!("removing zero-length cache file {name}");
            self.cache.remove(&name);
        }

        if self.cache.exists(&name) {
            self.release_watch();
            self.state = match msg.kind {
                RenderKind::Animated if !self.playing => AttachmentState::ReadyToPlayPaused,
                RenderKind::Video => AttachmentState::ReadyToPlayVideo,
                _ => AttachmentState::ReadyLocal,
            };
        } else {
            self.watch_name(name.clone());
            if self.feed.is_active(&name) {
                self.state = AttachmentState::InProgress;
                self.progress = self.feed.progress_of(&name).unwrap_or(0.0);
            } else if !self.cancel_requested
                && self.policy.allows(msg.kind)
                && let Some(attachment) = msg.primary_attachment()
            {
                self.feed.request(&name, &attachment);
                self.state = AttachmentState::InProgress;
                self.progress = 0.0;
            } else {
                self.state = AttachmentState::NotStarted;
                self.progress = 0.0;
            }
        }
        self.invalidate();
    }

    /// Handle a press on the state button.
    pub fn press_button(&mut self) -> Option<CellAction> {
        let msg = self.message.clone()?;
        match self.state {
            AttachmentState::NotStarted => {
                self.cancel_requested = false;
                if let Some(name) = self.resolve_file_name(&msg)
                    && let Some(attachment) = msg.primary_attachment()
                {
                    self.feed.request(&name, &attachment);
                    self.watch_name(name);
                    self.progress = 0.0;
                    self.state = AttachmentState::InProgress;
                    self.invalidate();
                }
                None
            }
            AttachmentState::InProgress => {
                if msg.is_sending() {
                    // Aborting a send is the session layer's call.
                    Some(CellAction::CancelSend)
                } else {
                    self.cancel_requested = true;
                    if let Some(name) = self.resolve_file_name(&msg) {
                        self.feed.cancel(&name);
                    }
                    self.progress = 0.0;
                    self.state = AttachmentState::NotStarted;
                    self.invalidate();
                    None
                }
            }
            AttachmentState::ReadyToPlayPaused => {
                self.playing = true;
                self.state = AttachmentState::ReadyLocal;
                self.invalidate();
                None
            }
            AttachmentState::ReadyToPlayVideo => Some(CellAction::OpenPlayer),
            AttachmentState::ReadyLocal => None,
        }
    }

    /// Toggle animated playback. No-op for non-animated kinds or when the
    /// file is not cached yet.
    pub fn toggle_playback(&mut self) {
        let Some(msg) = &self.message else {
            return;
        };
        if msg.kind != RenderKind::Animated {
            return;
        }
        if self.playing {
            self.playing = false;
            self.state = AttachmentState::ReadyToPlayPaused;
        } else if self.state == AttachmentState::ReadyToPlayPaused {
            self.playing = true;
            self.state = AttachmentState::ReadyLocal;
        } else {
            return;
        }
        self.invalidate();
    }

    /// Apply a feed event. Events for another tag, or for a name this cell
    /// no longer watches, are dropped; they belong to a previous binding.
    pub fn handle_event(&mut self, event: &FeedEvent) {
        if event.tag != self.tag {
            return;
        }
        let Some(watched) = self.watched.as_deref() else {
            return;
        };
        if event.name != watched {
            return;
        }
        match event.kind {
            FeedEventKind::Progress(progress) => {
                if self.state == AttachmentState::InProgress {
                    self.progress = progress;
                    self.invalidate();
                } else {
                    self.update_state();
                }
            }
            FeedEventKind::Completed | FeedEventKind::Failed => self.update_state(),
        }
    }

    /// Secondary info line shown under the attachment, if the kind has one.
    pub fn info_line(&self) -> Option<String> {
        let msg = self.message.as_ref()?;
        let size = util::format_file_size(msg.primary_attachment()?.byte_size() as u64);
        match (msg.kind, msg.raw.payload.media()?) {
            (RenderKind::Document, Media::Document(doc)) => {
                let name = msg.file_name();
                let ext = name
                    .rfind('.')
                    .map(|dot| &name[dot + 1..])
                    .filter(|ext| !ext.is_empty())
                    .map(str::to_uppercase)
                    .or_else(|| doc.mime_type.clone())
                    .unwrap_or_default();
                Some(format!("{size} {ext}"))
            }
            (RenderKind::Animated, Media::Document(_)) => Some(size),
            (RenderKind::Video, Media::Video(video)) => {
                Some(format!("{}, {size}", util::format_duration(video.duration)))
            }
            _ => None,
        }
    }

    /// Cache name the state machine keys on for the bound message.
    /// `None` for kinds without a downloadable attachment, or when the
    /// attachment is unnamable.
    fn resolve_file_name(&self, msg: &ClassifiedMessage) -> Option<String> {
        match msg.kind {
            RenderKind::Photo => {
                let size = self.photo.as_ref()?;
                let name = crate::filename::attach_file_name(&Attachment::Photo(size.clone()));
                (!name.is_empty()).then_some(name)
            }
            RenderKind::Video
            | RenderKind::Animated
            | RenderKind::Document
            | RenderKind::Audio => {
                // An already-present local file wins over the cache name.
                if let Some(path) = &msg.raw.attach_path
                    && self.cache.exists(path)
                {
                    return Some(path.clone());
                }
                let name = msg.file_name();
                (!name.is_empty()).then_some(name)
            }
            _ => None,
        }
    }

    fn watch_name(&mut self, name: String) {
        if self.watched.as_deref() == Some(name.as_str()) {
            return;
        }
        self.release_watch();
        self.feed.watch(&name, self.tag);
        self.watched = Some(name);
    }

    fn release_watch(&mut self) {
        if self.watched.take().is_some() {
            self.feed.unwatch(self.tag);
        }
    }

    fn invalidate(&mut self) {
        self.invalidations += 1;
    }
}

impl Drop for MediaCell {
    fn drop(&mut self) {
        self.release_watch();
    }
}
