//! In-process transfer progress fan-out.
//!
//! The transport reports transfer lifecycle through `report_*`; every cell
//! watching that cache name receives a tagged [`FeedEvent`] on the channel
//! handed out at construction. Events carry the watcher's tag so a recycled
//! cell can drop updates addressed to its previous binding.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::cell::{DownloadFeed, ObserverTag};
use crate::types::attachment::Attachment;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEventKind {
    Progress(f32),
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedEvent {
    pub tag: ObserverTag,
    pub name: String,
    pub kind: FeedEventKind,
}

#[derive(Debug, Default)]
struct Transfer {
    progress: f32,
    active: bool,
    watchers: Vec<ObserverTag>,
}

pub struct TransferFeed {
    transfers: DashMap<String, Transfer>,
    events: mpsc::UnboundedSender<FeedEvent>,
}

impl TransferFeed {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<FeedEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                transfers: DashMap::new(),
                events,
            }),
            receiver,
        )
    }

    pub fn report_progress(&self, name: &str, progress: f32) {
        let watchers = {
            let Some(mut transfer) = self.transfers.get_mut(name) else {
                return;
            };
            transfer.progress = progress;
            transfer.active = true;
            transfer.watchers.clone()
        };
        self.emit(&watchers, name, FeedEventKind::Progress(progress));
    }

    /// Transfer finished and the file is in the cache; the entry is gone
    /// afterwards.
    pub fn report_completed(&self, name: &str) {
        let Some((_, transfer)) = self.transfers.remove(name) else {
            return;
        };
        self.emit(&transfer.watchers, name, FeedEventKind::Completed);
    }

    /// Transfer failed; watchers stay registered so a retry reuses them.
    pub fn report_failed(&self, name: &str) {
        let watchers = {
            let Some(mut transfer) = self.transfers.get_mut(name) else {
                return;
            };
            transfer.active = false;
            transfer.progress = 0.0;
            transfer.watchers.clone()
        };
        self.emit(&watchers, name, FeedEventKind::Failed);
    }

    fn emit(&self, watchers: &[ObserverTag], name: &str, kind: FeedEventKind) {
        for &tag in watchers {
            // receiver gone means shutdown; nothing left to notify
            let _ = self.events.send(FeedEvent {
                tag,
                name: name.to_string(),
                kind: kind.clone(),
            });
        }
    }
}

impl DownloadFeed for TransferFeed {
    fn request(&self, name: &str, _attachment: &Attachment) {
        let mut transfer = self.transfers.entry(name.to_string()).or_default();
        transfer.active = true;
        transfer.progress = 0.0;
    }

    fn cancel(&self, name: &str) {
        if let Some(mut transfer) = self.transfers.get_mut(name) {
            transfer.active = false;
            transfer.progress = 0.0;
        }
    }

    fn is_active(&self, name: &str) -> bool {
        self.transfers
            .get(name)
            .map(|t| t.active)
            .unwrap_or(false)
    }

    fn progress_of(&self, name: &str) -> Option<f32> {
        self.transfers
            .get(name)
            .filter(|t| t.active)
            .map(|t| t.progress)
    }

    fn watch(&self, name: &str, tag: ObserverTag) {
        let mut transfer = self.transfers.entry(name.to_string()).or_default();
        if !transfer.watchers.contains(&tag) {
            transfer.watchers.push(tag);
        }
    }

    fn unwatch(&self, tag: ObserverTag) {
        for mut entry in self.transfers.iter_mut() {
            entry.watchers.retain(|&t| t != tag);
        }
        self.transfers
            .retain(|_, t| t.active || !t.watchers.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment() -> Attachment {
        Attachment::Audio(crate::types::attachment::Audio {
            dc_id: 1,
            id: 2,
            byte_size: 3,
            duration: 4,
        })
    }

    #[test]
    fn test_progress_reaches_every_watcher() {
        let (feed, mut events) = TransferFeed::new();
        feed.request("a.m4a", &attachment());
        feed.watch("a.m4a", 11);
        feed.watch("a.m4a", 12);

        feed.report_progress("a.m4a", 0.25);
        let first = events.try_recv().unwrap();
        let second = events.try_recv().unwrap();
        assert_eq!(first.kind, FeedEventKind::Progress(0.25));
        assert_eq!(
            {
                let mut tags = vec![first.tag, second.tag];
                tags.sort();
                tags
            },
            vec![11, 12]
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_completed_drops_the_transfer() {
        let (feed, mut events) = TransferFeed::new();
        feed.request("a.m4a", &attachment());
        feed.watch("a.m4a", 7);

        feed.report_completed("a.m4a");
        assert_eq!(events.try_recv().unwrap().kind, FeedEventKind::Completed);
        assert!(!feed.is_active("a.m4a"));
        assert_eq!(feed.progress_of("a.m4a"), None);
    }

    #[test]
    fn test_failed_deactivates_but_keeps_watchers() {
        let (feed, mut events) = TransferFeed::new();
        feed.request("a.m4a", &attachment());
        feed.watch("a.m4a", 7);

        feed.report_failed("a.m4a");
        assert_eq!(events.try_recv().unwrap().kind, FeedEventKind::Failed);
        assert!(!feed.is_active("a.m4a"));

        // retry notifies the same watcher without re-watching
        feed.request("a.m4a", &attachment());
        feed.report_progress("a.m4a", 0.5);
        assert_eq!(events.try_recv().unwrap().tag, 7);
    }

    #[test]
    fn test_cancel_stops_activity() {
        let (feed, _events) = TransferFeed::new();
        feed.request("a.m4a", &attachment());
        assert!(feed.is_active("a.m4a"));
        feed.cancel("a.m4a");
        assert!(!feed.is_active("a.m4a"));
        assert_eq!(feed.progress_of("a.m4a"), None);
    }

    #[test]
    fn test_unwatch_removes_only_that_tag() {
        let (feed, mut events) = TransferFeed::new();
        feed.request("a.m4a", &attachment());
        feed.watch("a.m4a", 1);
        feed.watch("a.m4a", 2);
        feed.unwatch(1);

        feed.report_progress("a.m4a", 0.9);
        assert_eq!(events.try_recv().unwrap().tag, 2);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_watch_is_idempotent() {
        let (feed, mut events) = TransferFeed::new();
        feed.request("a.m4a", &attachment());
        feed.watch("a.m4a", 5);
        feed.watch("a.m4a", 5);

        feed.report_progress("a.m4a", 0.1);
        assert!(events.try_recv().is_ok());
        assert!(events.try_recv().is_err());
    }
}
