//! Core logic for rendering chat messages in a recycled list of cells.
//!
//! The crate owns four responsibilities, everything else (drawing, touch,
//! bitmap decoding, the actual transfer transport) stays behind the service
//! traits in [`cell`] and [`layout`]:
//!
//! - classifying raw message payloads into renderable kinds ([`classify`]),
//! - deriving stable cache names for remote attachments ([`filename`]),
//! - paginating shaped text into bounded layout blocks ([`layout`]),
//! - tracking per-cell attachment download/playback state ([`cell`]).

pub mod cache;
pub mod cell;
pub mod classify;
pub mod emoji;
pub mod error;
pub mod feed;
pub mod filename;
pub mod layout;
pub mod photo;
pub mod strings;
pub mod test_utils;
pub mod text;
pub mod types;
pub mod util;

pub use cache::FsCache;
pub use cell::{
    AttachmentState, AutoDownloadPolicy, CacheStore, CellAction, DownloadFeed, MediaCell,
    ObserverTag,
};
pub use classify::{Classifier, ClassifiedMessage, ContentClass, RenderKind};
pub use error::LayoutError;
pub use feed::{FeedEvent, FeedEventKind, TransferFeed};
pub use layout::{ShapedLine, ShapedText, TextBlock, TextLayout, TextShaper, TextStyle, paginate};
pub use types::attachment::{Attachment, FileLocation, PhotoSize, PhotoSizeKind};
pub use types::message::{Media, MessagePayload, RawMessage, SendState, ServiceAction};
pub use types::user::{User, UserDirectory};
