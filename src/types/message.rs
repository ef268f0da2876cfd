use serde::{Deserialize, Serialize};

use crate::types::attachment::{Audio, Document, PhotoSize, Video};

pub type UserId = i64;
pub type MessageId = i32;

/// Local submission state of an outgoing message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendState {
    Sending,
    #[default]
    Sent,
    Failed,
}

/// A message as it arrives from the session layer, before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: MessageId,
    pub from_id: UserId,
    pub chat_id: i64,
    /// Unix seconds.
    pub date: i64,
    pub send_state: SendState,
    /// Local path of an outgoing attachment that has not finished
    /// uploading. Upload progress is keyed by this path, not by the
    /// remote cache name.
    pub attach_path: Option<String>,
    pub payload: MessagePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessagePayload {
    Plain { text: String, media: Media },
    Service(ServiceAction),
    /// Forwarded wrapper. A forward that carries no media renders as plain
    /// text of its caption.
    Forwarded { text: String, media: Media },
}

impl MessagePayload {
    pub fn media(&self) -> Option<&Media> {
        match self {
            MessagePayload::Plain { media, .. } | MessagePayload::Forwarded { media, .. } => {
                Some(media)
            }
            MessagePayload::Service(_) => None,
        }
    }
}

/// Media variant of a non-service message. `None` covers both an absent
/// media field and the explicit empty-media wire value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Media {
    #[default]
    None,
    Photo {
        sizes: Vec<PhotoSize>,
    },
    Video(Video),
    Geo {
        lat: f64,
        lon: f64,
    },
    Contact {
        user_id: UserId,
        first_name: String,
        last_name: String,
        phone: String,
    },
    Document(Document),
    Audio(Audio),
    /// A variant this client version does not understand.
    Unsupported,
}

/// Structural chat event carried by a service message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServiceAction {
    ChatCreate { title: String },
    ChatAddUser { user_id: UserId },
    ChatDeleteUser { user_id: UserId },
    ChatEditTitle { title: String },
    ChatEditPhoto { sizes: Vec<PhotoSize> },
    ChatDeletePhoto,
    /// Self-destruct timer change; `ttl` of zero disables the timer.
    TtlChange { ttl: i32 },
    LoginUnknownLocation { device: String, address: String },
    UserJoined,
    UserUpdatedPhoto,
    ScreenshotTaken,
}
