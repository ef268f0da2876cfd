//! Message classification.
//!
//! A raw message is classified exactly once into an immutable
//! [`ClassifiedMessage`]: render kind, content class, derived display text,
//! thumbnail set, calendar-day key and direction. A changed message always
//! produces a new classified value; nothing here mutates in place, which is
//! what makes rapid cell re-binding safe.

use chrono::{Datelike, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::filename::attach_file_name;
use crate::layout::{TextLayout, TextShaper, TextStyle};
use crate::photo::closest_size;
use crate::strings;
use crate::text::{self, TextSpan};
use crate::types::attachment::{Attachment, PhotoSize};
use crate::types::message::{Media, MessagePayload, RawMessage, SendState, ServiceAction, UserId};
use crate::types::user::UserDirectory;

/// Fine-grained render kind. Discriminants are the wire-stable codes the
/// renderer keys its cell layouts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum RenderKind {
    Text = 0,
    Photo = 1,
    Audio = 2,
    Video = 3,
    Geo = 4,
    /// Animated media: gif documents, and outgoing documents which share
    /// the same cell behavior.
    Animated = 8,
    Document = 9,
    Service = 10,
    ServicePhoto = 11,
    ContactOutgoing = 12,
    ContactIncoming = 13,
}

impl RenderKind {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Kinds whose display text goes through pagination: plain text and
    /// the caption-carrying media kinds.
    pub fn is_text_bearing(self) -> bool {
        matches!(
            self,
            RenderKind::Text | RenderKind::Photo | RenderKind::Animated | RenderKind::Document
        )
    }
}

/// Coarse bucket determining layout grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ContentClass {
    Text = 0,
    Media = 1,
    Audio = 2,
    ContactOutgoing = 4,
    ContactIncoming = 5,
    DocumentOutgoing = 8,
    DocumentIncoming = 9,
    Service = 10,
    ServicePhoto = 11,
}

impl ContentClass {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Immutable classification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedMessage {
    pub raw: RawMessage,
    /// Never empty after classification; defaults to the unsupported
    /// marker.
    pub display_text: String,
    pub spans: Vec<TextSpan>,
    pub kind: RenderKind,
    pub content: ContentClass,
    pub photo_thumbs: Vec<PhotoSize>,
    /// Local calendar day bucket, `YYYY_MM_DD`.
    pub date_key: String,
    pub is_outgoing: bool,
}

impl ClassifiedMessage {
    /// The message's primary downloadable attachment: the media object
    /// itself, or for photos the size variant closest to full display
    /// resolution.
    pub fn primary_attachment(&self) -> Option<Attachment> {
        match self.raw.payload.media()? {
            Media::Video(v) => Some(Attachment::Video(v.clone())),
            Media::Document(d) => Some(Attachment::Document(d.clone())),
            Media::Audio(a) => Some(Attachment::Audio(a.clone())),
            Media::Photo { sizes } => {
                closest_size(sizes, 800, 800).map(|size| Attachment::Photo(size.clone()))
            }
            _ => None,
        }
    }

    /// Cache file name of the primary attachment, `""` when there is none
    /// or it is unnamable.
    pub fn file_name(&self) -> String {
        self.primary_attachment()
            .map(|a| attach_file_name(&a))
            .unwrap_or_default()
    }

    pub fn is_sending(&self) -> bool {
        self.is_outgoing && self.raw.send_state == SendState::Sending
    }

    /// Paginate the display text, or `None` for kinds that carry no
    /// shapeable text. A failed initial shape is logged and yields `None`;
    /// the message still renders, just without a text layout.
    pub fn layout_text(
        &self,
        shaper: &dyn TextShaper,
        style: &TextStyle,
        max_width: f32,
    ) -> Option<TextLayout> {
        if !self.kind.is_text_bearing() || self.display_text.is_empty() {
            return None;
        }
        match crate::layout::paginate(&self.display_text, shaper, style, max_width) {
            Ok(layout) => Some(layout),
            Err(e) => {
                log::warn!("text layout failed for message {}: {e}", self.raw.id);
                None
            }
        }
    }
}

/// Classification configuration: the local user (for direction and
/// first-person templates) and the text style used to size emoji spans.
#[derive(Debug, Clone)]
pub struct Classifier {
    pub local_user_id: UserId,
    pub style: TextStyle,
}

impl Classifier {
    pub fn new(local_user_id: UserId, style: TextStyle) -> Self {
        Self {
            local_user_id,
            style,
        }
    }

    pub fn classify(&self, message: RawMessage, users: &UserDirectory) -> ClassifiedMessage {
        let is_outgoing = message.from_id == self.local_user_id;
        let mut display_text = strings::UNSUPPORTED_MEDIA.to_string();
        let mut spans = Vec::new();
        let mut photo_thumbs = Vec::new();

        match &message.payload {
            MessagePayload::Service(action) => {
                display_text = self.service_text(action, &message, users, is_outgoing);
                if let ServiceAction::ChatEditPhoto { sizes } = action {
                    photo_thumbs = sizes.clone();
                }
            }
            MessagePayload::Plain { text, media }
            | MessagePayload::Forwarded { text, media } => match media {
                Media::None => {
                    let (processed, text_spans) = text::build_display_text(text, &self.style);
                    display_text = processed;
                    spans = text_spans;
                }
                Media::Photo { sizes } => {
                    photo_thumbs = sizes.clone();
                    display_text = strings::ATTACH_PHOTO.into();
                }
                Media::Video(video) => {
                    if let Some(thumb) = &video.thumb {
                        photo_thumbs.push(thumb.clone());
                    }
                    display_text = strings::ATTACH_VIDEO.into();
                }
                Media::Geo { .. } => display_text = strings::ATTACH_LOCATION.into(),
                Media::Contact { .. } => display_text = strings::ATTACH_CONTACT.into(),
                Media::Document(document) => {
                    if let Some(thumb) = &document.thumb {
                        photo_thumbs.push(thumb.clone());
                    }
                    display_text = strings::ATTACH_DOCUMENT.into();
                }
                Media::Audio(_) => display_text = strings::ATTACH_AUDIO.into(),
                Media::Unsupported => {}
            },
        }

        let (kind, content) = derive_kinds(&message.payload, is_outgoing);
        let date_key = date_key(message.date);

        ClassifiedMessage {
            display_text,
            spans,
            kind,
            content,
            photo_thumbs,
            date_key,
            is_outgoing,
            raw: message,
        }
    }

    fn service_text(
        &self,
        action: &ServiceAction,
        message: &RawMessage,
        users: &UserDirectory,
        is_outgoing: bool,
    ) -> String {
        let actor = users.name_of(message.from_id);
        match action {
            ServiceAction::ChatCreate { .. } => {
                if is_outgoing {
                    strings::you_created_group()
                } else {
                    strings::created_group(&actor)
                }
            }
            ServiceAction::ChatDeleteUser { user_id } => {
                if *user_id == message.from_id {
                    if is_outgoing {
                        strings::you_left_group()
                    } else {
                        strings::left_group(&actor)
                    }
                } else {
                    let target = users.name_of(*user_id);
                    if is_outgoing {
                        strings::you_kicked(&target)
                    } else if *user_id == self.local_user_id {
                        strings::kicked_you(&actor)
                    } else {
                        strings::kicked(&actor, &target)
                    }
                }
            }
            ServiceAction::ChatAddUser { user_id } => {
                let target = users.name_of(*user_id);
                if is_outgoing {
                    strings::you_added(&target)
                } else if *user_id == self.local_user_id {
                    strings::added_you(&actor)
                } else {
                    strings::added(&actor, &target)
                }
            }
            ServiceAction::ChatEditTitle { title } => {
                if is_outgoing {
                    strings::you_changed_title(title)
                } else {
                    strings::changed_title(&actor, title)
                }
            }
            ServiceAction::ChatEditPhoto { .. } => {
                if is_outgoing {
                    strings::you_changed_photo()
                } else {
                    strings::changed_photo(&actor)
                }
            }
            ServiceAction::ChatDeletePhoto => {
                if is_outgoing {
                    strings::you_removed_photo()
                } else {
                    strings::removed_photo(&actor)
                }
            }
            ServiceAction::TtlChange { ttl } => {
                if *ttl != 0 {
                    let interval = strings::ttl_label(*ttl);
                    if is_outgoing {
                        strings::you_set_ttl(&interval)
                    } else {
                        strings::set_ttl(&actor, &interval)
                    }
                } else if is_outgoing {
                    strings::you_disabled_ttl()
                } else {
                    strings::disabled_ttl(&actor)
                }
            }
            ServiceAction::LoginUnknownLocation { device, address } => {
                let name = users.name_of(self.local_user_id);
                let date = format_login_date(message.date);
                strings::unrecognized_login(&name, &date, device, address)
            }
            ServiceAction::UserJoined => strings::contact_joined(&actor),
            ServiceAction::UserUpdatedPhoto => strings::contact_updated_photo(&actor),
            ServiceAction::ScreenshotTaken => {
                if is_outgoing {
                    strings::you_took_screenshot()
                } else {
                    strings::took_screenshot(&actor)
                }
            }
        }
    }
}

/// The closed classification table. Every payload shape maps to exactly one
/// `(kind, content)` pair; unknown media fall into the text bucket as
/// unsupported rather than failing.
fn derive_kinds(payload: &MessagePayload, is_outgoing: bool) -> (RenderKind, ContentClass) {
    match payload {
        MessagePayload::Service(action) => match action {
            ServiceAction::LoginUnknownLocation { .. } => (RenderKind::Text, ContentClass::Text),
            ServiceAction::ChatEditPhoto { .. } | ServiceAction::UserUpdatedPhoto => {
                (RenderKind::ServicePhoto, ContentClass::ServicePhoto)
            }
            _ => (RenderKind::Service, ContentClass::Service),
        },
        MessagePayload::Plain { media, .. } | MessagePayload::Forwarded { media, .. } => {
            match media {
                Media::None => (RenderKind::Text, ContentClass::Text),
                Media::Photo { .. } => (RenderKind::Photo, ContentClass::Media),
                Media::Geo { .. } => (RenderKind::Geo, ContentClass::Media),
                Media::Video(_) => (RenderKind::Video, ContentClass::Media),
                Media::Contact { .. } => {
                    if is_outgoing {
                        (RenderKind::ContactOutgoing, ContentClass::ContactOutgoing)
                    } else {
                        (RenderKind::ContactIncoming, ContentClass::ContactIncoming)
                    }
                }
                Media::Unsupported => (RenderKind::Text, ContentClass::Text),
                Media::Document(document) => {
                    let is_gif = document.thumb.is_some()
                        && document.mime_type.as_deref() == Some("image/gif");
                    if is_gif {
                        (RenderKind::Animated, ContentClass::Media)
                    } else if is_outgoing {
                        (RenderKind::Animated, ContentClass::DocumentOutgoing)
                    } else {
                        (RenderKind::Document, ContentClass::DocumentIncoming)
                    }
                }
                Media::Audio(_) => (RenderKind::Audio, ContentClass::Audio),
            }
        }
    }
}

/// Local calendar day of a unix timestamp, zero-padded `YYYY_MM_DD`.
fn date_key(unix_seconds: i64) -> String {
    let (year, month, day) = Local
        .timestamp_opt(unix_seconds, 0)
        .earliest()
        .map(|dt| (dt.year(), dt.month(), dt.day()))
        .unwrap_or((1970, 1, 1));
    format!("{year:04}_{month:02}_{day:02}")
}

fn format_login_date(unix_seconds: i64) -> String {
    Local
        .timestamp_opt(unix_seconds, 0)
        .earliest()
        .map(|dt| dt.format("%d.%m.%y at %H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::attachment::{Audio, Document, FileLocation, Video};
    use crate::types::user::User;

    const ME: UserId = 1;
    const OTHER: UserId = 2;

    fn classifier() -> Classifier {
        Classifier::new(ME, TextStyle::default())
    }

    fn directory() -> UserDirectory {
        let mut dir = UserDirectory::new();
        dir.insert_chat_user(User {
            id: ME,
            first_name: "Me".into(),
            last_name: String::new(),
        });
        dir.insert_chat_user(User {
            id: OTHER,
            first_name: "Alice".into(),
            last_name: "Smith".into(),
        });
        dir
    }

    fn message(from_id: UserId, payload: MessagePayload) -> RawMessage {
        RawMessage {
            id: 100,
            from_id,
            chat_id: 5,
            date: 1_700_000_000,
            send_state: SendState::Sent,
            attach_path: None,
            payload,
        }
    }

    fn plain(from_id: UserId, media: Media) -> RawMessage {
        message(
            from_id,
            MessagePayload::Plain {
                text: String::new(),
                media,
            },
        )
    }

    fn thumb() -> PhotoSize {
        PhotoSize {
            location: Some(FileLocation {
                volume_id: 1,
                local_id: 2,
            }),
            width: 90,
            height: 90,
            byte_size: 100,
            kind: Default::default(),
        }
    }

    fn document(mime: Option<&str>, thumb: Option<PhotoSize>) -> Document {
        Document {
            dc_id: 42,
            id: 1001,
            byte_size: 2048,
            file_name: Some("file.pdf".into()),
            mime_type: mime.map(Into::into),
            thumb,
        }
    }

    fn codes(msg: &RawMessage) -> (i32, i32) {
        let classified = classifier().classify(msg.clone(), &directory());
        (classified.kind.code(), classified.content.code())
    }

    #[test]
    fn test_classification_table() {
        assert_eq!(codes(&plain(OTHER, Media::None)), (0, 0));
        assert_eq!(
            codes(&plain(OTHER, Media::Photo { sizes: vec![thumb()] })),
            (1, 1)
        );
        assert_eq!(
            codes(&plain(OTHER, Media::Geo { lat: 1.0, lon: 2.0 })),
            (4, 1)
        );
        assert_eq!(
            codes(&plain(
                OTHER,
                Media::Video(Video {
                    dc_id: 2,
                    id: 3,
                    byte_size: 10,
                    duration: 45,
                    thumb: Some(thumb()),
                })
            )),
            (3, 1)
        );
        let contact = Media::Contact {
            user_id: 9,
            first_name: "Bob".into(),
            last_name: String::new(),
            phone: "+100".into(),
        };
        assert_eq!(codes(&plain(ME, contact.clone())), (12, 4));
        assert_eq!(codes(&plain(OTHER, contact)), (13, 5));
        assert_eq!(codes(&plain(OTHER, Media::Unsupported)), (0, 0));
        assert_eq!(
            codes(&plain(
                OTHER,
                Media::Document(document(Some("image/gif"), Some(thumb())))
            )),
            (8, 1)
        );
        assert_eq!(
            codes(&plain(ME, Media::Document(document(None, None)))),
            (8, 8)
        );
        assert_eq!(
            codes(&plain(OTHER, Media::Document(document(None, None)))),
            (9, 9)
        );
        assert_eq!(
            codes(&plain(
                OTHER,
                Media::Audio(Audio {
                    dc_id: 1,
                    id: 2,
                    byte_size: 3,
                    duration: 4,
                })
            )),
            (2, 2)
        );
        assert_eq!(
            codes(&message(
                OTHER,
                MessagePayload::Service(ServiceAction::LoginUnknownLocation {
                    device: "Phone".into(),
                    address: "Somewhere".into(),
                })
            )),
            (0, 0)
        );
        assert_eq!(
            codes(&message(
                OTHER,
                MessagePayload::Service(ServiceAction::ChatEditPhoto { sizes: vec![thumb()] })
            )),
            (11, 11)
        );
        assert_eq!(
            codes(&message(
                OTHER,
                MessagePayload::Service(ServiceAction::UserUpdatedPhoto)
            )),
            (11, 11)
        );
        assert_eq!(
            codes(&message(
                OTHER,
                MessagePayload::Service(ServiceAction::ChatCreate { title: "G".into() })
            )),
            (10, 10)
        );
        assert_eq!(
            codes(&message(
                OTHER,
                MessagePayload::Forwarded {
                    text: "fwd".into(),
                    media: Media::None,
                }
            )),
            (0, 0)
        );
    }

    #[test]
    fn test_gif_requires_thumb_and_mime() {
        // gif mime without a thumbnail is a plain document
        assert_eq!(
            codes(&plain(
                OTHER,
                Media::Document(document(Some("image/gif"), None))
            )),
            (9, 9)
        );
    }

    #[test]
    fn test_display_text_for_media_kinds() {
        let dir = directory();
        let c = classifier();
        let photo = c.classify(plain(OTHER, Media::Photo { sizes: vec![thumb()] }), &dir);
        assert_eq!(photo.display_text, strings::ATTACH_PHOTO);
        assert_eq!(photo.photo_thumbs.len(), 1);

        let unsupported = c.classify(plain(OTHER, Media::Unsupported), &dir);
        assert_eq!(unsupported.display_text, strings::UNSUPPORTED_MEDIA);
    }

    #[test]
    fn test_document_thumb_only_attached_when_present() {
        let dir = directory();
        let c = classifier();
        let with_thumb = c.classify(
            plain(OTHER, Media::Document(document(None, Some(thumb())))),
            &dir,
        );
        assert_eq!(with_thumb.photo_thumbs.len(), 1);
        let without = c.classify(plain(OTHER, Media::Document(document(None, None))), &dir);
        assert!(without.photo_thumbs.is_empty());
    }

    #[test]
    fn test_plain_text_pipeline_applied() {
        let dir = directory();
        let raw = message(
            OTHER,
            MessagePayload::Plain {
                text: "a  b".into(),
                media: Media::None,
            },
        );
        let classified = classifier().classify(raw, &dir);
        assert_eq!(classified.display_text, "a \u{00A0}b");
    }

    #[test]
    fn test_service_actor_names() {
        let dir = directory();
        let c = classifier();

        let create = c.classify(
            message(
                OTHER,
                MessagePayload::Service(ServiceAction::ChatCreate { title: "G".into() }),
            ),
            &dir,
        );
        assert_eq!(create.display_text, "Alice Smith created the group");

        let first_person = c.classify(
            message(
                ME,
                MessagePayload::Service(ServiceAction::ChatCreate { title: "G".into() }),
            ),
            &dir,
        );
        assert_eq!(first_person.display_text, "You created the group");

        let kicked_me = c.classify(
            message(
                OTHER,
                MessagePayload::Service(ServiceAction::ChatDeleteUser { user_id: ME }),
            ),
            &dir,
        );
        assert_eq!(kicked_me.display_text, "Alice Smith removed you");

        let left = c.classify(
            message(
                OTHER,
                MessagePayload::Service(ServiceAction::ChatDeleteUser { user_id: OTHER }),
            ),
            &dir,
        );
        assert_eq!(left.display_text, "Alice Smith left the group");
    }

    #[test]
    fn test_unknown_actor_falls_back_to_empty_name() {
        let dir = UserDirectory::new();
        let classified = classifier().classify(
            message(
                OTHER,
                MessagePayload::Service(ServiceAction::UserJoined),
            ),
            &dir,
        );
        assert_eq!(classified.display_text, " just joined the app");
    }

    #[test]
    fn test_ttl_hour_uses_label() {
        let dir = directory();
        let classified = classifier().classify(
            message(
                OTHER,
                MessagePayload::Service(ServiceAction::TtlChange { ttl: 3600 }),
            ),
            &dir,
        );
        assert!(
            classified.display_text.contains("1 hour"),
            "got {}",
            classified.display_text
        );
        assert!(!classified.display_text.contains("3600"));
    }

    #[test]
    fn test_date_key_stable_within_local_day() {
        let morning = Local
            .with_ymd_and_hms(2026, 8, 25, 0, 0, 0)
            .earliest()
            .unwrap()
            .timestamp();
        let night = Local
            .with_ymd_and_hms(2026, 8, 25, 23, 59, 59)
            .earliest()
            .unwrap()
            .timestamp();
        assert_eq!(date_key(morning), "2026_08_25");
        assert_eq!(date_key(night), "2026_08_25");
        // flips exactly at local midnight
        assert_eq!(date_key(night + 1), "2026_08_26");
    }

    #[test]
    fn test_is_outgoing_from_sender_identity() {
        let dir = directory();
        let c = classifier();
        assert!(c.classify(plain(ME, Media::None), &dir).is_outgoing);
        assert!(!c.classify(plain(OTHER, Media::None), &dir).is_outgoing);
    }

    #[test]
    fn test_file_name_prefers_full_photo_size() {
        let dir = directory();
        let sizes = vec![
            PhotoSize {
                location: Some(FileLocation {
                    volume_id: 1,
                    local_id: 1,
                }),
                width: 90,
                height: 90,
                byte_size: 10,
                kind: Default::default(),
            },
            PhotoSize {
                location: Some(FileLocation {
                    volume_id: 1,
                    local_id: 2,
                }),
                width: 800,
                height: 600,
                byte_size: 10,
                kind: Default::default(),
            },
        ];
        let classified = classifier().classify(plain(OTHER, Media::Photo { sizes }), &dir);
        assert_eq!(classified.file_name(), "1_2.jpg");
    }
}
