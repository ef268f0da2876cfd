use serde::{Deserialize, Serialize};

/// Remote storage coordinates of a photo size variant. Used both for the
/// actual fetch and for deriving the local cache file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLocation {
    pub volume_id: i64,
    pub local_id: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoSizeKind {
    #[default]
    Normal,
    /// Low-quality preview carried inline with the message. The size
    /// selector treats these as placeholders and never settles on one when
    /// a real variant is available.
    Cached,
}

/// One size variant of a photo or thumbnail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoSize {
    /// Absent for not-yet-uploaded or synthesized sizes; such a size cannot
    /// be named and therefore cannot be cached.
    pub location: Option<FileLocation>,
    pub width: i32,
    pub height: i32,
    pub byte_size: u32,
    pub kind: PhotoSizeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub dc_id: i32,
    pub id: i64,
    pub byte_size: u32,
    /// Seconds.
    pub duration: i32,
    pub thumb: Option<PhotoSize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audio {
    pub dc_id: i32,
    pub id: i64,
    pub byte_size: u32,
    pub duration: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub dc_id: i32,
    pub id: i64,
    pub byte_size: u32,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub thumb: Option<PhotoSize>,
}

/// Downloadable attachment descriptor, the unit the namer and the download
/// feed operate on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attachment {
    Photo(PhotoSize),
    Video(Video),
    Audio(Audio),
    Document(Document),
}

impl Attachment {
    pub fn byte_size(&self) -> u32 {
        match self {
            Attachment::Photo(p) => p.byte_size,
            Attachment::Video(v) => v.byte_size,
            Attachment::Audio(a) => a.byte_size,
            Attachment::Document(d) => d.byte_size,
        }
    }
}
