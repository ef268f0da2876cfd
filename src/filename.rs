//! Deterministic cache file names for remote attachments.
//!
//! The name doubles as the key into the local cache and the download feed,
//! so it must be stable across sessions and unique per remote object. An
//! unnamable descriptor yields `""`; callers must treat that as "no cache
//! lookup possible", never as a valid name.

use crate::types::attachment::{Attachment, Document};

/// Derive the cache-unique file name for an attachment. No I/O.
pub fn attach_file_name(attachment: &Attachment) -> String {
    match attachment {
        Attachment::Video(v) => format!("{}_{}.mp4", v.dc_id, v.id),
        Attachment::Audio(a) => format!("{}_{}.m4a", a.dc_id, a.id),
        Attachment::Document(d) => document_file_name(d),
        Attachment::Photo(p) => match &p.location {
            Some(loc) => format!("{}_{}.jpg", loc.volume_id, loc.local_id),
            // Unnamable: nothing to fetch it by.
            None => String::new(),
        },
    }
}

fn document_file_name(document: &Document) -> String {
    let ext = document
        .file_name
        .as_deref()
        .and_then(|name| name.rfind('.').map(|idx| &name[idx..]))
        .unwrap_or("");
    // A bare "." is not a usable extension.
    if ext.len() > 1 {
        format!("{}_{}{}", document.dc_id, document.id, ext)
    } else {
        format!("{}_{}", document.dc_id, document.id)
    }
}
