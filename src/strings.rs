//! Display-text templates.
//!
//! Plain English constants; a localization layer is outside this crate and
//! can replace the module wholesale. Service templates come in first-person
//! and third-person variants selected by whether the acting user is the
//! local user.

pub const ATTACH_PHOTO: &str = "Photo";
pub const ATTACH_VIDEO: &str = "Video";
pub const ATTACH_LOCATION: &str = "Location";
pub const ATTACH_CONTACT: &str = "Contact";
pub const ATTACH_DOCUMENT: &str = "Document";
pub const ATTACH_AUDIO: &str = "Audio";

/// Default display text; also used for media variants this client version
/// does not understand.
pub const UNSUPPORTED_MEDIA: &str =
    "This message is not supported by your version of the app. Please update to view it.";

pub fn you_created_group() -> String {
    "You created the group".into()
}

pub fn created_group(actor: &str) -> String {
    format!("{actor} created the group")
}

pub fn you_left_group() -> String {
    "You left the group".into()
}

pub fn left_group(actor: &str) -> String {
    format!("{actor} left the group")
}

pub fn you_kicked(target: &str) -> String {
    format!("You removed {target}")
}

pub fn kicked_you(actor: &str) -> String {
    format!("{actor} removed you")
}

pub fn kicked(actor: &str, target: &str) -> String {
    format!("{actor} removed {target}")
}

pub fn you_added(target: &str) -> String {
    format!("You added {target}")
}

pub fn added_you(actor: &str) -> String {
    format!("{actor} added you")
}

pub fn added(actor: &str, target: &str) -> String {
    format!("{actor} added {target}")
}

pub fn you_changed_photo() -> String {
    "You changed the group photo".into()
}

pub fn changed_photo(actor: &str) -> String {
    format!("{actor} changed the group photo")
}

pub fn you_removed_photo() -> String {
    "You removed the group photo".into()
}

pub fn removed_photo(actor: &str) -> String {
    format!("{actor} removed the group photo")
}

pub fn you_changed_title(title: &str) -> String {
    format!("You changed the group name to {title}")
}

pub fn changed_title(actor: &str, title: &str) -> String {
    format!("{actor} changed the group name to {title}")
}

/// Human label for a self-destruct interval. The closed set of presets gets
/// a spelled-out label; anything else falls back to the raw second count.
pub fn ttl_label(ttl: i32) -> String {
    match ttl {
        2 => "2 seconds".into(),
        5 => "5 seconds".into(),
        60 => "1 minute".into(),
        3600 => "1 hour".into(),
        86400 => "1 day".into(),
        604800 => "1 week".into(),
        other => format!("{other}"),
    }
}

pub fn you_set_ttl(interval: &str) -> String {
    format!("You set the self-destruct timer to {interval}")
}

pub fn set_ttl(actor: &str, interval: &str) -> String {
    format!("{actor} set the self-destruct timer to {interval}")
}

pub fn you_disabled_ttl() -> String {
    "You disabled the self-destruct timer".into()
}

pub fn disabled_ttl(actor: &str) -> String {
    format!("{actor} disabled the self-destruct timer")
}

pub fn unrecognized_login(name: &str, date: &str, device: &str, address: &str) -> String {
    format!(
        "{name}, we detected a login into your account from a new device on {date}. \
         Device: {device}. Location: {address}"
    )
}

pub fn contact_joined(actor: &str) -> String {
    format!("{actor} just joined the app")
}

pub fn contact_updated_photo(actor: &str) -> String {
    format!("{actor} updated their profile photo")
}

pub fn you_took_screenshot() -> String {
    "You took a screenshot!".into()
}

pub fn took_screenshot(actor: &str) -> String {
    format!("{actor} took a screenshot!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_labels() {
        assert_eq!(ttl_label(2), "2 seconds");
        assert_eq!(ttl_label(5), "5 seconds");
        assert_eq!(ttl_label(60), "1 minute");
        assert_eq!(ttl_label(3600), "1 hour");
        assert_eq!(ttl_label(86400), "1 day");
        assert_eq!(ttl_label(604800), "1 week");
        assert_eq!(ttl_label(45), "45");
    }
}
