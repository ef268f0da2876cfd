//! Small display formatting helpers.

/// Human-readable file size, one decimal above bytes.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if size < KB {
        format!("{size} B")
    } else if size < MB {
        format!("{:.1} KB", size as f64 / KB as f64)
    } else if size < GB {
        format!("{:.1} MB", size as f64 / MB as f64)
    } else {
        format!("{:.1} GB", size as f64 / GB as f64)
    }
}

/// `m:ss` duration label.
pub fn format_duration(seconds: i32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Static map preview URL for a geo attachment, with a red marker on the
/// point. `scale` is the display density rounded to a whole tile scale.
pub fn map_preview_url(lat: f64, lon: f64, scale: i32) -> String {
    format!(
        "https://maps.googleapis.com/maps/api/staticmap?center={lat},{lon}&zoom=13&size=100x100&maptype=roadmap&scale={scale}&markers=color:red|size:big|{lat},{lon}&sensor=false"
    )
}
