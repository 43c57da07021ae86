//! Media reference resolution.
//!
//! Extracts a YouTube video identifier from the URL shapes we accept and
//! builds the thumbnail/embed asset URLs from it. An unrecognized URL simply
//! yields no identifier; the surface degrades to a static placeholder.

/// URL shapes carrying a video id, in match order.
const ID_MARKERS: [&str; 4] = ["watch?v=", "youtu.be/", "/embed/", "/shorts/"];

/// Extract a video identifier from a known URL shape.
///
/// ```
/// use fragment_desk::media::video_id;
///
/// assert_eq!(video_id("https://www.youtube.com/watch?v=EUo0ncJX19A"), Some("EUo0ncJX19A"));
/// assert_eq!(video_id("https://youtu.be/abc123"), Some("abc123"));
/// assert_eq!(video_id("https://example.com/clip.mp4"), None);
/// ```
pub fn video_id(url: &str) -> Option<&str> {
    for marker in ID_MARKERS {
        if let Some(at) = url.find(marker) {
            let rest = &url[at + marker.len()..];
            let end = rest
                .find(['?', '&', '#', '/'])
                .unwrap_or(rest.len());
            let id = &rest[..end];
            if !id.is_empty() {
                return Some(id);
            }
        }
    }
    None
}

/// Thumbnail asset URL for a video id.
pub fn thumbnail_url(id: &str) -> String {
    format!("https://img.youtube.com/vi/{id}/hqdefault.jpg")
}

/// Embeddable player URL for a video id.
pub fn embed_url(id: &str) -> String {
    format!("https://www.youtube.com/embed/{id}?autoplay=1")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=EUo0ncJX19A"),
            Some("EUo0ncJX19A")
        );
    }

    #[test]
    fn test_short_link() {
        assert_eq!(video_id("https://youtu.be/abc123"), Some("abc123"));
    }

    #[test]
    fn test_embed_and_shorts_paths() {
        assert_eq!(
            video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id("https://www.youtube.com/shorts/xyz789"),
            Some("xyz789")
        );
    }

    #[test]
    fn test_trailing_params_stripped() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=EUo0ncJX19A&t=42s"),
            Some("EUo0ncJX19A")
        );
        assert_eq!(video_id("https://youtu.be/abc123?si=share"), Some("abc123"));
    }

    #[test]
    fn test_unrelated_url_has_no_id() {
        assert_eq!(video_id("https://example.com/video/1234"), None);
        assert_eq!(video_id("not a url at all"), None);
        // Marker present but empty id.
        assert_eq!(video_id("https://www.youtube.com/watch?v="), None);
    }

    #[test]
    fn test_asset_urls() {
        assert_eq!(
            thumbnail_url("abc123"),
            "https://img.youtube.com/vi/abc123/hqdefault.jpg"
        );
        assert_eq!(
            embed_url("abc123"),
            "https://www.youtube.com/embed/abc123?autoplay=1"
        );
    }
}
