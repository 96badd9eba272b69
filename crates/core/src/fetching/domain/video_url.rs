const VIDEO_ID_LEN: usize = 11;

/// Canonicalize assorted YouTube URL forms to the standard watch URL.
///
/// Handles `youtu.be/ID`, `watch?v=ID`, `shorts/ID`, and `embed/ID`, and
/// drops trailing parameters such as `?si=...` or `&t=...`. Returns `None`
/// when the URL is not a YouTube URL or carries no 11-character video id;
/// callers then fetch the URL as given.
pub fn clean_youtube_url(url: &str) -> Option<String> {
    if !url.contains("youtube.com") && !url.contains("youtu.be") {
        return None;
    }

    // Ordered so the host-path forms win before the bare query key.
    for marker in ["youtu.be/", "/shorts/", "/embed/", "v="] {
        if let Some(pos) = url.find(marker) {
            if let Some(id) = video_id_at(&url[pos + marker.len()..]) {
                return Some(format!("https://www.youtube.com/watch?v={id}"));
            }
        }
    }
    None
}

fn video_id_at(rest: &str) -> Option<String> {
    let id: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(VIDEO_ID_LEN)
        .collect();
    (id.len() == VIDEO_ID_LEN).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::watch("https://www.youtube.com/watch?v=dQw4w9WgXcQ")]
    #[case::short_host("https://youtu.be/dQw4w9WgXcQ")]
    #[case::shorts("https://www.youtube.com/shorts/dQw4w9WgXcQ")]
    #[case::embed("https://www.youtube.com/embed/dQw4w9WgXcQ")]
    #[case::share_param("https://youtu.be/dQw4w9WgXcQ?si=AbCdEfGh123")]
    #[case::timestamp("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s")]
    #[case::mobile("https://m.youtube.com/watch?v=dQw4w9WgXcQ")]
    fn test_clean_youtube_url_forms(#[case] url: &str) {
        assert_eq!(
            clean_youtube_url(url).as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
    }

    #[rstest]
    #[case::not_youtube("https://example.com/video.mp4")]
    #[case::short_id("https://youtu.be/short")]
    #[case::no_id("https://www.youtube.com/")]
    fn test_clean_youtube_url_rejects(#[case] url: &str) {
        assert_eq!(clean_youtube_url(url), None);
    }
}
