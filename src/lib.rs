pub mod clipboard;
pub mod config;
pub mod error;
pub mod output;
pub mod server;
pub mod service;
pub mod view;
pub mod youtube;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A caption cue as the provider hands it over, timings in milliseconds
#[derive(Debug, Clone, PartialEq)]
pub struct RawCaption {
    pub text: String,
    pub offset: f64,
    pub duration: f64,
}

/// A single caption line, timings in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptItem {
    pub text: String,
    pub offset: f64,
    pub duration: f64,
}

impl TranscriptItem {
    pub fn from_raw(raw: RawCaption) -> Self {
        Self {
            text: raw.text,
            offset: raw.offset / 1000.0,
            duration: raw.duration / 1000.0,
        }
    }
}

/// Body of a successful `/api/transcript` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub transcript: Vec<TranscriptItem>,
}

/// URL shapes recognized by [`extract_video_id`], highest priority first
const VIDEO_ID_PATTERNS: [&str; 4] = [
    r"youtube\.com/watch\?v=([^&\s]+)",
    r"youtu\.be/([^?\s]+)",
    r"youtube\.com/embed/([^?\s]+)",
    r"youtube\.com/v/([^?\s]+)",
];

/// Extract the video ID from a pasted YouTube URL
///
/// The first pattern that matches wins. The captured token is not validated.
pub fn extract_video_id(input: &str) -> Option<String> {
    VIDEO_ID_PATTERNS.iter().find_map(|pattern| {
        let re = Regex::new(pattern).ok()?;
        re.captures(input).map(|caps| caps[1].to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=ABC123&t=5"),
            Some("ABC123".to_string())
        );
    }

    #[test]
    fn test_short_url() {
        assert_eq!(extract_video_id("https://youtu.be/XYZ987"), Some("XYZ987".to_string()));
    }

    #[test]
    fn test_short_url_with_query() {
        assert_eq!(
            extract_video_id("https://youtu.be/XYZ987?si=abc"),
            Some("XYZ987".to_string())
        );
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_v_path_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/v/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_capture_stops_at_whitespace() {
        assert_eq!(
            extract_video_id("see https://youtu.be/abc123 for details"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_watch_pattern_has_priority() {
        // both the watch and the short-link shape are present; watch wins
        assert_eq!(
            extract_video_id("https://youtu.be/short1 https://www.youtube.com/watch?v=long1"),
            Some("long1".to_string())
        );
    }

    #[test]
    fn test_watch_requires_v_first() {
        assert_eq!(extract_video_id("https://www.youtube.com/watch?t=5&v=abc"), None);
    }

    #[test]
    fn test_invalid_url() {
        assert_eq!(extract_video_id("not a url"), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_empty_capture_is_no_match() {
        assert_eq!(extract_video_id("https://youtu.be/"), None);
    }

    #[test]
    fn test_from_raw_converts_milliseconds() {
        let item = TranscriptItem::from_raw(RawCaption {
            text: "hi".to_string(),
            offset: 1000.0,
            duration: 500.0,
        });
        assert_eq!(item.text, "hi");
        assert_eq!(item.offset, 1.0);
        assert_eq!(item.duration, 0.5);
    }

    #[test]
    fn test_response_shape() {
        let resp = TranscriptResponse {
            transcript: vec![TranscriptItem {
                text: "hi".to_string(),
                offset: 1.0,
                duration: 0.5,
            }],
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "transcript": [{ "text": "hi", "offset": 1.0, "duration": 0.5 }] })
        );
    }
}
