use eyre::Result;

use crate::view::{format_offset, join_text};
use crate::{TranscriptItem, TranscriptResponse};

/// Render one `m:ss  text` line per caption
pub fn render_text(items: &[TranscriptItem]) -> String {
    items
        .iter()
        .map(|i| format!("{:>6}  {}", format_offset(i.offset), i.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the captions the way "copy all" produces them
pub fn render_plain(items: &[TranscriptItem]) -> String {
    join_text(items)
}

/// Render the same body the HTTP endpoint returns
pub fn render_json(items: &[TranscriptItem]) -> Result<String> {
    let body = TranscriptResponse {
        transcript: items.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&body)?)
}
