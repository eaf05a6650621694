use async_trait::async_trait;
use eyre::{Result, bail, eyre};
use log::debug;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use serde::Deserialize;

use crate::RawCaption;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

/// Anything that can turn a video ID into raw caption cues
#[async_trait]
pub trait CaptionsProvider: Send + Sync {
    /// Fetch captions, trying `langs` in priority order, or the default track when `None`
    async fn fetch(&self, video_id: &str, langs: Option<&[String]>) -> Result<Vec<RawCaption>>;
}

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
}

/// Captions straight from YouTube's InnerTube API
#[derive(Debug, Clone)]
pub struct YoutubeCaptions {
    client: reqwest::Client,
    base_url: String,
}

impl YoutubeCaptions {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: YOUTUBE_BASE_URL.to_string(),
        }
    }

    /// Point the provider somewhere other than youtube.com
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn caption_tracks(&self, video_id: &str, hl: &str) -> Result<Vec<CaptionTrack>> {
        let watch_url = format!("{}/watch?v={video_id}", self.base_url);
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        let player_url = format!("{}/youtubei/v1/player?key={api_key}&prettyPrint=false", self.base_url);

        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": hl,
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .unwrap_or_default())
    }
}

#[async_trait]
impl CaptionsProvider for YoutubeCaptions {
    async fn fetch(&self, video_id: &str, langs: Option<&[String]>) -> Result<Vec<RawCaption>> {
        let hl = langs.and_then(|l| l.first()).map(String::as_str).unwrap_or("en");
        let tracks = self.caption_tracks(video_id, hl).await?;

        if tracks.is_empty() {
            bail!("no captions available for video {video_id}");
        }

        let track = select_track(&tracks, langs).ok_or_else(|| {
            eyre!(
                "no caption track for languages {:?} on video {video_id}",
                langs.unwrap_or_default()
            )
        })?;
        debug!("Using caption track: lang={}", track.language_code);

        let caption_xml = self
            .client
            .get(&track.base_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let captions = parse_caption_xml(&caption_xml)?;
        if captions.is_empty() {
            bail!("caption track for video {video_id} is empty");
        }
        Ok(captions)
    }
}

/// Pick the first track matching `langs` in priority order, or the default track
fn select_track<'a>(tracks: &'a [CaptionTrack], langs: Option<&[String]>) -> Option<&'a CaptionTrack> {
    match langs {
        Some(langs) => langs
            .iter()
            .find_map(|lang| tracks.iter().find(|t| &t.language_code == lang)),
        None => tracks.first(),
    }
}

fn extract_api_key(html: &str) -> Result<String> {
    let re = Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#)?;
    if let Some(caps) = re.captures(html) {
        return Ok(caps[1].to_string());
    }

    let re2 = Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#)?;
    if let Some(caps) = re2.captures(html) {
        return Ok(caps[1].to_string());
    }

    bail!("could not extract InnerTube API key from watch page");
}

/// A cue whose closing tag has not been seen yet, timings in milliseconds
struct OpenCue {
    tag: Vec<u8>,
    offset: f64,
    duration: f64,
    text: String,
}

/// Parse timed-text XML into millisecond cues
///
/// Handles the classic `<text start dur>` format (seconds) and srv3 `<p t d>` (milliseconds).
fn parse_caption_xml(xml: &str) -> Result<Vec<RawCaption>> {
    let mut reader = Reader::from_str(xml);
    let mut captions = Vec::new();
    let mut current: Option<OpenCue> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if current.is_none() => {
                let (start_key, dur_key, scale): (&[u8], &[u8], f64) = match e.name().as_ref() {
                    b"text" => (&b"start"[..], &b"dur"[..], 1000.0),
                    b"p" => (&b"t"[..], &b"d"[..], 1.0),
                    _ => continue,
                };
                let mut offset = None;
                let mut duration = 0.0;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                    if attr.key.as_ref() == start_key {
                        offset = value.map(|v| v * scale);
                    } else if attr.key.as_ref() == dur_key {
                        duration = value.map(|v| v * scale).unwrap_or(0.0);
                    }
                }
                if let Some(offset) = offset {
                    current = Some(OpenCue {
                        tag: e.name().as_ref().to_vec(),
                        offset,
                        duration,
                        text: String::new(),
                    });
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(cue) = current.as_mut() {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    cue.text.push_str(&html_escape::decode_html_entities(&raw_text));
                }
            }
            Ok(Event::End(ref e)) => match current.take() {
                Some(cue) if cue.tag == e.name().as_ref() => {
                    let text = cue.text.trim().to_string();
                    if !text.is_empty() {
                        captions.push(RawCaption {
                            text,
                            offset: cue.offset,
                            duration: cue.duration,
                        });
                    }
                }
                other => current = other,
            },
            Ok(Event::Eof) => break,
            Err(e) => bail!("error parsing caption XML: {e}"),
            _ => {}
        }
    }

    Ok(captions)
}
