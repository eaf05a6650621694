use std::time::Duration;

use async_trait::async_trait;
use eyre::{Result, eyre};
use log::{debug, warn};
use thiserror::Error;
use tokio::time::Instant;

use crate::clipboard::Clipboard;
use crate::service::TranscriptService;
use crate::{TranscriptItem, TranscriptResponse, extract_video_id};

/// How long the "copied" indicator stays on after copying everything
pub const COPIED_FOR: Duration = Duration::from_secs(2);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("无效的 YouTube 链接")]
    InvalidLink,

    /// Message reported by the transcript service
    #[error("{0}")]
    Service(String),

    /// The service could not be reached or answered with something unreadable
    #[error("获取字幕失败")]
    Transport(String),
}

/// Where the view gets transcripts from
#[async_trait]
pub trait TranscriptClient: Send + Sync {
    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptItem>, ViewError>;
}

/// Talks to a running server over HTTP
#[derive(Debug, Clone)]
pub struct HttpTranscriptClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTranscriptClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TranscriptClient for HttpTranscriptClient {
    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptItem>, ViewError> {
        let url = format!("{}/api/transcript", self.base_url);
        debug!("GET {url}?videoId={video_id}");

        let resp = self
            .client
            .get(&url)
            .query(&[("videoId", video_id)])
            .send()
            .await
            .map_err(|e| ViewError::Transport(e.to_string()))?;

        let status = resp.status();
        let body: serde_json::Value = resp.json().await.map_err(|e| ViewError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(match body.get("error").and_then(|e| e.as_str()) {
                Some(message) => ViewError::Service(message.to_string()),
                None => ViewError::Transport(format!("HTTP {status} without an error message")),
            });
        }

        let parsed: TranscriptResponse =
            serde_json::from_value(body).map_err(|e| ViewError::Transport(e.to_string()))?;
        Ok(parsed.transcript)
    }
}

/// Calls a [`TranscriptService`] in the same process
#[derive(Clone)]
pub struct LocalTranscriptClient {
    service: TranscriptService,
}

impl LocalTranscriptClient {
    pub fn new(service: TranscriptService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TranscriptClient for LocalTranscriptClient {
    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptItem>, ViewError> {
        self.service
            .fetch(Some(video_id))
            .await
            .map_err(|e| ViewError::Service(e.to_string()))
    }
}

/// Proof that a fetch was started; only the latest one is honoured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Client-side transcript state: the URL being edited, the last fetched
/// transcript, and the copy actions on it
///
/// Only the newest [`FetchTicket`] may write its result back, so a slow
/// response for an older URL never overwrites a newer one.
#[derive(Debug, Default)]
pub struct TranscriptView {
    url: String,
    transcript: Vec<TranscriptItem>,
    loading: bool,
    error: String,
    copied_until: Option<Instant>,
    latest: u64,
}

impl TranscriptView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn transcript(&self) -> &[TranscriptItem] {
        &self.transcript
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current error message, empty when there is none
    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn is_copied(&self) -> bool {
        self.copied_until.is_some_and(|until| Instant::now() < until)
    }

    /// Start a fetch for the current URL
    ///
    /// Returns `None` and sets the invalid-link error when no video ID can be
    /// extracted; the rest of the state is left untouched in that case.
    pub fn begin_fetch(&mut self) -> Option<(FetchTicket, String)> {
        let Some(video_id) = extract_video_id(&self.url) else {
            self.error = ViewError::InvalidLink.to_string();
            return None;
        };

        self.latest += 1;
        self.error.clear();
        self.transcript.clear();
        self.loading = true;
        Some((FetchTicket(self.latest), video_id))
    }

    /// Apply the outcome of a fetch; returns false if the ticket was superseded
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<TranscriptItem>, ViewError>) -> bool {
        if ticket.0 != self.latest {
            debug!("Dropping superseded fetch #{} (latest #{})", ticket.0, self.latest);
            return false;
        }

        self.loading = false;
        match result {
            Ok(transcript) => self.transcript = transcript,
            Err(e) => {
                warn!("Transcript fetch failed: {e:?}");
                self.error = e.to_string();
            }
        }
        true
    }

    /// Extract the ID, call `client` and store the result
    pub async fn fetch<C: TranscriptClient + ?Sized>(&mut self, client: &C) -> Result<(), ViewError> {
        let (ticket, video_id) = self.begin_fetch().ok_or(ViewError::InvalidLink)?;
        let result = client.fetch_transcript(&video_id).await;
        let outcome = result.as_ref().map(|_| ()).map_err(|e| e.clone());
        self.complete_fetch(ticket, result);
        outcome
    }

    /// Copy every line, space separated, and turn on the copied indicator
    pub fn copy_all(&mut self, clipboard: &dyn Clipboard) -> Result<String> {
        let text = join_text(&self.transcript);
        clipboard.write_text(&text)?;
        self.copied_until = Some(Instant::now() + COPIED_FOR);
        Ok(text)
    }

    pub fn copy_item(&self, index: usize, clipboard: &dyn Clipboard) -> Result<()> {
        let item = self
            .transcript
            .get(index)
            .ok_or_else(|| eyre!("no transcript line at index {index}"))?;
        clipboard.write_text(&item.text)
    }
}

/// All caption texts joined by single spaces
pub fn join_text(items: &[TranscriptItem]) -> String {
    items.iter().map(|i| i.text.as_str()).collect::<Vec<_>>().join(" ")
}

/// Render an offset in seconds as `m:ss`
pub fn format_offset(offset: f64) -> String {
    let secs = offset.max(0.0).floor() as u64;
    format!("{}:{:02}", secs / 60, secs % 60)
}
