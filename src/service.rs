use std::sync::Arc;

use log::{debug, warn};

use crate::error::ApiError;
use crate::youtube::CaptionsProvider;
use crate::{RawCaption, TranscriptItem};

/// Languages asked for on the first attempt, highest priority first
pub const PREFERRED_LANGS: [&str; 4] = ["zh", "zh-Hans", "zh-CN", "en"];

/// Fetches a video's transcript, falling back to the default track once
#[derive(Clone)]
pub struct TranscriptService {
    provider: Arc<dyn CaptionsProvider>,
    preferred_langs: Vec<String>,
}

impl TranscriptService {
    pub fn new(provider: Arc<dyn CaptionsProvider>, preferred_langs: Vec<String>) -> Self {
        Self {
            provider,
            preferred_langs,
        }
    }

    /// Service using [`PREFERRED_LANGS`]
    pub fn with_default_langs(provider: Arc<dyn CaptionsProvider>) -> Self {
        Self::new(provider, PREFERRED_LANGS.iter().map(|l| l.to_string()).collect())
    }

    pub fn preferred_langs(&self) -> &[String] {
        &self.preferred_langs
    }

    pub async fn fetch(&self, video_id: Option<&str>) -> Result<Vec<TranscriptItem>, ApiError> {
        let video_id = match video_id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(ApiError::MissingParameter),
        };

        let raw = match self.provider.fetch(video_id, Some(&self.preferred_langs)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Fetching captions for {video_id} failed: {e:#}");
                debug!("Retrying {video_id} without language preference");
                self.provider.fetch(video_id, None).await.map_err(|e| {
                    warn!("Fallback fetch for {video_id} failed: {e:#}");
                    ApiError::TranscriptUnavailable
                })?
            }
        };

        Ok(normalize(raw))
    }
}

fn normalize(raw: Vec<RawCaption>) -> Vec<TranscriptItem> {
    raw.into_iter().map(TranscriptItem::from_raw).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use eyre::{Result, eyre};

    use super::*;

    /// Provider that replays scripted outcomes and records every call
    #[derive(Default)]
    pub(crate) struct ScriptedProvider {
        outcomes: Mutex<VecDeque<Result<Vec<RawCaption>>>>,
        pub(crate) calls: Mutex<Vec<(String, Option<Vec<String>>)>>,
    }

    impl ScriptedProvider {
        pub(crate) fn new(outcomes: Vec<Result<Vec<RawCaption>>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CaptionsProvider for ScriptedProvider {
        async fn fetch(&self, video_id: &str, langs: Option<&[String]>) -> Result<Vec<RawCaption>> {
            self.calls
                .lock()
                .unwrap()
                .push((video_id.to_string(), langs.map(|l| l.to_vec())));
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(eyre!("no scripted outcome")))
        }
    }

    pub(crate) fn raw(text: &str, offset: f64, duration: f64) -> RawCaption {
        RawCaption {
            text: text.to_string(),
            offset,
            duration,
        }
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(vec![raw("hi", 1000.0, 500.0)])]));
        let service = TranscriptService::with_default_langs(provider.clone());

        let items = service.fetch(Some("abc")).await.unwrap();
        assert_eq!(
            items,
            vec![TranscriptItem {
                text: "hi".to_string(),
                offset: 1.0,
                duration: 0.5
            }]
        );

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "abc");
        assert_eq!(
            calls[0].1,
            Some(vec!["zh".to_string(), "zh-Hans".to_string(), "zh-CN".to_string(), "en".to_string()])
        );
    }

    #[tokio::test]
    async fn test_fallback_without_language() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(eyre!("no zh track")),
            Ok(vec![raw("a", 0.0, 1200.0), raw("b", 1200.0, 800.0)]),
        ]));
        let service = TranscriptService::with_default_langs(provider.clone());

        let items = service.fetch(Some("abc")).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].text, "b");
        assert_eq!(items[1].offset, 1.2);

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].1, None);
    }

    #[tokio::test]
    async fn test_both_attempts_fail() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(eyre!("first")), Err(eyre!("second"))]));
        let service = TranscriptService::with_default_langs(provider.clone());

        assert_eq!(service.fetch(Some("abc")).await, Err(ApiError::TranscriptUnavailable));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_id_skips_provider() {
        let provider = Arc::new(ScriptedProvider::default());
        let service = TranscriptService::with_default_langs(provider.clone());

        assert_eq!(service.fetch(None).await, Err(ApiError::MissingParameter));
        assert_eq!(service.fetch(Some("")).await, Err(ApiError::MissingParameter));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_caching_between_requests() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(vec![raw("one", 0.0, 1.0)]),
            Ok(vec![raw("two", 0.0, 1.0)]),
        ]));
        let service = TranscriptService::with_default_langs(provider.clone());

        assert_eq!(service.fetch(Some("abc")).await.unwrap()[0].text, "one");
        assert_eq!(service.fetch(Some("abc")).await.unwrap()[0].text, "two");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_custom_langs_are_passed_through() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(vec![])]));
        let service = TranscriptService::new(provider.clone(), vec!["ja".to_string()]);

        assert!(service.fetch(Some("abc")).await.unwrap().is_empty());
        assert_eq!(provider.calls.lock().unwrap()[0].1, Some(vec!["ja".to_string()]));
    }
}
