use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures the transcript endpoint reports to its caller
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    #[error("缺少 videoId 参数")]
    MissingParameter,

    #[error("无法获取该视频的字幕，可能原因：1) 视频没有字幕 2) 视频 ID 不正确")]
    TranscriptUnavailable,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter => StatusCode::BAD_REQUEST,
            ApiError::TranscriptUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::MissingParameter.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::TranscriptUnavailable.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unavailable_message_names_both_causes() {
        let msg = ApiError::TranscriptUnavailable.to_string();
        assert!(msg.contains("1) 视频没有字幕"));
        assert!(msg.contains("2) 视频 ID 不正确"));
    }
}
