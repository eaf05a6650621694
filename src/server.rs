use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use eyre::Result;
use log::info;

use crate::TranscriptResponse;
use crate::service::TranscriptService;

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Clone)]
struct AppState {
    service: Arc<TranscriptService>,
}

/// First `videoId` in the query string; later repeats are ignored
fn video_id_param(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == "videoId")
        .map(|(_, value)| value.as_str())
}

/// Build the HTTP routes: the browser page and the transcript endpoint
pub fn router(service: TranscriptService) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/transcript", get(transcript))
        .with_state(AppState {
            service: Arc::new(service),
        })
}

/// Serve until the process is stopped
pub async fn serve(bind: &str, service: TranscriptService) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(service)).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn transcript(State(state): State<AppState>, Query(params): Query<Vec<(String, String)>>) -> Response {
    let video_id = video_id_param(&params);
    match state.service.fetch(video_id).await {
        Ok(transcript) => {
            info!(
                "GET /api/transcript videoId={} -> 200 ({} items)",
                video_id.unwrap_or(""),
                transcript.len()
            );
            Json(TranscriptResponse { transcript }).into_response()
        }
        Err(e) => {
            info!(
                "GET /api/transcript videoId={} -> {}",
                video_id.unwrap_or(""),
                e.status().as_u16()
            );
            e.into_response()
        }
    }
}
