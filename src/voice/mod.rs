pub mod parser;

use axum::{routing::post, Json, Router};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::instrument;

use crate::{error::ApiError, state::AppState, voice::parser::VoiceDraft};

#[derive(Debug, Deserialize)]
pub struct VoiceParseRequest {
    pub transcript: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/voice/parse", post(parse))
}

/// Turn a recognized transcript into a task draft. Recognition itself happens
/// on the client; parser failures never touch stored tasks.
#[instrument(skip(payload))]
pub async fn parse(Json(payload): Json<VoiceParseRequest>) -> Result<Json<VoiceDraft>, ApiError> {
    let transcript = payload.transcript.trim();
    if transcript.is_empty() {
        return Err(ApiError::Validation("transcript is empty".into()));
    }
    let today = OffsetDateTime::now_utc().date();
    Ok(Json(parser::parse_transcript(transcript, today)))
}
