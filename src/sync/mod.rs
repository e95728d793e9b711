use axum::{routing::post, Router};

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/sync/sheets", post(sheets_sync))
}

/// Reserved settings-page action; there is no spreadsheet backend wired up.
async fn sheets_sync() -> Result<(), ApiError> {
    Err(ApiError::Unsupported(
        "spreadsheet sync is not available in this build".into(),
    ))
}
