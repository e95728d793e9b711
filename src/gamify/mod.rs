mod handlers;
pub mod rules;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/me/stats", get(handlers::stats))
}
