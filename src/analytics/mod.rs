pub mod compute;
mod handlers;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/analytics", get(handlers::analytics))
}
