pub mod dto;
mod export;
pub mod handlers;
pub mod model;
pub mod repo;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/tasks/:id",
            patch(handlers::update_task).delete(handlers::delete_task),
        )
        .route("/tasks/export.json", get(export::export_json))
        .route("/tasks/export.csv", get(export::export_csv))
}
