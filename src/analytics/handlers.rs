use axum::{extract::State, Json};
use tracing::instrument;

use crate::{
    analytics::compute::{compute, Analytics},
    auth::jwt::MaybeUser,
    error::ApiError,
    state::AppState,
    tasks::handlers::load_tasks,
};

#[instrument(skip(state))]
pub async fn analytics(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<Analytics>, ApiError> {
    let tasks = load_tasks(&state, user).await?;
    Ok(Json(compute(&tasks)))
}
