use axum::{extract::State, Json};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::{jwt::AuthUser, repo::User},
    error::ApiError,
    gamify::rules,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub points: i64,
    pub streak: i64,
    pub completed_tasks: i64,
    pub badges: Vec<String>,
}

#[instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("user not found".into()))?;

    let completed_tasks: i64 =
        sqlx::query_scalar("SELECT count(*) FROM tasks WHERE user_id = ? AND done = 1")
            .bind(user_id)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(StatsResponse {
        points: user.points,
        streak: user.streak,
        completed_tasks,
        badges: rules::badges(user.points, user.streak, completed_tasks),
    }))
}
