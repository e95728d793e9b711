use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::MaybeUser,
    error::ApiError,
    store::json::GUEST_USER_ID,
    state::AppState,
    tasks::dto::{CreateTaskRequest, TaskFilter, TaskPatch},
    tasks::model::{NewTask, Task},
    tasks::repo,
};

/// Every task visible to the caller: the owned rows for an authenticated
/// user, the fallback file for a guest.
pub(crate) async fn load_tasks(
    state: &AppState,
    user: Option<i64>,
) -> Result<Vec<Task>, ApiError> {
    match user {
        Some(user_id) => Ok(repo::list_by_user(&state.db, user_id, &TaskFilter::default()).await?),
        None => Ok(state.fallback.list()),
    }
}

#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = match user {
        Some(user_id) => repo::list_by_user(&state.db, user_id, &filter).await?,
        None => state
            .fallback
            .list()
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect(),
    };
    Ok(Json(tasks))
}

#[instrument(skip(state, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }

    let now = OffsetDateTime::now_utc();
    let new = NewTask {
        title,
        desc: payload.desc.map(|d| d.trim().to_string()),
        due: payload.due,
        priority: payload.priority.resolve(payload.due, now.date()),
        category: payload.category,
    };

    let task = match user {
        Some(user_id) => repo::create(&state.db, user_id, new, now).await?,
        None => state.fallback.create(Task::new(GUEST_USER_ID, new, now))?,
    };
    info!(task_id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(skip(state, patch))]
pub async fn update_task(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<Uuid>,
    Json(mut patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    if let Some(title) = patch.title.take() {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(ApiError::Validation("title cannot be empty".into()));
        }
        patch.title = Some(title);
    }

    let now = OffsetDateTime::now_utc();
    let id = id.to_string();
    let task = match user {
        Some(user_id) => {
            let outcome = repo::apply_patch(&state.db, user_id, &id, &patch, now)
                .await?
                .ok_or_else(|| ApiError::NotFound("task not found".into()))?;
            if let Some(award) = outcome.award {
                info!(
                    task_id = %id,
                    points_added = award.points_added,
                    streak = award.streak,
                    "task completed"
                );
            }
            outcome.task
        }
        None => state
            .fallback
            .apply_patch(&id, &patch, now)?
            .ok_or_else(|| ApiError::NotFound("task not found".into()))?,
    };
    Ok(Json(task))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let id = id.to_string();
    // Deleting a missing or foreign task is treated as already satisfied.
    match user {
        Some(user_id) => {
            repo::delete(&state.db, user_id, &id).await?;
        }
        None => {
            state.fallback.delete(&id)?;
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
