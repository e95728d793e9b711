use anyhow::Context;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use time::format_description::well_known::Rfc3339;
use tracing::instrument;

use crate::{
    auth::jwt::MaybeUser,
    error::ApiError,
    state::AppState,
    tasks::handlers::load_tasks,
    tasks::model::{Category, Task},
};

const CSV_HEADER: &str = "id,user_id,title,desc,due,priority,category,done,created_at,completed_at";

#[instrument(skip(state))]
pub async fn export_json(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = load_tasks(&state, user).await?;
    let body = serde_json::to_string_pretty(&tasks)
        .context("serialize tasks")
        .map_err(ApiError::Internal)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"tasks.json\"",
            ),
        ],
        body,
    ))
}

#[instrument(skip(state))]
pub async fn export_csv(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = load_tasks(&state, user).await?;
    let mut body = String::from(CSV_HEADER);
    body.push('\n');
    for task in &tasks {
        body.push_str(&csv_row(task).map_err(ApiError::Internal)?);
        body.push('\n');
    }
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"tasks_export.csv\"",
            ),
        ],
        body,
    ))
}

fn csv_row(task: &Task) -> anyhow::Result<String> {
    let created_at = task
        .created_at
        .format(&Rfc3339)
        .context("format created_at")?;
    let completed_at = match task.completed_at {
        Some(at) => at.format(&Rfc3339).context("format completed_at")?,
        None => String::new(),
    };
    let fields = [
        task.id.clone(),
        task.user_id.to_string(),
        task.title.clone(),
        task.desc.clone().unwrap_or_default(),
        task.due.map(|d| d.to_string()).unwrap_or_default(),
        task.priority.as_str().to_string(),
        task.category.map(Category::as_str).unwrap_or_default().to_string(),
        task.done.to_string(),
        created_at,
        completed_at,
    ];
    Ok(fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(","))
}

fn csv_field(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
