use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::auth::repo::User;
use crate::gamify::rules::{self, Award};
use crate::tasks::dto::{TaskFilter, TaskPatch};
use crate::tasks::model::{NewTask, Task};

/// Result of a successful patch; `award` is set only on a genuine
/// pending-to-done transition.
#[derive(Debug)]
pub struct PatchOutcome {
    pub task: Task,
    pub award: Option<Award>,
}

/// All tasks owned by `user_id` in creation order, narrowed by the optional
/// filters. A task without a category matches the `Other` category filter.
pub async fn list_by_user(
    db: &SqlitePool,
    user_id: i64,
    filter: &TaskFilter,
) -> anyhow::Result<Vec<Task>> {
    let needle = filter.needle();
    let done = filter.status.map(|s| s.as_done());
    let rows = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, title, "desc", due, priority, category, done, created_at, completed_at
        FROM tasks
        WHERE user_id = ?
          AND (? IS NULL
               OR instr(lower(title), ?) > 0
               OR instr(lower(coalesce("desc", '')), ?) > 0)
          AND (? IS NULL OR done = ?)
          AND (? IS NULL OR priority = ?)
          AND (? IS NULL OR coalesce(category, 'Other') = ?)
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(&needle)
    .bind(&needle)
    .bind(&needle)
    .bind(done)
    .bind(done)
    .bind(filter.priority)
    .bind(filter.priority)
    .bind(filter.category)
    .bind(filter.category)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn create(
    db: &SqlitePool,
    user_id: i64,
    new: NewTask,
    now: OffsetDateTime,
) -> anyhow::Result<Task> {
    let task = Task::new(user_id, new, now);
    sqlx::query(
        r#"
        INSERT INTO tasks (id, user_id, title, "desc", due, priority, category, done, created_at, completed_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&task.id)
    .bind(task.user_id)
    .bind(&task.title)
    .bind(&task.desc)
    .bind(task.due)
    .bind(task.priority)
    .bind(task.category)
    .bind(task.done)
    .bind(task.created_at)
    .bind(task.completed_at)
    .execute(db)
    .await?;
    Ok(task)
}

/// Apply a partial update to an owned task. Returns `None` when the task does
/// not exist or belongs to another user. A genuine completion writes the task
/// row and the owner's points/streak in one transaction, so neither is ever
/// observed without the other.
pub async fn apply_patch(
    db: &SqlitePool,
    user_id: i64,
    task_id: &str,
    patch: &TaskPatch,
    now: OffsetDateTime,
) -> anyhow::Result<Option<PatchOutcome>> {
    let mut tx = db.begin().await?;

    let prev = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, title, "desc", due, priority, category, done, created_at, completed_at
        FROM tasks
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(prev) = prev else {
        return Ok(None);
    };

    let (task, completing) = patch.merge_into(&prev, now);

    sqlx::query(
        r#"
        UPDATE tasks
        SET title = ?, "desc" = ?, due = ?, priority = ?, category = ?, done = ?, completed_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&task.title)
    .bind(&task.desc)
    .bind(task.due)
    .bind(task.priority)
    .bind(task.category)
    .bind(task.done)
    .bind(task.completed_at)
    .bind(&task.id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let award = if completing {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, provider, points, streak,
                   last_complete_date, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let today = now.date();
        let award = rules::apply_completion(
            user.points,
            user.streak,
            user.last_complete_date,
            today,
            task.priority,
        );
        sqlx::query("UPDATE users SET points = ?, streak = ?, last_complete_date = ? WHERE id = ?")
            .bind(award.points)
            .bind(award.streak)
            .bind(today)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        Some(award)
    } else {
        None
    };

    tx.commit().await?;
    Ok(Some(PatchOutcome { task, award }))
}

/// Delete an owned task. Deleting a missing or foreign task is a no-op.
pub async fn delete(db: &SqlitePool, user_id: i64, task_id: &str) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
        .bind(task_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
