use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use anyhow::Context;
use time::OffsetDateTime;
use tracing::warn;

use crate::tasks::dto::TaskPatch;
use crate::tasks::model::Task;

/// Owner id recorded on fallback tasks; no real user row ever has it.
pub const GUEST_USER_ID: i64 = 0;

/// File-backed task store used when a request carries no authenticated
/// identity. Mirrors the task shape as a pretty-printed JSON array; completion
/// sets the timestamp but never touches gamification (there is no user row).
pub struct JsonStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// All stored tasks. A missing file is an empty store; an unreadable one
    /// degrades to empty with a warning rather than failing the request.
    pub fn list(&self) -> Vec<Task> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load()
    }

    pub fn create(&self, task: Task) -> anyhow::Result<Task> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut tasks = self.load();
        tasks.push(task.clone());
        self.save(&tasks)?;
        Ok(task)
    }

    /// Merge a patch into the stored task, if present.
    pub fn apply_patch(
        &self,
        task_id: &str,
        patch: &TaskPatch,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<Task>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut tasks = self.load();
        let Some(slot) = tasks.iter_mut().find(|t| t.id == task_id) else {
            return Ok(None);
        };
        let (merged, _completing) = patch.merge_into(slot, now);
        *slot = merged.clone();
        self.save(&tasks)?;
        Ok(Some(merged))
    }

    /// Remove a task; removing an unknown id is a no-op.
    pub fn delete(&self, task_id: &str) -> anyhow::Result<bool> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut tasks = self.load();
        let before = tasks.len();
        tasks.retain(|t| t.id != task_id);
        let removed = tasks.len() != before;
        if removed {
            self.save(&tasks)?;
        }
        Ok(removed)
    }

    fn load(&self) -> Vec<Task> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "fallback store unreadable");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "fallback store corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let body = serde_json::to_string_pretty(tasks)?;
        fs::write(&self.path, body).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::model::{NewTask, Priority};
    use uuid::Uuid;

    fn temp_store() -> JsonStore {
        let path =
            std::env::temp_dir().join(format!("taskmind-fallback-{}.json", Uuid::new_v4()));
        JsonStore::new(path)
    }

    fn guest_task(title: &str) -> Task {
        Task::new(
            GUEST_USER_ID,
            NewTask {
                title: title.into(),
                desc: None,
                due: None,
                priority: Priority::Low,
                category: None,
            },
            OffsetDateTime::now_utc(),
        )
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        assert!(temp_store().list().is_empty());
    }

    #[test]
    fn create_persists_and_lists_back() {
        let store = temp_store();
        let task = store.create(guest_task("water plants")).unwrap();
        let listed = store.list();
        assert_eq!(listed, vec![task]);
    }

    #[test]
    fn patch_sets_completion_once_and_delete_is_noop_on_missing() {
        let store = temp_store();
        let task = store.create(guest_task("one")).unwrap();
        let now = OffsetDateTime::now_utc();

        let done = TaskPatch {
            done: Some(true),
            ..Default::default()
        };
        let first = store.apply_patch(&task.id, &done, now).unwrap().unwrap();
        assert_eq!(first.completed_at, Some(now));

        let later = now + time::Duration::hours(2);
        let second = store.apply_patch(&task.id, &done, later).unwrap().unwrap();
        assert_eq!(second.completed_at, Some(now));

        assert!(store.apply_patch("missing", &done, now).unwrap().is_none());
        assert!(store.delete(&task.id).unwrap());
        assert!(!store.delete(&task.id).unwrap());
        assert!(store.list().is_empty());
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let store = temp_store();
        std::fs::write(&store.path, "not json at all").unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn legacy_records_without_user_id_still_load() {
        let store = temp_store();
        std::fs::write(
            &store.path,
            r#"[{"id": "old-1", "title": "from the old app", "done": false,
                 "created_at": "2024-03-01T08:00:00Z", "due": "2024-03-05"}]"#,
        )
        .unwrap();
        let tasks = store.list();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].user_id, GUEST_USER_ID);
        assert_eq!(tasks[0].title, "from the old app");
    }
}
