use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::tasks::model::{iso_date, suggest_priority, Category, Priority, Task};

/// Priority as submitted by the client; `Auto` defers to the due-date rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum PriorityChoice {
    #[default]
    Auto,
    High,
    Medium,
    Low,
}

impl PriorityChoice {
    pub fn resolve(self, due: Option<Date>, today: Date) -> Priority {
        match self {
            PriorityChoice::Auto => suggest_priority(due, today),
            PriorityChoice::High => Priority::High,
            PriorityChoice::Medium => Priority::Medium,
            PriorityChoice::Low => Priority::Low,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub due: Option<Date>,
    #[serde(default)]
    pub priority: PriorityChoice,
    #[serde(default)]
    pub category: Option<Category>,
}

/// Partial update. Absent fields are left untouched; `due` distinguishes
/// "absent" from an explicit `null`, which clears the due date.
#[derive(Debug, Default, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default, deserialize_with = "double_option_date")]
    pub due: Option<Option<Date>>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub done: Option<bool>,
}

fn double_option_date<'de, D>(deserializer: D) -> Result<Option<Option<Date>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    iso_date::option::deserialize(deserializer).map(Some)
}

impl TaskPatch {
    /// Merge into an existing task. Returns the merged task and whether this
    /// patch is a genuine pending-to-done transition. A repeated `done: true`
    /// leaves the completion timestamp alone; `done: false` clears it.
    pub fn merge_into(&self, prev: &Task, now: OffsetDateTime) -> (Task, bool) {
        let completing = self.done == Some(true) && !prev.done;
        let reopening = self.done == Some(false) && prev.done;
        let completed_at = if completing {
            Some(now)
        } else if reopening {
            None
        } else {
            prev.completed_at
        };
        let task = Task {
            id: prev.id.clone(),
            user_id: prev.user_id,
            title: self.title.clone().unwrap_or_else(|| prev.title.clone()),
            desc: self.desc.clone().or_else(|| prev.desc.clone()),
            due: self.due.unwrap_or(prev.due),
            priority: self.priority.unwrap_or(prev.priority),
            category: self.category.or(prev.category),
            done: self.done.unwrap_or(prev.done),
            created_at: prev.created_at,
            completed_at,
        };
        (task, completing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Pending,
    Done,
}

impl StatusFilter {
    pub fn as_done(self) -> bool {
        matches!(self, StatusFilter::Done)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub status: Option<StatusFilter>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub category: Option<Category>,
}

impl TaskFilter {
    /// Normalized search needle, if any.
    pub fn needle(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    /// In-memory mirror of the SQL filter, used by the fallback store. A task
    /// without a category counts as `Other`.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(needle) = self.needle() {
            let in_title = task.title.to_lowercase().contains(&needle);
            let in_desc = task
                .desc
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_desc {
                return false;
            }
        }
        if let Some(status) = self.status {
            if task.done != status.as_done() {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(category) = self.category {
            if task.category.unwrap_or(Category::Other) != category {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn sample_task() -> Task {
        Task {
            id: "t1".into(),
            user_id: 1,
            title: "Pay rent".into(),
            desc: Some("transfer before noon".into()),
            due: Some(date!(2026 - 08 - 10)),
            priority: Priority::High,
            category: None,
            done: false,
            created_at: datetime!(2026-08-07 09:00:00 UTC),
            completed_at: None,
        }
    }

    #[test]
    fn auto_priority_resolves_via_due_date() {
        let today = date!(2026 - 08 - 07);
        assert_eq!(
            PriorityChoice::Auto.resolve(Some(today), today),
            Priority::High
        );
        assert_eq!(PriorityChoice::Auto.resolve(None, today), Priority::Low);
        assert_eq!(PriorityChoice::Low.resolve(Some(today), today), Priority::Low);
    }

    #[test]
    fn patch_due_distinguishes_absent_from_null() {
        let absent: TaskPatch = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(absent.due, None);

        let cleared: TaskPatch = serde_json::from_str(r#"{"due": null}"#).unwrap();
        assert_eq!(cleared.due, Some(None));

        let set: TaskPatch = serde_json::from_str(r#"{"due": "2026-08-10"}"#).unwrap();
        assert_eq!(set.due, Some(Some(date!(2026 - 08 - 10))));
    }

    #[test]
    fn merge_applies_only_supplied_fields() {
        let now = datetime!(2026-08-08 10:00:00 UTC);
        let patch = TaskPatch {
            title: Some("Pay rent online".into()),
            due: Some(None),
            ..Default::default()
        };
        let (merged, completing) = patch.merge_into(&sample_task(), now);
        assert!(!completing);
        assert_eq!(merged.title, "Pay rent online");
        assert_eq!(merged.due, None);
        assert_eq!(merged.desc.as_deref(), Some("transfer before noon"));
        assert_eq!(merged.priority, Priority::High);
        assert!(!merged.done);
    }

    #[test]
    fn merge_marks_completion_exactly_once() {
        let now = datetime!(2026-08-08 10:00:00 UTC);
        let later = datetime!(2026-08-09 10:00:00 UTC);
        let done_patch = TaskPatch {
            done: Some(true),
            ..Default::default()
        };

        let (completed, completing) = done_patch.merge_into(&sample_task(), now);
        assert!(completing);
        assert_eq!(completed.completed_at, Some(now));

        let (again, completing_again) = done_patch.merge_into(&completed, later);
        assert!(!completing_again);
        assert_eq!(again.completed_at, Some(now));
    }

    #[test]
    fn merge_reopening_clears_completion_timestamp() {
        let now = datetime!(2026-08-08 10:00:00 UTC);
        let (completed, _) = TaskPatch {
            done: Some(true),
            ..Default::default()
        }
        .merge_into(&sample_task(), now);

        let (reopened, completing) = TaskPatch {
            done: Some(false),
            ..Default::default()
        }
        .merge_into(&completed, now);
        assert!(!completing);
        assert!(!reopened.done);
        assert_eq!(reopened.completed_at, None);
    }

    #[test]
    fn filter_matches_search_status_and_null_category_as_other() {
        let task = sample_task();

        let q = TaskFilter {
            q: Some("RENT".into()),
            ..Default::default()
        };
        assert!(q.matches(&task));

        let q_desc = TaskFilter {
            q: Some("noon".into()),
            ..Default::default()
        };
        assert!(q_desc.matches(&task));

        let done = TaskFilter {
            status: Some(StatusFilter::Done),
            ..Default::default()
        };
        assert!(!done.matches(&task));

        let other = TaskFilter {
            category: Some(Category::Other),
            ..Default::default()
        };
        assert!(other.matches(&task));

        let work = TaskFilter {
            category: Some(Category::Work),
            ..Default::default()
        };
        assert!(!work.matches(&task));
    }
}
