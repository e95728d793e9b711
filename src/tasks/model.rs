use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Calendar dates cross the storage and export boundary as `YYYY-MM-DD`.
pub(crate) mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::format_description::FormatItem;
    use time::macros::format_description;
    use time::Date;

    const FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub(crate) fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(&FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Date::parse(&raw, &FORMAT).map_err(serde::de::Error::custom)
    }

    pub(crate) mod option {
        use super::*;

        pub(crate) fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => {
                    let formatted =
                        date.format(&FORMAT).map_err(serde::ser::Error::custom)?;
                    serializer.serialize_some(&formatted)
                }
                None => serializer.serialize_none(),
            }
        }

        pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| Date::parse(&raw, &FORMAT).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Category {
    Work,
    Personal,
    Shopping,
    Health,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Shopping => "Shopping",
            Category::Health => "Health",
            Category::Other => "Other",
        }
    }
}

/// Task record. Field names and serialized forms match the stored columns,
/// so exported JSON round-trips losslessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub due: Option<Date>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub done: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

/// Validated input for task creation, priority already resolved.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub desc: Option<String>,
    pub due: Option<Date>,
    pub priority: Priority,
    pub category: Option<Category>,
}

impl Task {
    pub fn new(user_id: i64, new: NewTask, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            title: new.title,
            desc: new.desc,
            due: new.due,
            priority: new.priority,
            category: new.category,
            done: false,
            created_at: now,
            completed_at: None,
        }
    }
}

/// Advisory priority from the due date: overdue or due today is High, due
/// within the next three days is Medium, everything else (including no due
/// date) is Low.
pub fn suggest_priority(due: Option<Date>, today: Date) -> Priority {
    let Some(due) = due else {
        return Priority::Low;
    };
    let delta = (due - today).whole_days();
    if delta <= 0 {
        Priority::High
    } else if delta <= 3 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn no_due_date_suggests_low() {
        assert_eq!(suggest_priority(None, date!(2026 - 08 - 07)), Priority::Low);
    }

    #[test]
    fn due_today_or_overdue_suggests_high() {
        let today = date!(2026 - 08 - 07);
        assert_eq!(suggest_priority(Some(today), today), Priority::High);
        assert_eq!(
            suggest_priority(Some(date!(2026 - 08 - 01)), today),
            Priority::High
        );
    }

    #[test]
    fn due_within_three_days_suggests_medium() {
        let today = date!(2026 - 08 - 07);
        assert_eq!(
            suggest_priority(Some(date!(2026 - 08 - 08)), today),
            Priority::Medium
        );
        assert_eq!(
            suggest_priority(Some(date!(2026 - 08 - 10)), today),
            Priority::Medium
        );
    }

    #[test]
    fn due_later_suggests_low() {
        let today = date!(2026 - 08 - 07);
        assert_eq!(
            suggest_priority(Some(date!(2026 - 08 - 11)), today),
            Priority::Low
        );
    }

    #[test]
    fn enums_serialize_to_canonical_strings() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"High\"");
        assert_eq!(serde_json::to_string(&Category::Work).unwrap(), "\"Work\"");
    }

    #[test]
    fn task_serializes_dates_as_iso_strings() {
        let task = Task {
            id: "t1".into(),
            user_id: 7,
            title: "Pay rent".into(),
            desc: None,
            due: Some(date!(2026 - 08 - 10)),
            priority: Priority::High,
            category: Some(Category::Personal),
            done: false,
            created_at: datetime!(2026-08-07 09:30:00 UTC),
            completed_at: None,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["due"], "2026-08-10");
        let created = json["created_at"].as_str().unwrap();
        assert!(created.starts_with("2026-08-07T09:30:00"));
        assert_eq!(json["priority"], "High");
    }

    #[test]
    fn legacy_record_without_optional_keys_deserializes() {
        let json = r#"{
            "id": "abc",
            "title": "old task",
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.user_id, 0);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.category, None);
        assert!(!task.done);
        assert_eq!(task.completed_at, None);
    }
}
