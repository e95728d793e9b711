use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;

use crate::tasks::model::{Category, Task};

/// Aggregates over one user's tasks. Ordered maps keep the output identical
/// for identical input.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct Analytics {
    pub weekly: BTreeMap<String, u64>,
    pub categories: BTreeMap<String, u64>,
    pub avg_completion_hours: Option<f64>,
}

/// Bucket key for a completion timestamp, e.g. `2026-W32` (ISO week-based
/// year and week number).
pub fn iso_week_key(at: OffsetDateTime) -> String {
    let (year, week, _) = at.date().to_iso_week_date();
    format!("{year}-W{week:02}")
}

pub fn compute(tasks: &[Task]) -> Analytics {
    let mut weekly = BTreeMap::new();
    let mut categories = BTreeMap::new();
    let mut latency_secs = 0.0_f64;
    let mut completed = 0_u64;

    for task in tasks {
        let category = task.category.map_or("Other", Category::as_str);
        *categories.entry(category.to_string()).or_insert(0) += 1;

        if let Some(done_at) = task.completed_at {
            *weekly.entry(iso_week_key(done_at)).or_insert(0) += 1;
            latency_secs += (done_at - task.created_at).whole_seconds() as f64;
            completed += 1;
        }
    }

    let avg_completion_hours =
        (completed > 0).then(|| latency_secs / completed as f64 / 3600.0);

    Analytics {
        weekly,
        categories,
        avg_completion_hours,
    }
}
