use time::Date;

use crate::tasks::model::Priority;

/// Result of a completion award: the increment and the user's new totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    pub points_added: i64,
    pub points: i64,
    pub streak: i64,
}

pub fn priority_bonus(priority: Priority) -> i64 {
    match priority {
        Priority::High => 5,
        Priority::Medium => 2,
        Priority::Low => 0,
    }
}

/// Compute the award for one genuine completion. Consecutive-day completions
/// extend the streak, a second completion on the same day holds it, anything
/// else (including no prior completion) resets it to 1.
pub fn apply_completion(
    points: i64,
    streak: i64,
    last_complete: Option<Date>,
    today: Date,
    priority: Priority,
) -> Award {
    let points_added = 10 + priority_bonus(priority);
    let streak = match last_complete {
        Some(last) if Some(last) == today.previous_day() => streak + 1,
        Some(last) if last == today => streak,
        _ => 1,
    };
    Award {
        points_added,
        points: points + points_added,
        streak,
    }
}

/// Badges are derived from the current totals, never stored.
pub fn badges(points: i64, streak: i64, completed: i64) -> Vec<String> {
    let mut earned = Vec::new();
    if points >= 100 {
        earned.push("Productivity Master (100+ pts)".to_string());
    }
    if streak >= 7 {
        earned.push("7-day streak".to_string());
    }
    if completed >= 50 {
        earned.push("Task closer (50+ tasks completed)".to_string());
    }
    earned
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2026 - 08 - 07);

    #[test]
    fn base_points_plus_priority_bonus() {
        assert_eq!(
            apply_completion(0, 0, None, TODAY, Priority::High).points_added,
            15
        );
        assert_eq!(
            apply_completion(0, 0, None, TODAY, Priority::Medium).points_added,
            12
        );
        assert_eq!(
            apply_completion(0, 0, None, TODAY, Priority::Low).points_added,
            10
        );
    }

    #[test]
    fn first_completion_starts_streak_at_one() {
        let award = apply_completion(0, 0, None, TODAY, Priority::Low);
        assert_eq!(award.streak, 1);
        assert_eq!(award.points, 10);
    }

    #[test]
    fn consecutive_day_extends_streak() {
        let award = apply_completion(10, 3, Some(date!(2026 - 08 - 06)), TODAY, Priority::Low);
        assert_eq!(award.streak, 4);
    }

    #[test]
    fn same_day_completion_holds_streak() {
        let award = apply_completion(10, 3, Some(TODAY), TODAY, Priority::Low);
        assert_eq!(award.streak, 3);
    }

    #[test]
    fn gap_of_two_days_resets_streak() {
        let award = apply_completion(10, 3, Some(date!(2026 - 08 - 05)), TODAY, Priority::Low);
        assert_eq!(award.streak, 1);
    }

    #[test]
    fn badge_thresholds() {
        assert!(badges(0, 0, 0).is_empty());
        assert_eq!(badges(100, 0, 0).len(), 1);
        assert_eq!(badges(150, 7, 50).len(), 3);
    }
}
