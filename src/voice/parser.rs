use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use time::{Date, Duration};

use crate::tasks::model::{iso_date, Priority};

/// Draft task fields extracted from a recognized transcript. The priority is
/// left unset unless a keyword matched, so the due-date rule can still apply
/// at creation time.
#[derive(Debug, PartialEq, Serialize)]
pub struct VoiceDraft {
    pub title: String,
    #[serde(with = "iso_date::option")]
    pub due: Option<Date>,
    pub priority: Option<Priority>,
}

lazy_static! {
    static ref TOMORROW_RE: Regex = Regex::new(r"(?i)\btomorrow\b").unwrap();
    static ref IN_DAYS_RE: Regex = Regex::new(r"(?i)\bin (\d+) days?\b").unwrap();
    static ref LOW_RE: Regex = Regex::new(r"(?i)\blow\b").unwrap();
}

/// Ordered heuristics: priority keywords first, then "tomorrow", then
/// "in N day(s)". The two due-date detectors are mutually exclusive; the
/// matched phrase is stripped from the title, falling back to the full
/// transcript when stripping leaves nothing.
pub fn parse_transcript(text: &str, today: Date) -> VoiceDraft {
    let text = text.trim();
    let lower = text.to_lowercase();

    let priority = if lower.contains("high priority") || lower.contains("urgent") {
        Some(Priority::High)
    } else if lower.contains("low priority") || LOW_RE.is_match(&lower) {
        Some(Priority::Low)
    } else {
        None
    };

    if TOMORROW_RE.is_match(text) {
        if let Some(due) = today.next_day() {
            let title = tidy(&TOMORROW_RE.replace_all(text, ""));
            return VoiceDraft {
                title: fallback_title(title, text),
                due: Some(due),
                priority,
            };
        }
    }

    if let Some(caps) = IN_DAYS_RE.captures(text) {
        let due = caps[1]
            .parse::<i64>()
            .ok()
            .and_then(|n| today.checked_add(Duration::days(n)));
        if let Some(due) = due {
            let title = tidy(&IN_DAYS_RE.replace(text, ""));
            return VoiceDraft {
                title: fallback_title(title, text),
                due: Some(due),
                priority,
            };
        }
    }

    VoiceDraft {
        title: text.to_string(),
        due: None,
        priority,
    }
}

fn tidy(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fallback_title(title: String, original: &str) -> String {
    if title.is_empty() {
        original.to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2026 - 08 - 07);

    #[test]
    fn plain_text_is_just_a_title() {
        let draft = parse_transcript("call the dentist", TODAY);
        assert_eq!(draft.title, "call the dentist");
        assert_eq!(draft.due, None);
        assert_eq!(draft.priority, None);
    }

    #[test]
    fn tomorrow_sets_due_and_strips_the_word() {
        let draft = parse_transcript("Pay rent tomorrow", TODAY);
        assert_eq!(draft.title, "Pay rent");
        assert_eq!(draft.due, Some(date!(2026 - 08 - 08)));
    }

    #[test]
    fn in_n_days_sets_due_and_strips_the_phrase() {
        let draft = parse_transcript("submit report in 3 days", TODAY);
        assert_eq!(draft.title, "submit report");
        assert_eq!(draft.due, Some(date!(2026 - 08 - 10)));

        let single = parse_transcript("check oven in 1 day", TODAY);
        assert_eq!(single.title, "check oven");
        assert_eq!(single.due, Some(date!(2026 - 08 - 08)));
    }

    #[test]
    fn tomorrow_wins_over_in_n_days() {
        let draft = parse_transcript("ship it tomorrow in 2 days", TODAY);
        assert_eq!(draft.due, Some(date!(2026 - 08 - 08)));
        assert_eq!(draft.title, "ship it in 2 days");
    }

    #[test]
    fn priority_keywords_are_detected() {
        assert_eq!(
            parse_transcript("urgent fix the server", TODAY).priority,
            Some(Priority::High)
        );
        assert_eq!(
            parse_transcript("this is high priority", TODAY).priority,
            Some(Priority::High)
        );
        assert_eq!(
            parse_transcript("water plants low priority", TODAY).priority,
            Some(Priority::Low)
        );
        assert_eq!(
            parse_transcript("keep the lights low", TODAY).priority,
            Some(Priority::Low)
        );
        // "low" only matches as a standalone word.
        assert_eq!(parse_transcript("slow cooker dinner", TODAY).priority, None);
    }

    #[test]
    fn stripping_never_leaves_an_empty_title() {
        let draft = parse_transcript("tomorrow", TODAY);
        assert_eq!(draft.title, "tomorrow");
        assert_eq!(draft.due, Some(date!(2026 - 08 - 08)));
    }

    #[test]
    fn absurd_day_counts_do_not_derive_a_due_date() {
        let draft = parse_transcript("renew lease in 99999999999999999999 days", TODAY);
        assert_eq!(draft.due, None);
        assert_eq!(draft.title, "renew lease in 99999999999999999999 days");
    }
}
