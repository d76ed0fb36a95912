use chrono::{Duration, NaiveDate, NaiveTime};

use crate::models::draft::BookingDraft;

/// Fixed catalogue of bookable times, one hour apart. Slots always run for
/// one hour, so "5:00 PM" is the last start of the day.
pub const TIME_LABELS: [&str; 8] = [
    "10:00 AM", "11:00 AM", "12:00 PM", "1:00 PM", "2:00 PM", "3:00 PM", "4:00 PM", "5:00 PM",
];

/// One offerable day inside the booking window, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSlotCandidate {
    pub date: NaiveDate,
    pub weekday: String,
    pub selectable: bool,
}

pub fn label_to_time(label: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(label.trim(), "%I:%M %p").ok()
}

/// Converts a display label to the 24-hour wire form, `"2:00 PM"` → `"14:00"`.
pub fn label_to_wire(label: &str) -> Option<String> {
    label_to_time(label).map(|t| t.format("%H:%M").to_string())
}

/// A label is selectable on a future day unconditionally, and on the current
/// day only while its wall-clock instant is still strictly ahead of now.
/// Days before today are never selectable, and unknown labels never are.
pub fn is_time_selectable(
    day: NaiveDate,
    label: &str,
    today: NaiveDate,
    now_time: NaiveTime,
) -> bool {
    let Some(slot_time) = label_to_time(label) else {
        return false;
    };
    if day < today {
        return false;
    }
    if day > today {
        return true;
    }
    slot_time > now_time
}

pub fn selectable_labels(
    day: NaiveDate,
    today: NaiveDate,
    now_time: NaiveTime,
) -> Vec<&'static str> {
    TIME_LABELS
        .iter()
        .copied()
        .filter(|label| is_time_selectable(day, label, today, now_time))
        .collect()
}

/// First selectable label on the day, falling back to the head of the
/// catalogue when the whole day has elapsed.
pub fn default_time_for(day: NaiveDate, today: NaiveDate, now_time: NaiveTime) -> &'static str {
    TIME_LABELS
        .iter()
        .copied()
        .find(|label| is_time_selectable(day, label, today, now_time))
        .unwrap_or(TIME_LABELS[0])
}

/// The rolling booking window: `window_days` days starting today. A day is
/// selectable while at least one of its time labels still is.
pub fn date_candidates(
    today: NaiveDate,
    now_time: NaiveTime,
    window_days: usize,
) -> Vec<DateSlotCandidate> {
    (0..window_days as i64)
        .map(|offset| {
            let date = today + Duration::days(offset);
            DateSlotCandidate {
                weekday: date.format("%a").to_string(),
                selectable: TIME_LABELS
                    .iter()
                    .any(|label| is_time_selectable(date, label, today, now_time)),
                date,
            }
        })
        .collect()
}

/// Picking a day resets the time selection to that day's first available
/// label so a stale, already-elapsed time can't ride along.
pub fn apply_date_selection(
    draft: &mut BookingDraft,
    day: NaiveDate,
    today: NaiveDate,
    now_time: NaiveTime,
) {
    draft.date = Some(day);
    draft.time_label = Some(default_time_for(day, today, now_time).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn clock(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    #[test]
    fn labels_convert_to_wire_times() {
        assert_eq!(label_to_wire("10:00 AM").as_deref(), Some("10:00"));
        assert_eq!(label_to_wire("12:00 PM").as_deref(), Some("12:00"));
        assert_eq!(label_to_wire("2:00 PM").as_deref(), Some("14:00"));
        assert_eq!(label_to_wire("5:00 PM").as_deref(), Some("17:00"));
        assert_eq!(label_to_wire("25:00"), None);
    }

    #[test]
    fn elapsed_times_today_are_disabled() {
        let today = date("2025-03-10");
        let now = clock("14:30");

        assert!(!is_time_selectable(today, "2:00 PM", today, now));
        assert!(is_time_selectable(today, "3:00 PM", today, now));
        // Tomorrow everything is open again, including the elapsed label.
        assert!(is_time_selectable(date("2025-03-11"), "2:00 PM", today, now));
        assert!(!is_time_selectable(date("2025-03-09"), "2:00 PM", today, now));
    }

    #[test]
    fn a_label_exactly_at_now_is_disabled() {
        let today = date("2025-03-10");
        assert!(!is_time_selectable(today, "2:00 PM", today, clock("14:00")));
        assert!(is_time_selectable(today, "2:00 PM", today, clock("13:59")));
    }

    #[test]
    fn default_time_skips_elapsed_labels() {
        let today = date("2025-03-10");
        assert_eq!(default_time_for(today, today, clock("09:00")), "10:00 AM");
        assert_eq!(default_time_for(today, today, clock("14:30")), "3:00 PM");
        // Fully elapsed day falls back to the head of the catalogue.
        assert_eq!(default_time_for(today, today, clock("18:00")), "10:00 AM");
        assert_eq!(
            default_time_for(date("2025-03-12"), today, clock("18:00")),
            "10:00 AM"
        );
    }

    #[test]
    fn window_lists_seven_days_starting_today() {
        let today = date("2025-03-10");
        let candidates = date_candidates(today, clock("14:30"), 7);

        assert_eq!(candidates.len(), 7);
        assert_eq!(candidates[0].date, today);
        assert_eq!(candidates[0].weekday, "Mon");
        assert!(candidates[0].selectable);
        assert_eq!(candidates[6].date, date("2025-03-16"));
        assert_eq!(candidates[6].weekday, "Sun");
        assert!(candidates.iter().skip(1).all(|c| c.selectable));
    }

    #[test]
    fn today_becomes_unselectable_after_the_last_label() {
        let today = date("2025-03-10");
        let candidates = date_candidates(today, clock("17:00"), 7);
        assert!(!candidates[0].selectable);
        assert!(candidates[1].selectable);
    }

    #[test]
    fn selecting_a_day_resets_the_time() {
        let today = date("2025-03-10");
        let mut draft = BookingDraft::new();
        draft.time_label = Some("10:00 AM".to_string());

        apply_date_selection(&mut draft, today, today, clock("14:30"));
        assert_eq!(draft.date, Some(today));
        assert_eq!(draft.time_label.as_deref(), Some("3:00 PM"));

        apply_date_selection(&mut draft, date("2025-03-11"), today, clock("14:30"));
        assert_eq!(draft.time_label.as_deref(), Some("10:00 AM"));
    }

    #[test]
    fn selectable_labels_shrink_through_the_day() {
        let today = date("2025-03-10");
        assert_eq!(selectable_labels(today, today, clock("09:00")).len(), 8);
        assert_eq!(
            selectable_labels(today, today, clock("14:30")),
            vec!["3:00 PM", "4:00 PM", "5:00 PM"]
        );
        assert!(selectable_labels(today, today, clock("17:00")).is_empty());
    }
}
