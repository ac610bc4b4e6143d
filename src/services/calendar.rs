use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::models::TimeSlot;
use crate::services::scheduling;

/// Dates before today cannot be picked. Today itself always can.
pub fn is_date_disabled(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

pub fn is_slot_disabled(slot: &TimeSlot) -> bool {
    !slot.is_available
}

/// "Today", "Tomorrow", otherwise the short weekday name.
pub fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if Some(date) == today.succ_opt() {
        "Tomorrow".to_string()
    } else {
        date.format("%a").to_string()
    }
}

/// The Monday-first week containing `anchor`.
pub fn week_days(anchor: NaiveDate) -> Vec<NaiveDate> {
    let monday = anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64);
    (0..7).map(|i| monday + Duration::days(i)).collect()
}

pub fn shift_week(anchor: NaiveDate, weeks: i64) -> NaiveDate {
    anchor + Duration::weeks(weeks)
}

/// "14:00" -> "2:00 PM". Unparseable input is returned as given.
pub fn format_time(time: &str) -> String {
    match scheduling::parse_time(time) {
        Ok(t) => format_clock(t),
        Err(_) => time.to_string(),
    }
}

fn format_clock(t: NaiveTime) -> String {
    t.format("%-I:%M %p").to_string()
}

/// 90 -> "1h 30m", 120 -> "2h", 45 -> "45m".
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// "Monday, January 15, 2024"
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

pub fn format_price(amount: f64) -> String {
    format!("${amount:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_past_dates_disabled_today_enabled() {
        let today = date("2024-01-15");
        assert!(is_date_disabled(date("2024-01-14"), today));
        assert!(is_date_disabled(date("2023-12-31"), today));
        assert!(!is_date_disabled(today, today));
        assert!(!is_date_disabled(date("2024-01-16"), today));
    }

    #[test]
    fn test_slot_disabled_follows_availability() {
        let mut slot = TimeSlot::open("10:00");
        assert!(!is_slot_disabled(&slot));
        slot.is_available = false;
        assert!(is_slot_disabled(&slot));
    }

    #[test]
    fn test_date_labels() {
        let today = date("2024-01-15"); // Monday
        assert_eq!(date_label(today, today), "Today");
        assert_eq!(date_label(date("2024-01-16"), today), "Tomorrow");
        assert_eq!(date_label(date("2024-01-17"), today), "Wed");
        assert_eq!(date_label(date("2024-01-14"), today), "Sun");
    }

    #[test]
    fn test_week_days_start_on_monday() {
        let days = week_days(date("2024-01-18"));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date("2024-01-15"));
        assert_eq!(days[6], date("2024-01-21"));

        let next = week_days(shift_week(date("2024-01-18"), 1));
        assert_eq!(next[0], date("2024-01-22"));
        let prev = week_days(shift_week(date("2024-01-18"), -1));
        assert_eq!(prev[0], date("2024-01-08"));
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time("14:00"), "2:00 PM");
        assert_eq!(format_time("09:30"), "9:30 AM");
        assert_eq!(format_time("12:00"), "12:00 PM");
        assert_eq!(format_time("soon"), "soon");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30), "30m");
        assert_eq!(format_duration(90), "1h 30m");
        assert_eq!(format_duration(120), "2h");
    }

    #[test]
    fn test_long_date_and_price() {
        assert_eq!(format_long_date(date("2024-01-15")), "Monday, January 15, 2024");
        assert_eq!(format_price(29.99), "$29.99");
        assert_eq!(format_price(150.0), "$150.00");
    }
}
