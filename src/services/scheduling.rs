use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{Booking, BookingStatus, TimeSlot};

/// First and last hourly start offered to customers.
pub const FIRST_SLOT_HOUR: u32 = 9;
pub const LAST_SLOT_HOUR: u32 = 17;

#[derive(Debug, PartialEq)]
pub enum SchedulingError {
    InvalidTime(String),
    OutsideBusinessHours,
    InPast,
    Conflict,
}

impl std::fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulingError::InvalidTime(t) => write!(f, "Invalid appointment time: {t}"),
            SchedulingError::OutsideBusinessHours => write!(
                f,
                "Appointments start between {FIRST_SLOT_HOUR:02}:00 and {LAST_SLOT_HOUR:02}:00"
            ),
            SchedulingError::InPast => write!(f, "That appointment time has already passed"),
            SchedulingError::Conflict => write!(f, "Time slot is no longer available"),
        }
    }
}

impl std::error::Error for SchedulingError {}

pub fn parse_time(s: &str) -> Result<NaiveTime, SchedulingError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| SchedulingError::InvalidTime(s.to_string()))
}

/// The hourly start times offered on any day.
pub fn slot_times() -> Vec<NaiveTime> {
    (FIRST_SLOT_HOUR..=LAST_SLOT_HOUR)
        .filter_map(|h| NaiveTime::from_hms_opt(h, 0, 0))
        .collect()
}

/// Finds an active booking overlapping `[start, start + duration)`.
fn find_overlap<'a>(
    start: NaiveTime,
    duration_minutes: u32,
    existing: &'a [Booking],
) -> Option<&'a Booking> {
    let start_mins = minutes_of_day(start);
    let end_mins = start_mins + duration_minutes as i64;

    existing.iter().find(|booking| {
        if booking.status == BookingStatus::Cancelled {
            return false;
        }
        let Ok(booked) = parse_time(&booking.appointment_time) else {
            return false;
        };
        let booked_start = minutes_of_day(booked);
        let booked_end = booked_start + booking.estimated_duration as i64;
        // Overlap: booking starts before proposed ends AND ends after proposed starts
        booked_start < end_mins && booked_end > start_mins
    })
}

fn minutes_of_day(t: NaiveTime) -> i64 {
    (t - NaiveTime::MIN).num_minutes()
}

/// Availability for every offered start time on `date`, given the bookings
/// already on that date. Start times at or before `now` are unavailable.
pub fn compute_slots(
    date: NaiveDate,
    duration_minutes: u32,
    existing: &[Booking],
    now: NaiveDateTime,
) -> Vec<TimeSlot> {
    slot_times()
        .into_iter()
        .map(|start| {
            let overlap = find_overlap(start, duration_minutes, existing);
            let passed = date.and_time(start) <= now;
            TimeSlot {
                time: start.format("%H:%M").to_string(),
                is_available: overlap.is_none() && !passed,
                booking_id: overlap.map(|b| b.id.clone()),
            }
        })
        .collect()
}

/// Checks a requested start time before a booking is created.
pub fn check_slot(
    date: NaiveDate,
    time: &str,
    duration_minutes: u32,
    existing: &[Booking],
    now: NaiveDateTime,
) -> Result<(), SchedulingError> {
    let start = parse_time(time)?;

    let first = NaiveTime::from_hms_opt(FIRST_SLOT_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    let last = NaiveTime::from_hms_opt(LAST_SLOT_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    if start < first || start > last {
        return Err(SchedulingError::OutsideBusinessHours);
    }

    if date.and_time(start) <= now {
        return Err(SchedulingError::InPast);
    }

    if find_overlap(start, duration_minutes, existing).is_some() {
        return Err(SchedulingError::Conflict);
    }

    Ok(())
}
