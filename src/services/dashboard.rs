use chrono::NaiveDate;

use crate::models::{Booking, BookingStatus, DashboardStats};

/// Pending and confirmed bookings, soonest first.
pub fn upcoming(bookings: &[Booking], limit: usize) -> Vec<Booking> {
    let mut upcoming: Vec<Booking> = bookings
        .iter()
        .filter(|b| b.is_upcoming())
        .cloned()
        .collect();
    upcoming.sort_by(|a, b| {
        (a.appointment_date, &a.appointment_time).cmp(&(b.appointment_date, &b.appointment_time))
    });
    upcoming.truncate(limit);
    upcoming
}

/// Summary shown on the customer dashboard. Only bookings on or after
/// `today` count as upcoming; spend covers completed bookings.
pub fn compute_stats(bookings: &[Booking], today: NaiveDate) -> DashboardStats {
    let mut stats = DashboardStats {
        total_bookings: bookings.len() as u32,
        ..Default::default()
    };

    for booking in bookings {
        if booking.is_upcoming() && booking.appointment_date >= today {
            stats.upcoming_appointments += 1;
        }
        if booking.status == BookingStatus::Completed {
            stats.completed_services += 1;
            stats.total_spent += booking.total_cost;
        }
    }

    stats
}
