use chrono::{NaiveDate, Utc};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{
    Booking, BookingStatus, Service, ServiceCategory, User, UserRole, Vehicle,
};

pub const DEMO_USER_ID: &str = "dev-user-1";
pub const DEMO_USER_EMAIL: &str = "dev@example.com";
pub const DEMO_USER_PASSWORD: &str = "password";

pub fn demo_user() -> User {
    let now = Utc::now();
    User {
        id: DEMO_USER_ID.to_string(),
        email: DEMO_USER_EMAIL.to_string(),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        phone: "123-456-7890".to_string(),
        role: UserRole::Customer,
        created_at: now,
        updated_at: now,
    }
}

pub fn demo_services() -> Vec<Service> {
    let now = Utc::now();
    let service = |id: &str, name: &str, description: &str, duration: u32, price: f64, category| Service {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        duration,
        price,
        category,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    vec![
        service(
            "service-1",
            "Oil Change",
            "Complete oil change service with filter replacement",
            30,
            29.99,
            ServiceCategory::Maintenance,
        ),
        service(
            "service-2",
            "Brake Service",
            "Brake pad replacement and brake fluid check",
            120,
            149.99,
            ServiceCategory::Repair,
        ),
        service(
            "service-3",
            "Engine Tune-up",
            "Complete engine inspection and tune-up",
            180,
            199.99,
            ServiceCategory::Maintenance,
        ),
        service(
            "service-4",
            "Tire Rotation",
            "Tire rotation and pressure check",
            45,
            39.99,
            ServiceCategory::Maintenance,
        ),
    ]
}

pub fn demo_vehicles() -> Vec<Vehicle> {
    let now = Utc::now();
    vec![
        Vehicle {
            id: "vehicle-1".to_string(),
            customer_id: DEMO_USER_ID.to_string(),
            make: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: 2020,
            vin: "1HGBH41JXMN109186".to_string(),
            license_plate: "ABC-123".to_string(),
            color: "Silver".to_string(),
            mileage: 45000,
            created_at: now,
            updated_at: now,
        },
        Vehicle {
            id: "vehicle-2".to_string(),
            customer_id: DEMO_USER_ID.to_string(),
            make: "Honda".to_string(),
            model: "Civic".to_string(),
            year: 2019,
            vin: "2HGBH41JXMN109187".to_string(),
            license_plate: "XYZ-789".to_string(),
            color: "Blue".to_string(),
            mileage: 52000,
            created_at: now,
            updated_at: now,
        },
    ]
}

fn demo_bookings(services: &[Service]) -> Vec<Booking> {
    let now = Utc::now();
    let history = [
        ("booking-1", "vehicle-1", 0, (2024, 1, 15), "10:00", BookingStatus::Confirmed, "Regular maintenance"),
        ("booking-2", "vehicle-2", 1, (2024, 1, 20), "14:00", BookingStatus::Pending, "Brake pads making noise"),
    ];

    history
        .iter()
        .filter_map(|(id, vehicle_id, service_idx, (y, m, d), time, status, notes)| {
            let service = services.get(*service_idx)?;
            Some(Booking {
                id: id.to_string(),
                customer_id: DEMO_USER_ID.to_string(),
                vehicle_id: vehicle_id.to_string(),
                service_id: service.id.clone(),
                appointment_date: NaiveDate::from_ymd_opt(*y, *m, *d)?,
                appointment_time: time.to_string(),
                status: *status,
                notes: notes.to_string(),
                estimated_duration: service.duration,
                actual_duration: None,
                total_cost: service.price,
                created_at: now,
                updated_at: now,
                vehicle: None,
                service: None,
            })
        })
        .collect()
}

/// Seeds the demo customer with their vehicles, booking history and the
/// service catalog. Safe to run on every start.
pub fn seed_demo_data(conn: &Connection, password_hash: &str) -> anyhow::Result<()> {
    if queries::get_user_by_email(conn, DEMO_USER_EMAIL)?.is_none() {
        queries::create_user(conn, &demo_user(), password_hash)?;
    }

    let services = demo_services();
    for service in &services {
        queries::upsert_service(conn, service)?;
    }
    for vehicle in demo_vehicles() {
        queries::create_vehicle(conn, &vehicle)?;
    }
    for booking in demo_bookings(&services) {
        queries::create_booking(conn, &booking)?;
    }

    tracing::info!(services = services.len(), "demo data seeded");
    Ok(())
}
