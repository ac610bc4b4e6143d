use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{
    Booking, BookingStatus, Service, ServiceCategory, User, UserRole, Vehicle,
};

fn ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// ── Users ──

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, phone, role, created_at, updated_at, password_hash";

fn parse_user_row(row: &Row) -> rusqlite::Result<(User, String)> {
    let role: String = row.get(5)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok((
        User {
            id: row.get(0)?,
            email: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            phone: row.get(4)?,
            role: UserRole::parse(&role),
            created_at: parse_ts(&created_at),
            updated_at: parse_ts(&updated_at),
        },
        row.get(8)?,
    ))
}

pub fn create_user(conn: &Connection, user: &User, password_hash: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, email, first_name, last_name, phone, role, password_hash, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            user.id,
            user.email.to_lowercase(),
            user.first_name,
            user.last_name,
            user.phone,
            user.role.as_str(),
            password_hash,
            ts(&user.created_at),
            ts(&user.updated_at),
        ],
    )?;
    Ok(())
}

/// Returns the user together with their stored password digest.
pub fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<(User, String)>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
    let user = conn
        .query_row(&sql, params![email.trim().to_lowercase()], parse_user_row)
        .optional()?;
    Ok(user)
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    let user = conn
        .query_row(&sql, params![id], parse_user_row)
        .optional()?;
    Ok(user.map(|(u, _)| u))
}

// ── Services ──

const SERVICE_COLUMNS: &str =
    "id, name, description, duration, price, category, is_active, created_at, updated_at";

fn parse_service_row(row: &Row) -> rusqlite::Result<Service> {
    let category: String = row.get(5)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;
    Ok(Service {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        duration: row.get(3)?,
        price: row.get(4)?,
        category: ServiceCategory::parse(&category).unwrap_or(ServiceCategory::Maintenance),
        is_active: row.get(6)?,
        created_at: parse_ts(&created_at),
        updated_at: parse_ts(&updated_at),
    })
}

pub fn upsert_service(conn: &Connection, service: &Service) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO services (id, name, description, duration, price, category, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           description = excluded.description,
           duration = excluded.duration,
           price = excluded.price,
           category = excluded.category,
           is_active = excluded.is_active,
           updated_at = excluded.updated_at",
        params![
            service.id,
            service.name,
            service.description,
            service.duration,
            service.price,
            service.category.as_str(),
            service.is_active,
            ts(&service.created_at),
            ts(&service.updated_at),
        ],
    )?;
    Ok(())
}

pub fn list_services(conn: &Connection) -> anyhow::Result<Vec<Service>> {
    let sql = format!("SELECT {SERVICE_COLUMNS} FROM services ORDER BY name ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], parse_service_row)?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

pub fn get_service(conn: &Connection, id: &str) -> anyhow::Result<Option<Service>> {
    let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?1");
    let service = conn
        .query_row(&sql, params![id], parse_service_row)
        .optional()?;
    Ok(service)
}

// ── Vehicles ──

const VEHICLE_COLUMNS: &str =
    "id, customer_id, make, model, year, vin, license_plate, color, mileage, created_at, updated_at";

fn parse_vehicle_row(row: &Row) -> rusqlite::Result<Vehicle> {
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;
    Ok(Vehicle {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        make: row.get(2)?,
        model: row.get(3)?,
        year: row.get(4)?,
        vin: row.get(5)?,
        license_plate: row.get(6)?,
        color: row.get(7)?,
        mileage: row.get(8)?,
        created_at: parse_ts(&created_at),
        updated_at: parse_ts(&updated_at),
    })
}

pub fn create_vehicle(conn: &Connection, vehicle: &Vehicle) -> anyhow::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO vehicles (id, customer_id, make, model, year, vin, license_plate, color, mileage, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            vehicle.id,
            vehicle.customer_id,
            vehicle.make,
            vehicle.model,
            vehicle.year,
            vehicle.vin,
            vehicle.license_plate,
            vehicle.color,
            vehicle.mileage,
            ts(&vehicle.created_at),
            ts(&vehicle.updated_at),
        ],
    )?;
    Ok(())
}

pub fn update_vehicle(conn: &Connection, vehicle: &Vehicle) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE vehicles SET make = ?1, model = ?2, year = ?3, vin = ?4, license_plate = ?5,
           color = ?6, mileage = ?7, updated_at = ?8
         WHERE id = ?9 AND customer_id = ?10",
        params![
            vehicle.make,
            vehicle.model,
            vehicle.year,
            vehicle.vin,
            vehicle.license_plate,
            vehicle.color,
            vehicle.mileage,
            ts(&Utc::now()),
            vehicle.id,
            vehicle.customer_id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_vehicle(conn: &Connection, id: &str, customer_id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM vehicles WHERE id = ?1 AND customer_id = ?2",
        params![id, customer_id],
    )?;
    Ok(count > 0)
}

pub fn list_vehicles_for_customer(conn: &Connection, customer_id: &str) -> anyhow::Result<Vec<Vehicle>> {
    let sql = format!(
        "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE customer_id = ?1 ORDER BY created_at ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![customer_id], parse_vehicle_row)?;

    let mut vehicles = vec![];
    for row in rows {
        vehicles.push(row?);
    }
    Ok(vehicles)
}

pub fn get_vehicle(conn: &Connection, id: &str) -> anyhow::Result<Option<Vehicle>> {
    let sql = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = ?1");
    let vehicle = conn
        .query_row(&sql, params![id], parse_vehicle_row)
        .optional()?;
    Ok(vehicle)
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, customer_id, vehicle_id, service_id, appointment_date, appointment_time, \
     status, notes, estimated_duration, actual_duration, total_cost, created_at, updated_at";

fn parse_booking_row(row: &Row) -> rusqlite::Result<Booking> {
    let date: String = row.get(4)?;
    let status: String = row.get(6)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;
    let appointment_date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Booking {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        vehicle_id: row.get(2)?,
        service_id: row.get(3)?,
        appointment_date,
        appointment_time: row.get(5)?,
        status: BookingStatus::from_str(&status),
        notes: row.get(7)?,
        estimated_duration: row.get(8)?,
        actual_duration: row.get(9)?,
        total_cost: row.get(10)?,
        created_at: parse_ts(&created_at),
        updated_at: parse_ts(&updated_at),
        vehicle: None,
        service: None,
    })
}

/// Fills in the vehicle and service a booking refers to, when they still exist.
fn attach_relations(conn: &Connection, mut booking: Booking) -> anyhow::Result<Booking> {
    booking.vehicle = get_vehicle(conn, &booking.vehicle_id)?;
    booking.service = get_service(conn, &booking.service_id)?;
    Ok(booking)
}

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO bookings (id, customer_id, vehicle_id, service_id, appointment_date, appointment_time,
           status, notes, estimated_duration, actual_duration, total_cost, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            booking.id,
            booking.customer_id,
            booking.vehicle_id,
            booking.service_id,
            booking.appointment_date.format("%Y-%m-%d").to_string(),
            booking.appointment_time,
            booking.status.as_str(),
            booking.notes,
            booking.estimated_duration,
            booking.actual_duration,
            booking.total_cost,
            ts(&booking.created_at),
            ts(&booking.updated_at),
        ],
    )?;
    Ok(())
}

/// Writes the customer-editable fields of an existing booking.
pub fn update_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET vehicle_id = ?1, service_id = ?2, appointment_date = ?3, appointment_time = ?4,
           notes = ?5, estimated_duration = ?6, total_cost = ?7, updated_at = ?8
         WHERE id = ?9",
        params![
            booking.vehicle_id,
            booking.service_id,
            booking.appointment_date.format("%Y-%m-%d").to_string(),
            booking.appointment_time,
            booking.notes,
            booking.estimated_duration,
            booking.total_cost,
            ts(&booking.updated_at),
            booking.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    let booking = conn
        .query_row(&sql, params![id], parse_booking_row)
        .optional()?;

    match booking {
        Some(b) => Ok(Some(attach_relations(conn, b)?)),
        None => Ok(None),
    }
}

/// Newest appointments first.
pub fn list_bookings_for_customer(conn: &Connection, customer_id: &str) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE customer_id = ?1
         ORDER BY appointment_date DESC, appointment_time DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![customer_id], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(attach_relations(conn, row?)?);
    }
    Ok(bookings)
}

/// Every non-cancelled booking on a date, across all customers.
pub fn get_active_bookings_on_date(conn: &Connection, date: NaiveDate) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE appointment_date = ?1 AND status != 'cancelled'
         ORDER BY appointment_time ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![date.format("%Y-%m-%d").to_string()], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: &BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), ts(&Utc::now()), id],
    )?;
    Ok(count > 0)
}

// ── Sessions ──

pub fn save_session(conn: &Connection, token: &str, user: &User) -> anyhow::Result<()> {
    let user_json = serde_json::to_string(user)?;
    conn.execute(
        "INSERT INTO sessions (id, token, user_json, created_at) VALUES (1, ?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
           token = excluded.token,
           user_json = excluded.user_json,
           created_at = excluded.created_at",
        params![token, user_json, ts(&Utc::now())],
    )?;
    Ok(())
}

pub fn load_session(conn: &Connection) -> anyhow::Result<Option<(String, User)>> {
    let row: Option<(String, String)> = conn
        .query_row("SELECT token, user_json FROM sessions WHERE id = 1", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .optional()?;

    match row {
        Some((token, user_json)) => match serde_json::from_str::<User>(&user_json) {
            Ok(user) => Ok(Some((token, user))),
            Err(e) => {
                // A record we can no longer read is treated as logged out.
                tracing::warn!(error = %e, "discarding unreadable session record");
                clear_session(conn)?;
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

pub fn clear_session(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("DELETE FROM sessions", [])?;
    Ok(())
}
