use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationErrors;
use crate::models::{Service, Vehicle};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub vehicle_id: String,
    pub service_id: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub status: BookingStatus,
    #[serde(default)]
    pub notes: String,
    pub estimated_duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_duration: Option<u32>,
    pub total_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
}

impl Booking {
    /// Builds a new pending booking; duration and cost are copied from the
    /// service at creation time.
    pub fn pending(
        customer_id: &str,
        request: &BookingRequest,
        appointment_date: NaiveDate,
        service: &Service,
        vehicle: &Vehicle,
    ) -> Self {
        let now = Utc::now();
        Booking {
            id: uuid::Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            vehicle_id: vehicle.id.clone(),
            service_id: service.id.clone(),
            appointment_date,
            appointment_time: request.appointment_time.clone(),
            status: BookingStatus::Pending,
            notes: request.notes.clone(),
            estimated_duration: service.duration,
            actual_duration: None,
            total_cost: service.price,
            created_at: now,
            updated_at: now,
            vehicle: Some(vehicle.clone()),
            service: Some(service.clone()),
        }
    }

    /// Moves the booking to the request's slot, vehicle and service. Duration
    /// and cost follow the (possibly new) service.
    pub fn reschedule(
        &mut self,
        request: &BookingRequest,
        appointment_date: NaiveDate,
        service: &Service,
        vehicle: &Vehicle,
    ) {
        self.vehicle_id = vehicle.id.clone();
        self.service_id = service.id.clone();
        self.appointment_date = appointment_date;
        self.appointment_time = request.appointment_time.clone();
        self.notes = request.notes.clone();
        self.estimated_duration = service.duration;
        self.total_cost = service.price;
        self.updated_at = Utc::now();
        self.vehicle = Some(vehicle.clone());
        self.service = Some(service.clone());
    }

    pub fn is_upcoming(&self) -> bool {
        matches!(
            self.status,
            BookingStatus::Pending | BookingStatus::Confirmed
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "in_progress" => BookingStatus::InProgress,
            "completed" => BookingStatus::Completed,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Pending,
        }
    }
}

/// The submission payload sent to the booking API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub vehicle_id: String,
    pub service_id: String,
    /// `YYYY-MM-DD`
    pub appointment_date: String,
    /// `HH:MM`
    pub appointment_time: String,
    #[serde(default)]
    pub notes: String,
}

impl BookingRequest {
    pub const DATE_FORMAT: &'static str = "%Y-%m-%d";

    /// The request that would produce `booking` as it stands.
    pub fn from_booking(booking: &Booking) -> Self {
        BookingRequest {
            vehicle_id: booking.vehicle_id.clone(),
            service_id: booking.service_id.clone(),
            appointment_date: booking.appointment_date.format(Self::DATE_FORMAT).to_string(),
            appointment_time: booking.appointment_time.clone(),
            notes: booking.notes.clone(),
        }
    }

    /// Checks the request against the booking schema. Every failing field is
    /// reported, in schema order.
    pub fn validate(&self) -> Result<NaiveDate, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.vehicle_id.trim().is_empty() {
            errors.add("vehicleId", "Please select a vehicle");
        }
        if self.service_id.trim().is_empty() {
            errors.add("serviceId", "Please select a service");
        }

        let date = if self.appointment_date.trim().is_empty() {
            errors.add("appointmentDate", "Please select a date");
            None
        } else {
            match NaiveDate::parse_from_str(self.appointment_date.trim(), Self::DATE_FORMAT) {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.add("appointmentDate", "Please select a valid date");
                    None
                }
            }
        };

        if self.appointment_time.trim().is_empty() {
            errors.add("appointmentTime", "Please select a time");
        }

        match date {
            Some(d) if errors.is_empty() => Ok(d),
            _ => Err(errors),
        }
    }
}

/// Body of `PUT /bookings/:id`; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BookingUpdate {
    pub fn apply(&self, request: &mut BookingRequest) {
        if let Some(vehicle_id) = &self.vehicle_id {
            request.vehicle_id = vehicle_id.clone();
        }
        if let Some(service_id) = &self.service_id {
            request.service_id = service_id.clone();
        }
        if let Some(date) = &self.appointment_date {
            request.appointment_date = date.clone();
        }
        if let Some(time) = &self.appointment_time {
            request.appointment_time = time.clone();
        }
        if let Some(notes) = &self.notes {
            request.notes = notes.clone();
        }
    }

    /// Whether the update touches the slot the booking occupies.
    pub fn moves_slot(&self) -> bool {
        self.service_id.is_some() || self.appointment_date.is_some() || self.appointment_time.is_some()
    }
}
