use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::db::seed;
use crate::errors::ApiError;
use crate::models::{Booking, BookingRequest, Service, TimeSlot, Vehicle};
use crate::services::providers::{BookingSubmitter, CatalogProvider, SlotProvider};
use crate::services::scheduling::{self, SchedulingError};

struct Store {
    services: Vec<Service>,
    vehicles: Vec<Vehicle>,
    bookings: Vec<Booking>,
}

/// Runs the booking flow without a server, against the demo catalog.
pub struct InMemoryBackend {
    customer_id: String,
    store: Mutex<Store>,
    clock: Option<NaiveDateTime>,
}

impl InMemoryBackend {
    pub fn new(customer_id: &str, services: Vec<Service>, vehicles: Vec<Vehicle>) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            store: Mutex::new(Store {
                services,
                vehicles,
                bookings: vec![],
            }),
            clock: None,
        }
    }

    /// The demo customer with four services and two vehicles.
    pub fn demo() -> Self {
        Self::new(seed::DEMO_USER_ID, seed::demo_services(), seed::demo_vehicles())
    }

    /// Pins "now" for availability checks.
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.clock = Some(now);
        self
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.unwrap_or_else(|| Local::now().naive_local())
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.store.lock().unwrap().bookings.clone()
    }

    fn bookings_on(store: &Store, date: NaiveDate) -> Vec<Booking> {
        store
            .bookings
            .iter()
            .filter(|b| b.appointment_date == date)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CatalogProvider for InMemoryBackend {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        Ok(self.store.lock().unwrap().services.clone())
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, ApiError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .vehicles
            .iter()
            .filter(|v| v.customer_id == self.customer_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SlotProvider for InMemoryBackend {
    async fn available_slots(
        &self,
        date: NaiveDate,
        service_id: &str,
    ) -> Result<Vec<TimeSlot>, ApiError> {
        let store = self.store.lock().unwrap();
        let service = store
            .services
            .iter()
            .find(|s| s.id == service_id && s.is_active)
            .ok_or_else(|| ApiError::Rejected("Service not found".to_string()))?;

        let existing = Self::bookings_on(&store, date);
        Ok(scheduling::compute_slots(
            date,
            service.duration,
            &existing,
            self.now(),
        ))
    }
}

#[async_trait]
impl BookingSubmitter for InMemoryBackend {
    async fn submit(&self, request: &BookingRequest) -> Result<Booking, ApiError> {
        let date = request
            .validate()
            .map_err(|e| ApiError::Rejected(e.to_string()))?;

        let mut store = self.store.lock().unwrap();
        let service = store
            .services
            .iter()
            .find(|s| s.id == request.service_id && s.is_active);
        let vehicle = store
            .vehicles
            .iter()
            .find(|v| v.id == request.vehicle_id && v.customer_id == self.customer_id);

        let (service, vehicle) = match (service, vehicle) {
            (Some(s), Some(v)) => (s.clone(), v.clone()),
            _ => return Err(ApiError::Rejected("Service or vehicle not found".to_string())),
        };

        let existing = Self::bookings_on(&store, date);
        if let Err(e) = scheduling::check_slot(
            date,
            &request.appointment_time,
            service.duration,
            &existing,
            self.now(),
        ) {
            return Err(ApiError::Rejected(match e {
                SchedulingError::Conflict => "Time slot is no longer available".to_string(),
                other => other.to_string(),
            }));
        }

        let booking = Booking::pending(&self.customer_id, request, date, &service, &vehicle);
        store.bookings.push(booking.clone());
        tracing::info!(booking_id = %booking.id, "booking created in memory");
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;

    fn backend() -> InMemoryBackend {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        InMemoryBackend::demo().at(now)
    }

    fn request(service_id: &str, vehicle_id: &str, time: &str) -> BookingRequest {
        BookingRequest {
            vehicle_id: vehicle_id.to_string(),
            service_id: service_id.to_string(),
            appointment_date: "2024-01-15".to_string(),
            appointment_time: time.to_string(),
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_demo_catalog() {
        let backend = backend();
        assert_eq!(backend.list_services().await.unwrap().len(), 4);
        assert_eq!(backend.list_vehicles().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_submit_copies_cost_and_duration() {
        let backend = backend();
        let booking = backend
            .submit(&request("service-2", "vehicle-1", "10:00"))
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.estimated_duration, 120);
        assert_eq!(booking.total_cost, 149.99);
        assert_eq!(backend.bookings().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_service_or_vehicle() {
        let backend = backend();
        let err = backend
            .submit(&request("service-9", "vehicle-1", "10:00"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Service or vehicle not found");

        let err = backend
            .submit(&request("service-1", "vehicle-9", "10:00"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Service or vehicle not found");
        assert!(backend.bookings().is_empty());
    }

    #[tokio::test]
    async fn test_inactive_service_not_bookable() {
        let mut services = seed::demo_services();
        services[0].is_active = false;
        let backend = InMemoryBackend::new(seed::DEMO_USER_ID, services, seed::demo_vehicles());
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let err = backend.available_slots(date, "service-1").await.unwrap_err();
        assert_eq!(err.to_string(), "Service not found");

        let err = backend
            .submit(&request("service-1", "vehicle-1", "10:00"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Service or vehicle not found");
        assert!(backend.bookings().is_empty());
    }

    #[tokio::test]
    async fn test_slots_reflect_bookings() {
        let backend = backend();
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let slots = backend.available_slots(date, "service-1").await.unwrap();
        assert!(slots.iter().all(|s| s.is_available));

        let booking = backend
            .submit(&request("service-2", "vehicle-1", "10:00"))
            .await
            .unwrap();

        let slots = backend.available_slots(date, "service-1").await.unwrap();
        let ten = slots.iter().find(|s| s.time == "10:00").unwrap();
        assert!(!ten.is_available);
        assert_eq!(ten.booking_id.as_deref(), Some(booking.id.as_str()));

        let err = backend
            .submit(&request("service-1", "vehicle-2", "11:00"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Time slot is no longer available");
    }
}
