use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::ApiError;
use crate::models::{Booking, BookingRequest, Service, TimeSlot, Vehicle};

/// Source of the service catalog and the signed-in customer's vehicles.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError>;
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, ApiError>;
}

/// Appointment availability for a date and service.
#[async_trait]
pub trait SlotProvider: Send + Sync {
    async fn available_slots(
        &self,
        date: NaiveDate,
        service_id: &str,
    ) -> Result<Vec<TimeSlot>, ApiError>;
}

/// Creates the booking. Called once per confirmed submission, never retried.
#[async_trait]
pub trait BookingSubmitter: Send + Sync {
    async fn submit(&self, request: &BookingRequest) -> Result<Booking, ApiError>;
}

/// The set of collaborators a booking wizard runs against.
#[derive(Clone)]
pub struct Backend {
    pub catalog: Arc<dyn CatalogProvider>,
    pub slots: Arc<dyn SlotProvider>,
    pub submitter: Arc<dyn BookingSubmitter>,
}

impl Backend {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        slots: Arc<dyn SlotProvider>,
        submitter: Arc<dyn BookingSubmitter>,
    ) -> Self {
        Self {
            catalog,
            slots,
            submitter,
        }
    }

    /// Uses one implementation for every capability, e.g. an HTTP client or
    /// the in-memory backend.
    pub fn from_shared<T>(inner: Arc<T>) -> Self
    where
        T: CatalogProvider + SlotProvider + BookingSubmitter + 'static,
    {
        Self {
            catalog: inner.clone(),
            slots: inner.clone(),
            submitter: inner,
        }
    }
}
