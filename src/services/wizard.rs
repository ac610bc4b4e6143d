use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{Local, NaiveDate};

use crate::errors::ValidationErrors;
use crate::models::{Booking, BookingRequest, Service, TimeSlot, Vehicle};
use crate::services::calendar;
use crate::services::providers::Backend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    SelectService,
    SelectVehicle,
    SelectDateTime,
    ReviewAndConfirm,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::SelectService,
        WizardStep::SelectVehicle,
        WizardStep::SelectDateTime,
        WizardStep::ReviewAndConfirm,
    ];

    /// 1-based position shown in the progress bar.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::SelectService => 1,
            WizardStep::SelectVehicle => 2,
            WizardStep::SelectDateTime => 3,
            WizardStep::ReviewAndConfirm => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::SelectService => "Select Service",
            WizardStep::SelectVehicle => "Choose Vehicle",
            WizardStep::SelectDateTime => "Pick Date & Time",
            WizardStep::ReviewAndConfirm => "Review & Confirm",
        }
    }

    fn following(self) -> Option<Self> {
        match self {
            WizardStep::SelectService => Some(WizardStep::SelectVehicle),
            WizardStep::SelectVehicle => Some(WizardStep::SelectDateTime),
            WizardStep::SelectDateTime => Some(WizardStep::ReviewAndConfirm),
            WizardStep::ReviewAndConfirm => None,
        }
    }

    fn preceding(self) -> Option<Self> {
        match self {
            WizardStep::SelectService => None,
            WizardStep::SelectVehicle => Some(WizardStep::SelectService),
            WizardStep::SelectDateTime => Some(WizardStep::SelectVehicle),
            WizardStep::ReviewAndConfirm => Some(WizardStep::SelectDateTime),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardPhase {
    Active(WizardStep),
    Submitted(Booking),
    Abandoned,
}

/// The customer's in-progress selections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingDraft {
    pub service: Option<Service>,
    pub vehicle: Option<Vehicle>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub notes: String,
}

impl BookingDraft {
    pub fn is_submittable(&self) -> bool {
        self.service.is_some() && self.vehicle.is_some() && self.date.is_some() && self.time.is_some()
    }

    /// Whether `step`'s required selection has been made.
    pub fn is_step_complete(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::SelectService => self.service.is_some(),
            WizardStep::SelectVehicle => self.vehicle.is_some(),
            WizardStep::SelectDateTime => self.date.is_some() && self.time.is_some(),
            WizardStep::ReviewAndConfirm => true,
        }
    }

    /// Missing selections become empty strings and are caught by validation.
    pub fn to_request(&self) -> BookingRequest {
        BookingRequest {
            vehicle_id: self.vehicle.as_ref().map(|v| v.id.clone()).unwrap_or_default(),
            service_id: self.service.as_ref().map(|s| s.id.clone()).unwrap_or_default(),
            appointment_date: self
                .date
                .map(|d| d.format(BookingRequest::DATE_FORMAT).to_string())
                .unwrap_or_default(),
            appointment_time: self.time.clone().unwrap_or_default(),
            notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    #[error("{} is not complete", .0.title())]
    StepIncomplete(WizardStep),

    #[error("unknown service {0}")]
    UnknownService(String),

    #[error("unknown vehicle {0}")]
    UnknownVehicle(String),

    #[error("dates before today cannot be booked")]
    DateInPast,

    #[error("the {0} slot is not available")]
    SlotUnavailable(String),

    #[error("bookings are submitted from the review step")]
    NotOnReviewStep,

    #[error("a submission is already in progress")]
    SubmissionInFlight,

    #[error("{0}")]
    Invalid(ValidationErrors),

    #[error("{0}")]
    Submission(String),

    #[error("the booking wizard is closed")]
    Closed,
}

/// The wizard's state machine. Deterministic: all I/O lives in
/// [`BookingWizard`], and "today" is supplied by the caller.
#[derive(Debug, Clone)]
pub struct WizardState {
    phase: WizardPhase,
    today: NaiveDate,
    draft: BookingDraft,
    services: Vec<Service>,
    vehicles: Vec<Vehicle>,
    slots: Vec<TimeSlot>,
    loading: bool,
    field_errors: ValidationErrors,
    submission_error: Option<String>,
}

impl WizardState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            phase: WizardPhase::Active(WizardStep::SelectService),
            today,
            draft: BookingDraft::default(),
            services: vec![],
            vehicles: vec![],
            slots: vec![],
            loading: false,
            field_errors: ValidationErrors::default(),
            submission_error: None,
        }
    }

    pub fn phase(&self) -> &WizardPhase {
        &self.phase
    }

    pub fn step(&self) -> Option<WizardStep> {
        match self.phase {
            WizardPhase::Active(step) => Some(step),
            _ => None,
        }
    }

    fn active_step(&self) -> Result<WizardStep, WizardError> {
        self.step().ok_or(WizardError::Closed)
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn field_errors(&self) -> &ValidationErrors {
        &self.field_errors
    }

    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn begin_loading(&mut self) -> Result<(), WizardError> {
        self.active_step()?;
        self.loading = true;
        Ok(())
    }

    /// Installs the catalog and clears the loading flag. Inactive services
    /// are not offered.
    pub fn set_catalog(&mut self, services: Vec<Service>, vehicles: Vec<Vehicle>) {
        self.services = services.into_iter().filter(|s| s.is_active).collect();
        self.vehicles = vehicles;
        self.loading = false;
    }

    pub fn can_proceed(&self) -> bool {
        match self.phase {
            WizardPhase::Active(step) => {
                step.following().is_some() && self.draft.is_step_complete(step)
            }
            _ => false,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.step() == Some(WizardStep::ReviewAndConfirm) && self.draft.is_submittable()
    }

    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        let step = self.active_step()?;
        if !self.draft.is_step_complete(step) {
            return Err(WizardError::StepIncomplete(step));
        }
        let step = step.following().unwrap_or(step);
        self.phase = WizardPhase::Active(step);
        Ok(step)
    }

    pub fn previous(&mut self) -> Result<WizardStep, WizardError> {
        let step = self.active_step()?;
        let step = step.preceding().unwrap_or(step);
        self.phase = WizardPhase::Active(step);
        Ok(step)
    }

    /// Switching service invalidates loaded slots, since availability
    /// depends on the service duration.
    pub fn select_service(&mut self, service_id: &str) -> Result<(), WizardError> {
        self.active_step()?;
        let service = self
            .services
            .iter()
            .find(|s| s.id == service_id)
            .cloned()
            .ok_or_else(|| WizardError::UnknownService(service_id.to_string()))?;

        let changed = self.draft.service.as_ref().map(|s| s.id.as_str()) != Some(service_id);
        self.draft.service = Some(service);
        if changed {
            self.draft.time = None;
            self.slots.clear();
        }
        Ok(())
    }

    pub fn select_vehicle(&mut self, vehicle_id: &str) -> Result<(), WizardError> {
        self.active_step()?;
        let vehicle = self
            .vehicles
            .iter()
            .find(|v| v.id == vehicle_id)
            .cloned()
            .ok_or_else(|| WizardError::UnknownVehicle(vehicle_id.to_string()))?;
        self.draft.vehicle = Some(vehicle);
        Ok(())
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), WizardError> {
        self.active_step()?;
        if calendar::is_date_disabled(date, self.today) {
            return Err(WizardError::DateInPast);
        }
        if self.draft.date != Some(date) {
            self.draft.date = Some(date);
            self.draft.time = None;
            self.slots.clear();
        }
        Ok(())
    }

    /// The date and service a slot lookup should be made for, once both are
    /// chosen.
    pub fn slot_query(&self) -> Option<(NaiveDate, String)> {
        let date = self.draft.date?;
        let service = self.draft.service.as_ref()?;
        Some((date, service.id.clone()))
    }

    /// Installs slots loaded for `date`/`service_id`. Results for a selection
    /// the customer has since changed are dropped.
    pub fn set_slots(&mut self, date: NaiveDate, service_id: &str, slots: Vec<TimeSlot>) {
        if self.slot_query().as_ref().map(|(d, s)| (*d, s.as_str())) != Some((date, service_id)) {
            return;
        }
        self.slots = slots;

        if let Some(time) = &self.draft.time {
            let still_open = self
                .slots
                .iter()
                .any(|s| &s.time == time && s.is_available);
            if !still_open {
                self.draft.time = None;
            }
        }
    }

    pub fn select_time(&mut self, time: &str) -> Result<(), WizardError> {
        self.active_step()?;
        let open = self
            .slots
            .iter()
            .any(|s| s.time == time && !calendar::is_slot_disabled(s));
        if !open {
            return Err(WizardError::SlotUnavailable(time.to_string()));
        }
        self.draft.time = Some(time.to_string());
        Ok(())
    }

    pub fn set_notes(&mut self, notes: &str) -> Result<(), WizardError> {
        self.active_step()?;
        self.draft.notes = notes.to_string();
        Ok(())
    }

    /// Validates the draft and hands back the request to send. Field errors
    /// are kept for display when validation fails.
    pub fn begin_submit(&mut self) -> Result<BookingRequest, WizardError> {
        if self.active_step()? != WizardStep::ReviewAndConfirm {
            return Err(WizardError::NotOnReviewStep);
        }
        self.submission_error = None;

        let request = self.draft.to_request();
        match request.validate() {
            Ok(_) => {
                self.field_errors = ValidationErrors::default();
                Ok(request)
            }
            Err(errors) => {
                self.field_errors = errors.clone();
                Err(WizardError::Invalid(errors))
            }
        }
    }

    /// A successful submission closes the wizard and discards the draft; a
    /// failed one keeps everything for another attempt.
    pub fn finish_submit(&mut self, outcome: Result<Booking, String>) {
        match outcome {
            Ok(booking) => {
                self.phase = WizardPhase::Submitted(booking);
                self.draft = BookingDraft::default();
                self.slots.clear();
            }
            Err(message) => self.submission_error = Some(message),
        }
    }

    pub fn abandon(&mut self) -> Result<(), WizardError> {
        self.active_step()?;
        self.phase = WizardPhase::Abandoned;
        self.draft = BookingDraft::default();
        self.slots.clear();
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn force_step(&mut self, step: WizardStep) {
        self.phase = WizardPhase::Active(step);
    }
}

/// Outcome delivered to the page that hosts the wizard.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Booked(Booking),
    Failed(String),
}

pub type CompletionHandler = Box<dyn Fn(Completion) + Send + Sync>;

/// Everything needed to render the wizard.
#[derive(Debug, Clone)]
pub struct WizardView {
    pub phase: WizardPhase,
    pub step: Option<WizardStep>,
    pub draft: BookingDraft,
    pub services: Vec<Service>,
    pub vehicles: Vec<Vehicle>,
    pub slots: Vec<TimeSlot>,
    pub loading: bool,
    pub submitting: bool,
    pub can_proceed: bool,
    pub can_submit: bool,
    pub field_errors: ValidationErrors,
    pub submission_error: Option<String>,
}

/// Clears the single-flight flag when the submit future finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives a [`WizardState`] against a [`Backend`].
pub struct BookingWizard {
    backend: Backend,
    state: Mutex<WizardState>,
    submitting: AtomicBool,
    on_complete: Option<CompletionHandler>,
}

impl BookingWizard {
    pub fn new(backend: Backend) -> Self {
        Self::with_today(backend, Local::now().date_naive())
    }

    pub fn with_today(backend: Backend, today: NaiveDate) -> Self {
        Self {
            backend,
            state: Mutex::new(WizardState::new(today)),
            submitting: AtomicBool::new(false),
            on_complete: None,
        }
    }

    pub fn on_complete(mut self, handler: impl Fn(Completion) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(handler));
        self
    }

    /// Loads services and vehicles concurrently. A failed list is logged and
    /// left empty; the other still loads.
    pub async fn mount(&self) -> Result<(), WizardError> {
        self.state.lock().unwrap().begin_loading()?;

        let catalog = &self.backend.catalog;
        let (services, vehicles) = tokio::join!(catalog.list_services(), catalog.list_vehicles());

        let services = services.unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to load services");
            vec![]
        });
        let vehicles = vehicles.unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to load vehicles");
            vec![]
        });

        self.state.lock().unwrap().set_catalog(services, vehicles);
        Ok(())
    }

    pub fn next(&self) -> Result<WizardStep, WizardError> {
        self.state.lock().unwrap().next()
    }

    pub fn previous(&self) -> Result<WizardStep, WizardError> {
        self.state.lock().unwrap().previous()
    }

    pub async fn select_service(&self, service_id: &str) -> Result<(), WizardError> {
        self.state.lock().unwrap().select_service(service_id)?;
        self.refresh_slots().await
    }

    pub fn select_vehicle(&self, vehicle_id: &str) -> Result<(), WizardError> {
        self.state.lock().unwrap().select_vehicle(vehicle_id)
    }

    pub async fn select_date(&self, date: NaiveDate) -> Result<(), WizardError> {
        self.state.lock().unwrap().select_date(date)?;
        self.refresh_slots().await
    }

    /// Reloads slots for the chosen date and service. A failed lookup is
    /// logged and leaves no slots to pick.
    pub async fn refresh_slots(&self) -> Result<(), WizardError> {
        let query = self.state.lock().unwrap().slot_query();
        let Some((date, service_id)) = query else {
            return Ok(());
        };

        let slots = match self.backend.slots.available_slots(date, &service_id).await {
            Ok(slots) => slots,
            Err(e) => {
                tracing::error!(error = %e, %date, service_id = %service_id, "failed to load time slots");
                vec![]
            }
        };

        self.state.lock().unwrap().set_slots(date, &service_id, slots);
        Ok(())
    }

    pub fn select_time(&self, time: &str) -> Result<(), WizardError> {
        self.state.lock().unwrap().select_time(time)
    }

    pub fn set_notes(&self, notes: &str) -> Result<(), WizardError> {
        self.state.lock().unwrap().set_notes(notes)
    }

    /// Sends the booking. Calls made while a submission is outstanding are
    /// refused with [`WizardError::SubmissionInFlight`].
    pub async fn submit(&self) -> Result<Booking, WizardError> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(WizardError::SubmissionInFlight);
        }

        // Released on drop too, so a cancelled submit does not lock the wizard.
        let _in_flight = InFlight(&self.submitting);
        self.submit_once().await
    }

    async fn submit_once(&self) -> Result<Booking, WizardError> {
        let request = self.state.lock().unwrap().begin_submit()?;

        match self.backend.submitter.submit(&request).await {
            Ok(booking) => {
                tracing::info!(booking_id = %booking.id, "booking submitted");
                self.state
                    .lock()
                    .unwrap()
                    .finish_submit(Ok(booking.clone()));
                self.notify(Completion::Booked(booking.clone()));
                Ok(booking)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(error = %message, "booking submission failed");
                self.state
                    .lock()
                    .unwrap()
                    .finish_submit(Err(message.clone()));
                self.notify(Completion::Failed(message.clone()));
                Err(WizardError::Submission(message))
            }
        }
    }

    fn notify(&self, completion: Completion) {
        if let Some(handler) = &self.on_complete {
            handler(completion);
        }
    }

    pub fn abandon(&self) -> Result<(), WizardError> {
        self.state.lock().unwrap().abandon()
    }

    pub fn phase(&self) -> WizardPhase {
        self.state.lock().unwrap().phase().clone()
    }

    pub fn view(&self) -> WizardView {
        let state = self.state.lock().unwrap();
        let submitting = self.submitting.load(Ordering::SeqCst);
        WizardView {
            phase: state.phase().clone(),
            step: state.step(),
            draft: state.draft().clone(),
            services: state.services().to_vec(),
            vehicles: state.vehicles().to_vec(),
            slots: state.slots().to_vec(),
            loading: state.is_loading(),
            submitting,
            can_proceed: state.can_proceed(),
            can_submit: state.can_submit() && !submitting,
            field_errors: state.field_errors().clone(),
            submission_error: state.submission_error().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn booking_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn loaded() -> WizardState {
        let mut state = WizardState::new(today());
        state.set_catalog(seed::demo_services(), seed::demo_vehicles());
        state
    }

    fn slots() -> Vec<TimeSlot> {
        let mut taken = TimeSlot::open("11:00");
        taken.is_available = false;
        vec![TimeSlot::open("10:00"), taken, TimeSlot::open("12:00")]
    }

    fn at_review() -> WizardState {
        let mut state = loaded();
        state.select_service("service-1").unwrap();
        state.next().unwrap();
        state.select_vehicle("vehicle-1").unwrap();
        state.next().unwrap();
        state.select_date(booking_day()).unwrap();
        state.set_slots(booking_day(), "service-1", slots());
        state.select_time("10:00").unwrap();
        state.next().unwrap();
        state
    }

    #[test]
    fn test_steps_are_numbered_in_order() {
        let numbers: Vec<u8> = WizardStep::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(WizardStep::SelectDateTime.title(), "Pick Date & Time");
    }

    #[test]
    fn test_next_gated_by_each_step() {
        let mut state = loaded();
        assert_eq!(
            state.next(),
            Err(WizardError::StepIncomplete(WizardStep::SelectService))
        );
        assert_eq!(state.step(), Some(WizardStep::SelectService));

        state.select_service("service-1").unwrap();
        assert_eq!(state.next(), Ok(WizardStep::SelectVehicle));

        assert!(state.next().is_err());
        state.select_vehicle("vehicle-2").unwrap();
        assert_eq!(state.next(), Ok(WizardStep::SelectDateTime));

        state.select_date(booking_day()).unwrap();
        assert_eq!(
            state.next(),
            Err(WizardError::StepIncomplete(WizardStep::SelectDateTime))
        );
        state.set_slots(booking_day(), "service-1", slots());
        state.select_time("12:00").unwrap();
        assert_eq!(state.next(), Ok(WizardStep::ReviewAndConfirm));

        // No step past review.
        assert_eq!(state.next(), Ok(WizardStep::ReviewAndConfirm));
        assert!(!state.can_proceed());
    }

    #[test]
    fn test_previous_is_never_gated() {
        let mut state = loaded();
        assert_eq!(state.previous(), Ok(WizardStep::SelectService));

        let mut state = at_review();
        state.select_vehicle("vehicle-2").unwrap();
        assert_eq!(state.previous(), Ok(WizardStep::SelectDateTime));
        assert_eq!(state.previous(), Ok(WizardStep::SelectVehicle));
        assert_eq!(state.previous(), Ok(WizardStep::SelectService));
        assert_eq!(state.draft().vehicle.as_ref().unwrap().id, "vehicle-2");
    }

    #[test]
    fn test_can_submit_requires_complete_draft() {
        let mut state = loaded();
        assert!(!state.can_submit());

        state.force_step(WizardStep::ReviewAndConfirm);
        assert!(!state.can_submit());

        let state = at_review();
        assert!(state.can_submit());
        assert!(state.draft().is_submittable());
    }

    #[test]
    fn test_past_dates_rejected_today_allowed() {
        let mut state = loaded();
        let yesterday = today().pred_opt().unwrap();
        assert_eq!(state.select_date(yesterday), Err(WizardError::DateInPast));
        assert!(state.draft().date.is_none());

        state.select_date(today()).unwrap();
        assert_eq!(state.draft().date, Some(today()));
    }

    #[test]
    fn test_unavailable_slot_never_selected() {
        let mut state = loaded();
        state.select_service("service-1").unwrap();
        state.select_date(booking_day()).unwrap();
        state.set_slots(booking_day(), "service-1", slots());

        assert_eq!(
            state.select_time("11:00"),
            Err(WizardError::SlotUnavailable("11:00".to_string()))
        );
        assert_eq!(
            state.select_time("16:00"),
            Err(WizardError::SlotUnavailable("16:00".to_string()))
        );
        assert!(state.draft().time.is_none());
    }

    #[test]
    fn test_new_date_clears_time() {
        let mut state = at_review();
        state.select_date(booking_day().succ_opt().unwrap()).unwrap();
        assert!(state.draft().time.is_none());
        assert!(state.slots().is_empty());
    }

    #[test]
    fn test_stale_slots_are_dropped() {
        let mut state = loaded();
        state.select_service("service-1").unwrap();
        state.select_date(booking_day()).unwrap();
        state.set_slots(booking_day().succ_opt().unwrap(), "service-1", slots());
        assert!(state.slots().is_empty());
        state.set_slots(booking_day(), "service-2", slots());
        assert!(state.slots().is_empty());
    }

    #[test]
    fn test_refreshed_slots_drop_taken_time() {
        let mut state = at_review();
        let mut taken = TimeSlot::open("10:00");
        taken.is_available = false;
        state.set_slots(booking_day(), "service-1", vec![taken]);
        assert!(state.draft().time.is_none());
        assert!(!state.can_submit());
    }

    #[test]
    fn test_inactive_services_hidden() {
        let mut services = seed::demo_services();
        services[0].is_active = false;
        let mut state = WizardState::new(today());
        state.set_catalog(services, vec![]);
        assert_eq!(state.services().len(), 3);
        assert_eq!(
            state.select_service("service-1"),
            Err(WizardError::UnknownService("service-1".to_string()))
        );
    }

    #[test]
    fn test_submit_without_vehicle_is_blocked() {
        let mut state = loaded();
        state.select_service("service-1").unwrap();
        state.select_date(booking_day()).unwrap();
        state.set_slots(booking_day(), "service-1", slots());
        state.select_time("10:00").unwrap();
        state.force_step(WizardStep::ReviewAndConfirm);

        let err = state.begin_submit().unwrap_err();
        match err {
            WizardError::Invalid(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors.get("vehicleId"), Some("Please select a vehicle"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert_eq!(state.step(), Some(WizardStep::ReviewAndConfirm));
        assert_eq!(
            state.field_errors().get("vehicleId"),
            Some("Please select a vehicle")
        );
    }

    #[test]
    fn test_submit_only_from_review() {
        let mut state = loaded();
        state.select_service("service-1").unwrap();
        assert_eq!(state.begin_submit(), Err(WizardError::NotOnReviewStep));
    }

    #[test]
    fn test_request_derived_from_draft() {
        let mut state = at_review();
        state.set_notes("Check tire pressure").unwrap();
        let request = state.begin_submit().unwrap();
        assert_eq!(request.vehicle_id, "vehicle-1");
        assert_eq!(request.service_id, "service-1");
        assert_eq!(request.appointment_date, "2024-01-15");
        assert_eq!(request.appointment_time, "10:00");
        assert_eq!(request.notes, "Check tire pressure");
    }

    #[test]
    fn test_failed_submission_keeps_draft() {
        let mut state = at_review();
        let before = state.draft().clone();
        state.begin_submit().unwrap();
        state.finish_submit(Err("Service or vehicle not found".to_string()));

        assert_eq!(state.step(), Some(WizardStep::ReviewAndConfirm));
        assert_eq!(state.submission_error(), Some("Service or vehicle not found"));
        assert_eq!(state.draft(), &before);

        // Retrying clears the previous message.
        state.begin_submit().unwrap();
        assert!(state.submission_error().is_none());
    }

    #[test]
    fn test_terminal_phases_are_closed() {
        let mut state = at_review();
        state.abandon().unwrap();
        assert_eq!(state.phase(), &WizardPhase::Abandoned);
        assert!(state.draft().service.is_none());
        assert_eq!(state.next(), Err(WizardError::Closed));
        assert_eq!(state.select_vehicle("vehicle-1"), Err(WizardError::Closed));
        assert_eq!(state.abandon(), Err(WizardError::Closed));
    }
}
