use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::models::{
    ApiResponse, AuthResponse, AvailableSlots, Booking, BookingRequest, BookingUpdate, DashboardStats,
    LoginForm, Service, SignupForm, TimeSlot, User, Vehicle, VehicleForm, VehicleUpdate,
};
use crate::services::providers::{BookingSubmitter, CatalogProvider, SlotProvider};
use crate::services::session::SessionContext;

/// JSON client for the booking API. Attaches the session's bearer credential
/// to every request and ends the session when the API answers 401.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: Arc<SessionContext>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionContext>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            session,
        }
    }

    /// Points at `API_BASE_URL` with the session persisted at
    /// `SESSION_DB_PATH`.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let session = SessionContext::init(&config.session_db_path)?;
        Ok(Self::new(config.api_base_url.clone(), Arc::new(session)))
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_envelope<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiError> {
        let resp = self.authorized(request).send().await?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("credential rejected, clearing session");
            self.session.teardown();
            return Err(ApiError::Unauthorized);
        }

        let body = resp.text().await?;
        let envelope: ApiResponse<T> = serde_json::from_str(&body)
            .map_err(|e| ApiError::Decode(format!("{status}: {e}")))?;

        if !envelope.success {
            let reason = envelope.reason().unwrap_or("Request failed").to_string();
            return Err(ApiError::Rejected(reason));
        }
        Ok(envelope)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.send_envelope(request)
            .await?
            .data
            .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))
    }

    async fn send_unit(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send_envelope::<serde_json::Value>(request).await?;
        Ok(())
    }

    /// Login and register answer with a bare [`AuthResponse`], not the
    /// envelope, and are sent without a credential.
    async fn authenticate<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        email: &str,
    ) -> Result<User, ApiError> {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        let auth: AuthResponse = serde_json::from_str(&body).unwrap_or_default();

        if !status.is_success() {
            let reason = auth
                .error
                .or(auth.message)
                .unwrap_or_else(|| "Authentication failed".to_string());
            return Err(ApiError::Rejected(reason));
        }

        let token = auth
            .access_token
            .clone()
            .ok_or_else(|| ApiError::Decode("missing access token".to_string()))?;
        let user = auth.into_user(email);
        self.session.begin(&token, &user);
        Ok(user)
    }

    // ── Auth ──

    pub async fn login(&self, form: &LoginForm) -> Result<User, ApiError> {
        self.authenticate("/auth/login", form, &form.email).await
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<User, ApiError> {
        if form.password != form.confirm_password {
            return Err(ApiError::Rejected("Passwords do not match".to_string()));
        }
        self.authenticate("/auth/register", &form.to_register_request(), &form.email)
            .await
    }

    /// Ends the session locally even when the API call fails.
    pub async fn logout(&self) {
        if self.session.is_authenticated() {
            let request = self.http.post(self.url("/auth/logout"));
            if let Err(e) = self.send_unit(request).await {
                tracing::warn!(error = %e, "logout request failed");
            }
        }
        self.session.teardown();
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        let user: User = self.send(self.http.get(self.url("/auth/me"))).await?;
        self.session.refresh_user(&user);
        Ok(user)
    }

    /// Checks a persisted credential against the API at start-up.
    pub async fn restore_session(&self) -> Result<Option<User>, ApiError> {
        if !self.session.is_authenticated() {
            return Ok(None);
        }
        match self.current_user().await {
            Ok(user) => Ok(Some(user)),
            Err(ApiError::Unauthorized) => Ok(None),
            Err(ApiError::Transport(e)) => {
                tracing::warn!(error = %e, "API unreachable, keeping cached session");
                Ok(self.session.user())
            }
            Err(e) => Err(e),
        }
    }

    // ── Vehicles ──

    pub async fn get_vehicles(&self) -> Result<Vec<Vehicle>, ApiError> {
        self.send(self.http.get(self.url("/vehicles"))).await
    }

    pub async fn get_vehicle(&self, id: &str) -> Result<Vehicle, ApiError> {
        self.send(self.http.get(self.url(&format!("/vehicles/{id}"))))
            .await
    }

    pub async fn create_vehicle(&self, form: &VehicleForm) -> Result<Vehicle, ApiError> {
        self.send(self.http.post(self.url("/vehicles")).json(form))
            .await
    }

    pub async fn update_vehicle(&self, id: &str, update: &VehicleUpdate) -> Result<Vehicle, ApiError> {
        self.send(self.http.put(self.url(&format!("/vehicles/{id}"))).json(update))
            .await
    }

    pub async fn delete_vehicle(&self, id: &str) -> Result<(), ApiError> {
        self.send_unit(self.http.delete(self.url(&format!("/vehicles/{id}"))))
            .await
    }

    // ── Services ──

    pub async fn get_services(&self) -> Result<Vec<Service>, ApiError> {
        self.send(self.http.get(self.url("/services"))).await
    }

    pub async fn get_service(&self, id: &str) -> Result<Service, ApiError> {
        self.send(self.http.get(self.url(&format!("/services/{id}"))))
            .await
    }

    // ── Bookings ──

    pub async fn get_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        self.send(self.http.get(self.url("/bookings"))).await
    }

    pub async fn get_booking(&self, id: &str) -> Result<Booking, ApiError> {
        self.send(self.http.get(self.url(&format!("/bookings/{id}"))))
            .await
    }

    pub async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, ApiError> {
        self.send(self.http.post(self.url("/bookings")).json(request))
            .await
    }

    pub async fn update_booking(&self, id: &str, update: &BookingUpdate) -> Result<Booking, ApiError> {
        self.send(self.http.put(self.url(&format!("/bookings/{id}"))).json(update))
            .await
    }

    pub async fn cancel_booking(&self, id: &str) -> Result<Booking, ApiError> {
        self.send(self.http.patch(self.url(&format!("/bookings/{id}/cancel"))))
            .await
    }

    pub async fn get_available_slots(
        &self,
        date: NaiveDate,
        service_id: &str,
    ) -> Result<AvailableSlots, ApiError> {
        let date = date.format(BookingRequest::DATE_FORMAT).to_string();
        let request = self
            .http
            .get(self.url("/bookings/available-slots"))
            .query(&[("date", date.as_str()), ("serviceId", service_id)]);
        self.send(request).await
    }

    // ── Dashboard ──

    pub async fn get_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.send(self.http.get(self.url("/dashboard/stats"))).await
    }
}

#[async_trait]
impl CatalogProvider for ApiClient {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        self.get_services().await
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, ApiError> {
        self.get_vehicles().await
    }
}

#[async_trait]
impl SlotProvider for ApiClient {
    async fn available_slots(
        &self,
        date: NaiveDate,
        service_id: &str,
    ) -> Result<Vec<TimeSlot>, ApiError> {
        Ok(self.get_available_slots(date, service_id).await?.slots)
    }
}

#[async_trait]
impl BookingSubmitter for ApiClient {
    async fn submit(&self, request: &BookingRequest) -> Result<Booking, ApiError> {
        self.create_booking(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        let session = Arc::new(SessionContext::in_memory().unwrap());
        ApiClient::new("http://localhost:5093/api/", session)
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig {
            port: 5093,
            database_url: ":memory:".to_string(),
            token_secret: "secret".to_string(),
            api_base_url: "https://api.example.com/api".to_string(),
            session_db_path: ":memory:".to_string(),
            seed_demo_data: false,
        };
        let client = ApiClient::from_config(&config).unwrap();
        assert_eq!(client.url("/bookings"), "https://api.example.com/api/bookings");
        assert!(!client.session().is_authenticated());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        assert_eq!(client().url("/services"), "http://localhost:5093/api/services");
    }

    #[tokio::test]
    async fn test_signup_rejects_mismatched_passwords() {
        let form = SignupForm {
            first_name: "Jane".to_string(),
            last_name: "Roe".to_string(),
            email: "jane@example.com".to_string(),
            phone: String::new(),
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
        };
        let err = client().signup(&form).await.unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[tokio::test]
    async fn test_restore_without_session_is_none() {
        assert!(client().restore_session().await.unwrap().is_none());
    }
}
