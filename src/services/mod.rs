pub mod api_client;
pub mod auth;
pub mod calendar;
pub mod dashboard;
pub mod memory;
pub mod providers;
pub mod scheduling;
pub mod session;
pub mod wizard;
