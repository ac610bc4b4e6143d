pub mod api;
pub mod booking;
pub mod dashboard;
pub mod service;
pub mod slot;
pub mod user;
pub mod vehicle;

pub use api::ApiResponse;
pub use booking::{Booking, BookingRequest, BookingStatus, BookingUpdate};
pub use dashboard::DashboardStats;
pub use service::{Service, ServiceCategory};
pub use slot::{AvailableSlots, TimeSlot};
pub use user::{AuthResponse, LoginForm, RegisterRequest, SignupForm, User, UserRole};
pub use vehicle::{Vehicle, VehicleForm, VehicleUpdate};
