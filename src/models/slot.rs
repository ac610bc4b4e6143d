use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// 24-hour `HH:MM`.
    pub time: String,
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
}

impl TimeSlot {
    pub fn open(time: &str) -> Self {
        Self {
            time: time.to_string(),
            is_available: true,
            booking_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlots {
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
}
