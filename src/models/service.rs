use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Minutes.
    pub duration: u32,
    pub price: f64,
    pub category: ServiceCategory,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Maintenance,
    Repair,
    Inspection,
    Emergency,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Maintenance => "maintenance",
            ServiceCategory::Repair => "repair",
            ServiceCategory::Inspection => "inspection",
            ServiceCategory::Emergency => "emergency",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "maintenance" => Some(ServiceCategory::Maintenance),
            "repair" => Some(ServiceCategory::Repair),
            "inspection" => Some(ServiceCategory::Inspection),
            "emergency" => Some(ServiceCategory::Emergency),
            _ => None,
        }
    }
}
