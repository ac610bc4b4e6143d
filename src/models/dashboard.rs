use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_bookings: u32,
    pub upcoming_appointments: u32,
    pub completed_services: u32,
    pub total_spent: f64,
    /// Counted by the production API's project tracker. The dev server keeps
    /// no projects and always reports 0.
    #[serde(default)]
    pub active_projects: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_production_stats() {
        let stats: DashboardStats = serde_json::from_str(
            r#"{"totalBookings":3,"upcomingAppointments":1,"completedServices":2,"totalSpent":239.98,"activeProjects":1}"#,
        )
        .unwrap();
        assert_eq!(stats.active_projects, 1);
        assert_eq!(stats.total_bookings, 3);

        let value = serde_json::to_value(DashboardStats::default()).unwrap();
        assert_eq!(value["activeProjects"], 0);
    }
}
