use serde::{Deserialize, Serialize};

/// The `{ success, data, message, error }` envelope used by the booking API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }

    /// Best user-facing explanation for an unsuccessful response.
    pub fn reason(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        id: String,
    }

    #[test]
    fn test_failure_without_data_decodes() {
        // Payload has no Default; a missing `data` must still decode as None.
        let resp: ApiResponse<Payload> =
            serde_json::from_str(r#"{"success":false,"error":"Booking not found"}"#).unwrap();
        assert!(resp.data.is_none());
        assert_eq!(resp.reason(), Some("Booking not found"));
    }

    #[test]
    fn test_failure_serializes_without_data() {
        let value = serde_json::to_value(ApiResponse::<()>::failure("nope")).unwrap();
        assert_eq!(value, serde_json::json!({ "success": false, "error": "nope" }));
    }
}
