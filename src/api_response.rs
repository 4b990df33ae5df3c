use chrono::{DateTime, Utc};
use serde::Serialize;

/// JSON envelope returned by every `/api/blogs` endpoint.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: &str, data: Option<T>) -> Self {
        ApiResponse {
            message: message.to_string(),
            timestamp: Utc::now(),
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: &str, error: String) -> Self {
        ApiResponse {
            message: message.to_string(),
            timestamp: Utc::now(),
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub message: &'static str,
    pub timestamp: String,
    pub status: &'static str,
    pub features: Vec<&'static str>,
}

impl HealthStatus {
    pub fn ok() -> Self {
        HealthStatus {
            message: "Blog backend is healthy",
            timestamp: Utc::now().to_rfc3339(),
            status: "ok",
            features: vec!["blogs", "file-storage"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success("Blog created successfully", Some(vec![1, 2]))).unwrap();
        assert_eq!(json["message"], "Blog created successfully");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("error").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_failure_envelope() {
        let json = serde_json::to_value(ApiResponse::failure("Blog not found", "post not found: x".to_string())).unwrap();
        assert_eq!(json["error"], "post not found: x");
        assert!(json.get("data").is_none());
    }
}
