use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Body of `GET /count` on the detection backend.
///
/// The backend reports an integer, but the dashboard renders whatever number
/// it is given, so the count is kept as a JSON number rather than narrowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    #[serde(rename = "peopleCount")]
    pub people_count: Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    Started,
    Stopped,
}

/// Body of `POST /start_stream` and `POST /stop_stream`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStatusResponse {
    pub status: StreamStatus,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_response_uses_camel_case_field() {
        let response: CountResponse =
            serde_json::from_str(r#"{"peopleCount": 42}"#).unwrap();

        assert_eq!(response.people_count.to_string(), "42");
    }

    #[test]
    fn test_count_response_keeps_fractional_counts() {
        let response: CountResponse =
            serde_json::from_str(r#"{"peopleCount": 4.5}"#).unwrap();

        assert_eq!(response.people_count.to_string(), "4.5");
    }

    #[test]
    fn test_count_response_requires_people_count() {
        let result =
            serde_json::from_str::<CountResponse>(r#"{"people": 3}"#);

        assert!(result.is_err());
    }

    #[test]
    fn test_count_response_rejects_non_numeric_count() {
        let result =
            serde_json::from_str::<CountResponse>(r#"{"peopleCount": "3"}"#);

        assert!(result.is_err());
    }

    #[test]
    fn test_stream_status_response() {
        let started: StreamStatusResponse =
            serde_json::from_str(r#"{"status": "started"}"#).unwrap();
        let stopped: StreamStatusResponse =
            serde_json::from_str(r#"{"status": "stopped"}"#).unwrap();

        assert_eq!(started.status, StreamStatus::Started);
        assert_eq!(stopped.status, StreamStatus::Stopped);
    }

    #[test]
    fn test_health_response() {
        let health: HealthResponse =
            serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert!(health.is_ok());

        let degraded = HealthResponse {
            status: "degraded".to_string(),
        };
        assert!(!degraded.is_ok());
    }
}
