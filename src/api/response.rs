use serde::Serialize;
use uuid::Uuid;

use crate::domain::CardResult;

/// Response from a calculation.
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    /// Unique id for this calculation (correlates logs)
    pub calculation_id: String,

    /// Catalog version the ranking was computed against
    pub catalog_version: String,

    /// Ranked results, best card first
    pub results: Vec<CardResult>,
}

impl CalculateResponse {
    pub fn new(catalog_version: String, results: Vec<CardResult>) -> Self {
        CalculateResponse {
            calculation_id: Uuid::new_v4().to_string(),
            catalog_version,
            results,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub catalog_version: String,
    pub uptime_secs: u64,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub catalog_version: String,
    pub cards: usize,
    pub rules: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub retryable: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>, retryable: bool) -> Self {
        ErrorResponse {
            error: error.into(),
            code: code.into(),
            retryable,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        ErrorResponse::new(message, "INVALID_INPUT", false)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        ErrorResponse::new(message, "UPSTREAM_UNAVAILABLE", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_response_serialization() {
        let resp = CalculateResponse::new("2026-08-01.1".to_string(), vec![]);
        let json = serde_json::to_string(&resp).unwrap();

        assert!(json.contains("2026-08-01.1"));
        assert!(json.contains("\"results\":[]"));
    }

    #[test]
    fn test_error_response_flags() {
        let invalid = ErrorResponse::invalid_input("negative amount");
        assert_eq!(invalid.code, "INVALID_INPUT");
        assert!(!invalid.retryable);

        let upstream = ErrorResponse::upstream("catalog fetch failed");
        assert!(upstream.retryable);
    }
}
