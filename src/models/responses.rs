use serde::{Deserialize, Serialize};

use crate::models::domain::Scored;

/// Response for the candidate and recommendation endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesResponse<T> {
    pub matches: Vec<Scored<T>>,
    pub total_results: usize,
    pub fallback: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Response for recorded applications and searches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse {
    pub success: bool,
    pub record_id: String,
}
