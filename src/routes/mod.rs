// Route exports
pub mod history;
pub mod matches;

use actix_web::{http::StatusCode, web, HttpResponse};
use serde::de::DeserializeOwned;
use std::fmt::Display;

use crate::models::ErrorResponse;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(history::configure),
    );
}

/// JSON error body with the given status
pub(crate) fn error_response(status: StatusCode, error: &str, message: impl Display) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
        status_code: status.as_u16(),
    })
}

/// Body that may be omitted: an empty body gives the default, anything else
/// must be valid JSON for `T`
pub(crate) fn optional_json<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, HttpResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::info!("Rejected request body: {}", e);
        error_response(StatusCode::BAD_REQUEST, "invalid_json", format!("Invalid JSON: {}", e))
    })
}
