use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{RecordApplicationRequest, RecordResponse, RecordSearchRequest};
use crate::routes::{error_response, matches::AppState};
use crate::services::{CacheKey, CacheManager};
use crate::session::SessionContext;

/// Configure seeker activity routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/applications", web::post().to(record_application))
        .route("/applications/{job_id}", web::delete().to(withdraw_application))
        .route("/searches", web::post().to(record_search));
}

/// Drop the cached history so the next recommendation sees the change
async fn invalidate_history(cache: &CacheManager, seeker_id: &str) {
    if let Err(e) = cache.delete(&CacheKey::history(seeker_id)).await {
        tracing::warn!("Failed to invalidate history cache for {}: {}", seeker_id, e);
    }
}

/// Record an application by the signed-in seeker
///
/// POST /api/v1/applications
///
/// Request body:
/// ```json
/// { "jobId": "string" }
/// ```
async fn record_application(
    state: web::Data<AppState>,
    session: SessionContext,
    req: web::Json<RecordApplicationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    match state.postgres.record_application(&session.user_id, &req.job_id).await {
        Ok(id) => {
            tracing::debug!("Recorded application: {} -> {}", session.user_id, req.job_id);
            invalidate_history(&state.cache, &session.user_id).await;

            HttpResponse::Ok().json(RecordResponse {
                success: true,
                record_id: id.to_string(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to record application: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record application", e)
        }
    }
}

/// Withdraw an application
///
/// DELETE /api/v1/applications/{job_id}
async fn withdraw_application(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<String>,
) -> impl Responder {
    let job_id = path.into_inner();

    match state.postgres.withdraw_application(&session.user_id, &job_id).await {
        Ok(true) => {
            invalidate_history(&state.cache, &session.user_id).await;
            HttpResponse::NoContent().finish()
        }
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            "Application not found",
            format!("No application for job {}", job_id),
        ),
        Err(e) => {
            tracing::error!("Failed to withdraw application: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to withdraw application", e)
        }
    }
}

/// Record a search term for the signed-in seeker
///
/// POST /api/v1/searches
///
/// Request body:
/// ```json
/// { "term": "string" }
/// ```
async fn record_search(
    state: web::Data<AppState>,
    session: SessionContext,
    req: web::Json<RecordSearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    match state.postgres.record_search(&session.user_id, &req.term).await {
        Ok(id) => {
            invalidate_history(&state.cache, &session.user_id).await;
            HttpResponse::Ok().json(RecordResponse {
                success: true,
                record_id: id.to_string(),
            })
        }
        Err(crate::services::PostgresError::InvalidInput(message)) => {
            error_response(StatusCode::BAD_REQUEST, "Invalid search term", message)
        }
        Err(e) => {
            tracing::error!("Failed to record search: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record search", e)
        }
    }
}
