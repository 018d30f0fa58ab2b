use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use std::collections::HashSet;
use std::sync::Arc;
use validator::Validate;

use crate::core::{score_match, CandidateMatcher, JobRecommender};
use crate::models::{
    CandidateMatchRequest, CandidateProfile, HealthResponse, JobPosting, MatchCriteria,
    MatchesResponse, RecommendationRequest, ScoreRequest, ScoringWeights, SeekerHistory,
    UserRole, WeightProfile,
};
use crate::routes::{error_response, optional_json};
use crate::services::{CacheKey, CacheManager, PostgresClient, SupabaseClient, SupabaseError};
use crate::session::SessionContext;

/// Result-count limits applied to every ranking request
#[derive(Debug, Clone, Copy)]
pub struct MatchLimits {
    pub default_limit: usize,
    pub max_limit: usize,
    pub search_history_size: usize,
}

impl MatchLimits {
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

impl Default for MatchLimits {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 50,
            search_history_size: 20,
        }
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub supabase: Arc<SupabaseClient>,
    pub cache: Arc<CacheManager>,
    pub postgres: Arc<PostgresClient>,
    pub limits: MatchLimits,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/jobs/{job_id}/candidates", web::post().to(match_candidates))
        .route("/recommendations", web::post().to(recommend_jobs))
        .route("/score", web::post().to(score));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn fetch_error_response(what: &str, e: &SupabaseError) -> HttpResponse {
    match e {
        SupabaseError::NotFound(_) => error_response(StatusCode::NOT_FOUND, &format!("{} not found", what), e),
        _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, &format!("Failed to fetch {}", what), e),
    }
}

async fn load_job(state: &AppState, job_id: &str) -> Result<JobPosting, SupabaseError> {
    state
        .cache
        .get_or_fetch(&CacheKey::job(job_id), || state.supabase.get_job(job_id))
        .await
}

async fn load_profile(state: &AppState, user_id: &str) -> Result<CandidateProfile, SupabaseError> {
    state
        .cache
        .get_or_fetch(&CacheKey::profile(user_id), || state.supabase.get_profile(user_id))
        .await
}

/// Applications and recent searches. Failures degrade to an empty history.
async fn load_history(state: &AppState, seeker_id: &str) -> SeekerHistory {
    let result = state
        .cache
        .get_or_fetch(&CacheKey::history(seeker_id), || async {
            let applied_job_ids = state.postgres.get_application_history(seeker_id).await?;
            let search_terms = state
                .postgres
                .recent_search_terms(seeker_id, state.limits.search_history_size)
                .await?;
            Ok::<_, crate::services::PostgresError>(SeekerHistory {
                applied_job_ids,
                search_terms,
            })
        })
        .await;

    match result {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!("Failed to load history for {}, proceeding without it: {}", seeker_id, e);
            SeekerHistory::default()
        }
    }
}

/// Rank job seekers for one of the employer's jobs
///
/// POST /api/v1/jobs/{job_id}/candidates
///
/// Request body:
/// ```json
/// { "limit": 10 }
/// ```
async fn match_candidates(
    state: web::Data<AppState>,
    matcher: web::Data<CandidateMatcher>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> impl Responder {
    let req: CandidateMatchRequest = match optional_json(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    if let Err(e) = session.require_role(UserRole::Employer) {
        return error_response(StatusCode::FORBIDDEN, "Employer account required", e);
    }

    let job_id = path.into_inner();
    let limit = state.limits.resolve(req.limit);

    let job = match load_job(&state, &job_id).await {
        Ok(job) => job,
        Err(e) => {
            tracing::error!("Failed to fetch job {}: {}", job_id, e);
            return fetch_error_response("job", &e);
        }
    };

    if job.employer_id != session.user_id {
        return error_response(
            StatusCode::FORBIDDEN,
            "Not your job",
            "Candidates can only be matched for jobs you posted",
        );
    }

    tracing::info!("Matching candidates for job: {}, limit: {}", job_id, limit);

    let candidates = match state
        .supabase
        .query_job_seekers(&session.user_id)
        .await
    {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to query candidates for job {}: {}", job_id, e);
            return fetch_error_response("candidates", &e);
        }
    };

    let result = matcher.find_candidates(&job, candidates, limit);

    tracing::info!(
        "Returning {} candidates for job {} (from {} profiles)",
        result.matches.len(),
        job_id,
        result.total_candidates
    );

    HttpResponse::Ok().json(MatchesResponse {
        matches: result.matches,
        total_results: result.total_candidates,
        fallback: result.fallback,
    })
}

/// Job recommendations for the signed-in seeker
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// { "limit": 10, "searchTerms": ["string"] }
/// ```
async fn recommend_jobs(
    state: web::Data<AppState>,
    recommender: web::Data<JobRecommender>,
    session: SessionContext,
    body: web::Bytes,
) -> impl Responder {
    let req: RecommendationRequest = match optional_json(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let user_id = &session.user_id;
    let limit = state.limits.resolve(req.limit);

    let profile = match load_profile(&state, user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Failed to fetch profile for {}: {}", user_id, e);
            return fetch_error_response("profile", &e);
        }
    };

    if !profile.is_job_seeker() {
        return error_response(
            StatusCode::FORBIDDEN,
            "Job seeker account required",
            "Recommendations are only available to job seekers",
        );
    }

    let history = load_history(&state, user_id).await;

    let search_terms = merge_search_terms(history.search_terms, req.search_terms);
    let criteria = MatchCriteria::for_seeker(&profile, search_terms, history.applied_job_ids);

    tracing::info!("Recommending jobs for seeker: {}, limit: {}", user_id, limit);

    let result = match recommender
        .recommend_from(state.supabase.as_ref(), &criteria, limit)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Failed to query jobs for {}: {}", user_id, e);
            return fetch_error_response("jobs", &e);
        }
    };

    tracing::info!(
        "Returning {} jobs for seeker {} (from {} jobs, fallback: {})",
        result.matches.len(),
        user_id,
        result.total_candidates,
        result.fallback
    );

    HttpResponse::Ok().json(MatchesResponse {
        matches: result.matches,
        total_results: result.total_candidates,
        fallback: result.fallback,
    })
}

/// Stored terms followed by the request's, lower-cased, blanks dropped and
/// each term kept once at its first position
pub(crate) fn merge_search_terms(stored: Vec<String>, requested: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    stored
        .into_iter()
        .chain(requested)
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Score a single subject against criteria, with per-factor detail
///
/// POST /api/v1/score
pub(crate) async fn score(
    matcher: web::Data<CandidateMatcher>,
    recommender: web::Data<JobRecommender>,
    req: web::Json<ScoreRequest>,
) -> impl Responder {
    let weights: &ScoringWeights = match req.profile {
        WeightProfile::CandidateMatching => matcher.weights(),
        WeightProfile::Recommendation => recommender.weights(),
    };

    HttpResponse::Ok().json(score_match(&req.subject, &req.criteria, weights))
}
