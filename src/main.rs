use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use jobsoko_match::config::Settings;
use jobsoko_match::core::{CandidateMatcher, JobRecommender};
use jobsoko_match::routes::{self, matches::{AppState, MatchLimits}};
use jobsoko_match::services::{CacheManager, PostgresClient, SupabaseClient, SupabaseTables, DEFAULT_PAGE_SIZE};
use jobsoko_match::session::SessionVerifier;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path parameter errors
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());
    init_logging(&settings.logging.level, &log_format);

    info!("Starting JobSoko matching service...");

    let supabase = SupabaseClient::new(
        settings.supabase.url.clone(),
        settings.supabase.service_key.clone(),
        SupabaseTables {
            jobs: settings.tables.jobs.clone(),
            profiles: settings.tables.profiles.clone(),
        },
    )
    .map_err(|e| {
        error!("Failed to create hosted database client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?
    .with_page_size(settings.supabase.page_size.unwrap_or(DEFAULT_PAGE_SIZE));
    let supabase = Arc::new(supabase);

    info!("Hosted database client initialized");

    let cache_ttl = settings.cache.ttl();
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = if settings.cache.redis_url.is_empty() {
        warn!("cache.redis_url is empty, caching in-process only");
        Arc::new(CacheManager::local(l1_cache_size, cache_ttl))
    } else {
        match CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => Arc::new(c),
            Err(e) => {
                error!("Failed to connect to Redis: {}", e);
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "Redis connection required"));
            }
        }
    };

    info!(
        "Cache manager initialized (L1: {} entries, TTL: {:?}, history TTL: {:?})",
        l1_cache_size, cache_ttl.records, cache_ttl.history
    );

    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        Some(db_max_conn),
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let postgres = Arc::new(postgres);

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    let candidate_matcher = web::Data::new(CandidateMatcher::new(settings.scoring.candidate_weights()));
    let recommender = web::Data::new(JobRecommender::new(settings.scoring.recommendation_weights()));

    info!(
        "Matchers initialized with weights: candidates {:?}, recommendations {:?}",
        candidate_matcher.weights(),
        recommender.weights()
    );

    let defaults = MatchLimits::default();
    let limits = MatchLimits {
        default_limit: settings.matching.default_limit.unwrap_or(defaults.default_limit),
        max_limit: settings.matching.max_limit.unwrap_or(defaults.max_limit),
        search_history_size: settings
            .matching
            .search_history_size
            .unwrap_or(defaults.search_history_size),
    };

    if settings.auth.jwt_secret.is_empty() {
        error!("auth.jwt_secret is empty, every authenticated request will be rejected");
    }
    let verifier = web::Data::new(SessionVerifier::new(&settings.auth.jwt_secret, &settings.auth.audience));

    let app_state = web::Data::new(AppState {
        supabase,
        cache,
        postgres,
        limits,
    });

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(app_state.clone())
            .app_data(candidate_matcher.clone())
            .app_data(recommender.clone())
            .app_data(verifier.clone())
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
