use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::models::ScoringWeights;
use crate::services::CacheTtl;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    pub tables: TableSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub service_key: String,
    /// Rows per request when reading whole tables
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSettings {
    pub jobs: String,
    pub profiles: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Empty runs the cache in-process only
    #[serde(default)]
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub history_ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

impl CacheSettings {
    pub fn ttl(&self) -> CacheTtl {
        let defaults = CacheTtl::default();
        CacheTtl {
            records: self.ttl_secs.map(Duration::from_secs).unwrap_or(defaults.records),
            history: self.history_ttl_secs.map(Duration::from_secs).unwrap_or(defaults.history),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingSettings {
    pub default_limit: Option<usize>,
    pub max_limit: Option<usize>,
    pub search_history_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_audience() -> String { "authenticated".to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub candidate: WeightsConfig,
    #[serde(default)]
    pub recommendation: WeightsConfig,
}

impl ScoringSettings {
    pub fn candidate_weights(&self) -> ScoringWeights {
        self.candidate.apply(ScoringWeights::CANDIDATE_MATCHING)
    }

    pub fn recommendation_weights(&self) -> ScoringWeights {
        self.recommendation.apply(ScoringWeights::RECOMMENDATION)
    }
}

/// Weight overrides; unset fields keep the built-in weight
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeightsConfig {
    pub skills: Option<f64>,
    pub location: Option<f64>,
    pub category: Option<f64>,
    pub experience: Option<f64>,
    pub search_history: Option<f64>,
    pub application_history: Option<f64>,
}

impl WeightsConfig {
    pub fn apply(&self, base: ScoringWeights) -> ScoringWeights {
        ScoringWeights {
            skills: self.skills.unwrap_or(base.skills),
            location: self.location.unwrap_or(base.location),
            category: self.category.unwrap_or(base.category),
            experience: self.experience.unwrap_or(base.experience),
            search_history: self.search_history.unwrap_or(base.search_history),
            application_history: self.application_history.unwrap_or(base.application_history),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Configuration file (config/default.toml)
    /// 2. Local overrides (config/local.toml)
    /// 3. Environment variables (prefixed with JOBSOKO__)
    /// 4. Hosted-backend variables (DATABASE_URL, SUPABASE_URL, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., JOBSOKO__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("JOBSOKO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_backend_env(settings, |key| std::env::var(key).ok())?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("JOBSOKO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Variables the hosted backend's tooling exports, and the keys they override
const BACKEND_ENV: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.url"),
    ("SUPABASE_URL", "supabase.url"),
    ("SUPABASE_SERVICE_KEY", "supabase.service_key"),
    ("SUPABASE_JWT_SECRET", "auth.jwt_secret"),
];

fn apply_backend_env<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder().add_source(settings);

    for (var, key) in BACKEND_ENV {
        if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
            builder = builder.set_override(*key, value)?;
        }
    }

    builder.build()
}
