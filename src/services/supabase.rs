use crate::core::{text::eq_ci, JobQuery, JobSource};
use crate::models::{CandidateProfile, JobPosting, JobStatus};
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the hosted database API
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid service key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Table names in the hosted database
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub jobs: String,
    pub profiles: String,
}

/// PostgREST filter list, rendered as an encoded query string
#[derive(Debug, Default, Clone)]
pub struct RestQuery {
    params: Vec<(String, String)>,
}

impl RestQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }

    pub fn eq(self, column: &str, value: &str) -> Self {
        self.param(column, format!("eq.{}", value))
    }

    pub fn neq(self, column: &str, value: &str) -> Self {
        self.param(column, format!("neq.{}", value))
    }

    /// Case-insensitive equality. LIKE wildcards in `value` are escaped;
    /// `*` (PostgREST's alias for `%`) can only be narrowed to `_`, so callers
    /// needing exact matches re-check the rows.
    pub fn ilike(self, column: &str, value: &str) -> Self {
        self.param(column, format!("ilike.{}", escape_like(value)))
    }

    pub fn not_in(self, column: &str, values: &[String]) -> Self {
        if values.is_empty() {
            return self;
        }
        let list = values
            .iter()
            .map(|v| format!("\"{}\"", v.replace('"', "")))
            .collect::<Vec<_>>()
            .join(",");
        self.param(column, format!("not.in.({})", list))
    }

    /// Active jobs with no deadline or a deadline still ahead
    pub fn open_jobs(self) -> Self {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.eq("status", JobStatus::Active.as_str())
            .param("or", format!("(deadline.is.null,deadline.gte.{})", now))
    }

    pub fn limit(self, limit: usize) -> Self {
        self.param("limit", limit.to_string())
    }

    pub fn offset(self, offset: usize) -> Self {
        self.param("offset", offset.to_string())
    }

    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '*' => escaped.push('_'),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Rows requested per page when reading a whole result set
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Client for the hosted Postgres REST API
///
/// Reads job postings and account profiles; writes go through the
/// hosted app directly.
pub struct SupabaseClient {
    base_url: String,
    service_key: String,
    client: Client,
    tables: SupabaseTables,
    page_size: usize,
}

impl SupabaseClient {
    /// Create a new client
    pub fn new(
        base_url: String,
        service_key: String,
        tables: SupabaseTables,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url,
            service_key,
            client,
            tables,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Rows per request when paging through a result set; should not exceed
    /// the server's `max-rows`
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetch a single job posting by ID
    pub async fn get_job(&self, job_id: &str) -> Result<JobPosting, SupabaseError> {
        let query = RestQuery::new().param("select", "*").eq("id", job_id).limit(1);
        self.fetch_one(&self.tables.jobs, &query, "Job", job_id).await
    }

    /// Fetch a single account profile by user ID
    pub async fn get_profile(&self, user_id: &str) -> Result<CandidateProfile, SupabaseError> {
        let query = RestQuery::new().param("select", "*").eq("id", user_id).limit(1);
        self.fetch_one(&self.tables.profiles, &query, "Profile", user_id).await
    }

    /// All available job seekers, excluding the requesting user
    pub async fn query_job_seekers(
        &self,
        exclude_user_id: &str,
    ) -> Result<Vec<CandidateProfile>, SupabaseError> {
        let query = RestQuery::new()
            .param("select", "*")
            .eq("role", "job_seeker")
            .eq("is_available", "true")
            .neq("id", exclude_user_id)
            .param("order", "created_at.desc,id.asc");

        let profiles: Vec<CandidateProfile> = self.fetch_all_rows(&self.tables.profiles, &query).await?;
        tracing::debug!("Queried {} job seekers", profiles.len());
        Ok(profiles)
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &RestQuery,
        kind: &str,
        id: &str,
    ) -> Result<T, SupabaseError> {
        let rows = self.get_rows(table, query).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(format!("{} {} not found", kind, id)))?;

        serde_json::from_value(row)
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse {}: {}", kind, e)))
    }

    /// Fetch rows, skipping any that fail to parse
    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &RestQuery,
    ) -> Result<Vec<T>, SupabaseError> {
        let rows = self.get_rows(table, query).await?;
        Ok(parse_rows(table, rows))
    }

    /// Fetch every row of an ordered query, one page at a time
    async fn fetch_all_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &RestQuery,
    ) -> Result<Vec<T>, SupabaseError> {
        let mut rows = Vec::new();
        let mut offset = 0;

        loop {
            let page_query = query.clone().limit(self.page_size).offset(offset);
            let page = self.get_rows(table, &page_query).await?;
            let page_len = page.len();
            rows.extend(page);

            if page_len < self.page_size {
                break;
            }
            offset += page_len;
        }

        tracing::debug!("Read {} {} rows in pages of {}", rows.len(), table, self.page_size);
        Ok(parse_rows(table, rows))
    }

    async fn get_rows(&self, table: &str, query: &RestQuery) -> Result<Vec<Value>, SupabaseError> {
        let url = format!(
            "{}/rest/v1/{}?{}",
            self.base_url.trim_end_matches('/'),
            table,
            query.to_query_string()
        );

        tracing::debug!("Fetching rows from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SupabaseError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Query on {} failed: {} - {}", table, status, body);
            return Err(SupabaseError::ApiError(format!("Query on {} failed: {}", table, status)));
        }

        let json: Value = response.json().await?;
        match json {
            Value::Array(rows) => Ok(rows),
            _ => Err(SupabaseError::InvalidResponse("Expected an array of rows".into())),
        }
    }
}

/// Deserialize rows, skipping any that fail to parse
fn parse_rows<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Vec<T> {
    let total = rows.len();

    let parsed: Vec<T> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping malformed {} row: {}", table, e);
                None
            }
        })
        .collect();

    if parsed.len() < total {
        tracing::debug!("Parsed {} of {} {} rows", parsed.len(), total, table);
    }

    parsed
}

impl JobSource for SupabaseClient {
    type Error = SupabaseError;

    async fn fetch_matching_jobs(&self, query: &JobQuery) -> Result<Vec<JobPosting>, SupabaseError> {
        let mut rest = RestQuery::new().param("select", "*").open_jobs();
        if let Some(category) = &query.category {
            rest = rest.ilike("category", category);
        }
        let rest = rest
            .not_in("id", &query.exclude_ids)
            .param("order", "created_at.desc,id.asc");

        let mut jobs: Vec<JobPosting> = self.fetch_all_rows(&self.tables.jobs, &rest).await?;
        if let Some(category) = &query.category {
            jobs.retain(|j| j.category.as_deref().map_or(false, |c| eq_ci(c, category)));
        }
        tracing::debug!("Primary job query returned {} rows", jobs.len());
        Ok(jobs)
    }

    async fn fetch_open_jobs(&self, limit: usize) -> Result<Vec<JobPosting>, SupabaseError> {
        let rest = RestQuery::new()
            .param("select", "*")
            .open_jobs()
            .param("order", "created_at.desc")
            .limit(limit);

        self.fetch_rows(&self.tables.jobs, &rest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SupabaseClient::new(
            "https://project.supabase.co".to_string(),
            "service_key".to_string(),
            SupabaseTables {
                jobs: "jobs".to_string(),
                profiles: "profiles".to_string(),
            },
        )
        .unwrap();

        assert_eq!(client.base_url, "https://project.supabase.co");
        assert_eq!(client.tables.jobs, "jobs");
    }

    #[test]
    fn test_rest_query_encoding() {
        let query = RestQuery::new()
            .eq("role", "job_seeker")
            .not_in("id", &["a".to_string(), "b".to_string()])
            .limit(5);

        assert_eq!(
            query.to_query_string(),
            "role=eq.job_seeker&id=not.in.%28%22a%22%2C%22b%22%29&limit=5"
        );
    }

    #[test]
    fn test_not_in_skips_empty_list() {
        let query = RestQuery::new().not_in("id", &[]);
        assert_eq!(query.to_query_string(), "");
    }

    #[test]
    fn test_ilike_escapes_wildcards() {
        assert_eq!(escape_like("Retail"), "Retail");
        assert_eq!(escape_like("100%_sales"), "100\\%\\_sales");
        assert_eq!(escape_like("Home*Care"), "Home_Care");
        assert_eq!(escape_like("a\\b"), "a\\\\b");

        let query = RestQuery::new().ilike("category", "50%");
        assert_eq!(query.to_query_string(), "category=ilike.50%5C%25");
    }

    #[test]
    fn test_page_size_floor() {
        let client = SupabaseClient::new(
            "http://localhost".to_string(),
            "key".to_string(),
            SupabaseTables {
                jobs: "jobs".to_string(),
                profiles: "profiles".to_string(),
            },
        )
        .unwrap();

        assert_eq!(client.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(client.with_page_size(0).page_size, 1);
    }
}
