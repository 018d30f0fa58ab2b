use crate::core::ranker::{rank, rank_flat};
use crate::models::{CandidateProfile, JobPosting, MatchCriteria, Scored, ScoringWeights};

/// Result of one fetch-score-sort cycle
#[derive(Debug)]
pub struct MatchResult<T> {
    pub matches: Vec<Scored<T>>,
    pub total_candidates: usize,
    /// True when the primary query came back empty and the unscored fallback was used
    pub fallback: bool,
}

/// Filtered query for the primary recommendation fetch.
///
/// Unbounded: every matching open job is returned and scored, the result
/// limit only applies after ranking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobQuery {
    pub category: Option<String>,
    pub exclude_ids: Vec<String>,
}

impl JobQuery {
    pub fn for_criteria(criteria: &MatchCriteria) -> Self {
        Self {
            category: criteria
                .category
                .as_ref()
                .filter(|c| !c.trim().is_empty())
                .cloned(),
            exclude_ids: criteria.application_history.clone(),
        }
    }
}

/// Source of open job postings.
///
/// Both queries only return active jobs whose deadline has not passed, and
/// return an empty list (not an error) when nothing matches.
#[allow(async_fn_in_trait)]
pub trait JobSource {
    type Error: std::error::Error;

    /// All jobs matching the seeker's category, minus the excluded IDs
    async fn fetch_matching_jobs(&self, query: &JobQuery) -> Result<Vec<JobPosting>, Self::Error>;

    /// Any open jobs, status and deadline constraints only
    async fn fetch_open_jobs(&self, limit: usize) -> Result<Vec<JobPosting>, Self::Error>;
}

/// Employer side: ranks job seekers for one job posting
#[derive(Debug, Clone)]
pub struct CandidateMatcher {
    weights: ScoringWeights,
}

impl CandidateMatcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::CANDIDATE_MATCHING)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Rank candidates for a job.
    ///
    /// Only available job seekers are considered, never the employer who posted the job.
    pub fn find_candidates(
        &self,
        job: &JobPosting,
        candidates: Vec<CandidateProfile>,
        limit: usize,
    ) -> MatchResult<CandidateProfile> {
        let total_candidates = candidates.len();
        let criteria = MatchCriteria::for_job(job);

        let eligible: Vec<CandidateProfile> = candidates
            .into_iter()
            .filter(|c| c.is_job_seeker() && c.is_available && c.id != job.employer_id)
            .collect();

        MatchResult {
            matches: rank(eligible, &criteria, &self.weights, limit),
            total_candidates,
            fallback: false,
        }
    }
}

impl Default for CandidateMatcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Seeker side: ranks open jobs against a seeker's profile and activity
#[derive(Debug, Clone)]
pub struct JobRecommender {
    weights: ScoringWeights,
}

impl JobRecommender {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::RECOMMENDATION)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score and rank jobs from the primary query. Jobs already applied to are dropped.
    pub fn recommend(
        &self,
        criteria: &MatchCriteria,
        jobs: Vec<JobPosting>,
        limit: usize,
    ) -> MatchResult<JobPosting> {
        let total_candidates = jobs.len();
        let jobs: Vec<JobPosting> = jobs
            .into_iter()
            .filter(|j| !criteria.application_history.contains(&j.id))
            .collect();

        MatchResult {
            matches: rank(jobs, criteria, &self.weights, limit),
            total_candidates,
            fallback: false,
        }
    }

    /// Unscored fallback: every job gets the neutral score, fetch order is kept
    pub fn fallback(&self, jobs: Vec<JobPosting>, limit: usize) -> MatchResult<JobPosting> {
        let total_candidates = jobs.len();
        MatchResult {
            matches: rank_flat(jobs, limit),
            total_candidates,
            fallback: true,
        }
    }

    /// Fetch and rank recommendations, falling back to any open jobs when the
    /// filtered query returns nothing.
    pub async fn recommend_from<S: JobSource>(
        &self,
        source: &S,
        criteria: &MatchCriteria,
        limit: usize,
    ) -> Result<MatchResult<JobPosting>, S::Error> {
        let query = JobQuery::for_criteria(criteria);
        let jobs = source.fetch_matching_jobs(&query).await?;

        if !jobs.is_empty() {
            return Ok(self.recommend(criteria, jobs, limit));
        }

        tracing::debug!("Primary job query returned nothing, using open jobs fallback");
        let jobs = source.fetch_open_jobs(limit).await?;
        Ok(self.fallback(jobs, limit))
    }
}

impl Default for JobRecommender {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn job(id: &str, category: &str, skills: &[&str]) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            employer_id: "emp-1".to_string(),
            title: format!("Job {}", id),
            description: None,
            category: Some(category.to_string()),
            location: Some("Nairobi".to_string()),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            experience_level: None,
            salary_min: None,
            salary_max: None,
            job_type: None,
            status: Default::default(),
            deadline: None,
            created_at: None,
        }
    }

    fn candidate(id: &str, role: UserRole, skills: &[&str], location: &str) -> CandidateProfile {
        CandidateProfile {
            id: id.to_string(),
            full_name: format!("User {}", id),
            role,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            location: Some(location.to_string()),
            preferred_category: None,
            experience: None,
            bio: None,
            is_available: true,
            created_at: None,
        }
    }

    #[test]
    fn test_find_candidates_filters_and_ranks() {
        let matcher = CandidateMatcher::with_default_weights();
        let posting = job("j1", "Construction", &["Masonry", "Plumbing"]);

        let mut busy = candidate("4", UserRole::JobSeeker, &["Masonry"], "Nairobi");
        busy.is_available = false;

        let candidates = vec![
            candidate("1", UserRole::JobSeeker, &["Plumbing"], "Mombasa"),
            candidate("2", UserRole::JobSeeker, &["Masonry", "Plumbing"], "Kasarani, Nairobi"),
            candidate("3", UserRole::Employer, &["Masonry"], "Nairobi"),
            busy,
            candidate("emp-1", UserRole::JobSeeker, &["Masonry"], "Nairobi"),
        ];

        let result = matcher.find_candidates(&posting, candidates, 10);

        assert_eq!(result.total_candidates, 5);
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].item.id, "2");
        assert_eq!(result.matches[0].match_percentage, 100);
        assert!(!result.fallback);
    }

    #[test]
    fn test_recommend_skips_applied_jobs() {
        let recommender = JobRecommender::with_default_weights();
        let criteria = MatchCriteria {
            category: Some("Retail".to_string()),
            application_history: vec!["j2".to_string()],
            ..Default::default()
        };

        let jobs = vec![job("j1", "Retail", &[]), job("j2", "Retail", &[]), job("j3", "Farming", &[])];
        let result = recommender.recommend(&criteria, jobs, 10);

        let ids: Vec<_> = result.matches.iter().map(|m| m.item.id.as_str()).collect();
        assert_eq!(ids, vec!["j1", "j3"]);
    }

    #[test]
    fn test_job_query_from_criteria() {
        let criteria = MatchCriteria {
            category: Some("  ".to_string()),
            application_history: vec!["j9".to_string()],
            ..Default::default()
        };

        let query = JobQuery::for_criteria(&criteria);
        assert_eq!(query.category, None);
        assert_eq!(query.exclude_ids, vec!["j9"]);
    }
}
