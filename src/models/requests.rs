use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{MatchCriteria, SubjectRecord, WeightProfile};

/// Request to rank candidates for one of the employer's jobs
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CandidateMatchRequest {
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Request for job recommendations for the signed-in seeker
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RecommendationRequest {
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<usize>,
    /// Terms from the current session, added to the stored search history
    #[serde(alias = "search_terms", rename = "searchTerms", default)]
    pub search_terms: Vec<String>,
}

/// Request to record an application
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordApplicationRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "job_id", rename = "jobId")]
    pub job_id: String,
}

/// Request to record a search term
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordSearchRequest {
    #[validate(length(min = 1, max = 100))]
    pub term: String,
}

/// Ad-hoc scoring of one subject against one set of criteria
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub subject: SubjectRecord,
    pub criteria: MatchCriteria,
    #[serde(default = "default_profile")]
    pub profile: WeightProfile,
}

fn default_profile() -> WeightProfile {
    WeightProfile::Recommendation
}
