use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role chosen when the account was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    JobSeeker,
    Employer,
}

/// Lifecycle state of a job posting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Draft,
    Closed,
    Filled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Draft => "draft",
            JobStatus::Closed => "closed",
            JobStatus::Filled => "filled",
        }
    }
}

/// Job posting as stored in the hosted `jobs` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    #[serde(rename = "employerId", alias = "employer_id")]
    pub employer_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "requiredSkills", alias = "required_skills", alias = "skills", default)]
    pub required_skills: Vec<String>,
    #[serde(rename = "experienceLevel", alias = "experience_level", default)]
    pub experience_level: Option<String>,
    #[serde(rename = "salaryMin", alias = "salary_min", default)]
    pub salary_min: Option<f64>,
    #[serde(rename = "salaryMax", alias = "salary_max", default)]
    pub salary_max: Option<f64>,
    #[serde(rename = "jobType", alias = "job_type", default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt", alias = "created_at", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl JobPosting {
    /// Active and not past its deadline
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Active && self.deadline.map_or(true, |d| d >= now)
    }
}

/// Account profile as stored in the hosted `profiles` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: String,
    #[serde(rename = "fullName", alias = "full_name", default)]
    pub full_name: String,
    pub role: UserRole,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "preferredCategory", alias = "preferred_category", default)]
    pub preferred_category: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(rename = "isAvailable", alias = "is_available", default = "default_true")]
    pub is_available: bool,
    #[serde(rename = "createdAt", alias = "created_at", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CandidateProfile {
    pub fn is_job_seeker(&self) -> bool {
        self.role == UserRole::JobSeeker
    }
}

fn default_true() -> bool { true }

/// Free-form subject record, used when scoring ad-hoc input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectRecord {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A record that can be scored against [`MatchCriteria`].
///
/// Jobs are subjects when recommending to a seeker, profiles are subjects
/// when matching candidates to a job.
pub trait MatchSubject {
    fn skills(&self) -> &[String];
    fn location(&self) -> Option<&str>;
    fn category(&self) -> Option<&str>;
    fn experience(&self) -> Option<&str>;
    fn title(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
}

impl MatchSubject for JobPosting {
    fn skills(&self) -> &[String] { &self.required_skills }
    fn location(&self) -> Option<&str> { self.location.as_deref() }
    fn category(&self) -> Option<&str> { self.category.as_deref() }
    fn experience(&self) -> Option<&str> { self.experience_level.as_deref() }
    fn title(&self) -> Option<&str> { Some(self.title.as_str()) }
    fn description(&self) -> Option<&str> { self.description.as_deref() }
}

impl MatchSubject for CandidateProfile {
    fn skills(&self) -> &[String] { &self.skills }
    fn location(&self) -> Option<&str> { self.location.as_deref() }
    fn category(&self) -> Option<&str> { self.preferred_category.as_deref() }
    fn experience(&self) -> Option<&str> { self.experience.as_deref() }
    fn title(&self) -> Option<&str> { None }
    fn description(&self) -> Option<&str> { self.bio.as_deref() }
}

impl MatchSubject for SubjectRecord {
    fn skills(&self) -> &[String] { &self.skills }
    fn location(&self) -> Option<&str> { self.location.as_deref() }
    fn category(&self) -> Option<&str> { self.category.as_deref() }
    fn experience(&self) -> Option<&str> { self.experience.as_deref() }
    fn title(&self) -> Option<&str> { self.title.as_deref() }
    fn description(&self) -> Option<&str> { self.description.as_deref() }
}

/// What the other side is looking for
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchCriteria {
    #[serde(rename = "requiredSkills", alias = "required_skills", default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "experienceLevel", alias = "experience_level", default)]
    pub experience_level: Option<String>,
    #[serde(rename = "searchHistory", alias = "search_history", default)]
    pub search_history: Vec<String>,
    #[serde(rename = "applicationHistory", alias = "application_history", default)]
    pub application_history: Vec<String>,
}

impl MatchCriteria {
    /// Criteria an employer's job imposes on candidates
    pub fn for_job(job: &JobPosting) -> Self {
        Self {
            required_skills: job.required_skills.clone(),
            location: job.location.clone(),
            category: job.category.clone(),
            experience_level: job.experience_level.clone(),
            search_history: Vec::new(),
            application_history: Vec::new(),
        }
    }

    /// Criteria a seeker's profile and activity imply for job recommendations
    pub fn for_seeker(
        profile: &CandidateProfile,
        search_history: Vec<String>,
        application_history: Vec<String>,
    ) -> Self {
        Self {
            required_skills: profile.skills.clone(),
            location: profile.location.clone(),
            category: profile.preferred_category.clone(),
            experience_level: None,
            search_history,
            application_history,
        }
    }
}

/// A record with its match percentage attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scored<T> {
    #[serde(flatten)]
    pub item: T,
    #[serde(rename = "matchPercentage")]
    pub match_percentage: u8,
}

/// Per-factor weights for one call site.
///
/// A zero weight disables the factor entirely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills: f64,
    pub location: f64,
    pub category: f64,
    pub experience: f64,
    #[serde(rename = "searchHistory")]
    pub search_history: f64,
    #[serde(rename = "applicationHistory")]
    pub application_history: f64,
}

impl ScoringWeights {
    /// Employer side: a job scored against candidate profiles
    pub const CANDIDATE_MATCHING: ScoringWeights = ScoringWeights {
        skills: 40.0,
        location: 20.0,
        category: 20.0,
        experience: 10.0,
        search_history: 0.0,
        application_history: 0.0,
    };

    /// Seeker side: jobs scored against a seeker's profile and activity
    pub const RECOMMENDATION: ScoringWeights = ScoringWeights {
        skills: 50.0,
        location: 20.0,
        category: 20.0,
        experience: 0.0,
        search_history: 10.0,
        application_history: 10.0,
    };
}

/// Named weight profile, as selected by API callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightProfile {
    CandidateMatching,
    Recommendation,
}

/// Seeker activity kept in the history tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeekerHistory {
    #[serde(rename = "appliedJobIds")]
    pub applied_job_ids: Vec<String>,
    #[serde(rename = "searchTerms")]
    pub search_terms: Vec<String>,
}
