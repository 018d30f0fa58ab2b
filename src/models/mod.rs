// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CandidateProfile, JobPosting, JobStatus, MatchCriteria, MatchSubject, Scored, ScoringWeights,
    SeekerHistory, SubjectRecord, UserRole, WeightProfile,
};
pub use requests::{
    CandidateMatchRequest, RecommendationRequest, RecordApplicationRequest, RecordSearchRequest,
    ScoreRequest,
};
pub use responses::{ErrorResponse, HealthResponse, MatchesResponse, RecordResponse};
