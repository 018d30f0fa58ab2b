//! JobSoko Match - candidate matching and job recommendations for the JobSoko marketplace
//!
//! The core is a stateless weighted-sum scorer over records already fetched
//! from the hosted database, plus a ranker that sorts and truncates the
//! scored list. The HTTP layer wires it to the hosted backend.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;

// Re-export commonly used types
pub use crate::core::{calculate_match_score, rank, CandidateMatcher, JobRecommender, MatchResult, NEUTRAL_SCORE};
pub use models::{CandidateProfile, JobPosting, MatchCriteria, MatchSubject, Scored, ScoringWeights};
