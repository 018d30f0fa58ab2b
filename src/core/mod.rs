// Core algorithm exports
pub mod matcher;
pub mod ranker;
pub mod scoring;
pub mod text;

pub use matcher::{CandidateMatcher, JobQuery, JobRecommender, JobSource, MatchResult};
pub use ranker::{rank, rank_flat};
pub use scoring::{calculate_match_score, score_match, Factor, FactorScore, MatchBreakdown, NEUTRAL_SCORE};
