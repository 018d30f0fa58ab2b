use serde::{Deserialize, Serialize};

use crate::core::text::{contains_ci, eq_ci, locations_overlap, present, skills_overlap};
use crate::models::{MatchCriteria, MatchSubject, ScoringWeights};

/// Returned when no factor could be compared
pub const NEUTRAL_SCORE: u8 = 50;

/// One weighted dimension of comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Skills,
    Location,
    Category,
    Experience,
    SearchHistory,
    ApplicationHistory,
}

/// Contribution of a single comparable factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub factor: Factor,
    pub weight: f64,
    pub earned: f64,
}

/// Full scoring result, including which factors were comparable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    #[serde(rename = "matchPercentage")]
    pub match_percentage: u8,
    pub factors: Vec<FactorScore>,
    #[serde(rename = "matchedSkills")]
    pub matched_skills: Vec<String>,
}

impl MatchBreakdown {
    pub fn total_weight(&self) -> f64 {
        self.factors.iter().map(|f| f.weight).sum()
    }
}

/// Running weighted sum. The denominator only grows for factors both sides supplied.
#[derive(Debug, Default)]
struct Tally {
    factors: Vec<FactorScore>,
}

impl Tally {
    fn add(&mut self, factor: Factor, weight: f64, fraction: f64) {
        if weight <= 0.0 {
            return;
        }
        self.factors.push(FactorScore {
            factor,
            weight,
            earned: weight * fraction,
        });
    }

    fn percentage(&self) -> u8 {
        let total_weight: f64 = self.factors.iter().map(|f| f.weight).sum();
        if total_weight <= 0.0 {
            return NEUTRAL_SCORE;
        }
        let score: f64 = self.factors.iter().map(|f| f.earned).sum();
        (100.0 * score / total_weight).round().clamp(0.0, 100.0) as u8
    }
}

/// Calculate a 0-100 match percentage for a subject against criteria.
///
/// Weighted partial-credit sum over the factors present on both sides:
/// skills (substring overlap ratio), location (comma-truncated containment),
/// category (case-insensitive equality), experience (containment),
/// search history (fraction of terms found in title/description) and
/// application history (flat half-weight bonus).
///
/// Skill matching is many-to-many and not deduplicated, so the skills ratio
/// can exceed 1; the final percentage is clamped to 100.
pub fn calculate_match_score<S: MatchSubject + ?Sized>(
    subject: &S,
    criteria: &MatchCriteria,
    weights: &ScoringWeights,
) -> u8 {
    score_match(subject, criteria, weights).match_percentage
}

/// Same as [`calculate_match_score`], keeping the per-factor detail
pub fn score_match<S: MatchSubject + ?Sized>(
    subject: &S,
    criteria: &MatchCriteria,
    weights: &ScoringWeights,
) -> MatchBreakdown {
    let mut tally = Tally::default();
    let mut matched_skills = Vec::new();

    // Skills
    if !criteria.required_skills.is_empty() && !subject.skills().is_empty() {
        matched_skills = matching_skills(subject.skills(), &criteria.required_skills);
        let ratio = matched_skills.len() as f64 / criteria.required_skills.len().max(1) as f64;
        tally.add(Factor::Skills, weights.skills, ratio);
    }

    // Location
    if let (Some(ours), Some(theirs)) = (
        present(subject.location()),
        present(criteria.location.as_deref()),
    ) {
        let hit = if locations_overlap(ours, theirs) { 1.0 } else { 0.0 };
        tally.add(Factor::Location, weights.location, hit);
    }

    // Category
    if let (Some(ours), Some(theirs)) = (
        present(subject.category()),
        present(criteria.category.as_deref()),
    ) {
        let hit = if eq_ci(ours, theirs) { 1.0 } else { 0.0 };
        tally.add(Factor::Category, weights.category, hit);
    }

    // Experience
    if let (Some(ours), Some(level)) = (
        present(subject.experience()),
        present(criteria.experience_level.as_deref()),
    ) {
        let hit = if contains_ci(ours, level) { 1.0 } else { 0.0 };
        tally.add(Factor::Experience, weights.experience, hit);
    }

    // Search history
    if !criteria.search_history.is_empty() {
        let title = present(subject.title());
        let description = present(subject.description());
        if title.is_some() || description.is_some() {
            let found = criteria
                .search_history
                .iter()
                .filter(|term| {
                    title.map_or(false, |t| contains_ci(t, term))
                        || description.map_or(false, |d| contains_ci(d, term))
                })
                .count();
            let fraction = found as f64 / criteria.search_history.len() as f64;
            tally.add(Factor::SearchHistory, weights.search_history, fraction);
        }
    }

    // Application history: flat bonus, independent of overlap
    if !criteria.application_history.is_empty() {
        tally.add(Factor::ApplicationHistory, weights.application_history, 0.5);
    }

    MatchBreakdown {
        match_percentage: tally.percentage(),
        factors: tally.factors,
        matched_skills,
    }
}

/// Subject skills overlapping any required skill, in subject order
fn matching_skills(skills: &[String], required: &[String]) -> Vec<String> {
    skills
        .iter()
        .filter(|skill| required.iter().any(|r| skills_overlap(skill, r)))
        .cloned()
        .collect()
}
