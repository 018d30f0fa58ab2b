use crate::core::scoring::{calculate_match_score, NEUTRAL_SCORE};
use crate::models::{MatchCriteria, MatchSubject, Scored, ScoringWeights};

/// Score every subject, sort by match percentage (descending) and truncate.
///
/// The sort is stable: ties keep the order the subjects were fetched in.
pub fn rank<T: MatchSubject>(
    subjects: Vec<T>,
    criteria: &MatchCriteria,
    weights: &ScoringWeights,
    limit: usize,
) -> Vec<Scored<T>> {
    let mut scored: Vec<Scored<T>> = subjects
        .into_iter()
        .map(|item| {
            let match_percentage = calculate_match_score(&item, criteria, weights);
            Scored { item, match_percentage }
        })
        .collect();

    scored.sort_by(|a, b| b.match_percentage.cmp(&a.match_percentage));
    scored.truncate(limit);
    scored
}

/// Attach the neutral score to every subject without scoring, keeping fetch order
pub fn rank_flat<T>(subjects: Vec<T>, limit: usize) -> Vec<Scored<T>> {
    subjects
        .into_iter()
        .take(limit)
        .map(|item| Scored {
            item,
            match_percentage: NEUTRAL_SCORE,
        })
        .collect()
}
