//! Recompute a student's karma from scratch.
//!
//! Scores are never adjusted incrementally. Every change to a review, a vote or an
//! endorsement reloads the full set of inputs for the student and calls
//! [`compute_score`] again.

use crate::config::KarmaWeights;
use crate::{EndorsementRecord, ReviewWithVotes, VoteCount};

/// The parts of a review that matter for scoring.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReviewTally {
    pub is_good: bool,
    pub deleted: bool,
    pub votes: VoteCount,
}

impl From<&ReviewWithVotes> for ReviewTally {
    fn from(r: &ReviewWithVotes) -> Self {
        Self {
            is_good: r.review.is_good,
            deleted: r.review.deleted,
            votes: r.votes,
        }
    }
}

/// Contribution of a single review, including the votes it received.
/// Votes always push in their own direction: an upvote is worth the same on a
/// good review as on a bad one.
#[must_use]
pub fn review_delta(weights: &KarmaWeights, tally: &ReviewTally) -> i64 {
    if tally.deleted {
        return 0;
    }
    let base = if tally.is_good {
        weights.review_points
    } else {
        -weights.review_points
    };
    base + weights.vote_points * tally.votes.net()
}

/// Contribution of every endorsed skill across all endorsing staff.
#[must_use]
pub fn endorsement_delta(weights: &KarmaWeights, endorsements: &[EndorsementRecord]) -> i64 {
    let flags: i64 = endorsements
        .iter()
        .map(|e| i64::from(e.endorsed_count()))
        .sum();
    weights.endorsement_points * flags
}

/// Compute a student's karma from its reviews and endorsements.
/// The result is unbounded in both directions.
#[must_use]
pub fn compute_score(
    weights: &KarmaWeights,
    reviews: &[ReviewTally],
    endorsements: &[EndorsementRecord],
) -> i64 {
    let review_total: i64 = reviews.iter().map(|r| review_delta(weights, r)).sum();
    weights.baseline + review_total + endorsement_delta(weights, endorsements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Skill;

    fn tally(is_good: bool, upvotes: u32, downvotes: u32) -> ReviewTally {
        ReviewTally {
            is_good,
            deleted: false,
            votes: VoteCount { upvotes, downvotes },
        }
    }

    fn endorsement(staff_id: u32, skills: &[Skill]) -> EndorsementRecord {
        let mut e = EndorsementRecord::new(staff_id, 1);
        for skill in skills {
            e.set(*skill, true);
        }
        e
    }

    #[test_log::test]
    fn test_fresh_student_scores_baseline() {
        let weights = KarmaWeights::default();
        assert_eq!(compute_score(&weights, &[], &[]), 100);
    }

    #[test_log::test]
    fn test_good_review_with_two_upvotes() {
        let weights = KarmaWeights::default();
        let score = compute_score(&weights, &[tally(true, 2, 0)], &[]);
        assert_eq!(score - weights.baseline, 60);
    }

    #[test_log::test]
    fn test_bad_review_with_one_downvote() {
        let weights = KarmaWeights::default();
        let score = compute_score(&weights, &[tally(false, 0, 1)], &[]);
        assert_eq!(weights.baseline - score, 55);
    }

    #[test_log::test]
    fn test_deleted_review_is_ignored() {
        let weights = KarmaWeights::default();
        let mut deleted = tally(true, 4, 0);
        deleted.deleted = true;
        assert_eq!(compute_score(&weights, &[deleted], &[]), 100);
    }

    #[test_log::test]
    fn test_endorsements_count_each_flag_per_staff() {
        let weights = KarmaWeights::default();
        let endorsements = vec![
            endorsement(1, &[Skill::Leadership, Skill::Respect]),
            endorsement(2, &[Skill::Leadership]),
            endorsement(3, &[]),
        ];
        assert_eq!(compute_score(&weights, &[], &endorsements), 130);
    }

    #[test_log::test]
    fn test_score_is_not_clamped() {
        let weights = KarmaWeights::default();
        let reviews = vec![tally(false, 0, 3); 4];
        // 100 - 4 * (50 + 15)
        assert_eq!(compute_score(&weights, &reviews, &[]), -160);
    }

    #[test_log::test]
    fn test_custom_weights() {
        let weights = KarmaWeights {
            baseline: 0,
            review_points: 10,
            vote_points: 1,
            endorsement_points: 2,
        };
        let score = compute_score(
            &weights,
            &[tally(true, 3, 1), tally(false, 0, 0)],
            &[endorsement(1, &Skill::ALL)],
        );
        // (10 + 2) + (-10) + 5 * 2
        assert_eq!(score, 12);
    }
}
