//! Tunable scoring weights.

use clap::Args;
use serde::{Deserialize, Serialize};

/// Point weights used when recomputing a student's karma.
///
/// The defaults reproduce the long-standing scoring model: everyone starts at 100,
/// a review is worth 50 in its own direction, each net vote on a review is worth 5,
/// and each endorsed skill is worth 10.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Args)]
#[serde(default)]
pub struct KarmaWeights {
    /// Score of a student with no reviews or endorsements
    #[arg(long, default_value_t = 100, env = "KARMA_BASELINE")]
    pub baseline: i64,

    /// Points added for a good review, or removed for a bad one
    #[arg(long, default_value_t = 50, env = "KARMA_REVIEW_POINTS")]
    pub review_points: i64,

    /// Points per net upvote on any review of the student
    #[arg(long, default_value_t = 5, env = "KARMA_VOTE_POINTS")]
    pub vote_points: i64,

    /// Points per endorsed skill, counted per endorsing staff member
    #[arg(long, default_value_t = 10, env = "KARMA_ENDORSEMENT_POINTS")]
    pub endorsement_points: i64,
}

impl Default for KarmaWeights {
    fn default() -> Self {
        Self {
            baseline: 100,
            review_points: 50,
            vote_points: 5,
            endorsement_points: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        weights: KarmaWeights,
    }

    #[test_log::test]
    fn test_cli_defaults_match_default_impl() {
        let cli = TestCli::parse_from(["test"]);
        assert_eq!(cli.weights, KarmaWeights::default());
    }

    #[test_log::test]
    fn test_partial_deserialize_keeps_other_defaults() {
        let weights: KarmaWeights = serde_json::from_str(r#"{"vote_points": 7}"#).unwrap();
        assert_eq!(weights.vote_points, 7);
        assert_eq!(weights.baseline, 100);
        assert_eq!(weights.endorsement_points, 10);
    }
}
