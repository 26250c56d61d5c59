//! What happens when a staff member votes on a review.

use crate::{VoteCount, VoteRecord, VoteValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteAction {
    /// No vote existed; record the new one.
    Insert(VoteValue),
    /// The same value was cast again; remove the vote.
    Clear,
    /// The opposite value was cast; overwrite the vote.
    Replace(VoteValue),
}

/// Decide how a cast vote changes the staff member's existing vote, if any.
#[must_use]
pub fn resolve(existing: Option<VoteValue>, cast: VoteValue) -> VoteAction {
    match existing {
        None => VoteAction::Insert(cast),
        Some(current) if current == cast => VoteAction::Clear,
        Some(_) => VoteAction::Replace(cast),
    }
}

/// The vote a staff member holds after `action` is applied.
#[must_use]
pub fn apply(action: VoteAction) -> Option<VoteValue> {
    match action {
        VoteAction::Insert(value) | VoteAction::Replace(value) => Some(value),
        VoteAction::Clear => None,
    }
}

/// Tally a review's votes.
#[must_use]
pub fn count(votes: &[VoteRecord]) -> VoteCount {
    votes.iter().fold(VoteCount::default(), |mut acc, v| {
        acc.add(v.value);
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cast_all(casts: &[VoteValue]) -> Option<VoteValue> {
        casts
            .iter()
            .fold(None, |current, cast| apply(resolve(current, *cast)))
    }

    #[test_log::test]
    fn test_first_vote_inserts() {
        assert_eq!(resolve(None, VoteValue::Up), VoteAction::Insert(VoteValue::Up));
    }

    #[test_log::test]
    fn test_same_vote_twice_clears() {
        assert_eq!(
            resolve(Some(VoteValue::Up), VoteValue::Up),
            VoteAction::Clear
        );
        assert_eq!(cast_all(&[VoteValue::Up, VoteValue::Up]), None);
    }

    #[test_log::test]
    fn test_opposite_vote_replaces() {
        assert_eq!(
            resolve(Some(VoteValue::Up), VoteValue::Down),
            VoteAction::Replace(VoteValue::Down)
        );
        assert_eq!(
            cast_all(&[VoteValue::Up, VoteValue::Down]),
            Some(VoteValue::Down)
        );
    }

    #[test_log::test]
    fn test_count() {
        let vote = |vote_id, value| VoteRecord {
            vote_id,
            staff_id: vote_id,
            review_id: 1,
            value,
            time: Utc::now(),
        };
        let counted = count(&[
            vote(1, VoteValue::Up),
            vote(2, VoteValue::Down),
            vote(3, VoteValue::Up),
        ]);
        assert_eq!(
            counted,
            VoteCount {
                upvotes: 2,
                downvotes: 1
            }
        );
    }
}
