//! Rank the students of a school by karma.

use serde::{Deserialize, Serialize};

/// A student eligible for the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub student_id: u32,
    pub name: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub student_id: u32,
    pub name: String,
    pub score: i64,
}

/// Order candidates by score (highest first) and assign competition ranks.
///
/// Equal scores share a rank and the next distinct score resumes at its 1-based
/// position, so `[100, 100, 90]` ranks as `[1, 1, 3]`. Names only break ties in
/// the output order and never change a rank.
#[must_use]
pub fn rank(mut candidates: Vec<Candidate>) -> Vec<LeaderboardEntry> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));

    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(candidates.len());
    for (position, candidate) in (1u32..).zip(candidates) {
        let rank = match entries.last() {
            Some(prev) if prev.score == candidate.score => prev.rank,
            _ => position,
        };
        entries.push(LeaderboardEntry {
            rank,
            student_id: candidate.student_id,
            name: candidate.name,
            score: candidate.score,
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(scores: &[(&str, i64)]) -> Vec<Candidate> {
        (1u32..)
            .zip(scores)
            .map(|(student_id, (name, score))| Candidate {
                student_id,
                name: (*name).to_string(),
                score: *score,
            })
            .collect()
    }

    fn ranks(entries: &[LeaderboardEntry]) -> Vec<u32> {
        entries.iter().map(|e| e.rank).collect()
    }

    #[test_log::test]
    fn test_competition_ranking() {
        let entries = rank(candidates(&[
            ("a", 100),
            ("b", 100),
            ("c", 90),
            ("d", 80),
            ("e", 80),
        ]));
        assert_eq!(ranks(&entries), vec![1, 1, 3, 4, 4]);
    }

    #[test_log::test]
    fn test_ranking_ignores_input_order() {
        let entries = rank(candidates(&[
            ("e", 80),
            ("c", 90),
            ("a", 100),
            ("d", 80),
            ("b", 100),
        ]));
        assert_eq!(ranks(&entries), vec![1, 1, 3, 4, 4]);
        let scores: Vec<i64> = entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![100, 100, 90, 80, 80]);
    }

    #[test_log::test]
    fn test_ranking_is_deterministic() {
        let forward = rank(candidates(&[("x", 5), ("y", 5), ("z", 5)]));
        let backward = rank(candidates(&[("z", 5), ("y", 5), ("x", 5)]));
        let names = |e: &[LeaderboardEntry]| e.iter().map(|e| e.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&forward), names(&backward));
        assert_eq!(ranks(&forward), vec![1, 1, 1]);
    }

    #[test_log::test]
    fn test_negative_scores_rank_last() {
        let entries = rank(candidates(&[("low", -20), ("high", 100)]));
        assert_eq!(entries[0].name, "high");
        assert_eq!(ranks(&entries), vec![1, 2]);
    }

    #[test_log::test]
    fn test_empty_school() {
        assert!(rank(Vec::new()).is_empty());
    }
}
