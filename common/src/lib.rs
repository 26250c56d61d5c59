//! A library with common types, scoring and storage for the school karma service.

pub mod config;
pub mod endorsement_stats;
pub mod karma;
pub mod leaderboard;
pub mod letter;
pub mod roster;
pub mod validation;
pub mod votes;

#[cfg(feature = "database")]
pub mod db_util;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const REVIEW_MIN_CHARS: usize = 50;
pub const REVIEW_MAX_CHARS: usize = 1000;
pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 5;
/// Reviews rated at or above this are considered good.
pub const GOOD_RATING_THRESHOLD: u8 = 3;
pub const RECENT_ACTIVITY_LIMIT: u32 = 20;

/// The kind of account behind a request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Superuser,
    Admin,
    Staff,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Superuser => "SUPERUSER",
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SUPERUSER" => Ok(Role::Superuser),
            "ADMIN" => Ok(Role::Admin),
            "STAFF" => Ok(Role::Staff),
            other => Err(anyhow!("Unknown role: {other}")),
        }
    }
}

/// A single staff member's opinion of a review.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VoteValue::Up => "UP",
            VoteValue::Down => "DOWN",
        }
    }
}

impl FromStr for VoteValue {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "UP" => Ok(VoteValue::Up),
            "DOWN" => Ok(VoteValue::Down),
            other => Err(anyhow!("Unknown vote value: {other}")),
        }
    }
}

/// The five qualities a staff member can endorse a student for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Leadership,
    Respect,
    Punctuality,
    Participation,
    Teamwork,
}

impl Skill {
    pub const ALL: [Skill; 5] = [
        Skill::Leadership,
        Skill::Respect,
        Skill::Punctuality,
        Skill::Participation,
        Skill::Teamwork,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Skill::Leadership => "leadership",
            Skill::Respect => "respect",
            Skill::Punctuality => "punctuality",
            Skill::Participation => "participation",
            Skill::Teamwork => "teamwork",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Skill {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Skill::ALL
            .into_iter()
            .find(|skill| skill.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("Unknown skill: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRecord {
    pub school_id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: u32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl UserRecord {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A school administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub admin_id: u32,
    pub user_id: u32,
    pub school_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRecord {
    pub staff_id: u32,
    pub user_id: u32,
    pub school_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student_id: u32,
    pub name: String,
    pub school_id: u32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review_id: u32,
    pub staff_id: u32,
    pub student_id: u32,
    pub text: String,
    pub rating: u8,
    pub is_good: bool,
    pub created: DateTime<Utc>,
    pub edited: bool,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub vote_id: u32,
    pub staff_id: u32,
    pub review_id: u32,
    pub value: VoteValue,
    pub time: DateTime<Utc>,
}

/// Upvotes and downvotes received by one review.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCount {
    pub upvotes: u32,
    pub downvotes: u32,
}

impl VoteCount {
    pub fn add(&mut self, value: VoteValue) {
        match value {
            VoteValue::Up => self.upvotes += 1,
            VoteValue::Down => self.downvotes += 1,
        }
    }

    #[must_use]
    pub fn net(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }
}

/// A review together with its vote aggregate, as the profile page shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewWithVotes {
    #[serde(flatten)]
    pub review: ReviewRecord,
    pub votes: VoteCount,
}

/// One staff member's endorsements of one student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorsementRecord {
    pub staff_id: u32,
    pub student_id: u32,
    pub leadership: bool,
    pub respect: bool,
    pub punctuality: bool,
    pub participation: bool,
    pub teamwork: bool,
}

impl EndorsementRecord {
    #[must_use]
    pub fn new(staff_id: u32, student_id: u32) -> Self {
        Self {
            staff_id,
            student_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn get(&self, skill: Skill) -> bool {
        match skill {
            Skill::Leadership => self.leadership,
            Skill::Respect => self.respect,
            Skill::Punctuality => self.punctuality,
            Skill::Participation => self.participation,
            Skill::Teamwork => self.teamwork,
        }
    }

    pub fn set(&mut self, skill: Skill, value: bool) {
        let flag = match skill {
            Skill::Leadership => &mut self.leadership,
            Skill::Respect => &mut self.respect,
            Skill::Punctuality => &mut self.punctuality,
            Skill::Participation => &mut self.participation,
            Skill::Teamwork => &mut self.teamwork,
        };
        *flag = value;
    }

    /// Flip one skill flag and return its new value.
    pub fn toggle(&mut self, skill: Skill) -> bool {
        let value = !self.get(skill);
        self.set(skill, value);
        value
    }

    /// Number of skills this staff member currently endorses.
    #[must_use]
    pub fn endorsed_count(&self) -> u32 {
        let count = Skill::ALL.iter().filter(|skill| self.get(**skill)).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Per-skill endorsement tallies for one student, or per-skill maxima for a school.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCounts {
    pub leadership: u32,
    pub respect: u32,
    pub punctuality: u32,
    pub participation: u32,
    pub teamwork: u32,
}

impl SkillCounts {
    #[must_use]
    pub fn get(&self, skill: Skill) -> u32 {
        match skill {
            Skill::Leadership => self.leadership,
            Skill::Respect => self.respect,
            Skill::Punctuality => self.punctuality,
            Skill::Participation => self.participation,
            Skill::Teamwork => self.teamwork,
        }
    }

    fn get_mut(&mut self, skill: Skill) -> &mut u32 {
        match skill {
            Skill::Leadership => &mut self.leadership,
            Skill::Respect => &mut self.respect,
            Skill::Punctuality => &mut self.punctuality,
            Skill::Participation => &mut self.participation,
            Skill::Teamwork => &mut self.teamwork,
        }
    }

    pub fn increment(&mut self, skill: Skill) {
        *self.get_mut(skill) += 1;
    }

    /// Raise each skill to `other`'s value where `other` is higher.
    pub fn raise_to(&mut self, other: &SkillCounts) {
        for skill in Skill::ALL {
            let slot = self.get_mut(skill);
            *slot = (*slot).max(other.get(skill));
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KarmaRecord {
    pub student_id: u32,
    pub score: i64,
}

/// An entry in a user's recent activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub activity_id: u32,
    pub user_id: u32,
    pub message: String,
    pub parameter: String,
    pub created_at: DateTime<Utc>,
}

/// Everything shown on a student's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student: StudentRecord,
    pub karma: i64,
    pub skills: SkillCounts,
    pub top_qualities: Vec<Skill>,
    pub reviews: Vec<ReviewWithVotes>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_skill_from_str_is_case_insensitive() {
        assert_eq!("Leadership".parse::<Skill>().unwrap(), Skill::Leadership);
        assert_eq!("TEAMWORK".parse::<Skill>().unwrap(), Skill::Teamwork);
        assert!("charisma".parse::<Skill>().is_err());
    }

    #[test_log::test]
    fn test_endorsement_toggle_touches_one_flag() {
        let mut endorsement = EndorsementRecord::new(1, 2);
        assert!(endorsement.toggle(Skill::Respect));
        assert!(endorsement.respect);
        assert!(!endorsement.leadership);
        assert_eq!(endorsement.endorsed_count(), 1);
        assert!(!endorsement.toggle(Skill::Respect));
        assert_eq!(endorsement.endorsed_count(), 0);
    }

    #[test_log::test]
    fn test_skill_counts_raise_to() {
        let mut max = SkillCounts {
            leadership: 3,
            ..SkillCounts::default()
        };
        max.raise_to(&SkillCounts {
            leadership: 1,
            teamwork: 4,
            ..SkillCounts::default()
        });
        assert_eq!(max.leadership, 3);
        assert_eq!(max.teamwork, 4);
        assert_eq!(max.respect, 0);
    }

    #[test_log::test]
    fn test_vote_count_net() {
        let mut votes = VoteCount::default();
        votes.add(VoteValue::Up);
        votes.add(VoteValue::Up);
        votes.add(VoteValue::Down);
        assert_eq!(votes.net(), 1);
    }

    #[test_log::test]
    fn test_role_round_trip_through_str() {
        for role in [Role::Superuser, Role::Admin, Role::Staff] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }
}
