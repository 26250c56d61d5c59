//! Per-skill endorsement tallies.

use crate::{EndorsementRecord, Skill, SkillCounts};
use itertools::Itertools;
use std::collections::HashMap;

/// Count, for each skill, how many staff members endorse the student.
/// Expects one row per endorsing staff member.
#[must_use]
pub fn count_skills(endorsements: &[EndorsementRecord]) -> SkillCounts {
    let mut counts = SkillCounts::default();
    for endorsement in endorsements {
        for skill in Skill::ALL {
            if endorsement.get(skill) {
                counts.increment(skill);
            }
        }
    }
    counts
}

/// Group a school's endorsement rows by student and count each group.
#[must_use]
pub fn count_skills_by_student(endorsements: &[EndorsementRecord]) -> HashMap<u32, SkillCounts> {
    endorsements
        .iter()
        .cloned()
        .into_group_map_by(|e| e.student_id)
        .into_iter()
        .map(|(student_id, rows)| (student_id, count_skills(&rows)))
        .collect()
}

/// The highest count seen for each skill across a school's students.
pub fn school_maximums<'a, I>(counts: I) -> SkillCounts
where
    I: IntoIterator<Item = &'a SkillCounts>,
{
    counts
        .into_iter()
        .fold(SkillCounts::default(), |mut max, c| {
            max.raise_to(c);
            max
        })
}

/// Skills where the student holds at least half of the school's best count.
/// A skill nobody in the school has been endorsed for never qualifies.
#[must_use]
pub fn top_qualities(student: &SkillCounts, school_max: &SkillCounts) -> Vec<Skill> {
    Skill::ALL
        .into_iter()
        .filter(|skill| {
            let max = school_max.get(*skill);
            max > 0 && student.get(*skill) * 2 >= max
        })
        .collect()
}
