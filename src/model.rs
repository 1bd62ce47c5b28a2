use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type CourseId = u64;
pub type AssignmentGroupId = u64;
pub type AssignmentId = u64;
pub type LearnerId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub name: String,
    pub due_at: NaiveDate,
    pub points_possible: f64,
}

/// A set of assignments attached to one course.
///
/// `group_weight` is carried through for callers that combine several groups;
/// the per-group calculation never reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentGroup {
    pub id: AssignmentGroupId,
    pub name: String,
    pub course_id: CourseId,
    #[serde(default)]
    pub group_weight: f64,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub submitted_at: NaiveDate,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub learner_id: LearnerId,
    pub assignment_id: AssignmentId,
    pub submission: SubmissionRecord,
}

/// Per-learner output. Serializes flat, with one key per graded assignment:
/// `{"id":125,"avg":0.985,"1":0.94,"2":1.0}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnerReport {
    pub id: LearnerId,
    pub avg: f64,
    #[serde(flatten)]
    pub scores: BTreeMap<AssignmentId, f64>,
}

impl LearnerReport {
    pub fn new(id: LearnerId) -> Self {
        Self {
            id,
            avg: 0.0,
            scores: BTreeMap::new(),
        }
    }

    pub fn score(&self, assignment_id: AssignmentId) -> Option<f64> {
        self.scores.get(&assignment_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn group_deserializes_from_sample_shape() {
        let raw = json!({
            "id": 12345,
            "name": "Fundamentals of JavaScript",
            "course_id": 451,
            "group_weight": 25,
            "assignments": [
                { "id": 1, "name": "Declare a Variable", "due_at": "2023-01-25", "points_possible": 50 }
            ]
        });
        let group: AssignmentGroup = serde_json::from_value(raw).expect("parse group");
        assert_eq!(group.course_id, 451);
        assert_eq!(group.group_weight, 25.0);
        assert_eq!(
            group.assignments[0].due_at,
            NaiveDate::from_ymd_opt(2023, 1, 25).expect("date")
        );
        assert_eq!(group.assignments[0].points_possible, 50.0);
    }

    #[test]
    fn report_serializes_flat_with_assignment_keys() {
        let mut report = LearnerReport::new(125);
        report.avg = 0.985;
        report.scores.insert(1, 0.94);
        report.scores.insert(2, 1.0);

        let v = serde_json::to_value(&report).expect("serialize report");
        assert_eq!(v, json!({ "id": 125, "avg": 0.985, "1": 0.94, "2": 1.0 }));
    }

    #[test]
    fn rejects_non_iso_due_date() {
        let raw = json!({ "id": 1, "name": "x", "due_at": "01/25/2023", "points_possible": 50 });
        assert!(serde_json::from_value::<Assignment>(raw).is_err());
    }
}
