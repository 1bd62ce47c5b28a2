//! Input checks that report problems without rejecting anything.
//!
//! The calculator only refuses a course/group mismatch and skips
//! unresolvable or ungradable submissions. Range problems such as negative
//! scores are surfaced here for callers that want to show them, and never
//! change calculator output.

use crate::calc::{self, CalcContext};
use crate::model::{
    Assignment, AssignmentGroup, AssignmentId, Course, LearnerId, Submission, SubmissionRecord,
};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learner_id: Option<LearnerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<AssignmentId>,
}

impl ValidationIssue {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            learner_id: None,
            assignment_id: None,
        }
    }

    fn for_submission(mut self, learner_id: LearnerId, assignment_id: AssignmentId) -> Self {
        self.learner_id = Some(learner_id);
        self.assignment_id = Some(assignment_id);
        self
    }
}

pub fn validate_course_link(course: &Course, group: &AssignmentGroup) -> Vec<ValidationIssue> {
    match calc::validate_course_link(course, group) {
        Ok(()) => Vec::new(),
        Err(e) => vec![ValidationIssue::new(e.code(), e.to_string())],
    }
}

pub fn validate_assignment(assignment: &Assignment) -> Vec<ValidationIssue> {
    if assignment.points_possible > 0.0 {
        return Vec::new();
    }
    let mut issue = ValidationIssue::new(
        "non_positive_points",
        format!(
            "points_possible must be greater than zero (got {})",
            assignment.points_possible
        ),
    );
    issue.assignment_id = Some(assignment.id);
    vec![issue]
}

pub fn validate_submission(record: &SubmissionRecord, assignment: &Assignment) -> Vec<ValidationIssue> {
    let mut out = validate_assignment(assignment);
    if record.score < 0.0 {
        out.push(ValidationIssue::new(
            "negative_score",
            format!("score cannot be negative (got {})", record.score),
        ));
    }
    if assignment.points_possible > 0.0 && record.score > assignment.points_possible {
        out.push(ValidationIssue::new(
            "score_exceeds_points",
            format!(
                "score {} exceeds maximum points {}",
                record.score, assignment.points_possible
            ),
        ));
    }
    out
}

pub fn validate_submission_date(
    submitted_at: NaiveDate,
    as_of: NaiveDate,
    course_start: Option<NaiveDate>,
) -> Vec<ValidationIssue> {
    let mut out = Vec::new();
    if submitted_at > as_of {
        out.push(ValidationIssue::new(
            "submitted_in_future",
            format!("submission date {submitted_at} is after {as_of}"),
        ));
    }
    if let Some(start) = course_start {
        if submitted_at < start {
            out.push(ValidationIssue::new(
                "submitted_before_course_start",
                format!("submission date {submitted_at} is before course start {start}"),
            ));
        }
    }
    out
}

pub fn validate_batch(
    ctx: &CalcContext,
    course: &Course,
    group: &AssignmentGroup,
    submissions: &[Submission],
    course_start: Option<NaiveDate>,
) -> Vec<ValidationIssue> {
    let mut issues = validate_course_link(course, group);

    for sub in submissions {
        let Some(assignment) = calc::find_assignment(group, sub.assignment_id) else {
            issues.push(
                ValidationIssue::new(
                    "unknown_assignment",
                    format!("assignment {} is not in group {}", sub.assignment_id, group.id),
                )
                .for_submission(sub.learner_id, sub.assignment_id),
            );
            continue;
        };

        let found = validate_submission(&sub.submission, assignment)
            .into_iter()
            .chain(validate_submission_date(
                sub.submission.submitted_at,
                ctx.as_of,
                course_start,
            ))
            .map(|i| i.for_submission(sub.learner_id, sub.assignment_id));
        issues.extend(found);
    }

    issues
}
