use crate::model::{
    Assignment, AssignmentGroup, AssignmentId, Course, CourseId, LearnerId, LearnerReport,
    Submission, SubmissionRecord,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// Share of `points_possible` deducted from a late submission.
pub const LATE_PENALTY_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error(
        "Invalid input: assignment group does not belong to this course \
         (course {course_id}, group course {group_course_id})"
    )]
    CourseMismatch {
        course_id: CourseId,
        group_course_id: CourseId,
    },
}

impl CalcError {
    pub fn code(&self) -> &'static str {
        match self {
            CalcError::CourseMismatch { .. } => "course_mismatch",
        }
    }

    pub fn details(&self) -> serde_json::Value {
        match self {
            CalcError::CourseMismatch {
                course_id,
                group_course_id,
            } => serde_json::json!({
                "courseId": course_id,
                "groupCourseId": group_course_id,
            }),
        }
    }
}

/// Evaluation inputs that are not part of the grading data itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalcContext {
    pub as_of: NaiveDate,
}

impl CalcContext {
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of }
    }

    /// Evaluates against the local calendar date. Not reproducible; tests and
    /// batch jobs should pin a date with [`CalcContext::new`].
    pub fn today() -> Self {
        Self {
            as_of: chrono::Local::now().date_naive(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnknownAssignment,
    NotYetDue,
    NonPositivePoints,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedSubmission {
    pub learner_id: LearnerId,
    pub assignment_id: AssignmentId,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedSubmission {
    pub learner_id: LearnerId,
    pub assignment_id: AssignmentId,
    pub raw_score: f64,
    pub final_score: f64,
    pub points_possible: f64,
    pub percentage: f64,
    pub late: bool,
    pub days_late: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRun {
    pub reports: Vec<LearnerReport>,
    pub graded: Vec<GradedSubmission>,
    pub skipped: Vec<SkippedSubmission>,
}

pub fn validate_course_link(course: &Course, group: &AssignmentGroup) -> Result<(), CalcError> {
    if group.course_id != course.id {
        return Err(CalcError::CourseMismatch {
            course_id: course.id,
            group_course_id: group.course_id,
        });
    }
    Ok(())
}

/// Due on or before `as_of`; a due date equal to `as_of` counts.
pub fn is_assignment_due(assignment: &Assignment, as_of: NaiveDate) -> bool {
    assignment.due_at <= as_of
}

/// Strictly after the due date; submitting on the due date is on time.
pub fn is_submission_late(record: &SubmissionRecord, assignment: &Assignment) -> bool {
    record.submitted_at > assignment.due_at
}

pub fn days_late(submitted_at: NaiveDate, due_at: NaiveDate) -> i64 {
    (submitted_at - due_at).num_days().max(0)
}

/// Late work loses a flat share of the possible points, not of the score.
/// The result is not clamped and may go negative.
pub fn final_score(record: &SubmissionRecord, assignment: &Assignment) -> f64 {
    if is_submission_late(record, assignment) {
        record.score - assignment.points_possible * LATE_PENALTY_FRACTION
    } else {
        record.score
    }
}

pub fn weighted_average(total_score: f64, total_possible: f64) -> f64 {
    if total_possible > 0.0 {
        total_score / total_possible
    } else {
        0.0
    }
}

pub fn find_assignment(group: &AssignmentGroup, id: AssignmentId) -> Option<&Assignment> {
    group.assignments.iter().find(|a| a.id == id)
}

pub fn due_assignments(group: &AssignmentGroup, as_of: NaiveDate) -> Vec<&Assignment> {
    group
        .assignments
        .iter()
        .filter(|a| is_assignment_due(a, as_of))
        .collect()
}

/// Distinct learner ids in order of first appearance.
pub fn unique_learner_ids(submissions: &[Submission]) -> Vec<LearnerId> {
    let mut seen: HashSet<LearnerId> = HashSet::new();
    submissions
        .iter()
        .map(|s| s.learner_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

fn is_gradable_points(points_possible: f64) -> bool {
    points_possible > 0.0
}

pub fn compute_learner_reports(
    ctx: &CalcContext,
    course: &Course,
    group: &AssignmentGroup,
    submissions: &[Submission],
) -> Result<Vec<LearnerReport>, CalcError> {
    Ok(explain_learner_reports(ctx, course, group, submissions)?.reports)
}

pub fn explain_learner_reports(
    ctx: &CalcContext,
    course: &Course,
    group: &AssignmentGroup,
    submissions: &[Submission],
) -> Result<GradeRun, CalcError> {
    validate_course_link(course, group)?;

    let mut reports: Vec<LearnerReport> = Vec::new();
    let mut graded: Vec<GradedSubmission> = Vec::new();
    let mut skipped: Vec<SkippedSubmission> = Vec::new();

    for learner_id in unique_learner_ids(submissions) {
        let mut report = LearnerReport::new(learner_id);
        let mut total_score = 0.0_f64;
        let mut total_possible = 0.0_f64;

        for sub in submissions.iter().filter(|s| s.learner_id == learner_id) {
            let skip = |reason: SkipReason| SkippedSubmission {
                learner_id,
                assignment_id: sub.assignment_id,
                reason,
            };

            let Some(assignment) = find_assignment(group, sub.assignment_id) else {
                tracing::warn!(
                    learner_id,
                    assignment_id = sub.assignment_id,
                    "skipping submission for unknown assignment"
                );
                skipped.push(skip(SkipReason::UnknownAssignment));
                continue;
            };
            if !is_assignment_due(assignment, ctx.as_of) {
                tracing::debug!(
                    learner_id,
                    assignment_id = assignment.id,
                    due_at = %assignment.due_at,
                    "assignment not yet due"
                );
                skipped.push(skip(SkipReason::NotYetDue));
                continue;
            }
            if !is_gradable_points(assignment.points_possible) {
                tracing::warn!(
                    learner_id,
                    assignment_id = assignment.id,
                    points_possible = assignment.points_possible,
                    "skipping assignment with non-positive points_possible"
                );
                skipped.push(skip(SkipReason::NonPositivePoints));
                continue;
            }

            let score = final_score(&sub.submission, assignment);
            let percentage = score / assignment.points_possible;

            report.scores.insert(assignment.id, percentage);
            total_score += score;
            total_possible += assignment.points_possible;

            graded.push(GradedSubmission {
                learner_id,
                assignment_id: assignment.id,
                raw_score: sub.submission.score,
                final_score: score,
                points_possible: assignment.points_possible,
                percentage,
                late: is_submission_late(&sub.submission, assignment),
                days_late: days_late(sub.submission.submitted_at, assignment.due_at),
            });
        }

        report.avg = weighted_average(total_score, total_possible);
        tracing::debug!(
            learner_id,
            avg = report.avg,
            graded = report.scores.len(),
            "learner report built"
        );
        reports.push(report);
    }

    Ok(GradeRun {
        reports,
        graded,
        skipped,
    })
}
