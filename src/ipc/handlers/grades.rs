use chrono::NaiveDate;
use gradecalc::calc;
use gradecalc::model::{AssignmentGroup, Course, Submission};
use serde::Deserialize;
use serde_json::json;

use crate::ipc::error::{calc_err, ok, params_err};
use crate::ipc::helpers::{context_for, parse_params};
use crate::ipc::types::Request;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradeParams {
    course: Course,
    assignment_group: AssignmentGroup,
    #[serde(default)]
    submissions: Vec<Submission>,
    #[serde(default)]
    as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DueParams {
    assignment_group: AssignmentGroup,
    #[serde(default)]
    as_of: Option<NaiveDate>,
}

fn handle_grades_compute(req: &Request) -> serde_json::Value {
    let p: GradeParams = match parse_params(req) {
        Ok(v) => v,
        Err(e) => return params_err(&req.id, &e),
    };
    let ctx = context_for(p.as_of);
    match calc::compute_learner_reports(&ctx, &p.course, &p.assignment_group, &p.submissions) {
        Ok(reports) => ok(
            &req.id,
            json!({
                "asOf": ctx.as_of,
                "reports": reports,
            }),
        ),
        Err(e) => {
            tracing::warn!(code = e.code(), "grades.compute rejected: {e}");
            calc_err(&req.id, &e)
        }
    }
}

fn handle_grades_explain(req: &Request) -> serde_json::Value {
    let p: GradeParams = match parse_params(req) {
        Ok(v) => v,
        Err(e) => return params_err(&req.id, &e),
    };
    let ctx = context_for(p.as_of);
    match calc::explain_learner_reports(&ctx, &p.course, &p.assignment_group, &p.submissions) {
        Ok(run) => ok(
            &req.id,
            json!({
                "asOf": ctx.as_of,
                "reports": run.reports,
                "graded": run.graded,
                "skipped": run.skipped,
            }),
        ),
        Err(e) => {
            tracing::warn!(code = e.code(), "grades.explain rejected: {e}");
            calc_err(&req.id, &e)
        }
    }
}

fn handle_assignments_due(req: &Request) -> serde_json::Value {
    let p: DueParams = match parse_params(req) {
        Ok(v) => v,
        Err(e) => return params_err(&req.id, &e),
    };
    let ctx = context_for(p.as_of);
    let due = calc::due_assignments(&p.assignment_group, ctx.as_of);
    ok(
        &req.id,
        json!({
            "asOf": ctx.as_of,
            "assignments": due,
        }),
    )
}

pub fn try_handle(req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.compute" => Some(handle_grades_compute(req)),
        "grades.explain" => Some(handle_grades_explain(req)),
        "assignments.due" => Some(handle_assignments_due(req)),
        _ => None,
    }
}
