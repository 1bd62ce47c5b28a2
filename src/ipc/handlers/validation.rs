use chrono::NaiveDate;
use gradecalc::model::{AssignmentGroup, Course, Submission};
use gradecalc::validate;
use serde::Deserialize;
use serde_json::json;

use crate::ipc::error::{ok, params_err};
use crate::ipc::helpers::{context_for, parse_params};
use crate::ipc::types::Request;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateParams {
    course: Course,
    assignment_group: AssignmentGroup,
    #[serde(default)]
    submissions: Vec<Submission>,
    #[serde(default)]
    as_of: Option<NaiveDate>,
    #[serde(default)]
    course_start: Option<NaiveDate>,
}

fn handle_submissions_validate(req: &Request) -> serde_json::Value {
    let p: ValidateParams = match parse_params(req) {
        Ok(v) => v,
        Err(e) => return params_err(&req.id, &e),
    };
    let ctx = context_for(p.as_of);
    let issues = validate::validate_batch(
        &ctx,
        &p.course,
        &p.assignment_group,
        &p.submissions,
        p.course_start,
    );
    ok(&req.id, json!({ "issues": issues }))
}

pub fn try_handle(req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "submissions.validate" => Some(handle_submissions_validate(req)),
        _ => None,
    }
}
