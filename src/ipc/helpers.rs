use anyhow::Context;
use chrono::NaiveDate;
use gradecalc::calc::CalcContext;
use serde::de::DeserializeOwned;

use super::types::Request;

pub fn parse_params<T: DeserializeOwned>(req: &Request) -> anyhow::Result<T> {
    serde_json::from_value(req.params.clone())
        .with_context(|| format!("invalid params for {}", req.method))
}

/// A missing `asOf` evaluates against today's date.
pub fn context_for(as_of: Option<NaiveDate>) -> CalcContext {
    as_of.map(CalcContext::new).unwrap_or_else(CalcContext::today)
}
