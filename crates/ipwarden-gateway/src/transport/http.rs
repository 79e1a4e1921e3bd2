//! Rule management and WAF polling endpoints.
//!
//! Handlers are thin: decode, call the engine, record metrics, encode.
//! Response shapes:
//! - `POST /ips`                 -> 201 `{"status":"added","data":Rule}`
//! - `GET /ips/:context`         -> `{"context":..,"rules":[Rule..]}`
//! - `DELETE /ips/:context/:ip`  -> `{"status":"removed","ip":..,"context":..}`
//! - `GET /waf/config/:context`  -> `{"meta":{..},"policy":{"allow_list","block_list"}}`

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use ipwarden_core::error::{ClientCode, ValidationError, WardenError};
use ipwarden_core::RuleCandidate;

use crate::app_state::AppState;

/// Engine error rendered as `{"code": .., "detail": ..}`.
#[derive(Debug)]
pub struct ApiError(pub WardenError);

impl From<WardenError> for ApiError {
    fn from(e: WardenError) -> Self {
        Self(e)
    }
}

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
        ClientCode::SafetyViolation => StatusCode::BAD_REQUEST,
        ClientCode::NotFound => StatusCode::NOT_FOUND,
        // config errors only occur at start-up
        ClientCode::BadConfig | ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let body = json!({
            "code": code.as_str(),
            "detail": self.0.to_string(),
        });
        (status_for(code), Json(body)).into_response()
    }
}

/// Body decode failures (bad JSON, unknown action, missing or mistyped
/// fields) are validation errors like any other rejected candidate.
fn malformed(rejection: JsonRejection) -> WardenError {
    ValidationError::Malformed(rejection.body_text()).into()
}

pub async fn add_rule(
    State(app): State<AppState>,
    body: Result<Json<RuleCandidate>, JsonRejection>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let result = body
        .map_err(malformed)
        .and_then(|Json(candidate)| app.engine().add_rule(&candidate));
    let m = app.metrics();
    m.request_duration.observe(&[("op", "add_rule")], started.elapsed());

    match result {
        Ok(rule) => {
            m.rule_writes.inc(&[("outcome", "stored")]);
            let body = json!({ "status": "added", "data": rule });
            Ok((StatusCode::CREATED, Json(body)).into_response())
        }
        Err(e) => {
            m.rule_writes.inc(&[("outcome", e.client_code().as_str())]);
            Err(e.into())
        }
    }
}

pub async fn list_rules(
    State(app): State<AppState>,
    Path(context): Path<String>,
) -> Response {
    let started = Instant::now();
    let rules = app.engine().active_rules(&context);
    app.metrics()
        .request_duration
        .observe(&[("op", "list_rules")], started.elapsed());

    Json(json!({ "context": context, "rules": rules })).into_response()
}

pub async fn remove_rule(
    State(app): State<AppState>,
    Path((context, ip)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let result = app.engine().remove_rule(&context, &ip);
    let m = app.metrics();
    m.request_duration.observe(&[("op", "remove_rule")], started.elapsed());

    match result {
        Ok(()) => {
            m.rule_removals.inc(&[("outcome", "removed")]);
            Ok(Json(json!({ "status": "removed", "ip": ip, "context": context })).into_response())
        }
        Err(e) => {
            m.rule_removals.inc(&[("outcome", e.client_code().as_str())]);
            Err(e.into())
        }
    }
}

/// Polled by the WAF (or its sync agent); expired rules are filtered and
/// evicted on the way.
pub async fn waf_config(
    State(app): State<AppState>,
    Path(context): Path<String>,
) -> Response {
    let started = Instant::now();
    let cfg = app.engine().get_configuration(&context);
    let m = app.metrics();
    m.request_duration.observe(&[("op", "waf_config")], started.elapsed());
    m.config_reads.inc(&[]);
    if cfg.purged > 0 {
        m.expired_purged.add(&[("path", "scan")], cfg.purged as u64);
    }

    Json(json!({
        "meta": {
            "context": cfg.context,
            "generated_at": cfg.generated_at,
            "rule_count": cfg.rule_count,
        },
        "policy": {
            "allow_list": cfg.allow_list,
            "block_list": cfg.block_list,
        }
    }))
    .into_response()
}
