//! ---
//! spx_section: "05-networking-external-interfaces"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Request handlers for the public API."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use spectra_access::{AccessSnapshot, ClaimSet};
use spectra_common::{decode_json, ValidationError};
use spectra_leads::{LeadSubmission, CONFIRMATION_MESSAGE};
use spectra_metrics::RejectionKind;
use spectra_roi::{RoiRequest, RoiResult};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, HttpError};
use crate::ApiState;

type Body = Result<Json<Value>, JsonRejection>;

#[derive(Debug, Serialize)]
pub(crate) struct Envelope<T> {
    status: &'static str,
    data: T,
}

impl<T> Envelope<T> {
    fn success(data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    uptime: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LeadAck {
    lead_id: Uuid,
    message: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct AccessQuery {
    #[serde(rename = "activeSection", default)]
    active_section: Option<String>,
}

fn decode_body<T: DeserializeOwned>(payload: Body) -> Result<T, ApiError> {
    let Json(value) = payload?;
    Ok(decode_json(value)?)
}

pub(crate) async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime: state.uptime_seconds(),
    })
}

pub(crate) async fn post_roi(
    State(state): State<Arc<ApiState>>,
    payload: Body,
) -> Result<Json<Envelope<RoiResult>>, ApiError> {
    let request: RoiRequest = decode_body(payload)?;
    let input = request.into_input()?;
    let result = state.roi.compute(&input)?;
    state.metrics.record_roi();
    Ok(Envelope::success(result))
}

pub(crate) async fn post_contact(
    State(state): State<Arc<ApiState>>,
    payload: Body,
) -> Result<(StatusCode, Json<Envelope<LeadAck>>), ApiError> {
    let submission: LeadSubmission = decode_body(payload)?;
    let lead = state.leads.submit(submission)?;
    state.metrics.record_lead();
    info!(lead_id = %lead.lead_id, "lead submission accepted");
    Ok((
        StatusCode::CREATED,
        Envelope::success(LeadAck {
            lead_id: lead.lead_id,
            message: CONFIRMATION_MESSAGE,
        }),
    ))
}

/// The body is the raw custom-claims object, optionally carrying the
/// currently displayed section under `activeSection`.
pub(crate) async fn post_access(
    State(state): State<Arc<ApiState>>,
    payload: Body,
) -> Result<Json<Envelope<AccessSnapshot>>, ApiError> {
    let Json(body) = payload?;
    if !body.is_object() {
        return Err(ValidationError::single("", "Expected object").into());
    }
    let query: AccessQuery = decode_json(body.clone())?;
    let claims = ClaimSet::from_claims(&body);
    let snapshot = state
        .access
        .snapshot(&claims, query.active_section.as_deref());
    state.metrics.record_access_evaluation();
    Ok(Envelope::success(snapshot))
}

pub(crate) async fn not_found() -> ApiError {
    HttpError::not_found().into()
}

/// Abort handlers that outlive the configured request timeout.
pub(crate) async fn enforce_timeout(
    State(state): State<Arc<ApiState>>,
    request: Request,
    next: Next,
) -> Response {
    match tokio::time::timeout(state.api.request_timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(timeout = ?state.api.request_timeout, "request timed out");
            ApiError::from(HttpError::timeout()).into_response()
        }
    }
}

/// Count error responses by the kind recorded on them.
pub(crate) async fn track_rejections(
    State(state): State<Arc<ApiState>>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if let Some(kind) = response.extensions().get::<RejectionKind>() {
        state.metrics.record_rejection(*kind);
    }
    response
}
