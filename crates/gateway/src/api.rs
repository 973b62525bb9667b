//! REST API — the routes the voice frontend and dashboard consume.
//!
//! Endpoints:
//!
//! - `POST /api/report`      — File or update a caller report (idempotent per call)
//! - `GET  /api/reports`     — List all reports, newest first
//! - `POST /api/information` — Ask a question, get an answer (never fails)
//! - `POST /api/documents`   — Ingest a reference document (extracted text)
//! - `GET  /api/documents`   — List document metadata
//! - `GET  /api/status`      — Uptime and store counts

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use rescueline_core::document::{StoredDocument, normalize_content};
use rescueline_core::report::Report;
use rescueline_core::store::{DocumentStore, ReportStore};

use crate::SharedState;

/// How many documents the dashboard listing returns at most.
const DOCUMENT_LIST_LIMIT: usize = 100;

/// Build the API router. Nest this under "/api" in the main router.
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/report", post(submit_report_handler))
        .route("/reports", get(list_reports_handler))
        .route("/information", post(information_handler))
        .route("/documents", post(ingest_document_handler))
        .route("/documents", get(list_documents_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    message: String,
}

fn error_response(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
}

// ── Report intake ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SubmitReportRequest {
    location: String,
    people_count: u32,
    need_description: String,
    #[serde(default)]
    is_urgent: bool,
}

#[derive(Serialize, Deserialize)]
struct SubmitReportResponse {
    message: String,
    report_id: String,
}

/// Read the call identity the voice platform carries in headers.
///
/// A retried webhook re-sends the same call sid, which is what makes the
/// upsert idempotent. With no sid at all we generate one, so the report is
/// still filed (just never deduplicated).
fn call_identity(headers: &HeaderMap) -> (String, Option<String>) {
    let call_sid = headers
        .get("x-call-sid")
        .or_else(|| headers.get("call-sid"))
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| format!("unknown-{}", Uuid::new_v4()));

    let caller_number = headers
        .get("x-caller-number")
        .or_else(|| headers.get("caller-number"))
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    (call_sid, caller_number)
}

async fn submit_report_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<SubmitReportRequest>,
) -> Result<(StatusCode, Json<SubmitReportResponse>), (StatusCode, Json<ErrorResponse>)> {
    let (call_sid, caller_number) = call_identity(&headers);

    let mut report = Report::new(
        &call_sid,
        req.location,
        req.people_count,
        req.need_description,
    )
    .with_urgent_medical(req.is_urgent);
    report.caller_number = caller_number;

    let outcome = state.reports.upsert_report(report).await.map_err(|e| {
        warn!(error = %e, "Report upsert failed");
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error processing report",
        )
    })?;

    info!(call_sid = %call_sid, created = outcome.created, "Report received");

    let (status, message) = if outcome.created {
        (StatusCode::CREATED, "Report received successfully")
    } else {
        (StatusCode::OK, "Report updated successfully")
    };

    Ok((
        status,
        Json(SubmitReportResponse {
            message: message.into(),
            report_id: outcome.id,
        }),
    ))
}

// ── Report listing ────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct ReportListResponse {
    reports: Vec<Report>,
    count: usize,
}

async fn list_reports_handler(
    State(state): State<SharedState>,
) -> Result<Json<ReportListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let reports = state.reports.list_reports().await.map_err(|e| {
        warn!(error = %e, "Report listing failed");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error fetching reports")
    })?;

    let count = reports.len();
    Ok(Json(ReportListResponse { reports, count }))
}

// ── Information queries ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct InformationRequest {
    #[serde(default)]
    query: Option<String>,
    /// Some webhook payloads nest the query one level down.
    #[serde(default)]
    data: Option<InformationData>,
}

#[derive(Deserialize)]
struct InformationData {
    #[serde(default)]
    query: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct InformationResponse {
    answer: String,
}

async fn information_handler(
    State(state): State<SharedState>,
    Json(req): Json<InformationRequest>,
) -> Result<Json<InformationResponse>, (StatusCode, Json<ErrorResponse>)> {
    let query = req
        .query
        .or_else(|| req.data.and_then(|d| d.query))
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                "Missing or misformatted query field",
            )
        })?;

    info!(query_len = query.len(), "Information request received");

    // The pipeline never fails: degraded paths come back as safe text.
    let result = state.pipeline.answer(&query).await;
    if result.is_fallback {
        warn!("Information request answered via fallback path");
    }

    Ok(Json(InformationResponse {
        answer: result.answer_text,
    }))
}

// ── Document ingest ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct IngestDocumentRequest {
    original_name: String,
    #[serde(default = "default_mime_type")]
    mime_type: String,
    /// Already-extracted plain text (upload parsing happens upstream)
    content: String,
}

fn default_mime_type() -> String {
    "text/plain".into()
}

#[derive(Serialize, Deserialize)]
struct IngestDocumentResponse {
    id: String,
    original_name: String,
}

async fn ingest_document_handler(
    State(state): State<SharedState>,
    Json(req): Json<IngestDocumentRequest>,
) -> Result<(StatusCode, Json<IngestDocumentResponse>), (StatusCode, Json<ErrorResponse>)> {
    let content = normalize_content(&req.content);
    if content.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Document has no text content",
        ));
    }

    let doc = StoredDocument::new(&req.original_name, &req.mime_type, content);
    let id = state.documents.insert(doc).await.map_err(|e| {
        warn!(error = %e, "Document insert failed");
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error processing document",
        )
    })?;

    info!(id = %id, name = %req.original_name, "Document ingested");

    Ok((
        StatusCode::CREATED,
        Json(IngestDocumentResponse {
            id,
            original_name: req.original_name,
        }),
    ))
}

// ── Document listing ──────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct DocumentSummaryDto {
    id: String,
    original_name: String,
    mime_type: String,
    uploaded_at: String,
}

#[derive(Serialize, Deserialize)]
struct DocumentListResponse {
    documents: Vec<DocumentSummaryDto>,
    count: usize,
}

async fn list_documents_handler(
    State(state): State<SharedState>,
) -> Result<Json<DocumentListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let documents = state
        .documents
        .fetch_documents(DOCUMENT_LIST_LIMIT)
        .await
        .map_err(|e| {
            warn!(error = %e, "Document listing failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching document list",
            )
        })?;

    let documents: Vec<DocumentSummaryDto> = documents
        .into_iter()
        .map(|d| DocumentSummaryDto {
            id: d.id,
            original_name: d.original_name,
            mime_type: d.mime_type,
            uploaded_at: d.uploaded_at.to_rfc3339(),
        })
        .collect();

    let count = documents.len();
    Ok(Json(DocumentListResponse { documents, count }))
}

// ── Status ────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct StatusResponse {
    status: String,
    version: String,
    uptime_secs: i64,
    documents: usize,
    reports: usize,
}

async fn status_handler(State(state): State<SharedState>) -> Json<StatusResponse> {
    let documents = state.documents.count().await.unwrap_or(0);
    let reports = state
        .reports
        .list_reports()
        .await
        .map(|r| r.len())
        .unwrap_or(0);

    Json(StatusResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: (chrono::Utc::now() - state.start_time).num_seconds(),
        documents,
        reports,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────
