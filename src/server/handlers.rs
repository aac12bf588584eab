//! Route handlers. Each one validates input, then hands off to the catalog
//! or the fetch engine.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::AppState;
use super::error::ApiError;
use crate::archive::{Archive, PLACEHOLDER_PDF, build_zip};
use crate::catalog::{FilterOptions, PaperFilter, PaperRecord, PaperType};
use crate::fetch::{FetchOutcome, MirrorStatus};

/// Response header telling clients whether real content or the placeholder was served.
pub const DOWNLOAD_STATUS_HEADER: &str = "x-download-status";

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 500;

const FALLBACK_INDEX: &str = "<!doctype html>
<html><head><meta charset=\"utf-8\"><title>Exam Papers</title></head>
<body><h1>Exam Papers</h1>
<p>Browse the catalog at <a href=\"/api/papers\">/api/papers</a>.</p>
</body></html>";

/// Query string for `GET /api/papers`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    year: Option<String>,
    subject: Option<String>,
    #[serde(rename = "type")]
    paper_type: Option<String>,
    region: Option<String>,
    search: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
}

/// One page of catalog records.
#[derive(Debug, Serialize)]
pub struct PapersPage<'a> {
    papers: Vec<&'a PaperRecord>,
    total: usize,
    page: usize,
    per_page: usize,
    total_pages: usize,
    filters: FilterOptions,
}

/// Body of `GET /api/stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    total_papers: usize,
    by_subject: BTreeMap<String, usize>,
    by_year: BTreeMap<String, usize>,
    by_type: BTreeMap<&'static str, usize>,
    subjects: Vec<String>,
    years: Vec<String>,
    types: Vec<&'static str>,
}

/// Body of `POST /api/download-zip`.
#[derive(Debug, Deserialize)]
pub struct ZipRequest {
    #[serde(default)]
    paper_ids: Vec<u32>,
}

/// Body of `POST /api/download-filtered`.
#[derive(Debug, Default, Deserialize)]
pub struct FilteredRequest {
    year: Option<String>,
    subject: Option<String>,
    #[serde(rename = "type")]
    paper_type: Option<String>,
    region: Option<String>,
}

/// Body of `GET /api/check/{id}`.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    id: u32,
    display_name: String,
    available: bool,
    mirrors: Vec<MirrorStatus>,
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Html<String> {
    if let Some(dir) = &state.settings.static_dir {
        let path = dir.join("index.html");
        match tokio::fs::read_to_string(&path).await {
            Ok(html) => return Html(html),
            Err(e) => debug!(path = %path.display(), error = %e, "index.html unavailable"),
        }
    }
    Html(FALLBACK_INDEX.to_string())
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "papers": state.catalog.len(),
        "cached_sources": state.engine.cache().len(),
    }))
}

/// `GET /api/papers`
pub async fn list_papers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let filter = PaperFilter {
        year: query.year,
        subject: query.subject,
        paper_type: query.paper_type,
        region: query.region,
        search: query.search,
    };
    let matches = state.catalog.filter(&filter);
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let total = matches.len();
    let papers = matches
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    Json(PapersPage {
        papers,
        total,
        page,
        per_page,
        total_pages: total.div_ceil(per_page),
        filters: state.catalog.filter_options(),
    })
    .into_response()
}

/// `GET /api/filters`
pub async fn filters(State(state): State<AppState>) -> Json<FilterOptions> {
    Json(state.catalog.filter_options())
}

/// `GET /api/stats`
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.catalog.stats();
    let options = state.catalog.filter_options();
    Json(StatsResponse {
        total_papers: stats.total,
        by_subject: stats.by_subject,
        by_year: stats.by_year,
        by_type: stats.by_type,
        subjects: options.subjects,
        years: options.years,
        types: PaperType::ALL.iter().map(|t| t.as_str()).collect(),
    })
}

/// `GET /api/download/{id}`
///
/// Always answers 200 with a PDF for a known id; the placeholder is marked
/// by `X-Download-Status: placeholder`.
pub async fn download_paper(
    State(state): State<AppState>,
    Path(paper_id): Path<u32>,
) -> Result<Response, ApiError> {
    let record = state
        .catalog
        .lookup(paper_id)
        .ok_or_else(|| ApiError::not_found("Paper not found"))?;

    let (body, status) = match state.engine.fetch_paper(record).await {
        FetchOutcome::Fetched { bytes, .. } => (bytes, "success"),
        FetchOutcome::Unavailable => (bytes::Bytes::from_static(PLACEHOLDER_PDF), "placeholder"),
    };
    info!(paper_id, status, "serving paper");

    let mut headers = attachment_headers("application/pdf", &record.filename);
    headers.insert(
        HeaderName::from_static(DOWNLOAD_STATUS_HEADER),
        HeaderValue::from_static(status),
    );
    if status == "success" {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    }
    Ok((headers, body).into_response())
}

/// `POST /api/download-zip`
pub async fn download_zip(
    State(state): State<AppState>,
    Json(request): Json<ZipRequest>,
) -> Result<Response, ApiError> {
    if request.paper_ids.is_empty() {
        return Err(ApiError::bad_request("No papers selected"));
    }
    check_batch_size(request.paper_ids.len(), state.settings.max_batch_papers)?;

    let records: Vec<PaperRecord> = request
        .paper_ids
        .iter()
        .filter_map(|&id| state.catalog.lookup(id))
        .cloned()
        .collect();
    if records.is_empty() {
        return Err(ApiError::not_found("No valid papers found"));
    }

    let archive = fetch_archive(&state, &records).await?;
    Ok(zip_response(&archive, "CBSE_Papers.zip"))
}

/// `POST /api/download-filtered`
pub async fn download_filtered(
    State(state): State<AppState>,
    Json(request): Json<FilteredRequest>,
) -> Result<Response, ApiError> {
    let filter = PaperFilter {
        year: request.year,
        subject: request.subject,
        paper_type: request.paper_type,
        region: request.region,
        search: None,
    };
    let records: Vec<PaperRecord> = state.catalog.filter(&filter).into_iter().cloned().collect();
    if records.is_empty() {
        return Err(ApiError::not_found("No papers match the filters"));
    }
    if records.len() > state.settings.max_batch_papers {
        return Err(ApiError::bad_request(format!(
            "Too many papers ({}). Please narrow your filters. Max {}.",
            records.len(),
            state.settings.max_batch_papers
        )));
    }

    let archive = fetch_archive(&state, &records).await?;
    Ok(zip_response(&archive, "CBSE_Papers_Filtered.zip"))
}

/// `GET /api/check/{id}`
pub async fn check_paper(
    State(state): State<AppState>,
    Path(paper_id): Path<u32>,
) -> Result<Json<CheckResponse>, ApiError> {
    let record = state
        .catalog
        .lookup(paper_id)
        .ok_or_else(|| ApiError::not_found("Not found"))?;

    let mirrors = state.engine.check_availability(record).await;
    Ok(Json(CheckResponse {
        id: record.id,
        display_name: record.display_name.clone(),
        available: mirrors.iter().any(|m| m.available),
        mirrors,
    }))
}

/// Rejects batches larger than the configured maximum.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] when `requested > max`.
pub fn check_batch_size(requested: usize, max: usize) -> Result<(), ApiError> {
    if requested > max {
        return Err(ApiError::bad_request(format!(
            "Maximum {max} papers per download"
        )));
    }
    Ok(())
}

async fn fetch_archive(state: &AppState, records: &[PaperRecord]) -> Result<Archive, ApiError> {
    let results = state
        .engine
        .fetch_batch(records, state.settings.batch_concurrency)
        .await;
    let archive = build_zip(records, &results)?;
    info!(
        fetched = archive.fetched,
        unavailable = archive.unavailable,
        bytes = archive.bytes.len(),
        "serving archive"
    );
    Ok(archive)
}

fn zip_response(archive: &Archive, filename: &str) -> Response {
    let mut headers = attachment_headers("application/zip", filename);
    headers.insert(
        HeaderName::from_static("x-papers-fetched"),
        HeaderValue::from(archive.fetched),
    );
    headers.insert(
        HeaderName::from_static("x-papers-unavailable"),
        HeaderValue::from(archive.unavailable),
    );
    (headers, archive.bytes.clone()).into_response()
}

fn attachment_headers(content_type: &'static str, filename: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    headers
}
