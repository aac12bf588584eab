//! Shared helpers for integration tests: paper fixtures and mock mirrors.

#![allow(dead_code)]

use std::time::Duration;

use exampapers_core::catalog::{Candidate, PaperRecord, PaperType};
use exampapers_core::fetch::{FetchConfig, FetchEngine};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Minimal body that passes PDF validation by magic bytes.
pub const PDF_BODY: &[u8] = b"%PDF-1.4\n% test paper\n%%EOF\n";

/// Builds a record with the given `(mirror, url)` candidates.
pub fn paper(id: u32, candidates: &[(&str, String)]) -> PaperRecord {
    PaperRecord {
        id,
        year: "2024".to_string(),
        subject: "Mathematics".to_string(),
        subject_code: "041".to_string(),
        paper_type: PaperType::QuestionPaper,
        series: "1".to_string(),
        set: "Set 1".to_string(),
        paper_code: format!("65/1/{id}"),
        region: "Delhi".to_string(),
        filename: format!("paper_{id}.pdf"),
        display_name: format!("Mathematics 2024 Paper {id}"),
        candidates: candidates
            .iter()
            .map(|(mirror, url)| Candidate::new(*mirror, url.clone()))
            .collect(),
    }
}

/// Mounts a GET route answering 200 with `body`.
pub async fn mount_pdf(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Mounts a GET route answering `status` with an empty body.
pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Engine with short timeouts suited to local mock servers.
pub fn test_engine() -> FetchEngine {
    engine_with(FetchConfig {
        fetch_timeout: Duration::from_secs(5),
        probe_timeout: Duration::from_secs(2),
        ..FetchConfig::default()
    })
}

pub fn engine_with(config: FetchConfig) -> FetchEngine {
    FetchEngine::new(config).expect("valid engine config")
}
