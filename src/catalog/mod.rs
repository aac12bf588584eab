//! Paper catalog: lookup, filtering and summary statistics.
//!
//! The catalog is immutable once built. It is either generated from the
//! built-in mirror tables ([`Catalog::builtin`]) or loaded from a JSON file
//! ([`Catalog::load_json`]) whose records carry `urls: [[mirror, url], ...]`.

mod builtin;
mod error;
mod record;

pub use error::CatalogError;
pub use record::{Candidate, PaperRecord, PaperType};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use record::RawPaperRecord;

use crate::archive::UNAVAILABLE_PREFIX;

/// Filter criteria. Every supplied criterion narrows the result (AND).
///
/// `year`, `subject`, `paper_type` and `region` are exact matches; `search`
/// is a case-insensitive substring match. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaperFilter {
    /// Exact year.
    pub year: Option<String>,
    /// Exact subject name.
    pub subject: Option<String>,
    /// Exact type label (`question_paper`, ...).
    #[serde(rename = "type")]
    pub paper_type: Option<String>,
    /// Exact region label.
    pub region: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
}

impl PaperFilter {
    fn matches(&self, paper: &PaperRecord, search_lower: Option<&str>) -> bool {
        exact(self.year.as_deref(), &paper.year)
            && exact(self.subject.as_deref(), &paper.subject)
            && exact(self.paper_type.as_deref(), paper.paper_type.as_str())
            && exact(self.region.as_deref(), &paper.region)
            && search_lower.is_none_or(|needle| paper.matches_search(needle))
    }
}

fn exact(criterion: Option<&str>, value: &str) -> bool {
    criterion
        .filter(|c| !c.is_empty())
        .is_none_or(|c| c == value)
}

/// Distinct values available for each filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Years, newest first.
    pub years: Vec<String>,
    /// Subjects in catalog order.
    pub subjects: Vec<String>,
    /// Paper type labels.
    pub types: Vec<&'static str>,
    /// Regions, sorted.
    pub regions: Vec<String>,
}

/// Record counts grouped by subject, year and type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    /// Total records.
    pub total: usize,
    /// Count per subject.
    pub by_subject: BTreeMap<String, usize>,
    /// Count per year.
    pub by_year: BTreeMap<String, usize>,
    /// Count per type label.
    pub by_type: BTreeMap<&'static str, usize>,
}

/// Immutable, id-indexed collection of paper records.
#[derive(Debug, Clone)]
pub struct Catalog {
    papers: Vec<PaperRecord>,
    index: HashMap<u32, usize>,
}

impl Catalog {
    /// Builds a catalog from records, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] for repeated ids,
    /// [`CatalogError::DuplicateFilename`] when two records share a filename,
    /// and [`CatalogError::InvalidRecord`] for a zero id, a filename not
    /// ending in `.pdf` or carrying the placeholder prefix, or an unparseable
    /// candidate URL.
    pub fn from_records(papers: Vec<PaperRecord>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(papers.len());
        let mut filenames: HashMap<&str, u32> = HashMap::with_capacity(papers.len());
        for (position, paper) in papers.iter().enumerate() {
            validate_record(paper)?;
            if index.insert(paper.id, position).is_some() {
                return Err(CatalogError::DuplicateId { id: paper.id });
            }
            if let Some(&first_id) = filenames.get(paper.filename.as_str()) {
                return Err(CatalogError::DuplicateFilename {
                    filename: paper.filename.clone(),
                    first_id,
                    id: paper.id,
                });
            }
            filenames.insert(paper.filename.as_str(), paper.id);
        }
        Ok(Self { papers, index })
    }

    /// Generates the built-in catalog from the static mirror tables.
    #[must_use]
    pub fn builtin() -> Self {
        let papers = builtin::generate();
        let index = papers
            .iter()
            .enumerate()
            .map(|(position, paper)| (paper.id, position))
            .collect();
        debug!(papers = papers.len(), "generated built-in catalog");
        Self { papers, index }
    }

    /// Loads a catalog from a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read, parsed or validated.
    pub fn load_json(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        let records: Vec<RawPaperRecord> =
            serde_json::from_str(&raw).map_err(|e| CatalogError::json(path, e))?;
        let catalog = Self::from_records(records.into_iter().map(PaperRecord::from).collect())?;
        info!(path = %path.display(), papers = catalog.len(), "loaded catalog file");
        Ok(catalog)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    /// Returns `true` when the catalog has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// All records in catalog order.
    #[must_use]
    pub fn all(&self) -> &[PaperRecord] {
        &self.papers
    }

    /// Finds a record by id.
    #[must_use]
    pub fn lookup(&self, id: u32) -> Option<&PaperRecord> {
        self.index.get(&id).map(|&position| &self.papers[position])
    }

    /// Returns matching records in catalog order.
    #[must_use]
    pub fn filter(&self, filter: &PaperFilter) -> Vec<&PaperRecord> {
        let search_lower = filter
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        self.papers
            .iter()
            .filter(|paper| filter.matches(paper, search_lower.as_deref()))
            .collect()
    }

    /// Distinct filter values present in the catalog.
    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        let years: BTreeSet<&str> = self.papers.iter().map(|p| p.year.as_str()).collect();
        let regions: BTreeSet<&str> = self.papers.iter().map(|p| p.region.as_str()).collect();
        let mut subjects: Vec<String> = Vec::new();
        for paper in &self.papers {
            if !subjects.contains(&paper.subject) {
                subjects.push(paper.subject.clone());
            }
        }
        FilterOptions {
            years: years.into_iter().rev().map(str::to_string).collect(),
            subjects,
            types: PaperType::ALL.iter().map(|t| t.as_str()).collect(),
            regions: regions.into_iter().map(str::to_string).collect(),
        }
    }

    /// Record counts grouped by subject, year and type.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            total: self.papers.len(),
            ..CatalogStats::default()
        };
        for paper in &self.papers {
            *stats.by_subject.entry(paper.subject.clone()).or_default() += 1;
            *stats.by_year.entry(paper.year.clone()).or_default() += 1;
            *stats.by_type.entry(paper.paper_type.as_str()).or_default() += 1;
        }
        stats
    }
}

fn validate_record(paper: &PaperRecord) -> Result<(), CatalogError> {
    if paper.id == 0 {
        return Err(CatalogError::invalid_record(0, "id must be positive"));
    }
    if !paper.filename.ends_with(".pdf") {
        return Err(CatalogError::invalid_record(
            paper.id,
            format!("filename {:?} must end with .pdf", paper.filename),
        ));
    }
    if paper.filename.starts_with(UNAVAILABLE_PREFIX) {
        return Err(CatalogError::invalid_record(
            paper.id,
            format!(
                "filename {:?} must not start with {UNAVAILABLE_PREFIX}",
                paper.filename
            ),
        ));
    }
    if paper.filename.contains(['/', '\\']) {
        return Err(CatalogError::invalid_record(
            paper.id,
            format!("filename {:?} must not contain path separators", paper.filename),
        ));
    }
    for candidate in &paper.candidates {
        if Url::parse(&candidate.url).is_err() {
            return Err(CatalogError::invalid_record(
                paper.id,
                format!("candidate URL {:?} is not a valid URL", candidate.url),
            ));
        }
    }
    Ok(())
}
