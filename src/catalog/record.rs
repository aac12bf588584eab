//! Paper records and their download candidates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fetch::{HeaderProfile, MirrorKind};

/// Kind of document a record points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperType {
    /// Board exam question paper.
    QuestionPaper,
    /// Official marking scheme for a question paper.
    MarkingScheme,
    /// Sample question paper or its marking scheme.
    SamplePaper,
    /// Supplementary (compartment) exam paper.
    Compartment,
}

impl PaperType {
    /// Every type, in listing order.
    pub const ALL: [Self; 4] = [
        Self::QuestionPaper,
        Self::MarkingScheme,
        Self::SamplePaper,
        Self::Compartment,
    ];

    /// Wire label (`question_paper`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuestionPaper => "question_paper",
            Self::MarkingScheme => "marking_scheme",
            Self::SamplePaper => "sample_paper",
            Self::Compartment => "compartment",
        }
    }
}

impl fmt::Display for PaperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaperType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown paper type: {s}"))
    }
}

/// One possible source for a paper's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Free-form mirror name as configured.
    pub mirror: String,
    /// Mirror family, classified once from `mirror`.
    pub kind: MirrorKind,
    /// Absolute URL of the PDF on that mirror.
    pub url: String,
}

impl Candidate {
    /// Builds a candidate, classifying the mirror name.
    pub fn new(mirror: impl Into<String>, url: impl Into<String>) -> Self {
        let mirror = mirror.into();
        let kind = MirrorKind::classify(&mirror);
        Self {
            mirror,
            kind,
            url: url.into(),
        }
    }

    /// Request headers for this candidate's mirror.
    #[must_use]
    pub fn headers(&self) -> HeaderProfile {
        self.kind.headers()
    }
}

/// A catalog entry.
///
/// Serializes without its candidates: mirror URLs stay internal to the
/// server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperRecord {
    /// Stable positive identifier.
    pub id: u32,
    /// Exam year (`"2024"`), or session start year for sample papers.
    pub year: String,
    /// Subject display name.
    pub subject: String,
    /// Board subject code.
    pub subject_code: String,
    /// Document kind.
    #[serde(rename = "type")]
    pub paper_type: PaperType,
    /// Series label (`"1"`..`"5"`, `"C"`, `"SQP"`).
    pub series: String,
    /// Set label (`"Set 1"`, `"Compartment"`, ...).
    pub set: String,
    /// Paper code printed on the document.
    pub paper_code: String,
    /// Region label.
    pub region: String,
    /// Download filename, always ending in `.pdf`.
    pub filename: String,
    /// Human-readable label.
    pub display_name: String,
    /// Sources in fallback priority order.
    #[serde(skip)]
    pub candidates: Vec<Candidate>,
}

impl PaperRecord {
    /// Case-insensitive substring match over display name, paper code and subject.
    ///
    /// `needle_lower` must already be lowercased.
    #[must_use]
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        self.display_name.to_lowercase().contains(needle_lower)
            || self.paper_code.to_lowercase().contains(needle_lower)
            || self.subject.to_lowercase().contains(needle_lower)
    }
}

/// On-disk shape of a record: candidates are `[mirror, url]` pairs.
#[derive(Debug, Deserialize)]
pub(crate) struct RawPaperRecord {
    pub id: u32,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub subject_code: String,
    #[serde(rename = "type")]
    pub paper_type: PaperType,
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub set: String,
    #[serde(default)]
    pub paper_code: String,
    #[serde(default)]
    pub region: String,
    pub filename: String,
    pub display_name: String,
    #[serde(default)]
    pub urls: Vec<(String, String)>,
}

impl From<RawPaperRecord> for PaperRecord {
    fn from(raw: RawPaperRecord) -> Self {
        Self {
            id: raw.id,
            year: raw.year,
            subject: raw.subject,
            subject_code: raw.subject_code,
            paper_type: raw.paper_type,
            series: raw.series,
            set: raw.set,
            paper_code: raw.paper_code,
            region: raw.region,
            filename: raw.filename,
            display_name: raw.display_name,
            candidates: raw
                .urls
                .into_iter()
                .map(|(mirror, url)| Candidate::new(mirror, url))
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_type_round_trips_labels() {
        for paper_type in PaperType::ALL {
            assert_eq!(paper_type.as_str().parse::<PaperType>(), Ok(paper_type));
        }
        assert!("exam".parse::<PaperType>().is_err());
    }

    #[test]
    fn test_candidate_classifies_mirror_once() {
        let candidate = Candidate::new("supercop_compartment", "https://files.supercop.in/a.pdf");
        assert_eq!(candidate.kind, MirrorKind::Supercop);
        assert_eq!(candidate.headers().referer, "https://supercop.in/");
    }

    #[test]
    fn test_record_serializes_without_candidates() {
        let record = PaperRecord {
            id: 3,
            year: "2024".to_string(),
            subject: "Economics".to_string(),
            subject_code: "58".to_string(),
            paper_type: PaperType::MarkingScheme,
            series: "1".to_string(),
            set: "Set 1".to_string(),
            paper_code: "58-1-1".to_string(),
            region: "Delhi".to_string(),
            filename: "CBSE_2024_Economics_58-1-1_MS.pdf".to_string(),
            display_name: "Economics 2024 Delhi Set 1 - Marking Scheme".to_string(),
            candidates: vec![Candidate::new("supercop", "https://files.supercop.in/x.pdf")],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "marking_scheme");
        assert_eq!(json["id"], 3);
        assert!(json.get("candidates").is_none());
        assert!(json.get("urls").is_none());
    }

    #[test]
    fn test_raw_record_converts_url_pairs() {
        let raw: RawPaperRecord = serde_json::from_str(
            r#"{"id": 1, "type": "question_paper", "filename": "a.pdf",
                "display_name": "A", "urls": [["selfstudy", "https://s.test/a"], ["x", "https://x.test/a.pdf"]]}"#,
        )
        .unwrap();
        let record = PaperRecord::from(raw);
        assert_eq!(record.candidates.len(), 2);
        assert_eq!(record.candidates[0].kind, MirrorKind::SelfStudy);
        assert_eq!(record.candidates[1].kind, MirrorKind::Cbse);
    }

    #[test]
    fn test_matches_search_fields() {
        let record = PaperRecord {
            id: 1,
            year: "2023".to_string(),
            subject: "Business Studies".to_string(),
            subject_code: "66".to_string(),
            paper_type: PaperType::QuestionPaper,
            series: "2".to_string(),
            set: "Set 3".to_string(),
            paper_code: "66-2-3".to_string(),
            region: "Outside Delhi".to_string(),
            filename: "f.pdf".to_string(),
            display_name: "Business Studies 2023 Outside Delhi Set 3 - Question Paper".to_string(),
            candidates: Vec::new(),
        };
        assert!(record.matches_search("business"));
        assert!(record.matches_search("66-2-3"));
        assert!(record.matches_search("outside"));
        assert!(!record.matches_search("mathematics"));
    }
}
