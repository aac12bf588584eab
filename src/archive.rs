//! ZIP assembly for batch downloads.
//!
//! Every requested paper gets exactly one entry: the fetched PDF under its
//! own filename, or [`PLACEHOLDER_PDF`] under `UNAVAILABLE_<filename>` so a
//! missing paper is visible inside the archive instead of silently absent.

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};

use thiserror::Error;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::catalog::PaperRecord;
use crate::fetch::FetchOutcome;

/// Prefix for entries whose paper could not be fetched.
pub const UNAVAILABLE_PREFIX: &str = "UNAVAILABLE_";

/// Minimal single-page PDF served when no mirror has the paper.
pub const PLACEHOLDER_PDF: &[u8] = b"%PDF-1.4
1 0 obj<</Type/Catalog/Pages 2 0 R>>endobj
2 0 obj<</Type/Pages/Kids[3 0 R]/Count 1>>endobj
3 0 obj<</Type/Page/Parent 2 0 R/MediaBox[0 0 612 792]/Contents 4 0 R/Resources<</Font<</F1 5 0 R>>>>>>endobj
4 0 obj<</Length 150>>stream
BT
/F1 16 Tf
50 700 Td
(CBSE Paper - Temporarily Unavailable) Tj
0 -30 Td
/F1 12 Tf
(Please try again later or check CBSE official website) Tj
ET
endstream endobj
5 0 obj<</Type/Font/Subtype/Type1/BaseFont/Helvetica>>endobj
xref
0 6
0000000000 65535 f 
0000000009 00000 n 
0000000052 00000 n 
0000000105 00000 n 
0000000246 00000 n 
0000000446 00000 n 
trailer<</Size 6/Root 1 0 R>>
startxref
515
%%EOF";

/// Errors raised while writing an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The ZIP writer rejected an entry or failed to finish.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing entry bytes failed.
    #[error("IO error writing archive: {0}")]
    Io(#[from] std::io::Error),
}

/// A finished archive and what went into it.
#[derive(Debug, Clone)]
pub struct Archive {
    /// ZIP file bytes.
    pub bytes: Vec<u8>,
    /// Entries holding fetched PDFs.
    pub fetched: usize,
    /// Entries holding the placeholder.
    pub unavailable: usize,
}

impl Archive {
    /// Total number of entries.
    #[must_use]
    pub fn entries(&self) -> usize {
        self.fetched + self.unavailable
    }
}

/// Entry name for a record given whether it was fetched.
#[must_use]
pub fn entry_name(record: &PaperRecord, fetched: bool) -> String {
    if fetched {
        record.filename.clone()
    } else {
        format!("{UNAVAILABLE_PREFIX}{}", record.filename)
    }
}

/// Writes a deflate-compressed ZIP with one entry per record, in order.
///
/// Records repeated by id are written once. A record with no entry in
/// `results` is treated as unavailable. Distinct records whose entry
/// names clash get a `_<id>` suffix before the extension.
///
/// # Errors
///
/// Returns [`ArchiveError`] if the ZIP writer fails.
pub fn build_zip(
    records: &[PaperRecord],
    results: &HashMap<u32, FetchOutcome>,
) -> Result<Archive, ArchiveError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut seen = HashSet::with_capacity(records.len());
    let mut used_names = HashSet::with_capacity(records.len());
    let mut fetched = 0;
    let mut unavailable = 0;

    for record in records {
        if !seen.insert(record.id) {
            continue;
        }
        let bytes = results.get(&record.id).and_then(FetchOutcome::bytes);
        let name = unique_entry_name(
            entry_name(record, bytes.is_some()),
            record.id,
            &mut used_names,
        );
        writer.start_file(name, options)?;
        match bytes {
            Some(bytes) => {
                writer.write_all(bytes)?;
                fetched += 1;
            }
            None => {
                writer.write_all(PLACEHOLDER_PDF)?;
                unavailable += 1;
            }
        }
    }

    let bytes = writer.finish()?.into_inner();
    debug!(fetched, unavailable, bytes = bytes.len(), "archive built");
    Ok(Archive {
        bytes,
        fetched,
        unavailable,
    })
}

/// Returns `name`, or a `_<id>` (then `_<id>_<n>`) variant not yet in `used`.
fn unique_entry_name(name: String, id: u32, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), format!(".{ext}")),
        None => (name.clone(), String::new()),
    };
    let mut candidate = format!("{stem}_{id}{ext}");
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{stem}_{id}_{n}{ext}");
        n += 1;
    }
    debug!(original = %name, renamed = %candidate, "entry name clash");
    candidate
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Read;

    use bytes::Bytes;
    use zip::ZipArchive;

    use super::*;
    use crate::catalog::PaperType;

    fn record(id: u32) -> PaperRecord {
        PaperRecord {
            id,
            year: "2024".to_string(),
            subject: "Economics".to_string(),
            subject_code: "58".to_string(),
            paper_type: PaperType::QuestionPaper,
            series: "1".to_string(),
            set: format!("Set {id}"),
            paper_code: format!("58-1-{id}"),
            region: "Delhi".to_string(),
            filename: format!("paper_{id}.pdf"),
            display_name: format!("Paper {id}"),
            candidates: Vec::new(),
        }
    }

    fn fetched(id: u32) -> FetchOutcome {
        FetchOutcome::Fetched {
            bytes: Bytes::from(format!("%PDF-1.4 paper {id}")),
            filename: format!("paper_{id}.pdf"),
        }
    }

    fn read_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut content = Vec::new();
                file.read_to_end(&mut content).unwrap();
                (file.name().to_string(), content)
            })
            .collect()
    }

    #[test]
    fn test_placeholder_is_a_pdf() {
        assert!(PLACEHOLDER_PDF.starts_with(b"%PDF"));
        assert!(PLACEHOLDER_PDF.ends_with(b"%%EOF"));
    }

    #[test]
    fn test_build_zip_one_entry_per_record_in_order() {
        let records = vec![record(1), record(2), record(3)];
        let results = HashMap::from([
            (1, fetched(1)),
            (2, FetchOutcome::Unavailable),
            (3, fetched(3)),
        ]);

        let archive = build_zip(&records, &results).unwrap();
        assert_eq!(archive.entries(), 3);
        assert_eq!(archive.fetched, 2);
        assert_eq!(archive.unavailable, 1);

        let entries = read_entries(&archive.bytes);
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["paper_1.pdf", "UNAVAILABLE_paper_2.pdf", "paper_3.pdf"]
        );
        assert_eq!(entries[0].1, b"%PDF-1.4 paper 1");
        assert_eq!(entries[1].1, PLACEHOLDER_PDF);
    }

    #[test]
    fn test_build_zip_missing_result_is_unavailable() {
        let records = vec![record(9)];
        let archive = build_zip(&records, &HashMap::new()).unwrap();
        let entries = read_entries(&archive.bytes);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "UNAVAILABLE_paper_9.pdf");
        assert_eq!(entries[0].1, PLACEHOLDER_PDF);
    }

    #[test]
    fn test_build_zip_uses_deflate() {
        let records = vec![record(1)];
        let archive = build_zip(&records, &HashMap::new()).unwrap();
        let mut zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        assert_eq!(
            zip.by_index(0).unwrap().compression(),
            CompressionMethod::Deflated
        );
    }

    #[test]
    fn test_build_zip_skips_repeated_ids() {
        let records = vec![record(1), record(1)];
        let results = HashMap::from([(1, fetched(1))]);
        let archive = build_zip(&records, &results).unwrap();
        assert_eq!(archive.entries(), 1);
        assert_eq!(read_entries(&archive.bytes).len(), 1);
    }

    #[test]
    fn test_build_zip_empty_request_is_valid_archive() {
        let archive = build_zip(&[], &HashMap::new()).unwrap();
        assert_eq!(archive.entries(), 0);
        assert!(read_entries(&archive.bytes).is_empty());
    }

    #[test]
    fn test_build_zip_distinct_records_sharing_filename() {
        let mut second = record(2);
        second.filename = "paper_1.pdf".to_string();
        let records = vec![record(1), second];

        let archive = build_zip(&records, &HashMap::new()).unwrap();
        assert_eq!(archive.entries(), 2);
        let names: Vec<String> = read_entries(&archive.bytes)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            vec!["UNAVAILABLE_paper_1.pdf", "UNAVAILABLE_paper_1_2.pdf"]
        );
    }

    #[test]
    fn test_build_zip_filename_matching_placeholder_name() {
        let mut lookalike = record(2);
        lookalike.filename = "UNAVAILABLE_paper_1.pdf".to_string();
        let records = vec![record(1), lookalike];
        let results = HashMap::from([(2, fetched(2))]);

        let archive = build_zip(&records, &results).unwrap();
        assert_eq!(archive.fetched, 1);
        assert_eq!(archive.unavailable, 1);
        let entries = read_entries(&archive.bytes);
        assert_eq!(entries[0].0, "UNAVAILABLE_paper_1.pdf");
        assert_eq!(entries[0].1, PLACEHOLDER_PDF);
        assert_eq!(entries[1].0, "UNAVAILABLE_paper_1_2.pdf");
        assert_eq!(entries[1].1, b"%PDF-1.4 paper 2");
    }

    #[test]
    fn test_unique_entry_name_keeps_counting() {
        let mut used = HashSet::new();
        assert_eq!(unique_entry_name("a.pdf".to_string(), 5, &mut used), "a.pdf");
        assert_eq!(unique_entry_name("a.pdf".to_string(), 5, &mut used), "a_5.pdf");
        assert_eq!(unique_entry_name("a.pdf".to_string(), 5, &mut used), "a_5_2.pdf");
        assert_eq!(unique_entry_name("readme".to_string(), 1, &mut used), "readme");
    }

    #[test]
    fn test_entry_name_prefix() {
        assert_eq!(entry_name(&record(4), true), "paper_4.pdf");
        assert_eq!(entry_name(&record(4), false), "UNAVAILABLE_paper_4.pdf");
    }
}
