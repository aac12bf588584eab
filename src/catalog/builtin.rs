//! Built-in catalog generated from static mirror tables.
//!
//! Every combination of year, subject, series and set becomes a question
//! paper (and a marking scheme where a mirror carries one), followed by
//! compartment papers and the board's sample papers. Ids are assigned
//! sequentially from 1 in generation order.

use super::record::{Candidate, PaperRecord, PaperType};

const SUPERCOP_BASE: &str = "https://files.supercop.in/cbse-board-papers/class12";
const CBSE_ACADEMIC_BASE: &str = "https://cbseacademic.nic.in/web_material/SQP";
const VEDANTU_BASE: &str = "https://www.vedantu.com/content/cbse/class-12";
const SELFSTUDY_BASE: &str = "https://www.selfstudys.com/question-papers";
const AGLASEM_BASE: &str = "https://schools.aglasem.com/wp-content/uploads";

const YEARS: [&str; 11] = [
    "2025", "2024", "2023", "2022", "2021", "2020", "2019", "2018", "2017", "2016", "2015",
];

/// Series code and region label, in generation order.
const SERIES: [(&str, &str); 5] = [
    ("1", "Delhi"),
    ("2", "Outside Delhi"),
    ("3", "All India"),
    ("4", "Foreign Set 1"),
    ("5", "Foreign Set 2"),
];

const SETS: [&str; 3] = ["1", "2", "3"];

/// Sample paper session and its folder on the board's academic site.
const SAMPLE_SESSIONS: [(&str, &str); 5] = [
    ("2025-26", "ClassXII_2025_26"),
    ("2024-25", "ClassXII_2024_25"),
    ("2023-24", "ClassXII_2023_24"),
    ("2022-23", "ClassXII_2022_23"),
    ("2021-22", "ClassXII_2021_22"),
];

/// Compartment papers exist for this range of years.
const COMPARTMENT_YEARS: std::ops::RangeInclusive<u16> = 2015..=2024;

struct SupercopPaths {
    folder: &'static str,
    subfolder: &'static str,
    prefix_qp: &'static str,
    prefix_ms: &'static str,
    years: &'static [&'static str],
}

struct Subject {
    name: &'static str,
    code: &'static str,
    supercop: Option<SupercopPaths>,
    vedantu: Option<(&'static str, &'static [&'static str])>,
    selfstudy: (&'static str, &'static [&'static str]),
    sample_name: &'static str,
}

const SUPERCOP_YEARS: &[&str] = &["2025", "2024", "2023", "2022", "2020", "2019"];
const VEDANTU_YEARS: &[&str] = &[
    "2024", "2023", "2022", "2020", "2019", "2018", "2017", "2016", "2015",
];
const SELFSTUDY_YEARS: &[&str] = &[
    "2024", "2023", "2022", "2021", "2020", "2019", "2018", "2017", "2016", "2015",
];

// Folder names mirror the host's own spelling ("accoutancy", "bussiness").
const SUBJECTS: [Subject; 6] = [
    Subject {
        name: "Mathematics",
        code: "65",
        supercop: Some(SupercopPaths {
            folder: "maths",
            subfolder: "maths",
            prefix_qp: "m",
            prefix_ms: "ans_m",
            years: SUPERCOP_YEARS,
        }),
        vedantu: Some(("maths", VEDANTU_YEARS)),
        selfstudy: ("mathematics", SELFSTUDY_YEARS),
        sample_name: "Maths",
    },
    Subject {
        name: "Accountancy",
        code: "67",
        supercop: Some(SupercopPaths {
            folder: "accoutancy",
            subfolder: "account",
            prefix_qp: "a",
            prefix_ms: "ans_a",
            years: SUPERCOP_YEARS,
        }),
        vedantu: Some(("accountancy", VEDANTU_YEARS)),
        selfstudy: ("accountancy", SELFSTUDY_YEARS),
        sample_name: "Accountancy",
    },
    Subject {
        name: "Economics",
        code: "58",
        supercop: Some(SupercopPaths {
            folder: "economics",
            subfolder: "economics",
            prefix_qp: "eco",
            prefix_ms: "ans_eco",
            years: SUPERCOP_YEARS,
        }),
        vedantu: Some(("economics", VEDANTU_YEARS)),
        selfstudy: ("economics", SELFSTUDY_YEARS),
        sample_name: "Economics",
    },
    Subject {
        name: "Business Studies",
        code: "66",
        supercop: Some(SupercopPaths {
            folder: "bussiness",
            subfolder: "bus_",
            prefix_qp: "bs",
            prefix_ms: "ans_bs",
            years: &["2025", "2024", "2023", "2022", "2019"],
        }),
        vedantu: Some(("business-studies", VEDANTU_YEARS)),
        selfstudy: ("business-studies", SELFSTUDY_YEARS),
        sample_name: "BusinessStudies",
    },
    Subject {
        name: "English Core",
        code: "301",
        supercop: None,
        vedantu: Some(("english-core", VEDANTU_YEARS)),
        selfstudy: ("english-core", SELFSTUDY_YEARS),
        sample_name: "EnglishCore",
    },
    Subject {
        name: "Data Science",
        code: "844",
        supercop: None,
        vedantu: None,
        selfstudy: ("data-science", &["2024", "2023", "2022", "2021"]),
        sample_name: "DataScience",
    },
];

impl Subject {
    fn supercop_for(&self, year: &str) -> Option<&SupercopPaths> {
        self.supercop.as_ref().filter(|s| s.years.contains(&year))
    }

    fn vedantu_for(&self, year: &str) -> Option<&'static str> {
        self.vedantu
            .filter(|(_, years)| years.contains(&year))
            .map(|(name, _)| name)
    }

    fn selfstudy_for(&self, year: &str) -> Option<&'static str> {
        let (name, years) = self.selfstudy;
        years.contains(&year).then_some(name)
    }

    fn file_stem(&self) -> String {
        self.name.replace(' ', "_")
    }
}

/// Identifies one board paper within a year.
struct Slot<'a> {
    year: &'a str,
    series: &'a str,
    region: &'a str,
    set: &'a str,
    paper_code: String,
}

impl Slot<'_> {
    fn region_key(&self) -> String {
        self.region.to_lowercase().replace(' ', "-")
    }
}

fn board_candidates(subject: &Subject, slot: &Slot<'_>, marking_scheme: bool) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let year = slot.year;

    if let Some(paths) = subject.supercop_for(year) {
        let prefix = if marking_scheme {
            paths.prefix_ms
        } else {
            paths.prefix_qp
        };
        candidates.push(Candidate::new(
            "supercop",
            format!(
                "{SUPERCOP_BASE}/{}/{}_{year}/{prefix}_{year}_{}.pdf",
                paths.folder, paths.subfolder, slot.paper_code
            ),
        ));
    }

    if !marking_scheme && let Some(name) = subject.vedantu_for(year) {
        candidates.push(Candidate::new(
            "vedantu",
            format!(
                "{VEDANTU_BASE}/{name}/previous-year-question-paper/{year}/cbse-class-12-{name}-question-paper-{year}-set-{}.pdf",
                slot.set
            ),
        ));
    }

    let region = slot.region_key();
    if let Some(name) = subject.selfstudy_for(year) {
        let doc_type = if marking_scheme {
            "marking-scheme"
        } else {
            "question-paper"
        };
        candidates.push(Candidate::new(
            "selfstudy",
            format!(
                "{SELFSTUDY_BASE}/cbse-class-12-{name}-{year}-{region}-set-{}-{doc_type}",
                slot.set
            ),
        ));
    }

    if !marking_scheme {
        let name = subject.selfstudy.0.replace('-', "_");
        candidates.push(Candidate::new(
            "aglasem",
            format!(
                "{AGLASEM_BASE}/{year}/cbse-class-12-{name}-question-paper-{year}-{region}-set-{}.pdf",
                slot.set
            ),
        ));
    }

    candidates
}

fn compartment_candidates(subject: &Subject, year: &str) -> Vec<Candidate> {
    let in_range = year
        .parse::<u16>()
        .is_ok_and(|y| COMPARTMENT_YEARS.contains(&y));
    if !in_range {
        return Vec::new();
    }
    subject
        .supercop_for(year)
        .map(|paths| {
            Candidate::new(
                "supercop_compartment",
                format!(
                    "{SUPERCOP_BASE}/{}/{}_{year}/{}_{year}_{}-C-1.pdf",
                    paths.folder, paths.subfolder, paths.prefix_qp, subject.code
                ),
            )
        })
        .into_iter()
        .collect()
}

#[derive(Default)]
struct Generator {
    papers: Vec<PaperRecord>,
}

impl Generator {
    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        subject: &Subject,
        year: &str,
        paper_type: PaperType,
        series: &str,
        set: String,
        paper_code: String,
        region: &str,
        filename: String,
        display_name: String,
        candidates: Vec<Candidate>,
    ) {
        let id = u32::try_from(self.papers.len() + 1).unwrap_or(u32::MAX);
        self.papers.push(PaperRecord {
            id,
            year: year.to_string(),
            subject: subject.name.to_string(),
            subject_code: subject.code.to_string(),
            paper_type,
            series: series.to_string(),
            set,
            paper_code,
            region: region.to_string(),
            filename,
            display_name,
            candidates,
        });
    }

    fn board_papers(&mut self, subject: &Subject, year: &str) {
        let available = subject.supercop_for(year).is_some()
            || subject.vedantu_for(year).is_some()
            || subject.selfstudy_for(year).is_some();
        if !available {
            return;
        }

        let stem = subject.file_stem();
        for (series, region) in SERIES {
            for set in SETS {
                let slot = Slot {
                    year,
                    series,
                    region,
                    set,
                    paper_code: format!("{}-{series}-{set}", subject.code),
                };

                for (marking_scheme, paper_type, suffix, label) in [
                    (false, PaperType::QuestionPaper, "QP", "Question Paper"),
                    (true, PaperType::MarkingScheme, "MS", "Marking Scheme"),
                ] {
                    let candidates = board_candidates(subject, &slot, marking_scheme);
                    if candidates.is_empty() {
                        continue;
                    }
                    self.push(
                        subject,
                        year,
                        paper_type,
                        slot.series,
                        format!("Set {set}"),
                        slot.paper_code.clone(),
                        region,
                        format!("CBSE_{year}_{stem}_{}_{suffix}.pdf", slot.paper_code),
                        format!("{} {year} {region} Set {set} - {label}", subject.name),
                        candidates,
                    );
                }
            }
        }

        let compartment = compartment_candidates(subject, year);
        if !compartment.is_empty() {
            self.push(
                subject,
                year,
                PaperType::Compartment,
                "C",
                "Compartment".to_string(),
                format!("{}-C-1", subject.code),
                "Compartment",
                format!("CBSE_{year}_{stem}_Compartment_QP.pdf"),
                format!("{} {year} Compartment - Question Paper", subject.name),
                compartment,
            );
        }
    }

    fn sample_papers(&mut self, subject: &Subject) {
        let stem = subject.file_stem();
        for (session, folder) in SAMPLE_SESSIONS {
            let year = session.split('-').next().unwrap_or(session);
            for (suffix, set, file_suffix, label) in [
                ("SQP", "Sample", "Sample_Paper", "Sample Question Paper"),
                ("MS", "Sample MS", "Sample_MS", "Sample Marking Scheme"),
            ] {
                let url = format!(
                    "{CBSE_ACADEMIC_BASE}/{folder}/{}-{suffix}.pdf",
                    subject.sample_name
                );
                self.push(
                    subject,
                    year,
                    PaperType::SamplePaper,
                    "SQP",
                    set.to_string(),
                    format!("{}-SQP", subject.code),
                    "Sample Paper",
                    format!("CBSE_{session}_{stem}_{file_suffix}.pdf"),
                    format!("{} {session} - {label}", subject.name),
                    vec![Candidate::new(format!("cbse_sample_{session}"), url)],
                );
            }
        }
    }
}

/// Generates every built-in record.
pub(super) fn generate() -> Vec<PaperRecord> {
    let mut generator = Generator::default();
    for year in YEARS {
        for subject in &SUBJECTS {
            generator.board_papers(subject, year);
        }
    }
    for subject in &SUBJECTS {
        generator.sample_papers(subject);
    }
    generator.papers
}
