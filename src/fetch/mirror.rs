//! Mirror classification and per-mirror request headers.
//!
//! Each third-party host wants slightly different request headers (mostly a
//! matching `Referer`) before it will hand out a PDF. Mirror names are
//! classified into a [`MirrorKind`] once, when a candidate is built, so the
//! fetch path never scans strings.

use serde::Serialize;

/// Browser User-Agent sent to every mirror.
///
/// Several mirrors reject non-browser agents with 403 or an HTML page.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Accept header sent to every mirror.
pub const PDF_ACCEPT: &str = "application/pdf,*/*";

/// Known mirror families.
///
/// Classification order matters: the first token contained in the mirror
/// name wins, and anything unrecognised falls back to [`MirrorKind::Cbse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorKind {
    /// files.supercop.in
    Supercop,
    /// selfstudys.com
    SelfStudy,
    /// schools.aglasem.com
    Aglasem,
    /// examfear.com
    ExamFear,
    /// Default profile (cbse.gov.in referer) for every other mirror.
    Cbse,
}

/// Name tokens checked in priority order.
const CLASSIFICATION_ORDER: [(&str, MirrorKind); 4] = [
    ("supercop", MirrorKind::Supercop),
    ("selfstudy", MirrorKind::SelfStudy),
    ("aglasem", MirrorKind::Aglasem),
    ("examfear", MirrorKind::ExamFear),
];

impl MirrorKind {
    /// Classifies a free-form mirror name. Total: never fails.
    #[must_use]
    pub fn classify(mirror_name: &str) -> Self {
        CLASSIFICATION_ORDER
            .iter()
            .find(|(token, _)| mirror_name.contains(token))
            .map_or(Self::Cbse, |(_, kind)| *kind)
    }

    /// Returns the header profile for this mirror family.
    #[must_use]
    pub fn headers(self) -> HeaderProfile {
        let referer = match self {
            Self::Supercop => "https://supercop.in/",
            Self::SelfStudy => "https://www.selfstudys.com/",
            Self::Aglasem => "https://schools.aglasem.com/",
            Self::ExamFear => "https://www.examfear.com/",
            Self::Cbse => "https://cbse.gov.in/",
        };
        HeaderProfile {
            user_agent: BROWSER_USER_AGENT,
            accept: PDF_ACCEPT,
            referer,
        }
    }

    /// Stable label for logs and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Supercop => "supercop",
            Self::SelfStudy => "self_study",
            Self::Aglasem => "aglasem",
            Self::ExamFear => "exam_fear",
            Self::Cbse => "cbse",
        }
    }
}

/// Fixed header set applied to every request sent to one mirror family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderProfile {
    /// `User-Agent` value.
    pub user_agent: &'static str,
    /// `Accept` value.
    pub accept: &'static str,
    /// `Referer` value.
    pub referer: &'static str,
}

impl HeaderProfile {
    /// Resolves the profile for a free-form mirror name.
    #[must_use]
    pub fn for_mirror(mirror_name: &str) -> Self {
        MirrorKind::classify(mirror_name).headers()
    }
}
