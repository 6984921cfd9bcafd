use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{LeadCategory, UnknownLabel};

/// Counsellors who take booked calls. BCH leads go to one desk, Luminaire leads to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counselor {
    Bch,
    Luminaire,
}

/// Public-facing identity shown on the booking page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CounselorProfile {
    pub counselor: Counselor,
    pub display_name: &'static str,
    pub title: &'static str,
    pub bio: &'static str,
    pub contact_display: &'static str,
}

impl Counselor {
    pub const fn ordered() -> [Self; 2] {
        [Self::Bch, Self::Luminaire]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bch => "bch",
            Self::Luminaire => "luminaire",
        }
    }

    /// BCH leads get the BCH desk; every other category is handled by Luminaire.
    pub const fn for_category(category: LeadCategory) -> Self {
        match category {
            LeadCategory::Bch => Self::Bch,
            _ => Self::Luminaire,
        }
    }

    pub const fn profile(self) -> CounselorProfile {
        match self {
            Self::Bch => CounselorProfile {
                counselor: self,
                display_name: "BCH Admissions Desk",
                title: "Senior Admissions Counsellor",
                bio: "Guides families of grade 8-12 students through shortlisting, \
                      scholarships and application timelines for US and global universities.",
                contact_display: "45-minute video call, link shared by email",
            },
            Self::Luminaire => CounselorProfile {
                counselor: self,
                display_name: "Luminaire Admissions Desk",
                title: "Lead Counsellor, Luminaire",
                bio: "Works with grade 11-12 applicants on UK and international admissions, \
                      from course selection to final offers.",
                contact_display: "45-minute video call, link shared by email",
            },
        }
    }
}

impl fmt::Display for Counselor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Counselor {
    type Err = UnknownLabel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bch" | "a" | "counselor_a" => Ok(Self::Bch),
            "luminaire" | "b" | "counselor_b" => Ok(Self::Luminaire),
            other => Err(UnknownLabel {
                field: "counselor",
                value: other.to_string(),
            }),
        }
    }
}
