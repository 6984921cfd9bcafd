use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for captured leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeadId(pub String);

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who filled in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFillerType {
    Parent,
    Student,
}

impl FormFillerType {
    pub const fn ordered() -> [Self; 2] {
        [Self::Parent, Self::Student]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Student => "student",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentGrade {
    Grade7OrBelow,
    Grade8,
    Grade9,
    Grade10,
    Grade11,
    Grade12,
    Masters,
}

impl CurrentGrade {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Grade7OrBelow,
            Self::Grade8,
            Self::Grade9,
            Self::Grade10,
            Self::Grade11,
            Self::Grade12,
            Self::Masters,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Grade7OrBelow => "grade7_or_below",
            Self::Grade8 => "grade8",
            Self::Grade9 => "grade9",
            Self::Grade10 => "grade10",
            Self::Grade11 => "grade11",
            Self::Grade12 => "grade12",
            Self::Masters => "masters",
        }
    }

    /// Grades 8 through 10.
    pub const fn is_middle_band(self) -> bool {
        matches!(self, Self::Grade8 | Self::Grade9 | Self::Grade10)
    }

    /// Grades 11 and 12.
    pub const fn is_senior_band(self) -> bool {
        matches!(self, Self::Grade11 | Self::Grade12)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurriculumType {
    #[serde(rename = "IB")]
    Ib,
    #[serde(rename = "IGCSE")]
    Igcse,
    #[serde(rename = "CBSE")]
    Cbse,
    #[serde(rename = "ICSE")]
    Icse,
    #[serde(rename = "State_Boards")]
    StateBoards,
    #[serde(rename = "Others")]
    Others,
}

impl CurriculumType {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Ib,
            Self::Igcse,
            Self::Cbse,
            Self::Icse,
            Self::StateBoards,
            Self::Others,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ib => "IB",
            Self::Igcse => "IGCSE",
            Self::Cbse => "CBSE",
            Self::Icse => "ICSE",
            Self::StateBoards => "State_Boards",
            Self::Others => "Others",
        }
    }

    /// CBSE, ICSE and the state boards share the stricter qualification thresholds.
    pub const fn is_indian(self) -> bool {
        matches!(self, Self::Cbse | Self::Icse | Self::StateBoards)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScholarshipRequirement {
    Full,
    Partial,
    Optional,
}

impl ScholarshipRequirement {
    pub const fn ordered() -> [Self; 3] {
        [Self::Full, Self::Partial, Self::Optional]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::Optional => "optional",
        }
    }

    /// Partial or optional; a full-scholarship need never qualifies.
    pub const fn is_flexible(self) -> bool {
        matches!(self, Self::Partial | Self::Optional)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetGeography {
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "UK")]
    Uk,
    #[serde(rename = "rest_of_world")]
    RestOfWorld,
    #[serde(rename = "need_guidance")]
    NeedGuidance,
}

impl TargetGeography {
    pub const fn ordered() -> [Self; 4] {
        [Self::Us, Self::Uk, Self::RestOfWorld, Self::NeedGuidance]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Uk => "UK",
            Self::RestOfWorld => "rest_of_world",
            Self::NeedGuidance => "need_guidance",
        }
    }

    /// Destinations other than the US that Luminaire tiers serve.
    pub const fn non_us() -> [Self; 3] {
        [Self::Uk, Self::RestOfWorld, Self::NeedGuidance]
    }
}

macro_rules! label_from_str {
    ($ty:ty, $field:literal) => {
        impl FromStr for $ty {
            type Err = UnknownLabel;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let trimmed = raw.trim();
                Self::ordered()
                    .into_iter()
                    .find(|candidate| candidate.label().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| UnknownLabel {
                        field: $field,
                        value: trimmed.to_string(),
                    })
            }
        }
    };
}

label_from_str!(FormFillerType, "form_filler_type");
label_from_str!(CurrentGrade, "current_grade");
label_from_str!(CurriculumType, "curriculum_type");
label_from_str!(ScholarshipRequirement, "scholarship_requirement");
label_from_str!(TargetGeography, "target_geography");

/// Raised when a textual enum value (CSV cell, CLI argument) matches no known label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} value '{value}'")]
pub struct UnknownLabel {
    pub field: &'static str,
    pub value: String,
}

/// Which scale the applicant reported their score on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Gpa,
    Percentage,
}

impl ScoreKind {
    const fn bounds(self) -> (f64, f64) {
        match self {
            Self::Gpa => (1.0, 10.0),
            Self::Percentage => (1.0, 100.0),
        }
    }

    /// The literal a perfect (and therefore suspicious) score is entered as.
    const fn sentinel(self) -> &'static str {
        match self {
            Self::Gpa => "10",
            Self::Percentage => "100",
        }
    }
}

/// Decimal kept exactly as entered so sentinel checks compare literals, not floats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLiteral(String);

impl ScoreLiteral {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScoreLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("academic score '{value}' is not a plain decimal")]
    NotDecimal { value: String },
    #[error("{kind:?} score {value} outside {min}..={max}")]
    OutOfRange {
        kind: ScoreKind,
        value: String,
        min: f64,
        max: f64,
    },
}

/// Reported academic score; exactly one scale is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScoreInput", into = "ScoreInput")]
pub enum AcademicScore {
    Gpa(ScoreLiteral),
    Percentage(ScoreLiteral),
}

impl AcademicScore {
    pub fn gpa(raw: &str) -> Result<Self, ScoreError> {
        Self::parse(ScoreKind::Gpa, raw)
    }

    pub fn percentage(raw: &str) -> Result<Self, ScoreError> {
        Self::parse(ScoreKind::Percentage, raw)
    }

    pub fn parse(kind: ScoreKind, raw: &str) -> Result<Self, ScoreError> {
        let trimmed = raw.trim();
        let is_plain_decimal = !trimmed.is_empty()
            && trimmed.chars().all(|c| c.is_ascii_digit() || c == '.')
            && trimmed.chars().filter(|c| *c == '.').count() <= 1
            && trimmed.chars().any(|c| c.is_ascii_digit());
        if !is_plain_decimal {
            return Err(ScoreError::NotDecimal {
                value: trimmed.to_string(),
            });
        }

        let value: f64 = trimmed.parse().map_err(|_| ScoreError::NotDecimal {
            value: trimmed.to_string(),
        })?;
        let (min, max) = kind.bounds();
        if value < min || value > max {
            return Err(ScoreError::OutOfRange {
                kind,
                value: trimmed.to_string(),
                min,
                max,
            });
        }

        let literal = ScoreLiteral(trimmed.to_string());
        Ok(match kind {
            ScoreKind::Gpa => Self::Gpa(literal),
            ScoreKind::Percentage => Self::Percentage(literal),
        })
    }

    /// Resolve the two optional form columns into at most one score.
    ///
    /// Blank cells count as absent. When both columns carry a value the score is
    /// ambiguous and is dropped, which keeps the record out of the spam path.
    pub fn from_columns(
        gpa: Option<&str>,
        percentage: Option<&str>,
    ) -> Result<Option<Self>, ScoreError> {
        let gpa = gpa.map(str::trim).filter(|value| !value.is_empty());
        let percentage = percentage.map(str::trim).filter(|value| !value.is_empty());

        match (gpa, percentage) {
            (Some(gpa), None) => Self::gpa(gpa).map(Some),
            (None, Some(percentage)) => Self::percentage(percentage).map(Some),
            (None, None) => Ok(None),
            (Some(gpa), Some(percentage)) => {
                tracing::warn!(
                    gpa,
                    percentage,
                    "both gpa and percentage populated; treating academic score as absent"
                );
                Ok(None)
            }
        }
    }

    pub fn kind(&self) -> ScoreKind {
        match self {
            Self::Gpa(_) => ScoreKind::Gpa,
            Self::Percentage(_) => ScoreKind::Percentage,
        }
    }

    pub fn literal(&self) -> &ScoreLiteral {
        match self {
            Self::Gpa(literal) | Self::Percentage(literal) => literal,
        }
    }

    /// Exact literal match: `"10"` is a sentinel GPA, `"10.0"` is not.
    pub fn is_spam_sentinel(&self) -> bool {
        self.literal().as_str() == self.kind().sentinel()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScoreInput {
    kind: ScoreKind,
    value: ScoreValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ScoreValue {
    Text(String),
    Number(serde_json::Number),
}

impl TryFrom<ScoreInput> for AcademicScore {
    type Error = ScoreError;

    fn try_from(input: ScoreInput) -> Result<Self, Self::Error> {
        let raw = match input.value {
            ScoreValue::Text(text) => text,
            ScoreValue::Number(number) => number.to_string(),
        };
        Self::parse(input.kind, &raw)
    }
}

impl From<AcademicScore> for ScoreInput {
    fn from(score: AcademicScore) -> Self {
        Self {
            kind: score.kind(),
            value: ScoreValue::Text(score.literal().as_str().to_string()),
        }
    }
}

/// Identity and contact details; carried through unchanged, never inspected by the rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub location: String,
}

/// Snapshot of the Page 1 answers for one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub form_filler_type: FormFillerType,
    pub current_grade: CurrentGrade,
    pub curriculum_type: CurriculumType,
    pub scholarship_requirement: ScholarshipRequirement,
    #[serde(default)]
    pub target_geographies: BTreeSet<TargetGeography>,
    #[serde(default)]
    pub academic_score: Option<AcademicScore>,
    #[serde(default)]
    pub contact: ContactDetails,
}

impl AttributeRecord {
    /// Copy of this record as if `role` had filled in the form.
    pub fn with_form_filler(&self, role: FormFillerType) -> Self {
        Self {
            form_filler_type: role,
            ..self.clone()
        }
    }

    pub fn targets(&self, geography: TargetGeography) -> bool {
        self.target_geographies.contains(&geography)
    }

    pub fn targets_outside_us(&self) -> bool {
        TargetGeography::non_us()
            .iter()
            .any(|geography| self.target_geographies.contains(geography))
    }

    pub fn is_spam(&self) -> bool {
        self.academic_score
            .as_ref()
            .map(AcademicScore::is_spam_sentinel)
            .unwrap_or(false)
    }
}

/// The six mutually exclusive lead categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadCategory {
    Bch,
    LumL1,
    LumL2,
    Nurture,
    Masters,
    Drop,
}

impl LeadCategory {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Bch,
            Self::LumL1,
            Self::LumL2,
            Self::Nurture,
            Self::Masters,
            Self::Drop,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bch => "bch",
            Self::LumL1 => "lum_l1",
            Self::LumL2 => "lum_l2",
            Self::Nurture => "nurture",
            Self::Masters => "masters",
            Self::Drop => "drop",
        }
    }

    /// BCH and both Luminaire tiers proceed to counselling.
    pub const fn is_qualified(self) -> bool {
        matches!(self, Self::Bch | Self::LumL1 | Self::LumL2)
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(trimmed))
    }

    /// Labels read back from storage or exports never fail: anything unrecognised
    /// degrades to nurture so the lead is still followed up.
    pub fn from_label_or_nurture(raw: &str, context: &str) -> Self {
        match Self::from_label(raw) {
            Some(category) => category,
            None => {
                tracing::warn!(
                    label = raw,
                    context,
                    "unrecognised lead category; coercing to nurture"
                );
                Self::Nurture
            }
        }
    }
}

impl fmt::Display for LeadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
