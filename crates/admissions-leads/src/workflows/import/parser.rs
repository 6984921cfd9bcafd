use std::collections::BTreeSet;
use std::io::Read;

use serde::{Deserialize, Deserializer};

use crate::workflows::admissions::domain::{
    AcademicScore, AttributeRecord, ContactDetails, CurrentGrade, CurriculumType,
    FormFillerType, LeadCategory, ScholarshipRequirement, ScoreError, TargetGeography,
    UnknownLabel,
};

#[derive(Debug)]
pub(crate) struct ParsedLead {
    pub(crate) row: usize,
    pub(crate) attributes: AttributeRecord,
    pub(crate) recorded_category: Option<LeadCategory>,
}

#[derive(Debug)]
pub(crate) enum RowError {
    Label(UnknownLabel),
    Score(ScoreError),
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowError::Label(err) => write!(f, "{err}"),
            RowError::Score(err) => write!(f, "{err}"),
        }
    }
}

impl From<UnknownLabel> for RowError {
    fn from(err: UnknownLabel) -> Self {
        Self::Label(err)
    }
}

impl From<ScoreError> for RowError {
    fn from(err: ScoreError) -> Self {
        Self::Score(err)
    }
}

pub(crate) enum ParseFailure {
    Csv(csv::Error),
    Row { row: usize, error: RowError },
}

/// Parse an exported lead sheet. Row numbers are 1-based and exclude the header.
pub(crate) fn parse_leads<R: Read>(reader: R) -> Result<Vec<ParsedLead>, ParseFailure> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut leads = Vec::new();

    for (index, record) in csv_reader.deserialize::<LeadRow>().enumerate() {
        let row_number = index + 1;
        let row = record.map_err(ParseFailure::Csv)?;
        let lead = row.into_lead(row_number).map_err(|error| ParseFailure::Row {
            row: row_number,
            error,
        })?;
        leads.push(lead);
    }

    Ok(leads)
}

#[derive(Debug, Deserialize)]
struct LeadRow {
    form_filler_type: String,
    current_grade: String,
    curriculum_type: String,
    scholarship_requirement: String,
    #[serde(default)]
    target_geographies: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    gpa: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    percentage: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    recorded_category: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    school: String,
    #[serde(default)]
    location: String,
}

impl LeadRow {
    fn into_lead(self, row: usize) -> Result<ParsedLead, RowError> {
        let target_geographies = self
            .target_geographies
            .split([';', '|'])
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::parse::<TargetGeography>)
            .collect::<Result<BTreeSet<_>, _>>()?;

        let academic_score =
            AcademicScore::from_columns(self.gpa.as_deref(), self.percentage.as_deref())?;

        let recorded_category = self.recorded_category.as_deref().map(|label| {
            LeadCategory::from_label_or_nurture(label, &format!("csv row {row}"))
        });

        let attributes = AttributeRecord {
            form_filler_type: self.form_filler_type.parse::<FormFillerType>()?,
            current_grade: self.current_grade.parse::<CurrentGrade>()?,
            curriculum_type: self.curriculum_type.parse::<CurriculumType>()?,
            scholarship_requirement: self
                .scholarship_requirement
                .parse::<ScholarshipRequirement>()?,
            target_geographies,
            academic_score,
            contact: ContactDetails {
                full_name: self.name,
                phone: self.phone,
                email: self.email,
                school: self.school,
                location: self.location,
            },
        };

        Ok(ParsedLead {
            row,
            attributes,
            recorded_category,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
