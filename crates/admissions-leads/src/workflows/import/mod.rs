//! Re-score exported lead sheets against the current decision table.

mod parser;

use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::workflows::admissions::classification::explain;
use crate::workflows::admissions::domain::{FormFillerType, LeadCategory};

use parser::{ParseFailure, ParsedLead};

#[derive(Debug)]
pub enum LeadImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { row: usize, detail: String },
}

impl std::fmt::Display for LeadImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadImportError::Io(err) => write!(f, "failed to read lead export: {}", err),
            LeadImportError::Csv(err) => write!(f, "invalid lead CSV data: {}", err),
            LeadImportError::Row { row, detail } => {
                write!(f, "lead export row {} rejected: {}", row, detail)
            }
        }
    }
}

impl std::error::Error for LeadImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LeadImportError::Io(err) => Some(err),
            LeadImportError::Csv(err) => Some(err),
            LeadImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for LeadImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for LeadImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<ParseFailure> for LeadImportError {
    fn from(failure: ParseFailure) -> Self {
        match failure {
            ParseFailure::Csv(err) => Self::Csv(err),
            ParseFailure::Row { row, error } => Self::Row {
                row,
                detail: error.to_string(),
            },
        }
    }
}

/// Outcome for one exported row.
#[derive(Debug, Clone, Serialize)]
pub struct RescoredLead {
    pub row: usize,
    pub full_name: String,
    pub form_filler_type: FormFillerType,
    pub category: LeadCategory,
    pub rule: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_category: Option<LeadCategory>,
}

impl RescoredLead {
    /// The export carried a category and the current table disagrees with it.
    pub fn drifted(&self) -> bool {
        self.recorded_category
            .map(|recorded| recorded != self.category)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: LeadCategory,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadImportReport {
    pub leads: Vec<RescoredLead>,
    pub distribution: Vec<CategoryCount>,
}

impl LeadImportReport {
    fn from_leads(parsed: Vec<ParsedLead>) -> Self {
        let leads: Vec<RescoredLead> = parsed
            .into_iter()
            .map(|lead| {
                let outcome = explain(&lead.attributes);
                RescoredLead {
                    row: lead.row,
                    full_name: lead.attributes.contact.full_name,
                    form_filler_type: lead.attributes.form_filler_type,
                    category: outcome.category,
                    rule: outcome.rule,
                    recorded_category: lead.recorded_category,
                }
            })
            .collect();

        let distribution = LeadCategory::ordered()
            .into_iter()
            .map(|category| CategoryCount {
                category,
                count: leads.iter().filter(|lead| lead.category == category).count(),
            })
            .collect();

        Self {
            leads,
            distribution,
        }
    }

    pub fn count(&self, category: LeadCategory) -> usize {
        self.distribution
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }

    pub fn qualified(&self) -> usize {
        self.leads
            .iter()
            .filter(|lead| lead.category.is_qualified())
            .count()
    }

    pub fn drifted(&self) -> Vec<&RescoredLead> {
        self.leads.iter().filter(|lead| lead.drifted()).collect()
    }
}

pub struct LeadCsvImporter;

impl LeadCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<LeadImportReport, LeadImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<LeadImportReport, LeadImportError> {
        let parsed = parser::parse_leads(reader)?;
        let report = LeadImportReport::from_leads(parsed);
        tracing::info!(
            rows = report.leads.len(),
            qualified = report.qualified(),
            drifted = report.drifted().len(),
            "lead export re-scored"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "form_filler_type,current_grade,curriculum_type,scholarship_requirement,target_geographies,gpa,percentage,recorded_category,name\n";

    fn import(rows: &str) -> Result<LeadImportReport, LeadImportError> {
        let csv = format!("{HEADER}{rows}");
        LeadCsvImporter::from_reader(Cursor::new(csv.into_bytes()))
    }

    #[test]
    fn rescoring_counts_each_category() {
        let report = import(
            "parent,grade9,IB,optional,US,8.5,,bch,Asha\n\
             parent,grade12,IGCSE,optional,US,,92,lum_l1,Ravi\n\
             student,grade9,IB,optional,US,8.5,,,Meera\n\
             parent,grade7_or_below,CBSE,partial,US,,80,,Kiran\n",
        )
        .expect("export parses");

        assert_eq!(report.leads.len(), 4);
        assert_eq!(report.count(LeadCategory::Bch), 1);
        assert_eq!(report.count(LeadCategory::LumL1), 1);
        assert_eq!(report.count(LeadCategory::Nurture), 1);
        assert_eq!(report.count(LeadCategory::Drop), 1);
        assert_eq!(report.qualified(), 2);
        assert!(report.drifted().is_empty());
        assert_eq!(report.leads[0].full_name, "Asha");
    }

    #[test]
    fn flags_rows_whose_recorded_category_disagrees() {
        let report = import("parent,grade11,CBSE,optional,UK,7.9,,lum_l1,Dev\n")
            .expect("export parses");

        let drifted = report.drifted();
        assert_eq!(drifted.len(), 1);
        assert_eq!(drifted[0].category, LeadCategory::Bch);
        assert_eq!(drifted[0].rule, "indian_curriculum_senior_flexible");
    }

    #[test]
    fn unknown_recorded_category_degrades_to_nurture() {
        let report = import("parent,grade11,IB,optional,UK,7.9,,platinum,Dev\n")
            .expect("export parses");

        assert_eq!(report.leads[0].recorded_category, Some(LeadCategory::Nurture));
        assert_eq!(report.leads[0].category, LeadCategory::LumL1);
        assert!(report.leads[0].drifted());
    }

    #[test]
    fn both_scores_populated_is_not_treated_as_spam() {
        let report = import("parent,grade9,IB,optional,US,10,100,,Zoya\n")
            .expect("export parses");

        assert_eq!(report.leads[0].category, LeadCategory::Bch);
    }

    #[test]
    fn semicolon_separated_geographies_are_parsed() {
        let report = import("parent,grade11,IB,partial,UK;need_guidance,,75,,Ira\n")
            .expect("export parses");

        assert_eq!(report.leads[0].category, LeadCategory::LumL2);
    }

    #[test]
    fn rejects_unknown_grade_with_row_number() {
        match import(
            "parent,grade9,IB,optional,US,8.5,,,A\nparent,grade13,IB,optional,US,8.5,,,B\n",
        ) {
            Err(LeadImportError::Row { row, detail }) => {
                assert_eq!(row, 2);
                assert!(detail.contains("grade13"));
            }
            other => panic!("expected row error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_score() {
        assert!(matches!(
            import("parent,grade9,IB,optional,US,nine,,,A\n"),
            Err(LeadImportError::Row { row: 1, .. })
        ));
    }
}
