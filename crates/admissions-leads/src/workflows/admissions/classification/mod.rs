mod qualification;
mod rules;

pub use qualification::QualificationView;
pub use rules::{Rule, RuleTier};

use super::domain::{AttributeRecord, FormFillerType, LeadCategory};
use serde::Serialize;

/// Category plus the rule that produced it, for audit trails and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationOutcome {
    pub category: LeadCategory,
    pub rule: &'static str,
    pub tier: RuleTier,
}

/// Map a Page 1 snapshot to its lead category.
pub fn classify(record: &AttributeRecord) -> LeadCategory {
    explain(record).category
}

/// Classify a copy of `record` as though `role` had filled in the form.
///
/// Used for the "would this student qualify if a parent applied" analytics signal; the
/// caller's record and any routing derived from it are untouched.
pub fn classify_as(record: &AttributeRecord, role: FormFillerType) -> LeadCategory {
    classify(&record.with_form_filler(role))
}

pub fn explain(record: &AttributeRecord) -> ClassificationOutcome {
    let rule = rules::first_match(record);
    tracing::debug!(
        rule = rule.name,
        category = rule.category.label(),
        role = record.form_filler_type.label(),
        grade = record.current_grade.label(),
        curriculum = record.curriculum_type.label(),
        scholarship = record.scholarship_requirement.label(),
        "lead classified"
    );

    ClassificationOutcome {
        category: rule.category,
        rule: rule.name,
        tier: rule.tier,
    }
}

/// The decision table in precedence order, fallback excluded.
pub fn ladder() -> &'static [Rule] {
    &rules::LADDER
}
