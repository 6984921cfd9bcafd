use super::super::domain::{
    AttributeRecord, CurrentGrade, FormFillerType, LeadCategory, ScholarshipRequirement,
    TargetGeography,
};
use serde::Serialize;

/// Where a rule sits in the precedence ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTier {
    GlobalOverride,
    IndianCurriculumCarveOut,
    Bch,
    LuminaireL1,
    LuminaireL2,
    Fallback,
}

/// One row of the decision table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub tier: RuleTier,
    pub category: LeadCategory,
    applies: fn(&AttributeRecord) -> bool,
}

impl Rule {
    pub fn applies(&self, record: &AttributeRecord) -> bool {
        (self.applies)(record)
    }
}

/// Ordered ladder; the first rule whose predicate holds decides the category.
pub(crate) static LADDER: [Rule; 13] = [
    Rule {
        name: "student_filled_form",
        tier: RuleTier::GlobalOverride,
        category: LeadCategory::Nurture,
        applies: student_filled_form,
    },
    Rule {
        name: "spam_sentinel_score",
        tier: RuleTier::GlobalOverride,
        category: LeadCategory::Nurture,
        applies: spam_sentinel_score,
    },
    Rule {
        name: "full_scholarship",
        tier: RuleTier::GlobalOverride,
        category: LeadCategory::Nurture,
        applies: full_scholarship,
    },
    Rule {
        name: "grade7_or_below",
        tier: RuleTier::GlobalOverride,
        category: LeadCategory::Drop,
        applies: grade7_or_below,
    },
    Rule {
        name: "masters_applicant",
        tier: RuleTier::GlobalOverride,
        category: LeadCategory::Masters,
        applies: masters_applicant,
    },
    Rule {
        name: "indian_curriculum_middle_band_partial",
        tier: RuleTier::IndianCurriculumCarveOut,
        category: LeadCategory::Nurture,
        applies: indian_curriculum_middle_band_partial,
    },
    Rule {
        name: "middle_band_flexible",
        tier: RuleTier::Bch,
        category: LeadCategory::Bch,
        applies: middle_band_flexible,
    },
    Rule {
        name: "indian_curriculum_senior_flexible",
        tier: RuleTier::Bch,
        category: LeadCategory::Bch,
        applies: indian_curriculum_senior_flexible,
    },
    Rule {
        name: "grade11_flexible_us",
        tier: RuleTier::Bch,
        category: LeadCategory::Bch,
        applies: grade11_flexible_us,
    },
    Rule {
        name: "grade11_optional_outside_us",
        tier: RuleTier::LuminaireL1,
        category: LeadCategory::LumL1,
        applies: grade11_optional_outside_us,
    },
    Rule {
        name: "grade12_optional",
        tier: RuleTier::LuminaireL1,
        category: LeadCategory::LumL1,
        applies: grade12_optional,
    },
    Rule {
        name: "grade11_partial_outside_us",
        tier: RuleTier::LuminaireL2,
        category: LeadCategory::LumL2,
        applies: grade11_partial_outside_us,
    },
    Rule {
        name: "grade12_partial",
        tier: RuleTier::LuminaireL2,
        category: LeadCategory::LumL2,
        applies: grade12_partial,
    },
];

pub(crate) static FALLBACK: Rule = Rule {
    name: "no_rule_matched",
    tier: RuleTier::Fallback,
    category: LeadCategory::Nurture,
    applies: always,
};

fn student_filled_form(record: &AttributeRecord) -> bool {
    record.form_filler_type == FormFillerType::Student
}

fn spam_sentinel_score(record: &AttributeRecord) -> bool {
    record.is_spam()
}

fn full_scholarship(record: &AttributeRecord) -> bool {
    record.scholarship_requirement == ScholarshipRequirement::Full
}

fn grade7_or_below(record: &AttributeRecord) -> bool {
    record.current_grade == CurrentGrade::Grade7OrBelow
}

fn masters_applicant(record: &AttributeRecord) -> bool {
    record.current_grade == CurrentGrade::Masters
}

// Tier 2 rows only ever apply to parents.
fn parent(record: &AttributeRecord) -> bool {
    record.form_filler_type == FormFillerType::Parent
}

fn indian_curriculum_middle_band_partial(record: &AttributeRecord) -> bool {
    parent(record)
        && record.curriculum_type.is_indian()
        && record.current_grade.is_middle_band()
        && record.scholarship_requirement == ScholarshipRequirement::Partial
}

fn middle_band_flexible(record: &AttributeRecord) -> bool {
    parent(record)
        && record.current_grade.is_middle_band()
        && record.scholarship_requirement.is_flexible()
}

fn indian_curriculum_senior_flexible(record: &AttributeRecord) -> bool {
    parent(record)
        && record.curriculum_type.is_indian()
        && record.current_grade.is_senior_band()
        && record.scholarship_requirement.is_flexible()
}

fn grade11_flexible_us(record: &AttributeRecord) -> bool {
    parent(record)
        && record.current_grade == CurrentGrade::Grade11
        && record.scholarship_requirement.is_flexible()
        && record.targets(TargetGeography::Us)
}

fn grade11_optional_outside_us(record: &AttributeRecord) -> bool {
    parent(record)
        && record.current_grade == CurrentGrade::Grade11
        && record.scholarship_requirement == ScholarshipRequirement::Optional
        && record.targets_outside_us()
}

fn grade12_optional(record: &AttributeRecord) -> bool {
    parent(record)
        && record.current_grade == CurrentGrade::Grade12
        && record.scholarship_requirement == ScholarshipRequirement::Optional
}

fn grade11_partial_outside_us(record: &AttributeRecord) -> bool {
    parent(record)
        && record.current_grade == CurrentGrade::Grade11
        && record.scholarship_requirement == ScholarshipRequirement::Partial
        && record.targets_outside_us()
}

fn grade12_partial(record: &AttributeRecord) -> bool {
    parent(record)
        && record.current_grade == CurrentGrade::Grade12
        && record.scholarship_requirement == ScholarshipRequirement::Partial
}

fn always(_: &AttributeRecord) -> bool {
    true
}

/// First matching row, or the fallback.
pub(crate) fn first_match(record: &AttributeRecord) -> &'static Rule {
    LADDER
        .iter()
        .find(|rule| rule.applies(record))
        .unwrap_or(&FALLBACK)
}
