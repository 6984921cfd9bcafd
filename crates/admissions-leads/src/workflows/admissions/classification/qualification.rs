use super::super::domain::{AttributeRecord, FormFillerType, LeadCategory};
use super::classify_as;
use serde::{Deserialize, Serialize};

/// Booleans derived from a classified record; shared by routing and analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationView {
    pub is_qualified: bool,
    pub is_spam: bool,
    /// Only ever true for student-filled records.
    pub would_qualify_as_parent: bool,
}

impl QualificationView {
    pub fn derive(record: &AttributeRecord, category: LeadCategory) -> Self {
        let would_qualify_as_parent = match record.form_filler_type {
            FormFillerType::Student => {
                classify_as(record, FormFillerType::Parent).is_qualified()
            }
            FormFillerType::Parent => false,
        };

        Self {
            is_qualified: category.is_qualified(),
            is_spam: record.is_spam(),
            would_qualify_as_parent,
        }
    }
}
