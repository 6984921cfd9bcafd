use serde::{Deserialize, Serialize};

use super::classification::QualificationView;
use super::counselors::{Counselor, CounselorProfile};
use super::domain::{AttributeRecord, FormFillerType, LeadCategory};

/// Terminal page the form moves to once Page 1 is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOutcome {
    ImmediateSubmitDrop,
    ImmediateSubmitNurture,
    BookingPage,
    ContactOnly,
}

impl PageOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ImmediateSubmitDrop => "immediate_submit_drop",
            Self::ImmediateSubmitNurture => "immediate_submit_nurture",
            Self::BookingPage => "booking_page",
            Self::ContactOnly => "contact_only",
        }
    }

    /// Outcomes that end the flow without a second page.
    pub const fn submits_immediately(self) -> bool {
        matches!(self, Self::ImmediateSubmitDrop | Self::ImmediateSubmitNurture)
    }
}

/// One-shot routing result for a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingDecision {
    pub outcome: PageOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counselor: Option<CounselorProfile>,
    /// Evaluation interstitial shown before the booking page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interstitial_ms: Option<u64>,
}

impl RoutingDecision {
    pub fn counselor(&self) -> Option<Counselor> {
        self.counselor.map(|profile| profile.counselor)
    }
}

/// Chooses the page, counsellor and interstitial for a classified record.
#[derive(Debug, Clone)]
pub struct RoutingPolicy {
    evaluation_delay_ms: u64,
}

impl RoutingPolicy {
    pub fn new(evaluation_delay_ms: u64) -> Self {
        Self {
            evaluation_delay_ms,
        }
    }

    pub fn route(
        &self,
        record: &AttributeRecord,
        category: LeadCategory,
        view: &QualificationView,
    ) -> RoutingDecision {
        let outcome = select_outcome(record.form_filler_type, category, view);

        match outcome {
            PageOutcome::BookingPage => RoutingDecision {
                outcome,
                counselor: Some(Counselor::for_category(category).profile()),
                interstitial_ms: Some(self.evaluation_delay_ms),
            },
            _ => RoutingDecision {
                outcome,
                counselor: None,
                interstitial_ms: None,
            },
        }
    }
}

// Students never reach booking, whatever the parent simulation says.
fn select_outcome(
    role: FormFillerType,
    category: LeadCategory,
    view: &QualificationView,
) -> PageOutcome {
    if category == LeadCategory::Drop {
        return PageOutcome::ImmediateSubmitDrop;
    }

    if role == FormFillerType::Student {
        return PageOutcome::ImmediateSubmitNurture;
    }

    if view.is_qualified {
        return PageOutcome::BookingPage;
    }

    PageOutcome::ContactOnly
}
