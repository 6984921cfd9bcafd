//! Lead capture for the admissions landing page.
//!
//! Page 1 answers become an [`AttributeRecord`], which is classified exactly once into a
//! [`LeadCategory`]. Routing, counsellor availability and tracking-event selection are all
//! derived from that single result. Persistence, analytics transport and CRM forwarding
//! sit behind the traits in [`repository`].

pub mod availability;
pub mod classification;
pub mod clock;
pub mod counselors;
pub mod domain;
pub mod events;
pub mod repository;
pub mod router;
pub mod routing;
pub mod service;

#[cfg(test)]
mod tests;

pub use availability::{available_slots, TimeSlot};
pub use classification::{
    classify, classify_as, explain, ClassificationOutcome, QualificationView, RuleTier,
};
pub use clock::{Clock, FixedClock, OffsetClock};
pub use counselors::{Counselor, CounselorProfile};
pub use domain::{
    AcademicScore, AttributeRecord, ContactDetails, CurrentGrade, CurriculumType,
    FormFillerType, LeadCategory, LeadId, ScholarshipRequirement, ScoreError, ScoreKind,
    TargetGeography, UnknownLabel,
};
pub use events::{select_events, EventLog, FiredEvent, LifecycleStage};
pub use repository::{
    Booking, EventTransport, LeadPersistenceView, LeadRecord, LeadRepository, LeadView,
    LeadWebhook, LeadWebhookPayload, RepositoryError, SuffixedTransport, TransportError,
    WebhookError,
};
pub use router::lead_router;
pub use routing::{PageOutcome, RoutingDecision, RoutingPolicy};
pub use service::{BookingError, LeadQualificationService, LeadServiceError};
