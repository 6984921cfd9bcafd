use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::availability::TimeSlot;
use super::classification::{ClassificationOutcome, QualificationView};
use super::counselors::Counselor;
use super::domain::{AttributeRecord, LeadCategory, LeadId};
use super::events::{EventLog, FiredEvent};
use super::routing::RoutingDecision;

/// Counselling call chosen on the booking page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub counselor: Counselor,
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

/// Stored state of a lead: the latest Page 1 snapshot and everything derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct LeadRecord {
    pub lead_id: LeadId,
    pub attributes: AttributeRecord,
    pub classification: ClassificationOutcome,
    pub qualification: QualificationView,
    pub routing: RoutingDecision,
    pub booking: Option<Booking>,
    pub events: EventLog,
    pub completed: bool,
    /// Bumped on every Page 1 resubmission.
    pub revision: u32,
}

impl LeadRecord {
    pub fn category(&self) -> LeadCategory {
        self.classification.category
    }

    pub fn is_counselling_booked(&self) -> bool {
        self.booking.is_some()
    }

    /// Flat row handed to the persistence layer.
    pub fn persistence_view(&self) -> LeadPersistenceView {
        LeadPersistenceView {
            lead_id: self.lead_id.clone(),
            category: self.category().label(),
            is_qualified: self.qualification.is_qualified,
            is_counselling_booked: self.is_counselling_booked(),
        }
    }

    pub fn status_view(&self) -> LeadView {
        LeadView {
            lead_id: self.lead_id.clone(),
            category: self.category(),
            qualification: self.qualification,
            routing: self.routing.clone(),
            booking: self.booking.clone(),
            is_counselling_booked: self.is_counselling_booked(),
            completed: self.completed,
            events: self.events.entries().to_vec(),
        }
    }

    pub fn webhook_payload(&self) -> LeadWebhookPayload {
        LeadWebhookPayload {
            lead_id: self.lead_id.clone(),
            category: self.category().label(),
            is_qualified: self.qualification.is_qualified,
            is_counselling_booked: self.is_counselling_booked(),
            attributes: self.attributes.clone(),
            booking: self.booking.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadPersistenceView {
    pub lead_id: LeadId,
    pub category: &'static str,
    pub is_qualified: bool,
    pub is_counselling_booked: bool,
}

/// Response body for lead endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct LeadView {
    pub lead_id: LeadId,
    pub category: LeadCategory,
    pub qualification: QualificationView,
    pub routing: RoutingDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
    pub is_counselling_booked: bool,
    pub completed: bool,
    pub events: Vec<FiredEvent>,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait LeadRepository: Send + Sync {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, RepositoryError>;
    fn update(&self, record: LeadRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound analytics sink (pixel / conversions API).
pub trait EventTransport: Send + Sync {
    fn dispatch(&self, lead_id: &LeadId, events: &[String]) -> Result<(), TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("event transport unavailable: {0}")]
    Unavailable(String),
}

/// Appends the environment suffix to each event name before handing it on.
#[derive(Debug, Clone)]
pub struct SuffixedTransport<T> {
    inner: T,
    suffix: String,
}

impl<T> SuffixedTransport<T> {
    pub fn new(inner: T, suffix: impl Into<String>) -> Self {
        Self {
            inner,
            suffix: suffix.into(),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: EventTransport> EventTransport for SuffixedTransport<T> {
    fn dispatch(&self, lead_id: &LeadId, events: &[String]) -> Result<(), TransportError> {
        let suffixed: Vec<String> = events
            .iter()
            .map(|name| format!("{name}{}", self.suffix))
            .collect();
        self.inner.dispatch(lead_id, &suffixed)
    }
}

/// CRM forwarding hook fired when a lead completes the form.
pub trait LeadWebhook: Send + Sync {
    fn forward(&self, payload: &LeadWebhookPayload) -> Result<(), WebhookError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadWebhookPayload {
    pub lead_id: LeadId,
    pub category: &'static str,
    pub is_qualified: bool,
    pub is_counselling_booked: bool,
    pub attributes: AttributeRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("webhook delivery failed: {0}")]
    Delivery(String),
}
