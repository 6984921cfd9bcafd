use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::LeadConfig;

use super::availability::{self, TimeSlot};
use super::classification::{self, QualificationView};
use super::clock::{Clock, OffsetClock};
use super::counselors::Counselor;
use super::domain::{AttributeRecord, LeadId};
use super::events::{select_events, EventLog, LifecycleStage};
use super::repository::{
    Booking, EventTransport, LeadRecord, LeadRepository, LeadWebhook, RepositoryError,
};
use super::routing::{PageOutcome, RoutingPolicy};

/// Service composing classification, routing, event selection and the outbound sinks.
pub struct LeadQualificationService<R, T, W> {
    repository: Arc<R>,
    transport: Arc<T>,
    webhook: Arc<W>,
    clock: Arc<dyn Clock>,
    routing: RoutingPolicy,
}

static LEAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_lead_id() -> LeadId {
    let id = LEAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LeadId(format!("lead-{id:06}"))
}

impl<R, T, W> LeadQualificationService<R, T, W>
where
    R: LeadRepository + 'static,
    T: EventTransport + 'static,
    W: LeadWebhook + 'static,
{
    pub fn new(repository: Arc<R>, transport: Arc<T>, webhook: Arc<W>, config: &LeadConfig) -> Self {
        let clock = Arc::new(OffsetClock::new(config.utc_offset));
        Self::with_clock(repository, transport, webhook, config, clock)
    }

    pub fn with_clock(
        repository: Arc<R>,
        transport: Arc<T>,
        webhook: Arc<W>,
        config: &LeadConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            transport,
            webhook,
            clock,
            routing: RoutingPolicy::new(config.evaluation_delay_ms),
        }
    }

    /// Classify a fresh Page 1 submission and store it as a new lead.
    pub fn submit_page_one(
        &self,
        attributes: AttributeRecord,
    ) -> Result<LeadRecord, LeadServiceError> {
        let record = self.evaluate(next_lead_id(), attributes, &EventLog::new(), 1);
        let record = finish_if_immediate(record);
        let stored = self.repository.insert(record)?;

        info!(
            lead_id = %stored.lead_id,
            category = stored.category().label(),
            outcome = stored.routing.outcome.label(),
            completed = stored.completed,
            "page 1 submitted"
        );
        self.publish_page_one(&stored);
        Ok(stored)
    }

    /// Replace the Page 1 answers of an open lead.
    ///
    /// Category, routing and booking are recomputed from scratch; only the event history
    /// carries over.
    pub fn resubmit_page_one(
        &self,
        lead_id: &LeadId,
        attributes: AttributeRecord,
    ) -> Result<LeadRecord, LeadServiceError> {
        let existing = self.fetch_open(lead_id)?;
        let record = self.evaluate(
            lead_id.clone(),
            attributes,
            &existing.events,
            existing.revision + 1,
        );
        let record = finish_if_immediate(record);
        self.repository.update(record.clone())?;

        info!(
            lead_id = %record.lead_id,
            revision = record.revision,
            previous = existing.category().label(),
            category = record.category().label(),
            completed = record.completed,
            "page 1 resubmitted"
        );
        self.publish_page_one(&record);
        Ok(record)
    }

    /// Record that the booking page was shown.
    pub fn view_booking_page(&self, lead_id: &LeadId) -> Result<LeadRecord, LeadServiceError> {
        let existing = self.fetch_open(lead_id)?;
        require_booking_page(&existing)?;

        let record = self.advance(existing, LifecycleStage::Page2View);
        self.repository.update(record.clone())?;
        self.dispatch(&record, LifecycleStage::Page2View);
        Ok(record)
    }

    /// Slots open for the lead's assigned counsellor on `date`.
    pub fn available_slots(
        &self,
        lead_id: &LeadId,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, LeadServiceError> {
        let record = self.get(lead_id)?;
        let counselor = require_booking_page(&record)?;
        Ok(self.slots_for(counselor, date))
    }

    pub fn slots_for(&self, counselor: Counselor, date: NaiveDate) -> Vec<TimeSlot> {
        availability::available_slots(counselor, date, self.clock.now())
    }

    /// Book a counselling call and complete the form.
    pub fn book_counselling(
        &self,
        lead_id: &LeadId,
        date: NaiveDate,
        hour: u32,
    ) -> Result<LeadRecord, LeadServiceError> {
        let existing = self.fetch_open(lead_id)?;
        let counselor = require_booking_page(&existing)?;

        let slot = availability::bookable_slot(counselor, date, hour, self.clock.now())
            .ok_or(BookingError::SlotUnavailable { date, hour })?;

        let mut record = existing;
        record.booking = Some(Booking {
            counselor,
            date,
            slot,
        });
        let record = self.advance(record, LifecycleStage::Page2Submit);
        let mut record = self.advance(record, LifecycleStage::FormComplete);
        record.completed = true;
        self.repository.update(record.clone())?;

        info!(
            lead_id = %record.lead_id,
            counselor = counselor.label(),
            %date,
            hour,
            "counselling booked"
        );
        self.dispatch(&record, LifecycleStage::Page2Submit);
        self.dispatch(&record, LifecycleStage::FormComplete);
        self.forward(&record);
        Ok(record)
    }

    /// Finish the form without a booking. Completing twice is a no-op.
    pub fn complete(&self, lead_id: &LeadId) -> Result<LeadRecord, LeadServiceError> {
        let existing = self.get(lead_id)?;
        if existing.completed {
            return Ok(existing);
        }

        let mut record = self.advance(existing, LifecycleStage::FormComplete);
        record.completed = true;
        self.repository.update(record.clone())?;

        info!(
            lead_id = %record.lead_id,
            outcome = record.routing.outcome.label(),
            "form completed"
        );
        self.dispatch(&record, LifecycleStage::FormComplete);
        self.forward(&record);
        Ok(record)
    }

    pub fn get(&self, lead_id: &LeadId) -> Result<LeadRecord, LeadServiceError> {
        let record = self
            .repository
            .fetch(lead_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    fn fetch_open(&self, lead_id: &LeadId) -> Result<LeadRecord, LeadServiceError> {
        let record = self.get(lead_id)?;
        if record.completed {
            return Err(LeadServiceError::Completed(lead_id.clone()));
        }
        Ok(record)
    }

    // Classify once and derive every view from that single result.
    fn evaluate(
        &self,
        lead_id: LeadId,
        attributes: AttributeRecord,
        history: &EventLog,
        revision: u32,
    ) -> LeadRecord {
        let classification = classification::explain(&attributes);
        let qualification = QualificationView::derive(&attributes, classification.category);
        let routing = self
            .routing
            .route(&attributes, classification.category, &qualification);
        let events = select_events(
            LifecycleStage::Page1Complete,
            &attributes,
            classification.category,
            &qualification,
        );

        LeadRecord {
            lead_id,
            events: history.with_stage(LifecycleStage::Page1Complete, &events),
            attributes,
            classification,
            qualification,
            routing,
            booking: None,
            completed: false,
            revision,
        }
    }

    fn advance(&self, record: LeadRecord, stage: LifecycleStage) -> LeadRecord {
        let events = stage_events(&record, stage);
        LeadRecord {
            events: record.events.with_stage(stage, &events),
            ..record
        }
    }

    // Drop and student leads are submitted at Page 1, so both stages go out together.
    fn publish_page_one(&self, record: &LeadRecord) {
        self.dispatch(record, LifecycleStage::Page1Complete);
        if record.completed {
            self.dispatch(record, LifecycleStage::FormComplete);
            self.forward(record);
        }
    }

    fn dispatch(&self, record: &LeadRecord, stage: LifecycleStage) {
        let names: Vec<String> = stage_events(record, stage).into_iter().collect();
        if let Err(err) = self.transport.dispatch(&record.lead_id, &names) {
            warn!(
                lead_id = %record.lead_id,
                stage = stage.label(),
                error = %err,
                "tracking events not delivered"
            );
        }
    }

    fn forward(&self, record: &LeadRecord) {
        if let Err(err) = self.webhook.forward(&record.webhook_payload()) {
            warn!(lead_id = %record.lead_id, error = %err, "lead webhook not delivered");
        }
    }
}

fn finish_if_immediate(record: LeadRecord) -> LeadRecord {
    if !record.routing.outcome.submits_immediately() {
        return record;
    }
    let events = stage_events(&record, LifecycleStage::FormComplete);
    LeadRecord {
        events: record.events.with_stage(LifecycleStage::FormComplete, &events),
        completed: true,
        ..record
    }
}

fn stage_events(record: &LeadRecord, stage: LifecycleStage) -> BTreeSet<String> {
    select_events(
        stage,
        &record.attributes,
        record.category(),
        &record.qualification,
    )
}

fn require_booking_page(record: &LeadRecord) -> Result<Counselor, BookingError> {
    match (record.routing.outcome, record.routing.counselor()) {
        (PageOutcome::BookingPage, Some(counselor)) => Ok(counselor),
        (outcome, _) => Err(BookingError::NotOffered { outcome }),
    }
}

/// Booking-page specific failures.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("counselling booking not offered for outcome {outcome:?}")]
    NotOffered { outcome: PageOutcome },
    #[error("no slot at {hour}:00 on {date}")]
    SlotUnavailable { date: NaiveDate, hour: u32 },
}

/// Error raised by the lead qualification service.
#[derive(Debug, thiserror::Error)]
pub enum LeadServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error("lead {0} already completed the form")]
    Completed(LeadId),
}
