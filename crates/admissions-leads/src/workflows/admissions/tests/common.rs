use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::config::LeadConfig;
use crate::workflows::admissions::clock::FixedClock;
use crate::workflows::admissions::domain::{
    AcademicScore, AttributeRecord, ContactDetails, CurrentGrade, CurriculumType,
    FormFillerType, LeadId, ScholarshipRequirement, TargetGeography,
};
use crate::workflows::admissions::repository::{
    EventTransport, LeadRecord, LeadRepository, LeadWebhook, LeadWebhookPayload,
    RepositoryError, TransportError, WebhookError,
};
use crate::workflows::admissions::{lead_router, LeadQualificationService};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn at(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, 0, 0).expect("valid time")
}

/// Tuesday 13 October 2026, 09:00 counsellor time.
pub(super) fn tuesday_morning() -> NaiveDateTime {
    at(date(2026, 10, 13), 9)
}

pub(super) fn wednesday() -> NaiveDate {
    date(2026, 10, 14)
}

pub(super) fn sunday() -> NaiveDate {
    date(2026, 10, 18)
}

pub(super) fn monday() -> NaiveDate {
    date(2026, 10, 19)
}

fn geographies(values: &[TargetGeography]) -> BTreeSet<TargetGeography> {
    values.iter().copied().collect()
}

pub(super) fn parent_record(
    grade: CurrentGrade,
    curriculum: CurriculumType,
    scholarship: ScholarshipRequirement,
    targets: &[TargetGeography],
) -> AttributeRecord {
    AttributeRecord {
        form_filler_type: FormFillerType::Parent,
        current_grade: grade,
        curriculum_type: curriculum,
        scholarship_requirement: scholarship,
        target_geographies: geographies(targets),
        academic_score: Some(AcademicScore::gpa("8.4").expect("valid gpa")),
        contact: ContactDetails {
            full_name: "Anita Rao".to_string(),
            phone: "+91 98450 12345".to_string(),
            email: "anita.rao@example.com".to_string(),
            school: "Greenwood High".to_string(),
            location: "Bengaluru".to_string(),
        },
    }
}

pub(super) fn student_record(
    grade: CurrentGrade,
    curriculum: CurriculumType,
    scholarship: ScholarshipRequirement,
    targets: &[TargetGeography],
) -> AttributeRecord {
    parent_record(grade, curriculum, scholarship, targets).with_form_filler(FormFillerType::Student)
}

/// Parent, grade 9, IB, optional scholarship, US: the canonical BCH lead.
pub(super) fn bch_record() -> AttributeRecord {
    parent_record(
        CurrentGrade::Grade9,
        CurriculumType::Ib,
        ScholarshipRequirement::Optional,
        &[TargetGeography::Us],
    )
}

/// Parent, grade 12, IGCSE, optional scholarship, US: Luminaire L1.
pub(super) fn luminaire_record() -> AttributeRecord {
    parent_record(
        CurrentGrade::Grade12,
        CurriculumType::Igcse,
        ScholarshipRequirement::Optional,
        &[TargetGeography::Us],
    )
}

pub(super) fn nurture_record() -> AttributeRecord {
    parent_record(
        CurrentGrade::Grade9,
        CurriculumType::Ib,
        ScholarshipRequirement::Full,
        &[TargetGeography::Us],
    )
}

pub(super) fn lead_config() -> LeadConfig {
    LeadConfig {
        evaluation_delay_ms: 2500,
        ..LeadConfig::default()
    }
}

pub(super) type TestService =
    LeadQualificationService<MemoryRepository, RecordingTransport, RecordingWebhook>;

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryRepository>,
    Arc<RecordingTransport>,
    Arc<RecordingWebhook>,
) {
    build_service_at(tuesday_morning())
}

pub(super) fn build_service_at(
    now: NaiveDateTime,
) -> (
    TestService,
    Arc<MemoryRepository>,
    Arc<RecordingTransport>,
    Arc<RecordingWebhook>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let transport = Arc::new(RecordingTransport::default());
    let webhook = Arc::new(RecordingWebhook::default());
    let service = LeadQualificationService::with_clock(
        repository.clone(),
        transport.clone(),
        webhook.clone(),
        &lead_config(),
        Arc::new(FixedClock(now)),
    );
    (service, repository, transport, webhook)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<LeadId, LeadRecord>>>,
}

impl LeadRepository for MemoryRepository {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.lead_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.lead_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: LeadRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.lead_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct UnavailableRepository;

impl LeadRepository for UnavailableRepository {
    fn insert(&self, _record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: LeadRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct RecordingTransport {
    batches: Arc<Mutex<Vec<(LeadId, Vec<String>)>>>,
}

impl RecordingTransport {
    pub(super) fn batches(&self) -> Vec<(LeadId, Vec<String>)> {
        self.batches.lock().expect("transport mutex poisoned").clone()
    }

    pub(super) fn names(&self) -> Vec<String> {
        self.batches()
            .into_iter()
            .flat_map(|(_, names)| names)
            .collect()
    }
}

impl EventTransport for RecordingTransport {
    fn dispatch(&self, lead_id: &LeadId, events: &[String]) -> Result<(), TransportError> {
        self.batches
            .lock()
            .expect("transport mutex poisoned")
            .push((lead_id.clone(), events.to_vec()));
        Ok(())
    }
}

pub(super) struct OfflineTransport;

impl EventTransport for OfflineTransport {
    fn dispatch(&self, _lead_id: &LeadId, _events: &[String]) -> Result<(), TransportError> {
        Err(TransportError::Unavailable("pixel endpoint timeout".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct RecordingWebhook {
    payloads: Arc<Mutex<Vec<LeadWebhookPayload>>>,
}

impl RecordingWebhook {
    pub(super) fn payloads(&self) -> Vec<LeadWebhookPayload> {
        self.payloads.lock().expect("webhook mutex poisoned").clone()
    }
}

impl LeadWebhook for RecordingWebhook {
    fn forward(&self, payload: &LeadWebhookPayload) -> Result<(), WebhookError> {
        self.payloads
            .lock()
            .expect("webhook mutex poisoned")
            .push(payload.clone());
        Ok(())
    }
}

pub(super) struct OfflineWebhook;

impl LeadWebhook for OfflineWebhook {
    fn forward(&self, _payload: &LeadWebhookPayload) -> Result<(), WebhookError> {
        Err(WebhookError::Delivery("crm returned 503".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    lead_router(Arc::new(service))
}
