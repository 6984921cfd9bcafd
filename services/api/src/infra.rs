use admissions_leads::workflows::admissions::{
    EventTransport, LeadId, LeadQualificationService, LeadRecord, LeadRepository, LeadWebhook,
    LeadWebhookPayload, RepositoryError, SuffixedTransport, TransportError, WebhookError,
};
use chrono::{NaiveDate, NaiveDateTime};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

pub(crate) type LeadService = LeadQualificationService<
    InMemoryLeadRepository,
    SuffixedTransport<LoggingEventTransport>,
    LoggingWebhook,
>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLeadRepository {
    records: Arc<Mutex<HashMap<LeadId, LeadRecord>>>,
}

impl InMemoryLeadRepository {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<LeadId, LeadRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl LeadRepository for InMemoryLeadRepository {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.lead_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.lead_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: LeadRecord) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.lead_id) {
            guard.insert(record.lead_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }
}

/// Stand-in for the pixel / conversions API: one log line per event.
#[derive(Default, Clone)]
pub(crate) struct LoggingEventTransport {
    dispatched: Arc<Mutex<Vec<String>>>,
}

impl LoggingEventTransport {
    pub(crate) fn dispatched(&self) -> Vec<String> {
        self.dispatched
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl EventTransport for LoggingEventTransport {
    fn dispatch(&self, lead_id: &LeadId, events: &[String]) -> Result<(), TransportError> {
        for name in events {
            info!(lead_id = %lead_id, event = %name, "tracking event dispatched");
        }
        self.dispatched
            .lock()
            .map_err(|_| TransportError::Unavailable("transport mutex poisoned".to_string()))?
            .extend(events.iter().cloned());
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct LoggingWebhook {
    forwarded: Arc<Mutex<Vec<LeadWebhookPayload>>>,
}

impl LoggingWebhook {
    pub(crate) fn forwarded(&self) -> Vec<LeadWebhookPayload> {
        self.forwarded
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl LeadWebhook for LoggingWebhook {
    fn forward(&self, payload: &LeadWebhookPayload) -> Result<(), WebhookError> {
        info!(
            lead_id = %payload.lead_id,
            category = payload.category,
            is_qualified = payload.is_qualified,
            is_counselling_booked = payload.is_counselling_booked,
            "lead forwarded to crm"
        );
        self.forwarded
            .lock()
            .map_err(|_| WebhookError::Delivery("webhook mutex poisoned".to_string()))?
            .push(payload.clone());
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Accepts `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD HH:MM`.
pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M"))
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DDTHH:MM ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_both_datetime_forms() {
        let t = parse_datetime("2026-10-16T19:05").expect("t form");
        let space = parse_datetime("2026-10-16 19:05").expect("space form");
        assert_eq!(t, space);
        assert_eq!(t.hour(), 19);
        assert!(parse_datetime("16/10/2026").is_err());
    }

    #[test]
    fn suffixed_logging_transport_records_suffixed_names() {
        let transport = SuffixedTransport::new(LoggingEventTransport::default(), "_prod");
        transport
            .dispatch(
                &LeadId("lead-000001".to_string()),
                &["lead_page_1_complete".to_string()],
            )
            .expect("dispatch");

        assert_eq!(
            transport.inner().dispatched(),
            vec!["lead_page_1_complete_prod".to_string()]
        );
    }
}
