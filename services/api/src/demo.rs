use crate::infra::{
    parse_date, parse_datetime, InMemoryLeadRepository, LeadService, LoggingEventTransport,
    LoggingWebhook,
};
use admissions_leads::config::{AppConfig, LeadConfig};
use admissions_leads::error::AppError;
use admissions_leads::workflows::admissions::availability::bookable_dates;
use admissions_leads::workflows::admissions::{
    available_slots, AcademicScore, AttributeRecord, Clock, ContactDetails, Counselor,
    CurrentGrade, CurriculumType, FixedClock, FormFillerType, LeadQualificationService,
    LeadRecord, OffsetClock, PageOutcome, ScholarshipRequirement, SuffixedTransport,
    TargetGeography,
};
use admissions_leads::workflows::import::{LeadCsvImporter, LeadImportReport};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Lead export to re-score
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Print one line per row in addition to the distribution
    #[arg(long)]
    pub(crate) list_rows: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SlotsArgs {
    /// Counsellor desk: bch (a) or luminaire (b)
    #[arg(long)]
    pub(crate) counselor: Counselor,
    /// Date to enumerate (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: NaiveDate,
    /// Counsellor-local "now" (YYYY-MM-DDTHH:MM). Defaults to the configured clock.
    #[arg(long, value_parser = parse_datetime)]
    pub(crate) now: Option<NaiveDateTime>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Counsellor-local "now" (YYYY-MM-DDTHH:MM). Defaults to the configured clock.
    #[arg(long, value_parser = parse_datetime)]
    pub(crate) now: Option<NaiveDateTime>,
    /// Print the stored status payload for each scenario
    #[arg(long)]
    pub(crate) show_payloads: bool,
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let report = LeadCsvImporter::from_path(&args.csv)?;
    render_import_report(&report, args.list_rows);
    Ok(())
}

pub(crate) fn run_slots(args: SlotsArgs) -> Result<(), AppError> {
    let now = match args.now {
        Some(now) => now,
        None => counselor_now(&AppConfig::load()?.leads),
    };
    let profile = args.counselor.profile();
    let slots = available_slots(args.counselor, args.date, now);

    println!(
        "{} on {} ({})",
        profile.display_name,
        args.date.format("%A %d %B %Y"),
        args.date
    );
    if slots.is_empty() {
        println!("- no slots available");
    } else {
        for slot in slots {
            println!("- {}", slot.label);
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?.leads;
    let now = args.now.unwrap_or_else(|| counselor_now(&config));
    let (service, transport, webhook) = demo_service(&config, now);

    println!("Admissions lead qualification demo");
    println!("Counsellor clock: {}", now.format("%A %d %B %Y %H:%M"));

    for (title, attributes) in demo_scenarios() {
        println!("\n{title}");
        if let Err(err) = walk_scenario(&service, attributes, now, args.show_payloads) {
            println!("  Scenario aborted: {err}");
        }
    }

    let dispatched = transport.inner().dispatched();
    println!(
        "\nTracking events dispatched: {} (suffix {})",
        dispatched.len(),
        config.event_suffix
    );
    println!("CRM payloads forwarded: {}", webhook.forwarded().len());
    Ok(())
}

fn counselor_now(config: &LeadConfig) -> NaiveDateTime {
    OffsetClock::new(config.utc_offset).now()
}

fn demo_service(
    config: &LeadConfig,
    now: NaiveDateTime,
) -> (
    LeadService,
    Arc<SuffixedTransport<LoggingEventTransport>>,
    Arc<LoggingWebhook>,
) {
    let transport = Arc::new(SuffixedTransport::new(
        LoggingEventTransport::default(),
        config.event_suffix.clone(),
    ));
    let webhook = Arc::new(LoggingWebhook::default());
    let service = LeadQualificationService::with_clock(
        Arc::new(InMemoryLeadRepository::default()),
        transport.clone(),
        webhook.clone(),
        config,
        Arc::new(FixedClock(now)),
    );
    (service, transport, webhook)
}

fn walk_scenario(
    service: &LeadService,
    attributes: AttributeRecord,
    now: NaiveDateTime,
    show_payloads: bool,
) -> Result<(), AppError> {
    let record = service.submit_page_one(attributes)?;
    println!(
        "- {} -> {} via rule {} | outcome {}",
        record.lead_id,
        record.category(),
        record.classification.rule,
        record.routing.outcome.label()
    );
    if record.qualification.would_qualify_as_parent {
        println!("  Would qualify if a parent had applied");
    }
    if record.qualification.is_spam {
        println!("  Flagged as spam (sentinel score)");
    }

    let record = match (record.routing.outcome, record.routing.counselor()) {
        (PageOutcome::BookingPage, Some(counselor)) => {
            book_first_open_slot(service, &record, counselor, now)?
        }
        _ => service.complete(&record.lead_id)?,
    };

    println!(
        "  Events: {}",
        record
            .events
            .entries()
            .iter()
            .map(|event| event.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    if show_payloads {
        match serde_json::to_string_pretty(&record.status_view()) {
            Ok(json) => println!("  Status payload:\n{json}"),
            Err(err) => println!("  Status payload unavailable: {err}"),
        }
    }
    Ok(())
}

fn book_first_open_slot(
    service: &LeadService,
    record: &LeadRecord,
    counselor: Counselor,
    now: NaiveDateTime,
) -> Result<LeadRecord, AppError> {
    let profile = counselor.profile();
    if let Some(delay) = record.routing.interstitial_ms {
        println!("  Evaluating profile for {delay} ms, then booking page");
    }
    println!("  Counsellor: {} ({})", profile.display_name, profile.title);
    service.view_booking_page(&record.lead_id)?;

    let Some(date) = bookable_dates(counselor, now, 7).into_iter().next() else {
        println!("  No slots in the next week; completing without booking");
        return Ok(service.complete(&record.lead_id)?);
    };
    let slots = service.available_slots(&record.lead_id, date)?;
    let Some(slot) = slots.first() else {
        return Ok(service.complete(&record.lead_id)?);
    };

    println!(
        "  {} slots on {}; booking {}",
        slots.len(),
        date,
        slot.label
    );
    Ok(service.book_counselling(&record.lead_id, date, slot.hour)?)
}

fn demo_scenarios() -> Vec<(&'static str, AttributeRecord)> {
    let parent = |grade, curriculum, scholarship, targets: &[TargetGeography], name: &str| {
        AttributeRecord {
            form_filler_type: FormFillerType::Parent,
            current_grade: grade,
            curriculum_type: curriculum,
            scholarship_requirement: scholarship,
            target_geographies: targets.iter().copied().collect(),
            academic_score: AcademicScore::gpa("8.6").ok(),
            contact: ContactDetails {
                full_name: name.to_string(),
                ..ContactDetails::default()
            },
        }
    };

    let spam = AttributeRecord {
        academic_score: AcademicScore::percentage("100").ok(),
        ..parent(
            CurrentGrade::Grade10,
            CurriculumType::Ib,
            ScholarshipRequirement::Optional,
            &[TargetGeography::Us],
            "Sentinel Score",
        )
    };

    vec![
        (
            "BCH: grade 9 IB parent, optional scholarship, US",
            parent(
                CurrentGrade::Grade9,
                CurriculumType::Ib,
                ScholarshipRequirement::Optional,
                &[TargetGeography::Us],
                "Anita Rao",
            ),
        ),
        (
            "Luminaire L1: grade 12 IGCSE parent, optional scholarship, US",
            parent(
                CurrentGrade::Grade12,
                CurriculumType::Igcse,
                ScholarshipRequirement::Optional,
                &[TargetGeography::Us],
                "Vikram Shah",
            ),
        ),
        (
            "Indian curriculum carve-out: grade 9 CBSE parent, partial scholarship",
            parent(
                CurrentGrade::Grade9,
                CurriculumType::Cbse,
                ScholarshipRequirement::Partial,
                &[TargetGeography::Us],
                "Meena Pillai",
            ),
        ),
        (
            "Student: grade 11 IB, optional scholarship, UK",
            parent(
                CurrentGrade::Grade11,
                CurriculumType::Ib,
                ScholarshipRequirement::Optional,
                &[TargetGeography::Uk],
                "Arjun Mehta",
            )
            .with_form_filler(FormFillerType::Student),
        ),
        ("Spam sentinel: 100 percent reported", spam),
        (
            "Drop: grade 7 parent",
            parent(
                CurrentGrade::Grade7OrBelow,
                CurriculumType::Icse,
                ScholarshipRequirement::Optional,
                &[TargetGeography::Us],
                "Kavya Nair",
            ),
        ),
    ]
}

fn render_import_report(report: &LeadImportReport, list_rows: bool) {
    println!("Lead export re-scored: {} rows", report.leads.len());
    println!("Category distribution:");
    for entry in &report.distribution {
        println!("  - {}: {}", entry.category, entry.count);
    }
    println!("Qualified for counselling: {}", report.qualified());

    let drifted = report.drifted();
    if !drifted.is_empty() {
        println!("Rows whose recorded category no longer matches:");
        for lead in drifted {
            let recorded = lead
                .recorded_category
                .map(|category| category.label())
                .unwrap_or("-");
            println!(
                "  - row {} {}: recorded {} -> now {} ({})",
                lead.row, lead.full_name, recorded, lead.category, lead.rule
            );
        }
    }

    if list_rows {
        println!("Rows:");
        for lead in &report.leads {
            println!(
                "  - row {} {} [{}] -> {} ({})",
                lead.row,
                lead.full_name,
                lead.form_filler_type.label(),
                lead.category,
                lead.rule
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn every_demo_scenario_completes() {
        let now = parse_datetime("2026-10-13T09:00").expect("valid now");
        let config = LeadConfig {
            event_suffix: "_qa".to_string(),
            ..LeadConfig::default()
        };
        let (service, transport, webhook) = demo_service(&config, now);

        for (_, attributes) in demo_scenarios() {
            walk_scenario(&service, attributes, now, false).expect("scenario runs");
        }

        let forwarded = webhook.forwarded();
        assert_eq!(forwarded.len(), demo_scenarios().len());
        assert_eq!(
            forwarded
                .iter()
                .filter(|payload| payload.is_counselling_booked)
                .count(),
            2
        );
        let dispatched = transport.inner().dispatched();
        assert!(!dispatched.is_empty());
        assert!(dispatched.iter().all(|name| name.ends_with("_qa")));
    }

    #[test]
    fn counselor_clock_follows_the_configured_offset() {
        let utc = LeadConfig {
            utc_offset: FixedOffset::east_opt(0).expect("utc"),
            ..LeadConfig::default()
        };
        let ist = LeadConfig {
            utc_offset: FixedOffset::east_opt(330 * 60).expect("ist"),
            ..LeadConfig::default()
        };

        let shift = counselor_now(&ist) - counselor_now(&utc);
        assert!((shift.num_seconds() - 330 * 60).abs() < 60);
    }
}
