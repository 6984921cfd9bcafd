use super::common::{at, date, monday, sunday, tuesday_morning, wednesday};
use crate::workflows::admissions::availability::{
    available_slots, base_hours, bookable_dates, bookable_slot, hour_label,
};
use crate::workflows::admissions::counselors::Counselor;

fn hours(counselor: Counselor, day: chrono::NaiveDate, now: chrono::NaiveDateTime) -> Vec<u32> {
    available_slots(counselor, day, now)
        .into_iter()
        .map(|slot| slot.hour)
        .collect()
}

#[test]
fn base_set_skips_the_two_pm_break() {
    let hours: Vec<u32> = base_hours().collect();
    assert_eq!(hours, vec![10, 11, 12, 13, 15, 16, 17, 18, 19, 20]);
}

#[test]
fn labels_use_twelve_hour_clock() {
    assert_eq!(hour_label(10), "10:00 AM");
    assert_eq!(hour_label(12), "12:00 PM");
    assert_eq!(hour_label(16), "4:00 PM");
    assert_eq!(hour_label(20), "8:00 PM");
}

#[test]
fn bch_is_off_on_mondays() {
    assert!(hours(Counselor::Bch, monday(), tuesday_morning()).is_empty());
}

#[test]
fn luminaire_is_off_on_sundays() {
    assert!(hours(Counselor::Luminaire, sunday(), tuesday_morning()).is_empty());
}

#[test]
fn bch_sunday_window() {
    assert_eq!(
        hours(Counselor::Bch, sunday(), tuesday_morning()),
        vec![11, 12, 13, 15]
    );
}

#[test]
fn bch_weekday_starts_at_eleven() {
    assert_eq!(
        hours(Counselor::Bch, wednesday(), tuesday_morning()),
        vec![11, 12, 13, 15, 16, 17, 18, 19, 20]
    );
}

#[test]
fn luminaire_split_shift() {
    let expected = vec![11, 12, 13, 16, 17, 18, 19, 20];
    assert_eq!(
        hours(Counselor::Luminaire, wednesday(), tuesday_morning()),
        expected
    );
    assert_eq!(
        hours(Counselor::Luminaire, monday(), tuesday_morning()),
        expected
    );
}

#[test]
fn same_day_slots_need_two_hours_notice() {
    let today = wednesday();
    let now = at(today, 13);

    assert_eq!(hours(Counselor::Bch, today, now), vec![15, 16, 17, 18, 19, 20]);
    assert_eq!(hours(Counselor::Luminaire, today, now), vec![16, 17, 18, 19, 20]);
}

#[test]
fn late_evening_leaves_nothing_today() {
    let today = date(2026, 10, 16);
    let now = at(today, 19);

    assert!(hours(Counselor::Bch, today, now).is_empty());
    assert!(hours(Counselor::Luminaire, today, now).is_empty());
}

#[test]
fn past_dates_have_no_slots() {
    let now = tuesday_morning();
    assert!(hours(Counselor::Bch, date(2026, 10, 10), now).is_empty());
}

#[test]
fn bookable_slot_comes_from_the_enumerated_slots() {
    let now = tuesday_morning();
    let slot = bookable_slot(Counselor::Luminaire, wednesday(), 16, now).expect("4 PM open");
    assert_eq!(slot.label, "4:00 PM");
    assert!(bookable_slot(Counselor::Luminaire, wednesday(), 15, now).is_none());
    assert!(bookable_slot(Counselor::Bch, wednesday(), 10, now).is_none());
}

#[test]
fn bookable_dates_skip_days_off() {
    let now = tuesday_morning();
    let dates = bookable_dates(Counselor::Bch, now, 7);

    assert_eq!(dates.len(), 6);
    assert!(!dates.contains(&monday()));
    assert_eq!(dates.first(), Some(&date(2026, 10, 13)));
}
