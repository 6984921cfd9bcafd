use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use super::counselors::Counselor;

const FIRST_HOUR: u32 = 10;
const LAST_HOUR: u32 = 20;
const BREAK_HOUR: u32 = 14;
const LEAD_TIME_HOURS: u32 = 2;

/// A bookable one-hour call starting on the hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub hour: u32,
    pub label: String,
}

impl TimeSlot {
    fn at(hour: u32) -> Self {
        Self {
            hour,
            label: hour_label(hour),
        }
    }
}

/// 12-hour clock label, e.g. `4:00 PM`.
pub fn hour_label(hour: u32) -> String {
    let (display, meridiem) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    };
    format!("{display}:00 {meridiem}")
}

/// Hours offered before any counsellor or lead-time filtering.
pub fn base_hours() -> impl Iterator<Item = u32> {
    (FIRST_HOUR..=LAST_HOUR).filter(|hour| *hour != BREAK_HOUR)
}

fn counselor_works(counselor: Counselor, weekday: Weekday, hour: u32) -> bool {
    match counselor {
        Counselor::Bch => match weekday {
            Weekday::Mon => false,
            Weekday::Sun => (11..=15).contains(&hour),
            _ => hour >= 11,
        },
        Counselor::Luminaire => match weekday {
            Weekday::Sun => false,
            _ => matches!(hour, 11..=13 | 16..=20),
        },
    }
}

/// Slots `counselor` can take on `date`, given the counsellors' local wall-clock `now`.
///
/// Same-day slots need two hours' notice. Past dates have no slots. An empty result is
/// a normal answer that the booking page renders as "no slots available".
pub fn available_slots(counselor: Counselor, date: NaiveDate, now: NaiveDateTime) -> Vec<TimeSlot> {
    let today = now.date();
    if date < today {
        return Vec::new();
    }

    let earliest = if date == today {
        now.hour() + LEAD_TIME_HOURS
    } else {
        0
    };

    base_hours()
        .filter(|hour| *hour >= earliest)
        .filter(|hour| counselor_works(counselor, date.weekday(), *hour))
        .map(TimeSlot::at)
        .collect()
}

/// The slot starting at `hour`, if the calculator would offer it.
pub fn bookable_slot(
    counselor: Counselor,
    date: NaiveDate,
    hour: u32,
    now: NaiveDateTime,
) -> Option<TimeSlot> {
    available_slots(counselor, date, now)
        .into_iter()
        .find(|slot| slot.hour == hour)
}

/// Dates within the next `days` days (today included) that still have at least one slot.
pub fn bookable_dates(counselor: Counselor, now: NaiveDateTime, days: u32) -> Vec<NaiveDate> {
    let today = now.date();
    (0..i64::from(days))
        .map(|offset| today + Duration::days(offset))
        .filter(|date| !available_slots(counselor, *date, now).is_empty())
        .collect()
}
