use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::models::AvailabilityWindow;

pub const SLOT_MINUTES: i64 = 30;

#[derive(Debug, PartialEq, Eq)]
pub enum SlotError {
    InvalidDuration,
    NoAvailability,
}

impl std::fmt::Display for SlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotError::InvalidDuration => {
                write!(f, "Appointments must be exactly 30 minutes long.")
            }
            SlotError::NoAvailability => {
                write!(
                    f,
                    "No matching doctor availability for the selected time slot."
                )
            }
        }
    }
}

/// Weekday of `date` with Monday = 1 through Sunday = 7.
pub fn iso_weekday(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// Decides whether a requested slot is schedulable against the doctor's
/// standing weekly windows: the slot must be exactly 30 minutes and fully
/// contained in some window on the request's weekday. Pure; the caller loads
/// `windows` and persists only on acceptance.
///
/// Start and end are anchored to the same `date`, so a slot can never cross
/// midnight — an end before the start simply fails the duration check.
pub fn validate_slot(
    windows: &[AvailabilityWindow],
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Result<(), SlotError> {
    if end.signed_duration_since(start) != Duration::minutes(SLOT_MINUTES) {
        return Err(SlotError::InvalidDuration);
    }

    let day = iso_weekday(date);
    let covered = windows
        .iter()
        .any(|w| w.day_of_week == day && w.start_time <= start && w.end_time >= end);

    if !covered {
        return Err(SlotError::NoAvailability);
    }
    Ok(())
}
