pub mod appointments;
pub mod clinics;
pub mod doctors;
pub mod health;
pub mod patients;

use chrono::{NaiveDate, NaiveTime};

use crate::errors::AppError;
use crate::models::{DATE_FMT, TIME_FMT};

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s, DATE_FMT)
        .map_err(|_| AppError::Validation(format!("invalid date (expected YYYY-MM-DD): {s}")))
}

pub(crate) fn parse_time(s: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(s, TIME_FMT)
        .map_err(|_| AppError::Validation(format!("invalid time (expected HH:MM): {s}")))
}
