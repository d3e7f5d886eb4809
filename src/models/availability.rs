use chrono::NaiveTime;

/// A standing weekly window during which a doctor accepts appointments.
/// A doctor may have several windows on the same weekday; overlapping windows
/// are tolerated and only widen what the slot validator accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityWindow {
    pub doctor_id: String,
    /// Monday = 1 through Sunday = 7.
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

pub fn weekday_name(day: u8) -> &'static str {
    match day {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        7 => "Sunday",
        _ => "",
    }
}
