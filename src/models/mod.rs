pub mod appointment;
pub mod availability;
pub mod clinic;
pub mod doctor;
pub mod patient;
pub mod signup;
pub mod user;

pub use appointment::{Appointment, AppointmentStatus};
pub use availability::{weekday_name, AvailabilityWindow};
pub use clinic::Clinic;
pub use doctor::{Doctor, DoctorQualification, DoctorReview, DoctorWorkExperience, Specialty};
pub use patient::PatientProfile;
pub use signup::PendingSignup;
pub use user::User;

// Storage/transport formats. All three compare lexicographically in SQL in
// chronological order.
pub const DATE_FMT: &str = "%Y-%m-%d";
pub const TIME_FMT: &str = "%H:%M";
pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
