use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Signup data held until the emailed verification code is entered. Serialized
/// as JSON into the `pending_signups` row for its email; a repeat signup for
/// the same email before the code expires overwrites the previous attempt
/// (last-write-wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSignup {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub birthdate: NaiveDate,
    pub phone: String,
    pub gender: String,
    pub address: Option<String>,
}
