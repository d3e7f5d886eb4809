use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct PatientProfile {
    pub user_id: String,
    pub full_name: String,
    pub birthdate: NaiveDate,
    pub phone: String,
    pub gender: String,
    pub address: Option<String>,
}
