use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct Doctor {
    pub id: String,
    pub user_id: Option<String>,
    pub full_name: String,
    pub birthdate: NaiveDate,
    pub phone: String,
    pub license_no: String,
    pub clinic_id: String,
    pub specialty_id: String,
}

#[derive(Debug, Clone)]
pub struct Specialty {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct DoctorQualification {
    pub doctor_id: String,
    pub qualification: String,
    pub institution: String,
    pub year_obtained: i32,
}

#[derive(Debug, Clone)]
pub struct DoctorWorkExperience {
    pub doctor_id: String,
    pub place_of_experience: String,
    pub start_year: i32,
    pub end_year: Option<i32>,
    pub position: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DoctorReview {
    pub doctor_id: String,
    pub rating: i32,
    pub review: Option<String>,
}
