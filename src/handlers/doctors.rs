use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, State};
use axum::Json;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{weekday_name, Doctor, DATE_FMT, TIME_FMT};
use crate::state::AppState;

#[derive(Serialize)]
pub struct DoctorAccountResponse {
    pub username: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct ClinicInfoResponse {
    pub name: String,
    pub contacts: String,
    pub address: String,
}

#[derive(Serialize)]
pub struct ReviewResponse {
    pub rating: i32,
    pub review: Option<String>,
}

#[derive(Serialize)]
pub struct WorkExperienceResponse {
    pub place_of_experience: String,
    pub start_year: i32,
    pub end_year: Option<i32>,
    pub position: String,
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct QualificationResponse {
    pub qualification: String,
    pub institution: String,
    pub year_obtained: i32,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Serialize)]
pub struct DoctorDetailResponse {
    pub id: String,
    pub full_name: String,
    pub birthdate: String,
    pub phone: String,
    pub license_no: String,
    pub account: Option<DoctorAccountResponse>,
    pub clinic: ClinicInfoResponse,
    pub specialty: String,
    pub reviews: Vec<ReviewResponse>,
    pub experiences: Vec<WorkExperienceResponse>,
    pub qualifications: Vec<QualificationResponse>,
    pub availabilities: Vec<AvailabilityResponse>,
}

/// Assembles the full directory entry for one doctor. Shared between the
/// doctor-detail endpoint and the clinic listing.
pub(crate) fn build_doctor_detail(
    conn: &Connection,
    doctor: &Doctor,
) -> anyhow::Result<DoctorDetailResponse> {
    let clinic = queries::get_clinic(conn, &doctor.clinic_id)?
        .context("doctor references a missing clinic")?;

    let specialty = queries::get_specialty(conn, &doctor.specialty_id)?
        .map(|s| s.name)
        .unwrap_or_default();

    let account = match &doctor.user_id {
        Some(user_id) => queries::get_user_by_id(conn, user_id)?.map(|u| DoctorAccountResponse {
            username: u.username,
            email: u.email,
        }),
        None => None,
    };

    let reviews = queries::get_reviews(conn, &doctor.id)?
        .into_iter()
        .map(|r| ReviewResponse {
            rating: r.rating,
            review: r.review,
        })
        .collect();

    let experiences = queries::get_work_experience(conn, &doctor.id)?
        .into_iter()
        .map(|e| WorkExperienceResponse {
            place_of_experience: e.place_of_experience,
            start_year: e.start_year,
            end_year: e.end_year,
            position: e.position,
            description: e.description,
        })
        .collect();

    let qualifications = queries::get_qualifications(conn, &doctor.id)?
        .into_iter()
        .map(|q| QualificationResponse {
            qualification: q.qualification,
            institution: q.institution,
            year_obtained: q.year_obtained,
        })
        .collect();

    let availabilities = queries::get_doctor_availability(conn, &doctor.id)?
        .into_iter()
        .map(|w| AvailabilityResponse {
            day_of_week: weekday_name(w.day_of_week).to_string(),
            start_time: w.start_time.format(TIME_FMT).to_string(),
            end_time: w.end_time.format(TIME_FMT).to_string(),
        })
        .collect();

    Ok(DoctorDetailResponse {
        id: doctor.id.clone(),
        full_name: doctor.full_name.clone(),
        birthdate: doctor.birthdate.format(DATE_FMT).to_string(),
        phone: doctor.phone.clone(),
        license_no: doctor.license_no.clone(),
        account,
        clinic: ClinicInfoResponse {
            name: clinic.name,
            contacts: clinic.contacts,
            address: clinic.address,
        },
        specialty,
        reviews,
        experiences,
        qualifications,
        availabilities,
    })
}

// GET /api/doctors/:id

pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DoctorDetailResponse>, AppError> {
    let db = state.db.lock().unwrap();

    let doctor = queries::get_doctor_by_id(&db, &id)?
        .ok_or_else(|| AppError::NotFound("doctor not found".to_string()))?;

    Ok(Json(build_doctor_detail(&db, &doctor)?))
}
