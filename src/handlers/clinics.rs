use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::doctors::{build_doctor_detail, DoctorDetailResponse};
use crate::db::queries;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ClinicListResponse {
    pub name: String,
    pub contacts: String,
    pub address: String,
    pub doctors: Vec<DoctorDetailResponse>,
}

// GET /api/clinics

pub async fn list_clinics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ClinicListResponse>>, AppError> {
    let db = state.db.lock().unwrap();

    let mut response = vec![];
    for clinic in queries::list_clinics(&db)? {
        let mut doctors = vec![];
        for doctor in queries::get_doctors_for_clinic(&db, &clinic.id)? {
            doctors.push(build_doctor_detail(&db, &doctor)?);
        }
        response.push(ClinicListResponse {
            name: clinic.name,
            contacts: clinic.contacts,
            address: clinic.address,
            doctors,
        });
    }

    Ok(Json(response))
}
