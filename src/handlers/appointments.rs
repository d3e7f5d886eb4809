use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::doctors::{build_doctor_detail, DoctorDetailResponse};
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Appointment, AppointmentStatus, DATE_FMT, TIME_FMT};
use crate::services::{auth, scheduling};
use crate::state::AppState;

#[derive(Serialize)]
pub struct AppointmentResponse {
    pub id: String,
    pub doctor_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
}

fn appointment_response(appointment: &Appointment) -> AppointmentResponse {
    AppointmentResponse {
        id: appointment.id.clone(),
        doctor_id: appointment.doctor_id.clone(),
        date: appointment.date.format(DATE_FMT).to_string(),
        start_time: appointment.start_time.format(TIME_FMT).to_string(),
        end_time: appointment.end_time.format(TIME_FMT).to_string(),
        status: appointment.status.as_str().to_string(),
    }
}

fn parse_status(s: &str) -> Result<AppointmentStatus, AppError> {
    match s {
        "scheduled" => Ok(AppointmentStatus::Scheduled),
        "cancelled" => Ok(AppointmentStatus::Cancelled),
        "completed" => Ok(AppointmentStatus::Completed),
        _ => Err(AppError::Validation(format!("invalid status: {s}"))),
    }
}

// POST /api/appointments

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), AppError> {
    let db = state.db.lock().unwrap();
    let caller = auth::require_user(&db, &headers)?;

    let date = super::parse_date(&req.date)?;
    let start_time = super::parse_time(&req.start_time)?;
    let end_time = super::parse_time(&req.end_time)?;

    let doctor = queries::get_doctor_by_id(&db, &req.doctor_id)?
        .ok_or_else(|| AppError::NotFound("doctor not found".to_string()))?;

    let windows = queries::get_doctor_availability(&db, &doctor.id)?;
    scheduling::validate_slot(&windows, date, start_time, end_time)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let now = Utc::now().naive_utc();
    let appointment = Appointment {
        id: uuid::Uuid::new_v4().to_string(),
        patient_id: caller.id,
        doctor_id: doctor.id,
        date,
        start_time,
        end_time,
        status: AppointmentStatus::Scheduled,
        created_at: now,
        updated_at: now,
    };

    match queries::create_appointment(&db, &appointment) {
        Ok(()) => {}
        Err(e) if queries::is_unique_violation(&e) => {
            return Err(AppError::Conflict(
                "the selected time slot is already booked".to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(
        appointment_id = %appointment.id,
        doctor_id = %appointment.doctor_id,
        date = %req.date,
        "appointment scheduled"
    );

    Ok((StatusCode::CREATED, Json(appointment_response(&appointment))))
}

// GET /api/appointments

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    let db = state.db.lock().unwrap();
    let caller = auth::require_user(&db, &headers)?;

    let appointments = queries::get_appointments_for_patient(&db, &caller.id)?;
    Ok(Json(appointments.iter().map(appointment_response).collect()))
}

// GET /api/appointments/:id

#[derive(Serialize)]
pub struct AppointmentPatientResponse {
    pub username: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct AppointmentDetailResponse {
    pub id: String,
    pub patient: AppointmentPatientResponse,
    pub doctor: DoctorDetailResponse,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<AppointmentDetailResponse>, AppError> {
    let db = state.db.lock().unwrap();
    let caller = auth::require_user(&db, &headers)?;

    let appointment = queries::get_appointment_by_id(&db, &id)?
        .filter(|a| a.patient_id == caller.id)
        .ok_or_else(|| AppError::NotFound("appointment not found".to_string()))?;

    let doctor = queries::get_doctor_by_id(&db, &appointment.doctor_id)?
        .ok_or_else(|| AppError::NotFound("doctor not found".to_string()))?;

    Ok(Json(AppointmentDetailResponse {
        id: appointment.id.clone(),
        patient: AppointmentPatientResponse {
            username: caller.username,
            email: caller.email,
        },
        doctor: build_doctor_detail(&db, &doctor)?,
        date: appointment.date.format(DATE_FMT).to_string(),
        start_time: appointment.start_time.format(TIME_FMT).to_string(),
        end_time: appointment.end_time.format(TIME_FMT).to_string(),
        status: appointment.status.as_str().to_string(),
    }))
}

// PUT /api/appointments/:id

#[derive(Deserialize)]
pub struct UpdateAppointmentRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let db = state.db.lock().unwrap();
    let caller = auth::require_user(&db, &headers)?;

    let mut appointment = queries::get_appointment_by_id(&db, &id)?
        .filter(|a| a.patient_id == caller.id)
        .ok_or_else(|| AppError::NotFound("appointment not found".to_string()))?;

    if let Some(date) = &req.date {
        appointment.date = super::parse_date(date)?;
    }
    if let Some(start_time) = &req.start_time {
        appointment.start_time = super::parse_time(start_time)?;
    }
    if let Some(end_time) = &req.end_time {
        appointment.end_time = super::parse_time(end_time)?;
    }
    if let Some(status) = &req.status {
        appointment.status = parse_status(status)?;
    }

    // The slot is re-validated on every update, as on creation.
    let windows = queries::get_doctor_availability(&db, &appointment.doctor_id)?;
    scheduling::validate_slot(
        &windows,
        appointment.date,
        appointment.start_time,
        appointment.end_time,
    )
    .map_err(|e| AppError::Validation(e.to_string()))?;

    appointment.updated_at = Utc::now().naive_utc();

    match queries::update_appointment(&db, &appointment) {
        Ok(true) => {}
        Ok(false) => return Err(AppError::NotFound("appointment not found".to_string())),
        Err(e) if queries::is_unique_violation(&e) => {
            return Err(AppError::Conflict(
                "the selected time slot is already booked".to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Json(appointment_response(&appointment)))
}
