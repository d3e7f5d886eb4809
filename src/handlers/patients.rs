use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{PatientProfile, PendingSignup, User, DATE_FMT};
use crate::services::{auth, signup};
use crate::state::AppState;

// POST /api/patients

#[derive(Deserialize)]
pub struct SignupUser {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub user: SignupUser,
    pub full_name: String,
    pub birthdate: String,
    pub phone: String,
    pub gender: String,
    #[serde(default)]
    pub address: Option<String>,
}

fn validate_signup(req: &SignupRequest) -> Result<(), AppError> {
    if req.user.username.trim().is_empty() {
        return Err(AppError::Validation("username must not be empty".to_string()));
    }
    if !req.user.email.contains('@') {
        return Err(AppError::Validation(format!(
            "invalid email address: {}",
            req.user.email
        )));
    }
    if req.user.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    if req.full_name.trim().is_empty() {
        return Err(AppError::Validation("full_name must not be empty".to_string()));
    }
    if req.phone.trim().is_empty() {
        return Err(AppError::Validation("phone must not be empty".to_string()));
    }
    if req.gender.trim().is_empty() {
        return Err(AppError::Validation("gender must not be empty".to_string()));
    }
    Ok(())
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    validate_signup(&req)?;
    let birthdate = super::parse_date(&req.birthdate)?;

    let pending = PendingSignup {
        username: req.user.username.trim().to_string(),
        email: req.user.email.trim().to_string(),
        password_hash: auth::hash_password(&req.user.password)?,
        full_name: req.full_name,
        birthdate,
        phone: req.phone,
        gender: req.gender,
        address: req.address,
    };

    signup::start_signup(&state, pending).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "detail": "Signup data cached. Please verify your email."
        })),
    ))
}

// POST /api/verify-email

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let confirmed = signup::confirm_signup(&state, req.email.trim(), req.code.trim())?;

    Ok(Json(serde_json::json!({
        "detail": "Email verified successfully.",
        "token": confirmed.token,
        "username": confirmed.username,
    })))
}

// POST /api/login

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = state.db.lock().unwrap();

    let user = match queries::get_user_by_username(&db, &req.username)? {
        Some(user) if auth::verify_password(&user.password_hash, &req.password) => user,
        _ => return Err(AppError::Unauthorized),
    };

    let token = auth::issue_token(&db, &user.id)?;

    Ok(Json(serde_json::json!({
        "token": token,
        "username": user.username,
    })))
}

// GET /api/patients/:username

#[derive(Serialize)]
pub struct ProfileUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: ProfileUser,
    pub full_name: String,
    pub birthdate: String,
    pub phone: String,
    pub gender: String,
    pub address: Option<String>,
}

fn profile_response(user: &User, profile: &PatientProfile) -> ProfileResponse {
    ProfileResponse {
        user: ProfileUser {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
        },
        full_name: profile.full_name.clone(),
        birthdate: profile.birthdate.format(DATE_FMT).to_string(),
        phone: profile.phone.clone(),
        gender: profile.gender.clone(),
        address: profile.address.clone(),
    }
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let db = state.db.lock().unwrap();
    auth::require_user(&db, &headers)?;

    let user = queries::get_user_by_username(&db, &username)?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
    let profile = queries::get_patient_profile(&db, &user.id)?
        .ok_or_else(|| AppError::NotFound("no associated patient profile".to_string()))?;

    Ok(Json(profile_response(&user, &profile)))
}

// PUT /api/patients/:username

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(username): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let db = state.db.lock().unwrap();
    let caller = auth::require_user(&db, &headers)?;

    // Patients can only edit their own profile.
    if caller.username != username {
        return Err(AppError::NotFound("user not found".to_string()));
    }

    if let Some(email) = &req.email {
        if !email.contains('@') {
            return Err(AppError::Validation(format!("invalid email address: {email}")));
        }
        match queries::update_user_email(&db, &caller.id, email.trim()) {
            Ok(()) => {}
            Err(e) if queries::is_unique_violation(&e) => {
                return Err(AppError::Validation(
                    "email is already registered".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
        }
    }

    queries::update_patient_contact(&db, &caller.id, req.phone.as_deref(), req.address.as_deref())?;

    let user = queries::get_user_by_id(&db, &caller.id)?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
    let profile = queries::get_patient_profile(&db, &caller.id)?
        .ok_or_else(|| AppError::NotFound("no associated patient profile".to_string()))?;

    Ok(Json(profile_response(&user, &profile)))
}
