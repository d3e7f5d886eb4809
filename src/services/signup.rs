use chrono::{Duration, Utc};
use rand::Rng;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{PatientProfile, PendingSignup};
use crate::services::auth;
use crate::state::AppState;

/// 4-digit numeric verification code, zero-padded.
pub fn generate_code() -> String {
    format!("{:04}", rand::thread_rng().gen_range(0..10_000))
}

/// Caches the signup keyed by email and emails the verification code. The
/// account itself is not created until the code is confirmed; a repeat signup
/// for the same email overwrites the pending entry and invalidates the
/// previous code.
pub async fn start_signup(state: &AppState, pending: PendingSignup) -> Result<(), AppError> {
    let code = generate_code();
    let expires_at =
        Utc::now().naive_utc() + Duration::minutes(state.config.verification_ttl_minutes);

    {
        let db = state.db.lock().unwrap();

        if queries::username_taken(&db, &pending.username)? {
            return Err(AppError::Validation("username is already taken".to_string()));
        }
        if queries::email_taken(&db, &pending.email)? {
            return Err(AppError::Validation("email is already registered".to_string()));
        }

        queries::expire_old_pending_signups(&db, &Utc::now().naive_utc())?;
        queries::upsert_pending_signup(&db, &pending, &code, &expires_at)?;
    }

    tracing::info!(email = %pending.email, "signup cached, sending verification code");

    state
        .mailer
        .send_email(
            &pending.email,
            "Verification Code",
            &format!(
                "Your verification code is: {code}. Use this code to complete your registration."
            ),
        )
        .await
        .map_err(|e| AppError::Mail(e.to_string()))?;

    Ok(())
}

pub struct ConfirmedSignup {
    pub token: String,
    pub username: String,
}

/// Checks the emailed code against the unexpired pending entry and, on match,
/// materializes the account: user row, patient profile, verification audit
/// row, bearer token. The pending entry is deleted once consumed.
pub fn confirm_signup(
    state: &AppState,
    email: &str,
    code: &str,
) -> Result<ConfirmedSignup, AppError> {
    let db = state.db.lock().unwrap();
    let now = Utc::now().naive_utc();

    let (pending, stored_code) = match queries::get_pending_signup(&db, email, &now)? {
        Some(entry) => entry,
        None => {
            return Err(AppError::Validation(
                "Invalid verification code or data expired.".to_string(),
            ))
        }
    };

    if stored_code != code {
        return Err(AppError::Validation(
            "Invalid verification code or data expired.".to_string(),
        ));
    }

    let user_id = uuid::Uuid::new_v4().to_string();
    match queries::create_user(
        &db,
        &user_id,
        &pending.username,
        &pending.email,
        &pending.password_hash,
    ) {
        Ok(()) => {}
        Err(e) if queries::is_unique_violation(&e) => {
            return Err(AppError::Validation(
                "username or email is already registered".to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    }

    queries::create_patient_profile(
        &db,
        &PatientProfile {
            user_id: user_id.clone(),
            full_name: pending.full_name,
            birthdate: pending.birthdate,
            phone: pending.phone,
            gender: pending.gender,
            address: pending.address,
        },
    )?;

    queries::delete_pending_signup(&db, email)?;
    queries::record_email_verification(&db, &user_id, code)?;

    let token = auth::issue_token(&db, &user_id)?;

    tracing::info!(username = %pending.username, "email verified, account created");

    Ok(ConfirmedSignup {
        token,
        username: pending.username,
    })
}
