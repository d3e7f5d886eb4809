use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::http::HeaderMap;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::User;

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, candidate: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Returns the user's existing bearer token, creating one on first call.
pub fn issue_token(conn: &Connection, user_id: &str) -> anyhow::Result<String> {
    if let Some(token) = queries::get_token_for_user(conn, user_id)? {
        return Ok(token);
    }

    let token = uuid::Uuid::new_v4().to_string();
    queries::insert_token(conn, &token, user_id)?;
    Ok(token)
}

/// Resolves the `Authorization: Bearer` header to a confirmed user.
pub fn require_user(conn: &Connection, headers: &HeaderMap) -> Result<User, AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }

    queries::get_user_by_token(conn, token)?.ok_or(AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password(&hash, "hunter2hunter2"));
        assert!(!verify_password(&hash, "wrong"));
        assert!(!verify_password("not a phc string", "hunter2hunter2"));
    }

    #[test]
    fn test_issue_token_is_stable_per_user() {
        let conn = db::init_db(":memory:").unwrap();
        queries::create_user(&conn, "u-1", "pat", "a@example.com", "hash").unwrap();

        let first = issue_token(&conn, "u-1").unwrap();
        let second = issue_token(&conn, "u-1").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_require_user_rejects_bad_tokens() {
        let conn = db::init_db(":memory:").unwrap();
        queries::create_user(&conn, "u-1", "pat", "a@example.com", "hash").unwrap();
        let token = issue_token(&conn, "u-1").unwrap();

        let mut headers = HeaderMap::new();
        assert!(matches!(
            require_user(&conn, &headers),
            Err(AppError::Unauthorized)
        ));

        headers.insert("authorization", "Bearer nope".parse().unwrap());
        assert!(matches!(
            require_user(&conn, &headers),
            Err(AppError::Unauthorized)
        ));

        headers.insert(
            "authorization",
            format!("Bearer {token}").parse().unwrap(),
        );
        let user = require_user(&conn, &headers).unwrap();
        assert_eq!(user.username, "pat");
    }
}
