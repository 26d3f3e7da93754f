// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;

use crate::config::Config;
use crate::db::{Database, DbConnection};
use crate::error::ApiError;
use crate::models::session::{NewSession, Session};
use crate::models::user::User;
use crate::schema::{sessions, users};

const SESSION_TOKEN_LEN: usize = 48;

/// Hash a password with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash. Unparseable hashes count as a
/// failed verification.
pub fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Password policy: configured minimum length and not entirely numeric.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    let min_len = Config::get().auth.min_password_length;

    if password.chars().count() < min_len {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {min_len} characters"
        )));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::BadRequest(
            "Password can not be entirely numeric".to_string(),
        ));
    }
    Ok(())
}

/// Random alphanumeric bearer token.
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Open a new session for a user and return it.
pub async fn create_session(conn: &mut DbConnection, user_id: i32) -> Result<Session, ApiError> {
    let session = diesel::insert_into(sessions::table)
        .values(NewSession {
            token: generate_token(),
            user_id,
            created_at: Utc::now().naive_utc(),
        })
        .get_result::<Session>(conn)
        .await?;
    Ok(session)
}

/// Remove a single session; a no-op for unknown tokens.
pub async fn delete_session(conn: &mut DbConnection, token: &str) -> Result<(), ApiError> {
    diesel::delete(sessions::table.filter(sessions::token.eq(token)))
        .execute(conn)
        .await?;
    Ok(())
}

/// Revoke every session a user holds (password change, account deletion).
pub async fn revoke_user_sessions(conn: &mut DbConnection, user_id: i32) -> Result<(), ApiError> {
    diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id)))
        .execute(conn)
        .await?;
    Ok(())
}

/// Authenticated identity extracted from the `Authorization: Bearer` header.
#[derive(Debug)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

/// Like [`AuthUser`] but tolerates missing or invalid credentials.
#[derive(Debug)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

async fn lookup_session(db: &Database, token: &str) -> Result<Option<AuthUser>, ApiError> {
    let mut conn = db.get_connection().await?;

    let found = sessions::table
        .inner_join(users::table)
        .filter(sessions::token.eq(token))
        .select((Session::as_select(), User::as_select()))
        .first::<(Session, User)>(&mut conn)
        .await
        .optional()?;

    Ok(found.map(|(session, user)| AuthUser {
        user,
        token: session.token,
    }))
}

#[async_trait]
impl FromRequestParts<Arc<Database>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<Database>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            ApiError::Unauthorized("Authentication credentials were not provided".to_string())
        })?;

        lookup_session(state, &token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid session token".to_string()))
    }
}

#[async_trait]
impl FromRequestParts<Arc<Database>> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<Database>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(MaybeAuthUser(None));
        };

        Ok(MaybeAuthUser(lookup_session(state, &token).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password(&hash, "correct horse battery"));
        assert!(!verify_password(&hash, "wrong password"));
    }

    #[test]
    fn garbage_hash_fails_verification() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }

    #[test]
    fn password_policy_rejects_short_and_numeric() {
        assert!(validate_password("short1").is_err());
        assert!(validate_password("123456789012").is_err());
        assert!(validate_password("long enough pw").is_ok());
    }

    #[test]
    fn tokens_are_long_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), SESSION_TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
