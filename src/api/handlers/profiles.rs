// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::api::form::FormData;
use crate::auth::{self, AuthUser, MaybeAuthUser};
use crate::db::Database;
use crate::error::ApiError;
use crate::models::profile::{NewProfile, Profile, ProfileView};
use crate::models::user::{NewUser, User, UserLimitedView, UserView};
use crate::pagination::{paginate, parse_page};
use crate::schema::{profiles, users};
use crate::storage;
use crate::validate::{validate_email, validate_username};

use super::{like_pattern, linked_profile};

const PROFILES_PER_PAGE: i64 = 10;

/// `{profile, user}` pair with the public user projection.
fn profile_with_user(profile: &Profile, user: &User) -> Value {
    json!({
        "profile": ProfileView::from(profile),
        "user": UserLimitedView::from(user),
    })
}

/// `{profile, user}` pair including the private email field; only ever
/// returned to the account owner.
fn profile_with_full_user(profile: &Profile, user: &User) -> Value {
    json!({
        "profile": ProfileView::from(profile),
        "user": UserView::from(user),
    })
}

/// Log in with username and password, opening a new session.
pub async fn login(
    State(db): State<Arc<Database>>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = FormData::from_multipart(multipart).await?;

    let (Some(username), Some(password)) = (form.get("username"), form.get("password")) else {
        return Err(ApiError::BadRequest(
            "Must provide username and password".to_string(),
        ));
    };

    let mut conn = db.get_connection().await?;

    let user = users::table
        .filter(users::username.eq(username))
        .first::<User>(&mut conn)
        .await
        .optional()?
        .filter(|user| auth::verify_password(&user.password_hash, password))
        .ok_or_else(|| ApiError::BadRequest("Invalid credentials".to_string()))?;

    let profile = linked_profile(&mut conn, user.id).await?.ok_or_else(|| {
        ApiError::Forbidden("User does not have corresponding profile".to_string())
    })?;

    let session = auth::create_session(&mut conn, user.id).await?;

    info!("user {} logged in", user.id);

    Ok(Json(json!({
        "profile": ProfileView::from(&profile),
        "user": UserView::from(&user),
        "token": session.token,
    })))
}

/// Close the current session, if any.
pub async fn logout(
    maybe_auth: MaybeAuthUser,
    State(db): State<Arc<Database>>,
) -> Result<Json<Value>, ApiError> {
    if let Some(auth) = maybe_auth.0 {
        let mut conn = db.get_connection().await?;
        auth::delete_session(&mut conn, &auth.token).await?;
    }

    Ok(Json(json!({ "detail": "Successfully logged out" })))
}

/// Get the authenticated user's own profile, email included.
pub async fn get_self(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("User does not have connected profile".to_string())
        })?;

    Ok(Json(profile_with_full_user(&profile, &auth.user)))
}

/// Register a new user and profile, logging the new account in.
pub async fn register(
    maybe_auth: MaybeAuthUser,
    State(db): State<Arc<Database>>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    if maybe_auth.0.is_some() {
        return Err(ApiError::Forbidden(
            "Log out before creating new user".to_string(),
        ));
    }

    let form = FormData::from_multipart(multipart).await?;

    let email = form.get("email").unwrap_or_default();
    let username = form.get("username").unwrap_or_default();

    validate_email(email)?;
    validate_username(username)?;

    let mut conn = db.get_connection().await?;

    let email_taken = users::table
        .filter(users::email.eq(email))
        .count()
        .get_result::<i64>(&mut conn)
        .await?;
    if email_taken > 0 {
        return Err(ApiError::Conflict("Email is already in use".to_string()));
    }

    let username_taken = users::table
        .filter(users::username.eq(username))
        .count()
        .get_result::<i64>(&mut conn)
        .await?;
    if username_taken > 0 {
        return Err(ApiError::Conflict("Username is already in use".to_string()));
    }

    let password = form
        .get("password")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Must provide password".to_string()))?;
    auth::validate_password(password)?;

    let profile_img = match form.file("image") {
        Some(file) => Some(storage::save_image("profile_imgs", &file.file_name, &file.bytes).await?),
        None => None,
    };

    let user = diesel::insert_into(users::table)
        .values(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: auth::hash_password(password)?,
            is_admin: false,
            created_at: Utc::now().naive_utc(),
        })
        .get_result::<User>(&mut conn)
        .await?;

    let profile = diesel::insert_into(profiles::table)
        .values(NewProfile {
            user_id: user.id,
            profile_img,
        })
        .get_result::<Profile>(&mut conn)
        .await?;

    let session = auth::create_session(&mut conn, user.id).await?;

    info!("registered user {} ({username})", user.id);

    Ok(Json(json!({
        "profile": ProfileView::from(&profile),
        "user": UserView::from(&user),
        "token": session.token,
    })))
}

/// Update the authenticated user's account. The current password must be
/// supplied; email, username, password and image are each optional.
pub async fn update_self(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("User does not have connected profile".to_string())
        })?;

    let form = FormData::from_multipart(multipart).await?;

    let password_ok = form
        .get("password")
        .map(|password| auth::verify_password(&auth.user.password_hash, password))
        .unwrap_or(false);
    if !password_ok {
        return Err(ApiError::BadRequest("Incorrect Password".to_string()));
    }

    let mut email = auth.user.email.clone();
    let mut username = auth.user.username.clone();
    let mut password_hash = auth.user.password_hash.clone();
    let mut password_changed = false;

    if let Some(new_email) = form.get("email").filter(|s| !s.is_empty()) {
        validate_email(new_email)?;

        // Setting the address the account already has is a no-op, not a conflict.
        let taken_by_other = users::table
            .filter(users::email.eq(new_email))
            .filter(users::id.ne(auth.user.id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        if taken_by_other > 0 {
            return Err(ApiError::Conflict("Email is already in use".to_string()));
        }

        email = new_email.to_string();
    }

    if let Some(new_username) = form.get("username").filter(|s| !s.is_empty()) {
        validate_username(new_username)?;

        let taken_by_other = users::table
            .filter(users::username.eq(new_username))
            .filter(users::id.ne(auth.user.id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        if taken_by_other > 0 {
            return Err(ApiError::Conflict("Username is already in use".to_string()));
        }

        username = new_username.to_string();
    }

    if let Some(new_password) = form.get("new_password").filter(|s| !s.is_empty()) {
        auth::validate_password(new_password)?;
        password_hash = auth::hash_password(new_password)?;
        password_changed = true;
    }

    let user = diesel::update(users::table.find(auth.user.id))
        .set((
            users::email.eq(&email),
            users::username.eq(&username),
            users::password_hash.eq(&password_hash),
        ))
        .get_result::<User>(&mut conn)
        .await?;

    let profile = match form.file("image") {
        Some(file) => {
            let path = storage::save_image("profile_imgs", &file.file_name, &file.bytes).await?;
            diesel::update(profiles::table.find(profile.id))
                .set(profiles::profile_img.eq(path))
                .get_result::<Profile>(&mut conn)
                .await?
        }
        None => profile,
    };

    if password_changed {
        auth::revoke_user_sessions(&mut conn, user.id).await?;
        info!("user {} changed password, sessions revoked", user.id);
    }

    Ok(Json(profile_with_full_user(&profile, &user)))
}

/// Delete the authenticated user's account after re-checking the password.
/// Returns the pre-delete projection.
pub async fn delete_self(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("User does not have connected profile".to_string())
        })?;

    let form = FormData::from_multipart(multipart).await?;

    let password = form
        .get("password")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest("Must provide password to delete user".to_string())
        })?;
    if !auth::verify_password(&auth.user.password_hash, password) {
        return Err(ApiError::BadRequest("Incorrect Password".to_string()));
    }

    let data = profile_with_user(&profile, &auth.user);

    auth::revoke_user_sessions(&mut conn, auth.user.id).await?;
    diesel::delete(users::table.find(auth.user.id))
        .execute(&mut conn)
        .await?;

    info!("deleted user {}", auth.user.id);

    Ok(Json(json!({ "profile": data })))
}

/// Get a profile with its public user projection.
pub async fn get_profile(
    State(db): State<Arc<Database>>,
    Path(profile_id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = db.get_connection().await?;

    let found = profiles::table
        .inner_join(users::table)
        .filter(profiles::id.eq(profile_id))
        .select((Profile::as_select(), User::as_select()))
        .first::<(Profile, User)>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("User with id {profile_id} not found")))?;

    Ok(Json(profile_with_user(&found.0, &found.1)))
}

#[derive(Debug, Deserialize)]
pub struct ProfileListQuery {
    pub search: Option<String>,
    pub page: Option<String>,
}

/// List profiles with their public user projections, searchable by username,
/// 10 per page.
pub async fn list_profiles(
    State(db): State<Arc<Database>>,
    Query(query): Query<ProfileListQuery>,
) -> Result<Json<Value>, ApiError> {
    let requested = parse_page(query.page.as_deref())?;
    let mut conn = db.get_connection().await?;

    let mut count_query = profiles::table.inner_join(users::table).into_boxed();
    let mut list_query = profiles::table.inner_join(users::table).into_boxed();

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        count_query = count_query.filter(users::username.ilike(pattern.clone()));
        list_query = list_query.filter(users::username.ilike(pattern));
    }

    let total = count_query.count().get_result::<i64>(&mut conn).await?;
    let page = paginate(total, PROFILES_PER_PAGE, requested);

    let rows = list_query
        .order(users::id.asc())
        .limit(page.limit)
        .offset(page.offset)
        .select((Profile::as_select(), User::as_select()))
        .load::<(Profile, User)>(&mut conn)
        .await?;

    let profiles: Vec<Value> = rows
        .iter()
        .map(|(profile, user)| profile_with_user(profile, user))
        .collect();

    Ok(Json(json!({
        "profiles": profiles,
        "num_pages": page.num_pages,
    })))
}
