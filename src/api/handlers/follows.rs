// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::db::Database;
use crate::error::ApiError;
use crate::models::profile::{Follow, FollowView, NewFollow};
use crate::schema::follows;

use super::{linked_profile, profile_exists};

/// Follow the profile with id `following_id` as the authenticated profile.
pub async fn create_follow(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    Path(following_id): Path<i32>,
) -> Result<Json<FollowView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("User does not have connected profile".to_string())
        })?;

    if !profile_exists(&mut conn, following_id).await? {
        return Err(ApiError::NotFound(format!(
            "Profile with id {following_id} not found"
        )));
    }

    if profile.id == following_id {
        return Err(ApiError::BadRequest(
            "Profile can not follow themselves".to_string(),
        ));
    }

    let existing = follows::table
        .filter(follows::follower_id.eq(profile.id))
        .filter(follows::following_id.eq(following_id))
        .count()
        .get_result::<i64>(&mut conn)
        .await?;
    if existing > 0 {
        return Err(ApiError::Conflict(format!(
            "Profile {} already follows profile {following_id}",
            profile.id
        )));
    }

    let follow = diesel::insert_into(follows::table)
        .values(NewFollow {
            follower_id: profile.id,
            following_id,
            date_created: Utc::now().naive_utc(),
        })
        .get_result::<Follow>(&mut conn)
        .await?;

    Ok(Json(FollowView::from(&follow)))
}

/// Unfollow a profile and return the pre-delete projection.
pub async fn delete_follow(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    Path(following_id): Path<i32>,
) -> Result<Json<FollowView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("User does not have connected profile".to_string())
        })?;

    if !profile_exists(&mut conn, following_id).await? {
        return Err(ApiError::NotFound(format!(
            "Profile with id {following_id} not found"
        )));
    }

    let follow = follows::table
        .filter(follows::follower_id.eq(profile.id))
        .filter(follows::following_id.eq(following_id))
        .first::<Follow>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Profile {} is not following profile {following_id}",
                profile.id
            ))
        })?;

    diesel::delete(follows::table.find(follow.id))
        .execute(&mut conn)
        .await?;

    Ok(Json(FollowView::from(&follow)))
}

#[derive(Debug, Deserialize)]
pub struct FollowListQuery {
    pub following: Option<i32>,
    pub follower: Option<i32>,
}

/// List follow relationships, optionally filtered by either side.
pub async fn list_follows(
    State(db): State<Arc<Database>>,
    Query(query): Query<FollowListQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = db.get_connection().await?;

    let mut follows_query = follows::table.into_boxed();

    if let Some(following_id) = query.following {
        if !profile_exists(&mut conn, following_id).await? {
            return Err(ApiError::NotFound(format!(
                "Profile with id {following_id} not found"
            )));
        }
        follows_query = follows_query.filter(follows::following_id.eq(following_id));
    }

    if let Some(follower_id) = query.follower {
        if !profile_exists(&mut conn, follower_id).await? {
            return Err(ApiError::NotFound(format!(
                "Profile with id {follower_id} not found"
            )));
        }
        follows_query = follows_query.filter(follows::follower_id.eq(follower_id));
    }

    let follows = follows_query.load::<Follow>(&mut conn).await?;
    let views: Vec<FollowView> = follows.iter().map(FollowView::from).collect();

    Ok(Json(json!({ "follows": views })))
}
