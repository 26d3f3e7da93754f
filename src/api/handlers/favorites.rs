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
use crate::models::drink::{DrinkFavorite, FavoriteView, NewDrinkFavorite};
use crate::schema::drink_favorites;

use super::{drink_exists, linked_profile, profile_exists};

#[derive(Debug, Deserialize)]
pub struct FavoriteListQuery {
    pub profile: Option<i32>,
    pub drink: Option<i32>,
}

/// List favorites, optionally filtered by profile and/or drink.
pub async fn list_favorites(
    State(db): State<Arc<Database>>,
    Query(query): Query<FavoriteListQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = db.get_connection().await?;

    let mut favorites_query = drink_favorites::table.into_boxed();

    if let Some(profile_id) = query.profile {
        if !profile_exists(&mut conn, profile_id).await? {
            return Err(ApiError::NotFound("Profile not found".to_string()));
        }
        favorites_query = favorites_query.filter(drink_favorites::profile_id.eq(profile_id));
    }

    if let Some(drink_id) = query.drink {
        if !drink_exists(&mut conn, drink_id).await? {
            return Err(ApiError::NotFound("Drink not found".to_string()));
        }
        favorites_query = favorites_query.filter(drink_favorites::drink_id.eq(drink_id));
    }

    let favorites = favorites_query.load::<DrinkFavorite>(&mut conn).await?;
    let views: Vec<FavoriteView> = favorites.iter().map(FavoriteView::from).collect();

    Ok(Json(json!({ "favorites": views })))
}

/// Bookmark a drink for the authenticated profile.
pub async fn create_favorite(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    Path(drink_id): Path<i32>,
) -> Result<Json<FavoriteView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Forbidden("User does not have connected profile".to_string())
        })?;

    if !drink_exists(&mut conn, drink_id).await? {
        return Err(ApiError::NotFound(format!(
            "Drink with id {drink_id} not found"
        )));
    }

    let existing = drink_favorites::table
        .filter(drink_favorites::profile_id.eq(profile.id))
        .filter(drink_favorites::drink_id.eq(drink_id))
        .count()
        .get_result::<i64>(&mut conn)
        .await?;
    if existing > 0 {
        return Err(ApiError::Conflict(format!(
            "User {} already has drink {drink_id} in favorites",
            profile.id
        )));
    }

    let favorite = diesel::insert_into(drink_favorites::table)
        .values(NewDrinkFavorite {
            profile_id: profile.id,
            drink_id,
            date_created: Utc::now().naive_utc(),
        })
        .get_result::<DrinkFavorite>(&mut conn)
        .await?;

    Ok(Json(FavoriteView::from(&favorite)))
}

/// Remove a bookmark and return its pre-delete projection.
pub async fn delete_favorite(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    Path(drink_id): Path<i32>,
) -> Result<Json<FavoriteView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Forbidden("User does not have connected profile".to_string())
        })?;

    if !drink_exists(&mut conn, drink_id).await? {
        return Err(ApiError::NotFound(format!(
            "Drink with id {drink_id} not found"
        )));
    }

    let favorite = drink_favorites::table
        .filter(drink_favorites::profile_id.eq(profile.id))
        .filter(drink_favorites::drink_id.eq(drink_id))
        .first::<DrinkFavorite>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Drink {drink_id} is not in user {} favorites",
                profile.id
            ))
        })?;

    diesel::delete(drink_favorites::table.find(favorite.id))
        .execute(&mut conn)
        .await?;

    Ok(Json(FavoriteView::from(&favorite)))
}
