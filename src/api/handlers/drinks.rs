// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::api::form::FormData;
use crate::auth::AuthUser;
use crate::db::Database;
use crate::error::ApiError;
use crate::models::drink::{Drink, DrinkImage, DrinkImageView, NewDrink, NewDrinkImage};
use crate::pagination::{paginate, parse_page};
use crate::schema::{drink_images, drinks};
use crate::storage;

use super::{drink_exists, like_pattern};

const DRINKS_PER_PAGE: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct DrinkListQuery {
    pub search: Option<String>,
    pub page: Option<String>,
}

/// List drinks, optionally filtered by a case-insensitive substring over
/// product or brand name, 10 per page.
pub async fn list_drinks(
    State(db): State<Arc<Database>>,
    Query(query): Query<DrinkListQuery>,
) -> Result<Json<Value>, ApiError> {
    let requested = parse_page(query.page.as_deref())?;
    let mut conn = db.get_connection().await?;

    let mut count_query = drinks::table.into_boxed();
    let mut list_query = drinks::table.into_boxed();

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        count_query = count_query.filter(
            drinks::product_name
                .ilike(pattern.clone())
                .or(drinks::brand_name.ilike(pattern.clone())),
        );
        list_query = list_query.filter(
            drinks::product_name
                .ilike(pattern.clone())
                .or(drinks::brand_name.ilike(pattern)),
        );
    }

    let total = count_query.count().get_result::<i64>(&mut conn).await?;
    let page = paginate(total, DRINKS_PER_PAGE, requested);

    let drinks = list_query
        .order(drinks::id.asc())
        .limit(page.limit)
        .offset(page.offset)
        .load::<Drink>(&mut conn)
        .await?;

    Ok(Json(json!({
        "drinks": drinks,
        "page": page.page,
        "num_pages": page.num_pages,
    })))
}

/// Get a drink by id
pub async fn get_drink(
    State(db): State<Arc<Database>>,
    Path(drink_id): Path<i32>,
) -> Result<Json<Drink>, ApiError> {
    let mut conn = db.get_connection().await?;

    let drink = drinks::table
        .find(drink_id)
        .first::<Drink>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("Drink with id {drink_id} not found")))?;

    Ok(Json(drink))
}

/// Create a drink with any number of attached images. Admin only.
pub async fn create_drink(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    multipart: Multipart,
) -> Result<Json<Drink>, ApiError> {
    if !auth.user.is_admin {
        return Err(ApiError::Forbidden(
            "Must be an administrator to add drinks".to_string(),
        ));
    }

    let form = FormData::from_multipart(multipart).await?;

    // All uploads must decode before anything is written.
    for file in &form.files {
        storage::validate_image(&file.bytes)?;
    }

    let product_name = form
        .get("product_name")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Must provide product_name".to_string()))?
        .to_string();
    let brand_name = form
        .get("brand_name")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Must provide brand_name".to_string()))?
        .to_string();

    let mut conn = db.get_connection().await?;

    let existing = drinks::table
        .filter(drinks::product_name.eq(&product_name))
        .filter(drinks::brand_name.eq(&brand_name))
        .count()
        .get_result::<i64>(&mut conn)
        .await?;
    if existing > 0 {
        return Err(ApiError::Conflict(
            "Drink already exists with this name and brand".to_string(),
        ));
    }

    let drink = diesel::insert_into(drinks::table)
        .values(NewDrink {
            product_name: product_name.clone(),
            brand_name: brand_name.clone(),
        })
        .get_result::<Drink>(&mut conn)
        .await?;

    for file in &form.files {
        let path = storage::save_image("drink_imgs", &file.file_name, &file.bytes).await?;
        diesel::insert_into(drink_images::table)
            .values(NewDrinkImage {
                label: format!("{product_name} - {brand_name}"),
                image: path,
                drink_id: drink.id,
            })
            .execute(&mut conn)
            .await?;
    }

    info!("created drink {} ({product_name} - {brand_name})", drink.id);

    Ok(Json(drink))
}

/// Delete a drink and return its pre-delete projection. Admin only.
pub async fn delete_drink(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    Path(drink_id): Path<i32>,
) -> Result<Json<Drink>, ApiError> {
    if !auth.user.is_admin {
        return Err(ApiError::Forbidden(
            "Must be an administrator to delete drinks".to_string(),
        ));
    }

    let mut conn = db.get_connection().await?;

    let drink = drinks::table
        .find(drink_id)
        .first::<Drink>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("Drink with id {drink_id} not found")))?;

    diesel::delete(drinks::table.find(drink_id))
        .execute(&mut conn)
        .await?;

    info!("deleted drink {drink_id}");

    Ok(Json(drink))
}

#[derive(Debug, Deserialize)]
pub struct DrinkImageQuery {
    pub drink: Option<i32>,
}

/// List drink images, optionally restricted to one drink.
pub async fn list_drink_images(
    State(db): State<Arc<Database>>,
    Query(query): Query<DrinkImageQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = db.get_connection().await?;

    let mut images_query = drink_images::table.into_boxed();

    if let Some(drink_id) = query.drink {
        if !drink_exists(&mut conn, drink_id).await? {
            return Err(ApiError::NotFound("Drink not found".to_string()));
        }
        images_query = images_query.filter(drink_images::drink_id.eq(drink_id));
    }

    let images = images_query.load::<DrinkImage>(&mut conn).await?;
    let views: Vec<DrinkImageView> = images.iter().map(DrinkImageView::from).collect();

    Ok(Json(json!({ "images": views })))
}
