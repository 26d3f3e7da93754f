// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use chrono::{Duration, Utc};
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
use crate::models::drink::{Drink, DrinkImage, DrinkImageView, NewDrinkImage};
use crate::models::review::{NewReview, NewReviewImage, Review, ReviewImage, ReviewView};
use crate::pagination::{paginate, parse_page};
use crate::schema::{drink_images, drinks, review_images, reviews};
use crate::storage;

use super::{drink_exists, like_pattern, linked_profile, profile_exists, review_exists};

const REVIEWS_PER_PAGE: i64 = 6;
const RECENT_WINDOW_DAYS: i64 = 7;

pub(crate) const MIN_RATING: i32 = 1;
pub(crate) const MAX_RATING: i32 = 5;
pub(crate) const MIN_REVIEW_LEN: usize = 10;
pub(crate) const MAX_REVIEW_LEN: usize = 4096;

#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    pub recent: Option<String>,
    pub profile: Option<i32>,
    pub drink: Option<i32>,
    pub search: Option<String>,
    pub page: Option<String>,
}

fn is_recent_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

pub(crate) fn validate_rating(raw: Option<&str>) -> Result<i32, ApiError> {
    let out_of_range = || {
        ApiError::BadRequest(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        ))
    };

    let rating = raw
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i32>().ok())
        .ok_or_else(out_of_range)?;
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(out_of_range());
    }
    Ok(rating)
}

pub(crate) fn validate_review_text(raw: Option<&str>) -> Result<&str, ApiError> {
    let text = raw.unwrap_or_default();
    let len = text.chars().count();
    if !(MIN_REVIEW_LEN..=MAX_REVIEW_LEN).contains(&len) {
        return Err(ApiError::BadRequest(format!(
            "Review must be between {MIN_REVIEW_LEN} and {MAX_REVIEW_LEN} characters"
        )));
    }
    Ok(text)
}

/// List reviews, newest first. Pagination only applies when `page` is sent;
/// otherwise the full match set comes back with `num_pages = 1`.
pub async fn list_reviews(
    State(db): State<Arc<Database>>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = db.get_connection().await?;

    let mut count_query = reviews::table.into_boxed();
    let mut list_query = reviews::table.into_boxed();

    if is_recent_flag(query.recent.as_deref()) {
        let now = Utc::now().naive_utc();
        let week_ago = now - Duration::days(RECENT_WINDOW_DAYS);
        count_query = count_query
            .filter(reviews::date_created.ge(week_ago))
            .filter(reviews::date_created.lt(now));
        list_query = list_query
            .filter(reviews::date_created.ge(week_ago))
            .filter(reviews::date_created.lt(now));
    }

    if let Some(profile_id) = query.profile {
        if !profile_exists(&mut conn, profile_id).await? {
            return Err(ApiError::NotFound("Profile not found".to_string()));
        }
        count_query = count_query.filter(reviews::profile_id.eq(profile_id));
        list_query = list_query.filter(reviews::profile_id.eq(profile_id));
    }

    if let Some(drink_id) = query.drink {
        if !drink_exists(&mut conn, drink_id).await? {
            return Err(ApiError::NotFound("Drink not found".to_string()));
        }
        count_query = count_query.filter(reviews::drink_id.eq(drink_id));
        list_query = list_query.filter(reviews::drink_id.eq(drink_id));
    }

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        count_query = count_query.filter(reviews::review_text.ilike(pattern.clone()));
        list_query = list_query.filter(reviews::review_text.ilike(pattern));
    }

    let list_query = list_query.order(reviews::date_created.desc());

    let (reviews, num_pages) = match query.page.as_deref().filter(|s| !s.is_empty()) {
        Some(raw_page) => {
            let requested = parse_page(Some(raw_page))?;
            let total = count_query.count().get_result::<i64>(&mut conn).await?;
            let page = paginate(total, REVIEWS_PER_PAGE, requested);

            let rows = list_query
                .limit(page.limit)
                .offset(page.offset)
                .load::<Review>(&mut conn)
                .await?;
            (rows, page.num_pages)
        }
        None => (list_query.load::<Review>(&mut conn).await?, 1),
    };

    let views: Vec<ReviewView> = reviews.iter().map(ReviewView::from).collect();

    Ok(Json(json!({
        "reviews": views,
        "num_pages": num_pages,
    })))
}

/// Get a review by id
pub async fn get_review(
    State(db): State<Arc<Database>>,
    Path(review_id): Path<i32>,
) -> Result<Json<ReviewView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let review = reviews::table
        .find(review_id)
        .first::<Review>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("Review with id {review_id} not found")))?;

    Ok(Json(ReviewView::from(&review)))
}

/// Post a review of a drink, optionally with an attached image.
pub async fn create_review(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    multipart: Multipart,
) -> Result<Json<ReviewView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("User does not have connected profile".to_string())
        })?;

    let form = FormData::from_multipart(multipart).await?;

    let rating = validate_rating(form.get("rating"))?;
    let review_text = validate_review_text(form.get("review_text"))?.to_string();

    let drink_id = form
        .get("drink_id")
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i32>().ok())
        .ok_or_else(|| ApiError::BadRequest("Must provide valid drink".to_string()))?;

    // The upload must decode before the review row is written.
    if let Some(file) = form.file("image") {
        storage::validate_image(&file.bytes)?;
    }

    let drink = drinks::table
        .find(drink_id)
        .first::<Drink>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Drink does not exist".to_string()))?;

    let review = diesel::insert_into(reviews::table)
        .values(NewReview {
            date_created: Utc::now().naive_utc(),
            rating,
            review_text,
            profile_id: profile.id,
            drink_id,
        })
        .get_result::<Review>(&mut conn)
        .await?;

    if let Some(file) = form.file("image") {
        let path = storage::save_image("drink_imgs", &file.file_name, &file.bytes).await?;

        let image = diesel::insert_into(drink_images::table)
            .values(NewDrinkImage {
                label: drink.product_name.clone(),
                image: path,
                drink_id,
            })
            .get_result::<DrinkImage>(&mut conn)
            .await?;

        diesel::insert_into(review_images::table)
            .values(NewReviewImage {
                review_id: review.id,
                image_id: image.id,
            })
            .execute(&mut conn)
            .await?;
    }

    info!("profile {} reviewed drink {drink_id}", profile.id);

    Ok(Json(ReviewView::from(&review)))
}

/// Delete a review; only its author may do so. Returns the pre-delete
/// projection.
pub async fn delete_review(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    Path(review_id): Path<i32>,
) -> Result<Json<ReviewView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("User does not have connected profile".to_string())
        })?;

    let review = reviews::table
        .find(review_id)
        .first::<Review>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("Review with id {review_id} not found")))?;

    if review.profile_id != profile.id {
        return Err(ApiError::Forbidden(format!(
            "Must be creator of review {review_id} to delete"
        )));
    }

    let view = ReviewView::from(&review);

    diesel::delete(reviews::table.find(review_id))
        .execute(&mut conn)
        .await?;

    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct ReviewImageQuery {
    pub review: Option<i32>,
}

/// List the stored images attached to reviews, optionally for one review.
pub async fn list_review_images(
    State(db): State<Arc<Database>>,
    Query(query): Query<ReviewImageQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = db.get_connection().await?;

    let links: Vec<ReviewImage> = match query.review {
        Some(review_id) => {
            if !review_exists(&mut conn, review_id).await? {
                return Err(ApiError::NotFound("Review not found".to_string()));
            }
            review_images::table
                .filter(review_images::review_id.eq(review_id))
                .load(&mut conn)
                .await?
        }
        None => review_images::table.load(&mut conn).await?,
    };
    let image_ids: Vec<i32> = links.iter().map(|link| link.image_id).collect();

    let images = drink_images::table
        .filter(drink_images::id.eq_any(image_ids))
        .load::<DrinkImage>(&mut conn)
        .await?;
    let views: Vec<DrinkImageView> = images.iter().map(DrinkImageView::from).collect();

    Ok(Json(json!({ "images": views })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds_are_inclusive() {
        assert_eq!(validate_rating(Some("1")).unwrap(), 1);
        assert_eq!(validate_rating(Some("5")).unwrap(), 5);
        assert!(validate_rating(Some("0")).is_err());
        assert!(validate_rating(Some("6")).is_err());
    }

    #[test]
    fn missing_or_non_integer_ratings_are_rejected() {
        assert!(validate_rating(None).is_err());
        assert!(validate_rating(Some("")).is_err());
        assert!(validate_rating(Some("three")).is_err());
        assert!(validate_rating(Some("4.5")).is_err());
    }

    #[test]
    fn review_text_length_bounds() {
        assert!(validate_review_text(Some("too short")).is_err());
        assert!(validate_review_text(Some("just long enough..")).is_ok());
        assert!(validate_review_text(Some("x".repeat(4096).as_str())).is_ok());
        assert!(validate_review_text(Some("x".repeat(4097).as_str())).is_err());
        assert!(validate_review_text(None).is_err());
    }

    #[test]
    fn recent_flag_requires_true() {
        assert!(is_recent_flag(Some("true")));
        assert!(is_recent_flag(Some("TRUE")));
        assert!(!is_recent_flag(Some("false")));
        assert!(!is_recent_flag(Some("1")));
        assert!(!is_recent_flag(None));
    }
}
