// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

//! Like endpoints for reviews and comments. Both follow the same shape:
//! authenticated profile, existing target, unique (profile, target) pair.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::db::Database;
use crate::error::ApiError;
use crate::models::review::{
    CommentLike, CommentLikeView, NewCommentLike, NewReviewLike, ReviewLike, ReviewLikeView,
};
use crate::schema::{comment_likes, review_likes};

use super::{comment_exists, linked_profile, profile_exists, review_exists};

/// Like a review as the authenticated profile.
pub async fn create_review_like(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    Path(review_id): Path<i32>,
) -> Result<Json<ReviewLikeView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("User does not have connected profile".to_string())
        })?;

    if !review_exists(&mut conn, review_id).await? {
        return Err(ApiError::NotFound("Review not found".to_string()));
    }

    let existing = review_likes::table
        .filter(review_likes::review_id.eq(review_id))
        .filter(review_likes::profile_id.eq(profile.id))
        .count()
        .get_result::<i64>(&mut conn)
        .await?;
    if existing > 0 {
        return Err(ApiError::Conflict(format!(
            "Profile {} has already liked review {review_id}",
            profile.id
        )));
    }

    let like = diesel::insert_into(review_likes::table)
        .values(NewReviewLike {
            review_id,
            profile_id: profile.id,
        })
        .get_result::<ReviewLike>(&mut conn)
        .await?;

    Ok(Json(ReviewLikeView::from(&like)))
}

/// Remove a review like and return its pre-delete projection.
pub async fn delete_review_like(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    Path(review_id): Path<i32>,
) -> Result<Json<ReviewLikeView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("User does not have connected profile".to_string())
        })?;

    if !review_exists(&mut conn, review_id).await? {
        return Err(ApiError::NotFound("Review not found".to_string()));
    }

    let like = review_likes::table
        .filter(review_likes::review_id.eq(review_id))
        .filter(review_likes::profile_id.eq(profile.id))
        .first::<ReviewLike>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Profile {} has not liked review {review_id}",
                profile.id
            ))
        })?;

    diesel::delete(review_likes::table.find(like.id))
        .execute(&mut conn)
        .await?;

    Ok(Json(ReviewLikeView::from(&like)))
}

#[derive(Debug, Deserialize)]
pub struct ReviewLikeListQuery {
    pub review: Option<i32>,
    pub profile: Option<i32>,
}

/// List review likes, optionally filtered by review and/or profile.
pub async fn list_review_likes(
    State(db): State<Arc<Database>>,
    Query(query): Query<ReviewLikeListQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = db.get_connection().await?;

    let mut likes_query = review_likes::table.into_boxed();

    if let Some(review_id) = query.review {
        if !review_exists(&mut conn, review_id).await? {
            return Err(ApiError::NotFound("Review not found".to_string()));
        }
        likes_query = likes_query.filter(review_likes::review_id.eq(review_id));
    }

    if let Some(profile_id) = query.profile {
        if !profile_exists(&mut conn, profile_id).await? {
            return Err(ApiError::NotFound("Profile not found".to_string()));
        }
        likes_query = likes_query.filter(review_likes::profile_id.eq(profile_id));
    }

    let likes = likes_query.load::<ReviewLike>(&mut conn).await?;
    let views: Vec<ReviewLikeView> = likes.iter().map(ReviewLikeView::from).collect();

    Ok(Json(json!({ "likes": views })))
}

/// Like a comment as the authenticated profile.
pub async fn create_comment_like(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    Path(comment_id): Path<i32>,
) -> Result<Json<CommentLikeView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("User does not have connected profile".to_string())
        })?;

    if !comment_exists(&mut conn, comment_id).await? {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    let existing = comment_likes::table
        .filter(comment_likes::comment_id.eq(comment_id))
        .filter(comment_likes::profile_id.eq(profile.id))
        .count()
        .get_result::<i64>(&mut conn)
        .await?;
    if existing > 0 {
        return Err(ApiError::Conflict(format!(
            "Profile {} has already liked comment {comment_id}",
            profile.id
        )));
    }

    let like = diesel::insert_into(comment_likes::table)
        .values(NewCommentLike {
            comment_id,
            profile_id: profile.id,
        })
        .get_result::<CommentLike>(&mut conn)
        .await?;

    Ok(Json(CommentLikeView::from(&like)))
}

/// Remove a comment like and return its pre-delete projection.
pub async fn delete_comment_like(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    Path(comment_id): Path<i32>,
) -> Result<Json<CommentLikeView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("User does not have connected profile".to_string())
        })?;

    if !comment_exists(&mut conn, comment_id).await? {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    let like = comment_likes::table
        .filter(comment_likes::comment_id.eq(comment_id))
        .filter(comment_likes::profile_id.eq(profile.id))
        .first::<CommentLike>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Profile {} has not liked comment {comment_id}",
                profile.id
            ))
        })?;

    diesel::delete(comment_likes::table.find(like.id))
        .execute(&mut conn)
        .await?;

    Ok(Json(CommentLikeView::from(&like)))
}

#[derive(Debug, Deserialize)]
pub struct CommentLikeListQuery {
    pub comment: Option<i32>,
    pub profile: Option<i32>,
}

/// List comment likes, optionally filtered by comment and/or profile.
pub async fn list_comment_likes(
    State(db): State<Arc<Database>>,
    Query(query): Query<CommentLikeListQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = db.get_connection().await?;

    let mut likes_query = comment_likes::table.into_boxed();

    if let Some(comment_id) = query.comment {
        if !comment_exists(&mut conn, comment_id).await? {
            return Err(ApiError::NotFound("Comment not found".to_string()));
        }
        likes_query = likes_query.filter(comment_likes::comment_id.eq(comment_id));
    }

    if let Some(profile_id) = query.profile {
        if !profile_exists(&mut conn, profile_id).await? {
            return Err(ApiError::NotFound("Profile not found".to_string()));
        }
        likes_query = likes_query.filter(comment_likes::profile_id.eq(profile_id));
    }

    let likes = likes_query.load::<CommentLike>(&mut conn).await?;
    let views: Vec<CommentLikeView> = likes.iter().map(CommentLikeView::from).collect();

    Ok(Json(json!({ "likes": views })))
}
