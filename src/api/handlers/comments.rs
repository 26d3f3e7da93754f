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

use crate::api::form::FormData;
use crate::auth::AuthUser;
use crate::db::Database;
use crate::error::ApiError;
use crate::models::review::{Comment, CommentView, NewComment};
use crate::schema::comments;

use super::{linked_profile, review_exists};

pub(crate) const MIN_COMMENT_LEN: usize = 1;
pub(crate) const MAX_COMMENT_LEN: usize = 280;

pub(crate) fn validate_comment_text(raw: Option<&str>) -> Result<&str, ApiError> {
    // Missing and empty read the same to a client.
    let text = raw
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Comments can not be empty".to_string()))?;
    let len = text.chars().count();
    if !(MIN_COMMENT_LEN..=MAX_COMMENT_LEN).contains(&len) {
        return Err(ApiError::BadRequest(format!(
            "Comment text must be between {MIN_COMMENT_LEN} and {MAX_COMMENT_LEN} characters"
        )));
    }
    Ok(text)
}

#[derive(Debug, Deserialize)]
pub struct CommentListQuery {
    pub review: Option<i32>,
}

/// List comments, optionally restricted to one review.
pub async fn list_comments(
    State(db): State<Arc<Database>>,
    Query(query): Query<CommentListQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = db.get_connection().await?;

    let mut comments_query = comments::table.into_boxed();

    if let Some(review_id) = query.review {
        if !review_exists(&mut conn, review_id).await? {
            return Err(ApiError::NotFound("Review not found".to_string()));
        }
        comments_query = comments_query.filter(comments::review_id.eq(review_id));
    }

    let comments = comments_query.load::<Comment>(&mut conn).await?;
    let views: Vec<CommentView> = comments.iter().map(CommentView::from).collect();

    Ok(Json(json!({ "comments": views })))
}

/// Get a comment by id
pub async fn get_comment(
    State(db): State<Arc<Database>>,
    Path(comment_id): Path<i32>,
) -> Result<Json<CommentView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let comment = comments::table
        .find(comment_id)
        .first::<Comment>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("Comment with id {comment_id} not found")))?;

    Ok(Json(CommentView::from(&comment)))
}

/// Comment on a review. The same author may not post the same text on the
/// same review twice.
pub async fn create_comment(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    multipart: Multipart,
) -> Result<Json<CommentView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("User does not have connected profile".to_string())
        })?;

    let form = FormData::from_multipart(multipart).await?;

    let comment_text = validate_comment_text(form.get("comment_text"))?.to_string();

    let review_id = form
        .get("review_id")
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i32>().ok())
        .ok_or_else(|| ApiError::BadRequest("Must provide review".to_string()))?;

    if !review_exists(&mut conn, review_id).await? {
        return Err(ApiError::NotFound(format!(
            "Review with id {review_id} does not exist"
        )));
    }

    // Duplicate detection is on the (author, text, review) triple.
    let duplicate = comments::table
        .filter(comments::profile_id.eq(profile.id))
        .filter(comments::comment_text.eq(&comment_text))
        .filter(comments::review_id.eq(review_id))
        .count()
        .get_result::<i64>(&mut conn)
        .await?;
    if duplicate > 0 {
        return Err(ApiError::BadRequest(
            "You have already made this comment on this review".to_string(),
        ));
    }

    let comment = diesel::insert_into(comments::table)
        .values(NewComment {
            date_created: Utc::now().naive_utc(),
            comment_text,
            review_id,
            profile_id: profile.id,
        })
        .get_result::<Comment>(&mut conn)
        .await?;

    Ok(Json(CommentView::from(&comment)))
}

/// Delete a comment; only its author may do so. Returns the pre-delete
/// projection.
pub async fn delete_comment(
    auth: AuthUser,
    State(db): State<Arc<Database>>,
    Path(comment_id): Path<i32>,
) -> Result<Json<CommentView>, ApiError> {
    let mut conn = db.get_connection().await?;

    let profile = linked_profile(&mut conn, auth.user.id)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("User does not have connected profile".to_string())
        })?;

    let comment = comments::table
        .find(comment_id)
        .first::<Comment>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("Comment with id {comment_id} not found")))?;

    if comment.profile_id != profile.id {
        return Err(ApiError::Forbidden(format!(
            "Must be creator of comment {comment_id} to delete"
        )));
    }

    let view = CommentView::from(&comment);

    diesel::delete(comments::table.find(comment_id))
        .execute(&mut conn)
        .await?;

    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_text_bounds() {
        assert!(validate_comment_text(Some("x")).is_ok());
        assert!(validate_comment_text(Some("x".repeat(280).as_str())).is_ok());
        assert!(validate_comment_text(Some("x".repeat(281).as_str())).is_err());
        assert!(validate_comment_text(Some("")).is_err());
        assert!(validate_comment_text(None).is_err());
    }

    #[test]
    fn missing_and_empty_comments_share_a_message() {
        for raw in [None, Some("")] {
            let err = validate_comment_text(raw).unwrap_err();
            assert_eq!(err.to_string(), "Comments can not be empty");
        }
    }
}
