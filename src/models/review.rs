// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{comment_likes, comments, review_images, review_likes, reviews};

/// A profile's rated write-up of a drink. A profile may review the same drink
/// more than once.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
pub struct Review {
    pub id: i32,
    pub date_created: NaiveDateTime,
    pub rating: i32,
    pub review_text: String,
    pub profile_id: i32,
    pub drink_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReview {
    pub date_created: NaiveDateTime,
    pub rating: i32,
    pub review_text: String,
    pub profile_id: i32,
    pub drink_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewView {
    pub id: i32,
    pub review_text: String,
    pub rating: i32,
    pub date_created: NaiveDateTime,
    pub drink_id: i32,
    pub profile_id: i32,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            review_text: review.review_text.clone(),
            rating: review.rating,
            date_created: review.date_created,
            drink_id: review.drink_id,
            profile_id: review.profile_id,
        }
    }
}

/// Link row attaching a stored drink image to the review it came with.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = review_images)]
pub struct ReviewImage {
    pub id: i32,
    pub review_id: i32,
    pub image_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = review_images)]
pub struct NewReviewImage {
    pub review_id: i32,
    pub image_id: i32,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = review_likes)]
pub struct ReviewLike {
    pub id: i32,
    pub review_id: i32,
    pub profile_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = review_likes)]
pub struct NewReviewLike {
    pub review_id: i32,
    pub profile_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewLikeView {
    pub id: i32,
    pub review_id: i32,
    pub profile_id: i32,
}

impl From<&ReviewLike> for ReviewLikeView {
    fn from(like: &ReviewLike) -> Self {
        Self {
            id: like.id,
            review_id: like.review_id,
            profile_id: like.profile_id,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub id: i32,
    pub date_created: NaiveDateTime,
    pub comment_text: String,
    pub review_id: i32,
    pub profile_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub date_created: NaiveDateTime,
    pub comment_text: String,
    pub review_id: i32,
    pub profile_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentView {
    pub id: i32,
    pub review_id: i32,
    pub profile_id: i32,
    pub comment_text: String,
    pub date_created: NaiveDateTime,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            review_id: comment.review_id,
            profile_id: comment.profile_id,
            comment_text: comment.comment_text.clone(),
            date_created: comment.date_created,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = comment_likes)]
pub struct CommentLike {
    pub id: i32,
    pub comment_id: i32,
    pub profile_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comment_likes)]
pub struct NewCommentLike {
    pub comment_id: i32,
    pub profile_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentLikeView {
    pub id: i32,
    pub comment_id: i32,
    pub profile_id: i32,
}

impl From<&CommentLike> for CommentLikeView {
    fn from(like: &CommentLike) -> Self {
        Self {
            id: like.id,
            comment_id: like.comment_id,
            profile_id: like.profile_id,
        }
    }
}
