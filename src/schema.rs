// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use diesel::allow_tables_to_appear_in_same_query;
use diesel::joinable;
use diesel::table;

table! {
    users (id) {
        id -> Integer,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        is_admin -> Bool,
        created_at -> Timestamp,
    }
}

table! {
    sessions (token) {
        token -> Varchar,
        user_id -> Integer,
        created_at -> Timestamp,
    }
}

table! {
    profiles (id) {
        id -> Integer,
        user_id -> Integer,
        profile_img -> Nullable<Varchar>,
    }
}

table! {
    follows (id) {
        id -> Integer,
        follower_id -> Integer,
        following_id -> Integer,
        date_created -> Timestamp,
    }
}

table! {
    drinks (id) {
        id -> Integer,
        product_name -> Varchar,
        brand_name -> Varchar,
    }
}

table! {
    drink_images (id) {
        id -> Integer,
        label -> Varchar,
        image -> Varchar,
        drink_id -> Integer,
    }
}

table! {
    drink_favorites (id) {
        id -> Integer,
        profile_id -> Integer,
        drink_id -> Integer,
        date_created -> Timestamp,
    }
}

table! {
    reviews (id) {
        id -> Integer,
        date_created -> Timestamp,
        rating -> Integer,
        review_text -> Varchar,
        profile_id -> Integer,
        drink_id -> Integer,
    }
}

table! {
    review_images (id) {
        id -> Integer,
        review_id -> Integer,
        image_id -> Integer,
    }
}

table! {
    review_likes (id) {
        id -> Integer,
        review_id -> Integer,
        profile_id -> Integer,
    }
}

table! {
    comments (id) {
        id -> Integer,
        date_created -> Timestamp,
        comment_text -> Varchar,
        review_id -> Integer,
        profile_id -> Integer,
    }
}

table! {
    comment_likes (id) {
        id -> Integer,
        comment_id -> Integer,
        profile_id -> Integer,
    }
}

joinable!(sessions -> users (user_id));
joinable!(profiles -> users (user_id));
joinable!(drink_images -> drinks (drink_id));
joinable!(drink_favorites -> profiles (profile_id));
joinable!(drink_favorites -> drinks (drink_id));
joinable!(reviews -> profiles (profile_id));
joinable!(reviews -> drinks (drink_id));
joinable!(review_images -> reviews (review_id));
joinable!(review_images -> drink_images (image_id));
joinable!(review_likes -> reviews (review_id));
joinable!(review_likes -> profiles (profile_id));
joinable!(comments -> reviews (review_id));
joinable!(comments -> profiles (profile_id));
joinable!(comment_likes -> comments (comment_id));
joinable!(comment_likes -> profiles (profile_id));

allow_tables_to_appear_in_same_query!(
    users,
    sessions,
    profiles,
    follows,
    drinks,
    drink_images,
    drink_favorites,
    reviews,
    review_images,
    review_likes,
    comments,
    comment_likes,
);
