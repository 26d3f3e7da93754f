// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{drink_favorites, drink_images, drinks};
use crate::storage;

/// Catalog entry; (product_name, brand_name) is unique.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = drinks)]
pub struct Drink {
    pub id: i32,
    pub product_name: String,
    pub brand_name: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = drinks)]
pub struct NewDrink {
    pub product_name: String,
    pub brand_name: String,
}

/// Stored image attached to a drink (directly or through a review).
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = drink_images)]
pub struct DrinkImage {
    pub id: i32,
    pub label: String,
    pub image: String,
    pub drink_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = drink_images)]
pub struct NewDrinkImage {
    pub label: String,
    pub image: String,
    pub drink_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DrinkImageView {
    pub id: i32,
    pub drink_id: i32,
    pub label: String,
    pub image: String,
}

impl From<&DrinkImage> for DrinkImageView {
    fn from(image: &DrinkImage) -> Self {
        Self {
            id: image.id,
            drink_id: image.drink_id,
            label: image.label.clone(),
            image: storage::media_url(&image.image),
        }
    }
}

/// A profile's bookmark of a drink; (profile, drink) is unique.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = drink_favorites)]
pub struct DrinkFavorite {
    pub id: i32,
    pub profile_id: i32,
    pub drink_id: i32,
    pub date_created: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = drink_favorites)]
pub struct NewDrinkFavorite {
    pub profile_id: i32,
    pub drink_id: i32,
    pub date_created: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteView {
    pub id: i32,
    pub drink_id: i32,
    pub profile_id: i32,
}

impl From<&DrinkFavorite> for FavoriteView {
    fn from(favorite: &DrinkFavorite) -> Self {
        Self {
            id: favorite.id,
            drink_id: favorite.drink_id,
            profile_id: favorite.profile_id,
        }
    }
}
