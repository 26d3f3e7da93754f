// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::users;

/// Base identity record. The password hash never leaves this struct; API
/// responses use the view projections below.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
}

/// Full user projection, returned only to the account owner.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    pub username: String,
    pub email: String,
}

/// Public user projection.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserLimitedView {
    pub username: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<&User> for UserLimitedView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
        }
    }
}
