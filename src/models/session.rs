// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::schema::sessions;

/// DB-backed bearer session. Created at login, removed at logout and revoked
/// wholesale on password change or account deletion.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = sessions)]
pub struct Session {
    pub token: String,
    pub user_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub token: String,
    pub user_id: i32,
    pub created_at: NaiveDateTime,
}
