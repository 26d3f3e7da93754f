// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

pub mod comments;
pub mod drinks;
pub mod favorites;
pub mod follows;
pub mod health;
pub mod likes;
pub mod profiles;
pub mod reviews;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::DbConnection;
use crate::error::ApiError;
use crate::models::profile::Profile;
use crate::schema::{
    comments as comments_t, drinks as drinks_t, profiles as profiles_t, reviews as reviews_t,
};

/// Escaped `%term%` pattern for case-insensitive substring matching.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// The profile linked to an authenticated user, if any. Callers decide
/// whether its absence is a 401 or a 403 for their endpoint.
pub(crate) async fn linked_profile(
    conn: &mut DbConnection,
    user_id: i32,
) -> Result<Option<Profile>, ApiError> {
    let profile = profiles_t::table
        .filter(profiles_t::user_id.eq(user_id))
        .select(Profile::as_select())
        .first::<Profile>(conn)
        .await
        .optional()?;
    Ok(profile)
}

pub(crate) async fn profile_exists(conn: &mut DbConnection, id: i32) -> Result<bool, ApiError> {
    let count = profiles_t::table
        .filter(profiles_t::id.eq(id))
        .count()
        .get_result::<i64>(conn)
        .await?;
    Ok(count > 0)
}

pub(crate) async fn drink_exists(conn: &mut DbConnection, id: i32) -> Result<bool, ApiError> {
    let count = drinks_t::table
        .filter(drinks_t::id.eq(id))
        .count()
        .get_result::<i64>(conn)
        .await?;
    Ok(count > 0)
}

pub(crate) async fn review_exists(conn: &mut DbConnection, id: i32) -> Result<bool, ApiError> {
    let count = reviews_t::table
        .filter(reviews_t::id.eq(id))
        .count()
        .get_result::<i64>(conn)
        .await?;
    Ok(count > 0)
}

pub(crate) async fn comment_exists(conn: &mut DbConnection, id: i32) -> Result<bool, ApiError> {
    let count = comments_t::table
        .filter(comments_t::id.eq(id))
        .count()
        .get_result::<i64>(conn)
        .await?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_patterns_wrap_in_wildcards() {
        assert_eq!(like_pattern("cola"), "%cola%");
    }

    #[test]
    fn like_patterns_escape_sql_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
