// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{follows, profiles};
use crate::storage;

/// Application-level identity wrapping a base user account.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: i32,
    pub user_id: i32,
    pub profile_img: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub user_id: i32,
    pub profile_img: Option<String>,
}

/// Profile projection; the stored media path is expanded to a public URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileView {
    pub id: i32,
    pub user_id: i32,
    pub profile_img: Option<String>,
}

impl From<&Profile> for ProfileView {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            profile_img: profile.profile_img.as_deref().map(storage::media_url),
        }
    }
}

/// Directed follower -> following relationship between profiles.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = follows)]
pub struct Follow {
    pub id: i32,
    pub follower_id: i32,
    pub following_id: i32,
    pub date_created: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = follows)]
pub struct NewFollow {
    pub follower_id: i32,
    pub following_id: i32,
    pub date_created: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowView {
    pub id: i32,
    pub following_id: i32,
    pub follower_id: i32,
}

impl From<&Follow> for FollowView {
    fn from(follow: &Follow) -> Self {
        Self {
            id: follow.id,
            following_id: follow.following_id,
            follower_id: follow.follower_id,
        }
    }
}
