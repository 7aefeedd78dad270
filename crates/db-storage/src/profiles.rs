// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the user profile database structs and queries
//!
//! Every user owns exactly one profile row which is created empty on
//! registration and edited separately from the account fields.
use crate::schema::user_profiles;
use crate::users::UserId;
use database::{DbConnection, Result};
use diesel::prelude::*;

/// Diesel user profile struct
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = user_profiles, primary_key(user_id))]
pub struct UserProfile {
    pub user_id: UserId,
    pub full_name: String,
    pub bio: String,
    pub location: String,
}

impl UserProfile {
    #[tracing::instrument(err, skip_all)]
    pub fn get_for_user(conn: &mut DbConnection, user_id: UserId) -> Result<UserProfile> {
        let query = user_profiles::table.filter(user_profiles::user_id.eq(user_id));

        let profile = query.first(conn)?;

        Ok(profile)
    }
}

/// Diesel insertable user profile struct
#[derive(Debug, Insertable)]
#[diesel(table_name = user_profiles)]
pub struct NewUserProfile {
    pub user_id: UserId,
    pub full_name: String,
    pub bio: String,
    pub location: String,
}

impl NewUserProfile {
    #[tracing::instrument(err, skip_all)]
    pub fn insert(self, conn: &mut DbConnection) -> Result<UserProfile> {
        let query = self.insert_into(user_profiles::table);

        let profile = query.get_result(conn)?;

        Ok(profile)
    }
}

/// Diesel user profile struct for updates
///
/// Is used in update queries. None fields will be ignored on update queries
#[derive(Debug, AsChangeset)]
#[diesel(table_name = user_profiles)]
pub struct UpdateUserProfile {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl UpdateUserProfile {
    #[tracing::instrument(err, skip_all)]
    pub fn apply(self, conn: &mut DbConnection, user_id: UserId) -> Result<UserProfile> {
        let query = diesel::update(user_profiles::table)
            .filter(user_profiles::user_id.eq(user_id))
            .set(self)
            .returning(user_profiles::all_columns);

        let profile = query.get_result(conn)?;

        Ok(profile)
    }
}
