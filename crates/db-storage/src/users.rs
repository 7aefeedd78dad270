// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the user specific database structs and queries
use crate::schema::users;
use chrono::{DateTime, Utc};
use database::{DbConnection, Result};
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Typed id of a user record
///
/// See <https://stackoverflow.com/a/59948116> for more information on the diesel impls.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsExpression,
    FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Uuid)]
pub struct UserId(Uuid);

impl UserId {
    pub const fn from(inner: Uuid) -> Self {
        Self(inner)
    }

    /// Create a random id for a new user record
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn inner(&self) -> &Uuid {
        &self.0
    }

    pub fn into_inner(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<DB> ToSql<diesel::sql_types::Uuid, DB> for UserId
where
    DB: Backend,
    Uuid: ToSql<diesel::sql_types::Uuid, DB>,
{
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, DB>) -> serialize::Result {
        <Uuid as ToSql<diesel::sql_types::Uuid, DB>>::to_sql(&self.0, out)
    }
}

impl<DB> FromSql<diesel::sql_types::Uuid, DB> for UserId
where
    DB: Backend,
    Uuid: FromSql<diesel::sql_types::Uuid, DB>,
{
    fn from_sql(bytes: diesel::backend::RawValue<'_, DB>) -> deserialize::Result<Self> {
        <Uuid as FromSql<diesel::sql_types::Uuid, DB>>::from_sql(bytes).map(Self)
    }
}

/// Diesel user struct
///
/// Is used as a result in various queries. Represents a user row
#[derive(Debug, Clone, Queryable, Identifiable)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[tracing::instrument(err, skip_all)]
    pub fn get(conn: &mut DbConnection, user_id: UserId) -> Result<User> {
        let query = users::table.filter(users::id.eq(user_id));

        let user = query.first(conn)?;

        Ok(user)
    }

    #[tracing::instrument(err, skip_all)]
    pub fn get_by_username(conn: &mut DbConnection, username: &str) -> Result<Option<User>> {
        let query = users::table.filter(users::username.eq(username));

        let user = query.first(conn).optional()?;

        Ok(user)
    }
}

/// Diesel insertable user struct
///
/// Represents fields that have to be provided on user insertion.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub password_hash: String,
}

impl NewUser {
    /// Tries to insert the user into the database
    ///
    /// When the username is already taken, None is returned.
    #[tracing::instrument(err, skip_all)]
    pub fn try_insert(self, conn: &mut DbConnection) -> Result<Option<User>> {
        let query = diesel::insert_into(users::table)
            .values(self)
            .on_conflict(users::username)
            .do_nothing();

        let user = query.get_result(conn).optional()?;

        Ok(user)
    }
}
