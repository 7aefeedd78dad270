// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the RSVP specific database structs and queries
use crate::events::EventId;
use crate::schema::event_rsvps;
use crate::users::UserId;
use database::{DbConnection, Result};
use diesel::deserialize::{self, FromSql};
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Attendance status of an RSVP
///
/// The wire and database representations both use the human readable
/// strings, matching the values accepted by the REST API.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = diesel::sql_types::Text)]
pub enum RsvpStatus {
    #[serde(rename = "Going")]
    Going,
    #[serde(rename = "Maybe")]
    Maybe,
    #[serde(rename = "Not Going")]
    NotGoing,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Going => "Going",
            RsvpStatus::Maybe => "Maybe",
            RsvpStatus::NotGoing => "Not Going",
        }
    }
}

impl Default for RsvpStatus {
    fn default() -> Self {
        RsvpStatus::Going
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Going" => Ok(Self::Going),
            "Maybe" => Ok(Self::Maybe),
            "Not Going" => Ok(Self::NotGoing),
            _ => Err(format!("unknown rsvp status {s:?}")),
        }
    }
}

impl ToSql<diesel::sql_types::Text, Pg> for RsvpStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<diesel::sql_types::Text, Pg> for RsvpStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"Going" => Ok(RsvpStatus::Going),
            b"Maybe" => Ok(RsvpStatus::Maybe),
            b"Not Going" => Ok(RsvpStatus::NotGoing),
            _ => Err("unknown rsvp status in database".into()),
        }
    }
}

/// Diesel RSVP struct
///
/// At most one row exists per (event, user) pair.
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = event_rsvps)]
pub struct EventRsvp {
    pub id: i64,
    pub event_id: EventId,
    pub user_id: UserId,
    pub status: RsvpStatus,
}

impl EventRsvp {
    #[tracing::instrument(err, skip_all)]
    pub fn get_for_event_and_user(
        conn: &mut DbConnection,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<EventRsvp>> {
        let query = event_rsvps::table.filter(
            event_rsvps::event_id
                .eq(event_id)
                .and(event_rsvps::user_id.eq(user_id)),
        );

        let rsvp = query.first(conn).optional()?;

        Ok(rsvp)
    }
}

/// Diesel insertable RSVP struct
#[derive(Debug, Insertable)]
#[diesel(table_name = event_rsvps)]
pub struct NewEventRsvp {
    pub event_id: EventId,
    pub user_id: UserId,
    pub status: RsvpStatus,
}

impl NewEventRsvp {
    /// Inserts the RSVP or, when one already exists for the (event, user)
    /// pair, updates its status.
    ///
    /// Returns the row and whether it was created. The insert uses
    /// `ON CONFLICT DO NOTHING` on the unique (event_id, user_id) index, so
    /// two concurrent upserts cannot produce duplicate rows; the loser of
    /// the race falls through to the update path.
    #[tracing::instrument(err, skip_all)]
    pub fn upsert(self, conn: &mut DbConnection) -> Result<(EventRsvp, bool)> {
        let inserted: Option<EventRsvp> = diesel::insert_into(event_rsvps::table)
            .values(&self)
            .on_conflict((event_rsvps::event_id, event_rsvps::user_id))
            .do_nothing()
            .get_result(conn)
            .optional()?;

        if let Some(rsvp) = inserted {
            return Ok((rsvp, true));
        }

        let rsvp = UpdateEventRsvp {
            status: self.status,
        }
        .apply(conn, self.event_id, self.user_id)?;

        Ok((rsvp, false))
    }
}

/// Diesel RSVP struct for updates
#[derive(Debug, AsChangeset)]
#[diesel(table_name = event_rsvps)]
pub struct UpdateEventRsvp {
    pub status: RsvpStatus,
}

impl UpdateEventRsvp {
    /// Apply the update to the RSVP of the given user
    ///
    /// Fails with NotFound when no RSVP exists for the (event, user) pair.
    #[tracing::instrument(err, skip_all)]
    pub fn apply(
        self,
        conn: &mut DbConnection,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<EventRsvp> {
        let query = diesel::update(event_rsvps::table)
            .filter(
                event_rsvps::event_id
                    .eq(event_id)
                    .and(event_rsvps::user_id.eq(user_id)),
            )
            .set(self)
            .returning(event_rsvps::all_columns);

        let rsvp = query.get_result(conn)?;

        Ok(rsvp)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rsvp_status_strings() {
        assert_eq!("Going".parse::<RsvpStatus>().unwrap(), RsvpStatus::Going);
        assert_eq!("Maybe".parse::<RsvpStatus>().unwrap(), RsvpStatus::Maybe);
        assert_eq!(
            "Not Going".parse::<RsvpStatus>().unwrap(),
            RsvpStatus::NotGoing
        );

        assert!("going".parse::<RsvpStatus>().is_err());
        assert!("NotGoing".parse::<RsvpStatus>().is_err());
        assert!("".parse::<RsvpStatus>().is_err());
    }

    #[test]
    fn rsvp_status_json_representation() {
        let json = serde_json::to_string(&RsvpStatus::NotGoing).unwrap();
        assert_eq!(json, "\"Not Going\"");

        let status: RsvpStatus = serde_json::from_str("\"Maybe\"").unwrap();
        assert_eq!(status, RsvpStatus::Maybe);

        assert!(serde_json::from_str::<RsvpStatus>("\"Attending\"").is_err());
    }
}
