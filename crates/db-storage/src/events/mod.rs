// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the event specific database structs and queries
//!
//! Events own their RSVPs, reviews and invitations; the sub-resource modules
//! live next to this one and all their rows are removed with the event
//! through `ON DELETE CASCADE`.
use crate::schema::{event_invitations, events, users};
use crate::users::{User, UserId};
use chrono::{DateTime, Utc};
use database::{DbConnection, Result};
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod invitations;
pub mod reviews;
pub mod rsvps;

pub use invitations::{EventInvitation, NewEventInvitation};
pub use reviews::{EventReview, NewEventReview};
pub use rsvps::{EventRsvp, NewEventRsvp, RsvpStatus, UpdateEventRsvp};

/// Typed id of an event record
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
pub struct EventId(Uuid);

impl EventId {
    pub const fn from(inner: Uuid) -> Self {
        Self(inner)
    }

    /// Create a random id for a new event record
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

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<DB> ToSql<diesel::sql_types::Uuid, DB> for EventId
where
    DB: Backend,
    Uuid: ToSql<diesel::sql_types::Uuid, DB>,
{
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, DB>) -> serialize::Result {
        <Uuid as ToSql<diesel::sql_types::Uuid, DB>>::to_sql(&self.0, out)
    }
}

impl<DB> FromSql<diesel::sql_types::Uuid, DB> for EventId
where
    DB: Backend,
    Uuid: FromSql<diesel::sql_types::Uuid, DB>,
{
    fn from_sql(bytes: diesel::backend::RawValue<'_, DB>) -> deserialize::Result<Self> {
        <Uuid as FromSql<diesel::sql_types::Uuid, DB>>::from_sql(bytes).map(Self)
    }
}

/// Diesel event struct
///
/// The `created_by` user is the organizer of the event and is never changed
/// after insertion.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub created_by: UserId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter options of [`Event::get_all_accessible`]
#[derive(Debug, Default)]
pub struct EventFilter {
    /// Only return events at this exact location
    pub location: Option<String>,
    /// Case insensitive substring match on title and location
    pub search: Option<String>,
}

impl Event {
    #[tracing::instrument(err, skip_all)]
    pub fn get(conn: &mut DbConnection, event_id: EventId) -> Result<Event> {
        let query = events::table.filter(events::id.eq(event_id));

        let event = query.first(conn)?;

        Ok(event)
    }

    /// Returns the event together with the invitation of the given user, if one exists
    ///
    /// The invitation is fetched in the same query so callers can run the
    /// read-access check on the returned snapshot without a second round trip.
    #[tracing::instrument(err, skip_all)]
    pub fn get_with_invitation(
        conn: &mut DbConnection,
        event_id: EventId,
        user_id: Option<UserId>,
    ) -> Result<(Event, Option<EventInvitation>)> {
        let user_id = match user_id {
            Some(user_id) => user_id,
            None => {
                let event = Self::get(conn, event_id)?;
                return Ok((event, None));
            }
        };

        let query = events::table
            .left_join(
                event_invitations::table.on(event_invitations::event_id
                    .eq(events::id)
                    .and(event_invitations::user_id.eq(user_id))),
            )
            .select((
                events::all_columns,
                event_invitations::all_columns.nullable(),
            ))
            .filter(events::id.eq(event_id));

        let (event, invitation) = query.first(conn)?;

        Ok((event, invitation))
    }

    /// Returns all events the given user may see, together with their organizers
    ///
    /// Public events, events organized by the user and events the user is
    /// invited to. Anonymous callers only see public events. The invitation
    /// join can produce at most one row per event because of the unique
    /// (event_id, user_id) constraint, so no deduplication is needed.
    #[tracing::instrument(err, skip_all)]
    pub fn get_all_accessible(
        conn: &mut DbConnection,
        user_id: Option<UserId>,
        filter: &EventFilter,
    ) -> Result<Vec<(Event, User)>> {
        match user_id {
            Some(user_id) => {
                let mut query = events::table
                    .inner_join(users::table.on(events::created_by.eq(users::id)))
                    .left_join(
                        event_invitations::table.on(event_invitations::event_id
                            .eq(events::id)
                            .and(event_invitations::user_id.eq(user_id))),
                    )
                    .select((events::all_columns, users::all_columns))
                    .filter(
                        events::is_public
                            .eq(true)
                            .or(events::created_by.eq(user_id))
                            .or(event_invitations::user_id.is_not_null()),
                    )
                    .order_by(events::starts_at.asc())
                    .then_order_by(events::id)
                    .into_boxed::<Pg>();

                if let Some(location) = &filter.location {
                    query = query.filter(events::location.eq(location));
                }

                if let Some(search) = &filter.search {
                    let like_query = format!("%{}%", search.replace('%', ""));
                    query = query.filter(
                        events::title
                            .ilike(like_query.clone())
                            .or(events::location.ilike(like_query)),
                    );
                }

                let events = query.load(conn)?;

                Ok(events)
            }
            None => {
                let mut query = events::table
                    .inner_join(users::table.on(events::created_by.eq(users::id)))
                    .select((events::all_columns, users::all_columns))
                    .filter(events::is_public.eq(true))
                    .order_by(events::starts_at.asc())
                    .then_order_by(events::id)
                    .into_boxed::<Pg>();

                if let Some(location) = &filter.location {
                    query = query.filter(events::location.eq(location));
                }

                if let Some(search) = &filter.search {
                    let like_query = format!("%{}%", search.replace('%', ""));
                    query = query.filter(
                        events::title
                            .ilike(like_query.clone())
                            .or(events::location.ilike(like_query)),
                    );
                }

                let events = query.load(conn)?;

                Ok(events)
            }
        }
    }

    /// Deletes the event
    ///
    /// All RSVPs, reviews and invitations of the event are removed with it
    /// by the cascading foreign keys.
    #[tracing::instrument(err, skip_all)]
    pub fn delete_by_id(conn: &mut DbConnection, event_id: EventId) -> Result<()> {
        diesel::delete(events::table)
            .filter(events::id.eq(event_id))
            .execute(conn)?;

        Ok(())
    }
}

/// Diesel insertable event struct
///
/// Represents fields that have to be provided on event insertion.
#[derive(Debug, Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub created_by: UserId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub is_public: bool,
}

impl NewEvent {
    #[tracing::instrument(err, skip_all)]
    pub fn insert(self, conn: &mut DbConnection) -> Result<Event> {
        let query = self.insert_into(events::table);

        let event = query.get_result(conn)?;

        Ok(event)
    }
}

/// Diesel event struct for updates
///
/// Is used in update queries. None fields will be ignored on update queries.
/// The organizer is deliberately not part of the changeset.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = events)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_public: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl UpdateEvent {
    #[tracing::instrument(err, skip_all)]
    pub fn apply(self, conn: &mut DbConnection, event_id: EventId) -> Result<Event> {
        let query = diesel::update(events::table)
            .filter(events::id.eq(event_id))
            .set(self)
            .returning(events::all_columns);

        let event = query.get_result(conn)?;

        Ok(event)
    }
}
