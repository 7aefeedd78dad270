// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the invitation specific database structs and queries
//!
//! An invitation marks a user as allowed to see a private event. Its
//! existence is binary, there is no status attached.
use crate::events::EventId;
use crate::schema::{event_invitations, users};
use crate::users::{User, UserId};
use chrono::{DateTime, Utc};
use database::{DbConnection, Result};
use diesel::prelude::*;

/// Diesel invitation struct
///
/// At most one row exists per (event, user) pair.
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = event_invitations)]
pub struct EventInvitation {
    pub id: i64,
    pub event_id: EventId,
    pub user_id: UserId,
    pub invited_at: DateTime<Utc>,
}

impl EventInvitation {
    /// Returns all invitations of the event together with the invited users
    #[tracing::instrument(err, skip_all)]
    pub fn get_for_event(
        conn: &mut DbConnection,
        event_id: EventId,
    ) -> Result<Vec<(EventInvitation, User)>> {
        let query = event_invitations::table
            .inner_join(users::table.on(event_invitations::user_id.eq(users::id)))
            .filter(event_invitations::event_id.eq(event_id))
            .order_by(event_invitations::invited_at.asc())
            .then_order_by(event_invitations::id);

        let invitations = query.load(conn)?;

        Ok(invitations)
    }

    /// Deletes the invitation of the given user
    ///
    /// Fails with NotFound when no invitation exists for the (event, user) pair.
    #[tracing::instrument(err, skip_all)]
    pub fn delete_by_user(
        conn: &mut DbConnection,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<EventInvitation> {
        let query = diesel::delete(event_invitations::table)
            .filter(
                event_invitations::event_id
                    .eq(event_id)
                    .and(event_invitations::user_id.eq(user_id)),
            )
            .returning(event_invitations::all_columns);

        let invitation = query.get_result(conn)?;

        Ok(invitation)
    }
}

/// Diesel insertable invitation struct
#[derive(Debug, Insertable)]
#[diesel(table_name = event_invitations)]
pub struct NewEventInvitation {
    pub event_id: EventId,
    pub user_id: UserId,
}

impl NewEventInvitation {
    /// Tries to insert the invitation into the database
    ///
    /// When the user is already invited, None is returned.
    #[tracing::instrument(err, skip_all)]
    pub fn try_insert(self, conn: &mut DbConnection) -> Result<Option<EventInvitation>> {
        let query = diesel::insert_into(event_invitations::table)
            .values(self)
            .on_conflict((event_invitations::event_id, event_invitations::user_id))
            .do_nothing();

        let invitation = query.get_result(conn).optional()?;

        Ok(invitation)
    }
}
