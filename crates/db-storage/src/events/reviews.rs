// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the review specific database structs and queries
use crate::events::EventId;
use crate::schema::{event_reviews, users};
use crate::users::{User, UserId};
use chrono::{DateTime, Utc};
use database::{DbConnection, Result};
use diesel::prelude::*;

/// Diesel review struct
///
/// At most one row exists per (event, user) pair; a second submission by the
/// same user overwrites rating and comment instead of adding a row.
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = event_reviews)]
pub struct EventReview {
    pub id: i64,
    pub event_id: EventId,
    pub user_id: UserId,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl EventReview {
    /// Returns all reviews of the event together with their authors
    #[tracing::instrument(err, skip_all)]
    pub fn get_for_event(
        conn: &mut DbConnection,
        event_id: EventId,
    ) -> Result<Vec<(EventReview, User)>> {
        let query = event_reviews::table
            .inner_join(users::table.on(event_reviews::user_id.eq(users::id)))
            .filter(event_reviews::event_id.eq(event_id))
            .order_by(event_reviews::created_at.asc())
            .then_order_by(event_reviews::id);

        let reviews = query.load(conn)?;

        Ok(reviews)
    }
}

/// Diesel insertable review struct
#[derive(Debug, Insertable)]
#[diesel(table_name = event_reviews)]
pub struct NewEventReview {
    pub event_id: EventId,
    pub user_id: UserId,
    pub rating: i32,
    pub comment: String,
}

impl NewEventReview {
    /// Inserts the review or, when the user already reviewed the event,
    /// overwrites rating and comment of the existing row.
    ///
    /// Returns the row and whether it was created. Analogous to
    /// [`NewEventRsvp::upsert`](crate::events::rsvps::NewEventRsvp::upsert),
    /// the unique (event_id, user_id) index makes concurrent submissions
    /// collapse into a single row.
    #[tracing::instrument(err, skip_all)]
    pub fn upsert(self, conn: &mut DbConnection) -> Result<(EventReview, bool)> {
        let inserted: Option<EventReview> = diesel::insert_into(event_reviews::table)
            .values(&self)
            .on_conflict((event_reviews::event_id, event_reviews::user_id))
            .do_nothing()
            .get_result(conn)
            .optional()?;

        if let Some(review) = inserted {
            return Ok((review, true));
        }

        let review = diesel::update(event_reviews::table)
            .filter(
                event_reviews::event_id
                    .eq(self.event_id)
                    .and(event_reviews::user_id.eq(self.user_id)),
            )
            .set((
                event_reviews::rating.eq(self.rating),
                event_reviews::comment.eq(self.comment),
            ))
            .returning(event_reviews::all_columns)
            .get_result(conn)?;

        Ok((review, false))
    }
}
