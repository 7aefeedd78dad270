// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Storage level tests for events and their sub-resources
//!
//! These run against a real postgres, see [`test_util::database::DatabaseContext`]
//! for the connection environment variables.

use db_storage::events::{
    Event, EventFilter, EventInvitation, EventRsvp, NewEventInvitation, NewEventReview,
    NewEventRsvp, RsvpStatus, UpdateEventRsvp,
};
use database::DatabaseError;
use serial_test::serial;
use test_util::database::DatabaseContext;

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (POSTGRES_BASE_URL)"]
async fn rsvp_upsert_is_idempotent() {
    let ctx = DatabaseContext::new(true).await;
    let user = ctx.create_test_user(1).unwrap();
    let event = ctx.create_test_event(user.id, true).unwrap();

    let mut conn = ctx.db.get_conn().unwrap();

    let (rsvp, created) = NewEventRsvp {
        event_id: event.id,
        user_id: user.id,
        status: RsvpStatus::Going,
    }
    .upsert(&mut conn)
    .unwrap();

    assert!(created);
    assert_eq!(rsvp.status, RsvpStatus::Going);

    let (updated, created) = NewEventRsvp {
        event_id: event.id,
        user_id: user.id,
        status: RsvpStatus::Going,
    }
    .upsert(&mut conn)
    .unwrap();

    assert!(!created);
    assert_eq!(updated.id, rsvp.id);
    assert_eq!(updated.status, RsvpStatus::Going);

    let (changed, created) = NewEventRsvp {
        event_id: event.id,
        user_id: user.id,
        status: RsvpStatus::NotGoing,
    }
    .upsert(&mut conn)
    .unwrap();

    assert!(!created);
    assert_eq!(changed.id, rsvp.id);
    assert_eq!(changed.status, RsvpStatus::NotGoing);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (POSTGRES_BASE_URL)"]
async fn rsvp_update_requires_existing_row() {
    let ctx = DatabaseContext::new(true).await;
    let user = ctx.create_test_user(1).unwrap();
    let event = ctx.create_test_event(user.id, true).unwrap();

    let mut conn = ctx.db.get_conn().unwrap();

    let result = UpdateEventRsvp {
        status: RsvpStatus::Maybe,
    }
    .apply(&mut conn, event.id, user.id);

    assert!(matches!(result, Err(DatabaseError::NotFound)));

    let rsvp = EventRsvp::get_for_event_and_user(&mut conn, event.id, user.id).unwrap();
    assert!(rsvp.is_none());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (POSTGRES_BASE_URL)"]
async fn review_upsert_overwrites_previous_rating() {
    let ctx = DatabaseContext::new(true).await;
    let organizer = ctx.create_test_user(1).unwrap();
    let reviewer = ctx.create_test_user(2).unwrap();
    let event = ctx.create_test_event(organizer.id, true).unwrap();

    let mut conn = ctx.db.get_conn().unwrap();

    let (first, created) = NewEventReview {
        event_id: event.id,
        user_id: reviewer.id,
        rating: 2,
        comment: "meh".into(),
    }
    .upsert(&mut conn)
    .unwrap();

    assert!(created);

    let (second, created) = NewEventReview {
        event_id: event.id,
        user_id: reviewer.id,
        rating: 5,
        comment: "got much better".into(),
    }
    .upsert(&mut conn)
    .unwrap();

    assert!(!created);
    assert_eq!(second.id, first.id);

    let reviews = db_storage::events::EventReview::get_for_event(&mut conn, event.id).unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].0.rating, 5);
    assert_eq!(reviews[0].0.comment, "got much better");
}

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (POSTGRES_BASE_URL)"]
async fn invitation_insert_is_idempotent() {
    let ctx = DatabaseContext::new(true).await;
    let organizer = ctx.create_test_user(1).unwrap();
    let invitee = ctx.create_test_user(2).unwrap();
    let event = ctx.create_test_event(organizer.id, false).unwrap();

    let mut conn = ctx.db.get_conn().unwrap();

    let invitation = NewEventInvitation {
        event_id: event.id,
        user_id: invitee.id,
    }
    .try_insert(&mut conn)
    .unwrap();

    assert!(invitation.is_some());

    let duplicate = NewEventInvitation {
        event_id: event.id,
        user_id: invitee.id,
    }
    .try_insert(&mut conn)
    .unwrap();

    assert!(duplicate.is_none());

    let invitations = EventInvitation::get_for_event(&mut conn, event.id).unwrap();
    assert_eq!(invitations.len(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (POSTGRES_BASE_URL)"]
async fn deleting_an_event_cascades_to_sub_resources() {
    let ctx = DatabaseContext::new(true).await;
    let organizer = ctx.create_test_user(1).unwrap();
    let guest = ctx.create_test_user(2).unwrap();
    let event = ctx.create_test_event(organizer.id, false).unwrap();

    let mut conn = ctx.db.get_conn().unwrap();

    NewEventInvitation {
        event_id: event.id,
        user_id: guest.id,
    }
    .try_insert(&mut conn)
    .unwrap();

    NewEventRsvp {
        event_id: event.id,
        user_id: guest.id,
        status: RsvpStatus::Going,
    }
    .upsert(&mut conn)
    .unwrap();

    NewEventReview {
        event_id: event.id,
        user_id: guest.id,
        rating: 4,
        comment: "nice".into(),
    }
    .upsert(&mut conn)
    .unwrap();

    Event::delete_by_id(&mut conn, event.id).unwrap();

    assert!(matches!(
        Event::get(&mut conn, event.id),
        Err(DatabaseError::NotFound)
    ));

    let rsvp = EventRsvp::get_for_event_and_user(&mut conn, event.id, guest.id).unwrap();
    assert!(rsvp.is_none());

    let reviews = db_storage::events::EventReview::get_for_event(&mut conn, event.id).unwrap();
    assert!(reviews.is_empty());

    let invitations = EventInvitation::get_for_event(&mut conn, event.id).unwrap();
    assert!(invitations.is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (POSTGRES_BASE_URL)"]
async fn accessible_events_respect_visibility() {
    let ctx = DatabaseContext::new(true).await;
    let organizer = ctx.create_test_user(1).unwrap();
    let invitee = ctx.create_test_user(2).unwrap();
    let outsider = ctx.create_test_user(3).unwrap();

    let public_event = ctx.create_test_event(organizer.id, true).unwrap();
    let private_event = ctx.create_test_event(organizer.id, false).unwrap();

    let mut conn = ctx.db.get_conn().unwrap();

    NewEventInvitation {
        event_id: private_event.id,
        user_id: invitee.id,
    }
    .try_insert(&mut conn)
    .unwrap();

    let filter = EventFilter::default();

    let for_organizer =
        Event::get_all_accessible(&mut conn, Some(organizer.id), &filter).unwrap();
    assert_eq!(for_organizer.len(), 2);

    let for_invitee = Event::get_all_accessible(&mut conn, Some(invitee.id), &filter).unwrap();
    assert_eq!(for_invitee.len(), 2);

    let for_outsider = Event::get_all_accessible(&mut conn, Some(outsider.id), &filter).unwrap();
    assert_eq!(for_outsider.len(), 1);
    assert_eq!(for_outsider[0].0.id, public_event.id);
    assert_eq!(for_outsider[0].1.id, organizer.id);

    let for_anonymous = Event::get_all_accessible(&mut conn, None, &filter).unwrap();
    assert_eq!(for_anonymous.len(), 1);
    assert_eq!(for_anonymous[0].0.id, public_event.id);
}
