// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Access decisions for events and their sub-resources
//!
//! All functions are pure and operate on already fetched snapshots, so every
//! endpoint runs them after the object lookup and before any mutation. Read
//! and write access are deliberately asymmetric: an invitation extends read
//! access to a private event, it never grants any write capability.

use db_storage::events::Event;
use db_storage::users::UserId;

/// Whether the actor may see the event and its sub-resources
///
/// Public events are readable by everyone, including anonymous callers.
/// Private events are readable by the organizer and by invited users only.
pub fn can_read(event: &Event, actor: Option<UserId>, has_invitation: bool) -> bool {
    if event.is_public {
        return true;
    }

    match actor {
        Some(actor) => actor == event.created_by || has_invitation,
        None => false,
    }
}

/// Whether the actor may update or delete the event
///
/// Only the organizer ever holds write access.
pub fn can_write(event: &Event, actor: UserId) -> bool {
    actor == event.created_by
}

/// Whether the actor may list, create or revoke invitations of the event
///
/// Invitation management is an organizer exclusive capability. Note that
/// inviting to a public event is still rejected, but as an invalid request
/// rather than a missing capability.
pub fn can_manage_invitations(event: &Event, actor: UserId) -> bool {
    can_write(event, actor)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{DateTime, Utc};
    use db_storage::events::EventId;
    use std::time::SystemTime;
    use uuid::Uuid;

    fn test_event(organizer: UserId, is_public: bool) -> Event {
        let unix_epoch: DateTime<Utc> = SystemTime::UNIX_EPOCH.into();

        Event {
            id: EventId::from(Uuid::nil()),
            title: "Event title".into(),
            description: "Event description".into(),
            location: "Somewhere".into(),
            created_by: organizer,
            starts_at: unix_epoch,
            ends_at: unix_epoch,
            is_public,
            created_at: unix_epoch,
            updated_at: unix_epoch,
        }
    }

    fn user(n: u128) -> UserId {
        UserId::from(Uuid::from_u128(n))
    }

    #[test]
    fn public_events_are_readable_by_everyone() {
        let organizer = user(1);
        let event = test_event(organizer, true);

        assert!(can_read(&event, None, false));
        assert!(can_read(&event, Some(user(2)), false));
        assert!(can_read(&event, Some(organizer), false));
    }

    #[test]
    fn private_events_are_readable_by_organizer_and_invitees_only() {
        let organizer = user(1);
        let event = test_event(organizer, false);

        assert!(can_read(&event, Some(organizer), false));
        assert!(can_read(&event, Some(user(2)), true));

        assert!(!can_read(&event, Some(user(2)), false));
        assert!(!can_read(&event, None, false));
        // an invitation without an identity carries no weight
        assert!(!can_read(&event, None, true));
    }

    #[test]
    fn write_access_is_organizer_exclusive() {
        let organizer = user(1);

        for is_public in [true, false] {
            let event = test_event(organizer, is_public);

            assert!(can_write(&event, organizer));
            assert!(!can_write(&event, user(2)));
        }
    }

    #[test]
    fn an_invitation_does_not_grant_write_access() {
        let organizer = user(1);
        let event = test_event(organizer, false);
        let invitee = user(2);

        assert!(can_read(&event, Some(invitee), true));
        assert!(!can_write(&event, invitee));
        assert!(!can_manage_invitations(&event, invitee));
    }

    #[test]
    fn invitation_management_matches_write_access() {
        let organizer = user(1);
        let event = test_event(organizer, false);

        assert!(can_manage_invitations(&event, organizer));
        assert!(!can_manage_invitations(&event, user(2)));
    }
}
