// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! RSVP related API structs and Endpoints
//!
//! RSVPs are keyed on (event, user), the upsert endpoint reports whether it
//! created or updated the row through the response status code.
use crate::api::v1::middleware::token_auth::CurrentUser;
use crate::api::v1::response::{ApiError, ApiResponse, DefaultApiResult};
use crate::api::v1::users::PublicUserProfile;
use crate::policy;
use actix_web::post;
use actix_web::web::{Data, Json, Path};
use database::{Db, OptionalExt};
use db_storage::events::{Event, EventId, EventRsvp, NewEventRsvp, RsvpStatus, UpdateEventRsvp};
use db_storage::users::User;
use serde::{Deserialize, Serialize};

/// An RSVP of a single user to an event
#[derive(Debug, Serialize)]
pub struct RsvpResource {
    pub id: i64,
    pub event_id: EventId,
    pub user: PublicUserProfile,
    pub status: RsvpStatus,
}

impl RsvpResource {
    fn from_db(rsvp: EventRsvp, user: User) -> Self {
        Self {
            id: rsvp.id,
            event_id: rsvp.event_id,
            user: PublicUserProfile::from_db(user),
            status: rsvp.status,
        }
    }
}

/// The JSON body expected when making a *POST* request on `/events/{event_id}/rsvp`
///
/// When the status is omitted a newly created RSVP defaults to `Going` and
/// an existing RSVP keeps its current status.
#[derive(Debug, Deserialize)]
pub struct PostRsvpBody {
    #[serde(default)]
    pub status: Option<RsvpStatus>,
}

/// API Endpoint `POST /events/{event_id}/rsvp`
///
/// Creates or updates the RSVP of the requesting user for the specified
/// event. Answers with 201 when the RSVP was created and 200 when an
/// existing one was updated, the body is the [`RsvpResource`] in both cases.
#[post("/events/{event_id}/rsvp")]
pub async fn rsvp_to_event(
    db: Data<Db>,
    current_user: CurrentUser,
    event_id: Path<EventId>,
    body: Json<PostRsvpBody>,
) -> DefaultApiResult<RsvpResource> {
    let event_id = event_id.into_inner();
    let status = body.into_inner().status;
    let current_user = current_user.into_inner();
    let actor = current_user.id;

    let (rsvp, created) = crate::block(move || -> Result<(EventRsvp, bool), ApiError> {
        let mut conn = db.get_conn()?;

        let (event, invitation) = Event::get_with_invitation(&mut conn, event_id, Some(actor))?;

        if !policy::can_read(&event, Some(actor), invitation.is_some()) {
            return Err(ApiError::forbidden());
        }

        // an omitted status must not overwrite an existing RSVP
        if status.is_none() {
            if let Some(existing) = EventRsvp::get_for_event_and_user(&mut conn, event_id, actor)? {
                return Ok((existing, false));
            }
        }

        let upserted = NewEventRsvp {
            event_id,
            user_id: actor,
            status: status.unwrap_or_default(),
        }
        .upsert(&mut conn)?;

        Ok(upserted)
    })
    .await??;

    let resource = RsvpResource::from_db(rsvp, current_user);

    if created {
        Ok(ApiResponse::created(resource))
    } else {
        Ok(ApiResponse::new(resource))
    }
}

/// The JSON body expected when making a *POST* request on `/events/{event_id}/update_rsvp`
#[derive(Debug, Deserialize)]
pub struct UpdateRsvpBody {
    pub status: RsvpStatus,
}

/// API Endpoint `POST /events/{event_id}/update_rsvp`
///
/// Updates the existing RSVP of the requesting user. Unlike
/// [`rsvp_to_event`] this never creates an RSVP, it fails with 404 when the
/// user has not RSVPed to the event yet.
#[post("/events/{event_id}/update_rsvp")]
pub async fn update_rsvp(
    db: Data<Db>,
    current_user: CurrentUser,
    event_id: Path<EventId>,
    body: Json<UpdateRsvpBody>,
) -> DefaultApiResult<RsvpResource> {
    let event_id = event_id.into_inner();
    let status = body.into_inner().status;
    let current_user = current_user.into_inner();
    let actor = current_user.id;

    let rsvp = crate::block(move || -> Result<EventRsvp, ApiError> {
        let mut conn = db.get_conn()?;

        let (event, invitation) = Event::get_with_invitation(&mut conn, event_id, Some(actor))?;

        if !policy::can_read(&event, Some(actor), invitation.is_some()) {
            return Err(ApiError::forbidden());
        }

        let rsvp = UpdateEventRsvp { status }
            .apply(&mut conn, event_id, actor)
            .optional()?
            .ok_or_else(|| {
                ApiError::not_found()
                    .with_code("rsvp_not_found")
                    .with_message("RSVP not found")
            })?;

        Ok(rsvp)
    })
    .await??;

    Ok(ApiResponse::new(RsvpResource::from_db(rsvp, current_user)))
}

#[cfg(test)]
mod test {
    use super::*;
    use db_storage::users::UserId;
    use std::time::SystemTime;
    use test_util::assert_eq_json;
    use uuid::Uuid;

    #[test]
    fn rsvp_resource_serialize() {
        let unix_epoch = SystemTime::UNIX_EPOCH.into();

        let rsvp = EventRsvp {
            id: 1,
            event_id: EventId::from(Uuid::nil()),
            user_id: UserId::from(Uuid::nil()),
            status: RsvpStatus::NotGoing,
        };

        let user = User {
            id: UserId::from(Uuid::nil()),
            username: "guest".into(),
            email: "guest@example.org".into(),
            firstname: "Gue".into(),
            lastname: "St".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: unix_epoch,
        };

        assert_eq_json!(
            RsvpResource::from_db(rsvp, user),
            {
                "id": 1,
                "event_id": "00000000-0000-0000-0000-000000000000",
                "user": {
                    "id": "00000000-0000-0000-0000-000000000000",
                    "username": "guest",
                    "firstname": "Gue",
                    "lastname": "St"
                },
                "status": "Not Going"
            }
        );
    }

    #[test]
    fn post_rsvp_body_status_is_optional() {
        let body: PostRsvpBody = serde_json::from_str("{}").unwrap();
        assert!(body.status.is_none());

        let body: PostRsvpBody = serde_json::from_str(r#"{"status": "Maybe"}"#).unwrap();
        assert_eq!(body.status, Some(RsvpStatus::Maybe));

        assert!(serde_json::from_str::<UpdateRsvpBody>(r#"{"status": "Perhaps"}"#).is_err());
        assert!(serde_json::from_str::<UpdateRsvpBody>("{}").is_err());
    }
}
