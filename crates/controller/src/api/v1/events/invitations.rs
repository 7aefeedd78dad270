// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Invitation related API structs and Endpoints
//!
//! Invitations are an organizer exclusive capability and only meaningful for
//! private events. The checks of every endpoint run in a fixed order:
//! existence, authorization, domain rules, referenced entities.
use crate::api::v1::middleware::token_auth::CurrentUser;
use crate::api::v1::response::{ApiError, ApiResponse, DefaultApiResult, NoContent};
use crate::api::v1::users::PublicUserProfile;
use crate::policy;
use actix_web::web::{Data, Json, Path};
use actix_web::{get, post, Either};
use chrono::{DateTime, Utc};
use database::{Db, OptionalExt};
use db_storage::events::{Event, EventId, EventInvitation, NewEventInvitation};
use db_storage::users::{User, UserId};
use serde::{Deserialize, Serialize};

/// An invitation of a user to a private event
#[derive(Debug, Serialize)]
pub struct InvitationResource {
    pub id: i64,
    pub event_id: EventId,
    pub user: PublicUserProfile,
    pub invited_at: DateTime<Utc>,
}

impl InvitationResource {
    fn from_db(invitation: EventInvitation, user: User) -> Self {
        Self {
            id: invitation.id,
            event_id: invitation.event_id,
            user: PublicUserProfile::from_db(user),
            invited_at: invitation.invited_at,
        }
    }
}

/// Body of the response when the invited user already holds an invitation
#[derive(Debug, Serialize)]
pub struct AlreadyInvitedMessage {
    pub message: &'static str,
}

impl AlreadyInvitedMessage {
    fn new() -> Self {
        Self {
            message: "User already invited",
        }
    }
}

/// API Endpoint `GET /events/{event_id}/invitations`
///
/// Returns a JSON array of all [`InvitationResource`]s of the specified
/// event. Only the organizer may list them.
#[get("/events/{event_id}/invitations")]
pub async fn get_invitations(
    db: Data<Db>,
    current_user: CurrentUser,
    event_id: Path<EventId>,
) -> DefaultApiResult<Vec<InvitationResource>> {
    let event_id = event_id.into_inner();
    let actor = current_user.id;

    let invitations = crate::block(move || -> Result<Vec<(EventInvitation, User)>, ApiError> {
        let mut conn = db.get_conn()?;

        let event = Event::get(&mut conn, event_id)?;

        if !policy::can_manage_invitations(&event, actor) {
            return Err(ApiError::forbidden());
        }

        Ok(EventInvitation::get_for_event(&mut conn, event_id)?)
    })
    .await??;

    let invitations = invitations
        .into_iter()
        .map(|(invitation, user)| InvitationResource::from_db(invitation, user))
        .collect();

    Ok(ApiResponse::new(invitations))
}

/// The JSON body expected when making a *POST* request on `/events/{event_id}/invite`
#[derive(Debug, Deserialize)]
pub struct InviteUserBody {
    /// Id of the user to invite
    pub user_id: UserId,
}

/// API Endpoint `POST /events/{event_id}/invite`
///
/// Invites a user to the specified private event. Only the organizer may
/// invite. Inviting to a public event is rejected as an invalid request,
/// not as missing authorization. The endpoint is idempotent: inviting a
/// user twice answers with 200 and a message instead of duplicating the
/// invitation.
#[post("/events/{event_id}/invite")]
pub async fn invite_user(
    db: Data<Db>,
    current_user: CurrentUser,
    event_id: Path<EventId>,
    body: Json<InviteUserBody>,
) -> Result<Either<ApiResponse<InvitationResource>, ApiResponse<AlreadyInvitedMessage>>, ApiError> {
    let event_id = event_id.into_inner();
    let invitee_id = body.into_inner().user_id;
    let actor = current_user.id;

    let invitation = crate::block(
        move || -> Result<Option<(EventInvitation, User)>, ApiError> {
            let mut conn = db.get_conn()?;

            let event = Event::get(&mut conn, event_id)?;

            if !policy::can_manage_invitations(&event, actor) {
                return Err(ApiError::forbidden());
            }

            if event.is_public {
                return Err(ApiError::bad_request()
                    .with_code("event_is_public")
                    .with_message("Cannot invite to public events"));
            }

            let invitee = User::get(&mut conn, invitee_id).optional()?.ok_or_else(|| {
                ApiError::not_found()
                    .with_code("user_not_found")
                    .with_message("The user to invite could not be found")
            })?;

            // the organizer needs no invitation to their own event
            if invitee.id == event.created_by {
                return Ok(None);
            }

            let invitation = NewEventInvitation {
                event_id,
                user_id: invitee.id,
            }
            .try_insert(&mut conn)?;

            Ok(invitation.map(|invitation| (invitation, invitee)))
        },
    )
    .await??;

    match invitation {
        Some((invitation, invitee)) => Ok(Either::Left(ApiResponse::created(
            InvitationResource::from_db(invitation, invitee),
        ))),
        None => Ok(Either::Right(ApiResponse::new(AlreadyInvitedMessage::new()))),
    }
}

/// The JSON body expected when making a *POST* request on `/events/{event_id}/remove_invitation`
#[derive(Debug, Deserialize)]
pub struct RemoveInvitationBody {
    /// Id of the user whose invitation to remove
    pub user_id: UserId,
}

/// API Endpoint `POST /events/{event_id}/remove_invitation`
///
/// Revokes the invitation of a user. Only the organizer may do this. Fails
/// with 404 when the user does not exist or holds no invitation for the
/// event.
#[post("/events/{event_id}/remove_invitation")]
pub async fn remove_invitation(
    db: Data<Db>,
    current_user: CurrentUser,
    event_id: Path<EventId>,
    body: Json<RemoveInvitationBody>,
) -> Result<NoContent, ApiError> {
    let event_id = event_id.into_inner();
    let invitee_id = body.into_inner().user_id;
    let actor = current_user.id;

    crate::block(move || -> Result<(), ApiError> {
        let mut conn = db.get_conn()?;

        let event = Event::get(&mut conn, event_id)?;

        if !policy::can_manage_invitations(&event, actor) {
            return Err(ApiError::forbidden());
        }

        let invitee = User::get(&mut conn, invitee_id).optional()?.ok_or_else(|| {
            ApiError::not_found()
                .with_code("user_not_found")
                .with_message("The invited user could not be found")
        })?;

        EventInvitation::delete_by_user(&mut conn, event_id, invitee.id)
            .optional()?
            .ok_or_else(|| {
                ApiError::not_found()
                    .with_code("invitation_not_found")
                    .with_message("No invitation found for this user")
            })?;

        Ok(())
    })
    .await??;

    Ok(NoContent)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::SystemTime;
    use test_util::assert_eq_json;
    use uuid::Uuid;

    #[test]
    fn invitation_resource_serialize() {
        let unix_epoch: DateTime<Utc> = SystemTime::UNIX_EPOCH.into();

        let invitation = EventInvitation {
            id: 1,
            event_id: EventId::from(Uuid::nil()),
            user_id: UserId::from(Uuid::nil()),
            invited_at: unix_epoch,
        };

        let user = User {
            id: UserId::from(Uuid::nil()),
            username: "invitee".into(),
            email: "invitee@example.org".into(),
            firstname: "In".into(),
            lastname: "Vitee".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: unix_epoch,
        };

        assert_eq_json!(
            InvitationResource::from_db(invitation, user),
            {
                "id": 1,
                "event_id": "00000000-0000-0000-0000-000000000000",
                "user": {
                    "id": "00000000-0000-0000-0000-000000000000",
                    "username": "invitee",
                    "firstname": "In",
                    "lastname": "Vitee"
                },
                "invited_at": "1970-01-01T00:00:00Z"
            }
        );
    }

    #[test]
    fn already_invited_message_serialize() {
        assert_eq_json!(
            AlreadyInvitedMessage::new(),
            {
                "message": "User already invited"
            }
        );
    }
}
