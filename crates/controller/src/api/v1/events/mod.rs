// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Event related API structs and Endpoints
//!
//! Access control happens in two layers: the list endpoint filters at query
//! level, while every object endpoint re-checks the fetched event with the
//! [`policy`](crate::policy) functions. A private event that is excluded
//! from list results must still deny a direct fetch by id.
use crate::api::v1::middleware::token_auth::{CurrentUser, MaybeUser};
use crate::api::v1::response::error::ValidationErrorEntry;
use crate::api::v1::response::{
    ApiError, ApiResponse, DefaultApiResult, NoContent, CODE_INVALID_VALUE,
};
use crate::api::v1::users::PublicUserProfile;
use crate::policy;
use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post, route};
use chrono::{DateTime, Utc};
use database::Db;
use db_storage::events::{Event, EventFilter, EventId, NewEvent, UpdateEvent};
use db_storage::users::User;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub mod invitations;
pub mod reviews;
pub mod rsvps;

/// An event
///
/// Contains all event information including the public profile of its organizer.
#[derive(Debug, Serialize)]
pub struct EventResource {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub organizer: PublicUserProfile,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventResource {
    pub fn from_db(event: Event, organizer: User) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            location: event.location,
            organizer: PublicUserProfile::from_db(organizer),
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            is_public: event.is_public,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Path query parameters of the `GET /events` endpoint
///
/// Allows for customization in the search for events
#[derive(Debug, Deserialize)]
pub struct GetEventsQuery {
    /// Only return events at this exact location
    location: Option<String>,

    /// Case insensitive substring match on title and location
    search: Option<String>,
}

/// API Endpoint `GET /events`
///
/// Returns a JSON array of all [`EventResource`]s the caller may see: public
/// events, events organized by the caller and events the caller is invited
/// to. Anonymous callers get the public events only.
#[get("/events")]
pub async fn get_events(
    db: Data<Db>,
    current_user: MaybeUser,
    query: Query<GetEventsQuery>,
) -> DefaultApiResult<Vec<EventResource>> {
    let actor = current_user.into_inner().map(|user| user.id);
    let query = query.into_inner();

    let events = crate::block(move || -> Result<Vec<(Event, User)>, ApiError> {
        let mut conn = db.get_conn()?;

        let filter = EventFilter {
            location: query.location,
            search: query.search,
        };

        Ok(Event::get_all_accessible(&mut conn, actor, &filter)?)
    })
    .await??;

    let events = events
        .into_iter()
        .map(|(event, organizer)| EventResource::from_db(event, organizer))
        .collect();

    Ok(ApiResponse::new(events))
}

/// The JSON body expected when making a *POST* request on `/events`
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_event_times"))]
pub struct PostEventsBody {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: String,
    #[validate(length(min = 1, max = 255))]
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default = "default_is_public")]
    pub is_public: bool,
}

fn default_is_public() -> bool {
    true
}

fn validate_event_times(body: &PostEventsBody) -> Result<(), ValidationError> {
    if body.ends_at < body.starts_at {
        return Err(ValidationError::new("ends_before_starts"));
    }

    Ok(())
}

/// API Endpoint `POST /events`
///
/// Creates a new event. The requesting user always becomes the organizer,
/// there is no way to create an event on behalf of someone else.
/// Returns the created [`EventResource`].
#[post("/events")]
pub async fn new_event(
    db: Data<Db>,
    current_user: CurrentUser,
    body: Json<PostEventsBody>,
) -> Result<ApiResponse<EventResource>, ApiError> {
    let body = body.into_inner();
    body.validate()?;

    let current_user = current_user.into_inner();
    let created_by = current_user.id;

    let event = crate::block(move || -> Result<Event, ApiError> {
        let mut conn = db.get_conn()?;

        let event = NewEvent {
            id: EventId::generate(),
            title: body.title,
            description: body.description,
            location: body.location,
            created_by,
            starts_at: body.starts_at,
            ends_at: body.ends_at,
            is_public: body.is_public,
        }
        .insert(&mut conn)?;

        Ok(event)
    })
    .await??;

    Ok(ApiResponse::created(EventResource::from_db(
        event,
        current_user,
    )))
}

/// API Endpoint `GET /events/{event_id}`
///
/// Returns the specified event as [`EventResource`]. Anonymous callers can
/// fetch public events, private events are only readable for the organizer
/// and invited users.
#[get("/events/{event_id}")]
pub async fn get_event(
    db: Data<Db>,
    current_user: MaybeUser,
    event_id: Path<EventId>,
) -> DefaultApiResult<EventResource> {
    let event_id = event_id.into_inner();
    let actor = current_user.into_inner().map(|user| user.id);

    let (event, organizer) = crate::block(move || -> Result<(Event, User), ApiError> {
        let mut conn = db.get_conn()?;

        let (event, invitation) = Event::get_with_invitation(&mut conn, event_id, actor)?;

        if !policy::can_read(&event, actor, invitation.is_some()) {
            return Err(ApiError::forbidden());
        }

        let organizer = User::get(&mut conn, event.created_by)?;

        Ok((event, organizer))
    })
    .await??;

    Ok(ApiResponse::new(EventResource::from_db(event, organizer)))
}

/// The JSON body expected when modifying an event
#[derive(Debug, Deserialize, Validate)]
pub struct PatchEventBody {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_public: Option<bool>,
}

/// API Endpoint `PUT|PATCH /events/{event_id}`
///
/// Partially modifies the specified event. Only the organizer may do this.
/// Returns the modified [`EventResource`].
#[route("/events/{event_id}", method = "PATCH", method = "PUT")]
pub async fn patch_event(
    db: Data<Db>,
    current_user: CurrentUser,
    event_id: Path<EventId>,
    body: Json<PatchEventBody>,
) -> DefaultApiResult<EventResource> {
    let body = body.into_inner();
    body.validate()?;

    if let (Some(starts_at), Some(ends_at)) = (body.starts_at, body.ends_at) {
        if ends_at < starts_at {
            return Err(ApiError::validation_failed([ValidationErrorEntry::new(
                "ends_at",
                CODE_INVALID_VALUE,
                Some("must not be before starts_at"),
            )]));
        }
    }

    let event_id = event_id.into_inner();
    let current_user = current_user.into_inner();
    let actor = current_user.id;

    let event = crate::block(move || -> Result<Event, ApiError> {
        let mut conn = db.get_conn()?;

        let event = Event::get(&mut conn, event_id)?;

        if !policy::can_write(&event, actor) {
            return Err(ApiError::forbidden());
        }

        let changeset = UpdateEvent {
            title: body.title,
            description: body.description,
            location: body.location,
            starts_at: body.starts_at,
            ends_at: body.ends_at,
            is_public: body.is_public,
            updated_at: Utc::now(),
        };

        Ok(changeset.apply(&mut conn, event_id)?)
    })
    .await??;

    // write access implies the caller is the organizer
    Ok(ApiResponse::new(EventResource::from_db(
        event,
        current_user,
    )))
}

/// API Endpoint `DELETE /events/{event_id}`
///
/// Deletes the specified event together with all its RSVPs, reviews and
/// invitations. Only the organizer may do this.
#[delete("/events/{event_id}")]
pub async fn delete_event(
    db: Data<Db>,
    current_user: CurrentUser,
    event_id: Path<EventId>,
) -> Result<NoContent, ApiError> {
    let event_id = event_id.into_inner();
    let actor = current_user.id;

    crate::block(move || -> Result<(), ApiError> {
        let mut conn = db.get_conn()?;

        let event = Event::get(&mut conn, event_id)?;

        if !policy::can_write(&event, actor) {
            return Err(ApiError::forbidden());
        }

        Event::delete_by_id(&mut conn, event_id)?;

        Ok(())
    })
    .await??;

    Ok(NoContent)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use db_storage::users::UserId;
    use std::time::SystemTime;
    use test_util::assert_eq_json;
    use uuid::Uuid;

    fn test_organizer() -> User {
        let unix_epoch: DateTime<Utc> = SystemTime::UNIX_EPOCH.into();

        User {
            id: UserId::from(Uuid::nil()),
            username: "organizer".into(),
            email: "organizer@example.org".into(),
            firstname: "Orga".into(),
            lastname: "Nizer".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: unix_epoch,
        }
    }

    #[test]
    fn event_resource_serialize() {
        let unix_epoch: DateTime<Utc> = SystemTime::UNIX_EPOCH.into();

        let event = Event {
            id: EventId::from(Uuid::nil()),
            title: "Event title".into(),
            description: "Event description".into(),
            location: "Event location".into(),
            created_by: UserId::from(Uuid::nil()),
            starts_at: unix_epoch,
            ends_at: unix_epoch,
            is_public: true,
            created_at: unix_epoch,
            updated_at: unix_epoch,
        };

        let event_resource = EventResource::from_db(event, test_organizer());

        assert_eq_json!(
            event_resource,
            {
                "id": "00000000-0000-0000-0000-000000000000",
                "title": "Event title",
                "description": "Event description",
                "location": "Event location",
                "organizer": {
                    "id": "00000000-0000-0000-0000-000000000000",
                    "username": "organizer",
                    "firstname": "Orga",
                    "lastname": "Nizer"
                },
                "starts_at": "1970-01-01T00:00:00Z",
                "ends_at": "1970-01-01T00:00:00Z",
                "is_public": true,
                "created_at": "1970-01-01T00:00:00Z",
                "updated_at": "1970-01-01T00:00:00Z",
            }
        );
    }

    #[test]
    fn post_events_body_rejects_reversed_times() {
        let body = PostEventsBody {
            title: "Event title".into(),
            description: String::new(),
            location: "Event location".into(),
            starts_at: Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2024, 6, 1, 16, 0, 0).unwrap(),
            is_public: true,
        };

        assert!(body.validate().is_err());
    }

    #[test]
    fn post_events_body_defaults_to_public() {
        let body: PostEventsBody = serde_json::from_value(serde_json::json!({
            "title": "Event title",
            "description": "",
            "location": "Event location",
            "starts_at": "2024-06-01T16:00:00Z",
            "ends_at": "2024-06-01T18:00:00Z",
        }))
        .unwrap();

        assert!(body.is_public);
        assert!(body.validate().is_ok());
    }
}
