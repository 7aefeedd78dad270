// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Review related API structs and Endpoints
use crate::api::v1::middleware::token_auth::CurrentUser;
use crate::api::v1::response::{ApiError, ApiResponse, DefaultApiResult};
use crate::api::v1::users::PublicUserProfile;
use crate::policy;
use actix_web::web::{Data, Json, Path};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use database::Db;
use db_storage::events::{Event, EventId, EventReview, NewEventReview};
use db_storage::users::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A review of an event
#[derive(Debug, Serialize)]
pub struct ReviewResource {
    pub id: i64,
    pub user: PublicUserProfile,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewResource {
    fn from_db(review: EventReview, user: User) -> Self {
        Self {
            id: review.id,
            user: PublicUserProfile::from_db(user),
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

/// API Endpoint `GET /events/{event_id}/reviews`
///
/// Returns a JSON array of all [`ReviewResource`]s of the specified event.
#[get("/events/{event_id}/reviews")]
pub async fn get_reviews(
    db: Data<Db>,
    current_user: CurrentUser,
    event_id: Path<EventId>,
) -> DefaultApiResult<Vec<ReviewResource>> {
    let event_id = event_id.into_inner();
    let actor = current_user.id;

    let reviews = crate::block(move || -> Result<Vec<(EventReview, User)>, ApiError> {
        let mut conn = db.get_conn()?;

        let (event, invitation) = Event::get_with_invitation(&mut conn, event_id, Some(actor))?;

        if !policy::can_read(&event, Some(actor), invitation.is_some()) {
            return Err(ApiError::forbidden());
        }

        Ok(EventReview::get_for_event(&mut conn, event_id)?)
    })
    .await??;

    let reviews = reviews
        .into_iter()
        .map(|(review, user)| ReviewResource::from_db(review, user))
        .collect();

    Ok(ApiResponse::new(reviews))
}

/// The JSON body expected when making a *POST* request on `/events/{event_id}/add_review`
#[derive(Debug, Deserialize, Validate)]
pub struct PostReviewBody {
    /// Rating from 1 to 5
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    pub comment: String,
}

/// API Endpoint `POST /events/{event_id}/add_review`
///
/// Creates or overwrites the review of the requesting user for the specified
/// event. Answers with 201 when the review was created and 200 when an
/// existing one was overwritten, the body is the [`ReviewResource`] in both
/// cases.
#[post("/events/{event_id}/add_review")]
pub async fn add_review(
    db: Data<Db>,
    current_user: CurrentUser,
    event_id: Path<EventId>,
    body: Json<PostReviewBody>,
) -> DefaultApiResult<ReviewResource> {
    let body = body.into_inner();
    body.validate()?;

    let event_id = event_id.into_inner();
    let current_user = current_user.into_inner();
    let actor = current_user.id;

    let (review, created) = crate::block(move || -> Result<(EventReview, bool), ApiError> {
        let mut conn = db.get_conn()?;

        let (event, invitation) = Event::get_with_invitation(&mut conn, event_id, Some(actor))?;

        if !policy::can_read(&event, Some(actor), invitation.is_some()) {
            return Err(ApiError::forbidden());
        }

        let upserted = NewEventReview {
            event_id,
            user_id: actor,
            rating: body.rating,
            comment: body.comment,
        }
        .upsert(&mut conn)?;

        Ok(upserted)
    })
    .await??;

    let resource = ReviewResource::from_db(review, current_user);

    if created {
        Ok(ApiResponse::created(resource))
    } else {
        Ok(ApiResponse::new(resource))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn review_body(rating: i32) -> PostReviewBody {
        PostReviewBody {
            rating,
            comment: "a comment".into(),
        }
    }

    #[test]
    fn review_rating_bounds() {
        assert!(review_body(1).validate().is_ok());
        assert!(review_body(5).validate().is_ok());

        assert!(review_body(0).validate().is_err());
        assert!(review_body(6).validate().is_err());
        assert!(review_body(-3).validate().is_err());
    }
}
