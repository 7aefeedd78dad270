// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! User related API structs and Endpoints
//!
//! The defined structs are exposed to the REST API and will be serialized/deserialized. Similar
//! structs are defined in the database storage crate for database operations.
use crate::api::v1::middleware::token_auth::CurrentUser;
use crate::api::v1::response::{ApiError, ApiResponse, DefaultApiResult};
use actix_web::web::{Data, Json, Path};
use actix_web::{get, patch};
use database::{Db, OptionalExt};
use db_storage::profiles::{UpdateUserProfile, UserProfile};
use db_storage::users::{User, UserId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Public user details
///
/// Contains general "public" information about a user. Is accessible to all other users.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUserProfile {
    pub id: UserId,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
}

impl PublicUserProfile {
    pub fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            firstname: user.firstname,
            lastname: user.lastname,
        }
    }
}

/// Private user profile
///
/// Similar to [`PublicUserProfile`], but contains additional "private" information about a user.
/// Is only accessible to the user himself.
/// Is used on */users/me* endpoints.
#[derive(Debug, Serialize)]
pub struct PrivateUserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub full_name: String,
    pub bio: String,
    pub location: String,
}

impl PrivateUserProfile {
    pub fn from_db(user: User, profile: UserProfile) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            firstname: user.firstname,
            lastname: user.lastname,
            full_name: profile.full_name,
            bio: profile.bio,
            location: profile.location,
        }
    }
}

/// API Endpoint *GET /users/me*
///
/// Returns the [`PrivateUserProfile`] of the requesting user.
#[get("/users/me")]
pub async fn get_me(
    db: Data<Db>,
    current_user: CurrentUser,
) -> DefaultApiResult<PrivateUserProfile> {
    let current_user = current_user.into_inner();
    let user_id = current_user.id;

    let profile = crate::block(move || -> Result<UserProfile, ApiError> {
        let mut conn = db.get_conn()?;

        Ok(UserProfile::get_for_user(&mut conn, user_id)?)
    })
    .await??;

    Ok(ApiResponse::new(PrivateUserProfile::from_db(
        current_user,
        profile,
    )))
}

/// Used to modify the user profile
#[derive(Debug, Deserialize, Validate)]
pub struct PatchMeBody {
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    pub bio: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
}

impl PatchMeBody {
    fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.bio.is_none() && self.location.is_none()
    }
}

/// API Endpoint *PATCH /users/me*
///
/// Modifies the profile of the requesting user and returns the updated [`PrivateUserProfile`].
#[patch("/users/me")]
pub async fn patch_me(
    db: Data<Db>,
    current_user: CurrentUser,
    body: Json<PatchMeBody>,
) -> DefaultApiResult<PrivateUserProfile> {
    let body = body.into_inner();
    body.validate()?;

    let current_user = current_user.into_inner();
    let user_id = current_user.id;

    let profile = crate::block(move || -> Result<UserProfile, ApiError> {
        let mut conn = db.get_conn()?;

        if body.is_empty() {
            return Ok(UserProfile::get_for_user(&mut conn, user_id)?);
        }

        let changeset = UpdateUserProfile {
            full_name: body.full_name,
            bio: body.bio,
            location: body.location,
        };

        Ok(changeset.apply(&mut conn, user_id)?)
    })
    .await??;

    Ok(ApiResponse::new(PrivateUserProfile::from_db(
        current_user,
        profile,
    )))
}

/// API Endpoint *GET /users/{user_id}*
///
/// Returns the [`PublicUserProfile`] of the specified user.
#[get("/users/{user_id}")]
pub async fn get_user(
    db: Data<Db>,
    _current_user: CurrentUser,
    user_id: Path<UserId>,
) -> DefaultApiResult<PublicUserProfile> {
    let user_id = user_id.into_inner();

    let user = crate::block(move || -> Result<Option<User>, ApiError> {
        let mut conn = db.get_conn()?;

        Ok(User::get(&mut conn, user_id).optional()?)
    })
    .await??;

    match user {
        Some(user) => Ok(ApiResponse::new(PublicUserProfile::from_db(user))),
        None => Err(ApiError::not_found()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::time::SystemTime;
    use uuid::Uuid;

    #[test]
    fn public_user_profile_serialize() {
        let unix_epoch: DateTime<Utc> = SystemTime::UNIX_EPOCH.into();

        let user = User {
            id: UserId::from(Uuid::nil()),
            username: "tester".into(),
            email: "test@example.org".into(),
            firstname: "Test".into(),
            lastname: "Tester".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: unix_epoch,
        };

        let profile = PublicUserProfile::from_db(user);

        test_util::assert_eq_json!(
            profile,
            {
                "id": "00000000-0000-0000-0000-000000000000",
                "username": "tester",
                "firstname": "Test",
                "lastname": "Tester"
            }
        );
    }
}
