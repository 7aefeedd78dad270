// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Auth related API structs and Endpoints
//!
//! Registration stores the password as an argon2 PHC string, login verifies
//! it and answers with a signed access token. The raw password never leaves
//! this module and the hash is never serialized into any response.
use crate::api::v1::response::{ApiError, ApiResponse, DefaultApiResult};
use crate::api::v1::users::PublicUserProfile;
use crate::settings::SharedSettingsActix;
use crate::token;
use actix_web::post;
use actix_web::web::{Data, Json};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use database::{DatabaseError, Db};
use db_storage::profiles::NewUserProfile;
use db_storage::users::{NewUser, User, UserId};
use diesel::Connection;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The JSON body expected when making a *POST* request on `/auth/register`
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterBody {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub firstname: String,
    #[validate(length(min = 1, max = 255))]
    pub lastname: String,
    #[validate(length(min = 8, max = 255))]
    pub password: String,
}

/// API Endpoint *POST /auth/register*
///
/// Creates a new user account together with its empty profile.
/// Returns the [`PublicUserProfile`] of the created account.
#[post("/auth/register")]
pub async fn register(
    db: Data<Db>,
    body: Json<RegisterBody>,
) -> Result<ApiResponse<PublicUserProfile>, ApiError> {
    let body = body.into_inner();
    body.validate()?;

    let user = crate::block(move || -> Result<Option<User>, ApiError> {
        let password_hash = hash_password(&body.password)?;

        let mut conn = db.get_conn()?;

        let user = conn.transaction::<Option<User>, DatabaseError, _>(|conn| {
            let user = NewUser {
                id: UserId::generate(),
                username: body.username,
                email: body.email.to_lowercase(),
                firstname: body.firstname,
                lastname: body.lastname,
                password_hash,
            }
            .try_insert(conn)?;

            match user {
                Some(user) => {
                    NewUserProfile {
                        user_id: user.id,
                        full_name: format!("{} {}", user.firstname, user.lastname),
                        bio: String::new(),
                        location: String::new(),
                    }
                    .insert(conn)?;

                    Ok(Some(user))
                }
                None => Ok(None),
            }
        })?;

        Ok(user)
    })
    .await??;

    match user {
        Some(user) => Ok(ApiResponse::created(PublicUserProfile::from_db(user))),
        None => Err(ApiError::bad_request()
            .with_code("username_taken")
            .with_message("The username is already taken")),
    }
}

/// The JSON body expected when making a *POST* request on `/auth/login`
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

/// JSON body of the response coming from the *POST* request on `/auth/login`
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// API Endpoint *POST /auth/login*
///
/// Verifies the provided credentials. When they are valid, an access token for the
/// user is issued and returned as [`LoginResponse`].
#[post("/auth/login")]
pub async fn login(
    settings: SharedSettingsActix,
    db: Data<Db>,
    body: Json<LoginBody>,
) -> DefaultApiResult<LoginResponse> {
    let settings = settings.load_full();
    let body = body.into_inner();

    let user = crate::block(move || -> Result<Option<User>, ApiError> {
        let mut conn = db.get_conn()?;

        let user = User::get_by_username(&mut conn, &body.username)?;

        match user {
            Some(user) if verify_password(&user.password_hash, &body.password) => Ok(Some(user)),
            _ => Ok(None),
        }
    })
    .await??;

    let user = match user {
        Some(user) => user,
        None => {
            return Err(ApiError::unauthorized()
                .with_code("invalid_credentials")
                .with_message("Unknown username or wrong password"));
        }
    };

    let lifetime = settings.auth.access_token_lifetime;

    let access_token = token::issue_access_token(&settings.auth.access_token_secret, lifetime, user.id)
        .map_err(|e| {
            log::error!("Failed to issue access token, {}", e);
            ApiError::internal()
        })?;

    Ok(ApiResponse::new(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: lifetime.num_seconds(),
    }))
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            log::error!("Failed to hash password, {}", e);
            ApiError::internal()
        })?;

    Ok(hash.to_string())
}

fn verify_password(password_hash: &str, password: &str) -> bool {
    let parsed = match PasswordHash::new(password_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::error!("Corrupt password hash in database, {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod test {
    use super::*;

    fn register_body() -> RegisterBody {
        RegisterBody {
            username: "tester".into(),
            email: "test@example.org".into(),
            firstname: "Test".into(),
            lastname: "Tester".into(),
            password: "correct horse battery staple".into(),
        }
    }

    #[test]
    fn register_body_accepts_sane_input() {
        assert!(register_body().validate().is_ok());
    }

    #[test]
    fn register_body_rejects_invalid_email() {
        let mut body = register_body();
        body.email = "not-an-email".into();

        assert!(body.validate().is_err());
    }

    #[test]
    fn register_body_rejects_short_passwords() {
        let mut body = register_body();
        body.password = "short".into();

        assert!(body.validate().is_err());
    }

    #[test]
    fn password_hashes_verify_and_are_opaque() {
        let hash = hash_password("hunter2hunter2").unwrap();

        assert!(!hash.contains("hunter2"));
        assert!(verify_password(&hash, "hunter2hunter2"));
        assert!(!verify_password(&hash, "wrong password"));
        assert!(!verify_password("not-a-phc-string", "hunter2hunter2"));
    }
}
