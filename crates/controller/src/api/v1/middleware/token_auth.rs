// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Handles user authentication in API requests
//!
//! When a bearer token is present it is verified and the matching user is
//! made available to the endpoints, a request without an `Authorization`
//! header passes through anonymously. Endpoints state their requirement via
//! the [`CurrentUser`] and [`MaybeUser`] extractors, so publicly readable
//! resources stay reachable without credentials while everything else
//! responds with 401.
use crate::api::v1::response::error::AuthenticationError;
use crate::api::v1::response::ApiError;
use crate::settings::SharedSettings;
use crate::token::{self, TokenError};
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::Error;
use actix_web::http::header;
use actix_web::http::header::Header;
use actix_web::web::Data;
use actix_web::{FromRequest, HttpMessage, HttpRequest, ResponseError};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use core::future::ready;
use database::{Db, OptionalExt};
use db_storage::users::User;
use std::future::{Future, Ready};
use std::ops::Deref;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Extractor for endpoints that require an authenticated caller
///
/// Responds with 401 when the request carries no verified identity.
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(match req.extensions().get::<User>() {
            Some(user) => Ok(CurrentUser(user.clone())),
            None => Err(ApiError::unauthorized()
                .with_message("The requested resource requires authentication")),
        })
    }
}

/// Extractor for endpoints that serve anonymous callers as well
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn into_inner(self) -> Option<User> {
        self.0
    }
}

impl FromRequest for MaybeUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(MaybeUser(req.extensions().get::<User>().cloned())))
    }
}

/// Middleware factory
///
/// Transforms into [`TokenAuthMiddleware`]
pub struct TokenAuth {
    pub db: Data<Db>,
    pub settings: SharedSettings,
}

impl<S> Transform<S, ServiceRequest> for TokenAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Transform = TokenAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TokenAuthMiddleware {
            service: Rc::new(service),
            db: self.db.clone(),
            settings: self.settings.clone(),
        }))
    }
}

/// Authentication middleware
///
/// Whenever an API request is received, the TokenAuthMiddleware validates a present access
/// token and provides the associated user for the subsequent services.
pub struct TokenAuthMiddleware<S> {
    service: Rc<S>,
    db: Data<Db>,
    settings: SharedSettings,
}

type ResultFuture<O, E> = Pin<Box<dyn Future<Output = Result<O, E>>>>;

impl<S> Service<ServiceRequest> for TokenAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Future = ResultFuture<Self::Response, Self::Error>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let db = self.db.clone();
        let settings = self.settings.clone();

        if !req.headers().contains_key(header::AUTHORIZATION) {
            // anonymous request, the extractors decide whether that is acceptable
            return Box::pin(service.call(req));
        }

        let auth = match Authorization::<Bearer>::parse(&req) {
            Ok(a) => a,
            Err(e) => {
                log::warn!("Unable to parse access token, {}", e);
                let error = ApiError::unauthorized()
                    .with_message("Unable to parse access token")
                    .with_www_authenticate(AuthenticationError::InvalidAccessToken);
                let response = req.into_response(error.error_response());
                return Box::pin(ready(Ok(response)));
            }
        };

        let access_token = auth.into_scheme().token().to_string();

        Box::pin(async move {
            let current_user = check_access_token(db, settings, &access_token).await?;

            req.extensions_mut().insert(current_user);
            service.call(req).await
        })
    }
}

/// Verifies the access token and resolves the user it was issued to
pub async fn check_access_token(
    db: Data<Db>,
    settings: SharedSettings,
    access_token: &str,
) -> Result<User, ApiError> {
    let settings = settings.load_full();

    let claims = match token::verify_access_token(&settings.auth.access_token_secret, access_token)
    {
        Ok(claims) => claims,
        Err(TokenError::Expired) => {
            return Err(ApiError::unauthorized()
                .with_www_authenticate(AuthenticationError::AccessTokenExpired));
        }
        Err(TokenError::InvalidToken(e)) => {
            log::warn!("Invalid access token, {}", e);
            return Err(ApiError::unauthorized()
                .with_www_authenticate(AuthenticationError::InvalidAccessToken));
        }
    };

    let user = crate::block(move || -> Result<Option<User>, ApiError> {
        let mut conn = db.get_conn()?;

        let user = User::get(&mut conn, claims.sub).optional()?;

        Ok(user)
    })
    .await??;

    match user {
        Some(user) => Ok(user),
        None => {
            log::warn!("The user of a valid access token no longer exists");
            Err(ApiError::unauthorized()
                .with_www_authenticate(AuthenticationError::InvalidAccessToken))
        }
    }
}
