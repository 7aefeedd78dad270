// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Access token signing and verification
//!
//! Login issues a HS256 signed JWT whose subject is the user id. The token
//! only proves identity, every capability decision is made per request by
//! the [`policy`](crate::policy) module.

use chrono::Utc;
use db_storage::users::UserId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an issued access token
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// The id of the authenticated user
    pub sub: UserId,
    /// Unix timestamp of the issuing time
    pub iat: i64,
    /// Unix timestamp after which the token is rejected
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("The token is expired")]
    Expired,
    #[error("Unable to parse or verify the token, {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
}

/// Creates a signed access token for the given user
pub fn issue_access_token(
    secret: &str,
    lifetime: chrono::Duration,
    user_id: UserId,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();

    let claims = AccessTokenClaims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies signature and expiry of the given token and returns its claims
pub fn verify_access_token(secret: &str, token: &str) -> Result<AccessTokenClaims, TokenError> {
    let validation = Validation::new(Algorithm::HS256);

    match decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(TokenError::Expired),
            _ => Err(TokenError::InvalidToken(e)),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use uuid::Uuid;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_tokens_verify() {
        let user_id = UserId::from(Uuid::from_u128(42));

        let token = issue_access_token(SECRET, chrono::Duration::hours(1), user_id).unwrap();

        let claims = verify_access_token(SECRET, &token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let user_id = UserId::from(Uuid::from_u128(42));

        // far enough in the past to clear the default decoding leeway
        let token = issue_access_token(SECRET, chrono::Duration::minutes(-5), user_id).unwrap();

        assert!(matches!(
            verify_access_token(SECRET, &token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn foreign_and_garbage_tokens_are_rejected() {
        let user_id = UserId::from(Uuid::from_u128(42));

        let token = issue_access_token("other-secret", chrono::Duration::hours(1), user_id).unwrap();

        assert!(matches!(
            verify_access_token(SECRET, &token),
            Err(TokenError::InvalidToken(_))
        ));

        assert!(matches!(
            verify_access_token(SECRET, "not-a-token"),
            Err(TokenError::InvalidToken(_))
        ));
    }
}
