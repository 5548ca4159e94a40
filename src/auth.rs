use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    models::UserKind,
    repository::RepositoryState,
};

/// Audience the hosted auth provider stamps on user access tokens.
pub const TOKEN_AUDIENCE: &str = "authenticated";

/// Claims
///
/// Payload of the access tokens issued by the hosted auth provider, signed with the
/// project's JWT secret (HS256).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the auth user id, which is also the `profiles` primary key.
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
    pub aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// AuthUser
///
/// The resolved identity of an authenticated request. The account kind is looked up
/// on every request, so a company that completes its registration is recognized
/// without a new token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub kind: UserKind,
}

impl AuthUser {
    /// Rejects with 403 unless the caller is a PCD job seeker.
    pub fn require_pcd(&self) -> Result<(), ApiError> {
        match self.kind {
            UserKind::Pcd => Ok(()),
            UserKind::Empresa => Err(ApiError::Forbidden(
                "only PCD accounts can perform this action".to_string(),
            )),
        }
    }

    /// Rejects with 403 unless the caller is a company.
    pub fn require_company(&self) -> Result<(), ApiError> {
        match self.kind {
            UserKind::Empresa => Ok(()),
            UserKind::Pcd => Err(ApiError::Forbidden(
                "only company accounts can perform this action".to_string(),
            )),
        }
    }
}

/// AuthUser Extractor Implementation
///
/// 1. Local Bypass: in `Env::Local` a known profile id in `x-user-id` is accepted.
/// 2. Token Validation: Bearer token, HS256 signature, expiry and audience.
/// 3. DB Lookup: the subject must still have a profile.
///
/// Rejection: `ApiError::Unauthorized` (401) on any authentication failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // Local development bypass. Falls through to JWT validation when the header is
        // missing, malformed or unknown.
        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|id| Uuid::parse_str(id).ok());

            if let Some(user_id) = bypass_id {
                if let Some(user) = repo.get_user(user_id).await? {
                    return Ok(AuthUser {
                        id: user.id,
                        kind: user.kind,
                    });
                }
            }
        }

        let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthorized)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.set_audience(&[TOKEN_AUDIENCE]);

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("expired access token"),
                other => tracing::debug!("rejected access token: {:?}", other),
            }
            ApiError::Unauthorized
        })?;

        // A valid token whose user has no profile is not an active account.
        let user = repo
            .get_user(token_data.claims.sub)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            kind: user.kind,
        })
    }
}

/// Optional extraction for public routes that personalize their answer when a caller
/// is signed in. Any authentication failure yields `None` instead of a rejection.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(<AuthUser as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .ok())
    }
}

/// Returns the raw token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}
