use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

/// IdentityError
///
/// Failure modes of the hosted auth provider, as far as callers need to tell them apart.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The provider refused the request and said why (duplicate email, weak password...).
    #[error("{0}")]
    Rejected(String),
    #[error("auth provider unreachable: {0}")]
    Transport(String),
}

/// Tokens of a freshly opened session.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user_id: Uuid,
}

/// Metadata stored on the auth user at sign-up.
#[derive(Debug, Clone)]
pub struct SignUpMetadata {
    pub display_name: String,
    pub user_type: String,
}

// 1. IdentityProvider Contract
/// IdentityProvider
///
/// Abstract contract over the hosted authentication service. Handlers only see this
/// trait, so the Supabase client (`SupabaseIdentityClient`) can be swapped for the
/// in-memory `MockIdentityProvider` in tests.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates the auth user and returns its id, which becomes the profile primary key.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<Uuid, IdentityError>;

    /// Password grant.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    /// Revokes every session of the token's user.
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}

// 2. The Real Implementation (Supabase Auth / GoTrue REST API)
/// SupabaseIdentityClient
///
/// Talks to `<project>/auth/v1` with the project's anon key.
#[derive(Clone)]
pub struct SupabaseIdentityClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct AuthUserBody {
    id: Uuid,
}

/// Sign-up answers with the bare user when e-mail confirmation is on, and with a
/// session wrapping the user when it is off.
#[derive(Deserialize)]
struct SignUpBody {
    id: Option<Uuid>,
    user: Option<AuthUserBody>,
}

#[derive(Deserialize)]
struct TokenBody {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: AuthUserBody,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl SupabaseIdentityClient {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    /// Pulls the human readable message out of a provider error response.
    async fn rejection(response: reqwest::Response) -> IdentityError {
        let status = response.status();
        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        rejection_from(status, body)
    }

    /// Password-grant failures. Only the generic bad-credentials answer collapses into
    /// `InvalidCredentials`; anything more specific ("Email not confirmed") is kept.
    async fn sign_in_rejection(response: reqwest::Response) -> IdentityError {
        let status = response.status();
        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        sign_in_rejection_from(status, body)
    }
}

const GENERIC_CREDENTIALS_MESSAGE: &str = "invalid login credentials";

fn rejection_from(status: StatusCode, body: ErrorBody) -> IdentityError {
    let message = body
        .error_description
        .or(body.msg)
        .or(body.message)
        .unwrap_or_else(|| format!("auth provider returned {}", status));

    if status.is_server_error() {
        IdentityError::Transport(message)
    } else {
        IdentityError::Rejected(message)
    }
}

fn sign_in_rejection_from(status: StatusCode, body: ErrorBody) -> IdentityError {
    match rejection_from(status, body) {
        IdentityError::Rejected(message)
            if message.eq_ignore_ascii_case(GENERIC_CREDENTIALS_MESSAGE)
                || message.starts_with("auth provider returned") =>
        {
            IdentityError::InvalidCredentials
        }
        other => other,
    }
}

fn transport(err: reqwest::Error) -> IdentityError {
    IdentityError::Transport(err.to_string())
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<Uuid, IdentityError> {
        let response = self
            .client
            .post(format!("{}/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": {
                    "nome_completo": metadata.display_name,
                    "user_type": metadata.user_type,
                }
            }))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body = response.json::<SignUpBody>().await.map_err(transport)?;
        body.user
            .map(|u| u.id)
            .or(body.id)
            .ok_or_else(|| IdentityError::Transport("sign-up response without user id".to_string()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let response = self
            .client
            .post(format!("{}/token?grant_type=password", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(Self::sign_in_rejection(response).await);
        }

        let body = response.json::<TokenBody>().await.map_err(transport)?;
        Ok(Session {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            expires_in: body.expires_in,
            user_id: body.user.id,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(format!("{}/logout?scope=global", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejection(response).await)
        }
    }
}

// 3. The Mock Implementation (For Tests)
/// MockIdentityProvider
///
/// In-memory account store. Sign-up registers the e-mail, sign-in checks the password,
/// and `new_unreachable` simulates a provider outage.
#[derive(Clone, Default)]
pub struct MockIdentityProvider {
    accounts: Arc<Mutex<HashMap<String, (Uuid, String)>>>,
    /// When true, every call fails with a transport error.
    pub unreachable: bool,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Pre-registers an account, returning its id.
    pub fn with_account(self, email: &str, password: &str, id: Uuid) -> Self {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.insert(email.to_lowercase(), (id, password.to_string()));
        }
        self
    }

    fn outage(&self) -> Result<(), IdentityError> {
        if self.unreachable {
            Err(IdentityError::Transport(
                "Mock Identity Error: Simulation requested".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _metadata: &SignUpMetadata,
    ) -> Result<Uuid, IdentityError> {
        self.outage()?;
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|e| IdentityError::Transport(e.to_string()))?;
        let key = email.to_lowercase();
        if accounts.contains_key(&key) {
            return Err(IdentityError::Rejected("User already registered".to_string()));
        }
        let id = Uuid::new_v4();
        accounts.insert(key, (id, password.to_string()));
        Ok(id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        self.outage()?;
        let accounts = self
            .accounts
            .lock()
            .map_err(|e| IdentityError::Transport(e.to_string()))?;
        match accounts.get(&email.to_lowercase()) {
            Some((id, stored)) if stored == password => Ok(Session {
                access_token: format!("mock-access-{}", id),
                refresh_token: format!("mock-refresh-{}", id),
                expires_in: 3600,
                user_id: *id,
            }),
            _ => Err(IdentityError::InvalidCredentials),
        }
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), IdentityError> {
        self.outage()
    }
}

/// IdentityState
///
/// The concrete type used to share the auth provider across the application state.
pub type IdentityState = Arc<dyn IdentityProvider>;
