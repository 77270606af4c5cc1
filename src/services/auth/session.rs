use std::sync::Arc;

use axum_extra::extract::cookie::Cookie;
use thiserror::Error;
use tokio::task::{self, JoinError};
use tracing::{debug, info};

use crate::repos::{IdentityStore, NewCredential, Principal, RepoError};
use crate::services::auth::cookie::CookiePolicy;
use crate::services::auth::mode::{AuthMode, ModePolicy};
use crate::services::auth::password::{CredentialVerifier, PasswordError};
use crate::services::auth::token_codec::{SubjectClaims, TokenCodec, TokenError};

const MAX_USERNAME_CHARS: usize = 64;
const MAX_EMAIL_CHARS: usize = 254;
const MAX_PASSWORD_BYTES: usize = 1024;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("account already exists")]
    AlreadyExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("identity store failure")]
    Store(#[source] RepoError),
    #[error("password worker failed")]
    Worker(#[from] JoinError),
}

/// Result of a successful login, ready to be turned into a response.
#[derive(Debug)]
pub struct LoginOutcome {
    pub principal: Principal,
    pub mode: AuthMode,
    /// Set for `header` and `both`.
    pub body_token: Option<String>,
    /// Set for `cookie` and `both`.
    pub cookie: Option<Cookie<'static>>,
    pub expires_in: i64,
}

/// Login, logout and registration.
#[derive(Clone)]
pub struct SessionIssuer {
    store: Arc<dyn IdentityStore>,
    verifier: Arc<dyn CredentialVerifier>,
    tokens: Arc<TokenCodec>,
    modes: ModePolicy,
    cookies: CookiePolicy,
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("tokens", &self.tokens)
            .field("modes", &self.modes)
            .field("cookies", &self.cookies)
            .finish_non_exhaustive()
    }
}

impl SessionIssuer {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        verifier: Arc<dyn CredentialVerifier>,
        tokens: Arc<TokenCodec>,
        modes: ModePolicy,
        cookies: CookiePolicy,
    ) -> Self {
        Self {
            store,
            verifier,
            tokens,
            modes,
            cookies,
        }
    }

    pub fn modes(&self) -> &ModePolicy {
        &self.modes
    }

    /// Any uniqueness violation from the store is reported as `AlreadyExists`.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        plaintext: &str,
    ) -> Result<Principal, SessionError> {
        let username = username.trim();
        let email = email.trim();
        validate_registration(username, email, plaintext)?;

        let password_hash = self.hash_password(plaintext).await?;

        let principal = self
            .store
            .save(NewCredential {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepoError::Conflict => SessionError::AlreadyExists,
                other => SessionError::Store(other),
            })?;

        info!(subject_id = %principal.subject_id, "account registered");
        Ok(principal)
    }

    /// `identifier` is a username or email. Unknown account and wrong password are
    /// indistinguishable to the caller.
    pub async fn login(
        &self,
        identifier: &str,
        plaintext: &str,
        requested_mode: Option<&str>,
    ) -> Result<LoginOutcome, SessionError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || plaintext.is_empty() {
            return Err(SessionError::InvalidCredentials);
        }

        let credential = self
            .store
            .find_credential_by_identifier(identifier)
            .await
            .map_err(SessionError::Store)?;

        let Some(credential) = credential else {
            debug!("login rejected: unknown identifier");
            return Err(SessionError::InvalidCredentials);
        };

        if !self
            .verify_password(plaintext, &credential.password_hash)
            .await?
        {
            debug!(subject_id = %credential.subject_id, "login rejected: password mismatch");
            return Err(SessionError::InvalidCredentials);
        }

        let principal = credential.principal();
        let issued = self.tokens.issue(&SubjectClaims {
            subject_id: principal.subject_id,
            username: principal.username.clone(),
            email: principal.email.clone(),
        })?;

        let mode = self.modes.resolve_effective_mode(requested_mode);

        info!(
            subject_id = %principal.subject_id,
            mode = mode.as_str(),
            "login succeeded"
        );

        Ok(LoginOutcome {
            cookie: mode.delivers_cookie().then(|| self.cookies.build(&issued.token)),
            body_token: mode.delivers_body_token().then_some(issued.token),
            expires_in: self.tokens.ttl().num_seconds(),
            principal,
            mode,
        })
    }

    /// Always succeeds: the server holds no session state to tear down.
    pub fn logout(&self) -> Cookie<'static> {
        self.cookies.build_clearing()
    }

    // Argon2 is CPU-bound for hundreds of ms; keep it off the async workers.
    async fn hash_password(&self, plaintext: &str) -> Result<String, SessionError> {
        let verifier = self.verifier.clone();
        let plaintext = plaintext.to_owned();
        Ok(task::spawn_blocking(move || verifier.hash(&plaintext)).await??)
    }

    async fn verify_password(&self, plaintext: &str, hash: &str) -> Result<bool, SessionError> {
        let verifier = self.verifier.clone();
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();
        Ok(task::spawn_blocking(move || verifier.verify(&plaintext, &hash)).await?)
    }
}

fn validate_registration(
    username: &str,
    email: &str,
    plaintext: &str,
) -> Result<(), SessionError> {
    if username.is_empty() {
        return Err(SessionError::InvalidInput("username is required"));
    }
    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(SessionError::InvalidInput("username is too long"));
    }
    if username.contains('@') {
        return Err(SessionError::InvalidInput("username must not contain '@'"));
    }
    if !looks_like_email(email) || email.chars().count() > MAX_EMAIL_CHARS {
        return Err(SessionError::InvalidInput("email is invalid"));
    }
    if plaintext.trim().is_empty() {
        return Err(SessionError::InvalidInput("password is required"));
    }
    if plaintext.len() > MAX_PASSWORD_BYTES {
        return Err(SessionError::InvalidInput("password is too long"));
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
