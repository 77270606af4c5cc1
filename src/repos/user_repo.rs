/*
 * Responsibility
 * - Identity store interface used by the auth core (keyed reads + insert)
 * - SQLx implementation over the `users` table
 *
 * Schema assumed:
 *   users.user_id       uuid primary key default gen_random_uuid()
 *   users.username      text not null unique
 *   users.email         text not null, unique index on lower(email)
 *   users.password_hash text not null (PHC string)
 *   users.created_at    timestamptz not null default now()
 */
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

/// Authenticated identity as seen by handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    #[sqlx(rename = "user_id")]
    pub subject_id: Uuid,
    pub username: String,
    pub email: String,
}

/// Stored login material. `password_hash` is never decoded, only verified.
#[derive(Clone, FromRow)]
pub struct Credential {
    #[sqlx(rename = "user_id")]
    pub subject_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("subject_id", &self.subject_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Credential {
    pub fn principal(&self) -> Principal {
        Principal {
            subject_id: self.subject_id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Clone)]
pub struct NewCredential {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Keyed lookups the auth core needs from the user store.
#[async_trait]
pub trait IdentityStore: Send + Sync + 'static {
    /// `key` is a subject id (UUID string) or a username.
    async fn find_by_subject_or_username(&self, key: &str) -> RepoResult<Option<Principal>>;

    /// `identifier` is a username or an email address (email compared case-insensitively).
    async fn find_credential_by_identifier(&self, identifier: &str)
    -> RepoResult<Option<Credential>>;

    /// Fails with `RepoError::Conflict` when username or email is taken.
    async fn save(&self, credential: NewCredential) -> RepoResult<Principal>;
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgUserRepo {
    async fn find_by_subject_or_username(&self, key: &str) -> RepoResult<Option<Principal>> {
        let row = match Uuid::parse_str(key) {
            Ok(subject_id) => {
                sqlx::query_as::<_, Principal>(
                    r#"
                    SELECT user_id, username, email
                    FROM users
                    WHERE user_id = $1
                    "#,
                )
                .bind(subject_id)
                .fetch_optional(&self.pool)
                .await?
            }
            Err(_) => {
                sqlx::query_as::<_, Principal>(
                    r#"
                    SELECT user_id, username, email
                    FROM users
                    WHERE username = $1
                    "#,
                )
                .bind(key)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(row)
    }

    async fn find_credential_by_identifier(
        &self,
        identifier: &str,
    ) -> RepoResult<Option<Credential>> {
        let row = sqlx::query_as::<_, Credential>(
            r#"
            SELECT user_id, username, email, password_hash
            FROM users
            WHERE username = $1 OR lower(email) = lower($1)
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn save(&self, credential: NewCredential) -> RepoResult<Principal> {
        let row = sqlx::query_as::<_, Principal>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING user_id, username, email
            "#,
        )
        .bind(&credential.username)
        .bind(&credential.email)
        .bind(&credential.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }
}
