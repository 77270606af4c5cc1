//! Store doubles for tests.

use async_trait::async_trait;

use super::{Credential, IdentityStore, NewCredential, Principal, RepoError, RepoResult};

/// Every call fails as if the connection pool were exhausted.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableStore;

#[async_trait]
impl IdentityStore for UnavailableStore {
    async fn find_by_subject_or_username(&self, _key: &str) -> RepoResult<Option<Principal>> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn find_credential_by_identifier(
        &self,
        _identifier: &str,
    ) -> RepoResult<Option<Credential>> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn save(&self, _credential: NewCredential) -> RepoResult<Principal> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }
}
