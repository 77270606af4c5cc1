//! In-process identity store, used when no `DATABASE_URL` is configured and in tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::user_repo::{Credential, IdentityStore, NewCredential, Principal};

#[derive(Clone, Debug, Default)]
pub struct InMemoryUserRepo {
    users: Arc<RwLock<HashMap<Uuid, Credential>>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a user. Tests use this to simulate an account removed after a token was issued.
    pub async fn remove(&self, subject_id: Uuid) -> bool {
        self.users.write().await.remove(&subject_id).is_some()
    }
}

#[async_trait]
impl IdentityStore for InMemoryUserRepo {
    async fn find_by_subject_or_username(&self, key: &str) -> RepoResult<Option<Principal>> {
        let users = self.users.read().await;

        let found = match Uuid::parse_str(key) {
            Ok(id) => users.get(&id),
            Err(_) => users.values().find(|u| u.username == key),
        };

        Ok(found.map(|u| u.principal()))
    }

    async fn find_credential_by_identifier(
        &self,
        identifier: &str,
    ) -> RepoResult<Option<Credential>> {
        let users = self.users.read().await;

        Ok(users
            .values()
            .find(|u| u.username == identifier || u.email.eq_ignore_ascii_case(identifier))
            .cloned())
    }

    async fn save(&self, credential: NewCredential) -> RepoResult<Principal> {
        let mut users = self.users.write().await;

        let taken = users.values().any(|u| {
            u.username == credential.username || u.email.eq_ignore_ascii_case(&credential.email)
        });
        if taken {
            return Err(RepoError::Conflict);
        }

        let stored = Credential {
            subject_id: Uuid::new_v4(),
            username: credential.username,
            email: credential.email,
            password_hash: credential.password_hash,
        };
        let principal = stored.principal();
        users.insert(stored.subject_id, stored);

        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_cred(username: &str, email: &str) -> NewCredential {
        NewCredential {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$fake".to_string(),
        }
    }

    #[tokio::test]
    async fn save_then_lookup_by_subject_username_and_email() {
        let repo = InMemoryUserRepo::new();
        let p = repo.save(new_cred("rain", "rain@example.com")).await.unwrap();

        let by_id = repo
            .find_by_subject_or_username(&p.subject_id.to_string())
            .await
            .unwrap();
        assert_eq!(by_id.as_ref(), Some(&p));

        let by_name = repo.find_by_subject_or_username("rain").await.unwrap();
        assert_eq!(by_name.as_ref(), Some(&p));

        let cred = repo
            .find_credential_by_identifier("RAIN@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cred.subject_id, p.subject_id);
    }

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let repo = InMemoryUserRepo::new();
        repo.save(new_cred("rain", "rain@example.com")).await.unwrap();

        assert!(matches!(
            repo.save(new_cred("rain", "other@example.com")).await,
            Err(RepoError::Conflict)
        ));
        assert!(matches!(
            repo.save(new_cred("other", "Rain@Example.com")).await,
            Err(RepoError::Conflict)
        ));
    }

    #[tokio::test]
    async fn removed_user_is_gone() {
        let repo = InMemoryUserRepo::new();
        let p = repo.save(new_cred("rain", "rain@example.com")).await.unwrap();

        assert!(repo.remove(p.subject_id).await);
        assert!(
            repo.find_by_subject_or_username(&p.subject_id.to_string())
                .await
                .unwrap()
                .is_none()
        );
    }
}
