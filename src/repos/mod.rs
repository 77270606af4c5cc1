pub mod error;
pub mod memory;
pub mod user_repo;

#[cfg(test)]
pub mod testing;

pub use error::{RepoError, RepoResult};
pub use memory::InMemoryUserRepo;
pub use user_repo::{Credential, IdentityStore, NewCredential, PgUserRepo, Principal};
