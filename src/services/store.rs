//! Collaborator contracts for the credential store and the code ledger,
//! plus in-memory implementations for tests and local wiring.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{User, VerificationCode};

/// Read-only lookup into the credential store.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error>;
}

/// The code ledger. Implementations must make `consume` a conditional
/// update guarded by `consumed = false` so that concurrent verifications
/// racing on the same code serialize to at most one winner.
#[async_trait]
pub trait CodeStore: Send + Sync {
    async fn save(&self, code: &VerificationCode) -> Result<(), anyhow::Error>;

    /// Find an unconsumed code matching `(code, user_id)`. Consumed codes
    /// and codes owned by other users never match.
    async fn find_unconsumed(
        &self,
        code: &str,
        user_id: Uuid,
    ) -> Result<Option<VerificationCode>, anyhow::Error>;

    /// Mark the code consumed. Returns whether a row actually transitioned
    /// from unconsumed to consumed.
    async fn consume(&self, code_id: Uuid) -> Result<bool, anyhow::Error>;
}

/// In-memory credential store, keyed by email (exact match).
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users
            .write()
            .expect("user store lock poisoned")
            .insert(user.email.clone(), user);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        Ok(self
            .users
            .read()
            .expect("user store lock poisoned")
            .get(email)
            .cloned())
    }
}

/// In-memory code ledger with the same check-and-set consume semantics as
/// the Postgres implementation.
#[derive(Default)]
pub struct InMemoryCodeStore {
    codes: RwLock<Vec<VerificationCode>>,
}

impl InMemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, code: VerificationCode) {
        self.codes
            .write()
            .expect("code store lock poisoned")
            .push(code);
    }

    /// Snapshot of every row, in insertion order.
    pub fn all(&self) -> Vec<VerificationCode> {
        self.codes
            .read()
            .expect("code store lock poisoned")
            .clone()
    }
}

#[async_trait]
impl CodeStore for InMemoryCodeStore {
    async fn save(&self, code: &VerificationCode) -> Result<(), anyhow::Error> {
        self.insert(code.clone());
        Ok(())
    }

    async fn find_unconsumed(
        &self,
        code: &str,
        user_id: Uuid,
    ) -> Result<Option<VerificationCode>, anyhow::Error> {
        Ok(self
            .codes
            .read()
            .expect("code store lock poisoned")
            .iter()
            .rev()
            .find(|c| c.code == code && c.user_id == user_id && !c.consumed)
            .cloned())
    }

    async fn consume(&self, code_id: Uuid) -> Result<bool, anyhow::Error> {
        let mut codes = self.codes.write().expect("code store lock poisoned");
        match codes.iter_mut().find(|c| c.code_id == code_id && !c.consumed) {
            Some(code) => {
                code.consumed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
