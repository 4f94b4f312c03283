pub mod policy;
pub mod users;

use diesel::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::db::DbPool;
use crate::error::{HelpdeskError, Result};
use crate::models::{Account, Role};
use crate::schema::accounts;

/// Deterministic one-way hash. The stored hash must equal the hash of the
/// supplied plaintext, so the digest carries no salt.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password) == stored_hash
}

/// The authenticated caller, passed explicitly to every guarded operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub sector: String,
}

impl UserIdentity {
    pub fn from_account(account: &Account) -> Option<Self> {
        Some(Self {
            id: account.id,
            username: account.username.clone(),
            display_name: account.display_name.clone(),
            role: account.role()?,
            sector: account.sector.clone(),
        })
    }
}

/// Looks up an active account by username and checks the password.
/// Absent, inactive and wrong-password all collapse into the same error.
pub fn authenticate(pool: &DbPool, username: &str, password: &str) -> Result<UserIdentity> {
    let mut conn = pool.get()?;

    let account = accounts::table
        .filter(accounts::username.eq(username))
        .filter(accounts::is_active.eq(true))
        .first::<Account>(&mut conn)
        .optional()?;

    let account = match account {
        Some(account) if verify_password(password, &account.password_hash) => account,
        _ => {
            warn!("failed login attempt for {username}");
            return Err(HelpdeskError::InvalidCredentials);
        }
    };

    UserIdentity::from_account(&account).ok_or_else(|| {
        HelpdeskError::validation(format!("account {username} has an unknown role"))
    })
}

/// Per-ticket transient flags a client holds while mid-interaction,
/// e.g. a resolution form that is open but not yet submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionState {
    pub resolving: bool,
    pub reverting: bool,
}

/// Client-session state: the identity plus ticket-scoped interaction flags.
/// Replaces ambient globals; everything here dies on logout.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<UserIdentity>,
    interactions: HashMap<i32, InteractionState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&mut self, identity: UserIdentity) {
        self.current = Some(identity);
    }

    /// Invalidates all session-scoped state.
    pub fn logout(&mut self) {
        self.current = None;
        self.interactions.clear();
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&UserIdentity> {
        self.current.as_ref()
    }

    pub fn require_user(&self) -> Result<&UserIdentity> {
        self.current
            .as_ref()
            .ok_or_else(|| HelpdeskError::forbidden("not logged in"))
    }

    pub fn interaction_mut(&mut self, ticket_id: i32) -> &mut InteractionState {
        self.interactions.entry(ticket_id).or_default()
    }

    pub fn interaction(&self, ticket_id: i32) -> Option<&InteractionState> {
        self.interactions.get(&ticket_id)
    }

    pub fn clear_interaction(&mut self, ticket_id: i32) {
        self.interactions.remove(&ticket_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_sha256_hex() {
        assert_eq!(hash_password("admin123"), hash_password("admin123"));
        assert_eq!(hash_password("admin123").len(), 64);
        assert!(verify_password("admin123", &hash_password("admin123")));
        assert!(!verify_password("admin124", &hash_password("admin123")));
    }

    #[test]
    fn logout_clears_interaction_state() {
        let mut session = Session::new();
        session.login(UserIdentity {
            id: 1,
            username: "technician".into(),
            display_name: "IT Technician".into(),
            role: Role::Technician,
            sector: "IT".into(),
        });
        session.interaction_mut(42).resolving = true;
        assert!(session.interaction(42).is_some_and(|s| s.resolving));

        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.interaction(42).is_none());
        assert!(session.require_user().is_err());
    }
}
