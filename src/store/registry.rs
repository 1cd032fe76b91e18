//! User store
//!
//! In-memory, username-keyed collection of user records. The store is an
//! ordinary value: construct it once, then share it by reference or `Arc`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use log::{debug, info, warn};

use super::export::UserExport;
use super::record::{PublicUserView, UserRecord};
use crate::auth::{Credential, CredentialHasher, Validator};
use crate::config::StoreConfig;
use crate::error::{AddUserError, UserStoreError};

pub struct UserStore {
    users: RwLock<HashMap<String, UserRecord>>,
    hasher: CredentialHasher,
    validator: Validator,
    // verified in place of a real credential when the username is unknown
    decoy: Credential,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore {
    /// Creates an empty store with the default hashing and validation policy.
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    /// Creates an empty store using `config`.
    ///
    /// `config` is expected to have passed `StoreConfig::validate`; an
    /// unusable work factor surfaces as `AddUserError::Hashing` on the first
    /// registration.
    pub fn with_config(config: &StoreConfig) -> Self {
        let hasher = CredentialHasher::from_config(&config.hashing);
        let decoy = hasher.decoy();

        Self {
            users: RwLock::new(HashMap::new()),
            hasher,
            validator: Validator::from_config(&config.validation),
            decoy,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, UserRecord>> {
        self.users.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, UserRecord>> {
        self.users.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new account.
    ///
    /// The password is hashed before the write lock is taken; the lock only
    /// covers the final check-and-insert.
    pub fn add_user(&self, username: &str, password: &str) -> Result<(), AddUserError> {
        if !self.validator.is_valid_username(username) {
            let shown = truncated(username, self.validator.max_username_length());
            warn!("Rejected registration: invalid username {:?}", shown);
            return Err(AddUserError::InvalidUsername(shown.to_string()));
        }

        if !self.validator.is_valid_password(password) {
            warn!("Rejected registration for {}: weak password", username);
            return Err(AddUserError::WeakPassword);
        }

        // Skip the hash for names that are obviously taken
        if self.read().contains_key(username) {
            warn!("Rejected registration: {} already exists", username);
            return Err(AddUserError::UsernameTaken(username.to_string()));
        }

        let credential = self.hasher.hash(password)?;

        let mut users = self.write();
        match users.entry(username.to_string()) {
            Entry::Occupied(_) => {
                warn!("Rejected registration: {} already exists", username);
                Err(AddUserError::UsernameTaken(username.to_string()))
            }
            Entry::Vacant(slot) => {
                slot.insert(UserRecord::new(
                    username.to_string(),
                    credential,
                    Utc::now(),
                ));
                info!("Registered user {} ({} total)", username, users.len());
                Ok(())
            }
        }
    }

    /// Checks a username/password pair and records the login on success.
    ///
    /// Unknown usernames and wrong passwords both return `false`, and both
    /// pay for one full credential verification.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let credential = self.read().get(username).map(|r| r.credential().clone());

        let Some(credential) = credential else {
            std::hint::black_box(self.hasher.verify(password, &self.decoy));
            debug!(
                "Authentication failed for {:?}",
                truncated(username, self.validator.max_username_length())
            );
            return false;
        };

        if !self.hasher.verify(password, &credential) {
            debug!("Authentication failed for {}", username);
            return false;
        }

        match self.write().get_mut(username) {
            Some(record) => {
                record.record_login(Utc::now());
                debug!("Authenticated {}", username);
                true
            }
            None => false,
        }
    }

    /// Public view of one account, if it exists.
    pub fn get_user(&self, username: &str) -> Option<PublicUserView> {
        self.read().get(username).map(UserRecord::to_public)
    }

    /// Typed snapshot of every account.
    pub fn snapshot(&self) -> UserExport {
        UserExport::from_views(self.read().values().map(UserRecord::to_public))
    }

    /// JSON export of every account: username to
    /// `{username, created_at, last_login}`. Credentials are never included.
    pub fn export_users(&self) -> Result<String, UserStoreError> {
        let export = self.snapshot();
        debug!("Exporting {} users", export.len());
        Ok(export.to_json()?)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

/// Longest prefix of `s` within `max` bytes that ends on a char boundary.
fn truncated(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashingConfig;

    fn test_store() -> UserStore {
        UserStore::with_config(&StoreConfig {
            hashing: HashingConfig {
                memory_kib: 64,
                iterations: 1,
                ..HashingConfig::default()
            },
            ..StoreConfig::default()
        })
    }

    #[test]
    fn new_store_is_empty() {
        let store = test_store();
        assert!(store.is_empty());
        assert_eq!(store.export_users().unwrap(), "{}");
    }

    #[test]
    fn validation_runs_before_uniqueness() {
        let store = test_store();
        store.add_user("alice", "password123").unwrap();

        assert!(matches!(
            store.add_user("alice", "123"),
            Err(AddUserError::WeakPassword)
        ));
        assert!(matches!(
            store.add_user("bad user!", "123"),
            Err(AddUserError::InvalidUsername(_))
        ));
    }

    #[test]
    fn stored_credential_is_hashed() {
        let store = test_store();
        store.add_user("alice", "password123").unwrap();

        let users = store.read();
        let credential = users["alice"].credential();
        assert_ne!(credential.digest(), b"password123");
        assert!(!credential.encode().contains("password123"));
    }

    #[test]
    fn oversized_invalid_username_is_truncated() {
        let store = test_store();
        let huge = format!("{}!", "a".repeat(1 << 20));
        match store.add_user(&huge, "password123") {
            Err(AddUserError::InvalidUsername(shown)) => {
                assert_eq!(shown.len(), store.validator.max_username_length());
                assert!(huge.starts_with(&shown));
            }
            other => panic!("expected InvalidUsername, got {:?}", other),
        }
    }

    #[test]
    fn short_invalid_username_is_reported_whole() {
        let store = test_store();
        match store.add_user("bad user!", "password123") {
            Err(AddUserError::InvalidUsername(shown)) => assert_eq!(shown, "bad user!"),
            other => panic!("expected InvalidUsername, got {:?}", other),
        }
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncated("ééé", 3), "é");
        assert_eq!(truncated("abc", 10), "abc");
        assert_eq!(truncated("abcdef", 4), "abcd");
    }

    #[test]
    fn failed_authentication_leaves_record_untouched() {
        let store = test_store();
        store.add_user("alice", "password123").unwrap();
        assert!(!store.authenticate("alice", "wrongpass"));
        assert_eq!(store.get_user("alice").unwrap().last_login, None);
    }

    #[test]
    fn usernames_are_case_sensitive() {
        let store = test_store();
        store.add_user("alice", "password123").unwrap();
        store.add_user("Alice", "password456").unwrap();
        assert_eq!(store.len(), 2);
        assert!(!store.authenticate("ALICE", "password123"));
        assert!(store.authenticate("Alice", "password456"));
    }

    #[test]
    fn unusable_work_factor_fails_registration() {
        let store = UserStore::with_config(&StoreConfig {
            hashing: HashingConfig {
                iterations: 0,
                ..HashingConfig::default()
            },
            ..StoreConfig::default()
        });
        assert!(matches!(
            store.add_user("alice", "password123"),
            Err(AddUserError::Hashing(_))
        ));
        assert!(store.is_empty());
    }
}
