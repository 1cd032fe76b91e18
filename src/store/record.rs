//! User record
//!
//! Holds one account's identity, credential and login metadata.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::Credential;

/// One registered account. Owned exclusively by the store.
#[derive(Debug, Clone)]
pub struct UserRecord {
    username: String,
    credential: Credential,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub(crate) fn new(username: String, credential: Credential, created_at: DateTime<Utc>) -> Self {
        Self {
            username,
            credential,
            created_at,
            last_login: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login
    }

    pub(crate) fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Records a successful login at `at`.
    ///
    /// The stored value never moves backwards and never precedes `created_at`,
    /// even if the wall clock does.
    pub(crate) fn record_login(&mut self, at: DateTime<Utc>) {
        let floor = self.last_login.unwrap_or(self.created_at);
        self.last_login = Some(at.max(floor));
    }

    pub fn to_public(&self) -> PublicUserView {
        PublicUserView {
            username: self.username.clone(),
            created_at: self.created_at,
            last_login: self.last_login,
        }
    }
}

/// Read-only projection of a record without its credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUserView {
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}
