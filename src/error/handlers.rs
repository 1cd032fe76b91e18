//! Error handlers
//!
//! Provides error logging and classification functions.

use crate::error::types::{AddUserError, UserStoreError};
use log::{error, warn};

/// Log a user store error at a level matching its severity
pub fn handle_error(err: &UserStoreError) {
    match err {
        UserStoreError::AddUser(AddUserError::Hashing(_)) => error!("User store error: {}", err),
        UserStoreError::AddUser(_) => warn!("User store error: {}", err),
        _ => error!("User store error: {}", err),
    }
}

/// Map an error to a short, stable label
pub fn error_kind(err: &UserStoreError) -> &'static str {
    match err {
        UserStoreError::AddUser(AddUserError::InvalidUsername(_)) => "invalid_username",
        UserStoreError::AddUser(AddUserError::WeakPassword) => "weak_password",
        UserStoreError::AddUser(AddUserError::UsernameTaken(_)) => "username_taken",
        UserStoreError::AddUser(AddUserError::Hashing(_)) => "hashing",
        UserStoreError::Export(_) => "export",
        UserStoreError::Config(_) => "config",
    }
}
