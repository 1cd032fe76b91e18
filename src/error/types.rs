//! Error types
//!
//! Defines domain-specific error types for each module of the user store.

use std::fmt;

/// Errors returned by `UserStore::add_user`
#[derive(Debug)]
pub enum AddUserError {
    InvalidUsername(String),
    WeakPassword,
    UsernameTaken(String),
    Hashing(CredentialError),
}

impl fmt::Display for AddUserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddUserError::InvalidUsername(u) => write!(f, "Invalid username: {}", u),
            AddUserError::WeakPassword => write!(f, "Password does not meet minimum length"),
            AddUserError::UsernameTaken(u) => write!(f, "Username already taken: {}", u),
            AddUserError::Hashing(e) => write!(f, "Failed to hash password: {}", e),
        }
    }
}

impl std::error::Error for AddUserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AddUserError::Hashing(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CredentialError> for AddUserError {
    fn from(error: CredentialError) -> Self {
        AddUserError::Hashing(error)
    }
}

/// Credential hashing and decoding errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    InvalidParams(String),
    Hash(String),
    Malformed(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::InvalidParams(s) => write!(f, "Invalid hashing parameters: {}", s),
            CredentialError::Hash(s) => write!(f, "Hash computation failed: {}", s),
            CredentialError::Malformed(s) => write!(f, "Malformed credential: {}", s),
        }
    }
}

impl std::error::Error for CredentialError {}

/// General user store error that encompasses all error types
#[derive(Debug)]
pub enum UserStoreError {
    AddUser(AddUserError),
    Export(serde_json::Error),
    Config(config::ConfigError),
}

impl fmt::Display for UserStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStoreError::AddUser(e) => write!(f, "Registration error: {}", e),
            UserStoreError::Export(e) => write!(f, "Export error: {}", e),
            UserStoreError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for UserStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UserStoreError::AddUser(e) => Some(e),
            UserStoreError::Export(e) => Some(e),
            UserStoreError::Config(e) => Some(e),
        }
    }
}

impl From<AddUserError> for UserStoreError {
    fn from(error: AddUserError) -> Self {
        UserStoreError::AddUser(error)
    }
}

impl From<serde_json::Error> for UserStoreError {
    fn from(error: serde_json::Error) -> Self {
        UserStoreError::Export(error)
    }
}

impl From<config::ConfigError> for UserStoreError {
    fn from(error: config::ConfigError) -> Self {
        UserStoreError::Config(error)
    }
}
