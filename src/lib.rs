//! In-memory user credential store.
//!
//! Passwords are stored as salted Argon2id credentials and checked with a
//! constant-time comparison. Exports expose only public account metadata.

pub mod auth;
pub mod config;
pub mod error;
pub mod store;
pub mod utils;

pub use config::StoreConfig;
pub use error::{AddUserError, CredentialError, UserStoreError};
pub use store::{PublicUserView, UserExport, UserStore};
