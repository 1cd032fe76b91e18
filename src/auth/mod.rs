//! Authentication primitives
//!
//! Input validation and password credential hashing.

pub mod credentials;
pub mod validator;

pub use credentials::{Credential, CredentialHasher, HashAlgorithm, WorkFactor};
pub use validator::{Validator, is_valid_password, is_valid_username};
