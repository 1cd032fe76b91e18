//! Input validator
//!
//! Username format and password strength checks. Both checks are pure and
//! report failure only by returning `false`.
//!
//! The password rule is a length floor only. It does not score complexity or
//! entropy, so `aaaaaa` is accepted.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::ValidationConfig;

/// Default maximum username length in bytes.
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

static USERNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").expect("username pattern is a valid regex")
});

/// Checks a username against the default policy.
///
/// Usernames are case-sensitive: `alice` and `Alice` are different accounts.
pub fn is_valid_username(username: &str) -> bool {
    check_username(username, MAX_USERNAME_LENGTH)
}

/// Checks that a password is at least `MIN_PASSWORD_LENGTH` characters long.
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

fn check_username(username: &str, max_length: usize) -> bool {
    !username.is_empty() && username.len() <= max_length && USERNAME_PATTERN.is_match(username)
}

/// Validation policy bound to a configured username length cap
#[derive(Debug, Clone)]
pub struct Validator {
    max_username_length: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            max_username_length: MAX_USERNAME_LENGTH,
        }
    }
}

impl Validator {
    pub fn from_config(config: &ValidationConfig) -> Self {
        Self {
            max_username_length: config.max_username_length,
        }
    }

    pub fn max_username_length(&self) -> usize {
        self.max_username_length
    }

    pub fn is_valid_username(&self, username: &str) -> bool {
        check_username(username, self.max_username_length)
    }

    pub fn is_valid_password(&self, password: &str) -> bool {
        is_valid_password(password)
    }
}
