//! Configuration management for the user store
//!
//! Separates the hashing work factor from the validation policy. Both are
//! fixed once a store is constructed.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::auth::credentials::{MAX_DIGEST_LEN, MAX_ITERATIONS, MAX_MEMORY_KIB, MAX_PARALLELISM};

/// Complete store configuration
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct StoreConfig {
    pub hashing: HashingConfig,
    pub validation: ValidationConfig,
}

/// Argon2id work factor and output sizes used for new credentials
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes over memory
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u32,

    /// Length of the random salt in bytes
    pub salt_len: usize,

    /// Length of the derived digest in bytes
    pub output_len: usize,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
            salt_len: 16,
            output_len: 32,
        }
    }
}

/// Username policy
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum username length in bytes
    pub max_username_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_username_length: crate::auth::validator::MAX_USERNAME_LENGTH,
        }
    }
}

impl StoreConfig {
    /// Load configuration from an optional config.toml with environment overrides
    ///
    /// Environment variables use `USER_STORE` and `__` between every path
    /// segment, e.g. `USER_STORE__HASHING__MEMORY_KIB=65536` or
    /// `USER_STORE__VALIDATION__MAX_USERNAME_LENGTH=32`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("USER_STORE").separator("__"))
            .build()?;

        let config: StoreConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let hashing = &self.hashing;

        if hashing.iterations == 0 {
            return Err(config::ConfigError::Message(
                "hashing.iterations must be greater than 0".into(),
            ));
        }

        // Anything above these bounds would hash fine but never verify
        if hashing.iterations > MAX_ITERATIONS {
            return Err(config::ConfigError::Message(format!(
                "hashing.iterations must be at most {}",
                MAX_ITERATIONS
            )));
        }

        if hashing.parallelism == 0 {
            return Err(config::ConfigError::Message(
                "hashing.parallelism must be greater than 0".into(),
            ));
        }

        if hashing.parallelism > MAX_PARALLELISM {
            return Err(config::ConfigError::Message(format!(
                "hashing.parallelism must be at most {}",
                MAX_PARALLELISM
            )));
        }

        if hashing.memory_kib > MAX_MEMORY_KIB {
            return Err(config::ConfigError::Message(format!(
                "hashing.memory_kib must be at most {}",
                MAX_MEMORY_KIB
            )));
        }

        // Argon2 needs at least 8 KiB per lane
        if hashing.memory_kib < 8 * hashing.parallelism {
            return Err(config::ConfigError::Message(
                "hashing.memory_kib must be at least 8 * parallelism".into(),
            ));
        }

        if hashing.salt_len < 8 {
            return Err(config::ConfigError::Message(
                "hashing.salt_len must be at least 8 bytes".into(),
            ));
        }

        if hashing.output_len < 16 {
            return Err(config::ConfigError::Message(
                "hashing.output_len must be at least 16 bytes".into(),
            ));
        }

        if hashing.output_len > MAX_DIGEST_LEN {
            return Err(config::ConfigError::Message(format!(
                "hashing.output_len must be at most {} bytes",
                MAX_DIGEST_LEN
            )));
        }

        if self.validation.max_username_length == 0 {
            return Err(config::ConfigError::Message(
                "validation.max_username_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
