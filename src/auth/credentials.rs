//! Credential hashing and verification
//!
//! Passwords are turned into salted Argon2id digests. A `Credential` carries
//! everything needed to re-derive and compare the digest later: algorithm,
//! salt, work factor and the digest itself. It never holds the password.

use std::fmt;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use argon2::{Algorithm, Argon2, Params, Version};
use constant_time_eq::constant_time_eq;
use log::debug;

use crate::config::HashingConfig;
use crate::error::CredentialError;

const ARGON2ID_ID: &str = "argon2id";

// Upper bounds accepted when verifying stored records, so a corrupted work
// factor cannot make a single verify allocate gigabytes.
pub(crate) const MAX_MEMORY_KIB: u32 = 1 << 20;
pub(crate) const MAX_ITERATIONS: u32 = 64;
pub(crate) const MAX_PARALLELISM: u32 = 64;
pub(crate) const MAX_DIGEST_LEN: usize = 256;

/// Identifies the KDF a credential was produced with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashAlgorithm {
    Argon2id,
    Unsupported(String),
}

impl HashAlgorithm {
    fn parse(id: &str) -> Self {
        match id {
            ARGON2ID_ID => HashAlgorithm::Argon2id,
            other => HashAlgorithm::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HashAlgorithm::Argon2id => ARGON2ID_ID,
            HashAlgorithm::Unsupported(id) => id,
        }
    }
}

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkFactor {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl WorkFactor {
    fn within_bounds(&self) -> bool {
        self.memory_kib <= MAX_MEMORY_KIB
            && self.iterations <= MAX_ITERATIONS
            && self.parallelism <= MAX_PARALLELISM
    }
}

/// Stored, non-reversible representation of a password
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    algorithm: HashAlgorithm,
    salt: Vec<u8>,
    work_factor: WorkFactor,
    digest: Vec<u8>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("algorithm", &self.algorithm)
            .field("work_factor", &self.work_factor)
            .field("salt", &"<redacted>")
            .field("digest", &"<redacted>")
            .finish()
    }
}

impl Credential {
    pub fn algorithm(&self) -> &HashAlgorithm {
        &self.algorithm
    }

    pub fn work_factor(&self) -> WorkFactor {
        self.work_factor
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Encodes as `$<algorithm>$m=<kib>,t=<iterations>,p=<lanes>$<salt hex>$<digest hex>`.
    pub fn encode(&self) -> String {
        format!(
            "${}$m={},t={},p={}${}${}",
            self.algorithm.as_str(),
            self.work_factor.memory_kib,
            self.work_factor.iterations,
            self.work_factor.parallelism,
            hex::encode(&self.salt),
            hex::encode(&self.digest)
        )
    }

    /// Parses the form produced by [`Credential::encode`].
    ///
    /// Unknown algorithm ids are accepted and decode to
    /// `HashAlgorithm::Unsupported`; they fail later at verification.
    pub fn decode(encoded: &str) -> Result<Self, CredentialError> {
        let mut parts = encoded.split('$');
        if parts.next() != Some("") {
            return Err(CredentialError::Malformed("missing leading '$'".into()));
        }

        let (Some(algorithm), Some(params), Some(salt), Some(digest), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(CredentialError::Malformed(
                "expected four '$'-separated fields".into(),
            ));
        };

        if algorithm.is_empty() {
            return Err(CredentialError::Malformed("empty algorithm id".into()));
        }

        let salt = decode_hex_field("salt", salt)?;
        let digest = decode_hex_field("digest", digest)?;

        Ok(Self {
            algorithm: HashAlgorithm::parse(algorithm),
            salt,
            work_factor: parse_work_factor(params)?,
            digest,
        })
    }
}

fn decode_hex_field(label: &str, value: &str) -> Result<Vec<u8>, CredentialError> {
    if value.is_empty() {
        return Err(CredentialError::Malformed(format!("{} is empty", label)));
    }
    hex::decode(value).map_err(|err| CredentialError::Malformed(format!("{}: {}", label, err)))
}

fn parse_work_factor(params: &str) -> Result<WorkFactor, CredentialError> {
    let mut memory_kib = None;
    let mut iterations = None;
    let mut parallelism = None;

    for pair in params.split(',') {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| CredentialError::Malformed(format!("bad parameter '{}'", pair)))?;
        let value: u32 = value
            .parse()
            .map_err(|_| CredentialError::Malformed(format!("bad value for '{}'", key)))?;
        let slot = match key {
            "m" => &mut memory_kib,
            "t" => &mut iterations,
            "p" => &mut parallelism,
            other => {
                return Err(CredentialError::Malformed(format!(
                    "unknown parameter '{}'",
                    other
                )));
            }
        };
        if slot.replace(value).is_some() {
            return Err(CredentialError::Malformed(format!(
                "duplicate parameter '{}'",
                key
            )));
        }
    }

    match (memory_kib, iterations, parallelism) {
        (Some(memory_kib), Some(iterations), Some(parallelism)) => Ok(WorkFactor {
            memory_kib,
            iterations,
            parallelism,
        }),
        _ => Err(CredentialError::Malformed(
            "work factor needs m, t and p".into(),
        )),
    }
}

/// Produces and checks Argon2id credentials
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    work_factor: WorkFactor,
    salt_len: usize,
    output_len: usize,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::from_config(&HashingConfig::default())
    }
}

impl CredentialHasher {
    pub fn from_config(config: &HashingConfig) -> Self {
        Self {
            work_factor: WorkFactor {
                memory_kib: config.memory_kib,
                iterations: config.iterations,
                parallelism: config.parallelism,
            },
            salt_len: config.salt_len,
            output_len: config.output_len,
        }
    }

    pub fn work_factor(&self) -> WorkFactor {
        self.work_factor
    }

    /// Hashes `password` under a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<Credential, CredentialError> {
        let salt = random_bytes(self.salt_len);
        let digest = derive(password, &salt, self.work_factor, self.output_len)?;

        Ok(Credential {
            algorithm: HashAlgorithm::Argon2id,
            salt,
            work_factor: self.work_factor,
            digest,
        })
    }

    /// Checks `password` against `credential` with a constant-time digest
    /// comparison. Any unusable credential verifies as `false`.
    pub fn verify(&self, password: &str, credential: &Credential) -> bool {
        if let HashAlgorithm::Unsupported(id) = &credential.algorithm {
            debug!("Rejecting credential with unsupported algorithm '{}'", id);
            return false;
        }

        if credential.salt.is_empty()
            || credential.digest.is_empty()
            || credential.digest.len() > MAX_DIGEST_LEN
            || !credential.work_factor.within_bounds()
        {
            debug!("Rejecting credential with out-of-range parameters");
            return false;
        }

        match derive(
            password,
            &credential.salt,
            credential.work_factor,
            credential.digest.len(),
        ) {
            Ok(computed) => constant_time_eq(&computed, &credential.digest),
            Err(e) => {
                debug!("Credential verification failed: {}", e);
                false
            }
        }
    }

    /// Decodes `encoded` and verifies `password` against it.
    pub fn verify_encoded(&self, password: &str, encoded: &str) -> bool {
        match Credential::decode(encoded) {
            Ok(credential) => self.verify(password, &credential),
            Err(e) => {
                debug!("{}", e);
                false
            }
        }
    }

    /// A credential no password verifies against, with this hasher's work
    /// factor, so checking it costs the same as checking a real one.
    pub(crate) fn decoy(&self) -> Credential {
        Credential {
            algorithm: HashAlgorithm::Argon2id,
            salt: random_bytes(self.salt_len),
            work_factor: self.work_factor,
            digest: random_bytes(self.output_len),
        }
    }
}

fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

fn derive(
    password: &str,
    salt: &[u8],
    work_factor: WorkFactor,
    output_len: usize,
) -> Result<Vec<u8>, CredentialError> {
    let params = Params::new(
        work_factor.memory_kib,
        work_factor.iterations,
        work_factor.parallelism,
        None,
    )
    .map_err(|err| CredentialError::InvalidParams(err.to_string()))?;

    let mut output = vec![0u8; output_len];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(password.as_bytes(), salt, &mut output)
        .map_err(|err| CredentialError::Hash(err.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_hasher() -> CredentialHasher {
        CredentialHasher::from_config(&HashingConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
            salt_len: 16,
            output_len: 32,
        })
    }

    #[test]
    fn hash_verifies_original_password() {
        let hasher = test_hasher();
        let credential = hasher.hash("password123").unwrap();
        assert!(hasher.verify("password123", &credential));
        assert!(!hasher.verify("password124", &credential));
        assert!(!hasher.verify("", &credential));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let hasher = test_hasher();
        let a = hasher.hash("password123").unwrap();
        let b = hasher.hash("password123").unwrap();
        assert_ne!(a.salt(), b.salt());
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.salt().len(), 16);
        assert_eq!(a.digest().len(), 32);
    }

    #[test]
    fn credential_does_not_contain_password() {
        let hasher = test_hasher();
        let credential = hasher.hash("hunter2hunter2").unwrap();
        let encoded = credential.encode();
        assert!(!encoded.contains("hunter2"));
        assert_ne!(credential.digest(), b"hunter2hunter2");
    }

    #[test]
    fn debug_output_is_redacted() {
        let hasher = test_hasher();
        let credential = hasher.hash("password123").unwrap();
        let debug = format!("{:?}", credential);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&hex::encode(credential.digest())));
    }

    #[test]
    fn encoded_form_verifies() {
        let hasher = test_hasher();
        let encoded = hasher.hash("password123").unwrap().encode();
        assert!(encoded.starts_with("$argon2id$m=64,t=1,p=1$"));
        assert!(hasher.verify_encoded("password123", &encoded));
        assert!(!hasher.verify_encoded("wrongpass", &encoded));
    }

    #[test]
    fn decode_rejects_malformed_records() {
        for bad in [
            "",
            "argon2id$m=64,t=1,p=1$00$00",
            "$argon2id$m=64,t=1,p=1$00",
            "$argon2id$m=64,t=1,p=1$00$00$extra",
            "$$m=64,t=1,p=1$00$00",
            "$argon2id$m=64,t=1$00$00",
            "$argon2id$m=64,t=1,p=1,p=2$00$00",
            "$argon2id$m=x,t=1,p=1$00$00",
            "$argon2id$m=64,t=1,p=1$zz$00",
            "$argon2id$m=64,t=1,p=1$$00",
        ] {
            assert!(
                matches!(Credential::decode(bad), Err(CredentialError::Malformed(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn malformed_records_verify_false() {
        let hasher = test_hasher();
        assert!(!hasher.verify_encoded("password123", "not a credential"));
        assert!(!hasher.verify_encoded("password123", "$argon2id$m=64,t=1,p=1$00$"));
    }

    #[test]
    fn unsupported_algorithm_verifies_false() {
        let hasher = test_hasher();
        let encoded = hasher.hash("password123").unwrap().encode();
        let migrated = encoded.replacen("argon2id", "scrypt", 1);

        let credential = Credential::decode(&migrated).unwrap();
        assert_eq!(
            credential.algorithm(),
            &HashAlgorithm::Unsupported("scrypt".into())
        );
        assert!(!hasher.verify("password123", &credential));
    }

    #[test]
    fn out_of_range_work_factor_verifies_false() {
        let hasher = test_hasher();
        let encoded = hasher.hash("password123").unwrap().encode();

        let huge = encoded.replacen("m=64", "m=4000000000", 1);
        assert!(!hasher.verify_encoded("password123", &huge));

        let zero = encoded.replacen("t=1", "t=0", 1);
        assert!(!hasher.verify_encoded("password123", &zero));
    }

    #[test]
    fn tampered_digest_verifies_false() {
        let hasher = test_hasher();
        let credential = hasher.hash("password123").unwrap();
        let mut digest = credential.digest().to_vec();
        digest[0] ^= 0xff;
        let tampered = format!(
            "$argon2id$m=64,t=1,p=1${}${}",
            hex::encode(credential.salt()),
            hex::encode(&digest)
        );
        assert!(!hasher.verify_encoded("password123", &tampered));
    }

    #[test]
    fn decoy_never_verifies() {
        let hasher = test_hasher();
        let decoy = hasher.decoy();
        assert_eq!(decoy.work_factor(), hasher.work_factor());
        assert!(!hasher.verify("", &decoy));
        assert!(!hasher.verify("password123", &decoy));
    }
}
