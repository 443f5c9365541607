//! Script identity hashes.
//!
//! A script is identified by a 20-byte digest of its full byte content. The
//! digest primitive sits behind [`ScriptHasher`] so engines and tests can
//! inject their own; the default is [`Hash160`], RIPEMD-160 over SHA-256.

use std::fmt;

use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length in bytes of a script identity hash
pub const SCRIPT_HASH_LENGTH: usize = 20;

/// 20-byte identity of a script's content.
///
/// # Examples
///
/// ```
/// use core_types::ScriptHash;
///
/// let hash = ScriptHash::new([0x01; 20]);
/// assert_eq!(hash.as_bytes().len(), 20);
/// assert!(hash.to_string().starts_with("0101"));
///
/// assert!(ScriptHash::try_from(&[0u8; 16][..]).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScriptHash([u8; SCRIPT_HASH_LENGTH]);

impl ScriptHash {
    /// Wrap raw digest bytes
    pub const fn new(bytes: [u8; SCRIPT_HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; SCRIPT_HASH_LENGTH] {
        &self.0
    }

    /// Compare against an externally supplied candidate.
    ///
    /// Rejects any candidate whose length is not 20 before looking at bytes.
    pub fn matches(&self, candidate: &[u8]) -> bool {
        candidate.len() == SCRIPT_HASH_LENGTH && self.0.iter().zip(candidate).all(|(a, b)| a == b)
    }
}

impl From<[u8; SCRIPT_HASH_LENGTH]> for ScriptHash {
    fn from(bytes: [u8; SCRIPT_HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for ScriptHash {
    type Error = std::array::TryFromSliceError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; SCRIPT_HASH_LENGTH]>::try_from(bytes).map(Self)
    }
}

impl AsRef<[u8]> for ScriptHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Hash primitive used to compute script identity.
///
/// Implementations must be total over byte sequences and deterministic.
pub trait ScriptHasher {
    /// Digest `data` into a script hash
    fn hash(&self, data: &[u8]) -> ScriptHash;
}

/// RIPEMD-160 of SHA-256, the default script identity primitive
#[derive(Debug, Clone, Copy, Default)]
pub struct Hash160;

impl ScriptHasher for Hash160 {
    fn hash(&self, data: &[u8]) -> ScriptHash {
        let sha = Sha256::digest(data);
        let ripe = Ripemd160::digest(sha);
        let mut out = [0u8; SCRIPT_HASH_LENGTH];
        out.copy_from_slice(&ripe);
        ScriptHash(out)
    }
}
