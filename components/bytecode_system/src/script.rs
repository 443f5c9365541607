//! Loaded script buffer.
//!
//! A [`Script`] is an immutable copy of the bytes handed to the engine.
//! Execution contexts running it share one `Rc<Script>`, so a call into an
//! already-loaded script never copies or rehashes it.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use core_types::{Hash160, ScriptHash, ScriptHasher};

/// Immutable, content-addressed script bytes
pub struct Script {
    /// Script bytes, copied on load
    content: Box<[u8]>,
    /// Identity hash, computed on first use
    hash: OnceCell<ScriptHash>,
    /// Primitive used to compute `hash`
    hasher: Rc<dyn ScriptHasher>,
}

impl Script {
    /// Load a script by copying `bytes`, hashing with [`Hash160`]
    pub fn new(bytes: &[u8]) -> Self {
        Self::with_hasher(bytes, Rc::new(Hash160))
    }

    /// Load a script by copying `bytes`, hashing with `hasher`
    pub fn with_hasher(bytes: &[u8], hasher: Rc<dyn ScriptHasher>) -> Self {
        Self {
            content: bytes.into(),
            hash: OnceCell::new(),
            hasher,
        }
    }

    /// Script length in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the script is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Script bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    /// Byte at `index`
    pub fn get(&self, index: usize) -> Option<u8> {
        self.content.get(index).copied()
    }

    /// The script's identity hash.
    ///
    /// Computed on the first call and returned from the cache afterwards.
    pub fn hash(&self) -> ScriptHash {
        *self.hash.get_or_init(|| self.hasher.hash(&self.content))
    }

    /// Whether the identity hash has been computed yet
    pub fn is_hash_computed(&self) -> bool {
        self.hash.get().is_some()
    }

    /// Compare the identity hash against an external candidate.
    ///
    /// A candidate of the wrong length is rejected without hashing.
    pub fn is_same_hash(&self, candidate: &[u8]) -> bool {
        if candidate.len() != core_types::SCRIPT_HASH_LENGTH {
            return false;
        }
        self.hash().matches(candidate)
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script")
            .field("len", &self.content.len())
            .field("hash", &self.hash.get())
            .finish()
    }
}
