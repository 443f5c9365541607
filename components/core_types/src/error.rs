//! Error types for fallible VM operations.
//!
//! Coercions and cursor decoders report inapplicability through `Option`
//! and never produce these errors. `VmError` covers operations whose caller
//! needs to know *why* they failed: serialization, stack indexing, seeking,
//! limits and host lookups.

use thiserror::Error;

use crate::{ScriptHash, StackItemType};

/// An error raised by a fallible VM operation.
///
/// # Examples
///
/// ```
/// use core_types::VmError;
///
/// let error = VmError::BufferTooSmall { needed: 8, capacity: 4 };
/// assert_eq!(error.to_string(), "buffer too small: need 8 bytes, have 4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// Destination buffer cannot hold the serialized form
    #[error("buffer too small: need {needed} bytes, have {capacity}")]
    BufferTooSmall {
        /// Bytes required
        needed: usize,
        /// Bytes available
        capacity: usize,
    },

    /// The item has no binary export form
    #[error("stack item of type {0:?} cannot be serialized")]
    NotSerializable(StackItemType),

    /// A composite item contains itself
    #[error("circular reference in stack item graph")]
    CircularReference,

    /// Input ended before a complete value was decoded
    #[error("unexpected end of data")]
    UnexpectedEnd,

    /// Unknown stack item type tag
    #[error("invalid stack item type 0x{0:02x}")]
    InvalidItemType(u8),

    /// A configured limit would be exceeded
    #[error("{what} exceeds limit of {limit}")]
    LimitExceeded {
        /// What was being bounded
        what: &'static str,
        /// The configured bound
        limit: usize,
    },

    /// Seek target lies past the end of the script
    #[error("seek to {position} outside script of length {length}")]
    SeekOutOfRange {
        /// Requested position
        position: usize,
        /// Script length
        length: usize,
    },

    /// Stack index does not address an occupied slot
    #[error("index {index} out of range for stack of {count} items")]
    IndexOutOfRange {
        /// Requested index, counted from the top
        index: usize,
        /// Number of occupied slots
        count: usize,
    },

    /// Call depth limit reached
    #[error("invocation stack exceeds {limit} contexts")]
    InvocationDepthExceeded {
        /// Maximum number of contexts
        limit: usize,
    },

    /// Evaluation stack limit reached
    #[error("evaluation stack exceeds {limit} items")]
    StackOverflow {
        /// Maximum number of items
        limit: usize,
    },

    /// The host could not supply the requested script
    #[error("script {0} not found")]
    ScriptNotFound(ScriptHash),

    /// A push-only context tried to execute a non-push opcode
    #[error("opcode 0x{0:02x} not allowed in push-only context")]
    PushOnlyViolation(u8),

    /// The invocation stack is empty
    #[error("no current execution context")]
    NoCurrentContext,
}

/// Result alias for VM operations
pub type VmResult<T> = Result<T, VmError>;
