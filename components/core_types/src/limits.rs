//! Configurable execution bounds.

use serde::{Deserialize, Serialize};

/// Bounds an engine enforces on untrusted script data.
///
/// Every field has a default, so hosts may configure only what they need.
///
/// # Examples
///
/// ```
/// use core_types::ExecutionLimits;
///
/// let limits = ExecutionLimits::default();
/// assert_eq!(limits.max_stack_size, 2048);
/// assert_eq!(limits.max_big_integer_size, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionLimits {
    /// Maximum number of items on the evaluation stack
    pub max_stack_size: usize,
    /// Maximum length of a single byte-sequence item
    pub max_item_size: usize,
    /// Maximum number of nested execution contexts
    pub max_invocation_stack_size: usize,
    /// Maximum number of elements in an array, struct or map
    pub max_array_size: usize,
    /// Maximum length in bytes of an integer's byte representation
    pub max_big_integer_size: usize,
}

impl ExecutionLimits {
    /// Default bound on evaluation stack depth
    pub const MAX_STACK_SIZE: usize = 2048;
    /// Default bound on item size (1 MiB)
    pub const MAX_ITEM_SIZE: usize = 1024 * 1024;
    /// Default bound on call depth
    pub const MAX_INVOCATION_STACK_SIZE: usize = 1024;
    /// Default bound on composite size
    pub const MAX_ARRAY_SIZE: usize = 1024;
    /// Default bound on integer width
    pub const MAX_BIG_INTEGER_SIZE: usize = 32;
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            max_stack_size: Self::MAX_STACK_SIZE,
            max_item_size: Self::MAX_ITEM_SIZE,
            max_invocation_stack_size: Self::MAX_INVOCATION_STACK_SIZE,
            max_array_size: Self::MAX_ARRAY_SIZE,
            max_big_integer_size: Self::MAX_BIG_INTEGER_SIZE,
        }
    }
}
