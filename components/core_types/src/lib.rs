//! Core value types and ownership primitives for the script VM.
//!
//! This crate provides the foundational types shared by every other
//! component: the polymorphic stack item model, the claim-based shared
//! ownership handle, script identity hashes and execution limits.
//!
//! # Overview
//!
//! - [`StackItem`] - Values manipulated by opcode handlers
//! - [`StackItemType`] - Fixed type discriminant of a stack item
//! - [`Claim`] - Counted shared reference to mutable interpreter state
//! - [`RandomAccessStack`] - LIFO container with indexed access from the top
//! - [`ScriptHash`] - 20-byte script identity
//! - [`ExecutionLimits`] - Configurable engine bounds
//! - [`VmError`] - Errors reported by fallible operations
//!
//! # Examples
//!
//! ```
//! use core_types::{StackItem, StackItemType};
//! use num_bigint::BigInt;
//!
//! let item = StackItem::from(BigInt::from(42));
//! assert_eq!(item.item_type(), StackItemType::Integer);
//! assert!(item.get_boolean());
//! assert_eq!(item.get_int32(), Some(42));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod claim;
mod error;
mod hash;
mod limits;
mod serialize;
mod stack;
mod stack_item;
pub mod varint;

pub use claim::{Claim, WeakClaim};
pub use error::{VmError, VmResult};
pub use hash::{Hash160, ScriptHash, ScriptHasher, SCRIPT_HASH_LENGTH};
pub use limits::ExecutionLimits;
pub use stack::RandomAccessStack;
pub use stack_item::{InteropHandle, MapItems, StackItem, StackItemType};
