//! Script storage and instruction bytes for the script VM
//!
//! This crate provides the immutable, content-addressed [`Script`] buffer
//! that execution contexts share, and the [`OpCode`] byte wrapper the
//! decoders hand out.
//!
//! # Features
//!
//! - Scripts copied once on load and shared by reference afterwards
//! - Lazily computed, memoized 20-byte identity hash
//! - Fast-reject comparison against externally supplied hashes
//! - Push-only opcode classification
//!
//! # Example
//!
//! ```
//! use bytecode_system::{OpCode, Script};
//!
//! let script = Script::new(&[0x51, 0x52, 0x60]);
//! assert_eq!(script.len(), 3);
//!
//! let hash = script.hash();
//! assert!(script.is_same_hash(hash.as_bytes()));
//! assert!(!script.is_same_hash(&[0u8; 16]));
//!
//! assert!(OpCode::from(script.as_bytes()[0]).is_push());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod opcode;
pub mod script;

// Re-export main types at crate root
pub use core_types::{ScriptHash, VmError, VmResult};
pub use opcode::OpCode;
pub use script::Script;
