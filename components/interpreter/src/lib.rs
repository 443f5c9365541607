//! Execution core for the script VM
//!
//! This crate provides the runtime state an opcode dispatch loop works on:
//! - Execution contexts: a shared script plus a bounded decoding cursor
//! - The invocation stack, holding one claim per active context
//! - Evaluation and alt stacks of [`StackItem`](core_types::StackItem)s
//! - The [`Host`] callback surface for interop, script lookup and events
//! - [`ExecutionEngine`], tying these together with the run state
//!
//! # Example
//!
//! ```
//! use interpreter::{ExecutionEngine, NullHost};
//! use core_types::StackItem;
//!
//! let mut engine = ExecutionEngine::new(NullHost);
//! let entry = engine.load_script(&[0x51, 0x52, 0x60], false).unwrap();
//!
//! // A call shares the loaded script instead of reloading it
//! let callee = engine.call(1).unwrap();
//! assert_eq!(callee.borrow().script_hash(), entry.borrow().script_hash());
//! assert_eq!(engine.invocation_stack().count(), 2);
//!
//! engine.push(StackItem::from(true)).unwrap();
//! assert_eq!(engine.pop().map(|item| item.get_boolean()), Some(true));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod context_stack;
pub mod evaluation_stack;
pub mod host;
pub mod vm;

// Re-export main types at crate root
pub use context::{ContextRef, ExecutionContext};
pub use context_stack::ExecutionContextStack;
pub use evaluation_stack::EvaluationStack;
pub use host::{Host, NullHost, StackAction};
pub use vm::{ExecutionEngine, VmState};
