//! Evaluation stack
//!
//! Opcode handlers exchange operands through a [`RandomAccessStack`] of
//! [`StackItem`]s. Each slot owns one claim on composite items, the same
//! discipline the invocation stack applies to contexts.

use core_types::{RandomAccessStack, StackItem};

/// Operand stack shared by the evaluation and alt stacks
pub type EvaluationStack = RandomAccessStack<StackItem>;
