//! Host callback surface
//!
//! The engine calls back into its embedder synchronously, on the same
//! thread, through the [`Host`] trait. Every method has a no-op default so
//! a host only implements what it cares about.

use core_types::{ScriptHash, StackItem};

use crate::context::ExecutionContext;
use crate::evaluation_stack::EvaluationStack;

/// Kind of change reported to [`Host::on_stack_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StackAction {
    /// Item pushed on top
    Push = 0,
    /// Item popped from the top
    Pop = 1,
    /// Item inserted below the top
    Insert = 2,
    /// Item removed below the top
    Remove = 3,
    /// Slot overwritten
    Set = 4,
    /// Stack emptied
    Clear = 5,
}

/// Callbacks the engine invokes on its embedder
pub trait Host {
    /// Run the interop method named by `method` against the evaluation stack.
    ///
    /// Returns `false` if the method is unknown or failed.
    fn invoke_interop(&mut self, method: &[u8], stack: &mut EvaluationStack) -> bool {
        let _ = (method, stack);
        false
    }

    /// Locate the script with identity `hash`
    fn load_script(&mut self, hash: &ScriptHash) -> Option<Vec<u8>> {
        let _ = hash;
        None
    }

    /// Message for the given iteration, used by signature checks
    fn get_message(&mut self, iteration: u32) -> Option<Vec<u8>> {
        let _ = iteration;
        None
    }

    /// Observe a change to the evaluation stack
    fn on_stack_change(&mut self, item: &StackItem, index: usize, action: StackAction) {
        let _ = (item, index, action);
    }

    /// Observe the context about to execute its next instruction
    fn on_step_into(&mut self, context: &ExecutionContext) {
        let _ = context;
    }
}

/// Host with no interop methods, scripts or messages
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {}

impl<H: Host + ?Sized> Host for &mut H {
    fn invoke_interop(&mut self, method: &[u8], stack: &mut EvaluationStack) -> bool {
        (**self).invoke_interop(method, stack)
    }

    fn load_script(&mut self, hash: &ScriptHash) -> Option<Vec<u8>> {
        (**self).load_script(hash)
    }

    fn get_message(&mut self, iteration: u32) -> Option<Vec<u8>> {
        (**self).get_message(iteration)
    }

    fn on_stack_change(&mut self, item: &StackItem, index: usize, action: StackAction) {
        (**self).on_stack_change(item, index, action)
    }

    fn on_step_into(&mut self, context: &ExecutionContext) {
        (**self).on_step_into(context)
    }
}
