//! Invocation stack of execution contexts

use core_types::{RandomAccessStack, VmError, VmResult};
use tracing::trace;

use crate::context::ContextRef;

/// LIFO stack of the contexts making up the active call chain
///
/// Each slot holds exactly one claim on its context. Every way a slot is
/// vacated releases that claim, and dropping the stack clears it, so
/// [`count`](Self::count) always equals the number of claims held.
#[derive(Debug, Default)]
pub struct ExecutionContextStack {
    contexts: RandomAccessStack<ContextRef>,
}

impl ExecutionContextStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of contexts on the stack
    pub fn count(&self) -> usize {
        self.contexts.count()
    }

    /// Whether the stack is empty
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Push a context, taking over the claim carried by `context`
    pub fn push(&mut self, context: ContextRef) {
        self.contexts.push(context);
        trace!(depth = self.contexts.count(), "context pushed");
    }

    /// The current context
    pub fn top(&self) -> Option<&ContextRef> {
        self.contexts.top()
    }

    /// The context `index` levels below the top
    pub fn peek(&self, index: usize) -> Option<&ContextRef> {
        self.contexts.peek(index)
    }

    /// Pop the current context and release its claim.
    ///
    /// Returns `false` if the stack was already empty.
    pub fn drop_top(&mut self) -> bool {
        match self.contexts.pop() {
            Some(context) => {
                trace!(
                    depth = self.contexts.count(),
                    freed = context.claims() == 1,
                    "context dropped"
                );
                true
            }
            None => false,
        }
    }

    /// Remove the context `index` levels below the top and release its claim
    pub fn remove(&mut self, index: usize) -> VmResult<()> {
        let count = self.contexts.count();
        let context = self
            .contexts
            .remove(index)
            .ok_or(VmError::IndexOutOfRange { index, count })?;
        trace!(index, freed = context.claims() == 1, "context removed");
        Ok(())
    }

    /// Release every context
    pub fn clear(&mut self) {
        if self.contexts.is_empty() {
            return;
        }
        trace!(count = self.contexts.count(), "invocation stack cleared");
        self.contexts.clear();
    }

    /// Iterate from the current context down to the entry context
    pub fn iter(&self) -> impl Iterator<Item = &ContextRef> + '_ {
        self.contexts.iter()
    }
}

impl Drop for ExecutionContextStack {
    fn drop(&mut self) {
        self.clear();
    }
}
