//! Execution engine
//!
//! Main entry point for running scripts. The engine owns the invocation
//! stack, the evaluation and alt stacks, every loaded script and the host.
//! A dispatch loop drives it through [`fetch`](ExecutionEngine::fetch), the
//! stack operations and [`ret`](ExecutionEngine::ret); whatever way the run
//! ends, [`clean`](ExecutionEngine::clean) (also run on drop) releases every
//! context and item the engine still holds.

use std::fmt;
use std::rc::Rc;

use bytecode_system::{OpCode, Script};
use core_types::{
    Claim, ExecutionLimits, Hash160, ScriptHash, ScriptHasher, StackItem, VmError, VmResult,
};
use num_bigint::BigInt;
use tracing::{debug, trace, warn};

use crate::context::{ContextRef, ExecutionContext};
use crate::context_stack::ExecutionContextStack;
use crate::evaluation_stack::EvaluationStack;
use crate::host::{Host, NullHost, StackAction};

/// Run state of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VmState {
    /// Running, or not yet started
    #[default]
    None,
    /// Finished normally
    Halt,
    /// Stopped on an error
    Fault,
    /// Paused by the host
    Break,
}

impl VmState {
    /// Whether the run is over
    pub fn is_terminal(self) -> bool {
        matches!(self, VmState::Halt | VmState::Fault)
    }
}

/// Engine shell around the invocation and evaluation stacks
///
/// # Example
///
/// ```
/// use interpreter::{ExecutionEngine, NullHost, VmState};
/// use bytecode_system::OpCode;
///
/// let mut engine = ExecutionEngine::new(NullHost);
/// engine.load_script(&[0x51, 0x66], false).unwrap();
///
/// assert_eq!(engine.fetch(), Some(OpCode::PUSH1));
/// assert_eq!(engine.fetch(), Some(OpCode::RET));
/// engine.ret();
///
/// assert_eq!(engine.fetch(), None);
/// assert_eq!(engine.state(), VmState::Halt);
/// ```
pub struct ExecutionEngine<H: Host = NullHost> {
    invocation_stack: ExecutionContextStack,
    evaluation_stack: EvaluationStack,
    alt_stack: EvaluationStack,
    state: VmState,
    host: H,
    limits: ExecutionLimits,
    hasher: Rc<dyn ScriptHasher>,
    /// Every script loaded during this run, looked up by hash before asking
    /// the host
    scripts: Vec<Rc<Script>>,
    message_iteration: u32,
}

impl<H: Host> ExecutionEngine<H> {
    /// Create an engine with default limits
    pub fn new(host: H) -> Self {
        Self::with_limits(host, ExecutionLimits::default())
    }

    /// Create an engine with the given limits
    pub fn with_limits(host: H, limits: ExecutionLimits) -> Self {
        Self {
            invocation_stack: ExecutionContextStack::new(),
            evaluation_stack: EvaluationStack::new(),
            alt_stack: EvaluationStack::new(),
            state: VmState::None,
            host,
            limits,
            hasher: Rc::new(Hash160),
            scripts: Vec::new(),
            message_iteration: 0,
        }
    }

    /// Use `hasher` for the identity of every script loaded from now on
    pub fn with_hasher(mut self, hasher: Rc<dyn ScriptHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Current run state
    pub fn state(&self) -> VmState {
        self.state
    }

    /// Configured limits
    pub fn limits(&self) -> &ExecutionLimits {
        &self.limits
    }

    /// The host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The call chain
    pub fn invocation_stack(&self) -> &ExecutionContextStack {
        &self.invocation_stack
    }

    /// The operand stack
    pub fn evaluation_stack(&self) -> &EvaluationStack {
        &self.evaluation_stack
    }

    /// The alt stack
    pub fn alt_stack(&self) -> &EvaluationStack {
        &self.alt_stack
    }

    /// The alt stack, mutably.
    ///
    /// Changes made through this handle are not reported to the host. Items
    /// on the alt stack still count towards `max_stack_size`.
    pub fn alt_stack_mut(&mut self) -> &mut EvaluationStack {
        &mut self.alt_stack
    }

    /// Scripts loaded so far
    pub fn loaded_scripts(&self) -> &[Rc<Script>] {
        &self.scripts
    }

    /// The context executing now
    pub fn current_context(&self) -> Option<&ContextRef> {
        self.invocation_stack.top()
    }

    /// The context that called the current one
    pub fn calling_context(&self) -> Option<&ContextRef> {
        self.invocation_stack.peek(1)
    }

    /// The context the run started in
    pub fn entry_context(&self) -> Option<&ContextRef> {
        let bottom = self.invocation_stack.count().checked_sub(1)?;
        self.invocation_stack.peek(bottom)
    }

    /// Start executing `bytes`.
    ///
    /// Bytes identical to a script loaded earlier in this run reuse that
    /// script; otherwise they are copied into a new one. The returned handle
    /// is an extra claim on the new context, which stays on the invocation
    /// stack until it returns.
    pub fn load_script(&mut self, bytes: &[u8], push_only: bool) -> VmResult<ContextRef> {
        self.check_invocation_depth()?;
        let cached = self
            .scripts
            .iter()
            .find(|script| script.as_bytes() == bytes)
            .cloned();
        let script = match cached {
            Some(script) => {
                trace!(len = bytes.len(), "script reused from cache");
                script
            }
            None => {
                let script = Rc::new(Script::with_hasher(bytes, Rc::clone(&self.hasher)));
                debug!(len = bytes.len(), push_only, "script loaded");
                self.scripts.push(Rc::clone(&script));
                script
            }
        };
        Ok(self.push_context(ExecutionContext::new(script, push_only)))
    }

    /// Start executing the script whose identity is `hash`.
    ///
    /// A script loaded earlier in this run is reused as is. Otherwise the
    /// host is asked for it, and its answer is only accepted if it hashes to
    /// `hash`.
    pub fn load_script_by_hash(
        &mut self,
        hash: &ScriptHash,
        push_only: bool,
    ) -> VmResult<ContextRef> {
        self.check_invocation_depth()?;

        let cached = self
            .scripts
            .iter()
            .find(|script| script.is_same_hash(hash.as_bytes()))
            .cloned();
        if let Some(script) = cached {
            trace!(%hash, "script reused from cache");
            return Ok(self.push_context(ExecutionContext::new(script, push_only)));
        }

        let Some(bytes) = self.host.load_script(hash) else {
            warn!(%hash, "host could not supply script");
            return Err(VmError::ScriptNotFound(*hash));
        };
        let script = Rc::new(Script::with_hasher(&bytes, Rc::clone(&self.hasher)));
        if !script.is_same_hash(hash.as_bytes()) {
            warn!(%hash, actual = %script.hash(), "host supplied script with wrong hash");
            return Err(VmError::ScriptNotFound(*hash));
        }
        debug!(%hash, len = bytes.len(), "script loaded from host");
        self.scripts.push(Rc::clone(&script));
        Ok(self.push_context(ExecutionContext::new(script, push_only)))
    }

    /// Call into the current script at `position`.
    ///
    /// The callee shares the caller's script and flags and gets its own
    /// cursor.
    pub fn call(&mut self, position: usize) -> VmResult<ContextRef> {
        self.check_invocation_depth()?;
        let caller = self
            .current_context()
            .ok_or(VmError::NoCurrentContext)?;
        let mut callee = caller.borrow().clone();
        callee.seek(position)?;
        Ok(self.push_context(callee))
    }

    /// Return from the current context.
    ///
    /// Returning from the entry context halts the engine.
    pub fn ret(&mut self) -> bool {
        let dropped = self.invocation_stack.drop_top();
        if self.invocation_stack.is_empty() && !self.state.is_terminal() {
            self.state = VmState::Halt;
        }
        dropped
    }

    /// Decode the next instruction of the current context.
    ///
    /// Returns `None` once the engine halted, faulted or paused. An empty
    /// invocation stack halts the engine; a non-push opcode in a push-only
    /// context faults it.
    pub fn fetch(&mut self) -> Option<OpCode> {
        if self.state != VmState::None {
            return None;
        }
        let Some(context) = self.invocation_stack.top().map(Claim::claim) else {
            debug!("invocation stack empty, halting");
            self.state = VmState::Halt;
            return None;
        };

        self.host.on_step_into(&context.borrow());
        let opcode = context.borrow_mut().read_next_instruction();
        if !context.borrow().is_allowed(opcode) {
            self.fault(VmError::PushOnlyViolation(opcode.byte()));
            return None;
        }
        Some(opcode)
    }

    fn push_context(&mut self, context: ExecutionContext) -> ContextRef {
        let context = Claim::new(context);
        self.invocation_stack.push(context.claim());
        context
    }

    fn check_invocation_depth(&self) -> VmResult<()> {
        let limit = self.limits.max_invocation_stack_size;
        if self.invocation_stack.count() >= limit {
            return Err(VmError::InvocationDepthExceeded { limit });
        }
        Ok(())
    }

    /// Items held by the evaluation and alt stacks together
    fn stack_size(&self) -> usize {
        self.evaluation_stack.count() + self.alt_stack.count()
    }

    fn check_stack_growth(&self) -> VmResult<()> {
        let limit = self.limits.max_stack_size;
        if self.stack_size() >= limit {
            return Err(VmError::StackOverflow { limit });
        }
        Ok(())
    }

    /// Push an item onto the evaluation stack
    pub fn push(&mut self, item: StackItem) -> VmResult<()> {
        self.check_stack_growth()?;
        self.host.on_stack_change(&item, 0, StackAction::Push);
        self.evaluation_stack.push(item);
        Ok(())
    }

    /// Pop the top item of the evaluation stack
    pub fn pop(&mut self) -> Option<StackItem> {
        let item = self.evaluation_stack.pop()?;
        self.host.on_stack_change(&item, 0, StackAction::Pop);
        Some(item)
    }

    /// Observe the item `index` slots below the top
    pub fn peek(&self, index: usize) -> Option<&StackItem> {
        self.evaluation_stack.peek(index)
    }

    /// Insert an item `index` slots below the top
    pub fn insert(&mut self, index: usize, item: StackItem) -> VmResult<()> {
        self.check_stack_growth()?;
        let count = self.evaluation_stack.count();
        self.evaluation_stack
            .insert(index, item)
            .map_err(|_| VmError::IndexOutOfRange { index, count })?;
        if let Some(item) = self.evaluation_stack.peek(index) {
            self.host.on_stack_change(item, index, StackAction::Insert);
        }
        Ok(())
    }

    /// Remove the item `index` slots below the top
    pub fn remove(&mut self, index: usize) -> VmResult<StackItem> {
        let count = self.evaluation_stack.count();
        let item = self
            .evaluation_stack
            .remove(index)
            .ok_or(VmError::IndexOutOfRange { index, count })?;
        self.host.on_stack_change(&item, index, StackAction::Remove);
        Ok(item)
    }

    /// Replace the item `index` slots below the top, returning the old one
    pub fn set(&mut self, index: usize, item: StackItem) -> VmResult<StackItem> {
        let count = self.evaluation_stack.count();
        let old = self
            .evaluation_stack
            .set(index, item)
            .map_err(|_| VmError::IndexOutOfRange { index, count })?;
        if let Some(item) = self.evaluation_stack.peek(index) {
            self.host.on_stack_change(item, index, StackAction::Set);
        }
        Ok(old)
    }

    /// Empty the evaluation stack, reporting each item from the top down
    pub fn clear_evaluation_stack(&mut self) {
        for (index, item) in self.evaluation_stack.drain().enumerate() {
            self.host.on_stack_change(&item, index, StackAction::Clear);
        }
    }

    /// Pop the top item as an integer bounded by `max_big_integer_size`
    pub fn pop_big_integer(&mut self) -> Option<BigInt> {
        let item = self.pop()?;
        item.get_big_integer_within(self.limits.max_big_integer_size)
    }

    /// Run the host's interop method `method` against the evaluation stack.
    ///
    /// The host works on the evaluation stack directly, so its changes are
    /// not reported through `on_stack_change`. Leaving more than
    /// `max_stack_size` items behind faults the engine.
    pub fn invoke_interop(&mut self, method: &[u8]) -> bool {
        let succeeded = self.host.invoke_interop(method, &mut self.evaluation_stack);
        if !succeeded {
            debug!(method = %String::from_utf8_lossy(method), "interop call failed");
            return false;
        }
        let limit = self.limits.max_stack_size;
        if self.stack_size() > limit {
            self.fault(VmError::StackOverflow { limit });
            return false;
        }
        true
    }

    /// Ask the host for the next message, advancing the iteration counter
    pub fn next_message(&mut self) -> Option<Vec<u8>> {
        let iteration = self.message_iteration;
        self.message_iteration = iteration.wrapping_add(1);
        self.host.get_message(iteration)
    }

    /// Number of messages requested so far
    pub fn message_iteration(&self) -> u32 {
        self.message_iteration
    }

    /// Stop the run on an error
    pub fn fault(&mut self, reason: VmError) {
        warn!(%reason, depth = self.invocation_stack.count(), "engine faulted");
        self.state = VmState::Fault;
    }

    /// Stop the run normally
    pub fn halt(&mut self) {
        self.state = VmState::Halt;
    }

    /// Pause a running engine
    pub fn pause(&mut self) {
        if self.state == VmState::None {
            self.state = VmState::Break;
        }
    }

    /// Resume a paused engine
    pub fn resume(&mut self) {
        if self.state == VmState::Break {
            self.state = VmState::None;
        }
    }

    /// Release every context, item and script the engine holds
    pub fn clean(&mut self) {
        trace!(
            contexts = self.invocation_stack.count(),
            items = self.evaluation_stack.count() + self.alt_stack.count(),
            "engine cleaned"
        );
        self.invocation_stack.clear();
        self.evaluation_stack.clear();
        self.alt_stack.clear();
        self.scripts.clear();
    }
}

impl Default for ExecutionEngine<NullHost> {
    fn default() -> Self {
        Self::new(NullHost)
    }
}

impl<H: Host> Drop for ExecutionEngine<H> {
    fn drop(&mut self) {
        self.clean();
    }
}

impl<H: Host> fmt::Debug for ExecutionEngine<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("state", &self.state)
            .field("invocation_depth", &self.invocation_stack.count())
            .field("evaluation_stack", &self.evaluation_stack.count())
            .field("alt_stack", &self.alt_stack.count())
            .field("scripts", &self.scripts.len())
            .finish()
    }
}
