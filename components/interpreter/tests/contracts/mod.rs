//! Contract tests for interpreter API
//!
//! These tests verify the public API shape other components rely on.

use std::rc::Rc;

use bytecode_system::{OpCode, Script};
use core_types::{Claim, ExecutionLimits, ScriptHash, StackItem, VmResult};
use interpreter::{
    ContextRef, EvaluationStack, ExecutionContext, ExecutionContextStack, ExecutionEngine, Host,
    NullHost, StackAction, VmState,
};

/// Test ExecutionContext readers report failure through Option
#[test]
fn test_context_reader_contract() {
    let mut ctx = ExecutionContext::new(Rc::new(Script::new(&[])), false);
    let _: Option<u8> = ctx.read_u8();
    let _: Option<u16> = ctx.read_u16();
    let _: Option<i16> = ctx.read_i16();
    let _: Option<u32> = ctx.read_u32();
    let _: Option<i32> = ctx.read_i32();
    let _: Option<u64> = ctx.read_u64();
    let _: Option<i64> = ctx.read_i64();
    let _: Option<usize> = ctx.read_var_bytes(16);
    let _: usize = ctx.read(&mut [0u8; 4]);
    assert_eq!(ctx.instruction_pointer(), 0);
}

/// Test instruction decoding returns the RET sentinel at the end
#[test]
fn test_context_instruction_contract() {
    let mut ctx = ExecutionContext::new(Rc::new(Script::new(&[])), false);
    let next: OpCode = ctx.get_next_instruction();
    let read: OpCode = ctx.read_next_instruction();
    assert_eq!(next, OpCode::RET);
    assert_eq!(read, OpCode::RET);
}

/// Test seek reports out-of-range positions as errors
#[test]
fn test_context_seek_contract() {
    let mut ctx = ExecutionContext::new(Rc::new(Script::new(&[0x51])), false);
    let ok: VmResult<()> = ctx.seek(1);
    assert!(ok.is_ok());
    assert!(ctx.seek(2).is_err());
}

/// Test context stack slots are claims on contexts
#[test]
fn test_context_stack_contract() {
    let mut stack = ExecutionContextStack::new();
    let context: ContextRef = Claim::new(ExecutionContext::new(Rc::new(Script::new(&[])), true));
    stack.push(context);
    let _: Option<&ContextRef> = stack.top();
    let _: Option<&ContextRef> = stack.peek(0);
    let _: VmResult<()> = stack.remove(0);
    let _: bool = stack.drop_top();
    stack.clear();
    assert_eq!(stack.count(), 0);
}

/// Test Host methods all have defaults
#[test]
fn test_host_contract() {
    struct Silent;
    impl Host for Silent {}

    let mut host = Silent;
    let mut stack = EvaluationStack::new();
    assert!(!host.invoke_interop(b"", &mut stack));
    assert!(host.load_script(&ScriptHash::new([0; 20])).is_none());
    assert!(host.get_message(0).is_none());
    host.on_stack_change(&StackItem::from(false), 0, StackAction::Clear);
}

/// Test ExecutionEngine construction and state
#[test]
fn test_engine_contract() {
    let engine: ExecutionEngine = ExecutionEngine::default();
    assert_eq!(engine.state(), VmState::None);
    assert_eq!(engine.limits(), &ExecutionLimits::default());

    let mut engine = ExecutionEngine::with_limits(NullHost, ExecutionLimits::default());
    let context: VmResult<ContextRef> = engine.load_script(&[0x66], false);
    assert!(context.is_ok());
    let fetched: Option<OpCode> = engine.fetch();
    assert_eq!(fetched, Some(OpCode::RET));
    engine.halt();
    assert_eq!(engine.state(), VmState::Halt);
}
