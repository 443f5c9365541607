//! Unit tests for interpreter components

use std::rc::Rc;

use bytecode_system::{OpCode, Script};
use core_types::{Claim, StackItem, VmError, WeakClaim};
use interpreter::{
    ContextRef, ExecutionContext, ExecutionContextStack, ExecutionEngine, NullHost, VmState,
};
use proptest::prelude::*;

fn shared_script(bytes: &[u8]) -> Rc<Script> {
    Rc::new(Script::new(bytes))
}

fn new_context(script: &Rc<Script>) -> ContextRef {
    Claim::new(ExecutionContext::new(Rc::clone(script), false))
}

// ============================================================================
// ExecutionContext Tests
// ============================================================================

#[test]
fn test_context_reads_push_data_operands() {
    // PUSHBYTES2 0xAA 0xBB, PUSHDATA1 len=1 0xCC
    let script = shared_script(&[0x02, 0xAA, 0xBB, 0x4C, 0x01, 0xCC]);
    let mut ctx = ExecutionContext::new(script, false);

    let opcode = ctx.read_next_instruction();
    let len = opcode.inline_push_len().unwrap();
    assert_eq!(ctx.read_bytes(len), Some(&[0xAA, 0xBB][..]));

    let opcode = ctx.read_next_instruction();
    assert_eq!(opcode.length_prefix_width(), Some(1));
    let len = ctx.read_u8().unwrap() as usize;
    assert_eq!(ctx.read_bytes(len), Some(&[0xCC][..]));
    assert_eq!(ctx.get_next_instruction(), OpCode::RET);
}

#[test]
fn test_context_read_bytes_past_end() {
    let mut ctx = ExecutionContext::new(shared_script(&[1, 2]), false);
    assert_eq!(ctx.read_bytes(3), None);
    assert_eq!(ctx.instruction_pointer(), 0);
    assert_eq!(ctx.read_bytes(usize::MAX), None);
    assert_eq!(ctx.read_bytes(0), Some(&[][..]));
}

#[test]
fn test_context_read_var_bytes_rejects_oversized_length() {
    let mut ctx = ExecutionContext::new(shared_script(&[0x51, 0xFD, 0xE8, 0x03]), false);
    ctx.read_next_instruction();
    let before = ctx.instruction_pointer();

    assert_eq!(ctx.read_var_bytes(256), None);
    assert_eq!(ctx.instruction_pointer(), before);
}

#[test]
fn test_context_read_var_bytes_u64_prefix() {
    let mut bytes = vec![0xFF];
    bytes.extend_from_slice(&(1u64 << 40).to_le_bytes());
    let mut ctx = ExecutionContext::new(shared_script(&bytes), false);

    assert_eq!(ctx.read_var_bytes(1024 * 1024), None);
    assert_eq!(ctx.instruction_pointer(), 0);
}

#[test]
fn test_context_seek_both_boundaries() {
    let mut ctx = ExecutionContext::new(shared_script(&[0x51, 0x52, 0x60]), false);
    assert!(ctx.seek(3).is_ok());
    assert_eq!(ctx.get_next_instruction(), OpCode::RET);
    assert!(matches!(ctx.seek(4), Err(VmError::SeekOutOfRange { .. })));
    assert!(ctx.seek(0).is_ok());
    assert_eq!(ctx.get_next_instruction(), OpCode::PUSH1);
}

#[test]
fn test_context_script_hash_delegates() {
    let script = shared_script(&[0x51]);
    let ctx = ExecutionContext::new(Rc::clone(&script), false);
    assert_eq!(ctx.script_hash(), script.hash());
    assert!(script.is_hash_computed());
}

#[test]
fn test_context_clone_is_independent() {
    let mut original = ExecutionContext::new(shared_script(&[1, 2, 3, 4]), false);
    let mut copy = original.clone();

    copy.read_u16();
    assert_eq!(copy.instruction_pointer(), 2);
    assert_eq!(original.instruction_pointer(), 0);

    original.seek(4).unwrap();
    assert_eq!(copy.instruction_pointer(), 2);
}

// ============================================================================
// ExecutionContextStack Tests
// ============================================================================

#[test]
fn test_stack_two_contexts_one_script() {
    let script = shared_script(&[0x51, 0x52, 0x60]);
    let mut stack = ExecutionContextStack::new();
    stack.push(new_context(&script));
    stack.push(new_context(&script));
    assert_eq!(stack.count(), 2);

    stack.drop_top();
    assert_eq!(stack.count(), 1);
    assert!(Rc::strong_count(&script) >= 2);
    assert_eq!(stack.top().unwrap().borrow().script_length(), 3);
}

#[test]
fn test_stack_remove_middle_keeps_top() {
    let script = shared_script(&[]);
    let mut stack = ExecutionContextStack::new();
    let contexts: Vec<ContextRef> = (0..3).map(|_| new_context(&script)).collect();
    for context in &contexts {
        stack.push(context.claim());
    }

    stack.remove(1).unwrap();
    assert_eq!(stack.count(), 2);
    assert!(Claim::ptr_eq(stack.top().unwrap(), &contexts[2]));
    assert!(Claim::ptr_eq(stack.peek(0).unwrap(), &contexts[2]));
    assert!(Claim::ptr_eq(stack.peek(1).unwrap(), &contexts[0]));
    assert_eq!(contexts[1].claims(), 1);
}

#[test]
fn test_stack_peek_out_of_range() {
    let mut stack = ExecutionContextStack::new();
    assert!(stack.top().is_none());
    stack.push(new_context(&shared_script(&[])));
    assert!(stack.peek(1).is_none());
}

#[test]
fn test_stack_iter_top_first() {
    let mut stack = ExecutionContextStack::new();
    for len in 1..=3usize {
        stack.push(new_context(&shared_script(&vec![0; len])));
    }
    let lengths: Vec<usize> = stack.iter().map(|c| c.borrow().script_length()).collect();
    assert_eq!(lengths, vec![3, 2, 1]);
}

#[derive(Debug, Clone)]
enum StackOp {
    Push,
    Drop,
    Remove(usize),
    Clear,
}

fn stack_op() -> impl Strategy<Value = StackOp> {
    prop_oneof![
        4 => Just(StackOp::Push),
        2 => Just(StackOp::Drop),
        2 => (0usize..6).prop_map(StackOp::Remove),
        1 => Just(StackOp::Clear),
    ]
}

proptest! {
    #[test]
    fn prop_stack_count_matches_unreleased(ops in proptest::collection::vec(stack_op(), 0..48)) {
        let script = shared_script(&[0x51, 0x52, 0x60]);
        let mut stack = ExecutionContextStack::new();
        let mut pushed: Vec<WeakClaim<ExecutionContext>> = Vec::new();

        for op in ops {
            match op {
                StackOp::Push => {
                    let context = new_context(&script);
                    pushed.push(context.downgrade());
                    stack.push(context);
                }
                StackOp::Drop => {
                    stack.drop_top();
                }
                StackOp::Remove(index) => {
                    let _ = stack.remove(index);
                }
                StackOp::Clear => stack.clear(),
            }
        }

        let live = pushed.iter().filter(|w| !w.is_released()).count();
        prop_assert_eq!(stack.count(), live);
        prop_assert!(pushed.iter().all(|w| w.claims() <= 1));
        prop_assert_eq!(Rc::strong_count(&script), live + 1);
    }
}

// ============================================================================
// ExecutionEngine Tests
// ============================================================================

#[test]
fn test_engine_runs_to_halt() {
    let mut engine = ExecutionEngine::new(NullHost);
    engine.load_script(&[0x51, 0x52], false).unwrap();

    let mut decoded = Vec::new();
    while let Some(opcode) = engine.fetch() {
        if opcode == OpCode::RET {
            engine.ret();
            continue;
        }
        decoded.push(opcode);
    }

    assert_eq!(decoded, vec![OpCode::PUSH1, OpCode(0x52)]);
    assert_eq!(engine.state(), VmState::Halt);
    assert!(engine.invocation_stack().is_empty());
}

#[test]
fn test_engine_fetch_with_nothing_loaded_halts() {
    let mut engine = ExecutionEngine::new(NullHost);
    assert_eq!(engine.fetch(), None);
    assert_eq!(engine.state(), VmState::Halt);
}

#[test]
fn test_engine_fault_stops_fetching() {
    let mut engine = ExecutionEngine::new(NullHost);
    engine.load_script(&[0x51], false).unwrap();
    engine.fault(VmError::UnexpectedEnd);
    assert_eq!(engine.fetch(), None);
    assert_eq!(engine.state(), VmState::Fault);
    // Unwinding after a fault keeps the fault state
    engine.ret();
    assert_eq!(engine.state(), VmState::Fault);
}

#[test]
fn test_engine_stack_operations() {
    let mut engine = ExecutionEngine::new(NullHost);
    engine.push(StackItem::from(1i64)).unwrap();
    engine.push(StackItem::from(3i64)).unwrap();
    engine.insert(1, StackItem::from(2i64)).unwrap();

    assert_eq!(engine.peek(1).and_then(|i| i.get_int32()), Some(2));
    let old = engine.set(0, StackItem::from(4i64)).unwrap();
    assert_eq!(old.get_int32(), Some(3));
    assert_eq!(engine.remove(2).unwrap().get_int32(), Some(1));
    assert!(matches!(
        engine.remove(5),
        Err(VmError::IndexOutOfRange { index: 5, count: 2 })
    ));
    assert!(engine.insert(3, StackItem::from(0i64)).is_err());

    engine.clear_evaluation_stack();
    assert!(engine.evaluation_stack().is_empty());
}

#[test]
fn test_engine_drop_releases_contexts() {
    let watch = {
        let mut engine = ExecutionEngine::new(NullHost);
        let context = engine.load_script(&[0x51], false).unwrap();
        context.downgrade()
    };
    assert!(watch.is_released());
}
