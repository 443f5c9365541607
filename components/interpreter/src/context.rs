//! Execution context for VM
//!
//! One entry of the invocation stack: a shared script, a cursor into it and
//! the flags fixed when the context was created. All decoders either succeed
//! and advance the cursor past what they consumed, or fail and leave it
//! where it was.

use std::rc::Rc;

use bytecode_system::{OpCode, Script};
use core_types::{varint, Claim, ScriptHash, VmError, VmResult};

/// Shared handle to a context, as held by the invocation stack
pub type ContextRef = Claim<ExecutionContext>;

/// Execution context for a script
///
/// Cloning a context shares the script (no copy, no rehash) and copies the
/// cursor and the push-only flag; the clone then advances independently.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// The script being executed
    script: Rc<Script>,
    /// Current instruction pointer, always within `0..=script.len()`
    instruction_pointer: usize,
    /// Restricts the context to push opcodes
    push_only: bool,
}

impl ExecutionContext {
    /// Create a context positioned at the start of `script`
    pub fn new(script: Rc<Script>, push_only: bool) -> Self {
        Self {
            script,
            instruction_pointer: 0,
            push_only,
        }
    }

    /// The shared script
    pub fn script(&self) -> &Rc<Script> {
        &self.script
    }

    /// Script length in bytes
    pub fn script_length(&self) -> usize {
        self.script.len()
    }

    /// Current cursor position
    pub fn instruction_pointer(&self) -> usize {
        self.instruction_pointer
    }

    /// Whether only push opcodes may run in this context
    pub fn is_push_only(&self) -> bool {
        self.push_only
    }

    /// Bytes left between the cursor and the end of the script
    pub fn remaining(&self) -> usize {
        self.script.len() - self.instruction_pointer
    }

    /// Identity hash of the script
    pub fn script_hash(&self) -> ScriptHash {
        self.script.hash()
    }

    /// Move the cursor to an absolute position.
    ///
    /// `position == script_length()` is accepted and leaves the context at
    /// the end of the script; anything further fails without moving.
    pub fn seek(&mut self, position: usize) -> VmResult<()> {
        if position > self.script.len() {
            return Err(VmError::SeekOutOfRange {
                position,
                length: self.script.len(),
            });
        }
        self.instruction_pointer = position;
        Ok(())
    }

    /// Whether `opcode` may run in this context
    pub fn is_allowed(&self, opcode: OpCode) -> bool {
        !self.push_only || opcode.allowed_in_push_only()
    }

    /// Opcode at the cursor, without advancing.
    ///
    /// Returns [`OpCode::RET`] at the end of the script.
    pub fn get_next_instruction(&self) -> OpCode {
        self.script
            .get(self.instruction_pointer)
            .map_or(OpCode::RET, OpCode::from)
    }

    /// Opcode at the cursor, advancing past it.
    ///
    /// Returns [`OpCode::RET`] at the end of the script, leaving the cursor
    /// in place.
    pub fn read_next_instruction(&mut self) -> OpCode {
        match self.script.get(self.instruction_pointer) {
            Some(byte) => {
                self.instruction_pointer += 1;
                OpCode::from(byte)
            }
            None => OpCode::RET,
        }
    }

    /// Borrow the next `count` bytes and advance past them
    pub fn read_bytes(&mut self, count: usize) -> Option<&[u8]> {
        let start = self.instruction_pointer;
        let end = start.checked_add(count)?;
        if end > self.script.len() {
            return None;
        }
        self.instruction_pointer = end;
        Some(&self.script.as_bytes()[start..end])
    }

    /// Copy as many bytes as fit into `out`, returning how many were copied.
    ///
    /// Unlike the fixed-width readers this may copy fewer bytes than asked
    /// for near the end of the script.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let count = out.len().min(self.remaining());
        let start = self.instruction_pointer;
        out[..count].copy_from_slice(&self.script.as_bytes()[start..start + count]);
        self.instruction_pointer += count;
        count
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        bytes.try_into().ok()
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Option<u8> {
        self.read_array::<1>().map(|[b]| b)
    }

    /// Read a little-endian `u16`
    pub fn read_u16(&mut self) -> Option<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Read a little-endian `i16`
    pub fn read_i16(&mut self) -> Option<i16> {
        self.read_array().map(i16::from_le_bytes)
    }

    /// Read a little-endian `u32`
    pub fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Read a little-endian `i32`
    pub fn read_i32(&mut self) -> Option<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    /// Read a little-endian `u64`
    pub fn read_u64(&mut self) -> Option<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    /// Read a little-endian `i64`
    pub fn read_i64(&mut self) -> Option<i64> {
        self.read_array().map(i64::from_le_bytes)
    }

    /// Decode a var-int length prefix no greater than `max`.
    ///
    /// Only the prefix is consumed; the caller reads the payload with
    /// [`read_bytes`](Self::read_bytes). Fails without moving the cursor
    /// when the prefix is truncated or the length exceeds `max`.
    pub fn read_var_bytes(&mut self, max: usize) -> Option<usize> {
        let rest = &self.script.as_bytes()[self.instruction_pointer..];
        let (length, consumed) = varint::read(rest)?;
        let length = usize::try_from(length).ok().filter(|&len| len <= max)?;
        self.instruction_pointer += consumed;
        Some(length)
    }
}
