//! Instruction bytes
//!
//! The dispatch loop owns the meaning of each opcode. This module only
//! names the bytes the execution core itself depends on: the push range
//! that push-only contexts are limited to, the inline-operand pushes, and
//! `RET`, which decoders return past the end of a script.

use std::fmt;

/// A single instruction byte
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpCode(pub u8);

impl OpCode {
    /// Push an empty byte array
    pub const PUSH0: OpCode = OpCode(0x00);
    /// Push the next byte
    pub const PUSHBYTES1: OpCode = OpCode(0x01);
    /// Push the next 75 bytes
    pub const PUSHBYTES75: OpCode = OpCode(0x4B);
    /// Push bytes with a 1-byte length prefix
    pub const PUSHDATA1: OpCode = OpCode(0x4C);
    /// Push bytes with a 2-byte length prefix
    pub const PUSHDATA2: OpCode = OpCode(0x4D);
    /// Push bytes with a 4-byte length prefix
    pub const PUSHDATA4: OpCode = OpCode(0x4E);
    /// Push -1
    pub const PUSHM1: OpCode = OpCode(0x4F);
    /// Push 1
    pub const PUSH1: OpCode = OpCode(0x51);
    /// Push 16, the last push opcode
    pub const PUSH16: OpCode = OpCode(0x60);
    /// Return from the current context
    pub const RET: OpCode = OpCode(0x66);

    /// Raw byte
    pub fn byte(self) -> u8 {
        self.0
    }

    /// Whether this opcode only pushes data
    pub fn is_push(self) -> bool {
        self <= Self::PUSH16
    }

    /// Whether a push-only context may execute this opcode
    pub fn allowed_in_push_only(self) -> bool {
        self.is_push() || self == Self::RET
    }

    /// Number of inline data bytes that directly follow a `PUSHBYTESn`
    pub fn inline_push_len(self) -> Option<usize> {
        if self >= Self::PUSHBYTES1 && self <= Self::PUSHBYTES75 {
            Some(self.0 as usize)
        } else {
            None
        }
    }

    /// Width in bytes of the length prefix of a `PUSHDATAn`
    pub fn length_prefix_width(self) -> Option<usize> {
        match self {
            Self::PUSHDATA1 => Some(1),
            Self::PUSHDATA2 => Some(2),
            Self::PUSHDATA4 => Some(4),
            _ => None,
        }
    }
}

impl From<u8> for OpCode {
    fn from(byte: u8) -> Self {
        OpCode(byte)
    }
}

impl fmt::Debug for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpCode(0x{:02x})", self.0)
    }
}
