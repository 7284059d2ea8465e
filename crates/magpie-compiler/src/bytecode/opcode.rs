//! Bytecode operation codes.
//!
//! This module defines the instruction set the code generator targets.
//! Each opcode is a single byte; the discriminant order is the wire
//! encoding and must not change. Operands follow inline, see [`Operand`].

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Bytecode operation codes.
///
/// The VM is a stack machine. Operations pop their inputs and push their
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Constants
    // =========================================================================
    /// Push the null value.
    PushNull = 0,
    /// Operand: bool byte
    PushBool,
    /// Operand: i32
    PushInt,
    /// Push a string from the string table.
    /// Operand: i32 string index
    PushString,

    // =========================================================================
    // Locals and Memory
    // =========================================================================
    /// Push the current frame's locals structure.
    PushLocals,
    /// Allocate a structure with the given number of slots.
    /// Operand: i32 slot count
    Alloc,
    /// Load a field from the structure on top of the stack.
    /// Operand: u8 field index
    Load,
    /// Store into a field of the structure on top of the stack.
    /// Operand: u8 field index
    Store,

    // =========================================================================
    // Calls
    // =========================================================================
    /// Call a function that takes no argument.
    Call0,
    /// Call a function with one argument.
    Call1,
    /// Call a function with a tuple argument.
    CallN,
    /// Operand: i32 foreign function id
    ForeignCall0,
    /// Operand: i32 foreign function id
    ForeignCall1,
    /// Operand: i32 foreign function id
    ForeignCallN,
    Return,

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// Operand: i32 absolute offset
    Jump,
    /// Operand: i32 absolute offset
    JumpIfFalse,

    // =========================================================================
    // Intrinsics
    // =========================================================================
    BoolToString,
    IntToString,
    EqualBool,
    EqualInt,
    EqualString,
    LessInt,
    GreaterInt,
    NegateBool,
    NegateInt,
    AndBool,
    OrBool,
    AddInt,
    SubInt,
    MultInt,
    DivInt,

    // =========================================================================
    // Unions
    // =========================================================================
    HasValue,
    BoxValue,
    UnboxValue,

    // =========================================================================
    // Strings and I/O
    // =========================================================================
    AddString,
    Print,
    StringSize,
    Substring,
}

/// The kind of inline operand an opcode carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    /// One byte, `0` or `1`.
    Bool,
    /// One unsigned byte.
    Byte,
    /// Four bytes, little-endian signed.
    Int,
}

impl Operand {
    /// Encoded size in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::None => 0,
            Self::Bool | Self::Byte => 1,
            Self::Int => 4,
        }
    }
}

impl OpCode {
    /// Decode an opcode byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// The operand that follows this opcode.
    pub fn operand(self) -> Operand {
        match self {
            Self::PushBool => Operand::Bool,
            Self::Load | Self::Store => Operand::Byte,
            Self::PushInt
            | Self::PushString
            | Self::Alloc
            | Self::ForeignCall0
            | Self::ForeignCall1
            | Self::ForeignCallN
            | Self::Jump
            | Self::JumpIfFalse => Operand::Int,
            _ => Operand::None,
        }
    }

    /// Size of the operand in bytes.
    pub fn operand_size(self) -> usize {
        self.operand().size()
    }

    /// Mnemonic used by the disassembler.
    pub fn name(self) -> &'static str {
        match self {
            Self::PushNull => "PUSH_NULL",
            Self::PushBool => "PUSH_BOOL",
            Self::PushInt => "PUSH_INT",
            Self::PushString => "PUSH_STRING",
            Self::PushLocals => "PUSH_LOCALS",
            Self::Alloc => "ALLOC",
            Self::Load => "LOAD",
            Self::Store => "STORE",
            Self::Call0 => "CALL_0",
            Self::Call1 => "CALL_1",
            Self::CallN => "CALL_N",
            Self::ForeignCall0 => "FOREIGN_CALL_0",
            Self::ForeignCall1 => "FOREIGN_CALL_1",
            Self::ForeignCallN => "FOREIGN_CALL_N",
            Self::Return => "RETURN",
            Self::Jump => "JUMP",
            Self::JumpIfFalse => "JUMP_IF_FALSE",
            Self::BoolToString => "BOOL_TO_STRING",
            Self::IntToString => "INT_TO_STRING",
            Self::EqualBool => "EQUAL_BOOL",
            Self::EqualInt => "EQUAL_INT",
            Self::EqualString => "EQUAL_STRING",
            Self::LessInt => "LESS_INT",
            Self::GreaterInt => "GREATER_INT",
            Self::NegateBool => "NEGATE_BOOL",
            Self::NegateInt => "NEGATE_INT",
            Self::AndBool => "AND_BOOL",
            Self::OrBool => "OR_BOOL",
            Self::AddInt => "ADD_INT",
            Self::SubInt => "SUB_INT",
            Self::MultInt => "MULT_INT",
            Self::DivInt => "DIV_INT",
            Self::HasValue => "HAS_VALUE",
            Self::BoxValue => "BOX_VALUE",
            Self::UnboxValue => "UNBOX_VALUE",
            Self::AddString => "ADD_STRING",
            Self::Print => "PRINT",
            Self::StringSize => "STRING_SIZE",
            Self::Substring => "SUBSTRING",
        }
    }
}
