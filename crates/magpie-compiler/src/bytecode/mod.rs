//! Bytecode contract consumed by the code generator.
//!
//! - [`OpCode`] and [`Operand`] - the instruction set and operand encoding
//! - [`BytecodeChunk`] - encoded instructions for one function
//! - [`StringTable`] - program-wide string storage

mod chunk;
mod opcode;
mod strings;

pub use chunk::{BytecodeChunk, DecodeError, Instruction, OperandValue};
pub use opcode::{OpCode, Operand};
pub use strings::StringTable;
