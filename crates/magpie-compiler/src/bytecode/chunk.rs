//! Bytecode chunk for compiled functions.
//!
//! A `BytecodeChunk` holds the encoded instructions of one function along
//! with a source line per byte for diagnostics.

use thiserror::Error;

use super::{OpCode, Operand};

/// A chunk of compiled bytecode for a single function.
#[derive(Debug, Clone, Default)]
pub struct BytecodeChunk {
    code: Vec<u8>,
    /// Line numbers, parallel to `code`.
    lines: Vec<u32>,
}

/// A decoded operand value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandValue {
    None,
    Bool(bool),
    Byte(u8),
    Int(i32),
}

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub offset: usize,
    pub op: OpCode,
    pub operand: OperandValue,
}

/// Errors from decoding a byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown opcode {byte:#04x} at offset {offset}")]
    UnknownOpcode { byte: u8, offset: usize },

    #[error("truncated operand for {} at offset {offset}", .op.name())]
    Truncated { op: OpCode, offset: usize },
}

impl BytecodeChunk {
    /// Create a new empty bytecode chunk.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.write_byte(op.into(), line);
    }

    pub fn write_byte(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    pub fn write_bool(&mut self, value: bool, line: u32) {
        self.write_byte(u8::from(value), line);
    }

    /// Write a 32-bit operand (little-endian).
    pub fn write_int(&mut self, value: i32, line: u32) {
        for byte in value.to_le_bytes() {
            self.write_byte(byte, line);
        }
    }

    /// Write an opcode and its operand.
    pub fn emit(&mut self, op: OpCode, operand: OperandValue, line: u32) {
        self.write_op(op, line);
        match operand {
            OperandValue::None => {}
            OperandValue::Bool(value) => self.write_bool(value, line),
            OperandValue::Byte(value) => self.write_byte(value, line),
            OperandValue::Int(value) => self.write_int(value, line),
        }
    }

    /// Get current code offset (for jump patching).
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Emit a jump instruction and return the operand offset to patch later.
    ///
    /// The target is initialized to `-1` as a placeholder.
    pub fn emit_jump(&mut self, op: OpCode, line: u32) -> usize {
        self.write_op(op, line);
        let offset = self.code.len();
        self.write_int(-1, line);
        offset
    }

    /// Patch the jump whose operand starts at `offset` to target the
    /// current position. Jump targets are absolute.
    pub fn patch_jump(&mut self, offset: usize) {
        let target = self.code.len() as i32;
        self.code[offset..offset + 4].copy_from_slice(&target.to_le_bytes());
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Read an i32 operand at the given offset.
    pub fn read_int(&self, offset: usize) -> Option<i32> {
        let bytes = self.code.get(offset..offset + 4)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        Some(i32::from_le_bytes(buf))
    }

    /// Decode every instruction in the chunk.
    pub fn instructions(&self) -> Result<Vec<Instruction>, DecodeError> {
        let mut instructions = Vec::new();
        let mut offset = 0;

        while offset < self.code.len() {
            let byte = self.code[offset];
            let op = OpCode::from_u8(byte).ok_or(DecodeError::UnknownOpcode { byte, offset })?;
            let start = offset + 1;
            let truncated = DecodeError::Truncated { op, offset };

            let operand = match op.operand() {
                Operand::None => OperandValue::None,
                Operand::Bool => OperandValue::Bool(*self.code.get(start).ok_or(truncated)? != 0),
                Operand::Byte => OperandValue::Byte(*self.code.get(start).ok_or(truncated)?),
                Operand::Int => OperandValue::Int(self.read_int(start).ok_or(truncated)?),
            };

            instructions.push(Instruction {
                offset,
                op,
                operand,
            });
            offset = start + op.operand_size();
        }

        Ok(instructions)
    }

    /// Extract the opcode sequence, ignoring operands.
    pub fn opcodes(&self) -> Result<Vec<OpCode>, DecodeError> {
        Ok(self.instructions()?.into_iter().map(|i| i.op).collect())
    }

    /// Human-readable listing, one instruction per line.
    pub fn disassemble(&self) -> Result<String, DecodeError> {
        let mut out = String::new();
        for instruction in self.instructions()? {
            let operand = match instruction.operand {
                OperandValue::None => String::new(),
                OperandValue::Bool(v) => format!(" {v}"),
                OperandValue::Byte(v) => format!(" {v}"),
                OperandValue::Int(v) => format!(" {v}"),
            };
            out.push_str(&format!(
                "{:04} {}{}\n",
                instruction.offset,
                instruction.op.name(),
                operand
            ));
        }
        Ok(out)
    }
}
