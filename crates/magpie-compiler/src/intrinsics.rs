//! Built-in functions that lower directly to opcodes.

use magpie_core::Decl;

use crate::bytecode::OpCode;

/// A built-in function with a fixed opcode lowering.
#[derive(Debug, PartialEq)]
pub struct Intrinsic {
    pub name: &'static str,
    pub params: &'static [Decl],
    pub ret: Decl,
    pub ops: &'static [OpCode],
}

const INT: &[Decl] = &[Decl::Int];
const BOOL: &[Decl] = &[Decl::Bool];
const STRING: &[Decl] = &[Decl::String];
const INT_INT: &[Decl] = &[Decl::Int, Decl::Int];
const BOOL_BOOL: &[Decl] = &[Decl::Bool, Decl::Bool];
const STRING_STRING: &[Decl] = &[Decl::String, Decl::String];
const STRING_INT_INT: &[Decl] = &[Decl::String, Decl::Int, Decl::Int];

macro_rules! intrinsic {
    ($name:literal, $params:expr, $ret:expr, [$($op:ident),+]) => {
        Intrinsic {
            name: $name,
            params: $params,
            ret: $ret,
            ops: &[$(OpCode::$op),+],
        }
    };
}

static INTRINSICS: &[Intrinsic] = &[
    // Arithmetic
    intrinsic!("+", INT_INT, Decl::Int, [AddInt]),
    intrinsic!("-", INT_INT, Decl::Int, [SubInt]),
    intrinsic!("*", INT_INT, Decl::Int, [MultInt]),
    intrinsic!("/", INT_INT, Decl::Int, [DivInt]),
    intrinsic!("Neg", INT, Decl::Int, [NegateInt]),
    // Comparison
    intrinsic!("=", INT_INT, Decl::Bool, [EqualInt]),
    intrinsic!("=", BOOL_BOOL, Decl::Bool, [EqualBool]),
    intrinsic!("=", STRING_STRING, Decl::Bool, [EqualString]),
    intrinsic!("!=", INT_INT, Decl::Bool, [EqualInt, NegateBool]),
    intrinsic!("<", INT_INT, Decl::Bool, [LessInt]),
    intrinsic!(">", INT_INT, Decl::Bool, [GreaterInt]),
    intrinsic!("<=", INT_INT, Decl::Bool, [GreaterInt, NegateBool]),
    intrinsic!(">=", INT_INT, Decl::Bool, [LessInt, NegateBool]),
    // Logic
    intrinsic!("&", BOOL_BOOL, Decl::Bool, [AndBool]),
    intrinsic!("|", BOOL_BOOL, Decl::Bool, [OrBool]),
    intrinsic!("Not", BOOL, Decl::Bool, [NegateBool]),
    // Strings
    intrinsic!("+", STRING_STRING, Decl::String, [AddString]),
    intrinsic!("String", INT, Decl::String, [IntToString]),
    intrinsic!("String", BOOL, Decl::String, [BoolToString]),
    intrinsic!("Size", STRING, Decl::Int, [StringSize]),
    intrinsic!("Substring", STRING_INT_INT, Decl::String, [Substring]),
    // I/O
    intrinsic!("Print", STRING, Decl::Unit, [Print]),
];

/// Every intrinsic.
pub fn all() -> &'static [Intrinsic] {
    INTRINSICS
}

/// Intrinsics with the given name.
pub fn lookup(name: &str) -> impl Iterator<Item = &'static Intrinsic> + '_ {
    INTRINSICS.iter().filter(move |i| i.name == name)
}
