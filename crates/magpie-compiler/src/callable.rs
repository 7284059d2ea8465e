//! Things a call site can resolve to.

use std::fmt;

use magpie_core::{Decl, FuncType};

use crate::bytecode::OpCode;
use crate::intrinsics::Intrinsic;

/// Index of a user function (or generic instance) in a [`Program`].
///
/// [`Program`]: crate::Program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

impl FunctionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn#{}", self.0)
    }
}

/// Index of a generic function template in a [`Program`].
///
/// [`Program`]: crate::Program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenericId(pub u32);

impl GenericId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a user function came to exist, judged from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Ordinary,
    /// Named by an operator symbol, called through `a op b`.
    Operator,
    /// Named `target<-`, called through `target <- value`.
    Assignment,
}

impl FunctionKind {
    pub fn of(name: &str) -> Self {
        if name.len() > 2 && name.ends_with("<-") {
            Self::Assignment
        } else if !name.is_empty() && name.chars().all(is_operator_char) {
            Self::Operator
        } else {
            Self::Ordinary
        }
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '=' | '!' | '<' | '>' | '&' | '|' | '%' | '^' | '~' | '?'
    )
}

/// A function implemented by the host and invoked by id.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignFunction {
    pub name: String,
    pub id: i32,
    pub signature: FuncType,
}

impl ForeignFunction {
    pub fn new(name: impl Into<String>, id: i32, params: Vec<Decl>, ret: Decl) -> Self {
        Self {
            name: name.into(),
            id,
            signature: FuncType::new(params, ret),
        }
    }
}

/// The target of a resolved call.
#[derive(Debug, Clone, PartialEq)]
pub enum Callable {
    Function(FunctionId),
    Intrinsic(&'static Intrinsic),
    Foreign(ForeignFunction),
}

impl Callable {
    /// The opcodes a code generator emits for a call with `arity`
    /// arguments, after pushing the argument.
    ///
    /// Foreign calls take the function id as their operand.
    pub fn call_ops(&self, arity: usize) -> &'static [OpCode] {
        match self {
            Self::Intrinsic(intrinsic) => intrinsic.ops,
            Self::Function(_) => match arity {
                0 => &[OpCode::Call0],
                1 => &[OpCode::Call1],
                _ => &[OpCode::CallN],
            },
            Self::Foreign(_) => match arity {
                0 => &[OpCode::ForeignCall0],
                1 => &[OpCode::ForeignCall1],
                _ => &[OpCode::ForeignCallN],
            },
        }
    }
}
