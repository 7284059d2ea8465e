//! Compile errors raised while binding function bodies.
//!
//! Every failure the binder can detect is a [`CompilationError`]. Each
//! variant renders a human-readable message and carries the source position
//! where the problem was found. Errors are raised at the point of detection
//! and propagate with `?` out of the whole function-binding call; there is no
//! local recovery inside one function.

use thiserror::Error;

use crate::{Decl, Span};

/// Errors that occur during binding (name resolution and type checking).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// A local was defined twice in the same scope frame.
    #[error("at {span}: a local variable named '{name}' is already defined in this scope")]
    DuplicateLocal { name: String, span: Span },

    /// A store to an immutable local, parameter or array.
    #[error("at {span}: {message}")]
    ImmutableAssignment { message: String, span: Span },

    /// The left-hand side of an assignment has an unsupported shape.
    #[error("at {span}: cannot assign to {target}")]
    InvalidAssignmentTarget { target: String, span: Span },

    /// A store whose value type differs from the local's declared type.
    #[error("at {span}: cannot assign a value of type {actual} to '{name}' of type {declared}")]
    AssignmentTypeMismatch {
        name: String,
        declared: Decl,
        actual: Decl,
        span: Span,
    },

    /// `a, b <- ...` tuple decomposition, which is not supported.
    #[error("at {span}: assigning to a tuple of targets is not supported")]
    UnsupportedTupleAssignment { span: Span },

    /// Argument type does not match the parameter types of a function value.
    #[error(
        "at {span}: argument of type {actual} passed to a function reference does not match its parameter types ({expected})"
    )]
    ArgumentMismatch {
        expected: String,
        actual: Decl,
        span: Span,
    },

    /// Application of something that is neither a function nor an index.
    #[error("at {span}: {message}")]
    NonFunctionCallTarget { message: String, span: Span },

    /// An array literal whose elements disagree on type.
    #[error(
        "at {span}: array elements must all be the same type; array is type {expected}, but element {index} is type {actual}"
    )]
    InconsistentArrayElementType {
        expected: Decl,
        index: usize,
        actual: Decl,
        span: Span,
    },

    /// A non-final block expression that is not `Unit`.
    #[error(
        "at {span}: all expressions in a block except the last must be of type Unit, found {actual}"
    )]
    NonUnitInSequence { actual: Decl, span: Span },

    /// The body of an `if`/`then` without `else` is not `Unit`.
    #[error("at {span}: body of if/then is returning type {actual} but should be Unit")]
    NonUnitBranch { actual: Decl, span: Span },

    /// The arms of an `if`/`then`/`else` disagree on type.
    #[error(
        "at {span}: arms of if/then/else do not return the same type; then arm returns {then_type} while else arm returns {else_type}"
    )]
    BranchTypeMismatch {
        then_type: Decl,
        else_type: Decl,
        span: Span,
    },

    /// The condition of an `if` is not `Bool`.
    #[error("at {span}: condition of if/then is returning type {actual} but should be Bool")]
    IfConditionType { actual: Decl, span: Span },

    /// The condition of a `while` is not `Bool`.
    #[error("at {span}: condition of while/do is returning type {actual} but should be Bool")]
    WhileConditionType { actual: Decl, span: Span },

    /// The body of a `while` is not `Unit`.
    #[error("at {span}: body of while/do is returning type {actual} but should be Unit")]
    NonUnitLoopBody { actual: Decl, span: Span },

    /// A function body whose type differs from the declared return type.
    #[error("at {span}: {function} is declared to return {declared} but is returning {actual}")]
    ReturnTypeMismatch {
        function: String,
        declared: Decl,
        actual: Decl,
        span: Span,
    },

    /// No callable matches a name and argument type.
    #[error("at {span}: could not find a function named '{name}' that takes {arg}")]
    NoSuchFunction { name: String, arg: Decl, span: Span },

    /// More than one callable matches a name and argument type.
    #[error("at {span}: call to '{name}' with {arg} is ambiguous between {candidates}")]
    AmbiguousCall {
        name: String,
        arg: Decl,
        candidates: String,
        span: Span,
    },

    /// A function reference to an intrinsic or foreign function.
    #[error(
        "at {span}: can only reference user-defined functions; '{name}' is an intrinsic or foreign function"
    )]
    UnsupportedFunctionReference { name: String, span: Span },

    /// A type annotation names a type that does not exist.
    #[error("at {span}: unknown type '{name}'")]
    UnknownType { name: String, span: Span },

    /// Wrong number of explicit type arguments.
    #[error("at {span}: '{name}' expects {expected} type argument(s), got {got}")]
    TypeArgCountMismatch {
        name: String,
        expected: usize,
        got: usize,
        span: Span,
    },

    /// A generic call whose type arguments cannot be inferred from the argument.
    #[error("at {span}: cannot infer type argument '{param}' of '{name}' from {arg}")]
    CannotInferTypeArgs {
        name: String,
        param: String,
        arg: Decl,
        span: Span,
    },

    /// Two functions registered with the same name and parameter types.
    #[error("at {span}: function '{name}' taking {arg} is already defined")]
    DuplicateFunction { name: String, arg: Decl, span: Span },

    /// Two union types registered under one name.
    #[error("at {span}: a type named '{name}' is already declared")]
    DuplicateType { name: String, span: Span },

    /// Internal compiler error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CompilationError {
    /// Source position of the error, `Span::default()` when unknown.
    pub fn span(&self) -> Span {
        match self {
            Self::DuplicateLocal { span, .. }
            | Self::ImmutableAssignment { span, .. }
            | Self::InvalidAssignmentTarget { span, .. }
            | Self::AssignmentTypeMismatch { span, .. }
            | Self::UnsupportedTupleAssignment { span }
            | Self::ArgumentMismatch { span, .. }
            | Self::NonFunctionCallTarget { span, .. }
            | Self::InconsistentArrayElementType { span, .. }
            | Self::NonUnitInSequence { span, .. }
            | Self::NonUnitBranch { span, .. }
            | Self::BranchTypeMismatch { span, .. }
            | Self::IfConditionType { span, .. }
            | Self::WhileConditionType { span, .. }
            | Self::NonUnitLoopBody { span, .. }
            | Self::ReturnTypeMismatch { span, .. }
            | Self::NoSuchFunction { span, .. }
            | Self::AmbiguousCall { span, .. }
            | Self::UnsupportedFunctionReference { span, .. }
            | Self::UnknownType { span, .. }
            | Self::TypeArgCountMismatch { span, .. }
            | Self::CannotInferTypeArgs { span, .. }
            | Self::DuplicateFunction { span, .. }
            | Self::DuplicateType { span, .. } => *span,
            Self::Internal { .. } => Span::default(),
        }
    }

    /// Whether this error rejects the left-hand side of an assignment.
    ///
    /// Tuple decomposition has its own variant but is the same class of
    /// failure as any other unsupported target.
    pub fn is_invalid_assignment_target(&self) -> bool {
        matches!(
            self,
            Self::InvalidAssignmentTarget { .. } | Self::UnsupportedTupleAssignment { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_includes_position() {
        let err = CompilationError::DuplicateLocal {
            name: "a".into(),
            span: Span::new(4, 2, 1),
        };
        assert_eq!(
            err.to_string(),
            "at 4:2: a local variable named 'a' is already defined in this scope"
        );
        assert_eq!(err.span(), Span::new(4, 2, 1));
    }

    #[test]
    fn array_element_error_cites_index() {
        let err = CompilationError::InconsistentArrayElementType {
            expected: Decl::Int,
            index: 1,
            actual: Decl::String,
            span: Span::default(),
        };
        let message = err.to_string();
        assert!(message.contains("element 1 is type String"));
        assert!(message.starts_with("at <unknown>"));
    }

    #[test]
    fn tuple_targets_are_invalid_targets() {
        assert!(CompilationError::UnsupportedTupleAssignment { span: Span::default() }
            .is_invalid_assignment_target());
        assert!(!CompilationError::Internal { message: String::new() }
            .is_invalid_assignment_target());
    }
}
