//! Compilation unit API.
//!
//! A [`Unit`] is the entry point for binding a whole program. Callers
//! register declarations, then call [`Unit::build`] once.

use magpie_compiler::{ForeignFunction, FunctionDecl, Program, UnionDecl};
use magpie_core::CompilationError;
use thiserror::Error;

/// Errors from building a unit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("unit has already been built")]
    AlreadyBuilt,

    #[error("unit has no functions")]
    NoFunctions,

    /// A declaration could not be registered.
    #[error(transparent)]
    Registration(#[from] CompilationError),

    /// One or more function bodies failed to bind.
    #[error("{} function(s) failed to bind", .0.len())]
    Binding(Vec<CompilationError>),
}

/// A program under construction.
///
/// This is the main entry point. Users:
/// 1. Create a unit with `Unit::new()` (or `Unit::without_intrinsics()`)
/// 2. Register unions and host functions
/// 3. Add function declarations
/// 4. Bind everything with `build()`
#[derive(Debug, Default)]
pub struct Unit<'ast> {
    program: Program<'ast>,
    function_count: usize,
    is_built: bool,
}

impl<'ast> Unit<'ast> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A unit without the built-in operators and string functions.
    pub fn without_intrinsics() -> Self {
        Self {
            program: Program::without_intrinsics(),
            function_count: 0,
            is_built: false,
        }
    }

    pub fn add_union(&mut self, union: UnionDecl) -> Result<(), BuildError> {
        Ok(self.program.register_union(union)?)
    }

    pub fn add_foreign(&mut self, function: ForeignFunction) -> Result<(), BuildError> {
        Ok(self.program.register_foreign(function)?)
    }

    /// Add a function declaration, generic or not.
    pub fn add_function(&mut self, decl: &'ast FunctionDecl<'ast>) -> Result<(), BuildError> {
        if decl.type_params.is_empty() {
            self.program.add_function(decl)?;
        } else {
            self.program.add_generic(decl)?;
        }
        self.function_count += 1;
        Ok(())
    }

    /// Bind every function body.
    ///
    /// # Errors
    ///
    /// Returns every binding error, one per failed function.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(&mut self) -> Result<(), BuildError> {
        if self.is_built {
            return Err(BuildError::AlreadyBuilt);
        }
        if self.function_count == 0 {
            return Err(BuildError::NoFunctions);
        }

        self.is_built = true;
        let result = self.program.bind_all();
        if result.is_success() {
            Ok(())
        } else {
            Err(BuildError::Binding(result.errors))
        }
    }

    pub fn is_built(&self) -> bool {
        self.is_built
    }

    pub fn program(&self) -> &Program<'ast> {
        &self.program
    }

    pub fn into_program(self) -> Program<'ast> {
        self.program
    }
}
