//! Local scope management for function binding.
//!
//! This module provides `LocalScope` for tracking local variables while a
//! function body is bound. It handles:
//! - Variable definition with slot allocation
//! - Nested frames for blocks, with shadowing restored on exit
//! - Parameters that alias the argument slot or one field of it
//!
//! Slots are allocated monotonically and never reused, so a function's
//! frame size is the number of slots ever allocated.

use magpie_core::{CompilationError, Decl, Span};
use rustc_hash::FxHashMap;

// ============================================================================
// Types
// ============================================================================

/// Information about a local variable.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    pub name: String,
    pub ty: Decl,
    pub slot: u32,
    /// For parameters of a multi-parameter function: the tuple field of the
    /// argument slot this name refers to.
    pub field: Option<ParamField>,
    /// Frame depth where defined.
    pub depth: u32,
    pub is_mutable: bool,
    pub span: Span,
}

/// One field of a tuple-typed slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamField {
    pub index: u8,
    /// Type of the whole tuple stored in the slot.
    pub tuple: Decl,
}

// ============================================================================
// LocalScope
// ============================================================================

/// Local variables of the function being bound.
#[derive(Debug, Default)]
pub struct LocalScope {
    /// Visible variables by name.
    variables: FxHashMap<String, LocalVar>,

    /// Current frame depth (0 = function frame).
    depth: u32,

    /// Variables hidden by a definition in a deeper frame, with the depth
    /// at which the shadowing happened.
    shadowed: Vec<(u32, String, LocalVar)>,

    next_slot: u32,
}

impl LocalScope {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Frame Management
    // ==========================================================================

    /// Enter a new frame.
    pub fn push(&mut self) {
        self.depth += 1;
    }

    /// Exit the current frame, dropping its definitions.
    pub fn pop(&mut self) {
        debug_assert!(self.depth > 0, "popped the function frame");
        let depth = self.depth;
        self.variables.retain(|_, var| var.depth < depth);

        while let Some((shadowing_depth, _, _)) = self.shadowed.last() {
            if *shadowing_depth != depth {
                break;
            }
            if let Some((_, name, var)) = self.shadowed.pop() {
                self.variables.insert(name, var);
            }
        }

        self.depth = depth.saturating_sub(1);
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    // ==========================================================================
    // Definition
    // ==========================================================================

    /// Define a local in the current frame and allocate its slot.
    ///
    /// Fails if the name is already defined in this frame. Names from outer
    /// frames are shadowed until this frame is popped.
    pub fn define(
        &mut self,
        name: &str,
        ty: Decl,
        is_mutable: bool,
        span: Span,
    ) -> Result<u32, CompilationError> {
        let slot = self.next_slot;
        self.insert(LocalVar {
            name: name.to_string(),
            ty,
            slot,
            field: None,
            depth: self.depth,
            is_mutable,
            span,
        })?;
        self.next_slot += 1;
        Ok(slot)
    }

    /// Reserve the next slot without naming it. Used for the argument slot.
    pub fn reserve_slot(&mut self) -> u32 {
        let slot = self.next_slot;
        self.next_slot += 1;
        slot
    }

    /// Define an immutable parameter that aliases `slot`, or field `field`
    /// of it. Allocates nothing.
    pub fn define_param(
        &mut self,
        name: &str,
        ty: Decl,
        slot: u32,
        field: Option<ParamField>,
        span: Span,
    ) -> Result<(), CompilationError> {
        self.insert(LocalVar {
            name: name.to_string(),
            ty,
            slot,
            field,
            depth: self.depth,
            is_mutable: false,
            span,
        })
    }

    fn insert(&mut self, var: LocalVar) -> Result<(), CompilationError> {
        if let Some(existing) = self.variables.get(&var.name) {
            if existing.depth == self.depth {
                return Err(CompilationError::DuplicateLocal {
                    name: var.name,
                    span: var.span,
                });
            }
            self.shadowed
                .push((self.depth, var.name.clone(), existing.clone()));
        }
        self.variables.insert(var.name.clone(), var);
        Ok(())
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Look up a name, innermost definition first.
    pub fn get(&self, name: &str) -> Option<&LocalVar> {
        self.variables.get(name)
    }

    /// Whether a name is defined in the current frame (not outer frames).
    pub fn is_defined_in_current_frame(&self, name: &str) -> bool {
        self.variables
            .get(name)
            .is_some_and(|v| v.depth == self.depth)
    }

    /// Number of slots allocated so far.
    pub fn num_slots(&self) -> u32 {
        self.next_slot
    }
}

// ============================================================================
// Tests
// ============================================================================
