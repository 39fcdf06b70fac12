//! The lexical scope chain used during lowering.
//!
//! Scopes form a stack of frames: `push` opens a frame, `pop` closes the
//! innermost one, `add` always writes into the innermost frame and `find`
//! walks from the innermost frame toward the root. The root frame holds
//! function bindings and outlives every function body; popping it is a
//! fatal error.

use std::collections::HashMap;

use super::binding::Binding;
use super::error::CodegenError;

/// A stack of name→binding frames.
///
/// Frames are owned by the chain itself (an arena-style stack indexed from
/// the top), so a popped frame is gone for good; there is no way to hold on
/// to a stale frame reference across a pop.
pub(super) struct ScopeChain<'ctx> {
    frames: Vec<HashMap<String, Binding<'ctx>>>,
}

impl<'ctx> ScopeChain<'ctx> {
    /// Creates a chain holding only the root frame.
    pub(super) fn new() -> Self {
        ScopeChain {
            frames: vec![HashMap::new()],
        }
    }

    /// Opens a new, empty innermost frame.
    pub(super) fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Closes the innermost frame.
    ///
    /// # Errors
    ///
    /// Popping the root frame is a fatal error.
    pub(super) fn pop(&mut self) -> Result<(), CodegenError> {
        if self.frames.len() == 1 {
            return Err(CodegenError::new("Can't pop root scope!"));
        }
        self.frames.pop();
        Ok(())
    }

    /// Binds `name` in the innermost frame, shadowing any outer binding.
    pub(super) fn add(&mut self, name: impl Into<String>, binding: Binding<'ctx>) {
        // new() guarantees at least the root frame.
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), binding);
        }
    }

    /// Looks `name` up, walking from the innermost frame toward the root.
    ///
    /// Returns the nearest enclosing binding, or `None`.
    pub(super) fn find(&self, name: &str) -> Option<&Binding<'ctx>> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}
