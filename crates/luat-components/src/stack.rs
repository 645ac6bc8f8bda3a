// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The stack of components currently being rendered.
//!
//! The stack is an explicit value owned by the caller and threaded through
//! every render call, so nested renders see their ancestors without any
//! global state.

use crate::mounted::MountedComponent;
use std::ops::{Deref, DerefMut};

/// Last-in-first-out stack of mounted components.
#[derive(Debug, Default)]
pub struct ComponentStack {
    components: Vec<MountedComponent>,
}

impl ComponentStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a component.
    pub fn push(&mut self, mounted: MountedComponent) {
        tracing::trace!("push {} (depth {})", mounted.name(), self.components.len() + 1);
        self.components.push(mounted);
    }

    /// Pops the top component.
    pub fn pop(&mut self) -> Option<MountedComponent> {
        let popped = self.components.pop();
        if let Some(mounted) = &popped {
            tracing::trace!("pop {} (depth {})", mounted.name(), self.components.len());
        }
        popped
    }

    /// The component rendering right now.
    pub fn current(&self) -> Option<&MountedComponent> {
        self.components.last()
    }

    /// The component that started the current render.
    pub fn parent(&self) -> Option<&MountedComponent> {
        self.components.iter().rev().nth(1)
    }

    /// Returns true if the current component has a parent on the stack.
    pub fn has_parent(&self) -> bool {
        self.parent().is_some()
    }

    /// Stack depth.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if nothing is rendering.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Pushes `mounted` and returns a guard that pops it when dropped.
    ///
    /// The guard dereferences to the stack so nested renders can keep using
    /// it while the frame is alive. The pop also happens during unwinding.
    pub fn enter(&mut self, mounted: MountedComponent) -> StackFrame<'_> {
        self.push(mounted);
        StackFrame { stack: self }
    }
}

/// Scoped stack entry created by [`ComponentStack::enter`].
#[derive(Debug)]
pub struct StackFrame<'s> {
    stack: &'s mut ComponentStack,
}

impl Deref for StackFrame<'_> {
    type Target = ComponentStack;

    fn deref(&self) -> &ComponentStack {
        self.stack
    }
}

impl DerefMut for StackFrame<'_> {
    fn deref_mut(&mut self) -> &mut ComponentStack {
        self.stack
    }
}

impl Drop for StackFrame<'_> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}
