// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Block override chain shared between an embedded component and its host.

use std::cell::RefCell;
use std::rc::Rc;

/// Stack of outer block names that an embedded component may override.
///
/// The renderer only guarantees that one exists in every embedded context
/// under the `outerBlocks` variable. Clones share the same stack.
#[derive(Debug, Clone, Default)]
pub struct BlockStack {
    blocks: Rc<RefCell<Vec<String>>>,
}

impl BlockStack {
    /// Type name registered with the escaping registry.
    pub const TYPE_NAME: &'static str = "BlockStack";

    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a block name.
    pub fn push(&self, block: impl Into<String>) {
        self.blocks.borrow_mut().push(block.into());
    }

    /// Pops the most recent block name.
    pub fn pop(&self) -> Option<String> {
        self.blocks.borrow_mut().pop()
    }

    /// Returns the most recent block name.
    pub fn top(&self) -> Option<String> {
        self.blocks.borrow().last().cloned()
    }

    /// Number of blocks on the stack.
    pub fn len(&self) -> usize {
        self.blocks.borrow().len()
    }

    /// Returns true if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.borrow().is_empty()
    }
}

impl PartialEq for BlockStack {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.blocks, &other.blocks)
    }
}
