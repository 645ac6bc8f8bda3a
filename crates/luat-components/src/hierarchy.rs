// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Ancestor chains for nested and embedded components.
//!
//! When a component is embedded inside another component's markup, its
//! template sees `this` as a [`Hierarchy`]: member access resolves against
//! the innermost component only, and `parent` walks one level outward.
//!
//! Member lookup order:
//!
//! 1. a property with exactly that name (a null property counts as absent)
//! 2. a keyed entry, for map-like components
//! 3. a method named exactly that, then `get<Name>`, `is<Name>`, `has<Name>`
//!
//! Anything else fails with [`ComponentError::InvalidArgument`].

use crate::component::{normalize_method, Component};
use crate::error::{ComponentError, Result};
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// Result of looking a member up on a component.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    /// A property or keyed entry with its current value.
    Value(Value),
    /// The name of the method that implements the member.
    Method(String),
}

/// Looks `name` up on a single component.
pub fn lookup_member(component: &dyn Component, name: &str) -> Result<Member> {
    if let Some(value) = component.property(name).filter(|v| !v.is_null()) {
        return Ok(Member::Value(value));
    }

    if let Some(value) = component.offset_get(name).filter(|v| !v.is_null()) {
        return Ok(Member::Value(value));
    }

    normalize_method(component, name)
        .map(Member::Method)
        .ok_or_else(|| component.member_not_found(name))
}

/// Looks `name` up on a component and calls it when it is a method.
pub fn resolve_member(component: &dyn Component, name: &str, args: &[Value]) -> Result<Value> {
    match lookup_member(component, name)? {
        Member::Value(value) => Ok(value),
        Member::Method(method) => component.call(&method, args),
    }
}

struct Node {
    component: Rc<dyn Component>,
    parent: Option<Hierarchy>,
}

/// An immutable node in a chain of enclosing components.
///
/// Cloning is cheap; [`add`](Hierarchy::add) never mutates existing nodes.
#[derive(Clone)]
pub struct Hierarchy {
    node: Rc<Node>,
}

impl Hierarchy {
    /// Type name registered with the escaping registry.
    pub const TYPE_NAME: &'static str = "Hierarchy";

    /// Creates a root node.
    pub fn new(component: Rc<dyn Component>) -> Self {
        Self {
            node: Rc::new(Node {
                component,
                parent: None,
            }),
        }
    }

    /// Returns a new node wrapping `component` whose parent is `self`.
    pub fn add(&self, component: Rc<dyn Component>) -> Self {
        Self {
            node: Rc::new(Node {
                component,
                parent: Some(self.clone()),
            }),
        }
    }

    /// The wrapped component.
    pub fn component(&self) -> &Rc<dyn Component> {
        &self.node.component
    }

    /// The enclosing node, or `None` at the root.
    pub fn parent(&self) -> Option<&Hierarchy> {
        self.node.parent.as_ref()
    }

    /// Number of nodes from this one to the root, inclusive.
    pub fn depth(&self) -> usize {
        std::iter::successors(Some(self), |node| node.parent()).count()
    }

    /// Looks a member up on the wrapped component, never on ancestors.
    pub fn lookup(&self, name: &str) -> Result<Member> {
        lookup_member(self.node.component.as_ref(), name)
    }

    /// Resolves a member on the wrapped component, calling methods with `args`.
    pub fn resolve(&self, name: &str, args: &[Value]) -> Result<Value> {
        resolve_member(self.node.component.as_ref(), name, args)
    }

    /// Returns true if both handles point to the same node.
    pub fn ptr_eq(&self, other: &Hierarchy) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain: Vec<&str> = std::iter::successors(Some(self), |node| node.parent())
            .map(|node| node.node.component.type_name())
            .collect();
        f.debug_struct("Hierarchy").field("chain", &chain).finish()
    }
}

impl From<Hierarchy> for Value {
    fn from(hierarchy: Hierarchy) -> Self {
        Value::Hierarchy(hierarchy)
    }
}

/// Builds the `this` binding for an embedded render.
///
/// An enclosing hierarchy is extended; an enclosing component becomes the
/// root of a new chain.
pub(crate) fn extend_hierarchy(outer: &Value, component: Rc<dyn Component>) -> Result<Hierarchy> {
    let hierarchy = match outer {
        Value::Hierarchy(hierarchy) => hierarchy.clone(),
        Value::Component(outer) => Hierarchy::new(outer.clone()),
        other => {
            return Err(ComponentError::TypeError(format!(
                "cannot nest a component under a \"{}\" value bound to \"this\"",
                other.type_name()
            )))
        }
    };
    Ok(hierarchy.add(component))
}
