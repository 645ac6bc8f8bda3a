// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The `computed` template variable.
//!
//! `computed.total` calls the component's `total` (or `getTotal`,
//! `isTotal`, `hasTotal`) method on every access. Nothing is memoized here;
//! a method that wants caching does it itself.

use crate::component::{normalize_method, Component};
use crate::error::Result;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// Lazy view over a component's zero-argument methods.
#[derive(Clone)]
pub struct ComputedPropertiesProxy {
    component: Rc<dyn Component>,
}

impl ComputedPropertiesProxy {
    /// Type name registered with the escaping registry.
    pub const TYPE_NAME: &'static str = "ComputedPropertiesProxy";

    /// Wraps a component.
    pub fn new(component: Rc<dyn Component>) -> Self {
        Self { component }
    }

    /// The wrapped component.
    pub fn component(&self) -> &Rc<dyn Component> {
        &self.component
    }

    /// Calls the method behind `name` without arguments.
    pub fn get(&self, name: &str) -> Result<Value> {
        let method = normalize_method(self.component.as_ref(), name)
            .ok_or_else(|| self.component.member_not_found(name))?;
        tracing::trace!("computed {}::{}", self.component.type_name(), method);
        self.component.call(&method, &[])
    }
}

impl fmt::Debug for ComputedPropertiesProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedPropertiesProxy")
            .field("component", &self.component.type_name())
            .finish()
    }
}
