// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The component capability interface.
//!
//! Components are plain Rust types that describe themselves to the renderer
//! through the [`Component`] trait: which properties can be read, which
//! methods can be called, and which members are exposed to templates. The
//! exposure table is a `&'static` slice so it is declared once per type.
//!
//! # Example
//!
//! ```rust,ignore
//! use luat_components::{Component, ExposeInTemplate, Result, Value};
//!
//! #[derive(Debug)]
//! struct Alert {
//!     message: String,
//! }
//!
//! impl Component for Alert {
//!     fn property(&self, name: &str) -> Option<Value> {
//!         match name {
//!             "message" => Some(self.message.clone().into()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn public_properties(&self) -> Vec<(String, Value)> {
//!         vec![("message".into(), self.message.clone().into())]
//!     }
//!
//!     fn method_names(&self) -> &'static [&'static str] {
//!         &["getIcon"]
//!     }
//!
//!     fn call(&self, method: &str, _args: &[Value]) -> Result<Value> {
//!         match method {
//!             "getIcon" => Ok("bell".into()),
//!             _ => Err(self.member_not_found(method)),
//!         }
//!     }
//!
//!     fn exposed(&self) -> &'static [ExposeInTemplate] {
//!         const EXPOSED: &[ExposeInTemplate] = &[ExposeInTemplate::method("getIcon")];
//!         EXPOSED
//!     }
//! }
//! ```

use crate::error::{ComponentError, Result};
use crate::value::Value;
use std::fmt;

/// A server-rendered view model bound to a template.
///
/// Every method has a default, so a component only describes the members it
/// actually has. Methods take `&self`; components that count or cache use
/// interior mutability.
pub trait Component: fmt::Debug + 'static {
    /// Concrete type name used in error messages.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Reads a property by name. `None` when the property does not exist
    /// or is not readable.
    fn property(&self, _name: &str) -> Option<Value> {
        None
    }

    /// All public properties in declaration order.
    fn public_properties(&self) -> Vec<(String, Value)> {
        Vec::new()
    }

    /// Keyed access for map-like components.
    fn offset_get(&self, _key: &str) -> Option<Value> {
        None
    }

    /// Names of the methods [`call`](Self::call) accepts.
    fn method_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Returns true if `name` is a callable method.
    fn has_method(&self, name: &str) -> bool {
        self.method_names().contains(&name)
    }

    /// Invokes a method with the given arguments.
    fn call(&self, method: &str, _args: &[Value]) -> Result<Value> {
        Err(self.member_not_found(method))
    }

    /// Members exposed to templates in addition to public properties.
    fn exposed(&self) -> &'static [ExposeInTemplate] {
        &[]
    }

    /// The error returned when a member does not exist on this component.
    fn member_not_found(&self, member: &str) -> ComponentError {
        ComponentError::member_not_found(self.type_name(), member)
    }
}

/// What an [`ExposeInTemplate`] entry reads from the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposeTarget {
    /// A declared property, read through an optional getter method.
    Property {
        /// The property name.
        property: &'static str,
        /// Getter method name; trailing `()` is ignored.
        getter: Option<&'static str>,
    },
    /// A public method whose return value is exposed.
    Method {
        /// The method name.
        method: &'static str,
        /// Number of parameters the method requires.
        required_params: usize,
    },
}

/// Declares a property or method that is exposed to the template scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposeInTemplate {
    /// Variable name in the template; defaults to the member name.
    pub name: Option<&'static str>,
    /// The exposed member.
    pub target: ExposeTarget,
}

impl ExposeInTemplate {
    /// Exposes a property under its own name.
    pub const fn property(property: &'static str) -> Self {
        Self {
            name: None,
            target: ExposeTarget::Property {
                property,
                getter: None,
            },
        }
    }

    /// Exposes a zero-argument method.
    pub const fn method(method: &'static str) -> Self {
        Self {
            name: None,
            target: ExposeTarget::Method {
                method,
                required_params: 0,
            },
        }
    }

    /// Sets the variable name.
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Reads a property through the given getter method.
    pub const fn with_getter(mut self, getter: &'static str) -> Self {
        if let ExposeTarget::Property { property, .. } = self.target {
            self.target = ExposeTarget::Property {
                property,
                getter: Some(getter),
            };
        }
        self
    }

    /// Declares how many parameters an exposed method requires.
    pub const fn with_required_params(mut self, count: usize) -> Self {
        if let ExposeTarget::Method { method, .. } = self.target {
            self.target = ExposeTarget::Method {
                method,
                required_params: count,
            };
        }
        self
    }
}

/// Uppercases the first character of `name`.
pub fn ucfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercases the first character of `name`.
pub fn lcfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Maps a member name to the method that implements it.
///
/// Tries the exact name, then `get<Name>`, `is<Name>` and `has<Name>`.
pub fn normalize_method(component: &dyn Component, name: &str) -> Option<String> {
    if component.has_method(name) {
        return Some(name.to_string());
    }

    let suffix = ucfirst(name);
    ["get", "is", "has"]
        .iter()
        .map(|prefix| format!("{prefix}{suffix}"))
        .find(|method| component.has_method(method))
}

/// Generic read of a named property.
pub trait PropertyAccessor {
    /// Returns the current value of `property` on `component`.
    fn get_value(&self, component: &dyn Component, property: &str) -> Result<Value>;
}

/// Reads properties directly, falling back to getter methods.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPropertyAccessor;

impl PropertyAccessor for DefaultPropertyAccessor {
    fn get_value(&self, component: &dyn Component, property: &str) -> Result<Value> {
        if let Some(value) = component.property(property) {
            return Ok(value);
        }

        match normalize_method(component, property) {
            Some(method) => component.call(&method, &[]),
            None => Err(ComponentError::NoSuchProperty {
                component: component.type_name().to_string(),
                property: property.to_string(),
            }),
        }
    }
}
