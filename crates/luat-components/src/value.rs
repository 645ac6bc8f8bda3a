// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Dynamic values exchanged between components and templates.
//!
//! A [`Value`] is either plain data (the JSON-like variants) or a reference to
//! one of the objects the renderer places into a template scope: a component,
//! a [`Hierarchy`], the computed-properties proxy, an attributes bag or the
//! block stack placeholder.

use crate::attributes::ComponentAttributes;
use crate::block_stack::BlockStack;
use crate::component::Component;
use crate::computed::ComputedPropertiesProxy;
use crate::hierarchy::Hierarchy;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Props passed to a component when it is created.
pub type Props = BTreeMap<String, Value>;

/// The name to value bindings visible to one template execution.
pub type Variables = BTreeMap<String, Value>;

/// A dynamic value.
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// An ordered list.
    List(Vec<Value>),
    /// A string keyed map.
    Map(BTreeMap<String, Value>),
    /// A component instance.
    Component(Rc<dyn Component>),
    /// A component together with its enclosing components.
    Hierarchy(Hierarchy),
    /// Lazy access to a component's zero-argument methods.
    Computed(ComputedPropertiesProxy),
    /// An HTML attributes bag.
    Attributes(ComponentAttributes),
    /// Block override chain used by embedded components.
    BlockStack(BlockStack),
}

impl Value {
    /// Returns a name describing the concrete type of the value.
    ///
    /// Component variants report the concrete component type, which is what
    /// error messages and the escaping registry key on.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Component(component) => component.type_name(),
            Value::Hierarchy(_) => Hierarchy::TYPE_NAME,
            Value::Computed(_) => ComputedPropertiesProxy::TYPE_NAME,
            Value::Attributes(_) => ComponentAttributes::TYPE_NAME,
            Value::BlockStack(_) => BlockStack::TYPE_NAME,
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for null, booleans, numbers and strings.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
        )
    }

    /// Returns the string slice for [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean for [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer for [`Value::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the map for [`Value::Map`].
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Component(a), Value::Component(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            (Value::Hierarchy(a), Value::Hierarchy(b)) => a.ptr_eq(b),
            (Value::Computed(a), Value::Computed(b)) => std::ptr::addr_eq(
                Rc::as_ptr(a.component()),
                Rc::as_ptr(b.component()),
            ),
            (Value::Attributes(a), Value::Attributes(b)) => a == b,
            (Value::BlockStack(a), Value::BlockStack(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(n) => write!(f, "Float({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Value::Component(component) => write!(f, "Component({})", component.type_name()),
            Value::Hierarchy(hierarchy) => write!(f, "{hierarchy:?}"),
            Value::Computed(proxy) => write!(f, "{proxy:?}"),
            Value::Attributes(attributes) => write!(f, "{attributes:?}"),
            Value::BlockStack(blocks) => write!(f, "{blocks:?}"),
        }
    }
}

/// Template output form of a value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Map(_) => f.write_str("[map]"),
            Value::Attributes(attributes) => write!(f, "{attributes}"),
            other => f.write_str(other.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<Rc<dyn Component>> for Value {
    fn from(component: Rc<dyn Component>) -> Self {
        Value::Component(component)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Builds [`Props`] from a JSON object.
///
/// Non-object JSON yields empty props.
///
/// # Examples
///
/// ```rust,ignore
/// let props = props_from_json(serde_json::json!({ "type": "success" }));
/// assert_eq!(props["type"], Value::from("success"));
/// ```
pub fn props_from_json(json: serde_json::Value) -> Props {
    match Value::from(json) {
        Value::Map(map) => map,
        _ => Props::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_conversion_keeps_structure() {
        let value = Value::from(json!({
            "title": "Hello",
            "count": 3,
            "ratio": 0.5,
            "tags": ["a", "b"],
            "missing": null
        }));

        let map = value.as_map().unwrap();
        assert_eq!(map["title"], Value::from("Hello"));
        assert_eq!(map["count"], Value::Int(3));
        assert_eq!(map["ratio"], Value::Float(0.5));
        assert_eq!(map["tags"], Value::from(vec!["a", "b"]));
        assert!(map["missing"].is_null());
    }

    #[test]
    fn test_props_from_non_object_is_empty() {
        assert!(props_from_json(json!([1, 2])).is_empty());
    }

    #[test]
    fn test_display_renders_template_output() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "1, 2");
        assert_eq!(Value::from("x").to_string(), "x");
    }

    #[test]
    fn test_scalar_detection() {
        assert!(Value::from("a").is_scalar());
        assert!(Value::Null.is_scalar());
        assert!(!Value::from(vec![1]).is_scalar());
    }
}
