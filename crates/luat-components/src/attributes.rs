// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTML attributes passed to a component.
//!
//! Props that a component does not consume become attributes. Templates
//! print the bag directly into a tag:
//!
//! ```lua
//! return "<button" .. tostring(vars.attributes:defaults({ class = "btn" })) .. ">"
//! ```
//!
//! The renderer registers [`ComponentAttributes`] as safe for the `html`
//! escaping strategy, so the rendered attributes are not escaped twice.

use crate::value::Value;
use std::fmt;

/// Escapes text for use in HTML content and double quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Ordered bag of HTML attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentAttributes {
    attributes: Vec<(String, Value)>,
}

impl ComponentAttributes {
    /// Type name registered with the escaping registry.
    pub const TYPE_NAME: &'static str = "ComponentAttributes";

    /// Creates a bag from key/value pairs, keeping their order.
    ///
    /// A repeated key replaces the earlier value in place.
    pub fn new<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut bag = Self::default();
        for (key, value) in attributes {
            bag.set(key.into(), value);
        }
        bag
    }

    fn set(&mut self, key: String, value: Value) {
        match self.attributes.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Returns the value of an attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Returns true if the attribute is present.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// All attributes in order.
    pub fn all(&self) -> &[(String, Value)] {
        &self.attributes
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Merges default attributes under the current ones.
    ///
    /// Defaults keep their position; a `class` default is prepended to the
    /// component's own class instead of being replaced.
    pub fn defaults<I, K>(&self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut merged = Self::new(defaults);
        for (key, value) in &self.attributes {
            let value = match merged.get(key) {
                Some(existing) if key == "class" => {
                    Value::String(format!("{existing} {value}"))
                }
                _ => value.clone(),
            };
            merged.set(key.clone(), value);
        }
        merged
    }

    /// Keeps only the given attributes.
    pub fn only(&self, keys: &[&str]) -> Self {
        Self {
            attributes: self
                .attributes
                .iter()
                .filter(|(key, _)| keys.contains(&key.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Removes the given attributes.
    pub fn without(&self, keys: &[&str]) -> Self {
        Self {
            attributes: self
                .attributes
                .iter()
                .filter(|(key, _)| !keys.contains(&key.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Renders the attributes as they appear inside an HTML tag.
    pub fn render(&self) -> String {
        let mut html = String::new();
        for (key, value) in &self.attributes {
            match value {
                Value::Bool(true) => {
                    html.push(' ');
                    html.push_str(key);
                }
                Value::Bool(false) | Value::Null => {}
                other => {
                    html.push_str(&format!(" {}=\"{}\"", key, escape_html(&other.to_string())));
                }
            }
        }
        html
    }
}

impl fmt::Display for ComponentAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
