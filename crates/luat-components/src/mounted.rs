// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Mounted components and their static metadata.

use crate::attributes::ComponentAttributes;
use crate::component::Component;
use crate::value::{Props, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Static description of a registered component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMetadata {
    name: String,
    template: String,
    attributes_var: String,
    expose_public_props: bool,
}

impl ComponentMetadata {
    /// Creates metadata for a component.
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        attributes_var: impl Into<String>,
        expose_public_props: bool,
    ) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            attributes_var: attributes_var.into(),
            expose_public_props,
        }
    }

    /// The registered component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The template rendered for this component.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The template variable that holds the attributes bag.
    pub fn attributes_var(&self) -> &str {
        &self.attributes_var
    }

    /// Whether public properties are exposed to the template.
    pub fn is_public_props_exposed(&self) -> bool {
        self.expose_public_props
    }
}

/// A component instance prepared for one render.
///
/// The extra metadata bag carries side information such as the host
/// template of an embedded component.
#[derive(Clone)]
pub struct MountedComponent {
    name: String,
    component: Rc<dyn Component>,
    attributes: ComponentAttributes,
    input_props: Props,
    extra_metadata: BTreeMap<String, Value>,
}

impl MountedComponent {
    /// Creates a mounted component.
    pub fn new(
        name: impl Into<String>,
        component: Rc<dyn Component>,
        attributes: ComponentAttributes,
        input_props: Props,
    ) -> Self {
        Self {
            name: name.into(),
            component,
            attributes,
            input_props,
            extra_metadata: BTreeMap::new(),
        }
    }

    /// The registered component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The component instance.
    pub fn component(&self) -> &Rc<dyn Component> {
        &self.component
    }

    /// Attributes left over after mounting.
    pub fn attributes(&self) -> &ComponentAttributes {
        &self.attributes
    }

    /// The props as they were passed to the factory.
    pub fn input_props(&self) -> &Props {
        &self.input_props
    }

    /// Stores a piece of side information.
    pub fn add_extra_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra_metadata.insert(key.into(), value.into());
    }

    /// Returns true if the side information is present.
    pub fn has_extra_metadata(&self, key: &str) -> bool {
        self.extra_metadata.contains_key(key)
    }

    /// Reads a piece of side information.
    pub fn extra_metadata(&self, key: &str) -> Option<&Value> {
        self.extra_metadata.get(key)
    }
}

impl fmt::Debug for MountedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedComponent")
            .field("name", &self.name)
            .field("component", &self.component.type_name())
            .field("attributes", &self.attributes)
            .field("extra_metadata", &self.extra_metadata)
            .finish()
    }
}
