// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Component creation.
//!
//! The renderer asks a [`ComponentFactory`] to mount components by name.
//! [`ComponentRegistry`] is the in-process implementation: definitions are
//! registered up front with a constructor, and their metadata is computed
//! once at registration time.
//!
//! # Mounting
//!
//! 1. The prop named after the attributes variable seeds the attributes.
//! 2. The constructor removes the props it recognizes.
//! 3. Every prop left over becomes an attribute; it must be a scalar.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut registry = ComponentRegistry::new(ComponentConfig::default());
//! registry.register(ComponentDefinition::new("alert", |props| {
//!     let message = props.remove("message").unwrap_or_default();
//!     Ok(Rc::new(Alert { message: message.to_string() }) as Rc<dyn Component>)
//! }));
//! ```

use crate::attributes::ComponentAttributes;
use crate::component::Component;
use crate::config::ComponentConfig;
use crate::error::{ComponentError, Result};
use crate::mounted::{ComponentMetadata, MountedComponent};
use crate::value::{Props, Value};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Builds mounted components and describes them.
pub trait ComponentFactory {
    /// Creates and mounts the component registered under `name`.
    fn create(&self, name: &str, props: Props) -> Result<MountedComponent>;

    /// Returns the metadata of the component registered under `name`.
    fn metadata_for(&self, name: &str) -> Result<ComponentMetadata>;
}

/// Constructor taking the props it recognizes out of the map.
pub type Constructor = Box<dyn Fn(&mut Props) -> Result<Rc<dyn Component>>>;

/// A component definition awaiting registration.
pub struct ComponentDefinition {
    name: String,
    constructor: Constructor,
    template: Option<String>,
    attributes_var: Option<String>,
    expose_public_props: Option<bool>,
}

impl ComponentDefinition {
    /// Creates a definition; unset options fall back to the configuration.
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&mut Props) -> Result<Rc<dyn Component>> + 'static,
    {
        Self {
            name: name.into(),
            constructor: Box::new(constructor),
            template: None,
            attributes_var: None,
            expose_public_props: None,
        }
    }

    /// Uses a custom template instead of the derived one.
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Uses a custom variable name for the attributes bag.
    pub fn attributes_var(mut self, name: impl Into<String>) -> Self {
        self.attributes_var = Some(name.into());
        self
    }

    /// Enables or disables exposing public properties.
    pub fn expose_public_props(mut self, expose: bool) -> Self {
        self.expose_public_props = Some(expose);
        self
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

struct Registered {
    metadata: ComponentMetadata,
    constructor: Constructor,
}

/// A template-only component whose props are all public properties.
#[derive(Debug, Default)]
pub struct AnonymousComponent {
    props: Props,
}

impl AnonymousComponent {
    /// Creates an anonymous component over the given props.
    pub fn new(props: Props) -> Self {
        Self { props }
    }
}

impl Component for AnonymousComponent {
    fn type_name(&self) -> &'static str {
        "AnonymousComponent"
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.props.get(name).cloned()
    }

    fn public_properties(&self) -> Vec<(String, Value)> {
        self.props
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// Predicate telling whether an anonymous template exists.
pub type TemplateExists = Box<dyn Fn(&str) -> bool>;

/// In-process [`ComponentFactory`] backed by registered definitions.
pub struct ComponentRegistry {
    config: ComponentConfig,
    definitions: HashMap<String, Registered>,
    anonymous_lookup: Option<TemplateExists>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new(config: ComponentConfig) -> Self {
        Self {
            config,
            definitions: HashMap::new(),
            anonymous_lookup: None,
        }
    }

    /// The configuration used for defaults.
    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    /// Registers a definition, replacing any previous one with that name.
    pub fn register(&mut self, definition: ComponentDefinition) -> &mut Self {
        let defaults = &self.config.components;
        let template = definition
            .template
            .unwrap_or_else(|| self.config.template_for(&definition.name));
        let metadata = ComponentMetadata::new(
            definition.name.clone(),
            template,
            definition
                .attributes_var
                .unwrap_or_else(|| defaults.attributes_var.clone()),
            definition
                .expose_public_props
                .unwrap_or(defaults.expose_public_props),
        );

        tracing::debug!("registered component {} -> {}", metadata.name(), metadata.template());
        self.definitions.insert(
            definition.name,
            Registered {
                metadata,
                constructor: definition.constructor,
            },
        );
        self
    }

    /// Enables anonymous components; `exists` is asked about derived template names.
    pub fn with_anonymous_lookup<F>(mut self, exists: F) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        self.anonymous_lookup = Some(Box::new(exists));
        self
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn anonymous_template(&self, name: &str) -> Option<String> {
        let exists = self.anonymous_lookup.as_ref()?;
        self.config
            .anonymous_template_for(name)
            .filter(|template| exists(template))
    }

    fn unknown(&self, name: &str) -> ComponentError {
        ComponentError::UnknownComponent {
            name: name.to_string(),
            known: self.names().join(", "),
        }
    }

    fn seed_attributes(metadata: &ComponentMetadata, props: &mut Props) -> Result<Vec<(String, Value)>> {
        match props.remove(metadata.attributes_var()) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Map(map)) => Ok(map.into_iter().collect()),
            Some(Value::Attributes(attributes)) => Ok(attributes.all().to_vec()),
            Some(other) => Err(ComponentError::TypeError(format!(
                "the \"{}\" prop of component \"{}\" must be a map, got {}",
                metadata.attributes_var(),
                metadata.name(),
                other.type_name()
            ))),
        }
    }
}

impl ComponentFactory for ComponentRegistry {
    fn create(&self, name: &str, props: Props) -> Result<MountedComponent> {
        let metadata = self.metadata_for(name)?;
        let input_props = props.clone();
        let mut props = props;
        let mut attributes = Self::seed_attributes(&metadata, &mut props)?;

        let component: Rc<dyn Component> = match self.definitions.get(name) {
            Some(registered) => (registered.constructor)(&mut props)?,
            None => Rc::new(AnonymousComponent::new(std::mem::take(&mut props))),
        };

        for (key, value) in props {
            if !value.is_scalar() {
                return Err(ComponentError::Logic(format!(
                    "Unable to use \"{}\" ({}) as an attribute. Attributes must be scalar or null. \
                     Did you forget to consume it in the constructor of \"{}\"?",
                    key,
                    value.type_name(),
                    name
                )));
            }
            attributes.push((key, value));
        }

        tracing::debug!("mounted component {} ({})", name, component.type_name());
        Ok(MountedComponent::new(
            name,
            component,
            ComponentAttributes::new(attributes),
            input_props,
        ))
    }

    fn metadata_for(&self, name: &str) -> Result<ComponentMetadata> {
        if let Some(registered) = self.definitions.get(name) {
            return Ok(registered.metadata.clone());
        }

        match self.anonymous_template(name) {
            Some(template) => Ok(ComponentMetadata::new(
                name,
                template,
                self.config.components.attributes_var.clone(),
                true,
            )),
            None => Err(self.unknown(name)),
        }
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .field("anonymous", &self.anonymous_lookup.is_some())
            .finish()
    }
}
