// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Render lifecycle events and their dispatcher.
//!
//! The renderer dispatches three events per render:
//!
//! - [`PreCreateForRenderEvent`] before a component is created; a listener
//!   may supply the rendered string and skip the rest of the pipeline
//! - [`PreRenderEvent`] once the variables are built; listeners may change
//!   the variables or the template
//! - [`PostRenderEvent`] after the template ran, whether it failed or not
//!
//! Listeners run synchronously in registration order and get exclusive
//! access to the event. A failing listener stops the dispatch and its error
//! propagates to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut dispatcher = EventDispatcher::new();
//! dispatcher.listen(|event: &mut PreCreateForRenderEvent| {
//!     if event.name() == "cached_banner" {
//!         event.set_rendered_string("<div>cached</div>");
//!     }
//!     Ok(())
//! });
//! ```

use crate::error::Result;
use crate::mounted::{ComponentMetadata, MountedComponent};
use crate::value::{Props, Variables};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// An event that can be dispatched.
pub trait Event: Any {
    /// Event name used in logs.
    const NAME: &'static str;
}

type Listener = Box<dyn Fn(&mut dyn Any) -> Result<()>>;

/// Synchronous, typed event dispatcher.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: HashMap<TypeId, Vec<Listener>>,
}

impl EventDispatcher {
    /// Creates a dispatcher without listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for events of type `E`.
    pub fn listen<E, F>(&mut self, listener: F)
    where
        E: Event,
        F: Fn(&mut E) -> Result<()> + 'static,
    {
        let listener: Listener = Box::new(move |event: &mut dyn Any| {
            match event.downcast_mut::<E>() {
                Some(event) => listener(event),
                None => Ok(()),
            }
        });
        self.listeners.entry(TypeId::of::<E>()).or_default().push(listener);
    }

    /// Number of listeners registered for `E`.
    pub fn listener_count<E: Event>(&self) -> usize {
        self.listeners.get(&TypeId::of::<E>()).map_or(0, Vec::len)
    }

    /// Runs every listener for `E` in order and hands the event back.
    pub fn dispatch<E: Event>(&self, mut event: E) -> Result<E> {
        let Some(listeners) = self.listeners.get(&TypeId::of::<E>()) else {
            return Ok(event);
        };

        tracing::trace!("dispatching {} to {} listener(s)", E::NAME, listeners.len());
        for listener in listeners {
            listener(&mut event)?;
        }
        Ok(event)
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("event_types", &self.listeners.len())
            .finish()
    }
}

/// Dispatched before a component is created for a top-level render.
#[derive(Debug, Clone)]
pub struct PreCreateForRenderEvent {
    name: String,
    props: Props,
    rendered_string: Option<String>,
}

impl Event for PreCreateForRenderEvent {
    const NAME: &'static str = "pre_create_for_render";
}

impl PreCreateForRenderEvent {
    /// Creates the event.
    pub fn new(name: impl Into<String>, props: Props) -> Self {
        Self {
            name: name.into(),
            props,
            rendered_string: None,
        }
    }

    /// The requested component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The requested props.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Short-circuits the render with a finished string.
    pub fn set_rendered_string(&mut self, rendered: impl Into<String>) {
        self.rendered_string = Some(rendered.into());
    }

    /// The string supplied by a listener, if any.
    pub fn rendered_string(&self) -> Option<&str> {
        self.rendered_string.as_deref()
    }

    pub(crate) fn into_parts(self) -> (String, Props, Option<String>) {
        (self.name, self.props, self.rendered_string)
    }
}

/// Dispatched once the variables of a render are built.
#[derive(Debug, Clone)]
pub struct PreRenderEvent {
    mounted: MountedComponent,
    metadata: ComponentMetadata,
    variables: Variables,
    template: String,
    template_index: Option<usize>,
}

impl Event for PreRenderEvent {
    const NAME: &'static str = "pre_render";
}

impl PreRenderEvent {
    /// Context key marking a render as embedded in a host template.
    pub const EMBEDDED: &'static str = "__embedded";

    /// Creates the event with the metadata's template.
    pub fn new(mounted: MountedComponent, metadata: ComponentMetadata, variables: Variables) -> Self {
        let template = metadata.template().to_string();
        Self {
            mounted,
            metadata,
            variables,
            template,
            template_index: None,
        }
    }

    /// The component being rendered.
    pub fn mounted(&self) -> &MountedComponent {
        &self.mounted
    }

    /// The component's metadata.
    pub fn metadata(&self) -> &ComponentMetadata {
        &self.metadata
    }

    /// Returns true when the render is embedded in a host template.
    pub fn is_embedded(&self) -> bool {
        self.variables
            .get(Self::EMBEDDED)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// The template variables.
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Mutable access to the template variables.
    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }

    /// Replaces the template variables.
    pub fn set_variables(&mut self, variables: Variables) {
        self.variables = variables;
    }

    /// The template that will be executed.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Changes the template that will be executed.
    pub fn set_template(&mut self, template: impl Into<String>, index: Option<usize>) {
        self.template = template.into();
        self.template_index = index;
    }

    /// The block index inside the template, if any.
    pub fn template_index(&self) -> Option<usize> {
        self.template_index
    }

    pub(crate) fn into_parts(self) -> (String, Option<usize>, Variables) {
        (self.template, self.template_index, self.variables)
    }
}

/// Dispatched after a render finished, successfully or not.
#[derive(Debug, Clone)]
pub struct PostRenderEvent {
    mounted: MountedComponent,
}

impl Event for PostRenderEvent {
    const NAME: &'static str = "post_render";
}

impl PostRenderEvent {
    /// Creates the event.
    pub fn new(mounted: MountedComponent) -> Self {
        Self { mounted }
    }

    /// The component that was rendered.
    pub fn mounted(&self) -> &MountedComponent {
        &self.mounted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComponentError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_listeners_run_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();

        for label in ["first", "second"] {
            let seen = seen.clone();
            dispatcher.listen(move |event: &mut PreCreateForRenderEvent| {
                seen.borrow_mut().push(format!("{label}:{}", event.name()));
                Ok(())
            });
        }

        dispatcher
            .dispatch(PreCreateForRenderEvent::new("alert", Props::new()))
            .unwrap();
        assert_eq!(*seen.borrow(), vec!["first:alert", "second:alert"]);
    }

    #[test]
    fn test_listener_mutation_is_visible_after_dispatch() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.listen(|event: &mut PreCreateForRenderEvent| {
            event.set_rendered_string("short");
            Ok(())
        });

        let event = dispatcher
            .dispatch(PreCreateForRenderEvent::new("alert", Props::new()))
            .unwrap();
        assert_eq!(event.rendered_string(), Some("short"));
    }

    #[test]
    fn test_listeners_only_receive_their_event_type() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.listen(|_: &mut PostRenderEvent| Err(ComponentError::Logic("no".into())));

        assert_eq!(dispatcher.listener_count::<PostRenderEvent>(), 1);
        assert_eq!(dispatcher.listener_count::<PreCreateForRenderEvent>(), 0);
        assert!(dispatcher
            .dispatch(PreCreateForRenderEvent::new("alert", Props::new()))
            .is_ok());
    }

    #[test]
    fn test_failing_listener_stops_dispatch() {
        let calls = Rc::new(RefCell::new(0));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.listen(|_: &mut PreCreateForRenderEvent| Err(ComponentError::Logic("stop".into())));
        let counter = calls.clone();
        dispatcher.listen(move |_: &mut PreCreateForRenderEvent| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        assert!(dispatcher
            .dispatch(PreCreateForRenderEvent::new("alert", Props::new()))
            .is_err());
        assert_eq!(*calls.borrow(), 0);
    }
}
