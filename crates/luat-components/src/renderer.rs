// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The component render pipeline.
//!
//! [`ComponentRenderer`] ties together a [`ComponentFactory`], a
//! [`TemplateEngine`] and an [`EventDispatcher`]:
//!
//! ```text
//! create_and_render(name, props)
//!   -> PreCreateForRenderEvent   (a listener may return a finished string)
//!   -> factory.create
//!   -> render(mounted)
//!        push onto the stack
//!        build scope -> PreRenderEvent (variables/template may change)
//!        engine.render
//!        pop the stack -> PostRenderEvent   (always, even on failure)
//! ```
//!
//! The render stack is not global state: callers own a [`ComponentStack`]
//! and pass it in. Templates receive a [`ComponentRuntime`] that carries the
//! same stack into nested renders.

use crate::attributes::ComponentAttributes;
use crate::block_stack::BlockStack;
use crate::component::{DefaultPropertyAccessor, PropertyAccessor};
use crate::config::ComponentConfig;
use crate::error::{ComponentError, Result};
use crate::events::{EventDispatcher, PostRenderEvent, PreCreateForRenderEvent, PreRenderEvent};
use crate::factory::ComponentFactory;
use crate::mounted::MountedComponent;
use crate::scope::build_scope;
use crate::stack::ComponentStack;
use crate::value::{Props, Value, Variables};
use std::cell::Cell;
use std::fmt;

/// Variable that holds the block stack of an embedded render.
pub const OUTER_BLOCKS: &str = "outerBlocks";

/// Executes templates for the renderer.
pub trait TemplateEngine {
    /// Renders `template` (or its embedded block `index`) with `variables`.
    ///
    /// `runtime` lets the template render child components.
    fn render(
        &self,
        template: &str,
        index: Option<usize>,
        variables: &Variables,
        runtime: &mut dyn ComponentRuntime,
    ) -> Result<String>;

    /// Marks values of `type_name` as already escaped for `strategies`.
    fn add_safe_class(&self, type_name: &str, strategies: &[String]);
}

/// Access to the renderer from inside a running template.
pub trait ComponentRuntime {
    /// Creates and renders a child component.
    fn render_component(&mut self, name: &str, props: Props) -> Result<String>;

    /// Builds the variables of a component embedded in `host_template`.
    fn embedded_context(
        &mut self,
        name: &str,
        props: Props,
        context: Variables,
        host_template: &str,
        index: usize,
    ) -> Result<Variables>;

    /// The component rendering right now.
    fn current_component(&self) -> Option<&MountedComponent>;
}

/// Renders components by name.
pub struct ComponentRenderer<F, E> {
    factory: F,
    engine: E,
    dispatcher: EventDispatcher,
    accessor: Box<dyn PropertyAccessor>,
    safe_strategies: Vec<String>,
    safe_classes_registered: Cell<bool>,
}

impl<F: ComponentFactory, E: TemplateEngine> ComponentRenderer<F, E> {
    /// Creates a renderer with default settings.
    pub fn new(factory: F, engine: E) -> Self {
        Self::with_config(factory, engine, &ComponentConfig::default())
    }

    /// Creates a renderer using the escaping settings of `config`.
    pub fn with_config(factory: F, engine: E, config: &ComponentConfig) -> Self {
        Self {
            factory,
            engine,
            dispatcher: EventDispatcher::new(),
            accessor: Box::new(DefaultPropertyAccessor),
            safe_strategies: config.escaping.safe_strategies.clone(),
            safe_classes_registered: Cell::new(false),
        }
    }

    /// Replaces the property accessor used for exposed properties.
    pub fn with_property_accessor(mut self, accessor: impl PropertyAccessor + 'static) -> Self {
        self.accessor = Box::new(accessor);
        self
    }

    /// The event dispatcher.
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Mutable access to the event dispatcher, for registering listeners.
    pub fn dispatcher_mut(&mut self) -> &mut EventDispatcher {
        &mut self.dispatcher
    }

    /// The component factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The template engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Renders a component with a fresh stack.
    pub fn render_component(&self, name: &str, props: Props) -> Result<String> {
        let mut stack = ComponentStack::new();
        self.create_and_render(&mut stack, name, props)
    }

    /// Creates the component `name` and renders it.
    ///
    /// A [`PreCreateForRenderEvent`] listener that sets a rendered string
    /// short-circuits the render: the string is returned and no component
    /// is created.
    pub fn create_and_render(
        &self,
        stack: &mut ComponentStack,
        name: &str,
        props: Props,
    ) -> Result<String> {
        let event = self
            .dispatcher
            .dispatch(PreCreateForRenderEvent::new(name, props))?;
        let (name, props, rendered) = event.into_parts();

        if let Some(rendered) = rendered {
            tracing::debug!("render of component {} short-circuited", name);
            return Ok(rendered);
        }

        let mounted = self.factory.create(&name, props)?;
        self.render(stack, mounted)
    }

    /// Renders a mounted component.
    ///
    /// The component stays on `stack` while its template runs. Afterwards
    /// it is popped and a [`PostRenderEvent`] is dispatched, whether the
    /// render succeeded or not. If both the render and a post-render
    /// listener fail, the render error is returned wrapped in
    /// [`ComponentError::PostRenderFailed`] with the listener error attached.
    pub fn render(&self, stack: &mut ComponentStack, mounted: MountedComponent) -> Result<String> {
        tracing::debug!("rendering component {} (depth {})", mounted.name(), stack.len() + 1);

        let result = {
            let mut frame = stack.enter(mounted.clone());
            self.execute(&mut frame, &mounted)
        };

        let post_render = self.dispatcher.dispatch(PostRenderEvent::new(mounted));
        match (result, post_render) {
            (Ok(output), Ok(_)) => Ok(output),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(_)) => Err(err),
            (Err(err), Err(listener)) => {
                tracing::warn!("post render listener failed after a render error: {}", listener);
                Err(ComponentError::PostRenderFailed {
                    error: Box::new(err),
                    listener: Box::new(listener),
                })
            }
        }
    }

    fn execute(&self, stack: &mut ComponentStack, mounted: &MountedComponent) -> Result<String> {
        let event = self.pre_render(mounted, Variables::new())?;
        let (template, index, variables) = event.into_parts();

        let mut runtime = RenderRuntime {
            renderer: self,
            stack,
        };
        self.engine.render(&template, index, &variables, &mut runtime)
    }

    /// Builds the variables for a component embedded in a host template.
    ///
    /// The context is marked as embedded, so an enclosing `this` turns into
    /// a [`Hierarchy`](crate::Hierarchy). The host template and block index
    /// are recorded on the mounted component. The returned variables always
    /// contain a block stack under [`OUTER_BLOCKS`].
    pub fn embedded_context(
        &self,
        name: &str,
        props: Props,
        mut context: Variables,
        host_template: &str,
        index: usize,
    ) -> Result<Variables> {
        context.insert(PreRenderEvent::EMBEDDED.to_string(), Value::Bool(true));

        let mut mounted = self.factory.create(name, props)?;
        mounted.add_extra_metadata("hostTemplate", host_template);
        mounted.add_extra_metadata("embeddedTemplateIndex", index as i64);

        let (_, _, mut variables) = self.pre_render(&mounted, context)?.into_parts();
        variables
            .entry(OUTER_BLOCKS.to_string())
            .or_insert_with(|| Value::BlockStack(BlockStack::new()));

        Ok(variables)
    }

    fn pre_render(&self, mounted: &MountedComponent, context: Variables) -> Result<PreRenderEvent> {
        self.register_safe_classes();

        let metadata = self.factory.metadata_for(mounted.name())?;
        let variables = build_scope(mounted, &metadata, context, self.accessor.as_ref())?;

        self.dispatcher
            .dispatch(PreRenderEvent::new(mounted.clone(), metadata, variables))
    }

    fn register_safe_classes(&self) {
        if self.safe_classes_registered.get() {
            return;
        }

        self.engine
            .add_safe_class(ComponentAttributes::TYPE_NAME, &self.safe_strategies);
        self.safe_classes_registered.set(true);
    }
}

impl<F: fmt::Debug, E: fmt::Debug> fmt::Debug for ComponentRenderer<F, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRenderer")
            .field("factory", &self.factory)
            .field("engine", &self.engine)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// The [`ComponentRuntime`] handed to templates during [`ComponentRenderer::render`].
struct RenderRuntime<'a, F, E> {
    renderer: &'a ComponentRenderer<F, E>,
    stack: &'a mut ComponentStack,
}

impl<F: ComponentFactory, E: TemplateEngine> ComponentRuntime for RenderRuntime<'_, F, E> {
    fn render_component(&mut self, name: &str, props: Props) -> Result<String> {
        self.renderer.create_and_render(self.stack, name, props)
    }

    fn embedded_context(
        &mut self,
        name: &str,
        props: Props,
        context: Variables,
        host_template: &str,
        index: usize,
    ) -> Result<Variables> {
        self.renderer
            .embedded_context(name, props, context, host_template, index)
    }

    fn current_component(&self) -> Option<&MountedComponent> {
        self.stack.current()
    }
}
