// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]
// ComponentError carries the Lua error chain for debugging.
#![allow(clippy::result_large_err)]

//! # luat-components
//!
//! Reusable server-rendered components for Lua templates.
//!
//! A component is a Rust type implementing [`Component`], registered under a
//! name with a [`ComponentRegistry`] and rendered through a
//! [`ComponentRenderer`]. Each render builds a variable scope from the
//! component (`this`, `computed`, the attributes bag and the exposed
//! members), lets event listeners adjust it, and runs the component's
//! template.
//!
//! ## Features
//!
//! - Typed render events with short-circuiting and template overrides
//! - Embedded components whose `this` walks outward through a [`Hierarchy`]
//! - HTML attribute bags with default merging
//! - Sandboxed Lua templates with a compiled module cache
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use luat_components::*;
//!
//! let config = ComponentConfig::default();
//! let mut registry = ComponentRegistry::new(config.clone());
//! registry.register(ComponentDefinition::new("alert", |props| {
//!     Ok(Rc::new(Alert::from_props(props)) as Rc<dyn Component>)
//! }));
//!
//! let engine = LuaTemplateEngine::from_config(FileSystemResolver::new("./templates"), &config)?;
//! let renderer = ComponentRenderer::with_config(registry, engine, &config);
//! let html = renderer.render_component("alert", props_from_json(json!({ "type": "success" })))?;
//! ```

/// Error types.
pub mod error;
/// Dynamic values and prop maps.
pub mod value;
/// The component capability interface.
pub mod component;
/// HTML attribute bags.
pub mod attributes;
/// Block stack placeholder for embedded renders.
pub mod block_stack;
/// Ancestor chains for embedded components.
pub mod hierarchy;
/// The `computed` proxy.
pub mod computed;
/// Component metadata and mounted instances.
pub mod mounted;
/// The render stack.
pub mod stack;
/// Render lifecycle events.
pub mod events;
/// TOML configuration.
pub mod config;
/// Component creation.
pub mod factory;
/// Template scope construction.
pub mod scope;
/// The render pipeline.
pub mod renderer;
/// Lua template engine.
pub mod lua;

#[cfg(test)]
mod tests;

pub use attributes::{escape_html, ComponentAttributes};
pub use block_stack::BlockStack;
pub use component::{
    normalize_method, Component, DefaultPropertyAccessor, ExposeInTemplate, ExposeTarget,
    PropertyAccessor,
};
pub use computed::ComputedPropertiesProxy;
pub use config::{CacheConfig, ComponentConfig, ComponentDefaults, EscapingConfig};
pub use error::{ComponentError, Result};
pub use events::{Event, EventDispatcher, PostRenderEvent, PreCreateForRenderEvent, PreRenderEvent};
pub use factory::{AnonymousComponent, ComponentDefinition, ComponentFactory, ComponentRegistry, Constructor};
pub use hierarchy::{lookup_member, resolve_member, Hierarchy, Member};
pub use lua::{FileSystemResolver, LuaTemplateEngine, MemoryResolver, ResolvedTemplate, TemplateResolver};
pub use mounted::{ComponentMetadata, MountedComponent};
pub use renderer::{ComponentRenderer, ComponentRuntime, TemplateEngine, OUTER_BLOCKS};
pub use scope::{build_scope, exposed_variables};
pub use stack::{ComponentStack, StackFrame};
pub use value::{props_from_json, Props, Value, Variables};
