// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for component rendering.
//!
//! This module defines [`ComponentError`], the error enum shared by the
//! factory, the scope builder, the renderer and the Lua template engine.
//!
//! # Error Categories
//!
//! - **Lookup errors**: a member, property or component name does not exist
//! - **Logic errors**: a component is declared in a way that cannot work
//!   (for example an exposed method with required parameters)
//! - **Template errors**: template resolution or Lua execution failed
//! - **Config errors**: the TOML configuration could not be read

use thiserror::Error;

/// The main error type for component operations.
///
/// The enum is `Clone` so that errors raised inside Lua callbacks can be
/// recovered from the Lua error chain with their own variant.
#[derive(Error, Debug, Clone)]
pub enum ComponentError {
    /// A member was requested on a component that has no such property,
    /// keyed entry or method.
    #[error("Component \"{component}\" does not have a \"{member}\" method.")]
    InvalidArgument {
        /// Concrete type name of the component.
        component: String,
        /// The requested member name.
        member: String,
    },

    /// A component is configured in a way that cannot be honoured.
    #[error("Logic error: {0}")]
    Logic(String),

    /// No component definition is registered under the requested name.
    #[error("Unknown component \"{name}\". The registered components are: {known}")]
    UnknownComponent {
        /// The requested component name.
        name: String,
        /// Comma separated list of registered names.
        known: String,
    },

    /// The property accessor could not read a property.
    #[error("Can't get a way to read the property \"{property}\" in class \"{component}\".")]
    NoSuchProperty {
        /// Concrete type name of the component.
        component: String,
        /// The property that was requested.
        property: String,
    },

    /// A value had an unexpected type.
    #[error("Type error: {0}")]
    TypeError(String),

    /// Template file could not be found or loaded.
    #[error("Resolution error: {0}")]
    ResolutionError(String),

    /// The template structure is invalid.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Lua runtime execution error.
    #[error("Lua execution error: {0}")]
    LuaError(mlua::Error),

    /// A render failed and a post-render listener failed after it.
    #[error("{error} (post render listener also failed: {listener})")]
    PostRenderFailed {
        /// The error raised by the render itself.
        #[source]
        error: Box<ComponentError>,
        /// The error raised by the post-render listener.
        listener: Box<ComponentError>,
    },
}

impl ComponentError {
    /// Builds the member-not-found error for a component type.
    pub fn member_not_found(component: &str, member: &str) -> Self {
        ComponentError::InvalidArgument {
            component: component.to_string(),
            member: member.to_string(),
        }
    }

    /// The error that made the render fail, unwrapping post-render context.
    pub fn render_error(&self) -> &ComponentError {
        match self {
            ComponentError::PostRenderFailed { error, .. } => error.render_error(),
            other => other,
        }
    }
}

/// Walks callback and external wrappers looking for an error raised by us.
fn find_component_error(err: &mlua::Error) -> Option<ComponentError> {
    match err {
        mlua::Error::CallbackError { cause, .. } => find_component_error(cause),
        mlua::Error::WithContext { cause, .. } => find_component_error(cause),
        mlua::Error::ExternalError(external) => {
            external.downcast_ref::<ComponentError>().cloned()
        }
        _ => None,
    }
}

impl From<mlua::Error> for ComponentError {
    fn from(err: mlua::Error) -> Self {
        find_component_error(&err).unwrap_or(ComponentError::LuaError(err))
    }
}

impl From<toml::de::Error> for ComponentError {
    fn from(err: toml::de::Error) -> Self {
        ComponentError::ConfigError(err.to_string())
    }
}

/// Convenience type alias for Results with [`ComponentError`].
pub type Result<T> = std::result::Result<T, ComponentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_not_found_names_type_and_member() {
        let err = ComponentError::member_not_found("app::Alert", "bar");
        assert_eq!(
            err.to_string(),
            "Component \"app::Alert\" does not have a \"bar\" method."
        );
    }

    #[test]
    fn test_component_error_survives_lua_callback_chain() {
        let original = ComponentError::Logic("boom".to_string());
        let wrapped = mlua::Error::CallbackError {
            traceback: "stack traceback".to_string(),
            cause: std::sync::Arc::new(mlua::Error::external(original)),
        };

        match ComponentError::from(wrapped) {
            ComponentError::Logic(message) => assert_eq!(message, "boom"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plain_lua_errors_are_wrapped() {
        let err = ComponentError::from(mlua::Error::runtime("bad"));
        assert!(matches!(err, ComponentError::LuaError(_)));
    }
}
