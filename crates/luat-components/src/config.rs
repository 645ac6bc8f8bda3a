// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Component configuration.
//!
//! Configuration is usually loaded from a `components.toml` file.
//!
//! # Example Configuration
//!
//! ```toml
//! [components]
//! template_directory = "components"
//! template_extension = ".lua"
//! attributes_var = "attributes"
//! expose_public_props = true
//! anonymous_template_directory = "components"
//!
//! [escaping]
//! safe_strategies = ["html"]
//!
//! [cache]
//! template_capacity = 100
//! ```

use crate::error::{ComponentError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentConfig {
    /// Defaults applied to registered components.
    #[serde(default)]
    pub components: ComponentDefaults,
    /// Escaping settings.
    #[serde(default)]
    pub escaping: EscapingConfig,
    /// Template cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Defaults for component definitions.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentDefaults {
    /// Directory holding component templates (default: "components").
    #[serde(default = "default_template_directory")]
    pub template_directory: String,

    /// Extension appended to derived template names (default: ".lua").
    #[serde(default = "default_template_extension")]
    pub template_extension: String,

    /// Variable holding the attributes bag (default: "attributes").
    #[serde(default = "default_attributes_var")]
    pub attributes_var: String,

    /// Whether public properties are exposed by default (default: true).
    #[serde(default = "default_true")]
    pub expose_public_props: bool,

    /// Directory searched for template-only components.
    #[serde(default)]
    pub anonymous_template_directory: Option<String>,
}

fn default_template_directory() -> String {
    "components".to_string()
}

fn default_template_extension() -> String {
    ".lua".to_string()
}

fn default_attributes_var() -> String {
    "attributes".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ComponentDefaults {
    fn default() -> Self {
        Self {
            template_directory: default_template_directory(),
            template_extension: default_template_extension(),
            attributes_var: default_attributes_var(),
            expose_public_props: true,
            anonymous_template_directory: None,
        }
    }
}

/// Escaping configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EscapingConfig {
    /// Strategies for which the attributes bag is output-safe (default: ["html"]).
    #[serde(default = "default_safe_strategies")]
    pub safe_strategies: Vec<String>,
}

fn default_safe_strategies() -> Vec<String> {
    vec!["html".to_string()]
}

impl Default for EscapingConfig {
    fn default() -> Self {
        Self {
            safe_strategies: default_safe_strategies(),
        }
    }
}

/// Compiled template cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Number of compiled templates kept in memory (default: 100).
    #[serde(default = "default_template_capacity")]
    pub template_capacity: usize,
}

fn default_template_capacity() -> usize {
    100
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            template_capacity: default_template_capacity(),
        }
    }
}

impl ComponentConfig {
    /// Parses configuration from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            ComponentError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&source)
    }

    /// Derives the template name for a component.
    ///
    /// Namespaced names (`foo:bar:baz`) map to nested directories.
    pub fn template_for(&self, name: &str) -> String {
        let relative = name.replace(':', "/");
        let directory = self.components.template_directory.trim_end_matches('/');
        if directory.is_empty() {
            format!("{}{}", relative, self.components.template_extension)
        } else {
            format!("{}/{}{}", directory, relative, self.components.template_extension)
        }
    }

    /// Derives the template name for an anonymous component, if enabled.
    pub fn anonymous_template_for(&self, name: &str) -> Option<String> {
        let directory = self.components.anonymous_template_directory.as_ref()?;
        let relative = name.replace(':', "/");
        let directory = directory.trim_end_matches('/');
        Some(if directory.is_empty() {
            format!("{}{}", relative, self.components.template_extension)
        } else {
            format!("{}/{}{}", directory, relative, self.components.template_extension)
        })
    }
}
