// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Lua template engine for components.
//!
//! A component template is a Lua chunk that returns a module table:
//!
//! ```lua
//! local M = {}
//!
//! function M.render(vars, h)
//!   return "<div" .. h.escape(vars.attributes) .. ">"
//!     .. h.escape(vars.message)
//!     .. h.embed("card", { title = "Inner" }, 1)
//!     .. "</div>"
//! end
//!
//! M.embedded = {
//!   [1] = function(vars, h)
//!     return "<p>" .. h.escape(vars.this.parent.message) .. "</p>"
//!   end,
//! }
//!
//! return M
//! ```
//!
//! `vars` holds the scope built by the renderer. `h` carries the helpers:
//!
//! | Helper | Purpose |
//! |--------|---------|
//! | `h.component(name, props)` | Render a child component |
//! | `h.embed(name, props, index)` | Render `embedded[index]` of the current template as the body of `name` |
//! | `h.include(template, vars)` | Render another template's `render` function |
//! | `h.escape(value)` | HTML-escape a value unless its type is registered as safe |
//!
//! Compiled modules are kept in an LRU cache keyed by template name.

mod convert;
mod resolver;
mod userdata;

pub use resolver::{path_to_string, FileSystemResolver, MemoryResolver, ResolvedTemplate, TemplateResolver};

use crate::attributes::escape_html;
use crate::config::ComponentConfig;
use crate::error::{ComponentError, Result};
use crate::renderer::{ComponentRuntime, TemplateEngine};
use crate::value::Variables;
use convert::{from_lua, map_to_table, table_to_variables};
use lru::LruCache;
use mlua::{Function, Lua, Table, Value as LuaValue};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;

/// Default number of compiled templates kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Strategy checked by `h.escape`.
const HTML_STRATEGY: &str = "html";

/// Runs component templates written in Lua.
pub struct LuaTemplateEngine<R: TemplateResolver> {
    lua: Lua,
    resolver: R,
    modules: RefCell<LruCache<String, Table>>,
    safe_classes: RefCell<HashMap<String, Vec<String>>>,
}

impl<R: TemplateResolver> LuaTemplateEngine<R> {
    /// Creates an engine with the default cache capacity.
    pub fn new(resolver: R) -> Result<Self> {
        Self::with_capacity(resolver, DEFAULT_CACHE_CAPACITY)
    }

    /// Creates an engine sized from the `[cache]` section of `config`.
    pub fn from_config(resolver: R, config: &ComponentConfig) -> Result<Self> {
        Self::with_capacity(resolver, config.cache.template_capacity)
    }

    /// Creates an engine that keeps up to `capacity` compiled templates.
    ///
    /// # Errors
    ///
    /// Returns an error if the Lua runtime fails to initialize.
    pub fn with_capacity(resolver: R, capacity: usize) -> Result<Self> {
        let lua = Lua::new();
        Self::sandbox_lua(&lua, &lua.globals())?;

        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            lua,
            resolver,
            modules: RefCell::new(LruCache::new(capacity)),
            safe_classes: RefCell::new(HashMap::new()),
        })
    }

    /// Removes file, debug and dynamic code loading access from templates.
    ///
    /// Only `os.date`, `os.time`, `os.clock` and `os.difftime` survive from
    /// the `os` library.
    fn sandbox_lua(lua: &Lua, globals: &Table) -> Result<()> {
        let os_table: Table = globals.get("os")?;
        let safe_os = lua.create_table()?;
        for name in ["date", "time", "clock", "difftime"] {
            let function: Function = os_table.get(name)?;
            safe_os.set(name, function)?;
        }

        for name in ["io", "debug", "load", "loadstring", "loadfile", "dofile", "require"] {
            globals.set(name, LuaValue::Nil)?;
        }
        globals.set("os", safe_os)?;

        Ok(())
    }

    /// The template resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// The underlying Lua state.
    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Returns true if the compiled module of `template` is cached.
    pub fn cache_contains(&self, template: &str) -> bool {
        self.modules.borrow().contains(template)
    }

    /// Drops every compiled module.
    pub fn clear_cache(&self) {
        self.modules.borrow_mut().clear();
    }

    /// Returns true if values of `type_name` skip escaping for `strategy`.
    pub fn is_safe(&self, type_name: &str, strategy: &str) -> bool {
        self.safe_classes
            .borrow()
            .get(type_name)
            .is_some_and(|strategies| strategies.iter().any(|s| s == strategy || s == "all"))
    }

    fn module(&self, template: &str) -> Result<Table> {
        if let Some(module) = self.modules.borrow_mut().get(template) {
            tracing::trace!("template cache hit: {}", template);
            return Ok(module.clone());
        }

        let resolved = self.resolver.resolve(template)?;
        tracing::debug!("compiling template {}", resolved.path);

        let module = match self
            .lua
            .load(resolved.source.as_str())
            .set_name(format!("@{}", resolved.path))
            .eval::<LuaValue>()?
        {
            LuaValue::Table(module) => module,
            other => {
                return Err(ComponentError::InvalidTemplate(format!(
                    "template '{}' must return a module table, got {}",
                    template,
                    other.type_name()
                )))
            }
        };

        self.modules
            .borrow_mut()
            .put(template.to_string(), module.clone());
        Ok(module)
    }

    fn entry_point(module: &Table, template: &str, index: Option<usize>) -> Result<Function> {
        let function: Option<Function> = match index {
            None => module.get("render")?,
            Some(index) => {
                let embedded: Option<Table> = module.get("embedded")?;
                match embedded {
                    Some(embedded) => embedded.get(index)?,
                    None => None,
                }
            }
        };

        function.ok_or_else(|| {
            ComponentError::InvalidTemplate(match index {
                None => format!("template '{template}' has no render function"),
                Some(index) => format!("template '{template}' has no embedded block {index}"),
            })
        })
    }

    fn escape(&self, value: LuaValue) -> mlua::Result<String> {
        let value = from_lua(value)?;
        let text = value.to_string();
        if self.is_safe(value.type_name(), HTML_STRATEGY) {
            Ok(text)
        } else {
            Ok(escape_html(&text))
        }
    }
}

impl<R: TemplateResolver> TemplateEngine for LuaTemplateEngine<R> {
    fn render(
        &self,
        template: &str,
        index: Option<usize>,
        variables: &Variables,
        runtime: &mut dyn ComponentRuntime,
    ) -> Result<String> {
        let module = self.module(template)?;
        let function = Self::entry_point(&module, template, index)?;
        tracing::trace!("executing template {} (block {:?})", template, index);

        let runtime = RefCell::new(runtime);
        let output = self.lua.scope(|scope| {
            let helpers = self.lua.create_table()?;

            helpers.set(
                "component",
                scope.create_function(|_, (name, props): (String, Option<Table>)| {
                    let props = table_to_variables(props)?;
                    let mut runtime = runtime.try_borrow_mut().map_err(mlua::Error::external)?;
                    runtime
                        .render_component(&name, props)
                        .map_err(mlua::Error::external)
                })?,
            )?;

            helpers.set(
                "embed",
                scope.create_function(|_, (name, props, index): (String, Option<Table>, usize)| {
                    let props = table_to_variables(props)?;
                    let mut runtime = runtime.try_borrow_mut().map_err(mlua::Error::external)?;
                    let context = runtime
                        .embedded_context(&name, props, variables.clone(), template, index)
                        .map_err(mlua::Error::external)?;
                    self.render(template, Some(index), &context, &mut **runtime)
                        .map_err(mlua::Error::external)
                })?,
            )?;

            helpers.set(
                "include",
                scope.create_function(|_, (name, vars): (String, Option<Table>)| {
                    let vars = match vars {
                        Some(vars) => table_to_variables(Some(vars))?,
                        None => variables.clone(),
                    };
                    let mut runtime = runtime.try_borrow_mut().map_err(mlua::Error::external)?;
                    self.render(&name, None, &vars, &mut **runtime)
                        .map_err(mlua::Error::external)
                })?,
            )?;

            helpers.set(
                "escape",
                scope.create_function(|_, value: LuaValue| self.escape(value))?,
            )?;

            let vars = map_to_table(&self.lua, variables)?;
            let output: String = function.call((vars, helpers))?;
            Ok(output)
        })?;

        Ok(output)
    }

    fn add_safe_class(&self, type_name: &str, strategies: &[String]) {
        tracing::debug!("marking {} as safe for {:?}", type_name, strategies);
        self.safe_classes
            .borrow_mut()
            .insert(type_name.to_string(), strategies.to_vec());
    }
}

impl<R: TemplateResolver + fmt::Debug> fmt::Debug for LuaTemplateEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuaTemplateEngine")
            .field("resolver", &self.resolver)
            .field("cached_modules", &self.modules.borrow().len())
            .field("safe_classes", &self.safe_classes.borrow())
            .finish()
    }
}
