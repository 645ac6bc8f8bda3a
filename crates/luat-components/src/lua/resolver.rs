// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Template source resolution.
//!
//! - [`FileSystemResolver`]: loads templates below a root directory
//! - [`MemoryResolver`]: keeps templates in memory (tests, embedding)

use crate::error::{ComponentError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

/// Converts a path to a string with forward slashes.
pub fn path_to_string<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// A template source and the path it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    /// Path used in chunk names and error messages.
    pub path: String,
    /// The Lua source.
    pub source: String,
}

/// Finds template sources by name.
pub trait TemplateResolver {
    /// Loads the source of `name`.
    fn resolve(&self, name: &str) -> Result<ResolvedTemplate>;

    /// Returns true if `name` can be resolved.
    fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }
}

/// Collapses `.` and `..` segments. Returns `None` if the path climbs
/// above its start.
fn normalize(name: &str) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in Path::new(name.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => {}
        }
    }
    Some(normalized)
}

/// Loads templates from a directory.
///
/// Names are relative to the root; they may not leave it.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    root_dir: PathBuf,
}

impl FileSystemResolver {
    /// Creates a resolver rooted at `root_dir`.
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Self {
        Self {
            root_dir: root_dir.as_ref().to_path_buf(),
        }
    }

    /// The root directory.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        normalize(name)
            .map(|relative| self.root_dir.join(relative))
            .ok_or_else(|| {
                ComponentError::ResolutionError(format!(
                    "Template '{}' is outside of {}",
                    name,
                    self.root_dir.display()
                ))
            })
    }
}

impl TemplateResolver for FileSystemResolver {
    fn resolve(&self, name: &str) -> Result<ResolvedTemplate> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(ComponentError::ResolutionError(format!(
                "Template not found: {}",
                path.display()
            )));
        }

        let source = std::fs::read_to_string(&path).map_err(|e| {
            ComponentError::ResolutionError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        tracing::trace!("resolved template {} to {}", name, path.display());

        Ok(ResolvedTemplate {
            path: path_to_string(&path),
            source,
        })
    }

    fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|path| path.is_file()).unwrap_or(false)
    }
}

/// In-memory template store.
///
/// Clones share the same templates, so a resolver handed to an engine can
/// still be filled afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    templates: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a template.
    pub fn add_template(&self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.borrow_mut().insert(name.into(), source.into());
    }

    /// Builder form of [`add_template`](Self::add_template).
    pub fn with_template(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.add_template(name, source);
        self
    }

    /// Removes a template, returning its source.
    pub fn remove_template(&self, name: &str) -> Option<String> {
        self.templates.borrow_mut().remove(name)
    }

    fn key_for(name: &str) -> Option<String> {
        normalize(&name.replace('\\', "/")).map(path_to_string)
    }
}

impl TemplateResolver for MemoryResolver {
    fn resolve(&self, name: &str) -> Result<ResolvedTemplate> {
        let key = Self::key_for(name)
            .ok_or_else(|| ComponentError::ResolutionError(format!("Invalid template name: {name}")))?;

        self.templates
            .borrow()
            .get(&key)
            .map(|source| ResolvedTemplate {
                path: key.clone(),
                source: source.clone(),
            })
            .ok_or_else(|| ComponentError::ResolutionError(format!("Template not found: {name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_memory_resolver_normalizes_names() {
        let resolver = MemoryResolver::new().with_template("components/alert.lua", "return {}");

        assert!(resolver.exists("components/alert.lua"));
        assert!(resolver.exists("./components/alert.lua"));
        assert!(resolver.exists("components/x/../alert.lua"));
        assert!(!resolver.exists("components/button.lua"));
    }

    #[test]
    fn test_memory_resolver_clones_share_templates() {
        let resolver = MemoryResolver::new();
        let shared = resolver.clone();
        resolver.add_template("a.lua", "return {}");

        assert_eq!(shared.resolve("a.lua").unwrap().source, "return {}");
        assert_eq!(shared.remove_template("a.lua").as_deref(), Some("return {}"));
        assert!(!resolver.exists("a.lua"));
    }

    #[test]
    fn test_filesystem_resolver_reads_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("components")).unwrap();
        fs::write(dir.path().join("components/alert.lua"), "return {}").unwrap();

        let resolver = FileSystemResolver::new(dir.path());
        let resolved = resolver.resolve("components/alert.lua").unwrap();

        assert_eq!(resolved.source, "return {}");
        assert!(resolved.path.ends_with("components/alert.lua"));
        assert!(!resolver.exists("components/missing.lua"));
    }

    #[test]
    fn test_filesystem_resolver_rejects_escaping_names() {
        let dir = TempDir::new().unwrap();
        let resolver = FileSystemResolver::new(dir.path());

        let err = resolver.resolve("../secret.lua").unwrap_err();
        assert!(matches!(err, ComponentError::ResolutionError(_)));
        assert!(!resolver.exists("../secret.lua"));
    }
}
