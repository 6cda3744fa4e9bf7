// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Element registries
//!
//! A registry maps element names to their primitive type. Statements name
//! the registry they were written against by URI; the [`Registries`] store
//! loads each URI once and hands out shared [`Registry`] handles to every
//! statement built against it.

use crate::error::ParseError;
use crate::primitive::Primitive;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// URI of the built-in core registry
pub const CORE_REGISTRY_URI: &str = "http://ict-mplane.eu/registry/core";

const CORE_REGISTRY_JSON: &str = include_str!("../registry/core.json");

const REGISTRY_FORMAT: &str = "mplane";

/// A named, typed element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element {
    name: String,
    primitive: Primitive,
    description: Option<String>,
    namespace: String,
}

impl Element {
    pub fn new(
        name: impl Into<String>,
        primitive: Primitive,
        description: Option<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            primitive,
            description,
            namespace: namespace.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// URI of the registry that defined this element
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// An ordered set of elements identified by URI
#[derive(Debug, PartialEq, Eq)]
pub struct Registry {
    uri: String,
    revision: u64,
    elements: IndexMap<String, Arc<Element>>,
}

impl Registry {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Look up an element by name
    pub fn element(&self, name: &str) -> Result<Arc<Element>, ParseError> {
        self.elements
            .get(name)
            .cloned()
            .ok_or_else(|| ParseError::UnknownElement {
                name: name.to_string(),
                registry: self.uri.clone(),
            })
    }

    pub fn elements(&self) -> impl Iterator<Item = &Arc<Element>> {
        self.elements.values()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    #[serde(rename = "registry-format")]
    format: String,
    #[serde(rename = "registry-uri")]
    uri: String,
    #[serde(rename = "registry-revision", default)]
    revision: u64,
    #[serde(default)]
    includes: Vec<String>,
    #[serde(default)]
    elements: Vec<ElementDocument>,
}

#[derive(Debug, Deserialize)]
struct ElementDocument {
    name: String,
    prim: String,
    #[serde(default)]
    desc: Option<String>,
}

/// Process-wide registry cache keyed by URI
///
/// Create one store at startup and pass it to everything that builds or
/// decodes statements. Clones share the same cache.
#[derive(Debug, Clone)]
pub struct Registries {
    loaded: Arc<Mutex<HashMap<String, Arc<Registry>>>>,
}

impl Registries {
    /// Create a store holding the built-in core registry
    pub fn new() -> Result<Self, ParseError> {
        let registries = Self {
            loaded: Arc::new(Mutex::new(HashMap::new())),
        };
        registries.load_json(CORE_REGISTRY_JSON)?;
        Ok(registries)
    }

    /// The built-in core registry
    pub fn core(&self) -> Result<Arc<Registry>, ParseError> {
        self.get(CORE_REGISTRY_URI)
    }

    /// Get a registry by URI, loading `file://` URIs and paths on first use
    pub fn get(&self, uri: &str) -> Result<Arc<Registry>, ParseError> {
        self.get_inner(uri, &mut Vec::new())
    }

    /// Load a registry document from JSON text and cache it under its URI
    pub fn load_json(&self, text: &str) -> Result<Arc<Registry>, ParseError> {
        self.load_json_inner(text, &mut Vec::new())
    }

    /// Load a registry document from a file and cache it under its URI
    pub fn load_file(&self, path: &Path) -> Result<Arc<Registry>, ParseError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ParseError::InvalidRegistry(format!("{}: {}", path.display(), e))
        })?;
        self.load_json(&text)
    }

    fn cached(&self, uri: &str) -> Option<Arc<Registry>> {
        let loaded = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
        loaded.get(uri).cloned()
    }

    fn get_inner(&self, uri: &str, visiting: &mut Vec<String>) -> Result<Arc<Registry>, ParseError> {
        if let Some(registry) = self.cached(uri) {
            return Ok(registry);
        }
        let path = match uri.strip_prefix("file://") {
            Some(path) => Path::new(path),
            None if !uri.contains("://") => Path::new(uri),
            None => return Err(ParseError::UnknownRegistry(uri.to_string())),
        };
        let text = std::fs::read_to_string(path)
            .map_err(|_| ParseError::UnknownRegistry(uri.to_string()))?;
        let registry = self.load_json_inner(&text, visiting)?;
        // Also reachable under the URI it was requested by
        let mut loaded = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
        loaded.insert(uri.to_string(), Arc::clone(&registry));
        Ok(registry)
    }

    fn load_json_inner(
        &self,
        text: &str,
        visiting: &mut Vec<String>,
    ) -> Result<Arc<Registry>, ParseError> {
        let doc: RegistryDocument = serde_json::from_str(text)
            .map_err(|e| ParseError::InvalidRegistry(e.to_string()))?;
        if doc.format != REGISTRY_FORMAT {
            return Err(ParseError::InvalidRegistry(format!(
                "unsupported registry format {:?}",
                doc.format
            )));
        }
        if visiting.contains(&doc.uri) {
            return Err(ParseError::InvalidRegistry(format!(
                "registry {} includes itself",
                doc.uri
            )));
        }
        visiting.push(doc.uri.clone());

        let mut elements = IndexMap::new();
        for include in &doc.includes {
            let included = self.get_inner(include, visiting)?;
            for element in included.elements() {
                elements.insert(element.name().to_string(), Arc::clone(element));
            }
        }
        for element in doc.elements {
            let primitive: Primitive = element.prim.parse()?;
            let element = Element::new(element.name, primitive, element.desc, doc.uri.clone());
            elements.insert(element.name().to_string(), Arc::new(element));
        }
        visiting.pop();

        let registry = Arc::new(Registry {
            uri: doc.uri,
            revision: doc.revision,
            elements,
        });
        tracing::debug!(
            uri = registry.uri(),
            revision = registry.revision(),
            elements = registry.len(),
            "loaded registry"
        );
        let mut loaded = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
        loaded.insert(registry.uri().to_string(), Arc::clone(&registry));
        Ok(registry)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
