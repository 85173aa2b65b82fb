// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::pattern_type_mismatch)]
use crate::model::ModelRef;
use crate::types::TypeExpr;
use crate::*;
use core::fmt;
use dashmap::DashMap;

#[cfg(test)]
mod tests {
    mod core;
    mod namespaces;
}

/// Errors that can occur when interacting with a Namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    InvalidName { name: String, namespace: String },
}

impl fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceError::InvalidName { name, namespace } => {
                write!(f, "{namespace} registration failed: The name '{name}' is invalid (empty or whitespace-only names are not allowed).")
            }
        }
    }
}

impl core::error::Error for NamespaceError {}

/// Validates that a name is not empty or whitespace-only.
pub fn validate_name(name: &str, namespace: &str) -> Result<(), NamespaceError> {
    if name.trim().is_empty() {
        Err(NamespaceError::InvalidName {
            name: name.to_string(),
            namespace: namespace.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Outcome of claiming a public name.
pub(crate) enum Claim {
    /// The name was taken; this is the model registered first.
    Existing(ModelRef),
    /// The name was free and now holds this freshly declared model.
    Created(ModelRef),
}

/// Thread-safe destination of projected models, keyed by public name.
///
/// A name is claimed at most once: the first model registered under a name stays
/// there, and later registrations of the same name get that model back. Exported
/// type aliases live next to the models and follow the same rule.
pub struct Namespace {
    name: Rc<str>,
    models: DashMap<Rc<str>, ModelRef>,
    types: DashMap<Rc<str>, TypeExpr>,
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("name", &self.name)
            .field("models", &self.list_names())
            .finish()
    }
}

impl Namespace {
    /// Create a new, empty namespace with a given name.
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self {
            name: name.into(),
            models: DashMap::new(),
            types: DashMap::new(),
        }
    }

    /// Get the name of this namespace. Projected models use it as their module.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Claims `name`, declaring the model with `make` only if the name is free.
    ///
    /// The check and the insertion happen under the entry lock, so concurrent
    /// projections into the same namespace agree on a single model per name.
    pub(crate) fn claim(
        &self,
        name: &str,
        make: impl FnOnce(Rc<str>) -> ModelRef,
    ) -> Result<Claim, NamespaceError> {
        validate_name(name, &self.name)?;

        use dashmap::mapref::entry::Entry;
        match self.models.entry(name.into()) {
            Entry::Occupied(e) => Ok(Claim::Existing(e.get().clone())),
            Entry::Vacant(e) => {
                let model = make(e.key().clone());
                e.insert(model.clone());
                Ok(Claim::Created(model))
            }
        }
    }

    /// Gives back a claim whose projection failed. Nothing happens if `name`
    /// holds another model by now.
    pub(crate) fn release(&self, name: &str, model: &ModelRef) {
        self.models.remove_if(name, |_, current| current == model);
    }

    /// Retrieve a model by name, if it exists.
    pub fn get(&self, name: &str) -> Option<ModelRef> {
        self.models.get(name).map(|entry| entry.value().clone())
    }

    /// Remove a model by name. Returns the removed model if it existed.
    pub fn remove(&self, name: &str) -> Option<ModelRef> {
        self.models.remove(name).map(|(_, v)| v)
    }

    /// List all registered model names, sorted.
    pub fn list_names(&self) -> Vec<Rc<str>> {
        let mut names: Vec<Rc<str>> = self.models.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Check if a model with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Get the number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if the namespace holds no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Clear all models and exported types.
    pub fn clear(&self) {
        self.models.clear();
        self.types.clear();
    }

    /// Get all (name, model) pairs sorted by name.
    pub fn models(&self) -> Vec<(Rc<str>, ModelRef)> {
        let mut models: Vec<(Rc<str>, ModelRef)> = self
            .models
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        models.sort_by(|a, b| a.0.cmp(&b.0));
        models
    }

    /// Export a type alias under `name`.
    /// Returns Ok(true) if it was exported, Ok(false) if the name was already exported.
    pub fn export_type(&self, name: &str, expr: TypeExpr) -> Result<bool, NamespaceError> {
        validate_name(name, &self.name)?;

        use dashmap::mapref::entry::Entry;
        match self.types.entry(name.into()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(e) => {
                e.insert(expr);
                Ok(true)
            }
        }
    }

    /// Retrieve an exported type alias by name.
    pub fn exported_type(&self, name: &str) -> Option<TypeExpr> {
        self.types.get(name).map(|entry| entry.value().clone())
    }

    /// Get all exported (name, type) pairs sorted by name.
    pub fn exported_types(&self) -> Vec<(Rc<str>, TypeExpr)> {
        let mut types: Vec<(Rc<str>, TypeExpr)> = self
            .types
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        types.sort_by(|a, b| a.0.cmp(&b.0));
        types
    }
}

/// Global namespace instances
pub mod instances {
    use super::*;

    lazy_static::lazy_static! {
        /// Process-wide namespaces, keyed by namespace name.
        pub static ref NAMESPACES: DashMap<Rc<str>, Rc<Namespace>> = DashMap::new();
    }
}

/// Helper functions for global namespace operations.
pub mod namespaces {
    use super::*;
    use instances::*;

    /// Retrieve the global namespace called `name`, creating it on first use.
    pub fn get_or_create(name: &str) -> Rc<Namespace> {
        NAMESPACES
            .entry(name.into())
            .or_insert_with(|| Rc::new(Namespace::new(name)))
            .value()
            .clone()
    }

    /// Retrieve a global namespace by name.
    pub fn get(name: &str) -> Option<Rc<Namespace>> {
        NAMESPACES.get(name).map(|entry| Rc::clone(entry.value()))
    }

    /// Remove a global namespace by name.
    pub fn remove(name: &str) -> Option<Rc<Namespace>> {
        NAMESPACES.remove(name).map(|(_, v)| v)
    }

    /// List all global namespace names, sorted.
    pub fn list_names() -> Vec<Rc<str>> {
        let mut names: Vec<Rc<str>> = NAMESPACES.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Check if a global namespace with the given name exists.
    pub fn contains(name: &str) -> bool {
        NAMESPACES.contains_key(name)
    }

    /// Clear all global namespaces.
    pub fn clear() {
        NAMESPACES.clear();
    }
}
