// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::model::ModelRef;
use crate::registry::Namespace;
use crate::types::TypeExpr;
use crate::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum depth of nested distinct models projected in one pass.
pub const DEFAULT_RECURSION_LIMIT: usize = 128;

/// Selects which alias slot is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Validation aliases: the names a field is accepted as.
    #[default]
    Input,
    /// Serialization aliases: the names a field is written as.
    Output,
}

/// Words used when generating documentation text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Lexicon {
    pub aliases_label: String,
    pub conjunction: String,
    pub separator: String,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            aliases_label: "Aliases".to_string(),
            conjunction: "and".to_string(),
            separator: ",".to_string(),
        }
    }
}

/// Configuration of one projection pass.
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    mode: Mode,
    short: bool,
    namespace: Rc<Namespace>,
    renames: HashMap<String, String>,
    replaces: HashMap<String, TypeExpr>,
    lexicon: Lexicon,
    recursion_limit: usize,
}

impl ProjectionConfig {
    /// Input mode, truncated docstrings, no renames or replacements.
    pub fn new(namespace: Rc<Namespace>) -> Self {
        Self {
            mode: Mode::Input,
            short: true,
            namespace,
            renames: HashMap::new(),
            replaces: HashMap::new(),
            lexicon: Lexicon::default(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// When set, only the first line of a model docstring is kept.
    pub fn short(mut self, short: bool) -> Self {
        self.short = short;
        self
    }

    /// Publishes the model with qualified identity `qualname` as `name`.
    pub fn rename(mut self, qualname: impl Into<String>, name: impl Into<String>) -> Self {
        self.renames.insert(qualname.into(), name.into());
        self
    }

    pub fn rename_model(self, model: &ModelRef, name: impl Into<String>) -> Self {
        self.rename(model.qualname(), name)
    }

    pub fn renames<K, V>(mut self, renames: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.renames
            .extend(renames.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Substitutes `substitute` for every leaf or model whose identity is `identity`.
    pub fn replace(mut self, identity: impl Into<String>, substitute: TypeExpr) -> Self {
        self.replaces.insert(identity.into(), substitute);
        self
    }

    pub fn replace_model(self, model: &ModelRef, substitute: TypeExpr) -> Self {
        self.replace(model.qualname(), substitute)
    }

    pub fn lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Same configuration with a different mode.
    pub fn with_mode(&self, mode: Mode) -> Self {
        self.clone().mode(mode)
    }

    pub fn get_mode(&self) -> Mode {
        self.mode
    }

    pub fn is_short(&self) -> bool {
        self.short
    }

    pub fn namespace(&self) -> &Rc<Namespace> {
        &self.namespace
    }

    pub fn get_lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn get_recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Public name of a model: its rename if any, else its own name.
    pub fn target_name(&self, model: &ModelRef) -> Rc<str> {
        match self.renames.get(&model.qualname()) {
            Some(rename) => rename.as_str().into(),
            None => model.name_rc().clone(),
        }
    }

    pub fn replacement(&self, identity: &str) -> Option<&TypeExpr> {
        self.replaces.get(identity)
    }
}
