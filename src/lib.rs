// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

// Projected models are shared across namespaces, which may be global.
pub(crate) use std::sync::Arc as Rc;

mod catalog;
mod model;
pub mod projection;
pub mod registry;
mod render;
pub mod source;
mod types;

pub use catalog::{qualname, Catalog};
pub use model::{
    Alias, AliasChoice, DefaultFactory, Field, FieldDefault, ModelBody, ModelDef, ModelError,
    ModelKind, ModelRef, PathSegment,
};
pub use projection::{
    extract_concrete_models, extract_models, format_description, format_list, project_field,
    register_model, resolve_field_name, rewrite_type, Lexicon, Mode, ProjectedField,
    ProjectionConfig, ProjectionError, DEFAULT_RECURSION_LIMIT,
};
pub use registry::{Namespace, NamespaceError};
pub use types::{Annotation, Leaf, Origin, TypeExpr};

pub use serde_json::Value;
