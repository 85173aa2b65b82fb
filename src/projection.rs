// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Projection of source models into a public namespace.
//!
//! Projection walks a source model graph and builds a derived graph suited for
//! documentation:
//!
//! - models are published under their public names (the rename table) in a
//!   [`Namespace`](crate::registry::Namespace), each one extending its source;
//! - field names come from validation or serialization aliases depending on the
//!   [`Mode`], and secondary aliases are listed in the field description;
//! - annotated wrappers lose their metadata, union-like origins collapse into a
//!   canonical `Union`, and root models are replaced by the type they wrap;
//! - a field with a concrete default no longer advertises `None`.
//!
//! Every model is projected at most once per namespace. The namespace entry is
//! claimed before the fields of a model are projected, so a model reached again
//! through a cycle resolves to the entry that is already there.

use crate::model::{ModelBody, ModelKind, ModelRef};
use crate::registry::Claim;
use crate::types::TypeExpr;

use indexmap::IndexMap;

mod alias;
mod config;
mod describe;
mod error;
mod extract;
mod field;
mod rewrite;


pub use alias::resolve_field_name;
pub use config::{Lexicon, Mode, ProjectionConfig, DEFAULT_RECURSION_LIMIT};
pub use describe::{format_description, format_list};
pub use error::ProjectionError;
pub use extract::{extract_concrete_models, extract_models};
pub use field::ProjectedField;

/// Projects `model` into the namespace of `config`.
///
/// Root models produce no model of their own; the projection of the type they wrap
/// is returned instead. For any other model the result is a [`TypeExpr::Model`]
/// referencing the model registered under the public name. Registering a name that
/// is already taken returns the model registered first.
pub fn register_model(
    model: &ModelRef,
    config: &ProjectionConfig,
) -> Result<TypeExpr, ProjectionError> {
    let mut projector = Projector::new(config);
    if let Some(root) = model.root_type()? {
        return projector.unwrap_root(model, root);
    }
    projector.register(model).map(TypeExpr::Model)
}

/// Rewrites a type expression, projecting every model it references.
pub fn rewrite_type(expr: &TypeExpr, config: &ProjectionConfig) -> Result<TypeExpr, ProjectionError> {
    Projector::new(config).rewrite(expr)
}

/// Projects a single field declaration.
pub fn project_field(
    field: &crate::model::Field,
    config: &ProjectionConfig,
) -> Result<ProjectedField, ProjectionError> {
    Projector::new(config).project_field(field)
}

/// State of one projection call: the configuration and the current model depth.
pub(crate) struct Projector<'a> {
    config: &'a ProjectionConfig,
    depth: usize,
}

impl<'a> Projector<'a> {
    pub(crate) fn new(config: &'a ProjectionConfig) -> Self {
        Self { config, depth: 0 }
    }

    /// Runs `f` one model deeper, failing once the recursion limit is reached.
    fn descend<T>(
        &mut self,
        model: &ModelRef,
        f: impl FnOnce(&mut Self) -> Result<T, ProjectionError>,
    ) -> Result<T, ProjectionError> {
        let limit = self.config.get_recursion_limit();
        if self.depth >= limit {
            return Err(ProjectionError::RecursionLimit {
                model: model.qualname(),
                limit,
            });
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn unwrap_root(&mut self, model: &ModelRef, root: &TypeExpr) -> Result<TypeExpr, ProjectionError> {
        self.descend(model, |p| p.rewrite(root))
    }

    /// Registers a non-root model, reusing whatever the namespace already holds
    /// under its public name.
    fn register(&mut self, model: &ModelRef) -> Result<ModelRef, ProjectionError> {
        let config = self.config;
        let namespace = config.namespace();
        let target = config.target_name(model);

        if let Some(existing) = namespace.get(&target) {
            tracing::trace!(model = %model.qualname(), target = %target, "model already projected");
            return Ok(existing);
        }

        let source = model.body()?;
        self.descend(model, |p| {
            let claimed = match namespace.claim(&target, |name| {
                ModelRef::declare(namespace.name(), name)
            })? {
                Claim::Existing(existing) => return Ok(existing),
                Claim::Created(claimed) => claimed,
            };

            match p.build_body(model, source) {
                Ok(body) => {
                    claimed.set_body(body)?;
                    tracing::debug!(
                        model = %model.qualname(),
                        namespace = namespace.name(),
                        target = %target,
                        "projected model"
                    );
                    Ok(claimed)
                }
                Err(e) => {
                    namespace.release(&target, &claimed);
                    Err(e)
                }
            }
        })
    }

    fn build_body(&mut self, model: &ModelRef, source: &ModelBody) -> Result<ModelBody, ProjectionError> {
        let doc = match source.doc() {
            Some(doc) if self.config.is_short() => doc.lines().next(),
            doc => doc,
        };

        let mut fields = IndexMap::with_capacity(source.fields.len());
        for field in source.fields() {
            let projected = self.project_field(field)?;
            fields.insert(projected.name.clone(), projected.into_field());
        }

        Ok(ModelBody {
            doc: format_description(doc).map(Into::into),
            title: source.title.clone(),
            kind: ModelKind::Plain,
            fields,
            validators: vec![],
            base: Some(model.clone()),
        })
    }
}
