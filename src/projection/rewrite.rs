// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{ProjectionError, Projector};
use crate::model::ModelRef;
use crate::types::{Origin, TypeExpr};
use crate::*;

impl Projector<'_> {
    pub(crate) fn rewrite(&mut self, expr: &TypeExpr) -> Result<TypeExpr, ProjectionError> {
        match expr {
            TypeExpr::Annotated { base, .. } => self.rewrite(base),
            TypeExpr::Generic { args, .. } if args.is_empty() => Ok(expr.clone()),
            TypeExpr::Generic { origin, args } => {
                let mut rewritten = args
                    .iter()
                    .map(|arg| self.rewrite(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match origin {
                    Origin::Union => TypeExpr::canonical_union(rewritten),
                    Origin::Optional => {
                        rewritten.push(TypeExpr::None);
                        TypeExpr::canonical_union(rewritten)
                    }
                    origin => TypeExpr::Generic {
                        origin: origin.clone(),
                        args: Rc::new(rewritten),
                    },
                })
            }
            _ => {
                if let Some(identity) = expr.qualified_identity() {
                    if let Some(substitute) = self.config.replacement(&identity) {
                        tracing::trace!(%identity, substitute = %substitute, "replaced type");
                        return Ok(substitute.clone());
                    }
                }
                match expr {
                    TypeExpr::Model(model) => self.rewrite_model(model),
                    _ => Ok(expr.clone()),
                }
            }
        }
    }

    /// A model reached from a field type. This is the only place where a recursion
    /// limit failure is recovered: the model is referenced by its source name instead.
    fn rewrite_model(&mut self, model: &ModelRef) -> Result<TypeExpr, ProjectionError> {
        if let Some(root) = model.root_type()? {
            return self.unwrap_root(model, root);
        }

        match self.register(model) {
            Ok(projected) => Ok(TypeExpr::Model(projected)),
            Err(ProjectionError::RecursionLimit { limit, .. }) => {
                tracing::warn!(
                    model = %model.qualname(),
                    limit,
                    "recursion limit reached, referencing model by name"
                );
                Ok(TypeExpr::Forward(model.name_rc().clone()))
            }
            Err(e) => Err(e),
        }
    }
}
