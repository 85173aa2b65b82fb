// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::alias::resolve_field_name;
use super::config::Mode;
use super::describe::{compose_description, format_description};
use super::{ProjectionError, Projector};
use crate::model::{Field, FieldDefault, ModelError};
use crate::types::TypeExpr;
use crate::*;

use serde_json::Value;

/// A field as it appears in a projected model.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedField {
    pub name: Rc<str>,
    pub ty: TypeExpr,
    /// `None` when the field is required. An explicit `null` default is `Some(Value::Null)`.
    pub default: Option<Value>,
    pub title: Option<Rc<str>>,
    pub description: Option<Rc<str>>,
}

impl ProjectedField {
    pub fn into_field(self) -> Field {
        let mut field = Field::new(self.name, self.ty);
        if let Some(default) = self.default {
            field = field.with_default(default);
        }
        if let Some(title) = self.title {
            field = field.with_title(title);
        }
        if let Some(description) = self.description {
            field = field.with_description(description);
        }
        field
    }
}

impl Projector<'_> {
    pub(crate) fn project_field(&mut self, field: &Field) -> Result<ProjectedField, ProjectionError> {
        let alias = match self.config.get_mode() {
            Mode::Input => field.validation_alias(),
            Mode::Output => field.serialization_alias(),
        };
        let (name, extra_aliases) = resolve_field_name(alias, field.name());

        let mut ty = self.rewrite(field.ty())?;

        let default = match field.default() {
            FieldDefault::Required => None,
            FieldDefault::Value(value) => Some(value.clone()),
            FieldDefault::Factory(factory) => Some(factory.produce().map_err(|e| match e {
                ModelError::RecursiveDefault(model) => ProjectionError::RecursionLimit {
                    model,
                    limit: self.config.get_recursion_limit(),
                },
                e => e.into(),
            })?),
        };
        if matches!(&default, Some(value) if !value.is_null()) {
            ty = ty.without_none();
        }

        let description = compose_description(
            format_description(field.description()),
            &name,
            &extra_aliases,
            self.config.get_lexicon(),
        );

        Ok(ProjectedField {
            name,
            ty,
            default,
            title: field.title().map(Into::into),
            description: description.map(Into::into),
        })
    }
}
