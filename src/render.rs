// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Serialization of projected models for documentation consumers.
//!
//! Types are rendered through their `Display` form, so a model references other
//! models by name and rendering never follows cycles.

use crate::model::{FieldDefault, ModelRef};
use crate::registry::Namespace;
use crate::types::TypeExpr;

use serde::ser::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(serde::Serialize)]
struct FieldView<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    ty: String,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(serde::Serialize)]
struct ModelView<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extends: Option<String>,
    fields: Vec<FieldView<'a>>,
}

impl Serialize for ModelRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // A model that was only declared renders as its name.
        let Ok(body) = self.body() else {
            return ModelView {
                name: self.name(),
                title: None,
                description: None,
                extends: None,
                fields: vec![],
            }
            .serialize(serializer);
        };

        let fields = body
            .fields()
            .map(|field| FieldView {
                name: field.name(),
                ty: field.ty().to_string(),
                required: field.is_required(),
                default: match field.default() {
                    FieldDefault::Value(value) => Some(value),
                    _ => None,
                },
                title: field.title(),
                description: field.description(),
            })
            .collect();

        ModelView {
            name: self.name(),
            title: body.title(),
            description: body.doc(),
            extends: body.base().map(ModelRef::qualname),
            fields,
        }
        .serialize(serializer)
    }
}

impl Serialize for TypeExpr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(serde::Serialize)]
struct NamespaceView<'a> {
    name: &'a str,
    models: BTreeMap<String, ModelRef>,
    types: BTreeMap<String, TypeExpr>,
}

impl Serialize for Namespace {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        NamespaceView {
            name: self.name(),
            models: self
                .models()
                .into_iter()
                .map(|(name, model)| (name.to_string(), model))
                .collect(),
            types: self
                .exported_types()
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty))
                .collect(),
        }
        .serialize(serializer)
    }
}
