// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::model::ModelRef;
use crate::projection::{register_model, rewrite_type, Mode, ProjectionConfig, ProjectionError};
use crate::types::TypeExpr;

/// Qualified identity of a model, the key of rename and replacement tables.
pub fn qualname(model: &ModelRef) -> String {
    model.qualname()
}

/// A batch of models published into one namespace with shared rename and
/// replacement tables. Each model is projected with its own mode.
#[derive(Debug, Clone)]
pub struct Catalog {
    config: ProjectionConfig,
    entries: Vec<(ModelRef, Mode)>,
}

impl Catalog {
    pub fn new(config: ProjectionConfig) -> Self {
        Self {
            config,
            entries: vec![],
        }
    }

    pub fn model(mut self, model: &ModelRef, mode: Mode) -> Self {
        self.entries.push((model.clone(), mode));
        self
    }

    pub fn models<'m>(mut self, models: impl IntoIterator<Item = &'m ModelRef>, mode: Mode) -> Self {
        self.entries
            .extend(models.into_iter().map(|model| (model.clone(), mode)));
        self
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn entries(&self) -> &[(ModelRef, Mode)] {
        &self.entries
    }

    /// Projects every entry in order. The first failure aborts the batch.
    pub fn register(&self) -> Result<Vec<TypeExpr>, ProjectionError> {
        let mut projected = Vec::with_capacity(self.entries.len());
        for (model, mode) in &self.entries {
            let config = self.config.with_mode(*mode);
            projected.push(register_model(model, &config)?);
        }
        tracing::debug!(
            namespace = self.config.namespace().name(),
            models = projected.len(),
            "registered catalog"
        );
        Ok(projected)
    }

    /// Rewrites a standalone type and exports it under `name`. When `name` is
    /// already exported, the earlier export is kept and returned.
    pub fn export_type(&self, name: &str, expr: &TypeExpr) -> Result<TypeExpr, ProjectionError> {
        let namespace = self.config.namespace();
        if let Some(existing) = namespace.exported_type(name) {
            return Ok(existing);
        }

        let rewritten = rewrite_type(expr, &self.config)?;
        namespace.export_type(name, rewritten.clone())?;
        Ok(namespace.exported_type(name).unwrap_or(rewritten))
    }
}
