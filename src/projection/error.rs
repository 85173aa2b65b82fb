// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::model::ModelError;
use crate::registry::NamespaceError;

/// Errors that abort a projection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    /// Nested models went deeper than the configured recursion limit.
    #[error("recursion limit of {limit} exceeded while projecting `{model}`")]
    RecursionLimit { model: String, limit: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Namespace(#[from] NamespaceError),
}
