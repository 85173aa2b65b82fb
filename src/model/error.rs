// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Errors raised while defining or reading a model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// `define` was called twice on the same model.
    #[error("model `{0}` is already defined")]
    AlreadyDefined(String),
    /// The model was declared but its definition was never supplied.
    #[error("model `{0}` was declared but never defined")]
    Undefined(String),
    #[error("model `{model}` declares field `{field}` more than once")]
    DuplicateField { model: String, field: String },
    #[error("root model `{0}` must declare exactly one field named `root`")]
    MalformedRoot(String),
    /// A default instance was requested for a model with a required field.
    #[error("model `{model}` has no default for required field `{field}`")]
    MissingDefault { model: String, field: String },
    /// Building a default instance of the model needs an instance of itself.
    #[error("default instance of model `{0}` depends on itself")]
    RecursiveDefault(String),
}
