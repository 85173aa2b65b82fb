// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Models and fields of a schema graph.
//!
//! A [`ModelRef`] is a shared, identity-compared handle to a model. Handles can be
//! declared before they are defined, which is how self-referential and mutually
//! recursive graphs are assembled:
//!
//! ```rust,ignore
//! let node = ModelRef::declare("app.tree", "Node");
//! node.define(
//!     ModelDef::new()
//!         .doc("A tree node.")
//!         .field(Field::new("children", TypeExpr::list(TypeExpr::model(&node)))),
//! )?;
//! ```
//!
//! Once defined, a model never changes. Projected models are regular models whose
//! `base` points at the source they extend.

use crate::types::TypeExpr;
use crate::*;

use core::{cmp, fmt, hash};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::OnceLock;

mod error;

pub use error::ModelError;

/// One segment of an alias path: an object key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(Rc<str>),
    Index(i64),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.into())
    }
}

impl From<i64> for PathSegment {
    fn from(index: i64) -> Self {
        PathSegment::Index(index)
    }
}

/// One alternative of a multi-choice alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasChoice {
    Name(Rc<str>),
    Path(Vec<PathSegment>),
}

impl From<&str> for AliasChoice {
    fn from(name: &str) -> Self {
        AliasChoice::Name(name.into())
    }
}

/// External name(s) a field is read from or written as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alias {
    Name(Rc<str>),
    Path(Vec<PathSegment>),
    Choices(Vec<AliasChoice>),
}

impl Alias {
    pub fn name(name: impl Into<Rc<str>>) -> Self {
        Alias::Name(name.into())
    }

    pub fn path<S: Into<PathSegment>>(segments: impl IntoIterator<Item = S>) -> Self {
        Alias::Path(segments.into_iter().map(Into::into).collect())
    }

    pub fn choices<C: Into<AliasChoice>>(choices: impl IntoIterator<Item = C>) -> Self {
        Alias::Choices(choices.into_iter().map(Into::into).collect())
    }
}

/// Produces a default value on demand.
#[derive(Clone)]
pub enum DefaultFactory {
    Func(Rc<dyn Fn() -> Value + Send + Sync>),
    /// Instantiates a model with its own defaults. Root models yield their root value.
    Model(ModelRef),
}

impl DefaultFactory {
    pub fn func(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        DefaultFactory::Func(Rc::new(f))
    }

    pub fn model(model: &ModelRef) -> Self {
        DefaultFactory::Model(model.clone())
    }

    pub fn produce(&self) -> Result<Value, ModelError> {
        self.produce_within(&mut vec![])
    }

    /// `instantiating` holds the models whose default instances are being built.
    fn produce_within(&self, instantiating: &mut Vec<ModelRef>) -> Result<Value, ModelError> {
        match self {
            DefaultFactory::Func(f) => Ok(f()),
            DefaultFactory::Model(model) => model.instantiate(instantiating),
        }
    }
}

impl fmt::Debug for DefaultFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultFactory::Func(_) => f.write_str("Func(..)"),
            DefaultFactory::Model(model) => f.debug_tuple("Model").field(model).finish(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum FieldDefault {
    #[default]
    Required,
    Value(Value),
    Factory(DefaultFactory),
}

#[derive(Debug, Clone)]
pub struct Field {
    name: Rc<str>,
    ty: TypeExpr,
    default: FieldDefault,
    title: Option<Rc<str>>,
    description: Option<Rc<str>>,
    validation_alias: Option<Alias>,
    serialization_alias: Option<Alias>,
}

impl Field {
    pub fn new(name: impl Into<Rc<str>>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            default: FieldDefault::Required,
            title: None,
            description: None,
            validation_alias: None,
            serialization_alias: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    pub fn with_default_factory(mut self, factory: DefaultFactory) -> Self {
        self.default = FieldDefault::Factory(factory);
        self
    }

    pub fn with_title(mut self, title: impl Into<Rc<str>>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<Rc<str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_validation_alias(mut self, alias: Alias) -> Self {
        self.validation_alias = Some(alias);
        self
    }

    pub fn with_serialization_alias(mut self, alias: Alias) -> Self {
        self.serialization_alias = Some(alias);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeExpr {
        &self.ty
    }

    pub fn default(&self) -> &FieldDefault {
        &self.default
    }

    pub fn is_required(&self) -> bool {
        matches!(self.default, FieldDefault::Required)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn validation_alias(&self) -> Option<&Alias> {
        self.validation_alias.as_ref()
    }

    pub fn serialization_alias(&self) -> Option<&Alias> {
        self.serialization_alias.as_ref()
    }

    pub(crate) fn name_rc(&self) -> &Rc<str> {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    Plain,
    /// Transparent wrapper around the type of its single `root` field.
    Root,
}

/// Definition of a model, handed to [`ModelRef::define`].
#[derive(Debug, Clone, Default)]
pub struct ModelDef {
    doc: Option<Rc<str>>,
    title: Option<Rc<str>>,
    kind: ModelKind,
    fields: Vec<Field>,
    validators: Vec<Rc<str>>,
}

impl ModelDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(ty: TypeExpr) -> Self {
        Self {
            kind: ModelKind::Root,
            fields: vec![Field::new("root", ty)],
            ..Self::default()
        }
    }

    pub fn doc(mut self, doc: impl Into<Rc<str>>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn title(mut self, title: impl Into<Rc<str>>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Names a model-level validator. Validators are carried for the source model
    /// and inherited by models that extend it.
    pub fn validator(mut self, name: impl Into<Rc<str>>) -> Self {
        self.validators.push(name.into());
        self
    }
}

#[derive(Debug)]
pub struct ModelBody {
    pub(crate) doc: Option<Rc<str>>,
    pub(crate) title: Option<Rc<str>>,
    pub(crate) kind: ModelKind,
    pub(crate) fields: IndexMap<Rc<str>, Field>,
    pub(crate) validators: Vec<Rc<str>>,
    pub(crate) base: Option<ModelRef>,
}

impl ModelBody {
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn base(&self) -> Option<&ModelRef> {
        self.base.as_ref()
    }
}

struct ModelCell {
    module: Rc<str>,
    name: Rc<str>,
    body: OnceLock<ModelBody>,
}

/// Shared handle to a model. Two handles are equal only if they point to the same model.
pub struct ModelRef {
    r: Rc<ModelCell>,
}

impl Clone for ModelRef {
    fn clone(&self) -> Self {
        Self { r: self.r.clone() }
    }
}

// Models may reference themselves; print the identity only.
impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelRef({})", self.qualname())
    }
}

impl cmp::PartialEq for ModelRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.r, &other.r)
    }
}

impl cmp::Eq for ModelRef {}

impl hash::Hash for ModelRef {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.r).hash(state)
    }
}

impl ModelRef {
    /// Declares a model whose definition is supplied later via [`ModelRef::define`].
    pub fn declare(module: impl Into<Rc<str>>, name: impl Into<Rc<str>>) -> Self {
        Self {
            r: Rc::new(ModelCell {
                module: module.into(),
                name: name.into(),
                body: OnceLock::new(),
            }),
        }
    }

    /// Declares and defines a model in one step.
    pub fn new(
        module: impl Into<Rc<str>>,
        name: impl Into<Rc<str>>,
        def: ModelDef,
    ) -> Result<Self, ModelError> {
        let model = Self::declare(module, name);
        model.define(def)?;
        Ok(model)
    }

    pub fn define(&self, def: ModelDef) -> Result<(), ModelError> {
        if def.kind == ModelKind::Root
            && (def.fields.len() != 1 || def.fields.iter().any(|f| f.name() != "root"))
        {
            return Err(ModelError::MalformedRoot(self.qualname()));
        }

        let mut fields = IndexMap::with_capacity(def.fields.len());
        for field in def.fields {
            if fields.contains_key(field.name()) {
                return Err(ModelError::DuplicateField {
                    model: self.qualname(),
                    field: field.name().to_string(),
                });
            }
            fields.insert(field.name_rc().clone(), field);
        }

        self.set_body(ModelBody {
            doc: def.doc,
            title: def.title,
            kind: def.kind,
            fields,
            validators: def.validators,
            base: None,
        })
    }

    pub(crate) fn set_body(&self, body: ModelBody) -> Result<(), ModelError> {
        self.r
            .body
            .set(body)
            .map_err(|_| ModelError::AlreadyDefined(self.qualname()))
    }

    pub fn module(&self) -> &str {
        &self.r.module
    }

    pub fn name(&self) -> &str {
        &self.r.name
    }

    pub(crate) fn name_rc(&self) -> &Rc<str> {
        &self.r.name
    }

    /// Qualified identity: `module.name`.
    pub fn qualname(&self) -> String {
        format!("{}.{}", self.r.module, self.r.name)
    }

    pub fn is_defined(&self) -> bool {
        self.r.body.get().is_some()
    }

    pub fn body(&self) -> Result<&ModelBody, ModelError> {
        self.r
            .body
            .get()
            .ok_or_else(|| ModelError::Undefined(self.qualname()))
    }

    /// The wrapped type when this is a root model.
    pub fn root_type(&self) -> Result<Option<&TypeExpr>, ModelError> {
        let body = self.body()?;
        if body.kind != ModelKind::Root {
            return Ok(None);
        }
        Ok(body.fields.get("root").map(Field::ty))
    }

    pub fn is_root(&self) -> bool {
        matches!(self.root_type(), Ok(Some(_)))
    }

    /// Model-level validators, own first, then those inherited through `base`.
    pub fn validators(&self) -> Vec<Rc<str>> {
        let mut validators = vec![];
        let mut current = Some(self.clone());
        while let Some(model) = current {
            let Ok(body) = model.body() else {
                break;
            };
            validators.extend(body.validators.iter().cloned());
            current = body.base.clone();
        }
        validators
    }

    /// True if `other` is this model or one of the models it extends.
    pub fn extends(&self, other: &ModelRef) -> bool {
        let mut current = Some(self.clone());
        while let Some(model) = current {
            if &model == other {
                return true;
            }
            current = model.body().ok().and_then(|b| b.base.clone());
        }
        false
    }

    /// Builds the value a default factory naming this model would produce.
    ///
    /// Root models produce their root value directly; other models produce an
    /// object holding the defaults of every field. A model whose defaults need an
    /// instance of itself fails with [`ModelError::RecursiveDefault`].
    pub fn default_instance(&self) -> Result<Value, ModelError> {
        self.instantiate(&mut vec![])
    }

    fn instantiate(&self, instantiating: &mut Vec<ModelRef>) -> Result<Value, ModelError> {
        if instantiating.contains(self) {
            return Err(ModelError::RecursiveDefault(self.qualname()));
        }

        instantiating.push(self.clone());
        let result = self.collect_defaults(instantiating);
        instantiating.pop();
        result
    }

    fn collect_defaults(&self, instantiating: &mut Vec<ModelRef>) -> Result<Value, ModelError> {
        let body = self.body()?;
        let mut object = serde_json::Map::new();
        for field in body.fields() {
            let value = match &field.default {
                FieldDefault::Value(value) => value.clone(),
                FieldDefault::Factory(factory) => factory.produce_within(instantiating)?,
                FieldDefault::Required => {
                    return Err(ModelError::MissingDefault {
                        model: self.qualname(),
                        field: field.name().to_string(),
                    })
                }
            };
            if body.kind == ModelKind::Root {
                return Ok(value);
            }
            object.insert(field.name().to_string(), value);
        }
        Ok(Value::Object(object))
    }
}
