// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Source model graphs described as data.
//!
//! A [`SourceCatalog`] lists the models of a module and is deserialized with serde
//! from JSON (or YAML with the `yaml` feature):
//!
//! ```yaml
//! module: loco.http
//! models:
//!   - name: CookieModel
//!     doc: An HTTP cookie.
//!     fields:
//!       - name: value
//!         type: str
//!       - name: path
//!         type: { optional: str }
//!         default: "/"
//!         serializationAlias: { choices: [path, Path] }
//!   - name: Cookies
//!     root: { list: { model: CookieModel } }
//! ```
//!
//! A type is either a string naming a leaf (`None` is the none type) or a map with a
//! single key: `model`, `forward`, `union`, `optional`, `list`, `set`, `tuple`,
//! `dict`, `literal`, `annotated` or `generic`.
//!
//! [`SourceCatalog::build`] declares every model before defining any of them, so
//! models may reference each other in any order, including themselves.

use crate::model::{Alias, AliasChoice, DefaultFactory, Field, ModelDef, ModelRef, PathSegment};
use crate::projection::{Lexicon, Mode, ProjectionConfig};
use crate::registry::Namespace;
use crate::types::{Annotation, Origin, TypeExpr};
use crate::*;

use anyhow::{anyhow, bail, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceCatalog {
    pub module: String,
    #[serde(default)]
    pub models: Vec<ModelSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    pub name: String,
    /// Overrides the catalog module for this model.
    pub module: Option<String>,
    pub doc: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub validators: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    /// Makes this a root model wrapping the given type.
    pub root: Option<TypeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeSpec,
    // `default: null` is an explicit null default, unlike a missing key.
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,
    pub default_factory: Option<FactorySpec>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub validation_alias: Option<AliasSpec>,
    pub serialization_alias: Option<AliasSpec>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FactorySpec {
    /// A factory returning a copy of this value.
    Value(Value),
    /// A factory instantiating the named model.
    Model(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    Leaf(String),
    Composite(Box<CompositeSpec>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompositeSpec {
    Model(String),
    Forward(String),
    Union(Vec<TypeSpec>),
    Optional(TypeSpec),
    List(TypeSpec),
    Set(TypeSpec),
    Tuple(Vec<TypeSpec>),
    Dict((TypeSpec, TypeSpec)),
    Literal(Vec<Value>),
    Annotated(AnnotatedSpec),
    Generic(GenericSpec),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotatedSpec {
    pub base: TypeSpec,
    #[serde(default)]
    pub metadata: Vec<AnnotationSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationSpec {
    Constraint { name: String, value: Value },
    Validator(String),
    Note(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenericSpec {
    pub origin: String,
    #[serde(default)]
    pub args: Vec<TypeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AliasSpec {
    Name(String),
    Composite(CompositeAliasSpec),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompositeAliasSpec {
    Path(Vec<SegmentSpec>),
    Choices(Vec<ChoiceSpec>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SegmentSpec {
    Index(i64),
    Key(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChoiceSpec {
    Name(String),
    Path(PathChoiceSpec),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathChoiceSpec {
    pub path: Vec<SegmentSpec>,
}

impl SourceCatalog {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| anyhow!("Failed to parse source catalog: {e}"))
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).map_err(|e| anyhow!("Failed to parse source catalog: {e}"))
    }

    /// Builds the model graph described by this catalog.
    pub fn build(&self) -> Result<SourceModels> {
        let mut models = SourceModels::default();
        let mut qualnames = Vec::with_capacity(self.models.len());
        for spec in &self.models {
            let model = ModelRef::declare(
                spec.module.as_deref().unwrap_or(&self.module),
                spec.name.as_str(),
            );
            let qualname = model.qualname();
            if models.by_qualname.contains_key(&qualname) {
                bail!("model {qualname} is declared more than once");
            }
            models.by_qualname.insert(qualname.clone(), model);
            qualnames.push(qualname);
        }

        for (spec, qualname) in self.models.iter().zip(&qualnames) {
            let model = models.resolve(qualname)?;
            let mut def = match &spec.root {
                Some(root) => {
                    if !spec.fields.is_empty() {
                        bail!("root model {} cannot declare fields", spec.name);
                    }
                    ModelDef::root(models.type_of(root)?)
                }
                None => {
                    let mut def = ModelDef::new();
                    for field in &spec.fields {
                        def = def.field(models.field_of(field)?);
                    }
                    def
                }
            };
            if let Some(doc) = &spec.doc {
                def = def.doc(doc.as_str());
            }
            if let Some(title) = &spec.title {
                def = def.title(title.as_str());
            }
            for validator in &spec.validators {
                def = def.validator(validator.as_str());
            }
            model.define(def)?;
        }

        Ok(models)
    }
}

/// Models built from a [`SourceCatalog`], in declaration order.
///
/// Models are identified by qualified name. A bare name also finds a model as long
/// as no other model shares it.
#[derive(Debug, Clone, Default)]
pub struct SourceModels {
    by_qualname: IndexMap<String, ModelRef>,
}

impl SourceModels {
    /// Looks a model up by qualified identity, or by a name that is not ambiguous.
    pub fn get(&self, name: &str) -> Option<&ModelRef> {
        self.find(name).ok().flatten()
    }

    pub fn resolve(&self, name: &str) -> Result<&ModelRef> {
        self.find(name)?
            .ok_or_else(|| anyhow!("unknown model {name}"))
    }

    fn find(&self, name: &str) -> Result<Option<&ModelRef>> {
        if let Some(model) = self.by_qualname.get(name) {
            return Ok(Some(model));
        }

        let mut matches = self.by_qualname.values().filter(|m| m.name() == name);
        match (matches.next(), matches.next()) {
            (Some(_), Some(_)) => bail!("model name {name} is ambiguous, use a qualified name"),
            (found, _) => Ok(found),
        }
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelRef> + '_ {
        self.by_qualname.values()
    }

    pub fn len(&self) -> usize {
        self.by_qualname.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_qualname.is_empty()
    }

    /// Builds a type expression, resolving model references against these models.
    pub fn type_of(&self, spec: &TypeSpec) -> Result<TypeExpr> {
        let composite = match spec {
            TypeSpec::Leaf(name) if name == "None" => return Ok(TypeExpr::None),
            TypeSpec::Leaf(name) => return Ok(TypeExpr::leaf(name.as_str())),
            TypeSpec::Composite(composite) => composite,
        };

        Ok(match composite.as_ref() {
            CompositeSpec::Model(name) => TypeExpr::model(self.resolve(name)?),
            CompositeSpec::Forward(name) => TypeExpr::forward(name.as_str()),
            CompositeSpec::Union(arms) => TypeExpr::union(self.types_of(arms)?),
            CompositeSpec::Optional(inner) => TypeExpr::optional(self.type_of(inner)?),
            CompositeSpec::List(item) => TypeExpr::list(self.type_of(item)?),
            CompositeSpec::Set(item) => TypeExpr::set(self.type_of(item)?),
            CompositeSpec::Tuple(items) => TypeExpr::tuple(self.types_of(items)?),
            CompositeSpec::Dict((key, value)) => {
                TypeExpr::dict(self.type_of(key)?, self.type_of(value)?)
            }
            CompositeSpec::Literal(values) => TypeExpr::literal(values.iter().cloned()),
            CompositeSpec::Annotated(annotated) => TypeExpr::annotated(
                self.type_of(&annotated.base)?,
                annotated.metadata.iter().map(annotation_of),
            ),
            CompositeSpec::Generic(generic) => TypeExpr::generic(
                Origin::Other(generic.origin.as_str().into()),
                self.types_of(&generic.args)?,
            ),
        })
    }

    fn types_of(&self, specs: &[TypeSpec]) -> Result<Vec<TypeExpr>> {
        specs.iter().map(|spec| self.type_of(spec)).collect()
    }

    fn field_of(&self, spec: &FieldSpec) -> Result<Field> {
        let mut field = Field::new(spec.name.as_str(), self.type_of(&spec.ty)?);

        match (&spec.default, &spec.default_factory) {
            (Some(_), Some(_)) => {
                bail!("field {} declares both a default and a default factory", spec.name)
            }
            (Some(value), None) => field = field.with_default(value.clone()),
            (None, Some(FactorySpec::Value(value))) => {
                let value = value.clone();
                field = field.with_default_factory(DefaultFactory::func(move || value.clone()));
            }
            (None, Some(FactorySpec::Model(name))) => {
                field = field.with_default_factory(DefaultFactory::model(self.resolve(name)?));
            }
            (None, None) => {}
        }

        if let Some(title) = &spec.title {
            field = field.with_title(title.as_str());
        }
        if let Some(description) = &spec.description {
            field = field.with_description(description.as_str());
        }
        if let Some(alias) = &spec.validation_alias {
            field = field.with_validation_alias(alias_of(alias));
        }
        if let Some(alias) = &spec.serialization_alias {
            field = field.with_serialization_alias(alias_of(alias));
        }
        Ok(field)
    }
}

fn annotation_of(spec: &AnnotationSpec) -> Annotation {
    match spec {
        AnnotationSpec::Constraint { name, value } => Annotation::Constraint {
            name: name.as_str().into(),
            value: value.clone(),
        },
        AnnotationSpec::Validator(name) => Annotation::Validator(name.as_str().into()),
        AnnotationSpec::Note(text) => Annotation::Note(text.as_str().into()),
    }
}

fn segments_of(specs: &[SegmentSpec]) -> Vec<PathSegment> {
    specs
        .iter()
        .map(|segment| match segment {
            SegmentSpec::Index(index) => PathSegment::Index(*index),
            SegmentSpec::Key(key) => PathSegment::Key(key.as_str().into()),
        })
        .collect()
}

fn alias_of(spec: &AliasSpec) -> Alias {
    match spec {
        AliasSpec::Name(name) => Alias::name(name.as_str()),
        AliasSpec::Composite(CompositeAliasSpec::Path(path)) => Alias::Path(segments_of(path)),
        AliasSpec::Composite(CompositeAliasSpec::Choices(choices)) => Alias::Choices(
            choices
                .iter()
                .map(|choice| match choice {
                    ChoiceSpec::Name(name) => AliasChoice::Name(name.as_str().into()),
                    ChoiceSpec::Path(path) => AliasChoice::Path(segments_of(&path.path)),
                })
                .collect(),
        ),
    }
}

/// Projection settings described as data.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ConfigSpec {
    pub mode: Mode,
    pub short: bool,
    /// Keyed by qualified identity, or by model name when unambiguous.
    pub renames: IndexMap<String, String>,
    /// Keyed by model name or leaf identity.
    pub replaces: IndexMap<String, TypeSpec>,
    pub lexicon: Option<Lexicon>,
    pub recursion_limit: Option<usize>,
}

impl Default for ConfigSpec {
    fn default() -> Self {
        Self {
            mode: Mode::Input,
            short: true,
            renames: IndexMap::new(),
            replaces: IndexMap::new(),
            lexicon: None,
            recursion_limit: None,
        }
    }
}

impl ConfigSpec {
    /// Builds a configuration projecting `models` into `namespace`.
    pub fn resolve(&self, models: &SourceModels, namespace: Rc<Namespace>) -> Result<ProjectionConfig> {
        let mut config = ProjectionConfig::new(namespace)
            .mode(self.mode)
            .short(self.short);

        for (name, rename) in &self.renames {
            let model = models.resolve(name)?;
            config = config.rename_model(model, rename.as_str());
        }

        for (identity, substitute) in &self.replaces {
            let substitute = models.type_of(substitute)?;
            config = match models.find(identity)? {
                Some(model) => config.replace_model(model, substitute),
                None => config.replace(identity.as_str(), substitute),
            };
        }

        if let Some(lexicon) = &self.lexicon {
            config = config.lexicon(lexicon.clone());
        }
        if let Some(limit) = self.recursion_limit {
            config = config.recursion_limit(limit);
        }
        Ok(config)
    }
}
