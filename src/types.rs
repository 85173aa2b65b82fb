// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Type expressions describe the shape of a field.
//!
//! A [`TypeExpr`] is a small tree: leaves are concrete types (`str`, `int`, `None`,
//! literal constants), references to models, or by-name forward references; inner
//! nodes are generics such as `Union[...]`, `list[...]` and annotated wrappers that
//! carry internal metadata (constraints, validators).
//!
//! Source graphs use every shape freely. Projected graphs are normalized:
//! annotated wrappers are reduced to their base and every union-like origin is a
//! single canonical `Union` (see [`TypeExpr::canonical_union`]).

use crate::model::ModelRef;
use crate::*;

use core::fmt;
use serde_json::Value;

/// A concrete leaf type identified by its qualified path, e.g. `builtins.str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Leaf {
    path: Rc<str>,
}

impl Leaf {
    pub fn new(path: impl Into<Rc<str>>) -> Self {
        Self { path: path.into() }
    }

    /// Qualified path of the leaf, used as its identity in replacement tables.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Display name: the last segment of the path.
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

/// Origin of a generic type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    Union,
    // `Optional[T]` is sugar for `Union[T, None]`.
    Optional,
    List,
    Set,
    Tuple,
    Dict,
    Literal,
    Other(Rc<str>),
}

impl Origin {
    pub fn is_union_like(&self) -> bool {
        matches!(self, Origin::Union | Origin::Optional)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Union => f.write_str("Union"),
            Origin::Optional => f.write_str("Optional"),
            Origin::List => f.write_str("list"),
            Origin::Set => f.write_str("set"),
            Origin::Tuple => f.write_str("tuple"),
            Origin::Dict => f.write_str("dict"),
            Origin::Literal => f.write_str("Literal"),
            Origin::Other(name) => f.write_str(name),
        }
    }
}

/// Internal metadata attached to a type through an annotated wrapper.
/// None of it survives projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Constraint { name: Rc<str>, value: Value },
    Validator(Rc<str>),
    Note(Rc<str>),
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Constraint { name, value } => write!(f, "{name}={value}"),
            Annotation::Validator(name) => f.write_str(name),
            Annotation::Note(text) => write!(f, "{text:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// The "no value" type.
    None,
    Leaf(Leaf),
    /// A literal constant, used as an argument of `Literal[...]`.
    Const(Value),
    Generic {
        origin: Origin,
        args: Rc<Vec<TypeExpr>>,
    },
    Annotated {
        base: Rc<TypeExpr>,
        metadata: Rc<Vec<Annotation>>,
    },
    Model(ModelRef),
    /// Reference to a model by its public name in the target namespace.
    Forward(Rc<str>),
}

impl TypeExpr {
    pub fn leaf(path: impl Into<Rc<str>>) -> Self {
        TypeExpr::Leaf(Leaf::new(path))
    }

    pub fn model(model: &ModelRef) -> Self {
        TypeExpr::Model(model.clone())
    }

    pub fn forward(name: impl Into<Rc<str>>) -> Self {
        TypeExpr::Forward(name.into())
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        TypeExpr::Const(value.into())
    }

    pub fn generic(origin: Origin, args: impl IntoIterator<Item = TypeExpr>) -> Self {
        TypeExpr::Generic {
            origin,
            args: Rc::new(args.into_iter().collect()),
        }
    }

    /// A raw `Union[...]` as written in a source definition. No normalization happens
    /// here; see [`TypeExpr::canonical_union`].
    pub fn union(args: impl IntoIterator<Item = TypeExpr>) -> Self {
        Self::generic(Origin::Union, args)
    }

    pub fn optional(inner: TypeExpr) -> Self {
        Self::generic(Origin::Optional, [inner])
    }

    pub fn list(item: TypeExpr) -> Self {
        Self::generic(Origin::List, [item])
    }

    pub fn set(item: TypeExpr) -> Self {
        Self::generic(Origin::Set, [item])
    }

    pub fn tuple(items: impl IntoIterator<Item = TypeExpr>) -> Self {
        Self::generic(Origin::Tuple, items)
    }

    pub fn dict(key: TypeExpr, value: TypeExpr) -> Self {
        Self::generic(Origin::Dict, [key, value])
    }

    pub fn literal<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::generic(Origin::Literal, values.into_iter().map(Self::constant))
    }

    pub fn annotated(base: TypeExpr, metadata: impl IntoIterator<Item = Annotation>) -> Self {
        TypeExpr::Annotated {
            base: Rc::new(base),
            metadata: Rc::new(metadata.into_iter().collect()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, TypeExpr::None)
    }

    /// True for the canonical union origin only. `Optional` is not canonical.
    pub fn is_union(&self) -> bool {
        matches!(
            self,
            TypeExpr::Generic {
                origin: Origin::Union,
                ..
            }
        )
    }

    pub fn as_model(&self) -> Option<&ModelRef> {
        match self {
            TypeExpr::Model(m) => Some(m),
            _ => None,
        }
    }

    /// Arguments of a generic, empty for everything else.
    pub fn args(&self) -> &[TypeExpr] {
        match self {
            TypeExpr::Generic { args, .. } => args,
            _ => &[],
        }
    }

    /// Stable identity used to look up replacements. Only leaves and models have one.
    pub fn qualified_identity(&self) -> Option<String> {
        match self {
            TypeExpr::Leaf(leaf) => Some(leaf.path().to_string()),
            TypeExpr::Model(model) => Some(model.qualname()),
            _ => None,
        }
    }

    /// Builds the canonical union of already normalized arms.
    ///
    /// Nested unions are flattened, repeated arms are dropped keeping the first
    /// occurrence, and a union left with a single arm collapses to that arm.
    pub fn canonical_union(arms: impl IntoIterator<Item = TypeExpr>) -> Self {
        let mut flat: Vec<TypeExpr> = vec![];
        for arm in arms {
            match arm {
                TypeExpr::Generic {
                    origin: Origin::Union,
                    args,
                } => {
                    for nested in args.iter() {
                        if !flat.contains(nested) {
                            flat.push(nested.clone());
                        }
                    }
                }
                arm => {
                    if !flat.contains(&arm) {
                        flat.push(arm);
                    }
                }
            }
        }

        if flat.len() == 1 {
            if let Some(single) = flat.pop() {
                return single;
            }
        }
        Self::union(flat)
    }

    /// Removes the `None` arm from a canonical union. Anything else is returned as is.
    pub fn without_none(self) -> Self {
        match self {
            TypeExpr::Generic {
                origin: Origin::Union,
                args,
            } if args.iter().any(TypeExpr::is_none) => {
                Self::canonical_union(args.iter().filter(|a| !a.is_none()).cloned())
            }
            other => other,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::None => f.write_str("None"),
            TypeExpr::Leaf(leaf) => f.write_str(leaf.name()),
            TypeExpr::Const(value) => write!(f, "{value}"),
            TypeExpr::Generic { origin, args } => {
                write!(f, "{origin}")?;
                if args.is_empty() {
                    return Ok(());
                }
                f.write_str("[")?;
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str("]")
            }
            TypeExpr::Annotated { base, metadata } => {
                write!(f, "Annotated[{base}")?;
                for annotation in metadata.iter() {
                    write!(f, ", {annotation}")?;
                }
                f.write_str("]")
            }
            TypeExpr::Model(model) => f.write_str(model.name()),
            TypeExpr::Forward(name) => f.write_str(name),
        }
    }
}

impl From<&ModelRef> for TypeExpr {
    fn from(model: &ModelRef) -> Self {
        TypeExpr::model(model)
    }
}
