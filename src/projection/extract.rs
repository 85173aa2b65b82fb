// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::model::{ModelError, ModelRef};
use crate::types::{Origin, TypeExpr};

/// Lists the concrete variants behind a type, in declaration order.
///
/// Root models and annotated wrappers are unwrapped, union arms are flattened in
/// order and duplicates are kept, so callers can index the result: the first entry
/// is the primary variant. Non-model leaves are only included when `only_models`
/// is false.
pub fn extract_concrete_models(
    expr: &TypeExpr,
    only_models: bool,
) -> Result<Vec<TypeExpr>, ModelError> {
    let mut found = vec![];
    let mut unwrapping = vec![];
    extract(expr, only_models, &mut unwrapping, &mut found)?;
    Ok(found)
}

/// The concrete models behind `model`: itself, or every model its root type unwraps to.
pub fn extract_models(model: &ModelRef) -> Result<Vec<ModelRef>, ModelError> {
    Ok(extract_concrete_models(&TypeExpr::model(model), true)?
        .into_iter()
        .filter_map(|expr| match expr {
            TypeExpr::Model(model) => Some(model),
            _ => None,
        })
        .collect())
}

fn extract(
    expr: &TypeExpr,
    only_models: bool,
    unwrapping: &mut Vec<ModelRef>,
    found: &mut Vec<TypeExpr>,
) -> Result<(), ModelError> {
    match expr {
        TypeExpr::Model(model) => match model.root_type()? {
            // A root model that wraps itself contributes nothing the second time.
            Some(_) if unwrapping.contains(model) => Ok(()),
            Some(root) => {
                unwrapping.push(model.clone());
                let result = extract(root, only_models, unwrapping, found);
                unwrapping.pop();
                result
            }
            None => {
                found.push(expr.clone());
                Ok(())
            }
        },
        TypeExpr::Annotated { base, .. } => extract(base, only_models, unwrapping, found),
        TypeExpr::Generic { origin, args } if origin.is_union_like() => {
            for arm in args.iter() {
                extract(arm, only_models, unwrapping, found)?;
            }
            if *origin == Origin::Optional {
                extract(&TypeExpr::None, only_models, unwrapping, found)?;
            }
            Ok(())
        }
        _ => {
            if !only_models {
                found.push(expr.clone());
            }
            Ok(())
        }
    }
}
