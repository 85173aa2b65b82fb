// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::model::{Alias, AliasChoice};
use crate::*;

/// Resolves the public name of a field and its secondary aliases.
///
/// Only names can be documented, so path aliases are skipped. Anything that does not
/// yield a name falls back to `fallback` with no extra aliases.
pub fn resolve_field_name(alias: Option<&Alias>, fallback: &str) -> (Rc<str>, Vec<Rc<str>>) {
    match alias {
        Some(Alias::Name(name)) if !name.is_empty() => (name.clone(), vec![]),
        Some(Alias::Choices(choices)) => {
            let mut names = choices.iter().filter_map(|choice| match choice {
                AliasChoice::Name(name) => Some(name.clone()),
                AliasChoice::Path(_) => None,
            });
            match names.next() {
                Some(name) => (name, names.collect()),
                None => (fallback.into(), vec![]),
            }
        }
        _ => (fallback.into(), vec![]),
    }
}
