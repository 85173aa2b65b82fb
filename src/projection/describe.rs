// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::config::Lexicon;

/// Joins items into a readable list: `a, b and c`.
///
/// With `literals` set, every item is wrapped in backticks.
pub fn format_list<S: AsRef<str>>(items: &[S], literals: bool, lexicon: &Lexicon) -> String {
    let strings: Vec<String> = items
        .iter()
        .map(|item| {
            if literals {
                format!("`{}`", item.as_ref())
            } else {
                item.as_ref().to_string()
            }
        })
        .collect();

    match strings.as_slice() {
        [] => String::new(),
        [single] => single.clone(),
        [head @ .., last] => format!(
            "{} {} {last}",
            head.join(format!("{} ", lexicon.separator).as_str()),
            lexicon.conjunction
        ),
    }
}

/// Doubles every newline so paragraph breaks survive markup-light renderers.
/// Empty text is treated as absent.
pub fn format_description(text: Option<&str>) -> Option<String> {
    match text {
        Some(text) if !text.is_empty() => Some(text.replace('\n', "\n\n")),
        _ => None,
    }
}

/// Appends an aliases note to a field description.
pub(crate) fn compose_description(
    original: Option<String>,
    name: &str,
    extra_aliases: &[impl AsRef<str>],
    lexicon: &Lexicon,
) -> Option<String> {
    if extra_aliases.is_empty() {
        return original;
    }

    let mut names = Vec::with_capacity(extra_aliases.len() + 1);
    names.push(name);
    names.extend(extra_aliases.iter().map(|alias| alias.as_ref()));

    let note = format!(
        "**{}**: {}",
        lexicon.aliases_label,
        format_list(&names, true, lexicon)
    );
    match original {
        Some(original) if !original.is_empty() => Some(format!("{original}\n\n{note}")),
        _ => Some(note),
    }
}
