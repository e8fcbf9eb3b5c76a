//! Path template resolution.
//!
//! Templates name their parameters either as `{key}` or as `:key`. Values are
//! substituted verbatim: no percent-encoding is applied, so callers pass
//! values that are already URL-safe.
//!
//! A `:key` placeholder must start with an ASCII letter or `_` and runs until
//! the first character that is not alphanumeric or `_`. This keeps ports
//! (`:3000`) and scheme separators (`://`) out of the placeholder grammar.

use std::collections::BTreeMap;

use crate::error::DispatchError;

/// Path parameter values keyed by placeholder name.
pub type PathParams = BTreeMap<String, String>;

/// Substitute every `{key}` and `:key` placeholder whose key is present in
/// `params`. Placeholders with no matching key are left in the output
/// unchanged.
pub fn resolve_path(template: &str, params: &PathParams) -> String {
    let mut missing = Vec::new();
    let resolved = substitute(template, params, &mut missing);
    for name in missing {
        tracing::warn!(placeholder = name, template, "path placeholder left unresolved");
    }
    resolved
}

/// Like [`resolve_path`], but fails on the first placeholder whose key is
/// absent from `params`.
pub fn resolve_path_strict(template: &str, params: &PathParams) -> Result<String, DispatchError> {
    let mut missing = Vec::new();
    let resolved = substitute(template, params, &mut missing);
    match missing.first() {
        Some(name) => Err(DispatchError::MissingPathParam {
            name: name.to_string(),
            template: template.to_string(),
        }),
        None => Ok(resolved),
    }
}

/// Placeholder names in the order they appear in `template`.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    substitute(template, &PathParams::new(), &mut names);
    names
}

fn substitute<'t>(template: &'t str, params: &PathParams, missing: &mut Vec<&'t str>) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let token = match bytes[i] {
            b'{' => braced(template, i),
            b':' => prefixed(template, i),
            _ => None,
        };
        let Some((name, end)) = token else {
            i += 1;
            continue;
        };

        out.push_str(&template[literal_start..i]);
        match params.get(name) {
            Some(value) => out.push_str(value),
            None => {
                out.push_str(&template[i..end]);
                missing.push(name);
            }
        }
        i = end;
        literal_start = end;
    }

    out.push_str(&template[literal_start..]);
    out
}

/// `{name}` starting at `start`; returns the name and the index past `}`.
fn braced(template: &str, start: usize) -> Option<(&str, usize)> {
    let close = start + 1 + template[start + 1..].find('}')?;
    let name = &template[start + 1..close];
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    valid.then_some((name, close + 1))
}

/// `:name` starting at `start`; returns the name and the index past it.
fn prefixed(template: &str, start: usize) -> Option<(&str, usize)> {
    let rest = &template[start + 1..];
    let len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let name = &rest[..len];
    name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        .then_some((name, start + 1 + len))
}
