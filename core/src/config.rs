//! Client configuration.
//!
//! Deserializable so an embedding application can keep it in its own
//! settings file; every field has a default.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefixed to every endpoint template before path parameters are
    /// resolved, so it may carry placeholders of its own.
    pub base_url: String,
    /// Fail with `MissingPathParam` instead of sending a URL that still
    /// contains an unresolved placeholder.
    pub strict_path_params: bool,
    /// Raise statuses outside both tables the same way as error statuses.
    pub unclassified_status_is_error: bool,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn strict_path_params(mut self, strict: bool) -> Self {
        self.strict_path_params = strict;
        self
    }

    pub fn unclassified_status_is_error(mut self, raise: bool) -> Self {
        self.unclassified_status_is_error = raise;
        self
    }

    /// `base_url` followed by `template`, with exactly one `/` between them.
    ///
    /// An empty base, an empty template or a template that starts with `?`
    /// is appended as-is.
    pub fn join(&self, template: &str) -> String {
        let base = self.base_url.as_str();
        if base.is_empty() || template.is_empty() || template.starts_with('?') {
            return format!("{base}{template}");
        }
        format!(
            "{}/{}",
            base.strip_suffix('/').unwrap_or(base),
            template.strip_prefix('/').unwrap_or(template)
        )
    }
}
