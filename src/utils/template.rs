//! `%field%` substitution for custom output formats.

use crate::core::job::FieldMap;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%([A-Za-z0-9_.\-]+)%").expect("placeholder pattern is valid")
});

/// A user-supplied output template such as `%id% %group%/%name%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    format: String,
}

impl Template {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    /// Substitutes every `%field%` from `fields`. Unknown fields render empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rdjobs::core::job::FieldMap;
    /// use rdjobs::utils::template::Template;
    ///
    /// let mut fields = FieldMap::new();
    /// fields.insert("id", "a1".to_string());
    /// fields.insert("name", "nightly".to_string());
    ///
    /// let template = Template::new("%id%\t%name%\t%missing%");
    /// assert_eq!(template.render(&fields), "a1\tnightly\t");
    /// ```
    pub fn render(&self, fields: &FieldMap) -> String {
        PLACEHOLDER
            .replace_all(&self.format, |caps: &Captures| {
                fields.get(&caps[1]).cloned().unwrap_or_default()
            })
            .into_owned()
    }
}
