use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::locale::Language;
use crate::Row;

/// A user-facing string with an English default and optional per-language
/// overrides. Stored remotely as `<base>_en`, `<base>_ar`, `<base>_fr`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedString {
    pub default: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<Language, String>,
}

impl LocalizedString {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn with(mut self, lang: Language, value: impl Into<String>) -> Self {
        if lang == Language::En {
            self.default = value.into();
        } else {
            self.overrides.insert(lang, value.into());
        }
        self
    }

    /// Read the column family `base` out of a row. Empty overrides are
    /// dropped so they never shadow the default.
    pub fn from_row(row: &Row, base: &str) -> Self {
        let mut value = Self::new(text(row, &Language::En.column(base)));
        for lang in [Language::Ar, Language::Fr] {
            let variant = text(row, &lang.column(base));
            if !variant.is_empty() {
                value.overrides.insert(lang, variant.to_string());
            }
        }
        value
    }

    /// The text to display for `lang`: the override when present and
    /// non-empty, otherwise the English default.
    pub fn resolve(&self, lang: Language) -> &str {
        match self.overrides.get(&lang) {
            Some(text) if !text.is_empty() => text,
            _ => &self.default,
        }
    }

    /// Write every language column back into `row`.
    pub fn write_to(&self, row: &mut Row, base: &str) {
        for lang in Language::ALL {
            let text = match lang {
                Language::En => self.default.clone(),
                other => self.overrides.get(&other).cloned().unwrap_or_default(),
            };
            row.insert(lang.column(base), Value::String(text));
        }
    }
}

/// Display value of the localized field family `base` for `lang`.
pub fn resolve(row: &Row, base: &str, lang: Language) -> String {
    LocalizedString::from_row(row, base).resolve(lang).to_string()
}

/// Same fallback rule for localized list columns such as `ingredients_ar`.
pub fn resolve_list(row: &Row, base: &str, lang: Language) -> Vec<String> {
    if lang != Language::En {
        let items = list(row, &lang.column(base));
        if !items.is_empty() {
            return items;
        }
    }
    list(row, &Language::En.column(base))
}

fn text<'a>(row: &'a Row, column: &str) -> &'a str {
    row.get(column).and_then(Value::as_str).unwrap_or_default()
}

fn list(row: &Row, column: &str) -> Vec<String> {
    match row.get(column) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
