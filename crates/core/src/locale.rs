use std::fmt;

use serde::{Deserialize, Serialize};

/// Languages the site is published in. English is the fallback for every
/// localized field.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
    Fr,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Ar, Language::Fr];

    pub fn tag(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
            Language::Fr => "fr",
        }
    }

    /// Parse a language tag such as `ar`, `fr-CA` or `EN`. Only the primary
    /// subtag is considered; anything unsupported maps to English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(|c: char| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "ar" => Language::Ar,
            "fr" => Language::Fr,
            _ => Language::En,
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }

    /// Text direction attribute for rendered content.
    pub fn dir(self) -> &'static str {
        if self.is_rtl() {
            "rtl"
        } else {
            "ltr"
        }
    }

    /// Column holding this language's variant of a localized field family.
    pub fn column(self, base: &str) -> String {
        format!("{base}_{}", self.tag())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
