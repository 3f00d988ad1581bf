use serde::Serialize;

/// Icon names the site can render.
pub const ICONS: &[&str] = &[
    "award",
    "clock",
    "cow",
    "droplet",
    "factory",
    "heart",
    "leaf",
    "map-pin",
    "milk",
    "package",
    "shield-check",
    "sprout",
    "star",
    "sun",
    "thermometer",
    "truck",
    "users",
    "wheat",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IconView {
    Known { name: &'static str },
    /// Placeholder for a name outside the icon set.
    Invalid { requested: String },
}

/// Resolve an icon name. Accepts kebab-case, snake_case or PascalCase
/// (`ShieldCheck`, `shield_check`, `shield-check`).
pub fn icon(name: &str) -> IconView {
    let normalized = normalize(name);
    match ICONS.iter().copied().find(|known| *known == normalized) {
        Some(known) => IconView::Known { name: known },
        None => IconView::Invalid {
            requested: name.to_string(),
        },
    }
}

fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (index, c) in name.trim().chars().enumerate() {
        if c == '_' || c == ' ' || c == '-' {
            if !out.ends_with('-') {
                out.push('-');
            }
        } else if c.is_ascii_uppercase() {
            if index > 0 && !out.ends_with('-') {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_name_variants() {
        assert_eq!(icon("milk"), IconView::Known { name: "milk" });
        assert_eq!(icon("ShieldCheck"), IconView::Known { name: "shield-check" });
        assert_eq!(icon("map_pin"), IconView::Known { name: "map-pin" });
        assert_eq!(icon(" Leaf "), IconView::Known { name: "leaf" });
    }

    #[test]
    fn unknown_names_degrade_to_placeholder() {
        assert_eq!(
            icon("Unicorn"),
            IconView::Invalid {
                requested: "Unicorn".into()
            }
        );
        assert!(matches!(icon(""), IconView::Invalid { .. }));
    }
}
