//! Image references: classifying stored URLs for preview and naming uploads.
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::schema::{FieldKind, Schema};
use crate::Row;

/// Distributor locations may store an embeddable map instead of a photo.
pub const MAP_EMBED_PREFIX: &str = "https://www.google.com/maps/embed?";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg", "avif", "bmp"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    None,
    MapEmbed { url: String },
    Image { url: String },
    /// Not recognizably an image file; still rendered, but flagged.
    Unrecognized { url: String },
}

impl ImageRef {
    pub fn classify(url: Option<&str>) -> Self {
        let Some(url) = url.map(str::trim).filter(|url| !url.is_empty()) else {
            return ImageRef::None;
        };
        if url.starts_with(MAP_EMBED_PREFIX) {
            ImageRef::MapEmbed {
                url: url.to_string(),
            }
        } else if has_image_extension(url) {
            ImageRef::Image {
                url: url.to_string(),
            }
        } else {
            ImageRef::Unrecognized {
                url: url.to_string(),
            }
        }
    }

    pub fn from_row(row: &Row, column: &str) -> Self {
        Self::classify(row.get(column).and_then(Value::as_str))
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            ImageRef::None => None,
            ImageRef::MapEmbed { url }
            | ImageRef::Image { url }
            | ImageRef::Unrecognized { url } => Some(url),
        }
    }
}

/// A non-blocking notice shown next to an image preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewWarning {
    pub field: String,
    pub message: String,
}

/// Flag URL columns of `row` whose value does not look like an image file.
/// Only the schema's image column may hold a map embed.
pub fn preview_warnings(schema: &Schema, row: &Row) -> Vec<PreviewWarning> {
    let Some(image_field) = schema.image_field else {
        return Vec::new();
    };
    let is_url_column = schema
        .field(image_field)
        .is_some_and(|field| field.kind == FieldKind::Url);
    if !is_url_column {
        return Vec::new();
    }
    match ImageRef::from_row(row, image_field) {
        ImageRef::Unrecognized { url } => vec![PreviewWarning {
            field: image_field.to_string(),
            message: format!(
                "{url} does not look like an image file (expected one of: {})",
                IMAGE_EXTENSIONS.join(", ")
            ),
        }],
        _ => Vec::new(),
    }
}

fn has_image_extension(url: &str) -> bool {
    let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
    let Some((_, extension)) = path.rsplit_once('.') else {
        return false;
    };
    if extension.contains('/') {
        return false;
    }
    let extension = extension.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&extension.as_str())
}

/// Keep ASCII alphanumerics, dots, dashes and underscores; everything else
/// becomes a dash.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c == '-' || c == '.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Object path for a new upload into the table's folder.
pub fn upload_path(table: &str, file_name: &str) -> String {
    format!("{table}/{}-{}", Uuid::now_v7(), sanitize_file_name(file_name))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::EntityKind;

    #[test]
    fn classifies_urls() {
        assert_eq!(ImageRef::classify(None), ImageRef::None);
        assert_eq!(ImageRef::classify(Some("  ")), ImageRef::None);
        assert!(matches!(
            ImageRef::classify(Some("https://cdn.example.com/milk.JPG?w=400")),
            ImageRef::Image { .. }
        ));
        assert!(matches!(
            ImageRef::classify(Some("https://www.google.com/maps/embed?pb=!1m18")),
            ImageRef::MapEmbed { .. }
        ));
        assert!(matches!(
            ImageRef::classify(Some("https://example.com/gallery")),
            ImageRef::Unrecognized { .. }
        ));
        assert!(matches!(
            ImageRef::classify(Some("https://example.com/v1.2/photo")),
            ImageRef::Unrecognized { .. }
        ));
    }

    #[test]
    fn warns_on_unrecognized_image() {
        let schema = EntityKind::Product.schema();
        let row = json!({ "image_url": "https://example.com/page.html" });
        let warnings = preview_warnings(schema, row.as_object().unwrap());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "image_url");

        let row = json!({ "image_url": "https://example.com/photo.webp" });
        assert!(preview_warnings(schema, row.as_object().unwrap()).is_empty());
    }

    #[test]
    fn map_embed_is_not_flagged() {
        let schema = EntityKind::Distributor.schema();
        let row = json!({ "image_url": "https://www.google.com/maps/embed?pb=abc" });
        assert!(preview_warnings(schema, row.as_object().unwrap()).is_empty());
    }

    #[test]
    fn sanitizes_file_names() {
        assert_eq!(sanitize_file_name("Fresh Milk (1).PNG"), "fresh-milk--1-.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("???"), "upload");
        let path = upload_path("products", "a b.jpg");
        assert!(path.starts_with("products/"));
        assert!(path.ends_with("-a-b.jpg"));
    }
}
