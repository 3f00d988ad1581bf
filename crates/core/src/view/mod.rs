//! Presentation models for the public site and admin tables.
//!
//! These are pure functions of `(rows, language)`: no store access happens
//! here. Empty collections always produce an explicit empty state.

pub mod icons;
pub mod messages;

use serde::Serialize;
use serde_json::Value;

use crate::locale::Language;
use crate::localized::{resolve, resolve_list};
use crate::media::ImageRef;
use crate::schema::{EntityKind, FieldKind, Schema, ORDER_INDEX};
use crate::store::row_id;
use crate::Row;

pub use icons::{icon, IconView};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub image: ImageRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ListView {
    Empty { message: String },
    Grid { cards: Vec<Card> },
}

impl ListView {
    pub fn is_empty(&self) -> bool {
        matches!(self, ListView::Empty { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSection {
    pub name: &'static str,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub image: ImageRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lists: Vec<ListSection>,
    /// Plain (non-localized) columns such as phone or percentage.
    #[serde(skip_serializing_if = "Row::is_empty")]
    pub fields: Row,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub dir: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DetailPage {
    Found(DetailView),
    NotFound { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub id: Option<String>,
    pub cells: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TableView {
    Empty { message: String },
    Rows {
        columns: Vec<&'static str>,
        rows: Vec<TableRow>,
    },
}

const TABLE_SUMMARY_CHARS: usize = 80;

/// Text of `column` for display: localized families are resolved, plain
/// columns are stringified, nulls are empty.
pub fn display_text(schema: &Schema, row: &Row, column: &str, lang: Language) -> String {
    match schema.field(column) {
        Some(field) if matches!(field.kind, FieldKind::Localized { .. }) => {
            resolve(row, column, lang)
        }
        _ => match row.get(column) {
            Some(Value::String(text)) => text.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => other.to_string(),
        },
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn image(schema: &Schema, row: &Row) -> ImageRef {
    schema
        .image_field
        .map(|column| ImageRef::from_row(row, column))
        .unwrap_or(ImageRef::None)
}

fn row_icon(schema: &Schema, row: &Row) -> Option<IconView> {
    let column = schema.display.icon?;
    let name = row.get(column).and_then(Value::as_str).unwrap_or_default();
    Some(icon(name))
}

pub fn card(kind: EntityKind, row: &Row, lang: Language) -> Card {
    let schema = kind.schema();
    let id = row_id(row);
    let href = match (schema.display.route, &id) {
        (Some(route), Some(id)) => Some(format!("{route}/{id}")),
        _ => None,
    };
    Card {
        title: display_text(schema, row, schema.display.title, lang),
        summary: schema
            .display
            .summary
            .and_then(|column| non_empty(display_text(schema, row, column, lang))),
        image: image(schema, row),
        icon: row_icon(schema, row),
        href,
        id,
    }
}

/// Cards for a public grid, or the empty-state message.
pub fn card_list(kind: EntityKind, rows: &[Row], lang: Language) -> ListView {
    if rows.is_empty() {
        return ListView::Empty {
            message: messages::empty_state(kind, lang),
        };
    }
    ListView::Grid {
        cards: rows.iter().map(|row| card(kind, row, lang)).collect(),
    }
}

pub fn detail(kind: EntityKind, row: &Row, lang: Language) -> DetailView {
    let schema = kind.schema();
    let display = &schema.display;

    let lists = display
        .lists
        .iter()
        .copied()
        .map(|name| ListSection {
            name,
            items: resolve_list(row, name, lang),
        })
        .collect();

    let mut fields = Row::new();
    for field in schema.fields {
        let shown_elsewhere = Some(field.name) == schema.image_field
            || field.name == display.title
            || Some(field.name) == display.summary
            || Some(field.name) == display.body
            || display.lists.contains(&field.name)
            || field.name == ORDER_INDEX;
        if shown_elsewhere {
            continue;
        }
        let value = match field.kind {
            FieldKind::Localized { .. } => {
                non_empty(resolve(row, field.name, lang)).map(Value::from)
            }
            FieldKind::LocalizedList => {
                let items = resolve_list(row, field.name, lang);
                (!items.is_empty()).then(|| Value::from(items))
            }
            FieldKind::Text { .. }
            | FieldKind::Email
            | FieldKind::Integer { .. }
            | FieldKind::Url => match row.get(field.name) {
                None | Some(Value::Null) => None,
                Some(Value::String(text)) if text.is_empty() => None,
                Some(value) => Some(value.clone()),
            },
            FieldKind::Bool | FieldKind::Icon => None,
        };
        if let Some(value) = value {
            fields.insert(field.name.to_string(), value);
        }
    }

    DetailView {
        id: row_id(row),
        title: display_text(schema, row, display.title, lang),
        summary: display
            .summary
            .and_then(|column| non_empty(display_text(schema, row, column, lang))),
        body: display
            .body
            .and_then(|column| non_empty(display_text(schema, row, column, lang))),
        image: image(schema, row),
        icon: row_icon(schema, row),
        lists,
        fields,
        created_at: row.get("created_at").and_then(Value::as_str).map(str::to_string),
        dir: lang.dir(),
    }
}

/// Detail layout, or the not-found state when the row is missing.
pub fn detail_page(kind: EntityKind, row: Option<&Row>, lang: Language) -> DetailPage {
    match row {
        Some(row) => DetailPage::Found(detail(kind, row, lang)),
        None => DetailPage::NotFound {
            message: messages::not_found(kind, lang),
        },
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Admin management table for `rows`.
pub fn admin_table(kind: EntityKind, rows: &[Row], lang: Language) -> TableView {
    if rows.is_empty() {
        return TableView::Empty {
            message: messages::empty_state(kind, lang),
        };
    }
    let schema = kind.schema();
    let mut columns = vec!["title"];
    if schema.display.summary.is_some() {
        columns.push("summary");
    }
    if schema.is_ordered() {
        columns.push(ORDER_INDEX);
    }
    if let Some(flag) = schema.visibility.filter(|flag| Some(*flag) != schema.single_active) {
        columns.push(flag);
    }

    let rows = rows
        .iter()
        .map(|row| {
            let mut cells = vec![display_text(schema, row, schema.display.title, lang)];
            if let Some(column) = schema.display.summary {
                cells.push(truncate(&display_text(schema, row, column, lang), TABLE_SUMMARY_CHARS));
            }
            if schema.is_ordered() {
                cells.push(display_text(schema, row, ORDER_INDEX, lang));
            }
            let visibility = schema
                .visibility
                .filter(|flag| Some(*flag) != schema.single_active);
            if let Some(flag) = visibility {
                let on = row.get(flag).and_then(Value::as_bool).unwrap_or(false);
                cells.push(on.to_string());
            }
            TableRow {
                id: row_id(row),
                cells,
                active: schema
                    .single_active
                    .map(|column| row.get(column).and_then(Value::as_bool).unwrap_or(false)),
            }
        })
        .collect();

    TableView::Rows { columns, rows }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_collection_renders_message() {
        let view = card_list(EntityKind::Recipe, &[], Language::Fr);
        assert_eq!(
            view,
            ListView::Empty {
                message: messages::empty_state(EntityKind::Recipe, Language::Fr)
            }
        );
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["state"], json!("empty"));
    }

    #[test]
    fn cards_are_localized_with_fallback() {
        let rows = vec![row(json!({
            "id": "p1",
            "name_en": "Milk", "name_ar": "حليب", "name_fr": "",
            "description_en": "Whole milk from our farm.",
            "image_url": "https://cdn.test/milk.jpg",
        }))];
        let ListView::Grid { cards } = card_list(EntityKind::Product, &rows, Language::Fr) else {
            panic!("expected grid");
        };
        assert_eq!(cards[0].title, "Milk");
        assert_eq!(cards[0].href.as_deref(), Some("/products/p1"));
        assert!(matches!(cards[0].image, ImageRef::Image { .. }));

        let ListView::Grid { cards } = card_list(EntityKind::Product, &rows, Language::Ar) else {
            panic!("expected grid");
        };
        assert_eq!(cards[0].title, "حليب");
    }

    #[test]
    fn unknown_icons_render_placeholder() {
        let fact = row(json!({
            "id": 1,
            "title_en": "Grass fed",
            "description_en": "Our cows graze outdoors.",
            "icon": "Rocket",
        }));
        let card = card(EntityKind::Fact, &fact, Language::En);
        assert_eq!(
            card.icon,
            Some(IconView::Invalid {
                requested: "Rocket".into()
            })
        );
        assert!(card.href.is_none());
    }

    #[test]
    fn recipe_detail_lists_fall_back() {
        let recipe = row(json!({
            "id": "r1",
            "title_en": "Ayran", "title_ar": "عيران",
            "description_en": "A salted yogurt drink.",
            "ingredients_en": ["yogurt", "water", "salt"],
            "ingredients_ar": [],
            "preparation_steps_en": ["Whisk"],
            "preparation_steps_ar": ["اخفق"],
            "prep_time_minutes": 5,
            "servings": null,
            "created_at": "2024-05-01T10:00:00Z",
        }));
        let view = detail(EntityKind::Recipe, &recipe, Language::Ar);
        assert_eq!(view.title, "عيران");
        assert_eq!(view.dir, "rtl");
        assert_eq!(view.lists[0].items, vec!["yogurt", "water", "salt"]);
        assert_eq!(view.lists[1].items, vec!["اخفق"]);
        assert_eq!(view.fields.get("prep_time_minutes"), Some(&json!(5)));
        assert!(!view.fields.contains_key("servings"));
    }

    #[test]
    fn missing_detail_renders_not_found() {
        let page = detail_page(EntityKind::BlogPost, None, Language::En);
        assert_eq!(
            page,
            DetailPage::NotFound {
                message: "Blog post not found.".into()
            }
        );
    }

    #[test]
    fn settings_detail_resolves_localized_extras() {
        let settings = row(json!({
            "id": "s1",
            "site_name": "Dairy",
            "tagline_en": "Fresh every morning",
            "address_en": "12 Farm Road",
            "address_fr": "12 chemin de la Ferme",
            "address_ar": "",
            "contact_email": "hello@farm.test",
            "phone": "",
        }));
        let fr = detail(EntityKind::SiteSettings, &settings, Language::Fr);
        assert_eq!(fr.title, "Dairy");
        assert_eq!(fr.fields.get("address"), Some(&json!("12 chemin de la Ferme")));
        assert_eq!(fr.fields.get("contact_email"), Some(&json!("hello@farm.test")));
        assert!(!fr.fields.contains_key("phone"));
        assert!(!fr.fields.contains_key("tagline"));

        let ar = detail(EntityKind::SiteSettings, &settings, Language::Ar);
        assert_eq!(ar.fields.get("address"), Some(&json!("12 Farm Road")));
    }

    #[test]
    fn admin_table_marks_active_row() {
        let rows = vec![
            row(json!({
                "id": "a",
                "title_en": "Spring",
                "description_en": "Ten percent off",
                "is_active": true,
            })),
            row(json!({ "id": "b", "title_en": "Summer", "description_en": "Free delivery" })),
        ];
        let TableView::Rows { columns, rows } =
            admin_table(EntityKind::Discount, &rows, Language::En)
        else {
            panic!("expected rows");
        };
        assert_eq!(columns, vec!["title", "summary"]);
        assert_eq!(rows[0].active, Some(true));
        assert_eq!(rows[1].active, Some(false));
        assert_eq!(rows[1].cells, vec!["Summer", "Free delivery"]);
    }

    #[test]
    fn admin_table_shows_order_and_visibility() {
        let rows = vec![row(json!({
            "id": "h1", "title_en": "Welcome", "order_index": 2, "is_active": false,
        }))];
        let TableView::Rows { columns, rows } =
            admin_table(EntityKind::HeroSlide, &rows, Language::En)
        else {
            panic!("expected rows");
        };
        assert_eq!(columns, vec!["title", "summary", "order_index", "is_active"]);
        assert_eq!(rows[0].cells, vec!["Welcome", "", "2", "false"]);
        assert_eq!(rows[0].active, None);
    }

    #[test]
    fn truncates_long_summaries() {
        let text = "x".repeat(100);
        let short = truncate(&text, 10);
        assert_eq!(short.chars().count(), 10);
        assert!(short.ends_with('…'));
        assert_eq!(truncate("short", 10), "short");
    }
}
