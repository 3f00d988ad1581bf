//! Static descriptions of every content table.
//!
//! Each [`EntityKind`] owns one [`Schema`]: which columns exist, how they are
//! validated on write, how the collection is ordered and which columns drive
//! the public views.

mod entities;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use validate::{validate, FieldError, FieldErrors};

/// Column holding the manual display order of ordered collections.
pub const ORDER_INDEX: &str = "order_index";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Product,
    Recipe,
    BlogPost,
    Distributor,
    FaqItem,
    Fact,
    FarmInfo,
    Discount,
    Banner,
    HeroSlide,
    SiteSettings,
    AdminUser,
}

impl EntityKind {
    pub const ALL: [EntityKind; 12] = [
        EntityKind::Product,
        EntityKind::Recipe,
        EntityKind::BlogPost,
        EntityKind::Distributor,
        EntityKind::FaqItem,
        EntityKind::Fact,
        EntityKind::FarmInfo,
        EntityKind::Discount,
        EntityKind::Banner,
        EntityKind::HeroSlide,
        EntityKind::SiteSettings,
        EntityKind::AdminUser,
    ];

    pub fn schema(self) -> &'static Schema {
        match self {
            EntityKind::Product => &entities::PRODUCT,
            EntityKind::Recipe => &entities::RECIPE,
            EntityKind::BlogPost => &entities::BLOG_POST,
            EntityKind::Distributor => &entities::DISTRIBUTOR,
            EntityKind::FaqItem => &entities::FAQ_ITEM,
            EntityKind::Fact => &entities::FACT,
            EntityKind::FarmInfo => &entities::FARM_INFO,
            EntityKind::Discount => &entities::DISCOUNT,
            EntityKind::Banner => &entities::BANNER,
            EntityKind::HeroSlide => &entities::HERO_SLIDE,
            EntityKind::SiteSettings => &entities::SITE_SETTINGS,
            EntityKind::AdminUser => &entities::ADMIN_USER,
        }
    }

    pub fn table(self) -> &'static str {
        self.schema().table
    }

    pub fn slug(self) -> &'static str {
        self.schema().slug
    }

    pub fn label(self) -> &'static str {
        self.schema().label
    }

    /// Look up the kind managed under `/admin/<slug>`.
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    pub fn from_table(table: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.table() == table)
    }
}

/// Write-time shape of one column (or one localized column family).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `<name>_en/_ar/_fr` text columns.
    Localized { min_len: usize },
    /// `<name>_en/_ar/_fr` string-array columns, edited as newline text.
    LocalizedList,
    Text { min_len: usize },
    /// Absolute http(s) URL; an empty input clears the column.
    Url,
    Email,
    Integer { min: i64, max: Option<i64> },
    Bool,
    /// Name of an icon from the fixed icon set.
    Icon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    pub fn is_localized(&self) -> bool {
        matches!(self.kind, FieldKind::Localized { .. } | FieldKind::LocalizedList)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub ascending: bool,
}

/// Columns the list and detail views are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Display {
    pub title: &'static str,
    pub summary: Option<&'static str>,
    pub body: Option<&'static str>,
    pub lists: &'static [&'static str],
    pub icon: Option<&'static str>,
    /// Public route prefix for detail pages, e.g. `/products`.
    pub route: Option<&'static str>,
}

#[derive(Debug)]
pub struct Schema {
    pub kind: EntityKind,
    pub table: &'static str,
    pub slug: &'static str,
    pub label: &'static str,
    pub fields: &'static [FieldSpec],
    pub order: OrderBy,
    /// Boolean column that must be `true` for a row to appear publicly.
    pub visibility: Option<&'static str>,
    pub image_field: Option<&'static str>,
    /// Boolean column of which at most one row may be `true`.
    pub single_active: Option<&'static str>,
    pub singleton: bool,
    pub display: Display,
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_ordered(&self) -> bool {
        self.field(ORDER_INDEX).is_some()
    }

    /// Concrete column names written by the edit form.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::new();
        for field in self.fields {
            if field.is_localized() {
                columns.extend(
                    crate::locale::Language::ALL
                        .iter()
                        .map(|lang| lang.column(field.name)),
                );
            } else {
                columns.push(field.name.to_string());
            }
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_and_tables_are_unique() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_slug(kind.slug()), Some(kind));
            assert_eq!(EntityKind::from_table(kind.table()), Some(kind));
            assert_eq!(kind.schema().kind, kind);
        }
    }

    #[test]
    fn ordered_collections_sort_by_order_index() {
        let ordered = [
            EntityKind::FaqItem,
            EntityKind::Fact,
            EntityKind::FarmInfo,
            EntityKind::HeroSlide,
        ];
        for kind in ordered {
            let schema = kind.schema();
            assert!(schema.is_ordered());
            assert_eq!(schema.order.column, ORDER_INDEX);
            assert!(schema.order.ascending);
        }
    }

    #[test]
    fn single_active_tables() {
        assert_eq!(EntityKind::Discount.schema().single_active, Some("is_active"));
        assert_eq!(EntityKind::Banner.schema().single_active, Some("is_active"));
        assert_eq!(EntityKind::HeroSlide.schema().single_active, None);
        // The flag is only changed through the dedicated activation action.
        assert!(EntityKind::Discount.schema().field("is_active").is_none());
    }

    #[test]
    fn localized_fields_expand_to_three_columns() {
        let columns = EntityKind::FaqItem.schema().columns();
        assert_eq!(
            columns,
            vec![
                "question_en",
                "question_ar",
                "question_fr",
                "answer_en",
                "answer_ar",
                "answer_fr",
                "order_index",
            ]
        );
    }
}
