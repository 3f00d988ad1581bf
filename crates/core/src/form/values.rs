//! Conversions between stored rows and the values an edit form shows.
use serde_json::Value;

use crate::locale::Language;
use crate::schema::{FieldKind, Schema, ORDER_INDEX};
use crate::Row;

/// Empty form for a new row. `order_index`, when the schema has one, is set
/// to `next_order_index`.
pub fn defaults(schema: &Schema, next_order_index: Option<i64>) -> Row {
    let mut values = Row::new();
    for field in schema.fields {
        match field.kind {
            FieldKind::Localized { .. } | FieldKind::LocalizedList => {
                for lang in Language::ALL {
                    values.insert(lang.column(field.name), Value::String(String::new()));
                }
            }
            FieldKind::Bool => {
                values.insert(field.name.to_string(), Value::Bool(false));
            }
            FieldKind::Integer { .. } if field.name == ORDER_INDEX => {
                let value = next_order_index
                    .map(Value::from)
                    .unwrap_or_else(|| Value::String(String::new()));
                values.insert(field.name.to_string(), value);
            }
            _ => {
                values.insert(field.name.to_string(), Value::String(String::new()));
            }
        }
    }
    values
}

/// Form values for editing `row`. Nulls become empty strings so every input
/// stays controlled; list columns become newline-joined text.
pub fn from_row(schema: &Schema, row: &Row) -> Row {
    let mut values = Row::new();
    for field in schema.fields {
        match field.kind {
            FieldKind::Localized { .. } => {
                for lang in Language::ALL {
                    let column = lang.column(field.name);
                    values.insert(column.clone(), text(row.get(&column)));
                }
            }
            FieldKind::LocalizedList => {
                for lang in Language::ALL {
                    let column = lang.column(field.name);
                    values.insert(column.clone(), joined(row.get(&column)));
                }
            }
            FieldKind::Bool => {
                let flag = row.get(field.name).and_then(Value::as_bool).unwrap_or(false);
                values.insert(field.name.to_string(), Value::Bool(flag));
            }
            FieldKind::Integer { .. } => {
                let value = match row.get(field.name) {
                    Some(Value::Number(number)) => Value::Number(number.clone()),
                    other => text(other),
                };
                values.insert(field.name.to_string(), value);
            }
            FieldKind::Text { .. } | FieldKind::Url | FieldKind::Email | FieldKind::Icon => {
                values.insert(field.name.to_string(), text(row.get(field.name)));
            }
        }
    }
    values
}

fn text(value: Option<&Value>) -> Value {
    match value {
        Some(Value::String(text)) => Value::String(text.clone()),
        None | Some(Value::Null) => Value::String(String::new()),
        Some(other) => Value::String(other.to_string()),
    }
}

fn joined(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Array(items)) => Value::String(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        other => text(other),
    }
}
