//! Write-time validation of admin form input.
//!
//! Form values arrive as a JSON object keyed by column name, with text
//! inputs as strings and list fields as newline-delimited text. A valid form
//! normalizes into the row that is sent to the store.
use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use super::{FieldKind, FieldSpec, Schema};
use crate::locale::Language;
use crate::Row;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("this field is required")]
    Required,
    #[error("must be at least {min} characters")]
    TooShort { min: usize },
    #[error("must be a valid http(s) URL")]
    InvalidUrl,
    #[error("must be a valid email address")]
    InvalidEmail,
    #[error("must be a whole number")]
    NotInteger,
    #[error("must be at least {min}")]
    BelowMinimum { min: i64 },
    #[error("must be at most {max}")]
    AboveMaximum { max: i64 },
}

/// Validation failures keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, FieldError>);

impl FieldErrors {
    pub fn insert(&mut self, column: impl Into<String>, error: FieldError) {
        self.0.insert(column.into(), error);
    }

    pub fn get(&self, column: &str) -> Option<&FieldError> {
        self.0.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldError)> {
        self.0.iter()
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(column, error)| (column, error.to_string())))
    }
}

/// Validate `values` against `schema`, returning the normalized row or every
/// field error found.
pub fn validate(schema: &Schema, values: &Row) -> Result<Row, FieldErrors> {
    let mut row = Row::new();
    let mut errors = FieldErrors::default();

    for field in schema.fields {
        match field.kind {
            FieldKind::Localized { min_len } => {
                for lang in Language::ALL {
                    let column = lang.column(field.name);
                    match check_text(field, &text_value(values, &column), min_len) {
                        Ok(value) => {
                            row.insert(column, value);
                        }
                        Err(error) => errors.insert(column, error),
                    }
                }
            }
            FieldKind::LocalizedList => {
                for lang in Language::ALL {
                    let column = lang.column(field.name);
                    let items = split_lines(&text_value(values, &column));
                    if field.required && items.is_empty() {
                        errors.insert(column, FieldError::Required);
                    } else {
                        let items = items.into_iter().map(Value::String).collect();
                        row.insert(column, Value::Array(items));
                    }
                }
            }
            FieldKind::Text { min_len } => {
                let result = check_text(field, &text_value(values, field.name), min_len);
                record(&mut row, &mut errors, field.name, result);
            }
            FieldKind::Icon => {
                let result = check_text(field, &text_value(values, field.name), 1);
                record(&mut row, &mut errors, field.name, result);
            }
            FieldKind::Url => {
                let result = check_url(field, &text_value(values, field.name));
                record(&mut row, &mut errors, field.name, result);
            }
            FieldKind::Email => {
                let result = check_email(field, &text_value(values, field.name));
                record(&mut row, &mut errors, field.name, result);
            }
            FieldKind::Integer { min, max } => {
                let result = check_integer(field, values.get(field.name), min, max);
                record(&mut row, &mut errors, field.name, result);
            }
            FieldKind::Bool => {
                row.insert(field.name.to_string(), Value::Bool(bool_value(values.get(field.name))));
            }
        }
    }

    if errors.is_empty() {
        Ok(row)
    } else {
        Err(errors)
    }
}

/// Split newline-delimited form text into list items, dropping blank lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a form value as text. Arrays are joined with newlines so list
/// columns can be passed straight through.
pub fn text_value(values: &Row, column: &str) -> String {
    match values.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(other) => other.to_string(),
    }
}

fn bool_value(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => matches!(text.trim(), "true" | "on" | "1" | "yes"),
        Some(Value::Number(number)) => number.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}

fn record(
    row: &mut Row,
    errors: &mut FieldErrors,
    column: &str,
    result: Result<Value, FieldError>,
) {
    match result {
        Ok(value) => {
            row.insert(column.to_string(), value);
        }
        Err(error) => errors.insert(column, error),
    }
}

fn check_text(field: &FieldSpec, text: &str, min_len: usize) -> Result<Value, FieldError> {
    let length = text.trim().chars().count();
    if length == 0 {
        return if field.required {
            Err(FieldError::Required)
        } else {
            Ok(Value::Null)
        };
    }
    if length < min_len {
        return Err(FieldError::TooShort { min: min_len });
    }
    Ok(Value::String(text.to_string()))
}

fn check_url(field: &FieldSpec, text: &str) -> Result<Value, FieldError> {
    let text = text.trim();
    if text.is_empty() {
        return if field.required {
            Err(FieldError::Required)
        } else {
            Ok(Value::Null)
        };
    }
    match reqwest::Url::parse(text) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {
            Ok(Value::String(text.to_string()))
        }
        _ => Err(FieldError::InvalidUrl),
    }
}

fn check_email(field: &FieldSpec, text: &str) -> Result<Value, FieldError> {
    let text = text.trim();
    if text.is_empty() {
        return if field.required {
            Err(FieldError::Required)
        } else {
            Ok(Value::Null)
        };
    }
    let valid = match text.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !text.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(Value::String(text.to_string()))
    } else {
        Err(FieldError::InvalidEmail)
    }
}

fn check_integer(
    field: &FieldSpec,
    value: Option<&Value>,
    min: i64,
    max: Option<i64>,
) -> Result<Value, FieldError> {
    let number = match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(number)) => Some(number.as_i64().ok_or(FieldError::NotInteger)?),
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(Value::String(text)) => {
            Some(text.trim().parse::<i64>().map_err(|_| FieldError::NotInteger)?)
        }
        Some(_) => return Err(FieldError::NotInteger),
    };
    let Some(number) = number else {
        return if field.required {
            Err(FieldError::Required)
        } else {
            Ok(Value::Null)
        };
    };
    if number < min {
        return Err(FieldError::BelowMinimum { min });
    }
    if let Some(max) = max {
        if number > max {
            return Err(FieldError::AboveMaximum { max });
        }
    }
    Ok(Value::from(number))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::EntityKind;

    fn values(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn faq_values() -> Row {
        values(json!({
            "question_en": "Is the milk pasteurized?",
            "question_ar": "هل الحليب مبستر؟",
            "question_fr": "Le lait est-il pasteurisé ?",
            "answer_en": "Yes, every batch is pasteurized.",
            "answer_ar": "نعم، كل دفعة مبسترة تماماً.",
            "answer_fr": "Oui, chaque lot est pasteurisé.",
            "order_index": "3",
        }))
    }

    #[test]
    fn valid_faq_normalizes_order_index() {
        let row = validate(EntityKind::FaqItem.schema(), &faq_values()).unwrap();
        assert_eq!(row["order_index"], json!(3));
        assert_eq!(row["question_en"], json!("Is the milk pasteurized?"));
    }

    #[test]
    fn every_language_is_required_at_edit_time() {
        let mut input = faq_values();
        input.insert("answer_fr".into(), json!(""));
        let errors = validate(EntityKind::FaqItem.schema(), &input).unwrap_err();
        assert_eq!(errors.get("answer_fr"), Some(&FieldError::Required));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn collects_all_errors() {
        let input = values(json!({
            "question_en": "Why",
            "answer_en": "short",
            "order_index": -1,
        }));
        let errors = validate(EntityKind::FaqItem.schema(), &input).unwrap_err();
        assert_eq!(errors.get("question_en"), Some(&FieldError::TooShort { min: 5 }));
        assert_eq!(errors.get("answer_en"), Some(&FieldError::TooShort { min: 10 }));
        assert_eq!(errors.get("question_ar"), Some(&FieldError::Required));
        assert_eq!(errors.get("order_index"), Some(&FieldError::BelowMinimum { min: 0 }));
    }

    #[test]
    fn empty_url_clears_and_bad_url_fails() {
        let schema = EntityKind::Banner.schema();
        let mut input = values(json!({
            "title_en": "Summer", "title_ar": "صيف", "title_fr": "Été",
            "image_url": "",
            "link_url": "not a url",
        }));
        let errors = validate(schema, &input).unwrap_err();
        assert_eq!(errors.get("link_url"), Some(&FieldError::InvalidUrl));
        assert!(errors.get("image_url").is_none());

        input.insert("link_url".into(), json!("https://example.com/offers"));
        let row = validate(schema, &input).unwrap();
        assert_eq!(row["image_url"], Value::Null);
        assert_eq!(row["subtitle_en"], Value::Null);
    }

    #[test]
    fn list_fields_split_on_newlines() {
        let input = values(json!({
            "title_en": "Labneh", "title_ar": "لبنة", "title_fr": "Labné",
            "description_en": "Strained yogurt spread.",
            "description_ar": "لبنة مصفاة للدهن.",
            "description_fr": "Yaourt égoutté à tartiner.",
            "ingredients_en": "1 l yogurt\n\n  salt  \n",
            "ingredients_ar": "لبن\nملح",
            "ingredients_fr": "yaourt\nsel",
            "preparation_steps_en": "Strain overnight",
            "preparation_steps_ar": "صفي طوال الليل",
            "preparation_steps_fr": "Égoutter une nuit",
            "servings": 4,
            "show_in_gallery": "on",
        }));
        let row = validate(EntityKind::Recipe.schema(), &input).unwrap();
        assert_eq!(row["ingredients_en"], json!(["1 l yogurt", "salt"]));
        assert_eq!(row["servings"], json!(4));
        assert_eq!(row["prep_time_minutes"], Value::Null);
        assert_eq!(row["show_in_gallery"], json!(true));
    }

    #[test]
    fn percentage_range() {
        let schema = EntityKind::Discount.schema();
        let mut input = values(json!({
            "title_en": "Ramadan", "title_ar": "رمضان", "title_fr": "Ramadan",
            "description_en": "Ten percent off all cheese.",
            "description_ar": "خصم عشرة بالمئة على الأجبان.",
            "description_fr": "Dix pour cent sur les fromages.",
            "percentage": 120,
        }));
        let errors = validate(schema, &input).unwrap_err();
        assert_eq!(errors.get("percentage"), Some(&FieldError::AboveMaximum { max: 100 }));

        input.insert("percentage".into(), json!("ten"));
        let errors = validate(schema, &input).unwrap_err();
        assert_eq!(errors.get("percentage"), Some(&FieldError::NotInteger));
    }

    #[test]
    fn email_checks() {
        let schema = EntityKind::AdminUser.schema();
        let mut input =
            values(json!({ "email": "admin@farm", "full_name": "Sam", "role": "editor" }));
        assert_eq!(
            validate(schema, &input).unwrap_err().get("email"),
            Some(&FieldError::InvalidEmail)
        );
        input.insert("email".into(), json!("admin@farm.example"));
        assert!(validate(schema, &input).is_ok());
    }

    #[test]
    fn errors_serialize_as_messages() {
        let mut errors = FieldErrors::default();
        errors.insert("title_en", FieldError::TooShort { min: 2 });
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, json!({ "title_en": "must be at least 2 characters" }));
    }
}
