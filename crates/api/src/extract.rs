//! Request extractors shared by the route groups.
use std::convert::Infallible;

use axum::{
    extract::{FromRequest, FromRequestParts, Multipart, Query, Request},
    http::{header, request::Parts},
    Json,
};
use axum_extra::extract::CookieJar;
use dairy_cms_core::locale::Language;
use dairy_cms_core::storage::ImageUpload;
use dairy_cms_core::Row;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::session::Claims;

pub const LANG_COOKIE: &str = "lang";

/// Active language: `?lang=`, else the `lang` cookie, else English.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lang(pub Language);

#[derive(Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for Lang {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_query = Query::<LangQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.lang);
        let tag = from_query.or_else(|| {
            CookieJar::from_headers(&parts.headers)
                .get(LANG_COOKIE)
                .map(|cookie| cookie.value().to_string())
        });
        Ok(Lang(tag.as_deref().map(Language::from_tag).unwrap_or_default()))
    }
}

/// Claims placed in the request by the admin guard.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub Claims);

impl<S: Send + Sync> FromRequestParts<S> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(CurrentAdmin)
            .ok_or_else(|| ApiError::Unauthorized("sign in required".to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// Submitted form: JSON `{"values": {...}}`, or multipart with a `values`
/// JSON part (or one part per column) and an optional `image` file.
#[derive(Debug, Default)]
pub struct FormPayload {
    pub values: Row,
    pub image: Option<ImageUpload>,
}

#[derive(Deserialize)]
struct JsonForm {
    #[serde(default)]
    values: Row,
}

impl<S: Send + Sync> FromRequest<S> for FormPayload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(form) = Json::<JsonForm>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            return Ok(FormPayload {
                values: form.values,
                image: None,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let mut payload = FormPayload::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                    // An empty file input means "no new image".
                    if !bytes.is_empty() {
                        payload.image = Some(ImageUpload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                "values" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                    let values: Row = serde_json::from_str(&text)
                        .map_err(|e| ApiError::BadRequest(format!("values: {e}")))?;
                    payload.values.extend(values);
                }
                "" => {}
                _ => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                    payload.values.insert(name, Value::String(text));
                }
            }
        }
        Ok(payload)
    }
}
