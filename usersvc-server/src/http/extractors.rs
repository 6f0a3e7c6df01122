//! Custom Axum extractors

use std::collections::HashMap;

use axum::extract::{Form, FromRequest, FromRequestParts, Multipart, Path, Query, Request};
use axum::http::{header, request::Parts, HeaderMap};
use serde::de::value::{self, MapDeserializer};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::models::UserId;

/// Extract and validate a user id from path
pub struct ValidUserId(pub UserId);

impl<S> FromRequestParts<S> for ValidUserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::InvalidUserId)?;

        let id = UserId::parse(&raw).map_err(|e| {
            tracing::debug!(raw = %raw, "rejected user id: {}", e);
            ApiError::InvalidUserId
        })?;

        Ok(Self(id))
    }
}

/// Form fields from a url-encoded or multipart body, falling back to the
/// query string for fields the body doesn't carry. A request without a body
/// content type reads the query string alone.
///
/// Rejections are a JSON `ApiError` ("Failed to parse form data.").
pub struct FormData<T>(pub T);

fn form_rejected(reason: impl std::fmt::Display) -> ApiError {
    tracing::debug!("rejected form body: {}", reason);
    ApiError::BadRequest {
        message: "Failed to parse form data.".to_owned(),
    }
}

#[derive(Debug, PartialEq)]
enum BodyKind {
    None,
    UrlEncoded,
    Multipart,
    Unsupported,
}

fn body_kind(headers: &HeaderMap) -> BodyKind {
    let Some(content_type) = headers.get(header::CONTENT_TYPE) else {
        return BodyKind::None;
    };
    let Ok(content_type) = content_type.to_str() else {
        return BodyKind::Unsupported;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/x-www-form-urlencoded" => BodyKind::UrlEncoded,
        "multipart/form-data" => BodyKind::Multipart,
        _ => BodyKind::Unsupported,
    }
}

/// Text parts of a multipart body; file uploads are skipped.
async fn multipart_fields(mut multipart: Multipart) -> Result<Vec<(String, String)>, ApiError> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(form_rejected)? {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let value = field.text().await.map_err(form_rejected)?;
        fields.push((name, value));
    }
    Ok(fields)
}

impl<S, T> FromRequest<S> for FormData<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let Query(query): Query<Vec<(String, String)>> =
            Query::from_request_parts(&mut parts, state)
                .await
                .map_err(|e| form_rejected(e.body_text()))?;

        let kind = body_kind(&parts.headers);
        let req = Request::from_parts(parts, body);
        let body_fields = match kind {
            BodyKind::None => Vec::new(),
            BodyKind::UrlEncoded => {
                let Form(fields): Form<Vec<(String, String)>> = Form::from_request(req, state)
                    .await
                    .map_err(|e| form_rejected(e.body_text()))?;
                fields
            }
            BodyKind::Multipart => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| form_rejected(e.body_text()))?;
                multipart_fields(multipart).await?
            }
            BodyKind::Unsupported => return Err(form_rejected("unsupported content type")),
        };

        // First value wins, body before query
        let mut fields: HashMap<String, String> = HashMap::new();
        for (name, value) in body_fields.into_iter().chain(query) {
            fields.entry(name).or_insert(value);
        }

        let deserializer: MapDeserializer<'_, _, value::Error> =
            MapDeserializer::new(fields.into_iter());
        let data = T::deserialize(deserializer).map_err(form_rejected)?;

        Ok(Self(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn body_kind_from_content_type() {
        assert_eq!(body_kind(&HeaderMap::new()), BodyKind::None);
        assert_eq!(
            body_kind(&headers("application/x-www-form-urlencoded; charset=utf-8")),
            BodyKind::UrlEncoded
        );
        assert_eq!(
            body_kind(&headers("Multipart/Form-Data; boundary=XX")),
            BodyKind::Multipart
        );
        assert_eq!(body_kind(&headers("application/json")), BodyKind::Unsupported);
    }
}
