//! Custom extractors for note writes and media URLs.

use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};
use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::request::Parts;
use axum::Json;
use jotter_core::error::{CoreError, FieldErrors};
use jotter_core::notes::parse_category_ref;
use jotter_core::types::DbId;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

const NOT_A_FILE_MESSAGE: &str =
    "The submitted data was not a file. Check the encoding type on the form.";

/// Host used for media URLs when a request carries no `Host` header.
const FALLBACK_HOST: &str = "localhost";

// ---------------------------------------------------------------------------
// Note payload
// ---------------------------------------------------------------------------

/// What a write request asks to do with a note's audio attachment.
#[derive(Debug, Default)]
pub enum AudioUpload {
    /// Field absent, or a form file input left empty.
    #[default]
    Unchanged,
    /// JSON `"audio_file": null`.
    Clear,
    /// A new file to store.
    File { file_name: String, data: Bytes },
}

/// Writable note fields, read from a JSON or a `multipart/form-data` body.
///
/// `None` means the field was not sent. For `category`, `Some(None)` means
/// the client explicitly asked for no category.
#[derive(Debug, Default)]
pub struct NotePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Option<DbId>>,
    pub audio: AudioUpload,
}

#[derive(Debug, Deserialize)]
struct NoteJson {
    title: Option<String>,
    description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    category: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    audio_file: Option<Value>,
}

/// Distinguish an explicit `null` (`Some(Value::Null)`) from an absent key.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl NoteJson {
    fn into_payload(self) -> Result<NotePayload, AppError> {
        let category = match self.category {
            None => None,
            Some(value) => {
                Some(category_from_json(&value).map_err(|msg| CoreError::field("category", msg))?)
            }
        };

        // A string here is a URL echoed back from a previous read; ignore it.
        let audio = match self.audio_file {
            Some(Value::Null) => AudioUpload::Clear,
            _ => AudioUpload::Unchanged,
        };

        Ok(NotePayload {
            title: self.title,
            description: self.description,
            category,
            audio,
        })
    }
}

fn category_from_json(value: &Value) -> Result<Option<DbId>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => parse_category_ref(s),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| format!("Incorrect type. Expected pk value, received {n}.")),
        other => Err(format!("Incorrect type. Expected pk value, received {other}.")),
    }
}

impl NotePayload {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut payload = NotePayload::default();
        let mut errors = FieldErrors::new();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "audio_file" => {
                    let file_name = field.file_name().map(str::to_string);
                    let data = field.bytes().await?;
                    payload.audio = match file_name {
                        Some(file_name) if !file_name.is_empty() => {
                            AudioUpload::File { file_name, data }
                        }
                        // Browsers send an unnamed empty part for an unused file input.
                        Some(_) => AudioUpload::Unchanged,
                        None if data.is_empty() => AudioUpload::Unchanged,
                        None => {
                            errors.add("audio_file", NOT_A_FILE_MESSAGE);
                            AudioUpload::Unchanged
                        }
                    };
                }
                "title" | "description" | "category" => {
                    let text = field.text().await?;
                    match name.as_str() {
                        "title" => payload.title = Some(text),
                        "description" => payload.description = Some(text),
                        _ => match parse_category_ref(&text) {
                            Ok(category) => payload.category = Some(category),
                            Err(msg) => errors.add("category", msg),
                        },
                    }
                }
                _ => {} // ignore unknown and read-only fields
            }
        }

        errors.into_result()?;
        Ok(payload)
    }
}

impl<S> FromRequest<S> for NotePayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state).await?;
            Self::from_multipart(multipart).await
        } else {
            let Json(body) = Json::<NoteJson>::from_request(req, state).await?;
            body.into_payload()
        }
    }
}

// ---------------------------------------------------------------------------
// Media URLs
// ---------------------------------------------------------------------------

/// Absolute URL prefix for stored media, e.g. `http://host/media`.
///
/// Uses `PUBLIC_BASE_URL` when configured, otherwise the request's host.
#[derive(Debug, Clone)]
pub struct MediaBaseUrl(String);

impl MediaBaseUrl {
    /// Absolute URL of a stored media path such as `voice_notes/memo.mp3`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl FromRequestParts<AppState> for MediaBaseUrl {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let media = &state.config.media;

        let origin = match &media.public_base_url {
            Some(base) => base.clone(),
            None => {
                let host = parts
                    .headers
                    .get(HOST)
                    .and_then(|v| v.to_str().ok())
                    .or_else(|| parts.uri.authority().map(|a| a.as_str()))
                    .unwrap_or(FALLBACK_HOST);
                format!("http://{host}")
            }
        };

        Ok(MediaBaseUrl(format!("{origin}{}", media.url_prefix)))
    }
}
