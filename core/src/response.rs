//! The response envelope every operation returns.
//!
//! The service answers with JSON on success and, on many failures, with a
//! plain HTML page. `ResponseBody` keeps both shapes explicit so callers
//! cannot index into an HTML page by accident.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::types::AuthKey;

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The body parsed as JSON.
    Decoded(Value),
    /// Anything else, verbatim. Includes the empty body.
    Raw(String),
}

impl ResponseBody {
    /// Decode `text` as JSON, keeping it verbatim when that fails.
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => ResponseBody::Decoded(value),
            Err(_) => ResponseBody::Raw(text),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, ResponseBody::Raw(_))
    }
}

/// Status and body of one call. `status` is `None` only when the request
/// never got an HTTP response; the body then holds the transport error.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: Option<u16>,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn from_http(response: HttpResponse) -> Self {
        Self {
            status: Some(response.status),
            body: ResponseBody::from_text(response.body),
        }
    }

    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            status: None,
            body: ResponseBody::Raw(message.into()),
        }
    }

    /// True for status 200, whatever the body. Delete answers 200 with an
    /// empty body and that counts as success.
    pub fn is_ok(&self) -> bool {
        self.status == Some(200)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        match &self.body {
            ResponseBody::Decoded(value) => value.get(name),
            ResponseBody::Raw(_) => None,
        }
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn auth_key(&self) -> Result<AuthKey, ApiError> {
        match self.str_field("key") {
            Some(key) if !key.is_empty() => Ok(AuthKey::new(key)),
            _ => Err(ApiError::MissingAuthKey),
        }
    }

    /// Deserialize a decoded body into `T`. Raw bodies are an error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        match &self.body {
            ResponseBody::Decoded(value) => T::deserialize(value)
                .map_err(|e| ApiError::Deserialization(e.to_string())),
            ResponseBody::Raw(text) => Err(ApiError::Deserialization(format!(
                "body is not JSON: {}",
                truncate(text, 200)
            ))),
        }
    }

    pub fn text(&self) -> Cow<'_, str> {
        match &self.body {
            ResponseBody::Decoded(value) => Cow::Owned(value.to_string()),
            ResponseBody::Raw(text) => Cow::Borrowed(text),
        }
    }

    /// Body text with HTML entities decoded, for asserting on error pages.
    pub fn unescaped_text(&self) -> String {
        html_escape::decode_html_entities(&self.text()).into_owned()
    }

    /// Turn a non-200 response into `UnexpectedStatus`.
    pub fn require_ok(&self) -> Result<&Self, ApiError> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(ApiError::UnexpectedStatus {
                status: self.status,
                body: truncate(&self.text(), 500).to_string(),
            })
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
