//! Domain types for the PetFriends API.
//!
//! # Design
//! These mirror what the service sends and accepts but are defined
//! independently of the mock server; the integration suite catches schema
//! drift between the two crates. Ages are text on the wire, though the
//! service has been seen to echo numeric ages back, so `Pet` accepts both.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::{
    deserialize_option_number_from_string, deserialize_string_from_number,
};
use serde_json::Value;

use crate::error::ApiError;

/// Opaque token returned by `GET /api/key`, sent as the `auth_key` header
/// on every later call.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthKey(String);

impl AuthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthKey(..)")
    }
}

/// Which pets `GET /api/pets` should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PetFilter {
    #[default]
    All,
    MyPets,
}

impl PetFilter {
    pub fn as_query_value(self) -> &'static str {
        match self {
            PetFilter::All => "",
            PetFilter::MyPets => "my_pets",
        }
    }
}

/// The text fields of a pet as submitted on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetFields {
    pub name: String,
    pub animal_type: String,
    pub age: String,
}

impl PetFields {
    pub fn new(
        name: impl Into<String>,
        animal_type: impl Into<String>,
        age: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            animal_type: animal_type.into(),
            age: age.into(),
        }
    }
}

/// Build pet fields from untyped data, e.g. a JSON fixture. Every field must
/// be present and a JSON string; numbers are rejected rather than coerced.
impl TryFrom<&Value> for PetFields {
    type Error = ApiError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let text = |field: &str| {
            value.get(field).and_then(Value::as_str).map(str::to_owned).ok_or_else(|| {
                ApiError::InvalidInput(
                    "name, animal_type and age must all be strings".to_string(),
                )
            })
        };
        Ok(Self {
            name: text("name")?,
            animal_type: text("animal_type")?,
            age: text("age")?,
        })
    }
}

/// A photo loaded from disk, ready to be embedded in a multipart body.
#[derive(Clone, PartialEq, Eq)]
pub struct PetPhoto {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl PetPhoto {
    /// Read the whole file; the handle is closed before this returns.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ApiError::Photo {
            path: PathBuf::from(path),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo.jpg".to_string());
        Ok(Self {
            content_type: content_type_for(path),
            file_name,
            bytes,
        })
    }
}

impl fmt::Debug for PetPhoto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PetPhoto")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
        _ => "image/jpeg",
    }
}

/// A pet record as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    #[serde(deserialize_with = "deserialize_string_from_number")]
    pub age: String,
    #[serde(default)]
    pub pet_photo: String,
    #[serde(default)]
    pub user_id: String,
    /// Unix timestamp; the service may send it as a number or as a string.
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub created_at: Option<f64>,
}

/// Body of `GET /api/pets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

impl PetList {
    pub fn contains(&self, pet_id: &str) -> bool {
        self.pets.iter().any(|p| p.id == pet_id)
    }
}
