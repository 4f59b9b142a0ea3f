//! Stateless HTTP request builder and response parser for the PetFriends API.
//!
//! # Design
//! `PetFriendsClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation has a `build_*` method that produces an
//! `HttpRequest`; every response goes through the same `parse`, because the
//! service's failure pages look alike across endpoints. The caller executes
//! the round-trip, which keeps this module deterministic.

use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::MultipartForm;
use crate::response::ApiResponse;
use crate::settings::Credentials;
use crate::types::{AuthKey, PetFields, PetFilter, PetPhoto};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone)]
pub struct PetFriendsClient {
    base_url: String,
}

impl PetFriendsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_get_api_key(&self, credentials: &Credentials) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/api/key", self.base_url),
            headers: vec![
                ("email".to_string(), credentials.email.clone()),
                ("password".to_string(), credentials.password().to_string()),
            ],
            body: None,
        }
    }

    pub fn build_list_pets(&self, key: &AuthKey, filter: PetFilter) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!(
                "{}/api/pets?filter={}",
                self.base_url,
                urlencoding::encode(filter.as_query_value())
            ),
            headers: vec![auth_header(key)],
            body: None,
        }
    }

    pub fn build_add_pet(&self, key: &AuthKey, pet: &PetFields, photo: &PetPhoto) -> HttpRequest {
        let form = pet_form(pet).photo("pet_photo", photo);
        self.multipart_post(format!("{}/api/pets", self.base_url), key, form)
    }

    pub fn build_add_pet_no_photo(&self, key: &AuthKey, pet: &PetFields) -> HttpRequest {
        self.multipart_post(
            format!("{}/api/create_pet_simple", self.base_url),
            key,
            pet_form(pet),
        )
    }

    pub fn build_set_pet_photo(&self, key: &AuthKey, pet_id: &str, photo: &PetPhoto) -> HttpRequest {
        let form = MultipartForm::new()
            .text("pet_id", pet_id)
            .photo("pet_photo", photo);
        self.multipart_post(
            format!("{}/api/pets/set_photo/{}", self.base_url, urlencoding::encode(pet_id)),
            key,
            form,
        )
    }

    pub fn build_update_pet(
        &self,
        key: &AuthKey,
        pet_id: &str,
        pet: &PetFields,
    ) -> Result<HttpRequest, ApiError> {
        let body = form_urlencoded(pet)?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: self.pet_url(pet_id),
            headers: vec![
                auth_header(key),
                ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
            ],
            body: Some(body.into_bytes()),
        })
    }

    pub fn build_delete_pet(&self, key: &AuthKey, pet_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.pet_url(pet_id),
            headers: vec![auth_header(key)],
            body: None,
        }
    }

    /// Normalize any response into the envelope: JSON when it decodes,
    /// raw text otherwise.
    pub fn parse(&self, response: HttpResponse) -> ApiResponse {
        ApiResponse::from_http(response)
    }

    fn pet_url(&self, pet_id: &str) -> String {
        format!("{}/api/pets/{}", self.base_url, urlencoding::encode(pet_id))
    }

    fn multipart_post(&self, url: String, key: &AuthKey, form: MultipartForm) -> HttpRequest {
        let (content_type, body) = form.finish();
        HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: vec![auth_header(key), ("Content-Type".to_string(), content_type)],
            body: Some(body),
        }
    }
}

fn auth_header(key: &AuthKey) -> (String, String) {
    ("auth_key".to_string(), key.as_str().to_string())
}

fn pet_form(pet: &PetFields) -> MultipartForm {
    MultipartForm::new()
        .text("name", &pet.name)
        .text("animal_type", &pet.animal_type)
        .text("age", &pet.age)
}

fn form_urlencoded<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_urlencoded::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}
