//! One method per PetFriends operation.
//!
//! Each method builds a request with `PetFriendsClient`, runs it through the
//! transport exactly once and returns the normalized `ApiResponse`. Transport
//! faults become a status-less response instead of an error, so callers can
//! assert on them like any other outcome. `Err` is reserved for problems
//! detected before anything is sent.

use std::path::Path;

use serde_json::Value;

use crate::client::PetFriendsClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::response::{ApiResponse, ResponseBody};
use crate::settings::{Credentials, Settings};
use crate::transport::{Transport, UreqTransport};
use crate::types::{AuthKey, Pet, PetFields, PetFilter, PetList, PetPhoto};

pub struct PetFriends<T = UreqTransport> {
    client: PetFriendsClient,
    transport: T,
}

impl PetFriends<UreqTransport> {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, UreqTransport::new())
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.base_url)
    }
}

impl<T: Transport> PetFriends<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            client: PetFriendsClient::new(base_url),
            transport,
        }
    }

    pub fn client(&self) -> &PetFriendsClient {
        &self.client
    }

    /// `GET /api/key`. On success the body carries `{"key": ...}`; use
    /// `ApiResponse::auth_key` to extract it.
    #[tracing::instrument(name = "get_api_key", skip_all, fields(email = %credentials.email))]
    pub fn get_api_key(&self, credentials: &Credentials) -> ApiResponse {
        self.send(self.client.build_get_api_key(credentials))
    }

    #[tracing::instrument(name = "list_pets", skip(self, key))]
    pub fn list_pets(&self, key: &AuthKey, filter: PetFilter) -> ApiResponse {
        self.send(self.client.build_list_pets(key, filter))
    }

    #[tracing::instrument(name = "add_pet", skip_all, fields(name = %pet.name))]
    pub fn add_pet(
        &self,
        key: &AuthKey,
        pet: &PetFields,
        photo_path: impl AsRef<Path>,
    ) -> Result<ApiResponse, ApiError> {
        let photo = PetPhoto::open(photo_path)?;
        Ok(self.send(self.client.build_add_pet(key, pet, &photo)))
    }

    #[tracing::instrument(name = "add_pet_no_photo", skip_all, fields(name = %pet.name))]
    pub fn add_pet_no_photo(&self, key: &AuthKey, pet: &PetFields) -> ApiResponse {
        self.send(self.client.build_add_pet_no_photo(key, pet))
    }

    /// Like `add_pet_no_photo`, for fields held as untyped JSON. Anything
    /// but three strings is rejected before a request is built.
    pub fn add_pet_no_photo_from_json(
        &self,
        key: &AuthKey,
        fields: &Value,
    ) -> Result<ApiResponse, ApiError> {
        let pet = PetFields::try_from(fields)?;
        Ok(self.add_pet_no_photo(key, &pet))
    }

    #[tracing::instrument(name = "set_pet_photo", skip(self, key, photo_path))]
    pub fn set_pet_photo(
        &self,
        key: &AuthKey,
        pet_id: &str,
        photo_path: impl AsRef<Path>,
    ) -> Result<ApiResponse, ApiError> {
        let photo = PetPhoto::open(photo_path)?;
        Ok(self.send(self.client.build_set_pet_photo(key, pet_id, &photo)))
    }

    #[tracing::instrument(name = "update_pet", skip(self, key, pet))]
    pub fn update_pet(
        &self,
        key: &AuthKey,
        pet_id: &str,
        pet: &PetFields,
    ) -> Result<ApiResponse, ApiError> {
        let request = self.client.build_update_pet(key, pet_id, pet)?;
        Ok(self.send(request))
    }

    /// `DELETE /api/pets/{id}`. The service answers 200 with an empty body,
    /// which arrives here as `ResponseBody::Raw("")`.
    #[tracing::instrument(name = "delete_pet", skip(self, key))]
    pub fn delete_pet(&self, key: &AuthKey, pet_id: &str) -> ApiResponse {
        self.send(self.client.build_delete_pet(key, pet_id))
    }

    /// First pet in the caller's own listing.
    pub fn first_own_pet(&self, key: &AuthKey) -> Result<Pet, ApiError> {
        let response = self.list_pets(key, PetFilter::MyPets);
        let list: PetList = response.require_ok()?.json()?;
        list.pets.into_iter().next().ok_or(ApiError::NoOwnedPets)
    }

    fn send(&self, request: HttpRequest) -> ApiResponse {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = match self.transport.execute(&request) {
            Ok(http) => self.client.parse(http),
            Err(e) => {
                tracing::error!(error = %e, "request failed");
                return ApiResponse::transport_failure(e.to_string());
            }
        };
        if let ResponseBody::Raw(text) = &response.body {
            if !text.is_empty() {
                tracing::warn!("response body is not JSON, keeping raw text");
            }
        }
        tracing::info!(status = ?response.status, "server response");
        response
    }
}
