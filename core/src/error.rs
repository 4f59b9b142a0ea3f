//! Error types for the PetFriends client.
//!
//! # Design
//! HTTP error statuses are not errors here: every operation hands back an
//! `ApiResponse` whatever the status, so tests can assert on 403 pages the
//! same way they assert on 200s. `ApiError` covers what happens on our side
//! of the wire: bad local input, unreadable photos, transport faults and
//! bodies that do not have the shape a typed helper expects.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Pet fields supplied as untyped data were not all strings.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The key response did not carry a non-empty string `key` field.
    #[error("response does not contain an auth key")]
    MissingAuthKey,

    #[error("cannot read photo {}: {source}", .path.display())]
    Photo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request never produced an HTTP response.
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A helper needed a successful response and got something else.
    #[error("unexpected response (status {status:?}): {body}")]
    UnexpectedStatus { status: Option<u16>, body: String },

    #[error("there are no pets owned by this user")]
    NoOwnedPets,

    #[error("missing required setting {0}")]
    MissingSetting(&'static str),
}
