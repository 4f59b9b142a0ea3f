//! Synchronous test client for the PetFriends pet-listing service.
//!
//! # Overview
//! `PetFriendsClient` builds `HttpRequest` values and normalizes
//! `HttpResponse` values without touching the network (host-does-IO
//! pattern). `PetFriends` pairs it with a blocking `Transport` and exposes
//! one method per REST operation, each issuing exactly one call.
//!
//! # Design
//! - Nothing is cached between calls; the auth key is passed explicitly.
//! - Every operation returns an `ApiResponse` whatever the HTTP status. The
//!   body is either decoded JSON or the raw text the server sent, kept as a
//!   tagged variant so HTML error pages are never mistaken for data.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod multipart;
pub mod response;
pub mod settings;
pub mod transport;
pub mod types;

pub use api::PetFriends;
pub use client::PetFriendsClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::{ApiResponse, ResponseBody};
pub use settings::{Credentials, Settings};
pub use transport::{Transport, UreqTransport};
pub use types::{AuthKey, Pet, PetFields, PetFilter, PetList, PetPhoto};
