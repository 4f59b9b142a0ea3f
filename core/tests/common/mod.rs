//! Scenario suite shared by the mock-server and live-service test binaries.
//!
//! Every scenario takes a `Harness` and works against whatever service it
//! points at, cleaning up the pets it creates.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use petfriends_core::{
    ApiError, ApiResponse, AuthKey, Credentials, Pet, PetFields, PetFilter, PetFriends, PetList,
    Settings,
};
use tracing_subscriber::EnvFilter;

pub const FORBIDDEN: &str = "Forbidden";
pub const USER_NOT_FOUND: &str = "This user wasn't found in database";

// Logs are only shown when TEST_LOG is set.
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }
});

pub struct Harness {
    pub api: PetFriends,
    pub credentials: Credentials,
}

impl Harness {
    /// A fresh mock server on a random port, seeded with the demo account.
    pub fn mock() -> Self {
        LazyLock::force(&TRACING);
        let base_url = spawn_mock_server();
        Self {
            api: PetFriends::new(&base_url),
            credentials: Credentials::new(petfriends_mock::DEMO_EMAIL, petfriends_mock::DEMO_PASSWORD),
        }
    }

    /// The service and account configured through the environment.
    pub fn live() -> Self {
        LazyLock::force(&TRACING);
        let settings = Settings::from_env()
            .expect("set PETFRIENDS_EMAIL and PETFRIENDS_PASSWORD to run live tests");
        Self {
            api: PetFriends::from_settings(&settings),
            credentials: settings.credentials,
        }
    }

    pub fn key(&self) -> AuthKey {
        self.api
            .get_api_key(&self.credentials)
            .auth_key()
            .expect("configured credentials must yield an auth key")
    }

    pub fn own_pets(&self, key: &AuthKey) -> PetList {
        let resp = self.api.list_pets(key, PetFilter::MyPets);
        assert_eq!(resp.status, Some(200), "listing own pets: {}", resp.text());
        resp.json().expect("own listing must decode")
    }

    /// The caller's first pet, adding one when the caller owns none.
    pub fn ensure_own_pet(&self, key: &AuthKey) -> Pet {
        match self.api.first_own_pet(key) {
            Ok(pet) => pet,
            Err(ApiError::NoOwnedPets) => {
                let resp = self
                    .api
                    .add_pet(key, &PetFields::new("Super", "cat", "3"), fixture("owl.jpg"))
                    .unwrap();
                assert_eq!(resp.status, Some(200), "adding a pet: {}", resp.text());
                resp.json().unwrap()
            }
            Err(e) => panic!("listing own pets failed: {e}"),
        }
    }
}

/// Start the mock server on a random port in a background thread and
/// return its base URL.
pub fn spawn_mock_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            petfriends_mock::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn assert_echoes(resp: &ApiResponse, pet: &PetFields) {
    assert_eq!(resp.status, Some(200), "{}", resp.text());
    assert_eq!(resp.str_field("name"), Some(pet.name.as_str()));
    assert_eq!(resp.str_field("animal_type"), Some(pet.animal_type.as_str()));
    assert_eq!(resp.str_field("age"), Some(pet.age.as_str()));
}

fn assert_user_not_found(resp: &ApiResponse) {
    assert_eq!(resp.status, Some(403), "{}", resp.text());
    let text = resp.unescaped_text();
    assert!(text.contains(FORBIDDEN), "{text}");
    assert!(text.contains(USER_NOT_FOUND), "{text}");
}

fn assert_no_key(resp: &ApiResponse) {
    assert_ne!(resp.status, Some(200));
    assert!(resp.field("key").is_none());
}

fn add_then_delete(h: &Harness, pet: &PetFields) {
    let key = h.key();
    let resp = h.api.add_pet(&key, pet, fixture("owl.jpg")).unwrap();
    assert_echoes(&resp, pet);

    let id = resp.str_field("id").expect("created pet has an id").to_string();
    assert!(h.api.delete_pet(&key, &id).is_ok());
}

// ---------------------------------------------------------------------------
// Positive scenarios
// ---------------------------------------------------------------------------

pub fn api_key_for_valid_user(h: &Harness) {
    let resp = h.api.get_api_key(&h.credentials);
    assert_eq!(resp.status, Some(200));
    assert!(!resp.str_field("key").unwrap_or_default().is_empty());
}

pub fn list_all_pets_with_valid_key(h: &Harness) {
    let key = h.key();
    let resp = h.api.list_pets(&key, PetFilter::All);
    assert_eq!(resp.status, Some(200));
    let list: PetList = resp.json().unwrap();
    assert!(!list.pets.is_empty());
}

pub fn own_listing_is_subset_of_all(h: &Harness) {
    let key = h.key();
    let mine = h.ensure_own_pet(&key);

    let all: PetList = h.api.list_pets(&key, PetFilter::All).json().unwrap();
    let own = h.own_pets(&key);
    assert!(own.contains(&mine.id));
    assert!(own.pets.iter().all(|p| all.contains(&p.id)));
    assert!(own.pets.iter().all(|p| p.user_id == mine.user_id));
}

pub fn add_pet_with_valid_data(h: &Harness) {
    add_then_delete(h, &PetFields::new("Барсик", "кот", "4"));
}

pub fn delete_own_pet(h: &Harness) {
    let key = h.key();
    let pet = h.ensure_own_pet(&key);

    let resp = h.api.delete_pet(&key, &pet.id);
    assert_eq!(resp.status, Some(200));
    assert!(!h.own_pets(&key).contains(&pet.id));
}

pub fn update_own_pet_info(h: &Harness) {
    let key = h.key();
    let pet = h.ensure_own_pet(&key);
    let fields = PetFields::new("Mur", "Kote", "5");

    let resp = h.api.update_pet(&key, &pet.id, &fields).unwrap();
    assert_echoes(&resp, &fields);
}

pub fn add_pet_without_photo(h: &Harness) {
    let key = h.key();
    let before = h.own_pets(&key).pets.len();
    let fields = PetFields::new("KRONA", "PIT", "555");

    let resp = h.api.add_pet_no_photo(&key, &fields);
    assert_echoes(&resp, &fields);
    assert_eq!(h.own_pets(&key).pets.len(), before + 1);

    let id = resp.str_field("id").unwrap().to_string();
    assert!(h.api.delete_pet(&key, &id).is_ok());
}

pub fn set_photo_of_own_pet(h: &Harness) {
    let key = h.key();
    let pet = h.ensure_own_pet(&key);

    let resp = h.api.set_pet_photo(&key, &pet.id, fixture("cat.jpg")).unwrap();
    assert_eq!(resp.status, Some(200), "{}", resp.text());
    assert!(!resp.str_field("pet_photo").unwrap_or_default().is_empty());
}

// ---------------------------------------------------------------------------
// Negative scenarios
// ---------------------------------------------------------------------------

pub fn api_key_for_invalid_user(h: &Harness) {
    let resp = h
        .api
        .get_api_key(&Credentials::new("nobody@petfriends.invalid", "pipper"));
    assert_no_key(&resp);
}

pub fn api_key_for_invalid_password(h: &Harness) {
    let resp = h
        .api
        .get_api_key(&Credentials::new(h.credentials.email.clone(), "123"));
    assert_no_key(&resp);
}

pub fn api_key_for_empty_credentials(h: &Harness) {
    let resp = h.api.get_api_key(&Credentials::new("", ""));
    assert_no_key(&resp);
}

pub fn api_key_missing_parameter(h: &Harness) {
    let without_email = Credentials::new("", h.credentials.password());
    assert_user_not_found(&h.api.get_api_key(&without_email));

    let without_password = Credentials::new(h.credentials.email.clone(), "");
    assert_user_not_found(&h.api.get_api_key(&without_password));

    assert_user_not_found(&h.api.get_api_key(&Credentials::new("", "")));
}

/// The service accepts blank names and types.
pub fn add_pet_with_empty_fields(h: &Harness) {
    add_then_delete(h, &PetFields::new("", "", "4"));
}

pub fn add_pet_with_long_name(h: &Harness) {
    let name = "The quick brown fox jumps over the lazy dog. ".repeat(25);
    assert!(name.chars().count() > 1000);
    add_then_delete(h, &PetFields::new(name, "tiger", "4"));
}

pub fn update_pet_with_special_characters(h: &Harness) {
    let key = h.key();
    let pet = h.ensure_own_pet(&key);
    let fields = PetFields::new("!@#$%^&", "@#!$%", "5");

    let resp = h.api.update_pet(&key, &pet.id, &fields).unwrap();
    assert_echoes(&resp, &fields);
}

/// Multipart field values carry the characters through unchanged.
pub fn add_pet_with_special_characters(h: &Harness) {
    add_then_delete(h, &PetFields::new("!@#$%^&\"", "@#!$%", "4"));
}
