//! In-memory stand-in for the PetFriends service.
//!
//! Mirrors the wire behavior the client has to cope with: auth failures are
//! HTML pages rather than JSON, uploads are multipart, updates are
//! form-encoded and delete answers 200 with an empty body.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const DEMO_EMAIL: &str = "owner@petfriends.test";
pub const DEMO_PASSWORD: &str = "correct-horse";

pub const USER_NOT_FOUND: &str = "This user wasn't found in database";
pub const NO_AUTH_KEY: &str = "Please provide 'auth_key' Header";
pub const PET_NOT_FOUND: &str = "Pet with this id wasn't found!";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    pub pet_photo: String,
    pub user_id: String,
    pub created_at: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyResponse {
    pub key: String,
}

#[derive(Clone, Debug)]
pub struct Account {
    pub email: String,
    pub password: String,
    pub key: String,
    pub user_id: String,
}

#[derive(Debug, Default)]
pub struct Store {
    accounts: Vec<Account>,
    pets: Vec<Pet>,
}

impl Store {
    /// The demo account plus a neighbour who already owns one pet, so the
    /// unfiltered listing is never empty.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        store.add_account(DEMO_EMAIL, DEMO_PASSWORD);
        let neighbour = store.add_account("neighbour@petfriends.test", "neighbour-password");
        store.pets.push(Pet {
            id: Uuid::new_v4().to_string(),
            name: "Barsik".to_string(),
            animal_type: "cat".to_string(),
            age: "2".to_string(),
            pet_photo: String::new(),
            user_id: neighbour.user_id,
            created_at: now(),
        });
        store
    }

    pub fn add_account(&mut self, email: &str, password: &str) -> Account {
        let account = Account {
            email: email.to_string(),
            password: password.to_string(),
            key: Uuid::new_v4().simple().to_string(),
            user_id: Uuid::new_v4().simple().to_string(),
        };
        self.accounts.push(account.clone());
        account
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<&Account, Abort> {
        let key = header_str(headers, "auth_key").ok_or_else(|| Abort::forbidden(NO_AUTH_KEY))?;
        self.accounts
            .iter()
            .find(|a| a.key == key)
            .ok_or_else(|| Abort::forbidden(NO_AUTH_KEY))
    }

    fn owned_pet_mut(&mut self, user_id: &str, pet_id: &str) -> Result<&mut Pet, Abort> {
        self.pets
            .iter_mut()
            .find(|p| p.id == pet_id && p.user_id == user_id)
            .ok_or_else(|| Abort::bad_request(PET_NOT_FOUND))
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with_store(Store::seeded())
}

pub fn app_with_store(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/key", get(get_api_key))
        .route("/api/pets", get(list_pets).post(create_pet))
        .route("/api/create_pet_simple", post(create_pet_simple))
        .route("/api/pets/set_photo/{pet_id}", post(set_photo))
        .route("/api/pets/{pet_id}", put(update_pet).delete(delete_pet))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// An error page in the style the real service renders.
#[derive(Debug)]
pub struct Abort {
    status: StatusCode,
    description: String,
}

impl Abort {
    fn new(status: StatusCode, description: impl Into<String>) -> Self {
        Self {
            status,
            description: description.into(),
        }
    }

    fn forbidden(description: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, description)
    }

    fn bad_request(description: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, description)
    }
}

impl IntoResponse for Abort {
    fn into_response(self) -> Response {
        tracing::debug!(status = %self.status, description = %self.description, "aborting request");
        let reason = self.status.canonical_reason().unwrap_or("Error");
        let page = format!(
            "<!doctype html>\n<html lang=en>\n<title>{} {reason}</title>\n<h1>{reason}</h1>\n<p>{}</p>\n",
            self.status.as_u16(),
            html_escape::encode_safe(&self.description),
        );
        (
            self.status,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            page,
        )
            .into_response()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
}

fn now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

async fn caller_id(db: &Db, headers: &HeaderMap) -> Result<String, Abort> {
    let store = db.read().await;
    store.authorize(headers).map(|a| a.user_id.clone())
}

async fn get_api_key(State(db): State<Db>, headers: HeaderMap) -> Result<Json<KeyResponse>, Abort> {
    let email = header_str(&headers, "email");
    let password = header_str(&headers, "password");
    let store = db.read().await;
    store
        .accounts
        .iter()
        .find(|a| Some(a.email.as_str()) == email && Some(a.password.as_str()) == password)
        .map(|a| Json(KeyResponse { key: a.key.clone() }))
        .ok_or_else(|| Abort::forbidden(USER_NOT_FOUND))
}

#[derive(Deserialize)]
struct ListParams {
    #[serde(default)]
    filter: String,
}

async fn list_pets(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<PetList>, Abort> {
    let store = db.read().await;
    let account = store.authorize(&headers)?;
    let newest_first = store.pets.iter().rev();
    let pets = match params.filter.as_str() {
        "" => newest_first.cloned().collect(),
        "my_pets" => newest_first
            .filter(|p| p.user_id == account.user_id)
            .cloned()
            .collect(),
        _ => return Err(Abort::bad_request("Filter value is incorrect")),
    };
    Ok(Json(PetList { pets }))
}

/// Text fields and the optional photo (as a data URI) of a multipart body.
#[derive(Default)]
struct Upload {
    fields: HashMap<String, String>,
    photo: Option<String>,
}

impl Upload {
    async fn read(mut multipart: Multipart) -> Result<Self, Abort> {
        let mut upload = Upload::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| Abort::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "pet_photo" {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Abort::bad_request(e.body_text()))?;
                upload.photo = Some(photo_data_uri(&content_type, &data)?);
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Abort::bad_request(e.body_text()))?;
                upload.fields.insert(name, text);
            }
        }
        Ok(upload)
    }

    fn take(&mut self, field: &str) -> Result<String, Abort> {
        self.fields
            .remove(field)
            .ok_or_else(|| Abort::bad_request(format!("Missing required field: {field}")))
    }

    fn take_photo(&mut self) -> Result<String, Abort> {
        self.photo
            .take()
            .ok_or_else(|| Abort::bad_request("Missing required field: pet_photo"))
    }

    fn into_pet(mut self, user_id: String, pet_photo: String) -> Result<Pet, Abort> {
        Ok(Pet {
            id: Uuid::new_v4().to_string(),
            name: self.take("name")?,
            animal_type: self.take("animal_type")?,
            age: self.take("age")?,
            pet_photo,
            user_id,
            created_at: now(),
        })
    }
}

fn photo_data_uri(content_type: &str, data: &[u8]) -> Result<String, Abort> {
    if !matches!(content_type, "image/jpeg" | "image/png") {
        return Err(Abort::bad_request("Photo must be a JPEG or PNG image"));
    }
    if data.is_empty() {
        return Err(Abort::bad_request("Photo is empty"));
    }
    Ok(format!("data:{content_type};base64,{}", STANDARD.encode(data)))
}

async fn create_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Pet>, Abort> {
    let user_id = caller_id(&db, &headers).await?;
    let mut upload = Upload::read(multipart).await?;
    let photo = upload.take_photo()?;
    let pet = upload.into_pet(user_id, photo)?;
    db.write().await.pets.push(pet.clone());
    Ok(Json(pet))
}

async fn create_pet_simple(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Pet>, Abort> {
    let user_id = caller_id(&db, &headers).await?;
    let upload = Upload::read(multipart).await?;
    let pet = upload.into_pet(user_id, String::new())?;
    db.write().await.pets.push(pet.clone());
    Ok(Json(pet))
}

async fn set_photo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Pet>, Abort> {
    let user_id = caller_id(&db, &headers).await?;
    let photo = Upload::read(multipart).await?.take_photo()?;
    let mut store = db.write().await;
    let pet = store.owned_pet_mut(&user_id, &pet_id)?;
    pet.pet_photo = photo;
    Ok(Json(pet.clone()))
}

#[derive(Deserialize)]
struct PetForm {
    name: Option<String>,
    animal_type: Option<String>,
    age: Option<String>,
}

async fn update_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
    Form(form): Form<PetForm>,
) -> Result<Json<Pet>, Abort> {
    let mut store = db.write().await;
    let user_id = store.authorize(&headers)?.user_id.clone();
    let pet = store.owned_pet_mut(&user_id, &pet_id)?;
    if let Some(name) = form.name {
        pet.name = name;
    }
    if let Some(animal_type) = form.animal_type {
        pet.animal_type = animal_type;
    }
    if let Some(age) = form.age {
        pet.age = age;
    }
    Ok(Json(pet.clone()))
}

// The real service confirms deletion with an empty 200, even for ids it
// does not know.
async fn delete_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
) -> Result<StatusCode, Abort> {
    let mut store = db.write().await;
    let user_id = store.authorize(&headers)?.user_id.clone();
    store
        .pets
        .retain(|p| !(p.id == pet_id && p.user_id == user_id));
    Ok(StatusCode::OK)
}
