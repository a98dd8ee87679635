use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// --- Backend Entities ---

/// Category
///
/// A catalog category as stored by the backend. The public listing is ordered by `orden`
/// on the server side; the client never re-sorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    // Lower numbers are listed first.
    #[serde(default)]
    pub orden: i32,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// CategoryRef
///
/// The `categoria` field of a product. Listing endpoints may populate it with the full
/// category document, others only send its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(String),
    Embedded(Box<Category>),
}

impl CategoryRef {
    /// The referenced category id, whichever form the backend used.
    pub fn id(&self) -> &str {
        match self {
            CategoryRef::Id(id) => id,
            CategoryRef::Embedded(category) => &category.id,
        }
    }

    /// Display name, only known when the category was embedded.
    pub fn name(&self) -> Option<&str> {
        match self {
            CategoryRef::Id(_) => None,
            CategoryRef::Embedded(category) => Some(&category.nombre),
        }
    }
}

impl Default for CategoryRef {
    fn default() -> Self {
        CategoryRef::Id(String::new())
    }
}

/// Product
///
/// A product document. `visible` controls whether it shows up in the public listings;
/// hidden products are only returned by the admin listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub nombre: String,
    pub precio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub categoria: CategoryRef,
    // Backend-relative path, e.g. `/uploads/ring.jpg`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagen: Option<String>,
    #[serde(default)]
    pub talles: Vec<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_visible() -> bool {
    true
}

/// UserProfile
///
/// The authenticated identity as returned by the backend. Only `nombre` is read (for
/// greetings); every other field is kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserProfile {
    #[serde(default)]
    pub nombre: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// --- Request Payloads ---

/// Credentials
///
/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// RegisterRequest
///
/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegisterRequest {
    pub nombre: String,
    pub email: String,
    pub password: String,
}

/// CategoryPayload
///
/// Body of category create/update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CategoryPayload {
    pub nombre: String,
    pub descripcion: String,
    pub orden: i32,
}

/// ProductPayload
///
/// Body of product create/update calls. `categoria` is always sent as an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProductPayload {
    pub nombre: String,
    pub precio: f64,
    pub descripcion: String,
    pub categoria: String,
    pub imagen: String,
    pub talles: Vec<String>,
    pub visible: bool,
}

/// ImageUpload
///
/// A file to send to `POST /upload` as the multipart field `imagen`.
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// MIME type guessed from the file extension.
    pub fn mime_type(&self) -> &'static str {
        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

// --- Response Payloads ---

/// LoginResponse
///
/// `POST /auth/login` answers with the token and the profile fields side by side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// UploadResponse
///
/// Path of the stored image, relative to the backend origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub imagen: String,
}

/// Acknowledgement
///
/// Body of calls that do not return an entity (deletes, visibility toggles, registration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Acknowledgement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// ErrorPayload
///
/// The structured body of a rejected request. `mensaje` is absent when the backend sent
/// something else (HTML error page, empty body...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ErrorPayload {
    #[serde(default)]
    pub mensaje: Option<String>,
}

impl ErrorPayload {
    /// Parses a raw error body, yielding an empty payload for non-JSON bodies.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}
