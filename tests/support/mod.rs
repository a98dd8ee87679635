#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Multipart, Path, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use catalogo_console::{
    ApiState, AppConfig, Console, HttpCatalogApi, MemoryTokenStore, TokenState,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

// --- Fixtures ---

pub const ADMIN_EMAIL: &str = "marcela@catalogo.test";
pub const ADMIN_PASSWORD: &str = "secreto";
pub const ADMIN_NAME: &str = "Marcela";
pub const VALID_TOKEN: &str = "token-marcela";
/// Logging in with this email makes the backend fail with a non-JSON body.
pub const BROKEN_EMAIL: &str = "broken@catalogo.test";

/// BackendState
///
/// In-memory data of the fake backend plus what it observed.
#[derive(Default)]
pub struct BackendState {
    pub categories: Vec<Value>,
    pub products: Vec<Value>,
    /// Number of `GET /auth/perfil` calls.
    pub profile_calls: usize,
    /// Authorization header of every request, in arrival order.
    pub authorization: Vec<Option<String>>,
    /// File name and size of every upload.
    pub uploads: Vec<(String, usize)>,
}

pub type Shared = Arc<Mutex<BackendState>>;

/// TestBackend
///
/// A fake catalog backend bound to a random local port.
pub struct TestBackend {
    pub address: String,
    pub state: Shared,
}

impl TestBackend {
    pub fn api_url(&self) -> String {
        format!("{}/api", self.address)
    }

    pub fn config(&self) -> AppConfig {
        AppConfig::default().with_api_url(self.api_url())
    }

    pub fn profile_calls(&self) -> usize {
        self.state.lock().unwrap().profile_calls
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .authorization
            .last()
            .cloned()
            .flatten()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().authorization.len()
    }

    pub fn seed_category(&self, nombre: &str, orden: i32) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.state.lock().unwrap().categories.push(json!({
            "_id": id,
            "nombre": nombre,
            "descripcion": "",
            "orden": orden,
        }));
        id
    }

    pub fn seed_product(&self, nombre: &str, precio: f64, categoria: &str, visible: bool) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.state.lock().unwrap().products.push(json!({
            "_id": id,
            "nombre": nombre,
            "precio": precio,
            "descripcion": "",
            "categoria": categoria,
            "imagen": "",
            "talles": [],
            "visible": visible,
        }));
        id
    }

    pub fn product_visible(&self, id: &str) -> Option<bool> {
        self.state
            .lock()
            .unwrap()
            .products
            .iter()
            .find(|p| p["_id"] == id)
            .and_then(|p| p["visible"].as_bool())
    }

    /// API client + session store over a fresh in-memory token store.
    pub fn console(&self) -> (Console, Arc<MemoryTokenStore>) {
        self.console_with(MemoryTokenStore::new())
    }

    pub fn console_with(&self, store: MemoryTokenStore) -> (Console, Arc<MemoryTokenStore>) {
        let store = Arc::new(store);
        let tokens = store.clone() as TokenState;
        let config = self.config();
        let api = Arc::new(HttpCatalogApi::new(&config, tokens.clone()).unwrap()) as ApiState;
        (Console::from_parts(config, tokens, api), store)
    }
}

pub async fn spawn_backend() -> TestBackend {
    let state = Shared::default();

    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/perfil", get(profile))
        .route("/categorias", get(list_categories).post(create_category))
        .route(
            "/categorias/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/productos", get(list_visible_products).post(create_product))
        .route("/productos/admin/todos", get(list_all_products))
        .route("/productos/categoria/{id}", get(products_by_category))
        .route(
            "/productos/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/productos/{id}/visibilidad", patch(toggle_visibility))
        .route("/upload", post(upload));

    let router = Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record_authorization))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestBackend { address, state }
}

// --- Middleware & Helpers ---

async fn record_authorization(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state.lock().unwrap().authorization.push(value);
    next.run(request).await
}

fn mensaje(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "mensaje": text }))).into_response()
}

/// `Some(response)` when the request lacks the valid bearer token.
fn reject_unauthorized(headers: &HeaderMap) -> Option<Response> {
    let expected = format!("Bearer {VALID_TOKEN}");
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == expected)
        .unwrap_or(false);
    if authorized {
        None
    } else {
        Some(mensaje(StatusCode::UNAUTHORIZED, "Token no válido"))
    }
}

fn profile_json() -> Value {
    json!({ "_id": "u-1", "nombre": ADMIN_NAME, "email": ADMIN_EMAIL })
}

fn category_not_found() -> Response {
    mensaje(StatusCode::NOT_FOUND, "Categoría no encontrada")
}

fn product_not_found() -> Response {
    mensaje(StatusCode::NOT_FOUND, "Producto no encontrado")
}

// --- Auth ---

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if email == BROKEN_EMAIL {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    if email == ADMIN_EMAIL && password == ADMIN_PASSWORD {
        let mut response = profile_json();
        response["token"] = json!(VALID_TOKEN);
        return Json(response).into_response();
    }
    mensaje(StatusCode::UNAUTHORIZED, "Credenciales inválidas")
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"].as_str().unwrap_or_default().is_empty() {
        return mensaje(StatusCode::BAD_REQUEST, "El email es obligatorio");
    }
    mensaje(StatusCode::CREATED, "Usuario registrado")
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.lock().unwrap().profile_calls += 1;
    if let Some(rejection) = reject_unauthorized(&headers) {
        return rejection;
    }
    Json(profile_json()).into_response()
}

// --- Categories ---

async fn list_categories(State(state): State<Shared>) -> Response {
    let mut categories = state.lock().unwrap().categories.clone();
    categories.sort_by_key(|c| c["orden"].as_i64().unwrap_or_default());
    Json(categories).into_response()
}

async fn get_category(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let state = state.lock().unwrap();
    match state.categories.iter().find(|c| c["_id"] == id.as_str()) {
        Some(category) => Json(category.clone()).into_response(),
        None => category_not_found(),
    }
}

async fn create_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = reject_unauthorized(&headers) {
        return rejection;
    }
    if body["nombre"].as_str().unwrap_or_default().is_empty() {
        return mensaje(StatusCode::BAD_REQUEST, "El nombre es obligatorio");
    }
    let mut category = body.clone();
    category["_id"] = json!(Uuid::new_v4().simple().to_string());
    state.lock().unwrap().categories.push(category.clone());
    (StatusCode::CREATED, Json(category)).into_response()
}

async fn update_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = reject_unauthorized(&headers) {
        return rejection;
    }
    let mut state = state.lock().unwrap();
    let Some(category) = state.categories.iter_mut().find(|c| c["_id"] == id.as_str()) else {
        return category_not_found();
    };
    for key in ["nombre", "descripcion", "orden"] {
        if !body[key].is_null() {
            category[key] = body[key].clone();
        }
    }
    Json(category.clone()).into_response()
}

async fn delete_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Some(rejection) = reject_unauthorized(&headers) {
        return rejection;
    }
    let mut state = state.lock().unwrap();
    let before = state.categories.len();
    state.categories.retain(|c| c["_id"] != id.as_str());
    if state.categories.len() == before {
        return category_not_found();
    }
    mensaje(StatusCode::OK, "Categoría eliminada")
}

// --- Products ---

async fn list_visible_products(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    let products: Vec<Value> = state
        .products
        .iter()
        .filter(|p| p["visible"].as_bool().unwrap_or(true))
        .cloned()
        .collect();
    Json(products).into_response()
}

async fn list_all_products(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Some(rejection) = reject_unauthorized(&headers) {
        return rejection;
    }
    Json(state.lock().unwrap().products.clone()).into_response()
}

async fn products_by_category(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let state = state.lock().unwrap();
    if !state.categories.iter().any(|c| c["_id"] == id.as_str()) {
        return category_not_found();
    }
    let products: Vec<Value> = state
        .products
        .iter()
        .filter(|p| p["categoria"] == id.as_str() && p["visible"].as_bool().unwrap_or(true))
        .cloned()
        .collect();
    Json(products).into_response()
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let state = state.lock().unwrap();
    match state.products.iter().find(|p| p["_id"] == id.as_str()) {
        Some(product) => Json(product.clone()).into_response(),
        None => product_not_found(),
    }
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = reject_unauthorized(&headers) {
        return rejection;
    }
    let mut product = body.clone();
    product["_id"] = json!(Uuid::new_v4().simple().to_string());
    state.lock().unwrap().products.push(product.clone());
    (StatusCode::CREATED, Json(product)).into_response()
}

async fn update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = reject_unauthorized(&headers) {
        return rejection;
    }
    let mut state = state.lock().unwrap();
    let Some(product) = state.products.iter_mut().find(|p| p["_id"] == id.as_str()) else {
        return product_not_found();
    };
    let mut updated = body.clone();
    updated["_id"] = json!(id);
    *product = updated.clone();
    Json(updated).into_response()
}

async fn delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Some(rejection) = reject_unauthorized(&headers) {
        return rejection;
    }
    let mut state = state.lock().unwrap();
    let before = state.products.len();
    state.products.retain(|p| p["_id"] != id.as_str());
    if state.products.len() == before {
        return product_not_found();
    }
    mensaje(StatusCode::OK, "Producto eliminado")
}

async fn toggle_visibility(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Some(rejection) = reject_unauthorized(&headers) {
        return rejection;
    }
    let mut state = state.lock().unwrap();
    let Some(product) = state.products.iter_mut().find(|p| p["_id"] == id.as_str()) else {
        return product_not_found();
    };
    let visible = !product["visible"].as_bool().unwrap_or(true);
    product["visible"] = json!(visible);
    Json(json!({ "mensaje": "Visibilidad actualizada", "visible": visible })).into_response()
}

// --- Upload ---

async fn upload(State(state): State<Shared>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    if let Some(rejection) = reject_unauthorized(&headers) {
        return rejection;
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("imagen") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("imagen").to_string();
        let Ok(bytes) = field.bytes().await else {
            return mensaje(StatusCode::BAD_REQUEST, "Archivo inválido");
        };
        state
            .lock()
            .unwrap()
            .uploads
            .push((file_name.clone(), bytes.len()));
        return Json(json!({ "imagen": format!("/uploads/{file_name}") })).into_response();
    }
    mensaje(StatusCode::BAD_REQUEST, "No se envió ninguna imagen")
}
