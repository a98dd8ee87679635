use async_trait::async_trait;
use reqwest::{
    Client, Method, RequestBuilder, Url,
    header::{self, HeaderMap, HeaderValue},
    multipart::{Form, Part},
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::{ApiError, ConfigError},
    models::{
        Acknowledgement, Category, CategoryPayload, Credentials, ErrorPayload, ImageUpload,
        LoginResponse, Product, ProductPayload, RegisterRequest, UploadResponse, UserProfile,
    },
    storage::TokenState,
};

/// CatalogApi Trait
///
/// One method per backend endpoint. Implementations return the parsed body on success and
/// the backend's rejection untouched on failure; they never retry and never cache.
///
/// The session store and the views only see this trait, so tests can substitute a scripted
/// implementation for the HTTP one.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    // --- Auth ---
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;
    async fn register(&self, request: &RegisterRequest) -> Result<Acknowledgement, ApiError>;
    // Requires a persisted token. Used to restore a session at startup.
    async fn get_profile(&self) -> Result<UserProfile, ApiError>;

    // --- Categories ---
    // Server-ordered by `orden`.
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError>;
    async fn get_category(&self, id: &str) -> Result<Category, ApiError>;
    async fn create_category(&self, payload: &CategoryPayload) -> Result<Category, ApiError>;
    async fn update_category(
        &self,
        id: &str,
        payload: &CategoryPayload,
    ) -> Result<Category, ApiError>;
    async fn delete_category(&self, id: &str) -> Result<Acknowledgement, ApiError>;

    // --- Products ---
    // Public listings only contain visible products.
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;
    async fn list_products_by_category(&self, category_id: &str)
    -> Result<Vec<Product>, ApiError>;
    async fn get_product(&self, id: &str) -> Result<Product, ApiError>;
    // Admin listing, hidden products included.
    async fn list_all_products(&self) -> Result<Vec<Product>, ApiError>;
    async fn create_product(&self, payload: &ProductPayload) -> Result<Product, ApiError>;
    async fn update_product(&self, id: &str, payload: &ProductPayload)
    -> Result<Product, ApiError>;
    async fn delete_product(&self, id: &str) -> Result<Acknowledgement, ApiError>;
    // Flips `visible` server-side.
    async fn toggle_visibility(&self, id: &str) -> Result<Acknowledgement, ApiError>;

    // --- Upload ---
    async fn upload_image(&self, upload: ImageUpload) -> Result<UploadResponse, ApiError>;

    /// Absolute URL for a backend-relative image path. Not a backend call.
    fn asset_url(&self, path: &str) -> String {
        path.to_string()
    }
}

/// ApiState
///
/// Shared handle to the API client.
pub type ApiState = Arc<dyn CatalogApi>;

/// HttpCatalogApi
///
/// The reqwest-backed client. All requests go to `base_url` + endpoint path and carry the
/// token currently held by the token store, read afresh each time.
#[derive(Clone)]
pub struct HttpCatalogApi {
    client: Client,
    base_url: String,
    origin: String,
    tokens: TokenState,
}

impl HttpCatalogApi {
    /// new
    ///
    /// Builds the client for `config.api_url`. Fails if the URL does not parse or is not
    /// http(s).
    pub fn new(config: &AppConfig, tokens: TokenState) -> Result<Self, ApiError> {
        let parsed = Url::parse(&config.api_url).map_err(|err| ConfigError::InvalidBaseUrl {
            url: config.api_url.clone(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: config.api_url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            }
            .into());
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            origin: parsed.origin().ascii_serialization(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// request
    ///
    /// Starts a request to `path` and attaches the bearer token if one is persisted.
    /// A failing store read is logged and the request goes out without credentials.
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %path, "backend request");

        let builder = self.client.request(method, url);
        match self.tokens.load().await {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(err) => {
                tracing::warn!(error = %err, "could not read persisted token");
                builder
            }
        }
    }

    /// send
    ///
    /// Executes the request and maps the response: 2xx bodies are decoded into `T`,
    /// anything else becomes `ApiError::Backend` with the raw body kept intact.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(%status, "backend rejected request");
            return Err(ApiError::Backend {
                status,
                payload: ErrorPayload::from_body(&body),
                body,
            });
        }

        // 204 and empty bodies decode as an empty object.
        let body = if body.trim().is_empty() { "{}" } else { &body };
        Ok(serde_json::from_str(body)?)
    }
}

/// Joins `path` onto `origin` unless it is already absolute.
pub fn resolve_asset(origin: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{origin}{path}")
    } else {
        format!("{origin}/{path}")
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let request = self.request(Method::POST, "/auth/login").await;
        self.send(request.json(credentials)).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Acknowledgement, ApiError> {
        let builder = self.request(Method::POST, "/auth/register").await;
        self.send(builder.json(request)).await
    }

    async fn get_profile(&self) -> Result<UserProfile, ApiError> {
        let request = self.request(Method::GET, "/auth/perfil").await;
        self.send(request).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let request = self.request(Method::GET, "/categorias").await;
        self.send(request).await
    }

    async fn get_category(&self, id: &str) -> Result<Category, ApiError> {
        let request = self.request(Method::GET, &format!("/categorias/{id}")).await;
        self.send(request).await
    }

    async fn create_category(&self, payload: &CategoryPayload) -> Result<Category, ApiError> {
        let request = self.request(Method::POST, "/categorias").await;
        self.send(request.json(payload)).await
    }

    async fn update_category(
        &self,
        id: &str,
        payload: &CategoryPayload,
    ) -> Result<Category, ApiError> {
        let request = self.request(Method::PUT, &format!("/categorias/{id}")).await;
        self.send(request.json(payload)).await
    }

    async fn delete_category(&self, id: &str) -> Result<Acknowledgement, ApiError> {
        let request = self.request(Method::DELETE, &format!("/categorias/{id}")).await;
        self.send(request).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, "/productos").await;
        self.send(request).await
    }

    async fn list_products_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<Product>, ApiError> {
        let path = format!("/productos/categoria/{category_id}");
        let request = self.request(Method::GET, &path).await;
        self.send(request).await
    }

    async fn get_product(&self, id: &str) -> Result<Product, ApiError> {
        let request = self.request(Method::GET, &format!("/productos/{id}")).await;
        self.send(request).await
    }

    async fn list_all_products(&self) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, "/productos/admin/todos").await;
        self.send(request).await
    }

    async fn create_product(&self, payload: &ProductPayload) -> Result<Product, ApiError> {
        let request = self.request(Method::POST, "/productos").await;
        self.send(request.json(payload)).await
    }

    async fn update_product(
        &self,
        id: &str,
        payload: &ProductPayload,
    ) -> Result<Product, ApiError> {
        let request = self.request(Method::PUT, &format!("/productos/{id}")).await;
        self.send(request.json(payload)).await
    }

    async fn delete_product(&self, id: &str) -> Result<Acknowledgement, ApiError> {
        let request = self.request(Method::DELETE, &format!("/productos/{id}")).await;
        self.send(request).await
    }

    async fn toggle_visibility(&self, id: &str) -> Result<Acknowledgement, ApiError> {
        let path = format!("/productos/{id}/visibilidad");
        let request = self.request(Method::PATCH, &path).await;
        self.send(request).await
    }

    async fn upload_image(&self, upload: ImageUpload) -> Result<UploadResponse, ApiError> {
        let mime = upload.mime_type();
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(mime)?;
        let form = Form::new().part("imagen", part);

        // `multipart` sets its own Content-Type with the boundary, replacing the JSON default.
        let request = self.request(Method::POST, "/upload").await;
        self.send(request.multipart(form)).await
    }

    /// asset_url
    ///
    /// Resolves an image path returned by the backend (e.g. `/uploads/a.jpg`) against the
    /// backend origin. Absolute URLs are returned unchanged.
    fn asset_url(&self, path: &str) -> String {
        resolve_asset(&self.origin, path)
    }
}
