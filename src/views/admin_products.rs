use std::{fmt::Write, path::Path};

use crate::{
    api::ApiState,
    models::{Acknowledgement, Category, ImageUpload, Product, ProductPayload},
};

use super::{Alert, Confirm, DeleteOutcome, FormError, UNKNOWN_ERROR, ViewState, format_price};

pub const LOAD_ERROR: &str = "Could not load products";
pub const REQUIRED_FIELDS: &str = "Name, price and category are required";
pub const INVALID_PRICE: &str = "Price must be a number";
pub const SAVE_FALLBACK: &str = "Error saving product";
pub const TOGGLE_FAILED: &str = "Error changing visibility";
pub const IMAGE_TOO_LARGE: &str = "Image cannot exceed 5MB";

/// Largest image accepted before upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// ProductForm
///
/// Raw input of the create/edit form. `precio` and `talles` are kept as typed text;
/// `talles` is a comma-separated list.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    pub nombre: String,
    pub precio: String,
    pub descripcion: String,
    pub categoria: String,
    pub imagen: String,
    pub talles: String,
    pub visible: bool,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            nombre: String::new(),
            precio: String::new(),
            descripcion: String::new(),
            categoria: String::new(),
            imagen: String::new(),
            talles: String::new(),
            // New products start visible.
            visible: true,
        }
    }
}

impl ProductForm {
    /// Prefills the form from an existing product (edit mode).
    pub fn from_product(product: &Product) -> Self {
        Self {
            nombre: product.nombre.clone(),
            precio: product.precio.to_string(),
            descripcion: product.descripcion.clone().unwrap_or_default(),
            categoria: product.categoria.id().to_string(),
            imagen: product.imagen.clone().unwrap_or_default(),
            talles: product.talles.join(", "),
            visible: product.visible,
        }
    }

    /// validate
    ///
    /// Checks the fields the form can judge on its own (name, price, category) and builds
    /// the payload.
    pub fn validate(&self) -> Result<ProductPayload, FormError> {
        let nombre = self.nombre.trim();
        let precio = self.precio.trim();
        let categoria = self.categoria.trim();
        if nombre.is_empty() || precio.is_empty() || categoria.is_empty() {
            return Err(FormError(REQUIRED_FIELDS.to_string()));
        }

        let precio: f64 = precio
            .parse()
            .ok()
            .filter(|value: &f64| value.is_finite())
            .ok_or_else(|| FormError(INVALID_PRICE.to_string()))?;

        Ok(ProductPayload {
            nombre: nombre.to_string(),
            precio,
            descripcion: self.descripcion.trim().to_string(),
            categoria: categoria.to_string(),
            imagen: self.imagen.clone(),
            talles: parse_sizes(&self.talles),
            visible: self.visible,
        })
    }
}

/// Splits `"S, M,,L "` into `["S", "M", "L"]`.
pub fn parse_sizes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|size| !size.is_empty())
        .map(str::to_string)
        .collect()
}

/// read_image
///
/// Loads a file from disk as an upload, keeping only its file name.
pub async fn read_image(path: &Path) -> std::io::Result<ImageUpload> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "imagen".to_string());
    Ok(ImageUpload { file_name, bytes })
}

/// AdminProductsPage
///
/// Every product (hidden ones included) plus the categories for the form's selector.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminProductsPage {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
}

/// AdminProductsView
pub struct AdminProductsView {
    api: ApiState,
}

impl AdminProductsView {
    pub fn new(api: ApiState) -> Self {
        Self { api }
    }

    /// load
    ///
    /// Both listings are fetched concurrently and must both succeed.
    pub async fn load(&self) -> ViewState<AdminProductsPage> {
        let joined = tokio::try_join!(self.api.list_all_products(), self.api.list_categories());
        let page = joined.map(|(products, categories)| AdminProductsPage {
            products,
            categories,
        });
        ViewState::from_result(page, LOAD_ERROR)
    }

    /// save
    ///
    /// Creates a product, or updates `editing` when given.
    pub async fn save(
        &self,
        editing: Option<&str>,
        form: &ProductForm,
    ) -> Result<Product, FormError> {
        let payload = form.validate()?;
        let result = match editing {
            Some(id) => self.api.update_product(id, &payload).await,
            None => self.api.create_product(&payload).await,
        };
        result.map_err(|err| FormError(err.message_or(SAVE_FALLBACK)))
    }

    /// delete
    ///
    /// Asks for confirmation first; declining sends nothing.
    pub async fn delete(&self, id: &str, nombre: &str, confirm: &dyn Confirm) -> DeleteOutcome {
        let prompt = format!("Are you sure you want to delete the product \"{nombre}\"?");
        if !confirm.confirm(&prompt) {
            return DeleteOutcome::Cancelled;
        }

        match self.api.delete_product(id).await {
            Ok(_) => DeleteOutcome::Deleted,
            Err(err) => DeleteOutcome::Failed(Alert(format!(
                "Error deleting product: {}",
                err.message_or(UNKNOWN_ERROR)
            ))),
        }
    }

    pub async fn toggle_visibility(&self, id: &str) -> Result<Acknowledgement, Alert> {
        self.api.toggle_visibility(id).await.map_err(|err| {
            tracing::warn!(error = %err, product = %id, "visibility toggle failed");
            Alert(TOGGLE_FAILED.to_string())
        })
    }

    /// upload_image
    ///
    /// Rejects files over [`MAX_IMAGE_BYTES`] without calling the backend. Returns the
    /// stored path to put in the form's `imagen` field.
    pub async fn upload_image(&self, upload: ImageUpload) -> Result<String, FormError> {
        if upload.bytes.len() > MAX_IMAGE_BYTES {
            return Err(FormError(IMAGE_TOO_LARGE.to_string()));
        }

        self.api
            .upload_image(upload)
            .await
            .map(|response| response.imagen)
            .map_err(|err| {
                FormError(format!(
                    "Error uploading image: {}",
                    err.message_or(UNKNOWN_ERROR)
                ))
            })
    }

    pub fn render(&self, state: &ViewState<AdminProductsPage>) -> String {
        let page = match state {
            ViewState::Loading => return "Loading...".to_string(),
            ViewState::Error(message) => return message.clone(),
            ViewState::Ready(page) => page,
        };

        let mut out = format!("Products ({})\n", page.products.len());
        if page.products.is_empty() {
            out.push_str("No products yet\n");
            return out;
        }

        for product in &page.products {
            let category = product
                .categoria
                .name()
                .or_else(|| {
                    page.categories
                        .iter()
                        .find(|category| category.id == product.categoria.id())
                        .map(|category| category.nombre.as_str())
                })
                .unwrap_or("No category");
            let visibility = if product.visible { "visible" } else { "hidden" };

            let _ = writeln!(
                out,
                "  [{}] {}  {}  {}  ({})",
                product.id,
                product.nombre,
                format_price(product.precio),
                category,
                visibility
            );
            if !product.talles.is_empty() {
                let _ = writeln!(out, "      Sizes: {}", product.talles.join(", "));
            }
            if let Some(imagen) = product.imagen.as_deref().filter(|i| !i.is_empty()) {
                let _ = writeln!(out, "      Image: {}", self.api.asset_url(imagen));
            }
        }
        out
    }
}
