use std::fmt::Write;

use crate::{
    api::ApiState,
    models::{Category, Product},
};

use super::{ViewState, format_price};

pub const LOAD_ERROR: &str = "Could not load products";

/// CategoryPage
///
/// A category together with its visible products.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPage {
    pub category: Category,
    pub products: Vec<Product>,
}

/// CategoryView
pub struct CategoryView {
    api: ApiState,
}

impl CategoryView {
    pub fn new(api: ApiState) -> Self {
        Self { api }
    }

    /// load
    ///
    /// Fetches the category record and its products concurrently. The page is only ready
    /// when both succeed; a failure of either yields the error state, never partial data.
    pub async fn load(&self, category_id: &str) -> ViewState<CategoryPage> {
        let joined = tokio::try_join!(
            self.api.list_products_by_category(category_id),
            self.api.get_category(category_id),
        );
        let page = joined.map(|(products, category)| CategoryPage { category, products });
        ViewState::from_result(page, LOAD_ERROR)
    }

    pub fn render(&self, state: &ViewState<CategoryPage>) -> String {
        let page = match state {
            ViewState::Loading => return "Loading products...".to_string(),
            ViewState::Error(message) => return format!("{message}\n[back: /]"),
            ViewState::Ready(page) => page,
        };

        let mut out = format!("<- back (/)\n{}\n", page.category.nombre);
        if let Some(descripcion) = page.category.descripcion.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "{descripcion}");
        }
        out.push('\n');

        if page.products.is_empty() {
            out.push_str("No products available in this category\n");
            return out;
        }

        for product in &page.products {
            let _ = writeln!(out, "  {}  {}", product.nombre, format_price(product.precio));
            if let Some(descripcion) = product.descripcion.as_deref().filter(|d| !d.is_empty()) {
                let _ = writeln!(out, "      {descripcion}");
            }
            if !product.talles.is_empty() {
                let _ = writeln!(out, "      Sizes: {}", product.talles.join(", "));
            }
            match product.imagen.as_deref().filter(|i| !i.is_empty()) {
                Some(imagen) => {
                    let _ = writeln!(out, "      Image: {}", self.api.asset_url(imagen));
                }
                None => out.push_str("      (no image)\n"),
            }
        }
        out
    }
}
