use std::fmt::Write;

use crate::{api::ApiState, models::Category, routes::Route};

use super::ViewState;

pub const LOAD_ERROR: &str = "Could not load categories";

/// HomeView
///
/// The public landing page: every category in the order the backend returns them.
pub struct HomeView {
    api: ApiState,
}

impl HomeView {
    pub fn new(api: ApiState) -> Self {
        Self { api }
    }

    pub async fn load(&self) -> ViewState<Vec<Category>> {
        ViewState::from_result(self.api.list_categories().await, LOAD_ERROR)
    }

    pub fn render(state: &ViewState<Vec<Category>>) -> String {
        let categories = match state {
            ViewState::Loading => return "Loading categories...".to_string(),
            ViewState::Error(message) => return message.clone(),
            ViewState::Ready(categories) => categories,
        };

        let mut out = String::from("Catalogo Marcela\nPick a category to see its products\n\n");
        if categories.is_empty() {
            out.push_str("No categories available\n");
            return out;
        }
        for category in categories {
            let _ = writeln!(
                out,
                "  {}  ({})",
                category.nombre,
                Route::Category(category.id.clone())
            );
            if let Some(descripcion) = category.descripcion.as_deref().filter(|d| !d.is_empty()) {
                let _ = writeln!(out, "      {descripcion}");
            }
        }
        out
    }
}
