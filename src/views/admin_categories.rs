use std::fmt::Write;

use crate::{
    api::ApiState,
    models::{Category, CategoryPayload},
};

use super::{Alert, Confirm, DeleteOutcome, FormError, UNKNOWN_ERROR, ViewState};

pub const LOAD_ERROR: &str = "Could not load categories";
pub const NAME_REQUIRED: &str = "Name is required";
pub const SAVE_FALLBACK: &str = "Error saving category";

/// CategoryForm
///
/// Raw input of the create/edit form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryForm {
    pub nombre: String,
    pub descripcion: String,
    pub orden: i32,
}

impl CategoryForm {
    /// Prefills the form from an existing category (edit mode).
    pub fn from_category(category: &Category) -> Self {
        Self {
            nombre: category.nombre.clone(),
            descripcion: category.descripcion.clone().unwrap_or_default(),
            orden: category.orden,
        }
    }

    /// validate
    ///
    /// Only the name is checked here; everything else is the backend's call.
    pub fn validate(&self) -> Result<CategoryPayload, FormError> {
        let nombre = self.nombre.trim();
        if nombre.is_empty() {
            return Err(FormError(NAME_REQUIRED.to_string()));
        }
        Ok(CategoryPayload {
            nombre: nombre.to_string(),
            descripcion: self.descripcion.trim().to_string(),
            orden: self.orden,
        })
    }
}

/// AdminCategoriesView
pub struct AdminCategoriesView {
    api: ApiState,
}

impl AdminCategoriesView {
    pub fn new(api: ApiState) -> Self {
        Self { api }
    }

    pub async fn load(&self) -> ViewState<Vec<Category>> {
        ViewState::from_result(self.api.list_categories().await, LOAD_ERROR)
    }

    /// save
    ///
    /// Creates a category, or updates `editing` when given. Validation failures never reach
    /// the backend; backend rejections come back with their own message.
    pub async fn save(
        &self,
        editing: Option<&str>,
        form: &CategoryForm,
    ) -> Result<Category, FormError> {
        let payload = form.validate()?;
        let result = match editing {
            Some(id) => self.api.update_category(id, &payload).await,
            None => self.api.create_category(&payload).await,
        };
        result.map_err(|err| FormError(err.message_or(SAVE_FALLBACK)))
    }

    /// delete
    ///
    /// Asks for confirmation first; declining sends nothing.
    pub async fn delete(&self, id: &str, nombre: &str, confirm: &dyn Confirm) -> DeleteOutcome {
        let prompt = format!("Are you sure you want to delete the category \"{nombre}\"?");
        if !confirm.confirm(&prompt) {
            return DeleteOutcome::Cancelled;
        }

        match self.api.delete_category(id).await {
            Ok(_) => DeleteOutcome::Deleted,
            Err(err) => DeleteOutcome::Failed(Alert(format!(
                "Error deleting category: {}",
                err.message_or(UNKNOWN_ERROR)
            ))),
        }
    }

    pub fn render(state: &ViewState<Vec<Category>>) -> String {
        let categories = match state {
            ViewState::Loading => return "Loading...".to_string(),
            ViewState::Error(message) => return message.clone(),
            ViewState::Ready(categories) => categories,
        };

        let mut out = format!("Categories ({})\n", categories.len());
        if categories.is_empty() {
            out.push_str("No categories yet\n");
            return out;
        }
        for category in categories {
            let _ = writeln!(
                out,
                "  [{}] {}  (order: {})",
                category.id, category.nombre, category.orden
            );
            if let Some(descripcion) = category.descripcion.as_deref().filter(|d| !d.is_empty()) {
                let _ = writeln!(out, "      {descripcion}");
            }
        }
        out
    }
}
