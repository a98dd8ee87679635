// View Layer
//
// Page models driven by the CLI. Each page asks the API client for data, exposes it as a
// `ViewState` and renders plain text. Pages never touch the token store or build auth
// headers; session changes go through the `SessionStore` they are handed.
use thiserror::Error;

/// `/` - category grid.
pub mod home;

/// `/categoria/{id}` - one category and its visible products.
pub mod category;

/// `/login`
pub mod login;

/// `/admin` - greeting and navigation.
pub mod dashboard;

/// `/admin/categorias`
pub mod admin_categories;

/// `/admin/productos`
pub mod admin_products;

/// Fallback used when a failed action carries no backend message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// ViewState
///
/// The three mutually exclusive states every page renders.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Error(String),
    Ready(T),
}

impl<T> ViewState<T> {
    /// Maps a load result, replacing any error with the page's fixed message.
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>, message: &str) -> Self {
        match result {
            Ok(data) => ViewState::Ready(data),
            Err(err) => {
                tracing::warn!(error = %err, "{}", message);
                ViewState::Error(message.to_string())
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

/// FormError
///
/// An inline form message: either a client-side validation failure or the backend's
/// rejection message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FormError(pub String);

/// Alert
///
/// A blocking failure message, used for destructive or one-click actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Alert(pub String);

/// DeleteOutcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined the confirmation; no request was sent.
    Cancelled,
    Deleted,
    Failed(Alert),
}

/// Confirm
///
/// Interactive confirmation asked before any destructive call.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// AutoConfirm
///
/// Answers every prompt with the wrapped value (`--yes` flag, tests).
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// format_price
///
/// Argentine peso amount without decimals and with `.` as thousands separator:
/// `12500.0` renders as `$ 12.500`.
pub fn format_price(precio: f64) -> String {
    let rounded = precio.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    format!("{sign}$ {grouped}")
}
