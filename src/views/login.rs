use crate::{
    models::Credentials,
    routes::{Navigation, Route},
    session::SessionStore,
};

use super::FormError;

pub const MISSING_FIELDS: &str = "Please fill in every field";

/// LoginView
///
/// Validates the form, delegates to the session store and tells the caller where to go.
pub struct LoginView<'a> {
    session: &'a SessionStore,
}

impl<'a> LoginView<'a> {
    pub fn new(session: &'a SessionStore) -> Self {
        Self { session }
    }

    /// submit
    ///
    /// Both fields are required. On success navigates to the dashboard; on failure returns
    /// the message to show under the form.
    pub async fn submit(&self, credentials: &Credentials) -> Result<Navigation, FormError> {
        if credentials.email.is_empty() || credentials.password.is_empty() {
            return Err(FormError(MISSING_FIELDS.to_string()));
        }

        self.session
            .login(credentials)
            .await
            .map(|_| Navigation::push(Route::Dashboard))
            .map_err(|err| FormError(err.message))
    }
}
