use crate::{
    routes::{Navigation, Route},
    session::{Session, SessionStore},
};

/// DashboardView
///
/// Landing page of the admin area. Only rendered behind the access gate, so an identity is
/// expected; a missing one renders an empty name rather than failing.
pub struct DashboardView;

impl DashboardView {
    pub fn render(session: &Session) -> String {
        let nombre = session
            .identity
            .as_ref()
            .map(|identity| identity.nombre.as_str())
            .unwrap_or_default();

        [
            "Admin panel".to_string(),
            format!("Welcome, {nombre}!"),
            "Manage your catalog from here.".to_string(),
            String::new(),
            format!("  Catalog     {}", Route::Home),
            format!(
                "  Categories  {}  create, edit and delete categories",
                Route::AdminCategories
            ),
            format!(
                "  Products    {}  create, edit, hide and delete products",
                Route::AdminProducts
            ),
        ]
        .join("\n")
    }

    /// Logs out and heads back to the public catalog.
    pub async fn logout(session: &SessionStore) -> Navigation {
        session.logout().await;
        Navigation::push(Route::Home)
    }
}
