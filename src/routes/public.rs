use super::Route;

/// Public Routes
///
/// Pages any visitor can open: the category grid, a category's products and the login form.
pub fn resolve(segments: &[&str]) -> Option<Route> {
    match segments {
        // GET /
        [] => Some(Route::Home),
        // GET /categoria/{id}
        ["categoria", id] => Some(Route::Category((*id).to_string())),
        // GET /login
        ["login"] => Some(Route::Login),
        _ => None,
    }
}
