use super::Route;

/// Admin Routes
///
/// Pages nested under `/admin`. Every route returned here reports `is_protected() == true`,
/// so callers must settle the access gate before rendering them.
///
/// `segments` is the path after the `admin` prefix.
pub fn resolve(segments: &[&str]) -> Option<Route> {
    match segments {
        // /admin
        // Greeting and links to the management pages.
        [] => Some(Route::Dashboard),
        // /admin/categorias
        // Category create, edit and delete.
        ["categorias"] => Some(Route::AdminCategories),
        // /admin/productos
        // Product management, including hidden products, visibility and images.
        ["productos"] => Some(Route::AdminProducts),
        _ => None,
    }
}
