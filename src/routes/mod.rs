// Route Table Index
//
// The console's pages, split the same way access is: public pages anyone can open and
// admin pages that must go through the access gate. Every path resolves to at most one
// route; there are no fallback entries.
use std::fmt;

/// Pages reachable without a session.
pub mod public;

/// Pages guarded by the access gate.
pub mod admin;

/// Route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/` - category grid.
    Home,
    /// `/categoria/{id}` - products of one category.
    Category(String),
    /// `/login`
    Login,
    /// `/admin`
    Dashboard,
    /// `/admin/categorias`
    AdminCategories,
    /// `/admin/productos`
    AdminProducts,
}

impl Route {
    /// parse
    ///
    /// Resolves a path (query string and trailing slash ignored) to its route.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.split_first() {
            Some((&"admin", rest)) => admin::resolve(rest),
            _ => public::resolve(&segments),
        }
    }

    /// Canonical path of the route.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Category(id) => format!("/categoria/{id}"),
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/admin".to_string(),
            Route::AdminCategories => "/admin/categorias".to_string(),
            Route::AdminProducts => "/admin/productos".to_string(),
        }
    }

    /// Whether the page must be wrapped by the access gate.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Dashboard | Route::AdminCategories | Route::AdminProducts
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Navigation
///
/// A navigation side effect requested by the gate or a view. With `replace` the current
/// history entry is overwritten, so going back skips it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub to: Route,
    pub replace: bool,
}

impl Navigation {
    pub fn push(to: Route) -> Self {
        Self { to, replace: false }
    }

    pub fn replace(to: Route) -> Self {
        Self { to, replace: true }
    }
}

/// History
///
/// Minimal navigation stack. It always holds at least one entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Route>,
}

impl History {
    pub fn new(start: Route) -> Self {
        Self {
            entries: vec![start],
        }
    }

    pub fn current(&self) -> &Route {
        // `entries` is never empty: `back` keeps the first entry.
        &self.entries[self.entries.len() - 1]
    }

    /// Applies a navigation, returning the new current route.
    pub fn navigate(&mut self, navigation: Navigation) -> &Route {
        if navigation.replace {
            self.entries.pop();
        }
        self.entries.push(navigation.to);
        self.current()
    }

    /// Goes one entry back. Returns `None` at the first entry.
    pub fn back(&mut self) -> Option<&Route> {
        if self.entries.len() <= 1 {
            return None;
        }
        self.entries.pop();
        Some(self.current())
    }

    /// Number of entries, the current one included.
    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}
