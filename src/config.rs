use std::{env, path::PathBuf};

/// Production endpoint used when `CATALOGO_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://catalogo-marcela-backend.onrender.com/api";

/// AppConfig
///
/// Holds the console's configuration. It is loaded once at startup and then passed by value
/// (it is cheap to clone) into the API client and the token store. Nothing reads the
/// environment after `load()` returns.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Base URL of the REST backend, including the `/api` prefix.
    pub api_url: String,
    // Location of the durable token slot.
    pub token_file: PathBuf,
    // Runtime environment marker. Selects the log format.
    pub env: Env,
}

/// Env
///
/// Runtime context. `Local` logs in a human-readable format, `Production` emits JSON lines.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Safe values for tests: points at a local backend and keeps the token file in the
    /// working directory.
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_string(),
            token_file: PathBuf::from("catalogo-session.json"),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (a `.env` file is expected to have
    /// been loaded by the caller).
    ///
    /// * `APP_ENV` - `production` or anything else for local.
    /// * `CATALOGO_API_URL` - backend base URL, defaults to [`DEFAULT_API_URL`].
    /// * `CATALOGO_TOKEN_FILE` - token file path, defaults to
    ///   `<config dir>/catalogo/session.json`.
    ///
    /// The base URL is validated later, when the API client is built.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_url = env::var("CATALOGO_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let token_file = env::var("CATALOGO_TOKEN_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_token_file);

        Self {
            api_url,
            token_file,
            env,
        }
    }

    /// Replaces the backend URL, used by the `--api-url` flag.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// default_token_file
///
/// The per-user config directory when the platform has one, the working directory otherwise.
fn default_token_file() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("catalogo").join("session.json"))
        .unwrap_or_else(|| PathBuf::from("catalogo-session.json"))
}
