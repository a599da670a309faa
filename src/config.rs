//! Service configuration parsed from environment variables.
//!
//! Secrets (OAuth client id/secret, API key) are required. Everything that
//! identifies the spreadsheet or shapes navigation has a default matching the
//! production recipe sheet, so a bare `.env` with the four secrets is enough.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SPREADSHEET_ID: &str = "11C_U7Xm2X43oT30uS2T4-T8HcrNLvfW-mYZKuhqEzNg";
pub const DEFAULT_SHEET_NAME: &str = "recipeServerSpreadsheet";
pub const DEFAULT_SHEET_COLUMNS: &str = "A2:E";
pub const DEFAULT_OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DEFAULT_DISCOVERY_URL: &str = "https://sheets.googleapis.com/$discovery/rest?version=v4";
pub const DEFAULT_RECIPES_BASE_PATH: &str = "/recipes";
pub const DEFAULT_ACCESS_DENIED_MESSAGE: &str =
    "You do not have access to the spreadsheet. Ask the sheet owner for access";
pub const DEFAULT_HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// OAuth client settings for Google Identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_key: String,
    pub redirect_uri: String,
    pub scope: String,
    pub discovery_url: String,
}

/// Which spreadsheet cells hold the recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub columns: String,
}

impl SheetConfig {
    /// A1-style range passed to `values.get`, e.g. `recipeServerSpreadsheet!A2:E`.
    #[must_use]
    pub fn range(&self) -> String {
        format!("{}!{}", self.sheet_name, self.columns)
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: DEFAULT_SPREADSHEET_ID.to_owned(),
            sheet_name: DEFAULT_SHEET_NAME.to_owned(),
            columns: DEFAULT_SHEET_COLUMNS.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_HTTP_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub google: GoogleConfig,
    pub sheet: SheetConfig,
    pub recipes_base_path: String,
    pub access_denied_message: String,
    pub timeouts: HttpTimeouts,
    pub cookie_secure: bool,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `GOOGLE_API_KEY`, `GOOGLE_REDIRECT_URI`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `SHEET_SPREADSHEET_ID`, `SHEET_NAME`, `SHEET_COLUMNS`: the recipe sheet
    /// - `OAUTH_SCOPE`: spreadsheets read/write
    /// - `SHEETS_DISCOVERY_URL`: Sheets v4 discovery document
    /// - `RECIPES_BASE_PATH`: default `/recipes`
    /// - `ACCESS_DENIED_MESSAGE`: alert text shown when the fetch fails
    /// - `HTTP_REQUEST_TIMEOUT_SECS` / `HTTP_CONNECT_TIMEOUT_SECS`: default 30 / 10
    /// - `COOKIE_SECURE`: defaults to true when the redirect URI is https
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required var is missing or a value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let google = GoogleConfig {
            client_id: required("GOOGLE_CLIENT_ID")?,
            client_secret: required("GOOGLE_CLIENT_SECRET")?,
            api_key: required("GOOGLE_API_KEY")?,
            redirect_uri: required("GOOGLE_REDIRECT_URI")?,
            scope: optional("OAUTH_SCOPE", DEFAULT_OAUTH_SCOPE),
            discovery_url: optional("SHEETS_DISCOVERY_URL", DEFAULT_DISCOVERY_URL),
        };

        let sheet = SheetConfig {
            spreadsheet_id: optional("SHEET_SPREADSHEET_ID", DEFAULT_SPREADSHEET_ID),
            sheet_name: optional("SHEET_NAME", DEFAULT_SHEET_NAME),
            columns: optional("SHEET_COLUMNS", DEFAULT_SHEET_COLUMNS),
        };

        let recipes_base_path = optional("RECIPES_BASE_PATH", DEFAULT_RECIPES_BASE_PATH)
            .trim_end_matches('/')
            .to_owned();
        if !recipes_base_path.starts_with('/') {
            return Err(ConfigError::Invalid { var: "RECIPES_BASE_PATH", value: recipes_base_path });
        }

        let timeouts = HttpTimeouts {
            request_secs: parse_u64("HTTP_REQUEST_TIMEOUT_SECS", DEFAULT_HTTP_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_u64("HTTP_CONNECT_TIMEOUT_SECS", DEFAULT_HTTP_CONNECT_TIMEOUT_SECS)?,
        };

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw })?,
            Err(_) => DEFAULT_PORT,
        };

        let cookie_secure = env_bool("COOKIE_SECURE").unwrap_or_else(|| google.redirect_uri.starts_with("https://"));

        Ok(Self {
            port,
            google,
            sheet,
            recipes_base_path,
            access_denied_message: optional("ACCESS_DENIED_MESSAGE", DEFAULT_ACCESS_DENIED_MESSAGE),
            timeouts,
            cookie_secure,
        })
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        _ => Err(ConfigError::Missing(var)),
    }
}

fn optional(var: &str, default: &str) -> String {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

fn parse_u64(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
        Err(_) => Ok(default),
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
