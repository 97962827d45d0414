//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::storage::range::A1Range;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Listing endpoint and extraction settings
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP client settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Record and error table settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Notification mail settings
    #[serde(default)]
    pub mail: MailConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.endpoint_url.trim().is_empty() {
            return Err(AppError::validation("source.endpoint_url is empty"));
        }
        url::Url::parse(&self.source.listing_url()).map_err(|e| {
            AppError::validation(format!("source listing URL is not a valid URL: {e}"))
        })?;
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.store.backend == StoreBackend::GoogleSheets && self.store.store_id.trim().is_empty()
        {
            return Err(AppError::validation(
                "store.store_id is required for the google_sheets backend",
            ));
        }
        for (name, range) in [
            ("store.data_range_name", &self.store.data_range_name),
            ("store.title_range_name", &self.store.title_range_name),
            ("store.error_range_name", &self.store.error_range_name),
        ] {
            if range.trim().is_empty() {
                return Err(AppError::validation(format!("{name} is empty")));
            }
            A1Range::parse(range)
                .map_err(|e| AppError::validation(format!("{name} '{range}': {e}")))?;
        }
        self.mail.sender_mailbox()?;
        self.mail.recipient_mailbox()?;
        if self.mail.smtp_host.trim().is_empty() {
            return Err(AppError::validation("mail.smtp_host is empty"));
        }
        if self.mail.timeout_secs == 0 {
            return Err(AppError::validation("mail.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// How row links are joined onto the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UrlJoin {
    /// `{endpoint}/{href}` string concatenation, `null` when the row has no link
    #[default]
    Naive,
    /// Proper URL resolution against the endpoint
    Resolve,
}

/// Listing endpoint and extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base endpoint; also the prefix for row links
    #[serde(default = "defaults::endpoint_url")]
    pub endpoint_url: String,

    /// Page and query appended verbatim to the endpoint
    #[serde(default = "defaults::query_params")]
    pub query_params: String,

    /// Row link joining mode
    #[serde(default)]
    pub url_join: UrlJoin,

    /// CSS selectors for the listing table
    #[serde(default)]
    pub selectors: ListingSelectors,
}

impl SourceConfig {
    /// Full URL of the listing request.
    pub fn listing_url(&self) -> String {
        format!("{}{}", self.endpoint_url, self.query_params)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint_url: defaults::endpoint_url(),
            query_params: defaults::query_params(),
            url_join: UrlJoin::default(),
            selectors: ListingSelectors::default(),
        }
    }
}

/// CSS selectors for the listing table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// The results table
    #[serde(default = "defaults::table_selector")]
    pub table: String,

    /// Body rows inside the table
    #[serde(default = "defaults::row_selector")]
    pub row: String,

    /// Cells inside a row
    #[serde(default = "defaults::cell_selector")]
    pub cell: String,

    /// Status icon inside a row
    #[serde(default = "defaults::status_selector")]
    pub status: String,

    /// Detail link inside a row
    #[serde(default = "defaults::link_selector")]
    pub link: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            table: defaults::table_selector(),
            row: defaults::row_selector(),
            cell: defaults::cell_selector(),
            status: defaults::status_selector(),
            link: defaults::link_selector(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Spreadsheet backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    GoogleSheets,
    Local,
}

/// Record and error table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which backend holds the tables
    #[serde(default)]
    pub backend: StoreBackend,

    /// Spreadsheet identifier
    #[serde(default)]
    pub store_id: String,

    /// Range that record rows are appended to
    #[serde(default = "defaults::data_range")]
    pub data_range_name: String,

    /// Column range holding already recorded titles
    #[serde(default = "defaults::title_range")]
    pub title_range_name: String,

    /// Range that error rows are appended to
    #[serde(default = "defaults::error_range")]
    pub error_range_name: String,

    /// Sheets API root
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Directory for the local backend
    #[serde(default = "defaults::local_dir")]
    pub local_dir: PathBuf,

    /// Environment variable holding the API bearer token
    #[serde(default = "defaults::token_env")]
    pub token_env: String,

    /// File holding the API bearer token, used when the variable is unset
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            store_id: String::new(),
            data_range_name: defaults::data_range(),
            title_range_name: defaults::title_range(),
            error_range_name: defaults::error_range(),
            api_base: defaults::api_base(),
            local_dir: defaults::local_dir(),
            token_env: defaults::token_env(),
            token_file: None,
        }
    }
}

/// Notification mail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// From address
    #[serde(default)]
    pub sender: String,

    /// To address
    #[serde(default)]
    pub recipient: String,

    #[serde(default = "defaults::smtp_host")]
    pub smtp_host: String,

    #[serde(default = "defaults::smtp_port")]
    pub smtp_port: u16,

    /// SMTP command timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Environment variable holding the SMTP user name
    #[serde(default = "defaults::username_env")]
    pub username_env: String,

    /// Environment variable holding the SMTP password
    #[serde(default = "defaults::password_env")]
    pub password_env: String,

    /// Text placed before the count in the subject line
    #[serde(default = "defaults::subject_prefix")]
    pub subject_prefix: String,
}

impl MailConfig {
    /// Parsed sender mailbox.
    pub fn sender_mailbox(&self) -> Result<Mailbox> {
        parse_mailbox("mail.sender", &self.sender)
    }

    /// Parsed recipient mailbox.
    pub fn recipient_mailbox(&self) -> Result<Mailbox> {
        parse_mailbox("mail.recipient", &self.recipient)
    }
}

fn parse_mailbox(field: &str, value: &str) -> Result<Mailbox> {
    value
        .parse()
        .map_err(|e| AppError::validation(format!("{field} '{value}' is not a mailbox: {e}")))
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: String::new(),
            recipient: String::new(),
            smtp_host: defaults::smtp_host(),
            smtp_port: defaults::smtp_port(),
            timeout_secs: defaults::timeout(),
            username_env: defaults::username_env(),
            password_env: defaults::password_env(),
            subject_prefix: defaults::subject_prefix(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn endpoint_url() -> String {
        "https://www.gokams.or.kr/02_apply/".into()
    }
    pub fn query_params() -> String {
        "introduction.aspx?division=&txtKeyword=&ddlKeyfield=45&page=1".into()
    }
    pub fn table_selector() -> String {
        ".boardList".into()
    }
    pub fn row_selector() -> String {
        "tbody tr".into()
    }
    pub fn cell_selector() -> String {
        "td".into()
    }
    pub fn status_selector() -> String {
        "img".into()
    }
    pub fn link_selector() -> String {
        "a".into()
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; kams-watch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Store defaults
    pub fn data_range() -> String {
        "Posts!A1".into()
    }
    pub fn title_range() -> String {
        "Posts!D2:D".into()
    }
    pub fn error_range() -> String {
        "Errors!A1".into()
    }
    pub fn api_base() -> String {
        "https://sheets.googleapis.com".into()
    }
    pub fn local_dir() -> PathBuf {
        PathBuf::from("data/sheets")
    }
    pub fn token_env() -> String {
        "KAMS_SHEETS_TOKEN".into()
    }

    // Mail defaults
    pub fn smtp_host() -> String {
        "smtp.gmail.com".into()
    }
    pub fn smtp_port() -> u16 {
        465
    }
    pub fn username_env() -> String {
        "KAMS_SMTP_USERNAME".into()
    }
    pub fn password_env() -> String {
        "KAMS_SMTP_PASSWORD".into()
    }
    pub fn subject_prefix() -> String {
        "[KAMS]".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.store.store_id = "sheet-123".to_string();
        config.mail.sender = "Watcher <watcher@example.com>".to_string();
        config.mail.recipient = "team@example.com".to_string();
        config
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.source.endpoint_url, "https://www.gokams.or.kr/02_apply/");
        assert_eq!(config.source.url_join, UrlJoin::Naive);
        assert_eq!(config.store.backend, StoreBackend::GoogleSheets);
        assert_eq!(config.store.title_range_name, "Posts!D2:D");
    }

    #[test]
    fn listing_url_concatenates() {
        let config = Config::default();
        assert_eq!(
            config.source.listing_url(),
            "https://www.gokams.or.kr/02_apply/introduction.aspx?division=&txtKeyword=&ddlKeyfield=45&page=1"
        );
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_store_id() {
        let mut config = valid_config();
        config.store.store_id.clear();
        assert!(config.validate().is_err());

        config.store.backend = StoreBackend::Local;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_recipient() {
        let mut config = valid_config();
        config.mail.recipient = "not an address".to_string();
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn validate_rejects_overlong_range_column() {
        let mut config = valid_config();
        config.store.error_range_name = "Errors!ZZZZZZZZZZZZZZZZ1".to_string();
        match config.validate() {
            Err(AppError::Validation(m)) => assert!(m.contains("store.error_range_name")),
            other => panic!("expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn parses_sections_from_toml() {
        let raw = r#"
            [source]
            url_join = "resolve"

            [store]
            backend = "local"
            local_dir = "/tmp/kams"

            [mail]
            sender = "a@example.com"
            recipient = "b@example.com"
            smtp_port = 587
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.source.url_join, UrlJoin::Resolve);
        assert_eq!(config.store.backend, StoreBackend::Local);
        assert_eq!(config.store.local_dir, PathBuf::from("/tmp/kams"));
        assert_eq!(config.mail.smtp_port, 587);
        assert_eq!(config.mail.smtp_host, "smtp.gmail.com");
    }
}
