use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

pub const DEFAULT_CACHE_REFRESH_HOURS: u64 = 24;
pub const DEFAULT_LOCALE: &str = "en-US";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub samples: SamplesConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

/// Where the sample query documents and the policy document live, and how long
/// a loaded locale stays cached.
#[derive(Debug, Clone, Deserialize)]
pub struct SamplesConfig {
    #[serde(default = "default_container")]
    pub container: String,
    #[serde(default = "default_blob")]
    pub blob: String,
    #[serde(default = "default_policies_path")]
    pub policies_path: String,
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Kept untyped so that an unparsable entry falls back instead of failing the load.
    #[serde(default)]
    pub cache_refresh_hours: Option<toml::Value>,
    #[serde(default = "default_cache_max_locales")]
    pub cache_max_locales: u64,
}

impl Default for SamplesConfig {
    fn default() -> Self {
        Self {
            container: default_container(),
            blob: default_blob(),
            policies_path: default_policies_path(),
            default_locale: default_locale(),
            cache_refresh_hours: None,
            cache_max_locales: default_cache_max_locales(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
}

fn default_data_dir() -> String { "data".into() }
fn default_container() -> String { "sample-queries".into() }
fn default_blob() -> String { "sample-queries.json".into() }
fn default_policies_path() -> String { "policies/sample-queries-policies.json".into() }
fn default_locale() -> String { DEFAULT_LOCALE.into() }
fn default_cache_max_locales() -> u64 { 64 }

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

/// Like [`load_from_file`], but a missing file yields the defaults. Read and
/// parse failures are still returned.
pub fn load_from_file_or_default(path: &str) -> Result<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => load_from_str(&content).map_err(|e| anyhow!("invalid config {path}: {e}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(anyhow!("cannot read config {path}: {e}")),
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

/// Parse a refresh interval given in hours. Missing, non-numeric and zero values
/// all resolve to [`DEFAULT_CACHE_REFRESH_HOURS`].
pub fn parse_refresh_hours(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|h| *h > 0)
        .unwrap_or(DEFAULT_CACHE_REFRESH_HOURS)
}

impl AppConfig {
    /// Load `config.toml` when present, otherwise start from defaults; then apply
    /// environment fallbacks and validate. A config file that exists but does
    /// not parse is an error.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_from_file_or_default(&config_path())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.normalize()?;
        self.auth.normalize_from_env();
        self.samples.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            if !host.trim().is_empty() { self.host = host; }
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if self.worker_threads.is_none() {
            self.worker_threads = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok());
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
    }
}

impl SamplesConfig {
    /// Effective refresh interval. The config file wins over
    /// `FILE_CACHE_REFRESH_TIME_IN_HOURS`; either may be invalid, in which case
    /// the default applies.
    pub fn refresh_hours(&self) -> u64 {
        let from_file = self.cache_refresh_hours.as_ref().map(|v| match v {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        let raw = from_file.or_else(|| std::env::var("FILE_CACHE_REFRESH_TIME_IN_HOURS").ok());
        parse_refresh_hours(raw.as_deref())
    }

    pub fn validate(&self) -> Result<()> {
        if self.container.trim().is_empty() || self.blob.trim().is_empty() {
            return Err(anyhow!("samples.container and samples.blob must not be empty"));
        }
        if self.policies_path.trim().is_empty() {
            return Err(anyhow!("samples.policies_path must not be empty"));
        }
        if self.default_locale.trim().is_empty() {
            return Err(anyhow!("samples.default_locale must not be empty"));
        }
        if self.cache_max_locales == 0 {
            return Err(anyhow!("samples.cache_max_locales must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_hours_fall_back_on_bad_input() {
        assert_eq!(parse_refresh_hours(None), DEFAULT_CACHE_REFRESH_HOURS);
        assert_eq!(parse_refresh_hours(Some("abc")), DEFAULT_CACHE_REFRESH_HOURS);
        assert_eq!(parse_refresh_hours(Some("0")), DEFAULT_CACHE_REFRESH_HOURS);
        assert_eq!(parse_refresh_hours(Some("-3")), DEFAULT_CACHE_REFRESH_HOURS);
        assert_eq!(parse_refresh_hours(Some(" 6 ")), 6);
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let cfg = load_from_str("[server]\nhost = \"0.0.0.0\"\nport = 9000\n").unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.samples.container, "sample-queries");
        assert_eq!(cfg.samples.default_locale, "en-US");
        assert_eq!(cfg.logging.format, LogFormat::Compact);
        assert_eq!(cfg.storage.data_dir, "data");
    }

    #[test]
    fn refresh_hours_accepts_integer_and_string_forms() {
        let cfg = load_from_str("[samples]\ncache_refresh_hours = 2\n").unwrap();
        assert_eq!(cfg.samples.refresh_hours(), 2);
        let cfg = load_from_str("[samples]\ncache_refresh_hours = \"12\"\n").unwrap();
        assert_eq!(cfg.samples.refresh_hours(), 12);
        let cfg = load_from_str("[samples]\ncache_refresh_hours = \"soon\"\n").unwrap();
        assert_eq!(cfg.samples.refresh_hours(), DEFAULT_CACHE_REFRESH_HOURS);
    }

    #[test]
    fn validate_rejects_empty_locations() {
        let mut cfg = AppConfig::default();
        cfg.samples.policies_path = " ".into();
        assert!(cfg.samples.validate().is_err());
        let mut cfg = AppConfig::default();
        cfg.samples.cache_max_locales = 0;
        assert!(cfg.samples.validate().is_err());
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("samples_cfg_{}.toml", std::process::id()));
        std::fs::write(&path, "[server]\nport = \"not-a-port\"\n[auth]\njwt_secret = \"prod-secret\"\n").unwrap();
        let res = load_from_file_or_default(path.to_str().unwrap());
        let _ = std::fs::remove_file(&path);
        assert!(res.is_err());
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let cfg = load_from_file_or_default("/nonexistent/samples-config.toml").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.auth.jwt_secret.is_empty());
    }

    #[test]
    fn json_log_format_parses() {
        let cfg = load_from_str("[logging]\nformat = \"json\"\n").unwrap();
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }
}
