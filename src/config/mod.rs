//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

pub use cli::{CliArgs, Command, DatabaseOverride, MigrateArgs, ServeArgs, ServeOverrides};

use std::{
    fmt,
    net::SocketAddr,
    num::{NonZeroU32, NonZeroUsize},
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::acquisition::AcquisitionOptions;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "pageinsight";
const ENV_PREFIX: &str = "PAGEINSIGHT";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_MEMORY_CAPACITY: u64 = 1024;
const DEFAULT_POST_LIMIT: u64 = 20;
const MAX_POST_LIMIT: u64 = 1000;
const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 20;
const DEFAULT_INSIGHTS_MODEL: &str = "gpt-4o-mini";
const DEFAULT_INSIGHTS_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_INSIGHTS_TEMPERATURE: f32 = 0.2;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub acquisition: AcquisitionSettings,
    pub insights: InsightsSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub default_ttl: Duration,
    pub memory_capacity: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct AcquisitionSettings {
    pub live_enabled: bool,
    pub session_cookie: Option<Secret>,
    pub post_limit: usize,
    pub timeout: Duration,
}

impl AcquisitionSettings {
    pub fn options(&self) -> AcquisitionOptions {
        AcquisitionOptions {
            live_enabled: self.live_enabled,
            session_cookie: self
                .session_cookie
                .as_ref()
                .map(|cookie| cookie.expose().to_string()),
            post_limit: self.post_limit,
            timeout: self.timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsightsSettings {
    pub api_key: Option<Secret>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

/// Credential whose value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(**redacted**)")
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Migrate(args)) => raw.apply_database_override(&args.database),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    cache: RawCacheSettings,
    acquisition: RawAcquisitionSettings,
    insights: RawInsightsSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        self.apply_database_override(&overrides.database);
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(url) = overrides.cache_redis_url.as_ref() {
            self.cache.redis_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.cache_default_ttl_seconds {
            self.cache.default_ttl_seconds = Some(seconds);
        }
        if let Some(enabled) = overrides.acquisition_live_enabled {
            self.acquisition.live_enabled = Some(enabled);
        }
        if let Some(limit) = overrides.acquisition_post_limit {
            self.acquisition.post_limit = Some(limit);
        }
        if let Some(model) = overrides.insights_model.as_ref() {
            self.insights.model = Some(model.clone());
        }
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            cache,
            acquisition,
            insights,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            cache: build_cache_settings(cache)?,
            acquisition: build_acquisition_settings(acquisition)?,
            insights: build_insights_settings(insights)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    let graceful_shutdown = positive_secs(graceful_secs, "server.graceful_shutdown_seconds")?;

    Ok(ServerSettings {
        addr,
        graceful_shutdown,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = non_blank(database.url);
    let max_connections = database
        .max_connections
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
    let max_connections = non_zero_u32(max_connections.into(), "database.max_connections")?;

    Ok(DatabaseSettings {
        url,
        max_connections,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let redis_url = non_blank(cache.redis_url);
    if let Some(url) = redis_url.as_deref() {
        let parsed = Url::parse(url)
            .map_err(|err| LoadError::invalid("cache.redis_url", format!("invalid URL: {err}")))?;
        if !matches!(parsed.scheme(), "redis" | "rediss") {
            return Err(LoadError::invalid(
                "cache.redis_url",
                "scheme must be redis or rediss",
            ));
        }
    }

    let ttl_secs = cache.default_ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS);
    let default_ttl = positive_secs(ttl_secs, "cache.default_ttl_seconds")?;

    let capacity = cache
        .memory_capacity
        .unwrap_or(DEFAULT_CACHE_MEMORY_CAPACITY);
    let memory_capacity = usize::try_from(capacity)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| LoadError::invalid("cache.memory_capacity", "must be greater than zero"))?;

    Ok(CacheSettings {
        redis_url,
        default_ttl,
        memory_capacity,
    })
}

fn build_acquisition_settings(
    acquisition: RawAcquisitionSettings,
) -> Result<AcquisitionSettings, LoadError> {
    let post_limit = acquisition.post_limit.unwrap_or(DEFAULT_POST_LIMIT);
    if post_limit > MAX_POST_LIMIT {
        return Err(LoadError::invalid(
            "acquisition.post_limit",
            format!("must not exceed {MAX_POST_LIMIT}"),
        ));
    }

    let timeout_secs = acquisition
        .timeout_seconds
        .unwrap_or(DEFAULT_SCRAPE_TIMEOUT_SECS);
    let timeout = positive_secs(timeout_secs, "acquisition.timeout_seconds")?;

    Ok(AcquisitionSettings {
        live_enabled: acquisition.live_enabled.unwrap_or(true),
        session_cookie: non_blank(acquisition.session_cookie).map(Secret),
        post_limit: post_limit as usize,
        timeout,
    })
}

fn build_insights_settings(insights: RawInsightsSettings) -> Result<InsightsSettings, LoadError> {
    let model =
        non_blank(insights.model).unwrap_or_else(|| DEFAULT_INSIGHTS_MODEL.to_string());

    let base_url =
        non_blank(insights.base_url).unwrap_or_else(|| DEFAULT_INSIGHTS_BASE_URL.to_string());
    let parsed = Url::parse(&base_url)
        .map_err(|err| LoadError::invalid("insights.base_url", format!("invalid URL: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "insights.base_url",
            "scheme must be http or https",
        ));
    }

    let temperature = insights
        .temperature
        .unwrap_or(DEFAULT_INSIGHTS_TEMPERATURE);
    if !(0.0..=2.0).contains(&temperature) {
        return Err(LoadError::invalid(
            "insights.temperature",
            "must be between 0.0 and 2.0",
        ));
    }

    Ok(InsightsSettings {
        api_key: non_blank(insights.api_key).map(Secret),
        model,
        base_url,
        temperature,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    redis_url: Option<String>,
    default_ttl_seconds: Option<u64>,
    memory_capacity: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAcquisitionSettings {
    live_enabled: Option<bool>,
    session_cookie: Option<String>,
    post_limit: Option<u64>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawInsightsSettings {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    temperature: Option<f32>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn positive_secs(value: u64, key: &'static str) -> Result<Duration, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    Ok(Duration::from_secs(value))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
