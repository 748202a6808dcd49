use serde::{Deserialize, Serialize};

use crate::errors::{Result, SnaplinkError};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: listen address, worker count, latency budget, trusted proxies
/// - database: origin store backend and retry policy
/// - cache: resolution cache sizing
/// - codegen: short code generation bounds
/// - rate_limit: admission control per route
/// - logging: tracing output
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub codegen: CodegenConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config file > 默认值
    /// ENV 前缀：SNAPLINK，分隔符：__
    /// 示例：SNAPLINK__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("SNAPLINK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: StaticConfig = settings.try_deserialize()?;
        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the services cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.cache.capacity == 0 {
            return Err(SnaplinkError::config("cache.capacity must be at least 1"));
        }
        if self.cache.shards == 0 {
            return Err(SnaplinkError::config("cache.shards must be at least 1"));
        }
        if self.codegen.min_length < 6 || self.codegen.max_length > 8 {
            return Err(SnaplinkError::config(
                "codegen lengths must stay within 6..=8",
            ));
        }
        if self.codegen.min_length > self.codegen.max_length {
            return Err(SnaplinkError::config(
                "codegen.min_length must not exceed codegen.max_length",
            ));
        }
        if self.codegen.max_attempts == 0 {
            return Err(SnaplinkError::config(
                "codegen.max_attempts must be at least 1",
            ));
        }

        for (name, limit) in self.rate_limit.limits() {
            if limit.limit == 0 || limit.window_ms == 0 {
                return Err(SnaplinkError::config(format!(
                    "rate_limit.{}: limit and window_ms must both be positive",
                    name
                )));
            }
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SnaplinkError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// Requests slower than this are logged at warn level.
    #[serde(default = "default_slow_request_ms")]
    pub slow_request_ms: u64,
    /// Peers (IP or CIDR) whose X-Forwarded-For header is trusted.
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

/// Origin store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `memory` keeps records in process; otherwise a sqlite/postgres/mysql URL.
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 缓存系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Hard upper bound on cached entries across all shards.
    #[serde(default = "default_cache_capacity", alias = "cacheCapacity")]
    pub capacity: usize,
    #[serde(default = "default_cache_shards")]
    pub shards: usize,
    #[serde(default = "default_negative_ttl_secs")]
    pub negative_ttl_secs: u64,
    #[serde(default = "default_negative_capacity")]
    pub negative_capacity: u64,
    #[serde(default = "default_warm_on_startup")]
    pub warm_on_startup: bool,
}

/// Short code generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    #[serde(default = "default_code_min_length")]
    pub min_length: usize,
    #[serde(default = "default_code_max_length")]
    pub max_length: usize,
    #[serde(default = "default_code_max_attempts")]
    pub max_attempts: u32,
}

/// Window algorithm used by a limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowStrategy {
    #[default]
    FixedWindow,
    SlidingLog,
}

/// One limiter: at most `limit` requests per `window_ms` per key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    pub limit: u32,
    #[serde(alias = "windowMs")]
    pub window_ms: u64,
    #[serde(default)]
    pub strategy: WindowStrategy,
}

impl LimitConfig {
    pub fn new(limit: u32, window_ms: u64) -> Self {
        Self {
            limit,
            window_ms,
            strategy: WindowStrategy::FixedWindow,
        }
    }

    pub fn with_strategy(mut self, strategy: WindowStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Limiters composed for one endpoint. Absent limiters are not checked.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RoutePolicyConfig {
    #[serde(default)]
    pub per_client: Option<LimitConfig>,
    #[serde(default)]
    pub per_code: Option<LimitConfig>,
    #[serde(default)]
    pub global: Option<LimitConfig>,
}

/// 限流配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    #[serde(default = "default_janitor_interval_ms")]
    pub janitor_interval_ms: u64,
    #[serde(default = "default_redirect_policy")]
    pub redirect: RoutePolicyConfig,
    #[serde(default = "default_create_policy")]
    pub create: RoutePolicyConfig,
}

impl RateLimitConfig {
    /// All configured limiters, labelled `route.scope`.
    pub fn limits(&self) -> Vec<(String, &LimitConfig)> {
        let mut out = Vec::new();
        for (route, policy) in [("redirect", &self.redirect), ("create", &self.create)] {
            for (scope, limit) in [
                ("per_client", &policy.per_client),
                ("per_code", &policy.per_code),
                ("global", &policy.global),
            ] {
                if let Some(limit) = limit {
                    out.push((format!("{}.{}", route, scope), limit));
                }
            }
        }
        out
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8081
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_slow_request_ms() -> u64 {
    50
}

fn default_database_url() -> String {
    "memory".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_cache_capacity() -> usize {
    10_000
}

fn default_cache_shards() -> usize {
    16
}

fn default_negative_ttl_secs() -> u64 {
    30
}

fn default_negative_capacity() -> u64 {
    10_000
}

fn default_warm_on_startup() -> bool {
    true
}

fn default_code_min_length() -> usize {
    6
}

fn default_code_max_length() -> usize {
    8
}

fn default_code_max_attempts() -> u32 {
    10
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_idle_timeout_ms() -> u64 {
    120_000
}

fn default_janitor_interval_ms() -> u64 {
    30_000
}

fn default_redirect_policy() -> RoutePolicyConfig {
    RoutePolicyConfig {
        per_client: Some(LimitConfig::new(100, 60_000)),
        per_code: Some(LimitConfig::new(10_000, 60_000)),
        global: None,
    }
}

fn default_create_policy() -> RoutePolicyConfig {
    RoutePolicyConfig {
        per_client: Some(LimitConfig::new(100, 60_000)),
        per_code: None,
        global: None,
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            slow_request_ms: default_slow_request_ms(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            shards: default_cache_shards(),
            negative_ttl_secs: default_negative_ttl_secs(),
            negative_capacity: default_negative_capacity(),
            warm_on_startup: default_warm_on_startup(),
        }
    }
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            min_length: default_code_min_length(),
            max_length: default_code_max_length(),
            max_attempts: default_code_max_attempts(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            idle_timeout_ms: default_idle_timeout_ms(),
            janitor_interval_ms: default_janitor_interval_ms(),
            redirect: default_redirect_policy(),
            create: default_create_policy(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
