use serde::{Deserialize, Serialize};

/// Cookie SameSite 策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub enum SameSitePolicy {
    Strict,
    #[default]
    Lax,
    None,
}

/// How the session cookie carries the caller's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// HS256-signed token; the id is trusted only after verification.
    #[default]
    Signed,
    /// Bare user id in the cookie. No tamper protection.
    Plain,
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Signed => write!(f, "signed"),
            Self::Plain => write!(f, "plain"),
        }
    }
}

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 优先级：ENV > config file > 默认值
/// ENV 前缀：TL，分隔符：__
/// 示例：TL__SERVER__PORT=9999
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Longest accepted session lifetime, one year.
pub const MAX_SESSION_AGE_HOURS: u64 = 24 * 366;

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// A missing file is fine; a file or environment that fails to deserialize
    /// falls back to defaults with a message on stderr, since logging is not up yet.
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("TL")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config.normalized()
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// Pulls out-of-range values back into range.
    pub fn normalized(mut self) -> Self {
        let hours = self.session.effective_max_age_hours();
        if hours != self.session.max_age_hours {
            eprintln!(
                "[WARN] session.max_age_hours = {} is out of range, using {}",
                self.session.max_age_hours, hours
            );
            self.session.max_age_hours = hours;
        }
        self
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
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
}

/// Snapshot file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_links_file")]
    pub links_file: String,
    /// Unset keeps accounts in memory only.
    #[serde(default)]
    pub users_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub mode: SessionMode,
    /// Signing secret for `signed` mode. Empty means a random per-process secret.
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_session_max_age_hours")]
    pub max_age_hours: u64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default)]
    pub cookie_secure: bool,
    #[serde(default)]
    pub same_site: SameSitePolicy,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Reject anything but well-formed http(s) targets.
    #[serde(default = "default_strict_urls")]
    pub strict_urls: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_links_file() -> String {
    "links.json".to_string()
}

fn default_session_max_age_hours() -> u64 {
    24
}

fn default_cookie_name() -> String {
    "tinylinker_session".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_strict_urls() -> bool {
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
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            links_file: default_links_file(),
            users_file: None,
        }
    }
}

impl SessionConfig {
    /// `max_age_hours` bounded to `1..=MAX_SESSION_AGE_HOURS`.
    pub fn effective_max_age_hours(&self) -> u64 {
        self.max_age_hours.clamp(1, MAX_SESSION_AGE_HOURS)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: SessionMode::default(),
            secret: String::new(),
            max_age_hours: default_session_max_age_hours(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            same_site: SameSitePolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            strict_urls: default_strict_urls(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.links_file, "links.json");
        assert!(config.storage.users_file.is_none());
        assert_eq!(config.session.mode, SessionMode::Signed);
        assert_eq!(config.session.cookie_name, "tinylinker_session");
        assert!(config.features.strict_urls);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: StaticConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [session]
            mode = "plain"
            same_site = "Strict"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.session.mode, SessionMode::Plain);
        assert_eq!(config.session.same_site, SameSitePolicy::Strict);
        assert_eq!(config.session.max_age_hours, 24);
    }

    #[test]
    fn test_session_max_age_is_bounded() {
        let mut config = StaticConfig::default();
        config.session.max_age_hours = 1 << 40;
        assert_eq!(config.session.effective_max_age_hours(), MAX_SESSION_AGE_HOURS);
        let config = config.normalized();
        assert_eq!(config.session.max_age_hours, MAX_SESSION_AGE_HOURS);

        let mut config = StaticConfig::default();
        config.session.max_age_hours = 0;
        assert_eq!(config.normalized().session.max_age_hours, 1);

        let config = StaticConfig::default().normalized();
        assert_eq!(config.session.max_age_hours, 24);
    }

    #[test]
    fn test_sample_config_roundtrips() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[server]"));
        assert!(sample.contains("links_file"));
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.session.cookie_name, "tinylinker_session");
    }
}
