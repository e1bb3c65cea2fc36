use std::collections::HashMap;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable read by [`init_logging`] when no other name is given.
pub const DEFAULT_LOG_ENV: &str = "ARC_TELEPORT_LOG";

/// Per-scope log levels, e.g. `"warn,navmesh=debug,teleport=trace"`.
#[derive(Debug, Clone)]
pub struct LogConfig {
    global_level: Level,
    scope_levels: HashMap<String, Level>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            global_level: Level::WARN,
            scope_levels: HashMap::new(),
        }
    }

    pub fn from_env(env_var_name: &str) -> Self {
        let mut config = Self::new();

        if let Ok(log_config) = std::env::var(env_var_name) {
            config.parse_config_string(&log_config);
        }

        config
    }

    pub fn parse(config_str: &str) -> Self {
        let mut config = Self::new();
        config.parse_config_string(config_str);
        config
    }

    fn parse_config_string(&mut self, config_str: &str) {
        for part in config_str.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            match part.split_once('=') {
                Some((scope, level)) => {
                    if let Some(level) = parse_level(level.trim()) {
                        self.scope_levels.insert(scope.trim().to_string(), level);
                    }
                }
                None => {
                    if let Some(level) = parse_level(part) {
                        self.global_level = level;
                    }
                }
            }
        }
    }

    pub fn should_log(&self, scope: &str, level: Level) -> bool {
        let target_level = self.scope_levels.get(scope).unwrap_or(&self.global_level);
        level <= *target_level
    }

    pub fn global_level(&self) -> Level {
        self.global_level
    }

    pub fn set_global_level(&mut self, level: Level) {
        self.global_level = level;
    }

    pub fn set_scope_level(&mut self, scope: impl Into<String>, level: Level) {
        self.scope_levels.insert(scope.into(), level);
    }

    /// Most verbose level enabled for any scope.
    pub fn max_level(&self) -> Level {
        self.scope_levels
            .values()
            .copied()
            .fold(self.global_level, Level::max)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

/// Install the `tracing` subscriber and read scope levels from `env_var_name`.
///
/// Safe to call more than once; only the first call wins.
pub fn init_logging(env_var_name: &str) -> LogConfig {
    init_logging_with(LogConfig::from_env(env_var_name))
}

/// Install the `tracing` subscriber for an explicit scope configuration.
///
/// `RUST_LOG` still applies when set; otherwise the subscriber lets through
/// the most verbose level any scope asks for.
pub fn init_logging_with(config: LogConfig) -> LogConfig {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.max_level()).into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();

    super::set_log_config(config.clone());
    config
}
