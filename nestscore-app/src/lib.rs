//! 两个可执行文件共用的启动逻辑：配置加载与日志初始化。

use std::path::{Path, PathBuf};

use nestscore_config::{AppConfig, ConfigError};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// 配置加载失败时回退到内建默认值，并带回失败原因，待日志初始化后再报告。
pub fn load_configuration(override_path: Option<PathBuf>) -> (AppConfig, Option<ConfigError>) {
    let loaded = match override_path {
        Some(path) => AppConfig::from_file(&path),
        None => AppConfig::discover(),
    };
    match loaded {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    }
}

/// 日志写到 stderr，stdout 只输出报告。
pub fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}

/// `requested` 为命令行指定的配置路径，校验失败时错误本身不带路径。
pub fn report_config_fallback(err: &ConfigError, requested: Option<&Path>) {
    match (err, requested) {
        (ConfigError::Io { path, .. } | ConfigError::Parse { path, .. }, _) => {
            warn!(path = %path.display(), error = %err, "加载配置失败，使用内建默认值");
        }
        (_, Some(path)) => {
            warn!(path = %path.display(), error = %err, "加载配置失败，使用内建默认值");
        }
        (_, None) => {
            warn!(error = %err, "加载配置失败，使用内建默认值");
        }
    }
}

/// 加载配置并初始化日志；回退警告在订阅者就绪后输出。
pub fn bootstrap(override_path: Option<PathBuf>) -> AppConfig {
    let (config, failure) = load_configuration(override_path.clone());
    init_logging(&config);
    if let Some(err) = failure {
        report_config_fallback(&err, override_path.as_deref());
    }
    config
}
