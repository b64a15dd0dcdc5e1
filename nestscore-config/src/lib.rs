use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

impl AppConfig {
    /// 从显式路径加载配置，并校验分析阈值。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// 自动发现配置文件：优先读取环境变量 `NESTSCORE_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("NESTSCORE_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 形状分析阈值。默认值对应毫米单位与 12mm 板厚。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 端点量化保留的小数位数。
    pub quantize_decimals: u32,
    /// bulge 绝对值超过该值才视为弧段。
    pub curvature_epsilon: f64,
    pub sheet_min_width: f64,
    pub sheet_min_height: f64,
    pub material_thickness: f64,
    /// 槽分类时宽或高与板厚的允许偏差（严格小于）。
    pub slot_classify_tolerance: f64,
    pub slot_max_area: f64,
    /// 槽宽一致性检查的允许偏差（严格小于）。
    pub slot_consistency_tolerance: f64,
    pub part_min_area: f64,
    pub part_min_side: f64,
    pub backplane_min_area: f64,
    pub organic_min_points: usize,
    pub tab_min_points: usize,
    pub tab_reference_cap: usize,
    pub size_bucket: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            quantize_decimals: 2,
            curvature_epsilon: 0.001,
            sheet_min_width: 1000.0,
            sheet_min_height: 2000.0,
            material_thickness: 12.0,
            slot_classify_tolerance: 5.0,
            slot_max_area: 10_000.0,
            slot_consistency_tolerance: 3.0,
            part_min_area: 100.0,
            part_min_side: 20.0,
            backplane_min_area: 500_000.0,
            organic_min_points: 50,
            tab_min_points: 8,
            tab_reference_cap: 10,
            size_bucket: 100.0,
        }
    }
}

impl AnalysisConfig {
    /// 拒绝会导致量化溢出或除零的取值。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quantize_decimals > 9 {
            return Err(ConfigError::Invalid(format!(
                "analysis.quantize_decimals 不能超过 9（实际为 {}）",
                self.quantize_decimals
            )));
        }
        if !(self.size_bucket > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "analysis.size_bucket 必须为正数（实际为 {}）",
                self.size_bucket
            )));
        }
        let non_negative = [
            ("curvature_epsilon", self.curvature_epsilon),
            ("material_thickness", self.material_thickness),
            ("slot_classify_tolerance", self.slot_classify_tolerance),
            ("slot_consistency_tolerance", self.slot_consistency_tolerance),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "analysis.{name} 不能为负数或 NaN（实际为 {value}）"
                )));
            }
        }
        Ok(())
    }
}

/// `nestscore-ops` 使用的工作流默认值。
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "WorkflowConfig::default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "WorkflowConfig::default_output_prefix")]
    pub output_prefix: String,
    #[serde(default = "WorkflowConfig::default_reference")]
    pub reference: PathBuf,
    #[serde(default = "WorkflowConfig::default_test_command")]
    pub test_command: String,
    #[serde(default = "WorkflowConfig::default_pass_threshold")]
    pub pass_threshold: f64,
}

impl WorkflowConfig {
    fn default_output_dir() -> PathBuf {
        PathBuf::from("test-output")
    }

    fn default_output_prefix() -> String {
        "accuracy-".to_string()
    }

    fn default_reference() -> PathBuf {
        PathBuf::from("examples/CNC_FILE_105_12MM.dxf")
    }

    fn default_test_command() -> String {
        "npx playwright test tests/dxf-accuracy.spec.ts -g score --project=chromium --reporter=list"
            .to_string()
    }

    fn default_pass_threshold() -> f64 {
        80.0
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            output_dir: Self::default_output_dir(),
            output_prefix: Self::default_output_prefix(),
            reference: Self::default_reference(),
            test_command: Self::default_test_command(),
            pass_threshold: Self::default_pass_threshold(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("配置取值无效: {0}")]
    Invalid(String),
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_returned_when_file_missing() {
        let cfg = AppConfig::discover().expect("discover should succeed");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.analysis, AnalysisConfig::default());
        assert_eq!(cfg.analysis.quantize_decimals, 2);
        assert_eq!(cfg.workflow.output_prefix, "accuracy-");
        assert!((cfg.workflow.pass_threshold - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn load_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(
            file,
            r#"
            [logging]
            level = "debug"

            [analysis]
            material_thickness = 18.0
            slot_classify_tolerance = 4.0

            [workflow]
            output_dir = "out"
            reference = "refs/panel.dxf"
            pass_threshold = 90.0
            "#
        )
        .unwrap();

        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.logging.level, "debug");
        assert!((cfg.analysis.material_thickness - 18.0).abs() < f64::EPSILON);
        assert!((cfg.analysis.slot_classify_tolerance - 4.0).abs() < f64::EPSILON);
        // 未出现的字段保持默认
        assert!((cfg.analysis.slot_consistency_tolerance - 3.0).abs() < f64::EPSILON);
        assert_eq!(cfg.analysis.tab_reference_cap, 10);
        assert_eq!(cfg.workflow.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.workflow.reference, PathBuf::from("refs/panel.dxf"));
        assert_eq!(cfg.workflow.output_prefix, "accuracy-");
        assert!((cfg.workflow.pass_threshold - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[analysis]\nquantize_decimals = 12").unwrap();
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err:?}");

        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[analysis]\nsize_bucket = 0.0").unwrap();
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err:?}");
    }

    #[test]
    fn malformed_toml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[analysis\nlevel = ").unwrap();
        match AppConfig::from_file(file.path()) {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
