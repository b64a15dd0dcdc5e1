use std::path::Path;

use nestscore_config::AnalysisConfig;
use nestscore_core::document::Document;
use nestscore_engine::{ComparisonMetrics, compare_documents};
use nestscore_io::{DocumentLoader, DxfFacade, IoError};
use serde::Serialize;
use tracing::info;

use crate::errors::FrontendError;

/// 一次比对的完整输出：两份输入路径加上展开的指标字段。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub generated_path: String,
    pub reference_path: String,
    #[serde(flatten)]
    pub metrics: ComparisonMetrics,
}

/// 读取一张图纸；路径不存在与解析失败分别映射为不同错误。
pub fn load_drawing(path: &Path) -> Result<Document, FrontendError> {
    load_drawing_with(&DxfFacade::new(), path)
}

pub fn load_drawing_with<L: DocumentLoader>(
    loader: &L,
    path: &Path,
) -> Result<Document, FrontendError> {
    match loader.load(path) {
        Ok(document) => {
            info!(
                path = %path.display(),
                entities = document.entity_count(),
                "图纸加载成功"
            );
            Ok(document)
        }
        Err(IoError::NotFound { path }) => Err(FrontendError::InputNotFound { path }),
        Err(source) => Err(FrontendError::Parse {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// 加载两张图纸并比对。任一文件失败即返回错误，不产生部分结果。
pub fn compare_files(
    generated: &Path,
    reference: &Path,
    config: &AnalysisConfig,
) -> Result<ComparisonReport, FrontendError> {
    let generated_doc = load_drawing(generated)?;
    let reference_doc = load_drawing(reference)?;
    let metrics = compare_documents(&generated_doc, &reference_doc, config);
    Ok(ComparisonReport {
        generated_path: generated.display().to_string(),
        reference_path: reference.display().to_string(),
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SQUARE: &str = "0\nSECTION\n2\nENTITIES\n0\nLWPOLYLINE\n8\nPARTS\n90\n4\n70\n1\n10\n0\n20\n0\n10\n50\n20\n0\n10\n50\n20\n50\n10\n0\n20\n50\n0\nENDSEC\n0\nEOF\n";

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write dxf");
        file
    }

    #[test]
    fn report_flattens_metrics_next_to_paths() {
        let file = write_temp(SQUARE);
        let report =
            compare_files(file.path(), file.path(), &AnalysisConfig::default()).expect("compare");
        assert_eq!(report.metrics.ryb_count_generated, 1);

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["generated_path"], file.path().display().to_string());
        assert_eq!(json["ryb_count_match"], true);
        assert!(json.get("metrics").is_none());
    }

    #[test]
    fn missing_generated_file_is_input_not_found() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let reference = write_temp(SQUARE);
        let missing = dir.path().join("missing.dxf");
        match compare_files(&missing, reference.path(), &AnalysisConfig::default()) {
            Err(FrontendError::InputNotFound { path }) => assert_eq!(path, missing),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn malformed_reference_is_parse_failure() {
        let generated = write_temp(SQUARE);
        let broken = write_temp("0\nSECTION\n2\nENTITIES\n0\nLINE\n10\nabc\n");
        let err = compare_files(generated.path(), broken.path(), &AnalysisConfig::default())
            .unwrap_err();
        assert!(matches!(err, FrontendError::Parse { .. }), "{err:?}");
    }
}
