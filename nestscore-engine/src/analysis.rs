use nestscore_config::AnalysisConfig;
use nestscore_core::document::Document;
use serde::Serialize;
use tracing::debug;

use crate::classify::{ClassifiedSet, classify};
use crate::compare::{ComparisonMetrics, compare_sets};
use crate::describe::{ShapeDescriptor, describe_groups};
use crate::extract::extract_primitives;
use crate::fuse::fuse_primitives;

/// 单张图纸的分析结果，保留描述符列表供检查使用。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawingAnalysis {
    pub primitive_count: usize,
    pub descriptors: Vec<ShapeDescriptor>,
    pub classified: ClassifiedSet,
}

/// 提取 → 融合 → 描述 → 分类。
pub fn analyze_document(document: &Document, config: &AnalysisConfig) -> DrawingAnalysis {
    let primitives = extract_primitives(document);
    let groups = fuse_primitives(&primitives, config.quantize_decimals);
    let descriptors = describe_groups(&groups, config.curvature_epsilon);
    let classified = classify(&descriptors, config);

    DrawingAnalysis {
        primitive_count: primitives.len(),
        descriptors,
        classified,
    }
}

/// 分别分析两张图纸并计算比对指标。
pub fn compare_documents(
    generated: &Document,
    reference: &Document,
    config: &AnalysisConfig,
) -> ComparisonMetrics {
    debug!("分析生成图纸");
    let generated = analyze_document(generated, config);
    debug!("分析参考图纸");
    let reference = analyze_document(reference, config);
    compare_sets(&generated.classified, &reference.classified, config)
}
