use std::cmp::Ordering;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use nestscore_config::AnalysisConfig;
use nestscore_engine::{ShapeDescriptor, analyze_document};

use crate::errors::FrontendError;
use crate::loader::load_drawing;

pub const LARGEST_SHAPES: usize = 20;
pub const SLOT_CANDIDATE_LIMIT: usize = 15;
/// 槽候选的最大宽度。
pub const SLOT_CANDIDATE_MAX_WIDTH: f64 = 20.0;

/// 单张图纸的形状概览。
#[derive(Debug, Clone)]
pub struct DrawingInspection {
    pub path: PathBuf,
    pub shape_count: usize,
    pub largest: Vec<ShapeDescriptor>,
    pub slot_candidates: Vec<ShapeDescriptor>,
    pub more_slot_candidates: bool,
    pub skipped: Vec<(String, usize)>,
}

pub fn inspect_drawing(
    path: &Path,
    config: &AnalysisConfig,
) -> Result<DrawingInspection, FrontendError> {
    let document = load_drawing(path)?;
    let analysis = analyze_document(&document, config);
    let descriptors = analysis.descriptors;

    let mut largest = descriptors.clone();
    largest.sort_by(|a, b| b.area.partial_cmp(&a.area).unwrap_or(Ordering::Equal));
    largest.truncate(LARGEST_SHAPES);

    let mut candidates: Vec<ShapeDescriptor> = descriptors
        .iter()
        .filter(|d| d.width < SLOT_CANDIDATE_MAX_WIDTH && d.has_curvature)
        .cloned()
        .collect();
    candidates.sort_by(|a, b| a.width.partial_cmp(&b.width).unwrap_or(Ordering::Equal));
    let more_slot_candidates = candidates.len() > SLOT_CANDIDATE_LIMIT;
    candidates.truncate(SLOT_CANDIDATE_LIMIT);

    Ok(DrawingInspection {
        path: path.to_path_buf(),
        shape_count: descriptors.len(),
        largest,
        slot_candidates: candidates,
        more_slot_candidates,
        skipped: document
            .skipped_entities()
            .map(|(kind, count)| (kind.to_string(), count))
            .collect(),
    })
}

pub fn render_inspection(inspection: &DrawingInspection) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} 中面积最大的 {} 个形状（共 {} 个）:",
        inspection.path.display(),
        inspection.largest.len(),
        inspection.shape_count
    );
    for (index, shape) in inspection.largest.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} - {:.2}x{:.2} = 面积 {:.2} (图层: {}, 点数: {})",
            index + 1,
            shape.shape_type.as_str(),
            shape.width,
            shape.height,
            shape.area,
            shape.layer,
            shape.point_count
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "疑似槽（宽 < {SLOT_CANDIDATE_MAX_WIDTH:.0} 且带弧度）:");
    for shape in &inspection.slot_candidates {
        let _ = writeln!(
            out,
            "槽? {} - 短边 {:.2} x 长边 {:.2} = 面积 {:.2}",
            shape.shape_type.as_str(),
            shape.min_side(),
            shape.width.max(shape.height),
            shape.area
        );
    }
    if inspection.more_slot_candidates {
        let _ = writeln!(out, "...（仅显示前 {SLOT_CANDIDATE_LIMIT} 个）");
    }

    if !inspection.skipped.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "未参与分析的实体:");
        for (kind, count) in &inspection.skipped {
            let _ = writeln!(out, "  - {kind}: {count}");
        }
    }
    out
}
