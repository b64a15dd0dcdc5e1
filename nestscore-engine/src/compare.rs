use std::collections::BTreeSet;

use nestscore_config::AnalysisConfig;
use nestscore_core::geometry::Bounds2D;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::ClassifiedSet;
use crate::describe::{ShapeDescriptor, round_to};

pub const SCORE_HAS_SLOTS: f64 = 15.0;
pub const SCORE_HAS_PARTS: f64 = 15.0;
pub const SCORE_BACKPLANE: f64 = 10.0;
pub const SCORE_ORGANIC_BACKPLANE: f64 = 15.0;
pub const SCORE_PARTS_WITH_TABS: f64 = 15.0;
pub const SCORE_PART_COUNT: f64 = 15.0;
pub const SCORE_SLOT_COUNT: f64 = 15.0;

/// 生成图纸与参考图纸的比对结果，字段名即对外输出的键名。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetrics {
    pub shape_count_generated: usize,
    pub shape_count_reference: usize,
    pub shape_count_match: bool,

    pub ryb_count_generated: usize,
    pub ryb_count_reference: usize,
    pub ryb_count_match: bool,

    pub slot_count_generated: usize,
    pub slot_count_reference: usize,
    pub slot_count_match: bool,

    pub sheet_count_generated: usize,
    pub sheet_count_reference: usize,

    pub has_backplane_generated: bool,
    pub has_backplane_reference: bool,
    pub is_backplane_organic_generated: bool,
    pub is_backplane_organic_reference: bool,
    pub rybs_with_tabs_generated: usize,
    pub rybs_with_tabs_reference: usize,

    pub bounding_box_overlap_rybs: f64,
    pub bounding_box_overlap_slots: f64,
    pub size_distribution_match: f64,
    pub slot_width_consistency: bool,
    pub overall_score: f64,
}

/// 总分的各组成部分（未取整）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub has_slots: f64,
    pub has_parts: f64,
    pub backplane: f64,
    pub organic_backplane: f64,
    pub parts_with_tabs: f64,
    pub part_count: f64,
    pub slot_count: f64,
}

impl ScoreBreakdown {
    /// 根据已算出的计数与标志计算各项得分。
    pub fn from_metrics(metrics: &ComparisonMetrics, tab_reference_cap: usize) -> Self {
        let required_tabs = metrics.ryb_count_reference.min(tab_reference_cap);
        Self {
            has_slots: award(metrics.slot_count_generated > 0, SCORE_HAS_SLOTS),
            has_parts: award(metrics.ryb_count_generated > 0, SCORE_HAS_PARTS),
            backplane: award(metrics.has_backplane_generated, SCORE_BACKPLANE),
            organic_backplane: award(
                metrics.is_backplane_organic_generated,
                SCORE_ORGANIC_BACKPLANE,
            ),
            parts_with_tabs: award(
                metrics.rybs_with_tabs_generated >= required_tabs,
                SCORE_PARTS_WITH_TABS,
            ),
            part_count: proportional(
                metrics.ryb_count_generated,
                metrics.ryb_count_reference,
                SCORE_PART_COUNT,
            ),
            slot_count: proportional(
                metrics.slot_count_generated,
                metrics.slot_count_reference,
                SCORE_SLOT_COUNT,
            ),
        }
    }

    /// 各项直接相加，不做归一化，也不截断到 100。
    pub fn total(&self) -> f64 {
        self.has_slots
            + self.has_parts
            + self.backplane
            + self.organic_backplane
            + self.parts_with_tabs
            + self.part_count
            + self.slot_count
    }
}

fn award(condition: bool, weight: f64) -> f64 {
    if condition { weight } else { 0.0 }
}

/// `weight * min(generated, reference) / max(reference, 1)`，上限为 `weight`。
fn proportional(generated: usize, reference: usize, weight: f64) -> f64 {
    let matched = generated.min(reference) as f64;
    let denominator = reference.max(1) as f64;
    (weight * matched / denominator).min(weight)
}

pub fn compare_sets(
    generated: &ClassifiedSet,
    reference: &ClassifiedSet,
    config: &AnalysisConfig,
) -> ComparisonMetrics {
    let mut metrics = ComparisonMetrics {
        shape_count_generated: generated.total,
        shape_count_reference: reference.total,
        shape_count_match: generated.total == reference.total,

        ryb_count_generated: generated.part_count(),
        ryb_count_reference: reference.part_count(),
        ryb_count_match: generated.part_count() == reference.part_count(),

        slot_count_generated: generated.slot_count(),
        slot_count_reference: reference.slot_count(),
        slot_count_match: generated.slot_count() == reference.slot_count(),

        sheet_count_generated: generated.sheet_count(),
        sheet_count_reference: reference.sheet_count(),

        has_backplane_generated: has_backplane(&generated.parts, config),
        has_backplane_reference: has_backplane(&reference.parts, config),
        is_backplane_organic_generated: has_organic_backplane(&generated.parts, config),
        is_backplane_organic_reference: has_organic_backplane(&reference.parts, config),
        rybs_with_tabs_generated: parts_with_tabs(&generated.parts, config),
        rybs_with_tabs_reference: parts_with_tabs(&reference.parts, config),

        bounding_box_overlap_rybs: bounding_box_overlap(&generated.parts, &reference.parts),
        bounding_box_overlap_slots: bounding_box_overlap(&generated.slots, &reference.slots),
        size_distribution_match: size_distribution_match(
            &generated.parts,
            &reference.parts,
            config.size_bucket,
        ),
        slot_width_consistency: slot_width_consistency(&generated.slots, &reference.slots, config),
        overall_score: 0.0,
    };

    let breakdown = ScoreBreakdown::from_metrics(&metrics, config.tab_reference_cap);
    metrics.overall_score = round_to(breakdown.total(), 1);

    debug!(
        overall_score = metrics.overall_score,
        parts_overlap = metrics.bounding_box_overlap_rybs,
        slots_overlap = metrics.bounding_box_overlap_slots,
        size_distribution = metrics.size_distribution_match,
        "比对评分完成"
    );
    metrics
}

/// 背板：面积超过阈值的零件。
pub fn has_backplane(parts: &[ShapeDescriptor], config: &AnalysisConfig) -> bool {
    parts
        .iter()
        .any(|part| part.area > config.backplane_min_area)
}

pub fn has_organic_backplane(parts: &[ShapeDescriptor], config: &AnalysisConfig) -> bool {
    parts.iter().any(|part| {
        part.area > config.backplane_min_area && part.point_count > config.organic_min_points
    })
}

/// 带卡扣的零件数：非背板且顶点数不少于阈值。
pub fn parts_with_tabs(parts: &[ShapeDescriptor], config: &AnalysisConfig) -> usize {
    parts
        .iter()
        .filter(|part| {
            part.area < config.backplane_min_area && part.point_count >= config.tab_min_points
        })
        .count()
}

/// 一组描述符的整体包围盒，空集合返回 `None`。
pub fn enclosing_bounds(shapes: &[ShapeDescriptor]) -> Option<Bounds2D> {
    let mut iter = shapes.iter();
    let mut bounds = iter.next()?.bounds();
    for shape in iter {
        bounds.include_bounds(&shape.bounds());
    }
    Some(bounds)
}

/// 两组整体包围盒的交并比（百分比，一位小数）。任一侧为空或不相交时为 0。
pub fn bounding_box_overlap(a: &[ShapeDescriptor], b: &[ShapeDescriptor]) -> f64 {
    let (Some(box_a), Some(box_b)) = (enclosing_bounds(a), enclosing_bounds(b)) else {
        return 0.0;
    };
    let Some(overlap) = box_a.intersection(&box_b) else {
        return 0.0;
    };
    let intersection = overlap.area();
    let union = box_a.area() + box_b.area() - intersection;
    round_to(intersection / union.max(1.0) * 100.0, 1)
}

/// 面积向下取整到 `bucket` 的倍数后，两侧去重尺寸集合的 Jaccard 相似度（百分比）。
pub fn size_distribution_match(
    generated: &[ShapeDescriptor],
    reference: &[ShapeDescriptor],
    bucket: f64,
) -> f64 {
    if generated.is_empty() || reference.is_empty() {
        return 0.0;
    }
    let buckets = |shapes: &[ShapeDescriptor]| -> BTreeSet<i64> {
        shapes
            .iter()
            .map(|shape| (shape.area / bucket).floor() as i64)
            .collect()
    };
    let gen_buckets = buckets(generated);
    let ref_buckets = buckets(reference);
    let common = gen_buckets.intersection(&ref_buckets).count();
    let total = gen_buckets.union(&ref_buckets).count();
    round_to(common as f64 / total.max(1) as f64 * 100.0, 1)
}

/// 两侧槽都非空，且每个槽的短边都在板厚容差内。
pub fn slot_width_consistency(
    generated: &[ShapeDescriptor],
    reference: &[ShapeDescriptor],
    config: &AnalysisConfig,
) -> bool {
    if generated.is_empty() || reference.is_empty() {
        return false;
    }
    let consistent = |slots: &[ShapeDescriptor]| {
        slots.iter().all(|slot| {
            (slot.min_side() - config.material_thickness).abs()
                < config.slot_consistency_tolerance
        })
    };
    consistent(generated) && consistent(reference)
}
