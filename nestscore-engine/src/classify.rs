use nestscore_config::AnalysisConfig;
use serde::Serialize;
use tracing::debug;

use crate::describe::ShapeDescriptor;

/// 一份描述符集合的分类结果。三类互不重叠，未命中任何类别的描述符只计入 `total`。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassifiedSet {
    pub sheets: Vec<ShapeDescriptor>,
    pub parts: Vec<ShapeDescriptor>,
    pub slots: Vec<ShapeDescriptor>,
    pub total: usize,
}

impl ClassifiedSet {
    #[inline]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    #[inline]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

/// 整张原料板：宽、高都超过板材阈值。
pub fn is_sheet(descriptor: &ShapeDescriptor, config: &AnalysisConfig) -> bool {
    descriptor.width > config.sheet_min_width && descriptor.height > config.sheet_min_height
}

/// 紧固槽：任一边接近板厚，带弧度且面积较小。
pub fn is_slot(descriptor: &ShapeDescriptor, config: &AnalysisConfig) -> bool {
    let near_thickness = |side: f64| {
        (side - config.material_thickness).abs() < config.slot_classify_tolerance
    };
    (near_thickness(descriptor.width) || near_thickness(descriptor.height))
        && descriptor.has_curvature
        && descriptor.area < config.slot_max_area
}

/// 零件（肋板）的尺寸条件，不含与板、槽的互斥判断。
pub fn is_part_sized(descriptor: &ShapeDescriptor, config: &AnalysisConfig) -> bool {
    descriptor.area > config.part_min_area
        && descriptor.width > config.part_min_side
        && descriptor.height > config.part_min_side
}

/// 依次判定板、槽、零件；先命中的类别独占该描述符。
pub fn classify(descriptors: &[ShapeDescriptor], config: &AnalysisConfig) -> ClassifiedSet {
    let mut set = ClassifiedSet {
        total: descriptors.len(),
        ..ClassifiedSet::default()
    };

    for descriptor in descriptors {
        if is_sheet(descriptor, config) {
            set.sheets.push(descriptor.clone());
        } else if is_slot(descriptor, config) {
            set.slots.push(descriptor.clone());
        } else if is_part_sized(descriptor, config) {
            set.parts.push(descriptor.clone());
        }
    }

    debug!(
        total = set.total,
        sheets = set.sheet_count(),
        parts = set.part_count(),
        slots = set.slot_count(),
        "形状分类完成"
    );
    set
}
