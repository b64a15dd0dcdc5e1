use nestscore_core::geometry::{Bounds2D, Point2};
use serde::Serialize;
use tracing::debug;

use crate::extract::PrimitiveKind;
use crate::fuse::ShapeGroup;

/// 描述符的类型标记：单个图元沿用其类别，多成员分组为 `composite`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Polyline,
    Line,
    Circle,
    Arc,
    Ellipse,
    Composite,
}

impl ShapeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeType::Polyline => "polyline",
            ShapeType::Line => "line",
            ShapeType::Circle => "circle",
            ShapeType::Arc => "arc",
            ShapeType::Ellipse => "ellipse",
            ShapeType::Composite => "composite",
        }
    }
}

impl From<PrimitiveKind> for ShapeType {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Polyline => ShapeType::Polyline,
            PrimitiveKind::Line => ShapeType::Line,
            PrimitiveKind::Circle => ShapeType::Circle,
            PrimitiveKind::Arc => ShapeType::Arc,
            PrimitiveKind::Ellipse => ShapeType::Ellipse,
        }
    }
}

/// 一个形状分组的扁平摘要，供分类与比对使用。
///
/// 尺寸、角点与中心保留两位小数，面积为包围盒面积并保留一位小数。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeDescriptor {
    #[serde(rename = "type")]
    pub shape_type: ShapeType,
    pub layer: String,
    pub width: f64,
    pub height: f64,
    pub area: f64,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub cx: f64,
    pub cy: f64,
    pub has_curvature: bool,
    pub point_count: usize,
}

impl ShapeDescriptor {
    /// 由取整后的角点还原的包围盒。
    pub fn bounds(&self) -> Bounds2D {
        Bounds2D::new(
            Point2::new(self.min_x, self.min_y),
            Point2::new(self.max_x, self.max_y),
        )
    }

    #[inline]
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

pub fn describe_groups(groups: &[ShapeGroup<'_>], curvature_epsilon: f64) -> Vec<ShapeDescriptor> {
    let descriptors: Vec<ShapeDescriptor> = groups
        .iter()
        .filter_map(|group| describe_group(group, curvature_epsilon))
        .collect();

    debug!(
        groups = groups.len(),
        descriptors = descriptors.len(),
        "形状描述完成"
    );
    descriptors
}

/// 包围点为空的分组返回 `None`。
pub fn describe_group(group: &ShapeGroup<'_>, curvature_epsilon: f64) -> Option<ShapeDescriptor> {
    let first = group.members.first()?;
    let bounds = Bounds2D::from_points(
        group
            .members
            .iter()
            .flat_map(|member| member.bbox_points.iter().copied()),
    )?;

    let shape_type = if group.members.len() > 1 {
        ShapeType::Composite
    } else {
        ShapeType::from(first.kind)
    };
    let center = bounds.center();
    let min = bounds.min();
    let max = bounds.max();

    Some(ShapeDescriptor {
        shape_type,
        layer: first.layer.clone(),
        width: round_to(bounds.width(), 2),
        height: round_to(bounds.height(), 2),
        area: round_to(bounds.area(), 1),
        min_x: round_to(min.x(), 2),
        min_y: round_to(min.y(), 2),
        max_x: round_to(max.x(), 2),
        max_y: round_to(max.y(), 2),
        cx: round_to(center.x(), 2),
        cy: round_to(center.y(), 2),
        has_curvature: group
            .members
            .iter()
            .any(|member| member.is_curved(curvature_epsilon)),
        point_count: group.members.iter().map(|member| member.points.len()).sum(),
    })
}

/// 四舍五入到指定小数位。
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Primitive;

    fn primitive(kind: PrimitiveKind, points: &[(f64, f64)], bulges: &[f64], layer: &str) -> Primitive {
        let points: Vec<Point2> = points.iter().map(|&(x, y)| Point2::new(x, y)).collect();
        Primitive {
            kind,
            bbox_points: points.clone(),
            points,
            curvature_flags: bulges.to_vec(),
            layer: layer.to_string(),
        }
    }

    #[test]
    fn single_member_keeps_its_kind() {
        let square = primitive(
            PrimitiveKind::Polyline,
            &[(10.0, 10.0), (60.0, 10.0), (60.0, 60.0), (10.0, 60.0)],
            &[0.0; 4],
            "PARTS",
        );
        let group = ShapeGroup {
            id: 0,
            members: vec![&square],
        };
        let descriptor = describe_group(&group, 0.001).expect("descriptor");
        assert_eq!(descriptor.shape_type, ShapeType::Polyline);
        assert_eq!(descriptor.layer, "PARTS");
        assert_eq!(descriptor.width, 50.0);
        assert_eq!(descriptor.height, 50.0);
        assert_eq!(descriptor.area, 2500.0);
        assert_eq!((descriptor.cx, descriptor.cy), (35.0, 35.0));
        assert_eq!(descriptor.point_count, 4);
        assert!(!descriptor.has_curvature);
    }

    #[test]
    fn composite_group_merges_boxes_and_flags() {
        let a = primitive(PrimitiveKind::Line, &[(0.0, 0.0), (12.0, 0.0)], &[], "SLOTS");
        let b = primitive(PrimitiveKind::Arc, &[(12.0, 0.0), (12.0, 30.0)], &[1.0], "OTHER");
        let group = ShapeGroup {
            id: 3,
            members: vec![&a, &b],
        };
        let descriptor = describe_group(&group, 0.001).expect("descriptor");
        assert_eq!(descriptor.shape_type, ShapeType::Composite);
        assert_eq!(descriptor.layer, "SLOTS");
        assert_eq!(descriptor.width, 12.0);
        assert_eq!(descriptor.height, 30.0);
        assert_eq!(descriptor.area, 360.0);
        assert_eq!(descriptor.point_count, 4);
        assert!(descriptor.has_curvature);
        assert_eq!(descriptor.min_side(), 12.0);
    }

    #[test]
    fn area_uses_unrounded_extent() {
        let a = primitive(
            PrimitiveKind::Line,
            &[(0.0, 0.0), (10.004, 10.004)],
            &[],
            "0",
        );
        let group = ShapeGroup {
            id: 0,
            members: vec![&a],
        };
        let descriptor = describe_group(&group, 0.001).expect("descriptor");
        assert_eq!(descriptor.width, 10.0);
        assert_eq!(descriptor.area, 100.1);
    }

    #[test]
    fn groups_without_box_points_are_discarded() {
        let mut empty = primitive(PrimitiveKind::Line, &[(0.0, 0.0), (1.0, 0.0)], &[], "0");
        empty.bbox_points.clear();
        let groups = vec![ShapeGroup {
            id: 0,
            members: vec![&empty],
        }];
        assert!(describe_groups(&groups, 0.001).is_empty());
    }

    #[test]
    fn descriptor_serializes_type_in_lowercase() {
        let a = primitive(PrimitiveKind::Circle, &[(0.0, 0.0)], &[], "0");
        let group = ShapeGroup {
            id: 0,
            members: vec![&a],
        };
        let descriptor = describe_group(&group, 0.001).expect("descriptor");
        let json = serde_json::to_value(&descriptor).expect("serialize");
        assert_eq!(json["type"], "circle");
        assert_eq!(json["point_count"], 1);
    }
}
