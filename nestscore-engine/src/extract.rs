use nestscore_core::document::{Document, Entity};
use nestscore_core::geometry::Point2;
use serde::Serialize;
use tracing::debug;

/// 参与分析的图元类别，与 `Entity` 的变体一一对应。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Polyline,
    Line,
    Circle,
    Arc,
    Ellipse,
}

impl PrimitiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Polyline => "polyline",
            PrimitiveKind::Line => "line",
            PrimitiveKind::Circle => "circle",
            PrimitiveKind::Arc => "arc",
            PrimitiveKind::Ellipse => "ellipse",
        }
    }
}

/// 一个图纸实体归一化后的记录。
///
/// `points` 用于端点连接，`bbox_points` 只参与包围盒计算，两者对圆与圆弧并不相同。
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub points: Vec<Point2>,
    pub bbox_points: Vec<Point2>,
    pub curvature_flags: Vec<f64>,
    pub layer: String,
}

impl Primitive {
    #[inline]
    pub fn first_point(&self) -> Option<Point2> {
        self.points.first().copied()
    }

    #[inline]
    pub fn last_point(&self) -> Option<Point2> {
        self.points.last().copied()
    }

    /// 任一分段的 bulge 绝对值超过 `epsilon` 即视为带弧度。
    pub fn is_curved(&self, epsilon: f64) -> bool {
        self.curvature_flags.iter().any(|flag| flag.abs() > epsilon)
    }
}

/// 按文件顺序把文档实体转换为图元；没有可连接点的实体被丢弃。
pub fn extract_primitives(document: &Document) -> Vec<Primitive> {
    let primitives: Vec<Primitive> = document
        .entities()
        .filter_map(|(_, entity)| primitive_from_entity(entity))
        .collect();

    debug!(
        entities = document.entity_count(),
        primitives = primitives.len(),
        "图元提取完成"
    );
    primitives
}

fn primitive_from_entity(entity: &Entity) -> Option<Primitive> {
    let layer = layer_or_default(entity.layer_name());
    let primitive = match entity {
        Entity::Polyline(polyline) => {
            let points: Vec<Point2> = polyline.vertices.iter().map(|v| v.position).collect();
            Primitive {
                kind: PrimitiveKind::Polyline,
                bbox_points: points.clone(),
                curvature_flags: polyline.vertices.iter().map(|v| v.bulge).collect(),
                points,
                layer,
            }
        }
        Entity::Line(line) => Primitive {
            kind: PrimitiveKind::Line,
            points: vec![line.start, line.end],
            bbox_points: vec![line.start, line.end],
            curvature_flags: Vec::new(),
            layer,
        },
        Entity::Circle(circle) => Primitive {
            kind: PrimitiveKind::Circle,
            points: vec![circle.center],
            bbox_points: radius_box(circle.center, circle.radius).to_vec(),
            curvature_flags: Vec::new(),
            layer,
        },
        // 包围盒按整圆估算，与圆弧实际扫掠范围无关
        Entity::Arc(arc) => Primitive {
            kind: PrimitiveKind::Arc,
            points: vec![arc.start_point(), arc.end_point()],
            bbox_points: radius_box(arc.center, arc.radius).to_vec(),
            curvature_flags: vec![1.0],
            layer,
        },
        Entity::Ellipse(ellipse) => Primitive {
            kind: PrimitiveKind::Ellipse,
            points: vec![ellipse.center],
            bbox_points: vec![ellipse.center],
            curvature_flags: Vec::new(),
            layer,
        },
    };

    if primitive.points.is_empty() {
        None
    } else {
        Some(primitive)
    }
}

fn radius_box(center: Point2, radius: f64) -> [Point2; 2] {
    [
        Point2::new(center.x() - radius, center.y() - radius),
        Point2::new(center.x() + radius, center.y() + radius),
    ]
}

fn layer_or_default(layer: &str) -> String {
    if layer.is_empty() {
        "0".to_string()
    } else {
        layer.to_string()
    }
}
