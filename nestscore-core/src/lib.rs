pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示，保持与 DXF 双精度坐标一致。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 二维向量，目前用于椭圆主轴与圆弧端点偏移。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    /// 轴对齐边界框，用于形状描述与整体重叠度计算。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn new(min: Point2, max: Point2) -> Self {
            Self { min, max }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        /// 由一组点构造边界框，点集为空时返回 `None`。
        pub fn from_points<I>(points: I) -> Option<Self>
        where
            I: IntoIterator<Item = Point2>,
        {
            let mut bounds = Self::empty();
            for point in points {
                bounds.include_point(point);
            }
            if bounds.is_empty() { None } else { Some(bounds) }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }

        pub fn include_bounds(&mut self, other: &Bounds2D) {
            if other.is_empty() {
                return;
            }
            self.include_point(other.min);
            self.include_point(other.max);
        }

        #[inline]
        pub fn width(&self) -> f64 {
            self.max.x() - self.min.x()
        }

        #[inline]
        pub fn height(&self) -> f64 {
            self.max.y() - self.min.y()
        }

        #[inline]
        pub fn area(&self) -> f64 {
            self.width() * self.height()
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            debug_assert!(!self.is_empty());
            let center = (self.min.as_vec2() + self.max.as_vec2()) * 0.5;
            Point2::from_vec(center)
        }

        /// 两个边界框的交集；仅接触边或角（零面积）时视为不相交。
        pub fn intersection(&self, other: &Bounds2D) -> Option<Bounds2D> {
            let min = self.min.as_vec2().max(other.min.as_vec2());
            let max = self.max.as_vec2().min(other.max.as_vec2());
            if max.x <= min.x || max.y <= min.y {
                None
            } else {
                Some(Bounds2D::new(Point2::from_vec(min), Point2::from_vec(max)))
            }
        }
    }
}

pub mod document {
    use std::collections::{BTreeMap, BTreeSet};

    use serde::{Deserialize, Serialize};

    use crate::geometry::{Point2, Vector2};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EntityId(u64);

    impl EntityId {
        #[inline]
        pub fn new(raw: u64) -> Self {
            Self(raw)
        }

        /// 提供原始数值，便于日志输出。
        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    /// 参与形状分析的曲线实体。其余 DXF 实体在读取阶段被跳过并计数。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub enum Entity {
        Line(Line),
        Circle(Circle),
        Arc(Arc),
        Ellipse(Ellipse),
        Polyline(Polyline),
    }

    impl Entity {
        #[inline]
        pub fn layer_name(&self) -> &str {
            match self {
                Entity::Line(line) => &line.layer,
                Entity::Circle(circle) => &circle.layer,
                Entity::Arc(arc) => &arc.layer,
                Entity::Ellipse(ellipse) => &ellipse.layer,
                Entity::Polyline(polyline) => &polyline.layer,
            }
        }

        /// DXF 中对应的实体类型名。
        #[inline]
        pub fn kind_name(&self) -> &'static str {
            match self {
                Entity::Line(_) => "LINE",
                Entity::Circle(_) => "CIRCLE",
                Entity::Arc(_) => "ARC",
                Entity::Ellipse(_) => "ELLIPSE",
                Entity::Polyline(_) => "POLYLINE",
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Line {
        pub start: Point2,
        pub end: Point2,
        pub layer: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Circle {
        pub center: Point2,
        pub radius: f64,
        pub layer: String,
    }

    /// 圆弧实体，角度以弧度形式储存，遵循数学正方向。
    ///
    /// 圆心与角度位于实体坐标系（OCS）。拉伸方向为 -Z 时 `mirrored` 为真，
    /// 此时 OCS 的 X 轴与世界坐标相反。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Arc {
        pub center: Point2,
        pub radius: f64,
        pub start_angle: f64,
        pub end_angle: f64,
        #[serde(default)]
        pub mirrored: bool,
        pub layer: String,
    }

    impl Arc {
        /// 世界坐标下的起点。
        #[inline]
        pub fn start_point(&self) -> Point2 {
            self.to_world(arc_point(self.center, self.radius, self.start_angle))
        }

        /// 世界坐标下的终点。
        #[inline]
        pub fn end_point(&self) -> Point2 {
            self.to_world(arc_point(self.center, self.radius, self.end_angle))
        }

        fn to_world(&self, point: Point2) -> Point2 {
            if self.mirrored {
                Point2::new(-point.x(), point.y())
            } else {
                point
            }
        }
    }

    /// 椭圆实体，记录主轴向量与参数范围（单位为弧度）。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Ellipse {
        pub center: Point2,
        pub major_axis: Vector2,
        pub ratio: f64,
        pub start_parameter: f64,
        pub end_parameter: f64,
        pub layer: String,
    }

    /// LWPOLYLINE 与二维 POLYLINE 统一表示为多段线。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Polyline {
        pub vertices: Vec<PolylineVertex>,
        pub is_closed: bool,
        pub layer: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PolylineVertex {
        pub position: Point2,
        pub bulge: f64,
    }

    impl PolylineVertex {
        #[inline]
        pub fn new(position: Point2) -> Self {
            Self {
                position,
                bulge: 0.0,
            }
        }

        #[inline]
        pub fn with_bulge(position: Point2, bulge: f64) -> Self {
            Self { position, bulge }
        }
    }

    /// 读取后的图纸：按文件顺序保存曲线实体，并记录被跳过的实体类型。
    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    pub struct Document {
        entities: Vec<(EntityId, Entity)>,
        layers: BTreeSet<String>,
        skipped: BTreeMap<String, usize>,
        next_entity_id: u64,
    }

    impl Document {
        pub fn new() -> Self {
            let mut doc = Self::default();
            doc.ensure_layer("0");
            doc
        }

        pub fn ensure_layer(&mut self, name: impl AsRef<str>) {
            let key = name.as_ref();
            if !self.layers.contains(key) {
                self.layers.insert(key.to_string());
            }
        }

        pub fn add_line(
            &mut self,
            start: Point2,
            end: Point2,
            layer: impl Into<String>,
        ) -> EntityId {
            let layer = layer.into();
            self.push(Entity::Line(Line { start, end, layer }))
        }

        pub fn add_circle(
            &mut self,
            center: Point2,
            radius: f64,
            layer: impl Into<String>,
        ) -> EntityId {
            let layer = layer.into();
            self.push(Entity::Circle(Circle {
                center,
                radius,
                layer,
            }))
        }

        pub fn add_arc(
            &mut self,
            center: Point2,
            radius: f64,
            start_angle: f64,
            end_angle: f64,
            layer: impl Into<String>,
        ) -> EntityId {
            let layer = layer.into();
            self.push(Entity::Arc(Arc {
                center,
                radius,
                start_angle,
                end_angle,
                mirrored: false,
                layer,
            }))
        }

        pub fn add_ellipse(
            &mut self,
            center: Point2,
            major_axis: Vector2,
            ratio: f64,
            start_parameter: f64,
            end_parameter: f64,
            layer: impl Into<String>,
        ) -> EntityId {
            let layer = layer.into();
            self.push(Entity::Ellipse(Ellipse {
                center,
                major_axis,
                ratio,
                start_parameter,
                end_parameter,
                layer,
            }))
        }

        pub fn add_polyline<I>(
            &mut self,
            vertices: I,
            is_closed: bool,
            layer: impl Into<String>,
        ) -> EntityId
        where
            I: IntoIterator<Item = Point2>,
        {
            let collected = vertices
                .into_iter()
                .map(PolylineVertex::new)
                .collect::<Vec<_>>();
            self.add_polyline_with_vertices(collected, is_closed, layer)
        }

        pub fn add_polyline_with_vertices<I>(
            &mut self,
            vertices: I,
            is_closed: bool,
            layer: impl Into<String>,
        ) -> EntityId
        where
            I: IntoIterator<Item = PolylineVertex>,
        {
            let layer = layer.into();
            let vertices: Vec<PolylineVertex> = vertices.into_iter().collect();
            self.push(Entity::Polyline(Polyline {
                vertices,
                is_closed,
                layer,
            }))
        }

        pub fn add_entity(&mut self, entity: Entity) -> EntityId {
            self.push(entity)
        }

        /// 记录一个未参与分析的实体类型（如 TEXT、HATCH）。
        pub fn record_skipped(&mut self, kind: impl Into<String>) {
            *self.skipped.entry(kind.into()).or_insert(0) += 1;
        }

        #[inline]
        pub fn entities(&self) -> impl Iterator<Item = &(EntityId, Entity)> {
            self.entities.iter()
        }

        #[inline]
        pub fn entity_count(&self) -> usize {
            self.entities.len()
        }

        pub fn entity(&self, id: EntityId) -> Option<&Entity> {
            self.entities
                .iter()
                .find(|(entity_id, _)| *entity_id == id)
                .map(|(_, entity)| entity)
        }

        #[inline]
        pub fn layers(&self) -> impl Iterator<Item = &str> {
            self.layers.iter().map(String::as_str)
        }

        /// 被跳过的实体类型及数量，按类型名排序。
        #[inline]
        pub fn skipped_entities(&self) -> impl Iterator<Item = (&str, usize)> {
            self.skipped.iter().map(|(kind, count)| (kind.as_str(), *count))
        }

        fn push(&mut self, entity: Entity) -> EntityId {
            self.ensure_layer(entity.layer_name());
            let id = self.next_id();
            self.entities.push((id, entity));
            id
        }

        #[inline]
        fn next_id(&mut self) -> EntityId {
            let id = self.next_entity_id;
            self.next_entity_id += 1;
            EntityId(id)
        }
    }

    fn arc_point(center: Point2, radius: f64, angle: f64) -> Point2 {
        let offset = Vector2::new(radius * angle.cos(), radius * angle.sin());
        center.translate(offset)
    }

}
