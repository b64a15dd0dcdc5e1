use std::borrow::Cow;
use std::fs;
use std::path::Path;

use nestscore_core::{
    document::{Arc, Circle, Document, Ellipse, Entity, Line, Polyline, PolylineVertex},
    geometry::{Point2, Vector2},
};
use thiserror::Error;

const BINARY_DXF_SENTINEL: &[u8] = b"AutoCAD Binary DXF";
/// 图纸空间实体的跳过计数键。
pub const PAPER_SPACE: &str = "PAPERSPACE";

#[derive(Debug, Error)]
pub enum IoError {
    #[error("file not found: {path:?}")]
    NotFound { path: std::path::PathBuf },
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

/// ASCII DXF 读取入口，仅提取形状分析需要的曲线实体。
#[derive(Debug, Default, Clone, Copy)]
pub struct DxfFacade;

impl DxfFacade {
    pub fn new() -> Self {
        Self
    }

    /// 直接从内存文本解析，便于测试与管道输入。
    pub fn parse_str(&self, source: &str) -> Result<Document, IoError> {
        DxfParser::new(source).parse().map_err(IoError::from)
    }
}

impl DocumentLoader for DxfFacade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        let data = fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                IoError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                IoError::ReadError {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        if data.starts_with(BINARY_DXF_SENTINEL) {
            return Err(IoError::UnsupportedFeature(format!(
                "binary DXF {path:?}"
            )));
        }
        // 旧版 DXF 常以 ANSI 代码页保存，非 UTF-8 字节按替换字符处理，不影响数值组码。
        let text: Cow<'_, str> = String::from_utf8_lossy(&data);
        self.parse_str(&text)
    }
}

#[derive(Debug)]
enum DxfError {
    Invalid { message: String },
}

impl DxfError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

impl From<DxfError> for IoError {
    fn from(err: DxfError) -> Self {
        match err {
            DxfError::Invalid { message } => IoError::InvalidDocument(message),
        }
    }
}

struct DxfParser<'a> {
    reader: DxfReader<'a>,
    /// 当前实体带有组码 67 = 1。
    paper_space: bool,
}

impl<'a> DxfParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            reader: DxfReader::new(source),
            paper_space: false,
        }
    }

    fn parse(mut self) -> Result<Document, DxfError> {
        let mut document = Document::new();
        let mut saw_eof = false;
        while let Some((code, value)) = self.reader.next_pair()? {
            if code == 999 {
                continue;
            }
            if code != 0 {
                return Err(DxfError::invalid(format!(
                    "意外的组码 {code}（期望 0 表示 SECTION/EOF）"
                )));
            }
            match value.trim() {
                "SECTION" => {
                    let (name_code, name) = self
                        .reader
                        .next_pair()?
                        .ok_or_else(|| DxfError::invalid("SECTION 缺少名称（组码 2）"))?;
                    if name_code != 2 {
                        return Err(DxfError::invalid(format!(
                            "SECTION 名称使用了组码 {name_code}（期望 2）"
                        )));
                    }
                    match name.trim() {
                        "ENTITIES" => self.parse_entities(&mut document)?,
                        _ => self.skip_section()?,
                    }
                }
                "EOF" => {
                    saw_eof = true;
                    break;
                }
                unexpected => {
                    return Err(DxfError::invalid(format!(
                        "意外的标记 {unexpected}，期望 SECTION 或 EOF"
                    )));
                }
            }
        }
        if !saw_eof {
            return Err(DxfError::invalid("文件缺少 EOF 终止标记"));
        }
        Ok(document)
    }

    fn skip_section(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) if value.trim() == "ENDSEC" => break,
                Some(_) => continue,
                None => {
                    return Err(DxfError::invalid("SECTION 未找到 ENDSEC 终止标记"));
                }
            }
        }
        Ok(())
    }

    fn parse_entities(&mut self, document: &mut Document) -> Result<(), DxfError> {
        loop {
            let (code, value) = match self.reader.next_pair()? {
                Some(pair) => pair,
                None => return Err(DxfError::invalid("ENTITIES 段提前结束")),
            };
            if code != 0 {
                return Err(DxfError::invalid(format!(
                    "ENTITIES 段遇到组码 {code}（期望 0 表示实体起始）"
                )));
            }

            self.paper_space = false;
            match value.trim() {
                "ENDSEC" => break,
                "SEQEND" => {
                    self.skip_entity_body()?;
                }
                "POLYLINE" => {
                    if let Some(polyline) = self.parse_polyline_entity(document)? {
                        self.admit(document, polyline);
                    }
                }
                "LINE" => {
                    let line = self.parse_line()?;
                    self.admit(document, line);
                }
                "CIRCLE" => {
                    let circle = self.parse_circle()?;
                    self.admit(document, circle);
                }
                "ARC" => {
                    let arc = self.parse_arc()?;
                    self.admit(document, arc);
                }
                "ELLIPSE" => {
                    let ellipse = self.parse_ellipse()?;
                    self.admit(document, ellipse);
                }
                "LWPOLYLINE" => {
                    let polyline = self.parse_lwpolyline()?;
                    self.admit(document, polyline);
                }
                other => {
                    // 文字、标注、填充等不参与形状分析，只计数
                    document.record_skipped(other);
                    self.skip_entity_body()?;
                }
            }
        }
        Ok(())
    }

    /// 只收录模型空间实体，图纸空间的图框、标题栏等计入跳过统计。
    fn admit(&mut self, document: &mut Document, entity: Entity) {
        if std::mem::take(&mut self.paper_space) {
            document.record_skipped(PAPER_SPACE);
        } else {
            document.add_entity(entity);
        }
    }

    fn read_space_flag(&mut self, raw: &str) -> Result<(), DxfError> {
        self.paper_space = parse_i32(raw, "空间标志（组码 67）")? == 1;
        Ok(())
    }

    fn parse_line(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut start_x = None;
        let mut start_y = None;
        let mut end_x = None;
        let mut end_y = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    67 => self.read_space_flag(&value)?,
                    10 => assign_coord(&mut start_x, &value, "LINE 起点 X（组码 10）")?,
                    20 => assign_coord(&mut start_y, &value, "LINE 起点 Y（组码 20）")?,
                    11 => assign_coord(&mut end_x, &value, "LINE 终点 X（组码 11）")?,
                    21 => assign_coord(&mut end_y, &value, "LINE 终点 Y（组码 21）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("LINE 未正确结束")),
            }
        }

        let layer = layer_or_default(layer);
        let sx = start_x.ok_or_else(|| DxfError::invalid("LINE 缺少起点 X（组码 10）"))?;
        let sy = start_y.ok_or_else(|| DxfError::invalid("LINE 缺少起点 Y（组码 20）"))?;
        let ex = end_x.ok_or_else(|| DxfError::invalid("LINE 缺少终点 X（组码 11）"))?;
        let ey = end_y.ok_or_else(|| DxfError::invalid("LINE 缺少终点 Y（组码 21）"))?;

        Ok(Entity::Line(Line {
            start: Point2::new(sx, sy),
            end: Point2::new(ex, ey),
            layer,
        }))
    }

    fn parse_circle(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut center_x = None;
        let mut center_y = None;
        let mut radius = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    67 => self.read_space_flag(&value)?,
                    10 => assign_coord(&mut center_x, &value, "CIRCLE 圆心 X（组码 10）")?,
                    20 => assign_coord(&mut center_y, &value, "CIRCLE 圆心 Y（组码 20）")?,
                    40 => assign_coord(&mut radius, &value, "CIRCLE 半径（组码 40）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("CIRCLE 未正确结束")),
            }
        }

        let layer = layer_or_default(layer);
        let cx = center_x.ok_or_else(|| DxfError::invalid("CIRCLE 缺少圆心 X（组码 10）"))?;
        let cy = center_y.ok_or_else(|| DxfError::invalid("CIRCLE 缺少圆心 Y（组码 20）"))?;
        let radius = radius.ok_or_else(|| DxfError::invalid("CIRCLE 缺少半径（组码 40）"))?;

        Ok(Entity::Circle(Circle {
            center: Point2::new(cx, cy),
            radius,
            layer,
        }))
    }

    fn parse_arc(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut center_x = None;
        let mut center_y = None;
        let mut radius = None;
        let mut start_angle = None;
        let mut end_angle = None;
        let mut extrusion_z = 1.0;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    67 => self.read_space_flag(&value)?,
                    10 => assign_coord(&mut center_x, &value, "ARC 圆心 X（组码 10）")?,
                    20 => assign_coord(&mut center_y, &value, "ARC 圆心 Y（组码 20）")?,
                    40 => assign_coord(&mut radius, &value, "ARC 半径（组码 40）")?,
                    50 => assign_coord(&mut start_angle, &value, "ARC 起始角（组码 50）")?,
                    51 => assign_coord(&mut end_angle, &value, "ARC 终止角（组码 51）")?,
                    230 => extrusion_z = parse_f64(&value, "ARC 拉伸方向 Z（组码 230）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("ARC 未正确结束")),
            }
        }

        let layer = layer_or_default(layer);
        let cx = center_x.ok_or_else(|| DxfError::invalid("ARC 缺少圆心 X（组码 10）"))?;
        let cy = center_y.ok_or_else(|| DxfError::invalid("ARC 缺少圆心 Y（组码 20）"))?;
        let radius = radius.ok_or_else(|| DxfError::invalid("ARC 缺少半径（组码 40）"))?;
        let start_angle =
            start_angle.ok_or_else(|| DxfError::invalid("ARC 缺少起始角（组码 50）"))?;
        let end_angle = end_angle.ok_or_else(|| DxfError::invalid("ARC 缺少终止角（组码 51）"))?;

        Ok(Entity::Arc(Arc {
            center: Point2::new(cx, cy),
            radius,
            start_angle: start_angle.to_radians(),
            end_angle: end_angle.to_radians(),
            mirrored: extrusion_z < 0.0,
            layer,
        }))
    }

    fn parse_ellipse(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut center_x = None;
        let mut center_y = None;
        let mut major_x = None;
        let mut major_y = None;
        let mut ratio = None;
        let mut start_parameter = 0.0;
        let mut end_parameter = std::f64::consts::TAU;

        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    67 => self.read_space_flag(&value)?,
                    10 => assign_coord(&mut center_x, &value, "ELLIPSE 圆心 X（组码 10）")?,
                    20 => assign_coord(&mut center_y, &value, "ELLIPSE 圆心 Y（组码 20）")?,
                    11 => assign_coord(&mut major_x, &value, "ELLIPSE 主轴向量 X（组码 11）")?,
                    21 => assign_coord(&mut major_y, &value, "ELLIPSE 主轴向量 Y（组码 21）")?,
                    40 => assign_coord(&mut ratio, &value, "ELLIPSE 半径比（组码 40）")?,
                    41 => start_parameter = parse_f64(&value, "ELLIPSE 起始参数")?,
                    42 => end_parameter = parse_f64(&value, "ELLIPSE 终止参数")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("ELLIPSE 未正确结束")),
            }
        }

        let layer = layer_or_default(layer);
        let cx = center_x.ok_or_else(|| DxfError::invalid("ELLIPSE 缺少圆心 X（组码 10）"))?;
        let cy = center_y.ok_or_else(|| DxfError::invalid("ELLIPSE 缺少圆心 Y（组码 20）"))?;
        let major_x =
            major_x.ok_or_else(|| DxfError::invalid("ELLIPSE 缺少主轴向量 X（组码 11）"))?;
        let major_y =
            major_y.ok_or_else(|| DxfError::invalid("ELLIPSE 缺少主轴向量 Y（组码 21）"))?;

        let ratio = ratio.unwrap_or(1.0);
        if ratio <= 0.0 {
            return Err(DxfError::invalid(format!(
                "ELLIPSE 半径比必须为正数，实际为 {ratio}"
            )));
        }

        Ok(Entity::Ellipse(Ellipse {
            center: Point2::new(cx, cy),
            major_axis: Vector2::new(major_x, major_y),
            ratio,
            start_parameter,
            end_parameter,
            layer,
        }))
    }

    fn parse_lwpolyline(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut is_closed = false;
        let mut vertices: Vec<PolylineVertex> = Vec::new();
        let mut pending_x: Option<f64> = None;
        let mut pending_y: Option<f64> = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    67 => self.read_space_flag(&value)?,
                    70 => {
                        let flag = parse_i32(&value, "LWPOLYLINE 标志")?;
                        is_closed = flag & 0x01 == 0x01;
                    }
                    10 => {
                        let x = parse_f64(&value, "LWPOLYLINE 顶点 X")?;
                        if let Some(y) = pending_y.take() {
                            vertices.push(PolylineVertex::new(Point2::new(x, y)));
                        } else if pending_x.replace(x).is_some() {
                            return Err(DxfError::invalid(
                                "LWPOLYLINE 顶点缺少对应的 Y（组码 20）",
                            ));
                        }
                    }
                    20 => {
                        let y = parse_f64(&value, "LWPOLYLINE 顶点 Y")?;
                        if let Some(x) = pending_x.take() {
                            vertices.push(PolylineVertex::new(Point2::new(x, y)));
                        } else if pending_y.replace(y).is_some() {
                            return Err(DxfError::invalid(
                                "LWPOLYLINE 顶点缺少对应的 X（组码 10）",
                            ));
                        }
                    }
                    42 => {
                        let bulge = parse_f64(&value, "LWPOLYLINE 顶点 bulge")?;
                        match vertices.last_mut() {
                            Some(vertex) => vertex.bulge = bulge,
                            None => {
                                return Err(DxfError::invalid(
                                    "LWPOLYLINE 在定义首个顶点前遇到 bulge（组码 42）",
                                ));
                            }
                        }
                    }
                    _ => {}
                },
                None => return Err(DxfError::invalid("LWPOLYLINE 未正确结束")),
            }
        }

        if pending_x.is_some() || pending_y.is_some() {
            return Err(DxfError::invalid(
                "LWPOLYLINE 顶点坐标成对出现（组码 10/20），检测到不完整的顶点",
            ));
        }

        Ok(Entity::Polyline(Polyline {
            vertices,
            is_closed,
            layer: layer_or_default(layer),
        }))
    }

    /// 解析旧式 POLYLINE + VERTEX + SEQEND 序列。网格与多面体网格不参与分析，整段跳过。
    fn parse_polyline_entity(
        &mut self,
        document: &mut Document,
    ) -> Result<Option<Entity>, DxfError> {
        let mut layer = None;
        let mut flags: i16 = 0;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    67 => self.read_space_flag(&value)?,
                    70 => flags = parse_i16(&value, "POLYLINE 标志（组码 70）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("POLYLINE 未正确结束")),
            }
        }

        if flags & 0x40 != 0 || flags & 0x10 != 0 {
            self.skip_polyline_sequence()?;
            document.record_skipped("POLYLINE(MESH)");
            return Ok(None);
        }

        let mut vertices: Vec<PolylineVertex> = Vec::new();
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => match value.trim() {
                    "VERTEX" => {
                        if let Some(vertex) = self.parse_polyline_vertex()? {
                            vertices.push(vertex);
                        }
                    }
                    "SEQEND" => {
                        self.skip_entity_body()?;
                        break;
                    }
                    _ => {
                        // 缺少 SEQEND 的文件：把下一个实体留给外层循环
                        self.reader.put_back((0, value));
                        break;
                    }
                },
                Some(_) => {
                    return Err(DxfError::invalid(
                        "POLYLINE 遇到无效的记录，期望 VERTEX/SEQEND",
                    ));
                }
                None => {
                    return Err(DxfError::invalid(
                        "POLYLINE 缺少 SEQEND（组码 0, 值为 SEQEND）",
                    ));
                }
            }
        }

        Ok(Some(Entity::Polyline(Polyline {
            vertices,
            is_closed: flags & 0x01 != 0,
            layer: layer_or_default(layer),
        })))
    }

    fn parse_polyline_vertex(&mut self) -> Result<Option<PolylineVertex>, DxfError> {
        let mut x = None;
        let mut y = None;
        let mut bulge = 0.0;
        let mut flags: i16 = 0;

        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    10 => assign_coord(&mut x, &value, "VERTEX X（组码 10）")?,
                    20 => assign_coord(&mut y, &value, "VERTEX Y（组码 20）")?,
                    42 => bulge = parse_f64(&value, "VERTEX bulge（组码 42）")?,
                    70 => flags = parse_i16(&value, "VERTEX 标志（组码 70）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("VERTEX 未正确结束")),
            }
        }

        // 样条拟合的控制框架点不属于实际轮廓
        if flags & 0x10 != 0 {
            return Ok(None);
        }

        let x = x.ok_or_else(|| DxfError::invalid("VERTEX 缺少 X（组码 10）"))?;
        let y = y.ok_or_else(|| DxfError::invalid("VERTEX 缺少 Y（组码 20）"))?;
        Ok(Some(PolylineVertex::with_bulge(Point2::new(x, y), bulge)))
    }

    fn skip_polyline_sequence(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => match value.trim() {
                    "VERTEX" => self.skip_entity_body()?,
                    "SEQEND" => {
                        self.skip_entity_body()?;
                        break;
                    }
                    _ => {
                        self.reader.put_back((0, value));
                        break;
                    }
                },
                Some(_) => continue,
                None => break,
            }
        }
        Ok(())
    }

    fn skip_entity_body(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some(_) => continue,
                None => break,
            }
        }
        Ok(())
    }
}

struct DxfReader<'a> {
    lines: std::str::Lines<'a>,
    buffer: Option<(i32, String)>,
    line_number: usize,
}

impl<'a> DxfReader<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.trim_start_matches('\u{feff}').lines(),
            buffer: None,
            line_number: 0,
        }
    }

    fn next_pair(&mut self) -> Result<Option<(i32, String)>, DxfError> {
        if let Some(pair) = self.buffer.take() {
            return Ok(Some(pair));
        }

        let code_line = loop {
            match self.lines.next() {
                Some(line) => {
                    self.line_number += 1;
                    // 文件末尾常见多余空行
                    if line.trim().is_empty() {
                        continue;
                    }
                    break line;
                }
                None => return Ok(None),
            }
        };

        let value_line = match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                line
            }
            None => {
                return Err(DxfError::invalid(format!(
                    "文件在第 {} 行结束，缺少与组码对应的值行",
                    self.line_number
                )));
            }
        };

        let code = code_line.trim().parse::<i32>().map_err(|_| {
            DxfError::invalid(format!(
                "第 {} 行的组码 \"{}\" 无法解析为整数",
                self.line_number - 1,
                code_line.trim()
            ))
        })?;
        let value = value_line.trim_end_matches('\r').to_string();
        Ok(Some((code, value)))
    }

    fn put_back(&mut self, pair: (i32, String)) {
        debug_assert!(self.buffer.is_none(), "DXF pair 只允许回退一次");
        self.buffer = Some(pair);
    }
}

fn layer_or_default(layer: Option<String>) -> String {
    match layer {
        Some(name) if !name.is_empty() => name,
        _ => "0".to_string(),
    }
}

fn assign_coord(slot: &mut Option<f64>, raw: &str, context: &str) -> Result<(), DxfError> {
    if slot.is_some() {
        return Err(DxfError::invalid(format!("{context} 出现重复值")));
    }
    *slot = Some(parse_f64(raw, context)?);
    Ok(())
}

fn parse_f64(raw: &str, context: &str) -> Result<f64, DxfError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))
}

fn parse_i32(raw: &str, context: &str) -> Result<i32, DxfError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))
}

fn parse_i16(raw: &str, context: &str) -> Result<i16, DxfError> {
    let value = parse_i32(raw, context)?;
    i16::try_from(value)
        .map_err(|_| DxfError::invalid(format!("{context} 超出 i16 范围（值：{value}）")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities_section(body: &str) -> String {
        format!("0\nSECTION\n2\nENTITIES\n{body}0\nENDSEC\n0\nEOF\n")
    }

    #[test]
    fn reader_skips_blank_trailing_lines_and_bom() {
        let source = format!("\u{feff}{}\n\n", entities_section(""));
        let doc = DxfFacade::new().parse_str(&source).expect("parse");
        assert_eq!(doc.entity_count(), 0);
    }

    #[test]
    fn missing_eof_is_rejected() {
        let source = "0\nSECTION\n2\nENTITIES\n0\nENDSEC\n";
        let err = DxfFacade::new().parse_str(source).unwrap_err();
        assert!(matches!(err, IoError::InvalidDocument(_)));
    }

    #[test]
    fn non_numeric_group_code_reports_line() {
        let source = "0\nSECTION\n2\nENTITIES\nabc\nLINE\n";
        match DxfFacade::new().parse_str(source) {
            Err(IoError::InvalidDocument(message)) => assert!(message.contains("第 5 行")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unsupported_entities_are_counted_not_fatal() {
        let body = "0\nTEXT\n8\nANNOT\n10\n1\n20\n2\n1\nHello\n0\nLINE\n10\n0\n20\n0\n11\n5\n21\n0\n";
        let doc = DxfFacade::new().parse_str(&entities_section(body)).expect("parse");
        assert_eq!(doc.entity_count(), 1);
        let skipped: Vec<_> = doc.skipped_entities().collect();
        assert_eq!(skipped, vec![("TEXT", 1)]);
    }

    #[test]
    fn paper_space_entities_are_counted_not_loaded() {
        let body = "0\nLINE\n8\nCUT\n10\n0\n20\n0\n11\n40\n21\n0\n\
0\nLINE\n67\n1\n8\nBORDER\n10\n0\n20\n0\n11\n400\n21\n0\n\
0\nLWPOLYLINE\n67\n1\n90\n2\n70\n0\n10\n0\n20\n0\n10\n5\n20\n5\n\
0\nPOLYLINE\n67\n1\n70\n1\n0\nVERTEX\n10\n0\n20\n0\n0\nVERTEX\n10\n9\n20\n0\n0\nSEQEND\n\
0\nCIRCLE\n67\n0\n10\n3\n20\n3\n40\n1\n";
        let doc = DxfFacade::new().parse_str(&entities_section(body)).expect("parse");
        let kinds: Vec<_> = doc.entities().map(|(_, e)| e.kind_name()).collect();
        assert_eq!(kinds, vec!["LINE", "CIRCLE"]);
        let skipped: Vec<_> = doc.skipped_entities().collect();
        assert_eq!(skipped, vec![(PAPER_SPACE, 3)]);
    }

    #[test]
    fn arc_with_negative_extrusion_is_mirrored() {
        let body = "0\nARC\n10\n-10\n20\n0\n40\n5\n50\n0\n51\n90\n210\n0\n220\n0\n230\n-1\n\
0\nARC\n10\n10\n20\n0\n40\n5\n50\n0\n51\n90\n";
        let doc = DxfFacade::new().parse_str(&entities_section(body)).expect("parse");
        let arcs: Vec<_> = doc
            .entities()
            .filter_map(|(_, entity)| match entity {
                Entity::Arc(arc) => Some(arc),
                _ => None,
            })
            .collect();
        assert!(arcs[0].mirrored);
        assert!(!arcs[1].mirrored);
        // OCS 圆心 (-10, 0) 对应世界坐标 (10, 0)，OCS 起点 (-5, 0) 对应世界坐标 (5, 0)
        let start = arcs[0].start_point();
        assert!((start.x() - 5.0).abs() < 1e-9, "{start:?}");
        assert!((start.y() - 0.0).abs() < 1e-9);
        assert!((arcs[1].start_point().x() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn line_missing_end_point_is_invalid() {
        let body = "0\nLINE\n10\n0\n20\n0\n";
        let err = DxfFacade::new()
            .parse_str(&entities_section(body))
            .unwrap_err();
        match err {
            IoError::InvalidDocument(message) => assert!(message.contains("LINE 缺少终点 X")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_layer_falls_back_to_zero() {
        assert_eq!(layer_or_default(Some(String::new())), "0");
        assert_eq!(layer_or_default(None), "0");
        assert_eq!(layer_or_default(Some("CUT".to_string())), "CUT");
    }
}
