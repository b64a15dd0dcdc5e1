//! 图纸比对流水线：图元提取、端点融合、形状描述、分类与评分。

pub mod analysis;
pub mod classify;
pub mod compare;
pub mod describe;
pub mod extract;
pub mod fuse;

pub use analysis::{DrawingAnalysis, analyze_document, compare_documents};
pub use classify::{ClassifiedSet, classify};
pub use compare::{ComparisonMetrics, ScoreBreakdown, compare_sets};
pub use describe::{ShapeDescriptor, ShapeType, describe_groups};
pub use extract::{Primitive, PrimitiveKind, extract_primitives};
pub use fuse::{ShapeGroup, UnionFind, fuse_primitives};
