use std::collections::HashMap;

use nestscore_core::geometry::Point2;
use tracing::debug;

use crate::extract::Primitive;

/// 以图元下标为节点的并查集，带路径压缩。
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn find(&mut self, index: usize) -> usize {
        let mut root = index;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = index;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// 把 `i` 所在集合挂到 `j` 的根下，返回是否发生合并。
    pub fn union(&mut self, i: usize, j: usize) -> bool {
        let root_i = self.find(i);
        let root_j = self.find(j);
        if root_i == root_j {
            return false;
        }
        self.parent[root_i] = root_j;
        true
    }
}

/// 量化后的端点坐标，按 `round(v * 10^decimals)` 取整。
pub type EndpointKey = (i64, i64);

pub fn endpoint_key(point: Point2, decimals: u32) -> EndpointKey {
    let scale = 10f64.powi(decimals as i32);
    (
        (point.x() * scale).round() as i64,
        (point.y() * scale).round() as i64,
    )
}

/// 通过共享端点连通的一组图元。
#[derive(Debug, Clone)]
pub struct ShapeGroup<'a> {
    pub id: usize,
    pub members: Vec<&'a Primitive>,
}

impl ShapeGroup<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// 按首尾端点把图元合并为连通分组。
///
/// 每个端点键只记录最近一次出现的图元下标，新图元与该下标合并。
/// 输出按各组首个成员的输入位置排序，`id` 即该序号。
pub fn fuse_primitives(primitives: &[Primitive], decimals: u32) -> Vec<ShapeGroup<'_>> {
    let mut sets = UnionFind::new(primitives.len());
    let mut owners: HashMap<EndpointKey, usize> = HashMap::new();

    for (index, primitive) in primitives.iter().enumerate() {
        let (Some(first), Some(last)) = (primitive.first_point(), primitive.last_point()) else {
            continue;
        };
        for key in [endpoint_key(first, decimals), endpoint_key(last, decimals)] {
            if let Some(&owner) = owners.get(&key) {
                sets.union(index, owner);
            }
            owners.insert(key, index);
        }
    }

    let mut slots: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<ShapeGroup<'_>> = Vec::new();
    for (index, primitive) in primitives.iter().enumerate() {
        if primitive.points.is_empty() {
            continue;
        }
        let root = sets.find(index);
        let position = *slots.entry(root).or_insert_with(|| {
            groups.push(ShapeGroup {
                id: groups.len(),
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[position].members.push(primitive);
    }

    debug!(
        primitives = primitives.len(),
        groups = groups.len(),
        decimals,
        "端点融合完成"
    );
    groups
}
