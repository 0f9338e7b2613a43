//! Pivot nodes, stored in an arena per axis.
//!
//! A [`PivotTree`] owns every node of one axis (columns or rows). Nodes reference their parent
//! and children by [`NodeId`], so the tree has no reference cycles and ids stay valid for the
//! lifetime of the tree (nodes are never removed).
//!
//! Non-leaf aggregates are never patched in place: whenever a node receives a value, its own
//! aggregate (if it has children) and every ancestor's aggregate are rebuilt from the children's
//! current aggregates.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::aggregator::{Aggregator, AggregatorKind};
use crate::types::Value;

/// Handle to a node inside one [`PivotTree`].
///
/// Ids are handed out in creation order, which is also the insertion order used by
/// [`SortMode::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordering policy for the children of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Children ordered by key, smallest first.
    #[default]
    Ascending,
    /// Children ordered by key, largest first.
    Descending,
    /// Children kept in insertion order.
    None,
}

/// One grouping node.
#[derive(Debug, Clone)]
pub struct PivotNode {
    key: Value,
    title: String,
    aggregator: Aggregator,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    level: usize,
    sort_mode: SortMode,
}

impl PivotNode {
    pub fn key(&self) -> &Value {
        &self.key
    }

    /// Display label; the stringified key unless a title was given.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Depth below the root (root is 0).
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn result(&self) -> f64 {
        self.aggregator.result()
    }

    pub fn formatted_result(&self) -> f64 {
        self.aggregator.formatted_result()
    }
}

/// Arena holding one axis of a pivot table.
#[derive(Debug, Clone)]
pub struct PivotTree {
    kind: AggregatorKind,
    nodes: Vec<PivotNode>,
}

impl PivotTree {
    /// Tree with a single root node (null key, empty title).
    pub fn new(kind: AggregatorKind, sort_mode: SortMode) -> Self {
        let root = PivotNode {
            key: Value::Null,
            title: String::new(),
            aggregator: Aggregator::new(kind),
            children: Vec::new(),
            parent: None,
            level: 0,
            sort_mode,
        };
        Self {
            kind,
            nodes: vec![root],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn kind(&self) -> AggregatorKind {
        self.kind
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// `true` until the first child is added under the root.
    pub fn has_only_root(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Node for `id`, if it belongs to this tree.
    pub fn get(&self, id: NodeId) -> Option<&PivotNode> {
        self.nodes.get(id.0)
    }

    /// Node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &PivotNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn key(&self, id: NodeId) -> &Value {
        &self.node(id).key
    }

    pub fn title(&self, id: NodeId) -> &str {
        &self.node(id).title
    }

    pub fn level(&self, id: NodeId) -> usize {
        self.node(id).level
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).is_leaf()
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.node(id).is_root()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn result(&self, id: NodeId) -> f64 {
        self.node(id).result()
    }

    /// Keys from just below the root down to `id`; empty for the root.
    pub fn path(&self, id: NodeId) -> Vec<Value> {
        let mut path = Vec::with_capacity(self.level(id));
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            path.push(self.key(current).clone());
            current = parent;
        }
        path.reverse();
        path
    }

    /// Direct child of `parent` whose key equals `key`.
    pub fn find(&self, parent: NodeId, key: &Value) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.key(child) == key)
    }

    /// Follow `path` from the root, one level at a time.
    pub fn find_path(&self, path: &[Value]) -> Option<NodeId> {
        path.iter()
            .try_fold(self.root(), |node, key| self.find(node, key))
    }

    /// Create a child of `parent` keyed by `key`.
    ///
    /// The child starts with an empty aggregator of the tree's kind and inherits the parent's
    /// sort mode. `title` defaults to the stringified key. Siblings are re-sorted afterwards.
    /// The caller is responsible for not adding a key that already exists under `parent`.
    pub fn add(&mut self, parent: NodeId, key: Value, title: Option<String>) -> NodeId {
        self.insert_child(parent, key, title, Aggregator::new(self.kind))
    }

    /// Like [`PivotTree::add`], but the child's aggregator already holds `seed`.
    ///
    /// `parent` and every ancestor are rebuilt from their children, so the seed shows up in the
    /// rollup exactly as if it had been fed through [`PivotTree::add_value`].
    pub fn add_seeded(
        &mut self,
        parent: NodeId,
        key: Value,
        title: Option<String>,
        seed: f64,
    ) -> NodeId {
        let id = self.insert_child(parent, key, title, Aggregator::with_seed(self.kind, seed));
        let mut current = Some(parent);
        while let Some(node) = current {
            self.recompute(node);
            current = self.parent(node);
        }
        id
    }

    fn insert_child(
        &mut self,
        parent: NodeId,
        key: Value,
        title: Option<String>,
        aggregator: Aggregator,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent_node = self.node(parent);
        let node = PivotNode {
            title: title.unwrap_or_else(|| key.to_string()),
            key,
            aggregator,
            children: Vec::new(),
            parent: Some(parent),
            level: parent_node.level + 1,
            sort_mode: parent_node.sort_mode,
        };
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        self.sort_children(parent);
        id
    }

    /// Replace the display title of `id`.
    pub fn set_title(&mut self, id: NodeId, title: impl Into<String>) {
        self.nodes[id.0].title = title.into();
    }

    /// Feed `value` into `id`, then rebuild the aggregates of `id` (if it has children) and of
    /// every ancestor from their children.
    pub fn add_value(&mut self, id: NodeId, value: f64) {
        self.nodes[id.0].aggregator.add(value);
        if !self.is_leaf(id) {
            self.recompute(id);
        }

        let mut parent = self.parent(id);
        while let Some(current) = parent {
            self.recompute(current);
            parent = self.parent(current);
        }
    }

    fn recompute(&mut self, id: NodeId) {
        let mut aggregator = Aggregator::new(self.kind);
        for child in &self.nodes[id.0].children {
            aggregator.merge(&self.nodes[child.0].aggregator);
        }
        self.nodes[id.0].aggregator = aggregator;
    }

    /// Change the sort mode of `id`, re-sorting its children if the mode changed.
    pub fn set_sort_mode(&mut self, id: NodeId, mode: SortMode) {
        if self.nodes[id.0].sort_mode == mode {
            return;
        }
        self.nodes[id.0].sort_mode = mode;
        self.sort_children(id);
    }

    /// Apply `mode` to `id` and all of its descendants.
    pub fn set_sort_mode_recursive(&mut self, id: NodeId, mode: SortMode) {
        for node in self.descendants(id) {
            self.set_sort_mode(node, mode);
        }
    }

    fn sort_children(&mut self, id: NodeId) {
        let mut children = std::mem::take(&mut self.nodes[id.0].children);
        let nodes = &self.nodes;
        let by_key = |a: &NodeId, b: &NodeId| sibling_cmp(&nodes[a.0].key, &nodes[b.0].key);
        // Ties fall back to creation order in both directions.
        match nodes[id.0].sort_mode {
            SortMode::Ascending => children.sort_by(|a, b| by_key(a, b).then(a.cmp(b))),
            SortMode::Descending => children.sort_by(|a, b| by_key(b, a).then(a.cmp(b))),
            SortMode::None => children.sort(),
        }
        self.nodes[id.0].children = children;
    }

    /// `id` and everything below it, depth-first pre-order in child order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Leaves under `id` in display order.
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&node| self.is_leaf(node))
            .collect()
    }
}

/// Display order of two sibling keys.
///
/// Integers and floats compare by numeric value only, so `Int64(1)` and `Float64(1.0)` tie and
/// keep their insertion order. Everything else follows [`Value`]'s total order.
fn sibling_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int64(x), Value::Float64(y)) => (*x as f64).total_cmp(y),
        (Value::Float64(x), Value::Int64(y)) => x.total_cmp(&(*y as f64)),
        _ => a.cmp(b),
    }
}
