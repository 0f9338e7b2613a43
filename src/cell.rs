//! Intersection cells.

use crate::aggregator::{Aggregator, AggregatorKind};
use crate::node::NodeId;
use crate::types::Value;

static NULL_KEY: Value = Value::Null;

/// Aggregate at the intersection of one column leaf and one row leaf.
///
/// The cell references its nodes by id and keeps a copy of their paths, so the node, key and
/// path identity checks all answer the same question without needing the trees.
#[derive(Debug, Clone)]
pub struct PivotCell {
    column: NodeId,
    row: NodeId,
    column_path: Vec<Value>,
    row_path: Vec<Value>,
    aggregator: Aggregator,
}

impl PivotCell {
    pub(crate) fn new(
        kind: AggregatorKind,
        column: NodeId,
        row: NodeId,
        column_path: Vec<Value>,
        row_path: Vec<Value>,
        value: f64,
    ) -> Self {
        Self {
            column,
            row,
            column_path,
            row_path,
            aggregator: Aggregator::with_seed(kind, value),
        }
    }

    pub fn column(&self) -> NodeId {
        self.column
    }

    pub fn row(&self) -> NodeId {
        self.row
    }

    pub fn column_path(&self) -> &[Value] {
        &self.column_path
    }

    pub fn row_path(&self) -> &[Value] {
        &self.row_path
    }

    /// Key of the column leaf (`Null` when the cell sits on the root).
    pub fn column_key(&self) -> &Value {
        self.column_path.last().unwrap_or(&NULL_KEY)
    }

    pub fn row_key(&self) -> &Value {
        self.row_path.last().unwrap_or(&NULL_KEY)
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn equals_node(&self, column: NodeId, row: NodeId) -> bool {
        self.column == column && self.row == row
    }

    pub fn equals_key(&self, column_key: &Value, row_key: &Value) -> bool {
        self.column_key() == column_key && self.row_key() == row_key
    }

    pub fn equals_path(&self, column_path: &[Value], row_path: &[Value]) -> bool {
        self.column_path == column_path && self.row_path == row_path
    }

    /// Feed the cell's own aggregator; node aggregates are untouched.
    pub fn add_value(&mut self, value: f64) {
        self.aggregator.add(value);
    }

    pub fn result(&self) -> f64 {
        self.aggregator.result()
    }

    pub fn formatted_result(&self) -> f64 {
        self.aggregator.formatted_result()
    }
}
