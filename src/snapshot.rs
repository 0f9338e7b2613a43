//! Serializable, write-only export of a built [`PivotTable`].
//!
//! Shape:
//!
//! ```text
//! table: { title?, aggregatorKind, value?, column: node, row: node, cells: [cell] }
//! node:  { key?, title?, value?, children?: [node] }
//! cell:  { col: "/k1/k2", row: "/k1", value }
//! ```
//!
//! Falsy keys and titles, zero values and empty child lists are left out.

use serde::Serialize;

use crate::aggregator::AggregatorKind;
use crate::error::PivotResult;
use crate::node::{NodeId, PivotTree};
use crate::table::PivotTable;
use crate::types::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub aggregator_kind: AggregatorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub column: NodeSnapshot,
    pub row: NodeSnapshot,
    pub cells: Vec<CellSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeSnapshot>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellSnapshot {
    pub col: String,
    pub row: String,
    pub value: f64,
}

fn non_zero(value: f64) -> Option<f64> {
    (value != 0.0).then_some(value)
}

fn node_snapshot(tree: &PivotTree, id: NodeId) -> NodeSnapshot {
    let node = tree.node(id);
    let children: Option<Vec<NodeSnapshot>> = (!node.is_leaf()).then(|| {
        node.children()
            .iter()
            .map(|&child| node_snapshot(tree, child))
            .collect()
    });

    NodeSnapshot {
        key: (!node.key().is_falsy()).then(|| node.key().clone()),
        title: (!node.title().is_empty()).then(|| node.title().to_string()),
        value: non_zero(node.formatted_result()),
        children,
    }
}

impl PivotTable {
    /// Structural snapshot of the table, ready for serialization.
    pub fn snapshot(&self) -> TableSnapshot {
        let cells = self
            .cells()
            .iter()
            .map(|cell| CellSnapshot {
                col: self.path_string(self.columns(), cell.column()),
                row: self.path_string(self.rows(), cell.row()),
                value: cell.formatted_result(),
            })
            .collect();

        TableSnapshot {
            title: self.title().map(str::to_string),
            aggregator_kind: self.kind(),
            value: non_zero(self.formatted_result()),
            column: node_snapshot(self.columns(), self.column()),
            row: node_snapshot(self.rows(), self.row()),
            cells,
        }
    }

    /// Compact JSON export.
    pub fn to_json(&self) -> PivotResult<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Indented JSON export.
    pub fn to_json_pretty(&self) -> PivotResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}
