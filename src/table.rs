//! The built pivot table: two axis trees, the cells and the grand total.

use rustc_hash::FxHashMap;

use crate::aggregator::{Aggregator, AggregatorKind};
use crate::cell::PivotCell;
use crate::node::{NodeId, PivotTree, SortMode};
use crate::types::Value;

/// Separator used in exported path strings unless configured otherwise.
pub const DEFAULT_PATH_SEPARATOR: char = '/';

/// Cross-tabulation of a dataset along a column tree and a row tree.
#[derive(Debug, Clone)]
pub struct PivotTable {
    kind: AggregatorKind,
    columns: PivotTree,
    rows: PivotTree,
    cells: Vec<PivotCell>,
    cell_index: FxHashMap<(NodeId, NodeId), usize>,
    aggregator: Aggregator,
    title: Option<String>,
    total_title: Option<String>,
    path_separator: char,
}

impl PivotTable {
    /// Empty table: bare roots, no cells, zero total.
    pub fn new(kind: AggregatorKind, sort_mode: SortMode) -> Self {
        Self {
            kind,
            columns: PivotTree::new(kind, sort_mode),
            rows: PivotTree::new(kind, sort_mode),
            cells: Vec::new(),
            cell_index: FxHashMap::default(),
            aggregator: Aggregator::new(kind),
            title: None,
            total_title: None,
            path_separator: DEFAULT_PATH_SEPARATOR,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_total_title(mut self, total_title: Option<String>) -> Self {
        self.total_title = total_title;
        self
    }

    pub fn with_path_separator(mut self, separator: char) -> Self {
        self.path_separator = separator;
        self
    }

    pub fn kind(&self) -> AggregatorKind {
        self.kind
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn total_title(&self) -> Option<&str> {
        self.total_title.as_deref()
    }

    pub fn path_separator(&self) -> char {
        self.path_separator
    }

    /// Root of the column tree.
    pub fn column(&self) -> NodeId {
        self.columns.root()
    }

    /// Root of the row tree.
    pub fn row(&self) -> NodeId {
        self.rows.root()
    }

    pub fn columns(&self) -> &PivotTree {
        &self.columns
    }

    pub fn rows(&self) -> &PivotTree {
        &self.rows
    }

    pub fn columns_mut(&mut self) -> &mut PivotTree {
        &mut self.columns
    }

    pub fn rows_mut(&mut self) -> &mut PivotTree {
        &mut self.rows
    }

    /// Column leaves in display order.
    pub fn column_leaves(&self) -> Vec<NodeId> {
        self.columns.leaves(self.columns.root())
    }

    /// Row leaves in display order.
    pub fn row_leaves(&self) -> Vec<NodeId> {
        self.rows.leaves(self.rows.root())
    }

    /// Cells in creation order.
    pub fn cells(&self) -> &[PivotCell] {
        &self.cells
    }

    pub fn find_cell_by_node(&self, column: NodeId, row: NodeId) -> Option<&PivotCell> {
        self.cell_index
            .get(&(column, row))
            .map(|&idx| &self.cells[idx])
    }

    pub fn find_cell_by_node_mut(&mut self, column: NodeId, row: NodeId) -> Option<&mut PivotCell> {
        let idx = *self.cell_index.get(&(column, row))?;
        self.cells.get_mut(idx)
    }

    /// First cell whose leaf keys equal `column_key` and `row_key`.
    ///
    /// Keys are only unique among siblings, so with several grouping levels prefer
    /// [`Self::find_cell_by_path`].
    pub fn find_cell_by_key(&self, column_key: &Value, row_key: &Value) -> Option<&PivotCell> {
        self.cells
            .iter()
            .find(|cell| cell.equals_key(column_key, row_key))
    }

    pub fn find_cell_by_path(
        &self,
        column_path: &[Value],
        row_path: &[Value],
    ) -> Option<&PivotCell> {
        self.cells
            .iter()
            .find(|cell| cell.equals_path(column_path, row_path))
    }

    /// Intersection value for a pair of nodes; `0` when no record produced that pair.
    pub fn cell_result(&self, column: NodeId, row: NodeId) -> f64 {
        self.find_cell_by_node(column, row)
            .map(PivotCell::result)
            .unwrap_or(0.0)
    }

    /// Register a cell for (`column`, `row`) seeded with `value`.
    ///
    /// A pair never gets a second cell: if one exists already, `value` is added to it.
    pub fn add_cell_value(&mut self, column: NodeId, row: NodeId, value: f64) -> &mut PivotCell {
        if let Some(&idx) = self.cell_index.get(&(column, row)) {
            let cell = &mut self.cells[idx];
            cell.add_value(value);
            return cell;
        }

        let cell = PivotCell::new(
            self.kind,
            column,
            row,
            self.columns.path(column),
            self.rows.path(row),
            value,
        );
        let idx = self.cells.len();
        self.cells.push(cell);
        self.cell_index.insert((column, row), idx);
        &mut self.cells[idx]
    }

    /// Feed the grand total only.
    pub fn add_value(&mut self, value: f64) {
        self.aggregator.add(value);
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Grand total.
    pub fn result(&self) -> f64 {
        self.aggregator.result()
    }

    pub fn formatted_result(&self) -> f64 {
        self.aggregator.formatted_result()
    }

    /// Path string of `id` in `tree`: the separator, then the keys joined by the separator.
    pub fn path_string(&self, tree: &PivotTree, id: NodeId) -> String {
        let sep = self.path_separator.to_string();
        let keys: Vec<String> = tree.path(id).iter().map(Value::to_string).collect();
        format!("{sep}{}", keys.join(&sep))
    }
}
