//! Pivot table construction.
//!
//! [`PivotTableBuilder`] scans a [`DataSet`] once, in order. For every record it walks the
//! column fields and the row fields level by level (creating missing nodes), feeds the record's
//! value into the column leaf, the row leaf, the matching cell and the grand total.
//!
//! An unconfigured or empty build is not an error: [`PivotTableBuilder::build`] returns `None`.
//!
//! ```rust
//! use rust_pivot_table::builder::PivotTableBuilder;
//! use rust_pivot_table::types::{DataSet, DataType, Field, Schema, Value};
//!
//! # fn main() -> Result<(), rust_pivot_table::PivotError> {
//! let schema = Schema::new(vec![
//!     Field::new("region", DataType::Utf8),
//!     Field::new("amount", DataType::Float64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::from("west"), Value::Float64(10.0)],
//!         vec![Value::from("east"), Value::Float64(7.0)],
//!     ],
//! );
//!
//! let table = PivotTableBuilder::new(&ds)
//!     .column_field_names(["region"])?
//!     .row_field_names(["region"])?
//!     .data_field_name("amount")?
//!     .build()
//!     .expect("non-empty dataset");
//! assert_eq!(table.result(), 17.0);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use rustc_hash::FxHashSet;

use crate::aggregator::AggregatorKind;
use crate::error::PivotResult;
use crate::field::{ColumnField, FieldExtractor};
use crate::node::{NodeId, PivotTree, SortMode};
use crate::observer::{Axis, BuildEvent, BuildMetrics, BuildObserver, SkipReason};
use crate::table::{PivotTable, DEFAULT_PATH_SEPARATOR};
use crate::types::{DataSet, Value};

/// Separator placed between field labels in root titles unless configured otherwise.
pub const DEFAULT_FIELD_SEPARATOR: &str = " / ";

/// Presentation and reporting options for a build.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct PivotOptions {
    /// Initial sort mode of both trees (children inherit it).
    pub sort_mode: SortMode,
    /// Separator used in exported path strings.
    pub path_separator: char,
    /// Separator between field labels in the root titles.
    pub field_separator: String,
    /// Table title.
    pub title: Option<String>,
    /// Label for the grand total.
    pub total_title: Option<String>,
    /// Optional observer for build events.
    pub observer: Option<Arc<dyn BuildObserver>>,
}

impl fmt::Debug for PivotOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PivotOptions")
            .field("sort_mode", &self.sort_mode)
            .field("path_separator", &self.path_separator)
            .field("field_separator", &self.field_separator)
            .field("title", &self.title)
            .field("total_title", &self.total_title)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl Default for PivotOptions {
    fn default() -> Self {
        Self {
            sort_mode: SortMode::default(),
            path_separator: DEFAULT_PATH_SEPARATOR,
            field_separator: DEFAULT_FIELD_SEPARATOR.to_string(),
            title: None,
            total_title: None,
            observer: None,
        }
    }
}

/// Configures and runs a pivot build over a borrowed dataset.
pub struct PivotTableBuilder<'a> {
    dataset: &'a DataSet,
    unique_field: Option<Box<dyn FieldExtractor>>,
    data_field: Option<Box<dyn FieldExtractor>>,
    column_fields: Vec<Box<dyn FieldExtractor>>,
    row_fields: Vec<Box<dyn FieldExtractor>>,
    kind: AggregatorKind,
    options: PivotOptions,
    metrics: Arc<BuildMetrics>,
}

impl fmt::Debug for PivotTableBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = |fields: &[Box<dyn FieldExtractor>]| {
            fields.iter().map(|f| f.label().to_string()).collect::<Vec<_>>()
        };
        f.debug_struct("PivotTableBuilder")
            .field("rows_in_dataset", &self.dataset.row_count())
            .field("unique_field", &self.unique_field.as_ref().map(|f| f.label().to_string()))
            .field("data_field", &self.data_field.as_ref().map(|f| f.label().to_string()))
            .field("column_fields", &labels(&self.column_fields))
            .field("row_fields", &labels(&self.row_fields))
            .field("kind", &self.kind)
            .field("options", &self.options)
            .finish()
    }
}

impl<'a> PivotTableBuilder<'a> {
    /// Builder over `dataset` with no fields configured and a Sum aggregator.
    pub fn new(dataset: &'a DataSet) -> Self {
        Self {
            dataset,
            unique_field: None,
            data_field: None,
            column_fields: Vec::new(),
            row_fields: Vec::new(),
            kind: AggregatorKind::default(),
            options: PivotOptions::default(),
            metrics: Arc::new(BuildMetrics::new()),
        }
    }

    /// Field whose numeric value is aggregated.
    pub fn data_field(mut self, field: impl FieldExtractor + 'static) -> Self {
        self.data_field = Some(Box::new(field));
        self
    }

    pub fn data_field_name(self, name: &str) -> PivotResult<Self> {
        let field = ColumnField::resolve(&self.dataset.schema, name)?;
        Ok(self.data_field(field))
    }

    /// Field identifying a logical record; later records with an already-seen key are skipped.
    pub fn unique_field(mut self, field: impl FieldExtractor + 'static) -> Self {
        self.unique_field = Some(Box::new(field));
        self
    }

    pub fn unique_field_name(self, name: &str) -> PivotResult<Self> {
        let field = ColumnField::resolve(&self.dataset.schema, name)?;
        Ok(self.unique_field(field))
    }

    /// Append one column grouping level.
    pub fn column_field(mut self, field: impl FieldExtractor + 'static) -> Self {
        self.column_fields.push(Box::new(field));
        self
    }

    /// Append column grouping levels by schema name.
    ///
    /// Fails on the first name missing from the schema.
    pub fn column_field_names<I, S>(mut self, names: I) -> PivotResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let field = ColumnField::resolve(&self.dataset.schema, name.as_ref())?;
            self.column_fields.push(Box::new(field));
        }
        Ok(self)
    }

    /// Append one row grouping level.
    pub fn row_field(mut self, field: impl FieldExtractor + 'static) -> Self {
        self.row_fields.push(Box::new(field));
        self
    }

    /// Append row grouping levels by schema name.
    pub fn row_field_names<I, S>(mut self, names: I) -> PivotResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let field = ColumnField::resolve(&self.dataset.schema, name.as_ref())?;
            self.row_fields.push(Box::new(field));
        }
        Ok(self)
    }

    pub fn aggregator(mut self, kind: AggregatorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Select the aggregator by name (`sum`, `count`, `average`).
    pub fn aggregator_name(self, name: &str) -> PivotResult<Self> {
        let kind = name.parse::<AggregatorKind>()?;
        Ok(self.aggregator(kind))
    }

    pub fn options(mut self, options: PivotOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach an observer for build events.
    pub fn with_observer(mut self, observer: Arc<dyn BuildObserver>) -> Self {
        self.options.observer = Some(observer);
        self
    }

    /// Handle to the counters of the most recent build.
    pub fn metrics(&self) -> Arc<BuildMetrics> {
        Arc::clone(&self.metrics)
    }

    fn skip_reason(&self) -> Option<SkipReason> {
        if self.dataset.is_empty() {
            Some(SkipReason::EmptyDataSet)
        } else if self.column_fields.is_empty() {
            Some(SkipReason::MissingColumnFields)
        } else if self.row_fields.is_empty() {
            Some(SkipReason::MissingRowFields)
        } else if self.data_field.is_none() {
            Some(SkipReason::MissingDataField)
        } else {
            None
        }
    }

    /// Run the build.
    ///
    /// Returns `None` when the dataset is empty or the column fields, row fields or data field
    /// are unset.
    pub fn build(&self) -> Option<PivotTable> {
        let start = Instant::now();
        self.metrics.begin_run();

        if let Some(reason) = self.skip_reason() {
            self.emit(BuildEvent::BuildSkipped { reason });
            return None;
        }
        let data_field = self.data_field.as_deref()?;

        self.emit(BuildEvent::BuildStarted {
            records: self.dataset.row_count(),
        });

        let mut table = PivotTable::new(self.kind, self.options.sort_mode)
            .with_title(self.options.title.clone())
            .with_total_title(self.options.total_title.clone())
            .with_path_separator(self.options.path_separator);
        let mut seen: FxHashSet<Value> = FxHashSet::default();

        for (row_idx, record) in self.dataset.records().enumerate() {
            self.metrics.on_record_scanned();

            if let Some(unique) = &self.unique_field {
                let key = unique.key(record);
                if seen.contains(&key) {
                    self.metrics.on_duplicate_skipped();
                    self.emit(BuildEvent::DuplicateSkipped { row: row_idx, key });
                    continue;
                }
                seen.insert(key);
            }

            let value = data_field.value(record);

            let column =
                self.descend(table.columns_mut(), Axis::Column, &self.column_fields, record);
            table.columns_mut().add_value(column, value);

            let row = self.descend(table.rows_mut(), Axis::Row, &self.row_fields, record);
            table.rows_mut().add_value(row, value);

            if let Some(cell) = table.find_cell_by_node_mut(column, row) {
                cell.add_value(value);
            } else {
                let cell = table.add_cell_value(column, row, value);
                let event = BuildEvent::CellCreated {
                    column_path: cell.column_path().to_vec(),
                    row_path: cell.row_path().to_vec(),
                };
                self.metrics.on_cell_created();
                self.emit(event);
            }

            table.add_value(value);
        }

        let column_root = table.column();
        let column_title = self.join_labels(&self.column_fields);
        table.columns_mut().set_title(column_root, column_title);
        let row_root = table.row();
        let row_title = self.join_labels(&self.row_fields);
        table.rows_mut().set_title(row_root, row_title);

        let elapsed = start.elapsed();
        self.metrics.end_run(elapsed);
        self.emit(BuildEvent::BuildFinished {
            elapsed,
            metrics: self.metrics.snapshot(),
        });

        Some(table)
    }

    /// Walk `fields` from the root of `tree`, creating missing levels; returns the leaf reached.
    fn descend(
        &self,
        tree: &mut PivotTree,
        axis: Axis,
        fields: &[Box<dyn FieldExtractor>],
        record: &[Value],
    ) -> NodeId {
        let mut node = tree.root();
        for field in fields {
            let key = field.key(record);
            node = match tree.find(node, &key) {
                Some(child) => child,
                None => {
                    let child = tree.add(node, key.clone(), Some(field.title(record)));
                    self.metrics.on_node_created();
                    self.emit(BuildEvent::NodeCreated {
                        axis,
                        level: tree.level(child),
                        key,
                    });
                    child
                }
            };
        }
        node
    }

    fn join_labels(&self, fields: &[Box<dyn FieldExtractor>]) -> String {
        fields
            .iter()
            .map(|f| f.label())
            .collect::<Vec<_>>()
            .join(&self.options.field_separator)
    }

    fn emit(&self, event: BuildEvent) {
        if let Some(obs) = &self.options.observer {
            obs.on_event(&event);
        }
    }
}
