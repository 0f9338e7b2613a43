//! Name-based, serializable pivot configuration.
//!
//! A [`PivotDefinition`] describes a pivot by field names and an aggregator name, e.g. as stored
//! next to a saved report:
//!
//! ```json
//! { "columns": ["region"], "rows": ["month"], "data": "amount",
//!   "unique": "id", "aggregator": "sum", "sortMode": "descending" }
//! ```
//!
//! Names are resolved against the dataset schema by [`PivotTableBuilder::from_definition`], so
//! an unknown field or aggregator is reported before any build runs.

use serde::{Deserialize, Serialize};

use crate::aggregator::AggregatorKind;
use crate::builder::{PivotOptions, PivotTableBuilder};
use crate::error::PivotResult;
use crate::node::SortMode;
use crate::types::DataSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PivotDefinition {
    /// Column grouping fields, outermost first.
    pub columns: Vec<String>,
    /// Row grouping fields, outermost first.
    pub rows: Vec<String>,
    /// Numeric field to aggregate.
    pub data: Option<String>,
    /// Optional dedup field.
    pub unique: Option<String>,
    /// Aggregator name; Sum when absent.
    pub aggregator: Option<String>,
    pub sort_mode: Option<SortMode>,
    pub title: Option<String>,
    pub total_title: Option<String>,
}

impl PivotDefinition {
    pub fn from_json(input: &str) -> PivotResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json(&self) -> PivotResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<'a> PivotTableBuilder<'a> {
    /// Builder configured from `definition`, with names resolved against `dataset`.
    ///
    /// Missing `data`, `columns` or `rows` are not errors here; the build then yields no table.
    pub fn from_definition(
        dataset: &'a DataSet,
        definition: &PivotDefinition,
    ) -> PivotResult<Self> {
        let kind = match &definition.aggregator {
            Some(name) => name.parse::<AggregatorKind>()?,
            None => AggregatorKind::default(),
        };

        let mut builder = PivotTableBuilder::new(dataset)
            .aggregator(kind)
            .options(PivotOptions {
                sort_mode: definition.sort_mode.unwrap_or_default(),
                title: definition.title.clone(),
                total_title: definition.total_title.clone(),
                ..Default::default()
            })
            .column_field_names(&definition.columns)?
            .row_field_names(&definition.rows)?;

        if let Some(data) = &definition.data {
            builder = builder.data_field_name(data)?;
        }
        if let Some(unique) = &definition.unique {
            builder = builder.unique_field_name(unique)?;
        }
        Ok(builder)
    }
}
