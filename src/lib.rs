//! `rust-pivot-table` builds pivot tables (cross-tabulations) over an in-memory
//! [`types::DataSet`].
//!
//! A pivot groups records along two independent hierarchies, columns and rows, and keeps a
//! running aggregate (sum, count or average) on every grouping node, on every
//! column-leaf × row-leaf intersection ([`cell::PivotCell`]) and for the whole table.
//!
//! The primary entrypoint is [`builder::PivotTableBuilder`].
//!
//! ## Quick example
//!
//! ```rust
//! use rust_pivot_table::aggregator::AggregatorKind;
//! use rust_pivot_table::builder::PivotTableBuilder;
//! use rust_pivot_table::types::{DataSet, DataType, Field, Schema, Value};
//!
//! # fn main() -> Result<(), rust_pivot_table::PivotError> {
//! let schema = Schema::new(vec![
//!     Field::new("region", DataType::Utf8),
//!     Field::new("month", DataType::Utf8),
//!     Field::new("amount", DataType::Int64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::from("west"), Value::from("Jan"), Value::Int64(10)],
//!         vec![Value::from("west"), Value::from("Jan"), Value::Int64(5)],
//!         vec![Value::from("east"), Value::from("Feb"), Value::Int64(7)],
//!     ],
//! );
//!
//! let table = PivotTableBuilder::new(&ds)
//!     .column_field_names(["region"])?
//!     .row_field_names(["month"])?
//!     .data_field_name("amount")?
//!     .aggregator(AggregatorKind::Sum)
//!     .build()
//!     .expect("dataset is not empty");
//!
//! let west = table.columns().find(table.column(), &Value::from("west")).unwrap();
//! let jan = table.rows().find(table.row(), &Value::from("Jan")).unwrap();
//! assert_eq!(table.columns().result(west), 15.0);
//! assert_eq!(table.cell_result(west, jan), 15.0);
//! assert_eq!(table.result(), 22.0);
//!
//! // Serializable snapshot for renderers.
//! let json = table.to_json()?;
//! assert!(json.contains(r#""col":"/west""#));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: schema + in-memory dataset types
//! - [`aggregator`]: sum/count/average accumulators
//! - [`field`]: field extractors (schema columns and computed fields)
//! - [`node`]: grouping nodes and the per-axis arena
//! - [`cell`]: intersection cells
//! - [`table`]: the built table
//! - [`builder`]: build configuration and the single-pass build
//! - [`definition`]: name-based configuration loadable from JSON
//! - [`snapshot`]: serializable export
//! - [`observer`]: build events and metrics
//! - [`error`]: error types

pub mod aggregator;
pub mod builder;
pub mod cell;
pub mod definition;
pub mod error;
pub mod field;
pub mod node;
pub mod observer;
pub mod snapshot;
pub mod table;
pub mod types;

pub use error::{PivotError, PivotResult};
