//! Field extractors: how a record maps to a grouping key, a label and a number.

use std::fmt;

use crate::error::{PivotError, PivotResult};
use crate::types::{Schema, Value};

/// Reads one field out of a record.
///
/// Used both for grouping fields (key + title) and for the data field (numeric value).
pub trait FieldExtractor {
    /// Header label for the field itself (used for root titles).
    fn label(&self) -> &str;

    /// Grouping key of `record` for this field.
    fn key(&self, record: &[Value]) -> Value;

    /// Human-readable label for the key of `record`.
    fn title(&self, record: &[Value]) -> String {
        self.key(record).to_string()
    }

    /// Numeric measurement of `record`. Missing or non-numeric values read as `0`.
    fn value(&self, record: &[Value]) -> f64 {
        self.key(record).as_f64().unwrap_or(0.0)
    }
}

/// A schema column, resolved to its index when configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnField {
    name: String,
    index: usize,
    label: Option<String>,
}

impl ColumnField {
    /// Resolve `name` against `schema`.
    pub fn resolve(schema: &Schema, name: &str) -> PivotResult<Self> {
        let index = schema.index_of(name).ok_or_else(|| PivotError::UnknownField {
            field: name.to_string(),
        })?;
        Ok(Self {
            name: name.to_string(),
            index,
            label: None,
        })
    }

    /// Use `label` as the header label instead of the column name.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl FieldExtractor for ColumnField {
    fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    fn key(&self, record: &[Value]) -> Value {
        record.get(self.index).cloned().unwrap_or(Value::Null)
    }
}

type KeyFn = Box<dyn Fn(&[Value]) -> Value>;
type TitleFn = Box<dyn Fn(&[Value]) -> String>;
type ValueFn = Box<dyn Fn(&[Value]) -> f64>;

/// A computed field: key, title and value come from closures.
///
/// Handy for derived groupings (e.g. bucketing a date or a number) that are not a plain column.
pub struct FnField {
    label: String,
    key: KeyFn,
    title: Option<TitleFn>,
    value: Option<ValueFn>,
}

impl FnField {
    pub fn new<F>(label: impl Into<String>, key: F) -> Self
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        Self {
            label: label.into(),
            key: Box::new(key),
            title: None,
            value: None,
        }
    }

    /// Override the key title.
    pub fn with_title<F>(mut self, title: F) -> Self
    where
        F: Fn(&[Value]) -> String + 'static,
    {
        self.title = Some(Box::new(title));
        self
    }

    /// Override the numeric reading.
    pub fn with_value<F>(mut self, value: F) -> Self
    where
        F: Fn(&[Value]) -> f64 + 'static,
    {
        self.value = Some(Box::new(value));
        self
    }
}

impl fmt::Debug for FnField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnField")
            .field("label", &self.label)
            .field("title_set", &self.title.is_some())
            .field("value_set", &self.value.is_some())
            .finish()
    }
}

impl FieldExtractor for FnField {
    fn label(&self) -> &str {
        &self.label
    }

    fn key(&self, record: &[Value]) -> Value {
        (self.key)(record)
    }

    fn title(&self, record: &[Value]) -> String {
        match &self.title {
            Some(title) => title(record),
            None => self.key(record).to_string(),
        }
    }

    fn value(&self, record: &[Value]) -> f64 {
        match &self.value {
            Some(value) => value(record),
            None => self.key(record).as_f64().unwrap_or(0.0),
        }
    }
}
