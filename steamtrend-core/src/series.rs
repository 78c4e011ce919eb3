//! Time-series domain types.
//!
//! Raw observations come in as `TimeSeriesPoint`s (player counts) or
//! `PricePoint`s (market history). After alignment every entity becomes a
//! column of an `AlignedTable` sharing one monthly axis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Steam application identifier.
pub type AppId = u32;

/// A single observation: milliseconds since the Unix epoch and a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// One row of a market item's price history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub price: f64,
    pub volume: u64,
}

/// Ordered observations for one entity (a game or a market item).
///
/// Points are assumed to be increasing by timestamp; the aligner does not
/// depend on it.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySeries {
    pub label: String,
    pub points: Vec<TimeSeriesPoint>,
}

impl EntitySeries {
    pub fn new(label: impl Into<String>, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("column '{label}' has {actual} cells but the axis has {expected}")]
    LengthMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column label '{0}'")]
    DuplicateLabel(String),
}

/// One entity's values on the shared axis. `None` means absent, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesColumn {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

/// Wide table of entity columns over a monthly axis.
///
/// Each axis entry is the last calendar day of its month. Every column has
/// exactly one cell per axis entry. Deserialization goes through
/// [`AlignedTable::new`], so a saved table is checked the same way.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "TableParts")]
pub struct AlignedTable {
    pub(crate) axis: Vec<NaiveDate>,
    pub(crate) columns: Vec<SeriesColumn>,
}

#[derive(Deserialize)]
struct TableParts {
    axis: Vec<NaiveDate>,
    columns: Vec<SeriesColumn>,
}

impl TryFrom<TableParts> for AlignedTable {
    type Error = SeriesError;

    fn try_from(parts: TableParts) -> Result<Self, Self::Error> {
        Self::new(parts.axis, parts.columns)
    }
}

impl AlignedTable {
    pub fn new(axis: Vec<NaiveDate>, columns: Vec<SeriesColumn>) -> Result<Self, SeriesError> {
        let mut seen = std::collections::HashSet::new();
        for column in &columns {
            if column.values.len() != axis.len() {
                return Err(SeriesError::LengthMismatch {
                    label: column.label.clone(),
                    expected: axis.len(),
                    actual: column.values.len(),
                });
            }
            if !seen.insert(column.label.as_str()) {
                return Err(SeriesError::DuplicateLabel(column.label.clone()));
            }
        }
        Ok(Self { axis, columns })
    }

    /// A table with the same axis and no columns.
    pub fn empty_like(&self) -> Self {
        Self {
            axis: self.axis.clone(),
            columns: Vec::new(),
        }
    }

    pub fn axis(&self) -> &[NaiveDate] {
        &self.axis
    }

    pub fn columns(&self) -> &[SeriesColumn] {
        &self.columns
    }

    pub fn column(&self, label: &str) -> Option<&SeriesColumn> {
        self.columns.iter().find(|c| c.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    /// Number of rows on the axis.
    pub fn len(&self) -> usize {
        self.axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Value in the final axis row, if that cell is defined.
    ///
    /// Earlier defined values are deliberately not consulted.
    pub fn last_value(&self, label: &str) -> Option<f64> {
        self.column(label)?.values.last().copied().flatten()
    }

    pub fn defined_count(&self, label: &str) -> usize {
        self.column(label)
            .map(|c| c.values.iter().filter(|v| v.is_some()).count())
            .unwrap_or(0)
    }

    /// Sub-table with the named columns, in this table's column order.
    pub fn select(&self, labels: &[&str]) -> Self {
        Self {
            axis: self.axis.clone(),
            columns: self
                .columns
                .iter()
                .filter(|c| labels.contains(&c.label.as_str()))
                .cloned()
                .collect(),
        }
    }
}
