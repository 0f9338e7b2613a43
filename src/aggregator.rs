//! Running aggregates held by pivot nodes, cells and the table total.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PivotError;

/// Decimal places used by [`Aggregator::formatted_result`].
pub const DEFAULT_PRECISION: u32 = 2;

/// Supported aggregation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregatorKind {
    /// Sum of values.
    #[default]
    Sum,
    /// Number of values.
    Count,
    /// Arithmetic mean of values.
    Average,
}

impl AggregatorKind {
    /// Lowercase name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            AggregatorKind::Sum => "sum",
            AggregatorKind::Count => "count",
            AggregatorKind::Average => "average",
        }
    }
}

impl fmt::Display for AggregatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregatorKind {
    type Err = PivotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(AggregatorKind::Sum),
            "count" => Ok(AggregatorKind::Count),
            "average" | "avg" | "mean" => Ok(AggregatorKind::Average),
            _ => Err(PivotError::UnknownAggregator {
                name: s.to_string(),
            }),
        }
    }
}

/// Accumulator for one [`AggregatorKind`].
///
/// `add` takes one measurement. `merge` folds another aggregator in: Sum and Average treat the
/// other's result as a single measurement, Count adds the other's tally.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregator {
    Sum { sum: f64 },
    Count { count: u64 },
    Average { sum: f64, count: u64 },
}

impl Aggregator {
    /// Empty aggregator of the given kind.
    pub fn new(kind: AggregatorKind) -> Self {
        match kind {
            AggregatorKind::Sum => Aggregator::Sum { sum: 0.0 },
            AggregatorKind::Count => Aggregator::Count { count: 0 },
            AggregatorKind::Average => Aggregator::Average { sum: 0.0, count: 0 },
        }
    }

    /// Aggregator of the given kind that has already seen `seed`.
    pub fn with_seed(kind: AggregatorKind, seed: f64) -> Self {
        let mut agg = Self::new(kind);
        agg.add(seed);
        agg
    }

    pub fn kind(&self) -> AggregatorKind {
        match self {
            Aggregator::Sum { .. } => AggregatorKind::Sum,
            Aggregator::Count { .. } => AggregatorKind::Count,
            Aggregator::Average { .. } => AggregatorKind::Average,
        }
    }

    /// Reset to the empty state.
    pub fn init(&mut self) {
        *self = Self::new(self.kind());
    }

    /// Incorporate one measurement.
    pub fn add(&mut self, value: f64) {
        match self {
            Aggregator::Sum { sum } => *sum += value,
            Aggregator::Count { count } => *count += 1,
            Aggregator::Average { sum, count } => {
                *sum += value;
                *count += 1;
            }
        }
    }

    /// Incorporate another aggregator.
    pub fn merge(&mut self, other: &Aggregator) {
        match self {
            Aggregator::Count { count } => *count += other.tally(),
            _ => self.add(other.result()),
        }
    }

    /// Current aggregate; `0` when nothing has been added.
    pub fn result(&self) -> f64 {
        match self {
            Aggregator::Sum { sum } => *sum,
            Aggregator::Count { count } => *count as f64,
            Aggregator::Average { sum, count } => {
                if *count == 0 {
                    0.0
                } else {
                    sum / *count as f64
                }
            }
        }
    }

    /// Result rounded to [`DEFAULT_PRECISION`] decimal places.
    pub fn formatted_result(&self) -> f64 {
        self.formatted_result_with(DEFAULT_PRECISION)
    }

    /// Result rounded to `precision` decimal places.
    pub fn formatted_result_with(&self, precision: u32) -> f64 {
        let factor = 10f64.powi(precision as i32);
        (self.result() * factor).round() / factor
    }

    fn tally(&self) -> u64 {
        match self {
            Aggregator::Count { count } => *count,
            other => other.result().max(0.0) as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Aggregator, AggregatorKind};
    use crate::error::PivotError;

    #[test]
    fn empty_aggregators_report_zero() {
        for kind in [AggregatorKind::Sum, AggregatorKind::Count, AggregatorKind::Average] {
            assert_eq!(Aggregator::new(kind).result(), 0.0);
        }
    }

    #[test]
    fn sum_count_average_accumulate() {
        let mut sum = Aggregator::new(AggregatorKind::Sum);
        let mut count = Aggregator::new(AggregatorKind::Count);
        let mut avg = Aggregator::new(AggregatorKind::Average);
        for v in [10.0, 5.0, 3.0] {
            sum.add(v);
            count.add(v);
            avg.add(v);
        }
        assert_eq!(sum.result(), 18.0);
        assert_eq!(count.result(), 3.0);
        assert_eq!(avg.result(), 6.0);
    }

    #[test]
    fn merge_treats_result_as_one_measurement_except_count() {
        let other_sum = Aggregator::with_seed(AggregatorKind::Sum, 4.0);
        let mut sum = Aggregator::with_seed(AggregatorKind::Sum, 1.0);
        sum.merge(&other_sum);
        assert_eq!(sum.result(), 5.0);

        let mut other_avg = Aggregator::new(AggregatorKind::Average);
        other_avg.add(2.0);
        other_avg.add(4.0);
        let mut avg = Aggregator::with_seed(AggregatorKind::Average, 9.0);
        avg.merge(&other_avg);
        // (9 + 3) / 2
        assert_eq!(avg.result(), 6.0);

        let mut other_count = Aggregator::new(AggregatorKind::Count);
        other_count.add(1.0);
        other_count.add(1.0);
        let mut count = Aggregator::with_seed(AggregatorKind::Count, 100.0);
        count.merge(&other_count);
        assert_eq!(count.result(), 3.0);
    }

    #[test]
    fn init_resets_state() {
        let mut avg = Aggregator::with_seed(AggregatorKind::Average, 7.0);
        avg.init();
        assert_eq!(avg, Aggregator::new(AggregatorKind::Average));
        assert_eq!(avg.kind(), AggregatorKind::Average);
    }

    #[test]
    fn formatted_result_rounds_without_mutating() {
        let mut avg = Aggregator::new(AggregatorKind::Average);
        for v in [1.0, 1.0, 2.0] {
            avg.add(v);
        }
        assert_eq!(avg.formatted_result(), 1.33);
        assert_eq!(avg.formatted_result_with(0), 1.0);
        assert!((avg.result() - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Sum".parse::<AggregatorKind>().unwrap(), AggregatorKind::Sum);
        assert_eq!(" COUNT ".parse::<AggregatorKind>().unwrap(), AggregatorKind::Count);
        assert_eq!("avg".parse::<AggregatorKind>().unwrap(), AggregatorKind::Average);
        let err = "median".parse::<AggregatorKind>().unwrap_err();
        assert!(matches!(err, PivotError::UnknownAggregator { ref name } if name == "median"));
        assert!(err.to_string().contains("unknown aggregator 'median'"));
    }
}
