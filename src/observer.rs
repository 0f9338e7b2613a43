//! Build events, observers and counters.
//!
//! The builder reports what it does through an optional [`BuildObserver`] and always keeps
//! [`BuildMetrics`] up to date. Both can be shared with other threads.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::types::Value;

/// Which tree of the table a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Column,
    Row,
}

/// Why a build produced no table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyDataSet,
    MissingDataField,
    MissingColumnFields,
    MissingRowFields,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::EmptyDataSet => "dataset is empty",
            SkipReason::MissingDataField => "no data field configured",
            SkipReason::MissingColumnFields => "no column fields configured",
            SkipReason::MissingRowFields => "no row fields configured",
        };
        f.write_str(s)
    }
}

/// Events emitted by [`crate::builder::PivotTableBuilder::build`].
#[derive(Debug, Clone)]
pub enum BuildEvent {
    BuildStarted { records: usize },
    BuildSkipped { reason: SkipReason },
    DuplicateSkipped { row: usize, key: Value },
    NodeCreated { axis: Axis, level: usize, key: Value },
    CellCreated { column_path: Vec<Value>, row_path: Vec<Value> },
    BuildFinished {
        elapsed: Duration,
        metrics: BuildMetricsSnapshot,
    },
}

/// Observer hook for build events.
pub trait BuildObserver: Send + Sync {
    fn on_event(&self, event: &BuildEvent);
}

/// Prints build events to stderr.
#[derive(Debug, Default)]
pub struct StdErrBuildObserver;

impl BuildObserver for StdErrBuildObserver {
    fn on_event(&self, event: &BuildEvent) {
        match event {
            BuildEvent::BuildStarted { records } => eprintln!("[pivot][start] records={records}"),
            BuildEvent::BuildSkipped { reason } => eprintln!("[pivot][skip] {reason}"),
            BuildEvent::DuplicateSkipped { row, key } => {
                eprintln!("[pivot][dup] row={row} key={key}")
            }
            BuildEvent::NodeCreated { axis, level, key } => {
                eprintln!("[pivot][node] axis={axis:?} level={level} key={key}")
            }
            BuildEvent::CellCreated { column_path, row_path } => {
                eprintln!("[pivot][cell] col={column_path:?} row={row_path:?}")
            }
            BuildEvent::BuildFinished { elapsed, metrics } => {
                eprintln!("[pivot][ok] elapsed={elapsed:?} {metrics}")
            }
        }
    }
}

/// Fans events out to a list of observers.
#[derive(Default)]
pub struct CompositeBuildObserver {
    observers: Vec<Arc<dyn BuildObserver>>,
}

impl CompositeBuildObserver {
    pub fn new(observers: Vec<Arc<dyn BuildObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeBuildObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeBuildObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl BuildObserver for CompositeBuildObserver {
    fn on_event(&self, event: &BuildEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

/// Counters for the most recent build.
///
/// The builder resets them at the start of every build; callers can snapshot them at any time.
#[derive(Debug)]
pub struct BuildMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,
    records_scanned: AtomicU64,
    duplicates_skipped: AtomicU64,
    nodes_created: AtomicU64,
    cells_created: AtomicU64,
}

impl BuildMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            records_scanned: AtomicU64::new(0),
            duplicates_skipped: AtomicU64::new(0),
            nodes_created: AtomicU64::new(0),
            cells_created: AtomicU64::new(0),
        }
    }

    pub fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.records_scanned.store(0, Ordering::SeqCst);
        self.duplicates_skipped.store(0, Ordering::SeqCst);
        self.nodes_created.store(0, Ordering::SeqCst);
        self.cells_created.store(0, Ordering::SeqCst);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn on_record_scanned(&self) {
        let _ = self.records_scanned.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_duplicate_skipped(&self) {
        let _ = self.duplicates_skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_node_created(&self) {
        let _ = self.nodes_created.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_cell_created(&self) {
        let _ = self.cells_created.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> BuildMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        BuildMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            records_scanned: self.records_scanned.load(Ordering::SeqCst),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::SeqCst),
            nodes_created: self.nodes_created.load(Ordering::SeqCst),
            cells_created: self.cells_created.load(Ordering::SeqCst),
        }
    }
}

impl Default for BuildMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`BuildMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub records_scanned: u64,
    pub duplicates_skipped: u64,
    pub nodes_created: u64,
    pub cells_created: u64,
}

impl fmt::Display for BuildMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, records_scanned={}, duplicates_skipped={}, nodes_created={}, cells_created={}, elapsed={:?}",
            self.run_id,
            self.records_scanned,
            self.duplicates_skipped,
            self.nodes_created,
            self.cells_created,
            self.elapsed
        )
    }
}
