use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One observable algorithmic action. Mutations have already been applied to the
/// sequence by the time the matching event reaches a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    Compare { i: usize, j: usize },
    Swap { i: usize, j: usize },
    Overwrite { i: usize, value: f64 },
    MarkPivot { i: usize },
    MarkSortedRange { lo: usize, hi: usize },
}

impl Operation {
    /// Short label used by text output and the TUI status line.
    pub fn describe(&self) -> String {
        match *self {
            Operation::Compare { i, j } => format!("compare [{i}] <-> [{j}]"),
            Operation::Swap { i, j } => format!("swap [{i}] <-> [{j}]"),
            Operation::Overwrite { i, value } => {
                format!("write [{i}] = {}", format_value(value))
            }
            Operation::MarkPivot { i } => format!("pivot [{i}]"),
            Operation::MarkSortedRange { lo, hi } if lo == hi => format!("sorted [{lo}]"),
            Operation::MarkSortedRange { lo, hi } => format!("sorted [{lo}..={hi}]"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[default]
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Bubble,
        Algorithm::Selection,
        Algorithm::Insertion,
        Algorithm::Merge,
        Algorithm::Quick,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bubble => "bubble",
            Algorithm::Selection => "selection",
            Algorithm::Insertion => "insertion",
            Algorithm::Merge => "merge",
            Algorithm::Quick => "quick",
        }
    }

    /// Next algorithm in display order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|a| *a == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
}

/// How the step emitter spends time between operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pacing {
    /// Sleep for the live speed-derived delay at every yield.
    Live,
    /// Skip delays entirely (pause is still honoured).
    Instant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub algorithm: Algorithm,
    pub size: usize,
    /// Initial array; `None` means generate one of `size` elements.
    #[serde(default)]
    pub values: Option<Vec<f64>>,
    pub speed: u8,
    pub pacing: Pacing,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Events emitted by the core and consumed by renderers (TUI, text, JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SortEvent {
    RunStarted {
        algorithm: Algorithm,
        len: usize,
    },
    Step {
        op: Operation,
        snapshot: Vec<f64>,
    },
    RunFinished {
        // Boxed to keep SortEvent small; the summary carries two full arrays.
        summary: Box<RunSummary>,
    },
    Reset {
        snapshot: Vec<f64>,
    },
    StateChanged(RunState),
    Speed {
        value: u8,
        delay_ms: u64,
    },
    Info(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCounts {
    pub compares: u64,
    pub swaps: u64,
    pub overwrites: u64,
    pub pivots: u64,
    pub sorted_marks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default)]
    pub timestamp_utc: String,
    pub algorithm: Algorithm,
    pub input: Vec<f64>,
    pub output: Vec<f64>,
    pub counts: OperationCounts,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
}

/// Render a value without a trailing `.0` when it is integral.
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_cycle_wraps() {
        let mut a = Algorithm::Bubble;
        for _ in 0..Algorithm::ALL.len() {
            a = a.next();
        }
        assert_eq!(a, Algorithm::Bubble);
        assert_eq!(Algorithm::Merge.next(), Algorithm::Quick);
    }

    #[test]
    fn integral_values_format_without_fraction() {
        assert_eq!(format_value(42.0), "42");
        assert_eq!(format_value(-3.0), "-3");
        assert_eq!(format_value(2.5), "2.5");
    }

    #[test]
    fn operations_serialize_with_kind_tag() {
        let json = serde_json::to_string(&Operation::Swap { i: 1, j: 2 }).unwrap();
        assert_eq!(json, r#"{"kind":"swap","i":1,"j":2}"#);
    }
}
