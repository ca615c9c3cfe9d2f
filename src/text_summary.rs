//! Text summary builder for CLI output.

use crate::metrics::count_inversions;
use crate::model::{format_value, RunSummary};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

fn join_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_value(*v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build a text summary from a finished run.
pub(crate) fn build_text_summary(summary: &RunSummary) -> TextSummary {
    let c = &summary.counts;
    let mut lines = vec![
        format!("Algorithm: {}", summary.algorithm),
        format!("Input:  [{}]", join_values(&summary.input)),
        format!("Output: [{}]", join_values(&summary.output)),
        format!("Inversions in input: {}", count_inversions(&summary.input)),
        format!(
            "Operations ({} total): {} compares, {} swaps, {} writes, {} pivot marks, {} sorted marks",
            c.total(),
            c.compares,
            c.swaps,
            c.overwrites,
            c.pivots,
            c.sorted_marks
        ),
    ];
    let elapsed = std::time::Duration::from_millis(summary.elapsed.as_millis() as u64);
    lines.push(format!("Elapsed: {}", humantime::format_duration(elapsed)));
    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Algorithm, OperationCounts};
    use std::time::Duration;

    #[test]
    fn summary_lists_arrays_and_counts() {
        let summary = RunSummary {
            timestamp_utc: String::new(),
            algorithm: Algorithm::Insertion,
            input: vec![5.0, 3.0, 8.0, 1.0],
            output: vec![1.0, 3.0, 5.0, 8.0],
            counts: OperationCounts {
                compares: 3,
                swaps: 4,
                overwrites: 3,
                pivots: 0,
                sorted_marks: 1,
            },
            elapsed: Duration::from_millis(3_250),
        };
        let lines = build_text_summary(&summary).lines;
        assert_eq!(lines[0], "Algorithm: insertion");
        assert_eq!(lines[1], "Input:  [5, 3, 8, 1]");
        assert_eq!(lines[2], "Output: [1, 3, 5, 8]");
        assert_eq!(lines[3], "Inversions in input: 4");
        assert!(lines[4].starts_with("Operations (11 total): 3 compares, 4 swaps"));
        assert_eq!(lines[5], "Elapsed: 3s 250ms");
    }
}
