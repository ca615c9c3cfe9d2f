use crate::model::{Operation, OperationCounts};

impl OperationCounts {
    /// Tally one emitted operation.
    pub fn record(&mut self, op: &Operation) {
        match op {
            Operation::Compare { .. } => self.compares += 1,
            Operation::Swap { .. } => self.swaps += 1,
            Operation::Overwrite { .. } => self.overwrites += 1,
            Operation::MarkPivot { .. } => self.pivots += 1,
            Operation::MarkSortedRange { .. } => self.sorted_marks += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.compares + self.swaps + self.overwrites + self.pivots + self.sorted_marks
    }
}

/// Count inversions in `values` (pairs `i < j` with `values[i] > values[j]`).
pub fn count_inversions(values: &[f64]) -> u64 {
    let mut n = 0;
    for (i, a) in values.iter().enumerate() {
        n += values[i + 1..].iter().filter(|b| a > b).count() as u64;
    }
    n
}
