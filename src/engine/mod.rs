mod bubble;
mod insertion;
mod merge;
mod quick;
mod selection;
pub mod step;

use crate::model::{Algorithm, Operation, RunSummary};
use crate::sequence::SequenceStore;
use anyhow::{bail, Result};
use step::StepEmitter;

pub struct SortEngine {
    algorithm: Algorithm,
}

impl SortEngine {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }

    /// Sort `store` to completion, yielding through `emitter` after every operation.
    /// Hands the store back together with a summary of the run.
    pub async fn run(
        self,
        mut store: SequenceStore,
        mut emitter: StepEmitter,
    ) -> Result<(SequenceStore, RunSummary)> {
        if store.is_empty() {
            bail!("cannot sort an empty sequence");
        }
        let input = store.to_vec();
        let started = tokio::time::Instant::now();
        tracing::debug!(algorithm = %self.algorithm, len = store.len(), "sort started");

        match self.algorithm {
            Algorithm::Bubble => bubble::bubble_sort(&mut store, &mut emitter).await,
            Algorithm::Selection => selection::selection_sort(&mut store, &mut emitter).await,
            Algorithm::Insertion => insertion::insertion_sort(&mut store, &mut emitter).await,
            Algorithm::Merge => merge::merge_sort(&mut store, &mut emitter).await,
            Algorithm::Quick => quick::quick_sort(&mut store, &mut emitter).await,
        }

        let hi = store.len() - 1;
        emitter.notify(Operation::MarkSortedRange { lo: 0, hi }, &store);

        let summary = RunSummary {
            timestamp_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
            algorithm: self.algorithm,
            input,
            output: store.to_vec(),
            counts: emitter.counts().clone(),
            elapsed: started.elapsed(),
        };
        tracing::debug!(
            algorithm = %self.algorithm,
            compares = summary.counts.compares,
            swaps = summary.counts.swaps,
            "sort finished"
        );
        Ok((store, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::step::{RunStateCell, SpeedSetting};
    use super::*;
    use crate::input::random_values;
    use crate::metrics::count_inversions;
    use crate::model::{Pacing, SortEvent};
    use tokio::sync::mpsc;

    async fn run_instant(algorithm: Algorithm, values: &[f64]) -> (RunSummary, Vec<Operation>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let emitter = StepEmitter::new(
            tx,
            SpeedSetting::default(),
            RunStateCell::default(),
            Pacing::Instant,
        );
        let store = SequenceStore::new(values.to_vec()).unwrap();
        let (_, summary) = SortEngine::new(algorithm).run(store, emitter).await.unwrap();
        let mut ops = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if let SortEvent::Step { op, .. } = ev {
                ops.push(op);
            }
        }
        (summary, ops)
    }

    fn sorted_copy(values: &[f64]) -> Vec<f64> {
        let mut v = values.to_vec();
        v.sort_by(|a, b| a.partial_cmp(b).unwrap());
        v
    }

    #[tokio::test]
    async fn every_algorithm_yields_sorted_permutation() {
        for algorithm in Algorithm::ALL {
            for n in 1..=24 {
                let input = random_values(n, Some(n as u64 * 31));
                let (summary, _) = run_instant(algorithm, &input).await;
                assert_eq!(summary.output, sorted_copy(&input), "{algorithm} n={n}");
                assert_eq!(summary.input, input);
            }
            let (summary, _) = run_instant(algorithm, &[2.5, -1.0, 2.5, 0.0, -7.25]).await;
            assert_eq!(summary.output, vec![-7.25, -1.0, 0.0, 2.5, 2.5]);
        }
    }

    #[tokio::test]
    async fn insertion_trace_matches_reference() {
        let (summary, ops) = run_instant(Algorithm::Insertion, &[5.0, 3.0, 8.0, 1.0]).await;
        assert_eq!(summary.output, vec![1.0, 3.0, 5.0, 8.0]);
        assert_eq!(
            ops,
            vec![
                Operation::Compare { i: 1, j: 0 },
                Operation::Swap { i: 0, j: 1 },
                Operation::Overwrite { i: 0, value: 3.0 },
                Operation::Compare { i: 2, j: 1 },
                Operation::Overwrite { i: 2, value: 8.0 },
                Operation::Compare { i: 3, j: 2 },
                Operation::Swap { i: 2, j: 3 },
                Operation::Swap { i: 1, j: 2 },
                Operation::Swap { i: 0, j: 1 },
                Operation::Overwrite { i: 0, value: 1.0 },
                Operation::MarkSortedRange { lo: 0, hi: 3 },
            ]
        );
    }

    #[tokio::test]
    async fn quick_trace_reasserts_pivot_and_marks_singletons() {
        let (_, ops) = run_instant(Algorithm::Quick, &[3.0, 1.0, 2.0]).await;
        assert_eq!(
            ops,
            vec![
                Operation::MarkPivot { i: 2 },
                Operation::Compare { i: 0, j: 2 },
                Operation::MarkPivot { i: 2 },
                Operation::Compare { i: 1, j: 2 },
                Operation::Swap { i: 0, j: 1 },
                Operation::MarkPivot { i: 2 },
                Operation::Swap { i: 1, j: 2 },
                Operation::MarkSortedRange { lo: 1, hi: 1 },
                Operation::MarkSortedRange { lo: 0, hi: 0 },
                Operation::MarkSortedRange { lo: 2, hi: 2 },
                Operation::MarkSortedRange { lo: 0, hi: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn merge_trace_writes_back_then_marks_range() {
        let (_, ops) = run_instant(Algorithm::Merge, &[2.0, 1.0]).await;
        assert_eq!(
            ops,
            vec![
                Operation::Compare { i: 0, j: 1 },
                Operation::Overwrite { i: 0, value: 1.0 },
                Operation::Overwrite { i: 1, value: 2.0 },
                Operation::MarkSortedRange { lo: 0, hi: 1 },
                Operation::MarkSortedRange { lo: 0, hi: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn merge_takes_left_run_first_on_ties() {
        let (_, ops) = run_instant(Algorithm::Merge, &[1.0, 1.0, 1.0, 1.0]).await;
        // The final merge of [0, 1] with [2, 3] consumes the whole left run before
        // touching the right one.
        let compares: Vec<_> = ops
            .iter()
            .filter(|op| matches!(op, Operation::Compare { .. }))
            .copied()
            .collect();
        assert_eq!(
            &compares[compares.len() - 2..],
            &[
                Operation::Compare { i: 0, j: 2 },
                Operation::Compare { i: 1, j: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn bubble_swaps_equal_inversions() {
        for seed in 0..10 {
            let input = random_values(15, Some(seed));
            let (summary, _) = run_instant(Algorithm::Bubble, &input).await;
            assert_eq!(summary.counts.swaps, count_inversions(&input));
            assert_eq!(summary.counts.compares, 15 * 14 / 2);
        }
    }

    #[tokio::test]
    async fn selection_swaps_at_most_n() {
        for seed in 0..10 {
            let input = random_values(20, Some(seed));
            let (summary, ops) = run_instant(Algorithm::Selection, &input).await;
            assert!(summary.counts.swaps <= 20);
            let marks = ops
                .iter()
                .filter(|op| matches!(op, Operation::MarkSortedRange { lo, hi } if lo == hi))
                .count();
            assert_eq!(marks, 20);
        }
        let (summary, _) = run_instant(Algorithm::Selection, &[1.0, 2.0, 3.0]).await;
        assert_eq!(summary.counts.swaps, 0);
    }

    #[tokio::test]
    async fn bubble_marks_tail_after_each_pass() {
        let (_, ops) = run_instant(Algorithm::Bubble, &[3.0, 2.0, 1.0]).await;
        let marks: Vec<_> = ops
            .iter()
            .filter_map(|op| match op {
                Operation::MarkSortedRange { lo, hi } => Some((*lo, *hi)),
                _ => None,
            })
            .collect();
        assert_eq!(marks, vec![(2, 2), (1, 1), (0, 2)]);
    }

    #[tokio::test]
    async fn single_element_runs_cleanly() {
        for algorithm in Algorithm::ALL {
            let (summary, ops) = run_instant(algorithm, &[42.0]).await;
            assert_eq!(summary.output, vec![42.0]);
            assert_eq!(ops.last(), Some(&Operation::MarkSortedRange { lo: 0, hi: 0 }));
        }
    }

    #[tokio::test]
    async fn snapshots_follow_operations_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let emitter = StepEmitter::new(
            tx,
            SpeedSetting::default(),
            RunStateCell::default(),
            Pacing::Instant,
        );
        let store = SequenceStore::new(vec![2.0, 1.0]).unwrap();
        SortEngine::new(Algorithm::Bubble)
            .run(store, emitter)
            .await
            .unwrap();
        let mut snapshots = Vec::new();
        while let Ok(SortEvent::Step { snapshot, .. }) = rx.try_recv() {
            snapshots.push(snapshot);
        }
        assert_eq!(
            snapshots,
            vec![
                vec![2.0, 1.0],
                vec![1.0, 2.0],
                vec![1.0, 2.0],
                vec![1.0, 2.0],
            ]
        );
    }

    #[tokio::test]
    async fn empty_store_is_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let emitter = StepEmitter::new(
            tx,
            SpeedSetting::default(),
            RunStateCell::default(),
            Pacing::Instant,
        );
        let res = SortEngine::new(Algorithm::Quick)
            .run(SequenceStore::default(), emitter)
            .await;
        assert!(res.is_err());
    }
}
