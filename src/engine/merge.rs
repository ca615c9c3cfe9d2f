use crate::engine::step::{StepEmitter, LEFTOVER_SPEEDUP};
use crate::model::Operation;
use crate::sequence::SequenceStore;
use futures::future::{BoxFuture, FutureExt};

/// Top-down merge sort over the whole sequence.
pub(crate) async fn merge_sort(store: &mut SequenceStore, em: &mut StepEmitter) {
    if store.is_empty() {
        return;
    }
    let hi = store.len() - 1;
    sort_range(store, em, 0, hi).await;
}

fn sort_range<'a>(
    store: &'a mut SequenceStore,
    em: &'a mut StepEmitter,
    l: usize,
    r: usize,
) -> BoxFuture<'a, ()> {
    async move {
        if l >= r {
            return;
        }
        let m = l + (r - l) / 2;
        sort_range(store, em, l, m).await;
        sort_range(store, em, m + 1, r).await;
        merge(store, em, l, m, r).await;
    }
    .boxed()
}

/// Merge `[l, m]` and `[m + 1, r]` through temporary buffers, writing back in place.
async fn merge(store: &mut SequenceStore, em: &mut StepEmitter, l: usize, m: usize, r: usize) {
    let left = store.as_slice()[l..=m].to_vec();
    let right = store.as_slice()[m + 1..=r].to_vec();
    let (mut i, mut j, mut k) = (0, 0, l);

    while i < left.len() && j < right.len() {
        em.step(
            Operation::Compare {
                i: l + i,
                j: m + 1 + j,
            },
            store,
        )
        .await;
        // `<=` keeps equal elements from the left run first.
        let value = if left[i] <= right[j] {
            let v = left[i];
            i += 1;
            v
        } else {
            let v = right[j];
            j += 1;
            v
        };
        store.overwrite(k, value);
        em.notify(Operation::Overwrite { i: k, value }, store);
        k += 1;
    }

    for &value in left[i..].iter().chain(&right[j..]) {
        store.overwrite(k, value);
        em.step_scaled(Operation::Overwrite { i: k, value }, store, LEFTOVER_SPEEDUP)
            .await;
        k += 1;
    }

    em.notify(Operation::MarkSortedRange { lo: l, hi: r }, store);
}
