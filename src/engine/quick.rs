use crate::engine::step::StepEmitter;
use crate::model::Operation;
use crate::sequence::SequenceStore;
use futures::future::{BoxFuture, FutureExt};

/// Quick sort with a Lomuto partition around the last element.
pub(crate) async fn quick_sort(store: &mut SequenceStore, em: &mut StepEmitter) {
    if store.is_empty() {
        return;
    }
    let hi = store.len() - 1;
    sort_range(store, em, 0, hi).await;
}

fn sort_range<'a>(
    store: &'a mut SequenceStore,
    em: &'a mut StepEmitter,
    lo: usize,
    hi: usize,
) -> BoxFuture<'a, ()> {
    async move {
        if lo >= hi {
            if lo == hi {
                em.notify(Operation::MarkSortedRange { lo, hi }, store);
            }
            return;
        }
        let p = partition(store, em, lo, hi).await;
        // p == lo leaves an empty left range; nothing to do there.
        if p > lo {
            sort_range(store, em, lo, p - 1).await;
        }
        sort_range(store, em, p + 1, hi).await;
    }
    .boxed()
}

async fn partition(
    store: &mut SequenceStore,
    em: &mut StepEmitter,
    lo: usize,
    hi: usize,
) -> usize {
    let pivot = store.get(hi);
    em.notify(Operation::MarkPivot { i: hi }, store);

    // Next slot for an element smaller than the pivot.
    let mut slot = lo;
    for j in lo..hi {
        em.step(Operation::Compare { i: j, j: hi }, store).await;
        if store.get(j) < pivot {
            store.swap(slot, j);
            em.step(Operation::Swap { i: slot, j }, store).await;
            slot += 1;
        }
        // Renderers show only the latest operation, so the pivot is re-marked.
        em.notify(Operation::MarkPivot { i: hi }, store);
    }

    store.swap(slot, hi);
    em.step(Operation::Swap { i: slot, j: hi }, store).await;
    em.notify(Operation::MarkSortedRange { lo: slot, hi: slot }, store);
    slot
}
