use crate::engine::step::StepEmitter;
use crate::model::Operation;
use crate::sequence::SequenceStore;

/// Scan the unsorted suffix for its minimum and swap it into place at most once per position.
pub(crate) async fn selection_sort(store: &mut SequenceStore, em: &mut StepEmitter) {
    let n = store.len();
    for i in 0..n {
        let mut min = i;
        for j in i + 1..n {
            em.step(Operation::Compare { i: min, j }, store).await;
            if store.get(j) < store.get(min) {
                min = j;
            }
        }
        if min != i {
            store.swap(i, min);
            em.step(Operation::Swap { i, j: min }, store).await;
        }
        em.notify(Operation::MarkSortedRange { lo: i, hi: i }, store);
    }
}
