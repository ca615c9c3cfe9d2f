use crate::engine::step::StepEmitter;
use crate::model::Operation;
use crate::sequence::SequenceStore;

/// Adjacent compare/swap passes; each pass fixes one more element at the tail.
pub(crate) async fn bubble_sort(store: &mut SequenceStore, em: &mut StepEmitter) {
    let n = store.len();
    for i in 0..n.saturating_sub(1) {
        for j in 0..n - 1 - i {
            em.step(Operation::Compare { i: j, j: j + 1 }, store).await;
            if store.get(j) > store.get(j + 1) {
                store.swap(j, j + 1);
                em.step(Operation::Swap { i: j, j: j + 1 }, store).await;
            }
        }
        let tail = n - 1 - i;
        em.notify(Operation::MarkSortedRange { lo: tail, hi: tail }, store);
    }
}
