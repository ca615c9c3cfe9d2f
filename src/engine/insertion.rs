use crate::engine::step::StepEmitter;
use crate::model::Operation;
use crate::sequence::SequenceStore;

/// Shift larger elements right one slot at a time, then drop the key into the gap.
///
/// Each shift is reported as a `Swap` of the two slots involved; the final placement
/// is an `Overwrite`.
pub(crate) async fn insertion_sort(store: &mut SequenceStore, em: &mut StepEmitter) {
    for i in 1..store.len() {
        let key = store.get(i);
        em.step(Operation::Compare { i, j: i - 1 }, store).await;

        // `gap` is the slot the key would occupy; the scanned element is `gap - 1`.
        let mut gap = i;
        while gap > 0 && store.get(gap - 1) > key {
            let shifted = store.get(gap - 1);
            store.overwrite(gap, shifted);
            em.step(Operation::Swap { i: gap - 1, j: gap }, store).await;
            gap -= 1;
        }
        store.overwrite(gap, key);
        em.notify(Operation::Overwrite { i: gap, value: key }, store);
    }
}
