use crate::error::SortVizError;

/// The mutable array being sorted plus the snapshot it was generated from.
#[derive(Debug, Clone, Default)]
pub struct SequenceStore {
    values: Vec<f64>,
    original: Option<Vec<f64>>,
}

impl SequenceStore {
    pub fn new(values: Vec<f64>) -> Result<Self, SortVizError> {
        let mut store = Self::default();
        store.reset(values)?;
        Ok(store)
    }

    /// Replace both the working sequence and the snapshot.
    pub fn reset(&mut self, values: Vec<f64>) -> Result<(), SortVizError> {
        if values.is_empty() {
            return Err(SortVizError::InvalidConfiguration(
                "sequence must not be empty".into(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SortVizError::InvalidConfiguration(
                "sequence contains non-finite values".into(),
            ));
        }
        self.original = Some(values.clone());
        self.values = values;
        Ok(())
    }

    /// Copy the snapshot back over the working sequence.
    pub fn restore(&mut self) -> Result<(), SortVizError> {
        match &self.original {
            Some(orig) => {
                self.values.clone_from(orig);
                Ok(())
            }
            None => Err(SortVizError::InvalidConfiguration(
                "no snapshot to restore".into(),
            )),
        }
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.values.swap(i, j);
    }

    pub fn overwrite(&mut self, i: usize, value: f64) {
        self.values[i] = value;
    }

    pub fn get(&self, i: usize) -> f64 {
        self.values[i]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.clone()
    }

    pub fn snapshot(&self) -> Option<&[f64]> {
        self.original.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reset_is_rejected() {
        let mut s = SequenceStore::default();
        assert!(s.reset(vec![]).is_err());
        assert!(s.reset(vec![1.0, f64::NAN]).is_err());
        assert!(s.is_empty());
    }

    #[test]
    fn restore_without_snapshot_fails() {
        let mut s = SequenceStore::default();
        assert!(s.restore().is_err());
    }

    #[test]
    fn restore_is_idempotent_and_keeps_snapshot() {
        let mut s = SequenceStore::new(vec![4.0, 1.0, 3.0]).unwrap();
        s.swap(0, 1);
        s.overwrite(2, 9.0);
        s.restore().unwrap();
        s.restore().unwrap();
        assert_eq!(s.as_slice(), &[4.0, 1.0, 3.0]);
        assert_eq!(s.snapshot(), Some(&[4.0, 1.0, 3.0][..]));
    }

    #[test]
    #[should_panic]
    fn out_of_range_swap_panics() {
        let mut s = SequenceStore::new(vec![1.0]).unwrap();
        s.swap(0, 3);
    }
}
