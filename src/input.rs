//! Configuration-boundary helpers: CSV parsing and random array generation.
//!
//! Invalid input never reaches the engine; callers substitute a generated array.

use crate::error::SortVizError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bounds for the interactive size keys. Configured sizes only need to be positive.
pub const MIN_SIZE: usize = 5;
pub const MAX_SIZE: usize = 120;
pub const DEFAULT_SIZE: usize = 20;

const RANDOM_LOW: u32 = 20;
const RANDOM_HIGH: u32 = 500;

/// Generate `n` integers uniformly in `[20, 500)`.
pub fn random_values(n: usize, seed: Option<u64>) -> Vec<f64> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    (0..n)
        .map(|_| f64::from(rng.gen_range(RANDOM_LOW..RANDOM_HIGH)))
        .collect()
}

/// Parse comma-separated numbers, dropping entries that are not finite numbers.
pub fn parse_csv_values(text: &str) -> Result<Vec<f64>, SortVizError> {
    let values: Vec<f64> = text
        .split(',')
        .filter_map(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return Err(SortVizError::InvalidConfiguration(format!(
            "no finite numbers in {:?}",
            text.trim()
        )));
    }
    Ok(values)
}

/// A size of zero is invalid and falls back to one element.
pub fn clamp_size(n: usize) -> usize {
    n.max(1)
}

/// Resolve user text into a usable array, generating a random one when the
/// text is blank or contains no valid numbers.
pub fn resolve_values(text: Option<&str>, size: usize, seed: Option<u64>) -> Vec<f64> {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => match parse_csv_values(t) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!("{e}; generating a random array instead");
                random_values(clamp_size(size), seed)
            }
        },
        None => random_values(clamp_size(size), seed),
    }
}
