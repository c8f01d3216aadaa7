//! Relative-difference error between associated feature values.
//!
//! For a query point `i` associated with reference point `assoc[i]`:
//!
//! ```text
//! error(i) = |f_ref[assoc[i]] - f_query[i]| / (max(|f_ref[assoc[i]]|, |f_query[i]|) + c)
//! ```
//!
//! Equal features have zero error, even when the ratio is 0/0. With
//! non-negative features the error lies in [0, 1]; with features of mixed
//! sign it can reach 2.

use rayon::prelude::*;

/// Relative error between two feature values.
#[inline]
pub fn relative_error(reference: f64, query: f64, constant: f64) -> f64 {
    if reference == query {
        return 0.0;
    }
    (reference - query).abs() / (reference.abs().max(query.abs()) + constant)
}

/// Per-point error of `query` features against the associated `reference`
/// features.
///
/// `association[i]` is the index into `reference` of the point nearest to
/// query point `i`. The output is aligned with `query`.
pub fn error_map(
    query: &[f64],
    reference: &[f64],
    association: &[usize],
    constant: f64,
) -> Vec<f64> {
    debug_assert_eq!(query.len(), association.len());
    query
        .par_iter()
        .zip(association.par_iter())
        .map(|(&q, &j)| relative_error(reference[j], q, constant))
        .collect()
}

/// Per-point similarity, `1 - error`.
pub fn similarity_map(
    query: &[f64],
    reference: &[f64],
    association: &[usize],
    constant: f64,
) -> Vec<f64> {
    error_map(query, reference, association, constant)
        .into_iter()
        .map(|e| 1.0 - e)
        .collect()
}
