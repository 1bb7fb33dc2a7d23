/// Index of the largest strictly-positive entry, first occurrence winning ties.
///
/// The running maximum starts at `0.0`, so a vector whose entries are all
/// `<= 0.0` has no class and yields `None`.
pub fn arg_max(values: &[f64]) -> Option<usize> {
    let mut max = 0.0;
    let mut index = None;
    for (i, &v) in values.iter().enumerate() {
        if v > max {
            max = v;
            index = Some(i);
        }
    }
    index
}

/// One-hot decomposition of `values` around its [`arg_max`].
///
/// Returns an all-zero vector when no entry is positive.
pub fn naive_vector_decomp(values: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; values.len()];
    if let Some(i) = arg_max(values) {
        out[i] = 1.0;
    }
    out
}
