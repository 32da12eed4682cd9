/// Divides `part` by `total`. Returns `None` for an empty total so callers can
/// report "no data" instead of a zero or NaN average.
pub fn ratio(part: u64, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(part as f64 / total as f64)
}

/// Running sum of `values`.
pub fn running_total<I>(values: I) -> Vec<u64>
where
    I: IntoIterator<Item = u64>,
{
    values
        .into_iter()
        .scan(0u64, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}
