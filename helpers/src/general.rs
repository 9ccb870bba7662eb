use std::cmp::Ordering;

/// max returns the maximum value in the array x or `None` if x is empty.
pub fn max<T: std::cmp::PartialOrd + std::marker::Copy>(x: &[T]) -> Option<T> {
    let (first, rest) = x.split_first()?;
    Some(rest.iter().fold(
        *first,
        |val_max, &val| {
            if val_max >= val {
                val_max
            } else {
                val
            }
        },
    ))
}

/// mean returns the arithmetic mean of the values in x (0.0 for an empty slice).
pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    x.iter().sum::<f64>() / x.len() as f64
}

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that would sort an array. The sort is stable, i.e. equal values
/// keep their input order. Incomparable values (NaN) are treated as equal.
pub fn argsort<T: std::cmp::PartialOrd>(x: &[T], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..x.len()).collect();
    match order {
        SortOrder::Ascending => {
            indices.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(Ordering::Equal))
        }
        SortOrder::Descending => {
            indices.sort_by(|&a, &b| x[b].partial_cmp(&x[a]).unwrap_or(Ordering::Equal))
        }
    }
    indices
}

/// fmt_fixed formats x with a fixed number of decimal places, e.g. 83.456 -> "83.5".
pub fn fmt_fixed(x: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, x)
}

/// round_i64 rounds x half away from zero and converts it to an integer.
pub fn round_i64(x: f64) -> i64 {
    x.round() as i64
}
