//! Helpers shared by the tests of the workspace.

#[macro_export]
macro_rules! assert_panics {
    ($e:expr) => {{
        use std::panic::catch_unwind;
        use std::stringify;
        let expr_string = stringify!($e);
        let result = catch_unwind(|| $e);
        if result.is_ok() {
            panic!("assert_panics!({}) failed.", expr_string);
        }
    }};
}

/// Returns the sorted elements of the iterator.
pub fn sorted<T: Ord>(iter: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut result: Vec<_> = iter.into_iter().collect();
    result.sort();
    result
}

/// Returns the sorted and deduplicated elements of the iterator.
pub fn sorted_unique<T: Ord>(iter: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut result = sorted(iter);
    result.dedup();
    result
}
