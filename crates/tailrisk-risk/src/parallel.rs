//! Conditional parallel iteration.
//!
//! Uses rayon when the `parallel` feature is enabled, the caller asks for it,
//! and there is enough work to split.

/// Minimum number of work items before a parallel pass is worth it.
pub const PARALLEL_THRESHOLD: usize = 4;

/// Returns true if parallel processing should be used for `count` items.
#[must_use]
pub fn should_parallelize(enabled: bool, count: usize) -> bool {
    cfg!(feature = "parallel") && enabled && count >= PARALLEL_THRESHOLD
}

/// Maps `f` over `items`, in parallel when [`should_parallelize`] allows.
///
/// Output order always matches input order.
#[allow(unused_variables)]
pub fn maybe_parallel_map<T, U, F>(items: &[T], enabled: bool, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if should_parallelize(enabled, items.len()) {
            return items.par_iter().map(f).collect();
        }
    }

    items.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_preserves_order() {
        let items: Vec<u64> = (0..100).collect();
        let serial = maybe_parallel_map(&items, false, |x| x * 2);
        let parallel = maybe_parallel_map(&items, true, |x| x * 2);
        assert_eq!(serial, parallel);
        assert_eq!(serial[99], 198);
    }

    #[test]
    fn test_threshold() {
        assert!(!should_parallelize(false, 1000));
        assert!(!should_parallelize(true, 1));
        #[cfg(feature = "parallel")]
        assert!(should_parallelize(true, 1000));
    }
}
