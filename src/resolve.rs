//! Ordered fallback chains for attribute resolution.

/// One source in a fallback chain.
pub type Resolver<'a, T> = &'a dyn Fn() -> Option<T>;

/// Runs the resolvers in order and returns the first value produced.
/// Later sources are never evaluated once one succeeds.
pub fn first_resolved<T>(chain: &[Resolver<'_, T>]) -> Option<T> {
    chain.iter().find_map(|resolve| resolve())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn first_source_wins_and_stops_the_chain() {
        let calls = Cell::new(0);
        let value = first_resolved(&[
            &|| None,
            &|| Some(2),
            &|| {
                calls.set(calls.get() + 1);
                Some(3)
            },
        ]);
        assert_eq!(value, Some(2));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn empty_or_exhausted_chain_is_absent() {
        assert_eq!(first_resolved::<f64>(&[]), None);
        assert_eq!(first_resolved::<f64>(&[&|| None, &|| None]), None);
    }
}
