//! Unordered pair enumeration.
//!
//! Pairs come out in combinations-without-replacement order over the input:
//! `(0,1), (0,2), ..., (0,n-1), (1,2), ...`. The iterator is `Clone`, so a
//! caller can restart the enumeration without re-validating the input.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use itertools::Itertools;
use thiserror::Error;

/// Contract violations detected before enumerating.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PairError {
    #[error("Duplicate identifier '{0}' cannot be paired")]
    DuplicateId(String),
}

/// Number of unordered pairs over `n` distinct items.
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Enumerates every unordered pair of `ids` exactly once.
///
/// Fails if `ids` contains duplicates.
pub fn pairs<T>(ids: &[T]) -> Result<impl Iterator<Item = (&T, &T)> + Clone + '_, PairError>
where
    T: Hash + Eq + fmt::Display,
{
    let mut seen = HashSet::with_capacity(ids.len());
    if let Some(dup) = ids.iter().find(|id| !seen.insert(*id)) {
        return Err(PairError::DuplicateId(dup.to_string()));
    }
    Ok(ids.iter().tuple_combinations::<(&T, &T)>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_order() {
        let ids = ["1aab_", "1j46_A", "1k99_A", "2lef_A"];
        let got: Vec<(&str, &str)> = pairs(&ids).unwrap().map(|(a, b)| (*a, *b)).collect();
        assert_eq!(
            got,
            vec![
                ("1aab_", "1j46_A"),
                ("1aab_", "1k99_A"),
                ("1aab_", "2lef_A"),
                ("1j46_A", "1k99_A"),
                ("1j46_A", "2lef_A"),
                ("1k99_A", "2lef_A"),
            ]
        );
    }

    #[test]
    fn test_pair_count_matches_enumeration() {
        for n in 0..12usize {
            let ids: Vec<usize> = (0..n).collect();
            assert_eq!(pairs(&ids).unwrap().count(), pair_count(n), "n = {}", n);
        }
        assert_eq!(pair_count(0), 0);
        assert_eq!(pair_count(1), 0);
        assert_eq!(pair_count(2), 1);
        assert_eq!(pair_count(5), 10);
    }

    #[test]
    fn test_no_self_pairs_or_repeats() {
        let ids: Vec<String> = (0..7).map(|i| format!("s{}", i)).collect();
        let mut seen = HashSet::new();
        for (a, b) in pairs(&ids).unwrap() {
            assert_ne!(a, b);
            let key = if a < b { (a, b) } else { (b, a) };
            assert!(seen.insert(key));
        }
        assert_eq!(seen.len(), 21);
    }

    #[test]
    fn test_restartable() {
        let ids = ["a", "b", "c"];
        let it = pairs(&ids).unwrap();
        let first: Vec<_> = it.clone().collect();
        let second: Vec<_> = it.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let ids = ["a", "b", "a"];
        assert_eq!(
            pairs(&ids).err(),
            Some(PairError::DuplicateId("a".to_string()))
        );
    }
}
