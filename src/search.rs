//! Search filters and results shared by the indexes.

use std::fmt;

/// Predicate over stored objects plus the number of results wanted.
///
/// # Examples
///
/// ```
/// use geoindex::search::{SearchFilter, filter_fn};
///
/// let even = filter_fn(10, |n: &u32| n % 2 == 0);
/// assert!(even.matches(&4u32));
/// assert!(!even.matches(&3u32));
/// assert_eq!(SearchFilter::<u32>::max_results(&even), 10);
/// ```
pub trait SearchFilter<T: ?Sized> {
    /// Whether `object` belongs in the result.
    fn matches(&self, object: &T) -> bool;

    /// Upper bound on the number of results the caller wants.
    fn max_results(&self) -> usize;
}

impl<T: ?Sized, F: SearchFilter<T> + ?Sized> SearchFilter<T> for &F {
    fn matches(&self, object: &T) -> bool {
        (**self).matches(object)
    }

    fn max_results(&self) -> usize {
        (**self).max_results()
    }
}

/// Accept every object, up to the given count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(pub usize);

impl<T: ?Sized> SearchFilter<T> for Limit {
    fn matches(&self, _object: &T) -> bool {
        true
    }

    fn max_results(&self) -> usize {
        self.0
    }
}

/// Filter backed by a closure. Build one with [`filter_fn`].
#[derive(Clone, Copy)]
pub struct PredicateFilter<F> {
    max_results: usize,
    predicate: F,
}

/// Wrap a closure as a [`SearchFilter`].
pub fn filter_fn<T, F>(max_results: usize, predicate: F) -> PredicateFilter<F>
where
    T: ?Sized,
    F: Fn(&T) -> bool,
{
    PredicateFilter {
        max_results,
        predicate,
    }
}

impl<T: ?Sized, F: Fn(&T) -> bool> SearchFilter<T> for PredicateFilter<F> {
    fn matches(&self, object: &T) -> bool {
        (self.predicate)(object)
    }

    fn max_results(&self) -> usize {
        self.max_results
    }
}

impl<F> fmt::Debug for PredicateFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateFilter")
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

/// Objects matched by a range query, in whatever order the engine produced
/// them, with an estimate of how many objects match in total.
///
/// The estimate is exact when it comes from a complete tree search and a
/// sampled extrapolation after a linear scan.
#[derive(Debug, PartialEq)]
pub struct SearchResult<'a, T> {
    items: Vec<&'a T>,
    estimated_total_hits: usize,
}

impl<'a, T> SearchResult<'a, T> {
    pub fn new(items: Vec<&'a T>, estimated_total_hits: usize) -> Self {
        Self {
            items,
            estimated_total_hits,
        }
    }

    /// A result with no matches and an estimate of zero.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    pub fn items(&self) -> &[&'a T] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.items.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn estimated_total_hits(&self) -> usize {
        self.estimated_total_hits
    }

    pub fn into_items(self) -> Vec<&'a T> {
        self.items
    }

    /// Clone the matched objects out of the index.
    pub fn cloned(&self) -> OwnedSearchResult<T>
    where
        T: Clone,
    {
        OwnedSearchResult {
            items: self.items.iter().map(|&item| item.clone()).collect(),
            estimated_total_hits: self.estimated_total_hits,
        }
    }
}

impl<T> Clone for SearchResult<'_, T> {
    fn clone(&self) -> Self {
        Self::new(self.items.clone(), self.estimated_total_hits)
    }
}

impl<'a, T> IntoIterator for SearchResult<'a, T> {
    type Item = &'a T;
    type IntoIter = std::vec::IntoIter<&'a T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// A [`SearchResult`] that owns its objects, for callers that cannot hold a
/// borrow of the index (e.g. behind a lock).
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedSearchResult<T> {
    pub items: Vec<T>,
    pub estimated_total_hits: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_accepts_everything() {
        let limit = Limit(3);
        assert!(SearchFilter::<str>::matches(&limit, "anything"));
        assert_eq!(SearchFilter::<str>::max_results(&limit), 3);
    }

    #[test]
    fn test_filter_by_reference() {
        let filter = filter_fn(5, |s: &str| s.starts_with('a'));
        let by_ref = &filter;
        assert!(by_ref.matches("apple"));
        assert!(!by_ref.matches("pear"));
        assert_eq!(SearchFilter::<str>::max_results(by_ref), 5);
        assert!(format!("{:?}", filter).contains("max_results: 5"));
    }

    #[test]
    fn test_result_accessors() {
        let values = [1, 2, 3];
        let result = SearchResult::new(values.iter().collect(), 30);

        assert_eq!(result.len(), 3);
        assert!(!result.is_empty());
        assert_eq!(result.estimated_total_hits(), 30);
        assert_eq!(result.iter().sum::<i32>(), 6);

        let owned = result.cloned();
        assert_eq!(owned.items, vec![1, 2, 3]);
        assert_eq!(owned.estimated_total_hits, 30);

        let copy = result.clone();
        assert_eq!(copy.into_items(), vec![&1, &2, &3]);
        assert_eq!(result.into_iter().count(), 3);

        let empty = SearchResult::<i32>::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.estimated_total_hits(), 0);
    }
}
