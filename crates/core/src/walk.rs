//! Bounded linear walk.
//!
//! A walk visits items of any sequence in order until a boundary predicate
//! fires. The boundary item itself is not visited. Nothing here knows about
//! HTML: the harvester passes sibling nodes and its own predicate.

/// How a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Number of items handed to the visitor.
    pub visited: usize,
    /// Whether a boundary item stopped the walk before the sequence ran out.
    pub hit_boundary: bool,
}

/// Visits `items` in order until `is_boundary` returns true (exclusive).
///
/// # Example
///
/// ```rust
/// use ttharvest_core::walk::walk_until;
///
/// let mut seen = Vec::new();
/// let outcome = walk_until([1, 2, 3, 4], |n| *n == 3, |n| seen.push(n));
///
/// assert_eq!(seen, vec![1, 2]);
/// assert!(outcome.hit_boundary);
/// ```
pub fn walk_until<I, B, V>(items: I, mut is_boundary: B, mut visit: V) -> WalkOutcome
where
    I: IntoIterator,
    B: FnMut(&I::Item) -> bool,
    V: FnMut(I::Item),
{
    let mut visited = 0;

    for item in items {
        if is_boundary(&item) {
            return WalkOutcome { visited, hit_boundary: true };
        }
        visit(item);
        visited += 1;
    }

    WalkOutcome { visited, hit_boundary: false }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_to_end_without_boundary() {
        let mut seen = Vec::new();
        let outcome = walk_until(["a", "b", "c"], |_| false, |s| seen.push(s));

        assert_eq!(seen, vec!["a", "b", "c"]);
        assert_eq!(outcome, WalkOutcome { visited: 3, hit_boundary: false });
    }

    #[test]
    fn test_boundary_first_item_visits_nothing() {
        let mut seen: Vec<i32> = Vec::new();
        let outcome = walk_until(vec![7, 8], |n| *n == 7, |n| seen.push(n));

        assert!(seen.is_empty());
        assert_eq!(outcome, WalkOutcome { visited: 0, hit_boundary: true });
    }

    #[test]
    fn test_only_first_boundary_matters() {
        let mut seen = Vec::new();
        let outcome = walk_until(1..=10, |n| n % 4 == 0, |n| seen.push(n));

        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(outcome.visited, 3);
    }

    #[test]
    fn test_empty_sequence() {
        let outcome = walk_until(Vec::<u8>::new(), |_| true, |_| {});
        assert_eq!(outcome, WalkOutcome { visited: 0, hit_boundary: false });
    }
}
