//! Bounded sorted set of nearest-neighbor candidates.

use serde::{Deserialize, Serialize};

use crate::engine::RowId;

/// A candidate row paired with its distance to the reference geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub row_id: RowId,
    pub distance: f64,
}

/// A fixed-capacity array of candidates kept sorted by ascending distance.
///
/// The backing array always holds `capacity` slots; vacant slots carry the
/// infinity distance sentinel, so the occupied prefix `[0, len)` is the
/// result and `max_distance()` is the admission bar once the set fills up.
///
/// # Examples
///
/// ```rust
/// use geoknn::KnnResultSet;
///
/// let mut set = KnnResultSet::new(2);
/// assert!(set.offer(10, 4.0));
/// assert!(set.offer(11, 1.0));
/// assert!(!set.offer(12, 9.0)); // full, too far
/// assert!(set.offer(13, 2.0)); // displaces row 10
///
/// let rows: Vec<i64> = set.snapshot().iter().map(|n| n.row_id).collect();
/// assert_eq!(rows, vec![11, 13]);
/// ```
#[derive(Debug, Clone)]
pub struct KnnResultSet {
    items: Vec<Neighbor>,
    count: usize,
}

impl KnnResultSet {
    /// Creates an empty result set holding at most `capacity` candidates.
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> KnnResultSet {
        let capacity = capacity.max(1);
        KnnResultSet {
            items: vec![
                Neighbor {
                    row_id: 0,
                    distance: f64::INFINITY,
                };
                capacity
            ],
            count: 0,
        }
    }

    /// Offers a candidate, returning whether it was accepted.
    ///
    /// A candidate is rejected when its `row_id` is already present, or when
    /// its distance does not beat [`KnnResultSet::max_distance`] — which is
    /// infinite while the set has room, so any finite distance is admitted
    /// until the set fills. Accepted candidates are inserted in sorted
    /// position (ties go after existing equals), shifting farther entries
    /// down and dropping the overflow entry once full.
    pub fn offer(&mut self, row_id: RowId, distance: f64) -> bool {
        if !(distance < self.max_distance()) {
            return false;
        }
        if self.items[..self.count].iter().any(|n| n.row_id == row_id) {
            return false;
        }
        let pos = self.items[..self.count]
            .iter()
            .position(|n| distance < n.distance)
            .unwrap_or(self.count);
        for i in (pos + 1..self.items.len()).rev() {
            self.items[i] = self.items[i - 1];
        }
        self.items[pos] = Neighbor { row_id, distance };
        if self.count < self.items.len() {
            self.count += 1;
        }
        true
    }

    /// Number of candidates currently held.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no candidate has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether the set holds as many candidates as its capacity.
    pub fn is_full(&self) -> bool {
        self.count == self.items.len()
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// The current admission bar: the distance of the farthest kept
    /// candidate when full, infinity otherwise.
    pub fn max_distance(&self) -> f64 {
        if self.is_full() {
            self.items[self.count - 1].distance
        } else {
            f64::INFINITY
        }
    }

    /// The occupied prefix, sorted ascending by distance.
    pub fn snapshot(&self) -> &[Neighbor] {
        &self.items[..self.count]
    }

    /// Consumes the set into its sorted candidates.
    pub fn into_sorted_vec(mut self) -> Vec<Neighbor> {
        self.items.truncate(self.count);
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(set: &KnnResultSet) -> Vec<(RowId, f64)> {
        set.snapshot().iter().map(|n| (n.row_id, n.distance)).collect()
    }

    #[test]
    fn test_insertion_keeps_ascending_order() {
        let mut set = KnnResultSet::new(4);
        assert!(set.offer(1, 5.0));
        assert!(set.offer(2, 3.0));
        assert!(set.offer(3, 8.0));
        assert_eq!(rows(&set), vec![(2, 3.0), (1, 5.0), (3, 8.0)]);
    }

    #[test]
    fn test_displacement_when_full() {
        // Capacity 3: offers (1,5.0), (2,3.0), (3,8.0), (4,1.0); the last
        // offer displaces row 3.
        let mut set = KnnResultSet::new(3);
        assert!(set.offer(1, 5.0));
        assert!(set.offer(2, 3.0));
        assert!(set.offer(3, 8.0));
        assert_eq!(rows(&set), vec![(2, 3.0), (1, 5.0), (3, 8.0)]);

        assert!(set.offer(4, 1.0));
        assert_eq!(rows(&set), vec![(4, 1.0), (2, 3.0), (1, 5.0)]);
    }

    #[test]
    fn test_rejects_when_full_and_too_far() {
        let mut set = KnnResultSet::new(2);
        assert!(set.offer(1, 1.0));
        assert!(set.offer(2, 2.0));
        assert!(!set.offer(3, 2.0)); // equal to max_distance
        assert!(!set.offer(4, 9.0));
        assert_eq!(rows(&set), vec![(1, 1.0), (2, 2.0)]);
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut set = KnnResultSet::new(5);
        for i in 0..100 {
            set.offer(i, (100 - i) as f64);
            assert!(set.len() <= 5);
        }
        assert_eq!(set.len(), 5);
        assert!(set.is_full());
    }

    #[test]
    fn test_snapshot_sorted_after_random_offers() {
        let mut set = KnnResultSet::new(8);
        for (i, d) in [7.0, 2.0, 9.0, 4.0, 4.0, 1.0, 8.0, 3.0, 6.0, 5.0]
            .iter()
            .enumerate()
        {
            set.offer(i as RowId, *d);
        }
        let distances: Vec<f64> = set.snapshot().iter().map(|n| n.distance).collect();
        let mut sorted = distances.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(distances, sorted);
    }

    #[test]
    fn test_duplicate_row_id_is_noop() {
        let mut set = KnnResultSet::new(3);
        assert!(set.offer(1, 5.0));
        assert!(!set.offer(1, 5.0));
        assert!(!set.offer(1, 2.0));
        assert_eq!(set.len(), 1);
        assert_eq!(rows(&set), vec![(1, 5.0)]);
    }

    #[test]
    fn test_ties_keep_first_offer_ahead() {
        let mut set = KnnResultSet::new(3);
        assert!(set.offer(1, 2.0));
        assert!(set.offer(2, 2.0));
        assert_eq!(rows(&set), vec![(1, 2.0), (2, 2.0)]);
    }

    #[test]
    fn test_max_distance_tracks_last_slot() {
        let mut set = KnnResultSet::new(2);
        assert_eq!(set.max_distance(), f64::INFINITY);
        set.offer(1, 3.0);
        assert_eq!(set.max_distance(), f64::INFINITY);
        set.offer(2, 7.0);
        assert_eq!(set.max_distance(), 7.0);
        set.offer(3, 1.0);
        assert_eq!(set.max_distance(), 3.0);
    }

    #[test]
    fn test_infinite_distance_never_admitted() {
        let mut set = KnnResultSet::new(3);
        assert!(!set.offer(1, f64::INFINITY));
        assert!(set.is_empty());
        set.offer(2, 1.0);
        assert!(!set.offer(3, f64::INFINITY));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_nan_distance_never_admitted() {
        let mut set = KnnResultSet::new(3);
        assert!(!set.offer(1, f64::NAN));
        assert!(set.is_empty());
    }

    #[test]
    fn test_accepted_offers_tighten_admission_bar() {
        let mut set = KnnResultSet::new(2);
        set.offer(1, 10.0);
        set.offer(2, 20.0);
        let before = set.max_distance();
        assert!(set.offer(3, 5.0));
        assert!(set.max_distance() <= before);
    }

    #[test]
    fn test_zero_capacity_raised_to_one() {
        let mut set = KnnResultSet::new(0);
        assert_eq!(set.capacity(), 1);
        assert!(set.offer(1, 4.0));
        assert!(set.offer(2, 2.0));
        assert_eq!(rows(&set), vec![(2, 2.0)]);
    }

    #[test]
    fn test_into_sorted_vec() {
        let mut set = KnnResultSet::new(3);
        set.offer(1, 2.0);
        set.offer(2, 1.0);
        let items = set.into_sorted_vec();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].row_id, 2);
        assert_eq!(items[1].row_id, 1);
    }
}
