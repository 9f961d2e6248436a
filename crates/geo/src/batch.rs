//! Batch distance calculations with optional parallelism.
//!
//! Used to order place lists by distance from a reference position. Items
//! whose location is not a valid coordinate get an infinite distance and
//! therefore sort last.

use crate::{distance_meters, Coordinate};

/// Distance in meters from `origin` to each item, in input order.
///
/// # Example
/// ```
/// use safepath_geo::{distances_from, Coordinate};
///
/// let origin = Coordinate::new(12.9716, 77.5946);
/// let places = vec![Coordinate::new(12.9716, 77.5946), Coordinate::new(95.0, 0.0)];
///
/// let distances = distances_from(&origin, &places, |c| *c);
/// assert_eq!(distances[0], 0.0);
/// assert!(distances[1].is_infinite());
/// ```
pub fn distances_from<T, F>(origin: &Coordinate, items: &[T], location: F) -> Vec<f64>
where
    T: Sync,
    F: Fn(&T) -> Coordinate + Sync + Send,
{
    let measure = |item: &T| {
        let coord = location(item);
        if coord.is_valid() {
            distance_meters(origin, &coord)
        } else {
            f64::INFINITY
        }
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        items.par_iter().map(measure).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        items.iter().map(measure).collect()
    }
}

/// Sorts items by ascending distance from `origin`.
///
/// The sort is stable: equidistant items keep their input order.
pub fn sort_by_distance<T, F>(origin: &Coordinate, items: Vec<T>, location: F) -> Vec<T>
where
    T: Sync,
    F: Fn(&T) -> Coordinate + Sync + Send,
{
    let distances = distances_from(origin, &items, location);

    let mut paired: Vec<(f64, T)> = distances.into_iter().zip(items).collect();
    paired.sort_by(|a, b| a.0.total_cmp(&b.0));

    paired.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Place {
        id: u32,
        at: Coordinate,
    }

    fn create_test_places() -> Vec<Place> {
        vec![
            // Chennai
            Place { id: 1, at: Coordinate::new(13.0827, 80.2707) },
            // Mysuru
            Place { id: 2, at: Coordinate::new(12.2958, 76.6394) },
            // Invalid location
            Place { id: 3, at: Coordinate::new(100.0, 0.0) },
            // Cubbon Park
            Place { id: 4, at: Coordinate::new(12.9763, 77.5929) },
        ]
    }

    #[test]
    fn test_batch_distances() {
        let origin = Coordinate::new(12.9716, 77.5946);
        let places = create_test_places();
        let distances = distances_from(&origin, &places, |p| p.at);

        assert_eq!(distances.len(), 4);
        assert!(distances[3] < 1000.0);
        assert!(distances[2].is_infinite());
    }

    #[test]
    fn test_sorted_by_distance() {
        let origin = Coordinate::new(12.9716, 77.5946);
        let sorted = sort_by_distance(&origin, create_test_places(), |p| p.at);

        let ids: Vec<u32> = sorted.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_distances() {
        let origin = Coordinate::new(0.0, 0.0);
        let same = Coordinate::new(0.01, 0.0);
        let places = vec![
            Place { id: 7, at: same },
            Place { id: 3, at: same },
            Place { id: 5, at: same },
        ];

        let sorted = sort_by_distance(&origin, places, |p| p.at);
        let ids: Vec<u32> = sorted.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![7, 3, 5]);
    }

    #[test]
    fn test_empty_input() {
        let origin = Coordinate::new(0.0, 0.0);
        let sorted: Vec<Place> = sort_by_distance(&origin, Vec::new(), |p| p.at);
        assert!(sorted.is_empty());
    }
}
