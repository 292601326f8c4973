//! Safe-zone ranking
//!
//! A safe zone is a grid point with low juvenile risk and confident
//! availability. Ranked by availability probability, then quantity.

use crate::data::ScoredPoint;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZoneCriteria {
    /// Juvenile probability must be strictly below this
    pub max_juvenile_probability: f64,
    /// Availability probability must be strictly above this
    pub min_availability_probability: f64,
    pub limit: usize,
}

impl Default for SafeZoneCriteria {
    fn default() -> Self {
        Self {
            max_juvenile_probability: 0.4,
            min_availability_probability: 0.5,
            limit: 8,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SafeZoneRanker {
    criteria: SafeZoneCriteria,
}

impl SafeZoneRanker {
    pub fn new(criteria: SafeZoneCriteria) -> Self {
        Self { criteria }
    }

    pub fn is_safe(&self, point: &ScoredPoint) -> bool {
        point.juvenile_probability < self.criteria.max_juvenile_probability
            && point.availability_probability > self.criteria.min_availability_probability
    }

    /// Best safe points, at most `limit`. Empty means no safe zone, not an error.
    pub fn rank(&self, points: &[ScoredPoint]) -> Vec<ScoredPoint> {
        let mut safe: Vec<ScoredPoint> = points.iter().filter(|p| self.is_safe(p)).copied().collect();

        // Stable: ties keep grid order
        safe.sort_by(compare_zones);
        safe.truncate(self.criteria.limit);
        safe
    }
}

/// Descending by availability probability, then quantity
pub fn compare_zones(a: &ScoredPoint, b: &ScoredPoint) -> Ordering {
    b.availability_probability
        .total_cmp(&a.availability_probability)
        .then_with(|| b.quantity_kg.total_cmp(&a.quantity_kg))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, availability: f64, juvenile: f64, quantity: f64) -> ScoredPoint {
        ScoredPoint {
            latitude: lat,
            longitude: 80.0,
            availability_probability: availability,
            juvenile_probability: juvenile,
            quantity_kg: quantity,
        }
    }

    #[test]
    fn test_filter_thresholds_are_strict() {
        let ranker = SafeZoneRanker::default();
        assert!(!ranker.is_safe(&point(0.0, 0.9, 0.4, 100.0)));
        assert!(!ranker.is_safe(&point(0.0, 0.5, 0.1, 100.0)));
        assert!(ranker.is_safe(&point(0.0, 0.51, 0.39, 100.0)));
    }

    #[test]
    fn test_ranking_order_and_limit() {
        let points: Vec<_> = (0..20)
            .map(|i| point(i as f64, 0.6 + (i % 4) as f64 * 0.1, 0.1, i as f64 * 10.0))
            .collect();
        let ranked = SafeZoneRanker::default().rank(&points);

        assert_eq!(ranked.len(), 8);
        // Highest availability first (0.9), then larger quantity first
        assert_eq!(ranked[0].latitude, 19.0);
        assert_eq!(ranked[1].latitude, 15.0);
        for pair in ranked.windows(2) {
            assert_ne!(compare_zones(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn test_no_safe_zone() {
        let points = vec![point(0.0, 0.2, 0.9, 500.0), point(1.0, 0.9, 0.8, 500.0)];
        assert!(SafeZoneRanker::default().rank(&points).is_empty());
    }
}
