//! Grid sampling around a map center

use crate::data::GridPoint;

/// Kilometres per degree of latitude (flat approximation used for both axes)
pub const KM_PER_DEGREE: f64 = 111.0;

/// `n` evenly spaced values over [lo, hi], endpoints included
fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

pub struct GridSampler;

impl GridSampler {
    /// `resolution²` points over `center ± radius_km / 111` on both axes.
    ///
    /// Row-major: latitude is the outer loop, longitude the inner one.
    pub fn generate(center: GridPoint, radius_km: f64, resolution: usize) -> Vec<GridPoint> {
        let delta = radius_km / KM_PER_DEGREE;
        let lats = linspace(center.latitude - delta, center.latitude + delta, resolution);
        let lons = linspace(center.longitude - delta, center.longitude + delta, resolution);

        lats.iter()
            .flat_map(|&lat| lons.iter().map(move |&lon| GridPoint::new(lat, lon)))
            .collect()
    }
}
