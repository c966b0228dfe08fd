use glam::DVec2;
use std::f64::consts::PI;

/// Bounds queried for the visible cluster set: `[min_lng, min_lat, max_lng, max_lat]`.
/// Latitude stops at ±85 where Web Mercator runs out.
pub const WORLD_BOUNDS: [f64; 4] = [-180.0, -85.0, 180.0, 85.0];

/// Wrap longitude into [-180, 180)
#[inline(always)]
pub fn wrap_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

/// Longitude to normalized Web Mercator x in [0, 1]
#[inline(always)]
pub fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Latitude to normalized Web Mercator y in [0, 1] (0 = north), clamped at the poles
#[inline(always)]
pub fn lat_y(lat: f64) -> f64 {
    let sin = (lat * PI / 180.0).sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

#[inline(always)]
pub fn x_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

#[inline(always)]
pub fn y_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0) * PI / 180.0;
    360.0 * y2.exp().atan() / PI - 90.0
}

/// Project a `[lng, lat]` pair into the unit Mercator square
#[inline(always)]
pub fn to_mercator(position: [f64; 2]) -> DVec2 {
    DVec2::new(lng_x(position[0]), lat_y(position[1]))
}

#[inline(always)]
pub fn from_mercator(p: DVec2) -> [f64; 2] {
    [x_lng(p.x), y_lat(p.y)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_lng() {
        assert_eq!(wrap_lng(-180.0), -180.0);
        assert_eq!(wrap_lng(180.0), -180.0);
        assert!((wrap_lng(190.0) - -170.0).abs() < 1e-9);
        assert!((wrap_lng(-190.0) - 170.0).abs() < 1e-9);
    }

    #[test]
    fn test_mercator_origin() {
        let p = to_mercator([0.0, 0.0]);
        assert!((p.x - 0.5).abs() < 1e-12);
        assert!((p.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_poles_clamp() {
        assert_eq!(lat_y(90.0), 0.0);
        assert_eq!(lat_y(-90.0), 1.0);
    }

    #[test]
    fn test_mercator_inverse() {
        for &(lng, lat) in &[(-122.4, 37.8), (139.7, 35.7), (-58.4, -34.6), (0.0, 84.0)] {
            let [lng2, lat2] = from_mercator(to_mercator([lng, lat]));
            assert!((lng - lng2).abs() < 1e-9, "{lng} vs {lng2}");
            assert!((lat - lat2).abs() < 1e-9, "{lat} vs {lat2}");
        }
    }
}
