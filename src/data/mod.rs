use anyhow::{bail, Context, Result};
use geojson::{Feature, GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use tui_cluster::layer::GeoPoint;

use crate::hash::{hash2, rand_simple};

/// Population centres the synthetic points gather around: (lon, lat, name, spread in degrees)
const HUBS: [(f64, f64, &str, f64); 13] = [
    (-74.0, 40.7, "New York", 1.5),
    (-0.1, 51.5, "London", 1.0),
    (2.3, 48.9, "Paris", 1.0),
    (139.7, 35.7, "Tokyo", 1.5),
    (151.2, -33.9, "Sydney", 1.0),
    (-43.2, -22.9, "Rio", 1.2),
    (37.6, 55.8, "Moscow", 1.2),
    (116.4, 39.9, "Beijing", 1.5),
    (77.2, 28.6, "Delhi", 1.5),
    (-118.2, 34.0, "Los Angeles", 1.5),
    (-77.0, 38.9, "Washington", 0.8),
    (-99.1, 19.4, "Mexico City", 1.2),
    (-58.4, -34.6, "Buenos Aires", 1.0),
];

/// Icon names cycled through by synthetic points
const ICONS: [&str; 3] = ["marker", "pin", "star"];

/// Load point features from a GeoJSON file. Features without a `Point` geometry are skipped.
pub fn load_points(path: &Path) -> Result<Vec<Feature>> {
    let mut bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let geojson: GeoJson = simd_json::serde::from_slice(&mut bytes)
        .with_context(|| format!("parsing {}", path.display()))?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => bail!("{} holds a bare geometry, expected features", path.display()),
    };

    let total = features.len();
    let points: Vec<Feature> = features.into_iter().filter(|f| f.position().is_some()).collect();
    if points.len() < total {
        warn!(skipped = total - points.len(), "features without a point geometry");
    }
    info!(points = points.len(), path = %path.display(), "loaded points");
    Ok(points)
}

/// Deterministic points scattered around the hubs, with `name` and `icon` properties
pub fn generate_synthetic(count: usize) -> Vec<Feature> {
    (0..count as u64)
        .map(|i| {
            let (hub_lon, hub_lat, hub, spread) = HUBS[(hash2(i, 17) % HUBS.len() as u64) as usize];

            // Denser towards the centre
            let angle = rand_simple(hash2(i, 1)) * std::f64::consts::TAU;
            let dist = rand_simple(hash2(i, 2)).powi(2) * spread;
            let lon = hub_lon + dist * angle.cos();
            let lat = (hub_lat + dist * angle.sin()).clamp(-85.0, 85.0);

            let mut feature = Feature::from(Geometry::new(Value::Point(vec![lon, lat])));
            feature.set_property("name", format!("{hub} #{i}"));
            feature.set_property("icon", ICONS[i as usize % ICONS.len()]);
            feature
        })
        .collect()
}
