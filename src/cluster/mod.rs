//! Clustering index contract plus the feature types it produces.
//!
//! The layer only talks to an index through [`ClusterIndex`]. [`GridCluster`] is the
//! reference implementation used by default.

mod grid;
mod spatial;

pub use grid::{GridCluster, MAX_INDEX_ZOOM};
pub use spatial::SpatialGrid;

use crate::error::ClusterError;

/// Metadata carried by a synthetic cluster feature
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterProperties {
    pub cluster_id: usize,
    pub point_count: usize,
    /// Short form of `point_count` for labels ("950", "2.5k", "12k")
    pub point_count_abbreviated: String,
}

impl ClusterProperties {
    pub fn new(cluster_id: usize, point_count: usize) -> Self {
        Self {
            cluster_id,
            point_count,
            point_count_abbreviated: abbreviate_count(point_count),
        }
    }
}

/// Either an aggregate of nearby points or a pass-through original point
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureProperties<P> {
    Cluster(ClusterProperties),
    Point(P),
}

impl<P> FeatureProperties<P> {
    pub fn is_cluster(&self) -> bool {
        matches!(self, FeatureProperties::Cluster(_))
    }

    pub fn cluster(&self) -> Option<&ClusterProperties> {
        match self {
            FeatureProperties::Cluster(c) => Some(c),
            FeatureProperties::Point(_) => None,
        }
    }

    pub fn point(&self) -> Option<&P> {
        match self {
            FeatureProperties::Point(p) => Some(p),
            FeatureProperties::Cluster(_) => None,
        }
    }

    /// Number of original points this feature stands for
    pub fn point_count(&self) -> usize {
        match self {
            FeatureProperties::Cluster(c) => c.point_count,
            FeatureProperties::Point(_) => 1,
        }
    }
}

/// A positioned entry produced by (or loaded into) a clustering index
#[derive(Clone, Debug, PartialEq)]
pub struct Feature<P> {
    /// `[lng, lat]`
    pub geometry: [f64; 2],
    pub properties: FeatureProperties<P>,
}

impl<P> Feature<P> {
    pub fn point(geometry: [f64; 2], point: P) -> Self {
        Self {
            geometry,
            properties: FeatureProperties::Point(point),
        }
    }

    pub fn cluster(geometry: [f64; 2], cluster: ClusterProperties) -> Self {
        Self {
            geometry,
            properties: FeatureProperties::Cluster(cluster),
        }
    }

    pub fn is_cluster(&self) -> bool {
        self.properties.is_cluster()
    }

    pub fn into_point(self) -> Option<P> {
        match self.properties {
            FeatureProperties::Point(p) => Some(p),
            FeatureProperties::Cluster(_) => None,
        }
    }
}

/// Abbreviate a point count the way cluster labels usually show it
pub fn abbreviate_count(count: usize) -> String {
    if count >= 10_000 {
        format!("{}k", (count as f64 / 1000.0).round())
    } else if count >= 1000 {
        format!("{}k", (count as f64 / 100.0).round() / 10.0)
    } else {
        count.to_string()
    }
}

/// Tuning for a clustering index
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterOptions {
    /// Lowest zoom at which clusters are generated
    pub min_zoom: u8,
    /// Highest zoom at which clusters are generated; above it every point stands alone
    pub max_zoom: u8,
    /// Minimum number of points to form a cluster
    pub min_points: usize,
    /// Cluster radius in pixels, relative to `extent`
    pub radius: f64,
    /// Tile extent the radius is measured against
    pub extent: f64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            min_zoom: 0,
            max_zoom: 16,
            min_points: 2,
            radius: 40.0,
            extent: 512.0,
        }
    }
}

impl ClusterOptions {
    pub fn new(max_zoom: u8, radius: f64) -> Self {
        Self {
            max_zoom,
            radius,
            ..Self::default()
        }
    }

    /// Search radius in normalized Mercator units at zoom `z`
    pub fn radius_at(&self, z: u8) -> f64 {
        self.radius / (self.extent * 2f64.powi(z as i32))
    }
}

/// Hierarchical point clustering index
pub trait ClusterIndex<P> {
    fn new(options: ClusterOptions) -> Self
    where
        Self: Sized;

    /// Replace the index contents with `points`
    fn load(&mut self, points: Vec<Feature<P>>);

    /// Clusters and pass-through points inside `bbox` (`[min_lng, min_lat, max_lng, max_lat]`)
    /// at integer `zoom`
    fn get_clusters(&self, bbox: [f64; 4], zoom: i32) -> Vec<Feature<P>>;

    /// Direct children of a cluster, one zoom level deeper
    fn get_children(&self, cluster_id: usize) -> Result<Vec<Feature<P>>, ClusterError>;

    /// Original points under a cluster, skipping `offset` and returning at most `limit`
    fn get_leaves(
        &self,
        cluster_id: usize,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Feature<P>>, ClusterError>;

    /// Zoom at which the cluster splits into more than one child
    fn get_cluster_expansion_zoom(&self, cluster_id: usize) -> Result<u8, ClusterError>;
}
