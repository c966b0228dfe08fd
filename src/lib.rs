//! tui_cluster: zoom-aware point clustering for map layers.
//!
//! Modules:
//! - cluster: the clustering index contract, feature types, and a grid-based index
//! - layer: the clustering layer (cached index, per-zoom visible set, pick enrichment)
//! - render: icon and node sub-layer descriptions and their drawable instances
//! - geo: Web Mercator helpers shared by the index and hosts
pub mod cluster;
pub mod error;
pub mod geo;
pub mod layer;
pub mod render;

/// Common types. Import with `use tui_cluster::prelude::*;`.
pub mod prelude {
    pub use crate::cluster::{
        ClusterIndex, ClusterOptions, ClusterProperties, Feature, FeatureProperties, GridCluster,
    };
    pub use crate::error::{ClusterError, LayerError, Result};
    pub use crate::geo::WORLD_BOUNDS;
    pub use crate::layer::{
        ChangeFlags, GeoPoint, LayerProps, PickInfo, PickMode, PickingInfo, RenderedLayers,
        SuperClusterLayer, UpdateOutcome,
    };
    pub use crate::render::{
        Accessor, AlignmentBaseline, Color, IconInstance, IconLayer, IconMapping, NodeInstance,
        NodeLayer, SizeUnits, TextAnchor,
    };
}
