//! The clustering layer: caches a cluster index and the visible feature set for the
//! current integer zoom, and turns them into an icon layer and a node layer.

mod change;
mod pick;
mod props;

pub use change::ChangeFlags;
pub use pick::{PickInfo, PickMode, PickingInfo};
pub use props::{default_circle_radius, default_text_size, GeoPoint, LayerProps};

use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::cluster::{ClusterIndex, Feature, FeatureProperties, GridCluster};
use crate::error::{LayerError, Result};
use crate::geo::WORLD_BOUNDS;
use crate::render::{Accessor, IconLayer, NodeLayer};

/// Derived state, replaced wholesale whenever it goes stale
struct ClusterState<P, I> {
    index: I,
    /// Integer zoom `data` was computed for
    z: i32,
    data: Arc<Vec<Feature<P>>>,
}

/// What an update cycle did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub rebuilt: bool,
    pub recomputed: bool,
}

/// The two sub-layers a [`SuperClusterLayer`] renders into
pub struct RenderedLayers<P> {
    pub icon: IconLayer<P>,
    pub node: NodeLayer<P>,
}

pub struct SuperClusterLayer<P, I = GridCluster<P>> {
    props: LayerProps<P>,
    /// Viewport zoom of the last update
    zoom: Option<f64>,
    state: Option<ClusterState<P, I>>,
}

impl<P, I> SuperClusterLayer<P, I>
where
    P: Clone + Send + Sync + 'static,
    I: ClusterIndex<P>,
{
    /// Create a layer; nothing is computed until the first update
    pub fn new(props: LayerProps<P>) -> Self {
        Self {
            props,
            zoom: None,
            state: None,
        }
    }

    pub fn props(&self) -> &LayerProps<P> {
        &self.props
    }

    /// Visible features for the cached integer zoom
    pub fn data(&self) -> Option<&Arc<Vec<Feature<P>>>> {
        self.state.as_ref().map(|s| &s.data)
    }

    /// Integer zoom the visible features were computed for
    pub fn zoom_level(&self) -> Option<i32> {
        self.state.as_ref().map(|s| s.z)
    }

    pub fn index(&self) -> Option<&I> {
        self.state.as_ref().map(|s| &s.index)
    }

    /// Run an update cycle with new props at the given viewport zoom.
    ///
    /// The index is rebuilt when the data set, `size_scale` or the cluster options
    /// change; the visible set is recomputed after a rebuild or when `floor(zoom)` moves.
    /// On error the layer keeps its previous props and state.
    pub fn update_state(&mut self, props: LayerProps<P>, zoom: f64) -> Result<UpdateOutcome> {
        let old = self.state.as_ref().map(|_| &self.props);
        let flags = ChangeFlags::diff(old, &props, self.zoom, zoom);
        if !flags.something_changed() {
            trace!(layer = %props.id, zoom, "nothing changed");
            return Ok(UpdateOutcome::default());
        }

        let z = zoom.floor() as i32;
        let mut outcome = UpdateOutcome::default();

        if self.state.is_none() || flags.requires_rebuild() {
            let index = Self::build_index(&props)?;
            let data = Arc::new(index.get_clusters(WORLD_BOUNDS, z));
            debug!(layer = %props.id, z, features = data.len(), ?flags, "cluster index rebuilt");
            self.state = Some(ClusterState { index, z, data });
            outcome = UpdateOutcome {
                rebuilt: true,
                recomputed: true,
            };
        } else if let Some(state) = self.state.as_mut() {
            if state.z != z {
                state.data = Arc::new(state.index.get_clusters(WORLD_BOUNDS, z));
                state.z = z;
                outcome.recomputed = true;
                debug!(layer = %props.id, z, features = state.data.len(), "visible clusters recomputed");
            }
        }

        self.props = props;
        self.zoom = Some(zoom);
        Ok(outcome)
    }

    /// Run an update cycle for a viewport change only
    pub fn update_zoom(&mut self, zoom: f64) -> Result<UpdateOutcome> {
        self.update_state(self.props.clone(), zoom)
    }

    fn build_index(props: &LayerProps<P>) -> Result<I> {
        let points = props
            .data
            .par_iter()
            .enumerate()
            .map(|(index, point)| {
                let position = props
                    .get_position
                    .get(point)
                    .ok_or(LayerError::MissingPosition { index })?;
                Ok(Feature::point(position, point.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut index = I::new(props.cluster_options());
        index.load(points);
        Ok(index)
    }

    /// Unwrap a sub-layer pick to the original properties; clusters picked by anything
    /// other than hover also carry their leaves and expansion zoom.
    pub fn get_picking_info(&self, info: PickInfo<P>, mode: PickMode) -> Result<PickingInfo<P>> {
        let mut picked = PickingInfo::from_pick(info);

        if mode == PickMode::Hover {
            return Ok(picked);
        }
        let (Some(FeatureProperties::Cluster(cluster)), Some(state)) = (&picked.object, &self.state)
        else {
            return Ok(picked);
        };

        let leaves = state
            .index
            .get_leaves(cluster.cluster_id, usize::MAX, 0)?
            .into_iter()
            .filter_map(Feature::into_point)
            .collect();
        let expansion_zoom = state.index.get_cluster_expansion_zoom(cluster.cluster_id)?;

        picked.objects = Some(leaves);
        picked.cluster_expansion_zoom = Some(expansion_zoom);
        Ok(picked)
    }

    /// Build the icon and node sub-layers over the visible features
    pub fn render_layers(&self) -> RenderedLayers<P> {
        let props = &self.props;
        let data = self
            .data()
            .cloned()
            .unwrap_or_else(|| Arc::new(Vec::new()));

        let get_icon = props.get_icon.clone();
        let icon = IconLayer {
            id: format!("{}__icon", props.id),
            data: Arc::clone(&data),
            pickable: props.pickable,
            icon_atlas: props.icon_atlas.clone(),
            icon_mapping: Arc::clone(&props.icon_mapping),
            size_scale: props.size_scale,
            size_units: props.size_units,
            size_min_pixels: props.size_min_pixels,
            size_max_pixels: props.size_max_pixels,
            billboard: props.billboard,
            alpha_cutoff: props.alpha_cutoff,
            get_icon: Accessor::function(move |f: &Feature<P>| match &f.properties {
                FeatureProperties::Point(point) => get_icon.get(point),
                // Clusters are drawn by the node layer
                FeatureProperties::Cluster(_) => None,
            }),
            get_size: props.get_icon_size.clone(),
            get_color: props.get_icon_color.clone(),
            get_angle: props.get_icon_angle.clone(),
            get_pixel_offset: props.get_icon_pixel_offset.clone(),
        };

        let node = NodeLayer {
            id: format!("{}__node", props.id),
            data,
            pickable: props.pickable,
            get_text: Accessor::function(|f: &Feature<P>| {
                f.properties.cluster().map(|c| c.point_count.to_string())
            }),
            get_text_size: props.get_text_size.clone(),
            get_text_angle: props.get_text_angle.clone(),
            get_text_anchor: props.get_text_anchor.clone(),
            get_text_alignment_baseline: props.get_text_alignment_baseline.clone(),
            get_text_color: props.get_text_color.clone(),
            get_circle_radius: props.get_circle_radius.clone(),
            get_circle_fill_color: props.get_circle_fill_color.clone(),
        };

        RenderedLayers { icon, node }
    }
}
