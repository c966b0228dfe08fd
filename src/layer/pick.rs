use crate::cluster::{Feature, FeatureProperties};

/// Kind of interaction that produced a pick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickMode {
    /// Pointer moving over the map; fired every frame
    Hover,
    Click,
    /// Programmatic lookup
    Query,
}

/// Raw pick result from a sub-layer
#[derive(Clone, Debug, PartialEq)]
pub struct PickInfo<P> {
    pub layer_id: String,
    /// Index into the sub-layer data
    pub index: Option<usize>,
    /// Screen position of the pointer
    pub pixel: Option<(i32, i32)>,
    /// `[lng, lat]` under the pointer
    pub coordinate: Option<[f64; 2]>,
    pub object: Option<Feature<P>>,
}

/// Pick result returned to the host
#[derive(Clone, Debug, PartialEq)]
pub struct PickingInfo<P> {
    pub layer_id: String,
    pub index: Option<usize>,
    pub pixel: Option<(i32, i32)>,
    pub coordinate: Option<[f64; 2]>,
    /// Cluster metadata or the original point
    pub object: Option<FeatureProperties<P>>,
    /// Every original point under a picked cluster
    pub objects: Option<Vec<P>>,
    /// Zoom at which a picked cluster splits
    pub cluster_expansion_zoom: Option<u8>,
}

impl<P> PickingInfo<P> {
    pub(crate) fn from_pick(info: PickInfo<P>) -> Self {
        Self {
            layer_id: info.layer_id,
            index: info.index,
            pixel: info.pixel,
            coordinate: info.coordinate,
            object: info.object.map(|f| f.properties),
            objects: None,
            cluster_expansion_zoom: None,
        }
    }
}
