use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::{Accessor, Color};
use crate::cluster::Feature;

/// Units `get_size` is expressed in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SizeUnits {
    #[default]
    Pixels,
    Meters,
    Common,
}

/// Location of one icon inside the atlas
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IconMapping {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub anchor_x: Option<f32>,
    pub anchor_y: Option<f32>,
    /// Tint with `get_color` instead of using the atlas colors
    pub mask: bool,
}

/// Icon sub-layer: one marker per feature that resolves to an icon name
pub struct IconLayer<P> {
    pub id: String,
    pub data: Arc<Vec<Feature<P>>>,
    pub pickable: bool,
    pub icon_atlas: String,
    pub icon_mapping: Arc<HashMap<String, IconMapping>>,
    pub size_scale: f32,
    pub size_units: SizeUnits,
    pub size_min_pixels: f32,
    pub size_max_pixels: f32,
    pub billboard: bool,
    pub alpha_cutoff: f32,
    pub get_icon: Accessor<Feature<P>, Option<String>>,
    pub get_size: Accessor<Feature<P>, f32>,
    pub get_color: Accessor<Feature<P>, Color>,
    pub get_angle: Accessor<Feature<P>, f32>,
    pub get_pixel_offset: Accessor<Feature<P>, [f32; 2]>,
}

/// A resolved icon ready to draw
#[derive(Clone, Debug, PartialEq)]
pub struct IconInstance {
    /// Index of the source feature in the layer data
    pub index: usize,
    pub position: [f64; 2],
    pub icon: String,
    /// `get_size * size_scale`, clamped to the pixel bounds when sized in pixels
    pub size: f32,
    pub color: Color,
    pub angle: f32,
    pub pixel_offset: [f32; 2],
}

impl<P: Send + Sync> IconLayer<P> {
    pub fn instances(&self) -> Vec<IconInstance> {
        self.data
            .par_iter()
            .enumerate()
            .filter_map(|(index, feature)| {
                let icon = self.get_icon.get(feature)?;
                if !self.icon_mapping.is_empty() && !self.icon_mapping.contains_key(&icon) {
                    warn!(layer = %self.id, icon = %icon, "icon missing from mapping");
                    return None;
                }

                let mut size = self.get_size.get(feature) * self.size_scale;
                if self.size_units == SizeUnits::Pixels {
                    size = size.max(self.size_min_pixels).min(self.size_max_pixels);
                }

                Some(IconInstance {
                    index,
                    position: feature.geometry,
                    icon,
                    size,
                    color: self.get_color.get(feature),
                    angle: self.get_angle.get(feature),
                    pixel_offset: self.get_pixel_offset.get(feature),
                })
            })
            .collect()
    }
}
