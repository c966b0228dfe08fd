use rayon::prelude::*;
use std::sync::Arc;

use super::{Accessor, Color};
use crate::cluster::Feature;

/// Horizontal placement of text relative to its position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

/// Vertical placement of text relative to its position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignmentBaseline {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Node sub-layer: a filled circle with centred text per feature
pub struct NodeLayer<P> {
    pub id: String,
    pub data: Arc<Vec<Feature<P>>>,
    pub pickable: bool,
    pub get_text: Accessor<Feature<P>, Option<String>>,
    pub get_text_size: Accessor<Feature<P>, f32>,
    pub get_text_angle: Accessor<Feature<P>, f32>,
    pub get_text_anchor: Accessor<Feature<P>, TextAnchor>,
    pub get_text_alignment_baseline: Accessor<Feature<P>, AlignmentBaseline>,
    pub get_text_color: Accessor<Feature<P>, Color>,
    pub get_circle_radius: Accessor<Feature<P>, f32>,
    pub get_circle_fill_color: Accessor<Feature<P>, Color>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeInstance {
    /// Index of the source feature in the layer data
    pub index: usize,
    pub position: [f64; 2],
    pub text: Option<String>,
    pub text_size: f32,
    pub text_angle: f32,
    pub text_anchor: TextAnchor,
    pub alignment_baseline: AlignmentBaseline,
    pub text_color: Color,
    pub circle_radius: f32,
    pub circle_fill_color: Color,
}

impl NodeInstance {
    /// Whether anything would be drawn
    pub fn is_visible(&self) -> bool {
        self.circle_radius > 0.0 || (self.text.is_some() && self.text_size > 0.0)
    }
}

impl<P: Send + Sync> NodeLayer<P> {
    pub fn instances(&self) -> Vec<NodeInstance> {
        self.data
            .par_iter()
            .enumerate()
            .map(|(index, feature)| NodeInstance {
                index,
                position: feature.geometry,
                text: self.get_text.get(feature),
                text_size: self.get_text_size.get(feature),
                text_angle: self.get_text_angle.get(feature),
                text_anchor: self.get_text_anchor.get(feature),
                alignment_baseline: self.get_text_alignment_baseline.get(feature),
                text_color: self.get_text_color.get(feature),
                circle_radius: self.get_circle_radius.get(feature),
                circle_fill_color: self.get_circle_fill_color.get(feature),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterProperties;

    #[test]
    fn test_instances_follow_accessors() {
        let layer: NodeLayer<u32> = NodeLayer {
            id: "n".to_string(),
            data: Arc::new(vec![
                Feature::cluster([0.0, 0.0], ClusterProperties::new(1, 12)),
                Feature::point([1.0, 1.0], 7),
            ]),
            pickable: false,
            get_text: Accessor::function(|f: &Feature<u32>| {
                f.properties.cluster().map(|c| c.point_count.to_string())
            }),
            get_text_size: Accessor::function(|f: &Feature<u32>| if f.is_cluster() { 20.0 } else { 0.0 }),
            get_text_angle: Accessor::constant(0.0),
            get_text_anchor: Accessor::constant(TextAnchor::Middle),
            get_text_alignment_baseline: Accessor::constant(AlignmentBaseline::Center),
            get_text_color: Accessor::constant([255, 255, 255, 250]),
            get_circle_radius: Accessor::function(|f: &Feature<u32>| if f.is_cluster() { 16.0 } else { 0.0 }),
            get_circle_fill_color: Accessor::constant([54, 164, 255, 250]),
        };

        let instances = layer.instances();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].text.as_deref(), Some("12"));
        assert!(instances[0].is_visible());
        assert_eq!(instances[1].text, None);
        assert_eq!(instances[1].circle_radius, 0.0);
        assert!(!instances[1].is_visible());
    }
}
