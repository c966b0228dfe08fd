use geojson::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::cluster::{ClusterOptions, Feature, FeatureProperties};
use crate::render::{Accessor, AlignmentBaseline, Color, IconMapping, SizeUnits, TextAnchor};

/// Input points the default accessors know how to read
pub trait GeoPoint {
    /// `[lng, lat]`
    fn position(&self) -> Option<[f64; 2]>;

    /// Icon name in the icon mapping
    fn icon(&self) -> Option<String> {
        None
    }
}

/// GeoJSON point features: position from a `Point` geometry, icon from the `"icon"` property
impl GeoPoint for geojson::Feature {
    fn position(&self) -> Option<[f64; 2]> {
        match &self.geometry.as_ref()?.value {
            Value::Point(coords) if coords.len() >= 2 => Some([coords[0], coords[1]]),
            _ => None,
        }
    }

    fn icon(&self) -> Option<String> {
        self.property("icon")?.as_str().map(str::to_owned)
    }
}

/// Label size for a cluster grows with the square root of its order of magnitude.
/// Leaves get no label.
pub fn default_text_size<P>(feature: &Feature<P>) -> f32 {
    match &feature.properties {
        FeatureProperties::Cluster(c) => {
            let magnitude = (c.point_count as f64).log10().ceil().max(0.0);
            (20.0 * magnitude.sqrt()) as f32
        }
        FeatureProperties::Point(_) => 0.0,
    }
}

pub fn default_circle_radius<P>(feature: &Feature<P>) -> f32 {
    0.8 * default_text_size(feature)
}

/// Layer configuration. Every field is independently overridable; `Default` (for
/// [`GeoPoint`] data) enumerates every default in one place.
pub struct LayerProps<P> {
    pub id: String,
    pub data: Arc<Vec<P>>,

    // cluster props
    pub max_zoom: u8,
    pub radius: f64,

    // icon props
    pub icon_atlas: String,
    pub icon_mapping: Arc<HashMap<String, IconMapping>>,
    /// Changing it rebuilds the cluster index
    pub size_scale: f32,
    pub size_units: SizeUnits,
    pub size_min_pixels: f32,
    pub size_max_pixels: f32,
    pub billboard: bool,
    pub alpha_cutoff: f32,
    /// Called with the original point; clusters never get an icon
    pub get_icon: Accessor<P, Option<String>>,
    pub get_icon_size: Accessor<Feature<P>, f32>,
    pub get_icon_color: Accessor<Feature<P>, Color>,
    pub get_icon_angle: Accessor<Feature<P>, f32>,
    pub get_icon_pixel_offset: Accessor<Feature<P>, [f32; 2]>,

    // node props
    pub get_text_size: Accessor<Feature<P>, f32>,
    pub get_text_angle: Accessor<Feature<P>, f32>,
    pub get_text_anchor: Accessor<Feature<P>, TextAnchor>,
    pub get_text_alignment_baseline: Accessor<Feature<P>, AlignmentBaseline>,
    pub get_text_color: Accessor<Feature<P>, Color>,
    pub get_circle_radius: Accessor<Feature<P>, f32>,
    pub get_circle_fill_color: Accessor<Feature<P>, Color>,

    pub get_position: Accessor<P, Option<[f64; 2]>>,
    pub pickable: bool,
}

impl<P: 'static> LayerProps<P> {
    /// Defaults for any point type; only position and icon need to be supplied
    pub fn with_accessors(
        data: Arc<Vec<P>>,
        get_position: Accessor<P, Option<[f64; 2]>>,
        get_icon: Accessor<P, Option<String>>,
    ) -> Self {
        Self {
            id: "superclusterlayer".to_string(),
            data,

            max_zoom: 10,
            radius: 40.0,

            icon_atlas: String::new(),
            icon_mapping: Arc::new(HashMap::new()),
            size_scale: 1.0,
            size_units: SizeUnits::Pixels,
            size_min_pixels: 0.0,
            size_max_pixels: f32::MAX,
            billboard: true,
            alpha_cutoff: 0.05,
            get_icon,
            get_icon_size: Accessor::constant(32.0),
            get_icon_color: Accessor::constant([0, 0, 0, 255]),
            get_icon_angle: Accessor::constant(0.0),
            get_icon_pixel_offset: Accessor::constant([0.0, 0.0]),

            get_text_size: Accessor::function(default_text_size::<P>),
            get_text_angle: Accessor::constant(0.0),
            get_text_anchor: Accessor::constant(TextAnchor::Middle),
            get_text_alignment_baseline: Accessor::constant(AlignmentBaseline::Center),
            get_text_color: Accessor::constant([255, 255, 255, 250]),
            get_circle_radius: Accessor::function(default_circle_radius::<P>),
            get_circle_fill_color: Accessor::constant([54, 164, 255, 250]),

            get_position,
            pickable: true,
        }
    }

    pub fn cluster_options(&self) -> ClusterOptions {
        ClusterOptions::new(self.max_zoom, self.radius)
    }
}

impl<P: GeoPoint + 'static> Default for LayerProps<P> {
    fn default() -> Self {
        Self::with_accessors(
            Arc::new(Vec::new()),
            Accessor::function(|p: &P| p.position()),
            Accessor::function(|p: &P| p.icon()),
        )
    }
}

impl<P> Clone for LayerProps<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            data: Arc::clone(&self.data),
            max_zoom: self.max_zoom,
            radius: self.radius,
            icon_atlas: self.icon_atlas.clone(),
            icon_mapping: Arc::clone(&self.icon_mapping),
            size_scale: self.size_scale,
            size_units: self.size_units,
            size_min_pixels: self.size_min_pixels,
            size_max_pixels: self.size_max_pixels,
            billboard: self.billboard,
            alpha_cutoff: self.alpha_cutoff,
            get_icon: self.get_icon.clone(),
            get_icon_size: self.get_icon_size.clone(),
            get_icon_color: self.get_icon_color.clone(),
            get_icon_angle: self.get_icon_angle.clone(),
            get_icon_pixel_offset: self.get_icon_pixel_offset.clone(),
            get_text_size: self.get_text_size.clone(),
            get_text_angle: self.get_text_angle.clone(),
            get_text_anchor: self.get_text_anchor.clone(),
            get_text_alignment_baseline: self.get_text_alignment_baseline.clone(),
            get_text_color: self.get_text_color.clone(),
            get_circle_radius: self.get_circle_radius.clone(),
            get_circle_fill_color: self.get_circle_fill_color.clone(),
            get_position: self.get_position.clone(),
            pickable: self.pickable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterProperties;

    fn cluster(point_count: usize) -> Feature<geojson::Feature> {
        Feature::cluster([0.0, 0.0], ClusterProperties::new(0, point_count))
    }

    fn geojson_point(json: &str) -> geojson::Feature {
        json.parse().unwrap()
    }

    #[test]
    fn test_default_text_size_for_hundred_points() {
        let size = default_text_size(&cluster(100));
        assert!((size - 28.284_271).abs() < 1e-4, "{size}");
        let radius = default_circle_radius(&cluster(100));
        assert!((radius - 22.627_417).abs() < 1e-4, "{radius}");
    }

    #[test]
    fn test_default_text_size_grows_sublinearly() {
        assert_eq!(default_text_size(&cluster(10)), 20.0);
        assert!(default_text_size(&cluster(11)) > 20.0);
        assert!(default_text_size(&cluster(1000)) < 2.0 * default_text_size(&cluster(11)));
    }

    #[test]
    fn test_leaves_have_no_label() {
        let leaf = Feature::point([0.0, 0.0], geojson_point(POINT));
        assert_eq!(default_text_size(&leaf), 0.0);
        assert_eq!(default_circle_radius(&leaf), 0.0);
    }

    const POINT: &str = r#"{
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [2.35, 48.85] },
        "properties": { "name": "Paris", "icon": "marker" }
    }"#;

    #[test]
    fn test_geojson_point_accessors() {
        let feature = geojson_point(POINT);
        assert_eq!(feature.position(), Some([2.35, 48.85]));
        assert_eq!(feature.icon().as_deref(), Some("marker"));

        let bare = geojson_point(r#"{ "type": "Feature", "geometry": null, "properties": {} }"#);
        assert_eq!(bare.position(), None);
        assert_eq!(bare.icon(), None);
    }

    #[test]
    fn test_defaults_enumerated() {
        let props: LayerProps<geojson::Feature> = LayerProps::default();
        assert_eq!(props.id, "superclusterlayer");
        assert_eq!(props.max_zoom, 10);
        assert_eq!(props.radius, 40.0);
        assert_eq!(props.size_scale, 1.0);
        assert!(props.pickable);
        assert!(props.data.is_empty());
        assert!(props.icon_mapping.is_empty());

        let leaf = Feature::point([0.0, 0.0], geojson_point(POINT));
        assert_eq!(props.get_icon_size.get(&leaf), 32.0);
        assert_eq!(props.get_text_anchor.get(&leaf), TextAnchor::Middle);
        assert_eq!(props.get_text_alignment_baseline.get(&leaf), AlignmentBaseline::Center);
        assert_eq!(props.get_text_color.get(&leaf), [255, 255, 255, 250]);
        assert_eq!(props.get_circle_fill_color.get(&leaf), [54, 164, 255, 250]);
        assert_eq!(props.get_text_size.get(&cluster(100)), default_text_size(&cluster(100)));
        assert_eq!(props.cluster_options(), ClusterOptions::new(10, 40.0));
    }
}
