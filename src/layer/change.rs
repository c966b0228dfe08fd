use std::sync::Arc;

use super::LayerProps;

/// What differs between two update cycles
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChangeFlags {
    /// The data set is a different collection
    pub data_changed: bool,
    pub size_scale_changed: bool,
    /// `max_zoom` or `radius` differ
    pub cluster_options_changed: bool,
    /// Any other prop
    pub props_changed: bool,
    /// The viewport zoom moved
    pub viewport_changed: bool,
}

impl ChangeFlags {
    /// Everything changed; used for the first cycle
    pub fn all() -> Self {
        Self {
            data_changed: true,
            size_scale_changed: true,
            cluster_options_changed: true,
            props_changed: true,
            viewport_changed: true,
        }
    }

    pub fn diff<P>(
        old: Option<&LayerProps<P>>,
        new: &LayerProps<P>,
        old_zoom: Option<f64>,
        new_zoom: f64,
    ) -> Self {
        let Some(old) = old else {
            return Self::all();
        };

        Self {
            data_changed: !Arc::ptr_eq(&old.data, &new.data),
            size_scale_changed: old.size_scale != new.size_scale,
            cluster_options_changed: old.max_zoom != new.max_zoom || old.radius != new.radius,
            props_changed: !same_render_props(old, new),
            viewport_changed: old_zoom != Some(new_zoom),
        }
    }

    pub fn something_changed(&self) -> bool {
        self.data_changed
            || self.size_scale_changed
            || self.cluster_options_changed
            || self.props_changed
            || self.viewport_changed
    }

    /// The cluster index has to be rebuilt
    pub fn requires_rebuild(&self) -> bool {
        self.data_changed || self.size_scale_changed || self.cluster_options_changed
    }
}

fn same_render_props<P>(a: &LayerProps<P>, b: &LayerProps<P>) -> bool {
    a.id == b.id
        && a.pickable == b.pickable
        && a.icon_atlas == b.icon_atlas
        && Arc::ptr_eq(&a.icon_mapping, &b.icon_mapping)
        && a.size_units == b.size_units
        && a.size_min_pixels == b.size_min_pixels
        && a.size_max_pixels == b.size_max_pixels
        && a.billboard == b.billboard
        && a.alpha_cutoff == b.alpha_cutoff
        && a.get_icon.same_as(&b.get_icon)
        && a.get_icon_size.same_as(&b.get_icon_size)
        && a.get_icon_color.same_as(&b.get_icon_color)
        && a.get_icon_angle.same_as(&b.get_icon_angle)
        && a.get_icon_pixel_offset.same_as(&b.get_icon_pixel_offset)
        && a.get_text_size.same_as(&b.get_text_size)
        && a.get_text_angle.same_as(&b.get_text_angle)
        && a.get_text_anchor.same_as(&b.get_text_anchor)
        && a.get_text_alignment_baseline.same_as(&b.get_text_alignment_baseline)
        && a.get_text_color.same_as(&b.get_text_color)
        && a.get_circle_radius.same_as(&b.get_circle_radius)
        && a.get_circle_fill_color.same_as(&b.get_circle_fill_color)
        && a.get_position.same_as(&b.get_position)
}
