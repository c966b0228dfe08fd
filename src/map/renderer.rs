use tui_cluster::layer::RenderedLayers;
use tui_cluster::render::{AlignmentBaseline, Color, IconInstance, TextAnchor};

use crate::braille::{BrailleCanvas, Rgb};
use crate::map::geometry::{draw_circle, draw_marker, draw_ring};
use crate::map::projection::Viewport;

/// Host pixels per Braille dot when sizing icons and badges
const PIXELS_PER_DOT: f32 = 6.0;
/// Icons that are not tinted masks draw in this color
const ICON_COLOR: Rgb = [255, 196, 0];
const SELECTED_COLOR: Rgb = [255, 64, 64];
/// Dots outside the canvas still worth drawing (partially visible shapes)
const MARGIN: i32 = 10;
/// Upper bound for canvas dimensions used in size math
const MAX_CANVAS_DOTS: usize = 1 << 16;

/// Display settings for the two sub-layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_icons: bool,
    pub show_nodes: bool,
    pub show_labels: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_icons: true,
            show_nodes: true,
            show_labels: true,
        }
    }
}

/// Text placed on the character grid
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub col: u16,
    pub row: u16,
    pub text: String,
    pub fg: Rgb,
    pub bg: Option<Rgb>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubLayer {
    Icon,
    Node,
}

/// Pickable shape in dot coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct HitTarget {
    pub sublayer: SubLayer,
    /// Index into the layer data
    pub index: usize,
    pub px: i32,
    pub py: i32,
    pub radius: i32,
}

/// One rendered frame of the clustering layer
pub struct ClusterFrame {
    pub icons: BrailleCanvas,
    pub badges: BrailleCanvas,
    pub labels: Vec<Label>,
    pub targets: Vec<HitTarget>,
    icon_layer_id: String,
    node_layer_id: String,
}

impl ClusterFrame {
    pub fn empty(cols: usize, rows: usize) -> Self {
        Self {
            icons: BrailleCanvas::new(cols, rows),
            badges: BrailleCanvas::new(cols, rows),
            labels: Vec::new(),
            targets: Vec::new(),
            icon_layer_id: String::new(),
            node_layer_id: String::new(),
        }
    }

    pub fn layer_id(&self, sublayer: SubLayer) -> &str {
        match sublayer {
            SubLayer::Icon => &self.icon_layer_id,
            SubLayer::Node => &self.node_layer_id,
        }
    }

    /// Closest target under a dot position; badges win over icons at equal distance
    pub fn hit_test(&self, px: i32, py: i32) -> Option<&HitTarget> {
        let dist2 = |t: &HitTarget| {
            let (dx, dy) = (t.px as i64 - px as i64, t.py as i64 - py as i64);
            (dx * dx).saturating_add(dy * dy)
        };
        self.targets
            .iter()
            .rev()
            .filter(|t| dist2(t) <= (t.radius as i64 + 1).pow(2))
            .min_by_key(|t| dist2(t))
    }
}

#[inline(always)]
fn to_dots(pixels: f32) -> i32 {
    (pixels / PIXELS_PER_DOT).round() as i32
}

#[inline(always)]
fn rgb(color: Color) -> Rgb {
    [color[0], color[1], color[2]]
}

fn icon_color<P>(layers: &RenderedLayers<P>, icon: &IconInstance) -> Rgb {
    match layers.icon.icon_mapping.get(&icon.icon) {
        Some(mapping) if mapping.mask => rgb(icon.color),
        _ => ICON_COLOR,
    }
}

/// Place text relative to a dot position on a `cols` x `rows` grid
fn place_label(
    text: &str,
    px: i32,
    py: i32,
    anchor: TextAnchor,
    baseline: AlignmentBaseline,
    rows: usize,
) -> Option<(u16, u16)> {
    if px < 0 || py < 0 {
        return None;
    }
    let (col, row) = (px / 2, py / 4);
    let len = text.chars().count() as i32;

    let start = match anchor {
        TextAnchor::Start => col,
        TextAnchor::Middle => col - (len - 1) / 2,
        TextAnchor::End => col - len + 1,
    };
    let row = match baseline {
        // Text hangs below the anchor
        AlignmentBaseline::Top => row + 1,
        AlignmentBaseline::Center => row,
        AlignmentBaseline::Bottom => row - 1,
    };

    if row < 0 || row as usize >= rows {
        return None;
    }
    Some((start.max(0) as u16, row as u16))
}

/// Draw the icon and node sub-layers for the viewport.
/// `highlight` rings the badge at that `[lng, lat]`.
pub fn render_frame<P: Send + Sync>(
    layers: &RenderedLayers<P>,
    viewport: &Viewport,
    settings: &DisplaySettings,
    highlight: Option<[f64; 2]>,
) -> ClusterFrame {
    let cols = viewport.width / 2;
    let rows = viewport.height / 4;
    // Shapes larger than the canvas look the same as ones that just cover it
    let max_size = viewport.width.max(viewport.height).clamp(1, MAX_CANVAS_DOTS) as i32;
    let mut frame = ClusterFrame::empty(cols, rows);
    frame.icon_layer_id = layers.icon.id.clone();
    frame.node_layer_id = layers.node.id.clone();

    if settings.show_icons {
        for icon in layers.icon.instances() {
            if icon.color[3] == 0 {
                continue;
            }
            let (px, py) = viewport.project(icon.position[0], icon.position[1]);
            let px = px.saturating_add(to_dots(icon.pixel_offset[0]));
            let py = py.saturating_add(to_dots(icon.pixel_offset[1]));
            if !viewport.is_visible(px, py, MARGIN) {
                continue;
            }

            let arm = to_dots(icon.size / 2.0).clamp(1, max_size);
            draw_marker(&mut frame.icons, px, py, arm, icon_color(layers, &icon));
            if layers.icon.pickable {
                frame.targets.push(HitTarget {
                    sublayer: SubLayer::Icon,
                    index: icon.index,
                    px,
                    py,
                    radius: arm,
                });
            }
        }
    }

    if settings.show_nodes {
        for node in layers.node.instances() {
            if !node.is_visible() {
                continue;
            }
            let (px, py) = viewport.project(node.position[0], node.position[1]);
            if !viewport.is_visible(px, py, MARGIN) {
                continue;
            }

            let radius = if node.circle_radius > 0.0 {
                to_dots(node.circle_radius).clamp(1, max_size)
            } else {
                0
            };
            let fill = rgb(node.circle_fill_color);
            let filled = radius > 0 && node.circle_fill_color[3] > 0;
            if filled {
                draw_circle(&mut frame.badges, px, py, radius, fill);
            }
            if highlight == Some(node.position) {
                draw_ring(&mut frame.badges, px, py, radius, SELECTED_COLOR);
            }

            if settings.show_labels && node.text_size > 0.0 && node.text_color[3] > 0 {
                if let Some(text) = &node.text {
                    let placed =
                        place_label(text, px, py, node.text_anchor, node.alignment_baseline, rows);
                    if let Some((col, row)) = placed {
                        frame.labels.push(Label {
                            col,
                            row,
                            text: text.clone(),
                            fg: rgb(node.text_color),
                            bg: filled.then_some(fill),
                        });
                    }
                }
            }

            if layers.node.pickable {
                frame.targets.push(HitTarget {
                    sublayer: SubLayer::Node,
                    index: node.index,
                    px,
                    py,
                    radius: radius.max(1),
                });
            }
        }
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tui_cluster::layer::{GeoPoint, LayerProps, SuperClusterLayer};
    use tui_cluster::render::Accessor;

    #[derive(Clone)]
    struct Pin([f64; 2]);

    impl GeoPoint for Pin {
        fn position(&self) -> Option<[f64; 2]> {
            Some(self.0)
        }

        fn icon(&self) -> Option<String> {
            Some("marker".to_string())
        }
    }

    /// A tight group of three in Paris and a loner in Tokyo
    fn layer(pickable: bool) -> SuperClusterLayer<Pin> {
        let props = LayerProps {
            data: Arc::new(vec![
                Pin([2.35, 48.85]),
                Pin([2.36, 48.86]),
                Pin([2.34, 48.84]),
                Pin([139.69, 35.68]),
            ]),
            pickable,
            ..LayerProps::default()
        };
        let mut layer = SuperClusterLayer::new(props.clone());
        layer.update_state(props, 2.0).unwrap();
        layer
    }

    /// Whole world 200 dots across, Paris and Tokyo both on screen
    fn viewport() -> Viewport {
        Viewport::new(70.0, 40.0, 0.0, 200, 120)
    }

    #[test]
    fn test_frame_draws_badge_and_icon() {
        let layer = layer(true);
        let frame = render_frame(&layer.render_layers(), &viewport(), &DisplaySettings::default(), None);

        assert_eq!(frame.targets.len(), 2);
        assert_eq!(frame.targets[0].sublayer, SubLayer::Icon);
        assert_eq!(frame.targets[1].sublayer, SubLayer::Node);
        assert_eq!(frame.labels.len(), 1);
        assert_eq!(frame.labels[0].text, "3");
        assert_eq!(frame.labels[0].fg, [255, 255, 255]);
        assert_eq!(frame.labels[0].bg, Some([54, 164, 255]));
        assert_eq!(frame.layer_id(SubLayer::Node), "superclusterlayer__node");
    }

    #[test]
    fn test_hit_test_finds_badge() {
        let layer = layer(true);
        let frame = render_frame(&layer.render_layers(), &viewport(), &DisplaySettings::default(), None);
        let badge = frame.targets[1].clone();

        let hit = frame.hit_test(badge.px + 1, badge.py).unwrap();
        assert_eq!(hit.sublayer, SubLayer::Node);
        assert!(layer.data().unwrap()[hit.index].is_cluster());
        assert!(frame.hit_test(badge.px + 50, badge.py + 50).is_none());
    }

    #[test]
    fn test_not_pickable_has_no_targets() {
        let layer = layer(false);
        let frame = render_frame(&layer.render_layers(), &viewport(), &DisplaySettings::default(), None);
        assert!(frame.targets.is_empty());
    }

    #[test]
    fn test_hidden_sublayers() {
        let layer = layer(true);
        let settings = DisplaySettings {
            show_icons: false,
            show_labels: false,
            ..DisplaySettings::default()
        };
        let frame = render_frame(&layer.render_layers(), &viewport(), &settings, None);
        assert!(frame.labels.is_empty());
        assert!(frame.targets.iter().all(|t| t.sublayer == SubLayer::Node));
    }

    #[test]
    fn test_huge_sizes_are_clamped_to_canvas() {
        let layer = layer(true);
        let props = LayerProps {
            get_icon_size: Accessor::constant(f32::MAX),
            get_circle_radius: Accessor::constant(1e30),
            get_icon_pixel_offset: Accessor::constant([1e12, 0.0]),
            ..layer.props().clone()
        };
        let mut layer = layer;
        layer.update_state(props, 2.0).unwrap();

        let viewport = viewport();
        let frame = render_frame(&layer.render_layers(), &viewport, &DisplaySettings::default(), None);
        // The icon is pushed off screen, both badges cover the canvas
        assert!(frame.targets.iter().all(|t| t.sublayer == SubLayer::Node));
        assert_eq!(frame.targets.len(), 2);
        for target in &frame.targets {
            assert_eq!(target.radius, 200);
        }
        assert!(frame.hit_test(0, 0).is_some());
        assert!(frame.hit_test(i32::MAX, i32::MIN).is_none());
    }

    #[test]
    fn test_huge_icon_stays_pickable() {
        let layer = layer(true);
        let props = LayerProps {
            get_icon_size: Accessor::constant(f32::MAX),
            ..layer.props().clone()
        };
        let mut layer = layer;
        layer.update_state(props, 2.0).unwrap();

        let frame = render_frame(&layer.render_layers(), &viewport(), &DisplaySettings::default(), None);
        let icon = frame.targets.iter().find(|t| t.sublayer == SubLayer::Icon).unwrap();
        assert_eq!(icon.radius, 200);
        assert!(frame.hit_test(icon.px + 150, icon.py).is_some());
    }

    #[test]
    fn test_place_label_anchors() {
        let rows = 10;
        assert_eq!(place_label("123", 20, 8, TextAnchor::Middle, AlignmentBaseline::Center, rows), Some((9, 2)));
        assert_eq!(place_label("123", 20, 8, TextAnchor::Start, AlignmentBaseline::Top, rows), Some((10, 3)));
        assert_eq!(place_label("123", 20, 8, TextAnchor::End, AlignmentBaseline::Bottom, rows), Some((8, 1)));
        assert_eq!(place_label("1", 20, 0, TextAnchor::Middle, AlignmentBaseline::Bottom, rows), None);
        assert_eq!(place_label("1", -1, 0, TextAnchor::Middle, AlignmentBaseline::Center, rows), None);
    }
}
