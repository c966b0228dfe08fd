use tracing::{debug, warn};
use tui_cluster::cluster::FeatureProperties;
use tui_cluster::layer::{GeoPoint, LayerProps, PickInfo, PickMode, PickingInfo, SuperClusterLayer};

use crate::map::{render_frame, ClusterFrame, DisplaySettings, Viewport};

/// Points shown by the demo
pub type Point = geojson::Feature;

const RADIUS_STEP: f64 = 10.0;
const MIN_RADIUS: f64 = 10.0;
const MAX_RADIUS: f64 = 200.0;
const SIZE_SCALE_STEP: f32 = 0.25;
const MIN_SIZE_SCALE: f32 = 0.25;
const MAX_SIZE_SCALE: f32 = 4.0;
/// Leaf names listed for a picked cluster
const LEAF_PREVIEW: usize = 3;

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub layer: SuperClusterLayer<Point>,
    pub settings: DisplaySettings,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Whether the current press has moved (a drag, not a click)
    dragged: bool,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Pick under the pointer, not enriched
    pub hovered: Option<PickingInfo<Point>>,
    /// Last click or query, with leaves and expansion zoom for clusters
    pub selected: Option<PickingInfo<Point>>,
    /// Position of the selected feature, ringed when drawn
    selected_at: Option<[f64; 2]>,
    /// Latest layer error, shown in the status bar
    pub error: Option<String>,
    pub frame: ClusterFrame,
}

/// Braille dot size of the map area for a terminal size.
/// Border takes 2 chars each way, the status bar 2 rows.
fn map_dots(width: usize, height: usize) -> (usize, usize) {
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(4);
    (inner_width * 2, inner_height * 4)
}

/// Terminal cell to dot coordinates inside the map border
fn cell_to_dots(col: u16, row: u16) -> (i32, i32) {
    let px = (col.saturating_sub(1) as i32) * 2;
    let py = (row.saturating_sub(1) as i32) * 4;
    (px, py)
}

impl App {
    pub fn new(width: usize, height: usize, props: LayerProps<Point>) -> Self {
        let (dots_x, dots_y) = map_dots(width, height);
        let viewport = Viewport::world(dots_x, dots_y);

        let mut app = Self {
            layer: SuperClusterLayer::new(props.clone()),
            frame: ClusterFrame::empty(dots_x / 2, dots_y / 4),
            viewport,
            settings: DisplaySettings::default(),
            should_quit: false,
            last_mouse: None,
            dragged: false,
            mouse_pos: None,
            hovered: None,
            selected: None,
            selected_at: None,
            error: None,
        };
        app.apply(props);
        app
    }

    /// Push changed props through the layer, then redraw
    fn apply(&mut self, props: LayerProps<Point>) {
        match self.layer.update_state(props, self.viewport.zoom) {
            Ok(outcome) => {
                if outcome.rebuilt {
                    // Cluster ids are only valid for the index that produced them
                    self.hovered = None;
                    self.selected = None;
                    self.selected_at = None;
                }
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, "layer update failed");
                self.error = Some(e.to_string());
            }
        }
        self.redraw();
    }

    /// Bring the layer up to the viewport zoom, then redraw
    fn sync(&mut self) {
        if let Err(e) = self.layer.update_zoom(self.viewport.zoom) {
            warn!(error = %e, "layer update failed");
            self.error = Some(e.to_string());
        }
        self.redraw();
    }

    fn redraw(&mut self) {
        let layers = self.layer.render_layers();
        self.frame = render_frame(&layers, &self.viewport, &self.settings, self.selected_at);
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (dots_x, dots_y) = map_dots(width, height);
        self.viewport.width = dots_x;
        self.viewport.height = dots_y;
        self.redraw();
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
        self.redraw();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.sync();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.sync();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_dots(col, row);
        self.viewport.zoom_in_at(px, py);
        self.sync();
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_dots(col, row);
        self.viewport.zoom_out_at(px, py);
        self.sync();
    }

    /// Grow or shrink the clustering radius (rebuilds the index)
    pub fn adjust_radius(&mut self, steps: i32) {
        let mut props = self.layer.props().clone();
        props.radius = (props.radius + steps as f64 * RADIUS_STEP).clamp(MIN_RADIUS, MAX_RADIUS);
        self.apply(props);
    }

    /// Grow or shrink icon sizes (rebuilds the index)
    pub fn adjust_size_scale(&mut self, steps: i32) {
        let mut props = self.layer.props().clone();
        props.size_scale =
            (props.size_scale + steps as f32 * SIZE_SCALE_STEP).clamp(MIN_SIZE_SCALE, MAX_SIZE_SCALE);
        self.apply(props);
    }

    pub fn toggle_icons(&mut self) {
        self.settings.show_icons = !self.settings.show_icons;
        self.redraw();
    }

    pub fn toggle_nodes(&mut self) {
        self.settings.show_nodes = !self.settings.show_nodes;
        self.redraw();
    }

    pub fn toggle_labels(&mut self) {
        self.settings.show_labels = !self.settings.show_labels;
        self.redraw();
    }

    /// Back to the whole world, nothing selected
    pub fn reset(&mut self) {
        self.viewport = Viewport::world(self.viewport.width, self.viewport.height);
        self.clear_selection();
        self.sync();
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.selected_at = None;
        self.redraw();
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Pick whatever is drawn at a dot position
    fn pick_at(&self, px: i32, py: i32, mode: PickMode) -> Option<(PickingInfo<Point>, [f64; 2])> {
        let target = self.frame.hit_test(px, py)?;
        let feature = self.layer.data()?.get(target.index)?.clone();
        let position = feature.geometry;
        let (lon, lat) = self.viewport.unproject(px, py);

        let info = PickInfo {
            layer_id: self.frame.layer_id(target.sublayer).to_string(),
            index: Some(target.index),
            pixel: Some((px, py)),
            coordinate: Some([lon, lat]),
            object: Some(feature),
        };
        match self.layer.get_picking_info(info, mode) {
            Ok(picked) => Some((picked, position)),
            Err(e) => {
                warn!(error = %e, ?mode, "pick failed");
                None
            }
        }
    }

    /// Track what is under the pointer
    pub fn hover(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_dots(col, row);
        self.hovered = self.pick_at(px, py, PickMode::Hover).map(|(picked, _)| picked);
    }

    /// Select what is under the pointer; clusters are zoomed into until they split
    pub fn click(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_dots(col, row);
        self.select(self.pick_at(px, py, PickMode::Click));
    }

    /// Select whatever sits at the center of the map
    pub fn query_center(&mut self) {
        let (px, py) = (self.viewport.width as i32 / 2, self.viewport.height as i32 / 2);
        self.select(self.pick_at(px, py, PickMode::Query));
    }

    fn select(&mut self, picked: Option<(PickingInfo<Point>, [f64; 2])>) {
        let Some((picked, position)) = picked else {
            self.clear_selection();
            return;
        };
        debug!(layer = %picked.layer_id, index = ?picked.index, "selected");

        if let Some(zoom) = picked.cluster_expansion_zoom {
            self.viewport.fly_to(position[0], position[1], zoom as f64);
        }
        self.selected = Some(picked);
        self.selected_at = Some(position);
        self.sync();
    }

    /// Handle mouse drag
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            if dx != 0 || dy != 0 {
                self.dragged = true;
                self.pan(dx * 2, dy * 4);
            }
        }
        self.last_mouse = Some((x, y));
    }

    pub fn start_press(&mut self, x: u16, y: u16) {
        self.last_mouse = Some((x, y));
        self.dragged = false;
    }

    /// Button released: a press that never moved is a click
    pub fn end_press(&mut self, x: u16, y: u16) {
        if self.last_mouse.is_some() && !self.dragged {
            self.click(x, y);
        }
        self.last_mouse = None;
        self.dragged = false;
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Get mouse position in braille dot coordinates (for rendering marker)
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| cell_to_dots(col, row))
    }

    /// Viewport zoom with the integer zoom the clusters were computed for
    pub fn zoom_level(&self) -> String {
        match self.layer.zoom_level() {
            Some(z) => format!("{:.2} (z{z})", self.viewport.zoom),
            None => format!("{:.2}", self.viewport.zoom),
        }
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Visible clusters and loose points out of the total loaded
    pub fn cluster_summary(&self) -> String {
        let (clusters, points) = self.layer.data().map_or((0, 0), |data| {
            let clusters = data.iter().filter(|f| f.is_cluster()).count();
            (clusters, data.len() - clusters)
        });
        format!(
            "{clusters} clusters, {points} points of {}",
            self.layer.props().data.len()
        )
    }

    /// Radius and icon scale as a string
    pub fn layer_settings(&self) -> String {
        let props = self.layer.props();
        format!("radius {:.0} scale {:.2}", props.radius, props.size_scale)
    }

    /// The selection if any, else what is under the pointer
    pub fn pick_summary(&self) -> Option<String> {
        self.selected
            .as_ref()
            .or(self.hovered.as_ref())
            .map(describe_pick)
    }
}

fn point_name(point: &Point) -> String {
    point
        .property("name")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| point.position().map(|[lon, lat]| format!("{lat:.3}, {lon:.3}")))
        .unwrap_or_else(|| "point".to_string())
}

/// One-line description of a pick
pub fn describe_pick(info: &PickingInfo<Point>) -> String {
    match &info.object {
        Some(FeatureProperties::Cluster(cluster)) => {
            let mut text = format!(
                "cluster #{} of {}",
                cluster.cluster_id, cluster.point_count_abbreviated
            );
            if let Some(zoom) = info.cluster_expansion_zoom {
                text.push_str(&format!(", splits at z{zoom}"));
            }
            if let Some(leaves) = &info.objects {
                let names: Vec<String> = leaves.iter().take(LEAF_PREVIEW).map(point_name).collect();
                text.push_str(": ");
                text.push_str(&names.join(", "));
                if leaves.len() > LEAF_PREVIEW {
                    text.push_str(&format!(" +{}", leaves.len() - LEAF_PREVIEW));
                }
            }
            text
        }
        Some(FeatureProperties::Point(point)) => point_name(point),
        None => String::new(),
    }
}
