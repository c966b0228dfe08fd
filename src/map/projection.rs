use glam::DVec2;
use tui_cluster::geo::{from_mercator, to_mercator, wrap_lng};

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 20.0;
/// Zoom change per key press
const ZOOM_STEP: f64 = 0.5;
/// Zoom change per scroll notch
const SCROLL_STEP: f64 = 0.25;

/// Viewport over a Web Mercator world, in Braille dot units
#[derive(Clone)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Web map zoom: the world is `width * 2^zoom` dots across
    pub zoom: f64,
    /// Canvas dot width
    pub width: usize,
    /// Canvas dot height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Whole world in view
    pub fn world(width: usize, height: usize) -> Self {
        Self::new(0.0, 20.0, MIN_ZOOM, width, height)
    }

    /// World width in dots at the current zoom
    fn world_size(&self) -> f64 {
        self.width.max(1) as f64 * self.zoom.exp2()
    }

    fn center(&self) -> DVec2 {
        to_mercator([self.center_lon, self.center_lat])
    }

    fn set_center(&mut self, center: DVec2) {
        let [lon, lat] = from_mercator(center);
        self.center_lon = wrap_lng(lon);
        self.center_lat = lat.clamp(-85.0, 85.0);
    }

    /// Pan the viewport by a dot delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let delta = DVec2::new(dx as f64, dy as f64) / self.world_size();
        self.set_center(self.center() + delta);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Zoom in towards a dot position
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, SCROLL_STEP);
    }

    /// Zoom out from a dot position
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, -SCROLL_STEP);
    }

    /// Change zoom by `delta` keeping the coordinate under (px, py) in place
    fn zoom_at(&mut self, px: i32, py: i32, delta: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);

        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Center on a coordinate at the given zoom
    pub fn fly_to(&mut self, lon: f64, lat: f64, zoom: f64) {
        self.set_center(to_mercator([lon, lat]));
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Dot coordinates back to (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let offset = DVec2::new(
            px as f64 - self.width as f64 / 2.0,
            py as f64 - self.height as f64 / 2.0,
        );
        let [lon, lat] = from_mercator(self.center() + offset / self.world_size());
        (lon, lat)
    }

    /// (lon, lat) to dot coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let p = (to_mercator([lon, lat]) - self.center()) * self.world_size();
        let px = (p.x + self.width as f64 / 2.0).floor() as i32;
        let py = (p.y + self.height as f64 / 2.0).floor() as i32;
        (px, py)
    }

    /// Check if a projected point is on (or just off) the canvas
    pub fn is_visible(&self, px: i32, py: i32, margin: i32) -> bool {
        px >= -margin
            && px < self.width as i32 + margin
            && py >= -margin
            && py < self.height as i32 + margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        assert_eq!(vp.project(0.0, 0.0), (50, 50));
    }

    #[test]
    fn test_world_fits_width_at_zoom_zero() {
        let vp = Viewport::new(0.0, 0.0, 0.0, 200, 100);
        let (west, _) = vp.project(-180.0, 0.0);
        let (east, _) = vp.project(179.999, 0.0);
        assert_eq!(west, 0);
        assert_eq!(east, 199);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::new(10.0, 45.0, 4.0, 160, 96);
        let (lon, lat) = vp.unproject(30, 70);
        assert_eq!(vp.project(lon + 1e-9, lat - 1e-9), (30, 70));
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
        vp.pan(0, -10);
        assert!(vp.center_lat > 0.0);
    }

    #[test]
    fn test_zoom_limits() {
        let mut vp = Viewport::world(100, 100);
        vp.zoom_out();
        assert_eq!(vp.zoom, MIN_ZOOM);
        for _ in 0..100 {
            vp.zoom_in();
        }
        assert_eq!(vp.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_zoom_at_keeps_cursor_coordinate() {
        let mut vp = Viewport::new(0.0, 0.0, 3.0, 200, 200);
        let before = vp.unproject(150, 60);
        vp.zoom_in_at(150, 60);
        let (px, py) = vp.project(before.0, before.1);
        assert!((px - 150).abs() <= 1 && (py - 60).abs() <= 1);
    }

    #[test]
    fn test_fly_to() {
        let mut vp = Viewport::world(100, 100);
        vp.fly_to(2.35, 48.85, 9.0);
        assert_eq!(vp.zoom, 9.0);
        assert!((vp.center_lon - 2.35).abs() < 1e-9);
        assert!((vp.center_lat - 48.85).abs() < 1e-9);
    }
}
