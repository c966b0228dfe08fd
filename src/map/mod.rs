mod geometry;
mod projection;
mod renderer;

pub use projection::Viewport;
pub use renderer::{render_frame, ClusterFrame, DisplaySettings, Label, SubLayer};
