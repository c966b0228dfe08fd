//! Sub-layer descriptions handed to the host: an icon layer and a node layer
//! (circular badge with centred text). Each resolves its accessors into plain
//! drawable instances.

mod accessor;
mod icon;
mod node;

pub use accessor::Accessor;
pub use icon::{IconInstance, IconLayer, IconMapping, SizeUnits};
pub use node::{AlignmentBaseline, NodeInstance, NodeLayer, TextAnchor};

/// RGBA
pub type Color = [u8; 4];
