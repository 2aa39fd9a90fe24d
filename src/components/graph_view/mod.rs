mod component;
mod layout;
pub mod style;
mod svg;
mod types;

pub use component::GraphViewSvg;
pub use layout::{GraphView, ViewTransform};
pub use svg::render_svg;
pub use types::{Category, Endpoint, GraphData, GraphLink, GraphNode};
