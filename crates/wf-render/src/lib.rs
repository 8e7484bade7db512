pub mod camera;
pub mod hit;
pub mod scene;
pub mod surface;
pub mod svg;

pub use camera::{AxisPinned, Camera, Edge};
pub use scene::SceneSurface;
pub use surface::{CanvasSurface, DragVisualOptimizer, InteractionMode, RenderedObject};
pub use svg::SvgSurface;
