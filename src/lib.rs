pub mod config;
pub mod overlay;

// 重新导出overlay模块中的常用类型和函数
pub use config::{BoxStyle, LongitudeWrap, OverlayConfig};
pub use overlay::{AnnotationTrack, BoundingBox, Detection, frame_index};
pub use overlay::{Camera, PerspectiveCamera};
pub use overlay::{DrawingSurface, FontSpec, RaqoteSurface, Rgba};
pub use overlay::{FrameAnnotator, PointProjector, ProjectedPoint};
pub use overlay::{draw_bounding_box, draw_bounding_boxes, project_point};
