//! Overlay模块 - 在全景视频的透视视图上绘制检测框
//!
//! 该模块把等距柱状投影（360°）视频帧中的检测框映射到虚拟透视相机的画布上：
//! - 像素坐标 → 经纬度 → 球面内侧的三维点
//! - 三维点经相机投影到 NDC，并判断是否在裁剪立方体内
//! - NDC → 画布像素，按四个角点绘制四边形和标签
//!
//! # 主要组件
//!
//! - PointProjector：单点投影
//! - draw_bounding_box：绘制四边形与标签
//! - FrameAnnotator：逐帧投影并绘制全部检测框
//! - frame_index / AnnotationTrack：播放时间到标注帧的映射
//! - Camera / DrawingSurface：相机与绘制后端的能力接口
//!
//! # 示例
//!
//! ```
//! use panobox::{BoundingBox, Detection, FrameAnnotator, PerspectiveCamera, PointProjector, RaqoteSurface};
//!
//! let camera = PerspectiveCamera::for_canvas(1280.0, 720.0);
//! let projector = PointProjector::new(5376.0, 2688.0, 1280.0, 720.0);
//! let annotator = FrameAnnotator::new(projector);
//!
//! let detections = vec![Detection::new("person", 0.9, BoundingBox::new(1300.0, 1300.0, 1400.0, 1450.0))];
//! let mut surface = RaqoteSurface::new(1280, 720);
//! let drawn = annotator.annotate(&detections, &camera, &mut surface);
//! assert_eq!(drawn, 1);
//! ```

pub mod annotate;
pub mod bounds;
pub mod camera;
pub mod draw;
pub mod frame;
pub mod project;
pub mod surface;

// 重新导出常用类型和函数
pub use annotate::{FrameAnnotator, draw_bounding_boxes};
pub use bounds::{BoundingBox, Detection};
pub use camera::{Camera, PerspectiveCamera};
pub use draw::draw_bounding_box;
pub use frame::{AnnotationTrack, frame_index};
pub use project::{PointProjector, ProjectedPoint, project_point};
pub use surface::{DrawingSurface, FontSpec, RaqoteSurface, Rgba, load_system_font};
