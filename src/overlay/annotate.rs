use crate::config::{BoxStyle, OverlayConfig};
use crate::overlay::bounds::Detection;
use crate::overlay::camera::Camera;
use crate::overlay::draw::draw_bounding_box;
use crate::overlay::project::{PointProjector, ProjectedPoint};
use crate::overlay::surface::DrawingSurface;

/// 逐帧绘制检测框
///
/// 每个检测框投影四个角点，只要有一个角点可见就整体绘制。
/// 跨越全景接缝或四角都在视野外的框不会被裁剪或拆分。
#[derive(Debug, Clone)]
pub struct FrameAnnotator {
    projector: PointProjector,
    style: BoxStyle,
}

impl FrameAnnotator {
    pub fn new(projector: PointProjector) -> Self {
        Self {
            projector,
            style: BoxStyle::default(),
        }
    }

    /// 按配置创建标注器
    pub fn from_config(
        config: &OverlayConfig,
        video_width: f32,
        video_height: f32,
        canvas_width: f32,
        canvas_height: f32,
    ) -> Self {
        let projector = PointProjector::new(video_width, video_height, canvas_width, canvas_height)
            .with_config(config);
        Self {
            projector,
            style: config.style.clone(),
        }
    }

    /// 投影检测框的四个角点（左上、右上、右下、左下）
    pub fn project_corners<C: Camera + ?Sized>(
        &self,
        detection: &Detection,
        camera: &C,
    ) -> [ProjectedPoint; 4] {
        detection
            .bbox
            .corners()
            .map(|(x, y)| self.projector.project(x, y, camera))
    }

    /// 绘制一帧的全部检测框，返回实际绘制的数量
    pub fn annotate<C, S>(&self, detections: &[Detection], camera: &C, surface: &mut S) -> usize
    where
        C: Camera + ?Sized,
        S: DrawingSurface + ?Sized,
    {
        let mut drawn = 0;
        for detection in detections {
            let corners = self.project_corners(detection, camera);
            if !corners.iter().any(|p| p.in_view) {
                log::trace!("{} 不在视野内，跳过", detection.category_name);
                continue;
            }

            draw_bounding_box(surface, &detection.label(), &corners, self.style.color, &self.style);
            drawn += 1;
        }

        log::debug!("绘制检测框 {}/{}", drawn, detections.len());
        drawn
    }
}

/// 使用默认配置绘制一帧检测框
pub fn draw_bounding_boxes<C, S>(
    detections: &[Detection],
    video_width: f32,
    video_height: f32,
    canvas_width: f32,
    canvas_height: f32,
    camera: &C,
    surface: &mut S,
) -> usize
where
    C: Camera + ?Sized,
    S: DrawingSurface + ?Sized,
{
    let projector = PointProjector::new(video_width, video_height, canvas_width, canvas_height);
    FrameAnnotator::new(projector).annotate(detections, camera, surface)
}
