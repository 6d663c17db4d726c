//! 坐标投影模块
//!
//! 把全景视频帧中的像素坐标转换为画布坐标：
//! 1. 像素坐标归一化并加上经度偏移
//! 2. 转换为经纬度并放到球面内侧
//! 3. 经相机投影到 NDC，判断是否位于裁剪立方体内
//! 4. NDC 映射到画布像素（y 轴翻转）
//!
//! 投影不会失败：输入非法（例如尺寸为 0）时结果为 NaN/∞，`in_view` 为 false，
//! 调用方据此直接剔除该点。

use std::f32::consts::PI;

use nalgebra::{Point2, Point3};

use crate::config::{LONGITUDE_OFFSET, LongitudeWrap, OverlayConfig, SPHERE_RADIUS};
use crate::overlay::camera::Camera;

/// 画布上的投影点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// 画布x坐标（像素，原点左上）
    pub x: f32,
    /// 画布y坐标
    pub y: f32,
    /// 对应的三维点是否落在 `[-1, 1]^3` 内
    pub in_view: bool,
}

impl ProjectedPoint {
    pub fn position(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }
}

/// NaN 分量比较总为 false，因此会被视为不可见
fn in_clip_cube(ndc: &Point3<f32>) -> bool {
    let range = -1.0..=1.0;
    range.contains(&ndc.x) && range.contains(&ndc.y) && range.contains(&ndc.z)
}

/// 像素到画布的投影器
///
/// 保存视频帧与画布尺寸以及球面参数，相机在每次调用时传入。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointProjector {
    video_width: f32,
    video_height: f32,
    canvas_width: f32,
    canvas_height: f32,
    sphere_radius: f32,
    longitude_offset: f32,
    wrap: LongitudeWrap,
}

impl PointProjector {
    /// 使用默认球面参数创建投影器
    ///
    /// # 参数
    /// * `video_width` - 全景视频宽度
    /// * `video_height` - 全景视频高度
    /// * `canvas_width` - 画布宽度
    /// * `canvas_height` - 画布高度
    pub fn new(video_width: f32, video_height: f32, canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            video_width,
            video_height,
            canvas_width,
            canvas_height,
            sphere_radius: SPHERE_RADIUS,
            longitude_offset: LONGITUDE_OFFSET,
            wrap: LongitudeWrap::default(),
        }
    }

    /// 应用配置中的球面半径、经度偏移与回绕方式
    pub fn with_config(mut self, config: &OverlayConfig) -> Self {
        self.sphere_radius = config.sphere_radius;
        self.longitude_offset = config.longitude_offset;
        self.wrap = config.longitude_wrap;
        self
    }

    pub fn with_wrap(mut self, wrap: LongitudeWrap) -> Self {
        self.wrap = wrap;
        self
    }

    fn wrap_longitude(&self, u0: f32) -> f32 {
        let shifted = u0 + self.longitude_offset;
        let limit = match self.wrap {
            LongitudeWrap::Legacy => 0.0,
            LongitudeWrap::Corrected => 1.0,
        };
        if shifted > limit { shifted - 1.0 } else { shifted }
    }

    /// 像素坐标对应的经纬度（弧度）
    ///
    /// 经度 `(u - 0.5) * 2π`，纬度 `(0.5 - v) * π`，帧顶部为北极。
    pub fn spherical(&self, x: f32, y: f32) -> (f32, f32) {
        let u = self.wrap_longitude(x / self.video_width);
        let v = y / self.video_height;
        ((u - 0.5) * 2.0 * PI, (0.5 - v) * PI)
    }

    /// 像素坐标对应的球面内侧三维点
    pub fn sphere_point(&self, x: f32, y: f32) -> Point3<f32> {
        let (lon, lat) = self.spherical(x, y);
        let r = self.sphere_radius;
        Point3::new(
            r * lat.cos() * lon.sin(),
            r * lat.sin(),
            r * lat.cos() * lon.cos(),
        )
    }

    /// 三维方向反算视频帧像素坐标，x 落在 `[0, video_width)`
    pub fn sphere_to_pixel(&self, point: &Point3<f32>) -> (f32, f32) {
        let direction = point.coords.normalize();
        let lon = direction.x.atan2(direction.z);
        let lat = direction.y.clamp(-1.0, 1.0).asin();
        let u = lon / (2.0 * PI) + 0.5;
        let u0 = (u - self.longitude_offset).rem_euclid(1.0);
        (u0 * self.video_width, (0.5 - lat / PI) * self.video_height)
    }

    /// 将视频帧像素投影到画布
    pub fn project<C: Camera + ?Sized>(&self, x: f32, y: f32, camera: &C) -> ProjectedPoint {
        let ndc = camera.project(&self.sphere_point(x, y));
        ProjectedPoint {
            x: (ndc.x * 0.5 + 0.5) * self.canvas_width,
            y: (-ndc.y * 0.5 + 0.5) * self.canvas_height,
            in_view: in_clip_cube(&ndc),
        }
    }
}

/// 使用默认球面参数投影单个像素
pub fn project_point<C: Camera + ?Sized>(
    x: f32,
    y: f32,
    video_width: f32,
    video_height: f32,
    canvas_width: f32,
    canvas_height: f32,
    camera: &C,
) -> ProjectedPoint {
    PointProjector::new(video_width, video_height, canvas_width, canvas_height).project(x, y, camera)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::camera::PerspectiveCamera;
    use approx::assert_abs_diff_eq;

    const VIDEO: (f32, f32) = (5376.0, 2688.0);
    const CANVAS: (f32, f32) = (1280.0, 720.0);

    fn projector() -> PointProjector {
        PointProjector::new(VIDEO.0, VIDEO.1, CANVAS.0, CANVAS.1)
    }

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::for_canvas(CANVAS.0, CANVAS.1)
    }

    #[test]
    fn quarter_width_lands_at_canvas_center() {
        let p = projector().project(0.25 * VIDEO.0, 0.5 * VIDEO.1, &camera());
        assert!(p.in_view);
        assert_abs_diff_eq!(p.x, 0.5 * CANVAS.0, epsilon = 0.01);
        assert_abs_diff_eq!(p.y, 0.5 * CANVAS.1, epsilon = 0.01);
    }

    #[test]
    fn free_function_matches_projector() {
        let camera = camera();
        let a = project_point(1000.0, 1200.0, VIDEO.0, VIDEO.1, CANVAS.0, CANVAS.1, &camera);
        let b = projector().project(1000.0, 1200.0, &camera);
        assert_eq!(a, b);
    }

    #[test]
    fn legacy_wrap_always_subtracts() {
        let projector = projector();
        assert_abs_diff_eq!(projector.wrap_longitude(0.5), -0.25);
        assert_abs_diff_eq!(projector.wrap_longitude(0.9), 0.15, epsilon = 1e-6);

        let corrected = projector.with_wrap(LongitudeWrap::Corrected);
        assert_abs_diff_eq!(corrected.wrap_longitude(0.5), 0.75);
        assert_abs_diff_eq!(corrected.wrap_longitude(0.9), 0.15, epsilon = 1e-6);
    }

    #[test]
    fn wrap_modes_agree_on_sphere() {
        let legacy = projector();
        let corrected = legacy.with_wrap(LongitudeWrap::Corrected);
        for x in [0.0, 700.0, 2688.0, 4000.0, 5375.0] {
            let a = legacy.sphere_point(x, 900.0);
            let b = corrected.sphere_point(x, 900.0);
            assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-4);
            assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-4);
            assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-4);
        }
    }

    #[test]
    fn periodic_in_video_width() {
        let projector = projector();
        let camera = camera().with_orientation(0.4, 0.1);
        for x in [100.0, 1500.0, 2500.0] {
            let a = projector.project(x, 1200.0, &camera);
            let b = projector.project(x + VIDEO.0, 1200.0, &camera);
            assert_eq!(a.in_view, b.in_view);
            assert_abs_diff_eq!(a.x, b.x, epsilon = 0.05);
            assert_abs_diff_eq!(a.y, b.y, epsilon = 0.05);
        }
    }

    #[test]
    fn top_row_is_north_pole() {
        let projector = projector();
        for x in [0.0, 1000.0, 3000.0, 5000.0] {
            let p = projector.sphere_point(x, 0.0);
            assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-4);
            assert_abs_diff_eq!(p.y, SPHERE_RADIUS, epsilon = 1e-4);
            assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn point_behind_camera_is_not_in_view() {
        // 经度 π 在相机背后
        let p = projector().project(0.75 * VIDEO.0, 0.5 * VIDEO.1, &camera());
        assert!(!p.in_view);
    }

    #[test]
    fn zero_video_size_is_culled() {
        let projector = PointProjector::new(0.0, 0.0, CANVAS.0, CANVAS.1);
        assert!(!projector.project(100.0, 100.0, &camera()).in_view);
        assert!(!projector.project(0.0, 0.0, &camera()).in_view);
    }

    #[test]
    fn sphere_point_respects_config_radius() {
        let config = OverlayConfig {
            sphere_radius: 30.0,
            ..OverlayConfig::default()
        };
        let projector = projector().with_config(&config);
        let p = projector.sphere_point(1234.0, 800.0);
        assert_abs_diff_eq!(p.coords.norm(), 30.0, epsilon = 1e-3);
    }

    #[test]
    fn screen_round_trip_recovers_pixel() {
        let projector = projector();
        let camera = camera().with_orientation(-0.3, 0.2);
        let (x, y) = (1000.0, 1100.0);
        let p = projector.project(x, y, &camera);
        assert!(p.in_view);

        let ndc = Point3::new(
            p.x / CANVAS.0 * 2.0 - 1.0,
            1.0 - p.y / CANVAS.1 * 2.0,
            0.0,
        );
        let world = camera.unproject(&ndc).unwrap();
        let (bx, by) = projector.sphere_to_pixel(&world);
        assert_abs_diff_eq!(bx, x, epsilon = 0.5);
        assert_abs_diff_eq!(by, y, epsilon = 0.5);
    }
}
