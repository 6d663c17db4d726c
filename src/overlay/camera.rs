//! 相机模块
//!
//! `Camera` 只要求把三维点投影到标准化设备坐标（NDC），任何具备组合视图投影
//! 变换的相机都可以接入。`PerspectiveCamera` 是基于 nalgebra 的默认实现，
//! NDC 采用 OpenGL 约定，三个分量可见时都位于 `[-1, 1]`。

use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector3};

use crate::config::{DEFAULT_FAR, DEFAULT_FOV_DEGREES, DEFAULT_NEAR};

/// 俯仰角上限，避免视线与上方向平行
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 1.0e-3;

/// 将世界坐标投影到 NDC 的能力
pub trait Camera {
    fn project(&self, point: &Point3<f32>) -> Point3<f32>;
}

impl<C: Camera + ?Sized> Camera for &C {
    fn project(&self, point: &Point3<f32>) -> Point3<f32> {
        (**self).project(point)
    }
}

/// 与球面相同约定的方向向量：yaw 即经度，pitch 即纬度
fn direction(yaw: f32, pitch: f32) -> Vector3<f32> {
    Vector3::new(
        pitch.cos() * yaw.sin(),
        pitch.sin(),
        pitch.cos() * yaw.cos(),
    )
}

/// 透视相机
///
/// 固定在球心（世界原点），由朝向（yaw/pitch，不支持 roll）、垂直视场角、
/// 宽高比和近远裁剪面决定。每次修改参数后都会重新计算视图投影矩阵。
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    yaw: f32,
    pitch: f32,
    /// 垂直视场角（弧度）
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view_projection: Matrix4<f32>,
}

impl PerspectiveCamera {
    /// 创建位于原点、朝向 +Z 的相机
    ///
    /// # 参数
    /// * `fov_degrees` - 垂直视场角（角度）
    /// * `aspect` - 画布宽高比
    /// * `near` - 近裁剪面
    /// * `far` - 远裁剪面
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            yaw: 0.0,
            pitch: 0.0,
            fov_y: fov_degrees.to_radians(),
            aspect,
            near,
            far,
            view_projection: Matrix4::identity(),
        };
        camera.update();
        camera
    }

    /// 使用默认视场角与裁剪面，按画布尺寸设置宽高比
    pub fn for_canvas(canvas_width: f32, canvas_height: f32) -> Self {
        Self::new(DEFAULT_FOV_DEGREES, canvas_width / canvas_height, DEFAULT_NEAR, DEFAULT_FAR)
    }

    /// 设置朝向（弧度），pitch 会被限制在 ±90° 以内
    pub fn with_orientation(mut self, yaw: f32, pitch: f32) -> Self {
        self.set_orientation(yaw, pitch);
        self
    }

    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-MAX_PITCH, MAX_PITCH);
        self.update();
    }

    /// 朝向指定目标点
    pub fn look_at(&mut self, target: &Point3<f32>) {
        let dir = target.coords;
        let horizontal = (dir.x * dir.x + dir.z * dir.z).sqrt();
        self.set_orientation(dir.x.atan2(dir.z), dir.y.atan2(horizontal));
    }

    pub fn set_fov(&mut self, fov_degrees: f32) {
        self.fov_y = fov_degrees.to_radians();
        self.update();
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// 将 NDC 坐标反投影回世界坐标，矩阵不可逆时返回 None
    pub fn unproject(&self, ndc: &Point3<f32>) -> Option<Point3<f32>> {
        let inverse = self.view_projection.try_inverse()?;
        Some(inverse.transform_point(ndc))
    }

    fn update(&mut self) {
        let eye = Point3::origin();
        let target = eye + direction(self.yaw, self.pitch);
        let view = Isometry3::look_at_rh(&eye, &target, &Vector3::y());
        let projection = Perspective3::new(self.aspect, self.fov_y, self.near, self.far);
        self.view_projection = projection.to_homogeneous() * view.to_homogeneous();
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(DEFAULT_FOV_DEGREES, 1.0, DEFAULT_NEAR, DEFAULT_FAR)
    }
}

impl Camera for PerspectiveCamera {
    fn project(&self, point: &Point3<f32>) -> Point3<f32> {
        self.view_projection.transform_point(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn forward_point_lands_at_center() {
        let camera = PerspectiveCamera::default();
        let ndc = camera.project(&Point3::new(0.0, 0.0, 15.0));
        assert_abs_diff_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(ndc.y, 0.0, epsilon = 1e-5);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }

    #[test]
    fn point_behind_is_outside_depth_range() {
        let camera = PerspectiveCamera::default();
        let ndc = camera.project(&Point3::new(0.0, 0.0, -15.0));
        assert!(ndc.z > 1.0);
    }

    #[test]
    fn up_and_right_match_ndc_axes() {
        let camera = PerspectiveCamera::default();
        // 相机朝向 +Z 时，屏幕右侧对应 -X
        let right = camera.project(&Point3::new(-1.0, 0.0, 15.0));
        let up = camera.project(&Point3::new(0.0, 1.0, 15.0));
        assert!(right.x > 0.0);
        assert!(up.y > 0.0);
    }

    #[test]
    fn orientation_turns_view() {
        let camera = PerspectiveCamera::default().with_orientation(FRAC_PI_2, 0.0);
        let ndc = camera.project(&Point3::new(15.0, 0.0, 0.0));
        assert_abs_diff_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(ndc.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn look_at_matches_orientation() {
        let mut camera = PerspectiveCamera::default();
        camera.look_at(&Point3::new(10.0, 5.0, -3.0));
        let ndc = camera.project(&Point3::new(10.0, 5.0, -3.0));
        assert_abs_diff_eq!(ndc.x, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(ndc.y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn pitch_is_clamped() {
        let camera = PerspectiveCamera::default().with_orientation(0.0, 4.0);
        assert!(camera.pitch() < FRAC_PI_2);
    }

    #[test]
    fn unproject_inverts_project() {
        let camera = PerspectiveCamera::for_canvas(1280.0, 720.0).with_orientation(0.3, -0.2);
        let world = Point3::new(3.0, -2.0, 14.0);
        let ndc = camera.project(&world);
        let back = camera.unproject(&ndc).unwrap();
        assert_abs_diff_eq!(back.x, world.x, epsilon = 5e-2);
        assert_abs_diff_eq!(back.y, world.y, epsilon = 5e-2);
        assert_abs_diff_eq!(back.z, world.z, epsilon = 5e-2);
    }
}
