//! 投影与绘制参数配置
//!
//! 常量给出默认值，`OverlayConfig` 可以从 TOML 文件覆盖其中任意一项。

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::overlay::surface::{FontSpec, Rgba};

pub const SPHERE_RADIUS: f32 = 15.0;    // 球面半径，需位于相机近远裁剪面之间
pub const LONGITUDE_OFFSET: f32 = 0.25; // 经度偏移（四分之一圈）

// 检测框绘制参数
pub const BOX_LINE_WIDTH: f32 = 2.0;
pub const BOX_COLOR: Rgba = Rgba::WHITE;
pub const LABEL_FONT_SIZE: f32 = 12.0;
pub const LABEL_FONT_FAMILY: &str = "Arial";
pub const LABEL_OFFSET_Y: f32 = 5.0;

/// 非有限时间戳对应的帧号
pub const FALLBACK_FRAME_INDEX: i64 = 1;

// 透视相机默认参数
pub const DEFAULT_FOV_DEGREES: f32 = 75.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;

// 全景视频与画布默认尺寸
pub const DEFAULT_VIDEO_WIDTH: u32 = 5376;
pub const DEFAULT_VIDEO_HEIGHT: u32 = 2688;
pub const DEFAULT_CANVAS_WIDTH: u32 = 1280;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 720;

/// 画布边长上限（像素）
pub const MAX_CANVAS_SIZE: u32 = 16384;
/// 画布外允许绘制的范围，按画布尺寸的倍数计
pub const OVERDRAW_FACTOR: f32 = 8.0;

/// 经度回绕方式
///
/// `Legacy` 保留原有的 `u0 + offset > 0` 判断（几乎总是减去 1），
/// `Corrected` 与 1 比较。两者只相差整圈，投影到球面上的点相同。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongitudeWrap {
    #[default]
    Legacy,
    Corrected,
}

/// 检测框样式
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoxStyle {
    /// 边框与文字颜色
    pub color: Rgba,
    pub line_width: f32,
    pub font: FontSpec,
    /// 标签基线位于第一个角点上方的像素数
    pub label_offset: f32,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            color: BOX_COLOR,
            line_width: BOX_LINE_WIDTH,
            font: FontSpec::default(),
            label_offset: LABEL_OFFSET_Y,
        }
    }
}

/// 完整的叠加层配置
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub sphere_radius: f32,
    pub longitude_offset: f32,
    pub longitude_wrap: LongitudeWrap,
    pub style: BoxStyle,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            sphere_radius: SPHERE_RADIUS,
            longitude_offset: LONGITUDE_OFFSET,
            longitude_wrap: LongitudeWrap::default(),
            style: BoxStyle::default(),
        }
    }
}

impl OverlayConfig {
    /// 从 TOML 文本解析，缺省字段使用默认值
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("无法解析叠加层配置")
    }

    /// 从 TOML 文件加载配置
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("配置文件格式错误: {}", path.display()))?;
        log::debug!("已加载配置 {}: {:?}", path.display(), config);
        Ok(config)
    }
}
