//! 绘制表面
//!
//! `DrawingSurface` 描述绘制检测框所需的最小能力集合，与 2D canvas 的语义一致：
//! 样式是有状态的，路径和文字按当前样式绘制。`RaqoteSurface` 是基于 raqote 的
//! 软件光栅实现，可以导出为 `DynamicImage`。

use std::fmt;

use anyhow::{Context, Result, anyhow};
use font_kit::family_name::FamilyName;
use font_kit::font::Font;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;
use image::{DynamicImage, GenericImageView};
use nalgebra::Point2;
use raqote::{DrawOptions, DrawTarget, LineJoin, PathBuilder, Point, SolidSource, Source, StrokeStyle};
use serde::Deserialize;

use crate::config::{LABEL_FONT_FAMILY, LABEL_FONT_SIZE, MAX_CANVAS_SIZE, OVERDRAW_FACTOR};

/// RGBA 颜色，配置中写作 `[r, g, b, a]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "[u8; 4]")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(0xFF, 0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgba = Rgba::new(0x00, 0x00, 0x00, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    fn to_source(self) -> SolidSource {
        SolidSource::from_unpremultiplied_argb(self.a, self.r, self.g, self.b)
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(color: Rgba) -> Self {
        [color.r, color.g, color.b, color.a]
    }
}

/// 字体规格
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    /// 字号（像素）
    pub size_px: f32,
    pub family: String,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            size_px: LABEL_FONT_SIZE,
            family: LABEL_FONT_FAMILY.to_string(),
        }
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px {}", self.size_px, self.family)
    }
}

/// 2D 绘制能力
pub trait DrawingSurface {
    fn set_stroke_color(&mut self, color: Rgba);
    fn set_fill_color(&mut self, color: Rgba);
    fn set_line_width(&mut self, width: f32);
    fn set_font(&mut self, font: &FontSpec);
    /// 按顺序连接各点并闭合，再用当前描边样式描边
    fn stroke_polygon(&mut self, points: &[Point2<f32>]);
    /// 以 `(x, y)` 为基线起点，用当前填充色和字体绘制文字
    fn fill_text(&mut self, text: &str, x: f32, y: f32);
}

impl<S: DrawingSurface + ?Sized> DrawingSurface for &mut S {
    fn set_stroke_color(&mut self, color: Rgba) {
        (**self).set_stroke_color(color)
    }

    fn set_fill_color(&mut self, color: Rgba) {
        (**self).set_fill_color(color)
    }

    fn set_line_width(&mut self, width: f32) {
        (**self).set_line_width(width)
    }

    fn set_font(&mut self, font: &FontSpec) {
        (**self).set_font(font)
    }

    fn stroke_polygon(&mut self, points: &[Point2<f32>]) {
        (**self).stroke_polygon(points)
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        (**self).fill_text(text, x, y)
    }
}

/// 按字体族名加载系统字体，找不到时退回无衬线字体
pub fn load_system_font(family: &str) -> Result<Font> {
    let handle = SystemSource::new()
        .select_best_match(
            &[FamilyName::Title(family.to_string()), FamilyName::SansSerif],
            &Properties::new(),
        )
        .map_err(|e| anyhow!("找不到字体 {}: {:?}", family, e))?;
    handle
        .load()
        .map_err(|e| anyhow!("无法加载字体 {}: {:?}", family, e))
}

/// 基于 raqote 的绘制表面
pub struct RaqoteSurface {
    target: DrawTarget,
    stroke: SolidSource,
    fill: SolidSource,
    line_width: f32,
    font_size: f32,
    /// 已尝试加载的字体族名，避免重复查找
    font_family: Option<String>,
    font: Option<Font>,
}

impl RaqoteSurface {
    /// 创建透明画布，边长超过 `MAX_CANVAS_SIZE` 时截断
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.min(MAX_CANVAS_SIZE) as i32;
        let height = height.min(MAX_CANVAS_SIZE) as i32;
        Self {
            target: DrawTarget::new(width, height),
            stroke: Rgba::WHITE.to_source(),
            fill: Rgba::WHITE.to_source(),
            line_width: 1.0,
            font_size: LABEL_FONT_SIZE,
            font_family: None,
            font: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.target.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.target.height() as u32
    }

    pub fn clear(&mut self, color: Rgba) {
        self.target.clear(color.to_source());
    }

    /// 将图像缩放铺满整个画布
    pub fn draw_background(&mut self, image: &DynamicImage) {
        let (img_width, img_height) = image.dimensions();
        let image_data: Vec<u32> = image
            .to_rgba8()
            .pixels()
            .map(|pixel| {
                let [r, g, b, a] = pixel.0;
                let source = SolidSource::from_unpremultiplied_argb(a, r, g, b);
                u32::from_le_bytes([source.b, source.g, source.r, source.a])
            })
            .collect();

        let img = raqote::Image {
            width: img_width as i32,
            height: img_height as i32,
            data: &image_data,
        };
        let (width, height) = (self.target.width() as f32, self.target.height() as f32);
        self.target
            .draw_image_with_size_at(width, height, 0.0, 0.0, &img, &DrawOptions::new());
    }

    /// 导出为 RGBA 图像
    pub fn to_image(&self) -> Result<DynamicImage> {
        let pixels: Vec<u8> = self
            .target
            .get_data()
            .iter()
            .flat_map(|&pixel| {
                let [b, g, r, a] = pixel.to_le_bytes();
                unpremultiply([r, g, b, a])
            })
            .collect();

        let buffer = image::ImageBuffer::from_raw(self.width(), self.height(), pixels)
            .context("画布数据长度与尺寸不符")?;
        Ok(DynamicImage::ImageRgba8(buffer))
    }

    /// 可光栅化的坐标范围 `(min_x, min_y, max_x, max_y)`，画布四周各留出
    /// `OVERDRAW_FACTOR` 倍画布尺寸
    fn drawable_bounds(&self) -> (f32, f32, f32, f32) {
        let (width, height) = (self.target.width() as f32, self.target.height() as f32);
        (
            -OVERDRAW_FACTOR * width,
            -OVERDRAW_FACTOR * height,
            (1.0 + OVERDRAW_FACTOR) * width,
            (1.0 + OVERDRAW_FACTOR) * height,
        )
    }

    /// 非有限坐标返回 None，过远的坐标收回到可光栅化范围内
    ///
    /// 靠近极点的角点会投影到 1e10 量级，直接交给 raqote 会使定点光栅化溢出。
    fn clamp_point(&self, point: &Point2<f32>) -> Option<(f32, f32)> {
        if !(point.x.is_finite() && point.y.is_finite()) {
            return None;
        }
        let (min_x, min_y, max_x, max_y) = self.drawable_bounds();
        Some((point.x.clamp(min_x, max_x), point.y.clamp(min_y, max_y)))
    }

    fn ensure_font(&mut self, family: &str) {
        if self.font_family.as_deref() == Some(family) {
            return;
        }
        self.font_family = Some(family.to_string());
        match load_system_font(family) {
            Ok(font) => self.font = Some(font),
            Err(e) => {
                log::warn!("{:#}，标签文字将不会绘制", e);
                self.font = None;
            }
        }
    }
}

fn unpremultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    if a == 0 || a == 0xFF {
        return [r, g, b, a];
    }
    let scale = |c: u8| ((c as u32 * 0xFF + a as u32 / 2) / a as u32).min(0xFF) as u8;
    [scale(r), scale(g), scale(b), a]
}

impl DrawingSurface for RaqoteSurface {
    fn set_stroke_color(&mut self, color: Rgba) {
        self.stroke = color.to_source();
    }

    fn set_fill_color(&mut self, color: Rgba) {
        self.fill = color.to_source();
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.font_size = font.size_px;
        self.ensure_font(&font.family);
    }

    fn stroke_polygon(&mut self, points: &[Point2<f32>]) {
        let mut clamped = points.iter().filter_map(|p| self.clamp_point(p));
        let Some((x, y)) = clamped.next() else {
            return;
        };

        let mut pb = PathBuilder::new();
        pb.move_to(x, y);
        for (x, y) in clamped {
            pb.line_to(x, y);
        }
        pb.close();
        let path = pb.finish();

        self.target.stroke(
            &path,
            &Source::Solid(self.stroke),
            &StrokeStyle {
                join: LineJoin::Round,
                width: self.line_width,
                ..StrokeStyle::default()
            },
            &DrawOptions::new(),
        );
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        let (min_x, min_y, max_x, max_y) = self.drawable_bounds();
        if !((min_x..=max_x).contains(&x) && (min_y..=max_y).contains(&y)) {
            log::trace!("标签 {} 的位置 ({}, {}) 超出画布，跳过", text, x, y);
            return;
        }
        let Some(font) = &self.font else {
            return;
        };
        self.target.draw_text(
            font,
            self.font_size,
            text,
            Point::new(x, y),
            &Source::Solid(self.fill),
            &DrawOptions::new(),
        );
    }
}
