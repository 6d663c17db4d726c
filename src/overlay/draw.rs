use nalgebra::Point2;

use crate::config::BoxStyle;
use crate::overlay::project::ProjectedPoint;
use crate::overlay::surface::{DrawingSurface, Rgba};

/// 绘制一个检测框及其标签
///
/// 按 `p1 → p2 → p3 → p4 → p1` 的顺序描边，不做角点重排或凸性检查；
/// 标签绘制在第一个角点上方 `style.label_offset` 像素处。
///
/// # 参数
/// * `surface` - 绘制表面，其描边/填充样式会被修改
/// * `label` - 标签文字
/// * `corners` - 四个投影角点
/// * `color` - 边框与文字颜色
/// * `style` - 线宽、字体与标签偏移
pub fn draw_bounding_box<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    label: &str,
    corners: &[ProjectedPoint; 4],
    color: Rgba,
    style: &BoxStyle,
) {
    let polygon: [Point2<f32>; 4] = corners.map(|p| p.position());

    surface.set_stroke_color(color);
    surface.set_line_width(style.line_width);
    surface.stroke_polygon(&polygon);

    let anchor = &corners[0];
    surface.set_fill_color(color);
    surface.set_font(&style.font);
    surface.fill_text(label, anchor.x, anchor.y - style.label_offset);
}
