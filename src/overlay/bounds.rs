use serde::Deserialize;

/// 边界框结构
///
/// 全景视频帧中的轴对齐矩形，单位为像素，原点在左上角，y 轴向下。
/// JSON 中写作 `[x1, y1, x2, y2]`。
#[derive(Debug, Clone, Default, Copy, PartialEq, Deserialize)]
#[serde(from = "[f32; 4]")]
pub struct BoundingBox {
    /// 左上角x坐标
    pub x1: f32,
    /// 左上角y坐标
    pub y1: f32,
    /// 右下角x坐标
    pub x2: f32,
    /// 右下角y坐标
    pub y2: f32,
}

impl BoundingBox {
    /// 创建一个新的边界框
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// 按绘制顺序返回四个角点：左上、右上、右下、左下
    pub fn corners(&self) -> [(f32, f32); 4] {
        [
            (self.x1, self.y1),
            (self.x2, self.y1),
            (self.x2, self.y2),
            (self.x1, self.y2),
        ]
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// 检测结果结构
///
/// 由外部推理服务产生，每帧每个目标一条。置信度保留为 f64，
/// 标签中原样显示 JSON 里的全部有效数字。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Detection {
    /// 类别名称
    pub category_name: String,
    /// 置信度
    pub confidence: f64,
    /// 目标的边界框
    pub bbox: BoundingBox,
}

impl Detection {
    /// 创建一个新的检测结果
    pub fn new(category_name: impl Into<String>, confidence: f64, bbox: BoundingBox) -> Self {
        Self {
            category_name: category_name.into(),
            confidence,
            bbox,
        }
    }

    /// 标签文字：类别名 + 空格 + 置信度，置信度不做精度格式化
    pub fn label(&self) -> String {
        format!("{} {}", self.category_name, self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_bbox() {
        let json = r#"{"category_name": "person", "confidence": 0.87, "bbox": [10, 20, 110, 220]}"#;
        let detection: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.category_name, "person");
        assert_eq!(detection.bbox, BoundingBox::new(10.0, 20.0, 110.0, 220.0));
        assert_eq!(detection.confidence, 0.87);
    }

    #[test]
    fn label_uses_shortest_number_form() {
        assert_eq!(Detection::new("person", 0.87, BoundingBox::default()).label(), "person 0.87");
        assert_eq!(Detection::new("car", 1.0, BoundingBox::default()).label(), "car 1");
    }

    #[test]
    fn label_keeps_all_confidence_digits() {
        let json = r#"{"category_name": "person", "confidence": 0.8712345678, "bbox": [0, 0, 1, 1]}"#;
        let detection: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.label(), "person 0.8712345678");

        let json = r#"{"category_name": "car", "confidence": 0.1234567890123, "bbox": [0, 0, 1, 1]}"#;
        let detection: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.label(), "car 0.1234567890123");
    }

    #[test]
    fn corners_trace_the_box() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(bbox.corners(), [(1.0, 2.0), (3.0, 2.0), (3.0, 4.0), (1.0, 4.0)]);
    }
}
