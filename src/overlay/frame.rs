use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::FALLBACK_FRAME_INDEX;
use crate::overlay::bounds::Detection;

/// 播放时间（秒）对应的标注帧号
///
/// 向下取整；NaN 或无穷大无法转换为整数，返回 `FALLBACK_FRAME_INDEX`。
pub fn frame_index(current_time: f64) -> i64 {
    let index = current_time.floor();
    if index.is_finite() {
        index as i64
    } else {
        FALLBACK_FRAME_INDEX
    }
}

/// 按帧号组织的检测结果
///
/// JSON 格式为 `{"<帧号>": [Detection, ...], ...}`。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationTrack {
    frames: BTreeMap<i64, Vec<Detection>>,
}

impl AnnotationTrack {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<Detection>> =
            serde_json::from_str(text).context("无法解析标注数据")?;
        let mut frames = BTreeMap::new();
        for (key, detections) in raw {
            let index: i64 = key
                .trim()
                .parse()
                .with_context(|| format!("无效的帧号: {:?}", key))?;
            frames.insert(index, detections);
        }
        Ok(Self { frames })
    }

    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取标注文件: {}", path.display()))?;
        let track = Self::from_json_str(&text)
            .with_context(|| format!("标注文件格式错误: {}", path.display()))?;
        log::info!(
            "已加载标注 {}: {} 帧, {} 个检测框",
            path.display(),
            track.len(),
            track.frames.values().map(Vec::len).sum::<usize>()
        );
        Ok(track)
    }

    /// 指定帧的检测结果，没有标注的帧返回空切片
    pub fn detections_at(&self, index: i64) -> &[Detection] {
        self.frames.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 指定播放时间的检测结果
    pub fn detections_at_time(&self, current_time: f64) -> &[Detection] {
        self.detections_at(frame_index(current_time))
    }

    /// 有标注的帧数
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
