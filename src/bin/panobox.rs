//! panobox - 渲染一帧全景检测框叠加层
//!
//! 读取按帧号组织的检测结果，用指定朝向的透视相机投影，输出 PNG。

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use panobox::config::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_FOV_DEGREES, DEFAULT_VIDEO_HEIGHT,
    DEFAULT_VIDEO_WIDTH, MAX_CANVAS_SIZE,
};
use panobox::{
    AnnotationTrack, FrameAnnotator, OverlayConfig, PerspectiveCamera, RaqoteSurface, Rgba,
    frame_index,
};

#[derive(Debug, Parser)]
#[command(name = "panobox", version, about = "Draw 360° detection boxes in a perspective view")]
struct Args {
    /// 标注 JSON 文件
    #[arg(long)]
    annotations: PathBuf,

    /// 播放时间（秒）
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    #[arg(long, default_value_t = DEFAULT_VIDEO_WIDTH)]
    video_width: u32,

    #[arg(long, default_value_t = DEFAULT_VIDEO_HEIGHT)]
    video_height: u32,

    #[arg(long, default_value_t = DEFAULT_CANVAS_WIDTH, value_parser = canvas_size)]
    canvas_width: u32,

    #[arg(long, default_value_t = DEFAULT_CANVAS_HEIGHT, value_parser = canvas_size)]
    canvas_height: u32,

    /// 相机水平朝向（角度）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    yaw: f32,

    /// 相机俯仰角（角度）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pitch: f32,

    /// 垂直视场角（角度）
    #[arg(long, default_value_t = DEFAULT_FOV_DEGREES)]
    fov: f32,

    /// 叠加层配置（TOML）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 画布背景图，缩放铺满
    #[arg(long)]
    background: Option<PathBuf>,

    #[arg(long, short, default_value = "overlay.png")]
    output: PathBuf,
}

/// 画布边长必须在 1..=MAX_CANVAS_SIZE 之间
fn canvas_size(value: &str) -> Result<u32, String> {
    let size: u32 = value.parse().map_err(|e| format!("{}", e))?;
    if (1..=MAX_CANVAS_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(format!("画布边长需在 1 到 {} 之间", MAX_CANVAS_SIZE))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => OverlayConfig::load(path)?,
        None => OverlayConfig::default(),
    };
    let track = AnnotationTrack::load(&args.annotations)?;
    if track.is_empty() {
        log::warn!("标注文件中没有任何帧: {}", args.annotations.display());
    }

    let (canvas_width, canvas_height) = (args.canvas_width as f32, args.canvas_height as f32);
    let mut camera = PerspectiveCamera::for_canvas(canvas_width, canvas_height)
        .with_orientation(args.yaw.to_radians(), args.pitch.to_radians());
    camera.set_fov(args.fov);

    let annotator = FrameAnnotator::from_config(
        &config,
        args.video_width as f32,
        args.video_height as f32,
        canvas_width,
        canvas_height,
    );

    let mut surface = RaqoteSurface::new(args.canvas_width, args.canvas_height);
    surface.clear(Rgba::BLACK);
    if let Some(path) = &args.background {
        let background = image::open(path)
            .with_context(|| format!("无法加载背景图: {}", path.display()))?;
        surface.draw_background(&background);
    }

    let index = frame_index(args.time);
    let detections = track.detections_at(index);
    let drawn = annotator.annotate(detections, &camera, &mut surface);
    log::info!(
        "第 {} 帧: {} 个检测框, 绘制 {} 个",
        index,
        detections.len(),
        drawn
    );

    surface
        .to_image()?
        .save(&args.output)
        .with_context(|| format!("无法保存结果: {}", args.output.display()))?;
    log::info!("结果已保存到: {}", args.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_size_defaults() {
        let args = Args::try_parse_from(["panobox", "--annotations", "a.json"]).unwrap();
        assert_eq!(args.canvas_width, DEFAULT_CANVAS_WIDTH);
        assert_eq!(args.canvas_height, DEFAULT_CANVAS_HEIGHT);
    }

    #[test]
    fn oversized_canvas_is_rejected() {
        for size in ["3000000000", "16385", "0"] {
            let result =
                Args::try_parse_from(["panobox", "--annotations", "a.json", "--canvas-width", size]);
            assert!(result.is_err(), "{} 应被拒绝", size);
        }
        let args = Args::try_parse_from([
            "panobox",
            "--annotations",
            "a.json",
            "--canvas-height",
            "16384",
        ])
        .unwrap();
        assert_eq!(args.canvas_height, MAX_CANVAS_SIZE);
    }
}
