use nalgebra::Point3;
use panobox::{AnnotationTrack, FrameAnnotator, PerspectiveCamera, PointProjector, RaqoteSurface, Rgba};

const ANNOTATIONS: &str = r#"{
    "0": [
        {"category_name": "person", "confidence": 0.9134, "bbox": [1250, 1200, 1420, 1600]},
        {"category_name": "car", "confidence": 0.77, "bbox": [2500, 1300, 2900, 1500]},
        {"category_name": "dog", "confidence": 0.61, "bbox": [4000, 1400, 4150, 1520]}
    ]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("panobox 全景检测框示例");
    println!("========================");

    let track = AnnotationTrack::from_json_str(ANNOTATIONS)?;
    let detections = track.detections_at_time(0.4);
    println!("第 0 帧共有 {} 个检测框", detections.len());

    // 5376x2688 的全景视频，1280x720 的画布
    let annotator = FrameAnnotator::new(PointProjector::new(5376.0, 2688.0, 1280.0, 720.0));
    std::fs::create_dir_all("results")?;

    // 依次朝向正前方、右侧、后方和左侧
    for (name, yaw) in [("front", 0.0_f32), ("right", -90.0), ("back", 180.0), ("left", 90.0)] {
        let camera = PerspectiveCamera::for_canvas(1280.0, 720.0).with_orientation(yaw.to_radians(), 0.0);
        let mut surface = RaqoteSurface::new(1280, 720);
        surface.clear(Rgba::BLACK);

        let drawn = annotator.annotate(detections, &camera, &mut surface);
        let output_path = format!("results/render_frame_{}.png", name);
        surface.to_image()?.save(&output_path)?;
        println!("{}: 绘制 {} 个检测框，结果已保存到: {}", name, drawn, output_path);
    }

    // 让相机看向第一个检测框中心对应的球面点
    let projector = PointProjector::new(5376.0, 2688.0, 1280.0, 720.0);
    let first = detections.first().ok_or("第 0 帧没有检测框")?;
    let target = &first.bbox;
    let center: Point3<f32> = projector.sphere_point((target.x1 + target.x2) / 2.0, (target.y1 + target.y2) / 2.0);
    let mut camera = PerspectiveCamera::for_canvas(1280.0, 720.0);
    camera.look_at(&center);
    println!("看向 {} 时俯仰角: {:.1}°", first.label(), camera.pitch().to_degrees());

    let mut surface = RaqoteSurface::new(1280, 720);
    surface.clear(Rgba::BLACK);
    annotator.annotate(detections, &camera, &mut surface);
    surface.to_image()?.save("results/render_frame_target.png")?;
    println!("结果已保存到: results/render_frame_target.png");

    Ok(())
}
