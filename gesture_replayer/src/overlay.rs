// Draws a tracked hand as a skeleton on a dark square canvas and saves it as PNG.

use image::{ImageEncoder, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use sign_vision::core_modules::landmark::{HAND_CONNECTIONS, Landmark};
use std::fs::File;
use std::path::Path;

pub const OVERLAY_SIZE: u32 = 480;

const BACKGROUND: Rgba<u8> = Rgba([16, 16, 24, 255]);
const BONE: Rgba<u8> = Rgba([0, 255, 0, 255]);
const JOINT: Rgba<u8> = Rgba([255, 0, 0, 255]);
const JOINT_RADIUS: i32 = 3;

fn to_pixel(point: &Landmark, size: u32) -> (f32, f32) {
    let scale = f64::from(size.saturating_sub(1));
    let x = (point.x.clamp(0.0, 1.0) * scale).round();
    let y = (point.y.clamp(0.0, 1.0) * scale).round();
    (x as f32, y as f32)
}

/// Renders the skeleton. Connections that reference a missing point are skipped,
/// so partial frames still draw what they can.
pub fn render(points: &[Landmark], size: u32) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(size, size, BACKGROUND);
    for (a, b) in HAND_CONNECTIONS {
        if let (Some(a), Some(b)) = (points.get(a), points.get(b)) {
            draw_line_segment_mut(&mut image, to_pixel(a, size), to_pixel(b, size), BONE);
        }
    }
    for point in points {
        let (x, y) = to_pixel(point, size);
        draw_filled_circle_mut(&mut image, (x as i32, y as i32), JOINT_RADIUS, JOINT);
    }
    image
}

pub fn save(path: &Path, image: &RgbaImage) -> Result<(), image::error::ImageError> {
    let output = File::create(path)?;
    let encoder = image::codecs::png::PngEncoder::new(output);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(())
}
