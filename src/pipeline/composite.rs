//! Source-over compositing onto the working frame

use image::RgbaImage;

use crate::{
    error::{PipelineError, Result},
    photo::Frame,
};

/// Composite an 8-bit RGBA layer over `base` with straight-alpha "over".
///
/// The layer must match the frame dimensions.
pub fn over_rgba(base: &mut Frame, layer: &RgbaImage) -> Result<()> {
    check_dimensions("rgba layer", base, layer.width(), layer.height())?;

    base.map_pixels(|x, y, dst| {
        let src = layer.get_pixel(x, y).0;
        let alpha = src[3] as f32 / 255.0;
        if alpha <= 0.0 {
            return dst;
        }
        let mut out = [0.0; 3];
        for c in 0..3 {
            out[c] = (src[c] as f32 / 255.0) * alpha + dst[c] * (1.0 - alpha);
        }
        out
    });

    Ok(())
}

/// Composite a uniformly translucent frame over `base`.
///
/// `opacity` of 1.0 replaces the base entirely.
pub fn over_frame(base: &mut Frame, layer: &Frame, opacity: f32) -> Result<()> {
    check_dimensions("frame layer", base, layer.width(), layer.height())?;

    let alpha = opacity.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return Ok(());
    }

    base.map_pixels(|x, y, dst| {
        let src = layer.get_pixel(x, y);
        [
            src[0] * alpha + dst[0] * (1.0 - alpha),
            src[1] * alpha + dst[1] * (1.0 - alpha),
            src[2] * alpha + dst[2] * (1.0 - alpha),
        ]
    });

    Ok(())
}

fn check_dimensions(what: &str, base: &Frame, width: u32, height: u32) -> Result<()> {
    if base.width() != width || base.height() != height {
        return Err(PipelineError::StageFailed {
            stage: "composite".to_string(),
            reason: format!(
                "{} is {}x{}, frame is {}x{}",
                what,
                width,
                height,
                base.width(),
                base.height()
            ),
        }
        .into());
    }
    Ok(())
}
