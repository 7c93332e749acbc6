use image::{ImageBuffer, Rgb, Rgb32FImage};

use crate::photo::{PixelBuffer, PixelLayout};

/// Rec.709 luma weights
pub const LUMA_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Decode an sRGB-encoded channel value to linear light
pub fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode a linear-light channel value as sRGB
pub fn linear_to_srgb(value: f32) -> f32 {
    if value <= 0.003_130_8 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

pub fn luma(rgb: [f32; 3]) -> f32 {
    rgb[0] * LUMA_WEIGHTS[0] + rgb[1] * LUMA_WEIGHTS[1] + rgb[2] * LUMA_WEIGHTS[2]
}

/// Working image for the effects pipeline
///
/// Holds sRGB-encoded RGB values as `f32` in `[0, 1]`. Every stage reads and
/// writes a `Frame`; stages that need linear light convert per pixel.
#[derive(Clone, Debug)]
pub struct Frame {
    buffer: Rgb32FImage,
}

impl Frame {
    pub fn new(buffer: Rgb32FImage) -> Self {
        Self { buffer }
    }

    /// Create a frame filled with the given encoded color
    pub fn new_filled(width: u32, height: u32, color: [f32; 3]) -> Self {
        Self {
            buffer: ImageBuffer::from_pixel(width, height, Rgb(color)),
        }
    }

    /// Decode a [`PixelBuffer`] into a working frame.
    ///
    /// Returns `None` when the buffer has no pixels or its byte length does
    /// not match the declared dimensions.
    pub fn from_buffer(source: &PixelBuffer) -> Option<Self> {
        if !source.is_well_formed() {
            return None;
        }

        let channels = source.layout.channels();
        let color = source.layout.is_color();
        let mut values = Vec::with_capacity(source.pixel_count()?.checked_mul(3)?);

        for pixel in source.data.chunks_exact(channels) {
            if color {
                values.extend(pixel[..3].iter().map(|&c| c as f32 / 255.0));
            } else {
                let v = pixel[0] as f32 / 255.0;
                values.extend_from_slice(&[v, v, v]);
            }
        }

        ImageBuffer::from_raw(source.width, source.height, values).map(Self::new)
    }

    /// Quantize back to 8 bits using the layout of `template`.
    ///
    /// Alpha channels are copied from `template` unchanged; gray layouts are
    /// collapsed to Rec.709 luma. Returns `None` if the frame and template
    /// disagree on dimensions.
    pub fn to_buffer(&self, template: &PixelBuffer) -> Option<PixelBuffer> {
        if template.width != self.width() || template.height != self.height() || !template.is_well_formed() {
            return None;
        }

        let layout = template.layout;
        let channels = layout.channels();
        let mut data = Vec::with_capacity(template.expected_len()?);

        for (pixel, original) in self.buffer.pixels().zip(template.data.chunks_exact(channels)) {
            let rgb = pixel.0;
            match layout {
                PixelLayout::Rgb8 | PixelLayout::Rgba8 => {
                    data.extend(rgb.iter().map(|&c| quantize(c)));
                }
                PixelLayout::Luma8 | PixelLayout::LumaA8 => data.push(quantize(luma(rgb))),
            }
            if layout.has_alpha() {
                data.push(original[channels - 1]);
            }
        }

        Some(PixelBuffer::new(self.width(), self.height(), layout, data))
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> [f32; 3] {
        self.buffer.get_pixel(x, y).0
    }

    /// Replace every pixel with `f(x, y, rgb)`, clamping the result to `[0, 1]`
    pub fn map_pixels<F>(&mut self, mut f: F)
    where
        F: FnMut(u32, u32, [f32; 3]) -> [f32; 3],
    {
        for (x, y, pixel) in self.buffer.enumerate_pixels_mut() {
            let out = f(x, y, pixel.0);
            pixel.0 = [clamp_unit(out[0]), clamp_unit(out[1]), clamp_unit(out[2])];
        }
    }

    pub fn as_image(&self) -> &Rgb32FImage {
        &self.buffer
    }

    /// Mean Rec.709 luma over a rectangle, used by diagnostics and tests
    pub fn mean_luma(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> f32 {
        let (x1, y1) = (x1.min(self.width()), y1.min(self.height()));
        if x0 >= x1 || y0 >= y1 {
            return 0.0;
        }

        let mut sum = 0.0f64;
        for y in y0..y1 {
            for x in x0..x1 {
                sum += luma(self.get_pixel(x, y)) as f64;
            }
        }
        (sum / ((x1 - x0) as f64 * (y1 - y0) as f64)) as f32
    }
}

/// Clamp to `[0, 1]`, mapping NaN to 0
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn quantize(value: f32) -> u8 {
    (clamp_unit(value) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_roundtrip_is_close() {
        for i in 0..=20 {
            let v = i as f32 / 20.0;
            assert!((linear_to_srgb(srgb_to_linear(v)) - v).abs() < 1e-4);
        }
    }

    #[test]
    fn test_buffer_roundtrip_is_lossless() {
        let data: Vec<u8> = (0..2 * 2 * 4).map(|i| (i * 13) as u8).collect();
        let source = PixelBuffer::new(2, 2, PixelLayout::Rgba8, data);
        let frame = Frame::from_buffer(&source).unwrap();
        assert_eq!(frame.to_buffer(&source).unwrap(), source);
    }

    #[test]
    fn test_gray_expands_to_rgb() {
        let source = PixelBuffer::new(1, 1, PixelLayout::LumaA8, vec![128, 7]);
        let frame = Frame::from_buffer(&source).unwrap();
        let px = frame.get_pixel(0, 0);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert_eq!(frame.to_buffer(&source).unwrap().data, vec![128, 7]);
    }

    #[test]
    fn test_malformed_buffer_rejected() {
        let source = PixelBuffer::new(3, 3, PixelLayout::Rgb8, vec![0; 5]);
        assert!(Frame::from_buffer(&source).is_none());
    }

    #[test]
    fn test_map_pixels_clamps() {
        let mut frame = Frame::new_filled(2, 2, [0.5, 0.5, 0.5]);
        frame.map_pixels(|_, _, _| [2.0, -1.0, f32::NAN]);
        assert_eq!(frame.get_pixel(1, 1), [1.0, 0.0, 0.0]);
    }
}
