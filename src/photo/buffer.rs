use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PhotoError, Result};

/// Channel layout of a [`PixelBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelLayout {
    Luma8,
    LumaA8,
    Rgb8,
    Rgba8,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Luma8 => 1,
            PixelLayout::LumaA8 => 2,
            PixelLayout::Rgb8 => 3,
            PixelLayout::Rgba8 => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, PixelLayout::LumaA8 | PixelLayout::Rgba8)
    }

    pub fn is_color(self) -> bool {
        matches!(self, PixelLayout::Rgb8 | PixelLayout::Rgba8)
    }
}

impl fmt::Display for PixelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelLayout::Luma8 => "luma8",
            PixelLayout::LumaA8 => "luma-alpha8",
            PixelLayout::Rgb8 => "rgb8",
            PixelLayout::Rgba8 => "rgba8",
        };
        f.write_str(name)
    }
}

/// A decoded image as exchanged with capture and presentation code
///
/// The buffer is interleaved, row-major, 8 bits per channel. Nothing checks
/// that `data` actually matches the declared dimensions until the pipeline
/// tries to decode it; a mismatched buffer is handed back untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            layout,
            data,
        }
    }

    /// A buffer filled with a single RGB color
    pub fn filled_rgb(width: u32, height: u32, color: [u8; 3]) -> Self {
        let data = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self::new(width, height, PixelLayout::Rgb8, data)
    }

    /// Number of pixels the declared dimensions describe, `None` on overflow
    pub fn pixel_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    /// Number of bytes the declared dimensions and layout require.
    ///
    /// `None` when the header describes more bytes than `usize` can hold.
    pub fn expected_len(&self) -> Option<usize> {
        self.pixel_count()?.checked_mul(self.layout.channels())
    }

    /// Whether the buffer can be interpreted as an image at all
    pub fn is_well_formed(&self) -> bool {
        self.width > 0 && self.height > 0 && self.expected_len() == Some(self.data.len())
    }

    pub fn check(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PhotoError::DecodeFailed {
                reason: format!("empty dimensions {}x{}", self.width, self.height),
            }
            .into());
        }
        match self.expected_len() {
            None => Err(PhotoError::DecodeFailed {
                reason: format!("dimensions {}x{} overflow", self.width, self.height),
            }
            .into()),
            Some(expected) if expected != self.data.len() => Err(PhotoError::SizeMismatch {
                expected,
                actual: self.data.len(),
            }
            .into()),
            Some(_) => Ok(()),
        }
    }

    /// Channel bytes of the pixel at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let channels = self.layout.channels();
        let start = (y as usize * self.width as usize + x as usize) * channels;
        &self.data[start..start + channels]
    }

    /// Convert a decoded [`DynamicImage`], keeping gray and alpha layouts where possible
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        match image {
            DynamicImage::ImageLuma8(img) => Self::new(width, height, PixelLayout::Luma8, img.into_raw()),
            DynamicImage::ImageLumaA8(img) => Self::new(width, height, PixelLayout::LumaA8, img.into_raw()),
            DynamicImage::ImageRgb8(img) => Self::new(width, height, PixelLayout::Rgb8, img.into_raw()),
            DynamicImage::ImageRgba8(img) => Self::new(width, height, PixelLayout::Rgba8, img.into_raw()),
            other if other.color().has_alpha() => {
                Self::new(width, height, PixelLayout::Rgba8, other.into_rgba8().into_raw())
            }
            other => Self::new(width, height, PixelLayout::Rgb8, other.into_rgb8().into_raw()),
        }
    }

    /// Convert back into a [`DynamicImage`] for encoding
    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        self.check()?;
        let (w, h, data) = (self.width, self.height, self.data.clone());
        let image = match self.layout {
            PixelLayout::Luma8 => GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            PixelLayout::LumaA8 => GrayAlphaImage::from_raw(w, h, data).map(DynamicImage::ImageLumaA8),
            PixelLayout::Rgb8 => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            PixelLayout::Rgba8 => RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
        };

        image.ok_or_else(|| {
            PhotoError::SizeMismatch {
                expected: self.expected_len().unwrap_or_default(),
                actual: self.data.len(),
            }
            .into()
        })
    }
}
