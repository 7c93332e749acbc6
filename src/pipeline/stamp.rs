use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::{
    error::Result,
    photo::Frame,
    pipeline::{
        composite,
        glyphs::{self, GLYPH_HEIGHT, GLYPH_WIDTH},
        Stage, StageContext,
    },
};

/// Layout of the date stamp strip, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampLayout {
    /// Glyph pixel scale (2 gives a 10x14 cell, roughly a 16pt face)
    pub scale: u32,

    /// Blank columns between glyphs, before scaling
    pub tracking: u32,

    /// Distance from the strip top to the bottom edge of the frame
    pub strip_offset: u32,

    pub strip_height: u32,

    pub right_margin: u32,

    pub fill: [u8; 4],
    pub shadow: [u8; 4],
    pub shadow_offset: (i64, i64),
}

impl Default for StampLayout {
    fn default() -> Self {
        Self {
            scale: 2,
            tracking: 1,
            strip_offset: 28,
            strip_height: 24,
            right_margin: 12,
            fill: [255, 255, 255, 255],
            shadow: [0, 0, 0, 84],
            shadow_offset: (1, 2),
        }
    }
}

impl StampLayout {
    fn advance(&self) -> i64 {
        ((GLYPH_WIDTH + self.tracking) * self.scale) as i64
    }

    /// Rendered width of `text`
    pub fn text_width(&self, text: &str) -> i64 {
        let count = text.chars().count() as i64;
        if count == 0 {
            return 0;
        }
        count * self.advance() - (self.tracking * self.scale) as i64
    }

    /// Top-left corner of the text for a frame of the given size.
    ///
    /// The text is right-aligned against the margin and vertically centered
    /// in the strip. Coordinates may be negative on tiny frames.
    pub fn origin(&self, text: &str, width: u32, height: u32) -> (i64, i64) {
        let right = width as i64 - self.right_margin as i64;
        let strip_top = height as i64 - self.strip_offset as i64;
        let glyph_height = (GLYPH_HEIGHT * self.scale) as i64;
        let top = strip_top + (self.strip_height as i64 - glyph_height) / 2;
        (right - self.text_width(text), top)
    }
}

/// Right-aligned text stamp near the bottom edge
#[derive(Default)]
pub struct StampStage {
    layout: StampLayout,
}

impl StampStage {
    pub fn new(layout: StampLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &StampLayout {
        &self.layout
    }

    /// Rasterize `text` onto a transparent layer the size of the frame
    pub fn render_layer(&self, text: &str, width: u32, height: u32) -> RgbaImage {
        let mut layer = RgbaImage::new(width, height);
        let (x0, y0) = self.layout.origin(text, width, height);
        let (sx, sy) = self.layout.shadow_offset;

        // Shadow first so the fill always wins where they overlap
        self.draw_text(&mut layer, text, x0 + sx, y0 + sy, Rgba(self.layout.shadow));
        self.draw_text(&mut layer, text, x0, y0, Rgba(self.layout.fill));
        layer
    }

    fn draw_text(&self, layer: &mut RgbaImage, text: &str, x0: i64, y0: i64, color: Rgba<u8>) {
        let scale = self.layout.scale as i64;
        let (width, height) = (layer.width() as i64, layer.height() as i64);

        for (index, ch) in text.chars().enumerate() {
            let rows = glyphs::glyph(ch);
            let gx = x0 + index as i64 * self.layout.advance();

            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if !glyphs::is_set(&rows, col, row) {
                        continue;
                    }
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let x = gx + col as i64 * scale + dx;
                            let y = y0 + row as i64 * scale + dy;
                            if x >= 0 && y >= 0 && x < width && y < height {
                                layer.put_pixel(x as u32, y as u32, color);
                            }
                        }
                    }
                }
            }
        }
    }
}

impl Stage for StampStage {
    fn name(&self) -> &str {
        "stamp"
    }

    fn is_active(&self, ctx: &StageContext<'_>) -> bool {
        ctx.date_stamp.map_or(false, |text| !text.is_empty())
    }

    fn apply(&self, frame: &mut Frame, ctx: &StageContext<'_>) -> Result<()> {
        let text = match ctx.date_stamp {
            Some(text) if !text.is_empty() => text,
            _ => return Ok(()),
        };

        debug!("stamp: {:?}", text);
        let layer = self.render_layer(text, frame.width(), frame.height());
        composite::over_rgba(frame, &layer)
    }
}
