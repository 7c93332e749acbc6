//! Exposure, color controls and white balance.
//!
//! Exposure and the temperature shift scale with strength. Saturation and
//! contrast are applied at the preset's full value whatever the strength is;
//! existing renders depend on that, so keep it that way.

use tracing::debug;

use crate::{
    error::Result,
    photo::frame::{linear_to_srgb, luma, srgb_to_linear, Frame},
    pipeline::{Stage, StageContext},
};

/// Reference white of the working space, in Kelvin
pub const NEUTRAL_KELVIN: f32 = 6500.0;

/// Kelvin offset produced by a tint of 1.0 at full strength
pub const KELVIN_PER_TINT: f32 = 1200.0;

pub struct ToneStage;

impl ToneStage {
    pub fn new() -> Self {
        Self
    }

    /// Multiply linear light by `2^stops`
    pub fn apply_exposure(&self, frame: &mut Frame, stops: f32) {
        if stops == 0.0 {
            return;
        }
        let gain = stops.exp2();
        frame.map_pixels(|_, _, rgb| rgb.map(|c| linear_to_srgb(srgb_to_linear(c) * gain)));
    }

    /// Saturation toward Rec.709 luma, then contrast around mid-gray
    pub fn apply_color_controls(&self, frame: &mut Frame, saturation: f32, contrast: f32) {
        if saturation == 1.0 && contrast == 1.0 {
            return;
        }
        frame.map_pixels(|_, _, rgb| {
            let l = luma(rgb);
            rgb.map(|c| {
                let saturated = (l + (c - l) * saturation).clamp(0.0, 1.0);
                (saturated - 0.5) * contrast + 0.5
            })
        });
    }

    /// Rebalance channel gains to move the neutral point along the warm-cool axis.
    ///
    /// The image is treated as lit by an illuminant of
    /// `NEUTRAL_KELVIN + shift * KELVIN_PER_TINT` and corrected back to
    /// `NEUTRAL_KELVIN`, so a positive shift warms the picture.
    pub fn apply_temperature(&self, frame: &mut Frame, shift: f32) {
        if shift == 0.0 {
            return;
        }
        let gains = white_balance_gains(NEUTRAL_KELVIN + shift * KELVIN_PER_TINT, NEUTRAL_KELVIN);
        frame.map_pixels(|_, _, rgb| {
            [
                linear_to_srgb(srgb_to_linear(rgb[0]) * gains[0]),
                linear_to_srgb(srgb_to_linear(rgb[1]) * gains[1]),
                linear_to_srgb(srgb_to_linear(rgb[2]) * gains[2]),
            ]
        });
    }
}

impl Default for ToneStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for ToneStage {
    fn name(&self) -> &str {
        "tone"
    }

    fn is_active(&self, _ctx: &StageContext<'_>) -> bool {
        // Color controls run at full value even at zero strength
        true
    }

    fn apply(&self, frame: &mut Frame, ctx: &StageContext<'_>) -> Result<()> {
        let preset = ctx.preset;
        let stops = preset.exposure * ctx.strength;
        let shift = preset.tint * ctx.strength;

        debug!(
            "tone: exposure {:+.3} stops, saturation {:.3}, contrast {:.3}, temperature shift {:+.3}",
            stops, preset.saturation, preset.contrast, shift
        );

        self.apply_exposure(frame, stops);
        self.apply_color_controls(frame, preset.saturation, preset.contrast);
        self.apply_temperature(frame, shift);
        Ok(())
    }
}

/// Approximate white point of a black-body radiator, normalized to `[0, 1]`.
///
/// Tanner Helland's fit of the Planckian locus, valid for 1000K-40000K.
#[allow(clippy::excessive_precision)]
pub fn kelvin_to_white(kelvin: f32) -> [f32; 3] {
    let temp = (kelvin / 100.0).clamp(10.0, 400.0);

    let (r, g, b) = if temp <= 66.0 {
        let g = 99.4708025861 * temp.ln() - 161.1195681661;
        let b = if temp <= 19.0 {
            0.0
        } else {
            138.5177312231 * (temp - 10.0).ln() - 305.0447927307
        };
        (255.0, g, b)
    } else {
        let r = 329.698727446 * (temp - 60.0).powf(-0.1332047592);
        let g = 288.1221695283 * (temp - 60.0).powf(-0.0755148492);
        (r, g, 255.0)
    };

    [
        (r / 255.0).clamp(0.0, 1.0),
        (g / 255.0).clamp(0.0, 1.0),
        (b / 255.0).clamp(0.0, 1.0),
    ]
}

/// Per-channel gains mapping a `source` neutral onto a `target` neutral,
/// normalized so the green channel is unchanged
pub fn white_balance_gains(source_kelvin: f32, target_kelvin: f32) -> [f32; 3] {
    let source = kelvin_to_white(source_kelvin);
    let target = kelvin_to_white(target_kelvin);

    let mut gains = [0.0; 3];
    for c in 0..3 {
        gains[c] = target[c].max(0.001) / source[c].max(0.001);
    }

    let green = gains[1].max(0.001);
    gains.map(|g| g / green)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FilterPreset;

    fn ctx(preset: &FilterPreset, strength: f32) -> StageContext<'_> {
        StageContext {
            preset,
            strength,
            portrait: false,
            date_stamp: None,
            grain_seed: None,
        }
    }

    #[test]
    fn test_positive_exposure_brightens() {
        let stage = ToneStage::new();
        let mut frame = Frame::new_filled(4, 4, [0.5, 0.5, 0.5]);
        stage.apply_exposure(&mut frame, 1.0);

        let px = frame.get_pixel(0, 0);
        // One stop doubles linear light
        assert!((srgb_to_linear(px[0]) - 2.0 * srgb_to_linear(0.5)).abs() < 1e-4);
    }

    #[test]
    fn test_exposure_clamps() {
        let stage = ToneStage::new();
        let mut frame = Frame::new_filled(2, 2, [0.9, 0.1, 0.5]);
        stage.apply_exposure(&mut frame, 8.0);
        assert_eq!(frame.get_pixel(1, 1)[0], 1.0);
    }

    #[test]
    fn test_saturation_has_no_effect_on_gray() {
        let stage = ToneStage::new();
        let mut frame = Frame::new_filled(2, 2, [0.4, 0.4, 0.4]);
        stage.apply_color_controls(&mut frame, 1.5, 1.0);
        let px = frame.get_pixel(0, 0);
        assert!((px[0] - 0.4).abs() < 1e-5);
        assert!((px[2] - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_zero_saturation_desaturates() {
        let stage = ToneStage::new();
        let mut frame = Frame::new_filled(1, 1, [0.8, 0.2, 0.1]);
        stage.apply_color_controls(&mut frame, 0.0, 1.0);
        let px = frame.get_pixel(0, 0);
        assert!((px[0] - px[1]).abs() < 1e-6);
        assert!((px[1] - px[2]).abs() < 1e-6);
    }

    #[test]
    fn test_contrast_pivots_on_mid_gray() {
        let stage = ToneStage::new();
        let mut frame = Frame::new_filled(1, 1, [0.5, 0.25, 0.75]);
        stage.apply_color_controls(&mut frame, 1.0, 2.0);
        let px = frame.get_pixel(0, 0);
        assert!((px[0] - 0.5).abs() < 1e-6);
        assert!(px[1].abs() < 1e-6);
        assert!((px[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_positive_tint_warms() {
        let gains = white_balance_gains(NEUTRAL_KELVIN + KELVIN_PER_TINT, NEUTRAL_KELVIN);
        assert!(gains[0] > 1.0);
        assert!((gains[1] - 1.0).abs() < 1e-6);
        assert!(gains[2] < 1.0);

        let gains = white_balance_gains(NEUTRAL_KELVIN - KELVIN_PER_TINT, NEUTRAL_KELVIN);
        assert!(gains[2] > gains[0]);
    }

    #[test]
    fn test_tint_shifts_gray_frame() {
        let warm = FilterPreset::new("Warm", 0.0, 0.0, 0.5, 1.0, 1.0, 0.0);
        let mut frame = Frame::new_filled(2, 2, [0.5, 0.5, 0.5]);
        ToneStage::new().apply(&mut frame, &ctx(&warm, 1.0)).unwrap();

        let px = frame.get_pixel(1, 1);
        assert!(px[0] > 0.5);
        assert!((px[1] - 0.5).abs() < 1e-4);
        assert!(px[2] < 0.5);
        assert!(px[0] > px[2]);

        let cool = FilterPreset::new("Cool", 0.0, 0.0, -0.5, 1.0, 1.0, 0.0);
        let mut frame = Frame::new_filled(2, 2, [0.5, 0.5, 0.5]);
        ToneStage::new().apply(&mut frame, &ctx(&cool, 1.0)).unwrap();

        let px = frame.get_pixel(0, 0);
        assert!(px[2] > px[0]);
    }

    #[test]
    fn test_zero_strength_keeps_only_color_controls() {
        let preset = FilterPreset::new("Test", 0.5, 0.5, 0.8, 1.0, 1.0, 2.0);
        let mut frame = Frame::new_filled(3, 3, [0.3, 0.5, 0.7]);
        let before = frame.clone();

        ToneStage::new().apply(&mut frame, &ctx(&preset, 0.0)).unwrap();
        assert_eq!(frame.as_image(), before.as_image());

        let preset = FilterPreset::new("Test", 0.0, 0.0, 0.0, 1.3, 1.0, 0.0);
        ToneStage::new().apply(&mut frame, &ctx(&preset, 0.0)).unwrap();
        assert_ne!(frame.as_image(), before.as_image());
    }
}
