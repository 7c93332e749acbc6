use tracing::debug;

use crate::{
    error::Result,
    photo::Frame,
    pipeline::{Stage, StageContext},
};

/// Radial darkening toward the frame edges
pub struct VignetteStage;

impl VignetteStage {
    pub fn new() -> Self {
        Self
    }

    /// Gain applied at normalized distance `d` from the center (0 = center,
    /// 1 = corner).
    ///
    /// `radius` controls how far in the falloff starts: at 2.0 it begins at
    /// the center, at 1.0 halfway out, and at 0.0 only the corners darken.
    pub fn gain(distance: f32, intensity: f32, radius: f32) -> f32 {
        let inner = (1.0 - radius / 2.0).clamp(0.0, 0.999);
        1.0 - intensity * smoothstep(inner, 1.0, distance)
    }

    pub fn apply_vignette(&self, frame: &mut Frame, intensity: f32, radius: f32) {
        let cx = (frame.width() as f32 - 1.0) / 2.0;
        let cy = (frame.height() as f32 - 1.0) / 2.0;
        let half_diagonal = (cx * cx + cy * cy).sqrt().max(f32::EPSILON);

        frame.map_pixels(|x, y, rgb| {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let distance = (dx * dx + dy * dy).sqrt() / half_diagonal;
            let gain = Self::gain(distance, intensity, radius);
            rgb.map(|c| c * gain)
        });
    }
}

impl Default for VignetteStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for VignetteStage {
    fn name(&self) -> &str {
        "vignette"
    }

    fn is_active(&self, ctx: &StageContext<'_>) -> bool {
        let intensity = ctx.preset.vignette * ctx.strength;
        intensity.is_finite() && intensity != 0.0
    }

    fn apply(&self, frame: &mut Frame, ctx: &StageContext<'_>) -> Result<()> {
        let intensity = ctx.preset.vignette * ctx.strength;
        let radius = 2.0 * ctx.strength;

        debug!("vignette: intensity {:.3}, radius {:.3}", intensity, radius);
        self.apply_vignette(frame, intensity, radius);
        Ok(())
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_untouched_edges_darkened() {
        let stage = VignetteStage::new();
        let mut frame = Frame::new_filled(51, 51, [0.5, 0.5, 0.5]);
        stage.apply_vignette(&mut frame, 0.5, 2.0);

        assert!((frame.get_pixel(25, 25)[0] - 0.5).abs() < 1e-6);
        assert!(frame.get_pixel(0, 0)[0] < 0.5);
        assert!(frame.get_pixel(0, 25)[0] < 0.5);
        assert!(frame.get_pixel(0, 0)[0] < frame.get_pixel(0, 25)[0]);
    }

    #[test]
    fn test_gain_is_monotonic_in_intensity() {
        for d in [0.3f32, 0.7, 1.0] {
            let weak = VignetteStage::gain(d, 0.2, 2.0);
            let strong = VignetteStage::gain(d, 0.6, 2.0);
            assert!(strong < weak, "d = {}", d);
        }
    }

    #[test]
    fn test_smaller_radius_confines_falloff() {
        // At half radius the inner half of the frame is left alone
        assert_eq!(VignetteStage::gain(0.4, 1.0, 1.0), 1.0);
        assert!(VignetteStage::gain(0.4, 1.0, 2.0) < 1.0);
    }

    #[test]
    fn test_single_pixel_frame() {
        let mut frame = Frame::new_filled(1, 1, [0.5, 0.5, 0.5]);
        VignetteStage::new().apply_vignette(&mut frame, 1.0, 2.0);
        assert_eq!(frame.get_pixel(0, 0), [0.5, 0.5, 0.5]);
    }
}
