//! Simulated portrait separation.
//!
//! There is no depth data, so the shipped compositor blurs the whole frame
//! and lays the blurred copy over the sharp one as an opaque layer. The
//! result is a uniformly softened image, not a subject/background split.
//! A depth-aware compositor can be swapped in through [`DepthCompositor`]
//! without changing the pipeline's inputs or outputs.

use image::imageops;
use tracing::debug;

use crate::{
    error::{PipelineError, Result},
    photo::Frame,
    pipeline::{composite, Stage, StageContext},
};

/// Blur radius at full strength
pub const MAX_BLUR_RADIUS: f32 = 8.0;

/// Strategy for separating subject and background in portrait captures
pub trait DepthCompositor: Send + Sync {
    fn name(&self) -> &str;

    /// Composite a background blur of `radius` onto `frame`
    fn composite(&self, frame: &mut Frame, radius: f32) -> Result<()>;
}

/// Gaussian blur of the full frame composited over the sharp frame
pub struct UniformBlur;

impl DepthCompositor for UniformBlur {
    fn name(&self) -> &str {
        "uniform-blur"
    }

    fn composite(&self, frame: &mut Frame, radius: f32) -> Result<()> {
        let blurred = Frame::new(imageops::blur(frame.as_image(), radius));
        if blurred.width() != frame.width() || blurred.height() != frame.height() {
            return Err(PipelineError::StageFailed {
                stage: "portrait".to_string(),
                reason: "blur changed frame dimensions".to_string(),
            }
            .into());
        }
        composite::over_frame(frame, &blurred, 1.0)
    }
}

pub struct PortraitStage {
    compositor: Box<dyn DepthCompositor>,
}

impl PortraitStage {
    pub fn new(compositor: Box<dyn DepthCompositor>) -> Self {
        Self { compositor }
    }

    pub fn compositor_name(&self) -> &str {
        self.compositor.name()
    }
}

impl Default for PortraitStage {
    fn default() -> Self {
        Self::new(Box::new(UniformBlur))
    }
}

impl Stage for PortraitStage {
    fn name(&self) -> &str {
        "portrait"
    }

    fn is_active(&self, ctx: &StageContext<'_>) -> bool {
        let radius = MAX_BLUR_RADIUS * ctx.strength;
        ctx.portrait && radius.is_finite() && radius > 0.0
    }

    fn apply(&self, frame: &mut Frame, ctx: &StageContext<'_>) -> Result<()> {
        let radius = MAX_BLUR_RADIUS * ctx.strength;
        debug!("portrait: {} radius {:.2}", self.compositor.name(), radius);
        self.compositor.composite(frame, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FilterPreset;

    fn checkerboard(size: u32) -> Frame {
        let mut frame = Frame::new_filled(size, size, [0.0; 3]);
        frame.map_pixels(|x, y, _| if (x + y) % 2 == 0 { [1.0; 3] } else { [0.0; 3] });
        frame
    }

    #[test]
    fn test_blur_softens_detail() {
        let mut frame = checkerboard(16);
        UniformBlur.composite(&mut frame, 4.0).unwrap();

        let px = frame.get_pixel(8, 8);
        assert!(px[0] > 0.2 && px[0] < 0.8);
        assert_eq!((frame.width(), frame.height()), (16, 16));
    }

    #[test]
    fn test_gated_by_flag_and_strength() {
        let preset = FilterPreset::neutral();
        let stage = PortraitStage::default();
        let mut ctx = StageContext {
            preset: &preset,
            strength: 1.0,
            portrait: false,
            date_stamp: None,
            grain_seed: None,
        };
        assert!(!stage.is_active(&ctx));

        ctx.portrait = true;
        assert!(stage.is_active(&ctx));

        ctx.strength = 0.0;
        assert!(!stage.is_active(&ctx));

        ctx.strength = f32::NAN;
        assert!(!stage.is_active(&ctx));
    }

    struct Recording;

    impl DepthCompositor for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn composite(&self, frame: &mut Frame, radius: f32) -> Result<()> {
            frame.map_pixels(|_, _, _| [radius / MAX_BLUR_RADIUS; 3]);
            Ok(())
        }
    }

    #[test]
    fn test_custom_compositor_receives_radius() {
        let preset = FilterPreset::neutral();
        let stage = PortraitStage::new(Box::new(Recording));
        assert_eq!(stage.compositor_name(), "recording");

        let ctx = StageContext {
            preset: &preset,
            strength: 0.5,
            portrait: true,
            date_stamp: None,
            grain_seed: None,
        };
        let mut frame = Frame::new_filled(2, 2, [0.0; 3]);
        stage.apply(&mut frame, &ctx).unwrap();
        assert_eq!(frame.get_pixel(0, 0), [0.5; 3]);
    }
}
