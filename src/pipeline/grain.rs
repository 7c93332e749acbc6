use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::{
    error::Result,
    photo::Frame,
    pipeline::{Stage, StageContext},
};

/// Procedural film grain
///
/// Draws an independent uniform sample per pixel and per channel, scales it
/// to the grain amplitude and layers it additively, centered on zero, over
/// the frame.
///
/// Without a seed every call draws fresh entropy, so two renders of the same
/// photo differ in their grain. Pass a seed through
/// [`PipelineInput::with_grain_seed`](super::PipelineInput::with_grain_seed)
/// when re-renders must match.
pub struct GrainStage;

impl GrainStage {
    pub fn new() -> Self {
        Self
    }

    pub fn apply_grain<R: Rng>(&self, frame: &mut Frame, amplitude: f32, rng: &mut R) {
        frame.map_pixels(|_, _, rgb| {
            let noise: [f32; 3] = [rng.gen(), rng.gen(), rng.gen()];
            [
                rgb[0] + amplitude * (noise[0] - 0.5),
                rgb[1] + amplitude * (noise[1] - 0.5),
                rgb[2] + amplitude * (noise[2] - 0.5),
            ]
        });
    }
}

impl Default for GrainStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for GrainStage {
    fn name(&self) -> &str {
        "grain"
    }

    fn is_active(&self, ctx: &StageContext<'_>) -> bool {
        // NaN compares false, so it is treated as no grain
        ctx.preset.grain * ctx.strength > 0.0
    }

    fn apply(&self, frame: &mut Frame, ctx: &StageContext<'_>) -> Result<()> {
        let amplitude = ctx.preset.grain * ctx.strength;
        let mut rng = match ctx.grain_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        debug!("grain: amplitude {:.3}, seeded {}", amplitude, ctx.grain_seed.is_some());
        self.apply_grain(frame, amplitude, &mut rng);
        Ok(())
    }
}
