//! # Effects Pipeline
//!
//! Turns a source image, a [`FilterPreset`] and a strength scalar into a
//! stylized image. The stages always run in the same order:
//!
//! 1. **Tone**: exposure, saturation/contrast, temperature
//! 2. **Portrait**: blur composite, only for portrait captures
//! 3. **Vignette**: radial edge darkening
//! 4. **Grain**: procedural noise layer
//! 5. **Stamp**: optional right-aligned text near the bottom edge
//!
//! Several stages are composites, so reordering them changes the picture.
//! The order is fixed and cannot be configured.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use timecam::catalog::Catalog;
//! use timecam::photo::PixelBuffer;
//! use timecam::pipeline::{Pipeline, PipelineInput};
//!
//! # fn main() -> timecam::Result<()> {
//! let catalog = Catalog::builtin()?;
//! let preset = catalog.first().first_preset().clone();
//! let source = PixelBuffer::filled_rgb(640, 480, [128, 128, 128]);
//!
//! let outcome = Pipeline::new().apply(
//!     PipelineInput::new(source, preset)
//!         .with_strength(0.8)
//!         .with_date_stamp("1999"),
//! );
//! assert!(!outcome.is_fallback());
//! let rendered = outcome.into_image();
//! # Ok(())
//! # }
//! ```
//!
//! Malformed input never raises an error: the original buffer comes back in
//! [`PipelineOutcome::Fallback`] with the reason attached.

pub mod composite;
pub mod glyphs;
pub mod grain;
pub mod portrait;
pub mod stamp;
pub mod tone;
pub mod traits;
pub mod vignette;

use std::fmt;

use tracing::{debug, warn};

use crate::{
    catalog::FilterPreset,
    error::{PipelineError, Result, TimecamError},
    photo::{Frame, PixelBuffer},
};

pub use grain::GrainStage;
pub use portrait::{DepthCompositor, PortraitStage, UniformBlur};
pub use stamp::{StampLayout, StampStage};
pub use tone::ToneStage;
pub use traits::{Stage, StageContext};
pub use vignette::VignetteStage;

/// Everything one render needs
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub image: PixelBuffer,
    pub preset: FilterPreset,

    /// Global intensity (0.0-1.0); not validated
    pub strength: f32,

    pub portrait: bool,
    pub date_stamp: Option<String>,

    /// Fixes the grain pattern; `None` gives fresh grain on every call
    pub grain_seed: Option<u64>,
}

impl PipelineInput {
    /// Full strength, no portrait blur, no stamp, unseeded grain
    pub fn new(image: PixelBuffer, preset: FilterPreset) -> Self {
        Self {
            image,
            preset,
            strength: 1.0,
            portrait: false,
            date_stamp: None,
            grain_seed: None,
        }
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_portrait(mut self, portrait: bool) -> Self {
        self.portrait = portrait;
        self
    }

    pub fn with_date_stamp<S: Into<String>>(mut self, text: S) -> Self {
        self.date_stamp = Some(text.into());
        self
    }

    pub fn with_optional_date_stamp(mut self, text: Option<String>) -> Self {
        self.date_stamp = text;
        self
    }

    pub fn with_grain_seed(mut self, seed: u64) -> Self {
        self.grain_seed = Some(seed);
        self
    }

    pub fn with_optional_grain_seed(mut self, seed: Option<u64>) -> Self {
        self.grain_seed = seed;
        self
    }

    fn context(&self) -> StageContext<'_> {
        StageContext {
            preset: &self.preset,
            strength: self.strength,
            portrait: self.portrait,
            date_stamp: self.date_stamp.as_deref(),
            grain_seed: self.grain_seed,
        }
    }
}

/// Why a render handed back its input unchanged
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// The source buffer could not be read as an image
    Undecodable,

    /// A stage reported an error
    StageFailed { stage: String, message: String },

    /// The final frame could not be written back to a buffer
    RenderFailed,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Undecodable => f.write_str("source image could not be decoded"),
            FallbackReason::StageFailed { stage, message } => write!(f, "stage {} failed: {}", stage, message),
            FallbackReason::RenderFailed => f.write_str("output buffer could not be materialized"),
        }
    }
}

/// Result of a render: either the stylized image or the untouched original
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Rendered(PixelBuffer),
    Fallback {
        original: PixelBuffer,
        reason: FallbackReason,
    },
}

impl PipelineOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, PipelineOutcome::Fallback { .. })
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            PipelineOutcome::Rendered(_) => None,
            PipelineOutcome::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn image(&self) -> &PixelBuffer {
        match self {
            PipelineOutcome::Rendered(image) => image,
            PipelineOutcome::Fallback { original, .. } => original,
        }
    }

    /// The rendered image, or the original on fallback
    pub fn into_image(self) -> PixelBuffer {
        match self {
            PipelineOutcome::Rendered(image) => image,
            PipelineOutcome::Fallback { original, .. } => original,
        }
    }
}

/// The ordered chain of stages
///
/// A `Pipeline` holds no per-call state and can be shared across threads;
/// concurrent renders of different images are independent.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_depth_compositor(Box::new(UniformBlur))
    }

    /// Build the pipeline with a different portrait compositor
    pub fn with_depth_compositor(compositor: Box<dyn DepthCompositor>) -> Self {
        Self {
            stages: vec![
                Box::new(ToneStage::new()),
                Box::new(PortraitStage::new(compositor)),
                Box::new(VignetteStage::new()),
                Box::new(GrainStage::new()),
                Box::new(StampStage::default()),
            ],
        }
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Render `input`, never failing.
    ///
    /// An undecodable source, a failing stage or a failed write-back all
    /// return the source buffer unchanged as [`PipelineOutcome::Fallback`].
    pub fn apply(&self, input: PipelineInput) -> PipelineOutcome {
        let mut frame = match Frame::from_buffer(&input.image) {
            Some(frame) => frame,
            None => {
                warn!(
                    "Source image {}x{} ({}, {} bytes) is not decodable, returning it unchanged",
                    input.image.width,
                    input.image.height,
                    input.image.layout,
                    input.image.data.len()
                );
                return PipelineOutcome::Fallback {
                    original: input.image,
                    reason: FallbackReason::Undecodable,
                };
            }
        };

        if let Err(err) = self.run_stages(&mut frame, &input.context()) {
            warn!("Render failed, returning source unchanged: {}", err);
            let reason = match err {
                TimecamError::Pipeline(PipelineError::StageFailed { stage, reason }) => {
                    FallbackReason::StageFailed { stage, message: reason }
                }
                other => FallbackReason::StageFailed {
                    stage: "unknown".to_string(),
                    message: other.to_string(),
                },
            };
            return PipelineOutcome::Fallback {
                original: input.image,
                reason,
            };
        }

        match frame.to_buffer(&input.image) {
            Some(output) => PipelineOutcome::Rendered(output),
            None => {
                warn!("Could not write the rendered frame back, returning source unchanged");
                PipelineOutcome::Fallback {
                    original: input.image,
                    reason: FallbackReason::RenderFailed,
                }
            }
        }
    }

    /// Run every active stage over an already decoded frame
    pub fn run_stages(&self, frame: &mut Frame, ctx: &StageContext<'_>) -> Result<()> {
        for stage in &self.stages {
            if !stage.is_active(ctx) {
                debug!("Skipping inactive stage {}", stage.name());
                continue;
            }

            stage.apply(frame, ctx).map_err(|e| PipelineError::StageFailed {
                stage: stage.name().to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot render with the default pipeline and unseeded grain.
///
/// Returns the original image unchanged if it cannot be processed.
pub fn apply(
    image: PixelBuffer,
    preset: &FilterPreset,
    strength: f32,
    portrait: bool,
    date_stamp: Option<&str>,
) -> PixelBuffer {
    let input = PipelineInput::new(image, preset.clone())
        .with_strength(strength)
        .with_portrait(portrait)
        .with_optional_date_stamp(date_stamp.map(str::to_string));

    Pipeline::new().apply(input).into_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::PixelLayout;

    struct Failing;

    impl DepthCompositor for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn composite(&self, _frame: &mut Frame, _radius: f32) -> Result<()> {
            Err(TimecamError::generic("no depth map"))
        }
    }

    #[test]
    fn test_stage_order_is_fixed() {
        assert_eq!(
            Pipeline::new().stage_names(),
            vec!["tone", "portrait", "vignette", "grain", "stamp"]
        );
    }

    #[test]
    fn test_undecodable_input_is_returned() {
        let corrupt = PixelBuffer::new(10, 10, PixelLayout::Rgb8, vec![1, 2, 3]);
        let outcome = Pipeline::new().apply(PipelineInput::new(corrupt.clone(), FilterPreset::neutral()));

        assert_eq!(outcome.reason(), Some(&FallbackReason::Undecodable));
        assert_eq!(outcome.into_image(), corrupt);
    }

    #[test]
    fn test_stage_error_falls_back() {
        let source = PixelBuffer::filled_rgb(8, 8, [100, 120, 140]);
        let pipeline = Pipeline::with_depth_compositor(Box::new(Failing));
        let outcome = pipeline.apply(
            PipelineInput::new(source.clone(), FilterPreset::new("Soft", 0.0, 0.3, 0.0, 1.0, 1.0, 0.2))
                .with_portrait(true),
        );

        match outcome.reason() {
            Some(FallbackReason::StageFailed { stage, .. }) => assert_eq!(stage, "portrait"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(outcome.into_image(), source);
    }

    #[test]
    fn test_neutral_preset_is_identity() {
        let source = PixelBuffer::new(3, 2, PixelLayout::Rgb8, (0..18).map(|i| i * 14).collect());
        let outcome = Pipeline::new().apply(PipelineInput::new(source.clone(), FilterPreset::neutral()));

        assert!(!outcome.is_fallback());
        assert_eq!(outcome.into_image(), source);
    }
}
