use crate::{catalog::FilterPreset, error::Result, photo::Frame};

/// Per-call parameters shared by every stage
///
/// Built by the orchestrator from a [`PipelineInput`](super::PipelineInput);
/// stages read what they need and derive their own scaled parameters.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub preset: &'a FilterPreset,

    /// Global intensity multiplier (0.0 = none, 1.0 = full preset)
    pub strength: f32,

    pub portrait: bool,

    pub date_stamp: Option<&'a str>,

    /// Seed for the grain generator; `None` draws fresh entropy
    pub grain_seed: Option<u64>,
}

/// One step of the effects pipeline
pub trait Stage: Send + Sync {
    /// Returns the unique name of this stage
    fn name(&self) -> &str;

    /// Whether the stage does anything for this call.
    ///
    /// Inactive stages are skipped entirely, which is what makes the
    /// zero-strength and absent-stamp cases exact no-ops.
    fn is_active(&self, ctx: &StageContext<'_>) -> bool;

    /// Apply the stage to the working frame in place
    fn apply(&self, frame: &mut Frame, ctx: &StageContext<'_>) -> Result<()>;
}
