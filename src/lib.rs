//! # TimeCam
//!
//! Make photos look like they were taken in another decade.
//!
//! This library provides a catalog of era-themed filter presets and an image
//! pipeline that applies them: exposure, color and white balance shifts, an
//! optional portrait blur, vignetting, film grain and a date stamp.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use timecam::{
//!     catalog::Catalog,
//!     photo::loader,
//!     pipeline::{Pipeline, PipelineInput},
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let catalog = Catalog::builtin()?;
//! let (era, preset) = catalog.resolve("1999", Some("vhs-night"))?;
//!
//! let source = loader::load("holiday.jpg")?;
//! let outcome = Pipeline::new().apply(
//!     PipelineInput::new(source, preset.clone())
//!         .with_strength(0.75)
//!         .with_date_stamp(era.name()),
//! );
//!
//! loader::save(outcome.image(), "holiday_1999.jpg", 90)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`catalog`] - Eras and their filter presets
//! - [`pipeline`] - The ordered effect stages and the render orchestrator
//! - [`photo`] - Pixel buffers, the working frame, capture sessions
//! - [`config`] - Configuration management
//!
//! ## Custom Portrait Compositing
//!
//! The shipped portrait stage blurs the whole frame. A depth-aware blur can
//! be plugged in by implementing [`DepthCompositor`](pipeline::DepthCompositor):
//!
//! ```rust,no_run
//! use timecam::pipeline::{DepthCompositor, Pipeline};
//! use timecam::photo::Frame;
//! use timecam::Result;
//!
//! struct SubjectMask;
//!
//! impl DepthCompositor for SubjectMask {
//!     fn name(&self) -> &str {
//!         "subject_mask"
//!     }
//!
//!     fn composite(&self, frame: &mut Frame, radius: f32) -> Result<()> {
//!         // Blur only the background
//!         Ok(())
//!     }
//! }
//!
//! let pipeline = Pipeline::with_depth_compositor(Box::new(SubjectMask));
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod photo;
pub mod pipeline;

// Re-export commonly used types for convenience
pub use crate::{
    catalog::{Catalog, Era, FilterPreset},
    config::Config,
    error::{Result, TimecamError},
    photo::{CaptureSession, PixelBuffer},
    pipeline::{Pipeline, PipelineInput, PipelineOutcome},
};
