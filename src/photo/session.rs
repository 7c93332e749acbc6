use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    catalog::{Catalog, Era, EraId, FilterPreset},
    error::{PhotoError, Result},
    photo::{CaptureMode, CapturedPhoto, PixelBuffer},
    pipeline::{Pipeline, PipelineInput},
};

/// What text goes into the date stamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StampStyle {
    /// The era's display name, e.g. "1999"
    EraName,

    /// The capture time formatted with a strftime pattern
    CaptureDate { format: String },
}

impl Default for StampStyle {
    fn default() -> Self {
        StampStyle::EraName
    }
}

impl StampStyle {
    /// Stamp text for a photo of `era_name` captured at `captured_at`.
    ///
    /// A broken date pattern falls back to the era name.
    pub fn text(&self, era_name: &str, captured_at: &DateTime<Utc>) -> String {
        match self {
            StampStyle::EraName => era_name.to_string(),
            StampStyle::CaptureDate { format } => {
                let mut text = String::new();
                if write!(text, "{}", captured_at.format(format)).is_err() {
                    warn!("Invalid stamp date format {:?}, using era name", format);
                    return era_name.to_string();
                }
                text
            }
        }
    }
}

/// User-facing toggles of a capture session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub mode: CaptureMode,
    pub show_date_stamp: bool,
    pub stamp_style: StampStyle,

    /// Keep the unfiltered capture so re-renders start from it
    pub save_original: bool,

    /// Viewfinder grid overlay; stored for the UI, not used in rendering
    pub show_grid: bool,

    /// Fix grain for every render in the session
    pub grain_seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mode: CaptureMode::Photo,
            show_date_stamp: false,
            stamp_style: StampStyle::EraName,
            save_original: true,
            show_grid: false,
            grain_seed: None,
        }
    }
}

/// Era/preset selection plus the list of captured photos
///
/// A session is owned by one caller; it renders synchronously and never
/// shares a photo buffer across threads.
pub struct CaptureSession {
    catalog: Arc<Catalog>,
    pipeline: Pipeline,
    selected_era: EraId,
    preset_index: usize,
    settings: SessionSettings,
    photos: Vec<CapturedPhoto>,
}

impl CaptureSession {
    /// Start a session on the catalog's first era and first preset
    pub fn new(catalog: Arc<Catalog>, settings: SessionSettings) -> Self {
        let selected_era = catalog.first().id().clone();
        Self {
            catalog,
            pipeline: Pipeline::new(),
            selected_era,
            preset_index: 0,
            settings,
            photos: Vec::new(),
        }
    }

    /// Replace the render pipeline, e.g. to plug in a depth-aware compositor
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SessionSettings {
        &mut self.settings
    }

    pub fn selected_era(&self) -> &Era {
        self.catalog
            .era(&self.selected_era)
            .unwrap_or_else(|| self.catalog.first())
    }

    pub fn preset_index(&self) -> usize {
        self.preset_index
    }

    /// The preset at the selected index, or the era's first preset
    pub fn selected_preset(&self) -> &FilterPreset {
        let era = self.selected_era();
        era.preset_at(self.preset_index)
            .unwrap_or_else(|| era.first_preset())
    }

    /// Switch era, keeping the preset index if the new era has that many presets.
    ///
    /// Unknown ids are ignored.
    pub fn select_era(&mut self, id: &EraId) {
        let Some(era) = self.catalog.era(id) else {
            debug!("Ignoring unknown era {}", id);
            return;
        };

        self.preset_index = self.preset_index.min(era.presets().len() - 1);
        self.selected_era = id.clone();
    }

    /// Select a preset of the current era; out-of-range indices are ignored
    pub fn select_preset(&mut self, index: usize) {
        if index < self.selected_era().presets().len() {
            self.preset_index = index;
        }
    }

    pub fn set_mode(&mut self, mode: CaptureMode) {
        self.settings.mode = mode;
    }

    /// Render a fresh capture at full strength and put it at the front of
    /// the photo list
    pub fn receive_captured_image(&mut self, image: PixelBuffer) -> &CapturedPhoto {
        let era = self.selected_era().clone();
        let preset = self.selected_preset().clone();
        let captured_at = Utc::now();
        let mode = self.settings.mode;
        let original = self.settings.save_original.then(|| image.clone());

        let input = PipelineInput::new(image, preset.clone())
            .with_strength(1.0)
            .with_portrait(mode.is_portrait())
            .with_optional_date_stamp(self.stamp_text(era.name(), &captured_at))
            .with_optional_grain_seed(self.settings.grain_seed);

        let outcome = self.pipeline.apply(input);
        if let Some(reason) = outcome.reason() {
            warn!("Capture kept unfiltered: {}", reason);
        }

        let photo = CapturedPhoto {
            id: Uuid::new_v4(),
            image: outcome.into_image(),
            original,
            era: era.id().clone(),
            era_name: era.name().to_string(),
            preset,
            mode,
            captured_at,
            strength: 1.0,
        };

        info!("Captured photo {} with {} / {}", photo.id, photo.era_name, photo.preset.name);
        self.photos.insert(0, photo);
        &self.photos[0]
    }

    /// Re-render a photo in place at a new strength with its own era and preset.
    ///
    /// Starts from the retained original when there is one; otherwise the
    /// currently displayed image is filtered again.
    pub fn update_photo(&mut self, id: Uuid, strength: f32) -> Result<&CapturedPhoto> {
        let index = self
            .photos
            .iter()
            .position(|photo| photo.id == id)
            .ok_or_else(|| PhotoError::NotFound { id: id.to_string() })?;

        let (source, input_preset, portrait, stamp) = {
            let photo = &self.photos[index];
            (
                photo.render_source().clone(),
                photo.preset.clone(),
                photo.mode.is_portrait(),
                self.stamp_text(&photo.era_name, &photo.captured_at),
            )
        };

        let input = PipelineInput::new(source, input_preset)
            .with_strength(strength)
            .with_portrait(portrait)
            .with_optional_date_stamp(stamp)
            .with_optional_grain_seed(self.settings.grain_seed);

        let outcome = self.pipeline.apply(input);
        if let Some(reason) = outcome.reason() {
            warn!("Re-render of {} fell back: {}", id, reason);
        }

        let photo = &mut self.photos[index];
        photo.image = outcome.into_image();
        photo.strength = strength;
        debug!("Updated photo {} at strength {:.2}", id, strength);
        Ok(photo)
    }

    /// Photos, newest first
    pub fn photos(&self) -> &[CapturedPhoto] {
        &self.photos
    }

    pub fn photo(&self, id: Uuid) -> Option<&CapturedPhoto> {
        self.photos.iter().find(|photo| photo.id == id)
    }

    pub fn remove_photo(&mut self, id: Uuid) -> Option<CapturedPhoto> {
        let index = self.photos.iter().position(|photo| photo.id == id)?;
        Some(self.photos.remove(index))
    }

    fn stamp_text(&self, era_name: &str, captured_at: &DateTime<Utc>) -> Option<String> {
        self.settings
            .show_date_stamp
            .then(|| self.settings.stamp_style.text(era_name, captured_at))
    }
}
