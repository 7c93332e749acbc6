use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    catalog::{EraId, FilterPreset},
    photo::PixelBuffer,
};

/// How the shutter was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    #[default]
    Photo,
    Portrait,
}

impl CaptureMode {
    pub fn is_portrait(self) -> bool {
        self == CaptureMode::Portrait
    }
}

/// A photo taken in a capture session
///
/// `image` is what is currently displayed and gets replaced whenever the
/// photo is re-rendered. `original` holds the unfiltered capture when the
/// session keeps originals.
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    pub id: Uuid,
    pub image: PixelBuffer,
    pub original: Option<PixelBuffer>,
    pub era: EraId,
    pub era_name: String,
    pub preset: FilterPreset,
    pub mode: CaptureMode,
    pub captured_at: DateTime<Utc>,

    /// Strength of the most recent render
    pub strength: f32,
}

impl CapturedPhoto {
    /// The buffer a re-render should start from
    pub fn render_source(&self) -> &PixelBuffer {
        self.original.as_ref().unwrap_or(&self.image)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width, self.image.height)
    }
}
