use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CatalogError, Result};

/// Turn a display name into a lowercase, dash-separated identifier.
///
/// Non-ASCII letters are folded to their closest ASCII form where it is
/// obvious (`é` -> `e`) and dropped otherwise.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        let folded = match ch {
            'à' | 'á' | 'â' | 'ä' | 'À' | 'Á' | 'Â' | 'Ä' => Some('a'),
            'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => Some('e'),
            'ì' | 'í' | 'î' | 'ï' => Some('i'),
            'ò' | 'ó' | 'ô' | 'ö' => Some('o'),
            'ù' | 'ú' | 'û' | 'ü' => Some('u'),
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            _ => None,
        };

        match folded {
            Some(c) => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            }
            None => pending_dash = true,
        }
    }

    slug
}

/// Stable identifier of an [`Era`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EraId(String);

impl EraId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn from_name(name: &str) -> Self {
        Self(slugify(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier of a [`FilterPreset`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetId(String);

impl PresetId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn from_name(name: &str) -> Self {
        Self(slugify(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named bundle of the six scalar parameters that drive the effects pipeline.
///
/// Presets are plain values. The pipeline never validates them: anything out of
/// the documented ranges simply produces whatever the clamped arithmetic gives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPreset {
    pub id: PresetId,
    pub name: String,

    /// Grain amplitude (0.0-1.0)
    pub grain: f32,

    /// Vignette intensity (0.0-1.0)
    pub vignette: f32,

    /// Warm/cool white balance shift (-1.0-1.0, positive is warmer)
    pub tint: f32,

    /// Contrast multiplier around mid-gray (nominal 1.0)
    pub contrast: f32,

    /// Saturation multiplier (nominal 1.0)
    pub saturation: f32,

    /// Exposure compensation in stops
    pub exposure: f32,
}

impl FilterPreset {
    /// Create a preset whose id is derived from its name
    pub fn new(
        name: &str,
        grain: f32,
        vignette: f32,
        tint: f32,
        contrast: f32,
        saturation: f32,
        exposure: f32,
    ) -> Self {
        Self {
            id: PresetId::from_name(name),
            name: name.to_string(),
            grain,
            vignette,
            tint,
            contrast,
            saturation,
            exposure,
        }
    }

    /// A preset that leaves every stage inactive except the identity color controls
    pub fn neutral() -> Self {
        Self::new("Neutral", 0.0, 0.0, 0.0, 1.0, 1.0, 0.0)
    }

    /// Check parameters against their documented ranges.
    ///
    /// Only the catalog layer calls this; the pipeline accepts anything.
    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, f32, f32, f32); 6] = [
            ("grain", self.grain, 0.0, 1.0),
            ("vignette", self.vignette, 0.0, 1.0),
            ("tint", self.tint, -1.0, 1.0),
            ("contrast", self.contrast, 0.0, 4.0),
            ("saturation", self.saturation, 0.0, 4.0),
            ("exposure", self.exposure, -10.0, 10.0),
        ];

        for (parameter, value, min, max) in checks {
            if !value.is_finite() || value < min || value > max {
                return Err(CatalogError::OutOfRange {
                    preset: self.name.clone(),
                    parameter: parameter.to_string(),
                    value,
                }
                .into());
            }
        }

        Ok(())
    }
}

/// A historical style bucket grouping one or more presets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Era {
    id: EraId,
    name: String,
    year: i32,
    description: String,
    filter_presets: Vec<FilterPreset>,
}

impl Era {
    /// Build an era. Fails when `filter_presets` is empty, since callers rely on
    /// [`Era::first_preset`] always returning something.
    pub fn new<S: Into<String>>(
        name: S,
        year: i32,
        description: S,
        filter_presets: Vec<FilterPreset>,
    ) -> Result<Self> {
        let name = name.into();
        if filter_presets.is_empty() {
            return Err(CatalogError::EmptyEra { name }.into());
        }

        Ok(Self {
            id: EraId::from_name(&name),
            name,
            year,
            description: description.into(),
            filter_presets,
        })
    }

    pub fn id(&self) -> &EraId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn presets(&self) -> &[FilterPreset] {
        &self.filter_presets
    }

    /// The structural default preset
    pub fn first_preset(&self) -> &FilterPreset {
        // Non-empty by construction
        &self.filter_presets[0]
    }

    pub fn preset_at(&self, index: usize) -> Option<&FilterPreset> {
        self.filter_presets.get(index)
    }

    pub fn preset(&self, id: &PresetId) -> Option<&FilterPreset> {
        self.filter_presets.iter().find(|preset| &preset.id == id)
    }

    /// Look up a preset by id or by case-insensitive display name
    pub fn find_preset(&self, key: &str) -> Option<&FilterPreset> {
        let slug = slugify(key);
        self.filter_presets
            .iter()
            .find(|preset| preset.id.as_str() == slug || preset.name.eq_ignore_ascii_case(key))
    }
}
