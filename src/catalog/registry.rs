use crate::{
    catalog::{slugify, Era, EraId, FilterPreset, PresetId},
    error::{CatalogError, Result},
};

/// Read-only, ordered collection of eras
///
/// The catalog is built once and never mutated. Photos and sessions refer to
/// eras and presets by id or by cloning the small preset values out of it.
#[derive(Debug, Clone)]
pub struct Catalog {
    eras: Vec<Era>,
}

impl Catalog {
    /// Create a catalog from an ordered, non-empty list of eras with unique ids
    pub fn from_eras(eras: Vec<Era>) -> Result<Self> {
        if eras.is_empty() {
            return Err(CatalogError::EmptyCatalog.into());
        }

        for (index, era) in eras.iter().enumerate() {
            if eras[..index].iter().any(|other| other.id() == era.id()) {
                return Err(CatalogError::DuplicateEra { id: era.id().to_string() }.into());
            }
        }

        Ok(Self { eras })
    }

    /// The eras shipped with the application
    pub fn builtin() -> Result<Self> {
        let presets_1999 = vec![
            FilterPreset::new("VHS Night", 0.8, 0.5, 0.05, 0.9, 0.9, -0.1),
            FilterPreset::new("Disposable Daylight", 0.6, 0.4, 0.0, 1.0, 1.05, 0.1),
        ];
        let presets_2003 = vec![
            FilterPreset::new("Mall 2003", 0.3, 0.2, -0.05, 0.95, 0.95, 0.15),
            FilterPreset::new("Cybercafé", 0.2, 0.15, 0.08, 0.9, 1.1, 0.25),
        ];
        let presets_2010 = vec![
            FilterPreset::new("Early Insta", 0.4, 0.5, 0.12, 1.1, 1.2, -0.05),
            FilterPreset::new("Vintage Blogger", 0.35, 0.55, 0.15, 1.05, 1.05, -0.1),
        ];

        Self::from_eras(vec![
            Era::new("1999", 1999, "Late 90s film / VHS look", presets_1999)?,
            Era::new("2003", 2003, "Cheap digital point-and-shoot", presets_2003)?,
            Era::new("2010", 2010, "Early Instagram / DSLR blog", presets_2010)?,
        ])
    }

    pub fn eras(&self) -> &[Era] {
        &self.eras
    }

    /// The first era, used as the initial selection
    pub fn first(&self) -> &Era {
        &self.eras[0]
    }

    pub fn era(&self, id: &EraId) -> Option<&Era> {
        self.eras.iter().find(|era| era.id() == id)
    }

    /// Look up an era by id or case-insensitive display name
    pub fn era_by_name(&self, key: &str) -> Option<&Era> {
        let slug = slugify(key);
        self.eras
            .iter()
            .find(|era| era.id().as_str() == slug || era.name().eq_ignore_ascii_case(key))
    }

    pub fn preset(&self, era: &EraId, preset: &PresetId) -> Option<&FilterPreset> {
        self.era(era).and_then(|era| era.preset(preset))
    }

    /// Resolve an era key and an optional preset key, defaulting to the era's
    /// first preset when no preset is named
    pub fn resolve(&self, era_key: &str, preset_key: Option<&str>) -> Result<(&Era, &FilterPreset)> {
        let era = self
            .era_by_name(era_key)
            .ok_or_else(|| CatalogError::EraNotFound { id: era_key.to_string() })?;

        let preset = match preset_key {
            Some(key) => era.find_preset(key).ok_or_else(|| CatalogError::PresetNotFound {
                era: era.id().to_string(),
                id: key.to_string(),
            })?,
            None => era.first_preset(),
        };

        Ok((era, preset))
    }

    /// Validate every preset in the catalog against its documented ranges
    pub fn validate(&self) -> Result<()> {
        for era in &self.eras {
            for preset in era.presets() {
                preset.validate()?;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.eras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eras.is_empty()
    }
}
