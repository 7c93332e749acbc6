//! # Era Catalog
//!
//! Immutable style descriptors: each [`Era`] groups an ordered, non-empty list
//! of [`FilterPreset`]s. The catalog is pure data and has no behavior beyond
//! lookup.
//!
//! ## Built-in Eras
//!
//! - **1999**: Late 90s film / VHS look
//! - **2003**: Cheap digital point-and-shoot
//! - **2010**: Early Instagram / DSLR blog

pub mod registry;
pub mod types;

pub use registry::Catalog;
pub use types::{slugify, Era, EraId, FilterPreset, PresetId};
