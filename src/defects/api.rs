//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for defect operations, whatever transport sits in front of it.
//!
//! It owns the loaded [`DefectCollection`] together with the settings the
//! commands need (field vocabularies, image route prefix), so request
//! handlers receive one injected object instead of reaching for global
//! state.
//!
//! ## Generic Over DataStore
//!
//! - Production: `DefectsApi<FileStore>`
//! - Testing: `DefectsApi<InMemoryStore>`

use crate::collection::DefectCollection;
use crate::commands;
use crate::config::{DefectsConfig, ValidationConfig};
use crate::error::{DefectError, Result};
use crate::model::{Defect, DefectPatch, NewDefect};
use crate::store::DataStore;

pub struct DefectsApi<S: DataStore> {
    collection: DefectCollection<S>,
    validation: ValidationConfig,
    image_route: String,
}

impl<S: DataStore> DefectsApi<S> {
    pub fn new(
        collection: DefectCollection<S>,
        validation: ValidationConfig,
        image_route: impl Into<String>,
    ) -> Self {
        Self {
            collection,
            validation,
            image_route: image_route.into(),
        }
    }

    /// Load the collection from `store` using the policies in `config`.
    pub fn open(store: S, config: &DefectsConfig) -> Result<Self> {
        let collection = DefectCollection::load(store, config.records.on_corrupt)?;
        Ok(Self::new(
            collection,
            config.validation.clone(),
            config.images.route_prefix.clone(),
        ))
    }

    pub fn create_defect(&mut self, input: NewDefect) -> Result<Defect> {
        commands::create::run(&mut self.collection, &self.validation, input)
    }

    pub fn list_defects(&self) -> Vec<Defect> {
        commands::list::run(&self.collection, &self.image_route)
    }

    pub fn get_defect(&self, id: &str) -> Result<Defect> {
        commands::get::run(&self.collection, &self.image_route, id)
    }

    pub fn update_defect(&mut self, id: &str, patch: DefectPatch) -> Result<Defect> {
        commands::update::run(
            &mut self.collection,
            &self.validation,
            &self.image_route,
            id,
            patch,
        )
    }

    /// Raw bytes of a stored image.
    pub fn image(&self, filename: &str) -> Result<Vec<u8>> {
        self.collection
            .read_image(filename)?
            .ok_or_else(|| DefectError::ImageNotFound(filename.to_string()))
    }

    pub fn defect_count(&self) -> usize {
        self.collection.len()
    }

    pub fn image_route(&self) -> &str {
        &self.image_route
    }
}
