//! Generator cycling through values sampled from a text file.
//!
//! The file holds one value per line; blank lines are ignored. Files are
//! read once per process and shared through a cache that tests can clear.

use super::{expect_type, next_listed, Cycle, ValidValueGenerator, ValueBound};
use crate::error::GeneratorError;
use bo_core::{PropDef, PropType, PropValue};
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::debug;

type SampleCache = Mutex<HashMap<PathBuf, Arc<Vec<PropValue>>>>;

fn sample_cache() -> &'static SampleCache {
    static CACHE: OnceLock<SampleCache> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Forget every cached sample file.
pub fn clear_sample_cache() {
    if let Ok(mut cache) = sample_cache().lock() {
        cache.clear();
    }
}

/// Read a sample file through the cache.
pub fn load_samples(path: &Path) -> Result<Arc<Vec<PropValue>>, GeneratorError> {
    if let Ok(cache) = sample_cache().lock() {
        if let Some(samples) = cache.get(path) {
            return Ok(Arc::clone(samples));
        }
    }

    if !path.exists() {
        return Err(GeneratorError::SampleFileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| GeneratorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let samples: Vec<PropValue> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PropValue::from)
        .collect();
    if samples.is_empty() {
        return Err(GeneratorError::EmptySampleFile(path.to_path_buf()));
    }
    debug!("Loaded {} samples from {}", samples.len(), path.display());

    let samples = Arc::new(samples);
    if let Ok(mut cache) = sample_cache().lock() {
        cache.insert(path.to_path_buf(), Arc::clone(&samples));
    }
    Ok(samples)
}

/// Cycles through the lines of a sample file.
#[derive(Debug, Clone)]
pub struct TextFileGenerator {
    prop_def: PropDef,
    samples: Arc<Vec<PropValue>>,
    cycle: Cycle,
}

impl TextFileGenerator {
    pub fn new(prop_def: &PropDef, path: impl AsRef<Path>) -> Result<Self, GeneratorError> {
        expect_type("text_file", prop_def, prop_def.prop_type == PropType::String)?;
        Ok(Self {
            prop_def: prop_def.clone(),
            samples: load_samples(path.as_ref())?,
            cycle: Cycle::default(),
        })
    }
}

impl ValidValueGenerator for TextFileGenerator {
    fn generate(
        &mut self,
        bound: ValueBound<'_>,
        _rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        next_listed(&self.prop_def, &self.samples, &mut self.cycle, bound)
    }
}
