//! Persisted lookup caches: enriched killmails and participant names.
//!
//! Both live in one JSON file with four top-level maps (`killmails`,
//! `characters`, `corporations`, `alliances`), each keyed by decimal ID.
//! The whole file is rewritten at every checkpoint; concurrent runs sharing
//! it are not supported.

pub mod names;
pub mod records;

pub use names::*;
pub use records::*;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Deserialize)]
struct CacheFile {
    #[serde(default)]
    killmails: BTreeMap<u64, EnrichedRecord>,
    #[serde(default)]
    characters: BTreeMap<u64, String>,
    #[serde(default)]
    corporations: BTreeMap<u64, String>,
    #[serde(default)]
    alliances: BTreeMap<u64, String>,
}

#[derive(Serialize)]
struct CacheFileRef<'a> {
    killmails: &'a BTreeMap<u64, EnrichedRecord>,
    characters: &'a BTreeMap<u64, String>,
    corporations: &'a BTreeMap<u64, String>,
    alliances: &'a BTreeMap<u64, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Caches {
    pub records: RecordCache,
    pub names: NameCache,
}

impl Caches {
    /// Load the cache file; a missing file yields empty caches
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let cached: CacheFile = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse cache file {:?}", path))?;

        Ok(Self {
            records: RecordCache {
                records: cached.killmails,
            },
            names: NameCache {
                characters: cached.characters,
                corporations: cached.corporations,
                alliances: cached.alliances,
            },
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        let cached = CacheFileRef {
            killmails: &self.records.records,
            characters: &self.names.characters,
            corporations: &self.names.corporations,
            alliances: &self.names.alliances,
        };
        serde_json::to_writer(BufWriter::new(file), &cached)
            .with_context(|| format!("Failed to write cache file {:?}", path))
    }

    /// Delete the cache file if present
    pub fn clear(path: &Path) -> Result<()> {
        if path.is_file() {
            fs::remove_file(path).with_context(|| format!("Failed to remove {:?}", path))?;
        }
        Ok(())
    }
}
