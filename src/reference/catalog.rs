//! Read-only reference catalogs: the type catalog (`types.json`) and the
//! geography catalog (`universes.json`).

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::localized::{Language, LocalizedName};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    #[serde(flatten)]
    pub name: LocalizedName,
    pub category_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeEntry {
    #[serde(flatten)]
    pub name: LocalizedName,
    pub group_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    #[serde(flatten)]
    pub name: LocalizedName,
    pub universe_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstellationEntry {
    #[serde(flatten)]
    pub name: LocalizedName,
    pub region_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemEntry {
    #[serde(flatten)]
    pub name: LocalizedName,
    pub constellation_id: u32,
    pub security: f64,
}

/// Item types with their group and category hierarchy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeCatalog {
    pub version: String,
    #[serde(default)]
    pub categories: BTreeMap<u32, LocalizedName>,
    #[serde(default)]
    pub groups: BTreeMap<u32, GroupEntry>,
    #[serde(default)]
    pub types: BTreeMap<u32, TypeEntry>,
}

/// Universes, regions, constellations and solar systems
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniverseCatalog {
    pub version: String,
    #[serde(default)]
    pub universes: BTreeMap<u32, LocalizedName>,
    #[serde(default)]
    pub regions: BTreeMap<u32, RegionEntry>,
    #[serde(default)]
    pub constellations: BTreeMap<u32, ConstellationEntry>,
    #[serde(default)]
    pub systems: BTreeMap<u32, SystemEntry>,
}

/// The system → constellation → region chain of a solar system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub system_id: u32,
    pub constellation_id: u32,
    pub region_id: u32,
}

/// Read a catalog JSON document from disk
pub fn read_catalog<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| {
        format!(
            "Reference catalog not found at {:?}; run `zkb-export update-sde` first",
            path
        )
    })?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse reference catalog {:?}", path))
}

/// Write a catalog JSON document to disk (pretty-printed)
pub fn write_catalog<T: Serialize>(path: &Path, catalog: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), catalog)
        .with_context(|| format!("Failed to write {:?}", path))
}

/// Read only the `version` field of a catalog, if the file exists
pub fn read_version(path: &Path) -> Result<Option<String>> {
    #[derive(Deserialize)]
    struct Versioned {
        version: String,
    }

    if !path.exists() {
        return Ok(None);
    }
    let versioned: Versioned = read_catalog(path)?;
    Ok(Some(versioned.version))
}

/// Both catalogs, loaded once per run and never mutated afterwards
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    pub types: TypeCatalog,
    pub universes: UniverseCatalog,
}

impl ReferenceStore {
    pub fn new(types: TypeCatalog, universes: UniverseCatalog) -> Self {
        Self { types, universes }
    }

    pub fn load(types_path: &Path, universes_path: &Path) -> Result<Self> {
        Ok(Self {
            types: read_catalog(types_path)?,
            universes: read_catalog(universes_path)?,
        })
    }

    pub fn ship_type(&self, type_id: u32) -> Result<&TypeEntry> {
        self.types
            .types
            .get(&type_id)
            .ok_or_else(|| anyhow!("Unknown type ID {} in type catalog", type_id))
    }

    pub fn system(&self, system_id: u32) -> Result<&SystemEntry> {
        self.universes
            .systems
            .get(&system_id)
            .ok_or_else(|| anyhow!("Unknown solar system ID {} in universe catalog", system_id))
    }

    pub fn region(&self, region_id: u32) -> Result<&RegionEntry> {
        self.universes
            .regions
            .get(&region_id)
            .ok_or_else(|| anyhow!("Unknown region ID {} in universe catalog", region_id))
    }

    pub fn type_name(&self, type_id: u32, lang: Language) -> Result<&str> {
        Ok(self.ship_type(type_id)?.name.get(lang))
    }

    /// Resolve a solar system to its full location chain
    pub fn locate(&self, system_id: u32) -> Result<Location> {
        let constellation_id = self.system(system_id)?.constellation_id;
        let region_id = self
            .universes
            .constellations
            .get(&constellation_id)
            .ok_or_else(|| {
                anyhow!(
                    "Unknown constellation ID {} in universe catalog",
                    constellation_id
                )
            })?
            .region_id;

        Ok(Location {
            system_id,
            constellation_id,
            region_id,
        })
    }

    /// Report foreign keys that do not resolve within the loaded snapshot
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for (id, group) in &self.types.groups {
            if !self.types.categories.contains_key(&group.category_id) {
                problems.push(format!("group {} references missing category {}", id, group.category_id));
            }
        }
        for (id, ty) in &self.types.types {
            if !self.types.groups.contains_key(&ty.group_id) {
                problems.push(format!("type {} references missing group {}", id, ty.group_id));
            }
        }
        for (id, region) in &self.universes.regions {
            if !self.universes.universes.contains_key(&region.universe_id) {
                problems.push(format!("region {} references missing universe {}", id, region.universe_id));
            }
        }
        for (id, constellation) in &self.universes.constellations {
            if !self.universes.regions.contains_key(&constellation.region_id) {
                problems.push(format!(
                    "constellation {} references missing region {}",
                    id, constellation.region_id
                ));
            }
        }
        for (id, system) in &self.universes.systems {
            if !self.universes.constellations.contains_key(&system.constellation_id) {
                problems.push(format!(
                    "system {} references missing constellation {}",
                    id, system.constellation_id
                ));
            }
        }

        problems
    }
}
