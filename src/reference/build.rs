//! Regenerates the reference catalogs from the SDE JSONL export.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::catalog::{
    read_version, write_catalog, ConstellationEntry, GroupEntry, RegionEntry, SystemEntry,
    TypeCatalog, TypeEntry, UniverseCatalog,
};
use super::localized::LocalizedName;
use crate::download::{extract_zip, DataDir, HttpClient};
use crate::ui::{Phase, Ui};

/// Categories whose items can appear on a killmail
pub const INCLUDED_CATEGORY_IDS: &[u32] = &[
    4,  // Material
    6,  // Ship
    7,  // Module
    8,  // Charge
    9,  // Blueprint
    16, // Skill
    18, // Drone
    20, // Implant
    22, // Deployable
    23, // Starbase
    25, // Asteroid
    30, // Apparel
    32, // Subsystem
    42, // Planetary Resources
    43, // Planetary Commodities
    46, // Orbitals
    65, // Structure
    66, // Structure Module
    87, // Fighter
    91, // Super Kerr-Induced Nanocoatings
];

pub const UNIVERSE_EVE: u32 = 1;
pub const UNIVERSE_WORMHOLE: u32 = 2;
pub const UNIVERSE_ABYSSAL: u32 = 3;
pub const UNIVERSE_PENALTY: u32 = 4;

#[derive(Deserialize)]
struct SdeCategory {
    #[serde(rename = "_key")]
    key: u32,
    #[serde(default)]
    name: HashMap<String, String>,
}

#[derive(Deserialize)]
struct SdeGroup {
    #[serde(rename = "_key")]
    key: u32,
    #[serde(default)]
    name: HashMap<String, String>,
    #[serde(rename = "categoryID")]
    category_id: u32,
}

#[derive(Deserialize)]
struct SdeType {
    #[serde(rename = "_key")]
    key: u32,
    #[serde(default)]
    name: HashMap<String, String>,
    #[serde(rename = "groupID")]
    group_id: u32,
}

#[derive(Deserialize)]
struct SdeRegion {
    #[serde(rename = "_key")]
    key: u32,
    #[serde(default)]
    name: HashMap<String, String>,
}

#[derive(Deserialize)]
struct SdeConstellation {
    #[serde(rename = "_key")]
    key: u32,
    #[serde(default)]
    name: HashMap<String, String>,
    #[serde(rename = "regionID")]
    region_id: u32,
}

#[derive(Deserialize)]
struct SdeSolarSystem {
    #[serde(rename = "_key")]
    key: u32,
    #[serde(default)]
    name: HashMap<String, String>,
    #[serde(rename = "constellationID")]
    constellation_id: u32,
    #[serde(rename = "securityStatus", default)]
    security_status: f64,
}

/// Read every non-blank line of a JSONL file as `T`
fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("Failed to open: {:?}", path))?;
    let reader = BufReader::new(file);
    let mut rows = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }

        let row = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse record on line {} of {:?}", number + 1, path))?;
        rows.push(row);
    }

    Ok(rows)
}

/// The fixed top-level universes; only the Japanese labels differ
pub fn default_universes() -> BTreeMap<u32, LocalizedName> {
    let localized = |name: &str, ja: &str| {
        let mut names = HashMap::new();
        names.insert("en".to_string(), name.to_string());
        names.insert("ja".to_string(), ja.to_string());
        LocalizedName::from_map(&names).unwrap_or_else(|| LocalizedName::uniform(name))
    };

    BTreeMap::from([
        (UNIVERSE_EVE, localized("eve", "ニューエデン")),
        (UNIVERSE_WORMHOLE, localized("wormhole", "ワームホール")),
        (UNIVERSE_ABYSSAL, localized("abyssal", "アビサル")),
        (UNIVERSE_PENALTY, localized("penalty", "ペナルティ")),
    ])
}

/// Universe a region belongs to, derived from its ID range
pub fn universe_for_region(region_id: u32) -> u32 {
    match region_id / 1_000_000 {
        11 => UNIVERSE_WORMHOLE,
        12 => UNIVERSE_ABYSSAL,
        14 => UNIVERSE_PENALTY,
        _ => UNIVERSE_EVE,
    }
}

pub fn build_type_catalog(input_dir: &Path, version: &str) -> Result<TypeCatalog> {
    let mut catalog = TypeCatalog {
        version: version.to_string(),
        ..Default::default()
    };

    for category in read_jsonl::<SdeCategory>(&input_dir.join("categories.jsonl"))? {
        if !INCLUDED_CATEGORY_IDS.contains(&category.key) {
            continue;
        }
        if let Some(name) = LocalizedName::from_map(&category.name) {
            catalog.categories.insert(category.key, name);
        }
    }

    for group in read_jsonl::<SdeGroup>(&input_dir.join("groups.jsonl"))? {
        if !INCLUDED_CATEGORY_IDS.contains(&group.category_id) {
            continue;
        }
        if let Some(name) = LocalizedName::from_map(&group.name) {
            catalog.groups.insert(
                group.key,
                GroupEntry {
                    name,
                    category_id: group.category_id,
                },
            );
        }
    }

    for ty in read_jsonl::<SdeType>(&input_dir.join("types.jsonl"))? {
        if !catalog.groups.contains_key(&ty.group_id) {
            continue;
        }
        if let Some(name) = LocalizedName::from_map(&ty.name) {
            catalog.types.insert(
                ty.key,
                TypeEntry {
                    name,
                    group_id: ty.group_id,
                },
            );
        }
    }

    Ok(catalog)
}

pub fn build_universe_catalog(input_dir: &Path, version: &str) -> Result<UniverseCatalog> {
    let mut catalog = UniverseCatalog {
        version: version.to_string(),
        universes: default_universes(),
        ..Default::default()
    };

    for region in read_jsonl::<SdeRegion>(&input_dir.join("mapRegions.jsonl"))? {
        let name = LocalizedName::from_map(&region.name)
            .unwrap_or_else(|| LocalizedName::uniform(region.key.to_string()));
        catalog.regions.insert(
            region.key,
            RegionEntry {
                name,
                universe_id: universe_for_region(region.key),
            },
        );
    }

    for constellation in read_jsonl::<SdeConstellation>(&input_dir.join("mapConstellations.jsonl"))? {
        let name = LocalizedName::from_map(&constellation.name)
            .unwrap_or_else(|| LocalizedName::uniform(constellation.key.to_string()));
        catalog.constellations.insert(
            constellation.key,
            ConstellationEntry {
                name,
                region_id: constellation.region_id,
            },
        );
    }

    for system in read_jsonl::<SdeSolarSystem>(&input_dir.join("mapSolarSystems.jsonl"))? {
        let name = LocalizedName::from_map(&system.name)
            .unwrap_or_else(|| LocalizedName::uniform(system.key.to_string()));
        catalog.systems.insert(
            system.key,
            SystemEntry {
                name,
                constellation_id: system.constellation_id,
                security: system.security_status,
            },
        );
    }

    Ok(catalog)
}

/// Build both catalogs from an extracted SDE directory and write them out
pub fn write_catalogs(input_dir: &Path, data: &DataDir, version: &str, ui: &mut impl Ui) -> Result<()> {
    ui.log(format!("Create: {:?}", data.types_path()));
    let types = build_type_catalog(input_dir, version)?;
    write_catalog(&data.types_path(), &types)?;

    ui.log(format!("Create: {:?}", data.universes_path()));
    let universes = build_universe_catalog(input_dir, version)?;
    write_catalog(&data.universes_path(), &universes)?;

    ui.log(format!(
        "Catalogs at build {}: {} types, {} systems",
        version,
        types.types.len(),
        universes.systems.len()
    ));
    Ok(())
}

/// Refresh the catalogs when a newer SDE build is published.
///
/// Returns `true` when the catalogs were regenerated.
pub fn update_catalogs(
    data: &DataDir,
    client: &HttpClient,
    ui: &mut impl Ui,
    force: bool,
) -> Result<bool> {
    ui.set_phase(Phase::UpdatingSde);

    let current = read_version(&data.types_path())?;
    let info = client.fetch_latest_info(ui)?;
    let version = info.build_number.to_string();

    if !force && current.as_deref() == Some(version.as_str()) {
        ui.log("SDE is the latest.");
        return Ok(false);
    }

    ui.log(format!("Update SDE to build {} ({})", version, info.release_date));
    ui.set_info(format!("SDE build {}", version));

    let build_dir = data.build_dir(info.build_number);
    if data.is_cached(info.build_number) {
        ui.log(format!("Cached: {:?}", build_dir));
    } else {
        fs::create_dir_all(data.sde_dir()).context("Failed to create SDE directory")?;
        let zip_path = data.zip_path(info.build_number);
        client.download_zip(&zip_path, ui)?;
        extract_zip(&zip_path, &build_dir, ui)?;
        fs::remove_file(&zip_path).ok();
    }
    data.cleanup_old_builds(info.build_number)?;

    write_catalogs(&build_dir, data, &version, ui)?;
    Ok(true)
}
