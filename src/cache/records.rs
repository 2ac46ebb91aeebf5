use anyhow::{Context, Result};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::download::JsonSource;
use crate::reference::ReferenceStore;
use crate::ui::Ui;

use super::names::EntityKind;

const ESI_KILLMAIL_URL: &str = "https://esi.evetech.net/latest/killmails";

/// Summary block zKillboard attaches to each listed killmail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZkbSummary {
    pub hash: String,
    #[serde(rename = "totalValue")]
    pub total_value: f64,
    pub points: i64,
}

/// One entry of a zKillboard listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingItem {
    pub killmail_id: u64,
    pub zkb: ZkbSummary,
}

impl ListingItem {
    pub fn detail_url(&self) -> String {
        format!("{}/{}/{}/", ESI_KILLMAIL_URL, self.killmail_id, self.zkb.hash)
    }
}

#[derive(Debug, Deserialize)]
struct Victim {
    ship_type_id: u32,
    damage_taken: u64,
    #[serde(default)]
    character_id: Option<u64>,
    #[serde(default)]
    corporation_id: Option<u64>,
    #[serde(default)]
    alliance_id: Option<u64>,
}

/// The parts of an ESI killmail the exporter uses
#[derive(Debug, Deserialize)]
struct KillmailDetail {
    killmail_id: u64,
    killmail_time: String,
    solar_system_id: u32,
    victim: Victim,
    attackers: Vec<IgnoredAny>,
}

/// A killmail with its reference IDs fully resolved.
///
/// Display values (names, formatted time) are derived on read, so one cached
/// record serves every display language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub killmail_id: u64,
    pub killmail_time: String,
    pub damage_taken: u64,
    pub involved: u32,
    pub ship_id: u32,
    pub group_id: u32,
    pub system_id: u32,
    pub constellation_id: u32,
    pub region_id: u32,
    pub character_id: Option<u64>,
    pub corporation_id: Option<u64>,
    pub alliance_id: Option<u64>,
}

impl EnrichedRecord {
    fn enrich(detail: KillmailDetail, store: &ReferenceStore) -> Result<Self> {
        let group_id = store.ship_type(detail.victim.ship_type_id)?.group_id;
        let location = store.locate(detail.solar_system_id)?;

        Ok(Self {
            killmail_id: detail.killmail_id,
            killmail_time: detail.killmail_time,
            damage_taken: detail.victim.damage_taken,
            involved: detail.attackers.len() as u32,
            ship_id: detail.victim.ship_type_id,
            group_id,
            system_id: location.system_id,
            constellation_id: location.constellation_id,
            region_id: location.region_id,
            character_id: detail.victim.character_id,
            corporation_id: detail.victim.corporation_id,
            alliance_id: detail.victim.alliance_id,
        })
    }

    /// Victim participant of the given kind, if the killmail has one
    pub fn participant(&self, kind: EntityKind) -> Option<u64> {
        match kind {
            EntityKind::Character => self.character_id,
            EntityKind::Corporation => self.corporation_id,
            EntityKind::Alliance => self.alliance_id,
        }
    }
}

/// Enriched killmails keyed by killmail ID
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordCache {
    pub(crate) records: BTreeMap<u64, EnrichedRecord>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, killmail_id: u64) -> Option<&EnrichedRecord> {
        self.records.get(&killmail_id)
    }

    pub fn contains(&self, killmail_id: u64) -> bool {
        self.records.contains_key(&killmail_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Return the cached record, or fetch, enrich and cache it.
    ///
    /// A hit is logged as `Cached:` and returned as stored; the listing hash
    /// is not re-checked.
    pub fn get_or_fetch(
        &mut self,
        item: &ListingItem,
        store: &ReferenceStore,
        source: &impl JsonSource,
        ui: &mut impl Ui,
    ) -> Result<EnrichedRecord> {
        let url = item.detail_url();

        if let Some(record) = self.records.get(&item.killmail_id) {
            ui.log(format!("Cached: {}", url));
            return Ok(record.clone());
        }

        let value = source.fetch_json(&url, ui)?;
        let detail: KillmailDetail = serde_json::from_value(value)
            .with_context(|| format!("Malformed killmail payload from {}", url))?;
        let record = EnrichedRecord::enrich(detail, store)
            .with_context(|| format!("Failed to enrich killmail {}", item.killmail_id))?;

        self.records.insert(item.killmail_id, record.clone());
        Ok(record)
    }
}
