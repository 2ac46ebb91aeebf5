use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::download::JsonSource;
use crate::ui::Ui;

const ESI_BASE: &str = "https://esi.evetech.net/latest";

/// Participant roles whose names are looked up through ESI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Character,
    Corporation,
    Alliance,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Character,
        EntityKind::Corporation,
        EntityKind::Alliance,
    ];

    /// Singular path keyword, as used by zKillboard URLs
    pub fn keyword(&self) -> &'static str {
        match self {
            EntityKind::Character => "character",
            EntityKind::Corporation => "corporation",
            EntityKind::Alliance => "alliance",
        }
    }

    /// Plural collection name, as used by ESI and the cache file
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Character => "characters",
            EntityKind::Corporation => "corporations",
            EntityKind::Alliance => "alliances",
        }
    }

    pub fn esi_url(&self, id: u64) -> String {
        format!("{}/{}/{}/", ESI_BASE, self.collection(), id)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Deserialize)]
struct NameResponse {
    name: String,
}

/// Display names keyed by entity kind and ID.
///
/// Entries are never invalidated: a name seen once is reused for good.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameCache {
    pub(crate) characters: BTreeMap<u64, String>,
    pub(crate) corporations: BTreeMap<u64, String>,
    pub(crate) alliances: BTreeMap<u64, String>,
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, kind: EntityKind) -> &BTreeMap<u64, String> {
        match kind {
            EntityKind::Character => &self.characters,
            EntityKind::Corporation => &self.corporations,
            EntityKind::Alliance => &self.alliances,
        }
    }

    fn map_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<u64, String> {
        match kind {
            EntityKind::Character => &mut self.characters,
            EntityKind::Corporation => &mut self.corporations,
            EntityKind::Alliance => &mut self.alliances,
        }
    }

    pub fn get(&self, kind: EntityKind, id: u64) -> Option<&str> {
        self.map(kind).get(&id).map(String::as_str)
    }

    pub fn insert(&mut self, kind: EntityKind, id: u64, name: impl Into<String>) {
        self.map_mut(kind).insert(id, name.into());
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.map(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|kind| self.map(*kind).is_empty())
    }

    /// Return the display name, fetching it from ESI on first use
    pub fn resolve(
        &mut self,
        kind: EntityKind,
        id: u64,
        source: &impl JsonSource,
        ui: &mut impl Ui,
    ) -> Result<String> {
        let url = kind.esi_url(id);

        if let Some(name) = self.get(kind, id) {
            let name = name.to_string();
            ui.log(format!("Cached: {}", url));
            return Ok(name);
        }

        let value = source.fetch_json(&url, ui)?;
        let response: NameResponse = serde_json::from_value(value)
            .with_context(|| format!("Missing name in {} response for {}", kind, id))?;

        self.insert(kind, id, response.name.clone());
        Ok(response.name)
    }
}
