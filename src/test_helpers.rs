// Test-only helpers shared by the unit test modules.
// `tests/common/mod.rs` carries the same fixtures for the integration tests.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::HashMap;

use crate::cache::{ListingItem, ZkbSummary};
use crate::download::JsonSource;
use crate::reference::{ReferenceStore, TypeCatalog, UniverseCatalog};
use crate::ui::Ui;

/// Fixed URL → JSON responses; records every requested URL in order
#[derive(Default)]
pub struct StubSource {
    responses: HashMap<String, Value>,
    calls: RefCell<Vec<String>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, value: Value) -> Self {
        self.responses.insert(url.to_string(), value);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl JsonSource for StubSource {
    fn fetch_json(&self, url: &str, ui: &mut impl Ui) -> Result<Value> {
        ui.log(format!("Download: {}", url));
        self.calls.borrow_mut().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("no stub response for {}", url))
    }
}

/// Captures every log line
#[derive(Default)]
pub struct RecordingUi {
    pub lines: Vec<String>,
}

impl Ui for RecordingUi {
    fn set_phase(&mut self, _phase: crate::ui::Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, message: impl Into<String>) {
        self.lines.push(message.into());
    }
}

pub fn fixture_store() -> ReferenceStore {
    let types: TypeCatalog = serde_json::from_value(json!({
        "version": "3001234",
        "categories": {"6": {"name": "Ship", "ja": "艦船"}},
        "groups": {"25": {"name": "Frigate", "ja": "フリゲート", "category_id": 6}},
        "types": {"587": {"name": "Rifter", "de": "Rifter", "ja": "リフター", "group_id": 25}}
    }))
    .expect("fixture type catalog");
    let universes: UniverseCatalog = serde_json::from_value(json!({
        "version": "3001234",
        "universes": {"1": {"name": "eve", "ja": "ニューエデン"}},
        "regions": {"10000002": {"name": "The Forge", "ja": "ザ・フォージ", "universe_id": 1}},
        "constellations": {"20000020": {"name": "Kimotoro", "region_id": 10000002}},
        "systems": {"30000142": {"name": "Jita", "ja": "ジタ", "constellation_id": 20000020, "security": 0.9459}}
    }))
    .expect("fixture universe catalog");
    ReferenceStore::new(types, universes)
}

pub fn listing_item(killmail_id: u64, total_value: f64, points: i64) -> ListingItem {
    ListingItem {
        killmail_id,
        zkb: ZkbSummary {
            hash: format!("hash{}", killmail_id),
            total_value,
            points,
        },
    }
}

/// ESI killmail payload for a Rifter lost in Jita with two attackers
pub fn killmail_detail(
    killmail_id: u64,
    character_id: Option<u64>,
    corporation_id: Option<u64>,
    alliance_id: Option<u64>,
) -> Value {
    let mut victim = json!({
        "ship_type_id": 587,
        "damage_taken": 2950,
        "items": [],
    });
    if let Some(id) = character_id {
        victim["character_id"] = json!(id);
    }
    if let Some(id) = corporation_id {
        victim["corporation_id"] = json!(id);
    }
    if let Some(id) = alliance_id {
        victim["alliance_id"] = json!(id);
    }

    json!({
        "killmail_id": killmail_id,
        "killmail_time": "2023-01-01T12:34:56Z",
        "solar_system_id": 30000142,
        "victim": victim,
        "attackers": [
            {"character_id": 91000001, "final_blow": true, "damage_done": 2000},
            {"character_id": 91000002, "final_blow": false, "damage_done": 950}
        ]
    })
}
