//! Shared fixtures for the pipeline integration tests.
//!
//! The reference store and killmail payloads match `src/test_helpers.rs`.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::HashMap;

use zkb_export::download::JsonSource;
use zkb_export::reference::{ReferenceStore, TypeCatalog, UniverseCatalog};
use zkb_export::ui::{Phase, Ui};

pub const PAGE_URL: &str = "https://zkillboard.com/character/95465499/";
pub const LISTING_PAGE_1: &str = "https://zkillboard.com/api/characterID/95465499/page/1/";
pub const LISTING_PAGE_2: &str = "https://zkillboard.com/api/characterID/95465499/page/2/";

pub const CHARACTER_ID: u64 = 95465499;
pub const CORPORATION_ID: u64 = 98000001;
pub const ALLIANCE_ID: u64 = 99000001;

static STORE: Lazy<ReferenceStore> = Lazy::new(|| {
    let types: TypeCatalog = serde_json::from_value(json!({
        "version": "3001234",
        "categories": {"6": {"name": "Ship", "ja": "艦船"}},
        "groups": {"25": {"name": "Frigate", "ja": "フリゲート", "category_id": 6}},
        "types": {"587": {"name": "Rifter", "de": "Rifter", "ja": "リフター", "group_id": 25}}
    }))
    .expect("type catalog fixture");
    let universes: UniverseCatalog = serde_json::from_value(json!({
        "version": "3001234",
        "universes": {"1": {"name": "eve", "ja": "ニューエデン"}},
        "regions": {"10000002": {"name": "The Forge", "ja": "ザ・フォージ", "universe_id": 1}},
        "constellations": {"20000020": {"name": "Kimotoro", "region_id": 10000002}},
        "systems": {"30000142": {"name": "Jita", "ja": "ジタ", "constellation_id": 20000020, "security": 0.9459}}
    }))
    .expect("universe catalog fixture");
    ReferenceStore::new(types, universes)
});

pub fn store() -> ReferenceStore {
    STORE.clone()
}

/// Canned URL → JSON responses; every requested URL is recorded in order
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

    pub fn calls_matching(&self, fragment: &str) -> usize {
        self.calls.borrow().iter().filter(|url| url.contains(fragment)).count()
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

/// Records log lines and can ask for a stop after a number of polls
#[derive(Default)]
pub struct RecordingUi {
    pub lines: Vec<String>,
    pub phases: Vec<Phase>,
    pub stop_after_polls: Option<usize>,
    polls: usize,
}

impl RecordingUi {
    pub fn stopping_after(polls: usize) -> Self {
        Self {
            stop_after_polls: Some(polls),
            ..Self::default()
        }
    }
}

impl Ui for RecordingUi {
    fn set_phase(&mut self, phase: Phase) {
        self.phases.push(phase);
    }
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, message: impl Into<String>) {
        self.lines.push(message.into());
    }
    fn poll_cancel(&mut self) -> bool {
        self.polls += 1;
        self.stop_after_polls.is_some_and(|limit| self.polls > limit)
    }
}

pub fn listing_entry(killmail_id: u64, total_value: f64, points: i64) -> Value {
    json!({
        "killmail_id": killmail_id,
        "zkb": {
            "locationID": 50000001,
            "hash": format!("hash{}", killmail_id),
            "fittedValue": 10.0,
            "totalValue": total_value,
            "points": points,
            "npc": false,
            "solo": false,
            "awox": false
        }
    })
}

pub fn detail_url(killmail_id: u64) -> String {
    format!(
        "https://esi.evetech.net/latest/killmails/{}/hash{}/",
        killmail_id, killmail_id
    )
}

/// ESI payload for a Rifter lost in Jita to two attackers
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

/// Stub source with name responses for the victim's character, corporation and alliance
pub fn source_with_names() -> StubSource {
    StubSource::new()
        .with(
            &format!("https://esi.evetech.net/latest/characters/{}/", CHARACTER_ID),
            json!({"name": "Pilot One", "corporation_id": CORPORATION_ID}),
        )
        .with(
            &format!("https://esi.evetech.net/latest/corporations/{}/", CORPORATION_ID),
            json!({"name": "Rifter Works", "ticker": "RFTR"}),
        )
        .with(
            &format!("https://esi.evetech.net/latest/alliances/{}/", ALLIANCE_ID),
            json!({"name": "Minmatar Fleet", "ticker": "MFLT"}),
        )
}
