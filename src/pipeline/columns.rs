//! The 13 export columns, in output order.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::cache::{EnrichedRecord, EntityKind, ZkbSummary};
use crate::reference::{Language, ReferenceStore};

const ZKB_BASE: &str = "https://zkillboard.com";

/// A single rendered cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Integer(i64),
    Real(f64),
    Text(String),
    Link { url: String, label: String },
}

impl CellValue {
    fn link(kind: &str, id: impl std::fmt::Display, label: impl Into<String>) -> Self {
        CellValue::Link {
            url: format!("{}/{}/{}/", ZKB_BASE, kind, id),
            label: label.into(),
        }
    }

    /// Text form, used for delimited output
    pub fn plain(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Real(f) => format!("{:?}", f),
            CellValue::Text(s) => s.clone(),
            CellValue::Link { label, .. } => label.clone(),
        }
    }
}

/// Names of the victim's participants, resolved before cells are derived
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantNames {
    pub character: Option<String>,
    pub corporation: Option<String>,
    pub alliance: Option<String>,
}

impl ParticipantNames {
    pub fn get(&self, kind: EntityKind) -> Option<&str> {
        match kind {
            EntityKind::Character => self.character.as_deref(),
            EntityKind::Corporation => self.corporation.as_deref(),
            EntityKind::Alliance => self.alliance.as_deref(),
        }
    }

    pub fn set(&mut self, kind: EntityKind, name: String) {
        match kind {
            EntityKind::Character => self.character = Some(name),
            EntityKind::Corporation => self.corporation = Some(name),
            EntityKind::Alliance => self.alliance = Some(name),
        }
    }
}

/// Everything a column needs to derive its cell
pub struct RowInput<'a> {
    pub record: &'a EnrichedRecord,
    pub summary: &'a ZkbSummary,
    pub store: &'a ReferenceStore,
    pub lang: Language,
    pub names: &'a ParticipantNames,
}

pub type CellFn = fn(&RowInput) -> Result<CellValue>;

/// Column definition: header labels plus plain and linked derivations
pub struct Column {
    pub name: &'static str,
    /// Header label per language, indexed by `Language::index`
    pub labels: [&'static str; 6],
    pub plain: CellFn,
    pub linked: Option<CellFn>,
}

impl Column {
    pub const fn new(name: &'static str, labels: [&'static str; 6], plain: CellFn) -> Self {
        Self {
            name,
            labels,
            plain,
            linked: None,
        }
    }

    /// Use `linked` instead of `plain` when the output supports links
    pub const fn linked(self, linked: CellFn) -> Self {
        Self {
            linked: Some(linked),
            ..self
        }
    }

    pub fn label(&self, lang: Language) -> &'static str {
        self.labels[lang.index()]
    }

    pub fn derive(&self, input: &RowInput, with_links: bool) -> Result<CellValue> {
        match (with_links, self.linked) {
            (true, Some(linked)) => linked(input),
            _ => (self.plain)(input),
        }
    }
}

fn killmail_id(input: &RowInput) -> Result<CellValue> {
    Ok(CellValue::Integer(input.record.killmail_id as i64))
}

fn killmail_id_linked(input: &RowInput) -> Result<CellValue> {
    let id = input.record.killmail_id;
    Ok(CellValue::link("kill", id, id.to_string()))
}

/// `2023-01-01T12:34:56Z` → `2023-01-01 12:34`
pub fn format_killmail_time(source: &str) -> Result<String> {
    let time = NaiveDateTime::parse_from_str(source, "%Y-%m-%dT%H:%M:%SZ")
        .with_context(|| format!("Invalid killmail time '{}'", source))?;
    Ok(time.format("%Y-%m-%d %H:%M").to_string())
}

fn killmail_time(input: &RowInput) -> Result<CellValue> {
    Ok(CellValue::Text(format_killmail_time(&input.record.killmail_time)?))
}

fn ship(input: &RowInput) -> Result<CellValue> {
    let name = input.store.type_name(input.record.ship_id, input.lang)?;
    Ok(CellValue::Text(name.to_string()))
}

fn ship_linked(input: &RowInput) -> Result<CellValue> {
    let name = input.store.type_name(input.record.ship_id, input.lang)?;
    Ok(CellValue::link("ship", input.record.ship_id, name))
}

fn security(input: &RowInput) -> Result<CellValue> {
    let security = input.store.system(input.record.system_id)?.security;
    Ok(CellValue::Real((security * 10.0).round() / 10.0))
}

fn region_name<'a>(input: &RowInput<'a>) -> Result<&'a str> {
    Ok(input.store.region(input.record.region_id)?.name.get(input.lang))
}

fn region(input: &RowInput) -> Result<CellValue> {
    Ok(CellValue::Text(region_name(input)?.to_string()))
}

fn region_linked(input: &RowInput) -> Result<CellValue> {
    Ok(CellValue::link("region", input.record.region_id, region_name(input)?))
}

fn system_name<'a>(input: &RowInput<'a>) -> Result<&'a str> {
    Ok(input.store.system(input.record.system_id)?.name.get(input.lang))
}

fn system(input: &RowInput) -> Result<CellValue> {
    Ok(CellValue::Text(system_name(input)?.to_string()))
}

fn system_linked(input: &RowInput) -> Result<CellValue> {
    Ok(CellValue::link("system", input.record.system_id, system_name(input)?))
}

fn damage(input: &RowInput) -> Result<CellValue> {
    Ok(CellValue::Integer(input.record.damage_taken as i64))
}

fn value(input: &RowInput) -> Result<CellValue> {
    Ok(CellValue::Integer(input.summary.total_value.trunc() as i64))
}

fn points(input: &RowInput) -> Result<CellValue> {
    Ok(CellValue::Integer(input.summary.points))
}

fn involved(input: &RowInput) -> Result<CellValue> {
    Ok(CellValue::Integer(i64::from(input.record.involved)))
}

fn participant(input: &RowInput, kind: EntityKind) -> CellValue {
    match input.names.get(kind) {
        Some(name) => CellValue::Text(name.to_string()),
        None => CellValue::Empty,
    }
}

fn participant_linked(input: &RowInput, kind: EntityKind) -> CellValue {
    match (input.record.participant(kind), input.names.get(kind)) {
        (Some(id), Some(name)) => CellValue::link(kind.keyword(), id, name),
        _ => CellValue::Empty,
    }
}

fn character(input: &RowInput) -> Result<CellValue> {
    Ok(participant(input, EntityKind::Character))
}

fn character_linked(input: &RowInput) -> Result<CellValue> {
    Ok(participant_linked(input, EntityKind::Character))
}

fn corporation(input: &RowInput) -> Result<CellValue> {
    Ok(participant(input, EntityKind::Corporation))
}

fn corporation_linked(input: &RowInput) -> Result<CellValue> {
    Ok(participant_linked(input, EntityKind::Corporation))
}

fn alliance(input: &RowInput) -> Result<CellValue> {
    Ok(participant(input, EntityKind::Alliance))
}

fn alliance_linked(input: &RowInput) -> Result<CellValue> {
    Ok(participant_linked(input, EntityKind::Alliance))
}

// Labels in `Language::ALL` order: de, en, fr, ja, ru, zh
pub static COLUMNS: [Column; 13] = [
    Column::new(
        "killmail_id",
        ["Killmail-ID", "Killmail ID", "ID du killmail", "キルメールID", "ID киллмейла", "击毁报告ID"],
        killmail_id,
    )
    .linked(killmail_id_linked),
    Column::new(
        "killmail_time",
        ["Zeit", "Time", "Heure", "日時", "Время", "时间"],
        killmail_time,
    ),
    Column::new(
        "ship",
        ["Schiff", "Ship", "Vaisseau", "艦船", "Корабль", "舰船"],
        ship,
    )
    .linked(ship_linked),
    Column::new(
        "security",
        ["Sicherheit", "Security", "Sécurité", "セキュリティ", "Безопасность", "安全等级"],
        security,
    ),
    Column::new(
        "region",
        ["Region", "Region", "Région", "リージョン", "Регион", "星域"],
        region,
    )
    .linked(region_linked),
    Column::new(
        "system",
        ["System", "System", "Système", "星系", "Система", "星系"],
        system,
    )
    .linked(system_linked),
    Column::new(
        "damage",
        ["Schaden", "Damage", "Dégâts", "ダメージ", "Урон", "伤害"],
        damage,
    ),
    Column::new(
        "value",
        ["Wert", "Value", "Valeur", "損失額", "Стоимость", "价值"],
        value,
    ),
    Column::new(
        "points",
        ["Punkte", "Points", "Points", "ポイント", "Очки", "积分"],
        points,
    ),
    Column::new(
        "involved",
        ["Beteiligte", "Involved", "Impliqués", "関与数", "Участники", "参与者"],
        involved,
    ),
    Column::new(
        "character",
        ["Charakter", "Character", "Personnage", "キャラクター", "Персонаж", "角色"],
        character,
    )
    .linked(character_linked),
    Column::new(
        "corporation",
        ["Corporation", "Corporation", "Corporation", "コーポレーション", "Корпорация", "军团"],
        corporation,
    )
    .linked(corporation_linked),
    Column::new(
        "alliance",
        ["Allianz", "Alliance", "Alliance", "アライアンス", "Альянс", "联盟"],
        alliance,
    )
    .linked(alliance_linked),
];

/// Localized header row
pub fn header(lang: Language) -> Vec<String> {
    COLUMNS.iter().map(|c| c.label(lang).to_string()).collect()
}

/// Derive every cell of one row
pub fn derive_row(input: &RowInput, with_links: bool) -> Result<Vec<CellValue>> {
    COLUMNS
        .iter()
        .map(|column| {
            column
                .derive(input, with_links)
                .with_context(|| format!("Failed to derive column '{}'", column.name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::fixture_store;

    fn record() -> EnrichedRecord {
        EnrichedRecord {
            killmail_id: 1001,
            killmail_time: "2023-01-01T12:34:56Z".to_string(),
            damage_taken: 2950,
            involved: 2,
            ship_id: 587,
            group_id: 25,
            system_id: 30000142,
            constellation_id: 20000020,
            region_id: 10000002,
            character_id: Some(90000001),
            corporation_id: None,
            alliance_id: None,
        }
    }

    fn summary() -> ZkbSummary {
        ZkbSummary {
            hash: "abc".to_string(),
            total_value: 1234567.89,
            points: 7,
        }
    }

    #[test]
    fn test_time_format() {
        assert_eq!(format_killmail_time("2023-01-01T12:34:56Z").unwrap(), "2023-01-01 12:34");
        assert!(format_killmail_time("yesterday").is_err());
    }

    #[test]
    fn test_plain_row() {
        let store = fixture_store();
        let record = record();
        let summary = summary();
        let names = ParticipantNames {
            character: Some("Pilot One".to_string()),
            ..Default::default()
        };
        let input = RowInput {
            record: &record,
            summary: &summary,
            store: &store,
            lang: Language::Ja,
            names: &names,
        };

        let cells = derive_row(&input, false).unwrap();

        let plain: Vec<String> = cells.iter().map(CellValue::plain).collect();
        assert_eq!(
            plain,
            vec![
                "1001", "2023-01-01 12:34", "リフター", "0.9", "ザ・フォージ", "ジタ", "2950",
                "1234567", "7", "2", "Pilot One", "", ""
            ]
        );
        assert_eq!(cells[7], CellValue::Integer(1234567));
    }

    #[test]
    fn test_linked_row() {
        let store = fixture_store();
        let record = record();
        let summary = summary();
        let names = ParticipantNames {
            character: Some("Pilot One".to_string()),
            ..Default::default()
        };
        let input = RowInput {
            record: &record,
            summary: &summary,
            store: &store,
            lang: Language::En,
            names: &names,
        };

        let cells = derive_row(&input, true).unwrap();

        assert_eq!(
            cells[0],
            CellValue::Link {
                url: "https://zkillboard.com/kill/1001/".to_string(),
                label: "1001".to_string()
            }
        );
        assert_eq!(
            cells[2],
            CellValue::Link {
                url: "https://zkillboard.com/ship/587/".to_string(),
                label: "Rifter".to_string()
            }
        );
        assert_eq!(cells[1], CellValue::Text("2023-01-01 12:34".to_string()));
        assert_eq!(
            cells[10],
            CellValue::Link {
                url: "https://zkillboard.com/character/90000001/".to_string(),
                label: "Pilot One".to_string()
            }
        );
        assert_eq!(cells[11], CellValue::Empty);
    }

    #[test]
    fn test_headers_per_language() {
        assert_eq!(header(Language::En)[0], "Killmail ID");
        assert_eq!(header(Language::De)[6], "Schaden");
        assert!(Language::ALL.iter().all(|lang| header(*lang).len() == 13));
    }

    #[test]
    fn test_real_plain_form() {
        assert_eq!(CellValue::Real(1.0).plain(), "1.0");
        assert_eq!(CellValue::Real(-0.3).plain(), "-0.3");
    }
}
