use anyhow::{bail, Context, Result};
use reqwest::Url;

use crate::cache::{EnrichedRecord, EntityKind};

/// zKillboard page keyword → API filter name
const FETCH_MODIFIERS: &[(&str, &str)] = &[
    ("character", "characterID"),
    ("corporation", "corporationID"),
    ("alliance", "allianceID"),
    ("ship", "shipTypeID"),
    ("group", "groupID"),
    ("system", "solarSystemID"),
    ("constellation", "constellationID"),
    ("region", "regionID"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusKind {
    Participant(EntityKind),
    Ship,
    Group,
}

impl FocusKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "character" => Some(FocusKind::Participant(EntityKind::Character)),
            "corporation" => Some(FocusKind::Participant(EntityKind::Corporation)),
            "alliance" => Some(FocusKind::Participant(EntityKind::Alliance)),
            "ship" => Some(FocusKind::Ship),
            "group" => Some(FocusKind::Group),
            _ => None,
        }
    }
}

/// The entity a target page is about; its killmails get highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    pub kind: FocusKind,
    pub id: u64,
}

impl Focus {
    pub fn matches(&self, record: &EnrichedRecord) -> bool {
        match self.kind {
            FocusKind::Participant(kind) => record.participant(kind) == Some(self.id),
            FocusKind::Ship => u64::from(record.ship_id) == self.id,
            FocusKind::Group => u64::from(record.group_id) == self.id,
        }
    }
}

/// Listing endpoint derived from a zKillboard page URL
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub listing_url: String,
    pub focus: Option<Focus>,
}

impl Target {
    /// Translate a zKillboard page URL into its API listing URL.
    ///
    /// `https://zkillboard.com/character/95465499/losses/` becomes
    /// `https://zkillboard.com/api/characterID/95465499/losses/`, with the
    /// focus set to that character.
    pub fn parse(page_url: &str) -> Result<Self> {
        if page_url.trim().is_empty() {
            bail!("No zKillboard URL given");
        }
        let url = Url::parse(page_url.trim())
            .with_context(|| format!("Invalid zKillboard URL: {}", page_url))?;
        let host = url
            .host_str()
            .with_context(|| format!("zKillboard URL has no host: {}", page_url))?;

        let mut listing_url = format!("{}://{}", url.scheme(), host);
        if let Some(port) = url.port() {
            listing_url.push_str(&format!(":{}", port));
        }
        listing_url.push_str("/api/");

        let mut focus_kind = None;
        let mut focus_id = None;

        for segment in url.path().split('/').filter(|s| !s.is_empty()) {
            let translated = FETCH_MODIFIERS
                .iter()
                .find(|(keyword, _)| *keyword == segment)
                .map(|(_, modifier)| *modifier)
                .unwrap_or(segment);
            listing_url.push_str(translated);
            listing_url.push('/');

            if let (Some(_), None) = (focus_kind, focus_id) {
                let id = segment
                    .parse::<u64>()
                    .with_context(|| format!("Expected a numeric ID after the focus keyword, got '{}'", segment))?;
                focus_id = Some(id);
            }

            if focus_kind.is_none() {
                focus_kind = FocusKind::from_keyword(segment);
            }
        }

        let focus = match (focus_kind, focus_id) {
            (Some(kind), Some(id)) => Some(Focus { kind, id }),
            _ => None,
        };

        Ok(Self { listing_url, focus })
    }

    pub fn page_url(&self, page: u32) -> String {
        format!("{}page/{}/", self.listing_url, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_focus() {
        let target = Target::parse("https://zkillboard.com/character/95465499/").unwrap();
        assert_eq!(target.listing_url, "https://zkillboard.com/api/characterID/95465499/");
        assert_eq!(
            target.focus,
            Some(Focus {
                kind: FocusKind::Participant(EntityKind::Character),
                id: 95465499
            })
        );
        assert_eq!(
            target.page_url(2),
            "https://zkillboard.com/api/characterID/95465499/page/2/"
        );
    }

    #[test]
    fn test_first_focus_keyword_wins() {
        let target =
            Target::parse("https://zkillboard.com/corporation/98000001/ship/587/losses/").unwrap();
        assert_eq!(
            target.listing_url,
            "https://zkillboard.com/api/corporationID/98000001/shipTypeID/587/losses/"
        );
        assert_eq!(
            target.focus.unwrap().kind,
            FocusKind::Participant(EntityKind::Corporation)
        );
    }

    #[test]
    fn test_location_pages_have_no_focus() {
        let target = Target::parse("https://zkillboard.com/region/10000002/kills/").unwrap();
        assert_eq!(target.listing_url, "https://zkillboard.com/api/regionID/10000002/kills/");
        assert_eq!(target.focus, None);
    }

    #[test]
    fn test_non_numeric_focus_id_is_rejected() {
        assert!(Target::parse("https://zkillboard.com/character/losses/").is_err());
        assert!(Target::parse("").is_err());
    }

    #[test]
    fn test_ship_focus_matches_record() {
        let record = EnrichedRecord {
            killmail_id: 1,
            killmail_time: "2023-01-01T00:00:00Z".to_string(),
            damage_taken: 0,
            involved: 1,
            ship_id: 587,
            group_id: 25,
            system_id: 30000142,
            constellation_id: 20000020,
            region_id: 10000002,
            character_id: Some(5),
            corporation_id: None,
            alliance_id: None,
        };
        let ship = Target::parse("https://zkillboard.com/ship/587/").unwrap().focus.unwrap();
        let group = Target::parse("https://zkillboard.com/group/26/").unwrap().focus.unwrap();
        let character = Target::parse("https://zkillboard.com/character/5/").unwrap().focus.unwrap();

        assert!(ship.matches(&record));
        assert!(!group.matches(&record));
        assert!(character.matches(&record));
    }
}
