use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Display languages supported by the exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    De,
    #[default]
    En,
    Fr,
    Ja,
    Ru,
    Zh,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::De,
        Language::En,
        Language::Fr,
        Language::Ja,
        Language::Ru,
        Language::Zh,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
            Language::Fr => "fr",
            Language::Ja => "ja",
            Language::Ru => "ru",
            Language::Zh => "zh",
        }
    }

    /// Position in `Language::ALL`, used to index per-language label tables
    pub fn index(&self) -> usize {
        match self {
            Language::De => 0,
            Language::En => 1,
            Language::Fr => 2,
            Language::Ja => 3,
            Language::Ru => 4,
            Language::Zh => 5,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match Language::ALL.iter().find(|lang| lang.code() == s) {
            Some(lang) => Ok(*lang),
            None => bail!("Does not support '{}' language", s),
        }
    }
}

/// A name with one display string per supported language.
///
/// Every language field is filled: blank or missing upstream values fall
/// back to the default `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLocalizedName")]
pub struct LocalizedName {
    pub name: String,
    pub de: String,
    pub en: String,
    pub fr: String,
    pub ja: String,
    pub ru: String,
    pub zh: String,
}

#[derive(Deserialize)]
struct RawLocalizedName {
    name: String,
    de: Option<String>,
    en: Option<String>,
    fr: Option<String>,
    ja: Option<String>,
    ru: Option<String>,
    zh: Option<String>,
}

impl From<RawLocalizedName> for LocalizedName {
    fn from(raw: RawLocalizedName) -> Self {
        let fill = |value: Option<String>| match value {
            Some(s) if !s.trim().is_empty() => s,
            _ => raw.name.clone(),
        };

        Self {
            de: fill(raw.de),
            en: fill(raw.en),
            fr: fill(raw.fr),
            ja: fill(raw.ja),
            ru: fill(raw.ru),
            zh: fill(raw.zh),
            name: raw.name,
        }
    }
}

impl LocalizedName {
    /// Same string in every language
    pub fn uniform(name: impl Into<String>) -> Self {
        let name = name.into();
        RawLocalizedName {
            name,
            de: None,
            en: None,
            fr: None,
            ja: None,
            ru: None,
            zh: None,
        }
        .into()
    }

    /// Build from an SDE localized object (`{"en": .., "de": .., ...}`).
    ///
    /// Returns `None` when there is no usable English name.
    pub fn from_map(names: &HashMap<String, String>) -> Option<Self> {
        let default = names.get("en").filter(|s| !s.trim().is_empty())?;
        let pick = |lang: Language| names.get(lang.code()).cloned();

        Some(
            RawLocalizedName {
                name: default.clone(),
                de: pick(Language::De),
                en: pick(Language::En),
                fr: pick(Language::Fr),
                ja: pick(Language::Ja),
                ru: pick(Language::Ru),
                zh: pick(Language::Zh),
            }
            .into(),
        )
    }

    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::De => &self.de,
            Language::En => &self.en,
            Language::Fr => &self.fr,
            Language::Ja => &self.ja,
            Language::Ru => &self.ru,
            Language::Zh => &self.zh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_language_falls_back_to_default() {
        let name: LocalizedName =
            serde_json::from_str(r#"{"name": "Rifter", "de": "Rifter DE", "ja": "リフター"}"#)
                .unwrap();
        assert_eq!(name.get(Language::Fr), "Rifter");
        assert_eq!(name.get(Language::De), "Rifter DE");
        assert_eq!(name.get(Language::Ja), "リフター");
    }

    #[test]
    fn test_blank_language_falls_back_to_default() {
        let name: LocalizedName =
            serde_json::from_str(r#"{"name": "Jita", "zh": "  ", "ru": ""}"#).unwrap();
        assert_eq!(name.get(Language::Zh), "Jita");
        assert_eq!(name.get(Language::Ru), "Jita");
    }

    #[test]
    fn test_from_map_requires_english() {
        let mut names = HashMap::new();
        names.insert("de".to_string(), "Nur Deutsch".to_string());
        assert!(LocalizedName::from_map(&names).is_none());

        names.insert("en".to_string(), "Frigate".to_string());
        let name = LocalizedName::from_map(&names).unwrap();
        assert_eq!(name.name, "Frigate");
        assert_eq!(name.get(Language::De), "Nur Deutsch");
        assert_eq!(name.get(Language::Zh), "Frigate");
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("ja".parse::<Language>().unwrap(), Language::Ja);
        assert!("ko".parse::<Language>().is_err());
        assert_eq!(Language::ALL[Language::Ru.index()], Language::Ru);
    }
}
