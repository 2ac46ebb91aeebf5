//! Run settings: defaults, overlaid by the persisted `settings.json`, then by
//! command-line overrides. Each override is validated on its own; a rejected
//! value leaves the previous one in place.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

use crate::reference::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Excel,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Excel => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }

    /// Whether cells may carry hyperlinks
    pub fn supports_links(&self) -> bool {
        matches!(self, OutputFormat::Excel)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Excel => f.write_str("excel"),
            OutputFormat::Csv => f.write_str("csv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(OutputFormat::Excel),
            "csv" => Ok(OutputFormat::Csv),
            _ => bail!("Does not support '{}' format", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub zkb_url: String,
    pub lang: Language,
    /// Output path without extension
    pub filepath: PathBuf,
    pub format: OutputFormat,
    #[serde(rename = "clear-cache")]
    pub clear_cache: bool,
    #[serde(rename = "update-sde")]
    pub update_sde: bool,
    pub page: u32,
    pub limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zkb_url: String::new(),
            lang: Language::En,
            filepath: Path::new("export").join("export"),
            format: OutputFormat::Excel,
            clear_cache: false,
            update_sde: false,
            page: 1,
            limit: 1,
        }
    }
}

/// Raw command-line values, validated one by one in [`Settings::apply`]
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub zkb_url: Option<String>,
    pub lang: Option<String>,
    pub filepath: Option<String>,
    pub format: Option<String>,
    pub clear_cache: Option<String>,
    pub update_sde: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Truthy/falsy spellings accepted for boolean options
pub fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        _ => bail!("Value Error: '{}' is not a boolean", value),
    }
}

fn parse_count(option: &str, value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => bail!("Value Error: {}={}", option, value),
    }
}

impl Settings {
    /// Defaults overlaid with the persisted file; empty strings in the file are ignored
    pub fn load(path: &Path) -> Result<Self> {
        let defaults = Self::default();
        if !path.exists() {
            return Ok(defaults);
        }

        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let stored: Value =
            serde_json::from_str(&text).with_context(|| format!("Failed to parse {:?}", path))?;

        let mut merged = serde_json::to_value(&defaults)?;
        if let (Some(target), Some(source)) = (merged.as_object_mut(), stored.as_object()) {
            for (key, value) in source {
                if matches!(value, Value::String(s) if s.is_empty()) {
                    continue;
                }
                if target.contains_key(key) {
                    target.insert(key.clone(), value.clone());
                }
            }
        }

        match serde_json::from_value(merged) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!(%err, "ignoring invalid stored settings");
                Ok(defaults)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write {:?}", path))
    }

    /// Apply command-line overrides.
    ///
    /// Returns one user-facing message per rejected option; those options
    /// keep their previous value.
    pub fn apply(&mut self, overrides: Overrides) -> Vec<String> {
        let mut rejected = Vec::new();

        if let Some(url) = overrides.zkb_url {
            self.zkb_url = url;
        }
        if let Some(path) = overrides.filepath {
            self.filepath = PathBuf::from(path);
        }

        let mut check = |result: Result<()>| {
            if let Err(err) = result {
                rejected.push(err.to_string());
            }
        };

        if let Some(value) = overrides.lang {
            check(value.parse().map(|lang| self.lang = lang));
        }
        if let Some(value) = overrides.format {
            check(value.parse().map(|format| self.format = format));
        }
        if let Some(value) = overrides.clear_cache {
            check(parse_bool(&value).map(|flag| self.clear_cache = flag));
        }
        if let Some(value) = overrides.update_sde {
            check(parse_bool(&value).map(|flag| self.update_sde = flag));
        }
        if let Some(value) = overrides.page {
            check(parse_count("--page", &value).map(|page| self.page = page));
        }
        if let Some(value) = overrides.limit {
            check(parse_count("--limit", &value).map(|limit| self.limit = limit));
        }

        rejected
    }

    /// Full output path including the format's extension
    pub fn output_path(&self) -> PathBuf {
        let mut path = self.filepath.clone().into_os_string();
        path.push(".");
        path.push(self.format.extension());
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.lang, Language::En);
        assert_eq!(settings.format, OutputFormat::Excel);
        assert_eq!((settings.page, settings.limit), (1, 1));
        assert_eq!(settings.output_path(), Path::new("export").join("export.xlsx"));
    }

    #[test]
    fn test_bad_option_does_not_block_others() {
        let mut settings = Settings::default();
        let rejected = settings.apply(Overrides {
            lang: Some("ko".to_string()),
            format: Some("CSV".to_string()),
            page: Some("two".to_string()),
            limit: Some("3".to_string()),
            clear_cache: Some("yes".to_string()),
            ..Default::default()
        });

        assert_eq!(rejected.len(), 2);
        assert!(rejected[0].contains("'ko' language"));
        assert!(rejected[1].contains("--page=two"));
        assert_eq!(settings.lang, Language::En);
        assert_eq!(settings.format, OutputFormat::Csv);
        assert_eq!(settings.page, 1);
        assert_eq!(settings.limit, 3);
        assert!(settings.clear_cache);
    }

    #[test]
    fn test_load_skips_empty_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"zkb_url": "", "lang": "ja", "format": "csv", "page": 4, "filepath": ""}"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();

        assert_eq!(settings.lang, Language::Ja);
        assert_eq!(settings.format, OutputFormat::Csv);
        assert_eq!(settings.page, 4);
        assert_eq!(settings.filepath, Settings::default().filepath);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.zkb_url = "https://zkillboard.com/character/95465499/".to_string();
        settings.update_sde = true;

        settings.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"update-sde\": true"));
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("On").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }
}
