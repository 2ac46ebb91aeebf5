use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::settings::Overrides;

#[derive(Parser, Debug)]
#[command(name = "zkb-export")]
#[command(version, about = "Export zKillboard killmails to Excel or CSV")]
pub struct Cli {
    /// Directory holding settings, caches and reference catalogs
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Export options. Values are validated one by one; a rejected value is
/// reported and the previously saved setting is kept.
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// zKillboard page URL, e.g. https://zkillboard.com/character/95465499/
    /// (defaults to the last URL used)
    pub url: Option<String>,

    /// Export language: de, en, fr, ja, ru, zh
    #[arg(long)]
    pub lang: Option<String>,

    /// Output path without extension
    #[arg(long)]
    pub filepath: Option<String>,

    /// Output format: excel or csv
    #[arg(long)]
    pub format: Option<String>,

    /// Delete the cache file after exporting
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub clear_cache: Option<String>,

    /// Check for a newer SDE before exporting
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub update_sde: Option<String>,

    /// First zKillboard page to read
    #[arg(long)]
    pub page: Option<String>,

    /// Number of pages to read
    #[arg(long)]
    pub limit: Option<String>,

    /// Show the full-screen progress view (press q to stop)
    #[arg(long)]
    pub tui: bool,
}

impl ExportArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            zkb_url: self.url.clone(),
            lang: self.lang.clone(),
            filepath: self.filepath.clone(),
            format: self.format.clone(),
            clear_cache: self.clear_cache.clone(),
            update_sde: self.update_sde.clone(),
            page: self.page.clone(),
            limit: self.limit.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch killmails and write the export file
    Export(ExportArgs),

    /// Download the latest SDE and rebuild the reference catalogs
    UpdateSde {
        /// Rebuild even if the catalogs are already at the latest build
        #[arg(short, long)]
        force: bool,
    },

    /// List the export columns
    ListColumns {
        /// Header language
        #[arg(long, default_value = "en")]
        lang: String,
    },

    /// Delete the killmail and name cache
    ClearCache,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
