pub mod delimited;
pub mod spreadsheet;

pub use delimited::*;
pub use spreadsheet::*;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::Collected;
use crate::settings::{OutputFormat, Settings};

/// Render the collected rows to `<filepath>.<ext>`, creating the parent directory
pub fn render(collected: &Collected, settings: &Settings) -> Result<PathBuf> {
    let path = settings.output_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    render_to(&path, collected, settings.format)?;
    Ok(path)
}

pub fn render_to(path: &Path, collected: &Collected, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Excel => write_xlsx(path, collected),
        OutputFormat::Csv => write_csv(path, collected),
    }
}
