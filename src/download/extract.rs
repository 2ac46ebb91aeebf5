use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use zip::ZipArchive;

use crate::ui::Ui;

/// SDE files the catalog builder reads; everything else in the archive is skipped
pub const REQUIRED_FILES: &[&str] = &[
    "categories.jsonl",
    "groups.jsonl",
    "types.jsonl",
    "mapRegions.jsonl",
    "mapConstellations.jsonl",
    "mapSolarSystems.jsonl",
];

/// Extract the catalog source files from an SDE zip into `dest_dir`
pub fn extract_zip(zip_path: &Path, dest_dir: &Path, ui: &mut impl Ui) -> Result<usize> {
    let file = File::open(zip_path).context("Failed to open zip file")?;
    let reader = BufReader::new(file);
    let mut archive = ZipArchive::new(reader).context("Failed to read zip archive")?;

    fs::create_dir_all(dest_dir).context("Failed to create destination directory")?;

    let total_files = archive.len();
    let mut extracted = 0;

    for i in 0..total_files {
        let mut file = archive
            .by_index(i)
            .context("Failed to read file from archive")?;

        // Get the file name, stripping any directory prefix
        let name = file.name();
        let file_name = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name)
            .to_string();

        ui.set_progress(i as u64 + 1, total_files as u64, "Extracting");

        if !REQUIRED_FILES.contains(&file_name.as_str()) {
            continue;
        }

        let dest_path = dest_dir.join(&file_name);
        let mut dest_file = File::create(&dest_path)
            .with_context(|| format!("Failed to create file: {:?}", dest_path))?;

        io::copy(&mut file, &mut dest_file)
            .with_context(|| format!("Failed to extract: {}", file_name))?;

        ui.log(format!("Extracted: {}", file_name));
        extracted += 1;
    }

    ui.clear_progress();
    Ok(extracted)
}
