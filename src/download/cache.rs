use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";
const CACHED_FILE: &str = "cached.json";
const TYPES_FILE: &str = "types.json";
const UNIVERSES_FILE: &str = "universes.json";
const SDE_DIR: &str = "sde";

/// Locations of every file the exporter reads or writes between runs
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let root = match custom_dir {
            Some(dir) => dir,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "zkb-export")
                    .context("Could not determine data directory")?;
                proj_dirs.data_dir().to_path_buf()
            }
        };

        fs::create_dir_all(&root).context("Failed to create data directory")?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// Killmail and name caches share one file
    pub fn cache_path(&self) -> PathBuf {
        self.root.join(CACHED_FILE)
    }

    pub fn types_path(&self) -> PathBuf {
        self.root.join(TYPES_FILE)
    }

    pub fn universes_path(&self) -> PathBuf {
        self.root.join(UNIVERSES_FILE)
    }

    pub fn sde_dir(&self) -> PathBuf {
        self.root.join(SDE_DIR)
    }

    /// Get path to build-specific SDE directory
    pub fn build_dir(&self, build_number: u64) -> PathBuf {
        self.sde_dir().join(build_number.to_string())
    }

    /// Check if an SDE build is already extracted
    pub fn is_cached(&self, build_number: u64) -> bool {
        let build_dir = self.build_dir(build_number);
        build_dir.exists() && build_dir.join("types.jsonl").exists()
    }

    /// Get path to zip file for a build
    pub fn zip_path(&self, build_number: u64) -> PathBuf {
        self.sde_dir().join(format!("{}.zip", build_number))
    }

    /// Clean up old extracted builds, keeping only the specified one
    pub fn cleanup_old_builds(&self, keep_build: u64) -> Result<()> {
        let sde_dir = self.sde_dir();
        if !sde_dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(&sde_dir)? {
            let path = entry?.path();

            if path.is_dir() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if let Ok(build) = name.parse::<u64>() {
                        if build != keep_build {
                            fs::remove_dir_all(&path).ok();
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_live_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(data.cache_path(), dir.path().join("cached.json"));
        assert_eq!(data.zip_path(42), dir.path().join("sde").join("42.zip"));
        assert!(!data.is_cached(42));
    }

    #[test]
    fn test_cleanup_keeps_current_build() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(Some(dir.path().to_path_buf())).unwrap();
        fs::create_dir_all(data.build_dir(1)).unwrap();
        fs::create_dir_all(data.build_dir(2)).unwrap();

        data.cleanup_old_builds(2).unwrap();

        assert!(!data.build_dir(1).exists());
        assert!(data.build_dir(2).exists());
    }
}
