//! Sync profile persistence
//!
//! Save/load/list/delete [`SyncProfile`]s as pretty-printed JSON files, one
//! `<name>.json` per profile, under a caller-chosen directory.

use std::path::{Path, PathBuf};

use crate::domain::{SyncError, SyncProfile, SyncResult};

/// Name of the profile that always exists and cannot be deleted
pub const DEFAULT_PROFILE: &str = "Default";

/// Sanitize a profile name to prevent path traversal.
/// Rejects path separators, "..", empty names, and anything outside
/// alphanumerics, spaces, hyphens and underscores.
fn sanitize_name(name: &str) -> SyncResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SyncError::Profile("Profile name cannot be empty".to_string()));
    }
    if trimmed.contains("..") || trimmed.contains('/') || trimmed.contains('\\') {
        return Err(SyncError::Profile(format!("Invalid profile name '{trimmed}'")));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_')
    {
        return Err(SyncError::Profile(format!(
            "Profile name '{trimmed}' contains invalid characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Directory-backed store of sync profiles
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> SyncResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        log::debug!("profile store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Write `profile` under its own name, replacing any existing file
    pub fn save(&self, profile: &SyncProfile) -> SyncResult<()> {
        let name = sanitize_name(&profile.name)?;
        profile.validate()?;
        let json = serde_json::to_string_pretty(profile)?;
        std::fs::write(self.path_for(&name), json)?;
        log::debug!("saved profile '{name}'");
        Ok(())
    }

    /// Read and validate the profile called `name`.
    ///
    /// `Default` loads the built-in defaults when no file has been saved.
    pub fn load(&self, name: &str) -> SyncResult<SyncProfile> {
        let name = sanitize_name(name)?;
        let path = self.path_for(&name);
        if !path.exists() {
            if name == DEFAULT_PROFILE {
                return Ok(SyncProfile::default());
            }
            return Err(SyncError::Profile(format!("Profile '{name}' not found")));
        }
        let json = std::fs::read_to_string(&path)?;
        let profile: SyncProfile = serde_json::from_str(&json)?;
        if let Err(e) = profile.validate() {
            log::warn!("profile '{name}' failed validation: {e}");
            return Err(e);
        }
        Ok(profile)
    }

    /// Names of all stored profiles, sorted
    pub fn list(&self) -> SyncResult<Vec<String>> {
        let mut names: Vec<String> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()?.to_str()? == "json" {
                    path.file_stem()?.to_str().map(String::from)
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> SyncResult<()> {
        let name = sanitize_name(name)?;
        if name == DEFAULT_PROFILE {
            return Err(SyncError::Profile(
                "Cannot delete the Default profile".to_string(),
            ));
        }
        let path = self.path_for(&name);
        if !path.exists() {
            return Err(SyncError::Profile(format!("Profile '{name}' not found")));
        }
        std::fs::remove_file(&path)?;
        log::debug!("deleted profile '{name}'");
        Ok(())
    }
}
