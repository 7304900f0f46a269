//! Monitored channel registry
//!
//! The set of channel handles the bot downloads from, mirrored to a JSON
//! array of strings on disk. Every effective change rewrites the whole file
//! through a temp file and a rename, so a crash mid-write never leaves a
//! truncated registry behind.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::error::{AppError, AppResult};

/// Whether removing an unknown channel still rewrites the registry file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemovePersistPolicy {
    /// Only effective changes touch the file
    #[default]
    OnChange,
    /// Every remove call rewrites the file, even when nothing was removed
    Always,
}

/// Result of [`ChannelRegistry::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Result of [`ChannelRegistry::remove`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Normalizes a user-supplied channel handle.
///
/// Trims surrounding whitespace and strips every leading `@`. Returns `None`
/// when nothing is left.
///
/// # Example
///
/// ```
/// use chanloader::storage::normalize_channel_id;
///
/// assert_eq!(normalize_channel_id(" @@news "), Some("news".to_string()));
/// assert_eq!(normalize_channel_id("@"), None);
/// ```
pub fn normalize_channel_id(raw: &str) -> Option<String> {
    let id = raw.trim().trim_start_matches('@').trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Set of monitored channels backed by a JSON file
#[derive(Debug)]
pub struct ChannelRegistry {
    path: PathBuf,
    channels: HashSet<String>,
    policy: RemovePersistPolicy,
}

impl ChannelRegistry {
    /// Loads the registry from `path`.
    ///
    /// A missing file gives an empty registry. Malformed JSON is an error so
    /// a corrupted file is never silently overwritten with an empty list.
    pub fn load(path: impl Into<PathBuf>, policy: RemovePersistPolicy) -> AppResult<Self> {
        let path = path.into();

        let channels = match fs_err::read_to_string(&path) {
            Ok(content) => {
                let list: Vec<String> =
                    serde_json::from_str(&content).map_err(|e| AppError::registry(&path, e))?;
                list.iter().filter_map(|raw| normalize_channel_id(raw)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No channel registry at {}, starting empty", path.display());
                HashSet::new()
            }
            Err(e) => return Err(AppError::registry(&path, e)),
        };

        log::info!("📋 Loaded {} monitored channel(s) from {}", channels.len(), path.display());

        Ok(Self { path, channels, policy })
    }

    /// Adds a channel and persists the registry.
    pub fn add(&mut self, raw: &str) -> AppResult<AddOutcome> {
        let id = Self::require_id(raw)?;

        if self.channels.contains(&id) {
            return Ok(AddOutcome::AlreadyPresent);
        }

        self.channels.insert(id.clone());
        if let Err(e) = self.save() {
            self.channels.remove(&id);
            return Err(e);
        }

        log::info!("➕ Added channel @{}", id);
        Ok(AddOutcome::Added)
    }

    /// Removes a channel and persists the registry.
    ///
    /// Removing an unknown channel leaves the set unchanged; whether the file
    /// is rewritten anyway depends on the [`RemovePersistPolicy`].
    pub fn remove(&mut self, raw: &str) -> AppResult<RemoveOutcome> {
        let id = Self::require_id(raw)?;

        if !self.channels.remove(&id) {
            if self.policy == RemovePersistPolicy::Always {
                self.save()?;
            }
            return Ok(RemoveOutcome::NotFound);
        }

        if let Err(e) = self.save() {
            self.channels.insert(id);
            return Err(e);
        }

        log::info!("➖ Removed channel @{}", id);
        Ok(RemoveOutcome::Removed)
    }

    /// Sorted snapshot of the monitored channels.
    pub fn list(&self) -> Vec<String> {
        let mut list: Vec<String> = self.channels.iter().cloned().collect();
        list.sort();
        list
    }

    pub fn contains(&self, raw: &str) -> bool {
        normalize_channel_id(raw).is_some_and(|id| self.channels.contains(&id))
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn require_id(raw: &str) -> AppResult<String> {
        normalize_channel_id(raw)
            .ok_or_else(|| AppError::Validation(format!("invalid channel id: {:?}", raw)))
    }

    /// Writes the registry atomically: temp file in the same directory, then rename.
    fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent).map_err(|e| AppError::registry(&self.path, e))?;
            }
        }

        let content = serde_json::to_string_pretty(&self.list())?;
        let temp_path = temp_path_for(&self.path);

        fs_err::write(&temp_path, content).map_err(|e| AppError::registry(&self.path, e))?;

        fs_err::rename(&temp_path, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            AppError::registry(&self.path, e)
        })?;

        log::debug!("Channel registry saved to {}", self.path.display());
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".tmp.{}", std::process::id()));
    path.with_file_name(name)
}
