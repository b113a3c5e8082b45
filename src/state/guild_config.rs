//! Per-guild configuration store.
//!
//! Holds the lobby entry point and target category for each guild, cached
//! in memory and written through to a single JSON document on every
//! mutation. The in-memory copy is authoritative: a failed write is logged
//! and swallowed rather than failing the admin operation.

use crate::error::{Error, Result};
use crate::platform::{ChannelId, GuildId};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings for one guild. Both fields optional; a guild with neither set
/// never triggers lobby provisioning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
    /// The static voice channel whose joins spawn personal rooms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lobby_channel_id: Option<ChannelId>,
    /// Category new rooms are placed under. May go stale if the category is
    /// deleted on the platform; placement then falls back to the lobby's
    /// own category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<ChannelId>,
}

/// Store of per-guild settings with write-through JSON persistence.
pub struct GuildConfigStore {
    path: PathBuf,
    configs: DashMap<GuildId, GuildConfig>,
}

impl GuildConfigStore {
    /// Load the store from disk. A missing or corrupt document degrades to
    /// empty configuration; this never fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let configs = DashMap::new();

        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, GuildConfig>>(&content) {
                Ok(doc) => {
                    for (key, config) in doc {
                        match key.parse::<u64>() {
                            Ok(raw) => {
                                configs.insert(GuildId(raw), config);
                            }
                            Err(_) => {
                                warn!(key = %key, "Skipping non-numeric guild key in config store");
                            }
                        }
                    }
                    info!(path = %path.display(), guilds = configs.len(), "Loaded guild configs");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt guild config store, starting empty");
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No guild config store yet, starting empty");
            }
            Err(e) => {
                let e = Error::ConfigUnavailable(e);
                warn!(path = %path.display(), error = %e, "Unreadable guild config store, starting empty");
            }
        }

        Self { path, configs }
    }

    /// Current settings for a guild, or the default when none are stored.
    pub fn get(&self, guild: GuildId) -> GuildConfig {
        self.configs
            .get(&guild)
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Set the lobby entry point. Idempotent; persists on every call.
    pub fn set_lobby(&self, guild: GuildId, channel: ChannelId) {
        self.configs.entry(guild).or_default().lobby_channel_id = Some(channel);
        self.persist_logged(guild);
    }

    /// Set the target category. Idempotent; persists on every call.
    pub fn set_category(&self, guild: GuildId, channel: ChannelId) {
        self.configs.entry(guild).or_default().category_id = Some(channel);
        self.persist_logged(guild);
    }

    /// Persist and swallow the failure: availability over durability, the
    /// in-memory copy stays correct either way.
    fn persist_logged(&self, guild: GuildId) {
        if let Err(e) = self.persist() {
            warn!(
                path = %self.path.display(),
                guild = %guild,
                error = %e,
                "Failed to persist guild configs, in-memory value stands"
            );
        }
    }

    /// Rewrite the whole document.
    fn persist(&self) -> Result<()> {
        let doc: BTreeMap<String, GuildConfig> = self
            .configs
            .iter()
            .map(|entry| (entry.key().to_string(), entry.value().clone()))
            .collect();

        let json = serde_json::to_string_pretty(&doc).map_err(std::io::Error::from)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
