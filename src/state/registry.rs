//! Registry of managed temp channels.
//!
//! Memory-only: a process restart forgets all temp channels, and any
//! platform-side leftovers need external reconciliation. Entries are plain
//! map mutations with no external effects; the lifecycle manager decides
//! when to add and remove them.

use crate::metrics;
use crate::platform::{ChannelId, UserId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// A temp channel currently owned by this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedChannel {
    pub channel_id: ChannelId,
    /// The member the channel was created for. They hold the platform-side
    /// `manage_channel` grant; the registry itself does not enforce it.
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
}

/// The set of channel ids this process owns, with their owners.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: DashMap<ChannelId, ManagedChannel>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel. No-op if already present (first owner wins).
    pub fn register(&self, channel: ChannelId, owner: UserId) {
        self.channels.entry(channel).or_insert_with(|| ManagedChannel {
            channel_id: channel,
            owner,
            created_at: Utc::now(),
        });
        metrics::set_active_temp_channels(self.channels.len() as i64);
    }

    pub fn contains(&self, channel: ChannelId) -> bool {
        self.channels.contains_key(&channel)
    }

    /// Remove a channel. Returns the entry if it was present.
    pub fn unregister(&self, channel: ChannelId) -> Option<ManagedChannel> {
        let removed = self.channels.remove(&channel).map(|(_, entry)| entry);
        metrics::set_active_temp_channels(self.channels.len() as i64);
        removed
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
