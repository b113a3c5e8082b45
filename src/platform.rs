//! Platform collaborator interface.
//!
//! The lifecycle core never talks to the chat platform directly; it goes
//! through [`PlatformGateway`], implemented by the embedding binary against
//! the real client library (and by a mock in the integration tests). All
//! methods are fallible with the [`PlatformError`] taxonomy and none of
//! them are retried by the core.

use crate::error::PlatformError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! snowflake_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

snowflake_id!(
    /// A guild (server) identifier.
    GuildId
);
snowflake_id!(
    /// A channel identifier. Categories are channels on the platform, so
    /// category ids share this type.
    ChannelId
);
snowflake_id!(
    /// A member (user) identifier.
    UserId
);

/// A membership-movement event delivered by the platform.
///
/// `from`/`to` are `None` when the member was not in voice on that side of
/// the move (connect and disconnect are moves with one side absent).
#[derive(Debug, Clone)]
pub struct VoiceEvent {
    pub guild_id: GuildId,
    pub member_id: UserId,
    /// Display name at event time; used to derive the room name.
    pub display_name: String,
    pub from: Option<ChannelId>,
    pub to: Option<ChannelId>,
}

/// Elevated-control grant issued alongside channel creation.
///
/// The lifecycle contract is that exactly the creating member receives
/// `manage_channel`; enforcement afterwards is the platform's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrant {
    pub member: UserId,
    pub manage_channel: bool,
}

/// Parameters for a voice-channel creation request.
#[derive(Debug, Clone)]
pub struct CreateVoiceChannel {
    pub name: String,
    pub category: Option<ChannelId>,
    /// `None` = unlimited.
    pub user_limit: Option<u16>,
    pub grants: Vec<PermissionGrant>,
}

/// The external chat-platform client, as seen by the lifecycle core.
#[async_trait]
pub trait PlatformGateway: Send + Sync {
    /// Create a voice channel and return its id.
    async fn create_voice_channel(
        &self,
        guild: GuildId,
        req: CreateVoiceChannel,
    ) -> Result<ChannelId, PlatformError>;

    /// Delete a channel.
    async fn delete_channel(&self, channel: ChannelId) -> Result<(), PlatformError>;

    /// Relocate a connected member into a voice channel.
    /// Fails if the member is no longer connected to voice.
    async fn move_member(
        &self,
        guild: GuildId,
        member: UserId,
        channel: ChannelId,
    ) -> Result<(), PlatformError>;

    /// Current occupant count of a voice channel.
    async fn occupancy(&self, channel: ChannelId) -> Result<u32, PlatformError>;

    /// The category a channel sits under, if any.
    async fn category_of(&self, channel: ChannelId) -> Result<Option<ChannelId>, PlatformError>;

    /// Whether a channel id still resolves on the platform. Used to detect
    /// stale configured category references.
    async fn channel_exists(&self, channel: ChannelId) -> Result<bool, PlatformError>;
}
