//! Temp-channel lifecycle management.
//!
//! The `LifecycleManager` reacts to membership-movement events: a join into
//! a guild's configured lobby spawns a personal voice room and relocates
//! the joiner into it; a managed channel that drops to zero occupants gets
//! a grace timer and is deleted only if still empty when the timer fires.
//!
//! Timers are explicit and cancellable, at most one per channel: a
//! reschedule replaces (and aborts) the previous timer, and a member
//! re-entering the channel aborts it outright. The occupancy re-check on
//! expiry makes deletion safe even if a cancellation was missed.
//!
//! Every platform call is matched at the call site; failures are logged and
//! the manager keeps processing events. Nothing in this module can take
//! down the host event loop.

use crate::config::ManagerConfig;
use crate::error::{Error, Result};
use crate::metrics;
use crate::platform::{
    ChannelId, CreateVoiceChannel, GuildId, PermissionGrant, PlatformGateway, UserId, VoiceEvent,
};
use crate::state::{ChannelRegistry, GuildConfig, GuildConfigStore};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Reacts to membership movement, owns the grace-period timers.
pub struct LifecycleManager {
    gateway: Arc<dyn PlatformGateway>,
    configs: Arc<GuildConfigStore>,
    registry: Arc<ChannelRegistry>,
    /// Live grace timers, keyed by channel. Invariant: at most one per
    /// channel; insertion aborts whatever it replaces.
    reclaim_timers: DashMap<ChannelId, JoinHandle<()>>,
    grace_period: Duration,
}

impl LifecycleManager {
    pub fn new(
        gateway: Arc<dyn PlatformGateway>,
        configs: Arc<GuildConfigStore>,
        registry: Arc<ChannelRegistry>,
        manager_config: &ManagerConfig,
    ) -> Self {
        Self {
            gateway,
            configs,
            registry,
            reclaim_timers: DashMap::new(),
            grace_period: manager_config.grace_period(),
        }
    }

    /// Handle one membership-movement event to completion.
    ///
    /// Creation is considered before reclaim, matching the event's own
    /// direction: the destination side may spawn a room, the origin side
    /// may start emptying one.
    pub async fn handle_voice_event(self: &Arc<Self>, event: VoiceEvent) {
        if let Some(to) = event.to {
            // A member entering a managed channel defuses its pending reclaim.
            if self.registry.contains(to) {
                self.cancel_reclaim(to);
            }

            let config = self.configs.get(event.guild_id);
            if config.lobby_channel_id == Some(to) {
                if let Err(e) = self.provision_for_lobby_join(&event, to, &config).await {
                    metrics::inc_platform_error(e.error_code());
                    warn!(
                        guild = %event.guild_id,
                        member = %event.member_id,
                        error = %e,
                        "Failed to provision temp channel for lobby join"
                    );
                }
            }
        }

        if let Some(from) = event.from {
            if self.registry.contains(from) {
                self.reclaim_if_empty(from).await;
            }
        }
    }

    /// Create, register, and populate a room for a member who joined the
    /// lobby. Exactly the joining member receives the elevated grant.
    async fn provision_for_lobby_join(
        self: &Arc<Self>,
        event: &VoiceEvent,
        lobby: ChannelId,
        config: &GuildConfig,
    ) -> Result<()> {
        let category = self
            .resolve_placement(config.category_id, Some(lobby))
            .await;

        let request = CreateVoiceChannel {
            name: format!("{}-room", event.display_name),
            category,
            user_limit: None,
            grants: vec![PermissionGrant {
                member: event.member_id,
                manage_channel: true,
            }],
        };

        let new_channel = self
            .gateway
            .create_voice_channel(event.guild_id, request)
            .await?;

        // Register before relocating so a reclaim can never race ahead of
        // the channel becoming known.
        self.registry.register(new_channel, event.member_id);
        metrics::inc_channels_created();
        info!(
            guild = %event.guild_id,
            channel = %new_channel,
            owner = %event.member_id,
            "Created temp channel"
        );

        if let Err(e) = self
            .gateway
            .move_member(event.guild_id, event.member_id, new_channel)
            .await
        {
            // Member likely disconnected mid-flight. The room stands empty
            // and registered, so the normal grace path collects it.
            metrics::inc_platform_error(Error::from(e.clone()).error_code());
            warn!(
                channel = %new_channel,
                member = %event.member_id,
                error = %e,
                "Failed to move member into their temp channel"
            );
            self.schedule_reclaim(new_channel);
        }

        Ok(())
    }

    /// Explicit, command-triggered creation. No relocation is attempted
    /// (the requester is not necessarily in voice); the created channel id
    /// is reported back synchronously.
    pub async fn create_on_demand(
        self: &Arc<Self>,
        guild: Option<GuildId>,
        member: UserId,
        name: &str,
        user_limit: Option<u16>,
    ) -> Result<ChannelId> {
        let guild = guild.ok_or(Error::InvalidContext)?;
        let config = self.configs.get(guild);

        let category = self
            .resolve_placement(config.category_id, config.lobby_channel_id)
            .await;

        let request = CreateVoiceChannel {
            name: format!("temp-{name}"),
            category,
            user_limit: user_limit.filter(|limit| *limit > 0),
            grants: vec![PermissionGrant {
                member,
                manage_channel: true,
            }],
        };

        let channel = self.gateway.create_voice_channel(guild, request).await?;
        self.registry.register(channel, member);
        metrics::inc_channels_created();
        info!(guild = %guild, channel = %channel, owner = %member, "Created on-demand temp channel");
        Ok(channel)
    }

    /// Configure the lobby entry point for a guild. The capability check
    /// belongs to the command glue calling this.
    pub fn set_lobby(&self, guild: GuildId, channel: ChannelId) {
        self.configs.set_lobby(guild, channel);
        info!(guild = %guild, channel = %channel, "Lobby channel configured");
    }

    /// Configure the target category for a guild.
    pub fn set_category(&self, guild: GuildId, channel: ChannelId) {
        self.configs.set_category(guild, channel);
        info!(guild = %guild, channel = %channel, "Target category configured");
    }

    /// Placement fallback order: the configured category if it still
    /// resolves on the platform, else the lobby's own category, else none.
    async fn resolve_placement(
        &self,
        configured: Option<ChannelId>,
        lobby: Option<ChannelId>,
    ) -> Option<ChannelId> {
        if let Some(category) = configured {
            match self.gateway.channel_exists(category).await {
                Ok(true) => return Some(category),
                Ok(false) => {
                    debug!(category = %category, "Configured category no longer exists, falling back");
                }
                Err(e) => {
                    debug!(category = %category, error = %e, "Could not resolve configured category, falling back");
                }
            }
        }

        let lobby = lobby?;
        self.gateway.category_of(lobby).await.ok().flatten()
    }

    /// Start the grace clock on a managed channel if it is empty right now.
    async fn reclaim_if_empty(self: &Arc<Self>, channel: ChannelId) {
        match self.gateway.occupancy(channel).await {
            Ok(0) => self.schedule_reclaim(channel),
            Ok(count) => {
                debug!(channel = %channel, occupants = count, "Channel not empty, no reclaim");
            }
            Err(e) => {
                // Cannot tell; arm the timer anyway and let the expiry
                // re-check decide.
                metrics::inc_platform_error(Error::from(e.clone()).error_code());
                warn!(channel = %channel, error = %e, "Occupancy check failed, scheduling reclaim regardless");
                self.schedule_reclaim(channel);
            }
        }
    }

    /// Arm (or re-arm) the grace timer for a channel.
    fn schedule_reclaim(self: &Arc<Self>, channel: ChannelId) {
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(manager.grace_period).await;
            manager.finish_reclaim(channel).await;
        });

        if let Some(previous) = self.reclaim_timers.insert(channel, handle) {
            previous.abort();
        }
        debug!(channel = %channel, grace = ?self.grace_period, "Reclaim scheduled");
    }

    /// Abort a pending reclaim after a member re-entered the channel.
    fn cancel_reclaim(&self, channel: ChannelId) {
        if let Some((_, handle)) = self.reclaim_timers.remove(&channel) {
            handle.abort();
            metrics::inc_reclaims_cancelled();
            debug!(channel = %channel, "Reclaim cancelled, channel regained an occupant");
        }
    }

    /// Grace timer expiry: delete the channel if it is still empty.
    ///
    /// The registry entry goes away whether or not the platform delete
    /// succeeded; a failed delete leaves an operator-visible orphan on the
    /// platform and is not retried.
    async fn finish_reclaim(&self, channel: ChannelId) {
        self.reclaim_timers.remove(&channel);

        match self.gateway.occupancy(channel).await {
            Ok(0) => {
                if let Err(e) = self.gateway.delete_channel(channel).await {
                    metrics::inc_platform_error(Error::from(e.clone()).error_code());
                    warn!(channel = %channel, error = %e, "Failed to delete empty temp channel (orphaned on platform)");
                }
                self.registry.unregister(channel);
                metrics::inc_channels_reclaimed();
                info!(channel = %channel, "Reclaimed empty temp channel");
            }
            Ok(count) => {
                metrics::inc_reclaims_cancelled();
                debug!(channel = %channel, occupants = count, "Channel occupied again at grace expiry, leaving it alone");
            }
            Err(e) => {
                metrics::inc_platform_error(Error::from(e.clone()).error_code());
                warn!(channel = %channel, error = %e, "Could not verify occupancy at grace expiry, leaving channel alone");
            }
        }
    }

    /// Whether a grace timer is currently armed for a channel.
    pub fn has_pending_reclaim(&self, channel: ChannelId) -> bool {
        self.reclaim_timers.contains_key(&channel)
    }
}
