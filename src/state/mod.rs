//! State management module.
//!
//! Contains the per-guild configuration store and the registry of managed
//! temp channels. Both are process-wide mutable state; all mutation goes
//! through their methods, backed by `DashMap` so event handling and grace
//! timers can touch them concurrently.

mod guild_config;
mod registry;

pub use guild_config::{GuildConfig, GuildConfigStore};
pub use registry::{ChannelRegistry, ManagedChannel};
