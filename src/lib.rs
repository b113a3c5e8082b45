//! autovoice - temporary voice-channel lifecycle manager.
//!
//! Provisions a personal voice room when a member joins a configured lobby
//! channel, relocates the member into it, and reclaims the room once it has
//! been empty for a grace period. The chat-platform client (gateway
//! connection, command registration) is supplied by the embedding binary
//! through the [`platform::PlatformGateway`] trait; this crate owns the
//! lifecycle rules, the per-guild configuration store, and the process
//! observability surfaces.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod metrics;
pub mod platform;
pub mod state;

pub use config::Config;
pub use error::{Error, PlatformError};
pub use lifecycle::LifecycleManager;
pub use platform::{ChannelId, GuildId, PlatformGateway, UserId, VoiceEvent};
pub use state::{ChannelRegistry, GuildConfig, GuildConfigStore};
