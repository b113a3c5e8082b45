//! Integration test common infrastructure.
//!
//! Provides a scriptable in-memory platform gateway and a helper for wiring
//! up a lifecycle manager against it.

use async_trait::async_trait;
use autovoice::config::ManagerConfig;
use autovoice::platform::{CreateVoiceChannel, PermissionGrant};
use autovoice::{
    ChannelId, ChannelRegistry, GuildConfigStore, GuildId, LifecycleManager, PlatformError,
    PlatformGateway, UserId,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Record of one create call observed by the mock.
#[derive(Debug, Clone)]
pub struct CreatedChannel {
    pub id: ChannelId,
    pub guild: GuildId,
    pub name: String,
    pub category: Option<ChannelId>,
    pub user_limit: Option<u16>,
    pub grants: Vec<PermissionGrant>,
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    created: Vec<CreatedChannel>,
    deleted: Vec<ChannelId>,
    moves: Vec<(UserId, ChannelId)>,
    occupancy: HashMap<ChannelId, u32>,
    categories: HashMap<ChannelId, Option<ChannelId>>,
    existing: HashSet<ChannelId>,
    fail_create: Option<PlatformError>,
    fail_move: bool,
    fail_delete: bool,
    fail_occupancy: bool,
}

/// Scriptable platform double. Channels created through it get sequential
/// ids starting at 9000 and zero occupants.
pub struct MockGateway {
    state: Mutex<MockState>,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockState {
                next_id: 9000,
                ..MockState::default()
            }),
        })
    }

    /// Declare a pre-existing (static) channel such as a lobby or category.
    pub fn add_channel(&self, id: ChannelId, category: Option<ChannelId>) {
        let mut state = self.state.lock();
        state.existing.insert(id);
        state.categories.insert(id, category);
        state.occupancy.insert(id, 0);
    }

    pub fn set_occupancy(&self, id: ChannelId, count: u32) {
        self.state.lock().occupancy.insert(id, count);
    }

    pub fn set_fail_create(&self, error: PlatformError) {
        self.state.lock().fail_create = Some(error);
    }

    pub fn set_fail_move(&self, fail: bool) {
        self.state.lock().fail_move = fail;
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.state.lock().fail_delete = fail;
    }

    pub fn set_fail_occupancy(&self, fail: bool) {
        self.state.lock().fail_occupancy = fail;
    }

    pub fn created(&self) -> Vec<CreatedChannel> {
        self.state.lock().created.clone()
    }

    pub fn deleted(&self) -> Vec<ChannelId> {
        self.state.lock().deleted.clone()
    }

    pub fn moves(&self) -> Vec<(UserId, ChannelId)> {
        self.state.lock().moves.clone()
    }
}

#[async_trait]
impl PlatformGateway for MockGateway {
    async fn create_voice_channel(
        &self,
        guild: GuildId,
        req: CreateVoiceChannel,
    ) -> Result<ChannelId, PlatformError> {
        let mut state = self.state.lock();
        if let Some(error) = state.fail_create.clone() {
            return Err(error);
        }

        let id = ChannelId(state.next_id);
        state.next_id += 1;
        state.existing.insert(id);
        state.occupancy.insert(id, 0);
        state.categories.insert(id, req.category);
        state.created.push(CreatedChannel {
            id,
            guild,
            name: req.name,
            category: req.category,
            user_limit: req.user_limit,
            grants: req.grants,
        });
        Ok(id)
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        if state.fail_delete {
            return Err(PlatformError::Denied("missing manage_channels".into()));
        }
        state.existing.remove(&channel);
        state.occupancy.remove(&channel);
        state.deleted.push(channel);
        Ok(())
    }

    async fn move_member(
        &self,
        _guild: GuildId,
        member: UserId,
        channel: ChannelId,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        if state.fail_move {
            return Err(PlatformError::Unavailable("member not connected".into()));
        }
        *state.occupancy.entry(channel).or_insert(0) += 1;
        state.moves.push((member, channel));
        Ok(())
    }

    async fn occupancy(&self, channel: ChannelId) -> Result<u32, PlatformError> {
        let state = self.state.lock();
        if state.fail_occupancy {
            return Err(PlatformError::Unavailable("occupancy probe failed".into()));
        }
        state
            .occupancy
            .get(&channel)
            .copied()
            .ok_or_else(|| PlatformError::Unavailable("unknown channel".into()))
    }

    async fn category_of(&self, channel: ChannelId) -> Result<Option<ChannelId>, PlatformError> {
        Ok(self
            .state
            .lock()
            .categories
            .get(&channel)
            .copied()
            .flatten())
    }

    async fn channel_exists(&self, channel: ChannelId) -> Result<bool, PlatformError> {
        Ok(self.state.lock().existing.contains(&channel))
    }
}

/// A lifecycle manager wired to a fresh mock gateway and tempdir-backed
/// config store. The returned tempdir keeps the store path alive.
pub struct TestHarness {
    pub manager: Arc<LifecycleManager>,
    pub gateway: Arc<MockGateway>,
    pub registry: Arc<ChannelRegistry>,
    pub configs: Arc<GuildConfigStore>,
    _dir: tempfile::TempDir,
}

pub fn setup(grace_period_ms: u64) -> TestHarness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let dir = tempfile::tempdir().expect("tempdir");
    let gateway = MockGateway::new();
    let configs = Arc::new(GuildConfigStore::load(dir.path().join("guilds.json")));
    let registry = Arc::new(ChannelRegistry::new());
    let manager = Arc::new(LifecycleManager::new(
        gateway.clone(),
        configs.clone(),
        registry.clone(),
        &ManagerConfig { grace_period_ms },
    ));

    TestHarness {
        manager,
        gateway,
        registry,
        configs,
        _dir: dir,
    }
}
