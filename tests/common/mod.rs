#![allow(dead_code)]

//! Shared fixtures, mocks, and harness setup for the integration suite.

pub mod fixtures;
pub mod mocks;

use std::sync::{Arc, Once};
use std::time::Duration;

use serenity::model::id::{GuildId, UserId};
use spindle::{GuildPlayer, PlayerRegistry, SessionContext};

use self::mocks::{ScriptedSink, StubResolver};

static INIT: Once = Once::new();

/// Initialize tracing for tests
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("spindle=debug")
            .with_test_writer()
            .init();
    });
}

pub const TEST_GUILD: u64 = 1;
pub const TEST_USER: u64 = 7;

pub fn test_guild() -> GuildId {
    GuildId::new(TEST_GUILD)
}

pub fn test_user() -> UserId {
    UserId::new(TEST_USER)
}

/// A registry wired to a scripted sink and stub resolver, with one player
/// created for [`test_guild`].
pub struct Harness {
    pub registry: Arc<PlayerRegistry>,
    pub resolver: Arc<StubResolver>,
    pub sink: Arc<ScriptedSink>,
    pub player: Arc<GuildPlayer>,
}

impl Harness {
    pub async fn new() -> Self {
        init();
        let resolver = Arc::new(StubResolver::new());
        let sink = Arc::new(ScriptedSink::new());
        let registry = PlayerRegistry::new(resolver.clone());
        let ctx = SessionContext::new(test_guild(), test_user(), Some(sink.clone()));
        let player = registry.create_player(&ctx).expect("player creation");
        Self {
            registry,
            resolver,
            sink,
            player,
        }
    }

    /// Harness with `titles` already resolved and queued, head first.
    pub async fn with_queue(titles: &[&str]) -> Self {
        let harness = Self::new().await;
        for title in titles {
            harness.resolver.stub(title, fixtures::source(title));
            harness
                .player
                .enqueue(title, Some(test_user()))
                .await
                .expect("enqueue");
        }
        harness
    }
}

/// Give the registry's event dispatcher a chance to drain pending
/// completions.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
