//! Process-wide mapping from guild to player, plus the dispatcher that
//! carries track-end notifications from the transport's context back into
//! each guild's serialized mutation path.

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use serenity::model::id::GuildId;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::error::{PlayerError, PlayerResult};
use crate::player::guild::GuildPlayer;
use crate::player::song::Song;
use crate::resolver::MediaResolver;
use crate::session::SessionContext;

/// Sent by a sink's completion callback exactly once per played stream.
/// `error` is `None` for a normal end (including an explicit stop).
#[derive(Debug)]
pub struct PlaybackEnded {
    pub guild_id: GuildId,
    pub error: Option<String>,
}

/// Owns every guild's player. One instance per process, injected into the
/// command layer.
pub struct PlayerRegistry {
    players: DashMap<GuildId, Arc<GuildPlayer>>,
    resolver: Arc<dyn MediaResolver>,
    events: UnboundedSender<PlaybackEnded>,
}

impl PlayerRegistry {
    /// Create the registry and spawn its completion-event dispatcher. Must
    /// be called from within a tokio runtime.
    pub fn new(resolver: Arc<dyn MediaResolver>) -> Arc<Self> {
        let (events, receiver) = mpsc::unbounded_channel();
        let registry = Arc::new(Self {
            players: DashMap::new(),
            resolver,
            events,
        });
        tokio::spawn(Self::dispatch(Arc::downgrade(&registry), receiver));
        registry
    }

    /// Look up the player for a guild. No side effects.
    pub fn get_player(&self, guild_id: GuildId) -> Option<Arc<GuildPlayer>> {
        self.players
            .get(&guild_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Allocate a player (with an empty queue) for the session's guild.
    /// Requires a live voice connection. A repeated call replaces the
    /// guild's existing player and discards its queue.
    pub fn create_player(&self, ctx: &SessionContext) -> PlayerResult<Arc<GuildPlayer>> {
        let sink = ctx.voice.clone().ok_or(PlayerError::NotConnectedToVoice)?;
        let player = Arc::new(GuildPlayer::new(
            ctx.guild_id,
            sink,
            self.resolver.clone(),
            self.events.clone(),
        ));
        if self
            .players
            .insert(ctx.guild_id, player.clone())
            .is_some()
        {
            warn!(
                "Replaced existing player for guild {}; its queue is discarded",
                ctx.guild_id
            );
        }
        info!("Created player for guild {}", ctx.guild_id);
        Ok(player)
    }

    /// The registry's usual entry point: the guild's player, created on
    /// first use.
    pub fn get_or_create(&self, ctx: &SessionContext) -> PlayerResult<Arc<GuildPlayer>> {
        match self.get_player(ctx.guild_id) {
            Some(player) => Ok(player),
            None => self.create_player(ctx),
        }
    }

    /// Every queued song for a guild, head first. A guild with no player at
    /// all yields `EmptyQueue`; a player with nothing queued yields an empty
    /// vector. Callers message the two differently.
    pub async fn current_queue(&self, guild_id: GuildId) -> PlayerResult<Vec<Song>> {
        let player = self.get_player(guild_id).ok_or(PlayerError::EmptyQueue)?;
        Ok(player.queued_songs().await)
    }

    /// Receive completion events and re-enter the owning guild's player.
    /// Holding only a weak handle lets the task end once the registry drops.
    async fn dispatch(registry: Weak<Self>, mut events: UnboundedReceiver<PlaybackEnded>) {
        while let Some(ended) = events.recv().await {
            let Some(registry) = registry.upgrade() else {
                break;
            };
            registry.handle_track_end(ended).await;
        }
        debug!("Playback event dispatcher stopped");
    }

    async fn handle_track_end(&self, ended: PlaybackEnded) {
        let Some(player) = self.get_player(ended.guild_id) else {
            warn!(
                "Track ended for guild {} with no registered player",
                ended.guild_id
            );
            return;
        };

        // Advance on success only; a transport error is reported and the
        // queue left for the user to retry.
        if let Some(message) = ended.error {
            player.handle_playback_error(&message).await;
            return;
        }

        match player.advance().await {
            Ok(()) => {}
            Err(PlayerError::EmptyQueue) => {
                debug!(
                    "Track ended for guild {} with nothing queued",
                    ended.guild_id
                );
            }
            Err(e) => error!(
                "Failed to advance the queue for guild {}: {}",
                ended.guild_id, e
            ),
        }
    }
}
