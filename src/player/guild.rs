//! One guild's player: the ordered queue, the playback state machine, and
//! the operations the command layer drives them with.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use serenity::model::id::{GuildId, UserId};
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

use crate::error::{PlayerError, PlayerResult};
use crate::player::registry::PlaybackEnded;
use crate::player::song::{PlayableSource, Song};
use crate::resolver::MediaResolver;
use crate::voice::{OnComplete, VoiceSink};

/// What the guild's transport is doing, tracked explicitly alongside every
/// transport call instead of being re-derived from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

/// Queue and state, guarded by one mutex per guild. Command-issued and
/// completion-issued mutations both go through this lock.
struct Inner {
    queue: VecDeque<PlayableSource>,
    state: PlaybackState,
}

/// Playback session for a single guild. Created by the registry once a
/// voice connection exists; lives for the rest of the process.
pub struct GuildPlayer {
    guild_id: GuildId,
    sink: Arc<dyn VoiceSink>,
    resolver: Arc<dyn MediaResolver>,
    events: UnboundedSender<PlaybackEnded>,
    inner: Mutex<Inner>,
}

impl fmt::Debug for GuildPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuildPlayer")
            .field("guild_id", &self.guild_id)
            .finish_non_exhaustive()
    }
}

impl GuildPlayer {
    pub(crate) fn new(
        guild_id: GuildId,
        sink: Arc<dyn VoiceSink>,
        resolver: Arc<dyn MediaResolver>,
        events: UnboundedSender<PlaybackEnded>,
    ) -> Self {
        Self {
            guild_id,
            sink,
            resolver,
            events,
            inner: Mutex::new(Inner {
                queue: VecDeque::new(),
                state: PlaybackState::Idle,
            }),
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// Resolve `query` and append it to the tail of the queue. Does not
    /// start playback.
    pub async fn enqueue(&self, query: &str, requested_by: Option<UserId>) -> PlayerResult<Song> {
        // Resolution shells out to the extractor; keep it off the guild lock
        // so concurrent commands are not starved.
        let mut source = self.resolver.resolve(query).await?;
        source.song.requested_by = requested_by;
        let song = source.song.clone();

        let mut inner = self.inner.lock().await;
        inner.queue.push_back(source);
        info!(
            "Queued '{}' for guild {} at position {}",
            song.title,
            self.guild_id,
            inner.queue.len() - 1
        );
        Ok(song)
    }

    /// Start playing the queue head, arming the completion callback that
    /// will advance the queue when the track ends.
    ///
    /// Callers are expected not to invoke this while the transport is
    /// already playing; that precondition is not re-checked here.
    pub async fn play(&self) -> PlayerResult<Song> {
        let mut inner = self.inner.lock().await;
        let (stream, volume) = match inner.queue.front() {
            Some(head) => (head.stream.clone(), head.volume),
            None => return Err(PlayerError::EmptyQueue),
        };

        self.sink
            .play(&stream, volume, self.completion_hook())
            .await?;

        // The lock is held across the transport call, so the head is still
        // in place; it is only stamped once the transport has the track.
        let head = inner.queue.front_mut().ok_or(PlayerError::EmptyQueue)?;
        head.song.mark_started();
        let song = head.song.clone();
        inner.state = PlaybackState::Playing;
        info!("Now playing '{}' for guild {}", song.title, self.guild_id);
        Ok(song)
    }

    /// Halt the transport and discard the entire queue.
    pub async fn stop(&self) -> PlayerResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.queue.is_empty() {
            return Err(PlayerError::NotPlaying);
        }

        // The transport may have no live handle to stop (track already ended
        // or errored); the queue is discarded either way.
        if let Err(err) = self.sink.stop().await {
            debug!(
                "Transport stop failed for guild {}: {}",
                self.guild_id, err
            );
        }
        inner.queue.clear();
        inner.state = PlaybackState::Idle;
        info!(
            "Stopped playback and cleared the queue for guild {}",
            self.guild_id
        );
        Ok(())
    }

    /// Pause the current track, returning its song for display.
    pub async fn pause(&self) -> PlayerResult<Song> {
        let mut inner = self.inner.lock().await;
        let song = inner
            .queue
            .front()
            .map(|source| source.song.clone())
            .ok_or(PlayerError::NotPlaying)?;

        self.sink.pause().await?;
        inner.state = PlaybackState::Paused;
        info!("Paused '{}' for guild {}", song.title, self.guild_id);
        Ok(song)
    }

    /// Resume a paused track, returning its song for display.
    pub async fn resume(&self) -> PlayerResult<Song> {
        let mut inner = self.inner.lock().await;
        let song = inner
            .queue
            .front()
            .map(|source| source.song.clone())
            .ok_or(PlayerError::NotPlaying)?;

        self.sink.resume().await?;
        inner.state = PlaybackState::Playing;
        info!("Resumed '{}' for guild {}", song.title, self.guild_id);
        Ok(song)
    }

    /// Skip to the next queued track. Returns the song that will play next,
    /// or `None` (without touching the queue) when nothing is queued behind
    /// the current track.
    ///
    /// The head is not removed here: stopping the transport fires the
    /// completion callback, and the advance path does the removal.
    pub async fn skip(&self) -> PlayerResult<Option<Song>> {
        let inner = self.inner.lock().await;
        let Some(next) = inner.queue.get(1).map(|source| source.song.clone()) else {
            debug!("Nothing to skip to for guild {}", self.guild_id);
            return Ok(None);
        };

        self.sink.stop().await?;
        info!(
            "Skipping to '{}' for guild {}",
            next.title, self.guild_id
        );
        Ok(Some(next))
    }

    /// Remove the entry at `index` (0 = currently playing), returning its
    /// song. Index 0 goes through the skip path; with a single entry queued
    /// there is nothing to skip to and playback continues untouched.
    pub async fn remove(&self, index: usize) -> PlayerResult<Song> {
        let mut inner = self.inner.lock().await;
        let song = inner
            .queue
            .get(index)
            .map(|source| source.song.clone())
            .ok_or(PlayerError::NotPlaying)?;

        if index == 0 {
            if inner.queue.len() > 1 {
                // Removal of the head happens in the advance path once the
                // stop completion comes back.
                self.sink.stop().await?;
            }
        } else {
            let _ = inner.queue.remove(index);
        }
        info!(
            "Removed '{}' (position {}) for guild {}",
            song.title, index, self.guild_id
        );
        Ok(song)
    }

    /// The currently playing (or about-to-play) song, if any. Never errors.
    pub async fn now_playing(&self) -> Option<Song> {
        let inner = self.inner.lock().await;
        inner.queue.front().map(|source| source.song.clone())
    }

    /// Snapshot of every queued song, head first.
    pub async fn queued_songs(&self) -> Vec<Song> {
        let inner = self.inner.lock().await;
        inner.queue.iter().map(|source| source.song.clone()).collect()
    }

    /// Number of queued entries, including the playing head.
    pub async fn queue_len(&self) -> usize {
        self.inner.lock().await.queue.len()
    }

    pub async fn state(&self) -> PlaybackState {
        self.inner.lock().await.state
    }

    /// Advance after a successful track completion: drop the finished head
    /// and start the next entry, re-arming the completion callback.
    ///
    /// Returns `EmptyQueue` when a racing stop or remove already emptied the
    /// queue; the caller treats that as a benign outcome.
    pub(crate) async fn advance(&self) -> PlayerResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.queue.pop_front().is_none() {
            inner.state = PlaybackState::Idle;
            return Err(PlayerError::EmptyQueue);
        }

        let (stream, volume) = match inner.queue.front() {
            Some(next) => (next.stream.clone(), next.volume),
            None => {
                inner.state = PlaybackState::Idle;
                debug!("Queue drained for guild {}", self.guild_id);
                return Ok(());
            }
        };

        // A refused hand-off leaves nothing playing and no completion to
        // wait for, so the state must fall back to idle.
        if let Err(err) = self
            .sink
            .play(&stream, volume, self.completion_hook())
            .await
        {
            inner.state = PlaybackState::Idle;
            return Err(err);
        }

        if let Some(next) = inner.queue.front_mut() {
            next.song.mark_started();
            info!(
                "Advanced to '{}' for guild {}",
                next.song.title, self.guild_id
            );
        }
        inner.state = PlaybackState::Playing;
        Ok(())
    }

    /// A track completion carried a transport error: report it and leave the
    /// queue as-is so the user can retry. No advance, no automatic retry.
    pub(crate) async fn handle_playback_error(&self, message: &str) {
        let mut inner = self.inner.lock().await;
        inner.state = PlaybackState::Idle;
        error!("Playback failed for guild {}: {}", self.guild_id, message);
    }

    /// Build the exactly-once completion callback handed to the sink. It
    /// runs on the transport's notification context, so it only forwards the
    /// outcome over the registry's event channel.
    fn completion_hook(&self) -> OnComplete {
        let events = self.events.clone();
        let guild_id = self.guild_id;
        Box::new(move |error| {
            let _ = events.send(PlaybackEnded { guild_id, error });
        })
    }
}
