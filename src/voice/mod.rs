//! The voice transport seam. [`VoiceSink`] is the contract a live voice
//! connection must satisfy; [`self::songbird::SongbirdSink`] implements it
//! on top of a songbird `Call`.

pub mod songbird;

use serenity::async_trait;

use crate::error::PlayerResult;
use crate::player::song::AudioStream;

/// Invoked by the sink exactly once when the stream handed to
/// [`VoiceSink::play`] finishes, with `None` on a normal end (including an
/// explicit stop) or the transport's error message otherwise.
///
/// The callback runs on whatever context the transport signals completion
/// from, so implementations must only hand the result off (e.g. over a
/// channel), never touch player state directly.
pub type OnComplete = Box<dyn FnOnce(Option<String>) + Send>;

/// A live connection into a voice channel.
#[async_trait]
pub trait VoiceSink: Send + Sync {
    /// Begin playing `stream` at `volume`, arming `on_complete` for when it
    /// ends. Replaces whatever the sink was previously playing.
    async fn play(
        &self,
        stream: &AudioStream,
        volume: f32,
        on_complete: OnComplete,
    ) -> PlayerResult<()>;

    /// Pause the current stream.
    async fn pause(&self) -> PlayerResult<()>;

    /// Resume a paused stream.
    async fn resume(&self) -> PlayerResult<()>;

    /// Halt the current stream. Triggers the armed completion callback.
    async fn stop(&self) -> PlayerResult<()>;

    /// Whether the transport is actively playing audio right now.
    async fn is_playing(&self) -> bool;
}
