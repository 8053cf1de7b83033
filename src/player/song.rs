//! Resolved track data: [`Song`] metadata, the [`AudioStream`] handle behind
//! it, and the [`PlayableSource`] pairing that lives in a guild's queue.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serenity::model::id::UserId;

/// Playback volume applied to every track unless a caller overrides it.
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Resolved, immutable metadata for one track.
///
/// Everything here is fixed at resolution time except `started_at`, which is
/// stamped exactly when playback of the song begins and backs the
/// playback-position display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Song {
    /// Display title of the track.
    pub title: String,
    /// Canonical page URL (e.g. the YouTube watch URL).
    pub url: String,
    /// Uploader-provided description.
    pub description: String,
    /// Track length.
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    /// Human-readable track length as reported by the extractor ("3:42").
    pub duration_text: String,
    /// Upload date as reported by the extractor (`YYYYMMDD`).
    pub upload_date: String,
    /// URL to a thumbnail image for the track.
    pub thumbnail: String,
    /// Name of the channel that published the track.
    pub channel: String,
    /// URL of the publishing channel.
    pub channel_url: String,
    /// Like count at resolution time.
    pub likes: u64,
    /// View count at resolution time.
    pub views: u64,
    /// The user who requested the track, if known.
    pub requested_by: Option<UserId>,
    /// Whether the track should loop. Stored for display; the queue itself
    /// never re-inserts entries.
    pub looping: bool,
    /// When playback of this song last began.
    pub started_at: Option<DateTime<Utc>>,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            title: "Unknown Track".to_string(),
            url: String::new(),
            description: String::new(),
            duration: Duration::ZERO,
            duration_text: String::new(),
            upload_date: String::new(),
            thumbnail: String::new(),
            channel: String::new(),
            channel_url: String::new(),
            likes: 0,
            views: 0,
            requested_by: None,
            looping: false,
            started_at: None,
        }
    }
}

impl Song {
    /// Stamp the song as having started playing now.
    pub(crate) fn mark_started(&mut self) {
        self.started_at = Some(Utc::now());
    }

    /// How long the song has been playing, or `None` if it never started.
    pub fn elapsed(&self) -> Option<Duration> {
        let started = self.started_at?;
        (Utc::now() - started).to_std().ok()
    }
}

/// Handle to the actual audio data behind a song: the direct media stream
/// URL picked by the extractor. The voice sink turns it into a decodable
/// input when the track starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioStream {
    pub url: String,
}

impl AudioStream {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// One queue entry: a song, the stream that plays it, and the volume to play
/// it at. Each entry owns its stream exclusively.
#[derive(Debug, Clone)]
pub struct PlayableSource {
    pub song: Song,
    pub stream: AudioStream,
    pub volume: f32,
}

impl PlayableSource {
    pub fn new(song: Song, stream: AudioStream) -> Self {
        Self {
            song,
            stream,
            volume: DEFAULT_VOLUME,
        }
    }
}
