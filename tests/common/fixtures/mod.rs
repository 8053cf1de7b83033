//! Canned track data used across the integration suite.

use std::time::Duration;

use spindle::{AudioStream, PlayableSource, Song};

/// A resolved song whose identifying fields derive from `title`.
pub fn song(title: &str) -> Song {
    Song {
        title: title.to_string(),
        url: format!("https://www.youtube.com/watch?v={}", title),
        duration: Duration::from_secs(180),
        duration_text: "3:00".to_string(),
        channel: "Test Channel".to_string(),
        channel_url: "https://www.youtube.com/@testchannel".to_string(),
        ..Song::default()
    }
}

/// A queue entry for `title`, with a stream URL derived from it.
pub fn source(title: &str) -> PlayableSource {
    PlayableSource::new(song(title), AudioStream::new(stream_url(title)))
}

pub fn stream_url(title: &str) -> String {
    format!("https://cdn.test/{}", title)
}
