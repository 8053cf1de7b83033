//! [`MediaResolver`] backed by the `yt-dlp` command-line tool. Free-text
//! queries go through yt-dlp's own `ytsearch:` mode; URLs are extracted
//! directly.

use std::time::Duration;

use dashmap::DashMap;
use serenity::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{MediaResolver, is_url};
use crate::error::{PlayerError, PlayerResult};
use crate::player::song::{AudioStream, PlayableSource, Song};

/// Resolver that shells out to `yt-dlp` and keeps an in-process metadata
/// cache keyed by canonical track URL.
#[derive(Default)]
pub struct YtDlpResolver {
    cache: DashMap<String, Song>,
}

impl YtDlpResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata from an earlier resolution of the same canonical URL, if
    /// any. Display-only: playback always re-resolves so the stream URL is
    /// fresh.
    pub fn cached_metadata(&self, url: &str) -> Option<Song> {
        self.cache.get(url).map(|entry| entry.value().clone())
    }

    async fn extract(&self, target: &str) -> PlayerResult<(Song, AudioStream)> {
        let output = Command::new("yt-dlp")
            .args([
                "-j",            // Output as JSON
                "--no-playlist", // Don't process playlists
                target,
            ])
            .output()
            .await
            .map_err(|e| PlayerError::Resolve(format!("Failed to run yt-dlp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlayerError::Resolve(format!(
                "yt-dlp exited with an error: {}",
                stderr.trim()
            )));
        }

        parse_extractor_output(&output.stdout)
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    async fn resolve(&self, query: &str) -> PlayerResult<PlayableSource> {
        let target = if is_url(query) {
            query.to_string()
        } else {
            format!("ytsearch:{}", query)
        };
        info!("Resolving media for query: {}", query);

        let (song, stream) = self.extract(&target).await?;
        debug!("Resolved '{}' ({})", song.title, song.url);
        self.cache.insert(song.url.clone(), song.clone());

        Ok(PlayableSource::new(song, stream))
    }
}

/// Convert `yt-dlp -j` output into a song plus its stream handle. Fields
/// other than the stream URL fall back to defaults when missing.
fn parse_extractor_output(stdout: &[u8]) -> PlayerResult<(Song, AudioStream)> {
    let text = String::from_utf8_lossy(stdout);
    let data: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| PlayerError::Resolve(format!("Failed to parse video metadata: {}", e)))?;

    let stream_url = data["url"]
        .as_str()
        .ok_or_else(|| PlayerError::Resolve("Video metadata is missing a stream URL".into()))?;

    let url = match data["webpage_url"].as_str() {
        Some(page) => page.to_string(),
        None => format!(
            "https://www.youtube.com/watch?v={}",
            data["id"].as_str().unwrap_or_default()
        ),
    };

    let song = Song {
        title: data["title"].as_str().unwrap_or("Unknown Title").to_string(),
        url,
        description: data["description"].as_str().unwrap_or_default().to_string(),
        duration: Duration::from_secs_f64(data["duration"].as_f64().unwrap_or(0.0)),
        duration_text: data["duration_string"].as_str().unwrap_or_default().to_string(),
        upload_date: data["upload_date"].as_str().unwrap_or_default().to_string(),
        thumbnail: data["thumbnail"].as_str().unwrap_or_default().to_string(),
        channel: data["uploader"].as_str().unwrap_or("Unknown Channel").to_string(),
        channel_url: data["uploader_url"].as_str().unwrap_or_default().to_string(),
        likes: data["like_count"].as_u64().unwrap_or(0),
        views: data["view_count"].as_u64().unwrap_or(0),
        ..Song::default()
    };

    Ok((song, AudioStream::new(stream_url)))
}
