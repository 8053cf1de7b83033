//! The media-resolution seam. A [`MediaResolver`] turns whatever the user
//! typed into a playable source; [`ytdlp::YtDlpResolver`] is the production
//! implementation.

pub mod ytdlp;

use serenity::async_trait;
use url::Url;

use crate::error::PlayerResult;
use crate::player::song::PlayableSource;

/// Resolves a URL or free-text search query into one playable source.
/// Resolution may block on network or subprocess I/O, so callers keep it off
/// any lock that serializes queue mutations.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> PlayerResult<PlayableSource>;
}

/// Basic check whether the input parses as a URL. Does not validate that the
/// URL is reachable or supported by the extractor.
pub fn is_url(input: &str) -> bool {
    Url::parse(input).is_ok()
}
