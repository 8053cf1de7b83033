//! Per-guild playback queues and player state machines for a Discord music
//! bot.
//!
//! The command layer of a bot hands a [`SessionContext`] to the
//! [`PlayerRegistry`], which owns one [`GuildPlayer`] per guild. Each player
//! keeps an ordered queue of resolved tracks and drives a [`VoiceSink`]
//! transport; when the transport finishes a track it reports back through a
//! completion callback, and the registry's dispatcher advances that guild's
//! queue under the guild's own lock.
//!
//! Media resolution ([`MediaResolver`]) and the voice transport
//! ([`VoiceSink`]) are trait seams: [`resolver::ytdlp::YtDlpResolver`] and
//! [`voice::songbird::SongbirdSink`] are the production implementations,
//! while tests substitute scripted fakes.

pub mod error;
pub mod player;
pub mod resolver;
pub mod session;
pub mod voice;

pub use error::{PlayerError, PlayerResult};
pub use player::guild::{GuildPlayer, PlaybackState};
pub use player::registry::{PlaybackEnded, PlayerRegistry};
pub use player::song::{AudioStream, PlayableSource, Song};
pub use resolver::MediaResolver;
pub use session::SessionContext;
pub use voice::{OnComplete, VoiceSink};
