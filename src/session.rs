use std::sync::Arc;

use serenity::model::id::{GuildId, UserId};

use crate::voice::VoiceSink;

/// Everything the command layer knows about one command invocation: which
/// guild it came from, who issued it, and the live voice connection for that
/// guild, if any.
#[derive(Clone)]
pub struct SessionContext {
    pub guild_id: GuildId,
    pub user_id: UserId,
    /// The guild's voice transport. `None` until the bot has joined a voice
    /// channel; player creation requires it.
    pub voice: Option<Arc<dyn VoiceSink>>,
}

impl SessionContext {
    pub fn new(guild_id: GuildId, user_id: UserId, voice: Option<Arc<dyn VoiceSink>>) -> Self {
        Self {
            guild_id,
            user_id,
            voice,
        }
    }
}
