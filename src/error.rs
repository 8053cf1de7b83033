use thiserror::Error;

/// Errors that can occur during playback operations
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Not connected to a voice channel")]
    NotConnectedToVoice,

    #[error("Nothing is playing")]
    NotPlaying,

    #[error("The queue is empty")]
    EmptyQueue,

    #[error("Failed to resolve media source: {0}")]
    Resolve(String),

    #[error("Playback error: {0}")]
    Playback(String),
}

/// Result type for playback operations
pub type PlayerResult<T> = Result<T, PlayerError>;
