//! [`VoiceSink`] on top of a songbird [`Call`]. Track-end and track-error
//! events are translated into the exactly-once completion callback.

use std::sync::{Arc, LazyLock, Mutex as StdMutex};

use serenity::async_trait;
use songbird::input::HttpRequest;
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Call, Event, EventContext, EventHandler, TrackEvent};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{PlayerError, PlayerResult};
use crate::player::song::AudioStream;
use crate::voice::{OnComplete, VoiceSink};

/// Shared HTTP client handed to songbird inputs.
static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

/// Production sink for one guild's voice connection.
pub struct SongbirdSink {
    call: Arc<Mutex<Call>>,
    current: Mutex<Option<TrackHandle>>,
}

impl SongbirdSink {
    pub fn new(call: Arc<Mutex<Call>>) -> Self {
        Self {
            call,
            current: Mutex::new(None),
        }
    }
}

#[async_trait]
impl VoiceSink for SongbirdSink {
    async fn play(
        &self,
        stream: &AudioStream,
        volume: f32,
        on_complete: OnComplete,
    ) -> PlayerResult<()> {
        let input = HttpRequest::new(HTTP_CLIENT.clone(), stream.url.clone());
        let handle = {
            let mut call = self.call.lock().await;
            call.play_input(input.into())
        };
        handle
            .set_volume(volume)
            .map_err(|e| PlayerError::Playback(e.to_string()))?;

        // End and Error share one FnOnce slot so the callback fires exactly
        // once whichever event songbird delivers.
        let notifier = TrackEndNotifier {
            on_complete: Arc::new(StdMutex::new(Some(on_complete))),
        };
        handle
            .add_event(Event::Track(TrackEvent::End), notifier.clone())
            .map_err(|e| PlayerError::Playback(e.to_string()))?;
        handle
            .add_event(Event::Track(TrackEvent::Error), notifier)
            .map_err(|e| PlayerError::Playback(e.to_string()))?;

        *self.current.lock().await = Some(handle);
        Ok(())
    }

    async fn pause(&self) -> PlayerResult<()> {
        match self.current.lock().await.as_ref() {
            Some(track) => track
                .pause()
                .map_err(|e| PlayerError::Playback(e.to_string())),
            None => Err(PlayerError::NotPlaying),
        }
    }

    async fn resume(&self) -> PlayerResult<()> {
        match self.current.lock().await.as_ref() {
            Some(track) => track
                .play()
                .map_err(|e| PlayerError::Playback(e.to_string())),
            None => Err(PlayerError::NotPlaying),
        }
    }

    async fn stop(&self) -> PlayerResult<()> {
        match self.current.lock().await.take() {
            Some(track) => track
                .stop()
                .map_err(|e| PlayerError::Playback(e.to_string())),
            None => Err(PlayerError::NotPlaying),
        }
    }

    async fn is_playing(&self) -> bool {
        let current = self.current.lock().await;
        let Some(track) = current.as_ref() else {
            return false;
        };
        match track.get_info().await {
            Ok(info) => info.playing == PlayMode::Play,
            Err(_) => false,
        }
    }
}

/// Songbird event handler that fires the completion callback once, with the
/// track's error if it ended in `PlayMode::Errored`.
#[derive(Clone)]
struct TrackEndNotifier {
    on_complete: Arc<StdMutex<Option<OnComplete>>>,
}

#[async_trait]
impl EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        let EventContext::Track(tracks) = ctx else {
            return None;
        };
        let error = tracks.iter().find_map(|(state, _)| match &state.playing {
            PlayMode::Errored(e) => Some(e.to_string()),
            _ => None,
        });

        let callback = match self.on_complete.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        match callback {
            Some(on_complete) => on_complete(error),
            None => debug!("Completion already fired for this track"),
        }
        None
    }
}
