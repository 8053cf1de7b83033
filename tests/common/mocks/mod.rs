//! Mock implementations of the crate's trait seams: a scripted voice sink
//! whose completions fire under test control, and resolver doubles.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use mockall::mock;
use serenity::async_trait;
use spindle::{AudioStream, MediaResolver, OnComplete, PlayableSource, PlayerError, PlayerResult, VoiceSink};

/// Every instruction a [`ScriptedSink`] has received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCommand {
    Play(String),
    Pause,
    Resume,
    Stop,
}

/// A voice sink that records what it is told and completes tracks only when
/// the test says so. `stop` fires the armed completion with a success, the
/// way a real transport reports a stopped track as ended.
pub struct ScriptedSink {
    commands: Mutex<Vec<SinkCommand>>,
    pending: Mutex<Option<OnComplete>>,
    playing: AtomicBool,
    refuse_play: AtomicBool,
    refuse_stop: AtomicBool,
}

impl ScriptedSink {
    pub fn new() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
            playing: AtomicBool::new(false),
            refuse_play: AtomicBool::new(false),
            refuse_stop: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `play` fail without arming a completion, the
    /// way a transport rejects an input it cannot start.
    pub fn refuse_plays(&self) {
        self.refuse_play.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent `stop` fail without firing a completion, the
    /// way a transport with a dead track handle reports `NotPlaying`.
    pub fn refuse_stops(&self) {
        self.refuse_stop.store(true, Ordering::SeqCst);
    }

    pub fn commands(&self) -> Vec<SinkCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Simulate the current track finishing on the transport's own context.
    /// Does nothing if no completion is armed (e.g. it already fired).
    pub fn finish(&self, error: Option<&str>) {
        let callback = self.pending.lock().unwrap().take();
        if let Some(on_complete) = callback {
            self.playing.store(false, Ordering::SeqCst);
            on_complete(error.map(str::to_string));
        }
    }

    fn record(&self, command: SinkCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

#[async_trait]
impl VoiceSink for ScriptedSink {
    async fn play(
        &self,
        stream: &AudioStream,
        _volume: f32,
        on_complete: OnComplete,
    ) -> PlayerResult<()> {
        self.record(SinkCommand::Play(stream.url.clone()));
        if self.refuse_play.load(Ordering::SeqCst) {
            return Err(PlayerError::Playback("input rejected".to_string()));
        }
        *self.pending.lock().unwrap() = Some(on_complete);
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&self) -> PlayerResult<()> {
        self.record(SinkCommand::Pause);
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&self) -> PlayerResult<()> {
        self.record(SinkCommand::Resume);
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> PlayerResult<()> {
        self.record(SinkCommand::Stop);
        if self.refuse_stop.load(Ordering::SeqCst) {
            return Err(PlayerError::NotPlaying);
        }
        self.finish(None);
        Ok(())
    }

    async fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

/// Resolver returning canned sources by exact query.
pub struct StubResolver {
    responses: Mutex<HashMap<String, PlayableSource>>,
}

impl StubResolver {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
        }
    }

    pub fn stub(&self, query: &str, source: PlayableSource) {
        self.responses
            .lock()
            .unwrap()
            .insert(query.to_string(), source);
    }
}

#[async_trait]
impl MediaResolver for StubResolver {
    async fn resolve(&self, query: &str) -> PlayerResult<PlayableSource> {
        self.responses
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .ok_or_else(|| PlayerError::Resolve(format!("no result for '{}'", query)))
    }
}

mock! {
    pub Resolver {}

    #[async_trait]
    impl MediaResolver for Resolver {
        async fn resolve(&self, query: &str) -> PlayerResult<PlayableSource>;
    }
}
