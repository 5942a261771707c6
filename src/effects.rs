use crate::ledger::{Outcome, PhaseSignal};
use std::{
    collections::HashSet,
    fmt, io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use thiserror::Error;
use tracing::warn;


/// The spinning loop starts shortly after the flip, once the launch clip
/// has had its moment.
pub const SPIN_CUE_DELAY: Duration = Duration::from_millis(300);
/// How long the spinning loop runs before its fire-and-forget stop.
pub const SPIN_CUE_DURATION: Duration = Duration::from_millis(1700);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CueId {
    FlipStart,
    FlipSpinning,
    FlipLand,
    Win,
    Lose,
}

impl CueId {
    pub const ALL: [CueId; 5] = [
        CueId::FlipStart,
        CueId::FlipSpinning,
        CueId::FlipLand,
        CueId::Win,
        CueId::Lose,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CueId::FlipStart => "flip-start",
            CueId::FlipSpinning => "flip-spinning",
            CueId::FlipLand => "flip-land",
            CueId::Win => "win",
            CueId::Lose => "lose",
        }
    }
}

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackOptions {
    pub volume: f32,
    pub looped: bool,
    pub duration: Option<Duration>,
}

impl PlaybackOptions {
    pub fn volume(volume: f32) -> Self {
        PlaybackOptions {
            volume,
            looped: false,
            duration: None,
        }
    }

    pub fn looping(volume: f32, duration: Duration) -> Self {
        PlaybackOptions {
            volume,
            looped: true,
            duration: Some(duration),
        }
    }
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        PlaybackOptions::volume(1.0)
    }
}

/// A cue to trigger some delay after the phase boundary that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedCue {
    pub cue: CueId,
    pub delay: Duration,
    pub options: PlaybackOptions,
}

/// Map a ledger phase signal to its presentation cues. Pure; the emitter
/// and scheduler decide whether and when anything is audible.
pub fn cue_plan(signal: &PhaseSignal) -> Vec<TimedCue> {
    match signal {
        PhaseSignal::WagerStarted { .. } => vec![
            TimedCue {
                cue: CueId::FlipStart,
                delay: Duration::ZERO,
                options: PlaybackOptions::volume(0.7),
            },
            TimedCue {
                cue: CueId::FlipSpinning,
                delay: SPIN_CUE_DELAY,
                options: PlaybackOptions::looping(0.5, SPIN_CUE_DURATION),
            },
        ],
        PhaseSignal::OutcomeDrawn { .. } => vec![TimedCue {
            cue: CueId::FlipLand,
            delay: Duration::ZERO,
            options: PlaybackOptions::volume(0.8),
        }],
        PhaseSignal::WagerResolved { record } => {
            let cue = match record.outcome {
                Outcome::Win => CueId::Win,
                Outcome::Lose => CueId::Lose,
            };
            vec![TimedCue {
                cue,
                delay: Duration::ZERO,
                options: PlaybackOptions::volume(0.7),
            }]
        }
    }
}

#[derive(Debug, Error)]
pub enum CueError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read cue asset {path}: {source}")]
    Fetch {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to decode cue asset {path}")]
    Decode { path: PathBuf },
}

/// Playback seam in the shape of the browser audio stack: acquire a
/// context, fetch-and-decode buffers, then play them with gain and loop
/// settings. Playback is fire-and-forget; nothing here blocks the caller.
pub trait AudioBackend {
    fn acquire(&mut self) -> Result<(), CueError>;
    fn load(&mut self, cue: CueId, path: &Path) -> Result<(), CueError>;
    fn play(&mut self, cue: CueId, options: &PlaybackOptions);
    fn stop(&mut self, cue: CueId);
    fn resume(&mut self);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum EmitterState {
    Uninitialized,
    Ready,
    Unavailable,
}

/// Owns the audio backend and the per-cue enablement state. Strictly
/// downstream of the ledger: a failed or silenced cue never propagates.
///
/// Resources are acquired lazily on the first dispatch (or an explicit
/// [`EffectEmitter::initialize`] from a context allowed to start audio).
/// A cue whose asset fails to load is logged once and stays a silent no-op;
/// there is no retry.
#[derive(Debug)]
pub struct EffectEmitter<B> {
    backend: B,
    assets: crate::audio::CueAssets,
    state: EmitterState,
    muted: bool,
    disabled: HashSet<CueId>,
    degraded: HashSet<CueId>,
}

impl<B: AudioBackend> EffectEmitter<B> {
    pub fn new(backend: B, assets: crate::audio::CueAssets) -> Self {
        EffectEmitter {
            backend,
            assets,
            state: EmitterState::Uninitialized,
            muted: false,
            disabled: HashSet::new(),
            degraded: HashSet::new(),
        }
    }

    /// Acquire the backend and load every cue. Idempotent; a second call
    /// after any outcome is a no-op.
    pub fn initialize(&mut self) {
        if self.state != EmitterState::Uninitialized {
            return;
        }
        if let Err(err) = self.backend.acquire() {
            warn!(%err, "audio unavailable, all cues silenced");
            self.state = EmitterState::Unavailable;
            return;
        }
        for cue in CueId::ALL {
            if let Err(err) = self.backend.load(cue, self.assets.path(cue)) {
                warn!(cue = %cue, %err, "cue failed to load, silenced");
                self.degraded.insert(cue);
            }
        }
        self.state = EmitterState::Ready;
    }

    pub fn dispatch(&mut self, cue: CueId, options: &PlaybackOptions) {
        if self.muted || self.disabled.contains(&cue) {
            return;
        }
        if self.state == EmitterState::Uninitialized {
            self.initialize();
        }
        if self.state != EmitterState::Ready || self.degraded.contains(&cue) {
            return;
        }
        self.backend.play(cue, options);
    }

    pub fn stop(&mut self, cue: CueId) {
        if self.state == EmitterState::Ready {
            self.backend.stop(cue);
        }
    }

    /// Resume a suspended backend. Resuming an already-running one is a
    /// no-op; the backend guarantees that.
    pub fn resume(&mut self) {
        if self.state == EmitterState::Ready {
            self.backend.resume();
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn toggle_muted(&mut self) {
        self.muted = !self.muted;
        if !self.muted {
            // Unmuting counts as an explicit enable gesture.
            self.initialize();
        }
    }

    pub fn toggle_cue(&mut self, cue: CueId) {
        if !self.disabled.remove(&cue) {
            self.disabled.insert(cue);
        }
    }

    pub fn cue_enabled(&self, cue: CueId) -> bool {
        !self.disabled.contains(&cue)
    }

    pub fn is_degraded(&self, cue: CueId) -> bool {
        self.degraded.contains(&cue)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CueAction {
    Play(CueId, PlaybackOptions),
    Stop(CueId),
}

/// Pending cue triggers with absolute fire times, drained by the event
/// loop. A looped cue with a duration queues its own stop up front, so the
/// auto-stop fires regardless of later phase transitions.
#[derive(Debug, Default)]
pub struct CueScheduler {
    pending: Vec<(Instant, CueAction)>,
}

impl CueScheduler {
    pub fn new() -> Self {
        CueScheduler::default()
    }

    pub fn schedule(&mut self, now: Instant, plan: &[TimedCue]) {
        for timed in plan {
            let at = now + timed.delay;
            self.pending
                .push((at, CueAction::Play(timed.cue, timed.options)));
            if timed.options.looped {
                if let Some(duration) = timed.options.duration {
                    self.pending.push((at + duration, CueAction::Stop(timed.cue)));
                }
            }
        }
        // Stable sort keeps insertion order for simultaneous actions.
        self.pending.sort_by_key(|(at, _)| *at);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.first().map(|(at, _)| *at)
    }

    pub fn fire_due(&mut self, now: Instant) -> Vec<CueAction> {
        let due = self.pending.partition_point(|(at, _)| *at <= now);
        self.pending.drain(..due).map(|(_, action)| action).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
