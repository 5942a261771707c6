//! Shared test doubles and builders used by unit and integration tests.

use crate::{
    effects::{AudioBackend, CueError, CueId, PlaybackOptions},
    ledger::{Outcome, OutcomeSource, WagerRecord},
};
use chrono::Utc;
use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};

/// Outcome source that replays a scripted sequence of results.
#[derive(Debug, Default)]
pub struct ForcedOutcomes {
    script: VecDeque<Outcome>,
}

impl ForcedOutcomes {
    pub fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        ForcedOutcomes {
            script: outcomes.into_iter().collect(),
        }
    }
}

impl OutcomeSource for ForcedOutcomes {
    fn draw(&mut self) -> Outcome {
        self.script
            .pop_front()
            .expect("forced outcome script exhausted")
    }
}

/// Audio backend that records every call and can be told to fail
/// acquisition or individual cue loads.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub fail_acquire: bool,
    pub fail_cues: Vec<CueId>,
    pub acquired: bool,
    pub loaded: Vec<(CueId, PathBuf)>,
    pub played: Vec<(CueId, PlaybackOptions)>,
    pub stopped: Vec<CueId>,
    pub resumes: usize,
}

impl RecordingBackend {
    pub fn failing_cues(cues: impl IntoIterator<Item = CueId>) -> Self {
        RecordingBackend {
            fail_cues: cues.into_iter().collect(),
            ..RecordingBackend::default()
        }
    }

    pub fn played_cues(&self) -> Vec<CueId> {
        self.played.iter().map(|(cue, _)| *cue).collect()
    }
}

impl AudioBackend for RecordingBackend {
    fn acquire(&mut self) -> Result<(), CueError> {
        if self.fail_acquire {
            return Err(CueError::Unavailable("no output device".into()));
        }
        self.acquired = true;
        Ok(())
    }

    fn load(&mut self, cue: CueId, path: &Path) -> Result<(), CueError> {
        if self.fail_cues.contains(&cue) {
            return Err(CueError::Decode {
                path: path.to_path_buf(),
            });
        }
        self.loaded.push((cue, path.to_path_buf()));
        Ok(())
    }

    fn play(&mut self, cue: CueId, options: &PlaybackOptions) {
        self.played.push((cue, *options));
    }

    fn stop(&mut self, cue: CueId) {
        self.stopped.push(cue);
    }

    fn resume(&mut self) {
        self.resumes += 1;
    }
}

/// Build a resolved record directly, for statistics tests that do not need
/// to run the full lifecycle.
pub fn record(id: i64, amount_btc: &str, outcome: Outcome) -> WagerRecord {
    WagerRecord {
        id,
        amount: amount_btc.parse().expect("valid test amount"),
        outcome,
        resolved_at: Utc::now(),
    }
}
