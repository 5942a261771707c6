use crate::effects::{AudioBackend, CueError, CueId, PlaybackOptions};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

const MANIFEST_FILE: &str = "sounds.json";

fn default_file(cue: CueId) -> &'static str {
    match cue {
        CueId::FlipStart => "coin-flip-start.mp3",
        CueId::FlipSpinning => "coin-spinning.mp3",
        CueId::FlipLand => "coin-land.mp3",
        CueId::Win => "win.mp3",
        CueId::Lose => "lose.mp3",
    }
}

/// Optional per-cue overrides read from `sounds.json` in the assets dir.
/// Paths are relative to that dir.
#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(rename = "flip-start")]
    flip_start: Option<PathBuf>,
    #[serde(rename = "flip-spinning")]
    flip_spinning: Option<PathBuf>,
    #[serde(rename = "flip-land")]
    flip_land: Option<PathBuf>,
    win: Option<PathBuf>,
    lose: Option<PathBuf>,
}

impl Manifest {
    fn path_for(&self, cue: CueId) -> Option<&PathBuf> {
        match cue {
            CueId::FlipStart => self.flip_start.as_ref(),
            CueId::FlipSpinning => self.flip_spinning.as_ref(),
            CueId::FlipLand => self.flip_land.as_ref(),
            CueId::Win => self.win.as_ref(),
            CueId::Lose => self.lose.as_ref(),
        }
    }
}

/// Maps the five logical cue ids to asset paths under one directory.
#[derive(Clone, Debug)]
pub struct CueAssets {
    paths: HashMap<CueId, PathBuf>,
}

impl CueAssets {
    /// Resolve cue paths under `root`, applying `sounds.json` overrides when
    /// present. A malformed manifest is a resource error, so it is logged
    /// and the defaults stand.
    pub fn discover(root: &Path) -> Self {
        let manifest = match fs::read_to_string(root.join(MANIFEST_FILE)) {
            Ok(raw) => match serde_json::from_str::<Manifest>(&raw) {
                Ok(manifest) => manifest,
                Err(err) => {
                    warn!(%err, "malformed {MANIFEST_FILE}, using default cue paths");
                    Manifest::default()
                }
            },
            Err(_) => Manifest::default(),
        };

        let paths = CueId::ALL
            .into_iter()
            .map(|cue| {
                let file = manifest
                    .path_for(cue)
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(default_file(cue)));
                (cue, root.join(file))
            })
            .collect();
        CueAssets { paths }
    }

    pub fn path(&self, cue: CueId) -> &Path {
        // Populated for every cue id in `discover`.
        self.paths
            .get(&cue)
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(default_file(cue)))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ContextState {
    Suspended,
    Running,
}

/// File-backed stand-in for a real audio device: fetches and sanity-checks
/// asset bytes, then traces playback. A device-backed implementation would
/// sit behind the same [`AudioBackend`] seam.
#[derive(Debug, Default)]
pub struct FileAudioBackend {
    buffers: HashMap<CueId, Vec<u8>>,
    context: Option<ContextState>,
}

impl FileAudioBackend {
    pub fn new() -> Self {
        FileAudioBackend::default()
    }

    pub fn suspend(&mut self) {
        if self.context == Some(ContextState::Running) {
            self.context = Some(ContextState::Suspended);
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.context == Some(ContextState::Suspended)
    }
}

impl AudioBackend for FileAudioBackend {
    fn acquire(&mut self) -> Result<(), CueError> {
        if self.context.is_none() {
            self.context = Some(ContextState::Running);
        }
        Ok(())
    }

    fn load(&mut self, cue: CueId, path: &Path) -> Result<(), CueError> {
        let bytes = fs::read(path).map_err(|source| CueError::Fetch {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(CueError::Decode {
                path: path.to_path_buf(),
            });
        }
        debug!(cue = %cue, bytes = bytes.len(), "cue loaded");
        self.buffers.insert(cue, bytes);
        Ok(())
    }

    fn play(&mut self, cue: CueId, options: &PlaybackOptions) {
        if self.context != Some(ContextState::Running) {
            return;
        }
        if let Some(buffer) = self.buffers.get(&cue) {
            debug!(
                cue = %cue,
                bytes = buffer.len(),
                volume = options.volume,
                looped = options.looped,
                "cue playback"
            );
        }
    }

    fn stop(&mut self, cue: CueId) {
        debug!(cue = %cue, "cue stopped");
    }

    fn resume(&mut self) {
        // Resuming a running context is a no-op.
        if self.context == Some(ContextState::Suspended) {
            self.context = Some(ContextState::Running);
            debug!("audio resumed");
        }
    }
}
