#![allow(non_snake_case)]

use odinflip::{
    audio::{CueAssets, FileAudioBackend},
    effects::{
        cue_plan, AudioBackend, CueAction, CueId, CueScheduler, EffectEmitter,
        PlaybackOptions, SPIN_CUE_DELAY, SPIN_CUE_DURATION,
    },
    ledger::{Outcome, PhaseSignal},
    test_helpers::{record, RecordingBackend},
};
use std::{fs, path::Path, time::Instant};
use tempdir::TempDir;

fn assets() -> CueAssets {
    CueAssets::discover(Path::new("sounds"))
}

fn dispatch_due(
    emitter: &mut EffectEmitter<RecordingBackend>,
    scheduler: &mut CueScheduler,
    now: Instant,
) {
    for action in scheduler.fire_due(now) {
        match action {
            CueAction::Play(cue, options) => emitter.dispatch(cue, &options),
            CueAction::Stop(cue) => emitter.stop(cue),
        }
    }
}

#[test]
fn full_wager_cue_sequence__plays_and_auto_stops_in_order() {
    // given
    let mut emitter = EffectEmitter::new(RecordingBackend::default(), assets());
    let mut scheduler = CueScheduler::new();
    let start = Instant::now();

    // when: the three phase signals arrive at their nominal times
    scheduler.schedule(
        start,
        &cue_plan(&PhaseSignal::WagerStarted {
            amount: "0.02".parse().unwrap(),
        }),
    );
    dispatch_due(&mut emitter, &mut scheduler, start);
    dispatch_due(&mut emitter, &mut scheduler, start + SPIN_CUE_DELAY);

    let drawn_at = start + odinflip::ledger::RESOLVE_DELAY;
    scheduler.schedule(
        drawn_at,
        &cue_plan(&PhaseSignal::OutcomeDrawn {
            outcome: Outcome::Win,
        }),
    );
    dispatch_due(&mut emitter, &mut scheduler, drawn_at);

    let resolved_at = drawn_at + odinflip::ledger::REVEAL_DELAY;
    scheduler.schedule(
        resolved_at,
        &cue_plan(&PhaseSignal::WagerResolved {
            record: record(1, "0.02", Outcome::Win),
        }),
    );
    dispatch_due(&mut emitter, &mut scheduler, resolved_at);

    // then: the spin auto-stop (at +2000ms) fired with the landing clip,
    // independent of the phase transition that happened to coincide
    assert_eq!(
        emitter.backend().played_cues(),
        vec![
            CueId::FlipStart,
            CueId::FlipSpinning,
            CueId::FlipLand,
            CueId::Win,
        ]
    );
    assert_eq!(emitter.backend().stopped, vec![CueId::FlipSpinning]);
    assert!(scheduler.is_empty());
}

#[test]
fn win_cue_failure__never_reaches_the_caller() {
    // given: only the win clip is broken
    let backend = RecordingBackend::failing_cues([CueId::Win]);
    let mut emitter = EffectEmitter::new(backend, assets());
    let mut scheduler = CueScheduler::new();
    let now = Instant::now();

    // when
    scheduler.schedule(
        now,
        &cue_plan(&PhaseSignal::WagerStarted {
            amount: "0.01".parse().unwrap(),
        }),
    );
    scheduler.schedule(
        now,
        &cue_plan(&PhaseSignal::WagerResolved {
            record: record(1, "0.01", Outcome::Win),
        }),
    );
    dispatch_due(&mut emitter, &mut scheduler, now + SPIN_CUE_DURATION);

    // then: flip-start and the spin still played, win was silently skipped
    assert_eq!(
        emitter.backend().played_cues(),
        vec![CueId::FlipStart, CueId::FlipSpinning]
    );
    assert!(emitter.is_degraded(CueId::Win));
}

#[test]
fn file_backend__loads_real_assets_and_flags_undecodable_ones() {
    // given: a real assets dir where win.mp3 is empty
    let dir = TempDir::new("odinflip-sounds").unwrap();
    for name in [
        "coin-flip-start.mp3",
        "coin-spinning.mp3",
        "coin-land.mp3",
        "lose.mp3",
    ] {
        fs::write(dir.path().join(name), b"riff-ish bytes").unwrap();
    }
    fs::write(dir.path().join("win.mp3"), b"").unwrap();

    let assets = CueAssets::discover(dir.path());
    let mut emitter = EffectEmitter::new(FileAudioBackend::new(), assets);

    // when
    emitter.initialize();

    // then
    assert!(!emitter.is_degraded(CueId::FlipStart));
    assert!(!emitter.is_degraded(CueId::Lose));
    assert!(emitter.is_degraded(CueId::Win));
}

#[test]
fn file_backend__missing_assets_dir_degrades_every_cue() {
    let assets = CueAssets::discover(Path::new("definitely-not-a-dir"));
    let mut emitter = EffectEmitter::new(FileAudioBackend::new(), assets);

    emitter.initialize();
    // Dispatching afterwards must stay a quiet no-op.
    emitter.dispatch(CueId::FlipStart, &PlaybackOptions::default());

    for cue in CueId::ALL {
        assert!(emitter.is_degraded(cue));
    }
}

#[test]
fn file_backend__resume_is_idempotent() {
    // given
    let mut backend = FileAudioBackend::new();
    backend.acquire().unwrap();

    // when/then: resuming a running context changes nothing
    backend.resume();
    assert!(!backend.is_suspended());

    backend.suspend();
    assert!(backend.is_suspended());
    backend.resume();
    assert!(!backend.is_suspended());
    backend.resume();
    assert!(!backend.is_suspended());
}

#[test]
fn cue_assets__manifest_overrides_single_path() {
    // given
    let dir = TempDir::new("odinflip-manifest").unwrap();
    fs::write(
        dir.path().join("sounds.json"),
        r#"{ "win": "fanfare.mp3" }"#,
    )
    .unwrap();

    // when
    let assets = CueAssets::discover(dir.path());

    // then
    assert_eq!(assets.path(CueId::Win), dir.path().join("fanfare.mp3"));
    assert_eq!(
        assets.path(CueId::FlipStart),
        dir.path().join("coin-flip-start.mp3")
    );
}
