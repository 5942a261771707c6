use crate::ui;
use chrono::{DateTime, Utc};
use color_eyre::eyre::{Result, WrapErr};
use odinflip::{
    amount::Amount,
    audio::{CueAssets, FileAudioBackend},
    effects::{cue_plan, CueAction, CueId, CueScheduler, EffectEmitter},
    ledger::{FairCoin, Outcome, Phase, PhaseSignal, SessionLedger},
    stats::SessionStats,
};
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

const ANIMATION_INTERVAL: Duration = Duration::from_millis(100);
// Deadline stand-in for select! arms that are disabled anyway.
const FAR_FUTURE: Duration = Duration::from_secs(3600);

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub assets_dir: PathBuf,
    pub starting_balance: Amount,
    pub muted: bool,
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub amount: Amount,
    pub outcome: Outcome,
    pub ago: String,
}

/// Everything the UI needs for one frame.
#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub balance: Amount,
    pub phase: Phase,
    pub pending: Option<Amount>,
    pub last_result: Option<Outcome>,
    pub show_result: bool,
    pub history: Vec<HistoryEntry>,
    pub stats: SessionStats,
    pub muted: bool,
    pub cue_toggles: Vec<(CueId, bool)>,
    pub status: String,
    pub errors: Vec<String>,
}

pub struct AppController {
    ledger: SessionLedger<FairCoin>,
    emitter: EffectEmitter<FileAudioBackend>,
    cues: CueScheduler,
    last_result: Option<Outcome>,
    show_result: bool,
    status: String,
    errors: Vec<String>,
}

impl AppController {
    pub fn new(config: &AppConfig) -> Self {
        let assets = CueAssets::discover(&config.assets_dir);
        let mut emitter = EffectEmitter::new(FileAudioBackend::new(), assets);
        if config.muted {
            emitter.toggle_muted();
        }
        AppController {
            ledger: SessionLedger::new(config.starting_balance, FairCoin),
            emitter,
            cues: CueScheduler::new(),
            last_result: None,
            show_result: false,
            status: String::from("Press b to flip a coin"),
            errors: Vec::new(),
        }
    }

    fn submit(&mut self, input: &str, now: Instant) {
        match self.ledger.submit_wager(input, now) {
            Ok(signal) => {
                self.errors.clear();
                self.apply_signal(signal, now);
            }
            Err(err) => {
                tracing::debug!(%err, "wager rejected");
                self.errors = vec![err.to_string()];
            }
        }
    }

    fn apply_signal(&mut self, signal: PhaseSignal, now: Instant) {
        match &signal {
            PhaseSignal::WagerStarted { amount } => {
                self.last_result = None;
                self.show_result = false;
                self.status = format!("Flipping {amount} BTC...");
            }
            PhaseSignal::OutcomeDrawn { .. } => {
                self.status = String::from("The coin lands...");
            }
            PhaseSignal::WagerResolved { record } => {
                self.last_result = Some(record.outcome);
                self.show_result = true;
                self.status = match record.outcome {
                    Outcome::Win => {
                        format!("You won! +{} BTC", record.amount)
                    }
                    Outcome::Lose => {
                        format!("You lost! -{} BTC", record.amount)
                    }
                };
            }
        }
        self.cues.schedule(now, &cue_plan(&signal));
    }

    /// Advance due ledger transitions, then fire due cues. Cues scheduled by
    /// a transition at `now` fire in the same pass.
    fn advance(&mut self, now: Instant) {
        while let Some(signal) = self.ledger.tick(now) {
            self.apply_signal(signal, now);
        }
        for action in self.cues.fire_due(now) {
            match action {
                CueAction::Play(cue, options) => {
                    self.emitter.dispatch(cue, &options)
                }
                CueAction::Stop(cue) => self.emitter.stop(cue),
            }
        }
    }

    fn next_timer(&self) -> Option<Instant> {
        match (self.ledger.next_deadline(), self.cues.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn toggle_sound(&mut self) {
        self.emitter.toggle_muted();
        self.status = if self.emitter.is_muted() {
            String::from("Sound off")
        } else {
            String::from("Sound on")
        };
    }

    fn toggle_cue(&mut self, cue: CueId) {
        self.emitter.toggle_cue(cue);
        self.status = format!(
            "Cue {} {}",
            cue,
            if self.emitter.cue_enabled(cue) {
                "enabled"
            } else {
                "disabled"
            }
        );
    }

    fn build_snapshot(&self) -> AppSnapshot {
        let now = Utc::now();
        let history = self
            .ledger
            .history()
            .iter()
            .map(|record| HistoryEntry {
                amount: record.amount,
                outcome: record.outcome,
                ago: format_relative_time(record.resolved_at, now),
            })
            .collect();
        AppSnapshot {
            balance: self.ledger.balance(),
            phase: self.ledger.phase(),
            pending: self.ledger.pending_wager(),
            last_result: self.last_result,
            show_result: self.show_result,
            history,
            stats: SessionStats::from_history(self.ledger.history()),
            muted: self.emitter.is_muted(),
            cue_toggles: CueId::ALL
                .into_iter()
                .map(|cue| (cue, self.emitter.cue_enabled(cue)))
                .collect(),
            status: self.status.clone(),
            errors: self.errors.clone(),
        }
    }
}

pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    if seconds < 60 {
        format!("{seconds} seconds ago")
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{} hours ago", seconds / 3600)
    } else {
        format!("{} days ago", seconds / 86_400)
    }
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let controller = AppController::new(&config);
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    tracing::info!("starting UI");
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(controller, &mut ui_state, &mut input_events).await;
    ui::terminal_exit()?;
    res
}

async fn run_loop(
    mut controller: AppController,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
) -> Result<()> {
    let mut animation = tokio::time::interval(ANIMATION_INTERVAL);
    ui::draw(ui_state, &controller.build_snapshot())
        .wrap_err("initial draw failed")?;

    loop {
        let timer = controller.next_timer();
        let timer_at = tokio::time::Instant::from_std(
            timer.unwrap_or_else(|| Instant::now() + FAR_FUTURE),
        );

        tokio::select! {
            _ = tokio::time::sleep_until(timer_at), if timer.is_some() => {
                controller.advance(Instant::now());
                ui::draw(ui_state, &controller.build_snapshot())
                    .wrap_err("draw after phase transition failed")?;
            }
            _ = animation.tick() => {
                // Keeps the coin spinner and relative timestamps moving.
                ui::draw(ui_state, &controller.build_snapshot())
                    .wrap_err("draw on animation tick failed")?;
            }
            _ = tokio::signal::ctrl_c() => break,
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev?;
                let Some(ev) = ui::interpret_event(ui_state, event) else {
                    continue;
                };
                match ev {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::SubmitBet(input) => {
                        controller.submit(&input, Instant::now());
                    }
                    ui::UserEvent::ToggleSound => controller.toggle_sound(),
                    ui::UserEvent::ToggleCue(cue) => controller.toggle_cue(cue),
                    ui::UserEvent::Redraw => {}
                }
                ui::draw(ui_state, &controller.build_snapshot())
                    .wrap_err("draw after user event failed")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_relative_time__buckets_by_unit() {
        let base = Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap();

        let cases = [
            (12, "12 seconds ago"),
            (90, "1 minutes ago"),
            (3 * 3600, "3 hours ago"),
            (2 * 86_400, "2 days ago"),
        ];
        for (offset, expected) in cases {
            let then = base - chrono::Duration::seconds(offset);
            assert_eq!(format_relative_time(then, base), expected);
        }
    }
}
