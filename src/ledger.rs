use crate::amount::Amount;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};
use thiserror::Error;


/// Resolved flips kept for the stats panel; oldest entries fall off.
pub const HISTORY_DEPTH: usize = 10;

pub const STARTING_BALANCE: Amount = Amount::from_sats(5_000_000);

/// Visual delay between submitting a flip and drawing its outcome.
pub const RESOLVE_DELAY: Duration = Duration::from_millis(2000);
/// Visual delay between the coin landing and the result being applied.
pub const REVEAL_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    pub fn is_win(self) -> bool {
        matches!(self, Outcome::Win)
    }
}

/// Where flip outcomes come from. Injected so tests can force a result;
/// the outcome never depends on the stake or on past flips.
pub trait OutcomeSource {
    fn draw(&mut self) -> Outcome;
}

/// Fair coin backed by the thread-local generator, P(Win) = 0.5.
#[derive(Clone, Copy, Debug, Default)]
pub struct FairCoin;

impl OutcomeSource for FairCoin {
    fn draw(&mut self) -> Outcome {
        if rand::rng().random_bool(0.5) {
            Outcome::Win
        } else {
            Outcome::Lose
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WagerRecord {
    /// Unix milliseconds at resolution time, bumped when two flips land in
    /// the same millisecond so ids stay strictly increasing.
    pub id: i64,
    pub amount: Amount,
    pub outcome: Outcome,
    pub resolved_at: DateTime<Utc>,
}

/// Emitted at each phase boundary; the effect layer consumes these and has
/// no way to influence the ledger back.
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseSignal {
    WagerStarted { amount: Amount },
    OutcomeDrawn { outcome: Outcome },
    WagerResolved { record: WagerRecord },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Idle,
    Resolving,
    Revealing,
}

#[derive(Clone, Copy, Debug)]
enum PhaseState {
    Idle,
    Resolving {
        amount: Amount,
        deadline: Instant,
    },
    Revealing {
        amount: Amount,
        outcome: Outcome,
        deadline: Instant,
    },
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum WagerError {
    #[error("bet amount must be a positive number")]
    InvalidAmount,
    #[error("bet of {requested} BTC exceeds balance of {available} BTC")]
    InsufficientBalance { requested: Amount, available: Amount },
    #[error("a flip is already in progress")]
    WagerAlreadyPending,
}

/// Single-session wager ledger: validates submissions, resolves them through
/// `Idle -> Resolving -> Revealing -> Idle`, and keeps the bounded history.
/// Transitions are driven by an external clock via [`SessionLedger::tick`]
/// instead of chained callbacks, so ordering is testable.
#[derive(Debug)]
pub struct SessionLedger<R> {
    balance: Amount,
    phase: PhaseState,
    history: VecDeque<WagerRecord>,
    outcomes: R,
    last_record_id: i64,
}

impl<R> SessionLedger<R> {
    pub fn new(balance: Amount, outcomes: R) -> Self {
        SessionLedger {
            balance,
            phase: PhaseState::Idle,
            history: VecDeque::with_capacity(HISTORY_DEPTH),
            outcomes,
            last_record_id: 0,
        }
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn phase(&self) -> Phase {
        match self.phase {
            PhaseState::Idle => Phase::Idle,
            PhaseState::Resolving { .. } => Phase::Resolving,
            PhaseState::Revealing { .. } => Phase::Revealing,
        }
    }

    /// The stake currently in flight, if any. At most one exists at a time.
    pub fn pending_wager(&self) -> Option<Amount> {
        match self.phase {
            PhaseState::Idle => None,
            PhaseState::Resolving { amount, .. }
            | PhaseState::Revealing { amount, .. } => Some(amount),
        }
    }

    /// Resolved flips, newest first.
    pub fn history(&self) -> &VecDeque<WagerRecord> {
        &self.history
    }

    /// When the next phase transition is due, if one is scheduled.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            PhaseState::Idle => None,
            PhaseState::Resolving { deadline, .. }
            | PhaseState::Revealing { deadline, .. } => Some(deadline),
        }
    }
}

impl<R: OutcomeSource> SessionLedger<R> {
    /// Validate a bet and start resolving it. Rejections leave the ledger
    /// untouched.
    pub fn submit_wager(
        &mut self,
        input: &str,
        now: Instant,
    ) -> Result<PhaseSignal, WagerError> {
        if !matches!(self.phase, PhaseState::Idle) {
            return Err(WagerError::WagerAlreadyPending);
        }
        let amount = match input.trim().parse::<Amount>() {
            Ok(amount) if !amount.is_zero() => amount,
            Ok(_) => return Err(WagerError::InvalidAmount),
            Err(err) => {
                tracing::debug!(input, %err, "rejected bet input");
                return Err(WagerError::InvalidAmount);
            }
        };
        if amount > self.balance {
            return Err(WagerError::InsufficientBalance {
                requested: amount,
                available: self.balance,
            });
        }

        self.phase = PhaseState::Resolving {
            amount,
            deadline: now + RESOLVE_DELAY,
        };
        Ok(PhaseSignal::WagerStarted { amount })
    }

    /// Advance at most one phase transition whose deadline has passed.
    /// A tick with no pending wager, or before the deadline, does nothing.
    pub fn tick(&mut self, now: Instant) -> Option<PhaseSignal> {
        match self.phase {
            PhaseState::Idle => None,
            PhaseState::Resolving { amount, deadline } => {
                if now < deadline {
                    return None;
                }
                let outcome = self.outcomes.draw();
                self.phase = PhaseState::Revealing {
                    amount,
                    outcome,
                    deadline: now + REVEAL_DELAY,
                };
                Some(PhaseSignal::OutcomeDrawn { outcome })
            }
            PhaseState::Revealing {
                amount,
                outcome,
                deadline,
            } => {
                if now < deadline {
                    return None;
                }
                let record = self.settle(amount, outcome);
                self.phase = PhaseState::Idle;
                Some(PhaseSignal::WagerResolved { record })
            }
        }
    }

    fn settle(&mut self, amount: Amount, outcome: Outcome) -> WagerRecord {
        self.balance = match outcome {
            Outcome::Win => self.balance.saturating_add(amount),
            Outcome::Lose => self.balance.saturating_sub(amount),
        };
        let record = WagerRecord {
            id: self.next_record_id(),
            amount,
            outcome,
            resolved_at: Utc::now(),
        };
        self.history.push_front(record.clone());
        self.history.truncate(HISTORY_DEPTH);
        record
    }

    fn next_record_id(&mut self) -> i64 {
        let id = Utc::now()
            .timestamp_millis()
            .max(self.last_record_id + 1);
        self.last_record_id = id;
        id
    }
}
