use crate::{
    amount::Amount,
    ledger::{Outcome, WagerRecord},
};
use itertools::Itertools;
use std::{collections::VecDeque, fmt};

#[cfg(test)]
mod tests;

/// Derived read-only statistics over the session history. Pure: recomputed
/// on demand from the history alone, never stored by the ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SessionStats {
    /// Fraction of wins, 0.0 for an empty history.
    pub win_rate: f64,
    /// Net profit/loss in satoshis, wins positive.
    pub net_profit: i64,
    pub biggest_win: Amount,
    pub biggest_loss: Amount,
    pub longest_streak: Option<Streak>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Streak {
    pub length: usize,
    pub outcome: Outcome,
}

impl fmt::Display for Streak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = match (self.outcome, self.length) {
            (Outcome::Win, 1) => "win",
            (Outcome::Win, _) => "wins",
            (Outcome::Lose, 1) => "loss",
            (Outcome::Lose, _) => "losses",
        };
        write!(f, "{} {}", self.length, noun)
    }
}

impl SessionStats {
    pub fn from_history(history: &VecDeque<WagerRecord>) -> Self {
        let wins = history
            .iter()
            .filter(|r| r.outcome.is_win())
            .count();
        let win_rate = if history.is_empty() {
            0.0
        } else {
            wins as f64 / history.len() as f64
        };
        let net_profit = history
            .iter()
            .map(|r| match r.outcome {
                Outcome::Win => r.amount.sats() as i64,
                Outcome::Lose => -(r.amount.sats() as i64),
            })
            .sum();
        let biggest_win = biggest_stake(history, Outcome::Win);
        let biggest_loss = biggest_stake(history, Outcome::Lose);

        SessionStats {
            win_rate,
            net_profit,
            biggest_win,
            biggest_loss,
            longest_streak: longest_streak(history),
        }
    }
}

fn biggest_stake(history: &VecDeque<WagerRecord>, outcome: Outcome) -> Amount {
    history
        .iter()
        .filter(|r| r.outcome == outcome)
        .map(|r| r.amount)
        .max()
        .unwrap_or(Amount::ZERO)
}

/// Longest run of identical consecutive outcomes, scanning the history in
/// its stored (newest-first) order. On a tie this reports the most recent
/// run, which is NOT the chronological streak; the divergence is kept on
/// purpose to match the page this demo reimplements.
pub fn longest_streak(history: &VecDeque<WagerRecord>) -> Option<Streak> {
    let groups = history
        .iter()
        .map(|r| r.outcome)
        .group_by(|outcome| *outcome);
    let mut best: Option<Streak> = None;
    for (outcome, run) in &groups {
        let length = run.count();
        match best {
            Some(current) if length <= current.length => {}
            _ => best = Some(Streak { length, outcome }),
        }
    }
    best
}
