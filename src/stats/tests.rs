#![allow(non_snake_case)]

use super::*;
use crate::test_helpers::record;

fn history(
    records: impl IntoIterator<Item = WagerRecord>,
) -> VecDeque<WagerRecord> {
    records.into_iter().collect()
}

#[test]
fn from_history__empty_history__is_all_zero() {
    let stats = SessionStats::from_history(&VecDeque::new());

    assert_eq!(stats.win_rate, 0.0);
    assert_eq!(stats.net_profit, 0);
    assert_eq!(stats.biggest_win, Amount::ZERO);
    assert_eq!(stats.biggest_loss, Amount::ZERO);
    assert_eq!(stats.longest_streak, None);
}

#[test]
fn from_history__mixed_outcomes__derives_all_figures() {
    // given: stored newest first
    let history = history([
        record(4, "0.004", Outcome::Lose),
        record(3, "0.002", Outcome::Win),
        record(2, "0.008", Outcome::Win),
        record(1, "0.001", Outcome::Lose),
    ]);

    // when
    let stats = SessionStats::from_history(&history);

    // then
    assert_eq!(stats.win_rate, 0.5);
    // +0.002 +0.008 -0.004 -0.001 = +0.005
    assert_eq!(stats.net_profit, 500_000);
    assert_eq!(stats.biggest_win, "0.008".parse().unwrap());
    assert_eq!(stats.biggest_loss, "0.004".parse().unwrap());
}

#[test]
fn longest_streak__reports_longest_run_and_its_outcome() {
    let history = history([
        record(5, "0.001", Outcome::Win),
        record(4, "0.001", Outcome::Lose),
        record(3, "0.001", Outcome::Lose),
        record(2, "0.001", Outcome::Lose),
        record(1, "0.001", Outcome::Win),
    ]);

    assert_eq!(
        longest_streak(&history),
        Some(Streak {
            length: 3,
            outcome: Outcome::Lose
        })
    );
}

#[test]
fn longest_streak__tie_reports_newest_run_not_chronological() {
    // Stored newest first: [Lose, Lose, Win, Win]. Chronologically the
    // session was two wins then two losses, so a chronological scan would
    // call this "2 wins". The stored-order scan reports the newest run on a
    // tie, matching the page this reimplements.
    let history = history([
        record(4, "0.001", Outcome::Lose),
        record(3, "0.001", Outcome::Lose),
        record(2, "0.001", Outcome::Win),
        record(1, "0.001", Outcome::Win),
    ]);

    assert_eq!(
        longest_streak(&history),
        Some(Streak {
            length: 2,
            outcome: Outcome::Lose
        })
    );
}

#[test]
fn streak_display__pluralizes_except_for_a_single_flip() {
    let wins = Streak {
        length: 3,
        outcome: Outcome::Win,
    };
    let one_win = Streak {
        length: 1,
        outcome: Outcome::Win,
    };
    let one_loss = Streak {
        length: 1,
        outcome: Outcome::Lose,
    };

    assert_eq!(wins.to_string(), "3 wins");
    assert_eq!(one_win.to_string(), "1 win");
    assert_eq!(one_loss.to_string(), "1 loss");
}
