#![allow(non_snake_case)]

use odinflip::{
    amount::Amount,
    ledger::Outcome,
    stats::{longest_streak, SessionStats, Streak},
    test_helpers::record,
};
use std::collections::VecDeque;

fn newest_first(
    records: impl IntoIterator<Item = (u32, &'static str, Outcome)>,
) -> VecDeque<odinflip::ledger::WagerRecord> {
    records
        .into_iter()
        .map(|(id, amount, outcome)| record(id as i64, amount, outcome))
        .collect()
}

#[test]
fn session_stats__recomputing_on_the_same_history_is_identical() {
    // given
    let history = newest_first([
        (5, "0.003", Outcome::Win),
        (4, "0.001", Outcome::Lose),
        (3, "0.002", Outcome::Win),
        (2, "0.005", Outcome::Lose),
        (1, "0.004", Outcome::Win),
    ]);

    // when
    let first = SessionStats::from_history(&history);
    let second = SessionStats::from_history(&history);

    // then: pure function of the history, twice the same answer
    assert_eq!(first, second);
    assert_eq!(first.win_rate, 0.6);
    assert_eq!(first.net_profit, 300_000);
    assert_eq!(first.biggest_win, "0.004".parse::<Amount>().unwrap());
    assert_eq!(first.biggest_loss, "0.005".parse::<Amount>().unwrap());
}

#[test]
fn session_stats__derivable_from_history_alone() {
    // All-loss history: win rate zero, biggest win stays zero.
    let history = newest_first([
        (2, "0.002", Outcome::Lose),
        (1, "0.001", Outcome::Lose),
    ]);

    let stats = SessionStats::from_history(&history);

    assert_eq!(stats.win_rate, 0.0);
    assert_eq!(stats.net_profit, -300_000);
    assert_eq!(stats.biggest_win, Amount::ZERO);
    assert_eq!(stats.biggest_loss, "0.002".parse::<Amount>().unwrap());
    assert_eq!(
        stats.longest_streak,
        Some(Streak {
            length: 2,
            outcome: Outcome::Lose
        })
    );
}

#[test]
fn longest_streak__storage_order_tie_differs_from_chronological_reading() {
    // Chronologically this session was Win, Win, Lose, Lose: a chronological
    // scan would report "2 wins". Stored newest-first the list reads
    // [Lose, Lose, Win, Win] and the scan reports the newest run instead.
    // The stored-order behavior is the one this demo preserves.
    let history = newest_first([
        (4, "0.001", Outcome::Lose),
        (3, "0.001", Outcome::Lose),
        (2, "0.001", Outcome::Win),
        (1, "0.001", Outcome::Win),
    ]);

    assert_eq!(
        longest_streak(&history),
        Some(Streak {
            length: 2,
            outcome: Outcome::Lose
        })
    );
}
