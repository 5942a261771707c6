use crate::client::AppSnapshot;
use color_eyre::eyre::{eyre, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use odinflip::{
    amount::Amount,
    effects::CueId,
    ledger::{Outcome, Phase},
};
use ratatui::{prelude::*, widgets::*};
use std::io::stdout;
use tokio::sync::mpsc;

const DEFAULT_BET_INPUT: &str = "0.001";
const COIN_FRAMES: [&str; 4] = ["( ● )", "( ◖ )", "(  |  )", "( ◗ )"];

pub enum UserEvent {
    Quit,
    SubmitBet(String),
    ToggleSound,
    ToggleCue(CueId),
    Redraw,
}

pub struct UiState {
    mode: Mode,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
    balance: Amount,
    frame: usize,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            mode: Mode::Normal,
            terminal: None,
            balance: Amount::ZERO,
            frame: 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
enum Mode {
    #[default]
    Normal,
    BetModal(BetState),
}

#[derive(Clone, Debug)]
struct BetState {
    input: String,
}

impl Default for BetState {
    fn default() -> Self {
        BetState {
            input: String::from(DEFAULT_BET_INPUT),
        }
    }
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen
    )?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    Ok(())
}

pub type InputEventReceiver = mpsc::UnboundedReceiver<Event>;

/// Bridge blocking crossterm reads into the async loop.
pub fn input_event_stream() -> InputEventReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::error!(%err, "input thread stopped");
                    break;
                }
            }
        }
    });
    rx
}

pub async fn next_raw_event(rx: &mut InputEventReceiver) -> Result<Event> {
    rx.recv().await.ok_or_else(|| eyre!("input thread closed"))
}

pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    let key = match event {
        Event::Key(key) => key,
        Event::Resize(..) => return Some(UserEvent::Redraw),
        _ => return None,
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && key.code == KeyCode::Char('c')
    {
        return Some(UserEvent::Quit);
    }

    match &mut state.mode {
        Mode::BetModal(bs) => match key.code {
            KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            KeyCode::Enter => {
                let input = bs.input.clone();
                state.mode = Mode::Normal;
                Some(UserEvent::SubmitBet(input))
            }
            KeyCode::Backspace => {
                bs.input.pop();
                Some(UserEvent::Redraw)
            }
            // Stake shortcuts, the page's quarter / half / max buttons.
            KeyCode::Left => {
                bs.input =
                    Amount::from_sats(state.balance.sats() / 4).to_string();
                Some(UserEvent::Redraw)
            }
            KeyCode::Down => {
                bs.input =
                    Amount::from_sats(state.balance.sats() / 2).to_string();
                Some(UserEvent::Redraw)
            }
            KeyCode::Right => {
                bs.input = state.balance.to_string();
                Some(UserEvent::Redraw)
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                bs.input.push(c);
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
        Mode::Normal => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(UserEvent::Quit),
            KeyCode::Char('b') | KeyCode::Enter => {
                state.mode = Mode::BetModal(BetState::default());
                Some(UserEvent::Redraw)
            }
            KeyCode::Char('m') => Some(UserEvent::ToggleSound),
            KeyCode::Char(c) if ('1'..='5').contains(&c) => {
                let idx = c as usize - '1' as usize;
                Some(UserEvent::ToggleCue(CueId::ALL[idx]))
            }
            _ => None,
        },
    }
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    state.balance = snap.balance;
    state.frame = state.frame.wrapping_add(1);
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // balance + sound
            Constraint::Min(12),   // coin | history + stats
            Constraint::Length(4), // status / errors
            Constraint::Length(3), // help
        ])
        .split(f.area());

    draw_header(f, chunks[0], snap);
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    draw_coin(f, middle[0], state, snap);
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(middle[1]);
    draw_history(f, side[0], snap);
    draw_stats(f, side[1], snap);
    draw_status(f, chunks[2], snap);
    draw_help(f, chunks[3]);
    draw_modals(f, state, snap);
}

fn draw_header(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let sound = if snap.muted { "off" } else { "on" };
    let cues: Vec<String> = snap
        .cue_toggles
        .iter()
        .enumerate()
        .map(|(i, (cue, enabled))| {
            format!("{} {}{}", i + 1, cue, if *enabled { "" } else { " ✗" })
        })
        .collect();
    let lines = vec![
        Line::from(format!(
            "Balance: {} BTC | Sound: {}",
            snap.balance, sound
        )),
        Line::from(format!("Cues: {}", cues.join("  "))),
    ];
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Odinflip"));
    f.render_widget(widget, area);
}

fn draw_coin(f: &mut Frame, area: Rect, state: &UiState, snap: &AppSnapshot) {
    let mut lines: Vec<Line> = vec![Line::from("")];
    match snap.phase {
        Phase::Resolving => {
            let frame = COIN_FRAMES[state.frame % COIN_FRAMES.len()];
            lines.push(Line::styled(
                frame,
                Style::default().fg(Color::Yellow),
            ));
            lines.push(Line::from(""));
            lines.push(Line::from("The coin is in the air..."));
        }
        Phase::Revealing => {
            lines.push(Line::styled(
                "( ● )",
                Style::default().fg(Color::Yellow),
            ));
            lines.push(Line::from(""));
            lines.push(Line::from("It lands..."));
        }
        Phase::Idle => match (snap.show_result, snap.last_result) {
            (true, Some(Outcome::Win)) => {
                lines.push(Line::styled(
                    "⚡ YOU WON ⚡",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            (true, Some(Outcome::Lose)) => {
                lines.push(Line::styled(
                    "YOU LOST",
                    Style::default()
                        .fg(Color::Red)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            _ => {
                lines.push(Line::styled(
                    "( ● )",
                    Style::default().fg(Color::Yellow),
                ));
                lines.push(Line::from(""));
                lines.push(Line::from("Press b to place a bet"));
            }
        },
    }
    if let Some(amount) = snap.pending {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("At stake: {amount} BTC")));
    }
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Coin Flip"));
    f.render_widget(widget, area);
}

fn draw_history(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let mut lines: Vec<Line> = Vec::new();
    if snap.history.is_empty() {
        lines.push(Line::styled(
            "No flip history yet",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        for entry in &snap.history {
            let (label, sign, color) = match entry.outcome {
                Outcome::Win => ("WIN ", "+", Color::Green),
                Outcome::Lose => ("LOSE", "-", Color::Red),
            };
            lines.push(Line::from(vec![
                Span::styled(label, Style::default().fg(color)),
                Span::raw(format!("  {}{} BTC", sign, entry.amount)),
                Span::styled(
                    format!("  · {}", entry.ago),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }
    }
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Flip History"));
    f.render_widget(widget, area);
}

fn draw_stats(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let stats = &snap.stats;
    let win_rate = format!("{}%", (stats.win_rate * 100.0).round() as i64);
    let streak = stats
        .longest_streak
        .map(|s| s.to_string())
        .unwrap_or_else(|| String::from("0 wins"));
    let lines = vec![
        Line::from(format!("Win Rate: {win_rate}")),
        Line::from(format!(
            "Profit/Loss: {} BTC",
            format_signed_sats(stats.net_profit)
        )),
        Line::from(format!("Biggest Win: {} BTC", stats.biggest_win)),
        Line::from(format!("Biggest Loss: {} BTC", stats.biggest_loss)),
        Line::from(format!("Longest Streak: {streak}")),
    ];
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Statistics"));
    f.render_widget(widget, area);
}

fn draw_status(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let widget = if snap.errors.is_empty() {
        Paragraph::new(snap.status.as_str())
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .style(Style::default().fg(Color::Green))
    } else {
        let lines: Vec<Line> =
            snap.errors.iter().map(|e| Line::from(e.clone())).collect();
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Errors"))
            .style(Style::default().fg(Color::Red))
    };
    f.render_widget(widget, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "b bet | m sound | 1-5 toggle cue | q/Esc quit",
    )
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    let Mode::BetModal(bs) = &state.mode else {
        return;
    };
    let area = centered_rect(44, 7, f.area());
    f.render_widget(Clear, area);
    let lines = vec![
        Line::from(format!("Bet amount: {}_", bs.input)),
        Line::from(format!("Balance: {} BTC", snap.balance)),
        Line::from(""),
        Line::styled(
            "← ¼  ↓ ½  → Max | Enter flip | Esc cancel",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Place Bet"));
    f.render_widget(widget, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

fn format_signed_sats(sats: i64) -> String {
    let amount = Amount::from_sats(sats.unsigned_abs());
    if sats < 0 {
        format!("-{amount}")
    } else {
        format!("+{amount}")
    }
}
