//! Battle Demo - A terminal front end for battle_core
//!
//! This demo shows:
//! - Loading a battle from TOML (bundled default or a path argument)
//! - Running the TurnScheduler on a tokio runtime
//! - Feeding key presses into the minigame input hub
//! - Rendering HP bars, the event log and the timing bar from BattleEvents
//! - Changing BattleSpeed live
//! - Switching the party's character between turns

use battle_core::{
    default_battle, BattleConfig, BattleEvent, BattleResult, BattleSession, ChannelPresenter,
    CombatantId, InputHub, MinigameInput, SkipReason, SpeedControl, Team, TracingPresenter,
    TurnScheduler,
};
use battle_core::minigame::TimingBar;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "battle_demo.log";
const MAX_MESSAGES: usize = 64;
const BAR_WIDTH: usize = 40;
const MIN_SPEED: f64 = 0.25;
const MAX_SPEED: f64 = 8.0;

/// Requests from the UI thread to the scheduler task
enum DemoCommand {
    Switch { combatant: CombatantId, index: usize },
}

/// One row in the roster panels
struct Fighter {
    id: CombatantId,
    name: String,
    team: Team,
    character: String,
    /// Character names in roster order
    roster: Vec<String>,
    active: usize,
    current: u32,
    max: u32,
    alive: bool,
}

/// Minigame currently on screen
struct ActiveMinigame {
    combatant: CombatantId,
    id: String,
    started: Instant,
    deadline: f64,
    presses: u32,
}

/// Everything the UI draws, rebuilt from events only
struct DemoState {
    config: BattleConfig,
    fighters: Vec<Fighter>,
    messages: Vec<String>,
    active: Option<CombatantId>,
    turn: u32,
    minigame: Option<ActiveMinigame>,
    timing_bar: TimingBar,
    paused: bool,
    result: Option<BattleResult>,
    speed: SpeedControl,
    inputs: InputHub,
    commands: UnboundedSender<DemoCommand>,
}

impl DemoState {
    fn new(
        config: BattleConfig,
        speed: SpeedControl,
        inputs: InputHub,
        commands: UnboundedSender<DemoCommand>,
    ) -> Self {
        let fighters = config
            .combatants
            .iter()
            .map(|c| {
                let first = c.characters.first();
                let max = first.map(|s| s.max_health).unwrap_or(0);
                Fighter {
                    id: CombatantId::from(c.id.as_str()),
                    name: if c.name.is_empty() { c.id.clone() } else { c.name.clone() },
                    team: c.team,
                    character: first.map(|s| s.name.clone()).unwrap_or_default(),
                    roster: c.characters.iter().map(|s| s.name.clone()).collect(),
                    active: 0,
                    current: max,
                    max,
                    alive: first.is_some(),
                }
            })
            .collect();

        DemoState {
            config,
            fighters,
            messages: vec!["Battle start!".to_string()],
            active: None,
            turn: 0,
            minigame: None,
            timing_bar: TimingBar::default(),
            paused: false,
            result: None,
            speed,
            inputs,
            commands,
        }
    }

    fn fighter_mut(&mut self, id: &CombatantId) -> Option<&mut Fighter> {
        self.fighters.iter_mut().find(|f| &f.id == id)
    }

    fn name_of(&self, id: &CombatantId) -> String {
        self.fighters
            .iter()
            .find(|f| &f.id == id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn team_of(&self, id: &CombatantId) -> Option<Team> {
        self.fighters.iter().find(|f| &f.id == id).map(|f| f.team)
    }

    fn log(&mut self, message: String) {
        self.messages.push(message);
        if self.messages.len() > MAX_MESSAGES {
            self.messages.remove(0);
        }
    }

    /// Drain pending events from the scheduler task
    fn pump(&mut self, rx: &mut UnboundedReceiver<BattleEvent>) {
        while let Ok(event) = rx.try_recv() {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: BattleEvent) {
        match event {
            BattleEvent::TurnStarted { combatant, turn } => {
                self.turn = turn;
                let name = self.name_of(&combatant);
                self.active = Some(combatant);
                self.log(format!("-- Turn {}: {} --", turn, name));
            }
            BattleEvent::ActionSkipped { combatant, reason } => {
                let why = match reason {
                    SkipReason::MissingStats => "no character".to_string(),
                    SkipReason::NoTarget => "no target".to_string(),
                    SkipReason::MissingMinigame(id) => format!("missing minigame '{}'", id),
                };
                let name = self.name_of(&combatant);
                self.log(format!("{} skips ({})", name, why));
            }
            BattleEvent::MinigameStarted {
                combatant,
                minigame,
                deadline_secs,
            } => {
                self.minigame = Some(ActiveMinigame {
                    combatant,
                    id: minigame,
                    started: Instant::now(),
                    deadline: deadline_secs,
                    presses: 0,
                });
            }
            BattleEvent::MinigameFinished {
                combatant,
                outcome,
                timed_out,
                ..
            } => {
                self.minigame = None;
                let name = self.name_of(&combatant);
                if timed_out {
                    self.log(format!("{}: {} (time up)", name, outcome));
                } else {
                    self.log(format!("{}: {}!", name, outcome));
                }
            }
            BattleEvent::DamageApplied {
                attacker,
                target,
                amount,
                critical,
                remaining,
                ..
            } => {
                let attacker_name = self.name_of(&attacker);
                let target_name = self.name_of(&target);
                if let Some(fighter) = self.fighter_mut(&target) {
                    fighter.current = remaining;
                }
                let crit = if critical { " CRIT!" } else { "" };
                self.log(format!(
                    "{} hits {} for {}{}",
                    attacker_name, target_name, amount, crit
                ));
            }
            BattleEvent::Healed { combatant, amount } => {
                if let Some(fighter) = self.fighter_mut(&combatant) {
                    fighter.current = fighter.current.saturating_add(amount).min(fighter.max);
                }
            }
            BattleEvent::CharacterSwitched {
                combatant,
                character,
            } => {
                let max = self
                    .config
                    .combatants
                    .iter()
                    .find(|c| c.id == combatant.0)
                    .and_then(|c| c.characters.iter().find(|s| s.name == character))
                    .map(|s| s.max_health);
                if let Some(fighter) = self.fighter_mut(&combatant) {
                    if let Some(index) = fighter.roster.iter().position(|n| n == &character) {
                        fighter.active = index;
                    }
                    fighter.character = character.clone();
                    if let Some(max) = max {
                        fighter.max = max;
                        fighter.current = max;
                    }
                }
                let name = self.name_of(&combatant);
                self.log(format!("{} switches to {}", name, character));
            }
            BattleEvent::Death { combatant } => {
                if let Some(fighter) = self.fighter_mut(&combatant) {
                    fighter.alive = false;
                    fighter.current = 0;
                }
                let name = self.name_of(&combatant);
                self.log(format!("{} is defeated!", name));
            }
            BattleEvent::PausedChanged { paused } => {
                self.paused = paused;
            }
            BattleEvent::BattleEnded { result } => {
                self.result = Some(result);
                self.active = None;
                let text = match result {
                    BattleResult::Victory(Team::Player) => "Victory!",
                    BattleResult::Victory(Team::Enemy) => "Defeat...",
                    BattleResult::Draw => "Draw.",
                };
                self.log(format!("=== {} ===", text));
            }
        }
    }

    fn confirm(&mut self) {
        if let Some(minigame) = self.minigame.as_mut() {
            minigame.presses += 1;
        }
        self.inputs.send(MinigameInput::Confirm);
    }

    /// Queue the next character for the first living party member that has one
    fn switch_character(&mut self) {
        let Some(fighter) = self
            .fighters
            .iter()
            .find(|f| f.team == Team::Player && f.alive && f.roster.len() > 1)
        else {
            self.log("Nobody can switch".to_string());
            return;
        };

        let index = (fighter.active + 1) % fighter.roster.len();
        let message = format!("{} calls in {}...", fighter.name, fighter.roster[index]);
        let command = DemoCommand::Switch {
            combatant: fighter.id.clone(),
            index,
        };
        if self.commands.send(command).is_ok() {
            self.log(message);
        }
    }

    fn change_speed(&mut self, factor: f64) {
        let next = (self.speed.get() * factor).clamp(MIN_SPEED, MAX_SPEED);
        if self.speed.set(next).is_ok() {
            self.log(format!("Speed x{:.2}", next));
        }
    }
}

fn hp_bar(current: u32, max: u32) -> String {
    let filled = if max == 0 {
        0
    } else {
        ((current as f64 / max as f64) * 20.0).round() as usize
    };
    format!("[{}{}]", "█".repeat(filled.min(20)), "░".repeat(20 - filled.min(20)))
}

fn draw(f: &mut Frame, state: &DemoState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(8),    // Rosters
            Constraint::Length(5), // Minigame
            Constraint::Length(8), // Messages
            Constraint::Length(3), // Controls
        ])
        .split(f.area());

    // Title
    let status = match state.result {
        Some(_) => "finished".to_string(),
        None if state.paused => format!("turn {} (suspended)", state.turn),
        None => format!("turn {}", state.turn),
    };
    let title = Paragraph::new(format!(
        "Battle Demo - {}    speed x{:.2}",
        status,
        state.speed.get()
    ))
    .style(Style::default().fg(Color::Cyan))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let roster_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    draw_roster(f, state, Team::Player, roster_chunks[0]);
    draw_roster(f, state, Team::Enemy, roster_chunks[1]);

    draw_minigame(f, state, chunks[2]);

    // Messages, newest at the bottom
    let visible = chunks[3].height.saturating_sub(2) as usize;
    let skip = state.messages.len().saturating_sub(visible);
    let messages: Vec<ListItem> = state
        .messages
        .iter()
        .skip(skip)
        .map(|m| ListItem::new(m.as_str()))
        .collect();
    let messages_widget =
        List::new(messages).block(Block::default().borders(Borders::ALL).title("Battle Log"));
    f.render_widget(messages_widget, chunks[3]);

    // Controls
    let controls = Paragraph::new("[SPACE] Confirm    [C] Switch    [+/-] Speed    [Q] Quit")
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(controls, chunks[4]);
}

fn draw_roster(f: &mut Frame, state: &DemoState, team: Team, area: Rect) {
    let (title, color) = match team {
        Team::Player => ("Party", Color::Green),
        Team::Enemy => ("Enemies", Color::Red),
    };

    let lines: Vec<Line> = state
        .fighters
        .iter()
        .filter(|fighter| fighter.team == team)
        .flat_map(|fighter| {
            let marker = if state.active.as_ref() == Some(&fighter.id) {
                "> "
            } else {
                "  "
            };
            let style = if fighter.alive {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let label = if fighter.character.is_empty() || fighter.character == fighter.name {
                fighter.name.clone()
            } else {
                format!("{} ({})", fighter.name, fighter.character)
            };
            vec![
                Line::from(vec![Span::raw(marker), Span::styled(label, style)]),
                Line::from(format!(
                    "  HP: {} {}/{}",
                    hp_bar(fighter.current, fighter.max),
                    fighter.current,
                    fighter.max
                )),
            ]
        })
        .collect();

    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(widget, area);
}

fn draw_minigame(f: &mut Frame, state: &DemoState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Skill Check");

    let Some(minigame) = state.minigame.as_ref() else {
        f.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let elapsed = minigame.started.elapsed();
    let left = (minigame.deadline - elapsed.as_secs_f64()).max(0.0);
    let name = state.name_of(&minigame.combatant);
    let header = Line::from(format!("{} - {} ({:.1}s left)", name, minigame.id, left));

    let body = if state.team_of(&minigame.combatant) != Some(Team::Player) {
        Line::from("  ...thinking")
    } else {
        match minigame.id.as_str() {
            "timing_bar" => timing_bar_line(&state.timing_bar, elapsed),
            "button_mash" => Line::from(format!(
                "  Mash SPACE! {}",
                "▮".repeat(minigame.presses.min(BAR_WIDTH as u32) as usize)
            )),
            _ => Line::from("  Press SPACE"),
        }
    };

    f.render_widget(Paragraph::new(vec![header, body]).block(block), area);
}

/// Timing bar drawn from the same sweep function the minigame grades with
fn timing_bar_line(bar: &TimingBar, elapsed: Duration) -> Line<'static> {
    if elapsed < bar.intro {
        return Line::from("  Get ready...");
    }
    let position = TimingBar::position_at(bar.period, elapsed - bar.intro);
    let marker = (position * (BAR_WIDTH - 1) as f64).round() as usize;

    let track: String = (0..BAR_WIDTH)
        .map(|i| {
            let distance = (i as f64 / (BAR_WIDTH - 1) as f64 - 0.5).abs();
            if i == marker {
                '█'
            } else if distance <= bar.perfect_window {
                '▓'
            } else if distance <= bar.success_window {
                '▒'
            } else {
                '░'
            }
        })
        .collect();

    Line::from(vec![
        Span::raw("  "),
        Span::styled(track, Style::default().fg(Color::Yellow)),
    ])
}

/// Send logs to a file so they do not tear the terminal UI
///
/// The returned guard flushes the writer when dropped.
fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("battle_core=info,battle_demo=info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    guard
}

fn load_config() -> io::Result<BattleConfig> {
    match std::env::args().nth(1) {
        Some(path) => BattleConfig::load(Path::new(&path)).map_err(|e| {
            eprintln!("Error loading battle config '{}': {}", path, e);
            io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
        }),
        None => Ok(default_battle()),
    }
}

fn main() -> io::Result<()> {
    let _log_guard = init_logging();
    tracing::info!(log = LOG_FILE, "battle demo starting");

    // Build the battle before terminal setup so errors are visible
    let config = load_config()?;
    let (presenter, mut events) = ChannelPresenter::channel();
    let session = BattleSession::from_config(&config)
        .observer(TracingPresenter)
        .observer(presenter)
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let speed = session.speed().clone();
    let inputs = session.inputs().clone();
    let mut scheduler = TurnScheduler::from_config(&config, session)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let (commands, mut command_rx) = mpsc::unbounded_channel();
    let mut state = DemoState::new(config, speed, inputs, commands);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.spawn(async move {
        // Commands land between turns, never inside one
        let result = loop {
            while let Ok(command) = command_rx.try_recv() {
                match command {
                    DemoCommand::Switch { combatant, index } => {
                        if let Err(e) = scheduler.switch_character(&combatant, index) {
                            tracing::warn!(error = %e, "character switch refused");
                        }
                    }
                }
            }
            if let Some(result) = scheduler.run_turn().await {
                break result;
            }
        };
        tracing::info!(result = ?result, "demo battle finished");
    });

    // Setup terminal
    if let Err(e) = enable_raw_mode() {
        eprintln!("Error: Cannot enable raw mode: {}", e);
        eprintln!("This demo requires a terminal. Run it directly, not piped or in a non-TTY context.");
        return Err(e);
    }

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        eprintln!("Error: Cannot enter alternate screen: {}", e);
        return Err(e);
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(t) => t,
        Err(e) => {
            let _ = disable_raw_mode();
            eprintln!("Error: Cannot create terminal: {}", e);
            return Err(e);
        }
    };

    // Main loop: short poll so the timing bar animates smoothly
    loop {
        state.pump(&mut events);
        terminal.draw(|f| draw(f, &state))?;

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char(' ') | KeyCode::Enter => state.confirm(),
                    KeyCode::Char('c') => state.switch_character(),
                    KeyCode::Char('+') | KeyCode::Char('=') => state.change_speed(1.5),
                    KeyCode::Char('-') => state.change_speed(1.0 / 1.5),
                    KeyCode::Char(c) => state.inputs.send(MinigameInput::Key(c)),
                    _ => {}
                }
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    runtime.shutdown_background();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> (DemoState, UnboundedReceiver<DemoCommand>) {
        let (commands, rx) = mpsc::unbounded_channel();
        let state = DemoState::new(
            default_battle(),
            SpeedControl::default(),
            InputHub::default(),
            commands,
        );
        (state, rx)
    }

    #[test]
    fn test_switch_key_queues_next_character() {
        let (mut state, mut rx) = demo();

        state.switch_character();
        let DemoCommand::Switch { combatant, index } = rx.try_recv().unwrap();
        assert_eq!(combatant, CombatantId::from("party"));
        assert_eq!(index, 1);
    }

    #[test]
    fn test_switch_event_updates_roster_row() {
        let (mut state, mut rx) = demo();

        state.apply(BattleEvent::CharacterSwitched {
            combatant: "party".into(),
            character: "Sable".to_string(),
        });
        let party = state.fighters.iter().find(|f| f.id.0 == "party").unwrap();
        assert_eq!(party.active, 1);
        assert_eq!(party.character, "Sable");
        assert_eq!((party.current, party.max), (90, 90));

        // Cycles back to the first character
        state.switch_character();
        let DemoCommand::Switch { index, .. } = rx.try_recv().unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn test_no_switch_once_party_is_down() {
        let (mut state, mut rx) = demo();
        for fighter in state.fighters.iter_mut().filter(|f| f.team == Team::Player) {
            fighter.alive = false;
        }

        state.switch_character();
        assert!(rx.try_recv().is_err());
    }
}
