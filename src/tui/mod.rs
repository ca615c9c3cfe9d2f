mod bars;
mod help;
mod state;

use crate::cli::{build_config, Cli};
use crate::engine::step::{MAX_SPEED, MIN_SPEED};
use crate::input;
use crate::model::{format_value, Algorithm, RunState, SortEvent};
use crate::orchestrator::{self, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Terminal,
};
use state::{apply_event, UiState};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli) -> Result<()> {
    // Unbounded channels avoid backpressure between the engine and the render loop.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SortEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let cfg = build_config(&args);
    let initial = UiState {
        algorithm: cfg.algorithm,
        size: cfg.size,
        speed: cfg.speed,
        ..Default::default()
    };

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_handle = std::thread::spawn(move || run_threaded(initial, event_rx, cmd_tx));

    let res = orchestrator::run_controller(cfg, args.start_on_launch, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    mut state: UiState,
    mut event_rx: UnboundedReceiver<SortEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain events without blocking to keep the UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                let cmds = handle_key(&mut state, k);
                let quit = cmds.contains(&UiCommand::Quit);
                for cmd in cmds {
                    let _ = cmd_tx.send(cmd);
                }
                if quit {
                    break Ok(());
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

/// Translate a key press into controller commands, updating local input state.
fn handle_key(state: &mut UiState, k: KeyEvent) -> Vec<UiCommand> {
    if state.values_editing {
        match k.code {
            KeyCode::Enter => {
                state.values_editing = false;
                state.info = format!("Values: {}", state.values_input.trim());
                return vec![
                    UiCommand::SetValues(state.values_input.clone()),
                    UiCommand::Generate,
                ];
            }
            KeyCode::Esc => {
                state.values_editing = false;
                state.info = "Edit cancelled".into();
            }
            KeyCode::Backspace => {
                state.values_input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || ",.-+eE ".contains(c) => {
                state.values_input.push(c);
            }
            _ => {}
        }
        return Vec::new();
    }

    match (k.modifiers, k.code) {
        (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            vec![UiCommand::Quit]
        }
        (_, KeyCode::Char('s')) | (_, KeyCode::Enter) => vec![UiCommand::Start],
        (_, KeyCode::Char('p')) | (_, KeyCode::Char(' ')) => vec![UiCommand::TogglePause],
        (_, KeyCode::Char('g')) => vec![UiCommand::Generate],
        (_, KeyCode::Char('r')) => vec![UiCommand::Reset],
        (_, KeyCode::Char('e')) => {
            state.values_editing = true;
            state.info = "Editing values (Enter to apply, Esc to cancel)".into();
            Vec::new()
        }
        (_, KeyCode::Char('+')) | (_, KeyCode::Char('=')) => {
            vec![UiCommand::SetSpeed(state.speed.saturating_add(1).min(MAX_SPEED))]
        }
        (_, KeyCode::Char('-')) => {
            vec![UiCommand::SetSpeed(state.speed.saturating_sub(1).max(MIN_SPEED))]
        }
        (_, KeyCode::Char(']')) if state.is_idle() => {
            state.size = (state.size + 1).clamp(input::MIN_SIZE, input::MAX_SIZE);
            vec![UiCommand::SetSize(state.size)]
        }
        (_, KeyCode::Char('[')) if state.is_idle() => {
            state.size = state.size.saturating_sub(1).clamp(input::MIN_SIZE, input::MAX_SIZE);
            vec![UiCommand::SetSize(state.size)]
        }
        (_, KeyCode::Char('a')) if state.is_idle() => {
            state.algorithm = state.algorithm.next();
            vec![UiCommand::SelectAlgorithm(state.algorithm)]
        }
        (_, KeyCode::Char(c @ '1'..='5')) if state.is_idle() => {
            let idx = c as usize - '1' as usize;
            state.algorithm = Algorithm::ALL[idx];
            vec![UiCommand::SelectAlgorithm(state.algorithm)]
        }
        (_, KeyCode::Char(']' | '[' | 'a' | '1'..='5')) => {
            state.info = "Locked while sorting".into();
            Vec::new()
        }
        (_, KeyCode::Tab) => {
            state.tab = (state.tab + 1) % 2;
            Vec::new()
        }
        (_, KeyCode::Char('?')) => {
            state.tab = 1;
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Visualizer"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("sortviz"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_visualizer(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f),
    }
}

fn draw_visualizer(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(6)].as_ref())
        .split(area);

    bars::draw_bars(chunks[0], f, state);
    draw_status(chunks[1], f, state);
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let (state_label, state_color) = match state.run_state {
        RunState::Idle => ("Idle", Color::Gray),
        RunState::Running => ("Running", Color::Green),
        RunState::Paused => ("Paused", Color::Yellow),
    };
    let label = |s: &'static str| Span::styled(s, Style::default().fg(Color::Gray));

    let mut lines = vec![
        Line::from(vec![
            label("State: "),
            Span::styled(state_label, Style::default().fg(state_color)),
            label("   Algorithm: "),
            Span::raw(state.algorithm.name()),
            label("   Size: "),
            Span::raw(format!("{}", state.size)),
            label("   Speed: "),
            Span::raw(format!("{} ({} ms)", state.speed, state.delay_ms)),
        ]),
        Line::from(vec![
            label("Step: "),
            Span::raw(format!("{}", state.step)),
            label("   Compares: "),
            Span::raw(format!("{}", state.counts.compares)),
            label("   Swaps: "),
            Span::raw(format!("{}", state.counts.swaps)),
            label("   Writes: "),
            Span::raw(format!("{}", state.counts.overwrites)),
        ]),
    ];

    if state.values_editing {
        lines.push(Line::from(vec![
            label("Values: "),
            Span::styled(
                format!("{}_", state.values_input),
                Style::default().fg(Color::Cyan),
            ),
        ]));
    } else if let Some(summary) = state.last_summary.as_ref() {
        let out = summary
            .output
            .iter()
            .map(|v| format_value(*v))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(Line::from(vec![label("Result: "), Span::raw(out)]));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::raw(state.info.clone())));

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(p, area);
}
