use crate::cli::Cli;
use crate::model::{Backdrop, RunConfig, RunSummary, Scene, SceneEvent};
use crate::orchestrator::{self, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::Rng;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// A fixed twinkle particle: column, row band, blink phase offset.
struct Star {
    x: u16,
    y: u16,
    phase: u8,
}

struct UiState {
    cfg: RunConfig,
    scene: Scene,
    revealed: usize,
    revealing: bool,
    muted: bool,
    fade_volume: Option<f32>,
    info: String,
    summary: Option<RunSummary>,
    stars: Vec<Star>,
    run_start: Instant,
}

impl UiState {
    fn new(cfg: RunConfig) -> Self {
        // Star positions are sampled once; only the blink phase animates.
        let mut rng = rand::thread_rng();
        let stars = (0..90)
            .map(|_| Star {
                x: rng.gen_range(0..240),
                y: rng.gen_range(0..80),
                phase: rng.gen_range(0..8),
            })
            .collect();
        Self {
            cfg,
            scene: Scene::Start,
            revealed: 0,
            revealing: false,
            muted: false,
            fade_volume: None,
            info: String::new(),
            summary: None,
            stars,
            run_start: Instant::now(),
        }
    }
}

pub async fn run(args: Cli) -> Result<()> {
    // Unbounded channels avoid backpressure between engine, controller and UI.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SceneEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_args = args.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_args, event_rx, cmd_tx));

    let res = orchestrator::run_controller(&args, event_tx, cmd_rx).await;

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
    args: Cli,
    mut event_rx: UnboundedReceiver<SceneEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::new(crate::cli::build_config(&args));
    if args.hands_free {
        let _ = cmd_tx.send(UiCommand::Begin);
    }

    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain events without blocking to keep the render loop responsive.
        let mut finished = false;
        while let Ok(ev) = event_rx.try_recv() {
            match ev {
                SceneEvent::RunCompleted { summary } => {
                    state.summary = Some(*summary);
                    finished = true;
                }
                other => apply_event(&mut state, other, &args, &cmd_tx),
            }
        }
        if finished && args.hands_free {
            let _ = cmd_tx.send(UiCommand::Quit);
            break Ok(());
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
                match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Enter) | (_, KeyCode::Char(' ')) => {
                        if state.summary.is_some() {
                            let _ = cmd_tx.send(UiCommand::Quit);
                            break Ok(());
                        }
                        if state.scene == Scene::Start {
                            let _ = cmd_tx.send(UiCommand::Begin);
                        } else {
                            let _ = cmd_tx.send(UiCommand::Skip);
                        }
                    }
                    (_, KeyCode::Char('m')) => {
                        let _ = cmd_tx.send(UiCommand::ToggleMute);
                    }
                    (_, KeyCode::Char('r')) => {
                        state.summary = None;
                        state.info = "Replaying from the start".into();
                        let _ = cmd_tx.send(UiCommand::Replay);
                    }
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    res
}

fn apply_event(
    state: &mut UiState,
    ev: SceneEvent,
    args: &Cli,
    cmd_tx: &UnboundedSender<UiCommand>,
) {
    match ev {
        SceneEvent::SceneEntered { scene } => {
            state.scene = scene;
            state.revealed = 0;
            state.revealing = scene.spec(&state.cfg).text.is_some();
            if args.hands_free && scene == Scene::Complete {
                let _ = cmd_tx.send(UiCommand::Skip);
            }
        }
        SceneEvent::RevealProgress {
            revealed, done, ..
        } => {
            state.revealed = revealed;
            state.revealing = !done;
        }
        SceneEvent::MuteChanged { muted } => {
            state.muted = muted;
            state.info = if muted {
                "Audio muted".into()
            } else {
                "Audio unmuted".into()
            };
        }
        SceneEvent::FadeTick { volume } => {
            state.fade_volume = Some(volume);
        }
        SceneEvent::Info(info) => {
            state.info = info.to_message();
        }
        // Cue playback is audible, not visible.
        SceneEvent::Cue { .. } | SceneEvent::RunCompleted { .. } => {}
    }
}

fn backdrop_style(backdrop: Backdrop) -> Style {
    match backdrop {
        Backdrop::Starfield => Style::default().bg(Color::Rgb(8, 8, 24)),
        Backdrop::Sunrise => Style::default().bg(Color::Rgb(48, 24, 16)),
        Backdrop::Dusk => Style::default().bg(Color::Rgb(24, 12, 36)),
    }
}

/// Paint twinkle particles over the scene area.
fn draw_starfield(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let blink = (state.run_start.elapsed().as_millis() / 400) as u8;
    for star in &state.stars {
        let x = area.x + star.x % area.width.max(1);
        let y = area.y + star.y % area.height.max(1);
        let bright = (star.phase.wrapping_add(blink)) % 8 < 4;
        let style = if bright {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let glyph = if bright { "*" } else { "." };
        f.render_widget(
            Paragraph::new(Span::styled(glyph, style)),
            Rect::new(x, y, 1, 1),
        );
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let mut header = vec![Span::raw(crate::script::TITLE)];
    if state.muted {
        header.push(Span::styled(
            "  [muted]",
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(v) = state.fade_volume {
        header.push(Span::styled(
            format!("  fading {v:.2}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(header))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("prologue")),
        chunks[0],
    );

    if let Some(summary) = &state.summary {
        draw_summary(chunks[1], f, summary);
    } else {
        draw_scene(chunks[1], f, state);
    }

    f.render_widget(
        Paragraph::new(hint_line(state)).alignment(Alignment::Center),
        chunks[2],
    );
}

fn hint_line(state: &UiState) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    if state.summary.is_some() {
        return Line::from(Span::styled("[r] replay   [q/Enter] quit", dim));
    }
    let action = match state.scene {
        Scene::Start => "[Enter] begin",
        _ if state.revealing => "[Enter] complete text",
        Scene::Complete => "[Enter] finish",
        _ => "[Enter] skip",
    };
    Line::from(Span::styled(
        format!("{action}   [m] mute   [r] replay   [q] quit"),
        dim,
    ))
}

fn draw_scene(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let spec = state.scene.spec(&state.cfg);
    f.render_widget(
        Block::default().style(backdrop_style(spec.backdrop)),
        area,
    );
    if spec.backdrop == Backdrop::Starfield {
        draw_starfield(area, f, state);
    }

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::default());
    if let Some(title) = spec.title {
        lines.push(Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::default());
    }
    match state.scene {
        Scene::Start => {
            lines.push(Line::from(crate::script::START_HINT));
            lines.push(Line::from(Span::styled(
                crate::script::START_AUDIO_NOTE,
                Style::default().fg(Color::DarkGray),
            )));
        }
        Scene::Complete => {
            lines.push(Line::from(crate::script::COMPLETE_HINT));
        }
        _ => {}
    }
    if !state.info.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            state.info.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }

    let centered = centered_rect(area, 70, 80);
    if spec.text.is_some() {
        let body = spec.revealed_prefix(state.revealed);
        let mut text_lines: Vec<Line> =
            body.lines().map(|l| Line::from(l.to_string())).collect();
        if state.revealing {
            if let Some(last) = text_lines.last_mut() {
                last.push_span(Span::styled("▋", Style::default().fg(Color::White)));
            } else {
                text_lines.push(Line::from("▋"));
            }
        }
        let para = Paragraph::new(text_lines)
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Left);
        let para = if let Some(speaker) = spec.speaker {
            para.block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {speaker} ")),
            )
        } else {
            para
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(lines.len() as u16), Constraint::Min(3)])
            .split(centered);
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), chunks[0]);
        f.render_widget(para, chunks[1]);
    } else {
        f.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: false }),
            centered,
        );
    }
}

fn draw_summary(area: Rect, f: &mut ratatui::Frame, summary: &RunSummary) {
    let lines: Vec<Line> = crate::text_summary::build_text_summary(summary)
        .lines
        .into_iter()
        .map(Line::from)
        .collect();
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Run summary ")),
        centered_rect(area, 70, 90),
    );
}

/// Rect centered in `area` covering the given width/height percentages.
fn centered_rect(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
