mod export;
mod help;
mod state;

use crate::cli::Cli;
use crate::model::{AppEvent, RunRequest};
use crate::orchestrator::{self, UiCommand};
use crate::runner::ProcessRunner;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Terminal,
};
use state::UiState;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run<R: ProcessRunner>(
    args: Cli,
    runner: R,
    request: RunRequest,
    can_rerun: bool,
) -> Result<()> {
    // Unbounded channels avoid backpressure between the UI thread and the controller.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_args = args.clone();
    let ui_handle =
        std::thread::spawn(move || run_threaded(ui_args, can_rerun, event_rx, cmd_tx));

    let res = orchestrator::run_controller(&runner, &request, event_tx, cmd_rx).await;

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
pub fn run_threaded(
    args: Cli,
    can_rerun: bool,
    mut event_rx: UnboundedReceiver<AppEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::default();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain events without blocking to keep UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            let completed = matches!(ev, AppEvent::RunCompleted { .. });
            state.apply_event(ev);
            if completed {
                handle_run_completed(&args, &mut state);
            }
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
                    (_, KeyCode::Char('r')) if !can_rerun => {
                        state.info = "Rerun unavailable: stdin was already read".into();
                    }
                    (_, KeyCode::Char('r')) => {
                        state.info = "Restart requested…".into();
                        state.reset_run();
                        let _ = cmd_tx.send(UiCommand::Restart);
                    }
                    (_, KeyCode::Char('e')) => {
                        export::export_and_show_path(
                            &mut state,
                            "JSON",
                            export::export_result_json,
                        );
                    }
                    (_, KeyCode::Char('c')) => {
                        export::export_and_show_path(
                            &mut state,
                            "CSV",
                            export::export_result_csv,
                        );
                    }
                    (_, KeyCode::Char('?')) => {
                        state.show_help = !state.show_help;
                    }
                    (_, KeyCode::Esc) => {
                        state.show_help = false;
                    }
                    (_, KeyCode::Down) | (_, KeyCode::Char('j')) => state.scroll_down(),
                    (_, KeyCode::Up) | (_, KeyCode::Char('k')) => state.scroll_up(),
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

/// Apply exports requested on the command line once a run completes.
fn handle_run_completed(args: &Cli, state: &mut UiState) {
    let Some(outcome) = state.last_outcome.as_ref() else {
        return;
    };
    let processed = orchestrator::process_run_completion(outcome, &args.export_targets());
    if !processed.export_messages.is_empty() {
        state.info = format!("{} | {}", state.info, processed.export_messages.join(" | "));
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(5),    // Schedule table
                Constraint::Length(8), // Run status
                Constraint::Length(1), // Info / key hints
            ]
            .as_ref(),
        )
        .split(area);

    draw_table(chunks[0], f, state);

    let status = Paragraph::new(state.status_lines())
        .block(Block::default().borders(Borders::ALL).title("Run"));
    f.render_widget(status, chunks[1]);

    let hint = Line::from(vec![
        Span::raw(state.info.clone()),
        Span::styled("  (? for help)", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(hint), chunks[2]);

    if state.show_help {
        draw_help_overlay(area, f);
    }
}

fn draw_table(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("solver-schedule");

    if state.headers.is_empty() {
        let msg = if state.running {
            "Waiting for solver output…"
        } else {
            "No schedule"
        };
        f.render_widget(Paragraph::new(msg).block(block), area);
        return;
    }

    let label_width = state
        .rows
        .iter()
        .filter_map(|r| r.first())
        .chain(state.headers.first())
        .map(|s| s.chars().count() as u16)
        .max()
        .unwrap_or(8)
        + 1;
    let cost_width = state
        .rows
        .iter()
        .filter_map(|r| r.last())
        .chain(state.headers.last())
        .map(|s| s.chars().count() as u16)
        .max()
        .unwrap_or(4)
        + 1;

    let mut widths = Vec::with_capacity(state.headers.len());
    widths.push(Constraint::Length(label_width));
    widths.extend((2..state.headers.len()).map(|_| Constraint::Fill(1)));
    widths.push(Constraint::Length(cost_width));

    let header = Row::new(state.headers.iter().map(|h| Cell::from(h.as_str())))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let last = state.rows.len().saturating_sub(1);
    let rows = state
        .rows
        .iter()
        .enumerate()
        .skip(state.row_offset)
        .map(|(i, row)| {
            let style = if i == last {
                // Duration row
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            Row::new(row.iter().map(|c| Cell::from(c.as_str()))).style(style)
        });

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}

fn draw_help_overlay(area: Rect, f: &mut ratatui::Frame) {
    let w = area.width.min(60);
    let h = area.height.min(11);
    let overlay = Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    };
    help::draw_help(overlay, f);
}
