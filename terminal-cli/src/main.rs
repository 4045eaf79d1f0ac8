use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::event::{Event as CEvent, EventStream, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use directories::ProjectDirs;
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Terminal;
use serde::{Deserialize, Serialize};
use tokio::select;
use tokio::sync::mpsc;

use railbird_client::{
    ControllerConfig, Directive, Engine, Error as ClientError, GateDirective, HandController,
    PacingToken, ScoreEvent,
};
use railbird_types::{
    ActionRequest, Card, EngineResponse, HandResult, PlayerAction, Seat, STARTING_CHIPS,
};

/// CLI flags (user-provided values override the persisted config)
#[derive(Parser, Debug)]
#[command(name = "railbird", about = "Heads-up practice table (real engine)")]
struct Args {
    /// Engine base URL (http://127.0.0.1:5000)
    #[arg(long)]
    engine: Option<String>,

    /// Delay before the surface reopens after a bot action, in ms
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// Mirror raw engine traffic into the log pane
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedConfig {
    engine: Option<String>,
    pacing_ms: Option<u64>,
    verbose: Option<bool>,
}

enum EngineCmd {
    StartHand,
    Submit(ActionRequest),
}

enum UiEvent {
    Started(railbird_client::Result<EngineResponse>),
    Acted(railbird_client::Result<EngineResponse>),
    GateTimer(PacingToken),
}

struct AppState {
    controller: HandController,
    raise_input: String,
    entering_raise: bool,
    awaiting_engine: bool,
    logs: Vec<String>,
    narration_seen: usize,
    status: String,
    hint: String,
    bot_message: Option<String>,
    player_message: Option<String>,
    banner: Option<String>,
    error_line: Option<String>,
    stack_reset_pending: bool,
    pacing: Duration,
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut cfg = load_config().unwrap_or_default();

    let engine_url = args
        .engine
        .clone()
        .or_else(|| cfg.engine.clone())
        .unwrap_or_else(|| "http://127.0.0.1:5000".to_string());
    let pacing_ms = args.pacing_ms.or(cfg.pacing_ms).unwrap_or(900);
    let verbose = args.verbose || cfg.verbose.unwrap_or(false);

    cfg.engine = Some(engine_url.clone());
    cfg.pacing_ms = Some(pacing_ms);
    cfg.verbose = Some(verbose);
    save_config(&cfg)?;
    init_logging(verbose);

    let engine = Engine::new(&engine_url).context("engine URL")?;
    let session_tag: String = engine.session_id().chars().take(8).collect();

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<EngineCmd>();
    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel::<UiEvent>();

    // Engine loop: one request in flight at a time, responses come back
    // in submission order.
    tokio::spawn(engine_loop(engine, cmd_rx, ui_tx.clone()));

    // TUI setup
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = AppState {
        controller: HandController::new(ControllerConfig::default()),
        raise_input: String::new(),
        entering_raise: false,
        awaiting_engine: true,
        logs: Vec::new(),
        narration_seen: 0,
        status: format!("Engine: {engine_url} | Session: {session_tag} | Pacing: {pacing_ms}ms"),
        hint: String::from("Dealing…"),
        bot_message: None,
        player_message: None,
        banner: None,
        error_line: None,
        stack_reset_pending: false,
        pacing: Duration::from_millis(pacing_ms),
        verbose,
    };

    let _ = cmd_tx.send(EngineCmd::StartHand);

    let mut events = EventStream::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(200);

    loop {
        terminal.draw(|f| draw_ui(f, &app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_millis(0));

        select! {
            maybe_ev = events.next() => {
                if let Some(Ok(ev)) = maybe_ev {
                    if handle_key_event(ev, &mut app, &cmd_tx)? {
                        break;
                    }
                }
            }
            Some(ui_msg) = ui_rx.recv() => {
                handle_ui_event(ui_msg, &mut app, &ui_tx);
            }
            _ = tokio::time::sleep(timeout) => {
                last_tick = Instant::now();
            }
        }
    }

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    terminal.show_cursor()?;
    Ok(())
}

async fn engine_loop(
    engine: Engine,
    mut commands: mpsc::UnboundedReceiver<EngineCmd>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
) {
    while let Some(cmd) = commands.recv().await {
        match cmd {
            EngineCmd::StartHand => {
                let result = engine.start_hand().await;
                let _ = ui_tx.send(UiEvent::Started(result));
            }
            EngineCmd::Submit(request) => {
                let result = engine.player_action(&request).await;
                let _ = ui_tx.send(UiEvent::Acted(result));
            }
        }
    }
}

fn handle_ui_event(event: UiEvent, app: &mut AppState, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    match event {
        UiEvent::Started(result) => {
            app.awaiting_engine = false;
            match result {
                Ok(response) => {
                    if app.verbose {
                        push_log(app, format!("← start: {} log lines", response.log.len()));
                    }
                    match app.controller.start_hand(&response) {
                        Ok(directive) => {
                            if directive.engine_error.is_none() {
                                begin_hand_display(app);
                            }
                            apply_directive(app, directive, ui_tx);
                        }
                        Err(err) => push_log(app, format!("⚠ {err}")),
                    }
                }
                Err(err) => connectivity_lost(app, &err, "press n to retry"),
            }
        }
        UiEvent::Acted(result) => {
            app.awaiting_engine = false;
            match result {
                Ok(response) => {
                    if app.verbose {
                        push_log(app, format!("← result: {:?}", response.result));
                    }
                    match app.controller.apply(&response) {
                        Ok(directive) => apply_directive(app, directive, ui_tx),
                        Err(err) => push_log(app, format!("⚠ {err}")),
                    }
                }
                Err(err) if err.is_connectivity() => {
                    // The request never completed; the turn is still ours.
                    app.controller.submission_failed();
                    connectivity_lost(app, &err, "your turn is restored");
                }
                Err(err) => {
                    push_log(app, format!("⚠ engine error: {err}"));
                    app.hint = String::from("Engine misbehaved; press n for a fresh hand");
                }
            }
        }
        UiEvent::GateTimer(token) => {
            if app.controller.fire_gate(token) {
                app.hint = act_hint();
            }
        }
    }
}

/// Resets the per-hand display state after a successful start.
fn begin_hand_display(app: &mut AppState) {
    app.narration_seen = 0;
    app.banner = None;
    app.bot_message = None;
    app.player_message = None;
    app.error_line = None;
    let stacks_reset = app
        .controller
        .snapshot()
        .is_some_and(|s| s.player_chips == STARTING_CHIPS && s.bot_chips == STARTING_CHIPS);
    if app.stack_reset_pending && stacks_reset {
        push_log(app, format!("Stacks reset to {STARTING_CHIPS}."));
    }
    app.stack_reset_pending = false;
}

fn apply_directive(app: &mut AppState, directive: Directive, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    if let Some(message) = &directive.engine_error {
        app.error_line = Some(format!("Engine rejected: {message}"));
        push_log(app, format!("⚠ {message}"));
        if app.controller.player_may_act() {
            app.hint = act_hint();
        }
        return;
    }
    app.error_line = None;
    sync_narration(app);

    if directive.clear_action_messages {
        app.bot_message = None;
        app.player_message = None;
    } else if let Some(line) = directive.messages.bot_action.clone() {
        app.bot_message = Some(line);
    }

    if directive.terminal {
        app.banner = Some(outcome_line(&directive));
        app.hint = String::from("Hand over: [n] next hand  [q] quit");
    }

    if let Some(ScoreEvent::BlindsUp(level)) = directive.score_event {
        push_log(app, format!("Blinds up: level {level}"));
    }

    match directive.gate {
        GateDirective::Open(Seat::Player) => app.hint = act_hint(),
        GateDirective::Open(Seat::Bot) | GateDirective::Remain => {
            if !directive.terminal {
                app.hint = String::from("Waiting for the engine…");
            }
        }
        GateDirective::OpenDelayed(token) => {
            app.hint = String::from("Bot is thinking…");
            let tx = ui_tx.clone();
            let pacing = app.pacing;
            tokio::spawn(async move {
                tokio::time::sleep(pacing).await;
                let _ = tx.send(UiEvent::GateTimer(token));
            });
        }
        GateDirective::ClosedForHand => {}
    }
}

/// Headline for a finished hand, preferring the engine's own winner line.
fn outcome_line(directive: &Directive) -> String {
    if let Some(winner) = &directive.messages.winner {
        return winner.clone();
    }
    match directive.result {
        HandResult::BotFolded => String::from("Bot folds: the pot is yours."),
        HandResult::BotEnded => String::from("Bot takes the hand."),
        HandResult::Showdown => String::from("Showdown."),
        _ => String::from("The hand is over."),
    }
}

fn connectivity_lost(app: &mut AppState, err: &ClientError, recovery: &str) {
    push_log(app, format!("⚠ engine unreachable: {err}"));
    app.error_line = Some(String::from("Engine unreachable"));
    app.hint = format!("Engine unreachable; {recovery}");
}

fn sync_narration(app: &mut AppState) {
    let fresh: Vec<String> = app.controller.narration()[app.narration_seen..].to_vec();
    app.narration_seen += fresh.len();
    for line in fresh {
        push_log(app, line);
    }
}

fn push_log(app: &mut AppState, line: String) {
    let ts = Local::now().format("%H:%M:%S");
    app.logs.push(format!("{ts} {line}"));
    if app.logs.len() > 300 {
        let excess = app.logs.len() - 300;
        app.logs.drain(0..excess);
    }
}

fn act_hint() -> String {
    String::from("Your turn: [f]old  [c]all/check  [r]aise")
}

fn handle_key_event(
    ev: CEvent,
    app: &mut AppState,
    cmd_tx: &mpsc::UnboundedSender<EngineCmd>,
) -> Result<bool> {
    if let CEvent::Key(KeyEvent { code, modifiers, .. }) = ev {
        match (code, modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => return Ok(true),
            (KeyCode::Char('d'), KeyModifiers::CONTROL) => return Ok(true),
            _ => {}
        }

        if app.entering_raise {
            match code {
                KeyCode::Char(c @ '0'..='9') => app.raise_input.push(c),
                KeyCode::Backspace => {
                    app.raise_input.pop();
                }
                KeyCode::Esc => {
                    app.entering_raise = false;
                    app.raise_input.clear();
                    app.hint = act_hint();
                }
                KeyCode::Enter => match app.raise_input.parse::<u64>() {
                    Ok(amount) if amount >= 1 => {
                        app.entering_raise = false;
                        app.raise_input.clear();
                        submit(app, cmd_tx, ActionRequest::raise(amount));
                    }
                    _ => {
                        // Local validation only; nothing goes on the wire.
                        app.hint = String::from("Enter a raise of at least 1");
                    }
                },
                _ => {}
            }
            return Ok(false);
        }

        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('f') => submit(app, cmd_tx, ActionRequest::fold()),
            KeyCode::Char('c') => submit(app, cmd_tx, ActionRequest::call()),
            KeyCode::Char('r') => {
                if app.controller.player_may_act() {
                    app.entering_raise = true;
                    app.raise_input.clear();
                    app.hint = String::from("Raise amount, then Enter (Esc cancels)");
                } else {
                    app.hint = String::from("Not your turn");
                }
            }
            KeyCode::Char('n') => request_new_hand(app, cmd_tx),
            _ => {}
        }
    }
    Ok(false)
}

fn submit(app: &mut AppState, cmd_tx: &mpsc::UnboundedSender<EngineCmd>, request: ActionRequest) {
    if app.awaiting_engine {
        app.hint = String::from("Waiting for the engine…");
        return;
    }
    match app.controller.begin_submission(&request) {
        Ok(()) => {
            app.player_message = Some(player_line(&request));
            app.awaiting_engine = true;
            app.hint = String::from("Waiting for the engine…");
            let _ = cmd_tx.send(EngineCmd::Submit(request));
        }
        Err(ClientError::Action(err)) => app.hint = err.to_string(),
        Err(ClientError::GateClosed) => app.hint = String::from("Not your turn"),
        Err(err) => app.hint = err.to_string(),
    }
}

fn player_line(request: &ActionRequest) -> String {
    match request.action {
        PlayerAction::Fold => String::from("You fold."),
        PlayerAction::Call => String::from("You call."),
        PlayerAction::Raise => match request.raise_amount {
            Some(amount) => format!("You raise {amount}."),
            None => String::from("You raise."),
        },
    }
}

fn request_new_hand(app: &mut AppState, cmd_tx: &mpsc::UnboundedSender<EngineCmd>) {
    if app.awaiting_engine {
        return;
    }
    let hand_live = app.controller.snapshot().is_some_and(|s| !s.hand_ended);
    if hand_live {
        app.hint = String::from("Hand still in progress");
        return;
    }
    app.stack_reset_pending = app
        .controller
        .snapshot()
        .is_some_and(|s| s.player_chips == 0 || s.bot_chips == 0);
    app.awaiting_engine = true;
    app.hint = String::from("Dealing…");
    let _ = cmd_tx.send(EngineCmd::StartHand);
}

fn draw_ui(f: &mut ratatui::Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(f.area());

    // Status line
    let score = app.controller.score();
    let status = Paragraph::new(format!(
        "{} | You {} · Bot {} | Hands {} | Level {}",
        app.status, score.player_wins, score.bot_wins, score.hands_played, score.blind_level
    ))
    .style(Style::default().fg(Color::Gray));
    f.render_widget(status, chunks[0]);

    // Main area split into table + log
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(chunks[1]);

    let table = List::new(render_table(app))
        .block(Block::default().borders(Borders::ALL).title("Table"));
    f.render_widget(table, main_chunks[0]);

    // Log pane
    let log_lines: Vec<Line> = app
        .logs
        .iter()
        .rev()
        .take((main_chunks[1].height.saturating_sub(2)) as usize)
        .rev()
        .map(|l| Line::raw(l.clone()))
        .collect();
    let log = Paragraph::new(log_lines)
        .block(Block::default().borders(Borders::ALL).title("Hand log"))
        .wrap(Wrap { trim: true });
    f.render_widget(log, main_chunks[1]);

    // Input strip + hint
    let input_block = Block::default().borders(Borders::ALL).title("Actions");
    f.render_widget(Clear, chunks[2]);
    f.render_widget(input_block, chunks[2]);

    let prompt = if app.entering_raise {
        format!("raise $ {}", app.raise_input)
    } else if app.controller.player_may_act() {
        act_hint()
    } else {
        app.hint.clone()
    };
    let inner = Rect {
        x: chunks[2].x + 1,
        y: chunks[2].y + 1,
        width: chunks[2].width.saturating_sub(2),
        height: 1,
    };
    f.render_widget(Paragraph::new(prompt), inner);
}

fn render_table(app: &AppState) -> Vec<ListItem<'static>> {
    let mut lines: Vec<ListItem> = Vec::new();
    let add = |lines: &mut Vec<ListItem>, label: &str, value: Vec<Span<'static>>| {
        let mut spans = vec![Span::styled(
            format!("{label}: "),
            Style::default().fg(Color::Yellow),
        )];
        spans.extend(value);
        lines.push(ListItem::new(Line::from(spans)));
    };
    let text = |value: String| vec![Span::raw(value)];

    let Some(snapshot) = app.controller.snapshot() else {
        lines.push(ListItem::new(Line::raw("Waiting for the first deal…")));
        return lines;
    };

    add(&mut lines, "Pot", text(snapshot.pot.to_string()));
    add(
        &mut lines,
        "You",
        text(format!("{} chips", snapshot.player_chips)),
    );
    add(
        &mut lines,
        "Bot",
        text(format!("{} chips", snapshot.bot_chips)),
    );
    add(
        &mut lines,
        "Blinds",
        text(format!("{}/{}", snapshot.small_blind, snapshot.big_blind)),
    );
    add(&mut lines, "Dealer", text(seat_name(Some(snapshot.dealer)).to_string()));
    add(&mut lines, "Turn", text(seat_name(snapshot.to_act).to_string()));
    if snapshot.current_bet > 0 && !snapshot.hand_ended {
        add(
            &mut lines,
            "Bet to match",
            text(snapshot.current_bet.to_string()),
        );
    }
    add(&mut lines, "Board", card_spans(&snapshot.community_cards));
    add(&mut lines, "Your cards", card_spans(&snapshot.player_hole));
    add(&mut lines, "Bot cards", hole_spans(snapshot.bot_hole.as_deref()));

    lines.push(ListItem::new(Line::raw("")));
    if let Some(message) = &app.bot_message {
        add(&mut lines, "Bot says", text(message.clone()));
    }
    if let Some(message) = &app.player_message {
        add(&mut lines, "You", text(message.clone()));
    }
    if let Some(error) = &app.error_line {
        lines.push(ListItem::new(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        ))));
    }
    if let Some(banner) = &app.banner {
        lines.push(ListItem::new(Line::from(Span::styled(
            banner.clone(),
            Style::default().fg(Color::Cyan),
        ))));
        let messages = app.controller.messages();
        if let Some(summary) = messages.summary_self {
            lines.push(ListItem::new(Line::raw(summary)));
        }
        if let Some(summary) = messages.summary_opponent {
            lines.push(ListItem::new(Line::raw(summary)));
        }
    }

    lines
}

fn seat_name(seat: Option<Seat>) -> &'static str {
    match seat {
        Some(Seat::Player) => "You",
        Some(Seat::Bot) => "Bot",
        None => "·",
    }
}

fn card_spans(cards: &[Card]) -> Vec<Span<'static>> {
    if cards.is_empty() {
        return vec![Span::styled("·", Style::default().fg(Color::Gray))];
    }
    cards
        .iter()
        .map(|card| {
            let style = if card.is_red() {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::White)
            };
            Span::styled(format!("{}{} ", card.rank(), card.suit_glyph()), style)
        })
        .collect()
}

fn hole_spans(hole: Option<&[Card]>) -> Vec<Span<'static>> {
    match hole {
        Some(cards) => card_spans(cards),
        None => vec![Span::styled("?? ??", Style::default().fg(Color::Gray))],
    }
}

fn init_logging(verbose: bool) {
    let Some(path) = log_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = std::fs::File::create(&path) else {
        return;
    };
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    // The alternate screen owns stdout, so traces go to a file.
    let _ = tracing_subscriber::fmt()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .try_init();
}

fn load_config() -> Option<PersistedConfig> {
    let path = config_path()?;
    let data = std::fs::read(path).ok()?;
    serde_json::from_slice(&data).ok()
}

fn save_config(cfg: &PersistedConfig) -> Result<()> {
    if let Some(path) = config_path() {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        std::fs::write(path, data)?;
    }
    Ok(())
}

fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "railbird", "terminal-cli").map(|d| d.config_dir().join("config.json"))
}

fn log_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "railbird", "terminal-cli").map(|d| d.config_dir().join("railbird.log"))
}
