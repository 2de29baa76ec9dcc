// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use log::{debug, info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use scriptorium_app::{
    AppCommand, AppEvent, AppState, AuthorDirectory, DetailController, DetailView, EntityKind,
    FetchError, InputMode, ListController, ListPayload, ListView, LoadOutcome, Record,
    RequestCounter, RequestId, Route, Theme, UNKNOWN_AUTHOR, preview,
};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const CARD_PREVIEW_CHARS: usize = 100;
const DETAIL_PREVIEW_CHARS: usize = 400;
const CARD_HEIGHT: usize = 3;

/// Result of loading one list screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListLoad {
    pub records: Vec<Record>,
    pub directory: AuthorDirectory,
    /// Non-fatal problem worth a status message, such as a missing author
    /// directory on the works screen.
    pub warning: Option<String>,
}

pub trait CatalogRuntime {
    fn load_list(&mut self, kind: EntityKind) -> Result<ListLoad, FetchError>;
    fn load_detail(&mut self, kind: EntityKind, id: &str) -> Result<Record, FetchError>;
    fn save_theme(&mut self, theme: Theme) -> Result<()>;
    fn export(&mut self, record: &Record, directory: &AuthorDirectory) -> Result<PathBuf>;

    fn spawn_list(
        &mut self,
        request: RequestId,
        kind: EntityKind,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self.load_list(kind);
        tx.send(InternalEvent::ListLoaded {
            request,
            kind,
            result,
        })
        .map_err(|_| anyhow!("list event channel closed"))?;
        Ok(())
    }

    fn spawn_detail(
        &mut self,
        request: RequestId,
        kind: EntityKind,
        id: &str,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self.load_detail(kind, id);
        tx.send(InternalEvent::DetailLoaded {
            request,
            kind,
            result,
        })
        .map_err(|_| anyhow!("detail event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    ListLoaded {
        request: RequestId,
        kind: EntityKind,
        result: Result<ListLoad, FetchError>,
    },
    DetailLoaded {
        request: RequestId,
        kind: EntityKind,
        result: Result<Record, FetchError>,
    },
}

#[derive(Debug)]
enum Screen {
    Home {
        cursor: usize,
    },
    List(ListController<Record>),
    Detail {
        controller: DetailController<Record>,
        expanded: bool,
    },
}

impl Default for Screen {
    fn default() -> Self {
        Self::Home { cursor: 0 }
    }
}

#[derive(Debug, Default)]
struct ViewData {
    screen: Screen,
    requests: RequestCounter,
    // Last author directory seen, for naming works on detail and export.
    directory: AuthorDirectory,
    // Id of the list card showing its full text.
    expanded_card: Option<String>,
    prompt: String,
    help_visible: bool,
    status_token: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Palette {
    background: Color,
    text: Color,
    muted: Color,
    accent: Color,
    error: Color,
    status: Color,
    selected_fg: Color,
    selected_bg: Color,
}

const fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            background: Color::White,
            text: Color::Black,
            muted: Color::DarkGray,
            accent: Color::Blue,
            error: Color::Red,
            status: Color::Magenta,
            selected_fg: Color::Black,
            selected_bg: Color::LightYellow,
        },
        Theme::Dark => Palette {
            background: Color::Black,
            text: Color::White,
            muted: Color::Gray,
            accent: Color::Cyan,
            error: Color::LightRed,
            status: Color::Yellow,
            selected_fg: Color::White,
            selected_bg: Color::DarkGray,
        },
    }
}

pub fn run_app<R: CatalogRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    info!(
        "event=ui_started route={} theme={}",
        state.route.path(),
        state.theme.as_str()
    );
    sync_screen(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    info!("event=ui_stopped");
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::ListLoaded {
                request,
                kind,
                result,
            } => apply_list_result(state, view_data, tx, request, kind, result),
            InternalEvent::DetailLoaded {
                request,
                kind,
                result,
            } => apply_detail_result(view_data, request, kind, result),
        }
    }
}

fn apply_list_result(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    request: RequestId,
    kind: EntityKind,
    result: Result<ListLoad, FetchError>,
) {
    let Screen::List(list) = &mut view_data.screen else {
        debug!(
            "event=stale_result_discarded screen=list kind={kind} request={}",
            request.get()
        );
        return;
    };
    if list.kind() != kind {
        debug!(
            "event=stale_result_discarded screen=list kind={kind} request={}",
            request.get()
        );
        return;
    }

    let (warning, directory) = match &result {
        Ok(load) => (
            load.warning.clone(),
            (!load.directory.is_empty()).then(|| load.directory.clone()),
        ),
        Err(_) => (None, None),
    };
    let payload = result.map(|load| ListPayload::with_context(load.records, load.directory));
    if list.finish_load(request, payload) == LoadOutcome::Stale {
        debug!(
            "event=stale_result_discarded screen=list kind={kind} request={}",
            request.get()
        );
        return;
    }
    match list.failure_detail() {
        Some(detail) => warn!("event=list_load_failed kind={kind} error={detail}"),
        None => info!("event=list_loaded kind={kind} count={}", list.items().len()),
    }

    if let Some(directory) = directory {
        view_data.directory = directory;
    }
    if let Some(warning) = warning {
        emit_status(state, view_data, tx, warning);
    }
}

fn apply_detail_result(
    view_data: &mut ViewData,
    request: RequestId,
    kind: EntityKind,
    result: Result<Record, FetchError>,
) {
    let Screen::Detail { controller, .. } = &mut view_data.screen else {
        debug!(
            "event=stale_result_discarded screen=detail kind={kind} request={}",
            request.get()
        );
        return;
    };
    if controller.kind() != kind {
        debug!(
            "event=stale_result_discarded screen=detail kind={kind} request={}",
            request.get()
        );
        return;
    }

    let failure = match &result {
        Err(error) if !error.is_not_found() => Some(error.to_string()),
        _ => None,
    };
    if controller.finish(request, result) == LoadOutcome::Stale {
        debug!(
            "event=stale_result_discarded screen=detail kind={kind} request={}",
            request.get()
        );
        return;
    }
    let id = controller.id().unwrap_or_default();
    match failure {
        Some(error) => warn!("event=detail_load_failed kind={kind} id={id} error={error}"),
        None => info!("event=detail_loaded kind={kind} id={id}"),
    }
}

/// Mounts the controller for the current route, or points the mounted detail
/// controller at a new id.
fn sync_screen<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    match state.route.clone() {
        Route::Home => {
            if !matches!(view_data.screen, Screen::Home { .. }) {
                view_data.screen = Screen::Home { cursor: 0 };
            }
        }
        Route::List(kind) => {
            if matches!(&view_data.screen, Screen::List(list) if list.kind() == kind) {
                return;
            }
            let request = view_data.requests.issue();
            let mut list = ListController::new(kind);
            list.begin_load(request);
            view_data.screen = Screen::List(list);
            view_data.expanded_card = None;
            debug!("event=list_mounted kind={kind} request={}", request.get());
            if let Err(error) = runtime.spawn_list(request, kind, tx.clone()) {
                warn!("event=list_spawn_failed kind={kind} error={error:#}");
                let _ = tx.send(InternalEvent::ListLoaded {
                    request,
                    kind,
                    result: Err(FetchError::network(format!("{error:#}"))),
                });
            }
        }
        Route::Detail(kind, id) => {
            if matches!(
                &view_data.screen,
                Screen::Detail { controller, .. }
                    if controller.kind() == kind && !controller.needs_fetch(&id)
            ) {
                return;
            }
            let request = view_data.requests.issue();
            match &mut view_data.screen {
                Screen::Detail {
                    controller,
                    expanded,
                } if controller.kind() == kind => {
                    controller.open(&id, request);
                    *expanded = false;
                }
                screen => {
                    let mut controller = DetailController::new(kind);
                    controller.open(&id, request);
                    *screen = Screen::Detail {
                        controller,
                        expanded: false,
                    };
                }
            }
            debug!(
                "event=detail_opened kind={kind} id={id} request={}",
                request.get()
            );
            if let Err(error) = runtime.spawn_detail(request, kind, &id, tx.clone()) {
                warn!("event=detail_spawn_failed kind={kind} id={id} error={error:#}");
                let _ = tx.send(InternalEvent::DetailLoaded {
                    request,
                    kind,
                    result: Err(FetchError::network(format!("{error:#}"))),
                });
            }
        }
    }
}

fn dispatch_and_sync<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    for event in state.dispatch(command) {
        match event {
            AppEvent::RouteChanged(route) => {
                debug!("event=route_changed path={}", route.path());
                sync_screen(state, runtime, view_data, tx);
            }
            AppEvent::ThemeChanged(theme) => {
                if let Err(error) = runtime.save_theme(theme) {
                    warn!("event=theme_save_failed theme={} error={error:#}", theme.as_str());
                    emit_status(state, view_data, tx, format!("theme not saved: {error:#}"));
                }
            }
            AppEvent::StatusUpdated(_) => arm_status_clear(view_data, tx),
            AppEvent::InputModeChanged(_) | AppEvent::StatusCleared => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn arm_status_clear(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    arm_status_clear(view_data, internal_tx);
}

fn handle_key_event<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(state, view_data, internal_tx, "help hidden");
        }
        return false;
    }

    match state.input {
        InputMode::Search => {
            handle_search_key(state, view_data, internal_tx, key);
            return false;
        }
        InputMode::RoutePrompt => {
            handle_route_prompt_key(state, runtime, view_data, internal_tx, key);
            return false;
        }
        InputMode::Browse => {}
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => {
            view_data.help_visible = true;
            emit_status(state, view_data, internal_tx, "help open");
        }
        KeyCode::Char('t') => {
            dispatch_and_sync(state, runtime, view_data, internal_tx, AppCommand::ToggleTheme);
        }
        KeyCode::Char(digit @ '1'..='5') => {
            let index = usize::from(digit as u8 - b'1');
            if let Some(kind) = EntityKind::ALL.get(index) {
                dispatch_and_sync(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    AppCommand::Navigate(Route::List(*kind)),
                );
            }
        }
        KeyCode::Char('/') => {
            dispatch_and_sync(state, runtime, view_data, internal_tx, AppCommand::FocusSearch);
        }
        KeyCode::Char(':') => {
            view_data.prompt.clear();
            dispatch_and_sync(
                state,
                runtime,
                view_data,
                internal_tx,
                AppCommand::OpenRoutePrompt,
            );
        }
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
            dispatch_and_sync(state, runtime, view_data, internal_tx, AppCommand::Back);
        }
        KeyCode::Char('j') | KeyCode::Down => move_cursor(view_data, CursorMove::Next),
        KeyCode::Char('k') | KeyCode::Up => move_cursor(view_data, CursorMove::Prev),
        KeyCode::Char('g') | KeyCode::Home => move_cursor(view_data, CursorMove::First),
        KeyCode::Char('G') | KeyCode::End => move_cursor(view_data, CursorMove::Last),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            if let Some(route) = enter_target(view_data) {
                dispatch_and_sync(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    AppCommand::Navigate(route),
                );
            }
        }
        KeyCode::Char('r') => retry_current(state, runtime, view_data, internal_tx),
        KeyCode::Char('x') => export_current(state, runtime, view_data, internal_tx),
        KeyCode::Char('m') => toggle_show_more(state, view_data, internal_tx),
        KeyCode::Char('a') => {
            follow_link(state, runtime, view_data, internal_tx, EntityKind::Author);
        }
        KeyCode::Char('w') => {
            follow_link(state, runtime, view_data, internal_tx, EntityKind::Work);
        }
        _ => {}
    }
    false
}

fn handle_search_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Screen::List(list) = &mut view_data.screen else {
        state.dispatch(AppCommand::ExitInput);
        return;
    };
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            state.dispatch(AppCommand::ExitInput);
            let shown = list.filtered_len();
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("{shown} {} shown", plural(shown, list_label_for(state))),
            );
        }
        KeyCode::Backspace => {
            let mut query = list.query().to_owned();
            query.pop();
            list.set_query(&query);
        }
        KeyCode::Down => list.select_next(),
        KeyCode::Up => list.select_prev(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => list.set_query(""),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let query = format!("{}{ch}", list.query());
            list.set_query(&query);
        }
        _ => {}
    }
}

fn list_label_for(state: &AppState) -> EntityKind {
    state.route.kind().unwrap_or(EntityKind::Article)
}

fn plural(count: usize, kind: EntityKind) -> String {
    if count == 1 {
        kind.label().to_owned()
    } else {
        kind.title().to_lowercase()
    }
}

fn handle_route_prompt_key<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.prompt.clear();
            state.dispatch(AppCommand::ExitInput);
        }
        KeyCode::Enter => {
            let input = std::mem::take(&mut view_data.prompt);
            state.dispatch(AppCommand::ExitInput);
            match Route::parse(&input) {
                Some(route) => dispatch_and_sync(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    AppCommand::Navigate(route),
                ),
                None => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("unknown route {input:?}"),
                ),
            }
        }
        KeyCode::Backspace => {
            view_data.prompt.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.prompt.push(ch);
        }
        _ => {}
    }
}

#[derive(Debug, Clone, Copy)]
enum CursorMove {
    Next,
    Prev,
    First,
    Last,
}

fn move_cursor(view_data: &mut ViewData, movement: CursorMove) {
    match &mut view_data.screen {
        Screen::Home { cursor } => {
            let last = EntityKind::ALL.len() - 1;
            *cursor = match movement {
                CursorMove::Next => (*cursor + 1).min(last),
                CursorMove::Prev => cursor.saturating_sub(1),
                CursorMove::First => 0,
                CursorMove::Last => last,
            };
        }
        Screen::List(list) => match movement {
            CursorMove::Next => list.select_next(),
            CursorMove::Prev => list.select_prev(),
            CursorMove::First => list.select_first(),
            CursorMove::Last => list.select_last(),
        },
        Screen::Detail { .. } => {}
    }
}

fn enter_target(view_data: &ViewData) -> Option<Route> {
    match &view_data.screen {
        Screen::Home { cursor } => EntityKind::ALL.get(*cursor).map(|kind| Route::List(*kind)),
        Screen::List(list) => list
            .selected()
            .map(|record| Route::detail(record.kind(), record.id())),
        Screen::Detail { .. } => None,
    }
}

fn toggle_show_more(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let expanded = match &mut view_data.screen {
        Screen::Detail { expanded, .. } => {
            *expanded = !*expanded;
            *expanded
        }
        Screen::List(list) => {
            let Some(id) = list.selected().map(|record| record.id().to_owned()) else {
                return;
            };
            if view_data.expanded_card.as_deref() == Some(id.as_str()) {
                view_data.expanded_card = None;
                false
            } else {
                view_data.expanded_card = Some(id);
                true
            }
        }
        Screen::Home { .. } => return,
    };
    let status = if expanded { "show less" } else { "show more" };
    emit_status(state, view_data, internal_tx, format!("m: {status}"));
}

fn current_record(view_data: &ViewData) -> Option<&Record> {
    match &view_data.screen {
        Screen::Home { .. } => None,
        Screen::List(list) => list.selected(),
        Screen::Detail { controller, .. } => controller.found(),
    }
}

fn retry_current<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let retryable = match &view_data.screen {
        Screen::List(list) => list.can_retry(),
        Screen::Detail { controller, .. } => controller.can_retry(),
        Screen::Home { .. } => false,
    };
    if !retryable {
        emit_status(state, view_data, internal_tx, "nothing to retry");
        return;
    }
    let request = view_data.requests.issue();
    let spawned = match &mut view_data.screen {
        Screen::List(list) => list.retry(request).then(|| {
            let kind = list.kind();
            info!("event=list_retry kind={kind} request={}", request.get());
            runtime.spawn_list(request, kind, internal_tx.clone())
        }),
        Screen::Detail { controller, .. } => controller.retry(request).then(|| {
            let kind = controller.kind();
            let id = controller.id().unwrap_or_default().to_owned();
            info!("event=detail_retry kind={kind} id={id} request={}", request.get());
            runtime.spawn_detail(request, kind, &id, internal_tx.clone())
        }),
        Screen::Home { .. } => None,
    };
    match spawned {
        None => emit_status(state, view_data, internal_tx, "nothing to retry"),
        Some(Err(error)) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("retry failed: {error:#}"),
        ),
        Some(Ok(())) => {}
    }
}

fn export_current<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(record) = current_record(view_data) else {
        emit_status(state, view_data, internal_tx, "nothing to export");
        return;
    };
    let kind = record.kind();
    let outcome = runtime.export(record, &view_data.directory);
    match outcome {
        Ok(path) => {
            info!("event=export_written kind={kind} path={}", path.display());
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("exported {}", path.display()),
            );
        }
        Err(error) => {
            warn!("event=export_failed kind={kind} error={error:#}");
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("export failed: {error:#}"),
            );
        }
    }
}

fn linked_route(record: &Record, target: EntityKind) -> Option<Route> {
    let id = match (record, target) {
        (Record::Work(work), EntityKind::Author) => work.author.id.as_ref()?.as_str(),
        (Record::Literature(literature), EntityKind::Author) => {
            literature.author.as_ref()?.id.as_ref()?.as_str()
        }
        (Record::Literature(literature), EntityKind::Work) => {
            literature.work.as_ref()?.id.as_ref()?.as_str()
        }
        _ => return None,
    };
    Some(Route::detail(target, id))
}

fn follow_link<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    target: EntityKind,
) {
    let route = current_record(view_data).and_then(|record| linked_route(record, target));
    match route {
        Some(route) => dispatch_and_sync(
            state,
            runtime,
            view_data,
            internal_tx,
            AppCommand::Navigate(route),
        ),
        None => emit_status(
            state,
            view_data,
            internal_tx,
            format!("no {} link here", target.label()),
        ),
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let colors = palette(state.theme);
    let base = Style::default().fg(colors.text).bg(colors.background);
    frame.render_widget(Block::default().style(base), frame.area());

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = state
        .route
        .kind()
        .and_then(|kind| EntityKind::ALL.iter().position(|candidate| *candidate == kind))
        .map_or(0, |index| index + 1);
    let titles = std::iter::once("Home".to_owned())
        .chain(
            EntityKind::ALL
                .iter()
                .enumerate()
                .map(|(index, kind)| format!("{} {}", index + 1, kind.title())),
        )
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title("scriptorium")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.accent)),
        )
        .style(base)
        .highlight_style(
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match &view_data.screen {
        Screen::Home { cursor } => {
            let body = Paragraph::new(home_lines(*cursor, colors))
                .block(Block::default().borders(Borders::ALL).title("sections"));
            frame.render_widget(body, layout[1]);
        }
        Screen::List(list) => render_list(
            frame,
            layout[1],
            state,
            list,
            view_data.expanded_card.as_deref(),
            colors,
        ),
        Screen::Detail {
            controller,
            expanded,
        } => {
            let style = match controller.view() {
                DetailView::Failed(_) => Style::default().fg(colors.error),
                DetailView::NotFound(_) | DetailView::Idle | DetailView::Loading => {
                    Style::default().fg(colors.muted)
                }
                DetailView::Found(_) => base,
            };
            let body = Paragraph::new(render_detail_text(
                controller,
                &view_data.directory,
                *expanded,
            ))
            .style(style)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(state.route.title()),
            );
            frame.render_widget(body, layout[1]);
        }
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(colors.status))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, layout[2]);

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .style(base)
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn home_lines(cursor: usize, colors: Palette) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from("Browse the catalog. Pick a section with 1-5 or enter."),
        Line::from(""),
    ];
    for (index, kind) in EntityKind::ALL.iter().enumerate() {
        let text = format!(" {}  {}", index + 1, kind.title());
        let style = if index == cursor {
            Style::default()
                .fg(colors.selected_fg)
                .bg(colors.selected_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.text)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }
    lines
}

fn render_list(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    list: &ListController<Record>,
    expanded_card: Option<&str>,
    colors: Palette,
) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let searching = state.input == InputMode::Search;
    let search = if list.query().is_empty() && !searching {
        Paragraph::new(list.kind().search_hint()).style(Style::default().fg(colors.muted))
    } else {
        let cursor = if searching { "_" } else { "" };
        Paragraph::new(format!("{}{cursor}", list.query())).style(Style::default().fg(colors.text))
    };
    let border = if searching { colors.accent } else { colors.muted };
    frame.render_widget(
        search.block(
            Block::default()
                .borders(Borders::ALL)
                .title("search")
                .border_style(Style::default().fg(border)),
        ),
        sections[0],
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} ({})", list.kind().title(), list.filtered_len()));
    let body = match list.view() {
        ListView::Idle | ListView::Loading => {
            Paragraph::new("Loading...").style(Style::default().fg(colors.muted))
        }
        ListView::Failed(message) => Paragraph::new(vec![
            Line::from(message.to_owned()),
            Line::from(""),
            Line::from("press r to retry"),
        ])
        .style(Style::default().fg(colors.error)),
        ListView::Empty(message) => {
            Paragraph::new(message).style(Style::default().fg(colors.muted))
        }
        ListView::Items(records) => {
            let wrap_width = usize::from(sections[1].width.saturating_sub(4)).max(1);
            let mut lines = Vec::with_capacity(records.len() * CARD_HEIGHT);
            let mut selected_bottom = 0;
            for (index, record) in records.iter().enumerate() {
                let expanded = expanded_card == Some(record.id());
                let (headline, detail) = card_text(record, list.context(), expanded);
                let selected = index == list.cursor();
                let marker = if selected { "▸ " } else { "  " };
                let headline_style = if selected {
                    Style::default()
                        .fg(colors.selected_fg)
                        .bg(colors.selected_bg)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                        .fg(colors.accent)
                        .add_modifier(Modifier::BOLD)
                };
                lines.push(Line::from(Span::styled(
                    format!("{marker}{headline}"),
                    headline_style,
                )));
                let detail_rows = if expanded {
                    wrap_chars(&detail, wrap_width)
                } else {
                    vec![detail]
                };
                for row in detail_rows {
                    lines.push(Line::from(Span::styled(
                        format!("  {row}"),
                        Style::default().fg(colors.muted),
                    )));
                }
                lines.push(Line::from(""));
                if selected {
                    selected_bottom = lines.len();
                }
            }
            let visible_rows = usize::from(sections[1].height.saturating_sub(2));
            let offset = scroll_offset(selected_bottom, visible_rows);
            Paragraph::new(lines).scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0))
        }
    };
    frame.render_widget(body.block(block), sections[1]);
}

/// First visible row so the selected card, ending at `card_bottom`, stays on
/// screen.
fn scroll_offset(card_bottom: usize, visible_rows: usize) -> usize {
    card_bottom.saturating_sub(visible_rows.max(CARD_HEIGHT))
}

/// Splits text into rows of at most `width` characters, breaking at spaces
/// where possible.
fn wrap_chars(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_len = 0;
    for word in text.split(' ') {
        let word_len = word.chars().count();
        if row_len > 0 && row_len + 1 + word_len > width {
            rows.push(std::mem::take(&mut row));
            row_len = 0;
        }
        if row_len > 0 {
            row.push(' ');
            row_len += 1;
        }
        for ch in word.chars() {
            if row_len == width {
                rows.push(std::mem::take(&mut row));
                row_len = 0;
            }
            row.push(ch);
            row_len += 1;
        }
    }
    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows
}

fn card_text(record: &Record, directory: &AuthorDirectory, expanded: bool) -> (String, String) {
    let summary = |text: &str| -> String {
        if expanded {
            text.to_owned()
        } else {
            preview(text, CARD_PREVIEW_CHARS)
        }
    };
    match record {
        Record::Article(article) => (article.title.clone(), summary(&article.content)),
        Record::Author(author) => (
            author.name.clone(),
            author
                .biography
                .as_deref()
                .map_or_else(|| "No biography available".to_owned(), summary),
        ),
        Record::HistorySection(section) => (
            section.title.clone(),
            format!(
                "{} · {}",
                section.historical_period,
                summary(&section.description)
            ),
        ),
        Record::Work(work) => (
            work.title.clone(),
            format!("{} · {}", work.genre, directory.resolve(&work.author)),
        ),
        Record::Literature(literature) => {
            let author = literature
                .author
                .as_ref()
                .map(|author| author.name.as_str())
                .filter(|name| !name.is_empty())
                .unwrap_or(UNKNOWN_AUTHOR);
            let genre = literature
                .work
                .as_ref()
                .and_then(|work| work.genre.as_deref())
                .unwrap_or("unknown genre");
            (record.headline().to_owned(), format!("{author} · {genre}"))
        }
    }
}

fn render_list_text(list: &ListController<Record>, expanded_card: Option<&str>) -> String {
    match list.view() {
        ListView::Idle | ListView::Loading => "Loading...".to_owned(),
        ListView::Failed(message) => format!("{message}\n\npress r to retry"),
        ListView::Empty(message) => message.to_owned(),
        ListView::Items(records) => records
            .iter()
            .map(|record| {
                let expanded = expanded_card == Some(record.id());
                let (headline, detail) = card_text(record, list.context(), expanded);
                format!("{headline}\n  {detail}")
            })
            .collect::<Vec<String>>()
            .join("\n"),
    }
}

fn render_detail_text(
    controller: &DetailController<Record>,
    directory: &AuthorDirectory,
    expanded: bool,
) -> String {
    let record = match controller.view() {
        DetailView::Idle | DetailView::Loading => return "Loading...".to_owned(),
        DetailView::NotFound(message) => return format!("{message}\n\nesc: back"),
        DetailView::Failed(message) => return format!("{message}\n\nr: retry | esc: back"),
        DetailView::Found(record) => record,
    };

    let long_text = |text: &str| -> String {
        if expanded {
            return text.to_owned();
        }
        let shown = preview(text, DETAIL_PREVIEW_CHARS);
        if shown == text {
            shown
        } else {
            format!("{shown}\n(m: show more)")
        }
    };

    let mut lines = match record {
        Record::Article(article) => vec![
            format!("Title: {}", article.title),
            String::new(),
            long_text(&article.content),
        ],
        Record::Author(author) => vec![
            format!("Name: {}", author.name),
            String::new(),
            author.biography.as_deref().map_or_else(
                || "No biography available".to_owned(),
                |bio| format!("Biography: {}", long_text(bio)),
            ),
        ],
        Record::HistorySection(section) => vec![
            format!("Title: {}", section.title),
            format!("Historical Period: {}", section.historical_period),
            String::new(),
            long_text(&section.description),
        ],
        Record::Work(work) => vec![
            format!("Title: {}", work.title),
            format!("Genre: {}", work.genre),
            format!("Author: {}", directory.resolve(&work.author)),
        ],
        Record::Literature(literature) => {
            let author = literature
                .author
                .as_ref()
                .map(|author| author.name.as_str())
                .filter(|name| !name.is_empty())
                .unwrap_or(UNKNOWN_AUTHOR);
            let mut lines = vec![format!("Author: {author}")];
            if let Some(work) = &literature.work {
                lines.push(format!("Work: {}", work.title));
                if let Some(genre) = &work.genre {
                    lines.push(format!("Genre: {genre}"));
                }
            }
            lines
        }
    };

    let mut hints = vec!["esc: back", "x: export"];
    if linked_route(record, EntityKind::Author).is_some() {
        hints.push("a: author");
    }
    if linked_route(record, EntityKind::Work).is_some() {
        hints.push("w: work");
    }
    lines.push(String::new());
    lines.push(hints.join(" | "));
    lines.join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q or q quit | t theme | ? help | : go to route\n\
sections: 1 articles | 2 authors | 3 history sections | 4 works | 5 literatures\n\
nav: j/k move | g/G first/last | enter open | esc/backspace/h back\n\
list: / search (esc keeps query, ctrl+u clears) | m show more/less | r retry | x export\n\
detail: m show more/less | a author | w work | r retry | x export\n\
route prompt: type a path such as /works or /work-details/42, enter go, esc cancel"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let mode = match state.input {
        InputMode::Browse => "BROWSE",
        InputMode::Search => "SEARCH",
        InputMode::RoutePrompt => "ROUTE",
    };
    if state.input == InputMode::RoutePrompt {
        return format!("{mode} | :{}_ | enter go | esc cancel", view_data.prompt);
    }

    let hints = match (&view_data.screen, state.input) {
        (_, InputMode::Search) => "type to filter | esc done | ctrl+u clear",
        (Screen::Home { .. }, _) => "1-5 sections | j/k enter | t theme | ? help | q quit",
        (Screen::List(_), _) => "/ search | j/k enter | m more | x export | r retry | esc back | ? help",
        (Screen::Detail { .. }, _) => "esc back | x export | m more | a/w links | ? help",
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
