// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell as WidgetCell, Clear, Paragraph, Row, Table};
use std::collections::HashMap;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use vendorhub_app::{
    ActionMenu, ActionMenuState, AppCommand, AppState, ApplyOutcome, CapabilityOracle, Cell,
    ClickTarget, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PAGE_SIZE, DocumentUpload, FetchRequest, Focus,
    ItemVariant, ListController, MenuInput, MenuMetrics, MenuSource, Notice, NoticeKind, Page,
    Record, ResolvedMenus, ResourceKind, RowAction, SearchKey, Sidebar, TableClick, TableView,
    Tone, ViewCapabilities, descriptor, row_actions, table_spec,
};
use vendorhub_app::Rect as MenuRect;

const SIDEBAR_WIDTH: u16 = 26;
const TRIGGER_WIDTH: u16 = 4;
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Everything the terminal front end needs from the outside world. The CLI
/// wires it to the HTTP client and the settings store; tests use a fake.
pub trait AppRuntime {
    fn oracle(&self) -> &dyn CapabilityOracle;
    fn load_menus(&mut self) -> ResolvedMenus;
    fn fetch_list(&mut self, view: ResourceKind, request: &FetchRequest) -> Result<Page<Record>>;
    fn delete_record(&mut self, view: ResourceKind, id: i64) -> Result<()>;
    fn upload_document(
        &mut self,
        view: ResourceKind,
        id: i64,
        upload: &DocumentUpload,
    ) -> Result<()>;
    fn set_sidebar_collapsed(&mut self, collapsed: bool) -> Result<()>;
    fn logout(&mut self) -> Result<()>;

    fn page_size(&self) -> u32 {
        DEFAULT_PAGE_SIZE
    }

    fn max_upload_bytes(&self) -> u64 {
        DEFAULT_MAX_UPLOAD_BYTES
    }

    /// Runs a list fetch and reports back over `tx`. The default is
    /// synchronous; the real runtime moves the request to a worker thread.
    fn spawn_list_fetch(
        &mut self,
        view: ResourceKind,
        request: FetchRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self
            .fetch_list(view, &request)
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::ListLoaded {
            view,
            seq: request.seq,
            result,
        })
        .map_err(|_| anyhow::anyhow!("list event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearNotice {
        token: u64,
    },
    ListLoaded {
        view: ResourceKind,
        seq: u64,
        result: std::result::Result<Page<Record>, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DetailOverlay {
    title: String,
    fields: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UploadPrompt {
    view: ResourceKind,
    id: i64,
    title: String,
    path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingDelete {
    view: ResourceKind,
    id: i64,
    title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Panes {
    header: Rect,
    sidebar: Option<Rect>,
    search: Rect,
    table: Rect,
    footer: Rect,
    status: Rect,
}

/// Table interior split into the data columns and the action trigger
/// column. The first line of `body` is the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TableGeometry {
    body: Rect,
    triggers: Rect,
}

impl TableGeometry {
    fn row_at(&self, y: u16) -> Option<usize> {
        if y > self.body.y && y < self.body.bottom() {
            Some(usize::from(y - self.body.y - 1))
        } else {
            None
        }
    }

    fn trigger_button(&self, row: usize) -> MenuRect {
        MenuRect::new(
            i32::from(self.body.y) + 1 + row as i32,
            i32::from(self.triggers.x),
            i32::from(self.triggers.width),
            1,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ViewData {
    sidebar: Sidebar,
    lists: HashMap<ResourceKind, ListController<Record>>,
    page_size: u32,
    caps: Option<ViewCapabilities>,
    selected_row: usize,
    action_menu: ActionMenuState,
    detail: Option<DetailOverlay>,
    upload: Option<UploadPrompt>,
    confirm_delete: Option<PendingDelete>,
    notice_token: u64,
    viewport: Rect,
}

impl ViewData {
    fn new(sidebar: Sidebar, page_size: u32) -> Self {
        Self {
            sidebar,
            lists: HashMap::new(),
            page_size,
            caps: None,
            selected_row: 0,
            action_menu: ActionMenuState::default(),
            detail: None,
            upload: None,
            confirm_delete: None,
            notice_token: 0,
            viewport: Rect::new(0, 0, 80, 24),
        }
    }

    fn list_mut(&mut self, view: ResourceKind) -> &mut ListController<Record> {
        let page_size = self.page_size;
        self.lists
            .entry(view)
            .or_insert_with(|| ListController::new(page_size))
    }

    fn list(&self, view: ResourceKind) -> Option<&ListController<Record>> {
        self.lists.get(&view)
    }

    fn rows(&self, view: ResourceKind) -> &[Record] {
        self.list(view).map(ListController::rows).unwrap_or(&[])
    }

    fn has_overlay(&self) -> bool {
        self.detail.is_some() || self.upload.is_some() || self.confirm_delete.is_some()
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let (internal_tx, internal_rx) = mpsc::channel();
    let mut view_data = start_session(state, runtime, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        match terminal.size() {
            Ok(size) => view_data.viewport = Rect::new(0, 0, size.width, size.height),
            Err(error) => {
                result = Err(error).context("read terminal size");
                break;
            }
        }
        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse_event(state, runtime, &mut view_data, &internal_tx, mouse);
                }
                Event::Resize(_, _) => view_data.action_menu.close(),
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(
        io::stdout(),
        terminal::LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("leave alternate screen")?;
    result
}

/// Resolves menus for the signed-in user and opens the first view they may
/// read.
fn start_session<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    internal_tx: &Sender<InternalEvent>,
) -> ViewData {
    let menus = runtime.load_menus();
    let fallback = menus.source == MenuSource::Fallback;
    let mut view_data = ViewData::new(
        Sidebar::new(menus.nodes, state.sidebar_collapsed),
        runtime.page_size(),
    );

    if fallback {
        emit_notice(
            state,
            &mut view_data,
            internal_tx,
            Notice::info("server menu unavailable; showing default navigation"),
        );
    } else if state.notice.is_some() {
        view_data.notice_token = view_data.notice_token.saturating_add(1);
        schedule_notice_clear(internal_tx, view_data.notice_token);
    }

    let first = view_data
        .sidebar
        .routable_views()
        .into_iter()
        .find(|view| descriptor(*view).evaluate(runtime.oracle()).can_view);
    match first {
        Some(view) => {
            view_data.sidebar.select_view(view);
            switch_view(state, runtime, &mut view_data, internal_tx, view);
        }
        None => emit_notice(
            state,
            &mut view_data,
            internal_tx,
            Notice::info("no list views are available for this account"),
        ),
    }
    view_data
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearNotice { token } if token == view_data.notice_token => {
                state.dispatch(AppCommand::ClearNotice);
            }
            InternalEvent::ClearNotice { .. } => {}
            InternalEvent::ListLoaded { view, seq, result } => {
                handle_list_loaded(state, view_data, tx, view, seq, result);
            }
        }
    }
}

fn handle_list_loaded(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    view: ResourceKind,
    seq: u64,
    result: std::result::Result<Page<Record>, String>,
) {
    let outcome = view_data
        .list_mut(view)
        .apply(seq, result.map_err(anyhow::Error::msg));
    match outcome {
        ApplyOutcome::Applied => {
            if state.active_view == Some(view) {
                view_data.action_menu.close();
                let last = view_data.rows(view).len().saturating_sub(1);
                view_data.selected_row = view_data.selected_row.min(last);
            }
        }
        ApplyOutcome::Failed => {
            let message = view_data
                .list(view)
                .and_then(ListController::last_error)
                .unwrap_or("unknown error")
                .to_owned();
            emit_notice(
                state,
                view_data,
                tx,
                Notice::error(format!("could not load {}: {message}", view.label())),
            );
        }
        ApplyOutcome::Stale => {}
    }
}

fn schedule_notice_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(NOTICE_TTL);
        let _ = sender.send(InternalEvent::ClearNotice { token });
    });
}

fn emit_notice(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    notice: Notice,
) {
    state.dispatch(AppCommand::ShowNotice(notice));
    view_data.notice_token = view_data.notice_token.saturating_add(1);
    schedule_notice_clear(internal_tx, view_data.notice_token);
}

fn dispatch_fetch<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    view: ResourceKind,
    request: FetchRequest,
) {
    if let Err(error) = runtime.spawn_list_fetch(view, request, internal_tx.clone()) {
        emit_notice(
            state,
            view_data,
            internal_tx,
            Notice::error(format!("could not start fetch: {error:#}")),
        );
    }
}

fn switch_view<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    view: ResourceKind,
) {
    let caps = descriptor(view).evaluate(runtime.oracle());
    if !caps.can_view {
        emit_notice(
            state,
            view_data,
            internal_tx,
            Notice::error(format!("you do not have access to {}", view.label())),
        );
        return;
    }

    tracing::debug!(view = view.as_str(), "switching view");
    state.dispatch(AppCommand::SelectView(view));
    view_data.caps = Some(caps);
    view_data.selected_row = 0;
    view_data.action_menu.close();
    let request = view_data.list_mut(view).mount();
    dispatch_fetch(state, runtime, view_data, internal_tx, view, request);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if view_data.confirm_delete.is_some() {
        handle_confirm_key(state, runtime, view_data, internal_tx, key);
        return false;
    }
    if view_data.upload.is_some() {
        handle_upload_key(state, runtime, view_data, internal_tx, key);
        return false;
    }
    if view_data.detail.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            view_data.detail = None;
        }
        return false;
    }
    if view_data.action_menu.is_open() {
        handle_action_menu_key(state, view_data, internal_tx, key);
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Tab, _) => {
            state.dispatch(AppCommand::NextFocus);
            return false;
        }
        (KeyCode::BackTab, _) => {
            state.dispatch(AppCommand::PrevFocus);
            return false;
        }
        (KeyCode::Char('b'), KeyModifiers::CONTROL) => {
            toggle_sidebar(state, runtime, view_data, internal_tx);
            return false;
        }
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => {
            logout(state, runtime, view_data);
            return true;
        }
        _ => {}
    }

    match state.focus {
        Focus::Sidebar => handle_sidebar_key(state, runtime, view_data, internal_tx, key),
        Focus::Search => {
            handle_search_key(state, runtime, view_data, internal_tx, key);
            false
        }
        Focus::Table => handle_table_key(state, runtime, view_data, internal_tx, key),
    }
}

fn handle_sidebar_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => view_data.sidebar.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => view_data.sidebar.move_cursor(-1),
        KeyCode::Char(' ') | KeyCode::Char('h') | KeyCode::Left => {
            view_data.sidebar.toggle_expanded();
        }
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            activate_sidebar_entry(state, runtime, view_data, internal_tx);
        }
        _ => {}
    }
    false
}

fn activate_sidebar_entry<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(entry) = view_data.sidebar.selected() else {
        return;
    };
    if entry.is_group {
        view_data.sidebar.toggle_expanded();
        return;
    }
    match entry.view() {
        Some(view) => switch_view(state, runtime, view_data, internal_tx, view),
        None => emit_notice(
            state,
            view_data,
            internal_tx,
            Notice::info(format!("{} has no list view here", entry.title)),
        ),
    }
}

fn handle_search_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(view) = state.active_view else {
        if key.code == KeyCode::Esc {
            state.dispatch(AppCommand::NextFocus);
        }
        return;
    };
    let search_key = match key.code {
        KeyCode::Esc => {
            state.dispatch(AppCommand::NextFocus);
            return;
        }
        KeyCode::Enter => SearchKey::Enter,
        KeyCode::Backspace => SearchKey::Backspace,
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => SearchKey::Char(ch),
        _ => return,
    };
    if let Some(request) = view_data.list_mut(view).handle_search_key(search_key) {
        view_data.selected_row = 0;
        view_data.action_menu.close();
        dispatch_fetch(state, runtime, view_data, internal_tx, view, request);
    }
}

fn handle_table_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') {
        return true;
    }
    if key.code == KeyCode::Char('/') {
        state.dispatch(AppCommand::FocusSearch);
        return false;
    }
    let Some(view) = state.active_view else {
        return false;
    };
    let row_count = view_data.rows(view).len();

    let request = match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if view_data.selected_row + 1 < row_count {
                view_data.selected_row += 1;
            }
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
            None
        }
        KeyCode::Char('n') | KeyCode::PageDown => view_data.list_mut(view).next_page(),
        KeyCode::Char('p') | KeyCode::PageUp => view_data.list_mut(view).prev_page(),
        KeyCode::Char('r') => Some(view_data.list_mut(view).reset()),
        KeyCode::Char('R') => Some(view_data.list_mut(view).refresh()),
        KeyCode::Enter => {
            let target = ClickTarget::RowBody {
                row: view_data.selected_row,
            };
            if let Some(TableClick::RowClicked { index, .. }) =
                table_spec(view).click(view_data.rows(view), target)
            {
                open_detail(view_data, view, index);
            }
            None
        }
        KeyCode::Char('a') | KeyCode::Char('.') => {
            toggle_action_menu(state, view_data, internal_tx, view, view_data.selected_row);
            None
        }
        _ => None,
    };

    if let Some(request) = request {
        view_data.selected_row = 0;
        view_data.action_menu.close();
        dispatch_fetch(state, runtime, view_data, internal_tx, view, request);
    }
    false
}

fn handle_action_menu_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some((row, menu)) = open_menu(state, view_data) else {
        view_data.action_menu.close();
        return;
    };
    match key.code {
        KeyCode::Esc => view_data.action_menu.handle(MenuInput::Escape),
        KeyCode::Char('j') | KeyCode::Down => view_data.action_menu.move_highlight(&menu, 1),
        KeyCode::Char('k') | KeyCode::Up => view_data.action_menu.move_highlight(&menu, -1),
        KeyCode::Enter => {
            if let Some(action) = view_data.action_menu.select_highlighted(&menu) {
                run_row_action(state, view_data, internal_tx, row, action);
            }
        }
        _ => {}
    }
}

fn handle_confirm_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(pending) = view_data.confirm_delete.take() {
                delete_row(state, runtime, view_data, internal_tx, pending);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_data.confirm_delete = None;
        }
        _ => {}
    }
}

fn handle_upload_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(prompt) = view_data.upload.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => view_data.upload = None,
        KeyCode::Backspace => {
            prompt.path.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            prompt.path.push(ch);
        }
        KeyCode::Enter => {
            if let Some(prompt) = view_data.upload.take() {
                submit_upload(state, runtime, view_data, internal_tx, prompt);
            }
        }
        _ => {}
    }
}

fn handle_mouse_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mouse: MouseEvent,
) {
    match mouse.kind {
        MouseEventKind::ScrollUp
        | MouseEventKind::ScrollDown
        | MouseEventKind::ScrollLeft
        | MouseEventKind::ScrollRight => view_data.action_menu.handle(MenuInput::Scroll),
        MouseEventKind::Down(MouseButton::Left) => {
            handle_click(
                state,
                runtime,
                view_data,
                internal_tx,
                mouse.column,
                mouse.row,
            );
        }
        _ => {}
    }
}

fn handle_click<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    column: u16,
    row: u16,
) {
    if view_data.has_overlay() {
        return;
    }
    let panes = panes(view_data.viewport, state.sidebar_collapsed);
    let geometry = table_geometry(panes.table);
    let target = click_target(&geometry, &view_data.action_menu, column, row);

    if view_data.action_menu.is_open()
        && !matches!(
            target,
            ClickTarget::ActionItem { .. }
                | ClickTarget::ActionMenu { .. }
                | ClickTarget::ActionTrigger { .. }
        )
    {
        view_data.action_menu.handle(MenuInput::OutsidePress);
    }

    if let Some(sidebar) = panes.sidebar
        && hit(sidebar, column, row)
    {
        if row > sidebar.y {
            let index = usize::from(row - sidebar.y - 1);
            let delta = index as isize - view_data.sidebar.cursor() as isize;
            view_data.sidebar.move_cursor(delta);
            if view_data.sidebar.cursor() == index {
                activate_sidebar_entry(state, runtime, view_data, internal_tx);
            }
        }
        return;
    }

    let Some(view) = state.active_view else {
        return;
    };
    match table_spec(view).click(view_data.rows(view), target) {
        Some(TableClick::RowClicked { index, .. }) => {
            view_data.selected_row = index;
            open_detail(view_data, view, index);
        }
        Some(TableClick::ToggleActions { row }) => {
            view_data.selected_row = row;
            toggle_action_menu(state, view_data, internal_tx, view, row);
        }
        Some(TableClick::ActionChosen { row, item }) => {
            let Some((_, menu)) = open_menu(state, view_data) else {
                return;
            };
            if let Some(action) = view_data.action_menu.select(&menu, item) {
                run_row_action(state, view_data, internal_tx, row, action);
            }
        }
        None => {
            if let ClickTarget::RowBody { row } = target
                && row < view_data.rows(view).len()
            {
                view_data.selected_row = row;
            }
        }
    }
}

/// Classifies a screen position against the table and the open menu. The
/// menu is drawn on top, so it wins over whatever row lies beneath it.
fn click_target(
    geometry: &TableGeometry,
    menu: &ActionMenuState,
    column: u16,
    row: u16,
) -> ClickTarget {
    if let Some(open_row) = menu.open_row()
        && menu.contains(i32::from(row), i32::from(column))
    {
        return match menu.item_at(i32::from(row), i32::from(column), MenuMetrics::CELLS) {
            Some(item) => ClickTarget::ActionItem {
                row: open_row,
                item,
            },
            None => ClickTarget::ActionMenu { row: open_row },
        };
    }
    if let Some(index) = geometry.row_at(row) {
        if hit(geometry.triggers, column, row) {
            return ClickTarget::ActionTrigger { row: index };
        }
        if hit(geometry.body, column, row) {
            return ClickTarget::RowBody { row: index };
        }
    }
    if row == geometry.body.y && hit(geometry.body, column, row) {
        return ClickTarget::Header;
    }
    ClickTarget::Outside
}

fn open_menu(state: &AppState, view_data: &ViewData) -> Option<(usize, ActionMenu<RowAction>)> {
    let view = state.active_view?;
    let caps = view_data.caps?;
    let row = view_data.action_menu.open_row()?;
    let record = view_data.rows(view).get(row)?;
    Some((row, row_actions(&caps, record)))
}

fn toggle_action_menu(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    view: ResourceKind,
    row: usize,
) {
    let Some(caps) = view_data.caps else {
        return;
    };
    let Some(record) = view_data.rows(view).get(row) else {
        return;
    };
    let menu = row_actions(&caps, record);
    if menu.trigger().is_none() {
        emit_notice(
            state,
            view_data,
            internal_tx,
            Notice::info("no actions available for this row"),
        );
        return;
    }
    let geometry = table_geometry(panes(view_data.viewport, state.sidebar_collapsed).table);
    let viewport = MenuRect::new(
        i32::from(view_data.viewport.y),
        i32::from(view_data.viewport.x),
        i32::from(view_data.viewport.width),
        i32::from(view_data.viewport.height),
    );
    view_data.action_menu.toggle(
        row,
        &menu,
        geometry.trigger_button(row),
        viewport,
        MenuMetrics::CELLS,
    );
}

fn run_row_action(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    row: usize,
    action: RowAction,
) {
    let Some(view) = state.active_view else {
        return;
    };
    let Some(record) = view_data.rows(view).get(row).cloned() else {
        return;
    };
    tracing::debug!(view = view.as_str(), ?action, row, "row action");

    match action {
        RowAction::View => open_detail(view_data, view, row),
        RowAction::Delete | RowAction::UploadDocument => {
            let Some(id) = record.id() else {
                emit_notice(
                    state,
                    view_data,
                    internal_tx,
                    Notice::error(format!("{} has no server id", record.title())),
                );
                return;
            };
            if action == RowAction::Delete {
                view_data.confirm_delete = Some(PendingDelete {
                    view,
                    id,
                    title: record.title(),
                });
            } else {
                view_data.upload = Some(UploadPrompt {
                    view,
                    id,
                    title: record.title(),
                    path: String::new(),
                });
            }
        }
        RowAction::Edit | RowAction::Shortlist | RowAction::MarkWinner | RowAction::Export => {
            emit_notice(
                state,
                view_data,
                internal_tx,
                Notice::info(format!(
                    "{} is not available in the terminal client",
                    action_label(action)
                )),
            );
        }
    }
}

fn action_label(action: RowAction) -> &'static str {
    match action {
        RowAction::View => "view",
        RowAction::Edit => "edit",
        RowAction::UploadDocument => "upload",
        RowAction::Shortlist => "shortlist",
        RowAction::MarkWinner => "mark winner",
        RowAction::Export => "export",
        RowAction::Delete => "delete",
    }
}

fn open_detail(view_data: &mut ViewData, view: ResourceKind, row: usize) {
    let Some(record) = view_data.rows(view).get(row) else {
        return;
    };
    let title = record.title();
    let fields = match table_spec(view).render(std::slice::from_ref(record), false) {
        TableView::Rows { header, rows } => rows
            .into_iter()
            .next()
            .map(|rendered| {
                header
                    .into_iter()
                    .zip(rendered.cells.iter().map(Cell::display))
                    .collect()
            })
            .unwrap_or_default(),
        TableView::Loading | TableView::Empty(_) => Vec::new(),
    };
    view_data.detail = Some(DetailOverlay { title, fields });
}

fn delete_row<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    pending: PendingDelete,
) {
    match runtime.delete_record(pending.view, pending.id) {
        Ok(()) => {
            tracing::info!(view = pending.view.as_str(), id = pending.id, "deleted record");
            emit_notice(
                state,
                view_data,
                internal_tx,
                Notice::success(format!("deleted {}", pending.title)),
            );
            let request = view_data.list_mut(pending.view).refresh();
            dispatch_fetch(state, runtime, view_data, internal_tx, pending.view, request);
        }
        Err(error) => emit_notice(
            state,
            view_data,
            internal_tx,
            Notice::error(format!("delete failed: {error:#}")),
        ),
    }
}

fn submit_upload<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    prompt: UploadPrompt,
) {
    let upload = DocumentUpload::inspect(prompt.path.trim(), prompt.title.clone());
    if let Err(error) = upload.validate(runtime.max_upload_bytes()) {
        emit_notice(state, view_data, internal_tx, Notice::error(error.to_string()));
        return;
    }
    match runtime.upload_document(prompt.view, prompt.id, &upload) {
        Ok(()) => {
            emit_notice(
                state,
                view_data,
                internal_tx,
                Notice::success(format!(
                    "uploaded {} to {}",
                    upload.file_name(),
                    prompt.title
                )),
            );
            let request = view_data.list_mut(prompt.view).refresh();
            dispatch_fetch(state, runtime, view_data, internal_tx, prompt.view, request);
        }
        Err(error) => emit_notice(
            state,
            view_data,
            internal_tx,
            Notice::error(format!("upload failed: {error:#}")),
        ),
    }
}

fn toggle_sidebar<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    state.dispatch(AppCommand::ToggleSidebar);
    if view_data.sidebar.is_collapsed() != state.sidebar_collapsed {
        view_data.sidebar.toggle_collapsed();
    }
    view_data.action_menu.close();
    if let Err(error) = runtime.set_sidebar_collapsed(state.sidebar_collapsed) {
        tracing::warn!(error = %format!("{error:#}"), "could not save sidebar preference");
        emit_notice(
            state,
            view_data,
            internal_tx,
            Notice::error(format!("could not save sidebar preference: {error:#}")),
        );
    }
}

fn logout<R: AppRuntime>(state: &mut AppState, runtime: &mut R, view_data: &mut ViewData) {
    if let Err(error) = runtime.logout() {
        tracing::warn!(error = %format!("{error:#}"), "logout cleanup failed");
    }
    tracing::info!("signed out");
    state.dispatch(AppCommand::Logout);
    view_data.lists.clear();
    view_data.caps = None;
    view_data.action_menu.close();
    view_data.sidebar.replace_menus(Vec::new());
}

fn panes(area: Rect, sidebar_collapsed: bool) -> Panes {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(area);

    let (sidebar, main) = if sidebar_collapsed {
        (None, outer[1])
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
            .split(outer[1]);
        (Some(columns[0]), columns[1])
    };

    let main_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(main);

    Panes {
        header: outer[0],
        sidebar,
        search: main_rows[0],
        table: main_rows[1],
        footer: main_rows[2],
        status: outer[2],
    }
}

fn table_geometry(pane: Rect) -> TableGeometry {
    let inner = Block::default().borders(Borders::ALL).inner(pane);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(TRIGGER_WIDTH)])
        .split(inner);
    TableGeometry {
        body: columns[0],
        triggers: columns[1],
    }
}

fn hit(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let panes = panes(frame.area(), state.sidebar_collapsed);

    frame.render_widget(
        Paragraph::new(header_text(state)).block(Block::default().borders(Borders::ALL)),
        panes.header,
    );
    if let Some(area) = panes.sidebar {
        render_sidebar(frame, area, state, view_data);
    }
    render_search(frame, panes.search, state, view_data);
    render_table(frame, panes.table, state, view_data);
    frame.render_widget(Paragraph::new(footer_text(state, view_data)), panes.footer);
    render_status(frame, panes.status, state);

    if let Some(detail) = &view_data.detail {
        let area = centered_rect(60, 60, frame.area());
        frame.render_widget(Clear, area);
        let lines: Vec<Line<'_>> = detail
            .fields
            .iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{label:>12}  "), Style::default().fg(Color::Gray)),
                    Span::raw(value.clone()),
                ])
            })
            .collect();
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{} (esc to close)", detail.title)),
            ),
            area,
        );
    }

    if let Some(prompt) = &view_data.upload {
        let area = centered_rect(60, 20, frame.area());
        frame.render_widget(Clear, area);
        let body = vec![
            Line::from(format!("file for {}:", prompt.title)),
            Line::from(Span::styled(
                format!("{}_", prompt.path),
                Style::default().fg(Color::Cyan),
            )),
        ];
        frame.render_widget(
            Paragraph::new(body).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("upload document (enter to send, esc to cancel)"),
            ),
            area,
        );
    }

    if let Some(pending) = &view_data.confirm_delete {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(format!("delete {}? y/n", pending.title)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title("confirm"),
            ),
            area,
        );
    }

    render_action_menu(frame, state, view_data);
}

fn header_text(state: &AppState) -> String {
    let view = state
        .active_view
        .map(ResourceKind::label)
        .unwrap_or("no view");
    match &state.user {
        Some(user) => format!("vendorhub | {view} | {} ({})", user.name, user.role.as_str()),
        None => format!("vendorhub | {view}"),
    }
}

fn render_sidebar(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let focused = state.focus == Focus::Sidebar;
    let cursor = view_data.sidebar.cursor();
    let lines: Vec<Line<'_>> = view_data
        .sidebar
        .visible_entries()
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let marker = match (entry.is_group, entry.expanded) {
                (true, true) => "v ",
                (true, false) => "> ",
                (false, _) => "  ",
            };
            let mut style = Style::default();
            if entry.view().is_some() && entry.view() == state.active_view {
                style = style.add_modifier(Modifier::BOLD);
            }
            if index == cursor {
                style = if focused {
                    style.add_modifier(Modifier::REVERSED)
                } else {
                    style.bg(Color::DarkGray)
                };
            }
            Line::from(Span::styled(
                format!("{}{marker}{}", "  ".repeat(entry.depth), entry.title),
                style,
            ))
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_style(focused))
                .title("menu"),
        ),
        area,
    );
}

fn render_search(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let focused = state.focus == Focus::Search;
    let list = state.active_view.and_then(|view| view_data.list(view));
    let input = list.map(ListController::input).unwrap_or_default();
    let term = list
        .map(|list| list.query().search_term.as_str())
        .unwrap_or_default();
    let title = if term.is_empty() {
        "search".to_owned()
    } else {
        format!("search (filtered by \"{term}\")")
    };
    let text = if focused {
        format!("{input}_")
    } else {
        input.to_owned()
    };
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_style(focused))
                .title(title),
        ),
        area,
    );
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let focused = state.focus == Focus::Table;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused))
        .title(
            state
                .active_view
                .map(ResourceKind::label)
                .unwrap_or("nothing selected"),
        );
    let geometry = table_geometry(area);
    frame.render_widget(block, area);

    let Some(view) = state.active_view else {
        return;
    };
    let rows = view_data.rows(view);
    let loading = view_data.list(view).is_some_and(ListController::is_loading);
    match table_spec(view).render(rows, loading) {
        TableView::Loading => {
            frame.render_widget(
                Paragraph::new(format!("loading {}...", view.label()))
                    .style(Style::default().fg(Color::Gray)),
                geometry.body,
            );
        }
        TableView::Empty(message) => {
            frame.render_widget(
                Paragraph::new(message).style(Style::default().fg(Color::Gray)),
                geometry.body,
            );
        }
        TableView::Rows { header, rows: rendered } => {
            let widths = vec![Constraint::Min(8); header.len().max(1)];
            let header_row = Row::new(header.into_iter().map(WidgetCell::from)).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
            let body_rows = rendered.into_iter().enumerate().map(|(index, row)| {
                let style = if index == view_data.selected_row {
                    if focused {
                        Style::default().bg(Color::DarkGray)
                    } else {
                        Style::default().add_modifier(Modifier::UNDERLINED)
                    }
                } else {
                    Style::default()
                };
                Row::new(row.cells.into_iter().map(|cell| {
                    WidgetCell::from(cell.display()).style(tone_style(cell.tone()))
                }))
                .style(style)
            });
            frame.render_widget(Table::new(body_rows, widths).header(header_row), geometry.body);

            let caps = view_data.caps.unwrap_or(ViewCapabilities::none(view));
            let mut triggers = vec![Line::from("")];
            triggers.extend(rows.iter().enumerate().map(|(index, record)| {
                let trigger = row_actions(&caps, record).trigger().unwrap_or("");
                let style = if view_data.action_menu.open_row() == Some(index) {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                Line::from(Span::styled(format!(" {trigger}"), style))
            }));
            frame.render_widget(Paragraph::new(triggers), geometry.triggers);
        }
    }
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Neutral => Style::default(),
        Tone::Positive => Style::default().fg(Color::Green),
        Tone::Warning => Style::default().fg(Color::Yellow),
        Tone::Negative => Style::default().fg(Color::Red),
    }
}

fn footer_text(state: &AppState, view_data: &ViewData) -> String {
    let Some(view) = state.active_view else {
        return String::new();
    };
    let Some(list) = view_data.list(view) else {
        return String::new();
    };
    let query = list.query();
    let mut text = format!(" page {} of {}", query.page, query.total_pages);
    if let Some(total) = list.total_items() {
        text.push_str(&format!(" | {total} {}", view.label()));
    }
    if list.is_loading() {
        text.push_str(" | loading");
    } else if list.last_error().is_some() {
        text.push_str(" | last fetch failed");
    }
    text
}

fn status_text(state: &AppState) -> String {
    match state.focus {
        Focus::Sidebar => {
            "j/k move | enter open | space fold | tab focus | ctrl+b sidebar | ctrl+l logout | q quit"
        }
        Focus::Search => "type to search | enter apply | esc back",
        Focus::Table => {
            "j/k row | enter open | a actions | n/p page | r reset | / search | tab focus | q quit"
        }
    }
    .to_owned()
}

fn render_status(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState) {
    let line = match &state.notice {
        Some(notice) => {
            let color = match notice.kind {
                NoticeKind::Info => Color::Cyan,
                NoticeKind::Success => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            Line::from(Span::styled(
                notice.message.clone(),
                Style::default().fg(color),
            ))
        }
        None => Line::from(Span::styled(
            status_text(state),
            Style::default().fg(Color::Gray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Drawn after everything else so it sits above the table and overlays.
fn render_action_menu(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let Some(position) = view_data.action_menu.position() else {
        return;
    };
    let Some((_, menu)) = open_menu(state, view_data) else {
        return;
    };
    let area = clamp_to(position.rect(), frame.area());
    if area.width == 0 || area.height == 0 {
        return;
    }

    let highlighted = view_data.action_menu.highlighted();
    let lines: Vec<Line<'_>> = menu
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut style = match item.variant {
                ItemVariant::Default => Style::default(),
                ItemVariant::Danger => Style::default().fg(Color::Red),
            };
            if highlighted == Some(index) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(format!("{} {}", item.icon, item.label), style))
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn clamp_to(rect: MenuRect, bounds: Rect) -> Rect {
    let top = rect.top.clamp(i32::from(bounds.y), i32::from(bounds.bottom()));
    let left = rect.left.clamp(i32::from(bounds.x), i32::from(bounds.right()));
    let bottom = rect.bottom().clamp(top, i32::from(bounds.bottom()));
    let right = rect.right().clamp(left, i32::from(bounds.right()));
    Rect::new(
        u16::try_from(left).unwrap_or(0),
        u16::try_from(top).unwrap_or(0),
        u16::try_from(right - left).unwrap_or(0),
        u16::try_from(bottom - top).unwrap_or(0),
    )
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
