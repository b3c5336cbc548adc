//! Main TUI application.

use crate::components::{
    menu_items, AssetDetail, AssetGraphView, ContextMenuState, Footer, Header, InstancePages,
    MenuAction, MenuOutcome, NodeCache, TabBar, TabBarProps,
};
use crate::components::footer::{CATALOG_HELP, GRAPH_HELP, INSTANCE_HELP};
use crate::graph::{derive_status, GraphLayout, Move, ScrollOffset};
use crate::refresh::RefreshState;
use crate::routes::{catalog_path, InstanceTab, Route};
use crate::signals::{KindInfoSignal, LaunchDispatcher};
use crate::ui::{centered_fixed, centered_rect, Theme};
use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use dagdeck_core::{AssetGraph, NodeDefinition, KIND_TAG_KEY};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// How long a status message stays in the footer.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Startup options of the console.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Label of the health tab; "Daemons" when unset
    pub health_title: Option<String>,
    pub poll_interval: Duration,
    /// Shown in the header and on the health tab
    pub snapshot_path: String,
    pub theme: Theme,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            health_title: None,
            poll_interval: Duration::from_secs(15),
            snapshot_path: String::new(),
            theme: Theme::default(),
        }
    }
}

/// State of the data feed, shown on the health tab.
#[derive(Debug, Clone)]
pub struct HealthInfo {
    pub snapshot_path: String,
    pub poll_interval: Duration,
    pub watcher_active: bool,
    pub last_reload: Option<DateTime<Local>>,
    pub last_error: Option<String>,
    pub reload_count: u64,
}

/// Main application state.
pub struct App {
    pub graph: AssetGraph,
    pub route: Route,
    pub should_quit: bool,
    pub show_help: bool,
    pub theme: Theme,
    pub refresh: RefreshState,
    pub health: HealthInfo,
    pub tick: usize,
    health_title: Option<String>,
    layout: GraphLayout,
    selected: Option<String>,
    scroll: ScrollOffset,
    menu: Option<ContextMenuState>,
    cache: NodeCache,
    dispatcher: Box<dyn LaunchDispatcher>,
    kind_signal: KindInfoSignal,
    kind_info: Rc<RefCell<Option<String>>>,
    reload_requested: bool,
    status_message: Option<(String, Instant)>, // Temporary status message with timestamp
}

impl App {
    pub fn new(graph: AssetGraph, config: AppConfig, dispatcher: Box<dyn LaunchDispatcher>) -> Self {
        let layout = GraphLayout::build(&graph);
        let selected = layout.first().map(String::from);

        // The console itself observes kind-info requests to show its overlay
        let kind_info = Rc::new(RefCell::new(None));
        let mut kind_signal = KindInfoSignal::new();
        let overlay = Rc::clone(&kind_info);
        kind_signal.subscribe(move |kind| *overlay.borrow_mut() = Some(kind.to_string()));

        Self {
            graph,
            route: Route::AssetGraph,
            should_quit: false,
            show_help: false,
            theme: config.theme,
            refresh: RefreshState::new(config.poll_interval),
            health: HealthInfo {
                snapshot_path: config.snapshot_path,
                poll_interval: config.poll_interval,
                watcher_active: false,
                last_reload: None,
                last_error: None,
                reload_count: 0,
            },
            tick: 0,
            health_title: config.health_title,
            layout,
            selected,
            scroll: ScrollOffset::default(),
            menu: None,
            cache: NodeCache::new(),
            dispatcher,
            kind_signal,
            kind_info,
            reload_requested: false,
            status_message: None,
        }
    }

    /// Register another observer of kind-info requests.
    pub fn subscribe_kind_info(&mut self, observer: impl FnMut(&str) + 'static) {
        self.kind_signal.subscribe(observer);
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn menu(&self) -> Option<&ContextMenuState> {
        self.menu.as_ref()
    }

    pub fn kind_info(&self) -> Option<String> {
        self.kind_info.borrow().clone()
    }

    /// Node the keyboard acts on: the catalog asset, or the graph selection.
    pub fn current_node(&self) -> Option<&NodeDefinition> {
        match &self.route {
            Route::AssetCatalog(key) => self.graph.node_by_key(key),
            Route::AssetGraph => self.selected.as_deref().and_then(|id| self.graph.node(id)),
            Route::Instance(_) => None,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Replace the graph with a freshly loaded one. Selection survives when
    /// the node still exists.
    pub fn update_graph(&mut self, graph: AssetGraph) {
        self.graph = graph;
        self.layout = GraphLayout::build(&self.graph);

        let still_there = self
            .selected
            .as_deref()
            .is_some_and(|id| self.layout.placement(id).is_some());
        if !still_there {
            self.selected = self.layout.first().map(String::from);
        }
        if let Some(menu) = &self.menu {
            if self.graph.node(&menu.node_id).is_none() {
                self.menu = None;
            }
        }

        self.refresh.mark_refreshed(Instant::now());
        self.health.last_reload = Some(Local::now());
        self.health.last_error = None;
        self.health.reload_count += 1;
        tracing::debug!("Graph updated with {} nodes", self.graph.nodes.len());
    }

    /// Record a failed reload. The current graph stays on screen.
    pub fn record_reload_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        tracing::warn!("Snapshot reload failed: {}", error);
        self.refresh.mark_refreshed(Instant::now());
        self.health.last_error = Some(error);
    }

    pub fn set_watcher_active(&mut self, active: bool) {
        self.health.watcher_active = active;
    }

    /// Whether a reload was asked for since the last call.
    pub fn take_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    /// Advance animation and the refresh countdown.
    pub fn on_tick(&mut self, now: Instant) {
        self.tick = self.tick.wrapping_add(1);
        if self.refresh.is_due(now) {
            self.refresh.mark_in_flight();
        }
    }

    fn request_reload(&mut self) {
        self.reload_requested = true;
        self.refresh.mark_in_flight();
    }

    /// Navigate by path. Unknown paths leave the current screen in place.
    pub fn navigate(&mut self, path: &str) {
        match Route::parse(path) {
            Some(route) => {
                if let Route::AssetCatalog(key) = &route {
                    if let Some(node) = self.graph.node_by_key(key) {
                        self.selected = Some(node.id.clone());
                    }
                }
                tracing::debug!("Navigating to {}", path);
                self.menu = None;
                self.route = route;
            }
            None => self.set_status(format!("Unknown page: {}", path)),
        }
    }

    fn move_selection(&mut self, direction: Move) {
        let next = match self.selected.as_deref() {
            Some(id) => self.layout.neighbor(id, direction).map(String::from),
            None => self.layout.first().map(String::from),
        };
        if let Some(next) = next {
            self.selected = Some(next);
        }
    }

    fn open_menu(&mut self) {
        let in_catalog = matches!(self.route, Route::AssetCatalog(_));
        let Some(node) = self.current_node() else {
            return;
        };
        let items = menu_items(node, self.graph.live_for(&node.id), in_catalog);
        self.menu = Some(ContextMenuState::new(node.id.clone(), items));
    }

    fn run_menu_action(&mut self, node_id: &str, action: MenuAction) {
        match action {
            MenuAction::Materialize => self.launch(node_id),
            MenuAction::Navigate(path) => self.navigate(&path),
        }
    }

    fn launch(&mut self, node_id: &str) {
        let Some(node) = self.graph.node(node_id) else {
            return;
        };
        let repository = node.repository.address();
        let name = node.display_name();
        tracing::info!(
            "Launching {} in {} ({})",
            node.op_name.as_deref().unwrap_or("<no op>"),
            self.graph.job_name,
            repository
        );
        self.dispatcher
            .launch(&repository, &self.graph.job_name, node.op_name.as_deref());
        self.set_status(format!("Launch requested for {}", name));
    }

    fn show_kind_info(&mut self) {
        let kind = self.current_node().and_then(|node| {
            node.metadata_entries
                .iter()
                .find(|entry| entry.label == KIND_TAG_KEY)
                .map(|entry| entry.text.clone())
        });
        match kind {
            Some(kind) => {
                self.kind_signal.emit(&kind);
            }
            None => self.set_status("No kind tag on this asset"),
        }
    }

    /// Copy the current asset's catalog link to clipboard.
    fn copy_link(&mut self) {
        let Some(node) = self.current_node() else {
            self.set_status("No asset selected");
            return;
        };
        let link = catalog_path(&node.asset_key);

        match arboard::Clipboard::new() {
            Ok(mut clipboard) => match clipboard.set_text(link) {
                Ok(()) => self.set_status("Catalog link copied to clipboard"),
                Err(_) => self.set_status("Failed to copy to clipboard"),
            },
            Err(_) => self.set_status("Clipboard not available"),
        }
    }

    fn tab_props(&self, tab: Option<InstanceTab>) -> TabBarProps<'_> {
        TabBarProps {
            selected_tab: tab.map_or("", InstanceTab::id),
            refresh: Some(&self.refresh),
            can_see_config: self.graph.instance.permissions.can_see_config,
            health_title: self.health_title.as_deref(),
        }
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // If an overlay is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }
        if self.kind_info.borrow_mut().take().is_some() {
            return;
        }

        // An open menu swallows every key
        if let Some(menu) = self.menu.as_mut() {
            match menu.handle_key(key) {
                MenuOutcome::Consumed => {}
                MenuOutcome::Closed => self.menu = None,
                MenuOutcome::Activated(action) => {
                    let node_id = menu.node_id.clone();
                    self.menu = None;
                    self.run_menu_action(&node_id, action);
                }
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => return self.quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return self.quit()
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return;
            }
            KeyCode::Char('r') => return self.request_reload(),
            _ => {}
        }

        match self.route.clone() {
            Route::AssetGraph => self.handle_graph_key(key),
            Route::Instance(tab) => self.handle_instance_key(key, tab),
            Route::AssetCatalog(_) => self.handle_catalog_key(key),
        }
    }

    fn handle_graph_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.move_selection(Move::Left),
            KeyCode::Char('l') | KeyCode::Right => self.move_selection(Move::Right),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(Move::Up),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(Move::Down),
            KeyCode::Char('m') | KeyCode::Enter => self.open_menu(),
            KeyCode::Char('i') => self.show_kind_info(),
            KeyCode::Char('y') => self.copy_link(),
            KeyCode::Char('c') => {
                if let Some(node) = self.current_node() {
                    let path = catalog_path(&node.asset_key);
                    self.navigate(&path);
                }
            }
            KeyCode::Tab => self.navigate(&InstanceTab::Overview.path()),
            _ => {}
        }
    }

    fn handle_instance_key(&mut self, key: KeyEvent, tab: InstanceTab) {
        let forward = match key.code {
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => true,
            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => false,
            KeyCode::Char('g') | KeyCode::Esc => return self.navigate("/"),
            _ => return,
        };
        let links = TabBar::links(&self.tab_props(Some(tab)));
        if let Some(href) = TabBar::neighbor(&links, forward).map(String::from) {
            self.navigate(&href);
        }
    }

    fn handle_catalog_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('m') | KeyCode::Enter => self.open_menu(),
            KeyCode::Char('i') => self.show_kind_info(),
            KeyCode::Char('y') => self.copy_link(),
            KeyCode::Char('g') | KeyCode::Esc => self.navigate("/"),
            _ => {}
        }
    }

    /// Poll for events and handle them.
    pub fn poll_events(&mut self, timeout: Duration) -> std::io::Result<bool> {
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Render the UI.
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header (1 line + borders)
                Constraint::Min(6),    // Main content
                Constraint::Length(1), // Footer
            ])
            .split(area);

        Header::render(
            frame,
            chunks[0],
            &self.graph,
            &self.health.snapshot_path,
            &self.theme,
        );

        let help = match self.route.clone() {
            Route::AssetGraph => {
                self.render_graph(frame, chunks[1]);
                GRAPH_HELP
            }
            Route::Instance(tab) => {
                let parts = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(3), Constraint::Min(3)])
                    .split(chunks[1]);
                TabBar::render(frame, parts[0], &self.tab_props(Some(tab)), &self.theme);
                InstancePages::render(frame, parts[1], tab, &self.graph, &self.health, &self.theme);
                INSTANCE_HELP
            }
            Route::AssetCatalog(key) => {
                AssetDetail::render(frame, chunks[1], &self.graph, &key, &self.theme, self.tick);
                CATALOG_HELP
            }
        };

        if let Some(menu) = &self.menu {
            menu.render(frame, chunks[1], &self.theme);
        }

        // Get recent status message (within 3 seconds)
        let status_msg = self.status_message.as_ref().and_then(|(msg, timestamp)| {
            (timestamp.elapsed() < STATUS_TTL).then_some(msg.as_str())
        });
        let tooltip = self
            .current_node()
            .and_then(|node| derive_status(self.graph.live_for(&node.id)).indicator)
            .map(|indicator| indicator.tooltip());
        Footer::render(frame, chunks[2], help, status_msg, tooltip, &self.theme);

        if let Some(kind) = self.kind_info() {
            self.render_kind_overlay(frame, &kind);
        }
        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_graph(&mut self, frame: &mut Frame, area: Rect) {
        let viewport = AssetGraphView::viewport(area);
        if let Some(id) = self.selected.as_deref() {
            self.scroll = self.layout.scroll_to_fit(
                id,
                self.scroll,
                viewport.width as usize,
                viewport.height as usize,
            );
        }

        let view = AssetGraphView {
            graph: &self.graph,
            layout: &self.layout,
            selected: self.selected.as_deref(),
            scroll: self.scroll,
            theme: &self.theme,
            tick: self.tick,
        };
        view.render(frame, area, &mut self.cache);
    }

    fn render_kind_overlay(&self, frame: &mut Frame, kind: &str) {
        let area = centered_fixed(48, 7, frame.area());
        let text = vec![
            Line::from(vec![
                Span::raw("Kind: "),
                Span::styled(
                    kind.to_string(),
                    Style::default()
                        .fg(self.theme.highlight)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from("Assets tagged with this kind are computed by"),
            Line::from(format!("{} tooling. Press any key to close.", kind)),
        ];

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(text)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" Kind ")),
            area,
        );
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let area = centered_rect(60, 70, frame.area());

        let help_text = r#"
  Keyboard Shortcuts
  ──────────────────

  Asset Graph
  ←↓↑→ / hjkl  Move selection
  m / Enter    Open node menu
  i            Show kind info
  y            Copy catalog link
  c            Open in asset catalog
  Tab          Instance pages

  Instance Pages
  ←/→ / Tab    Switch tab
  g / Esc      Back to graph

  Node Menu
  j/k / ↑↓     Choose item
  Enter        Run item
  Esc          Close menu

  Global
  r            Refresh now
  ?            This help
  q / Ctrl+C   Quit

  Press any key to close
"#;

        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help ")
                    .style(Style::default().bg(self.theme.muted)),
            )
            .style(Style::default().fg(self.theme.foreground).bg(self.theme.muted));

        frame.render_widget(paragraph, area);
    }
}
