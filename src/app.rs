use std::{collections::HashSet, time::Duration};

use color_eyre::{Result, eyre::eyre};
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::{select, sync::mpsc};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    filter::{self, FilterEvent},
    profile,
    state::ProfileStore,
    tui::{self, AppScreen, Event, TerminalGuard},
    ui::{
        chart::{STATE_CHART_VIEW_ID, StateChartView},
        filter::{FilterPanel, TAG_FILTER_VIEW_ID},
        graph::{RELATION_GRAPH_VIEW_ID, RelationGraphView},
        history::{HISTORY_VIEW_ID, HistoryView},
        timeline::{TIMELINE_VIEW_ID, TimelineView},
    },
    view::{Compose, ViewNode, ViewTree},
};

pub struct StatescopeApp {
    tick_rate: Duration,
    config: Config,
    store: ProfileStore,
    tags: Vec<String>,
    filters: Vec<FilterPanel>,
    tree: ViewTree,
    relation_graph: Option<ViewNode>,
    update_tx: mpsc::UnboundedSender<FilterEvent>,
    update_rx: Option<mpsc::UnboundedReceiver<FilterEvent>>,
    focus: Focus,
    history_scroll: usize,
    show_help: bool,
    show_debug: bool,
    debug_scroll: usize,
    notice: Option<String>,
    visible_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Filter,
    History,
}

impl StatescopeApp {
    pub async fn bootstrap(config: Config) -> Result<Self> {
        let store = ProfileStore::load(&config.data).await?;
        Ok(Self::assemble(store, config))
    }

    /// Wire the loaded record set into a full dashboard: extract the tag
    /// universe, build the filter panels, run the first derivation pass.
    fn assemble(store: ProfileStore, config: Config) -> Self {
        let tags = profile::distinct_tags(store.profiles());
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let mut app = Self {
            tick_rate: Duration::from_millis(config.tick),
            config,
            store,
            tags,
            filters: Vec::new(),
            tree: ViewTree::new(),
            relation_graph: None,
            update_tx,
            update_rx: Some(update_rx),
            focus: Focus::Filter,
            history_scroll: 0,
            show_help: false,
            show_debug: false,
            debug_scroll: 0,
            notice: None,
            visible_count: 0,
        };

        app.render_filters();
        app.update_all_views();

        info!(
            records = app.store.len(),
            tags = app.tags.len(),
            "dashboard assembled"
        );

        app
    }

    pub async fn run(mut self) -> Result<()> {
        info!("starting Statescope dashboard");

        let mut terminal = TerminalGuard::new()?;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let event_handle = tui::spawn_event_loop(tx, self.tick_rate);

        let mut update_rx = self
            .update_rx
            .take()
            .ok_or_else(|| eyre!("update channel receiver already taken"))?;

        loop {
            {
                let screen = self.screen();
                terminal.draw(|frame| tui::render_app(frame, &screen))?;
            }

            let exit_requested = select! {
                maybe_event = rx.recv() => {
                    match maybe_event {
                        Some(event) => self.handle_event(event).await,
                        None => true,
                    }
                }
                maybe_update = update_rx.recv() => {
                    match maybe_update {
                        Some(FilterEvent::Changed) => {
                            self.update_all_views();
                            false
                        }
                        None => true,
                    }
                }
                ctrl_c = tokio::signal::ctrl_c() => {
                    if let Err(err) = ctrl_c {
                        warn!(?err, "failed to listen for ctrl+c");
                    } else {
                        info!("received ctrl+c");
                    }
                    true
                }
            };

            if exit_requested {
                break;
            }
        }

        drop(terminal);
        drop(rx);

        if let Err(err) = event_handle.await {
            warn!(?err, "terminal event loop task ended unexpectedly");
        }

        info!("Statescope shutting down");
        Ok(())
    }

    fn screen(&self) -> AppScreen<'_> {
        let debug_json = if self.show_debug {
            self.relation_graph
                .as_ref()
                .map(|node| format!("{node:#?}"))
        } else {
            None
        };

        AppScreen {
            tree: &self.tree,
            data_path: &self.config.data,
            total: self.store.len(),
            visible: self.visible_count,
            tag_total: self.tags.len(),
            tag_checked: self.active_filters().len(),
            focus_filter: matches!(self.focus, Focus::Filter),
            history_scroll: self.history_scroll,
            show_help: self.show_help,
            debug_json,
            debug_scroll: self.debug_scroll,
            notice: self.notice.as_deref(),
        }
    }

    async fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Input(key) => {
                self.notice = None;

                if self.show_help {
                    return match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
                        KeyCode::Char('q')
                        | KeyCode::Char('Q')
                        | KeyCode::Esc
                        | KeyCode::Enter
                        | KeyCode::Char('?') => {
                            self.show_help = false;
                            false
                        }
                        _ => false,
                    };
                }

                if self.show_debug {
                    return match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
                        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            self.show_debug = false;
                            self.debug_scroll = 0;
                            false
                        }
                        KeyCode::Enter | KeyCode::Esc => {
                            self.show_debug = false;
                            self.debug_scroll = 0;
                            false
                        }
                        KeyCode::Up => {
                            self.debug_scroll = self.debug_scroll.saturating_sub(1);
                            false
                        }
                        KeyCode::Down => {
                            self.debug_scroll = self.debug_scroll.saturating_add(1);
                            false
                        }
                        KeyCode::PageUp => {
                            self.debug_scroll = self.debug_scroll.saturating_sub(10);
                            false
                        }
                        KeyCode::PageDown => {
                            self.debug_scroll = self.debug_scroll.saturating_add(10);
                            false
                        }
                        KeyCode::Home => {
                            self.debug_scroll = 0;
                            false
                        }
                        _ => false,
                    };
                }

                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
                    KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.show_debug = true;
                        self.debug_scroll = 0;
                        false
                    }
                    KeyCode::Char('?') => {
                        self.show_help = true;
                        false
                    }
                    KeyCode::Tab | KeyCode::BackTab => {
                        self.focus = match self.focus {
                            Focus::Filter => Focus::History,
                            Focus::History => Focus::Filter,
                        };
                        false
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        match self.focus {
                            Focus::Filter => self.move_filter_cursor(1),
                            Focus::History => self.scroll_history(1),
                        }
                        false
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        match self.focus {
                            Focus::Filter => self.move_filter_cursor(-1),
                            Focus::History => self.scroll_history(-1),
                        }
                        false
                    }
                    KeyCode::PageDown => {
                        self.scroll_history(10);
                        false
                    }
                    KeyCode::PageUp => {
                        self.scroll_history(-10);
                        false
                    }
                    KeyCode::Home => {
                        match self.focus {
                            Focus::Filter => self.move_filter_cursor(-(self.tags.len() as isize)),
                            Focus::History => self.history_scroll = 0,
                        }
                        false
                    }
                    KeyCode::End => {
                        match self.focus {
                            Focus::Filter => self.move_filter_cursor(self.tags.len() as isize),
                            Focus::History => {
                                self.history_scroll = self.visible_count.saturating_sub(1);
                            }
                        }
                        false
                    }
                    KeyCode::Char(' ') | KeyCode::Enter => {
                        if self.focus == Focus::Filter {
                            self.toggle_filter();
                        }
                        false
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        self.reload().await;
                        false
                    }
                    _ => false,
                }
            }
            Event::Resize(width, height) => {
                debug!(width, height, "terminal resized");
                false
            }
            Event::Tick => false,
        }
    }

    /// Build one panel per tag universe and attach it to the tree. A single
    /// panel today; [`Self::active_filters`] already unions across many.
    fn render_filters(&mut self) {
        let panel = FilterPanel::new(
            TAG_FILTER_VIEW_ID,
            self.tags.clone(),
            self.update_tx.clone(),
        );
        self.tree.render_or_update(panel.compose());
        self.filters.push(panel);
    }

    /// Union of every panel's checked tags; first sighting wins, duplicates
    /// dropped. Matching is unaffected by duplicates, the dedup just keeps
    /// the header count honest.
    fn active_filters(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut active = Vec::new();
        for panel in &self.filters {
            for tag in panel.checked_filters() {
                if seen.insert(tag.clone()) {
                    active.push(tag);
                }
            }
        }
        active
    }

    /// One derivation pass: project the active filters into a record
    /// subset, recompose every dependent view from scratch, reconcile each
    /// into the tree. The relation graph is composed along with the rest
    /// but only staged; nothing attaches it to the visible tree.
    fn update_all_views(&mut self) {
        let active = self.active_filters();
        let visible = filter::filtered_profiles(self.store.profiles(), &active);

        debug!(
            active = active.len(),
            visible = visible.len(),
            "recomposing views"
        );

        let history = HistoryView::new(HISTORY_VIEW_ID, &visible).compose();
        let chart =
            StateChartView::new(STATE_CHART_VIEW_ID, profile::state_counts(&visible)).compose();
        let timeline = TimelineView::new(TIMELINE_VIEW_ID, &visible).compose();
        let graph = RelationGraphView::new(RELATION_GRAPH_VIEW_ID, &visible).compose();

        self.visible_count = visible.len();
        self.tree.render_or_update(history);
        self.tree.render_or_update(chart);
        self.tree.render_or_update(timeline);
        self.relation_graph = Some(graph);

        self.history_scroll = self.history_scroll.min(self.visible_count.saturating_sub(1));
    }

    /// Re-read the dataset path and swap it in wholesale. Tag checks that
    /// survive the new tag universe stay checked; a failed reload keeps the
    /// previous data on screen.
    async fn reload(&mut self) {
        match ProfileStore::load(&self.config.data).await {
            Ok(next) => {
                self.store.replace(next);
                self.tags = profile::distinct_tags(self.store.profiles());
                for panel in &mut self.filters {
                    panel.rebuild(self.tags.clone());
                }
                self.reconcile_filter_panels();
                self.history_scroll = 0;
                self.update_all_views();
                self.notice = Some(format!("reloaded {} messages", self.store.len()));
                info!(records = self.store.len(), "dataset reloaded");
            }
            Err(err) => {
                warn!(%err, "reload failed, keeping previous dataset");
                self.notice = Some(format!("reload failed: {err}"));
            }
        }
    }

    fn move_filter_cursor(&mut self, delta: isize) {
        if let Some(panel) = self.filters.first_mut() {
            panel.move_cursor(delta);
        }
        self.reconcile_filter_panels();
    }

    fn toggle_filter(&mut self) {
        if let Some(panel) = self.filters.first_mut() {
            panel.toggle_current();
        }
        self.reconcile_filter_panels();
    }

    /// Re-project panel state into the tree so checkbox and cursor changes
    /// paint on the next frame; derived views follow via the channel.
    fn reconcile_filter_panels(&mut self) {
        let nodes: Vec<ViewNode> = self.filters.iter().map(Compose::compose).collect();
        for node in nodes {
            self.tree.render_or_update(node);
        }
    }

    fn scroll_history(&mut self, delta: isize) {
        let max = self.visible_count.saturating_sub(1) as isize;
        self.history_scroll = (self.history_scroll as isize + delta).clamp(0, max) as usize;
    }
}
