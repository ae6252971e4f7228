use std::{
    io::{self, Stdout},
    path::Path,
    time::{Duration, Instant},
};

use color_eyre::Result;
use crossterm::{
    event::{self, Event as CrosstermEvent, KeyEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use tokio::{sync::mpsc, task};
use tracing::{debug, error};

use crate::view::{
    ChartBody, FilterBody, GraphBody, HistoryBody, NodeBody, TimelineBody, ViewNode, ViewTree,
};

#[derive(Debug)]
pub enum Event {
    Input(KeyEvent),
    Tick,
    Resize(u16, u16),
}

/// Everything one frame needs, borrowed from the app for the duration of
/// the draw call.
#[derive(Debug)]
pub struct AppScreen<'a> {
    pub tree: &'a ViewTree,
    pub data_path: &'a Path,
    pub total: usize,
    pub visible: usize,
    pub tag_total: usize,
    pub tag_checked: usize,
    pub focus_filter: bool,
    pub history_scroll: usize,
    pub show_help: bool,
    pub debug_json: Option<String>,
    pub debug_scroll: usize,
    pub notice: Option<&'a str>,
}

pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        Ok(Self { terminal })
    }

    pub fn draw<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Frame<'_>),
    {
        self.terminal.draw(f)?;
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            error!(?err, "failed to disable raw mode");
        }

        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, LeaveAlternateScreen) {
            error!(?err, "failed to leave alternate screen");
        }

        if let Err(err) = self.terminal.show_cursor() {
            error!(?err, "failed to show cursor");
        }
    }
}

pub fn spawn_event_loop(
    tx: mpsc::UnboundedSender<Event>,
    tick_rate: Duration,
) -> task::JoinHandle<()> {
    task::spawn_blocking(move || {
        let mut last_tick = Instant::now();

        loop {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));

            match event::poll(timeout) {
                Ok(true) => match event::read() {
                    Ok(CrosstermEvent::Key(key)) => {
                        if tx.send(Event::Input(key)).is_err() {
                            break;
                        }
                    }
                    Ok(CrosstermEvent::Resize(w, h)) => {
                        if tx.send(Event::Resize(w, h)).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(err) => {
                        error!(?err, "failed to read terminal event");
                        break;
                    }
                },
                Ok(false) => {}
                Err(err) => {
                    error!(?err, "failed to poll terminal events");
                    break;
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if tx.send(Event::Tick).is_err() {
                    break;
                }
                last_tick = Instant::now();
            }
        }

        debug!("terminal event loop terminated");
    })
}

/// Paint pass: walk the composed view tree and turn node bodies into
/// terminal widgets. Filter nodes form the sidebar; everything else stacks
/// in the main column in tree order.
pub fn render_app(frame: &mut Frame<'_>, screen: &AppScreen<'_>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_header(frame, layout[0], screen);
    render_body(frame, layout[1], screen);
    render_footer(frame, layout[2]);

    if screen.show_help {
        render_help(frame);
    }

    if screen.debug_json.is_some() {
        render_debug(frame, screen);
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, screen: &AppScreen<'_>) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .title(format!(
            "Statescope — {} · {}/{} messages · {}/{} tags",
            screen.data_path.display(),
            screen.visible,
            screen.total,
            screen.tag_checked,
            screen.tag_total,
        ))
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(block, area);

    if let Some(notice) = screen.notice {
        let line = Paragraph::new(notice).style(Style::default().fg(Color::Yellow));
        frame.render_widget(
            line,
            Rect {
                x: area.x,
                y: area.y + 1,
                width: area.width,
                height: 1,
            },
        );
    }
}

fn render_body(frame: &mut Frame<'_>, area: Rect, screen: &AppScreen<'_>) {
    let (filters, views): (Vec<&ViewNode>, Vec<&ViewNode>) = screen
        .tree
        .nodes()
        .iter()
        .partition(|node| matches!(node.body(), NodeBody::Filter(_)));

    let main_area = if filters.is_empty() {
        area
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(26), Constraint::Min(0)])
            .split(area);
        render_sidebar(frame, columns[0], &filters, screen);
        columns[1]
    };

    if views.is_empty() {
        let placeholder = Paragraph::new("No views composed yet.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(placeholder, main_area);
        return;
    }

    let constraints: Vec<Constraint> = views
        .iter()
        .map(|node| view_constraint(node.body()))
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(main_area);

    for (node, row) in views.iter().zip(rows.iter()) {
        render_view(frame, *row, node, screen);
    }
}

fn view_constraint(body: &NodeBody) -> Constraint {
    match body {
        NodeBody::History(_) => Constraint::Percentage(40),
        NodeBody::StateChart(_) => Constraint::Length(12),
        NodeBody::Timeline(_) => Constraint::Min(6),
        NodeBody::RelationGraph(_) => Constraint::Min(6),
        NodeBody::Filter(_) => Constraint::Min(3),
    }
}

fn render_view(frame: &mut Frame<'_>, area: Rect, node: &ViewNode, screen: &AppScreen<'_>) {
    match node.body() {
        NodeBody::Filter(body) => render_filter_panel(frame, area, body, screen.focus_filter),
        NodeBody::History(body) => render_history(frame, area, body, screen),
        NodeBody::StateChart(body) => render_state_chart(frame, area, body),
        NodeBody::Timeline(body) => render_timeline(frame, area, body),
        NodeBody::RelationGraph(body) => render_graph(frame, area, body),
    }
}

fn render_sidebar(frame: &mut Frame<'_>, area: Rect, filters: &[&ViewNode], screen: &AppScreen<'_>) {
    let constraints = vec![Constraint::Ratio(1, filters.len() as u32); filters.len()];
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (node, slot) in filters.iter().zip(slots.iter()) {
        if let NodeBody::Filter(body) = node.body() {
            render_filter_panel(frame, *slot, body, screen.focus_filter);
        }
    }
}

fn render_filter_panel(frame: &mut Frame<'_>, area: Rect, body: &FilterBody, focused: bool) {
    let block = Block::default()
        .title("Filters")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
        .title_style(
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(block, area);

    if body.entries.is_empty() {
        let placeholder =
            Paragraph::new("No tags in dataset").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(placeholder, inner(area));
        return;
    }

    let items: Vec<ListItem> = body
        .entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let marker = if entry.checked { "[x]" } else { "[ ]" };
            let base = Style::default().fg(if entry.checked {
                Color::Green
            } else {
                Color::Gray
            });
            let style = if focused && idx == body.cursor {
                base.add_modifier(Modifier::BOLD).bg(Color::DarkGray)
            } else {
                base
            };
            ListItem::new(format!("{marker} {}", entry.tag)).style(style)
        })
        .collect();

    let list = List::new(items).block(Block::default());
    frame.render_widget(list, inner(area));
}

fn render_history(frame: &mut Frame<'_>, area: Rect, body: &HistoryBody, screen: &AppScreen<'_>) {
    let block = Block::default()
        .title(format!("History ({})", body.entries.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if screen.focus_filter {
            Color::DarkGray
        } else {
            Color::Cyan
        }))
        .title_style(
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(block, area);

    if body.entries.is_empty() {
        let placeholder = Paragraph::new("No messages match the checked tags.")
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true });
        frame.render_widget(placeholder, inner(area));
        return;
    }

    let items: Vec<ListItem> = body
        .entries
        .iter()
        .skip(screen.history_scroll)
        .map(|entry| {
            let mut title = vec![Span::styled(
                entry.label.clone(),
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            )];
            if !entry.tags.is_empty() {
                title.push(Span::styled(
                    format!("  [{}]", entry.tags.join(", ")),
                    Style::default().fg(Color::Cyan),
                ));
            }

            let mut lines = vec![Line::from(title)];
            if !entry.path.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {}", entry.path),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items).block(Block::default());
    frame.render_widget(list, inner(area));
}

fn render_state_chart(frame: &mut Frame<'_>, area: Rect, body: &ChartBody) {
    let block = Block::default()
        .title("State frequency")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title_style(
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(block, area);

    if body.bars.is_empty() {
        let placeholder =
            Paragraph::new("No states in view").style(Style::default().fg(Color::Gray));
        frame.render_widget(placeholder, inner(area));
        return;
    }

    let bars: Vec<Bar> = body
        .bars
        .iter()
        .map(|bar| {
            Bar::default()
                .label(Line::from(bar.state.clone()))
                .value(bar.count)
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(7)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    frame.render_widget(chart, inner(area));
}

fn render_timeline(frame: &mut Frame<'_>, area: Rect, body: &TimelineBody) {
    let block = Block::default()
        .title("Timelines")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title_style(
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(block, area);

    if body.rows.is_empty() {
        let placeholder =
            Paragraph::new("No timelines in view").style(Style::default().fg(Color::Gray));
        frame.render_widget(placeholder, inner(area));
        return;
    }

    let lines: Vec<Line> = body
        .rows
        .iter()
        .map(|row| {
            let label: String = row.label.chars().take(14).collect();
            let mut spans = vec![Span::styled(
                format!("{label:<15}"),
                Style::default().fg(Color::Gray),
            )];
            for state in &row.states {
                spans.push(Span::styled(
                    format!(" {state} "),
                    Style::default().fg(Color::Black).bg(state_color(state)),
                ));
                spans.push(Span::raw(" "));
            }
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner(area));
}

fn render_graph(frame: &mut Frame<'_>, area: Rect, body: &GraphBody) {
    let block = Block::default()
        .title("State graph")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title_style(
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(block, area);

    if body.nodes.is_empty() {
        let placeholder =
            Paragraph::new("No states in view").style(Style::default().fg(Color::Gray));
        frame.render_widget(placeholder, inner(area));
        return;
    }

    let mut lines = vec![Line::from(Span::styled(
        format!("states: {}", body.nodes.join(", ")),
        Style::default().fg(Color::Gray),
    ))];
    for edge in &body.edges {
        lines.push(Line::from(vec![
            Span::styled(format!("{} → {}", edge.from, edge.to), Style::default().fg(Color::Cyan)),
            Span::styled(format!("  ×{}", edge.count), Style::default().fg(Color::DarkGray)),
        ]));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner(area));
}

fn render_footer(frame: &mut Frame<'_>, area: Rect) {
    let content = Paragraph::new(
        "q quit · Tab focus · ↑/↓ move · Space toggle tag · PgUp/PgDn scroll · r reload · ? help",
    )
    .style(Style::default().fg(Color::DarkGray));

    frame.render_widget(content, area);
}

fn render_help(frame: &mut Frame<'_>) {
    let area = centered_rect(46, 14, frame.size());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title_style(
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(block, area);

    let lines = vec![
        help_line("q / Esc / Ctrl+C", "quit"),
        help_line("Tab / Shift+Tab", "switch focus"),
        help_line("↑/↓ or j/k", "move cursor / scroll"),
        help_line("Space / Enter", "toggle tag under cursor"),
        help_line("PgUp / PgDn", "scroll history by page"),
        help_line("Home / End", "jump to top / bottom"),
        help_line("r", "reload the dataset"),
        help_line("Ctrl+D", "inspect the staged state graph"),
        help_line("?", "toggle this help"),
    ];

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner(area));
}

fn render_debug(frame: &mut Frame<'_>, screen: &AppScreen<'_>) {
    let Some(debug_json) = &screen.debug_json else {
        return;
    };

    let frame_area = frame.size();
    let area = centered_rect(
        frame_area.width.saturating_sub(10).max(20),
        frame_area.height.saturating_sub(6).max(8),
        frame_area,
    );
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title("Staged graph")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title_style(
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(block, area);

    let scroll = screen.debug_scroll.min(u16::MAX as usize) as u16;
    let paragraph = Paragraph::new(debug_json.as_str())
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(paragraph, inner(area));
}

fn help_line(keys: &str, action: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{keys:<18}"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(action.to_string(), Style::default().fg(Color::Gray)),
    ])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

const STATE_PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::LightRed,
];

fn state_color(name: &str) -> Color {
    let sum: usize = name.bytes().map(usize::from).sum();
    STATE_PALETTE[sum % STATE_PALETTE.len()]
}
