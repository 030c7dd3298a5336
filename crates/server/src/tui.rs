use std::collections::VecDeque;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table};

use crate::events::Severity;
use crate::server::ServerStats;

const MAX_LOG_LINES: usize = 500;

pub struct TuiState {
    logs: VecDeque<(Severity, String)>,
    scroll: usize,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            logs: VecDeque::with_capacity(MAX_LOG_LINES),
            scroll: 0,
        }
    }

    pub fn log(&mut self, severity: Severity, message: impl Into<String>) {
        if self.logs.len() >= MAX_LOG_LINES {
            self.logs.pop_front();
        }
        self.logs.push_back((severity, message.into()));
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log(Severity::Info, message);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = (self.scroll + 5).min(self.logs.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_sub(5);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = 0;
    }
}

pub fn render(frame: &mut Frame, state: &TuiState, stats: &ServerStats, leaderboard: &[(String, u32)]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[2]);

    render_header(frame, chunks[0], stats);
    render_capacity(frame, chunks[1], stats);
    render_leaderboard(frame, body[0], leaderboard);
    render_log(frame, body[1], state);
    render_help(frame, chunks[3]);
}

fn render_header(frame: &mut Frame, area: Rect, stats: &ServerStats) {
    let title = format!(" Starfall Room - Uptime: {} ", format_duration(stats.uptime_secs));

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let room = &stats.room;
    let line = Line::from(vec![
        Span::styled("Tick: ", Style::default().fg(Color::Gray)),
        Span::raw(format!("{}  ", room.tick)),
        Span::styled("Stars: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}  ", room.collectible_count),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled("Bombs: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}  ", room.hazard_count),
            Style::default().fg(Color::Red),
        ),
        Span::styled("Patches: ", Style::default().fg(Color::Gray)),
        Span::raw(format!(
            "{} (+{} / -{})  ",
            stats.patches_sent, stats.entries_updated, stats.entries_removed
        )),
        Span::styled("Dropped intents: ", Style::default().fg(Color::Gray)),
        Span::raw(stats.intents_dropped.to_string()),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_capacity(frame: &mut Frame, area: Rect, stats: &ServerStats) {
    let block = Block::default()
        .title(" Agents ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let room = &stats.room;
    let ratio = room.agent_count as f64 / room.max_agents.max(1) as f64;
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio.min(1.0))
        .label(format!("{}/{} agents", room.agent_count, room.max_agents));

    frame.render_widget(gauge, area);
}

fn render_leaderboard(frame: &mut Frame, area: Rect, leaderboard: &[(String, u32)]) {
    let block = Block::default()
        .title(" Leaderboard ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let rows = leaderboard.iter().enumerate().map(|(rank, (name, score))| {
        Row::new(vec![
            Cell::from(format!("{}.", rank + 1)),
            Cell::from(name.clone()),
            Cell::from(score.to_string()),
        ])
    });

    let header = Row::new(vec!["#", "Name", "Score"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(12),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}

fn render_log(frame: &mut Frame, area: Rect, state: &TuiState) {
    let block = Block::default()
        .title(" Events ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let visible = area.height.saturating_sub(2) as usize;
    let end = state.logs.len().saturating_sub(state.scroll);
    let start = end.saturating_sub(visible);

    let lines: Vec<Line> = state
        .logs
        .range(start..end)
        .map(|(severity, message)| {
            let color = match severity {
                Severity::Info => Color::White,
                Severity::Warn => Color::Yellow,
                Severity::Error => Color::Red,
            };
            Line::from(Span::styled(message.clone(), Style::default().fg(color)))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Controls ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let text = Paragraph::new("q/ESC quit  PgUp/PgDn scroll events  End latest")
        .block(block)
        .style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        );

    frame.render_widget(text, area);
}

fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}
