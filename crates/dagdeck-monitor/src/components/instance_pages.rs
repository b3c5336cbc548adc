//! Instance section pages.

use crate::app::HealthInfo;
use crate::graph::status_counts;
use crate::routes::InstanceTab;
use crate::ui::Theme;
use dagdeck_core::{AssetGraph, InstanceItem};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};

pub struct InstancePages;

impl InstancePages {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        tab: InstanceTab,
        graph: &AssetGraph,
        health: &HealthInfo,
        theme: &Theme,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.muted));

        match tab {
            InstanceTab::Overview => Self::render_lines(
                frame,
                area,
                block,
                Self::overview_lines(graph, theme),
            ),
            InstanceTab::Health => {
                Self::render_lines(frame, area, block, Self::health_lines(health, theme))
            }
            InstanceTab::Schedules => {
                Self::render_items(frame, area, block, "schedules", &graph.instance.schedules, theme)
            }
            InstanceTab::Sensors => {
                Self::render_items(frame, area, block, "sensors", &graph.instance.sensors, theme)
            }
            InstanceTab::Backfills => {
                Self::render_items(frame, area, block, "backfills", &graph.instance.backfills, theme)
            }
            InstanceTab::Config => {
                Self::render_lines(frame, area, block, Self::config_lines(graph, theme))
            }
        }
    }

    fn render_lines(frame: &mut Frame, area: Rect, block: Block, lines: Vec<Line<'static>>) {
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }

    fn field(name: &str, value: String, theme: &Theme) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:<20}", name), Style::default().fg(theme.muted)),
            Span::styled(value, Style::default().fg(theme.foreground)),
        ])
    }

    pub fn overview_lines(graph: &AssetGraph, theme: &Theme) -> Vec<Line<'static>> {
        let counts = status_counts(graph);
        let count_line = |name: &str, count: usize, color| {
            Line::from(vec![
                Span::styled(format!("{:<20}", name), Style::default().fg(theme.muted)),
                Span::styled(
                    count.to_string(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ])
        };

        vec![
            Self::field("Job", graph.job_name.clone(), theme),
            Self::field(
                "Loaded",
                graph
                    .loaded_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
                theme,
            ),
            Line::from(""),
            count_line("Assets", counts.total, theme.foreground),
            count_line("Running", counts.running, theme.warning),
            count_line("Scheduled", counts.scheduled, theme.warning),
            count_line("Needs attention", counts.attention, theme.error),
            count_line("Upstream changed", counts.upstream_changed, theme.warning),
            count_line("Never materialized", counts.never_materialized, theme.muted),
        ]
    }

    pub fn health_lines(health: &HealthInfo, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = vec![
            Self::field("Snapshot", health.snapshot_path.clone(), theme),
            Self::field(
                "Poller",
                format!("every {}s", health.poll_interval.as_secs()),
                theme,
            ),
            Self::field(
                "File watcher",
                if health.watcher_active {
                    "watching".to_string()
                } else {
                    "inactive".to_string()
                },
                theme,
            ),
            Self::field("Reloads", health.reload_count.to_string(), theme),
            Self::field(
                "Last reload",
                health
                    .last_reload
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "never".to_string()),
                theme,
            ),
        ];

        let error = match &health.last_error {
            Some(err) => Span::styled(err.clone(), Style::default().fg(theme.error)),
            None => Span::styled("none", Style::default().fg(theme.success)),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<20}", "Last error"), Style::default().fg(theme.muted)),
            error,
        ]));
        lines
    }

    pub fn config_lines(graph: &AssetGraph, theme: &Theme) -> Vec<Line<'static>> {
        if !graph.instance.permissions.can_see_config {
            return vec![Line::from(Span::styled(
                "You do not have permission to view the instance configuration.",
                Style::default().fg(theme.muted),
            ))];
        }
        match &graph.instance.config_yaml {
            Some(yaml) => yaml
                .lines()
                .map(|line| {
                    Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(theme.foreground),
                    ))
                })
                .collect(),
            None => vec![Line::from(Span::styled(
                "No instance configuration in snapshot.",
                Style::default().fg(theme.muted),
            ))],
        }
    }

    fn render_items(
        frame: &mut Frame,
        area: Rect,
        block: Block,
        kind: &str,
        items: &[InstanceItem],
        theme: &Theme,
    ) {
        if items.is_empty() {
            Self::render_lines(
                frame,
                area,
                block,
                vec![Line::from(Span::styled(
                    format!("No {} in snapshot.", kind),
                    Style::default().fg(theme.muted),
                ))],
            );
            return;
        }

        let header = Row::new(["Name", "Status", "Detail"]).style(
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        );
        let rows = items.iter().map(|item| {
            Row::new([
                Span::styled(item.name.clone(), Style::default().fg(theme.foreground)),
                Span::styled(item.status.clone(), Self::status_style(&item.status, theme)),
                Span::styled(
                    item.detail.clone().unwrap_or_default(),
                    Style::default().fg(theme.muted),
                ),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(35),
                Constraint::Length(12),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .block(block);
        frame.render_widget(table, area);
    }

    fn status_style(status: &str, theme: &Theme) -> Style {
        let color = match status.to_ascii_uppercase().as_str() {
            "RUNNING" | "STARTED" | "COMPLETED" | "SUCCESS" => theme.success,
            "FAILED" | "FAILURE" | "ERROR" | "CANCELED" => theme.error,
            "REQUESTED" | "QUEUED" => theme.warning,
            _ => theme.foreground,
        };
        Style::default().fg(color)
    }
}
