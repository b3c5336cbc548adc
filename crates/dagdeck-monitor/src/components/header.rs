//! Header component with materialization progress.

use crate::graph::status_counts;
use crate::ui::Theme;
use chrono::Local;
use dagdeck_core::AssetGraph;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge},
    Frame,
};

pub struct Header;

impl Header {
    pub fn render(frame: &mut Frame, area: Rect, graph: &AssetGraph, source: &str, theme: &Theme) {
        let counts = status_counts(graph);
        let materialized = counts.total - counts.never_materialized;

        let progress = if counts.total > 0 {
            (materialized as f64 / counts.total as f64) * 100.0
        } else {
            0.0
        };

        // Current date/time for right side
        let datetime = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        // Show the tail of the snapshot path when it does not fit
        let max_source_len = (area.width as usize).saturating_sub(45);
        let source_chars = source.chars().count();
        let source_display = if source_chars > max_source_len && max_source_len > 3 {
            let tail: String = source
                .chars()
                .skip(source_chars - max_source_len + 1)
                .collect();
            format!("…{}", tail)
        } else {
            source.to_string()
        };

        let mut title = vec![Span::raw(" dagdeck")];
        if counts.running > 0 {
            title.push(Span::styled(
                format!(" ▶ {} running", counts.running),
                Style::default().fg(theme.warning),
            ));
        }
        if counts.attention > 0 {
            title.push(Span::styled(
                format!(" ⚠ {} need attention", counts.attention),
                Style::default().fg(theme.error),
            ));
        }
        title.push(Span::styled(" │ ", Style::default().fg(theme.muted)));
        title.push(Span::styled(
            format!("{} ", source_display),
            Style::default().fg(theme.highlight),
        ));

        let datetime_line = Line::from(Span::styled(
            format!(" {} ", datetime),
            Style::default().fg(theme.warning),
        ))
        .alignment(Alignment::Right);

        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Line::from(title))
                    .title_top(datetime_line),
            )
            .gauge_style(Style::default().fg(theme.success))
            .percent(progress.min(100.0) as u16)
            .label(format!("{}/{} assets materialized", materialized, counts.total));

        frame.render_widget(gauge, area);
    }
}
