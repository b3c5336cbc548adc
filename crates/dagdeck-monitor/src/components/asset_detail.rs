//! Asset catalog page.

use crate::components::asset_node::{AssetNodeProps, AssetNodeView};
use crate::routes::catalog_path;
use crate::ui::Theme;
use dagdeck_core::{AssetGraph, AssetKey, NodeDefinition};
use dagdeck_parsers::markdown_to_plaintext;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct AssetDetail;

impl AssetDetail {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        graph: &AssetGraph,
        key: &AssetKey,
        theme: &Theme,
        tick: usize,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.muted))
            .title(format!(" Asset Catalog - {} ", key.display_name()))
            .title_bottom(format!(" {} ", catalog_path(key)));

        let Some(definition) = graph.node_by_key(key) else {
            frame.render_widget(
                Paragraph::new(format!("Asset not found: {}", key.display_name())).block(block),
                area,
            );
            return;
        };

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let metadata = definition.metadata_tags();
        let props = AssetNodeProps {
            definition,
            live: graph.live_for(&definition.id),
            metadata: &metadata,
            selected: false,
            job_name: &graph.job_name,
            in_catalog: true,
        };
        let view = AssetNodeView::derive(&props);
        let node_lines = view.lines(theme, props.animation_frame(tick));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(node_lines.len() as u16),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(inner);

        frame.render_widget(Paragraph::new(node_lines), chunks[0]);
        frame.render_widget(
            Paragraph::new(Self::detail_lines(definition, theme)).wrap(Wrap { trim: false }),
            chunks[2],
        );
    }

    /// Definition details shown below the node box.
    pub fn detail_lines(definition: &NodeDefinition, theme: &Theme) -> Vec<Line<'static>> {
        let heading = Style::default()
            .fg(theme.highlight)
            .add_modifier(Modifier::BOLD);
        let label = Style::default().fg(theme.muted);
        let value = Style::default().fg(theme.foreground);

        let field = |name: &str, text: String| {
            Line::from(vec![
                Span::styled(format!("{:<12}", name), label),
                Span::styled(text, value),
            ])
        };

        let mut lines = vec![
            field("Repository", definition.repository.address().to_string()),
            field(
                "Op",
                definition.op_name.clone().unwrap_or_else(|| "—".to_string()),
            ),
        ];
        if let Some(partitions) = &definition.partition_definition {
            lines.push(field("Partitions", partitions.clone()));
        }
        if !definition.depends_on.is_empty() {
            let upstream: Vec<String> = definition
                .depends_on
                .iter()
                .map(AssetKey::display_name)
                .collect();
            lines.push(field("Upstream", upstream.join(", ")));
        }

        if !definition.metadata_entries.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Metadata", heading)));
            for entry in &definition.metadata_entries {
                lines.push(field(&entry.label, entry.text.clone()));
                if let Some(description) = &entry.description {
                    lines.push(Line::from(Span::styled(
                        format!("{:<12}{}", "", description),
                        label,
                    )));
                }
            }
        }

        if let Some(description) = definition.description.as_deref().filter(|d| !d.is_empty()) {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Description", heading)));
            lines.extend(
                markdown_to_plaintext(description)
                    .lines()
                    .map(|line| Line::from(Span::styled(line.to_string(), value))),
            );
        }

        lines
    }
}
