//! Footer component with keyboard shortcuts and status messages.

use crate::ui::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shortcuts on the asset graph.
pub const GRAPH_HELP: &str =
    "←↓↑→/hjkl:nav  m:menu  i:kind  y:copy link  c:catalog  Tab:instance  r:refresh  ?:help  q:quit";
/// Shortcuts on the instance pages.
pub const INSTANCE_HELP: &str = "←/→:tabs  g:graph  r:refresh  ?:help  q:quit";
/// Shortcuts on the catalog page.
pub const CATALOG_HELP: &str = "m:menu  Esc/g:graph  y:copy link  r:refresh  ?:help  q:quit";

pub struct Footer;

impl Footer {
    /// A status message wins over the tooltip, which wins over the help text.
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        help: &str,
        status_message: Option<&str>,
        tooltip: Option<&str>,
        theme: &Theme,
    ) {
        let version = format!("v{}", VERSION);

        // Split footer into left (help/status), right (version)
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(version.len() as u16 + 1),
            ])
            .split(area);

        let left_content = if let Some(msg) = status_message {
            Line::from(Span::styled(
                msg.to_string(),
                Style::default()
                    .fg(theme.highlight)
                    .add_modifier(Modifier::BOLD),
            ))
        } else if let Some(tip) = tooltip {
            Line::from(Span::styled(tip.to_string(), Style::default().fg(theme.warning)))
        } else {
            Line::from(Span::styled(help.to_string(), Style::default().fg(theme.muted)))
        };

        frame.render_widget(Paragraph::new(left_content), chunks[0]);

        let version_paragraph = Paragraph::new(Line::from(Span::styled(
            version,
            Style::default().fg(theme.muted),
        )));
        frame.render_widget(version_paragraph, chunks[1]);
    }
}
