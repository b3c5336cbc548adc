//! Instance section tab bar - generates a title line with inline tab selection.

use crate::refresh::RefreshState;
use crate::routes::InstanceTab;
use crate::ui::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
    Frame,
};
use std::time::Instant;

/// Label of the health tab when no override is given.
pub const DEFAULT_HEALTH_TITLE: &str = "Daemons";

/// One navigation link of the bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabLink {
    pub id: &'static str,
    pub label: String,
    pub href: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TabBarProps<'a> {
    /// Id of the active tab. An id that matches no link selects nothing.
    pub selected_tab: &'a str,
    pub refresh: Option<&'a RefreshState>,
    pub can_see_config: bool,
    pub health_title: Option<&'a str>,
}

pub struct TabBar;

impl TabBar {
    /// Links in display order. The config link is only present when the
    /// viewer may see the instance configuration.
    pub fn links(props: &TabBarProps<'_>) -> Vec<TabLink> {
        InstanceTab::ALL
            .into_iter()
            .filter(|tab| *tab != InstanceTab::Config || props.can_see_config)
            .map(|tab| TabLink {
                id: tab.id(),
                label: Self::label(tab, props.health_title),
                href: tab.path(),
                selected: tab.id() == props.selected_tab,
            })
            .collect()
    }

    fn label(tab: InstanceTab, health_title: Option<&str>) -> String {
        match tab {
            InstanceTab::Overview => "Overview".to_string(),
            InstanceTab::Health => health_title.unwrap_or(DEFAULT_HEALTH_TITLE).to_string(),
            InstanceTab::Schedules => "Schedules".to_string(),
            InstanceTab::Sensors => "Sensors".to_string(),
            InstanceTab::Backfills => "Backfills".to_string(),
            InstanceTab::Config => "Configuration".to_string(),
        }
    }

    /// Generate a title Line with inline tab selection.
    /// Returns something like: " \[Overview\] Daemons Schedules "
    pub fn title_line(links: &[TabLink], theme: &Theme) -> Line<'static> {
        let mut spans = vec![Span::raw(" ")];

        for (i, link) in links.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", Style::default().fg(theme.muted)));
            }

            if link.selected {
                spans.push(Span::styled(
                    format!("[{}]", link.label),
                    Style::default()
                        .fg(theme.highlight)
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::styled(
                    link.label.clone(),
                    Style::default().fg(theme.muted),
                ));
            }
        }

        spans.push(Span::raw(" "));
        Line::from(spans)
    }

    /// Href of the link next to the selected one, wrapping around.
    pub fn neighbor(links: &[TabLink], forward: bool) -> Option<&str> {
        if links.is_empty() {
            return None;
        }
        let target = match links.iter().position(|l| l.selected) {
            Some(pos) if forward => (pos + 1) % links.len(),
            Some(pos) => (pos + links.len() - 1) % links.len(),
            None => 0,
        };
        Some(links[target].href.as_str())
    }

    /// Draw the bar as a bordered strip with the countdown on the right.
    pub fn render(frame: &mut Frame, area: Rect, props: &TabBarProps<'_>, theme: &Theme) {
        let links = Self::links(props);
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.muted))
            .title(Self::title_line(&links, theme));

        if let Some(refresh) = props.refresh {
            let countdown = Line::from(Span::styled(
                format!(" {} ", refresh.label(Instant::now())),
                Style::default().fg(theme.warning),
            ))
            .alignment(Alignment::Right);
            block = block.title_top(countdown);
        }

        frame.render_widget(block, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn props(selected: &str, can_see_config: bool) -> TabBarProps<'_> {
        TabBarProps {
            selected_tab: selected,
            refresh: None,
            can_see_config,
            health_title: None,
        }
    }

    fn ids(links: &[TabLink]) -> Vec<&str> {
        links.iter().map(|l| l.id).collect()
    }

    #[test]
    fn test_config_tab_follows_permission() {
        let hidden = TabBar::links(&props("overview", false));
        assert_eq!(
            ids(&hidden),
            vec!["overview", "health", "schedules", "sensors", "backfills"]
        );

        let shown = TabBar::links(&props("overview", true));
        assert_eq!(shown.len(), 6);
        let config = shown.last().unwrap();
        assert_eq!(config.label, "Configuration");
        assert_eq!(config.href, "/instance/config");
    }

    #[test]
    fn test_at_most_one_selected() {
        let links = TabBar::links(&props("sensors", true));
        let selected: Vec<_> = links.iter().filter(|l| l.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].href, "/instance/sensors");

        let none = TabBar::links(&props("runs", true));
        assert!(none.iter().all(|l| !l.selected));
    }

    #[test]
    fn test_health_title_override() {
        assert_eq!(TabBar::links(&props("health", false))[1].label, "Daemons");

        let mut custom = props("health", false);
        custom.health_title = Some("Health");
        assert_eq!(TabBar::links(&custom)[1].label, "Health");
    }

    #[test]
    fn test_title_line_brackets_selection() {
        let links = TabBar::links(&props("schedules", false));
        let text: String = TabBar::title_line(&links, &Theme::default())
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(text, " Overview Daemons [Schedules] Sensors Backfills ");
    }

    #[test]
    fn test_neighbor_wraps() {
        let links = TabBar::links(&props("backfills", false));
        assert_eq!(TabBar::neighbor(&links, true), Some("/instance/overview"));
        assert_eq!(TabBar::neighbor(&links, false), Some("/instance/sensors"));
    }

    #[test]
    fn test_render_shows_countdown_only_when_present() {
        let refresh = RefreshState::new(Duration::from_secs(15));
        let render = |props: TabBarProps<'_>| {
            let mut terminal = Terminal::new(TestBackend::new(100, 3)).unwrap();
            terminal
                .draw(|f| TabBar::render(f, f.area(), &props, &Theme::default()))
                .unwrap();
            terminal
                .backend()
                .buffer()
                .content()
                .iter()
                .map(|c| c.symbol())
                .collect::<String>()
        };

        let without = render(props("overview", false));
        assert!(without.contains("[Overview]"));
        assert!(!without.contains("Refreshing"));

        let mut with = props("overview", false);
        with.refresh = Some(&refresh);
        assert!(render(with).contains("Refreshing in 0:1"));
    }
}
