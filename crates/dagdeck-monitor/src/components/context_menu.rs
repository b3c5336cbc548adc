//! Node context menu.
//!
//! While open the menu owns the keyboard: every key is consumed here and
//! nothing reaches the graph selection underneath.

use crate::graph::layout::MAX_LABEL_CHARS;
use crate::routes::catalog_path;
use crate::ui::{centered_fixed, Theme};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dagdeck_core::{LiveStatus, NodeDefinition};
use dagdeck_parsers::{display_width, with_middle_truncation};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// What a menu item does when activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Launch the node's op
    Materialize,
    /// Navigate to a path
    Navigate(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub action: MenuAction,
}

/// Items of a node's menu. The catalog link is left out on the catalog page
/// itself.
pub fn menu_items(
    definition: &NodeDefinition,
    live: Option<&LiveStatus>,
    in_catalog: bool,
) -> Vec<MenuItem> {
    let verb = if live.is_some_and(|l| l.last_materialization.is_some()) {
        "Rematerialize"
    } else {
        "Materialize"
    };
    let name = with_middle_truncation(&definition.display_name(), MAX_LABEL_CHARS);

    let mut items = vec![MenuItem {
        label: format!("{} {}", verb, name),
        action: MenuAction::Materialize,
    }];
    if !in_catalog {
        items.push(MenuItem {
            label: "View in Asset Catalog".to_string(),
            action: MenuAction::Navigate(catalog_path(&definition.asset_key)),
        });
    }
    items
}

/// Result of a key press while the menu is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Key handled, menu stays open
    Consumed,
    /// Menu dismissed without action
    Closed,
    /// Item chosen; the menu closes
    Activated(MenuAction),
}

/// An open context menu.
#[derive(Debug, Clone)]
pub struct ContextMenuState {
    pub node_id: String,
    pub items: Vec<MenuItem>,
    pub selected: usize,
}

impl ContextMenuState {
    pub fn new(node_id: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            node_id: node_id.into(),
            items,
            selected: 0,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> MenuOutcome {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => MenuOutcome::Closed,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                MenuOutcome::Closed
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.items.is_empty() {
                    self.selected = (self.selected + 1) % self.items.len();
                }
                MenuOutcome::Consumed
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if !self.items.is_empty() {
                    self.selected = (self.selected + self.items.len() - 1) % self.items.len();
                }
                MenuOutcome::Consumed
            }
            KeyCode::Enter => self
                .items
                .get(self.selected)
                .map(|item| MenuOutcome::Activated(item.action.clone()))
                .unwrap_or(MenuOutcome::Closed),
            _ => MenuOutcome::Consumed,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let widest = self
            .items
            .iter()
            .map(|item| display_width(&item.label))
            .max()
            .unwrap_or(0);
        let popup = centered_fixed(
            (widest + 6) as u16,
            (self.items.len() + 2) as u16,
            area,
        );

        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if i == self.selected {
                    Line::from(Span::styled(
                        format!("▸ {}", item.label),
                        Style::default()
                            .fg(theme.highlight)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(
                        format!("  {}", item.label),
                        Style::default().fg(theme.foreground),
                    ))
                }
            })
            .collect();

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.highlight)),
            ),
            popup,
        );
    }
}
