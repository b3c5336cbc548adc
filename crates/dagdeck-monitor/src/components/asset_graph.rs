//! Asset graph viewport.
//!
//! Draws the visible part of the layered canvas. Node boxes come from the
//! render cache, so only nodes whose inputs changed are derived again.

use crate::components::asset_node::{AssetNodeProps, AssetNodeView, NodeRenderKey};
use crate::graph::{GraphLayout, ScrollOffset};
use crate::memo::{RenderCache, RenderOutcome};
use crate::ui::Theme;
use chrono::{Local, Utc};
use dagdeck_core::AssetGraph;
use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rendered node boxes keyed by node id.
pub type NodeCache = RenderCache<NodeRenderKey, Vec<Line<'static>>>;

pub struct AssetGraphView<'a> {
    pub graph: &'a AssetGraph,
    pub layout: &'a GraphLayout,
    pub selected: Option<&'a str>,
    pub scroll: ScrollOffset,
    pub theme: &'a Theme,
    pub tick: usize,
}

impl AssetGraphView<'_> {
    /// Area inside the border, where the canvas is drawn.
    pub fn viewport(area: Rect) -> Rect {
        Block::default().borders(Borders::ALL).inner(area)
    }

    /// Draw the graph. Returns how many node boxes were derived afresh.
    pub fn render(&self, frame: &mut Frame, area: Rect, cache: &mut NodeCache) -> usize {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.muted))
            .title(format!(" Asset Graph - {} assets ", self.graph.nodes.len()))
            .title_bottom(format!(" job {} ", self.graph.job_name));

        if self.graph.nodes.is_empty() {
            frame.render_widget(
                Paragraph::new("No assets in snapshot").block(block),
                area,
            );
            return 0;
        }

        let inner = Self::viewport(area);
        frame.render_widget(block, area);

        let view = Viewport {
            area: inner,
            scroll: self.scroll,
        };
        let now = Utc::now().timestamp();
        let mut rendered = 0;

        for placement in self.layout.placements() {
            let Some(definition) = self.graph.node(&placement.id) else {
                continue;
            };
            let Some(visible) = view.clip(
                placement.x,
                placement.y,
                placement.dims.cols(),
                placement.dims.rows(),
            ) else {
                continue;
            };

            let metadata = definition.metadata_tags();
            let props = AssetNodeProps {
                definition,
                live: self.graph.live_for(&definition.id),
                metadata: &metadata,
                selected: self.selected == Some(definition.id.as_str()),
                job_name: &self.graph.job_name,
                in_catalog: false,
            };
            let frame_no = props.animation_frame(self.tick);
            let (lines, outcome) = cache.get_or_render(
                &definition.id,
                props.render_key(self.theme, self.tick, now),
                || AssetNodeView::derive_at(&props, &Local, now).lines(self.theme, frame_no),
            );
            if outcome == RenderOutcome::Rendered {
                rendered += 1;
            }

            frame.render_widget(
                Paragraph::new(lines.clone()).scroll((visible.skip_rows, visible.skip_cols)),
                visible.rect,
            );
        }

        self.render_connectors(frame, &view);
        cache.retain(|id| self.layout.placement(id).is_some());
        rendered
    }

    fn render_connectors(&self, frame: &mut Frame, view: &Viewport) {
        let style = Style::default().fg(self.theme.muted);
        let buffer = frame.buffer_mut();

        for placement in self.layout.placements() {
            let Some(connector) = self.layout.connector(&placement.id) else {
                continue;
            };
            for row in connector.top..connector.bottom {
                let glyph = if row + 1 == connector.bottom { "▼" } else { "│" };
                if let Some((x, y)) = view.to_screen(connector.x, row) {
                    buffer.set_string(x, y, glyph, style);
                }
            }
        }
    }
}

/// Visible part of a canvas rectangle.
struct Visible {
    rect: Rect,
    skip_rows: u16,
    skip_cols: u16,
}

struct Viewport {
    area: Rect,
    scroll: ScrollOffset,
}

impl Viewport {
    fn clip(&self, x: usize, y: usize, width: usize, height: usize) -> Option<Visible> {
        let (sx, sy) = (self.scroll.x, self.scroll.y);
        let (vw, vh) = (self.area.width as usize, self.area.height as usize);

        let left = x.max(sx);
        let top = y.max(sy);
        let right = (x + width).min(sx + vw);
        let bottom = (y + height).min(sy + vh);
        if left >= right || top >= bottom {
            return None;
        }

        Some(Visible {
            rect: Rect {
                x: self.area.x + (left - sx) as u16,
                y: self.area.y + (top - sy) as u16,
                width: (right - left) as u16,
                height: (bottom - top) as u16,
            },
            skip_rows: (top - y) as u16,
            skip_cols: (left - x) as u16,
        })
    }

    fn to_screen(&self, x: usize, y: usize) -> Option<(u16, u16)> {
        let dx = x.checked_sub(self.scroll.x)?;
        let dy = y.checked_sub(self.scroll.y)?;
        if dx >= self.area.width as usize || dy >= self.area.height as usize {
            return None;
        }
        Some((self.area.x + dx as u16, self.area.y + dy as u16))
    }
}
