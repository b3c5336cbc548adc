//! Asset node box.
//!
//! Everything shown on a node is derived from its definition, live status and
//! metadata tags on each render. [`AssetNodeView::lines`] fills exactly the
//! cells reserved by [`NodeDimensions`].

use crate::graph::layout::{description_shown, MAX_LABEL_CHARS};
use crate::graph::{derive_status, NodeDimensions, NodeStatus, RunIndicator};
use crate::ui::Theme;
use chrono::{Local, TimeZone, Utc};
use dagdeck_core::{LiveStatus, MaterializationEvent, MetadataTag, NodeDefinition, KIND_TAG_KEY};
use dagdeck_parsers::{
    datetime_from_unix, display_width, first_line_plaintext, format_elapsed, format_timestamp,
    truncate_end, with_middle_truncation,
};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use std::fmt::Display;

const UPSTREAM_CHANGED: &str = "upstream changed";
const NEVER: &str = "Never";
const NO_ELAPSED: &str = "—";

/// Inputs of one node render.
#[derive(Debug, Clone, Copy)]
pub struct AssetNodeProps<'a> {
    pub definition: &'a NodeDefinition,
    pub live: Option<&'a LiveStatus>,
    pub metadata: &'a [MetadataTag],
    pub selected: bool,
    pub job_name: &'a str,
    pub in_catalog: bool,
}

impl AssetNodeProps<'_> {
    /// Spinner frame to draw. Fixed at zero unless a run is in progress, so
    /// idle nodes keep the same render key from tick to tick.
    pub fn animation_frame(&self, tick: usize) -> usize {
        match derive_status(self.live).indicator {
            Some(indicator) if indicator.is_animated() => tick,
            _ => 0,
        }
    }

    /// `now` (unix seconds) while the last materialization has a start but
    /// no end, since its elapsed time keeps counting. None otherwise.
    pub fn elapsed_clock(&self, now: i64) -> Option<i64> {
        let stats = &self.live?.last_materialization.as_ref()?.step_stats;
        (stats.start_time.is_some() && stats.end_time.is_none()).then_some(now)
    }

    /// Owned copy of everything a render at `tick` and `now` depends on.
    pub fn render_key(&self, theme: &Theme, tick: usize, now: i64) -> NodeRenderKey {
        NodeRenderKey {
            definition: self.definition.clone(),
            live: self.live.cloned(),
            metadata: self.metadata.to_vec(),
            selected: self.selected,
            job_name: self.job_name.to_string(),
            in_catalog: self.in_catalog,
            theme: *theme,
            frame: self.animation_frame(tick),
            clock: self.elapsed_clock(now),
        }
    }
}

/// Render inputs kept by the node cache to compare against the next frame.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct NodeRenderKey {
    definition: NodeDefinition,
    live: Option<LiveStatus>,
    metadata: Vec<MetadataTag>,
    selected: bool,
    job_name: String,
    in_catalog: bool,
    theme: Theme,
    frame: usize,
    clock: Option<i64>,
}

/// Last-update row: end time and elapsed run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub timestamp: String,
    pub elapsed: String,
    /// False when the asset has never been materialized
    pub materialized: bool,
}

impl SummaryRow {
    /// `now` is in unix seconds; it ends the elapsed time of a step that
    /// has not finished.
    pub fn from_event<Tz>(event: Option<&MaterializationEvent>, tz: &Tz, now: f64) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let Some(event) = event else {
            return Self {
                timestamp: NEVER.to_string(),
                elapsed: NO_ELAPSED.to_string(),
                materialized: false,
            };
        };

        let stats = &event.step_stats;
        let timestamp = stats
            .end_time
            .and_then(datetime_from_unix)
            .map(|dt| format_timestamp(&dt.with_timezone(tz)))
            .unwrap_or_else(|| NEVER.to_string());
        let elapsed = match (stats.start_time, stats.end_time) {
            (Some(start), Some(end)) => format_elapsed(start, end),
            (Some(start), None) => format_elapsed(start, now),
            (None, _) => NO_ELAPSED.to_string(),
        };

        Self {
            timestamp,
            elapsed,
            materialized: true,
        }
    }
}

/// Presentation values of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNodeView {
    pub label: String,
    pub secondary_label: Option<String>,
    pub description: Option<String>,
    pub status: NodeStatus,
    pub summary: SummaryRow,
    pub kind: Option<String>,
    pub dimensions: NodeDimensions,
    pub selected: bool,
}

impl AssetNodeView {
    pub fn derive(props: &AssetNodeProps<'_>) -> Self {
        Self::derive_in(props, &Local)
    }

    /// Derive with timestamps shown in `tz`.
    pub fn derive_in<Tz>(props: &AssetNodeProps<'_>, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self::derive_at(props, tz, Utc::now().timestamp())
    }

    /// Derive as of `now` (unix seconds), with timestamps shown in `tz`.
    pub fn derive_at<Tz>(props: &AssetNodeProps<'_>, tz: &Tz, now: i64) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let definition = props.definition;
        let description = description_shown(definition, props.in_catalog)
            .then(|| first_line_plaintext(definition.description.as_deref().unwrap_or_default()));

        Self {
            label: with_middle_truncation(&definition.display_name(), MAX_LABEL_CHARS),
            secondary_label: definition.secondary_label().map(String::from),
            description,
            status: derive_status(props.live),
            summary: SummaryRow::from_event(
                props.live.and_then(|l| l.last_materialization.as_ref()),
                tz,
                now as f64,
            ),
            kind: props
                .metadata
                .iter()
                .find(|tag| tag.key == KIND_TAG_KEY)
                .map(|tag| tag.value.clone()),
            dimensions: NodeDimensions::for_definition(definition, props.in_catalog),
            selected: props.selected,
        }
    }

    /// Tooltip of the run indicator, if one is shown.
    pub fn tooltip(&self) -> Option<&'static str> {
        self.status.indicator.map(|indicator| indicator.tooltip())
    }

    /// Render the box as `rows()` lines, each `cols()` terminal cells wide.
    pub fn lines(&self, theme: &Theme, tick: usize) -> Vec<Line<'static>> {
        let inner = self.dimensions.cols().saturating_sub(2);
        let content_width = inner.saturating_sub(2);
        let border = BorderSet::for_selection(self.selected);
        let border_style = if self.selected {
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };

        let mut lines = Vec::with_capacity(self.dimensions.rows());

        let upstream = self.status.upstream_changed.then(|| {
            Span::styled(
                format!(" {} ", UPSTREAM_CHANGED),
                Style::default().fg(theme.warning),
            )
        });
        lines.push(border_row(
            (border.top_left, border.top_right),
            border.horizontal,
            inner,
            upstream,
            false,
            border_style,
        ));

        // Name, with the run indicator right-aligned
        let indicator = self.status.indicator.map(|indicator| {
            let color = match indicator {
                RunIndicator::Attention => theme.error,
                _ => theme.warning,
            };
            Span::styled(indicator.glyph(tick), Style::default().fg(color))
        });
        let label_room = content_width.saturating_sub(if indicator.is_some() { 2 } else { 0 });
        lines.push(content_row(
            vec![Span::styled(
                truncate_end(&self.label, label_room),
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::BOLD),
            )],
            indicator,
            content_width,
            border.vertical,
            border_style,
        ));

        if let Some(description) = &self.description {
            lines.push(content_row(
                vec![Span::styled(
                    truncate_end(description, content_width),
                    Style::default()
                        .fg(theme.muted)
                        .add_modifier(Modifier::ITALIC),
                )],
                None,
                content_width,
                border.vertical,
                border_style,
            ));
        }

        let summary_style = if self.summary.materialized {
            Style::default().fg(theme.foreground)
        } else {
            Style::default().fg(theme.muted)
        };
        let elapsed_width = display_width(&self.summary.elapsed);
        lines.push(content_row(
            vec![Span::styled(
                truncate_end(
                    &self.summary.timestamp,
                    content_width.saturating_sub(elapsed_width + 1),
                ),
                summary_style,
            )],
            Some(Span::styled(self.summary.elapsed.clone(), summary_style)),
            content_width,
            border.vertical,
            border_style,
        ));

        if let Some(op_name) = &self.secondary_label {
            lines.push(content_row(
                vec![
                    Span::styled("op ", Style::default().fg(theme.muted)),
                    Span::styled(
                        truncate_end(op_name, content_width.saturating_sub(3)),
                        Style::default().fg(theme.foreground),
                    ),
                ],
                None,
                content_width,
                border.vertical,
                border_style,
            ));
        }

        let kind = self.kind.as_ref().map(|kind| {
            Span::styled(
                format!(" {} ", kind),
                Style::default()
                    .fg(theme.highlight)
                    .add_modifier(Modifier::BOLD),
            )
        });
        lines.push(border_row(
            (border.bottom_left, border.bottom_right),
            border.horizontal,
            inner,
            kind,
            true,
            border_style,
        ));

        lines
    }
}

struct BorderSet {
    top_left: &'static str,
    top_right: &'static str,
    bottom_left: &'static str,
    bottom_right: &'static str,
    horizontal: &'static str,
    vertical: &'static str,
}

impl BorderSet {
    fn for_selection(selected: bool) -> Self {
        if selected {
            Self {
                top_left: "╔",
                top_right: "╗",
                bottom_left: "╚",
                bottom_right: "╝",
                horizontal: "═",
                vertical: "║",
            }
        } else {
            Self {
                top_left: "┌",
                top_right: "┐",
                bottom_left: "└",
                bottom_right: "┘",
                horizontal: "─",
                vertical: "│",
            }
        }
    }
}

/// Horizontal border with an optional badge embedded one cell from the
/// left or right corner. Badges that do not fit are dropped.
fn border_row(
    corners: (&'static str, &'static str),
    fill: &'static str,
    inner: usize,
    badge: Option<Span<'static>>,
    badge_right: bool,
    style: Style,
) -> Line<'static> {
    let badge = badge.filter(|b| b.width() + 2 <= inner);
    let mut spans = vec![Span::styled(corners.0, style)];

    match badge {
        Some(badge) => {
            let rest = inner - badge.width() - 1;
            let (before, after) = if badge_right { (rest, 1) } else { (1, rest) };
            spans.push(Span::styled(fill.repeat(before), style));
            spans.push(badge);
            spans.push(Span::styled(fill.repeat(after), style));
        }
        None => spans.push(Span::styled(fill.repeat(inner), style)),
    }

    spans.push(Span::styled(corners.1, style));
    Line::from(spans)
}

/// Content row padded to `width` cells, with an optional right-aligned span.
fn content_row(
    mut left: Vec<Span<'static>>,
    right: Option<Span<'static>>,
    width: usize,
    vertical: &'static str,
    border_style: Style,
) -> Line<'static> {
    let used: usize =
        left.iter().map(Span::width).sum::<usize>() + right.as_ref().map_or(0, Span::width);

    let mut spans = Vec::with_capacity(left.len() + 5);
    spans.push(Span::styled(vertical, border_style));
    spans.push(Span::raw(" "));
    spans.append(&mut left);
    spans.push(Span::raw(" ".repeat(width.saturating_sub(used))));
    if let Some(right) = right {
        spans.push(right);
    }
    spans.push(Span::raw(" "));
    spans.push(Span::styled(vertical, border_style));
    Line::from(spans)
}
