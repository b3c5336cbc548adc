//! Node sizing and layered graph placement.
//!
//! Sizes are computed in pixels and then mapped onto terminal cells, one
//! column per 8px and one row per 25px. The graph view and the catalog page
//! reserve space with [`NodeDimensions`] before anything is drawn, so the
//! node renderer must fill exactly `cols() x rows()` cells.

use dagdeck_core::{AssetGraph, NodeDefinition};
use dagdeck_parsers::char_len;
use std::collections::{HashMap, HashSet};

/// Longest display label, in characters.
pub const MAX_LABEL_CHARS: usize = 50;

const MIN_WIDTH_PX: u32 = 200;
const CHAR_WIDTH_PX: u32 = 8;
const WIDTH_PADDING_PX: u32 = 85;
const BASE_HEIGHT_PX: u32 = 75;
const ROW_HEIGHT_PX: u32 = 25;

/// Columns between nodes of one layer.
pub const H_GAP: usize = 3;
/// Rows between layers, used for the connector arrows.
pub const V_GAP: usize = 2;

/// Pixel size of a node box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeDimensions {
    pub width: u32,
    pub height: u32,
}

impl NodeDimensions {
    pub fn compute(name_len: usize, description_shown: bool, secondary_shown: bool) -> Self {
        let capped = name_len.min(MAX_LABEL_CHARS) as u32;
        let width = MIN_WIDTH_PX.max(capped * CHAR_WIDTH_PX) + WIDTH_PADDING_PX;
        let height = BASE_HEIGHT_PX
            + ROW_HEIGHT_PX * u32::from(description_shown)
            + ROW_HEIGHT_PX * u32::from(secondary_shown);
        Self { width, height }
    }

    pub fn for_definition(definition: &NodeDefinition, in_catalog: bool) -> Self {
        Self::compute(
            char_len(&definition.display_name()),
            description_shown(definition, in_catalog),
            definition.secondary_label().is_some(),
        )
    }

    pub fn cols(&self) -> usize {
        (self.width / CHAR_WIDTH_PX) as usize
    }

    pub fn rows(&self) -> usize {
        (self.height / ROW_HEIGHT_PX + 1) as usize
    }
}

/// The description row is hidden on the catalog page, which shows the full
/// description below the node instead.
pub fn description_shown(definition: &NodeDefinition, in_catalog: bool) -> bool {
    definition.has_description() && !in_catalog
}

/// Cell position of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub id: String,
    pub layer: usize,
    pub x: usize,
    pub y: usize,
    pub dims: NodeDimensions,
}

impl Placement {
    pub fn right(&self) -> usize {
        self.x + self.dims.cols()
    }

    pub fn bottom(&self) -> usize {
        self.y + self.dims.rows()
    }

    pub fn center_x(&self) -> usize {
        self.x + self.dims.cols() / 2
    }
}

/// Vertical connector cells: rows `top..bottom` of column `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub x: usize,
    pub top: usize,
    pub bottom: usize,
}

/// Selection movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Left,
    Right,
    Up,
    Down,
}

/// Top-left corner of the viewport on the graph canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollOffset {
    pub x: usize,
    pub y: usize,
}

/// Nodes placed in dependency layers, upstream at the top.
#[derive(Debug, Clone, Default)]
pub struct GraphLayout {
    placements: Vec<Placement>,
    index: HashMap<String, usize>,
    layers: Vec<Vec<usize>>,
    with_downstream: HashSet<String>,
    width: usize,
    height: usize,
}

impl GraphLayout {
    pub fn build(graph: &AssetGraph) -> Self {
        if graph.nodes.is_empty() {
            return Self::default();
        }

        let key_to_id: HashMap<_, _> = graph
            .nodes
            .iter()
            .map(|n| (&n.asset_key, n.id.as_str()))
            .collect();

        let mut deps: HashMap<&str, HashSet<&str>> = HashMap::new();
        let mut with_downstream = HashSet::new();
        for node in &graph.nodes {
            let entry = deps.entry(node.id.as_str()).or_default();
            for key in &node.depends_on {
                if let Some(&upstream) = key_to_id.get(key) {
                    if upstream != node.id {
                        entry.insert(upstream);
                        with_downstream.insert(upstream.to_string());
                    }
                }
            }
        }

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        let layer_of = assign_layers(&ids, &deps);
        let layer_count = layer_of.values().copied().max().map_or(0, |max| max + 1);

        let mut by_layer: Vec<Vec<&NodeDefinition>> = vec![Vec::new(); layer_count];
        for node in &graph.nodes {
            by_layer[layer_of[node.id.as_str()]].push(node);
        }
        for layer in &mut by_layer {
            layer.sort_by(|a, b| {
                a.display_name()
                    .cmp(&b.display_name())
                    .then_with(|| a.id.cmp(&b.id))
            });
        }

        let layer_width = |layer: &[&NodeDefinition]| -> usize {
            let cols: usize = layer
                .iter()
                .map(|n| NodeDimensions::for_definition(n, false).cols())
                .sum();
            cols + layer.len().saturating_sub(1) * H_GAP
        };
        let width = by_layer
            .iter()
            .map(|l| layer_width(l.as_slice()))
            .max()
            .unwrap_or(0);

        let mut placements = Vec::with_capacity(graph.nodes.len());
        let mut layers = Vec::with_capacity(layer_count);
        let mut y = 0;
        for (layer_idx, layer) in by_layer.iter().enumerate() {
            let mut x = (width - layer_width(layer.as_slice())) / 2;
            let mut members = Vec::with_capacity(layer.len());
            let mut tallest = 0;

            for node in layer {
                let dims = NodeDimensions::for_definition(node, false);
                members.push(placements.len());
                placements.push(Placement {
                    id: node.id.clone(),
                    layer: layer_idx,
                    x,
                    y,
                    dims,
                });
                x += dims.cols() + H_GAP;
                tallest = tallest.max(dims.rows());
            }

            layers.push(members);
            y += tallest + V_GAP;
        }

        let index = placements
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();

        Self {
            placements,
            index,
            layers,
            with_downstream,
            width,
            height: y.saturating_sub(V_GAP),
        }
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn placement(&self, id: &str) -> Option<&Placement> {
        self.index.get(id).map(|&i| &self.placements[i])
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Canvas size in cells.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Whether another node in the graph depends on this one.
    pub fn has_downstream(&self, id: &str) -> bool {
        self.with_downstream.contains(id)
    }

    /// Connector under a node with dependents, reaching down to the next
    /// layer. The last row holds the arrow head.
    pub fn connector(&self, id: &str) -> Option<Connector> {
        if !self.has_downstream(id) {
            return None;
        }
        let p = self.placement(id)?;
        let layer_bottom = self.layers[p.layer]
            .iter()
            .map(|&i| self.placements[i].bottom())
            .max()
            .unwrap_or_else(|| p.bottom());
        Some(Connector {
            x: p.center_x(),
            top: p.bottom(),
            bottom: layer_bottom + V_GAP,
        })
    }

    /// Id of the first node in the top layer.
    pub fn first(&self) -> Option<&str> {
        self.layers
            .first()
            .and_then(|layer| layer.first())
            .map(|&i| self.placements[i].id.as_str())
    }

    /// Node reached by moving from `id`. Left/right stay within the layer,
    /// up/down jump to the horizontally closest node of the adjacent layer.
    pub fn neighbor(&self, id: &str, direction: Move) -> Option<&str> {
        let current = self.placement(id)?;
        let layer = &self.layers[current.layer];
        let pos = layer.iter().position(|&i| self.placements[i].id == id)?;

        let target = match direction {
            Move::Left => layer.get(pos.checked_sub(1)?).copied(),
            Move::Right => layer.get(pos + 1).copied(),
            Move::Up => self.closest_in(current.layer.checked_sub(1)?, current.center_x()),
            Move::Down => self.closest_in(current.layer + 1, current.center_x()),
        };
        target.map(|i| self.placements[i].id.as_str())
    }

    fn closest_in(&self, layer: usize, center_x: usize) -> Option<usize> {
        self.layers
            .get(layer)?
            .iter()
            .copied()
            .min_by_key(|&i| self.placements[i].center_x().abs_diff(center_x))
    }

    /// Adjust `offset` so the node is inside a `view_width x view_height`
    /// viewport. The top-left corner wins when the node is larger.
    pub fn scroll_to_fit(
        &self,
        id: &str,
        offset: ScrollOffset,
        view_width: usize,
        view_height: usize,
    ) -> ScrollOffset {
        let Some(p) = self.placement(id) else {
            return offset;
        };
        ScrollOffset {
            x: fit_axis(offset.x, p.x, p.right(), view_width),
            y: fit_axis(offset.y, p.y, p.bottom(), view_height),
        }
    }
}

fn fit_axis(offset: usize, start: usize, end: usize, view: usize) -> usize {
    if start < offset {
        start
    } else if end > offset + view {
        start.min(end.saturating_sub(view))
    } else {
        offset
    }
}

/// Assign layers using topological sort. Nodes caught in a cycle all land in
/// the final layer.
fn assign_layers(ids: &[&str], deps: &HashMap<&str, HashSet<&str>>) -> HashMap<String, usize> {
    let mut layers: HashMap<String, usize> = HashMap::new();
    let mut remaining: HashSet<&str> = ids.iter().copied().collect();

    let mut current_layer = 0;
    while !remaining.is_empty() {
        let ready: Vec<&str> = remaining
            .iter()
            .filter(|&&id| {
                deps.get(id)
                    .map(|d| d.iter().all(|dep| layers.contains_key(*dep)))
                    .unwrap_or(true)
            })
            .copied()
            .collect();

        if ready.is_empty() {
            for id in remaining.iter() {
                layers.insert(id.to_string(), current_layer);
            }
            break;
        }

        for id in ready {
            layers.insert(id.to_string(), current_layer);
            remaining.remove(id);
        }
        current_layer += 1;
    }

    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagdeck_core::{AssetKey, Repository};

    fn node(id: &str, deps: &[&str]) -> NodeDefinition {
        NodeDefinition {
            id: id.to_string(),
            asset_key: AssetKey::new([id]),
            op_name: None,
            description: None,
            metadata_entries: vec![],
            partition_definition: None,
            repository: Repository::default(),
            depends_on: deps.iter().map(|d| AssetKey::new([*d])).collect(),
        }
    }

    fn graph(nodes: Vec<NodeDefinition>) -> AssetGraph {
        let mut graph = AssetGraph::empty("job");
        graph.nodes = nodes;
        graph
    }

    #[test]
    fn test_height_for_all_flag_combinations() {
        for desc in [false, true] {
            for secondary in [false, true] {
                let dims = NodeDimensions::compute(10, desc, secondary);
                let expected = 75 + 25 * u32::from(desc) + 25 * u32::from(secondary);
                assert_eq!(dims.height, expected);
                assert_eq!(dims.rows(), 4 + usize::from(desc) + usize::from(secondary));
            }
        }
    }

    #[test]
    fn test_width_bounds_and_monotonic() {
        let mut previous = 0;
        for len in 0..120 {
            let width = NodeDimensions::compute(len, false, false).width;
            assert!((285..=485).contains(&width));
            assert!(width >= previous);
            previous = width;
        }
        assert_eq!(NodeDimensions::compute(10, false, false).width, 285);
        assert_eq!(NodeDimensions::compute(30, false, false).width, 325);
        assert_eq!(NodeDimensions::compute(50, false, false).width, 485);
        assert_eq!(NodeDimensions::compute(200, false, false).cols(), 60);
    }

    #[test]
    fn test_long_key_dimensions() {
        let mut def = node("x", &[]);
        def.asset_key = AssetKey::new([
            "a",
            "b",
            "very_long_metric_name_exceeding_fifty_characters_total",
        ]);
        let dims = NodeDimensions::for_definition(&def, false);
        assert_eq!(dims.width, 485);
        assert_eq!(dims.height, 75);
    }

    #[test]
    fn test_description_hidden_in_catalog() {
        let mut def = node("x", &[]);
        def.description = Some("Daily orders".into());
        assert_eq!(NodeDimensions::for_definition(&def, false).height, 100);
        assert_eq!(NodeDimensions::for_definition(&def, true).height, 75);
    }

    #[test]
    fn test_layers_follow_dependencies() {
        let layout = GraphLayout::build(&graph(vec![
            node("b", &["a"]),
            node("raw", &[]),
            node("a", &["raw", "missing"]),
        ]));

        assert_eq!(layout.layer_count(), 3);
        assert_eq!(layout.placement("raw").unwrap().layer, 0);
        assert_eq!(layout.placement("a").unwrap().layer, 1);
        assert_eq!(layout.placement("b").unwrap().layer, 2);
        assert!(layout.has_downstream("raw"));
        assert!(!layout.has_downstream("b"));
        assert_eq!(layout.connector("b"), None);
        assert_eq!(layout.first(), Some("raw"));

        let raw = layout.placement("raw").unwrap();
        let a = layout.placement("a").unwrap();
        assert_eq!(a.y, raw.bottom() + V_GAP);

        let connector = layout.connector("raw").unwrap();
        assert_eq!(connector.x, raw.center_x());
        assert_eq!((connector.top, connector.bottom), (raw.bottom(), a.y));
    }

    #[test]
    fn test_cycle_collapses_into_last_layer() {
        let layout = GraphLayout::build(&graph(vec![
            node("root", &[]),
            node("x", &["root", "y"]),
            node("y", &["x"]),
        ]));
        assert_eq!(layout.layer_count(), 2);
        assert_eq!(layout.placement("x").unwrap().layer, 1);
        assert_eq!(layout.placement("y").unwrap().layer, 1);
    }

    #[test]
    fn test_nodes_in_layer_do_not_overlap() {
        let layout = GraphLayout::build(&graph(vec![
            node("root", &[]),
            node("left", &["root"]),
            node("right", &["root"]),
        ]));
        let left = layout.placement("left").unwrap();
        let right = layout.placement("right").unwrap();
        assert_eq!(right.x, left.right() + H_GAP);
        assert_eq!(layout.size().0, right.right());
    }

    #[test]
    fn test_neighbor_moves() {
        let layout = GraphLayout::build(&graph(vec![
            node("root", &[]),
            node("left", &["root"]),
            node("right", &["root"]),
        ]));

        assert_eq!(layout.neighbor("left", Move::Right), Some("right"));
        assert_eq!(layout.neighbor("right", Move::Right), None);
        assert_eq!(layout.neighbor("left", Move::Left), None);
        assert_eq!(layout.neighbor("right", Move::Up), Some("root"));
        assert_eq!(layout.neighbor("root", Move::Up), None);
        assert!(layout.neighbor("root", Move::Down).is_some());
        assert_eq!(layout.neighbor("nope", Move::Down), None);
    }

    #[test]
    fn test_scroll_to_fit() {
        let layout = GraphLayout::build(&graph(vec![
            node("root", &[]),
            node("a", &["root"]),
            node("b", &["a"]),
        ]));
        let b = layout.placement("b").unwrap().clone();

        let offset = layout.scroll_to_fit("b", ScrollOffset::default(), 200, 5);
        assert_eq!(offset.y, b.bottom() - 5);

        let back = layout.scroll_to_fit("root", offset, 200, 5);
        assert_eq!(back.y, 0);

        let unchanged = layout.scroll_to_fit("zzz", offset, 200, 5);
        assert_eq!(unchanged, offset);
    }

    #[test]
    fn test_empty_graph() {
        let layout = GraphLayout::build(&AssetGraph::empty("job"));
        assert!(layout.placements().is_empty());
        assert_eq!(layout.first(), None);
        assert_eq!(layout.size(), (0, 0));
    }
}
