//! Tree layout for the sitemap canvas.
//!
//! Levels and subtree widths are derived from the parent-child edges after
//! every mutation. The full layout pass additionally moves pages so every
//! parent is centred above its children, with neighbouring leaves exactly
//! [`HORIZONTAL_SPACING`] apart and levels [`VERTICAL_SPACING`] apart.

use crate::constants::{HORIZONTAL_SPACING, NODE_WIDTH, VERTICAL_SPACING};
use crate::types::{PageId, Position, Sitemap};
use std::collections::{HashMap, HashSet};

/// Empty space between the subtrees of neighbouring siblings.
const SUBTREE_GAP: f32 = HORIZONTAL_SPACING - NODE_WIDTH;

/// Children of every page, sorted left to right.
fn child_map(sitemap: &Sitemap) -> HashMap<PageId, Vec<PageId>> {
    let x_of: HashMap<&str, f32> = sitemap
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n.position.x))
        .collect();
    let mut map: HashMap<PageId, Vec<PageId>> = HashMap::new();
    for edge in &sitemap.edges {
        if x_of.contains_key(edge.source.as_str()) && x_of.contains_key(edge.target.as_str()) {
            map.entry(edge.source.clone())
                .or_default()
                .push(edge.target.clone());
        }
    }
    for children in map.values_mut() {
        children.sort_by(|a, b| {
            x_of[a.as_str()]
                .total_cmp(&x_of[b.as_str()])
                .then_with(|| a.cmp(b))
        });
    }
    map
}

/// Pages without a parent, sorted left to right.
fn root_ids(sitemap: &Sitemap) -> Vec<PageId> {
    let targets: HashSet<&str> = sitemap.edges.iter().map(|e| e.target.as_str()).collect();
    let mut roots: Vec<(f32, PageId)> = sitemap
        .nodes
        .iter()
        .filter(|n| !targets.contains(n.id.as_str()))
        .map(|n| (n.position.x, n.id.clone()))
        .collect();
    roots.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    roots.into_iter().map(|(_, id)| id).collect()
}

fn measure(
    id: &str,
    level: usize,
    children: &HashMap<PageId, Vec<PageId>>,
    visited: &mut HashSet<PageId>,
    levels: &mut HashMap<PageId, usize>,
    widths: &mut HashMap<PageId, f32>,
) -> Option<f32> {
    if !visited.insert(id.to_string()) {
        return None;
    }
    levels.insert(id.to_string(), level);

    let mut total = 0.0;
    let mut count = 0usize;
    for child in children.get(id).into_iter().flatten() {
        if let Some(width) = measure(child, level + 1, children, visited, levels, widths) {
            total += width;
            count += 1;
        }
    }
    let width = if count == 0 {
        NODE_WIDTH
    } else {
        (total + (count - 1) as f32 * SUBTREE_GAP).max(NODE_WIDTH)
    };
    widths.insert(id.to_string(), width);
    Some(width)
}

/// Refreshes `level` and `subtree_width` of every page without moving any.
///
/// Pages only reachable through a cycle keep level 0 and a single card width.
pub fn assign_levels(sitemap: &mut Sitemap) {
    let children = child_map(sitemap);
    let mut visited = HashSet::new();
    let mut levels = HashMap::new();
    let mut widths = HashMap::new();
    for root in root_ids(sitemap) {
        measure(&root, 0, &children, &mut visited, &mut levels, &mut widths);
    }
    for node in &mut sitemap.nodes {
        node.level = levels.get(&node.id).copied().unwrap_or(0);
        node.subtree_width = widths.get(&node.id).copied().unwrap_or(NODE_WIDTH);
    }
}

fn place(
    id: &str,
    center_x: f32,
    y: f32,
    children: &HashMap<PageId, Vec<PageId>>,
    widths: &HashMap<PageId, f32>,
    placed: &mut HashMap<PageId, Position>,
) {
    if placed.contains_key(id) {
        return;
    }
    placed.insert(id.to_string(), Position::new(center_x - NODE_WIDTH / 2.0, y));

    let kids: Vec<&PageId> = children
        .get(id)
        .into_iter()
        .flatten()
        .filter(|kid| !placed.contains_key(kid.as_str()))
        .collect();
    if kids.is_empty() {
        return;
    }
    let width_of = |kid: &str| widths.get(kid).copied().unwrap_or(NODE_WIDTH);
    let total: f32 = kids.iter().map(|k| width_of(k)).sum::<f32>()
        + (kids.len() - 1) as f32 * SUBTREE_GAP;

    let mut cursor = center_x - total / 2.0;
    for kid in kids {
        let width = width_of(kid);
        place(kid, cursor + width / 2.0, y + VERTICAL_SPACING, children, widths, placed);
        cursor += width + SUBTREE_GAP;
    }
}

/// Lays the whole forest out as tidy trees.
///
/// Each root keeps its y and, unless it would overlap the previous tree, its x.
/// Children keep their left-to-right order and are centred under their parent.
pub fn recalculate_layout(sitemap: &mut Sitemap) {
    assign_levels(sitemap);
    let children = child_map(sitemap);
    let widths: HashMap<PageId, f32> = sitemap
        .nodes
        .iter()
        .map(|n| (n.id.clone(), n.subtree_width))
        .collect();

    let mut placed: HashMap<PageId, Position> = HashMap::new();
    let mut previous_right: Option<f32> = None;
    for root_id in root_ids(sitemap) {
        let Some(root) = sitemap.node(&root_id) else {
            continue;
        };
        let width = widths.get(&root_id).copied().unwrap_or(NODE_WIDTH);
        let mut left = root.position.x + NODE_WIDTH / 2.0 - width / 2.0;
        if let Some(right) = previous_right {
            left = left.max(right + SUBTREE_GAP);
        }
        place(&root_id, left + width / 2.0, root.position.y, &children, &widths, &mut placed);
        previous_right = Some(left + width);
    }

    for node in &mut sitemap.nodes {
        if let Some(position) = placed.get(&node.id) {
            node.position = *position;
        }
    }
    log::debug!("layout recalculated for {} pages", placed.len());
}
