//! Tree queries and mutations on a [`Sitemap`].
//!
//! Pages form a forest: every edge points from a parent to a child, and a page
//! without an incoming edge is a root. Mutations keep edges consistent with
//! the page list and refresh the derived levels and subtree widths.

use crate::api::GeneratedSitemap;
use crate::constants::{HORIZONTAL_SPACING, NODE_WIDTH, VERTICAL_SPACING};
use crate::error::TreeError;
use crate::layout;
use crate::types::*;
use std::collections::HashSet;

/// Which side of the existing siblings a new sibling is inserted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Left of the leftmost sibling
    Left,
    /// Right of the rightmost sibling
    Right,
}

/// Pages and edges removed by [`Sitemap::delete_subtree`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedSubtree {
    /// Removed pages together with their original index in the page list
    pub nodes: Vec<(usize, PageNode)>,
    /// Removed edges together with their original index in the edge list
    pub edges: Vec<(usize, Edge)>,
}

impl Sitemap {
    /// Returns the edge pointing at `id`, if the page has a parent.
    pub fn parent_edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.target == id)
    }

    /// Returns the parent id of a page.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parent_edge(id).map(|e| e.source.as_str())
    }

    /// A page is a root when no edge points at it.
    pub fn is_root(&self, id: &str) -> bool {
        self.parent_edge(id).is_none()
    }

    /// Returns `true` if at least one edge leaves the page.
    pub fn has_children(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e.source == id)
    }

    /// Direct children of a page, sorted left to right by x position.
    pub fn children_of(&self, id: &str) -> Vec<&PageNode> {
        let mut children: Vec<&PageNode> = self
            .edges
            .iter()
            .filter(|e| e.source == id)
            .filter_map(|e| self.node(&e.target))
            .collect();
        children.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
        children
    }

    /// All descendants of a page (children first, then their descendants).
    pub fn descendants_of(&self, id: &str) -> Vec<PageId> {
        let mut out = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(id);
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            for edge in self.edges.iter().filter(|e| e.source == current) {
                if seen.insert(edge.target.as_str()) {
                    out.push(edge.target.clone());
                    frontier.push(edge.target.as_str());
                }
            }
        }
        out
    }

    /// Hands out the next page number and advances the counter.
    pub fn next_page_number(&mut self) -> u32 {
        let current = self.page_count;
        self.page_count += 1;
        current
    }

    /// Attaches a first child below a root page.
    ///
    /// Only root pages without children accept a child; deeper structure is
    /// grown sideways with [`Sitemap::add_sibling`].
    ///
    /// # Returns
    ///
    /// The id of the new page.
    pub fn add_child(&mut self, parent_id: &str) -> Result<PageId, TreeError> {
        let parent = self
            .node(parent_id)
            .ok_or_else(|| TreeError::UnknownPage(parent_id.to_string()))?;
        if !self.is_root(parent_id) {
            return Err(TreeError::NotRoot);
        }
        if self.has_children(parent_id) {
            return Err(TreeError::AlreadyHasChild(parent_id.to_string()));
        }

        let position = Position::new(parent.position.x, parent.position.y + VERTICAL_SPACING);
        let level = parent.level + 1;

        let number = self.next_page_number();
        let mut page = PageNode::new(new_page_id(), format!("Page {number}"), position);
        page.level = level;
        page.subtree_width = NODE_WIDTH;
        let id = page.id.clone();

        log::debug!("child page `{}` created under `{parent_id}`", page.data.label);
        self.nodes.push(page);
        self.edges.push(Edge::new(parent_id, id.clone()));
        layout::assign_levels(self);
        Ok(id)
    }

    /// Inserts a new sibling of `page_id` at the outer edge of its siblings.
    ///
    /// # Returns
    ///
    /// The id of the new page.
    pub fn add_sibling(&mut self, page_id: &str, side: Side) -> Result<PageId, TreeError> {
        let page = self
            .node(page_id)
            .ok_or_else(|| TreeError::UnknownPage(page_id.to_string()))?;
        let level = page.level;
        let parent_id = self
            .parent_of(page_id)
            .ok_or(TreeError::RootHasNoSiblings)?
            .to_string();
        let parent = self
            .node(&parent_id)
            .ok_or_else(|| TreeError::UnknownPage(parent_id.clone()))?;
        let parent_position = parent.position;

        let siblings = self.children_of(&parent_id);
        let x = match (side, siblings.first(), siblings.last()) {
            (Side::Left, Some(leftmost), _) => leftmost.position.x - HORIZONTAL_SPACING,
            (Side::Right, _, Some(rightmost)) => rightmost.position.x + HORIZONTAL_SPACING,
            _ => parent_position.x,
        };
        let position = Position::new(x, parent_position.y + VERTICAL_SPACING);

        let number = self.next_page_number();
        let mut sibling = PageNode::new(new_page_id(), format!("Page {number}"), position);
        sibling.level = level;
        sibling.subtree_width = NODE_WIDTH;
        let id = sibling.id.clone();

        log::debug!("sibling page `{}` created next to `{page_id}`", sibling.data.label);
        self.nodes.push(sibling);
        self.edges.push(Edge::new(parent_id, id.clone()));
        layout::assign_levels(self);
        Ok(id)
    }

    /// Removes a page, all of its descendants and every edge touching them.
    pub fn delete_subtree(&mut self, page_id: &str) -> Result<RemovedSubtree, TreeError> {
        if !self.contains(page_id) {
            return Err(TreeError::UnknownPage(page_id.to_string()));
        }
        let mut doomed: HashSet<PageId> = self.descendants_of(page_id).into_iter().collect();
        doomed.insert(page_id.to_string());

        let mut removed = RemovedSubtree {
            nodes: Vec::new(),
            edges: Vec::new(),
        };
        let nodes = std::mem::take(&mut self.nodes);
        for (index, node) in nodes.into_iter().enumerate() {
            if doomed.contains(&node.id) {
                removed.nodes.push((index, node));
            } else {
                self.nodes.push(node);
            }
        }
        let edges = std::mem::take(&mut self.edges);
        for (index, edge) in edges.into_iter().enumerate() {
            if doomed.contains(&edge.source) || doomed.contains(&edge.target) {
                removed.edges.push((index, edge));
            } else {
                self.edges.push(edge);
            }
        }

        layout::assign_levels(self);
        Ok(removed)
    }

    /// Puts back pages and edges previously taken out by [`Sitemap::delete_subtree`].
    pub fn restore_subtree(&mut self, removed: &RemovedSubtree) {
        for (index, node) in &removed.nodes {
            let index = (*index).min(self.nodes.len());
            self.nodes.insert(index, node.clone());
        }
        for (index, edge) in &removed.edges {
            let index = (*index).min(self.edges.len());
            self.edges.insert(index, edge.clone());
        }
        layout::assign_levels(self);
    }

    /// Renames a page.
    ///
    /// # Returns
    ///
    /// The previous label when the name changed, `None` when the new label was
    /// blank or identical.
    pub fn rename(&mut self, page_id: &str, label: &str) -> Result<Option<String>, TreeError> {
        let page = self
            .node_mut(page_id)
            .ok_or_else(|| TreeError::UnknownPage(page_id.to_string()))?;
        if label.trim().is_empty() || page.data.label == label {
            return Ok(None);
        }
        Ok(Some(std::mem::replace(&mut page.data.label, label.to_string())))
    }

    /// Applies the page dialog: new name and, when given, a prompt section.
    ///
    /// # Returns
    ///
    /// The page data as it was before the change.
    pub fn regenerate_page(
        &mut self,
        page_id: &str,
        name: &str,
        prompt: &str,
    ) -> Result<PageData, TreeError> {
        if name.trim().is_empty() {
            return Err(TreeError::EmptyLabel);
        }
        let page = self
            .node_mut(page_id)
            .ok_or_else(|| TreeError::UnknownPage(page_id.to_string()))?;
        let previous = page.data.clone();
        page.data.label = name.to_string();
        if !prompt.is_empty() {
            page.data.sections = vec![Section::new("", prompt)];
        }
        Ok(previous)
    }

    /// Replaces the tree with the homepage of a generated sitemap.
    ///
    /// The homepage is the page titled "home" (any case), or the first page.
    /// The root keeps its id and position; every other page and edge is dropped.
    pub fn apply_generated(&mut self, generated: &GeneratedSitemap) -> Result<(), TreeError> {
        let homepage = generated
            .pages
            .iter()
            .find(|p| p.page_title.eq_ignore_ascii_case("home"))
            .or_else(|| generated.pages.first())
            .ok_or(TreeError::EmptySitemap)?;

        self.business_name = generated.business_name.clone().unwrap_or_default();
        self.business_description = generated.business_description.clone().unwrap_or_default();

        let mut root = match self.node(ROOT_PAGE_ID) {
            Some(root) => root.clone(),
            None => {
                let (x, y) = crate::constants::ROOT_POSITION;
                PageNode::new(ROOT_PAGE_ID, "", Position::new(x, y))
            }
        };
        root.data.label = homepage.page_title.clone();
        root.data.sections = homepage
            .sections
            .iter()
            .map(|s| Section::new(s.section_title.clone(), s.section_description.clone()))
            .collect();

        self.nodes = vec![root];
        self.edges.clear();
        layout::assign_levels(self);
        Ok(())
    }

    /// Deletes the whole sitemap.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.page_count = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{GeneratedPage, GeneratedSection};

    fn sitemap_with_two_children() -> (Sitemap, PageId, PageId) {
        let mut sitemap = Sitemap::default();
        let first = sitemap.add_child(ROOT_PAGE_ID).unwrap();
        let second = sitemap.add_sibling(&first, Side::Right).unwrap();
        (sitemap, first, second)
    }

    #[test]
    fn test_add_child_below_root() {
        let mut sitemap = Sitemap::default();

        let child_id = sitemap.add_child(ROOT_PAGE_ID).unwrap();

        let child = sitemap.node(&child_id).unwrap();
        assert_eq!(child.data.label, "Page 1");
        assert_eq!(child.position, Position::new(100.0, 100.0 + VERTICAL_SPACING));
        assert_eq!(child.level, 1);
        assert_eq!(sitemap.page_count, 2);
        assert_eq!(sitemap.edges.len(), 1);
        assert_eq!(sitemap.edges[0].id, format!("edge-root-{child_id}"));
        assert_eq!(sitemap.parent_of(&child_id), Some(ROOT_PAGE_ID));
    }

    #[test]
    fn test_add_child_only_once() {
        let mut sitemap = Sitemap::default();
        sitemap.add_child(ROOT_PAGE_ID).unwrap();

        let result = sitemap.add_child(ROOT_PAGE_ID);

        assert_eq!(result, Err(TreeError::AlreadyHasChild(ROOT_PAGE_ID.to_string())));
        assert_eq!(sitemap.nodes.len(), 2);
        assert_eq!(sitemap.page_count, 2);
    }

    #[test]
    fn test_add_child_rejects_non_root() {
        let mut sitemap = Sitemap::default();
        let child = sitemap.add_child(ROOT_PAGE_ID).unwrap();

        assert_eq!(sitemap.add_child(&child), Err(TreeError::NotRoot));
    }

    #[test]
    fn test_add_child_unknown_page() {
        let mut sitemap = Sitemap::default();

        let result = sitemap.add_child("missing");

        assert_eq!(result, Err(TreeError::UnknownPage("missing".into())));
    }

    #[test]
    fn test_add_sibling_goes_to_extremes() {
        let (mut sitemap, first, second) = sitemap_with_two_children();
        let first_x = sitemap.node(&first).unwrap().position.x;
        assert_eq!(sitemap.node(&second).unwrap().position.x, first_x + HORIZONTAL_SPACING);

        // Inserting right of the *first* child still lands beyond the rightmost one.
        let third = sitemap.add_sibling(&first, Side::Right).unwrap();
        assert_eq!(
            sitemap.node(&third).unwrap().position.x,
            first_x + 2.0 * HORIZONTAL_SPACING
        );

        let left = sitemap.add_sibling(&third, Side::Left).unwrap();
        assert_eq!(sitemap.node(&left).unwrap().position.x, first_x - HORIZONTAL_SPACING);

        let labels: Vec<&str> = sitemap
            .children_of(ROOT_PAGE_ID)
            .iter()
            .map(|n| n.data.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Page 4", "Page 1", "Page 2", "Page 3"]);
    }

    #[test]
    fn test_add_sibling_shares_parent_level_and_row() {
        let (sitemap, first, second) = sitemap_with_two_children();
        let a = sitemap.node(&first).unwrap();
        let b = sitemap.node(&second).unwrap();

        assert_eq!(a.level, b.level);
        assert_eq!(a.position.y, b.position.y);
        assert_eq!(sitemap.parent_of(&second), Some(ROOT_PAGE_ID));
    }

    #[test]
    fn test_add_sibling_rejected_on_root() {
        let mut sitemap = Sitemap::default();

        let result = sitemap.add_sibling(ROOT_PAGE_ID, Side::Left);

        assert_eq!(result, Err(TreeError::RootHasNoSiblings));
        assert_eq!(sitemap.page_count, 1);
    }

    #[test]
    fn test_delete_subtree_removes_descendants_and_edges() {
        let (mut sitemap, first, second) = sitemap_with_two_children();

        let removed = sitemap.delete_subtree(ROOT_PAGE_ID).unwrap();

        assert!(sitemap.nodes.is_empty());
        assert!(sitemap.edges.is_empty());
        let ids: HashSet<String> = removed.nodes.iter().map(|(_, n)| n.id.clone()).collect();
        assert!(ids.contains(ROOT_PAGE_ID));
        assert!(ids.contains(&first));
        assert!(ids.contains(&second));
        assert_eq!(removed.edges.len(), 2);
    }

    #[test]
    fn test_delete_leaf_keeps_siblings() {
        let (mut sitemap, first, second) = sitemap_with_two_children();

        sitemap.delete_subtree(&first).unwrap();

        assert!(!sitemap.contains(&first));
        assert!(sitemap.contains(&second));
        assert_eq!(sitemap.edges.len(), 1);
        assert_eq!(sitemap.edges[0].target, second);
    }

    #[test]
    fn test_restore_subtree_puts_everything_back() {
        let (mut sitemap, first, _) = sitemap_with_two_children();
        let before = sitemap.clone();

        let removed = sitemap.delete_subtree(&first).unwrap();
        sitemap.restore_subtree(&removed);

        assert_eq!(sitemap.nodes, before.nodes);
        assert_eq!(sitemap.edges, before.edges);
    }

    #[test]
    fn test_rename_ignores_blank_and_unchanged() {
        let mut sitemap = Sitemap::default();

        assert_eq!(sitemap.rename(ROOT_PAGE_ID, "   "), Ok(None));
        assert_eq!(sitemap.rename(ROOT_PAGE_ID, "Home"), Ok(None));
        assert_eq!(sitemap.rename(ROOT_PAGE_ID, "Start"), Ok(Some("Home".into())));
        assert_eq!(sitemap.node(ROOT_PAGE_ID).unwrap().data.label, "Start");
    }

    #[test]
    fn test_regenerate_page_with_prompt_replaces_sections() {
        let mut sitemap = Sitemap::default();
        sitemap
            .node_mut(ROOT_PAGE_ID)
            .unwrap()
            .data
            .sections
            .push(Section::new("Old", "old"));

        let previous = sitemap
            .regenerate_page(ROOT_PAGE_ID, "Landing", "Hero with a call to action")
            .unwrap();

        assert_eq!(previous.label, "Home");
        let root = sitemap.node(ROOT_PAGE_ID).unwrap();
        assert_eq!(root.data.label, "Landing");
        assert_eq!(root.data.sections.len(), 1);
        assert_eq!(root.data.sections[0].description, "Hero with a call to action");
    }

    #[test]
    fn test_regenerate_page_without_prompt_keeps_sections() {
        let mut sitemap = Sitemap::default();
        sitemap
            .node_mut(ROOT_PAGE_ID)
            .unwrap()
            .data
            .sections
            .push(Section::new("Keep", "me"));

        sitemap.regenerate_page(ROOT_PAGE_ID, "Landing", "").unwrap();

        let root = sitemap.node(ROOT_PAGE_ID).unwrap();
        assert_eq!(root.data.sections[0].title, "Keep");
    }

    #[test]
    fn test_regenerate_page_requires_name() {
        let mut sitemap = Sitemap::default();

        let result = sitemap.regenerate_page(ROOT_PAGE_ID, "  ", "prompt");

        assert_eq!(result, Err(TreeError::EmptyLabel));
        assert_eq!(sitemap.node(ROOT_PAGE_ID).unwrap().data.label, "Home");
    }

    fn generated(titles: &[&str]) -> GeneratedSitemap {
        GeneratedSitemap {
            business_name: Some("Bakery".into()),
            business_description: Some("Fresh bread".into()),
            pages: titles
                .iter()
                .map(|t| GeneratedPage {
                    page_title: t.to_string(),
                    sections: vec![GeneratedSection {
                        section_title: format!("{t} hero"),
                        section_description: format!("{t} text"),
                    }],
                })
                .collect(),
        }
    }

    #[test]
    fn test_apply_generated_prefers_home_page() {
        let (mut sitemap, _, _) = sitemap_with_two_children();

        sitemap.apply_generated(&generated(&["About", "HOME", "Contact"])).unwrap();

        assert_eq!(sitemap.nodes.len(), 1);
        assert!(sitemap.edges.is_empty());
        let root = sitemap.node(ROOT_PAGE_ID).unwrap();
        assert_eq!(root.data.label, "HOME");
        assert_eq!(root.data.sections[0].title, "HOME hero");
        assert_eq!(root.data.sections[0].description, "HOME text");
        assert_eq!(sitemap.business_name, "Bakery");
        assert_eq!(sitemap.business_description, "Fresh bread");
    }

    #[test]
    fn test_apply_generated_falls_back_to_first_page() {
        let mut sitemap = Sitemap::default();

        sitemap.apply_generated(&generated(&["Welcome", "Menu"])).unwrap();

        assert_eq!(sitemap.node(ROOT_PAGE_ID).unwrap().data.label, "Welcome");
    }

    #[test]
    fn test_apply_generated_rejects_empty_page_list() {
        let mut sitemap = Sitemap::default();

        let result = sitemap.apply_generated(&generated(&[]));

        assert_eq!(result, Err(TreeError::EmptySitemap));
        assert_eq!(sitemap.node(ROOT_PAGE_ID).unwrap().data.label, "Home");
        assert!(sitemap.business_name.is_empty());
    }

    #[test]
    fn test_apply_generated_recreates_deleted_root() {
        let mut sitemap = Sitemap::default();
        sitemap.clear();

        sitemap.apply_generated(&generated(&["Home"])).unwrap();

        assert_eq!(sitemap.nodes.len(), 1);
        assert_eq!(sitemap.nodes[0].id, ROOT_PAGE_ID);
    }

    #[test]
    fn test_clear_resets_page_counter() {
        let (mut sitemap, _, _) = sitemap_with_two_children();

        sitemap.clear();

        assert!(sitemap.is_empty());
        assert!(sitemap.edges.is_empty());
        assert_eq!(sitemap.page_count, 1);
    }

    #[test]
    fn test_descendants_survive_cycles() {
        let mut sitemap = Sitemap::default();
        let child = sitemap.add_child(ROOT_PAGE_ID).unwrap();
        sitemap.edges.push(Edge::new(child.clone(), ROOT_PAGE_ID));

        let descendants = sitemap.descendants_of(ROOT_PAGE_ID);

        assert_eq!(descendants, vec![child]);
    }
}
