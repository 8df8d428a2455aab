//! Undo/redo functionality for tracking and reversing sitemap edits.
//!
//! Every action stores enough to reverse itself, and applying an action
//! returns its inverse so the same code path serves undo and redo.

use crate::constants::MAX_UNDO_HISTORY;
use crate::tree::RemovedSubtree;
use crate::types::*;

/// Represents different types of actions that can be undone.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoAction {
    /// A page (child or sibling) was added, or a deleted subtree came back
    PageAdded {
        /// Top page of the added subtree
        page_id: PageId,
        /// Page counter before the addition
        previous_page_count: u32,
    },
    /// A page and its descendants were deleted
    SubtreeDeleted {
        /// Top page of the removed subtree
        page_id: PageId,
        /// Removed pages and edges with their original indices
        removed: RemovedSubtree,
        /// Page counter at the time of deletion
        page_count: u32,
    },
    /// A page was renamed
    PageRenamed {
        page_id: PageId,
        old_label: String,
        new_label: String,
    },
    /// The page dialog replaced a page's data
    PageRegenerated {
        page_id: PageId,
        old_data: PageData,
        new_data: PageData,
    },
    /// Pages were moved by a layout pass
    LayoutChanged {
        /// Positions before the pass
        old_positions: Vec<(PageId, Position)>,
        /// Positions after the pass
        new_positions: Vec<(PageId, Position)>,
    },
}

/// Manages undo/redo history for the application.
#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    /// Stack of actions that can be undone
    undo_stack: Vec<UndoAction>,
    /// Stack of actions that can be redone
    redo_stack: Vec<UndoAction>,
}

impl UndoHistory {
    /// Creates a new empty undo history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an action to the undo history.
    ///
    /// This clears the redo stack since a new action invalidates any previously undone actions.
    ///
    /// # Arguments
    ///
    /// * `action` - The action to record
    pub fn push_action(&mut self, action: UndoAction) {
        self.undo_stack.push(action);
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Pushes the inverse of a redone action without touching the redo stack.
    pub fn push_undo(&mut self, action: UndoAction) {
        self.undo_stack.push(action);
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Returns true if there are actions that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are actions that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Pops the most recent action from the undo stack.
    pub fn pop_undo(&mut self) -> Option<UndoAction> {
        self.undo_stack.pop()
    }

    /// Pops the most recent action from the redo stack.
    pub fn pop_redo(&mut self) -> Option<UndoAction> {
        self.redo_stack.pop()
    }

    /// Pushes an action onto the redo stack.
    ///
    /// # Arguments
    ///
    /// * `action` - The inverse of the action that was undone
    pub fn push_redo(&mut self, action: UndoAction) {
        self.redo_stack.push(action);
    }

    /// Clears all undo and redo history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Extension methods for applying undo actions to a sitemap.
pub trait UndoableSitemap {
    /// Reverses an action.
    ///
    /// # Returns
    ///
    /// The action that reverses this one again, or `None` if the action no
    /// longer applies (for example because its page is gone).
    fn apply_undo(&mut self, action: &UndoAction) -> Option<UndoAction>;
}

impl UndoableSitemap for Sitemap {
    fn apply_undo(&mut self, action: &UndoAction) -> Option<UndoAction> {
        match action {
            UndoAction::PageAdded {
                page_id,
                previous_page_count,
            } => {
                let removed = self.delete_subtree(page_id).ok()?;
                let page_count = std::mem::replace(&mut self.page_count, *previous_page_count);
                Some(UndoAction::SubtreeDeleted {
                    page_id: page_id.clone(),
                    removed,
                    page_count,
                })
            }
            UndoAction::SubtreeDeleted {
                page_id,
                removed,
                page_count,
            } => {
                if self.contains(page_id) {
                    return None;
                }
                self.restore_subtree(removed);
                let previous_page_count = std::mem::replace(&mut self.page_count, *page_count);
                Some(UndoAction::PageAdded {
                    page_id: page_id.clone(),
                    previous_page_count,
                })
            }
            UndoAction::PageRenamed {
                page_id,
                old_label,
                new_label,
            } => {
                let page = self.node_mut(page_id)?;
                page.data.label = old_label.clone();
                Some(UndoAction::PageRenamed {
                    page_id: page_id.clone(),
                    old_label: new_label.clone(),
                    new_label: old_label.clone(),
                })
            }
            UndoAction::PageRegenerated {
                page_id,
                old_data,
                new_data,
            } => {
                let page = self.node_mut(page_id)?;
                page.data = old_data.clone();
                Some(UndoAction::PageRegenerated {
                    page_id: page_id.clone(),
                    old_data: new_data.clone(),
                    new_data: old_data.clone(),
                })
            }
            UndoAction::LayoutChanged {
                old_positions,
                new_positions,
            } => {
                for (id, position) in old_positions {
                    if let Some(page) = self.node_mut(id) {
                        page.position = *position;
                    }
                }
                Some(UndoAction::LayoutChanged {
                    old_positions: new_positions.clone(),
                    new_positions: old_positions.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout;
    use crate::tree::Side;

    #[test]
    fn test_history_limits_and_redo_invalidation() {
        let mut history = UndoHistory::new();
        for i in 0..(MAX_UNDO_HISTORY + 5) {
            history.push_action(UndoAction::PageRenamed {
                page_id: ROOT_PAGE_ID.into(),
                old_label: format!("{i}"),
                new_label: format!("{}", i + 1),
            });
        }
        assert_eq!(history.undo_stack.len(), MAX_UNDO_HISTORY);

        let action = history.pop_undo().unwrap();
        history.push_redo(action.clone());
        assert!(history.can_redo());

        history.push_action(action);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_and_redo_page_addition() {
        let mut sitemap = Sitemap::default();
        let before = sitemap.clone();
        let id = sitemap.add_child(ROOT_PAGE_ID).unwrap();
        let after = sitemap.clone();
        let action = UndoAction::PageAdded {
            page_id: id.clone(),
            previous_page_count: 1,
        };

        let redo = sitemap.apply_undo(&action).unwrap();
        assert_eq!(sitemap, before);

        let undo_again = sitemap.apply_undo(&redo).unwrap();
        assert_eq!(sitemap, after);
        assert!(matches!(undo_again, UndoAction::PageAdded { .. }));
    }

    #[test]
    fn test_undo_and_redo_subtree_deletion() {
        let mut sitemap = Sitemap::default();
        let first = sitemap.add_child(ROOT_PAGE_ID).unwrap();
        sitemap.add_sibling(&first, Side::Right).unwrap();
        let before = sitemap.clone();

        let removed = sitemap.delete_subtree(ROOT_PAGE_ID).unwrap();
        let action = UndoAction::SubtreeDeleted {
            page_id: ROOT_PAGE_ID.into(),
            removed,
            page_count: sitemap.page_count,
        };
        let deleted = sitemap.clone();

        let redo = sitemap.apply_undo(&action).unwrap();
        assert_eq!(sitemap, before);

        sitemap.apply_undo(&redo).unwrap();
        assert_eq!(sitemap, deleted);
    }

    #[test]
    fn test_undo_leaf_deletion_keeps_siblings() {
        let mut sitemap = Sitemap::default();
        let first = sitemap.add_child(ROOT_PAGE_ID).unwrap();
        let second = sitemap.add_sibling(&first, Side::Right).unwrap();

        let removed = sitemap.delete_subtree(&second).unwrap();
        let action = UndoAction::SubtreeDeleted {
            page_id: second.clone(),
            removed,
            page_count: sitemap.page_count,
        };

        let redo = sitemap.apply_undo(&action).unwrap();
        assert!(sitemap.contains(&second));

        sitemap.apply_undo(&redo).unwrap();
        assert!(!sitemap.contains(&second));
        assert!(sitemap.contains(&first));
    }

    #[test]
    fn test_undo_rename_and_regeneration() {
        let mut sitemap = Sitemap::default();
        let old_label = sitemap.rename(ROOT_PAGE_ID, "Start").unwrap().unwrap();
        let rename = UndoAction::PageRenamed {
            page_id: ROOT_PAGE_ID.into(),
            old_label,
            new_label: "Start".into(),
        };

        let redo = sitemap.apply_undo(&rename).unwrap();
        assert_eq!(sitemap.node(ROOT_PAGE_ID).unwrap().data.label, "Home");
        sitemap.apply_undo(&redo).unwrap();
        assert_eq!(sitemap.node(ROOT_PAGE_ID).unwrap().data.label, "Start");

        let old_data = sitemap
            .regenerate_page(ROOT_PAGE_ID, "Landing", "Hero")
            .unwrap();
        let new_data = sitemap.node(ROOT_PAGE_ID).unwrap().data.clone();
        let regen = UndoAction::PageRegenerated {
            page_id: ROOT_PAGE_ID.into(),
            old_data: old_data.clone(),
            new_data,
        };

        sitemap.apply_undo(&regen).unwrap();
        assert_eq!(sitemap.node(ROOT_PAGE_ID).unwrap().data, old_data);
    }

    #[test]
    fn test_undo_layout_restores_positions() {
        let mut sitemap = Sitemap::default();
        let first = sitemap.add_child(ROOT_PAGE_ID).unwrap();
        sitemap.add_sibling(&first, Side::Right).unwrap();
        let old_positions: Vec<_> = sitemap
            .nodes
            .iter()
            .map(|n| (n.id.clone(), n.position))
            .collect();
        layout::recalculate_layout(&mut sitemap);
        let new_positions: Vec<_> = sitemap
            .nodes
            .iter()
            .map(|n| (n.id.clone(), n.position))
            .collect();

        sitemap
            .apply_undo(&UndoAction::LayoutChanged {
                old_positions: old_positions.clone(),
                new_positions,
            })
            .unwrap();

        let restored: Vec<_> = sitemap
            .nodes
            .iter()
            .map(|n| (n.id.clone(), n.position))
            .collect();
        assert_eq!(restored, old_positions);
    }

    #[test]
    fn test_undo_on_missing_page_is_noop() {
        let mut sitemap = Sitemap::default();

        let result = sitemap.apply_undo(&UndoAction::PageRenamed {
            page_id: "gone".into(),
            old_label: "a".into(),
            new_label: "b".into(),
        });

        assert_eq!(result, None);
    }
}
