//! User interface components and rendering logic for the sitemap editor.
//!
//! This module contains the main application struct, the navigation chrome,
//! the canvas and its dialogs, the website view, and user interaction handling.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main SitemapApp
//! - `canvas` - Canvas navigation, zooming, panning, and hit testing
//! - `rendering` - Drawing pages, edges, grid and minimap
//! - `dialogs` - Setup form, page dialog, menus and the inline label editor
//! - `website` - Website generation, deployment and preview
//! - `requests` - Background requests against the generation backend
//! - `file_ops` - HTML export and opening the preview in a browser
//! - `undo` - Undo/redo history

mod canvas;
mod dialogs;
mod file_ops;
mod rendering;
mod requests;
mod state;
mod undo;
mod website;

pub use state::SitemapApp;
pub use undo::{UndoAction, UndoHistory, UndoableSitemap};

use self::state::View;
use crate::layout;
use crate::storage;
use crate::tree::Side;
use crate::types::*;
use eframe::egui;

/// Sidebar width bounds in screen pixels.
const SIDEBAR_WIDTH_RANGE: (f32, f32) = (48.0, 240.0);

impl eframe::App for SitemapApp {
    /// Persist the sitemap, the generated website and UI preferences.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage::save_sitemap(storage, &self.sitemap);
        storage::save_website_code(storage, self.website.html());
        self.preferences().save(storage);
    }

    fn auto_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(5)
    }

    /// Main update function called by egui for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}

impl SitemapApp {
    /// Draws one frame and handles its input.
    ///
    /// Kept separate from [`eframe::App::update`] so headless tests can drive
    /// whole frames without an `eframe::Frame`.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context
    pub fn show(&mut self, ctx: &egui::Context) {
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        // Results of background work, then newly queued requests
        self.handle_pending_requests(ctx);
        self.handle_pending_export(ctx);

        self.handle_undo_redo_keys(ctx);
        self.handle_delete_key(ctx);

        egui::TopBottomPanel::top("top_nav").show(ctx, |ui| {
            self.draw_top_nav(ui);
        });

        match self.view {
            View::Sitemap => {
                self.draw_sidebar(ctx);
                egui::CentralPanel::default()
                    .frame(egui::Frame::NONE)
                    .show(ctx, |ui| {
                        self.draw_primary_navbar(ui);
                        if self.sitemap.is_empty() {
                            self.draw_empty_sitemap(ui);
                        } else {
                            self.draw_canvas(ui);
                        }
                    });
            }
            View::Website => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    self.draw_website_view(ui);
                });
            }
        }

        self.draw_setup_form(ctx);
        self.draw_page_dialog(ctx);
        self.draw_delete_confirmation(ctx);

        let busy = self.requests.generating_sitemap
            || self.requests.generating_website
            || self.requests.deploying;
        if busy {
            ctx.request_repaint_after(std::time::Duration::from_millis(200));
        }
    }

    /// Handles undo/redo keyboard shortcuts.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for checking input
    fn handle_undo_redo_keys(&mut self, ctx: &egui::Context) {
        // Text fields keep their own undo
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Z) && i.modifiers.command && !i.modifiers.shift) {
            self.perform_undo();
        } else if ctx.input(|i| {
            (i.key_pressed(egui::Key::Z) && i.modifiers.command && i.modifiers.shift)
                || (i.key_pressed(egui::Key::Y) && i.modifiers.command)
        }) {
            self.perform_redo();
        }
    }

    /// Deletes the selected page's subtree on Delete.
    fn handle_delete_key(&mut self, ctx: &egui::Context) {
        if self.view != View::Sitemap || ctx.wants_keyboard_input() {
            return;
        }
        if !ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            return;
        }
        if let Some(page_id) = self.interaction.selected_page.clone() {
            self.delete_page(&page_id);
        }
    }

    /// Title, view switcher, undo/redo and view toggles.
    fn draw_top_nav(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.strong(crate::APP_TITLE);
            ui.separator();
            ui.selectable_value(&mut self.view, View::Sitemap, "Sitemap");
            ui.selectable_value(&mut self.view, View::Website, "Website");
            ui.separator();

            if ui
                .add_enabled(self.undo_history.can_undo(), egui::Button::new("↶ Undo"))
                .clicked()
            {
                self.perform_undo();
            }
            if ui
                .add_enabled(self.undo_history.can_redo(), egui::Button::new("↷ Redo"))
                .clicked()
            {
                self.perform_redo();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.dark_mode, "Dark mode");
                    ui.checkbox(&mut self.canvas.show_grid, "Show grid");
                    ui.checkbox(&mut self.canvas.show_minimap, "Show minimap");
                });
            });
        });
    }

    /// Left sidebar with the "Edit Site Structure" button.
    fn draw_sidebar(&mut self, ctx: &egui::Context) {
        let (min, max) = SIDEBAR_WIDTH_RANGE;
        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(self.sidebar_width.clamp(min, max))
            .width_range(min..=max)
            .show(ctx, |ui| {
                self.sidebar_width = ui.available_width().clamp(min, max);
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui
                        .add(egui::Button::new(egui::RichText::new("✏").size(18.0)))
                        .on_hover_text("Edit Site Structure")
                        .clicked()
                    {
                        self.setup_form.open = true;
                    }
                });
            });
    }

    /// "Primary Sitemap" bar above the canvas with its "⋯" menu.
    fn draw_primary_navbar(&mut self, ui: &mut egui::Ui) {
        egui::Frame::NONE
            .inner_margin(egui::Margin::symmetric(12, 6))
            .fill(ui.visuals().panel_fill)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let title = ui.add(
                        egui::Label::new(egui::RichText::new("Primary Sitemap").strong())
                            .sense(egui::Sense::click()),
                    );
                    if title.on_hover_text("Edit Site Structure").clicked() {
                        self.setup_form.open = true;
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.menu_button("⋯", |ui| {
                            if ui.button("🗑 Delete").clicked() {
                                self.confirm_delete = true;
                                ui.close();
                            }
                        });
                    });
                });
            });
    }

    /// Adds the first child below a root page and selects it.
    ///
    /// # Returns
    ///
    /// The id of the new page, or `None` if the page cannot take a child.
    pub fn add_child_page(&mut self, parent_id: &str) -> Option<PageId> {
        let previous_page_count = self.sitemap.page_count;
        match self.sitemap.add_child(parent_id) {
            Ok(page_id) => {
                self.undo_history.push_action(UndoAction::PageAdded {
                    page_id: page_id.clone(),
                    previous_page_count,
                });
                self.interaction.selected_page = Some(page_id.clone());
                Some(page_id)
            }
            Err(e) => {
                log::warn!("cannot add child: {e}");
                None
            }
        }
    }

    /// Adds a sibling next to a page and selects it.
    pub fn add_sibling_page(&mut self, page_id: &str, side: Side) -> Option<PageId> {
        let previous_page_count = self.sitemap.page_count;
        match self.sitemap.add_sibling(page_id, side) {
            Ok(new_id) => {
                self.undo_history.push_action(UndoAction::PageAdded {
                    page_id: new_id.clone(),
                    previous_page_count,
                });
                self.interaction.selected_page = Some(new_id.clone());
                Some(new_id)
            }
            Err(e) => {
                log::warn!("cannot add sibling: {e}");
                None
            }
        }
    }

    /// Deletes a page and its descendants.
    pub fn delete_page(&mut self, page_id: &str) {
        let page_count = self.sitemap.page_count;
        let removed = match self.sitemap.delete_subtree(page_id) {
            Ok(removed) => removed,
            Err(e) => {
                log::warn!("cannot delete page: {e}");
                return;
            }
        };
        log::info!("deleted {} pages", removed.nodes.len());

        let still_exists = |id: &Option<PageId>| {
            id.as_deref().is_some_and(|id| self.sitemap.contains(id))
        };
        if !still_exists(&self.interaction.selected_page) {
            self.interaction.selected_page = None;
        }
        if !still_exists(&self.interaction.editing_label) {
            self.interaction.editing_label = None;
        }
        if !still_exists(&self.page_dialog.page) {
            self.page_dialog.page = None;
        }
        if !still_exists(&self.interaction.menu_page) {
            self.interaction.menu_page = None;
        }

        self.undo_history.push_action(UndoAction::SubtreeDeleted {
            page_id: page_id.to_string(),
            removed,
            page_count,
        });
    }

    /// Starts inline editing of a page label with the text selected.
    pub fn start_label_edit(&mut self, page_id: &str) {
        let Some(page) = self.sitemap.node(page_id) else {
            return;
        };
        self.interaction.temp_label = page.data.label.clone();
        self.interaction.editing_label = Some(page_id.to_string());
        self.interaction.should_select_text = true;
        self.interaction.focus_requested_for_edit = false;
    }

    /// Saves the inline label edit and ends it.
    pub fn commit_label_edit(&mut self) {
        let Some(page_id) = self.interaction.editing_label.take() else {
            return;
        };
        let label = std::mem::take(&mut self.interaction.temp_label);
        self.rename_page(&page_id, &label);
        if self.page_dialog.page.as_deref() == Some(page_id.as_str()) {
            if let Some(page) = self.sitemap.node(&page_id) {
                self.page_dialog.name = page.data.label.clone();
            }
        }
    }

    /// Renames a page, recording the change for undo.
    ///
    /// Blank or unchanged names are ignored.
    pub fn rename_page(&mut self, page_id: &str, label: &str) {
        match self.sitemap.rename(page_id, label) {
            Ok(Some(old_label)) => {
                self.undo_history.push_action(UndoAction::PageRenamed {
                    page_id: page_id.to_string(),
                    old_label,
                    new_label: label.to_string(),
                });
            }
            Ok(None) => {}
            Err(e) => log::warn!("cannot rename page: {e}"),
        }
    }

    /// Opens the page dialog with the page name prefilled.
    ///
    /// The prompt starts empty so that saving without typing one keeps the
    /// page's sections.
    pub fn open_page_dialog(&mut self, page_id: &str) {
        let Some(page) = self.sitemap.node(page_id) else {
            return;
        };
        self.page_dialog.name = page.data.label.clone();
        self.page_dialog.prompt.clear();
        self.page_dialog.page = Some(page_id.to_string());
    }

    /// Applies the page dialog and closes it.
    ///
    /// An empty name keeps the dialog open.
    pub fn regenerate_from_dialog(&mut self) {
        let Some(page_id) = self.page_dialog.page.clone() else {
            return;
        };
        let name = self.page_dialog.name.clone();
        let prompt = self.page_dialog.prompt.clone();
        match self.sitemap.regenerate_page(&page_id, &name, &prompt) {
            Ok(old_data) => {
                if let Some(page) = self.sitemap.node(&page_id) {
                    let new_data = page.data.clone();
                    if new_data != old_data {
                        self.undo_history.push_action(UndoAction::PageRegenerated {
                            page_id: page_id.clone(),
                            old_data,
                            new_data,
                        });
                    }
                }
                log::info!("page `{name}` regenerated");
                self.page_dialog = Default::default();
            }
            Err(e) => log::warn!("cannot regenerate page: {e}"),
        }
    }

    /// Handles the Generate button of a page card.
    pub fn generate_page(&mut self, page_id: &str) {
        if let Some(page) = self.sitemap.node(page_id) {
            log::info!("generate requested for page `{}`", page.data.label);
        }
    }

    /// Lays the whole sitemap out as tidy trees.
    pub fn tidy_layout(&mut self) {
        let old_positions = self.positions();
        layout::recalculate_layout(&mut self.sitemap);
        let new_positions = self.positions();
        if old_positions != new_positions {
            self.undo_history.push_action(UndoAction::LayoutChanged {
                old_positions,
                new_positions,
            });
        }
    }

    fn positions(&self) -> Vec<(PageId, Position)> {
        self.sitemap
            .nodes
            .iter()
            .map(|page| (page.id.clone(), page.position))
            .collect()
    }

    /// Deletes the whole sitemap after confirmation.
    pub fn delete_sitemap(&mut self) {
        self.sitemap.clear();
        self.undo_history.clear();
        self.interaction = Default::default();
        self.page_dialog = Default::default();
        self.confirm_delete = false;
        log::info!("sitemap deleted");
    }

    /// Performs an undo operation.
    pub fn perform_undo(&mut self) {
        if let Some(action) = self.undo_history.pop_undo() {
            if let Some(redo_action) = self.sitemap.apply_undo(&action) {
                self.undo_history.push_redo(redo_action);
                self.clear_stale_interaction();
            }
        }
    }

    /// Performs a redo operation.
    pub fn perform_redo(&mut self) {
        if let Some(action) = self.undo_history.pop_redo() {
            if let Some(undo_action) = self.sitemap.apply_undo(&action) {
                // push_action would clear the redo stack
                self.undo_history.push_undo(undo_action);
                self.clear_stale_interaction();
            }
        }
    }

    fn clear_stale_interaction(&mut self) {
        self.interaction.selected_page = None;
        self.interaction.editing_label = None;
        self.interaction.menu_page = None;
        if let Some(page_id) = self.page_dialog.page.clone() {
            if !self.sitemap.contains(&page_id) {
                self.page_dialog.page = None;
            }
        }
    }
}
