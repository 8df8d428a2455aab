//! Canvas interaction and navigation functionality.
//!
//! This module handles panning, zooming, fitting the sitemap into view, hit
//! testing of page cards and their handles, and coordinate transformations
//! between screen and world space.

use super::state::SitemapApp;
use crate::constants::*;
use crate::tree::Side;
use crate::types::*;
use eframe::egui;

/// Width of the "⋯" button in a card header, in world units.
pub const MENU_BUTTON_WIDTH: f32 = 28.0;
/// Distance between a card edge and the center of its "+" handle.
pub const HANDLE_OFFSET: f32 = 24.0;
/// Inset of the Generate button inside the card footer.
const FOOTER_INSET: f32 = 8.0;

/// The part of a page card under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeHit {
    /// Icon and label
    Header,
    /// "⋯" menu button
    Menu,
    /// Footer Generate button
    Generate,
    /// "+" below a root page
    AddChild,
    /// "+" left or right of a non-root page
    AddSibling(Side),
    /// Anywhere else on the card
    Body,
}

/// World-space geometry of a page card.
#[derive(Debug, Clone, Copy)]
pub struct CardGeometry {
    /// Whole card
    pub rect: egui::Rect,
    /// Header strip with the label
    pub header: egui::Rect,
    /// "⋯" button inside the header
    pub menu: egui::Rect,
    /// Generate button in the footer
    pub generate: egui::Rect,
}

impl CardGeometry {
    /// Computes the card layout of a page.
    pub fn of(page: &PageNode) -> Self {
        let rect = egui::Rect::from_min_size(
            egui::pos2(page.position.x, page.position.y),
            egui::vec2(NODE_WIDTH, page.height()),
        );
        let header = egui::Rect::from_min_size(rect.min, egui::vec2(NODE_WIDTH, NODE_HEADER_HEIGHT));
        let menu = egui::Rect::from_min_max(
            egui::pos2(header.max.x - MENU_BUTTON_WIDTH, header.min.y),
            header.max,
        );
        let footer = egui::Rect::from_min_max(
            egui::pos2(rect.min.x, rect.max.y - NODE_FOOTER_HEIGHT),
            rect.max,
        );
        Self {
            rect,
            header,
            menu,
            generate: footer.shrink(FOOTER_INSET),
        }
    }

    /// Center of the "+" handle below the card.
    pub fn child_handle(&self) -> egui::Pos2 {
        egui::pos2(self.rect.center().x, self.rect.max.y + HANDLE_OFFSET)
    }

    /// Center of the "+" handle on one side of the card.
    pub fn sibling_handle(&self, side: Side) -> egui::Pos2 {
        match side {
            Side::Left => egui::pos2(self.rect.min.x - HANDLE_OFFSET, self.rect.center().y),
            Side::Right => egui::pos2(self.rect.max.x + HANDLE_OFFSET, self.rect.center().y),
        }
    }
}

/// Bounding box of all pages in world space, if there are any.
pub fn sitemap_bounds(sitemap: &Sitemap) -> Option<egui::Rect> {
    sitemap
        .nodes
        .iter()
        .map(|page| CardGeometry::of(page).rect)
        .reduce(|a, b| a.union(b))
}

impl SitemapApp {
    /// Converts screen coordinates to world coordinates accounting for zoom and pan.
    pub fn screen_to_world(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        (screen_pos - self.canvas.offset) / self.canvas.zoom_factor
    }

    /// Converts world coordinates to screen coordinates accounting for zoom and pan.
    pub fn world_to_screen(&self, world_pos: egui::Pos2) -> egui::Pos2 {
        world_pos * self.canvas.zoom_factor + self.canvas.offset
    }

    /// Converts a world rectangle to screen space.
    pub fn world_rect_to_screen(&self, rect: egui::Rect) -> egui::Rect {
        egui::Rect::from_min_max(self.world_to_screen(rect.min), self.world_to_screen(rect.max))
    }

    /// Sets the zoom level while keeping `anchor` (screen space) fixed.
    ///
    /// The zoom is clamped to [`MIN_ZOOM`]..=[`MAX_ZOOM`].
    pub fn zoom_about(&mut self, anchor: egui::Pos2, zoom: f32) {
        let world_anchor = self.screen_to_world(anchor);
        self.canvas.zoom_factor = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.canvas.offset = anchor.to_vec2() - world_anchor.to_vec2() * self.canvas.zoom_factor;
    }

    /// Frames every page inside `canvas_rect`.
    ///
    /// Zoom never exceeds 100% so a lone page is not blown up.
    pub fn fit_view(&mut self, canvas_rect: egui::Rect) {
        let Some(bounds) = sitemap_bounds(&self.sitemap) else {
            self.canvas.zoom_factor = 1.0;
            self.canvas.offset = canvas_rect.min.to_vec2();
            return;
        };
        let bounds = bounds.expand(HANDLE_OFFSET + HANDLE_RADIUS);
        let available = (canvas_rect.size() - egui::Vec2::splat(2.0 * FIT_VIEW_PADDING))
            .max(egui::Vec2::splat(1.0));
        let zoom = (available.x / bounds.width())
            .min(available.y / bounds.height())
            .clamp(MIN_ZOOM, 1.0);
        self.canvas.zoom_factor = zoom;
        self.canvas.offset = canvas_rect.center().to_vec2() - bounds.center().to_vec2() * zoom;
    }

    /// Handles middle-button panning and dragging on empty canvas space.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    /// * `response` - The response from the canvas widget
    pub fn handle_canvas_panning(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let (primary_down, middle_down, press_origin) = ui.input(|i| {
            (
                i.pointer.primary_down(),
                i.pointer.middle_down(),
                i.pointer.press_origin(),
            )
        });
        let started_on_empty = press_origin
            .map(|p| response.rect.contains(p) && self.hit_test(self.screen_to_world(p)).is_none())
            .unwrap_or(false);
        let should_pan = middle_down || (primary_down && started_on_empty && response.dragged());

        if should_pan {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if !self.interaction.is_panning {
                    self.interaction.is_panning = true;
                    self.interaction.last_pan_pos = Some(current_pos);
                } else if let Some(last_pos) = self.interaction.last_pan_pos {
                    self.canvas.offset += current_pos - last_pos;
                    self.interaction.last_pan_pos = Some(current_pos);
                }
            }
        } else {
            self.interaction.is_panning = false;
            self.interaction.last_pan_pos = None;
        }
    }

    /// Handles scroll wheel and pinch zooming around the pointer.
    ///
    /// Only zooms if the cursor is over the canvas.
    pub fn handle_canvas_zoom(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let (scroll, pinch) = ui.input(|i| (i.smooth_scroll_delta.y, i.zoom_delta()));
        if scroll == 0.0 && pinch == 1.0 {
            return;
        }
        let Some(mouse_pos) = ui
            .input(|i| i.pointer.hover_pos())
            .or_else(|| response.interact_pointer_pos())
        else {
            return;
        };
        if !response.rect.contains(mouse_pos) {
            return;
        }
        let factor = pinch * (scroll * 0.002).exp();
        self.zoom_about(mouse_pos, self.canvas.zoom_factor * factor);
    }

    /// Finds the page and card part at a world position.
    ///
    /// Handles are tested first since they sit outside the card rectangles.
    /// Later pages win when cards overlap, matching the drawing order.
    pub fn hit_test(&self, world_pos: egui::Pos2) -> Option<(PageId, NodeHit)> {
        for page in self.sitemap.nodes.iter().rev() {
            let geometry = CardGeometry::of(page);
            if self.sitemap.is_root(&page.id) {
                if !self.sitemap.has_children(&page.id)
                    && geometry.child_handle().distance(world_pos) <= HANDLE_RADIUS
                {
                    return Some((page.id.clone(), NodeHit::AddChild));
                }
            } else {
                for side in [Side::Left, Side::Right] {
                    if geometry.sibling_handle(side).distance(world_pos) <= HANDLE_RADIUS {
                        return Some((page.id.clone(), NodeHit::AddSibling(side)));
                    }
                }
            }
        }

        let page = self
            .sitemap
            .nodes
            .iter()
            .rev()
            .find(|page| CardGeometry::of(page).rect.contains(world_pos))?;
        let geometry = CardGeometry::of(page);
        let hit = if geometry.menu.contains(world_pos) {
            NodeHit::Menu
        } else if geometry.header.contains(world_pos) {
            NodeHit::Header
        } else if geometry.generate.contains(world_pos) {
            NodeHit::Generate
        } else {
            NodeHit::Body
        };
        Some((page.id.clone(), hit))
    }

    /// Handles clicks on the canvas: card parts, handles, minimap and empty space.
    pub fn handle_canvas_clicks(&mut self, response: &egui::Response) {
        if !response.clicked() || self.interaction.is_panning {
            return;
        }
        let Some(screen_pos) = response.interact_pointer_pos() else {
            return;
        };

        if self.canvas.show_minimap {
            if let Some(world_pos) = self.minimap_to_world(response.rect, screen_pos) {
                let center = response.rect.center();
                self.canvas.offset = center.to_vec2() - world_pos.to_vec2() * self.canvas.zoom_factor;
                return;
            }
        }

        let world_pos = self.screen_to_world(screen_pos);
        match self.hit_test(world_pos) {
            Some((page_id, hit)) => {
                self.interaction.selected_page = Some(page_id.clone());
                match hit {
                    NodeHit::Header => {
                        self.open_page_dialog(&page_id);
                        self.start_label_edit(&page_id);
                    }
                    NodeHit::Menu => {
                        self.interaction.menu_page = Some(page_id);
                        self.interaction.menu_pos = screen_pos;
                        self.interaction.menu_just_opened = true;
                    }
                    NodeHit::Generate => self.generate_page(&page_id),
                    NodeHit::AddChild => {
                        self.add_child_page(&page_id);
                    }
                    NodeHit::AddSibling(side) => {
                        self.add_sibling_page(&page_id, side);
                    }
                    NodeHit::Body => {}
                }
            }
            None => {
                self.interaction.selected_page = None;
                self.interaction.menu_page = None;
            }
        }
    }

    /// Renders the canvas with pages and edges and handles user interactions.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        if self.canvas.fit_requested {
            self.fit_view(response.rect);
            self.canvas.fit_requested = false;
        }

        self.handle_canvas_panning(ui, &response);
        self.handle_canvas_zoom(ui, &response);
        self.handle_canvas_clicks(&response);

        let painter = painter.with_clip_rect(response.rect);
        self.render_sitemap(&painter, response.rect);

        self.draw_canvas_controls(ui, response.rect);

        if self.interaction.editing_label.is_some() {
            self.draw_label_editor(ui);
        }
        if self.interaction.menu_page.is_some() {
            self.draw_page_menu(ui);
        }
    }

    /// Zoom, fit and tidy buttons in the bottom-left corner of the canvas.
    fn draw_canvas_controls(&mut self, ui: &mut egui::Ui, canvas_rect: egui::Rect) {
        let size = egui::vec2(40.0, 4.0 * 26.0);
        let rect = egui::Rect::from_min_size(
            egui::pos2(
                canvas_rect.min.x + OVERLAY_MARGIN,
                canvas_rect.max.y - OVERLAY_MARGIN - size.y,
            ),
            size,
        );
        let mut controls = ui.new_child(
            egui::UiBuilder::new()
                .max_rect(rect)
                .layout(egui::Layout::top_down(egui::Align::Center)),
        );
        controls.spacing_mut().item_spacing.y = 2.0;
        let center = canvas_rect.center();

        if controls.button("+").on_hover_text("Zoom in").clicked() {
            self.zoom_about(center, self.canvas.zoom_factor * 1.2);
        }
        if controls.button("−").on_hover_text("Zoom out").clicked() {
            self.zoom_about(center, self.canvas.zoom_factor / 1.2);
        }
        if controls.button("⛶").on_hover_text("Fit view").clicked() {
            self.fit_view(canvas_rect);
        }
        if controls.button("⇅").on_hover_text("Tidy layout").clicked() {
            self.tidy_layout();
            self.fit_view(canvas_rect);
        }
    }
}
