//! Canvas rendering for page cards, edges, the grid and the minimap.
//!
//! Everything is painted in world space converted through the current pan and
//! zoom, so sizes scale with the zoom factor.

use super::canvas::{sitemap_bounds, CardGeometry};
use super::state::SitemapApp;
use crate::constants::*;
use crate::tree::Side;
use crate::types::*;
use eframe::egui;
use eframe::epaint::StrokeKind;

/// Colors used on the canvas for the current theme.
struct Palette {
    card_fill: egui::Color32,
    card_stroke: egui::Color32,
    header_fill: egui::Color32,
    text: egui::Color32,
    muted_text: egui::Color32,
    section_fill: egui::Color32,
    edge: egui::Color32,
    accent: egui::Color32,
    handle_disabled: egui::Color32,
}

impl Palette {
    fn new(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                card_fill: egui::Color32::from_gray(38),
                card_stroke: egui::Color32::from_gray(80),
                header_fill: egui::Color32::from_gray(50),
                text: egui::Color32::from_gray(230),
                muted_text: egui::Color32::from_gray(160),
                section_fill: egui::Color32::from_gray(45),
                edge: egui::Color32::from_gray(140),
                accent: egui::Color32::from_rgb(96, 165, 250),
                handle_disabled: egui::Color32::from_gray(70),
            }
        } else {
            Self {
                card_fill: egui::Color32::WHITE,
                card_stroke: egui::Color32::from_gray(210),
                header_fill: egui::Color32::from_gray(245),
                text: egui::Color32::from_gray(20),
                muted_text: egui::Color32::from_gray(110),
                section_fill: egui::Color32::from_gray(248),
                edge: egui::Color32::from_gray(150),
                accent: egui::Color32::from_rgb(37, 99, 235),
                handle_disabled: egui::Color32::from_gray(200),
            }
        }
    }
}

impl SitemapApp {
    /// Renders the grid, edges, pages and minimap.
    ///
    /// # Arguments
    ///
    /// * `painter` - Painter clipped to the canvas
    /// * `canvas_rect` - The screen-space rectangle of the canvas area
    pub fn render_sitemap(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let palette = Palette::new(self.dark_mode);

        if self.canvas.show_grid {
            self.draw_grid(painter, canvas_rect);
        }

        for edge in &self.sitemap.edges {
            self.draw_edge(painter, edge, &palette);
        }
        for page in &self.sitemap.nodes {
            self.draw_page(painter, page, &palette);
        }

        if self.canvas.show_minimap {
            self.draw_minimap(painter, canvas_rect, &palette);
        }
    }

    /// Fills the canvas area while there is no sitemap.
    ///
    /// No canvas is allocated, so there is nothing to pan, zoom or click.
    pub fn draw_empty_sitemap(&self, ui: &mut egui::Ui) {
        let palette = Palette::new(self.dark_mode);
        ui.centered_and_justified(|ui| {
            ui.label(
                egui::RichText::new("No sitemap yet. Use \"Edit Site Structure\" to generate one.")
                    .size(16.0)
                    .color(palette.muted_text),
            );
        });
    }

    /// Draws a zoom-aware grid on the canvas.
    ///
    /// Grid lines are drawn every [`GRID_SIZE`] world units and skipped when
    /// they would be too dense to see.
    pub fn draw_grid(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let screen_grid_size = GRID_SIZE * self.canvas.zoom_factor;
        if screen_grid_size < 4.0 {
            return;
        }
        let stroke = egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(128, 128, 128, 24));

        let top_left = self.screen_to_world(canvas_rect.min);
        let bottom_right = self.screen_to_world(canvas_rect.max);

        let mut x = (top_left.x / GRID_SIZE).floor() * GRID_SIZE;
        while x <= bottom_right.x {
            let screen_x = self.world_to_screen(egui::pos2(x, 0.0)).x;
            painter.line_segment(
                [
                    egui::pos2(screen_x, canvas_rect.min.y),
                    egui::pos2(screen_x, canvas_rect.max.y),
                ],
                stroke,
            );
            x += GRID_SIZE;
        }

        let mut y = (top_left.y / GRID_SIZE).floor() * GRID_SIZE;
        while y <= bottom_right.y {
            let screen_y = self.world_to_screen(egui::pos2(0.0, y)).y;
            painter.line_segment(
                [
                    egui::pos2(canvas_rect.min.x, screen_y),
                    egui::pos2(canvas_rect.max.x, screen_y),
                ],
                stroke,
            );
            y += GRID_SIZE;
        }
    }

    /// Draws a parent-to-child edge as an orthogonal "smooth step" polyline.
    fn draw_edge(&self, painter: &egui::Painter, edge: &Edge, palette: &Palette) {
        let (Some(source), Some(target)) = (self.sitemap.node(&edge.source), self.sitemap.node(&edge.target)) else {
            return;
        };
        let points: Vec<egui::Pos2> = smooth_step_points(
            CardGeometry::of(source).rect,
            CardGeometry::of(target).rect,
        )
        .into_iter()
        .map(|p| self.world_to_screen(p))
        .collect();
        painter.line(points, egui::Stroke::new(1.5, palette.edge));
    }

    /// Draws a page card with header, sections, footer and handles.
    fn draw_page(&self, painter: &egui::Painter, page: &PageNode, palette: &Palette) {
        let zoom = self.canvas.zoom_factor;
        let geometry = CardGeometry::of(page);
        let rect = self.world_rect_to_screen(geometry.rect);
        let radius = NODE_CORNER_RADIUS * zoom;
        let selected = self.interaction.selected_page.as_deref() == Some(page.id.as_str());
        let is_root = self.sitemap.is_root(&page.id);

        painter.rect_filled(rect, radius, palette.card_fill);

        // Header
        let header = self.world_rect_to_screen(geometry.header);
        painter.rect_filled(
            header,
            egui::CornerRadius {
                nw: radius as u8,
                ne: radius as u8,
                sw: 0,
                se: 0,
            },
            palette.header_fill,
        );
        let font = egui::FontId::proportional((13.0 * zoom).clamp(6.0, 32.0));
        let small = egui::FontId::proportional((11.0 * zoom).clamp(5.0, 28.0));
        let pad = 8.0 * zoom;
        painter.text(
            egui::pos2(header.min.x + pad, header.center().y),
            egui::Align2::LEFT_CENTER,
            "📄",
            font.clone(),
            palette.muted_text,
        );
        if self.interaction.editing_label.as_deref() != Some(page.id.as_str()) {
            let label_left = header.min.x + pad + 18.0 * zoom;
            let label_width = self.world_rect_to_screen(geometry.menu).min.x - label_left - pad;
            let label = truncate_to_width(painter, &page.data.label, &font, label_width);
            painter.text(
                egui::pos2(label_left, header.center().y),
                egui::Align2::LEFT_CENTER,
                label,
                font.clone(),
                palette.text,
            );
        }
        let menu = self.world_rect_to_screen(geometry.menu);
        painter.text(
            menu.center(),
            egui::Align2::CENTER_CENTER,
            "⋯",
            font.clone(),
            palette.muted_text,
        );

        // Sections are only listed on the root card
        if page.id == ROOT_PAGE_ID {
            for (i, section) in page.data.sections.iter().enumerate() {
                let top = geometry.header.max.y + i as f32 * NODE_SECTION_HEIGHT;
                let world = egui::Rect::from_min_size(
                    egui::pos2(geometry.rect.min.x, top),
                    egui::vec2(NODE_WIDTH, NODE_SECTION_HEIGHT),
                )
                .shrink(4.0);
                let section_rect = self.world_rect_to_screen(world);
                painter.rect_filled(section_rect, 3.0 * zoom, palette.section_fill);
                let width = section_rect.width() - pad;
                let title = if section.title.is_empty() {
                    "Section"
                } else {
                    section.title.as_str()
                };
                painter.text(
                    egui::pos2(section_rect.min.x + pad / 2.0, section_rect.min.y + pad / 2.0),
                    egui::Align2::LEFT_TOP,
                    truncate_to_width(painter, title, &small, width),
                    small.clone(),
                    palette.text,
                );
                let lines = self.wrap_text(&section.description, width, &small, painter);
                for (line_index, line) in lines.iter().take(2).enumerate() {
                    painter.text(
                        egui::pos2(
                            section_rect.min.x + pad / 2.0,
                            section_rect.min.y + pad / 2.0 + (line_index as f32 + 1.0) * 14.0 * zoom,
                        ),
                        egui::Align2::LEFT_TOP,
                        line,
                        small.clone(),
                        palette.muted_text,
                    );
                }
            }
        }

        // Footer
        let generate = self.world_rect_to_screen(geometry.generate);
        painter.rect_filled(generate, 4.0 * zoom, palette.accent);
        painter.text(
            generate.center(),
            egui::Align2::CENTER_CENTER,
            "Generate",
            small.clone(),
            egui::Color32::WHITE,
        );

        let (stroke_color, stroke_width) = if selected {
            (palette.accent, 2.0)
        } else {
            (palette.card_stroke, 1.0)
        };
        painter.rect_stroke(
            rect,
            radius,
            egui::Stroke::new(stroke_width, stroke_color),
            StrokeKind::Outside,
        );

        // Handles
        if is_root {
            let enabled = !self.sitemap.has_children(&page.id);
            self.draw_handle(painter, geometry.child_handle(), enabled, palette);
        } else {
            for side in [Side::Left, Side::Right] {
                self.draw_handle(painter, geometry.sibling_handle(side), true, palette);
            }
        }
    }

    /// Draws a round "+" handle.
    fn draw_handle(&self, painter: &egui::Painter, world_center: egui::Pos2, enabled: bool, palette: &Palette) {
        let center = self.world_to_screen(world_center);
        let radius = HANDLE_RADIUS * self.canvas.zoom_factor;
        let color = if enabled {
            palette.accent
        } else {
            palette.handle_disabled
        };
        painter.circle_filled(center, radius, palette.card_fill);
        painter.circle_stroke(center, radius, egui::Stroke::new(1.5, color));
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            "+",
            egui::FontId::proportional((14.0 * self.canvas.zoom_factor).clamp(6.0, 32.0)),
            color,
        );
    }

    /// Screen rectangle of the minimap overlay.
    pub fn minimap_rect(canvas_rect: egui::Rect) -> egui::Rect {
        let (w, h) = MINIMAP_SIZE;
        egui::Rect::from_min_size(
            egui::pos2(
                canvas_rect.max.x - OVERLAY_MARGIN - w,
                canvas_rect.max.y - OVERLAY_MARGIN - h,
            ),
            egui::vec2(w, h),
        )
    }

    /// World area shown by the minimap: the pages plus the visible viewport.
    fn minimap_world(&self, canvas_rect: egui::Rect) -> Option<egui::Rect> {
        let bounds = sitemap_bounds(&self.sitemap)?;
        let viewport = egui::Rect::from_min_max(
            self.screen_to_world(canvas_rect.min),
            self.screen_to_world(canvas_rect.max),
        );
        Some(bounds.union(viewport).expand(20.0))
    }

    /// Maps a world rectangle into the minimap.
    fn minimap_transform(world: egui::Rect, minimap: egui::Rect) -> (f32, egui::Vec2) {
        let scale = (minimap.width() / world.width()).min(minimap.height() / world.height());
        let used = world.size() * scale;
        let origin = minimap.center() - used / 2.0;
        (scale, origin.to_vec2() - world.min.to_vec2() * scale)
    }

    /// Converts a click inside the minimap into the world position it shows.
    pub fn minimap_to_world(&self, canvas_rect: egui::Rect, screen_pos: egui::Pos2) -> Option<egui::Pos2> {
        let minimap = Self::minimap_rect(canvas_rect);
        if !minimap.contains(screen_pos) {
            return None;
        }
        let world = self.minimap_world(canvas_rect)?;
        let (scale, offset) = Self::minimap_transform(world, minimap);
        Some(((screen_pos.to_vec2() - offset) / scale).to_pos2())
    }

    /// Draws the minimap overlay with page outlines and the current viewport.
    fn draw_minimap(&self, painter: &egui::Painter, canvas_rect: egui::Rect, palette: &Palette) {
        let Some(world) = self.minimap_world(canvas_rect) else {
            return;
        };
        let minimap = Self::minimap_rect(canvas_rect);
        let (scale, offset) = Self::minimap_transform(world, minimap);
        let map = |r: egui::Rect| {
            egui::Rect::from_min_max(
                (r.min.to_vec2() * scale + offset).to_pos2(),
                (r.max.to_vec2() * scale + offset).to_pos2(),
            )
        };

        painter.rect_filled(minimap, 4.0, palette.card_fill.gamma_multiply(0.9));
        painter.rect_stroke(
            minimap,
            4.0,
            egui::Stroke::new(1.0, palette.card_stroke),
            StrokeKind::Inside,
        );
        for page in &self.sitemap.nodes {
            painter.rect_filled(map(CardGeometry::of(page).rect), 1.0, palette.edge);
        }
        let viewport = egui::Rect::from_min_max(
            self.screen_to_world(canvas_rect.min),
            self.screen_to_world(canvas_rect.max),
        );
        painter.rect_stroke(
            map(viewport).intersect(minimap),
            0.0,
            egui::Stroke::new(1.5, palette.accent),
            StrokeKind::Inside,
        );
    }

    /// Wraps text to fit within the specified width, returning a vector of lines.
    ///
    /// Breaks text at word boundaries. A single word wider than the limit is
    /// placed on its own line anyway.
    ///
    /// # Arguments
    ///
    /// * `text` - The text to wrap
    /// * `max_width` - Maximum width in pixels
    /// * `font_id` - Font to use for measuring text width
    /// * `painter` - The egui painter for measuring text
    pub fn wrap_text(
        &self,
        text: &str,
        max_width: f32,
        font_id: &egui::FontId,
        painter: &egui::Painter,
    ) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current_line = String::new();

        for word in text.split_whitespace() {
            let test_line = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{current_line} {word}")
            };
            if text_width(painter, &test_line, font_id) <= max_width {
                current_line = test_line;
            } else if !current_line.is_empty() {
                lines.push(std::mem::replace(&mut current_line, word.to_string()));
            } else {
                lines.push(word.to_string());
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
        lines
    }
}

/// Corner points of an orthogonal edge from the bottom of `source` to the top of `target`.
pub fn smooth_step_points(source: egui::Rect, target: egui::Rect) -> Vec<egui::Pos2> {
    let start = egui::pos2(source.center().x, source.max.y);
    let end = egui::pos2(target.center().x, target.min.y);
    let mid_y = (start.y + end.y) / 2.0;
    if (start.x - end.x).abs() < f32::EPSILON {
        return vec![start, end];
    }
    vec![
        start,
        egui::pos2(start.x, mid_y),
        egui::pos2(end.x, mid_y),
        end,
    ]
}

fn text_width(painter: &egui::Painter, text: &str, font_id: &egui::FontId) -> f32 {
    painter
        .layout_no_wrap(text.to_string(), font_id.clone(), egui::Color32::BLACK)
        .size()
        .x
}

/// Shortens `text` with an ellipsis until it fits `max_width`.
fn truncate_to_width(painter: &egui::Painter, text: &str, font_id: &egui::FontId, max_width: f32) -> String {
    if text_width(painter, text, font_id) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "…";
        if text_width(painter, &candidate, font_id) <= max_width {
            return candidate;
        }
    }
    "…".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_step_has_horizontal_middle_segment() {
        let source = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(180.0, 76.0));
        let target = egui::Rect::from_min_size(egui::pos2(400.0, 300.0), egui::vec2(180.0, 76.0));

        let points = smooth_step_points(source, target);

        assert_eq!(
            points,
            vec![
                egui::pos2(90.0, 76.0),
                egui::pos2(90.0, 188.0),
                egui::pos2(490.0, 188.0),
                egui::pos2(490.0, 300.0),
            ]
        );
    }

    #[test]
    fn test_smooth_step_straight_when_aligned() {
        let source = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(180.0, 76.0));
        let target = egui::Rect::from_min_size(egui::pos2(0.0, 300.0), egui::vec2(180.0, 76.0));

        assert_eq!(smooth_step_points(source, target).len(), 2);
    }
}
