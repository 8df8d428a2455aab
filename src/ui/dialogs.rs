//! Windows and popups: the setup form, the page dialog, the delete
//! confirmation, the page menu and the inline label editor.

use super::state::SitemapApp;
use super::canvas::CardGeometry;
use eframe::egui;

/// Id of the "Page name" field in the page dialog.
pub fn page_name_field_id() -> egui::Id {
    egui::Id::new("page_dialog_name")
}

impl SitemapApp {
    /// Renders the primary setup form that requests a generated sitemap.
    pub fn draw_setup_form(&mut self, ctx: &egui::Context) {
        if !self.setup_form.open {
            return;
        }
        let mut open = true;
        egui::Window::new("Edit Site Structure")
            .collapsible(false)
            .resizable(false)
            .default_width(360.0)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new("Sitemap Prompt *").strong());
                ui.add(
                    egui::TextEdit::multiline(&mut self.setup_form.prompt)
                        .hint_text("Describe the business and what the website should do")
                        .desired_rows(4)
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(6.0);

                ui.label(egui::RichText::new("Number of Pages").strong());
                ui.add(egui::TextEdit::singleline(&mut self.setup_form.pages).desired_width(f32::INFINITY));
                ui.add_space(6.0);

                ui.label(egui::RichText::new("Language").strong());
                ui.add(
                    egui::TextEdit::singleline(&mut self.setup_form.language)
                        .hint_text("default(english)")
                        .desired_width(f32::INFINITY),
                );

                if let Some(error) = &self.setup_form.error {
                    ui.add_space(4.0);
                    ui.colored_label(ui.visuals().error_fg_color, egui::RichText::new(error).small());
                }
                ui.add_space(8.0);

                let busy = self.requests.generating_sitemap;
                let label = if busy { "Generating..." } else { "Generate Sitemap" };
                if ui
                    .add_enabled(!busy, egui::Button::new(label).min_size(egui::vec2(ui.available_width(), 28.0)))
                    .clicked()
                {
                    self.generate_sitemap();
                }
            });
        if !open {
            self.setup_form.open = false;
        }
    }

    /// Renders the page dialog with the name and prompt fields.
    pub fn draw_page_dialog(&mut self, ctx: &egui::Context) {
        let Some(page_id) = self.page_dialog.page.clone() else {
            return;
        };
        let mut open = true;
        let mut rename = false;
        let mut regenerate = false;
        egui::Window::new("Page")
            .id(egui::Id::new("page_dialog"))
            .collapsible(false)
            .resizable(false)
            .default_width(340.0)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 56.0))
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new("Page name *").strong());
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.page_dialog.name)
                        .id(page_name_field_id())
                        .desired_width(f32::INFINITY),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    rename = true;
                }
                ui.add_space(6.0);

                ui.label(egui::RichText::new("Page prompt").strong());
                ui.add(
                    egui::TextEdit::multiline(&mut self.page_dialog.prompt)
                        .hint_text("What should this page contain?")
                        .desired_rows(4)
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(8.0);

                if ui
                    .add(egui::Button::new("Regenerate page").min_size(egui::vec2(ui.available_width(), 28.0)))
                    .clicked()
                {
                    regenerate = true;
                }
            });

        if rename {
            let name = self.page_dialog.name.clone();
            self.rename_page(&page_id, &name);
        }
        if regenerate {
            self.regenerate_from_dialog();
        } else if !open {
            self.page_dialog.page = None;
        }
    }

    /// Asks for confirmation before the whole sitemap is deleted.
    pub fn draw_delete_confirmation(&mut self, ctx: &egui::Context) {
        if !self.confirm_delete {
            return;
        }
        egui::Window::new("Delete sitemap?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Are you sure you want to delete this sitemap? This cannot be undone.");
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        self.delete_sitemap();
                    }
                    if ui.button("Cancel").clicked() {
                        self.confirm_delete = false;
                    }
                });
            });
    }

    /// Renders the "⋯" menu of a page card.
    pub fn draw_page_menu(&mut self, ui: &mut egui::Ui) {
        let Some(page_id) = self.interaction.menu_page.clone() else {
            return;
        };
        let area_response = egui::Area::new(egui::Id::new("page_menu"))
            .fixed_pos(self.interaction.menu_pos)
            .order(egui::Order::Foreground)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    if ui.button("🗑 Delete Node").clicked() {
                        self.delete_page(&page_id);
                        self.interaction.menu_page = None;
                    }
                })
            });

        // Click outside closes the menu, except on the frame it opened
        if !self.interaction.menu_just_opened && ui.input(|i| i.pointer.primary_clicked()) {
            if let Some(click_pos) = ui.input(|i| i.pointer.interact_pos()) {
                if !area_response.response.rect.contains(click_pos) {
                    self.interaction.menu_page = None;
                }
            }
        }
        self.interaction.menu_just_opened = false;
    }

    /// Renders the inline label editor over the header of the edited page.
    pub fn draw_label_editor(&mut self, ui: &mut egui::Ui) {
        let Some(page_id) = self.interaction.editing_label.clone() else {
            return;
        };
        let Some(page) = self.sitemap.node(&page_id) else {
            self.interaction.editing_label = None;
            return;
        };
        let header = self.world_rect_to_screen(CardGeometry::of(page).header);
        let zoom = self.canvas.zoom_factor;
        let left = header.min.x + 26.0 * zoom;
        let width = (header.width() - 26.0 * zoom - super::canvas::MENU_BUTTON_WIDTH * zoom).max(40.0);

        let mut commit = false;
        let mut cancel = false;
        egui::Area::new(egui::Id::new("label_editor"))
            .fixed_pos(egui::pos2(left, header.center().y - 11.0))
            .order(egui::Order::Foreground)
            .show(ui.ctx(), |ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.interaction.temp_label)
                        .desired_width(width)
                        .font(egui::TextStyle::Body),
                );

                if !self.interaction.focus_requested_for_edit {
                    response.request_focus();
                    self.interaction.focus_requested_for_edit = true;
                }
                if self.interaction.should_select_text && response.has_focus() {
                    self.interaction.should_select_text = false;
                    let len = self.interaction.temp_label.chars().count();
                    ui.memory_mut(|mem| {
                        let state = mem
                            .data
                            .get_temp_mut_or_default::<egui::text_edit::TextEditState>(response.id);
                        state.cursor.set_char_range(Some(egui::text::CCursorRange::two(
                            egui::text::CCursor::new(0),
                            egui::text::CCursor::new(len),
                        )));
                    });
                }

                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    cancel = true;
                } else if response.lost_focus() {
                    // Enter and clicking elsewhere both end the edit
                    commit = true;
                }
            });

        if cancel {
            self.interaction.editing_label = None;
        } else if commit {
            self.commit_label_edit();
        }
    }
}
