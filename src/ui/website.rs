//! The website view: generation, deployment and the HTML preview.

use super::state::SitemapApp;
use eframe::egui;

impl SitemapApp {
    /// Renders the website view.
    ///
    /// In fullscreen mode only the preview is shown.
    pub fn draw_website_view(&mut self, ui: &mut egui::Ui) {
        if self.website.fullscreen {
            self.draw_preview(ui);
            return;
        }

        egui::SidePanel::left("website_controls")
            .resizable(false)
            .exact_width(320.0)
            .show_inside(ui, |ui| {
                self.draw_website_controls(ui);
            });
        egui::CentralPanel::default().show_inside(ui, |ui| {
            self.draw_preview(ui);
        });
    }

    fn draw_website_controls(&mut self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        ui.heading("Website Generation");
        ui.label(
            egui::RichText::new(
                "Generate your website from the saved sitemap. Make sure you have created a sitemap first.",
            )
            .small(),
        );
        ui.add_space(8.0);

        let full_width = egui::vec2(ui.available_width(), 32.0);
        let generating = self.requests.generating_website;
        let label = if generating { "Generating..." } else { "Generate Website" };
        if ui
            .add_enabled(!generating, egui::Button::new(label).min_size(full_width))
            .clicked()
        {
            self.generate_website();
        }

        if self.website.website.is_some() {
            ui.add_space(6.0);
            let deploying = self.requests.deploying;
            let label = if deploying { "Deploying..." } else { "Deploy Website" };
            if ui
                .add_enabled(!deploying, egui::Button::new(label).min_size(full_width))
                .clicked()
            {
                self.deploy_website();
            }
        }

        if let Some(error) = &self.website.error {
            ui.add_space(10.0);
            egui::Frame::group(ui.style())
                .fill(ui.visuals().error_fg_color.gamma_multiply(0.12))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.colored_label(ui.visuals().error_fg_color, error);
                });
        }

        if let Some(url) = &self.website.deployment_url {
            ui.add_space(10.0);
            let success = egui::Color32::from_rgb(22, 163, 74);
            egui::Frame::group(ui.style())
                .fill(success.gamma_multiply(0.12))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.colored_label(success, "Website deployed successfully!");
                    ui.hyperlink_to(url.as_str(), url.as_str());
                });
        }

        if let Some(status) = &self.website.export_status {
            ui.add_space(6.0);
            ui.label(egui::RichText::new(status).small());
        }
    }

    fn draw_preview(&mut self, ui: &mut egui::Ui) {
        let html = self.website.html().map(str::to_string);

        ui.horizontal(|ui| {
            ui.heading("Preview");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let toggle = if self.website.fullscreen {
                    "Exit full screen"
                } else {
                    "Full screen"
                };
                if ui.button(toggle).clicked() {
                    self.website.fullscreen = !self.website.fullscreen;
                }
                if ui
                    .add_enabled(html.is_some(), egui::Button::new("Export HTML"))
                    .clicked()
                {
                    self.export_html();
                }
                if ui
                    .add_enabled(html.is_some(), egui::Button::new("Open in browser"))
                    .clicked()
                {
                    self.open_in_browser(ui.ctx());
                }
            });
        });
        ui.separator();

        match html {
            Some(code) => {
                egui::ScrollArea::both()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut code.as_str())
                                .code_editor()
                                .desired_width(f32::INFINITY),
                        );
                    });
            }
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new("Generate a website to see its preview here.").weak(),
                    );
                });
            }
        }
    }
}
